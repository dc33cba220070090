//! Chart state: series slots, the error line and the busy indicator.

use std::collections::BTreeMap;
use std::time::Instant;

use panelwatch_types::{PanelKind, Point, Series};

use crate::source::TargetUpdate;

/// Legends are hidden above this many datasets.
const MAX_LEGEND_ENTRIES: usize = 10;

/// Stable chart positions for (target index, result index) pairs.
///
/// Slots are handed out from a monotonic counter and never reassigned, so a
/// series keeps its position (and color) across refreshes.
#[derive(Debug, Clone, Default)]
pub struct DatasetIndex {
    slots: BTreeMap<(usize, usize), usize>,
    next: usize,
}

impl DatasetIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the first result slot of each target, in target order.
    ///
    /// Already assigned keys are left alone.
    pub fn seed(&mut self, targets: usize) {
        for target in 0..targets {
            self.slot(target, 0);
        }
    }

    /// Get the slot for a pair, assigning the next free one if needed.
    pub fn slot(&mut self, target: usize, result: usize) -> usize {
        let next = &mut self.next;
        *self.slots.entry((target, result)).or_insert_with(|| {
            let slot = *next;
            *next += 1;
            slot
        })
    }

    /// Look up a slot without assigning.
    pub fn get(&self, target: usize, result: usize) -> Option<usize> {
        self.slots.get(&(target, result)).copied()
    }

    /// Slots whose (target, result) key matches `matches`.
    fn slots_where(&self, matches: impl Fn(usize, usize) -> bool) -> Vec<usize> {
        self.slots
            .iter()
            .filter(|((target, result), _)| matches(*target, *result))
            .map(|(_, slot)| *slot)
            .collect()
    }

    /// Number of assigned slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if no slots are assigned.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Everything needed to draw the chart.
#[derive(Debug, Clone, Default)]
pub struct ChartState {
    index: DatasetIndex,
    slots: BTreeMap<usize, Series>,
    /// Message from the most recent failed fetch, cleared by the next success.
    pub error: Option<String>,
    in_flight: usize,
    /// When a fetch last succeeded.
    pub last_updated: Option<Instant>,
}

impl ChartState {
    /// Create an empty chart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve slots for the panel's targets.
    pub fn seed(&mut self, targets: usize) {
        self.index.seed(targets);
    }

    /// Forget series of targets at or beyond `targets`.
    ///
    /// Slot assignments stay, so a target that comes back keeps its color.
    pub fn retain_targets(&mut self, targets: usize) {
        for slot in self.index.slots_where(|target, _| target >= targets) {
            self.slots.remove(&slot);
        }
    }

    /// Record that a batch of `targets` requests was issued.
    pub fn begin_batch(&mut self, targets: usize) {
        self.in_flight = self.in_flight.saturating_add(targets);
    }

    /// Apply one target's result.
    ///
    /// Successful results replace every series of their target, so results
    /// that disappeared are no longer drawn. Failures only record the error
    /// and leave existing series untouched.
    pub fn apply(&mut self, update: TargetUpdate) {
        self.in_flight = self.in_flight.saturating_sub(1);

        match update.outcome {
            Ok(series) => {
                let returned = series.len();
                let stale = self
                    .index
                    .slots_where(|target, result| target == update.target && result >= returned);
                for slot in stale {
                    self.slots.remove(&slot);
                }
                for (result, s) in series.into_iter().enumerate() {
                    let slot = self.index.slot(update.target, result);
                    self.slots.insert(slot, s);
                }
                self.error = None;
                self.last_updated = Some(Instant::now());
            }
            Err(message) => {
                self.error = Some(message);
            }
        }
    }

    /// True while requests are outstanding.
    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    /// Number of outstanding requests.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// The slot index.
    pub fn index(&self) -> &DatasetIndex {
        &self.index
    }

    /// Series in slot order.
    pub fn series(&self) -> impl Iterator<Item = (usize, &Series)> {
        self.slots.iter().map(|(slot, s)| (*slot, s))
    }

    /// Check if there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Series as drawn: cumulative when stacking, as-is otherwise.
    pub fn display_series(&self, stack: bool) -> Vec<(usize, Series)> {
        if !stack {
            return self.series().map(|(slot, s)| (slot, s.clone())).collect();
        }

        let mut totals: BTreeMap<i64, f64> = BTreeMap::new();
        self.series()
            .map(|(slot, s)| {
                let points = s
                    .points
                    .iter()
                    .map(|p| {
                        let total = totals.entry(p.x).or_insert(0.0);
                        if p.y.is_finite() {
                            *total += p.y;
                        }
                        Point::new(p.x, *total)
                    })
                    .collect();
                (slot, Series::new(s.label.clone(), points))
            })
            .collect()
    }

    /// The most recent sample of the first series, for gauges.
    pub fn latest_value(&self) -> Option<f64> {
        self.slots.values().next()?.last().map(|p| p.y)
    }

    /// Whether to draw a legend for this panel kind.
    pub fn show_legend(&self, kind: PanelKind) -> bool {
        kind.is_time_series() && self.index.len() <= MAX_LEGEND_ENTRIES
    }

    /// Smallest and largest timestamp over all series.
    pub fn x_bounds(&self) -> Option<(i64, i64)> {
        self.slots
            .values()
            .filter_map(Series::x_range)
            .reduce(|(lo, hi), (l, h)| (lo.min(l), hi.max(h)))
    }

    /// Smallest and largest value over the given series.
    pub fn y_bounds(series: &[(usize, Series)]) -> Option<(f64, f64)> {
        series
            .iter()
            .filter_map(|(_, s)| s.y_range())
            .reduce(|(lo, hi), (l, h)| (lo.min(l), hi.max(h)))
    }
}
