//! Chart series built from query results.

use std::collections::BTreeMap;

/// Labels identifying one result of a query (`{job="api", instance="h1"}`).
pub type LabelSet = BTreeMap<String, String>;

/// A single sample.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    /// Unix timestamp in milliseconds.
    pub x: i64,
    /// Sample value, rounded to two decimal places.
    pub y: f64,
}

impl Point {
    /// Create a point.
    pub fn new(x: i64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The output of one (target, result) pair.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Series {
    /// Legend label.
    pub label: String,
    /// Samples in timestamp order.
    pub points: Vec<Point>,
}

impl Series {
    /// Create a series.
    pub fn new(label: impl Into<String>, points: Vec<Point>) -> Self {
        Self {
            label: label.into(),
            points,
        }
    }

    /// Check if the series has no samples.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The most recent sample.
    pub fn last(&self) -> Option<&Point> {
        self.points.last()
    }

    /// Smallest and largest timestamp.
    pub fn x_range(&self) -> Option<(i64, i64)> {
        let first = self.points.first()?.x;
        let last = self.points.last()?.x;
        Some((first.min(last), first.max(last)))
    }

    /// Smallest and largest finite value.
    pub fn y_range(&self) -> Option<(f64, f64)> {
        self.points
            .iter()
            .map(|p| p.y)
            .filter(|y| y.is_finite())
            .fold(None, |acc, y| match acc {
                None => Some((y, y)),
                Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranges_skip_nan() {
        let series = Series::new(
            "a",
            vec![Point::new(1_000, 2.0), Point::new(2_000, f64::NAN), Point::new(3_000, -1.5)],
        );
        assert_eq!(series.x_range(), Some((1_000, 3_000)));
        assert_eq!(series.y_range(), Some((-1.5, 2.0)));
        assert_eq!(series.last().map(|p| p.x), Some(3_000));
    }

    #[test]
    fn test_empty_series() {
        let series = Series::default();
        assert!(series.is_empty());
        assert_eq!(series.x_range(), None);
        assert_eq!(series.y_range(), None);
    }
}
