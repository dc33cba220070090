//! Panel data source: fetches every target of a panel and keeps the chart fed.
//!
//! [`PanelSource`] issues one request per target, optionally on a polling
//! timer, and collects the results into a [`ChartState`](crate::data::ChartState).
//! The UI drains results without blocking through [`PanelSource::poll`].

mod panel;

pub use panel::PanelSource;

use panelwatch_query::{Panel, Series, TemplateVars, TimeRange};

use crate::data::interval::DEFAULT_REFRESH_SECS;

/// Everything that determines what a panel fetches.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelRequest {
    pub panel: Panel,
    pub range: TimeRange,
    pub vars: TemplateVars,
    /// Polling period string, e.g. `30s` or `5m`.
    pub refresh: String,
    /// Poll on a timer instead of fetching once.
    pub live_tail: bool,
}

impl PanelRequest {
    /// A one-shot request over the default range.
    pub fn new(panel: Panel) -> Self {
        Self {
            panel,
            range: TimeRange::default(),
            vars: TemplateVars::new(),
            refresh: format!("{}s", DEFAULT_REFRESH_SECS),
            live_tail: false,
        }
    }

    pub fn with_range(mut self, range: TimeRange) -> Self {
        self.range = range;
        self
    }

    pub fn with_vars(mut self, vars: TemplateVars) -> Self {
        self.vars = vars;
        self
    }

    pub fn with_refresh(mut self, refresh: impl Into<String>) -> Self {
        self.refresh = refresh.into();
        self
    }

    pub fn with_live_tail(mut self, live_tail: bool) -> Self {
        self.live_tail = live_tail;
        self
    }
}

/// The result of fetching one target.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetUpdate {
    /// Index of the target in the panel.
    pub target: usize,
    /// Transformed series, or a displayable error message.
    pub outcome: Result<Vec<Series>, String>,
}

/// Messages from background tasks to the source.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceEvent {
    /// The polling timer issued requests for this many targets.
    BatchIssued(usize),
    /// A target finished.
    Target(TargetUpdate),
}

/// What the source is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshState {
    /// Not mounted, or mounted with live tail off after a toggle.
    #[default]
    Idle,
    /// Mounted without a timer; data was fetched once.
    OneShot,
    /// Polling on a timer.
    Polling,
}

impl RefreshState {
    pub fn label(&self) -> &'static str {
        match self {
            RefreshState::Idle => "idle",
            RefreshState::OneShot => "static",
            RefreshState::Polling => "live",
        }
    }
}
