//! Application state and interaction logic.

use std::time::{Duration, Instant};

use chrono::Local;
use panelwatch_query::TimeRange;
use tracing::{debug, info};

use crate::data::{format_interval, parse_refresh_interval, Debounced, Viewport, DATE_RANGE_DEBOUNCE};
use crate::source::PanelSource;
use crate::ui::Theme;

/// Zoom factor per key press.
const ZOOM_STEP: f64 = 0.5;
/// Fraction of the window moved per pan key press.
const PAN_STEP: f64 = 0.25;
/// How long status messages stay visible.
const STATUS_TTL: Duration = Duration::from_secs(3);

/// Main application state.
#[derive(Debug)]
pub struct App {
    pub running: bool,
    pub show_help: bool,

    source: PanelSource,

    /// Range and live tail setting the panel started with, restored by Esc.
    initial_range: TimeRange,
    initial_live_tail: bool,

    /// Window being zoomed or panned, before it is committed.
    viewport: Option<Viewport>,
    pending_range: Debounced<Viewport>,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App around a panel source. Detects the terminal theme.
    pub fn new(source: PanelSource) -> Self {
        Self::with_theme(source, Theme::auto_detect())
    }

    pub fn with_theme(source: PanelSource, theme: Theme) -> Self {
        let request = source.request();
        let initial_range = request.range.clone();
        let initial_live_tail = request.live_tail;
        Self {
            running: true,
            show_help: false,
            source,
            initial_range,
            initial_live_tail,
            viewport: None,
            pending_range: Debounced::new(DATE_RANGE_DEBOUNCE),
            theme,
            status_message: None,
        }
    }

    pub fn source(&self) -> &PanelSource {
        &self.source
    }

    /// Start fetching.
    pub fn mount(&mut self) {
        self.source.mount();
    }

    /// Wait for every outstanding request to finish.
    pub async fn wait_idle(&mut self) {
        self.source.wait_idle().await;
    }

    /// Returns a description of the query backend.
    pub fn source_description(&self) -> String {
        self.source.description()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, time)) if time.elapsed() < STATUS_TTL => Some(msg),
            _ => None,
        }
    }

    /// Apply arrived results and commit a settled zoom/pan.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    pub fn tick_at(&mut self, now: Instant) {
        self.source.poll();

        if let Some(view) = self.pending_range.take_ready(now) {
            info!("Committing date range {} to {}", view.start_ms, view.end_ms);
            self.viewport = None;
            self.source
                .set_range(TimeRange::absolute(view.start_ms, view.end_ms));
            self.set_status_message("Date range set, live tail off");
        }
    }

    /// The window the chart should show: the pending viewport, else the
    /// panel's range resolved against now.
    pub fn visible_window(&self) -> Option<Viewport> {
        if let Some(view) = self.viewport {
            return Some(view);
        }
        let (start, end) = self.source.request().range.resolve_at(Local::now()).ok()?;
        Some(Viewport::new(start.timestamp_millis(), end.timestamp_millis()))
    }

    /// True while a zoom/pan waits to be committed.
    pub fn range_pending(&self) -> bool {
        self.pending_range.is_pending()
    }

    pub fn zoom_in(&mut self) {
        self.adjust_view(|v| v.zoom(ZOOM_STEP));
    }

    pub fn zoom_out(&mut self) {
        self.adjust_view(|v| v.zoom(1.0 / ZOOM_STEP));
    }

    pub fn pan_left(&mut self) {
        self.adjust_view(|v| v.pan(-PAN_STEP));
    }

    pub fn pan_right(&mut self) {
        self.adjust_view(|v| v.pan(PAN_STEP));
    }

    fn adjust_view(&mut self, f: impl FnOnce(&Viewport) -> Viewport) {
        let Some(current) = self.visible_window() else {
            self.set_status_message("Cannot zoom: date range does not resolve");
            return;
        };
        let next = f(&current);
        debug!("Viewport {} to {}", next.start_ms, next.end_ms);
        self.viewport = Some(next);
        self.pending_range.set(next, Instant::now());
    }

    /// Drop any pending zoom and go back to the configured range.
    pub fn reset_range(&mut self) {
        self.pending_range.clear();
        self.viewport = None;

        let request = self.source.request();
        if request.range == self.initial_range && request.live_tail == self.initial_live_tail {
            return;
        }
        let request = request
            .clone()
            .with_range(self.initial_range.clone())
            .with_live_tail(self.initial_live_tail);
        self.source.reconfigure(request);
        self.set_status_message(format!(
            "Range reset to {} to {}",
            self.initial_range.from, self.initial_range.to
        ));
    }

    pub fn toggle_live_tail(&mut self) {
        let live_tail = !self.source.request().live_tail;
        self.source.set_live_tail(live_tail);
        let message = if live_tail {
            format!(
                "Live tail on, every {}",
                format_interval(parse_refresh_interval(&self.source.request().refresh))
            )
        } else {
            "Live tail off".to_string()
        };
        self.set_status_message(message);
    }

    /// Fetch every target now.
    pub fn refresh(&mut self) {
        self.source.refresh_now();
        self.set_status_message("Refreshing");
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Quit the application.
    pub fn quit(&mut self) {
        self.source.unmount();
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use panelwatch_query::{Panel, QueryError, QueryRangeRequest, QueryRangeResponse, RangeQuery};
    use tokio::runtime::Handle;

    use super::*;
    use crate::source::{PanelRequest, RefreshState};

    #[derive(Debug)]
    struct EmptyQuery;

    #[async_trait]
    impl RangeQuery for EmptyQuery {
        async fn query_range(
            &self,
            _request: &QueryRangeRequest,
        ) -> Result<QueryRangeResponse, QueryError> {
            Ok(serde_json::from_value(serde_json::json!({"status": "success"})).unwrap())
        }

        fn description(&self) -> String {
            "empty".to_string()
        }
    }

    fn app(live_tail: bool) -> App {
        let panel = Panel::builder().target(|t| t.expr("up")).build();
        let request = PanelRequest::new(panel)
            .with_range(TimeRange::new("now-1h", "now"))
            .with_live_tail(live_tail);
        let source = PanelSource::new(Arc::new(EmptyQuery), request, Handle::current());
        let mut app = App::with_theme(source, Theme::dark());
        app.mount();
        app
    }

    #[tokio::test]
    async fn test_zoom_commits_after_debounce() {
        let mut app = app(true);
        assert_eq!(app.source().state(), RefreshState::Polling);

        let before = app.visible_window().unwrap();
        app.zoom_in();
        let zoomed = app.visible_window().unwrap();
        assert_eq!(zoomed.span(), before.span() / 2);
        assert!(app.range_pending());

        // Not yet settled
        app.tick_at(Instant::now());
        assert!(app.source().request().live_tail);

        app.tick_at(Instant::now() + DATE_RANGE_DEBOUNCE);
        let request = app.source().request();
        assert!(!request.live_tail);
        assert_eq!(request.range, TimeRange::absolute(zoomed.start_ms, zoomed.end_ms));
        assert_eq!(app.source().active_timers(), 0);
        assert!(!app.range_pending());
    }

    #[tokio::test]
    async fn test_reset_restores_configured_range() {
        let mut app = app(true);
        app.pan_left();
        app.tick_at(Instant::now() + DATE_RANGE_DEBOUNCE);
        assert!(app.source().request().range.is_absolute());

        app.reset_range();
        let request = app.source().request();
        assert_eq!(request.range, TimeRange::new("now-1h", "now"));
        assert!(request.live_tail);
        assert_eq!(app.source().active_timers(), 1);
    }

    #[tokio::test]
    async fn test_reset_drops_pending_zoom() {
        let mut app = app(false);
        app.zoom_out();
        app.reset_range();
        app.tick_at(Instant::now() + DATE_RANGE_DEBOUNCE);
        assert_eq!(app.source().request().range, TimeRange::new("now-1h", "now"));
    }

    #[tokio::test]
    async fn test_toggle_live_tail() {
        let mut app = app(false);
        assert_eq!(app.source().active_timers(), 0);

        app.toggle_live_tail();
        assert_eq!(app.source().active_timers(), 1);
        assert_eq!(app.get_status_message(), Some("Live tail on, every 30s"));

        app.toggle_live_tail();
        assert_eq!(app.source().active_timers(), 0);
    }

    #[tokio::test]
    async fn test_quit_unmounts() {
        let mut app = app(true);
        app.quit();
        assert!(!app.running);
        assert_eq!(app.source().active_timers(), 0);
    }
}
