//! Terminal UI rendering using ratatui.
//!
//! ## Submodules
//!
//! - [`chart`]: Line chart for time series panels
//! - [`gauge`]: Single latest value for gauge panels
//! - [`common`]: Shared components (header, status bar, help overlay)
//! - [`theme`]: Light/dark theme support with terminal auto-detection
//!
//! ## Rendering Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (common::render_header)       │
//! ├──────────────────────────────────────┤
//! │                                      │
//! │ Panel (chart::render / gauge::render)│
//! │                                      │
//! ├──────────────────────────────────────┤
//! │ Status Bar (common::render_status)   │
//! └──────────────────────────────────────┘
//!         ↑
//!    Overlay rendered on top:
//!    - common::render_help
//! ```

pub mod chart;
pub mod common;
pub mod gauge;
pub mod theme;

use ratatui::{layout::Rect, Frame};

use crate::app::App;

pub use theme::Theme;

/// Error line shown under a panel whose last fetch failed.
pub const SERVER_ERROR: &str = "There was an error communicating with the server";

/// Render the panel body for its kind.
pub fn render_panel(frame: &mut Frame, app: &App, area: Rect) {
    if app.source().request().panel.kind.is_time_series() {
        chart::render(frame, app, area);
    } else {
        gauge::render(frame, app, area);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use panelwatch_query::{
        Panel, PanelKind, QueryError, QueryRangeRequest, QueryRangeResponse, RangeQuery,
    };
    use ratatui::{backend::TestBackend, Terminal};
    use tokio::runtime::Handle;

    use super::*;
    use crate::source::{PanelRequest, PanelSource};

    #[derive(Debug)]
    struct Fixed {
        fail: bool,
    }

    #[async_trait]
    impl RangeQuery for Fixed {
        async fn query_range(
            &self,
            request: &QueryRangeRequest,
        ) -> Result<QueryRangeResponse, QueryError> {
            if self.fail {
                return Err(QueryError::Http("502 Bad Gateway".to_string()));
            }
            let body = serde_json::json!({
                "status": "success",
                "data": {
                    "resultType": "matrix",
                    "result": [{
                        "metric": {"instance": "web-1"},
                        "values": [[request.start, "0.25"], [request.end, "0.5"]]
                    }]
                }
            });
            Ok(serde_json::from_value(body).unwrap())
        }

        fn description(&self) -> String {
            "fixed".to_string()
        }
    }

    fn panel(kind: PanelKind) -> Panel {
        Panel::builder()
            .title("CPU")
            .kind(kind)
            .y_axis("percentunit", None)
            .target(|t| t.expr("cpu").legend("{{instance}}"))
            .build()
    }

    async fn app(kind: PanelKind, fail: bool) -> App {
        app_for(panel(kind), fail).await
    }

    async fn app_for(panel: Panel, fail: bool) -> App {
        let source = PanelSource::new(
            Arc::new(Fixed { fail }),
            PanelRequest::new(panel),
            Handle::current(),
        );
        let mut app = App::with_theme(source, Theme::dark());
        app.mount();
        app.wait_idle().await;
        app
    }

    fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                render_panel(frame, app, area);
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[tokio::test]
    async fn test_chart_shows_legend() {
        let app = app(PanelKind::TimeSeries, false).await;
        let screen = draw(&app);
        assert!(screen.contains("CPU"));
        assert!(screen.contains("web-1"));
        assert!(!screen.contains(SERVER_ERROR));
    }

    #[tokio::test]
    async fn test_gauge_shows_latest_value() {
        let app = app(PanelKind::Gauge, false).await;
        assert!(draw(&app).contains("50.00%"));
    }

    #[tokio::test]
    async fn test_sparkline_gauge_draws_trend_under_value() {
        let mut panel = panel(PanelKind::Gauge);
        panel.sparkline = Some(panelwatch_query::SparklineOptions {
            show: true,
            line_color: Some("rgb(31, 120, 193)".to_string()),
            fill_color: Some("rgba(31, 118, 189, 0.18)".to_string()),
        });
        let app = app_for(panel, false).await;
        let screen = draw(&app);
        assert!(screen.contains("50.00%"));
        // The older, smaller sample is a one-eighth bar
        assert!(screen.contains("▁"));

        let plain = draw(&app_for(self::panel(PanelKind::Gauge), false).await);
        assert!(!plain.contains("▁"));
    }

    #[tokio::test]
    async fn test_error_line() {
        let app = app(PanelKind::TimeSeries, true).await;
        assert!(draw(&app).contains(SERVER_ERROR));
    }
}
