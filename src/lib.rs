//! # panelwatch
//!
//! A terminal renderer for a single Grafana-style dashboard panel backed by
//! a Prometheus-compatible `query_range` endpoint.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│ │
//! │  │ (state) │    │ (chart)  │    │(render) │    │         │ │
//! │  └────┬────┘    └──────────┘    └─────────┘    └─────────┘ │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  ┌─────────┐     ┌───────────────────────┐                  │
//! │  │ source  │────▶│ panelwatch-query      │──▶ HTTP endpoint │
//! │  │ (fetch) │     │ (RangeQuery)          │                  │
//! │  └─────────┘     └───────────────────────┘                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Application state, date-range zoom/pan and live tail toggling
//! - **[`source`]**: [`PanelSource`], which fetches every target of a panel, once
//!   or on a polling timer, and feeds the results into chart state
//! - **[`data`]**: Chart state with stable series slots, refresh periods,
//!   value formatting and the zoom viewport
//! - **[`ui`]**: Terminal rendering using ratatui: line chart, gauge, header,
//!   status bar and help overlay
//! - **[`settings`]**: Layered settings and panel definition loading
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Show a panel over the last hour, polling every 10 seconds
//! panelwatch --panel cpu.json --from now-1h --live-tail --refresh 10s
//!
//! # Pick the third panel of a dashboard export and print its series
//! panelwatch --panel dashboard.json --index 2 --var job=api --once
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use std::sync::Arc;
//! use panelwatch::{App, PanelRequest, PanelSource};
//! use panelwatch_query::{Panel, QueryClient, TimeRange};
//!
//! # tokio_test::block_on(async {
//! let panel = Panel::builder()
//!     .title("Requests")
//!     .target(|t| t.expr("sum(rate(http_requests_total[5m])) by (code)").legend("{{code}}"))
//!     .build();
//! let request = PanelRequest::new(panel)
//!     .with_range(TimeRange::new("now-6h", "now"))
//!     .with_live_tail(true);
//!
//! let client = QueryClient::builder().endpoint("http://localhost:9081").build().unwrap();
//! let source = PanelSource::new(Arc::new(client), request, tokio::runtime::Handle::current());
//! let mut app = App::new(source);
//! app.mount();
//! # });
//! ```

pub mod app;
pub mod data;
pub mod events;
pub mod settings;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use data::{ChartState, DatasetIndex};
pub use settings::{load_panel, PanelError, Settings};
pub use source::{PanelRequest, PanelSource, RefreshState, SourceEvent, TargetUpdate};
