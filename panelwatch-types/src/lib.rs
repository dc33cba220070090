//! # panelwatch-types
//!
//! Core types for rendering a single Grafana-style dashboard panel. A panel
//! definition describes what to query ([`Target`]s), how to draw it
//! ([`PanelKind`], [`YAxis`], stacking), and the query results come back as
//! [`Series`] of [`Point`]s.
//!
//! ## Features
//!
//! - `serde`: Deserialize panels straight from Grafana panel JSON
//!   (`type`, `targets[].expr`, `targets[].legendFormat`, `yaxes`, `stack`)
//!
//! ## Example
//!
//! ```rust
//! use panelwatch_types::{Panel, PanelKind};
//!
//! let panel = Panel::builder()
//!     .title("Request rate")
//!     .kind(PanelKind::TimeSeries)
//!     .datasource("prometheus")
//!     .target(|t| {
//!         t.expr("sum(rate(http_requests_total{job=\"$job\"}[5m])) by (instance)")
//!          .legend("{{instance}}")
//!     })
//!     .build();
//!
//! assert_eq!(panel.targets.len(), 1);
//! assert!(panel.kind.is_time_series());
//! ```

mod panel;
mod series;

pub use panel::*;
pub use series::*;
