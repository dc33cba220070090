//! # panelwatch-query
//!
//! Everything between a panel definition and its chart series: time range
//! tokens, step selection, template variables, the `query_range` wire format
//! and an HTTP client for it.
//!
//! ## Pipeline
//!
//! ```text
//! Panel + Target + TemplateVars + TimeRange
//!        │
//!        ▼
//! QueryRangeRequest::for_target()   (substitute $vars, resolve now-1h, pick step)
//!        │
//!        ▼
//! RangeQuery::query_range()         (QueryClient: GET /api/<backend>/query_range)
//!        │
//!        ▼
//! QueryRangeResponse::into_series() (matrix -> Series, legends from {{labels}})
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chrono::Local;
//! use panelwatch_query::{
//!     QueryClient, QueryRangeRequest, RangeQuery, TemplateVars, TimeRange,
//! };
//! use panelwatch_types::Panel;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let panel = Panel::builder()
//!         .datasource("prometheus")
//!         .target(|t| t.expr("rate(node_cpu_seconds_total[5m])").legend("{{cpu}}"))
//!         .build();
//!     let client = QueryClient::builder().endpoint("http://localhost:9081").build()?;
//!
//!     let target = &panel.targets[0];
//!     let request = QueryRangeRequest::for_target(
//!         &panel,
//!         target,
//!         &TemplateVars::new(),
//!         &TimeRange::new("now-1h", "now"),
//!         Local::now(),
//!     )?;
//!     for series in client.query_range(&request).await?.into_series(target)? {
//!         println!("{}: {} points", series.label, series.points.len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod request;
pub mod response;
pub mod step;
pub mod template;
pub mod time_range;

pub use client::{QueryBackend, QueryClient, QueryClientBuilder};
pub use error::QueryError;
pub use request::{QueryRangeRequest, RangeQuery};
pub use response::{MatrixResult, QueryRangeResponse};
pub use step::compute_step;
pub use template::{format_legend, TemplateVars};
pub use time_range::{resolve, resolve_at, TimeRange, TimeRangeError};

// Re-export types for convenience
pub use panelwatch_types::{LabelSet, Panel, PanelKind, Point, Series, SparklineOptions, Target};
