//! Chart data and the helpers that turn it into something drawable.
//!
//! ## Submodules
//!
//! - [`chart`]: Series slots, error line and busy indicator ([`ChartState`], [`DatasetIndex`])
//! - [`format`]: Value and timestamp formatting for axes, legends and the gauge
//! - [`interval`]: Parsing and formatting of refresh periods (e.g., "30s", "5m")
//! - [`window`]: Zoom/pan viewport and the debounce that commits it
//!
//! ## Data Flow
//!
//! ```text
//! TargetUpdate (from PanelSource)
//!        │
//!        ▼
//! ChartState::apply()
//!        │
//!        ├──▶ DatasetIndex::slot() (stable position per target/result)
//!        │
//!        └──▶ ChartState::display_series() (stacked or as-is, for rendering)
//! ```

pub mod chart;
pub mod format;
pub mod interval;
pub mod window;

pub use chart::{ChartState, DatasetIndex};
pub use format::{format_value, gauge_ratio};
pub use interval::{format_interval, parse_refresh_interval, refresh_period};
pub use window::{Debounced, Viewport, DATE_RANGE_DEBOUNCE};
