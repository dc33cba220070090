//! Settings and panel definition loading.
//!
//! Settings are layered: built-in defaults, then an optional config file,
//! then `PANELWATCH_*` environment variables. Command line flags are applied
//! on top by the binary.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use panelwatch_query::{Panel, QueryBackend, TemplateVars, TimeRange};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::data::interval::DEFAULT_REFRESH_SECS;

/// Errors that can occur while loading settings or a panel.
#[derive(Debug, Error)]
pub enum PanelError {
    /// The panel file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The panel file is not a valid panel or dashboard.
    #[error("Invalid panel definition: {0}")]
    Json(#[from] serde_json::Error),

    /// A dashboard file does not have the requested panel.
    #[error("Dashboard has {available} panels, no panel at index {index}")]
    NoPanel { index: usize, available: usize },

    /// The settings could not be loaded.
    #[error("Invalid settings: {0}")]
    Config(#[from] config::ConfigError),
}

/// Runtime settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the query API.
    pub endpoint: String,
    pub backend: QueryBackend,
    /// Start of the date range, e.g. `now-6h`.
    pub from: String,
    /// End of the date range, e.g. `now`.
    pub to: String,
    /// Polling period while live tail is on.
    pub refresh: String,
    pub live_tail: bool,
    /// Template variables as `key=value`.
    pub vars: Vec<String>,
    /// Panel to show when the panel file is a dashboard.
    pub panel_index: usize,
    /// Per-request timeout.
    pub timeout_secs: u64,
    pub log_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        let range = TimeRange::default();
        Self {
            endpoint: "http://localhost:9081".to_string(),
            backend: QueryBackend::default(),
            from: range.from,
            to: range.to,
            refresh: format!("{}s", DEFAULT_REFRESH_SECS),
            live_tail: false,
            vars: Vec::new(),
            panel_index: 0,
            timeout_secs: 10,
            log_file: PathBuf::from("panelwatch.log"),
        }
    }
}

impl Settings {
    /// Load settings from an optional file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, PanelError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let config = builder
            .add_source(
                Environment::with_prefix("PANELWATCH")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("vars"),
            )
            .build()?;
        Ok(config.try_deserialize()?)
    }

    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.from.clone(), self.to.clone())
    }

    pub fn template_vars(&self) -> TemplateVars {
        TemplateVars::parse(&self.vars)
    }
}

/// Load a panel from a JSON file.
///
/// The file may hold a single panel, a dashboard with a `panels` array, or a
/// dashboard export that wraps it in a `dashboard` object.
pub fn load_panel(path: &Path, index: usize) -> Result<Panel, PanelError> {
    let text = std::fs::read_to_string(path).map_err(|source| PanelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_panel(&text, index)
}

/// Parse a panel from JSON text. See [`load_panel`].
pub fn parse_panel(text: &str, index: usize) -> Result<Panel, PanelError> {
    let value: Value = serde_json::from_str(text)?;
    let root = value.get("dashboard").unwrap_or(&value);

    match root.get("panels").and_then(Value::as_array) {
        Some(panels) => {
            let panel = panels.get(index).ok_or(PanelError::NoPanel {
                index,
                available: panels.len(),
            })?;
            Ok(Panel::deserialize(panel)?)
        }
        None => Ok(Panel::deserialize(root)?),
    }
}
