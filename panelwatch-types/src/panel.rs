//! Panel definitions - what to query and how to draw it.

/// How a panel is drawn.
///
/// Grafana panel types map onto two kinds: `graph`/`timeseries` draw every
/// series against time, `singlestat`/`gauge`/`stat` show the latest value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PanelKind {
    /// Line/area chart of all series over the selected range.
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "timeseries", alias = "graph"))]
    TimeSeries,
    /// Single value gauge showing the most recent sample.
    #[cfg_attr(
        feature = "serde",
        serde(rename = "gauge", alias = "singlestat", alias = "stat")
    )]
    Gauge,
}

impl PanelKind {
    /// Returns true for time series panels.
    pub fn is_time_series(&self) -> bool {
        matches!(self, PanelKind::TimeSeries)
    }

    /// Returns the display label for this kind.
    pub fn label(&self) -> &'static str {
        match self {
            PanelKind::TimeSeries => "timeseries",
            PanelKind::Gauge => "gauge",
        }
    }
}

/// One query definition within a panel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Target {
    /// Query expression, possibly containing `$variable` placeholders.
    pub expr: String,

    /// Legend template with `{{label}}` placeholders.
    #[cfg_attr(
        feature = "serde",
        serde(
            default,
            rename = "legendFormat",
            skip_serializing_if = "Option::is_none"
        )
    )]
    pub legend_format: Option<String>,

    /// Grafana query reference (`A`, `B`, ...).
    #[cfg_attr(
        feature = "serde",
        serde(default, rename = "refId", skip_serializing_if = "Option::is_none")
    )]
    pub ref_id: Option<String>,

    /// Per-target datasource, overriding the panel's.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub datasource: Option<String>,
}

impl Target {
    /// Create a target for a query expression.
    pub fn new(expr: impl Into<String>) -> Self {
        Self {
            expr: expr.into(),
            ..Default::default()
        }
    }

    /// Create a builder for a target.
    pub fn builder() -> TargetBuilder {
        TargetBuilder::default()
    }
}

/// Y axis formatting for a panel.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct YAxis {
    /// Grafana unit, e.g. `short`, `bytes`, `percent`, `percentunit`.
    #[cfg_attr(feature = "serde", serde(default = "default_format"))]
    pub format: String,

    /// Axis label.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub label: Option<String>,
}

#[cfg(feature = "serde")]
fn default_format() -> String {
    "short".to_string()
}

impl Default for YAxis {
    fn default() -> Self {
        Self {
            format: "short".to_string(),
            label: None,
        }
    }
}

impl YAxis {
    /// Returns true when values on this axis are percentages.
    pub fn is_percent(&self) -> bool {
        self.format.to_lowercase().starts_with("percent")
    }
}

/// Trend line drawn behind a gauge's value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SparklineOptions {
    #[cfg_attr(feature = "serde", serde(default))]
    pub show: bool,

    /// CSS color of the line.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub line_color: Option<String>,

    /// CSS color of the area under the line.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub fill_color: Option<String>,
}

impl SparklineOptions {
    /// Line and fill colors, only when both are configured.
    pub fn colors(&self) -> Option<(&str, &str)> {
        Some((self.line_color.as_deref()?, self.fill_color.as_deref()?))
    }
}

/// A dashboard's configuration for one chart.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Panel {
    /// Panel title shown in the header.
    #[cfg_attr(feature = "serde", serde(default))]
    pub title: String,

    /// How the panel is drawn.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: PanelKind,

    /// Datasource identifier passed as `ds` on every query.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub datasource: Option<String>,

    /// Queries to run, one request each.
    #[cfg_attr(feature = "serde", serde(default))]
    pub targets: Vec<Target>,

    /// Axis formatting; the first axis is the left one.
    #[cfg_attr(feature = "serde", serde(default, rename = "yaxes"))]
    pub y_axes: Vec<YAxis>,

    /// Stack series on top of each other.
    #[cfg_attr(feature = "serde", serde(default))]
    pub stack: bool,

    /// Gauge trend line settings.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub sparkline: Option<SparklineOptions>,
}

impl Panel {
    /// Create a builder for constructing a panel.
    pub fn builder() -> PanelBuilder {
        PanelBuilder::default()
    }

    /// The datasource a target queries: its own, else the panel's, else empty.
    pub fn datasource_for<'a>(&'a self, target: &'a Target) -> &'a str {
        target
            .datasource
            .as_deref()
            .or(self.datasource.as_deref())
            .unwrap_or("")
    }

    /// The axis used for value formatting.
    ///
    /// Grafana panels list left then right; the last percent axis wins, the
    /// same way the panel's tick formatter is chosen.
    pub fn value_axis(&self) -> Option<&YAxis> {
        self.y_axes
            .iter()
            .rev()
            .find(|a| a.is_percent())
            .or_else(|| self.y_axes.first())
    }

    /// Returns true for gauges drawn as a sparkline.
    pub fn shows_sparkline(&self) -> bool {
        self.kind == PanelKind::Gauge && self.sparkline.as_ref().is_some_and(|s| s.show)
    }

    /// The unit of the value axis, or `""`.
    pub fn unit(&self) -> &str {
        self.value_axis().map(|a| a.format.as_str()).unwrap_or("")
    }
}

/// Builder for [`Panel`].
#[derive(Debug, Default)]
pub struct PanelBuilder {
    panel: Panel,
}

impl PanelBuilder {
    /// Set the panel title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.panel.title = title.into();
        self
    }

    /// Set the panel kind.
    pub fn kind(mut self, kind: PanelKind) -> Self {
        self.panel.kind = kind;
        self
    }

    /// Set the panel datasource.
    pub fn datasource(mut self, datasource: impl Into<String>) -> Self {
        self.panel.datasource = Some(datasource.into());
        self
    }

    /// Add a target.
    pub fn target<F>(mut self, f: F) -> Self
    where
        F: FnOnce(TargetBuilder) -> TargetBuilder,
    {
        self.panel.targets.push(f(TargetBuilder::default()).build());
        self
    }

    /// Add a y axis.
    pub fn y_axis(mut self, format: impl Into<String>, label: Option<&str>) -> Self {
        self.panel.y_axes.push(YAxis {
            format: format.into(),
            label: label.map(str::to_string),
        });
        self
    }

    /// Show a sparkline behind the gauge value.
    pub fn sparkline(mut self, line_color: Option<&str>, fill_color: Option<&str>) -> Self {
        self.panel.sparkline = Some(SparklineOptions {
            show: true,
            line_color: line_color.map(str::to_string),
            fill_color: fill_color.map(str::to_string),
        });
        self
    }

    /// Stack series.
    pub fn stack(mut self, stack: bool) -> Self {
        self.panel.stack = stack;
        self
    }

    /// Build the panel.
    pub fn build(self) -> Panel {
        self.panel
    }
}

/// Builder for [`Target`].
#[derive(Debug, Default)]
pub struct TargetBuilder {
    target: Target,
}

impl TargetBuilder {
    /// Set the query expression.
    pub fn expr(mut self, expr: impl Into<String>) -> Self {
        self.target.expr = expr.into();
        self
    }

    /// Set the legend template.
    pub fn legend(mut self, legend: impl Into<String>) -> Self {
        self.target.legend_format = Some(legend.into());
        self
    }

    /// Set the query reference id.
    pub fn ref_id(mut self, ref_id: impl Into<String>) -> Self {
        self.target.ref_id = Some(ref_id.into());
        self
    }

    /// Override the panel datasource for this target.
    pub fn datasource(mut self, datasource: impl Into<String>) -> Self {
        self.target.datasource = Some(datasource.into());
        self
    }

    /// Build the target.
    pub fn build(self) -> Target {
        self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let panel = Panel::builder()
            .title("CPU")
            .kind(PanelKind::Gauge)
            .datasource("prom")
            .target(|t| t.expr("up").legend("{{job}}").ref_id("A"))
            .target(|t| t.expr("down").datasource("other"))
            .y_axis("percentunit", Some("usage"))
            .build();

        assert_eq!(panel.title, "CPU");
        assert_eq!(panel.kind, PanelKind::Gauge);
        assert_eq!(panel.targets[0].legend_format.as_deref(), Some("{{job}}"));
        assert_eq!(panel.datasource_for(&panel.targets[0]), "prom");
        assert_eq!(panel.datasource_for(&panel.targets[1]), "other");
        assert_eq!(panel.unit(), "percentunit");
    }

    #[test]
    fn test_value_axis_prefers_percent() {
        let panel = Panel::builder()
            .y_axis("short", None)
            .y_axis("percent", None)
            .build();
        assert_eq!(panel.unit(), "percent");

        let plain = Panel::builder().y_axis("bytes", None).y_axis("short", None).build();
        assert_eq!(plain.unit(), "bytes");

        assert_eq!(Panel::default().unit(), "");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_grafana_graph_panel() {
        let json = r#"{
            "title": "Requests",
            "type": "graph",
            "datasource": "prometheus",
            "stack": true,
            "targets": [
                {"expr": "rate(x[5m])", "legendFormat": "{{ instance }}", "refId": "A"}
            ],
            "yaxes": [{"format": "percentunit", "label": null}, {"format": "short"}]
        }"#;

        let panel: Panel = serde_json::from_str(json).unwrap();
        assert_eq!(panel.kind, PanelKind::TimeSeries);
        assert!(panel.stack);
        assert_eq!(panel.targets[0].ref_id.as_deref(), Some("A"));
        assert_eq!(panel.y_axes.len(), 2);
        assert!(panel.y_axes[0].is_percent());
        assert_eq!(panel.y_axes[0].label, None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_singlestat_is_gauge() {
        let panel: Panel =
            serde_json::from_str(r#"{"type": "singlestat", "targets": []}"#).unwrap();
        assert_eq!(panel.kind, PanelKind::Gauge);
    }

    #[test]
    fn test_sparkline_only_for_gauges() {
        let gauge = Panel::builder()
            .kind(PanelKind::Gauge)
            .sparkline(Some("#1f78c1"), None)
            .build();
        assert!(gauge.shows_sparkline());
        assert_eq!(gauge.sparkline.as_ref().and_then(|s| s.colors()), None);

        let graph = Panel::builder().sparkline(None, None).build();
        assert!(!graph.shows_sparkline());
        assert!(!Panel::default().shows_sparkline());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_singlestat_sparkline() {
        let json = r#"{
            "type": "singlestat",
            "sparkline": {"show": true, "lineColor": "rgb(31, 120, 193)", "fillColor": "rgba(31, 118, 189, 0.18)"}
        }"#;
        let panel: Panel = serde_json::from_str(json).unwrap();
        assert!(panel.shows_sparkline());
        let colors = panel.sparkline.as_ref().and_then(|s| s.colors());
        assert_eq!(colors, Some(("rgb(31, 120, 193)", "rgba(31, 118, 189, 0.18)")));

        let hidden: Panel =
            serde_json::from_str(r#"{"type": "singlestat", "sparkline": {"show": false}}"#).unwrap();
        assert!(!hidden.shows_sparkline());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_unknown_type_fails() {
        let result = serde_json::from_str::<Panel>(r#"{"type": "heatmap"}"#);
        assert!(result.is_err());
    }
}
