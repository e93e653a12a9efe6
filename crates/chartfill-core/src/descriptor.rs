//! The wire model for charts.
//!
//! Servers emit descriptors in the flat shape `{type, title, labels,
//! datasets}`, either one per mount element or grouped under
//! `{"charts": [...]}`. Color fields use the Chart.js camelCase names so
//! descriptors round-trip against existing emitters.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::options::CANVAS_BACKGROUND_COLOR;

/// Chart kind, as carried by the wire `type` field.
///
/// Unrecognized strings round-trip through [`ChartKind::Other`] and are
/// treated as cartesian everywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChartKind {
    Doughnut,
    Pie,
    Line,
    Bar,
    Other(String),
}

impl ChartKind {
    pub fn as_str(&self) -> &str {
        match self {
            ChartKind::Doughnut => "doughnut",
            ChartKind::Pie => "pie",
            ChartKind::Line => "line",
            ChartKind::Bar => "bar",
            ChartKind::Other(s) => s,
        }
    }

    /// Pie-family charts slice the first dataset per label; everything
    /// else colors per dataset.
    pub fn is_circular(&self) -> bool {
        matches!(self, ChartKind::Doughnut | ChartKind::Pie)
    }
}

impl From<String> for ChartKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "doughnut" => ChartKind::Doughnut,
            "pie" => ChartKind::Pie,
            "line" => ChartKind::Line,
            "bar" => ChartKind::Bar,
            _ => ChartKind::Other(s),
        }
    }
}

impl From<ChartKind> for String {
    fn from(kind: ChartKind) -> Self {
        kind.as_str().to_string()
    }
}

/// A dataset color: one color for the whole series, or one per data point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorValue {
    Single(String),
    PerPoint(Vec<String>),
}

impl ColorValue {
    /// Color applying to the `index`-th point of the series.
    pub fn color_at(&self, index: usize) -> Option<&str> {
        match self {
            ColorValue::Single(color) => Some(color.as_str()),
            ColorValue::PerPoint(colors) => colors.get(index).map(String::as_str),
        }
    }

    /// An empty string counts as unset; an explicit empty list does not.
    pub fn is_set(&self) -> bool {
        match self {
            ColorValue::Single(color) => !color.is_empty(),
            ColorValue::PerPoint(_) => true,
        }
    }
}

/// One data series.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub data: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<ColorValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<ColorValue>,
}

impl Dataset {
    pub fn new(label: impl Into<String>, data: Vec<f64>) -> Self {
        Self {
            label: Some(label.into()),
            data,
            ..Self::default()
        }
    }

    /// True when the series brings its own border or background color.
    pub fn has_preset_color(&self) -> bool {
        self.border_color.as_ref().is_some_and(ColorValue::is_set)
            || self.background_color.as_ref().is_some_and(ColorValue::is_set)
    }
}

/// Inline plugin entries attached to a normalized chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "id")]
pub enum PluginSpec {
    /// Paints the whole canvas in a solid color before the chart draws.
    #[serde(rename = "custom_canvas_background_color")]
    CanvasBackground { color: String },
}

impl PluginSpec {
    /// The white canvas every normalized chart carries.
    pub fn white_canvas() -> Self {
        PluginSpec::CanvasBackground {
            color: CANVAS_BACKGROUND_COLOR.to_string(),
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            PluginSpec::CanvasBackground { .. } => "custom_canvas_background_color",
        }
    }
}

/// A chart as it arrives off the wire.
///
/// `options` and `plugins` are produced by [`normalize`](crate::normalize)
/// and are never read from the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDescriptor {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub datasets: Vec<Dataset>,
    #[serde(skip)]
    pub options: Option<Value>,
    #[serde(skip)]
    pub plugins: Vec<PluginSpec>,
}

impl ChartDescriptor {
    pub fn new(kind: ChartKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            labels: Vec::new(),
            datasets: Vec::new(),
            options: None,
            plugins: Vec::new(),
        }
    }

    /// Parses one descriptor from its wire JSON.
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// The fully assembled configuration object:
    /// `{type, data: {labels, datasets}, options, plugins}`.
    pub fn config_value(&self) -> Result<Value> {
        let mut data = Map::new();
        data.insert("labels".into(), serde_json::to_value(&self.labels)?);
        data.insert("datasets".into(), serde_json::to_value(&self.datasets)?);

        let mut config = Map::new();
        config.insert("type".into(), Value::String(self.kind.as_str().to_string()));
        config.insert("data".into(), Value::Object(data));
        config.insert("options".into(), self.options.clone().unwrap_or(Value::Null));
        config.insert("plugins".into(), serde_json::to_value(&self.plugins)?);
        Ok(Value::Object(config))
    }

    /// The plugin-requested canvas color, if any.
    pub fn canvas_background(&self) -> Option<&str> {
        self.plugins.iter().find_map(|plugin| match plugin {
            PluginSpec::CanvasBackground { color } => Some(color.as_str()),
        })
    }
}

/// The grouped wire shape: `{"charts": [...]}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartPayload {
    #[serde(default)]
    pub charts: Vec<ChartDescriptor>,
}

impl ChartPayload {
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize;

    #[test]
    fn parses_wire_shape_with_camel_case_colors() {
        let chart = ChartDescriptor::from_json_str(
            r##"{
                "type": "line",
                "title": "Posts per day",
                "labels": ["08-24", "08-25"],
                "datasets": [
                    {"label": "posts", "data": [3, 7], "borderColor": "#ff0000"}
                ]
            }"##,
        )
        .unwrap();

        assert_eq!(chart.kind, ChartKind::Line);
        assert_eq!(chart.title, "Posts per day");
        assert_eq!(chart.labels, vec!["08-24", "08-25"]);
        assert_eq!(chart.datasets.len(), 1);
        assert_eq!(
            chart.datasets[0].border_color,
            Some(ColorValue::Single("#ff0000".to_string()))
        );
        assert_eq!(chart.datasets[0].background_color, None);
        assert!(chart.options.is_none());
        assert!(chart.plugins.is_empty());
    }

    #[test]
    fn missing_type_is_an_error() {
        let err = ChartDescriptor::from_json_str(r#"{"title": "x"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn unknown_kind_round_trips() {
        let chart = ChartDescriptor::from_json_str(r#"{"type": "radar"}"#).unwrap();
        assert_eq!(chart.kind, ChartKind::Other("radar".to_string()));
        assert!(!chart.kind.is_circular());
        let back = serde_json::to_value(&chart).unwrap();
        assert_eq!(back["type"], "radar");
    }

    #[test]
    fn empty_string_color_counts_as_unset() {
        let unset = ColorValue::Single(String::new());
        assert!(!unset.is_set());
        assert!(ColorValue::Single("#fff".to_string()).is_set());
        assert!(ColorValue::PerPoint(Vec::new()).is_set());
    }

    #[test]
    fn grouped_payload_parses_in_order() {
        let payload = ChartPayload::from_json_str(
            r#"{"charts": [
                {"type": "pie", "title": "A"},
                {"type": "bar", "title": "B"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(payload.charts.len(), 2);
        assert_eq!(payload.charts[0].title, "A");
        assert_eq!(payload.charts[1].title, "B");
    }

    #[test]
    fn config_value_keeps_the_assembled_shape_and_key_order() {
        let mut chart = ChartDescriptor::new(ChartKind::Pie, "Langs");
        chart.labels = vec!["Go".to_string(), "Rust".to_string()];
        chart.datasets = vec![Dataset::new("Langs", vec![3.0, 4.0])];
        normalize(&mut chart);

        let config = chart.config_value().unwrap();
        let text = serde_json::to_string(&config).unwrap();
        assert!(text.starts_with(r#"{"type":"pie","data":{"labels":"#));
        assert_eq!(config["data"]["labels"][1], "Rust");
        assert_eq!(config["options"]["responsive"], true);
        assert_eq!(config["options"]["plugins"]["title"]["text"], "Langs");
        assert_eq!(config["plugins"][0]["id"], "custom_canvas_background_color");
        assert_eq!(config["plugins"][0]["color"], "#ffffff");
    }

    #[test]
    fn plugin_spec_serializes_with_id_tag() {
        let plugin = PluginSpec::white_canvas();
        let value = serde_json::to_value(&plugin).unwrap();
        assert_eq!(value["id"], "custom_canvas_background_color");
        assert_eq!(value["color"], "#ffffff");
        assert_eq!(plugin.id(), "custom_canvas_background_color");
    }
}
