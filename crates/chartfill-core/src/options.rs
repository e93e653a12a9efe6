//! The fixed presentation options applied to every chart.

use serde_json::{Value, json};

/// Legends sit above the plot.
pub const LEGEND_POSITION: &str = "top";

/// Canvas color of the background plugin entry.
pub const CANVAS_BACKGROUND_COLOR: &str = "#ffffff";

/// The options template, instantiated with the chart title.
///
/// Applied as-is during normalization; caller-provided options are not
/// merged in.
pub fn options_template(title: &str) -> Value {
    json!({
        "responsive": true,
        "plugins": {
            "legend": { "position": LEGEND_POSITION },
            "title": { "display": true, "text": title }
        }
    })
}
