//! Shared SVG emission: document frame, title, legend, formatting.

use std::fmt::Write as _;

use chartfill_core::{ChartDescriptor, ColorValue, PluginSpec, palette_color};
use serde_json::Value;

use crate::text::{TextMeasurer, TextStyle};

pub(crate) const FONT_FAMILY: &str = "'Helvetica Neue', Helvetica, Arial, sans-serif";
pub(crate) const PADDING: f64 = 8.0;
pub(crate) const TITLE_FONT_SIZE: f64 = 16.0;
pub(crate) const TITLE_BAND: f64 = 26.0;
pub(crate) const LEGEND_FONT_SIZE: f64 = 12.0;
pub(crate) const LEGEND_BAND: f64 = 22.0;
const SWATCH_SIZE: f64 = 12.0;
const SWATCH_GAP: f64 = 4.0;
const ENTRY_GAP: f64 = 12.0;

pub(crate) fn open_svg(out: &mut String, id: &str, width: f64, height: f64) {
    let _ = write!(
        out,
        r#"<svg id="{}" xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="{FONT_FAMILY}">"#,
        escape_xml(id),
        w = fmt(width),
        h = fmt(height)
    );
}

pub(crate) fn close_svg(out: &mut String) {
    out.push_str("</svg>");
}

/// One full-canvas rect per background plugin entry, before anything else.
pub(crate) fn push_background(out: &mut String, chart: &ChartDescriptor, width: f64, height: f64) {
    for plugin in &chart.plugins {
        match plugin {
            PluginSpec::CanvasBackground { color } => {
                let _ = write!(
                    out,
                    r#"<rect class="canvas-background" width="{}" height="{}" fill="{}"/>"#,
                    fmt(width),
                    fmt(height),
                    escape_xml(color)
                );
            }
        }
    }
}

/// Title and legend row; returns the y where the chart body starts.
pub(crate) fn push_frame_top(
    out: &mut String,
    chart: &ChartDescriptor,
    measurer: &dyn TextMeasurer,
    width: f64,
) -> f64 {
    let mut cursor = PADDING;
    if let Some(title) = title_text(chart) {
        let _ = write!(
            out,
            r#"<text class="chart-title" x="{}" y="{}" text-anchor="middle" font-size="{}" font-weight="bold">{}</text>"#,
            fmt(width / 2.0),
            fmt(cursor + TITLE_FONT_SIZE),
            fmt(TITLE_FONT_SIZE),
            escape_xml(&title)
        );
        cursor += TITLE_BAND;
    }
    if legend_visible(chart) {
        let entries = legend_entries(chart);
        if !entries.is_empty() {
            push_legend(out, &entries, measurer, width, cursor);
            cursor += LEGEND_BAND;
        }
    }
    cursor
}

/// The title to draw, honoring the descriptor's options when present.
pub(crate) fn title_text(chart: &ChartDescriptor) -> Option<String> {
    if let Some(options) = chart.options.as_ref() {
        let display = option_at(options, "plugins.title.display")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if !display {
            return None;
        }
        let text = option_at(options, "plugins.title.text")
            .and_then(Value::as_str)
            .unwrap_or("");
        return (!text.is_empty()).then(|| text.to_string());
    }
    (!chart.title.is_empty()).then(|| chart.title.clone())
}

/// Legends draw unless the options turn them off. Only the top position is
/// laid out; other positions fall back to top.
pub(crate) fn legend_visible(chart: &ChartDescriptor) -> bool {
    let Some(options) = chart.options.as_ref() else {
        return true;
    };
    option_at(options, "plugins.legend.display")
        .and_then(Value::as_bool)
        .unwrap_or(true)
}

pub(crate) struct LegendEntry {
    pub label: String,
    pub color: String,
}

/// Circular charts list one entry per label, everything else one per
/// dataset.
pub(crate) fn legend_entries(chart: &ChartDescriptor) -> Vec<LegendEntry> {
    if chart.kind.is_circular() {
        let first = chart.datasets.first();
        chart
            .labels
            .iter()
            .enumerate()
            .map(|(i, label)| LegendEntry {
                label: label.clone(),
                color: first
                    .and_then(|d| color_at(d.background_color.as_ref(), i))
                    .unwrap_or_else(|| palette_color(i).to_string()),
            })
            .collect()
    } else {
        chart
            .datasets
            .iter()
            .enumerate()
            .map(|(i, dataset)| LegendEntry {
                label: dataset.label.clone().unwrap_or_default(),
                color: color_at(dataset.border_color.as_ref(), 0)
                    .or_else(|| color_at(dataset.background_color.as_ref(), 0))
                    .unwrap_or_else(|| palette_color(i).to_string()),
            })
            .collect()
    }
}

pub(crate) fn color_at(value: Option<&ColorValue>, index: usize) -> Option<String> {
    value
        .and_then(|colors| colors.color_at(index))
        .filter(|color| !color.is_empty())
        .map(str::to_string)
}

fn push_legend(
    out: &mut String,
    entries: &[LegendEntry],
    measurer: &dyn TextMeasurer,
    width: f64,
    top: f64,
) {
    let style = TextStyle::sized(LEGEND_FONT_SIZE);
    let widths: Vec<f64> = entries
        .iter()
        .map(|entry| SWATCH_SIZE + SWATCH_GAP + measurer.measure(&entry.label, &style).width)
        .collect();
    let total: f64 =
        widths.iter().sum::<f64>() + ENTRY_GAP * entries.len().saturating_sub(1) as f64;
    let mut x = ((width - total) / 2.0).max(PADDING);

    out.push_str(r#"<g class="chart-legend">"#);
    for (entry, entry_width) in entries.iter().zip(&widths) {
        let _ = write!(
            out,
            r#"<g class="legend-item" transform="translate({},{})"><rect width="{sw}" height="{sw}" fill="{}"/><text x="{}" y="10.5" font-size="{}">{}</text></g>"#,
            fmt(x),
            fmt(top + 3.0),
            escape_xml(&entry.color),
            fmt(SWATCH_SIZE + SWATCH_GAP),
            fmt(LEGEND_FONT_SIZE),
            escape_xml(&entry.label),
            sw = fmt(SWATCH_SIZE)
        );
        x += entry_width + ENTRY_GAP;
    }
    out.push_str("</g>");
}

/// Reads a dotted path out of an options object.
pub(crate) fn option_at<'a>(options: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = options;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

/// Numbers for SVG attributes: three decimals, trailing zeros trimmed,
/// never `-0`, non-finite collapses to `0`.
pub(crate) fn fmt(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let rounded = (v * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    if rounded == rounded.trunc() {
        return format!("{}", rounded as i64);
    }
    format!("{rounded}")
}

pub(crate) fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chartfill_core::{ChartKind, Dataset, normalize};

    #[test]
    fn fmt_trims_noise_and_never_emits_negative_zero() {
        assert_eq!(fmt(200.0), "200");
        assert_eq!(fmt(-0.0), "0");
        assert_eq!(fmt(-0.0001), "0");
        assert_eq!(fmt(12.5), "12.5");
        assert_eq!(fmt(1.0 / 3.0), "0.333");
        assert_eq!(fmt(f64::NAN), "0");
    }

    #[test]
    fn escape_xml_covers_markup_and_quotes() {
        assert_eq!(escape_xml(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn option_at_walks_dotted_paths() {
        let options = serde_json::json!({"plugins": {"legend": {"position": "top"}}});
        assert_eq!(
            option_at(&options, "plugins.legend.position").and_then(Value::as_str),
            Some("top")
        );
        assert!(option_at(&options, "plugins.title.text").is_none());
    }

    #[test]
    fn title_honors_options_over_descriptor_field() {
        let mut chart = ChartDescriptor::new(ChartKind::Line, "Raw title");
        assert_eq!(title_text(&chart).as_deref(), Some("Raw title"));

        normalize(&mut chart);
        assert_eq!(title_text(&chart).as_deref(), Some("Raw title"));

        chart.options = Some(serde_json::json!({"plugins": {"title": {"display": false}}}));
        assert_eq!(title_text(&chart), None);
    }

    #[test]
    fn legend_entries_follow_the_chart_branch() {
        let mut pie = ChartDescriptor::new(ChartKind::Pie, "p");
        pie.labels = vec!["a".to_string(), "b".to_string()];
        pie.datasets = vec![Dataset::new("s", vec![1.0, 2.0])];
        normalize(&mut pie);
        let entries = legend_entries(&pie);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].label, "a");
        assert_eq!(entries[0].color, chartfill_core::PALETTE[0]);

        let mut line = ChartDescriptor::new(ChartKind::Line, "l");
        line.labels = vec!["x".to_string()];
        line.datasets = vec![Dataset::new("first", vec![1.0]), Dataset::new("second", vec![2.0])];
        normalize(&mut line);
        let entries = legend_entries(&line);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].label, "second");
        assert_eq!(entries[1].color, chartfill_core::PALETTE[1]);
    }
}
