//! Completing wire descriptors into full chart configurations.

use crate::descriptor::{ChartDescriptor, ColorValue, PluginSpec};
use crate::options::options_template;
use crate::palette::palette_color;

/// Completes a descriptor in place: default colors, the fixed options
/// template, and the canvas background plugin.
///
/// Deterministic and idempotent; dataset and label order never change.
/// Label/data length mismatches pass through untouched and surface as
/// rendering artifacts, never as errors here.
pub fn normalize(chart: &mut ChartDescriptor) {
    assign_default_colors(chart);
    chart.options = Some(options_template(&chart.title));
    chart.plugins = vec![PluginSpec::white_canvas()];
}

fn assign_default_colors(chart: &mut ChartDescriptor) {
    if chart.kind.is_circular() {
        // One color per slice on the first dataset, cycling the palette.
        // Preset colors on that dataset are replaced; datasets past the
        // first are not touched.
        let colors: Vec<String> = (0..chart.labels.len())
            .map(|i| palette_color(i).to_string())
            .collect();
        if let Some(first) = chart.datasets.first_mut() {
            first.border_color = Some(ColorValue::PerPoint(colors.clone()));
            first.background_color = Some(ColorValue::PerPoint(colors));
        }
    } else {
        // One color per dataset, only where the series brings neither a
        // border nor a background color of its own.
        for (i, dataset) in chart.datasets.iter_mut().enumerate() {
            if dataset.has_preset_color() {
                continue;
            }
            let color = palette_color(i).to_string();
            dataset.border_color = Some(ColorValue::Single(color.clone()));
            dataset.background_color = Some(ColorValue::Single(color));
        }
    }
}
