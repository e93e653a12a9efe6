//! Cartesian chart bodies: grouped bars and category lines.
//!
//! The x axis is a category band, the y axis a linear scale that always
//! includes zero. Tick values follow d3-array's `ticks`: steps of 1, 2 or
//! 5 times a power of ten.

use std::fmt::Write as _;

use chartfill_core::{ChartDescriptor, ChartKind, Dataset, palette_color};

use crate::RenderOptions;
use crate::svg::{self, color_at, escape_xml, fmt};
use crate::text::TextStyle;

const Y_TICK_COUNT: usize = 10;
const GRID_COLOR: &str = "#e5e5e5";
const AXIS_COLOR: &str = "#c0c0c0";
const LABEL_COLOR: &str = "#666666";
const AXIS_FONT_SIZE: f64 = 11.0;
const LABEL_PADDING: f64 = 8.0;
const X_LABEL_BAND: f64 = 22.0;
const BAR_GROUP_RATIO: f64 = 0.7;
const LINE_STROKE_WIDTH: f64 = 3.0;
const POINT_RADIUS: f64 = 3.0;
const PLOT_TOP_GAP: f64 = 4.0;

struct PlotArea {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
    lo: f64,
    hi: f64,
}

impl PlotArea {
    fn y(&self, value: f64) -> f64 {
        let t = (value - self.lo) / (self.hi - self.lo);
        self.bottom - t * (self.bottom - self.top)
    }
}

pub(crate) fn render_cartesian(chart: &ChartDescriptor, options: &RenderOptions) -> String {
    let width = options.width.max(1.0);
    let height = options.height.max(1.0);
    let mut out = String::new();
    svg::open_svg(&mut out, &options.chart_id, width, height);
    svg::push_background(&mut out, chart, width, height);
    let body_top = svg::push_frame_top(&mut out, chart, options.text_measurer.as_ref(), width);

    // The x axis is a band per label; data past the last label is dropped.
    let slots = chart.labels.len();
    if slots == 0 {
        svg::close_svg(&mut out);
        return out;
    }

    let (lo, hi) = value_domain(&chart.datasets);
    let ticks = nice_ticks(lo, hi, Y_TICK_COUNT);
    let tick_style = TextStyle::sized(AXIS_FONT_SIZE);
    let tick_labels: Vec<String> = ticks.iter().map(|t| format!("{t}")).collect();
    let max_tick_width = tick_labels
        .iter()
        .map(|label| options.text_measurer.measure(label, &tick_style).width)
        .fold(0.0, f64::max);

    let left = svg::PADDING + max_tick_width + LABEL_PADDING;
    let top = body_top + PLOT_TOP_GAP;
    let area = PlotArea {
        left,
        right: (width - svg::PADDING).max(left + 1.0),
        top,
        bottom: (height - svg::PADDING - X_LABEL_BAND).max(top + 1.0),
        lo,
        hi,
    };
    let banded = matches!(chart.kind, ChartKind::Bar);

    push_grid(&mut out, &area, &ticks, &tick_labels);
    push_axes(&mut out, &area);
    push_x_labels(&mut out, chart, &area, slots, banded);
    if banded {
        push_bars(&mut out, chart, &area, slots);
    } else {
        push_lines(&mut out, chart, &area, slots);
    }

    svg::close_svg(&mut out);
    out
}

/// The value domain always contains zero; a zero span widens to a unit
/// domain so the scale never collapses.
fn value_domain(datasets: &[Dataset]) -> (f64, f64) {
    let mut lo = 0.0f64;
    let mut hi = 0.0f64;
    let mut seen = false;
    for value in datasets.iter().flat_map(|d| d.data.iter().copied()) {
        if !value.is_finite() {
            continue;
        }
        lo = lo.min(value);
        hi = hi.max(value);
        seen = true;
    }
    if !seen {
        return (0.0, 1.0);
    }
    if hi <= lo {
        hi = lo + 1.0;
    }
    (lo, hi)
}

/// Bars sit centered in band slots; lines spread edge to edge, with a
/// single point landing in the middle.
fn slot_center(area: &PlotArea, slots: usize, index: usize, banded: bool) -> f64 {
    let span = area.right - area.left;
    if banded {
        let step = span / slots as f64;
        area.left + (index as f64 + 0.5) * step
    } else if slots == 1 {
        area.left + span / 2.0
    } else {
        area.left + index as f64 * (span / (slots - 1) as f64)
    }
}

fn push_grid(out: &mut String, area: &PlotArea, ticks: &[f64], labels: &[String]) {
    for (tick, label) in ticks.iter().zip(labels) {
        let y = area.y(*tick);
        let _ = write!(
            out,
            r#"<path class="grid-line" d="M {},{y} L {},{y}" stroke="{GRID_COLOR}" fill="none"/>"#,
            fmt(area.left),
            fmt(area.right),
            y = fmt(y)
        );
        let _ = write!(
            out,
            r#"<text class="tick-label" x="{}" y="{}" text-anchor="end" font-size="{}" fill="{LABEL_COLOR}">{}</text>"#,
            fmt(area.left - 6.0),
            fmt(y + 3.5),
            fmt(AXIS_FONT_SIZE),
            escape_xml(label)
        );
    }
}

fn push_axes(out: &mut String, area: &PlotArea) {
    let _ = write!(
        out,
        r#"<path class="axis-line" d="M {},{y} L {},{y}" stroke="{AXIS_COLOR}" fill="none"/>"#,
        fmt(area.left),
        fmt(area.right),
        y = fmt(area.bottom)
    );
    let _ = write!(
        out,
        r#"<path class="axis-line" d="M {x},{} L {x},{}" stroke="{AXIS_COLOR}" fill="none"/>"#,
        fmt(area.top),
        fmt(area.bottom),
        x = fmt(area.left)
    );
}

fn push_x_labels(
    out: &mut String,
    chart: &ChartDescriptor,
    area: &PlotArea,
    slots: usize,
    banded: bool,
) {
    for (i, label) in chart.labels.iter().enumerate().take(slots) {
        if label.is_empty() {
            continue;
        }
        let _ = write!(
            out,
            r#"<text class="tick-label" x="{}" y="{}" text-anchor="middle" font-size="{}" fill="{LABEL_COLOR}">{}</text>"#,
            fmt(slot_center(area, slots, i, banded)),
            fmt(area.bottom + 15.0),
            fmt(AXIS_FONT_SIZE),
            escape_xml(label)
        );
    }
}

fn series_fill(dataset: &Dataset, index: usize) -> String {
    color_at(dataset.background_color.as_ref(), 0)
        .or_else(|| color_at(dataset.border_color.as_ref(), 0))
        .unwrap_or_else(|| palette_color(index).to_string())
}

fn series_stroke(dataset: &Dataset, index: usize) -> String {
    color_at(dataset.border_color.as_ref(), 0)
        .or_else(|| color_at(dataset.background_color.as_ref(), 0))
        .unwrap_or_else(|| palette_color(index).to_string())
}

fn push_bars(out: &mut String, chart: &ChartDescriptor, area: &PlotArea, slots: usize) {
    let series = chart.datasets.len();
    if series == 0 {
        return;
    }
    let step = (area.right - area.left) / slots as f64;
    let group = step * BAR_GROUP_RATIO;
    let bar = group / series as f64;
    let base = area.y(0.0);

    out.push_str(r#"<g class="chart-body">"#);
    for (j, dataset) in chart.datasets.iter().enumerate() {
        let fill = series_fill(dataset, j);
        for (i, &value) in dataset.data.iter().enumerate().take(slots) {
            if !value.is_finite() {
                continue;
            }
            let x = slot_center(area, slots, i, true) - group / 2.0 + j as f64 * bar;
            let y = area.y(value);
            let _ = write!(
                out,
                r#"<rect class="bar" x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
                fmt(x),
                fmt(y.min(base)),
                fmt(bar),
                fmt((y - base).abs()),
                escape_xml(&fill)
            );
        }
    }
    out.push_str("</g>");
}

fn push_lines(out: &mut String, chart: &ChartDescriptor, area: &PlotArea, slots: usize) {
    out.push_str(r#"<g class="chart-body">"#);
    for (j, dataset) in chart.datasets.iter().enumerate() {
        let stroke = series_stroke(dataset, j);
        let mut path = String::new();
        let mut markers = String::new();
        let mut pen_down = false;
        for (i, &value) in dataset.data.iter().enumerate().take(slots) {
            if !value.is_finite() {
                pen_down = false;
                continue;
            }
            let x = slot_center(area, slots, i, false);
            let y = area.y(value);
            let _ = write!(path, "{}{},{}", if pen_down { "L" } else { "M" }, fmt(x), fmt(y));
            pen_down = true;
            let _ = write!(
                markers,
                r#"<circle class="line-point" cx="{}" cy="{}" r="{}" fill="{}"/>"#,
                fmt(x),
                fmt(y),
                fmt(POINT_RADIUS),
                escape_xml(&stroke)
            );
        }
        if !path.is_empty() {
            let _ = write!(
                out,
                r#"<path class="line-series" d="{}" fill="none" stroke="{}" stroke-width="{}"/>"#,
                path,
                escape_xml(&stroke),
                fmt(LINE_STROKE_WIDTH)
            );
        }
        out.push_str(&markers);
    }
    out.push_str("</g>");
}

/// Nice round tick values covering `lo..=hi`, after d3-array's `ticks`.
fn nice_ticks(lo: f64, hi: f64, count: usize) -> Vec<f64> {
    if !lo.is_finite() || !hi.is_finite() || count == 0 {
        return Vec::new();
    }
    if lo == hi {
        return vec![lo];
    }
    if lo > hi {
        return Vec::new();
    }
    let Some((first, last, step)) = tick_layout(lo, hi, count as f64) else {
        return Vec::new();
    };
    (first..=last).map(|i| tick_value(i, step)).collect()
}

/// First and last tick index plus the step between ticks. A negative step
/// encodes its reciprocal, which keeps sub-unit steps exact.
fn tick_layout(lo: f64, hi: f64, count: f64) -> Option<(i64, i64, f64)> {
    let raw = (hi - lo) / count;
    if !raw.is_finite() || raw == 0.0 {
        return None;
    }
    let power = raw.log10().floor();
    let error = raw / 10f64.powf(power);
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };

    let (mut first, mut last, step) = if power < 0.0 {
        let inv = 10f64.powf(-power) / factor;
        ((lo * inv).round() as i64, (hi * inv).round() as i64, -inv)
    } else {
        let step = 10f64.powf(power) * factor;
        ((lo / step).round() as i64, (hi / step).round() as i64, step)
    };
    if tick_value(first, step) < lo {
        first += 1;
    }
    if tick_value(last, step) > hi {
        last -= 1;
    }
    if last < first && (0.5..2.0).contains(&count) {
        return tick_layout(lo, hi, count * 2.0);
    }
    if !step.is_finite() || step == 0.0 || last < first {
        return None;
    }
    Some((first, last, step))
}

fn tick_value(index: i64, step: f64) -> f64 {
    if step < 0.0 {
        index as f64 / -step
    } else {
        index as f64 * step
    }
}
