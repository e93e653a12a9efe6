//! Circular chart bodies: pie and doughnut.

use std::f64::consts::TAU;
use std::fmt::Write as _;

use chartfill_core::{ChartDescriptor, ChartKind, palette_color};

use crate::RenderOptions;
use crate::svg::{self, color_at, escape_xml, fmt};

const SLICE_STROKE: &str = "#fff";
const SLICE_STROKE_WIDTH: f64 = 2.0;
const HOLE_RATIO: f64 = 0.5;
const BODY_MARGIN: f64 = 10.0;

struct SliceLayout {
    start: f64,
    end: f64,
    fill: String,
}

pub(crate) fn render_circular(chart: &ChartDescriptor, options: &RenderOptions) -> String {
    let width = options.width.max(1.0);
    let height = options.height.max(1.0);
    let mut out = String::new();
    svg::open_svg(&mut out, &options.chart_id, width, height);
    svg::push_background(&mut out, chart, width, height);
    let body_top = svg::push_frame_top(&mut out, chart, options.text_measurer.as_ref(), width);

    let available = (height - body_top - svg::PADDING).max(0.0);
    let radius = (width.min(available) / 2.0 - BODY_MARGIN).max(1.0);
    let cx = width / 2.0;
    let cy = body_top + available / 2.0;

    let slices = layout_slices(chart);
    if !slices.is_empty() {
        let hole = match chart.kind {
            ChartKind::Doughnut => radius * HOLE_RATIO,
            _ => 0.0,
        };
        let _ = write!(
            out,
            r#"<g class="chart-body" transform="translate({},{})">"#,
            fmt(cx),
            fmt(cy)
        );
        for slice in &slices {
            let _ = write!(
                out,
                r#"<path d="{}" fill="{}" stroke="{SLICE_STROKE}" stroke-width="{}"/>"#,
                slice_path(slice.start, slice.end, radius, hole),
                escape_xml(&slice.fill),
                fmt(SLICE_STROKE_WIDTH)
            );
        }
        out.push_str("</g>");
    }

    svg::close_svg(&mut out);
    out
}

/// Angular layout over the first dataset. Slices start at twelve o'clock
/// and run clockwise; non-positive and non-finite values take no arc.
fn layout_slices(chart: &ChartDescriptor) -> Vec<SliceLayout> {
    let Some(dataset) = chart.datasets.first() else {
        return Vec::new();
    };
    let points = chart.labels.len().min(dataset.data.len());
    let total: f64 = dataset.data[..points]
        .iter()
        .filter(|v| v.is_finite() && **v > 0.0)
        .sum();
    if !(total > 0.0) {
        return Vec::new();
    }

    let mut slices = Vec::with_capacity(points);
    let mut angle = 0.0;
    for (i, &value) in dataset.data[..points].iter().enumerate() {
        if !value.is_finite() || !(value > 0.0) {
            continue;
        }
        let sweep = value / total * TAU;
        slices.push(SliceLayout {
            start: angle,
            end: angle + sweep,
            fill: color_at(dataset.background_color.as_ref(), i)
                .unwrap_or_else(|| palette_color(i).to_string()),
        });
        angle += sweep;
    }
    slices
}

/// Twelve o'clock is angle zero; angles grow clockwise.
fn polar_xy(angle: f64, radius: f64) -> (f64, f64) {
    (radius * angle.sin(), -radius * angle.cos())
}

fn slice_path(start: f64, end: f64, radius: f64, hole: f64) -> String {
    let sweep = end - start;
    if sweep >= TAU - 1e-9 {
        return full_circle_path(radius, hole);
    }
    let large = if sweep > TAU / 2.0 { 1 } else { 0 };
    let (x0, y0) = polar_xy(start, radius);
    let (x1, y1) = polar_xy(end, radius);
    if hole > 0.0 {
        let (ix0, iy0) = polar_xy(start, hole);
        let (ix1, iy1) = polar_xy(end, hole);
        format!(
            "M{},{}A{r},{r},0,{large},1,{},{}L{},{}A{h},{h},0,{large},0,{},{}Z",
            fmt(x0),
            fmt(y0),
            fmt(x1),
            fmt(y1),
            fmt(ix1),
            fmt(iy1),
            fmt(ix0),
            fmt(iy0),
            r = fmt(radius),
            h = fmt(hole)
        )
    } else {
        format!(
            "M{},{}A{r},{r},0,{large},1,{},{}L0,0Z",
            fmt(x0),
            fmt(y0),
            fmt(x1),
            fmt(y1),
            r = fmt(radius)
        )
    }
}

/// A lone arc command cannot close on itself, so full circles are drawn as
/// two half arcs. The doughnut hole is a counterclockwise inner ring that
/// the nonzero fill rule subtracts.
fn full_circle_path(radius: f64, hole: f64) -> String {
    let mut path = format!(
        "M0,{top}A{r},{r},0,1,1,0,{bottom}A{r},{r},0,1,1,0,{top}Z",
        top = fmt(-radius),
        bottom = fmt(radius),
        r = fmt(radius)
    );
    if hole > 0.0 {
        let _ = write!(
            path,
            "M0,{top}A{h},{h},0,1,0,0,{bottom}A{h},{h},0,1,0,0,{top}Z",
            top = fmt(-hole),
            bottom = fmt(hole),
            h = fmt(hole)
        );
    }
    path
}
