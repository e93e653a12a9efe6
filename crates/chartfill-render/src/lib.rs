#![forbid(unsafe_code)]

//! Deterministic SVG rendering for chart descriptors.
//!
//! Charts render into standalone SVGs sized for fixed page mounts. Layout
//! depends only on the descriptor and a pluggable [`text::TextMeasurer`],
//! never on installed fonts, so output is byte-stable across machines.
//!
//! Rendering does not fail: malformed data degrades the drawing (missing
//! slices, series clamped to the label count) instead of erroring, the
//! same way a canvas renderer would draw whatever it is given.

mod cartesian;
mod pie;
mod svg;
pub mod text;

use std::sync::Arc;

use chartfill_core::ChartDescriptor;

use crate::text::{DeterministicTextMeasurer, TextMeasurer};

/// Default mount size in CSS pixels; charts are square unless told otherwise.
pub const DEFAULT_SIZE: f64 = 400.0;

/// Knobs for a single chart rendering.
#[derive(Clone)]
pub struct RenderOptions {
    /// Outer SVG width in CSS pixels.
    pub width: f64,
    /// Outer SVG height in CSS pixels.
    pub height: f64,
    /// `id` attribute of the emitted `<svg>`.
    pub chart_id: String,
    /// Measurer used for layout decisions (legend centering, axis room).
    pub text_measurer: Arc<dyn TextMeasurer + Send + Sync>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_SIZE,
            height: DEFAULT_SIZE,
            chart_id: "chartfill".to_string(),
            text_measurer: Arc::new(DeterministicTextMeasurer::default()),
        }
    }
}

impl std::fmt::Debug for RenderOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderOptions")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("chart_id", &self.chart_id)
            .finish_non_exhaustive()
    }
}

impl RenderOptions {
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_chart_id(mut self, id: impl Into<String>) -> Self {
        self.chart_id = id.into();
        self
    }

    pub fn with_text_measurer(mut self, measurer: Arc<dyn TextMeasurer + Send + Sync>) -> Self {
        self.text_measurer = measurer;
        self
    }
}

/// Renders one descriptor to a standalone SVG document.
///
/// Circular kinds draw as pie/doughnut; `line` and unrecognized kinds draw
/// as point-marked polylines; `bar` draws grouped vertical bars. Colors
/// come from the descriptor's (normally pre-normalized) color fields and
/// fall back to the default palette, so un-normalized input still renders.
pub fn render_chart_svg(chart: &ChartDescriptor, options: &RenderOptions) -> String {
    if chart.kind.is_circular() {
        pie::render_circular(chart, options)
    } else {
        cartesian::render_cartesian(chart, options)
    }
}
