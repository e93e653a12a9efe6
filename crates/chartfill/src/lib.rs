#![forbid(unsafe_code)]

//! `chartfill` hydrates web pages with server-rendered charts.
//!
//! Pages carry Chart.js style descriptors as JSON in data attributes.
//! [`page::hydrate_sync`] finds them, applies the default palette and
//! options, renders deterministic SVG and replaces each mount's contents,
//! with no browser involved.
//!
//! ```
//! use chartfill::page::Hydrator;
//!
//! let html = r#"<div class="chart-placeholder"
//!     data-chart-json='{"type": "bar", "title": "Visits",
//!                       "labels": ["Mon", "Tue"],
//!                       "datasets": [{"label": "Visits", "data": [120, 80]}]}'>
//!     Loading chart...
//! </div>"#;
//! let page = Hydrator::new().hydrate_sync(html)?;
//! assert!(page.contains("<svg id=\"chartfill-0\""));
//! assert!(!page.contains("Loading chart"));
//! # Ok::<(), chartfill::page::PageError>(())
//! ```
//!
//! # Features
//!
//! - `raster`: PNG/JPG/PDF output via pure-Rust SVG rasterization
//!   (`chartfill::render::raster`)

pub use chartfill_core::*;

pub mod page;
pub mod ready;

pub mod render {
    pub use chartfill_render::text::{
        DeterministicTextMeasurer, TextMeasurer, TextMetrics, TextStyle,
    };
    pub use chartfill_render::{DEFAULT_SIZE, RenderOptions, render_chart_svg};

    #[cfg(feature = "raster")]
    pub mod raster;
}
