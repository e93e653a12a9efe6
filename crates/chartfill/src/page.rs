//! Page integration: find chart mounts in HTML, render them, fill them in.
//!
//! Pages carry descriptors in one of two shapes: per-mount placeholders
//! (`<div class="chart-placeholder" data-chart-json="...">`) or a single
//! grouped payload (`<section data-charts-json='{"charts": [...]}'>`).
//! Hydration replaces each mount's contents with a fixed-size container
//! holding the rendered SVG and leaves the rest of the page byte for byte.

use std::cell::RefCell;
use std::rc::Rc;

use lol_html::html_content::ContentType;
use lol_html::{RewriteStrSettings, element, rewrite_str};
use tracing::{debug, warn};

use chartfill_core::{ChartDescriptor, ChartPayload, normalize};
use chartfill_render::{RenderOptions, render_chart_svg};

use crate::ready::ReadyQueue;

/// Class naming a single-chart mount element.
pub const PLACEHOLDER_CLASS: &str = "chart-placeholder";
/// Attribute holding one chart descriptor as JSON.
pub const CHART_ATTR: &str = "data-chart-json";
/// Attribute holding a grouped `{"charts": [...]}` payload.
pub const CHARTS_ATTR: &str = "data-charts-json";

#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error(transparent)]
    Chart(#[from] chartfill_core::Error),
    #[error("placeholder {index} has no data-chart-json attribute")]
    MissingChartData { index: usize },
    #[error("failed to rewrite page HTML")]
    Rewrite(#[from] lol_html::errors::RewritingError),
}

pub type Result<T> = std::result::Result<T, PageError>;

/// How charts are located in a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    /// Placeholder elements first; the grouped payload when none match.
    #[default]
    Auto,
    /// One mount per `.chart-placeholder` element.
    Placeholders,
    /// A single `[data-charts-json]` element holding every chart.
    Grouped,
}

/// Charts found in a page, in document order.
///
/// `mode` records which branch matched; it is never [`ScanMode::Auto`].
#[derive(Debug, Clone, PartialEq)]
pub struct PageCharts {
    pub mode: ScanMode,
    pub charts: Vec<ChartDescriptor>,
}

impl PageCharts {
    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }
}

/// Options for a full page hydration.
#[derive(Debug, Clone, Default)]
pub struct HydrateOptions {
    pub mode: ScanMode,
    pub render: RenderOptions,
}

/// Finds chart descriptors in `html` without altering it.
///
/// Attribute values are entity-decoded before JSON parsing, so both
/// `&quot;`-escaped and single-quoted raw JSON attributes work. The first
/// malformed descriptor aborts the scan.
pub fn scan_sync(html: &str, mode: ScanMode) -> Result<PageCharts> {
    let found = match mode {
        ScanMode::Placeholders => PageCharts {
            mode,
            charts: placeholder_charts(html)?,
        },
        ScanMode::Grouped => PageCharts {
            mode,
            charts: grouped_charts(html)?,
        },
        ScanMode::Auto => {
            let charts = placeholder_charts(html)?;
            if charts.is_empty() {
                let charts = grouped_charts(html)?;
                let mode = if charts.is_empty() {
                    ScanMode::Placeholders
                } else {
                    ScanMode::Grouped
                };
                PageCharts { mode, charts }
            } else {
                PageCharts {
                    mode: ScanMode::Placeholders,
                    charts,
                }
            }
        }
    };
    debug!(mode = ?found.mode, count = found.charts.len(), "page scan complete");
    Ok(found)
}

pub async fn scan(html: &str, mode: ScanMode) -> Result<PageCharts> {
    scan_sync(html, mode)
}

/// Renders every chart found in `html` and returns the page with each
/// mount's contents replaced by a fixed-size SVG container.
///
/// Pages without charts come back unchanged. The render step registers
/// on a [`ReadyQueue`] and runs when the scan result completes the
/// queue, so charts are handled in one deferred pass after scanning.
pub fn hydrate_sync(html: &str, options: &HydrateOptions) -> Result<String> {
    let found = scan_sync(html, options.mode)?;
    if found.charts.is_empty() {
        return Ok(html.to_string());
    }

    let mut gate: ReadyQueue<PageCharts> = ReadyQueue::new();
    let output: Rc<RefCell<Option<Result<String>>>> = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&output);
    let page = html.to_string();
    let render = options.render.clone();
    gate.ready(move |found: &PageCharts| {
        let mounts = render_mounts(found, &render);
        *sink.borrow_mut() = Some(inject_charts(&page, found.mode, mounts));
    });
    gate.complete(found);
    output.take().expect("ready callbacks run during complete")
}

pub async fn hydrate(html: &str, options: &HydrateOptions) -> Result<String> {
    hydrate_sync(html, options)
}

/// Bundles scan and render options for repeated page processing.
///
/// # Examples
///
/// ```
/// use chartfill::page::Hydrator;
///
/// let html = r#"<div class="chart-placeholder" data-chart-json='
///     {"type": "pie", "title": "Langs", "labels": ["Go", "Rust"],
///      "datasets": [{"label": "Langs", "data": [3, 4]}]}'></div>"#;
/// let page = Hydrator::new().hydrate_sync(html)?;
/// assert!(page.contains("<svg"));
/// # Ok::<(), chartfill::page::PageError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Hydrator {
    pub options: HydrateOptions,
}

impl Hydrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: ScanMode) -> Self {
        self.options.mode = mode;
        self
    }

    pub fn with_render_options(mut self, render: RenderOptions) -> Self {
        self.options.render = render;
        self
    }

    pub fn scan_sync(&self, html: &str) -> Result<PageCharts> {
        scan_sync(html, self.options.mode)
    }

    pub fn hydrate_sync(&self, html: &str) -> Result<String> {
        hydrate_sync(html, &self.options)
    }
}

fn placeholder_charts(html: &str) -> Result<Vec<ChartDescriptor>> {
    let raw: Rc<RefCell<Vec<Option<String>>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&raw);
    let selector = format!(".{PLACEHOLDER_CLASS}");
    let _ = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!(selector, move |el| {
                sink.borrow_mut().push(el.get_attribute(CHART_ATTR));
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    )?;

    let raw = raw.take();
    let mut charts = Vec::with_capacity(raw.len());
    for (index, attr) in raw.into_iter().enumerate() {
        let Some(attr) = attr else {
            return Err(PageError::MissingChartData { index });
        };
        charts.push(parse_chart_attr(&attr)?);
    }
    Ok(charts)
}

/// The first `[data-charts-json]` element wins; extras are ignored.
fn grouped_charts(html: &str) -> Result<Vec<ChartDescriptor>> {
    let payload: Rc<RefCell<Option<String>>> = Rc::new(RefCell::new(None));
    let ignored = Rc::new(RefCell::new(0usize));
    let sink = Rc::clone(&payload);
    let ignored_sink = Rc::clone(&ignored);
    let selector = format!("[{CHARTS_ATTR}]");
    let _ = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!(selector, move |el| {
                let mut slot = sink.borrow_mut();
                if slot.is_none() {
                    *slot = el.get_attribute(CHARTS_ATTR);
                } else {
                    *ignored_sink.borrow_mut() += 1;
                }
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    )?;

    let ignored = ignored.take();
    if ignored > 0 {
        warn!(ignored, "multiple grouped chart payloads; keeping the first");
    }
    let Some(attr) = payload.take() else {
        return Ok(Vec::new());
    };
    Ok(parse_payload_attr(&attr)?.charts)
}

fn parse_chart_attr(raw: &str) -> Result<ChartDescriptor> {
    // lol_html hands back raw attribute values, so entity-escaped JSON
    // has to be decoded before parsing.
    let json = htmlize::unescape(raw);
    Ok(ChartDescriptor::from_json_str(&json)?)
}

fn parse_payload_attr(raw: &str) -> Result<ChartPayload> {
    let json = htmlize::unescape(raw);
    Ok(ChartPayload::from_json_str(&json)?)
}

/// One HTML fragment per mount element, in document order. Grouped pages
/// have a single mount holding every chart.
fn render_mounts(found: &PageCharts, render: &RenderOptions) -> Vec<String> {
    let containers: Vec<String> = found
        .charts
        .iter()
        .enumerate()
        .map(|(index, chart)| {
            let mut chart = chart.clone();
            normalize(&mut chart);
            let options = render.clone().with_chart_id(format!("chartfill-{index}"));
            container_html(&render_chart_svg(&chart, &options), options.width, options.height)
        })
        .collect();
    match found.mode {
        ScanMode::Grouped => vec![containers.concat()],
        _ => containers,
    }
}

/// Replaces each mount's inner content with the next rendered fragment.
fn inject_charts(html: &str, mode: ScanMode, mounts: Vec<String>) -> Result<String> {
    let selector = match mode {
        ScanMode::Grouped => format!("[{CHARTS_ATTR}]"),
        // scan output never carries Auto
        _ => format!(".{PLACEHOLDER_CLASS}"),
    };
    let mut mounts = mounts.into_iter();
    Ok(rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!(selector, move |el| {
                if let Some(fragment) = mounts.next() {
                    el.set_inner_content(&fragment, ContentType::Html);
                }
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    )?)
}

/// The relative container pages reserve per chart; the SVG fills it.
fn container_html(svg: &str, width: f64, height: f64) -> String {
    format!(
        r#"<div style="position: relative; width: {}px; height: {}px;">{}</div>"#,
        px(width),
        px(height),
        svg
    )
}

fn px(v: f64) -> String {
    if v.is_finite() && v == v.trunc() {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chartfill_core::ChartKind;

    const ESCAPED_PIE: &str = r#"<div class="chart-placeholder" data-chart-json="{&quot;type&quot;: &quot;pie&quot;, &quot;title&quot;: &quot;T&quot;, &quot;labels&quot;: [&quot;a&quot;], &quot;datasets&quot;: [{&quot;data&quot;: [1]}]}"></div>"#;

    #[test]
    fn scan_decodes_entity_escaped_attributes() {
        let found = scan_sync(ESCAPED_PIE, ScanMode::Auto).unwrap();
        assert_eq!(found.mode, ScanMode::Placeholders);
        assert_eq!(found.len(), 1);
        assert_eq!(found.charts[0].kind, ChartKind::Pie);
        assert_eq!(found.charts[0].title, "T");
    }

    #[test]
    fn scan_reads_single_quoted_raw_json() {
        let html = r#"<div class="chart-placeholder" data-chart-json='{"type": "bar", "title": "B"}'></div>"#;
        let found = scan_sync(html, ScanMode::Placeholders).unwrap();
        assert_eq!(found.charts[0].kind, ChartKind::Bar);
    }

    #[test]
    fn placeholder_without_data_is_an_error_with_its_index() {
        let html = r#"
            <div class="chart-placeholder" data-chart-json='{"type": "pie"}'></div>
            <div class="chart-placeholder"></div>"#;
        let err = scan_sync(html, ScanMode::Placeholders).unwrap_err();
        assert!(matches!(err, PageError::MissingChartData { index: 1 }));
    }

    #[test]
    fn malformed_chart_json_aborts_the_scan() {
        let html = r#"<div class="chart-placeholder" data-chart-json='{"type": }'></div>"#;
        let err = scan_sync(html, ScanMode::Auto).unwrap_err();
        assert!(matches!(err, PageError::Chart(_)));
    }

    #[test]
    fn auto_falls_back_to_the_grouped_payload() {
        let html = r#"<section data-charts-json='{"charts": [{"type": "line"}, {"type": "pie"}]}'></section>"#;
        let found = scan_sync(html, ScanMode::Auto).unwrap();
        assert_eq!(found.mode, ScanMode::Grouped);
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn first_grouped_payload_wins() {
        let html = r#"
            <section data-charts-json='{"charts": [{"type": "line"}]}'></section>
            <section data-charts-json='{"charts": [{"type": "pie"}, {"type": "bar"}]}'></section>"#;
        let found = scan_sync(html, ScanMode::Grouped).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found.charts[0].kind, ChartKind::Line);
    }

    #[test]
    fn chartless_pages_come_back_untouched() {
        let html = "<html><body><p>Nothing here.</p></body></html>";
        let page = hydrate_sync(html, &HydrateOptions::default()).unwrap();
        assert_eq!(page, html);
    }

    #[test]
    fn hydrate_replaces_placeholder_contents() {
        let html = format!("{ESCAPED_PIE}<p>after</p>");
        let page = hydrate_sync(&html, &HydrateOptions::default()).unwrap();
        assert!(page.contains(r#"<div style="position: relative; width: 400px; height: 400px;">"#));
        assert!(page.contains(r#"<svg id="chartfill-0""#));
        assert!(page.ends_with("<p>after</p>"));
    }

    #[test]
    fn px_drops_fractional_zeroes() {
        assert_eq!(px(400.0), "400");
        assert_eq!(px(320.5), "320.5");
    }
}
