use chartfill_core::{ChartDescriptor, ChartKind, Dataset, PALETTE, normalize};
use chartfill_render::{RenderOptions, render_chart_svg};

fn class_has_token(class: Option<&str>, token: &str) -> bool {
    class
        .unwrap_or_default()
        .split_whitespace()
        .any(|t| t == token)
}

fn language_pie() -> ChartDescriptor {
    let mut chart = ChartDescriptor::new(ChartKind::Pie, "Languages");
    chart.labels = vec!["Go".to_string(), "Rust".to_string(), "Zig".to_string()];
    chart.datasets = vec![Dataset::new("Languages", vec![5.0, 3.0, 2.0])];
    normalize(&mut chart);
    chart
}

#[test]
fn pie_svg_is_well_formed_with_one_slice_per_label() {
    let svg = render_chart_svg(&language_pie(), &RenderOptions::default());
    let doc = roxmltree::Document::parse(&svg).expect("well-formed svg");

    let root = doc.root_element();
    assert_eq!(root.tag_name().name(), "svg");
    assert_eq!(root.attribute("id"), Some("chartfill"));
    assert_eq!(root.attribute("width"), Some("400"));
    assert_eq!(root.attribute("height"), Some("400"));
    assert_eq!(root.attribute("viewBox"), Some("0 0 400 400"));

    let background = doc
        .descendants()
        .find(|n| n.is_element() && class_has_token(n.attribute("class"), "canvas-background"))
        .expect("background rect");
    assert_eq!(background.attribute("fill"), Some("#ffffff"));

    let slices: Vec<_> = doc
        .descendants()
        .filter(|n| {
            n.is_element()
                && n.tag_name().name() == "path"
                && n.attribute("stroke") == Some("#fff")
        })
        .collect();
    assert_eq!(slices.len(), 3);
    for (i, slice) in slices.iter().enumerate() {
        assert_eq!(slice.attribute("fill"), Some(PALETTE[i]));
    }
}

#[test]
fn pie_svg_carries_title_and_legend() {
    let svg = render_chart_svg(&language_pie(), &RenderOptions::default());
    let doc = roxmltree::Document::parse(&svg).expect("well-formed svg");

    let title = doc
        .descendants()
        .find(|n| n.is_element() && class_has_token(n.attribute("class"), "chart-title"))
        .expect("title text");
    assert_eq!(title.text(), Some("Languages"));

    let items: Vec<_> = doc
        .descendants()
        .filter(|n| n.is_element() && class_has_token(n.attribute("class"), "legend-item"))
        .collect();
    assert_eq!(items.len(), 3);
    let labels: Vec<_> = items
        .iter()
        .map(|item| {
            item.descendants()
                .find(|n| n.is_element() && n.tag_name().name() == "text")
                .and_then(|n| n.text())
                .expect("legend label")
        })
        .collect();
    assert_eq!(labels, vec!["Go", "Rust", "Zig"]);
}

#[test]
fn doughnut_uses_annular_paths() {
    let mut chart = language_pie();
    chart.kind = ChartKind::Doughnut;
    let svg = render_chart_svg(&chart, &RenderOptions::default());
    let doc = roxmltree::Document::parse(&svg).expect("well-formed svg");

    for path in doc.descendants().filter(|n| {
        n.is_element() && n.tag_name().name() == "path" && n.attribute("stroke") == Some("#fff")
    }) {
        let d = path.attribute("d").expect("path data");
        assert_eq!(d.matches('A').count(), 2, "annular sector: {d}");
        assert!(!d.contains("L0,0"), "no apex in doughnut: {d}");
    }
}

#[test]
fn render_options_control_id_and_size() {
    let options = RenderOptions::default()
        .with_size(320.0, 200.0)
        .with_chart_id("chartfill-7");
    let svg = render_chart_svg(&language_pie(), &options);
    let doc = roxmltree::Document::parse(&svg).expect("well-formed svg");

    let root = doc.root_element();
    assert_eq!(root.attribute("id"), Some("chartfill-7"));
    assert_eq!(root.attribute("width"), Some("320"));
    assert_eq!(root.attribute("height"), Some("200"));
    assert_eq!(root.attribute("viewBox"), Some("0 0 320 200"));
}

#[test]
fn titles_with_markup_are_escaped() {
    let mut chart = ChartDescriptor::new(ChartKind::Pie, "<b>& \"quotes\"</b>");
    chart.labels = vec!["a".to_string()];
    chart.datasets = vec![Dataset::new("a", vec![1.0])];
    normalize(&mut chart);

    let svg = render_chart_svg(&chart, &RenderOptions::default());
    let doc = roxmltree::Document::parse(&svg).expect("escaping keeps svg well-formed");
    let title = doc
        .descendants()
        .find(|n| n.is_element() && class_has_token(n.attribute("class"), "chart-title"))
        .expect("title text");
    assert_eq!(title.text(), Some("<b>& \"quotes\"</b>"));
}
