use chartfill::page::{HydrateOptions, ScanMode, hydrate_sync, scan_sync};
use chartfill::render::{RenderOptions, render_chart_svg};
use chartfill::{ChartDescriptor, normalize};
use criterion::{BatchSize, Criterion, criterion_group, criterion_main};

fn chart_fixtures() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "pie",
            r#"{"type": "pie", "title": "Languages",
                "labels": ["Go", "Rust", "TypeScript", "Python"],
                "datasets": [{"label": "Languages", "data": [12, 30, 8, 21]}]}"#,
        ),
        (
            "line",
            r#"{"type": "line", "title": "Posts per day",
                "labels": ["08-19", "08-20", "08-21", "08-22", "08-23", "08-24", "08-25"],
                "datasets": [{"label": "posts", "data": [3, 0, 5, 2, 7, 4, 6]}]}"#,
        ),
        (
            "bar",
            r#"{"type": "bar", "title": "Visits",
                "labels": ["Mon", "Tue", "Wed", "Thu", "Fri"],
                "datasets": [{"label": "unique", "data": [120, 95, 130, 140, 98]},
                             {"label": "returning", "data": [40, 38, 52, 49, 41]}]}"#,
        ),
    ]
}

fn page_fixture() -> String {
    let mounts: String = chart_fixtures()
        .iter()
        .map(|(_, json)| {
            format!(r#"<div class="chart-placeholder" data-chart-json='{json}'></div>"#)
        })
        .collect();
    format!("<html><body><h1>Report</h1>{mounts}</body></html>")
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");
    for (name, json) in chart_fixtures() {
        let chart = ChartDescriptor::from_json_str(json).unwrap();
        group.bench_function(name, |b| {
            b.iter_batched(
                || chart.clone(),
                |mut chart| normalize(&mut chart),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_render_svg(c: &mut Criterion) {
    let options = RenderOptions::default();
    let mut group = c.benchmark_group("render_svg");
    for (name, json) in chart_fixtures() {
        let mut chart = ChartDescriptor::from_json_str(json).unwrap();
        normalize(&mut chart);
        group.bench_function(name, |b| {
            b.iter(|| {
                let _svg = render_chart_svg(&chart, &options);
            });
        });
    }
    group.finish();
}

fn bench_scan_page(c: &mut Criterion) {
    let page = page_fixture();
    c.bench_function("scan_page", |b| {
        b.iter(|| {
            let _found = scan_sync(&page, ScanMode::Auto).unwrap();
        });
    });
}

fn bench_hydrate_page(c: &mut Criterion) {
    let page = page_fixture();
    let options = HydrateOptions::default();
    c.bench_function("hydrate_page", |b| {
        b.iter(|| {
            let _page = hydrate_sync(&page, &options).unwrap();
        });
    });
}

criterion_group!(
    benches,
    bench_normalize,
    bench_render_svg,
    bench_scan_page,
    bench_hydrate_page
);
criterion_main!(benches);
