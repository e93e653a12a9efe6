//! Descriptor builders for common aggregate shapes.
//!
//! Servers usually chart one of two things: counts per day over the last
//! week, or counts per category. These builders produce the matching
//! descriptors so callers never hand-write the wire JSON.

use chrono::{Duration, NaiveDate};

use crate::descriptor::{ChartDescriptor, ChartKind, Dataset};

/// Count of something on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyCount {
    pub day: NaiveDate,
    pub count: u64,
}

impl DailyCount {
    pub fn new(day: NaiveDate, count: u64) -> Self {
        Self { day, count }
    }
}

/// Count of something per category label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: String,
    pub count: u64,
}

impl CategoryCount {
    pub fn new(category: impl Into<String>, count: u64) -> Self {
        Self {
            category: category.into(),
            count,
        }
    }
}

/// Line chart of daily counts over the seven days ending at `today`.
///
/// Labels are `MM-DD`; days with no entry are zero-filled and entries
/// outside the window are ignored. Several entries for the same day sum.
pub fn last_week_line_chart(
    counts: &[DailyCount],
    title: &str,
    dataset_label: &str,
    today: NaiveDate,
) -> ChartDescriptor {
    let mut labels = Vec::with_capacity(7);
    let mut data = Vec::with_capacity(7);
    for offset in (0..7).rev() {
        let day = today - Duration::days(offset);
        labels.push(day.format("%m-%d").to_string());
        let total: u64 = counts
            .iter()
            .filter(|entry| entry.day == day)
            .map(|entry| entry.count)
            .sum();
        data.push(total as f64);
    }

    let mut chart = ChartDescriptor::new(ChartKind::Line, title);
    chart.labels = labels;
    chart.datasets = vec![Dataset::new(dataset_label, data)];
    chart
}

/// Pie chart of per-category counts.
///
/// Categories are emitted in ascending label order so repeated builds are
/// stable regardless of input order.
pub fn category_pie_chart(counts: &[CategoryCount], title: &str) -> ChartDescriptor {
    let mut sorted: Vec<&CategoryCount> = counts.iter().collect();
    sorted.sort_by(|a, b| a.category.cmp(&b.category));

    let mut chart = ChartDescriptor::new(ChartKind::Pie, title);
    chart.labels = sorted.iter().map(|entry| entry.category.clone()).collect();
    chart.datasets = vec![Dataset::new(
        title,
        sorted.iter().map(|entry| entry.count as f64).collect(),
    )];
    chart
}
