// Artifact writer collaborator: CSV/JSON exports, the narrative text file,
// and markdown-styled console previews.

use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use crate::error::RcaError;
use crate::types::{
    ChartSeries, ComparisonExportRow, ComparisonRow, RcaExportRow, RcaResultSet, RunSummary,
};
use crate::util::format_number;

pub fn write_csv<T: Serialize>(path: &str, rows: &[T]) -> Result<(), RcaError> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &str, value: &T) -> Result<(), RcaError> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn write_text(path: &str, text: &str) -> Result<(), RcaError> {
    std::fs::write(path, text)?;
    Ok(())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

fn opt(n: Option<f64>, decimals: usize) -> String {
    n.map(|v| format_number(v, decimals)).unwrap_or_default()
}

/// Flatten the ranked result set into the fixed export schema, in priority
/// order. The canonical set itself stays in aggregation order; only the
/// export is re-sorted for readability.
pub fn result_rows(set: &RcaResultSet) -> Vec<RcaExportRow> {
    let mut rows: Vec<RcaExportRow> = set
        .rows
        .iter()
        .map(|r| RcaExportRow {
            priority: r.priority,
            section: r.section.clone(),
            label: r.label.clone(),
            pre: opt(r.pre, 2),
            post: opt(r.post, 2),
            abs_change: opt(r.abs_change, 2),
            pct_change: opt(r.pct_change, 4),
            contrib_abs: format_number(r.contrib_abs_pct, 2),
            contrib_post: format_number(r.contrib_post_pct, 2),
            impact_score: format_number(r.impact_score, 2),
        })
        .collect();
    rows.sort_by_key(|r| r.priority);
    rows
}

pub fn comparison_rows(rows: &[ComparisonRow]) -> Vec<ComparisonExportRow> {
    rows.iter()
        .map(|r| ComparisonExportRow {
            section: r.section.clone(),
            label: r.label.clone(),
            abs_change_a: format_number(r.abs_change_a, 2),
            contrib_abs_a: format_number(r.contrib_abs_a, 2),
            contrib_post_a: format_number(r.contrib_post_a, 2),
            abs_change_b: format_number(r.abs_change_b, 2),
            contrib_abs_b: format_number(r.contrib_abs_b, 2),
            contrib_post_b: format_number(r.contrib_post_b, 2),
            delta_abs_change: format_number(r.delta_abs_change, 2),
            delta_contrib_abs: format_number(r.delta_contrib_abs, 2),
            delta_contrib_post: format_number(r.delta_contrib_post, 2),
        })
        .collect()
}

pub fn run_summary(brand: &str, set: &RcaResultSet) -> RunSummary {
    let mut sections: Vec<&str> = set.rows.iter().map(|r| r.section.as_str()).collect();
    sections.sort_unstable();
    sections.dedup();
    let top_driver = set
        .rows
        .iter()
        .find(|r| r.priority == 1)
        .map(|r| r.label.clone());
    RunSummary {
        brand: brand.to_string(),
        generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        total_rows: set.len(),
        sections: sections.len(),
        tables_seen: set.report.tables_seen,
        tables_used: set.report.tables_used,
        top_driver,
    }
}

/// Persist the chart series as JSON for the external renderer.
pub fn write_chart_series(path: &str, series: &[&ChartSeries]) -> Result<(), RcaError> {
    let values: Vec<&ChartSeries> = series.to_vec();
    write_json(path, &values)
}
