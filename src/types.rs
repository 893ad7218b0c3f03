use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::grid::Cell;

/// One scored segment row of the aggregated analysis.
///
/// The originating table's full column list and raw cells are carried along
/// so the label builder and the CSV export can reach every original value,
/// not just the parsed KPI columns.
#[derive(Debug, Clone)]
pub struct RcaRow {
    /// Header name of the originating table's first column, e.g. "Handset Type".
    pub section: String,
    /// The row's own value in that first column, e.g. "Smartphone".
    pub segment: String,
    pub columns: Vec<String>,
    pub cells: Vec<Cell>,
    pub pre: Option<f64>,
    pub post: Option<f64>,
    pub abs_change: Option<f64>,
    /// Period-over-period change as stored in the sheet: a fraction, not a
    /// percentage. Rendering multiplies by 100.
    pub pct_change: Option<f64>,
    /// Share of the total absolute change, in percent. NaN when the total
    /// was zero or missing; such rows stay in the set but never rank.
    pub contrib_abs_pct: f64,
    /// Share of the total post-period value, in percent. Same NaN policy.
    pub contrib_post_pct: f64,
    /// `|contrib_abs_pct| + |contrib_post_pct|`; never negative for finite
    /// inputs.
    pub impact_score: f64,
    /// 1-based rank over the whole aggregated set, descending impact score,
    /// stable on ties; rows with a NaN score take the trailing ranks.
    /// 0 until the aggregator has ranked the full set.
    pub priority: usize,
    /// `"<Section>: <value>"`; empty until the label builder runs.
    pub label: String,
}

impl RcaRow {
    /// Look up this row's raw cell in a column by (de-duplicated) name.
    pub fn value_of(&self, column: &str) -> Option<&Cell> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.cells.get(i))
    }

    /// Join key used by the comparator.
    pub fn key(&self) -> String {
        format!("{} | {}", self.section, self.label)
    }
}

/// How many tables the aggregator saw and why some were skipped. The skip
/// counts are diagnostics, not failures.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AggregateReport {
    pub tables_seen: usize,
    pub tables_used: usize,
    pub skipped_no_header: usize,
    pub skipped_missing_columns: usize,
}

/// The aggregated, ranked analysis of one sheet. Immutable once produced;
/// downstream transforms copy what they need.
#[derive(Debug, Clone)]
pub struct RcaResultSet {
    pub rows: Vec<RcaRow>,
    pub report: AggregateReport,
}

impl RcaResultSet {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Presentation-only sign rule: rows whose canonical identity (section name
/// or raw segment value) contains `marker` have their change figures
/// multiplied by `multiplier` in charts and narrative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignRule {
    pub marker: String,
    pub multiplier: f64,
}

/// Transient business-view projection of one row. Never merged back into
/// the canonical result set.
#[derive(Debug, Clone)]
pub struct BusinessRow {
    pub section: String,
    pub label: String,
    pub abs_change: Option<f64>,
    pub contrib_abs_pct: f64,
    pub pct_change: Option<f64>,
}

/// One bar chart worth of data for an external renderer.
#[derive(Debug, Clone, Serialize)]
pub struct ChartSeries {
    pub title: String,
    pub color: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

/// One joined row of the two-file comparison. A side missing the key holds
/// zeros, never NaN.
#[derive(Debug, Clone)]
pub struct ComparisonRow {
    pub key: String,
    pub section: String,
    pub label: String,
    pub abs_change_a: f64,
    pub contrib_abs_a: f64,
    pub contrib_post_a: f64,
    pub abs_change_b: f64,
    pub contrib_abs_b: f64,
    pub contrib_post_b: f64,
    pub delta_abs_change: f64,
    pub delta_contrib_abs: f64,
    pub delta_contrib_post: f64,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RcaExportRow {
    #[serde(rename = "RCA Priority")]
    #[tabled(rename = "RCA Priority")]
    pub priority: usize,
    #[serde(rename = "Section")]
    #[tabled(rename = "Section")]
    pub section: String,
    #[serde(rename = "KPI Segment Label")]
    #[tabled(rename = "KPI Segment Label")]
    pub label: String,
    #[serde(rename = "Pre")]
    #[tabled(rename = "Pre")]
    pub pre: String,
    #[serde(rename = "Post")]
    #[tabled(rename = "Post")]
    pub post: String,
    #[serde(rename = "Absolute Change")]
    #[tabled(rename = "Absolute Change")]
    pub abs_change: String,
    #[serde(rename = "% Change")]
    #[tabled(rename = "% Change")]
    pub pct_change: String,
    #[serde(rename = "Contribution to Absolute Change (%)")]
    #[tabled(rename = "Contribution to Absolute Change (%)")]
    pub contrib_abs: String,
    #[serde(rename = "Contribution to Post (%)")]
    #[tabled(rename = "Contribution to Post (%)")]
    pub contrib_post: String,
    #[serde(rename = "Combined Impact Score")]
    #[tabled(rename = "Combined Impact Score")]
    pub impact_score: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ComparisonExportRow {
    #[serde(rename = "Section")]
    #[tabled(rename = "Section")]
    pub section: String,
    #[serde(rename = "KPI Segment Label")]
    #[tabled(rename = "KPI Segment Label")]
    pub label: String,
    #[serde(rename = "AbsChange_A")]
    #[tabled(rename = "AbsChange_A")]
    pub abs_change_a: String,
    #[serde(rename = "ContribAbs_A")]
    #[tabled(rename = "ContribAbs_A")]
    pub contrib_abs_a: String,
    #[serde(rename = "ContribPost_A")]
    #[tabled(rename = "ContribPost_A")]
    pub contrib_post_a: String,
    #[serde(rename = "AbsChange_B")]
    #[tabled(rename = "AbsChange_B")]
    pub abs_change_b: String,
    #[serde(rename = "ContribAbs_B")]
    #[tabled(rename = "ContribAbs_B")]
    pub contrib_abs_b: String,
    #[serde(rename = "ContribPost_B")]
    #[tabled(rename = "ContribPost_B")]
    pub contrib_post_b: String,
    #[serde(rename = "Delta_AbsChange")]
    #[tabled(rename = "Delta_AbsChange")]
    pub delta_abs_change: String,
    #[serde(rename = "Delta_ContribAbs")]
    #[tabled(rename = "Delta_ContribAbs")]
    pub delta_contrib_abs: String,
    #[serde(rename = "Delta_ContribPost")]
    #[tabled(rename = "Delta_ContribPost")]
    pub delta_contrib_post: String,
}

/// Run metadata written next to the exports.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub brand: String,
    pub generated_at: String,
    pub total_rows: usize,
    pub sections: usize,
    pub tables_seen: usize,
    pub tables_used: usize,
    pub top_driver: Option<String>,
}
