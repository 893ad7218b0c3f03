// Business-view projection for charts and narrative.
//
// A small set of segments (multi-SIM churn indicators for two brands) reads
// inverted in business terms: an "increase" there is a loss. Charts and
// narrative must show those rows sign-flipped while the canonical analysis
// keeps the arithmetic truth. The flip is driven by an explicit rule table
// matched against canonical segment identity (section name and raw category
// value), not against the formatted label, so label cosmetics cannot change
// which rows invert.

use crate::error::RcaError;
use crate::types::{BusinessRow, ChartSeries, RcaResultSet, RcaRow, SignRule};

pub const POSITIVE_CHART_TITLE: &str = "Top Positive Revenue Drivers";
pub const NEGATIVE_CHART_TITLE: &str = "Top Negative Revenue Drivers";
pub const POSITIVE_COLOR: &str = "green";
pub const NEGATIVE_COLOR: &str = "red";

/// Validated sign-rule table. Construct once, share between the chart and
/// narrative call sites so both apply the identical transform.
#[derive(Debug, Clone)]
pub struct BusinessView {
    rules: Vec<SignRule>,
}

impl BusinessView {
    /// Validate and freeze the rule table. Rules with an empty marker or a
    /// multiplier other than exactly 1 or -1 are configuration mistakes and
    /// are rejected up front instead of silently matching nothing.
    pub fn new(rules: Vec<SignRule>) -> Result<Self, RcaError> {
        for rule in &rules {
            if rule.marker.trim().is_empty() {
                return Err(RcaError::Config("sign rule with an empty marker".into()));
            }
            if rule.multiplier != 1.0 && rule.multiplier != -1.0 {
                return Err(RcaError::Config(format!(
                    "sign rule '{}' has multiplier {}, expected 1 or -1",
                    rule.marker, rule.multiplier
                )));
            }
        }
        Ok(BusinessView { rules })
    }

    fn multiplier_for(&self, row: &RcaRow) -> f64 {
        self.rules
            .iter()
            .find(|r| row.section.contains(&r.marker) || row.segment.contains(&r.marker))
            .map(|r| r.multiplier)
            .unwrap_or(1.0)
    }

    /// Project one canonical row into its presentation view. The input row
    /// is untouched; applying this to the same canonical row any number of
    /// times yields the same projection.
    pub fn apply(&self, row: &RcaRow) -> BusinessRow {
        let m = self.multiplier_for(row);
        BusinessRow {
            section: row.section.clone(),
            label: row.label.clone(),
            abs_change: row.abs_change.map(|v| v * m),
            contrib_abs_pct: row.contrib_abs_pct * m,
            pct_change: row.pct_change,
        }
    }

    pub fn apply_all(&self, set: &RcaResultSet) -> Vec<BusinessRow> {
        set.rows.iter().map(|r| self.apply(r)).collect()
    }
}

/// Build the positive- and negative-driver chart series from business-view
/// rows: top `top_n` by view contribution on each side, NaN rows excluded.
pub fn chart_series(rows: &[BusinessRow], top_n: usize) -> (ChartSeries, ChartSeries) {
    let mut pos: Vec<&BusinessRow> = rows
        .iter()
        .filter(|r| r.contrib_abs_pct.is_finite() && r.contrib_abs_pct > 0.0)
        .collect();
    pos.sort_by(|a, b| {
        b.contrib_abs_pct
            .partial_cmp(&a.contrib_abs_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    pos.truncate(top_n);

    let mut neg: Vec<&BusinessRow> = rows
        .iter()
        .filter(|r| r.contrib_abs_pct.is_finite() && r.contrib_abs_pct < 0.0)
        .collect();
    neg.sort_by(|a, b| {
        a.contrib_abs_pct
            .partial_cmp(&b.contrib_abs_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    neg.truncate(top_n);

    let series = |rows: &[&BusinessRow], title: &str, color: &str| ChartSeries {
        title: title.to_string(),
        color: color.to_string(),
        labels: rows.iter().map(|r| r.label.clone()).collect(),
        values: rows.iter().map(|r| r.contrib_abs_pct).collect(),
    };
    (
        series(&pos, POSITIVE_CHART_TITLE, POSITIVE_COLOR),
        series(&neg, NEGATIVE_CHART_TITLE, NEGATIVE_COLOR),
    )
}
