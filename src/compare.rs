// Two-file comparison: outer join of labeled result sets on segment
// identity, contribution/change deltas, magnitude sort.

use std::collections::HashMap;

use crate::error::RcaError;
use crate::types::{ComparisonRow, RcaResultSet};
use crate::util::format_signed;

#[derive(Clone, Copy, Default)]
struct Side {
    abs_change: f64,
    contrib_abs: f64,
    contrib_post: f64,
}

/// Collapse one labeled result set into key -> values, first occurrence
/// winning, preserving first-appearance key order. Non-finite inputs (NaN
/// contributions from a zero denominator) are folded to 0 here: the
/// comparison is a presentation over two already-published analyses, and a
/// non-rankable row contributes nothing to either side.
fn index_side(set: &RcaResultSet) -> (Vec<(String, String, String)>, HashMap<String, Side>) {
    let finite = |v: f64| if v.is_finite() { v } else { 0.0 };
    let mut order: Vec<(String, String, String)> = Vec::new();
    let mut values: HashMap<String, Side> = HashMap::new();
    for row in &set.rows {
        let key = row.key();
        if values.contains_key(&key) {
            continue;
        }
        values.insert(
            key.clone(),
            Side {
                abs_change: finite(row.abs_change.unwrap_or_default()),
                contrib_abs: finite(row.contrib_abs_pct),
                contrib_post: finite(row.contrib_post_pct),
            },
        );
        order.push((key, row.section.clone(), row.label.clone()));
    }
    (order, values)
}

/// Outer-join two labeled result sets on `(Section, KPI Segment Label)` and
/// rank the joined rows by how much the contribution moved.
///
/// Every key present on either side appears exactly once; a missing side
/// holds zeros. Deltas are A − B. Rows are sorted by `|Delta_ContribAbs|`
/// descending, ties keeping join order (all of A's keys in A order, then
/// B-only keys in B order).
///
/// Either input being empty is a caller error: a one-sided "comparison"
/// would silently read as a real delta profile.
pub fn compare(
    a: &RcaResultSet,
    b: &RcaResultSet,
) -> Result<Vec<ComparisonRow>, RcaError> {
    if a.is_empty() {
        return Err(RcaError::ComparisonPrecondition("first"));
    }
    if b.is_empty() {
        return Err(RcaError::ComparisonPrecondition("second"));
    }

    let (order_a, values_a) = index_side(a);
    let (order_b, values_b) = index_side(b);

    let mut keys = order_a;
    for entry in order_b {
        if !values_a.contains_key(&entry.0) {
            keys.push(entry);
        }
    }

    let mut rows: Vec<ComparisonRow> = keys
        .into_iter()
        .map(|(key, section, label)| {
            let va = values_a.get(&key).copied().unwrap_or_default();
            let vb = values_b.get(&key).copied().unwrap_or_default();
            ComparisonRow {
                key,
                section,
                label,
                abs_change_a: va.abs_change,
                contrib_abs_a: va.contrib_abs,
                contrib_post_a: va.contrib_post,
                abs_change_b: vb.abs_change,
                contrib_abs_b: vb.contrib_abs,
                contrib_post_b: vb.contrib_post,
                delta_abs_change: va.abs_change - vb.abs_change,
                delta_contrib_abs: va.contrib_abs - vb.contrib_abs,
                delta_contrib_post: va.contrib_post - vb.contrib_post,
            }
        })
        .collect();

    rows.sort_by(|x, y| {
        y.delta_contrib_abs
            .abs()
            .partial_cmp(&x.delta_contrib_abs.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Ok(rows)
}

/// One console line per top comparison row, brand names spelled out.
pub fn insights(rows: &[ComparisonRow], brand_a: &str, brand_b: &str, top_n: usize) -> String {
    rows.iter()
        .take(top_n)
        .map(|row| {
            format!(
                "{}: {} Contrib={}%, {} Contrib={}%, \u{394}AbsChange={}, \u{394}Contribution={} pts",
                row.label,
                brand_a,
                format_signed(row.contrib_abs_a, 2),
                brand_b,
                format_signed(row.contrib_abs_b, 2),
                format_signed(row.delta_abs_change, 0),
                format_signed(row.delta_contrib_abs, 2),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
