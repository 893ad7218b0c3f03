// Contribution calculator, per-sheet aggregator, and label builder.
//
// The calculator scores one normalized sub-table; the aggregator fans out
// over every logical table on a sheet, silently discarding the ones that do
// not look like a Pre-vs-Post breakdown, and ranks the combined rows.

use std::cmp::Ordering;

use log::debug;

use crate::grid::LogicalTable;
use crate::table::{normalize, NormalizedTable};
use crate::types::{AggregateReport, RcaResultSet, RcaRow};
use crate::util::{cell_text, parse_numeric};

/// First-column sentinel marking a table's totals row.
pub const TOTALS_SENTINEL: &str = "X";

const PCT_CHANGE: &str = "% Change";

/// Percentage share of `value` in `total`. A zero or missing total yields
/// NaN for that row, never a panic or an error: the row stays in the result
/// set and downstream consumers skip it when ranking or selecting top-N.
fn contribution(value: f64, total: Option<f64>) -> f64 {
    match total {
        Some(t) if t != 0.0 => value / t * 100.0,
        _ => f64::NAN,
    }
}

/// Score one normalized table.
///
/// Totals come from the first row whose first-column value is
/// [`TOTALS_SENTINEL`]; without one, the table is self-normalizing and the
/// totals are the sums of the non-missing values in each column. Candidate
/// rows need both `Absolute Change` and `Post`; sentinel rows are excluded
/// when a totals row exists. Priorities are not assigned here: the rank is
/// defined over the whole aggregated sheet, not per table.
pub fn compute_table(table: &NormalizedTable) -> Vec<RcaRow> {
    let (Some(pre_i), Some(post_i), Some(abs_i)) = (
        table.column_index("Pre"),
        table.column_index("Post"),
        table.column_index("Absolute Change"),
    ) else {
        return Vec::new();
    };
    let pct_i = table.column_index(PCT_CHANGE);
    let section = match table.columns.first() {
        Some(c) => c.clone(),
        None => return Vec::new(),
    };

    struct Parsed {
        segment: String,
        is_totals: bool,
        pre: Option<f64>,
        post: Option<f64>,
        abs_change: Option<f64>,
        pct_change: Option<f64>,
    }

    let parsed: Vec<Parsed> = table
        .rows
        .iter()
        .map(|row| {
            let segment = row.first().map(cell_text).unwrap_or_default();
            Parsed {
                is_totals: segment.trim() == TOTALS_SENTINEL,
                segment: segment.trim().to_string(),
                pre: row.get(pre_i).and_then(parse_numeric),
                post: row.get(post_i).and_then(parse_numeric),
                abs_change: row.get(abs_i).and_then(parse_numeric),
                pct_change: pct_i.and_then(|i| row.get(i)).and_then(parse_numeric),
            }
        })
        .collect();

    let totals = parsed.iter().find(|p| p.is_totals);
    let (total_abs_change, total_post) = match totals {
        Some(t) => (t.abs_change, t.post),
        None => (
            Some(parsed.iter().filter_map(|p| p.abs_change).sum()),
            Some(parsed.iter().filter_map(|p| p.post).sum()),
        ),
    };
    if totals.is_none() {
        debug!(
            "section '{}': no totals row, falling back to column sums",
            section
        );
    }

    let has_totals = totals.is_some();
    parsed
        .into_iter()
        .zip(table.rows.iter())
        .filter(|(p, _)| p.abs_change.is_some() && p.post.is_some())
        .filter(|(p, _)| !(has_totals && p.is_totals))
        .map(|(p, row)| {
            let abs_change = p.abs_change.unwrap_or_default();
            let post = p.post.unwrap_or_default();
            let contrib_abs_pct = contribution(abs_change, total_abs_change);
            let contrib_post_pct = contribution(post, total_post);
            RcaRow {
                section: section.clone(),
                segment: p.segment,
                columns: table.columns.clone(),
                cells: row.clone(),
                pre: p.pre,
                post: p.post,
                abs_change: p.abs_change,
                pct_change: p.pct_change,
                contrib_abs_pct,
                contrib_post_pct,
                impact_score: contrib_abs_pct.abs() + contrib_post_pct.abs(),
                priority: 0,
                label: String::new(),
            }
        })
        .collect()
}

/// Run the calculator over every logical table of a sheet and concatenate
/// the survivors into one ranked result set.
///
/// Tables that cannot yield a header or that lack the required columns are
/// skipped and counted, never surfaced as failures. An empty result set is
/// a valid outcome the caller reports as "no data".
pub fn aggregate(tables: Vec<LogicalTable>) -> RcaResultSet {
    let mut report = AggregateReport {
        tables_seen: tables.len(),
        ..AggregateReport::default()
    };
    let mut rows: Vec<RcaRow> = Vec::new();

    for table in tables {
        let normalized = match normalize(table) {
            Ok(t) => t,
            Err(_) => {
                report.skipped_no_header += 1;
                continue;
            }
        };
        if !normalized.has_required_columns() {
            debug!(
                "skipping table '{}': missing required KPI columns",
                normalized.columns.first().map(String::as_str).unwrap_or("")
            );
            report.skipped_missing_columns += 1;
            continue;
        }
        report.tables_used += 1;
        rows.extend(compute_table(&normalized));
    }

    assign_priorities(&mut rows);
    RcaResultSet { rows, report }
}

/// Rank the full set by descending impact score: 1..n over the rankable
/// (finite-score) rows, stable original order on ties, NaN-score rows
/// taking the trailing ranks in their original order.
fn assign_priorities(rows: &mut [RcaRow]) {
    let mut order: Vec<usize> = (0..rows.len()).collect();
    order.sort_by(|&a, &b| {
        let (sa, sb) = (rows[a].impact_score, rows[b].impact_score);
        match (sa.is_nan(), sb.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => sb.partial_cmp(&sa).unwrap_or(Ordering::Equal),
        }
    });
    for (rank, idx) in order.into_iter().enumerate() {
        rows[idx].priority = rank + 1;
    }
}

/// Populate `KPI Segment Label` as `"<Section>: <value>"`, where the value
/// is the row's own cell in the column its section is named after. A row
/// without that column renders an empty value rather than failing. No other
/// field is touched.
pub fn label(mut set: RcaResultSet) -> RcaResultSet {
    for row in &mut set.rows {
        let value = row
            .value_of(&row.section)
            .map(cell_text)
            .unwrap_or_default();
        row.label = format!("{}: {}", row.section, value);
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Cell;

    fn t(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn kpi_table(section: &str, rows: &[(&str, &str, &str, &str)]) -> LogicalTable {
        let mut out = vec![vec![
            t(section),
            t("Pre"),
            t("Post"),
            t("Absolute Change"),
        ]];
        for (seg, pre, post, abs) in rows {
            out.push(vec![t(seg), t(pre), t(post), t(abs)]);
        }
        out
    }

    #[test]
    fn totals_row_drives_the_denominators() {
        // Totals row X: Absolute Change 10, Post 160 -> contributions are
        // 200% and -100% of the total change.
        let table = kpi_table(
            "Handset Type",
            &[
                ("Smartphone", "100", "120", "20"),
                ("Feature", "50", "40", "-10"),
                ("X", "", "160", "10"),
            ],
        );
        let set = aggregate(vec![table]);
        assert_eq!(set.len(), 2);
        let smart = &set.rows[0];
        assert_eq!(smart.contrib_abs_pct, 200.0);
        assert_eq!(smart.contrib_post_pct, 120.0 / 160.0 * 100.0);
        assert_eq!(
            smart.impact_score,
            smart.contrib_abs_pct.abs() + smart.contrib_post_pct.abs()
        );
        let feature = &set.rows[1];
        assert_eq!(feature.contrib_abs_pct, -100.0);
        // Smartphone's combined score is the larger one.
        assert_eq!(smart.priority, 1);
        assert_eq!(feature.priority, 2);
    }

    #[test]
    fn missing_totals_row_self_normalizes() {
        let table = kpi_table(
            "Arpu Segment",
            &[("High", "10", "30", "20"), ("Low", "40", "50", "10")],
        );
        let set = aggregate(vec![table]);
        assert_eq!(set.len(), 2);
        // total change 30, total post 80
        assert_eq!(set.rows[0].contrib_abs_pct, 20.0 / 30.0 * 100.0);
        assert_eq!(set.rows[0].contrib_post_pct, 30.0 / 80.0 * 100.0);
    }

    #[test]
    fn rows_missing_change_or_post_are_dropped() {
        let table = kpi_table(
            "Usage Category",
            &[
                ("Voice", "10", "12", "2"),
                ("Data", "10", "", "5"),
                ("SMS", "10", "9", "n/a"),
            ],
        );
        let set = aggregate(vec![table]);
        assert_eq!(set.len(), 1);
        assert_eq!(set.rows[0].segment, "Voice");
    }

    #[test]
    fn zero_total_yields_nan_rows_ranked_last() {
        let table = kpi_table(
            "Gb Slab",
            &[
                ("0-1", "10", "20", "10"),
                ("1-5", "30", "20", "-10"),
                ("X", "", "0", "0"),
            ],
        );
        let set = aggregate(vec![table]);
        assert_eq!(set.len(), 2);
        for row in &set.rows {
            assert!(row.contrib_abs_pct.is_nan());
            assert!(row.impact_score.is_nan());
        }
        // NaN rows still get trailing priorities in stable order.
        assert_eq!(set.rows[0].priority, 1);
        assert_eq!(set.rows[1].priority, 2);
    }

    #[test]
    fn nan_rows_rank_after_all_rankable_rows() {
        let good = kpi_table("Base Type", &[("Prepaid", "5", "10", "5")]);
        let bad = kpi_table(
            "Mou Slab",
            &[("0-50", "1", "2", "1"), ("X", "", "0", "0")],
        );
        let set = aggregate(vec![bad, good]);
        assert_eq!(set.len(), 2);
        let nan_row = set.rows.iter().find(|r| r.section == "Mou Slab").unwrap();
        let ranked = set.rows.iter().find(|r| r.section == "Base Type").unwrap();
        assert_eq!(ranked.priority, 1);
        assert_eq!(nan_row.priority, 2);
    }

    #[test]
    fn tables_without_required_columns_are_skipped_and_counted() {
        let good = kpi_table("Handset Type", &[("Smart", "1", "2", "1")]);
        let bad = vec![
            vec![t("Notes"), t("Pre")],
            vec![t("whatever"), t("1")],
        ];
        let set = aggregate(vec![good, bad]);
        assert_eq!(set.len(), 1);
        assert_eq!(set.report.tables_seen, 2);
        assert_eq!(set.report.tables_used, 1);
        assert_eq!(set.report.skipped_missing_columns, 1);
    }

    #[test]
    fn empty_sheet_aggregates_to_an_empty_set() {
        let set = aggregate(Vec::new());
        assert!(set.is_empty());
        assert_eq!(set.report.tables_seen, 0);
    }

    #[test]
    fn priorities_form_a_permutation_over_rankable_rows() {
        let table = kpi_table(
            "Clustername",
            &[
                ("North", "10", "30", "20"),
                ("South", "40", "45", "5"),
                ("East", "10", "11", "1"),
                ("West", "50", "35", "-15"),
            ],
        );
        let set = aggregate(vec![table]);
        let mut priorities: Vec<usize> = set.rows.iter().map(|r| r.priority).collect();
        priorities.sort_unstable();
        assert_eq!(priorities, vec![1, 2, 3, 4]);
    }

    #[test]
    fn labels_join_section_and_segment_value() {
        let set = label(aggregate(vec![kpi_table(
            "Handset Type",
            &[("Smartphone", "100", "120", "20")],
        )]));
        assert_eq!(set.rows[0].label, "Handset Type: Smartphone");
        // Canonical analytics fields are untouched by labeling.
        assert_eq!(set.rows[0].contrib_abs_pct, 100.0);
    }
}
