// Templated two-block narrative over the ranked analysis.

use crate::types::{BusinessRow, RcaResultSet};
use crate::util::format_signed;
use crate::view::BusinessView;

/// How many drivers each block lists per section.
const TOP_N_PER_SECTION: usize = 2;

/// Render the "key change drivers" report: a positive block and a negative
/// block, each walking the configured KPI families in order and listing the
/// top drivers by business-view change.
///
/// Selection is value-guarded: the positive block only carries rows whose
/// view change is > 0, the negative block only < 0, and NaN-contribution
/// rows never qualify. A section with no qualifying rows is omitted from
/// that block entirely. Output is deterministic for a given result set and
/// section list.
pub fn narrative(
    set: &RcaResultSet,
    view: &BusinessView,
    sections: &[String],
    brand_name: &str,
) -> String {
    let projected = view.apply_all(set);

    let mut lines: Vec<String> = Vec::new();
    lines.push(format!("{}: Key change drivers", brand_name));
    lines.push(String::new());

    lines.push("Biggest positive impact:".to_string());
    for section in sections {
        let items = top_drivers(&projected, section, true);
        if !items.is_empty() {
            lines.push(format!("- {}:", section));
            for item in items {
                lines.push(format!("  - {}", item));
            }
        }
    }

    lines.push(String::new());
    lines.push("Negative impacts / areas to watch:".to_string());
    for section in sections {
        let items = top_drivers(&projected, section, false);
        if !items.is_empty() {
            lines.push(format!("- {}:", section));
            for item in items {
                lines.push(format!("  - {}", item));
            }
        }
    }

    lines.join("\n")
}

fn top_drivers(rows: &[BusinessRow], section: &str, positive: bool) -> Vec<String> {
    let mut candidates: Vec<&BusinessRow> = rows
        .iter()
        .filter(|r| r.section == section)
        .filter(|r| r.contrib_abs_pct.is_finite())
        .filter(|r| match r.abs_change {
            Some(c) => {
                if positive {
                    c > 0.0
                } else {
                    c < 0.0
                }
            }
            None => false,
        })
        .collect();
    candidates.sort_by(|a, b| {
        let (ca, cb) = (
            a.abs_change.unwrap_or_default(),
            b.abs_change.unwrap_or_default(),
        );
        if positive {
            cb.partial_cmp(&ca).unwrap_or(std::cmp::Ordering::Equal)
        } else {
            ca.partial_cmp(&cb).unwrap_or(std::cmp::Ordering::Equal)
        }
    });
    candidates
        .into_iter()
        .take(TOP_N_PER_SECTION)
        .map(format_driver)
        .collect()
}

/// `"<label> (<signed change, grouped> / <signed pct>%)"`. The sheet stores
/// `% Change` as a fraction, so rendering multiplies by 100; a missing
/// value reads `n/a` rather than a fabricated zero.
fn format_driver(row: &BusinessRow) -> String {
    let change = format_signed(row.abs_change.unwrap_or_default(), 2);
    let pct = match row.pct_change {
        Some(p) => format!("{}%", format_signed(p * 100.0, 2)),
        None => "n/a".to_string(),
    };
    format!("{} ({} / {})", row.label, change, pct)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Cell, LogicalTable};
    use crate::rca::{aggregate, label};
    use crate::types::SignRule;
    use pretty_assertions::assert_eq;

    fn t(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn kpi_table(section: &str, rows: &[(&str, &str, &str, &str, &str)]) -> LogicalTable {
        let mut out = vec![vec![
            t(section),
            t("Pre"),
            t("Post"),
            t("Absolute Change"),
            t("% Change"),
        ]];
        for (seg, pre, post, abs, pct) in rows {
            out.push(vec![t(seg), t(pre), t(post), t(abs), t(pct)]);
        }
        out
    }

    fn sections(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn report_walks_sections_in_configured_order() {
        let set = label(aggregate(vec![
            kpi_table(
                "Arpu Segment",
                &[("High", "10", "30", "20", "2.0"), ("Low", "40", "30", "-10", "-0.25")],
            ),
            kpi_table(
                "Handset Type",
                &[("Smartphone", "100", "150", "50", "0.5")],
            ),
        ]));
        let view = BusinessView::new(Vec::new()).unwrap();
        let text = narrative(
            &set,
            &view,
            &sections(&["Handset Type", "Arpu Segment"]),
            "Robi",
        );
        let expected = "\
Robi: Key change drivers

Biggest positive impact:
- Handset Type:
  - Handset Type: Smartphone (+50.00 / +50.00%)
- Arpu Segment:
  - Arpu Segment: High (+20.00 / +200.00%)

Negative impacts / areas to watch:
- Arpu Segment:
  - Arpu Segment: Low (-10.00 / -25.00%)";
        assert_eq!(text, expected);
    }

    #[test]
    fn sections_without_qualifying_rows_are_omitted() {
        let set = label(aggregate(vec![kpi_table(
            "Handset Type",
            &[("Smartphone", "100", "150", "50", "0.5")],
        )]));
        let view = BusinessView::new(Vec::new()).unwrap();
        let text = narrative(&set, &view, &sections(&["Handset Type", "Gb Slab"]), "GP");
        assert!(!text.contains("Gb Slab"));
        // All-positive section appears only in the positive block.
        let neg_block = text.split("Negative impacts").nth(1).unwrap();
        assert!(!neg_block.contains("Handset Type"));
    }

    #[test]
    fn inverted_segment_lands_in_the_negative_block() {
        let set = label(aggregate(vec![kpi_table(
            "GP_MULTISIM",
            &[
                ("Increased", "100", "220", "120", "1.2"),
                ("X", "", "220", "120", ""),
            ],
        )]));
        let view = BusinessView::new(vec![SignRule {
            marker: "GP_MULTISIM".into(),
            multiplier: -1.0,
        }])
        .unwrap();
        let text = narrative(&set, &view, &sections(&["GP_MULTISIM"]), "GP");
        let neg_block = text.split("Negative impacts").nth(1).unwrap();
        assert!(neg_block.contains("GP_MULTISIM: Increased (-120.00 / +120.00%)"));
        // Canonical data still reports the arithmetic sign.
        assert_eq!(set.rows[0].abs_change, Some(120.0));
        assert_eq!(set.rows[0].contrib_abs_pct, 100.0);
    }
}
