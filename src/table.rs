// Table shape policy: header promotion and duplicate-column handling.

use std::collections::HashMap;

use crate::error::RcaError;
use crate::grid::{Cell, LogicalTable};
use crate::util::cell_text;

/// Columns a sub-table must carry to qualify for contribution analysis.
/// The aggregator enforces this, not the normalizer: partial or unrelated
/// tables on the same sheet are expected and silently skipped.
pub const REQUIRED_COLUMNS: [&str; 3] = ["Pre", "Post", "Absolute Change"];

/// A logical table with its first row promoted to column names.
#[derive(Debug, Clone)]
pub struct NormalizedTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl NormalizedTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_required_columns(&self) -> bool {
        REQUIRED_COLUMNS
            .iter()
            .all(|c| self.column_index(c).is_some())
    }
}

/// Promote row 0 of a logical table to trimmed, de-duplicated column names
/// and keep the remaining rows as the data body.
///
/// Fails with [`RcaError::Schema`] only when the table has no rows at all,
/// since then there is nothing to promote.
pub fn normalize(table: LogicalTable) -> Result<NormalizedTable, RcaError> {
    let mut rows = table.into_iter();
    let header = rows.next().ok_or(RcaError::Schema)?;
    let names: Vec<String> = header
        .iter()
        .map(|c| cell_text(c).trim().to_string())
        .collect();
    Ok(NormalizedTable {
        columns: dedupe_headers(names),
        rows: rows.collect(),
    })
}

/// Resolve header collisions by suffixing the 2nd, 3rd, ... occurrence of a
/// name with `_1`, `_2`, ... in order of appearance. The first occurrence
/// keeps its original name.
pub fn dedupe_headers(names: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let n = seen.entry(name.clone()).or_insert(0);
        if *n == 0 {
            out.push(name);
        } else {
            out.push(format!("{}_{}", name, n));
        }
        *n += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Cell;

    fn table(rows: &[&[&str]]) -> LogicalTable {
        rows.iter()
            .map(|r| r.iter().map(|s| Cell::Text(s.to_string())).collect())
            .collect()
    }

    #[test]
    fn promotes_and_trims_the_header_row() {
        let t = normalize(table(&[&[" Handset Type ", "Pre", "Post"], &["Smart", "1", "2"]]))
            .unwrap();
        assert_eq!(t.columns, vec!["Handset Type", "Pre", "Post"]);
        assert_eq!(t.rows.len(), 1);
    }

    #[test]
    fn numeric_header_cells_become_strings() {
        let t = normalize(vec![
            vec![Cell::Text("Year".into()), Cell::Number(2021.0)],
            vec![Cell::Text("a".into()), Cell::Number(1.0)],
        ])
        .unwrap();
        assert_eq!(t.columns, vec!["Year", "2021"]);
    }

    #[test]
    fn duplicate_headers_get_ordered_suffixes() {
        let t = normalize(table(&[&["Seg", "Pre", "Pre", "Pre", "Post"]])).unwrap();
        assert_eq!(t.columns, vec!["Seg", "Pre", "Pre_1", "Pre_2", "Post"]);
    }

    #[test]
    fn empty_table_is_a_schema_error() {
        assert!(matches!(normalize(Vec::new()), Err(RcaError::Schema)));
    }

    #[test]
    fn required_column_check() {
        let ok = normalize(table(&[&["Seg", "Pre", "Post", "Absolute Change"]])).unwrap();
        assert!(ok.has_required_columns());
        let missing = normalize(table(&[&["Seg", "Pre", "Absolute Change"]])).unwrap();
        assert!(!missing.has_required_columns());
    }
}
