// Raw sheet grid model and the blank-row table splitter.
//
// A sheet arrives from the reader collaborator as a plain rectangle of
// cells with no schema. Everything downstream works on the logical tables
// carved out of it here.

/// One spreadsheet cell. Text is kept verbatim; numeric coercion happens
/// later, in the contribution calculator.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    /// A cell is blank when it is empty or its text trims to nothing.
    /// Blank-ness is what drives table separation, not numeric parsing.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }
}

/// A raw sheet: ordered rows of ordered cells, possibly ragged.
pub type Grid = Vec<Vec<Cell>>;

/// A contiguous run of non-blank rows cut out of a grid.
pub type LogicalTable = Vec<Vec<Cell>>;

/// Which sheet of a workbook to analyze: zero-based index or name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetSelector {
    Index(usize),
    Name(String),
}

impl SheetSelector {
    /// Interpret console input the way the original dashboard did: a value
    /// that parses as an integer is an index, anything else a sheet name.
    pub fn parse(raw: &str) -> SheetSelector {
        let raw = raw.trim();
        match raw.parse::<usize>() {
            Ok(i) => SheetSelector::Index(i),
            Err(_) => SheetSelector::Name(raw.to_string()),
        }
    }
}

/// Partition a grid into logical tables at fully-blank rows.
///
/// A row separates tables iff every cell in it is blank; consecutive
/// separators collapse, so no empty table is ever emitted. A trailing
/// non-blank run at the end of the grid becomes the final table. An empty
/// or all-blank grid yields an empty list, never an error.
pub fn split_tables(grid: &Grid) -> Vec<LogicalTable> {
    let mut tables: Vec<LogicalTable> = Vec::new();
    let mut current: LogicalTable = Vec::new();
    for row in grid {
        if row.iter().all(Cell::is_blank) {
            if !current.is_empty() {
                tables.push(std::mem::take(&mut current));
            }
        } else {
            current.push(row.clone());
        }
    }
    if !current.is_empty() {
        tables.push(current);
    }
    tables
}
