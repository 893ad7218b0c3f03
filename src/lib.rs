//! Pre-vs-Post KPI root-cause analysis over multi-table spreadsheet sheets.
//!
//! A sheet is split into blank-row-separated sub-tables, each sub-table is
//! normalized and scored for per-segment contribution to the overall metric
//! change, and the combined rows are ranked, labeled, and rendered as a CSV
//! export, chart series, and a templated narrative. Two independently
//! analyzed sheets can be joined into a per-segment contribution comparison.

pub mod compare;
pub mod config;
pub mod error;
pub mod grid;
pub mod loader;
pub mod narrative;
pub mod output;
pub mod rca;
pub mod table;
pub mod types;
pub mod util;
pub mod view;

pub use error::RcaError;
