use thiserror::Error;

/// Failure modes of the analysis pipeline and its collaborators.
///
/// Per-row arithmetic indeterminacy (a zero or missing denominator) is not
/// represented here: it yields a NaN contribution on the affected row and
/// the row stays in the result set. Tables lacking the required columns are
/// likewise a counted policy outcome, not an error.
#[derive(Error, Debug)]
pub enum RcaError {
    /// A logical table was empty, so no header row could be promoted.
    #[error("table has no header row")]
    Schema,

    /// Aggregation over a whole sheet produced zero rows. Callers report
    /// this as a "no data" outcome rather than a crash.
    #[error("no table in the sheet produced any RCA rows")]
    EmptyResult,

    /// The comparator was invoked with at least one empty result set.
    #[error("comparison requires two non-empty result sets ({0} side is empty)")]
    ComparisonPrecondition(&'static str),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("workbook error: {0}")]
    Workbook(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
