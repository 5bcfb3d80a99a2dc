use std::fmt;

/// Failures surfaced by the scoring and aggregation engine.
///
/// Every variant is a contract violation at the boundary; nothing here is
/// retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PenneyError {
    InvalidInput { what: &'static str, detail: String },
    EmptyAggregate,
}

impl PenneyError {
    pub(crate) fn invalid(what: &'static str, detail: impl Into<String>) -> Self {
        PenneyError::InvalidInput {
            what,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for PenneyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PenneyError::InvalidInput { what, detail } => write!(f, "invalid {what}: {detail}"),
            PenneyError::EmptyAggregate => {
                write!(f, "cannot finalize an aggregate with no decks folded in")
            }
        }
    }
}

impl std::error::Error for PenneyError {}
