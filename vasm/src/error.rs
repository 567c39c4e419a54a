//! Flattens `pest` parse errors and semantic errors alike into the single
//! `Line N: message` form `spec.md` §4.4 specifies, the way the teacher's
//! `error.rs` layers `ParseError`/`AssembleError` into one `Error` — except
//! here the public surface is a single flat string-producing type rather
//! than a `pest::error::Error<Rule>` a caller has to know how to format.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembleError {
    pub line: u32,
    pub message: String,
}

impl AssembleError {
    pub fn new(line: u32, message: impl Into<String>) -> AssembleError {
        AssembleError {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for AssembleError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for AssembleError {}

pub type Result<T> = std::result::Result<T, AssembleError>;

/// Lifts a `pest` parse error for line `line` into an [`AssembleError`],
/// discarding `pest`'s own line/column bookkeeping since the caller already
/// knows which physical line it fed in.
pub fn from_pest<R: pest::RuleType>(line: u32, err: pest::error::Error<R>) -> AssembleError {
    let message = match err.variant {
        pest::error::ErrorVariant::CustomError { message } => message,
        other => other.message().into_owned(),
    };
    AssembleError::new(line, message)
}
