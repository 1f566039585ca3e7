//! Parse errors.
//!
//! Nearly every parser in this crate is best-effort and never fails. The
//! stash-list parser is the exception: a line that does not start with
//! `stash@{n}:` means git changed its output format, and that must surface.

use serde::Serialize;

/// Category of a [`ParseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParseErrorKind {
    MalformedInput,
}

/// A parser rejected its input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("malformed {what} line: {line:?}")]
    MalformedInput { what: &'static str, line: String },
}

impl ParseError {
    pub fn malformed(what: &'static str, line: impl Into<String>) -> Self {
        Self::MalformedInput {
            what,
            line: line.into(),
        }
    }

    pub fn kind(&self) -> ParseErrorKind {
        match self {
            Self::MalformedInput { .. } => ParseErrorKind::MalformedInput,
        }
    }

    /// The input line that failed to parse.
    pub fn line(&self) -> &str {
        match self {
            Self::MalformedInput { line, .. } => line,
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;
