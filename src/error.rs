//! Error types for CSV reading and writing

use crate::types::Position;
use std::fmt;
use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, CsvError>;

/// Errors produced by [`CsvReader`](crate::CsvReader) and [`CsvWriter`](crate::CsvWriter)
///
/// Malformed input is only an error in strict mode. The default permissive
/// tokenizer resolves every malformed construct to a best-effort row.
#[derive(Error, Debug)]
pub enum CsvError {
    /// The underlying stream was closed or released after an earlier error
    #[error("Stream unavailable: reader or writer is not open")]
    StreamUnavailable,

    /// Read or write failure of the underlying stream, including invalid UTF-8
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Delimiter/quote configuration that cannot be tokenized unambiguously
    #[error("Invalid dialect: {0}")]
    InvalidDialect(String),

    /// Malformed CSV rejected by strict mode
    #[error("Malformed CSV at {position}: {kind}")]
    Malformed {
        kind: MalformedKind,
        position: Position,
    },
}

/// Kinds of malformed input that strict mode refuses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedKind {
    /// A quote character after the first character of an unquoted field
    QuoteInUnquotedField,
    /// A closing quote followed by something other than a quote, delimiter, newline or EOF
    TextAfterClosingQuote,
    /// End of input inside a quoted field
    UnterminatedQuote,
}

impl fmt::Display for MalformedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            MalformedKind::QuoteInUnquotedField => "quote character inside unquoted field",
            MalformedKind::TextAfterClosingQuote => "unexpected character after closing quote",
            MalformedKind::UnterminatedQuote => "unterminated quoted field",
        };
        f.write_str(msg)
    }
}

impl CsvError {
    /// Returns the malformed kind if this is a strict-mode error
    pub fn malformed_kind(&self) -> Option<MalformedKind> {
        match self {
            CsvError::Malformed { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
