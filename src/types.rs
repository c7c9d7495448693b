//! Type definitions shared by the reader and writer

use crate::error::{CsvError, Result};
use std::fmt;

/// One record: fields in column order
pub type Row = Vec<String>;

/// Delimiter and quoting configuration
///
/// Both characters are single ASCII bytes. Input and output text is UTF-8;
/// because ASCII bytes never appear inside a multi-byte UTF-8 sequence,
/// tokenizing on bytes is exact for any Unicode content.
///
/// # Examples
///
/// ```
/// use csvstream::Dialect;
///
/// let dialect = Dialect::new().delimiter(b';').quote_char(b'\'');
/// assert!(dialect.validate().is_ok());
///
/// let broken = Dialect::new().delimiter(b'"');
/// assert!(broken.validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Dialect {
    /// Field separator (default `,`)
    pub delimiter: u8,
    /// Quote character (default `"`), escaped by doubling
    pub quote_char: u8,
    /// Reject malformed input instead of resolving it permissively
    pub strict: bool,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote_char: b'"',
            strict: false,
        }
    }
}

impl Dialect {
    /// Comma-delimited, double-quoted, permissive
    pub fn new() -> Self {
        Self::default()
    }

    /// Set field separator (builder pattern)
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set quote character (builder pattern)
    pub fn quote_char(mut self, quote_char: u8) -> Self {
        self.quote_char = quote_char;
        self
    }

    /// Enable or disable strict mode (builder pattern)
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Check that the delimiter and quote character can be told apart from
    /// each other and from line terminators
    pub fn validate(&self) -> Result<()> {
        for (name, byte) in [("delimiter", self.delimiter), ("quote_char", self.quote_char)] {
            if !byte.is_ascii() {
                return Err(CsvError::InvalidDialect(format!(
                    "{} must be an ASCII character, got byte 0x{:02x}",
                    name, byte
                )));
            }
            if byte == b'\n' || byte == b'\r' {
                return Err(CsvError::InvalidDialect(format!(
                    "{} cannot be a line terminator",
                    name
                )));
            }
        }
        if self.delimiter == self.quote_char {
            return Err(CsvError::InvalidDialect(format!(
                "delimiter and quote_char are both {:?}",
                self.delimiter as char
            )));
        }
        Ok(())
    }
}

/// Location of the tokenizer in the input stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Bytes consumed so far
    pub byte: u64,
    /// Physical line, 1-based; newlines embedded in quoted fields count
    pub line: u64,
    /// Index of the record being tokenized, 0-based
    pub record: u64,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            byte: 0,
            line: 1,
            record: 0,
        }
    }
}

impl Position {
    #[inline]
    pub(crate) fn advance(&mut self, byte: u8) {
        self.byte += 1;
        if byte == b'\n' {
            self.line += 1;
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}, byte {} (record {})",
            self.line, self.byte, self.record
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_dialect() {
        let dialect = Dialect::default();
        assert_eq!(dialect.delimiter, b',');
        assert_eq!(dialect.quote_char, b'"');
        assert!(!dialect.strict);
        assert!(dialect.validate().is_ok());
    }

    #[test]
    fn test_rejects_same_delimiter_and_quote() {
        let err = Dialect::new().quote_char(b',').validate().unwrap_err();
        assert!(matches!(err, CsvError::InvalidDialect(_)));
    }

    #[test]
    fn test_rejects_line_terminators() {
        assert!(Dialect::new().delimiter(b'\n').validate().is_err());
        assert!(Dialect::new().quote_char(b'\r').validate().is_err());
    }

    #[test]
    fn test_rejects_non_ascii() {
        assert!(Dialect::new().delimiter(0xC3).validate().is_err());
    }

    #[test]
    fn test_tab_and_single_quote() {
        assert!(Dialect::new()
            .delimiter(b'\t')
            .quote_char(b'\'')
            .validate()
            .is_ok());
    }

    #[test]
    fn test_position_advance() {
        let mut pos = Position::default();
        for &b in b"ab\nc" {
            pos.advance(b);
        }
        assert_eq!(pos.byte, 4);
        assert_eq!(pos.line, 2);
        assert_eq!(pos.to_string(), "line 2, byte 4 (record 0)");
    }
}
