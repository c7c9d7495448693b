//! Single-pass CSV tokenizer with quote-doubling escapes

use crate::error::{CsvError, MalformedKind, Result};
use crate::types::{Dialect, Position, Row};
use std::io::{self, BufRead};

/// Streaming CSV tokenizer
///
/// Pulls bytes one at a time from a [`BufRead`] and assembles exactly one row
/// per [`read_row`](CsvParser::read_row) call. Newlines inside quoted fields
/// are field data; only an unquoted `\n` or end of input terminates a row.
///
/// In permissive mode (the default) malformed input never fails:
/// - a quote after the first character of an unquoted field is literal text
/// - a closing quote followed by a stray character keeps that character and
///   stays inside the quoted field
/// - end of input inside a quoted field closes the field and the row
#[derive(Debug, Clone, Copy)]
pub struct CsvParser {
    delimiter: u8,
    quote_char: u8,
    strict: bool,
}

impl CsvParser {
    /// Create a tokenizer for the given dialect
    ///
    /// The dialect is assumed to be valid, see [`Dialect::validate`].
    pub fn new(dialect: Dialect) -> Self {
        Self {
            delimiter: dialect.delimiter,
            quote_char: dialect.quote_char,
            strict: dialect.strict,
        }
    }

    /// Tokenize the next row
    ///
    /// Returns `Ok(None)` when the input is exhausted before any byte of a new
    /// row was consumed. A final row without a trailing newline is returned
    /// normally.
    pub fn read_row<R: BufRead + ?Sized>(
        &self,
        input: &mut R,
        pos: &mut Position,
    ) -> Result<Option<Row>> {
        let mut row = Vec::new();
        let mut field = Vec::new();
        let mut in_quotes = false;
        let mut saw_any = false;
        let mut quote_start = *pos;

        loop {
            let at = *pos;
            let Some(byte) = next_byte(input, pos)? else {
                if !saw_any {
                    return Ok(None);
                }
                if in_quotes {
                    self.malformed(MalformedKind::UnterminatedQuote, quote_start)?;
                }
                row.push(take_field(&mut field)?);
                return Ok(Some(finish_row(row, pos)));
            };
            saw_any = true;

            if in_quotes {
                if byte != self.quote_char {
                    field.push(byte);
                    continue;
                }

                // One byte of lookahead decides what this quote means
                let after_quote = *pos;
                match next_byte(input, pos)? {
                    None => {
                        row.push(take_field(&mut field)?);
                        return Ok(Some(finish_row(row, pos)));
                    }
                    Some(next) if next == self.quote_char => field.push(next),
                    Some(next) if next == self.delimiter => {
                        in_quotes = false;
                        row.push(take_field(&mut field)?);
                    }
                    Some(b'\n') => {
                        row.push(take_field(&mut field)?);
                        return Ok(Some(finish_row(row, pos)));
                    }
                    Some(next) => {
                        self.malformed(MalformedKind::TextAfterClosingQuote, after_quote)?;
                        field.push(next);
                    }
                }
            } else if byte == self.delimiter {
                row.push(take_field(&mut field)?);
            } else if byte == self.quote_char {
                if field.is_empty() {
                    in_quotes = true;
                    quote_start = at;
                } else {
                    self.malformed(MalformedKind::QuoteInUnquotedField, at)?;
                    field.push(byte);
                }
            } else if byte == b'\n' {
                row.push(take_field(&mut field)?);
                return Ok(Some(finish_row(row, pos)));
            } else {
                field.push(byte);
            }
        }
    }

    fn malformed(&self, kind: MalformedKind, position: Position) -> Result<()> {
        if self.strict {
            return Err(CsvError::Malformed { kind, position });
        }
        tracing::trace!(%kind, %position, "malformed CSV resolved permissively");
        Ok(())
    }
}

/// Consume one byte, retrying on `Interrupted`
fn next_byte<R: BufRead + ?Sized>(input: &mut R, pos: &mut Position) -> io::Result<Option<u8>> {
    let byte = loop {
        match input.fill_buf() {
            Ok(&[byte, ..]) => break byte,
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    };
    input.consume(1);
    pos.advance(byte);
    Ok(Some(byte))
}

fn take_field(field: &mut Vec<u8>) -> Result<String> {
    String::from_utf8(std::mem::take(field))
        .map_err(|e| CsvError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

fn finish_row(row: Row, pos: &mut Position) -> Row {
    pos.record += 1;
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_all(dialect: Dialect, data: &[u8]) -> Result<Vec<Row>> {
        let parser = CsvParser::new(dialect);
        let mut input = data;
        let mut pos = Position::default();
        let mut rows = Vec::new();
        while let Some(row) = parser.read_row(&mut input, &mut pos)? {
            rows.push(row);
        }
        Ok(rows)
    }

    fn parse(data: &str) -> Vec<Row> {
        parse_all(Dialect::default(), data.as_bytes()).unwrap()
    }

    fn strict_err(data: &str) -> CsvError {
        parse_all(Dialect::new().strict(true), data.as_bytes()).unwrap_err()
    }

    #[test]
    fn test_simple() {
        assert_eq!(parse("a,b,c\n"), vec![vec!["a", "b", "c"]]);
    }

    #[test]
    fn test_quoted() {
        assert_eq!(parse("\"a,b\",c\n"), vec![vec!["a,b", "c"]]);
    }

    #[test]
    fn test_escaped_quotes() {
        assert_eq!(parse("\"a\"\"b\",c\n"), vec![vec!["a\"b", "c"]]);
        assert_eq!(
            parse(r#""Say ""Hello""",world"#),
            vec![vec![r#"Say "Hello""#, "world"]]
        );
    }

    #[test]
    fn test_embedded_newline_is_one_row() {
        assert_eq!(
            parse("\"Line 1\nLine 2\",normal\nnext,row\n"),
            vec![vec!["Line 1\nLine 2", "normal"], vec!["next", "row"]]
        );
    }

    #[test]
    fn test_no_trailing_newline() {
        assert_eq!(parse("a,b\nc,d"), vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("").is_empty());
    }

    #[test]
    fn test_empty_line_is_single_empty_field() {
        assert_eq!(parse("\n"), vec![vec![""]]);
        assert_eq!(parse("a\n\nb\n"), vec![vec!["a"], vec![""], vec!["b"]]);
    }

    #[test]
    fn test_empty_fields() {
        assert_eq!(parse("a,,c\n"), vec![vec!["a", "", "c"]]);
        assert_eq!(parse(",,\n"), vec![vec!["", "", ""]]);
        assert_eq!(parse("a,\n"), vec![vec!["a", ""]]);
    }

    #[test]
    fn test_quoted_empty() {
        assert_eq!(parse(r#""","""#), vec![vec!["", ""]]);
    }

    #[test]
    fn test_whitespace_and_unicode_preserved() {
        assert_eq!(
            parse(" a , héllo ,世界\n"),
            vec![vec![" a ", " héllo ", "世界"]]
        );
    }

    #[test]
    fn test_carriage_return_is_data() {
        assert_eq!(parse("a,b\r\n"), vec![vec!["a", "b\r"]]);
    }

    #[test]
    fn test_quote_inside_unquoted_field_is_literal() {
        assert_eq!(parse("ab\"c,d\n"), vec![vec!["ab\"c", "d"]]);
    }

    #[test]
    fn test_stray_text_after_closing_quote_stays_quoted() {
        // The stray `c` is kept and the field stays quoted until the next
        // quote that is followed by a delimiter
        assert_eq!(parse("\"ab\"c\",d\n"), vec![vec!["abc", "d"]]);
        // Without another closing quote the rest of the input joins the field
        assert_eq!(parse("\"ab\"c,d\n"), vec![vec!["abc,d\n"]]);
    }

    #[test]
    fn test_unterminated_quote_at_eof() {
        assert_eq!(parse("x,\"abc"), vec![vec!["x", "abc"]]);
    }

    #[test]
    fn test_closing_quote_at_eof() {
        assert_eq!(parse("x,\"abc\""), vec![vec!["x", "abc"]]);
    }

    #[test]
    fn test_custom_dialect() {
        let rows = parse_all(
            Dialect::new().delimiter(b';').quote_char(b'\''),
            b"a;'b;c';'it''s'\n",
        )
        .unwrap();
        assert_eq!(rows, vec![vec!["a", "b;c", "it's"]]);
    }

    #[test]
    fn test_invalid_utf8_is_io_error() {
        let err = parse_all(Dialect::default(), b"ok,\xff\xfe\n").unwrap_err();
        match err {
            CsvError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::InvalidData),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_position_tracks_lines_and_records() {
        let parser = CsvParser::new(Dialect::default());
        let mut input: &[u8] = b"\"a\nb\",c\nd\n";
        let mut pos = Position::default();

        parser.read_row(&mut input, &mut pos).unwrap();
        assert_eq!(pos.line, 3);
        assert_eq!(pos.record, 1);
        assert_eq!(pos.byte, 8);

        parser.read_row(&mut input, &mut pos).unwrap();
        assert_eq!(pos.record, 2);
        assert!(parser.read_row(&mut input, &mut pos).unwrap().is_none());
        assert!(parser.read_row(&mut input, &mut pos).unwrap().is_none());
        assert_eq!(pos.record, 2);
    }

    #[test]
    fn test_strict_quote_in_unquoted_field() {
        let err = strict_err("ok\nab\"c\n");
        assert_eq!(err.malformed_kind(), Some(MalformedKind::QuoteInUnquotedField));
        if let CsvError::Malformed { position, .. } = err {
            assert_eq!(position.line, 2);
            assert_eq!(position.byte, 5);
            assert_eq!(position.record, 1);
        }
    }

    #[test]
    fn test_strict_text_after_closing_quote() {
        let err = strict_err("\"ab\"c,d\n");
        assert_eq!(
            err.malformed_kind(),
            Some(MalformedKind::TextAfterClosingQuote)
        );
        if let CsvError::Malformed { position, .. } = err {
            assert_eq!(position.byte, 4);
        }
    }

    #[test]
    fn test_strict_unterminated_quote() {
        let err = strict_err("a,\"open");
        assert_eq!(err.malformed_kind(), Some(MalformedKind::UnterminatedQuote));
        if let CsvError::Malformed { position, .. } = err {
            assert_eq!(position.byte, 2);
        }
    }

    #[test]
    fn test_strict_accepts_well_formed() {
        let rows = parse_all(
            Dialect::new().strict(true),
            b"a,\"b,\"\"c\"\"\nd\"\n\"e\"",
        )
        .unwrap();
        assert_eq!(rows, vec![vec!["a", "b,\"c\"\nd"], vec!["e"]]);
    }
}
