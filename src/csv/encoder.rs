//! CSV encoding with minimal quoting

use crate::types::Dialect;

/// CSV encoder: the inverse of [`CsvParser`](super::CsvParser)
///
/// A field is quoted only when it contains the delimiter, the quote
/// character, `\n` or `\r`. Inside a quoted field every quote character is
/// doubled; nothing else is altered.
#[derive(Debug, Clone, Copy)]
pub struct CsvEncoder {
    delimiter: u8,
    quote_char: u8,
}

impl CsvEncoder {
    /// Create an encoder for the given dialect
    pub fn new(dialect: Dialect) -> Self {
        Self {
            delimiter: dialect.delimiter,
            quote_char: dialect.quote_char,
        }
    }

    /// Encode a row of fields into buffer, without a line terminator
    pub fn encode_row<I, S>(&self, fields: I, buffer: &mut Vec<u8>)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for (i, field) in fields.into_iter().enumerate() {
            if i > 0 {
                buffer.push(self.delimiter);
            }
            self.encode_field(field.as_ref(), buffer);
        }
    }

    /// Encode single field, quoting and escaping only when needed
    pub fn encode_field(&self, field: &str, buffer: &mut Vec<u8>) {
        if !self.needs_quoting(field) {
            buffer.extend_from_slice(field.as_bytes());
            return;
        }

        buffer.reserve(field.len() + 2);
        buffer.push(self.quote_char);
        for byte in field.bytes() {
            if byte == self.quote_char {
                buffer.push(self.quote_char);
            }
            buffer.push(byte);
        }
        buffer.push(self.quote_char);
    }

    /// Check if field requires quoting
    pub fn needs_quoting(&self, field: &str) -> bool {
        field
            .bytes()
            .any(|b| b == self.delimiter || b == self.quote_char || b == b'\n' || b == b'\r')
    }
}
