//! CSV writing with streaming output and minimal quoting

use crate::csv::CsvEncoder;
use crate::error::{CsvError, Result};
use crate::types::Dialect;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const LINE_TERMINATOR: u8 = b'\n';

/// Streaming CSV writer
///
/// Serializes rows one at a time straight to the output; only the row being
/// encoded is buffered. Every row ends with a single `\n`. Fields are quoted
/// only when they contain the delimiter, the quote character, `\n` or `\r`.
///
/// The writer owns its stream until [`close`](CsvWriter::close),
/// [`save`](CsvWriter::save), [`into_inner`](CsvWriter::into_inner) or drop.
/// Dropping flushes buffered output but discards flush errors; call `close`
/// or `save` to observe them.
///
/// # Examples
///
/// ```no_run
/// use csvstream::CsvWriter;
///
/// let mut writer = CsvWriter::new("output.csv").unwrap();
/// writer.write_row(["Name", "Age", "City"]).unwrap();
/// writer.write_row(["Alice", "30", "NYC"]).unwrap();
/// writer.save().unwrap();
/// ```
///
/// Writing into memory:
///
/// ```
/// use csvstream::CsvWriter;
///
/// let mut writer = CsvWriter::from_writer(Vec::new());
/// writer.write_row(["plain", "d,e"]).unwrap();
/// writer.write_row(["a\nb", "c"]).unwrap();
///
/// let bytes = writer.into_inner().unwrap();
/// assert_eq!(String::from_utf8(bytes).unwrap(), "plain,\"d,e\"\n\"a\nb\",c\n");
/// ```
pub struct CsvWriter<W: Write> {
    output: Option<BufWriter<W>>,
    dialect: Dialect,
    encoder: Option<CsvEncoder>,

    // Reused for every row
    buffer: Vec<u8>,
    row_count: u64,
}

impl CsvWriter<File> {
    /// Create (or truncate) a CSV file for buffered, streaming writes
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)?;
        tracing::debug!(path = %path.display(), "created CSV file for writing");
        Ok(Self::from_writer(file))
    }
}

impl<W: Write> CsvWriter<W> {
    /// Wrap any byte sink; output is buffered internally
    pub fn from_writer(writer: W) -> Self {
        CsvWriter {
            output: Some(BufWriter::new(writer)),
            dialect: Dialect::default(),
            encoder: None,
            buffer: Vec::with_capacity(4096),
            row_count: 0,
        }
    }

    /// Set custom delimiter (builder pattern)
    ///
    /// ```no_run
    /// use csvstream::CsvWriter;
    ///
    /// let mut writer = CsvWriter::new("data.csv")
    ///     .unwrap()
    ///     .delimiter(b';');
    /// ```
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.dialect.delimiter = delimiter;
        self.encoder = None;
        self
    }

    /// Set custom quote character (builder pattern)
    pub fn quote_char(mut self, quote_char: u8) -> Self {
        self.dialect.quote_char = quote_char;
        self.encoder = None;
        self
    }

    /// Replace the whole dialect (builder pattern)
    ///
    /// The dialect is validated before the first row is written. `strict`
    /// has no effect on writing.
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self.encoder = None;
        self
    }

    /// Write one row
    ///
    /// Fails with [`CsvError::StreamUnavailable`] once the writer is closed.
    /// Write failures of the underlying stream are returned unchanged.
    pub fn write_row<I, S>(&mut self, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if self.output.is_none() {
            return Err(CsvError::StreamUnavailable);
        }
        let encoder = self.encoder()?;

        self.buffer.clear();
        encoder.encode_row(fields, &mut self.buffer);
        self.buffer.push(LINE_TERMINATOR);

        if let Some(ref mut output) = self.output {
            output.write_all(&self.buffer)?;
        }
        self.row_count += 1;
        Ok(())
    }

    /// Write one row of optional fields, `None` written as an empty field
    ///
    /// ```
    /// use csvstream::CsvWriter;
    ///
    /// let mut writer = CsvWriter::from_writer(Vec::new());
    /// writer.write_nullable_row([Some("a"), None, Some("c")]).unwrap();
    /// assert_eq!(writer.into_inner().unwrap(), b"a,,c\n");
    /// ```
    pub fn write_nullable_row<I, S>(&mut self, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = Option<S>>,
        S: AsRef<str>,
    {
        self.write_row(fields.into_iter().map(NullableField))
    }

    /// Write many rows, in order
    ///
    /// Stops at the first failing row; rows before it have been written.
    pub fn write_rows<I, R, S>(&mut self, rows: I) -> Result<()>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for row in rows {
            self.write_row(row)?;
        }
        Ok(())
    }

    /// Get the number of rows written
    pub fn row_count(&self) -> u64 {
        self.row_count
    }

    /// Flush buffered output to the underlying stream
    pub fn flush(&mut self) -> Result<()> {
        match self.output {
            Some(ref mut output) => Ok(output.flush()?),
            None => Err(CsvError::StreamUnavailable),
        }
    }

    /// Flush and release the underlying stream
    ///
    /// The stream is released even when the final flush fails. Closing an
    /// already closed writer does nothing.
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut output) = self.output.take() {
            tracing::debug!(rows = self.row_count, "CSV writer released stream");
            output.flush()?;
        }
        Ok(())
    }

    /// Finalize the output, consuming the writer
    pub fn save(mut self) -> Result<()> {
        self.close()
    }

    /// Flush and hand back the underlying stream
    pub fn into_inner(mut self) -> Result<W> {
        let output = self.output.take().ok_or(CsvError::StreamUnavailable)?;
        output.into_inner().map_err(|e| CsvError::Io(e.into_error()))
    }

    fn encoder(&mut self) -> Result<CsvEncoder> {
        if let Some(encoder) = self.encoder {
            return Ok(encoder);
        }
        self.dialect.validate()?;
        let encoder = CsvEncoder::new(self.dialect);
        self.encoder = Some(encoder);
        Ok(encoder)
    }
}

struct NullableField<S>(Option<S>);

impl<S: AsRef<str>> AsRef<str> for NullableField<S> {
    fn as_ref(&self) -> &str {
        self.0.as_ref().map_or("", |s| s.as_ref())
    }
}
