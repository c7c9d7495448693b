//! CSV reading with streaming row iteration

use crate::csv::CsvParser;
use crate::error::{CsvError, Result};
use crate::types::{Dialect, Position, Row};
use std::fs::File;
use std::io::{BufReader, Read};
use std::iter::FusedIterator;
use std::path::Path;

const READ_BUFFER_SIZE: usize = 64 * 1024;

enum Source<R> {
    Open(BufReader<R>),
    Exhausted,
    Closed,
}

/// Streaming CSV reader
///
/// Reads rows one at a time from any [`Read`] source; only the row being
/// tokenized is held in memory. The reader owns its stream for its whole
/// lifetime and releases it on exhaustion, on the first error, on
/// [`close`](CsvReader::close), or when dropped.
///
/// # Examples
///
/// ```no_run
/// use csvstream::CsvReader;
///
/// let mut reader = CsvReader::open("data.csv").unwrap();
///
/// for row_result in reader.rows() {
///     let row = row_result.unwrap();
///     println!("{:?}", row);
/// }
/// ```
///
/// # With Headers
///
/// ```
/// use csvstream::CsvReader;
///
/// let data = "id,name\n1,Alice\n2,Bob\n";
/// let mut reader = CsvReader::from_reader(data.as_bytes()).has_header(true);
///
/// assert_eq!(reader.headers().unwrap(), Some(&["id".to_string(), "name".to_string()][..]));
/// let rows: Vec<_> = reader.rows().collect::<Result<_, _>>().unwrap();
/// assert_eq!(rows, vec![vec!["1", "Alice"], vec!["2", "Bob"]]);
/// ```
pub struct CsvReader<R: Read> {
    source: Source<R>,
    dialect: Dialect,
    parser: Option<CsvParser>,
    position: Position,
    row_count: u64,
    has_header: bool,
    headers: Option<Row>,
}

impl CsvReader<File> {
    /// Open a CSV file for buffered, streaming reads
    ///
    /// ```no_run
    /// use csvstream::CsvReader;
    ///
    /// let reader = CsvReader::open("data.csv").unwrap().delimiter(b';');
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        tracing::debug!(path = %path.display(), "opened CSV file for reading");
        Ok(Self::from_reader(file))
    }
}

impl<R: Read> CsvReader<R> {
    /// Wrap any byte source; it is buffered internally
    pub fn from_reader(reader: R) -> Self {
        CsvReader {
            source: Source::Open(BufReader::with_capacity(READ_BUFFER_SIZE, reader)),
            dialect: Dialect::default(),
            parser: None,
            position: Position::default(),
            row_count: 0,
            has_header: false,
            headers: None,
        }
    }

    /// Set custom delimiter (builder pattern)
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.dialect.delimiter = delimiter;
        self.parser = None;
        self
    }

    /// Set custom quote character (builder pattern)
    pub fn quote_char(mut self, quote_char: u8) -> Self {
        self.dialect.quote_char = quote_char;
        self.parser = None;
        self
    }

    /// Reject malformed input instead of resolving it permissively (builder pattern)
    pub fn strict(mut self, strict: bool) -> Self {
        self.dialect.strict = strict;
        self.parser = None;
        self
    }

    /// Replace the whole dialect (builder pattern)
    ///
    /// The dialect is validated before the first row is read; an invalid one
    /// makes every read fail with [`CsvError::InvalidDialect`].
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self.parser = None;
        self
    }

    /// Treat the first row as a header row (builder pattern)
    ///
    /// The header row is captured and exposed via [`headers`](CsvReader::headers)
    /// instead of being returned as data.
    pub fn has_header(mut self, has: bool) -> Self {
        self.has_header = has;
        self
    }

    /// Header row, reading it first if needed
    ///
    /// Returns `Ok(None)` when headers are disabled or the input is empty.
    pub fn headers(&mut self) -> Result<Option<&[String]>> {
        self.ensure_headers()?;
        Ok(self.headers.as_deref())
    }

    /// Read a single row
    ///
    /// Returns `Ok(None)` once the input is exhausted, and keeps doing so on
    /// later calls. Fails with [`CsvError::StreamUnavailable`] after
    /// [`close`](CsvReader::close) or after an earlier error.
    ///
    /// ```
    /// use csvstream::CsvReader;
    ///
    /// let mut reader = CsvReader::from_reader("\"a,b\",c\n".as_bytes());
    ///
    /// assert_eq!(reader.read_row().unwrap(), Some(vec!["a,b".to_string(), "c".to_string()]));
    /// assert_eq!(reader.read_row().unwrap(), None);
    /// ```
    pub fn read_row(&mut self) -> Result<Option<Row>> {
        self.ensure_headers()?;
        let row = self.next_record()?;
        if row.is_some() {
            self.row_count += 1;
        }
        Ok(row)
    }

    /// Borrowing iterator over the remaining rows
    ///
    /// The iterator stops after the first error.
    pub fn rows(&mut self) -> CsvRowIterator<'_, R> {
        CsvRowIterator {
            reader: self,
            done: false,
        }
    }

    /// Number of data rows returned so far (header excluded)
    pub fn row_count(&self) -> u64 {
        self.row_count
    }

    /// Current tokenizer position in the input
    pub fn position(&self) -> Position {
        self.position
    }

    /// Release the underlying stream
    ///
    /// Later reads fail with [`CsvError::StreamUnavailable`]. Dropping the
    /// reader has the same effect on the stream.
    pub fn close(&mut self) {
        self.release(Source::Closed);
    }

    fn ensure_headers(&mut self) -> Result<()> {
        if self.has_header && self.headers.is_none() {
            self.headers = self.next_record()?;
        }
        Ok(())
    }

    fn next_record(&mut self) -> Result<Option<Row>> {
        if matches!(self.source, Source::Closed) {
            return Err(CsvError::StreamUnavailable);
        }
        let parser = match self.parser() {
            Ok(parser) => parser,
            Err(e) => {
                self.release(Source::Closed);
                return Err(e);
            }
        };
        let Source::Open(input) = &mut self.source else {
            return Ok(None);
        };

        match parser.read_row(input, &mut self.position) {
            Ok(Some(row)) => Ok(Some(row)),
            Ok(None) => {
                self.release(Source::Exhausted);
                Ok(None)
            }
            Err(e) => {
                self.release(Source::Closed);
                Err(e)
            }
        }
    }

    fn parser(&mut self) -> Result<CsvParser> {
        if let Some(parser) = self.parser {
            return Ok(parser);
        }
        self.dialect.validate()?;
        let parser = CsvParser::new(self.dialect);
        self.parser = Some(parser);
        Ok(parser)
    }

    fn release(&mut self, next: Source<R>) {
        if let Source::Open(_) = self.source {
            tracing::debug!(
                rows = self.row_count,
                position = %self.position,
                "CSV reader released stream"
            );
        }
        self.source = next;
    }
}

/// Borrowing iterator over CSV rows
pub struct CsvRowIterator<'a, R: Read> {
    reader: &'a mut CsvReader<R>,
    done: bool,
}

impl<R: Read> Iterator for CsvRowIterator<'_, R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        next_item(self.reader, &mut self.done)
    }
}

impl<R: Read> FusedIterator for CsvRowIterator<'_, R> {}

/// Owning, single-pass iterator over CSV rows
pub struct IntoRows<R: Read> {
    reader: CsvReader<R>,
    done: bool,
}

impl<R: Read> IntoRows<R> {
    /// The reader behind this iterator, for headers and position
    pub fn reader(&self) -> &CsvReader<R> {
        &self.reader
    }
}

impl<R: Read> Iterator for IntoRows<R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        next_item(&mut self.reader, &mut self.done)
    }
}

impl<R: Read> FusedIterator for IntoRows<R> {}

impl<R: Read> IntoIterator for CsvReader<R> {
    type Item = Result<Row>;
    type IntoIter = IntoRows<R>;

    fn into_iter(self) -> Self::IntoIter {
        IntoRows {
            reader: self,
            done: false,
        }
    }
}

fn next_item<R: Read>(reader: &mut CsvReader<R>, done: &mut bool) -> Option<Result<Row>> {
    if *done {
        return None;
    }
    match reader.read_row() {
        Ok(Some(row)) => Some(Ok(row)),
        Ok(None) => {
            *done = true;
            None
        }
        Err(e) => {
            *done = true;
            Some(Err(e))
        }
    }
}
