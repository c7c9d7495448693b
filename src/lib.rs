//! # csvstream
//!
//! Minimal streaming CSV codec: a single-pass tokenizing reader and a
//! minimally quoting writer. Files of any size are processed row by row
//! without loading them into memory.
//!
//! ## Features
//!
//! - **Streaming**: one row in memory at a time, on both sides
//! - **Quoted fields**: delimiters, quotes (escaped by doubling) and newlines inside fields
//! - **Permissive by default**: malformed input resolves to a best-effort row;
//!   opt-in strict mode reports it with a [`Position`]
//! - **Round trip**: anything [`CsvWriter`] writes, [`CsvReader`] reads back
//!   unchanged under the same [`Dialect`]
//!
//! ## Example
//!
//! ```no_run
//! use csvstream::{CsvReader, CsvWriter};
//!
//! let mut reader = CsvReader::open("input.csv")?;
//! let mut writer = CsvWriter::new("output.csv")?.delimiter(b';');
//!
//! for row in reader.rows() {
//!     writer.write_row(row?)?;
//! }
//! writer.save()?;
//! # Ok::<(), csvstream::CsvError>(())
//! ```

pub mod csv;
pub mod csv_reader;
pub mod csv_writer;
pub mod error;
pub mod types;

pub use csv_reader::{CsvReader, CsvRowIterator, IntoRows};
pub use csv_writer::CsvWriter;
pub use error::{CsvError, MalformedKind, Result};
pub use types::{Dialect, Position, Row};
