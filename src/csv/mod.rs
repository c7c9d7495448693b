//! CSV tokenizing and encoding primitives

mod encoder;
mod parser;

pub use encoder::CsvEncoder;
pub use parser::CsvParser;
