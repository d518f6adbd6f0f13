//! Delimited-text (DSV) sources.

mod options;
mod reader;
mod source;
mod tokenizer;

pub use options::DsvOptions;
pub use source::{DsvRows, DsvSource};
