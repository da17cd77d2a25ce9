//! Tabular parsing
//!
//! This module turns raw CSV bytes into a typed [`crate::models::ParsedTable`].

mod parser;

pub use parser::{parse, ParseOutcome, TabularParser};
