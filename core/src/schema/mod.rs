//! Dataset validation, type inference and statistics
//!
//! The validator decides whether an upload may be minted. Inference and
//! statistics describe a table that has already passed validation.

mod validator;
mod inference;
mod stats;

pub use validator::{DatasetValidator, Severity, ValidationIssue};
pub use inference::{infer_schema, infer_value_type, is_date_literal};
pub use stats::{calculate_stats, summarize};
