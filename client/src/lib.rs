//! Client library for the Dataset Anchor service
//!
//! Uploads CSV files for validation and mints tokens for the metadata the
//! service returns.

pub mod anchor;

pub use anchor::{AnchorClient, ClientError, MintResponse, MintedDataset, Result, ValidationReport};
