//! Tokenization readiness
//!
//! Advisory checks on built metadata. Nothing here blocks a mint.

use serde::{Deserialize, Serialize};

use crate::error::{to_serialization_error, Result};
use crate::models::DatasetMetadata;

/// Full metadata size above which a recommendation is raised
pub const MAX_RECOMMENDED_METADATA_BYTES: usize = 100 * 1024;

/// Valid-row ratio below which a recommendation is raised
pub const LOW_QUALITY_RATIO: f64 = 0.5;

/// Valid-row ratio below which tokenization is discouraged
pub const MIN_QUALITY_RATIO: f64 = 0.3;

/// Readiness verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenizationReadiness {
    /// Whether the dataset is considered suitable for minting
    pub can_tokenize: bool,

    /// Human-readable suggestions, possibly empty
    pub recommendations: Vec<String>,
}

/// Assess whether built metadata is suitable for tokenization
pub fn assess_tokenization(metadata: &DatasetMetadata) -> Result<TokenizationReadiness> {
    let mut recommendations = Vec::new();

    let quality_ratio = if metadata.summary.total_rows == 0 {
        0.0
    } else {
        metadata.summary.valid_rows as f64 / metadata.summary.total_rows as f64
    };
    if quality_ratio < LOW_QUALITY_RATIO {
        recommendations.push(format!(
            "Data quality is low ({:.0}% valid rows). Consider cleaning data before tokenization.",
            quality_ratio * 100.0
        ));
    }

    let metadata_size = serde_json::to_vec(metadata)
        .map_err(to_serialization_error)?
        .len();
    if metadata_size > MAX_RECOMMENDED_METADATA_BYTES {
        recommendations.push(format!(
            "Metadata size ({:.2}KB) is large. Consider reducing columns or row count.",
            metadata_size as f64 / 1024.0
        ));
    }

    if metadata.column_count() < 2 {
        recommendations.push(
            "Dataset has very few columns. Consider if this data is suitable for tokenization."
                .to_string(),
        );
    }
    if metadata.row_count < 10 {
        recommendations.push(
            "Dataset has very few rows. Consider combining with more data before tokenization."
                .to_string(),
        );
    }

    Ok(TokenizationReadiness {
        can_tokenize: quality_ratio >= MIN_QUALITY_RATIO
            && metadata_size <= MAX_RECOMMENDED_METADATA_BYTES,
        recommendations,
    })
}
