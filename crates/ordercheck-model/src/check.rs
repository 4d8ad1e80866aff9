//! Order-versus-spec comparison payloads (`POST /api/compare_orders`).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{FileId, ResultId, SpecId};

/// Request body for comparing a converted order file against a stored spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareRequest {
    pub order_file_id: FileId,
    pub spec_id: SpecId,
    /// Also verify `quantity * unit_price == total_price` per row.
    pub check_total_calc: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareResponse {
    pub result_file_id: ResultId,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub stats: CompareStats,
    /// Plain-text summary prepared by the server.
    #[serde(default)]
    pub summary: Option<String>,
}

/// Row counts of one comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareStats {
    #[serde(default)]
    pub total_records: u64,
    #[serde(default)]
    pub error_records: u64,
    /// error code -> number of rows with that problem
    #[serde(default)]
    pub error_types: BTreeMap<String, u64>,
}

impl CompareStats {
    pub fn passed_records(&self) -> u64 {
        self.total_records.saturating_sub(self.error_records)
    }

    /// Share of rows without problems, in percent. An empty order passes.
    pub fn pass_rate(&self) -> f64 {
        if self.total_records == 0 {
            return 100.0;
        }
        self.passed_records() as f64 / self.total_records as f64 * 100.0
    }

    /// Non-zero error counts, in the order the checks run.
    pub fn error_counts(&self) -> Vec<(CheckErrorKind, u64)> {
        let mut counts: Vec<_> = self
            .error_types
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(code, count)| (CheckErrorKind::parse(code), *count))
            .collect();
        counts.sort_by(|a, b| a.0.cmp(&b.0));
        counts
    }
}

/// Problem found on an order row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CheckErrorKind {
    ProductNotFound,
    SizeMismatch,
    ColorMismatch,
    PriceMismatch,
    TotalCalcError,
    Other(String),
}

impl CheckErrorKind {
    pub fn parse(code: &str) -> Self {
        match code {
            "PRODUCT_NOT_FOUND" => Self::ProductNotFound,
            "SIZE_MISMATCH" => Self::SizeMismatch,
            "COLOR_MISMATCH" => Self::ColorMismatch,
            "PRICE_MISMATCH" => Self::PriceMismatch,
            "TOTAL_CALC_ERROR" => Self::TotalCalcError,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Self::ProductNotFound => "PRODUCT_NOT_FOUND",
            Self::SizeMismatch => "SIZE_MISMATCH",
            Self::ColorMismatch => "COLOR_MISMATCH",
            Self::PriceMismatch => "PRICE_MISMATCH",
            Self::TotalCalcError => "TOTAL_CALC_ERROR",
            Self::Other(code) => code,
        }
    }

    /// Unknown codes display as themselves.
    pub fn display_name(&self) -> &str {
        match self {
            Self::ProductNotFound => "Product ID not in spec",
            Self::SizeMismatch => "Size mismatch",
            Self::ColorMismatch => "Color mismatch",
            Self::PriceMismatch => "Unit price mismatch",
            Self::TotalCalcError => "Total price miscalculated",
            Self::Other(code) => code,
        }
    }
}

impl fmt::Display for CheckErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
