//! Tabular previews of stored Excel files.
//!
//! Spec previews (`GET /api/preview_spec/:id`) and comparison previews
//! (`GET /api/preview_comparison/:id`) share one shape: column names plus
//! rows keyed by column name. PDF table previews send positional rows
//! instead; see [`crate::pdf::ExtractedTable`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::preview::display_cell;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetPreview {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub data: Vec<BTreeMap<String, Value>>,
    #[serde(default)]
    pub total_rows: Option<u64>,
    #[serde(default)]
    pub preview_rows: Option<u64>,
    /// Rows flagged as failing (comparison results only).
    #[serde(default)]
    pub error_rows: Option<u64>,
}

impl SheetPreview {
    /// Declared columns, or the keys of the first row when none are declared.
    pub fn column_names(&self) -> Vec<String> {
        if !self.columns.is_empty() {
            return self.columns.clone();
        }
        self.data
            .first()
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Display text of every row, in [`Self::column_names`] order.
    pub fn rows(&self) -> Vec<Vec<String>> {
        let columns = self.column_names();
        self.data
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|column| row.get(column).map(display_cell).unwrap_or_default())
                    .collect()
            })
            .collect()
    }

    /// True when the server sent fewer rows than the file holds.
    pub fn is_truncated(&self) -> bool {
        self.total_rows
            .is_some_and(|total| total > self.data.len() as u64)
    }
}
