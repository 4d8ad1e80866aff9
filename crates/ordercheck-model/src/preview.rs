//! Mapping preview payloads (`POST /api/preview_mapping`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::FileId;

/// Request body for a mapping preview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewRequest {
    pub file_id: FileId,
}

/// The server's column-mapping suggestion for an uploaded file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreviewResponse {
    /// True when every required standard column was recognised.
    #[serde(default)]
    pub mapping_success: bool,
    /// original column -> standard column
    #[serde(default)]
    pub mapped_columns: BTreeMap<String, String>,
    #[serde(default)]
    pub unmapped_columns: Vec<String>,
    #[serde(default)]
    pub missing_required: Vec<String>,
    /// Header row of the uploaded file, in file order.
    #[serde(default)]
    pub original_columns: Vec<String>,
    #[serde(default)]
    pub preview_data: Vec<PreviewRow>,
    /// Per unmapped column hints.
    #[serde(default)]
    pub suggestions: BTreeMap<String, ColumnSuggestion>,
    #[serde(default)]
    pub sample_count: Option<usize>,
    #[serde(default)]
    pub total_rows: Option<usize>,
}

/// One sample row of the uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewRow {
    pub row_index: u64,
    /// original column -> cell value
    #[serde(default)]
    pub original: BTreeMap<String, Value>,
}

impl PreviewRow {
    /// Display text of a cell; absent and null cells render empty.
    pub fn cell_text(&self, column: &str) -> String {
        self.original.get(column).map(display_cell).unwrap_or_default()
    }
}

/// Server hint for a column it could not map with confidence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnSuggestion {
    #[serde(default)]
    pub mapped_to: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// Render a JSON cell value the way the preview tables show it.
pub fn display_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn display_cell_formats_scalars() {
        assert_eq!(display_cell(&Value::Null), "");
        assert_eq!(display_cell(&json!("T恤")), "T恤");
        assert_eq!(display_cell(&json!(12.5)), "12.5");
        assert_eq!(display_cell(&json!(true)), "true");
    }

    #[test]
    fn parses_partial_preview() {
        let json = r#"{
            "mapping_success": false,
            "mapped_columns": {"产品编号": "item_id"},
            "missing_required": ["product_name"],
            "original_columns": ["产品编号", "产品名称"],
            "preview_data": [
                {"row_index": 1, "original": {"产品编号": "A-1", "产品名称": null}}
            ]
        }"#;
        let preview: PreviewResponse = serde_json::from_str(json).unwrap();
        assert!(!preview.mapping_success);
        assert!(preview.unmapped_columns.is_empty());
        assert_eq!(preview.preview_data[0].cell_text("产品编号"), "A-1");
        assert_eq!(preview.preview_data[0].cell_text("产品名称"), "");
        assert_eq!(preview.preview_data[0].cell_text("missing"), "");
    }
}
