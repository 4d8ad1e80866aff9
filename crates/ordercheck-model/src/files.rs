//! Upload, spec listing and converted-file status payloads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::preview::ColumnSuggestion;
use crate::{FileId, SpecId};

/// Response of `POST /api/upload_for_mapping`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub file_id: FileId,
    #[serde(default)]
    pub original_filename: Option<String>,
    #[serde(default)]
    pub column_count: Option<usize>,
    #[serde(default)]
    pub row_count: Option<usize>,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub auto_mapping_success: Option<bool>,
    #[serde(default)]
    pub missing_required: Vec<String>,
    #[serde(default)]
    pub suggestions: BTreeMap<String, ColumnSuggestion>,
}

/// One stored spec as listed by `GET /api/list_specs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecSummary {
    pub spec_id: SpecId,
    pub filename: String,
    #[serde(default)]
    pub upload_time: String,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub record_count: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecListResponse {
    #[serde(default)]
    pub specs: Vec<SpecSummary>,
}

/// Status of a converted order file (`GET /api/pdf/status/:id`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStatus {
    #[serde(default)]
    pub file_id: Option<String>,
    #[serde(default)]
    pub pdf_exists: bool,
    #[serde(default)]
    pub excel_exists: bool,
    #[serde(default)]
    pub metadata_exists: bool,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
}

/// Generic `{success?, message?}` acknowledgment (e.g. spec deletion).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Acknowledgment {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_spec_list() {
        let list: SpecListResponse = serde_json::from_value(json!({
            "specs": [{
                "spec_id": "s-1",
                "filename": "规格表.xlsx",
                "upload_time": "2024-05-01T10:00:00",
                "file_size": 2048,
                "record_count": 12
            }]
        }))
        .unwrap();
        assert_eq!(list.specs.len(), 1);
        assert_eq!(list.specs[0].record_count, 12);
    }

    #[test]
    fn file_status_defaults_missing_flags() {
        let status: FileStatus = serde_json::from_value(json!({"file_id": "x"})).unwrap();
        assert!(!status.excel_exists);
        assert!(status.status.is_none());
    }
}
