//! Mapping confirmation payloads (`POST /api/confirm_mapping`).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{FileId, SpecId};

/// Which mapping the user confirms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingMode {
    /// The server's automatic suggestion.
    #[default]
    Auto,
    /// The user-edited override table.
    Custom,
}

impl MappingMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Custom => "custom",
        }
    }

    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Auto => "Automatic mapping",
            Self::Custom => "Custom mapping",
        }
    }
}

impl fmt::Display for MappingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body for confirming a mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmRequest {
    pub file_id: FileId,
    pub mapping_type: MappingMode,
    pub original_filename: String,
    /// standard column -> original column; only sent in custom mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_mapping: Option<BTreeMap<String, String>>,
}

/// Acknowledgment for a created spec.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmAck {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub spec_id: Option<SpecId>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub record_count: Option<u64>,
    #[serde(default)]
    pub upload_time: Option<String>,
    #[serde(default)]
    pub mapping_type: Option<MappingMode>,
    #[serde(default)]
    pub mapping_count: Option<u64>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn auto_request_omits_column_mapping() {
        let request = ConfirmRequest {
            file_id: FileId::new("f-1").unwrap(),
            mapping_type: MappingMode::Auto,
            original_filename: "spec.xlsx".to_string(),
            column_mapping: None,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "file_id": "f-1",
                "mapping_type": "auto",
                "original_filename": "spec.xlsx"
            })
        );
    }

    #[test]
    fn parses_created_spec_ack() {
        let ack: ConfirmAck = serde_json::from_value(json!({
            "success": true,
            "message": "规格表上传成功",
            "spec_id": "c0ffee",
            "filename": "spec.xlsx",
            "record_count": 42,
            "upload_time": "2024-05-01T10:00:00",
            "mapping_type": "custom",
            "mapping_count": 2
        }))
        .unwrap();
        assert!(ack.success);
        assert_eq!(ack.spec_id.unwrap().as_str(), "c0ffee");
        assert_eq!(ack.mapping_type, Some(MappingMode::Custom));
    }
}
