//! Order PDF upload, conversion and converted-file payloads (`/api/pdf/*`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::FileId;
use crate::preview::display_cell;

/// Response of `POST /api/pdf/upload`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdfUpload {
    pub file_id: FileId,
    #[serde(default)]
    pub original_filename: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response of `POST /api/pdf/convert/:id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    pub file_id: FileId,
    #[serde(default)]
    pub message: Option<String>,
    /// Name of the Excel file on the server.
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub tables_count: usize,
    #[serde(default)]
    pub preview_data: Vec<ExtractedTable>,
}

/// Response of `GET /api/pdf/preview/:id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PdfPreview {
    #[serde(default)]
    pub tables_count: usize,
    #[serde(default)]
    pub preview_data: Vec<ExtractedTable>,
}

/// One table extracted from an order PDF, truncated for preview.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedTable {
    #[serde(default = "first")]
    pub table_index: u32,
    #[serde(default = "first")]
    pub page: u32,
    /// Extraction confidence in `0.0..=1.0`.
    #[serde(default)]
    pub accuracy: Option<f64>,
    #[serde(default)]
    pub columns: Vec<String>,
    /// Positional rows.
    #[serde(default)]
    pub data: Vec<Vec<Value>>,
    #[serde(default)]
    pub total_rows: Option<u64>,
}

fn first() -> u32 {
    1
}

impl ExtractedTable {
    /// Display text of every row, padded or cut to the column count.
    pub fn rows(&self) -> Vec<Vec<String>> {
        let width = self.columns.len();
        self.data
            .iter()
            .map(|row| {
                let mut cells: Vec<String> = row.iter().map(display_cell).collect();
                if width > 0 {
                    cells.resize(width, String::new());
                }
                cells
            })
            .collect()
    }
}

/// One converted order file (`GET /api/pdf/list_converted`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertedFile {
    pub file_id: FileId,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub original_filename: Option<String>,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub convert_time: String,
    #[serde(default)]
    pub record_count: u64,
    /// False when only the metadata survived.
    #[serde(default)]
    pub exists: bool,
}

impl ConvertedFile {
    pub fn display_name(&self) -> String {
        match &self.filename {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("converted_{}.xlsx", self.file_id),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertedList {
    #[serde(default)]
    pub files: Vec<ConvertedFile>,
}

impl ConvertedList {
    /// Files whose Excel output is gone.
    pub fn missing(&self) -> impl Iterator<Item = &ConvertedFile> {
        self.files.iter().filter(|file| !file.exists)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_conversion_with_positional_rows() {
        let conversion: Conversion = serde_json::from_value(json!({
            "message": "转换成功",
            "file_id": "p-1",
            "excel_filename": "p-1.xlsx",
            "filename": "order_p-1.xlsx",
            "tables_count": 1,
            "preview_data": [{
                "page": 2,
                "accuracy": 0.93,
                "columns": ["货号", "数量", "单价"],
                "data": [["A-1", 3, 9.5], ["A-2", null]],
                "total_rows": 40,
                "total_columns": 3
            }]
        }))
        .unwrap();
        let table = &conversion.preview_data[0];
        assert_eq!(table.table_index, 1);
        assert_eq!(table.page, 2);
        assert_eq!(
            table.rows(),
            vec![
                vec!["A-1".to_string(), "3".to_string(), "9.5".to_string()],
                vec!["A-2".to_string(), String::new(), String::new()],
            ]
        );
    }

    #[test]
    fn converted_list_flags_missing_files() {
        let list: ConvertedList = serde_json::from_value(json!({
            "files": [
                {"file_id": "a", "filename": "a.xlsx", "exists": true, "record_count": 12},
                {"file_id": "b", "filename": "", "exists": false}
            ]
        }))
        .unwrap();
        let missing: Vec<_> = list.missing().collect();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].display_name(), "converted_b.xlsx");
        assert_eq!(list.files[0].display_name(), "a.xlsx");
    }
}
