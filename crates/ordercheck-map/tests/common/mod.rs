//! In-memory mapping server shared by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;

use ordercheck_map::MappingApi;
use ordercheck_model::{
    ApiError, ColumnConfig, ConfirmAck, ConfirmRequest, ErrorBody, FileId, PreviewResponse,
    SpecId,
};
use serde_json::json;

pub struct FakeApi {
    pub config: ColumnConfig,
    pub preview: Result<PreviewResponse, ApiError>,
    pub confirm: Result<ConfirmAck, ApiError>,
    pub preview_calls: RefCell<Vec<FileId>>,
    pub confirm_calls: RefCell<Vec<ConfirmRequest>>,
}

impl FakeApi {
    pub fn new(preview: PreviewResponse) -> Self {
        Self {
            config: scenario_config(),
            preview: Ok(preview),
            confirm: Ok(created_ack()),
            preview_calls: RefCell::new(Vec::new()),
            confirm_calls: RefCell::new(Vec::new()),
        }
    }

    pub fn failing_preview(status: u16, error: &str) -> Self {
        let mut api = Self::new(PreviewResponse::default());
        api.preview = Err(server_error(status, error));
        api
    }

    pub fn last_confirm(&self) -> Option<ConfirmRequest> {
        self.confirm_calls.borrow().last().cloned()
    }
}

impl MappingApi for FakeApi {
    fn column_config(&self) -> Result<ColumnConfig, ApiError> {
        Ok(self.config.clone())
    }

    fn preview_mapping(&self, file_id: &FileId) -> Result<PreviewResponse, ApiError> {
        self.preview_calls.borrow_mut().push(file_id.clone());
        self.preview.clone()
    }

    fn confirm_mapping(&self, request: &ConfirmRequest) -> Result<ConfirmAck, ApiError> {
        self.confirm_calls.borrow_mut().push(request.clone());
        self.confirm.clone()
    }
}

pub fn server_error(status: u16, error: &str) -> ApiError {
    let body = ErrorBody {
        success: Some(false),
        error: Some(error.to_string()),
        ..ErrorBody::default()
    };
    ApiError::server(status, body, "request failed")
}

pub fn file_id(value: &str) -> FileId {
    FileId::new(value).unwrap()
}

/// Required `item_id`, `product_name`; optional `size`, `color`.
pub fn scenario_config() -> ColumnConfig {
    serde_json::from_value(json!({
        "required_columns": ["item_id", "product_name"],
        "optional_columns": ["size", "color"],
        "column_mappings": {
            "item_id": ["产品编号", "货号"],
            "product_name": ["产品名称", "名称"]
        }
    }))
    .unwrap()
}

/// The server recognised only the item column.
pub fn incomplete_preview() -> PreviewResponse {
    serde_json::from_value(json!({
        "mapping_success": false,
        "mapped_columns": {"产品编号": "item_id"},
        "unmapped_columns": ["产品名称", "颜色"],
        "missing_required": ["product_name"],
        "original_columns": ["产品编号", "产品名称", "颜色"],
        "preview_data": [
            {"row_index": 1, "original": {"产品编号": "A-100", "产品名称": "衬衫", "颜色": "白"}},
            {"row_index": 2, "original": {"产品编号": 200, "产品名称": "长裤", "颜色": null}}
        ],
        "suggestions": {
            "产品名称": {"mapped_to": null, "confidence": 0.4, "suggestions": ["product_name"]}
        },
        "sample_count": 2,
        "total_rows": 40
    }))
    .unwrap()
}

/// Every required column recognised.
pub fn complete_preview() -> PreviewResponse {
    serde_json::from_value(json!({
        "mapping_success": true,
        "mapped_columns": {"产品编号": "item_id", "产品名称": "product_name"},
        "unmapped_columns": [],
        "missing_required": [],
        "original_columns": ["产品编号", "产品名称"],
        "preview_data": [
            {"row_index": 1, "original": {"产品编号": "A-100", "产品名称": "衬衫"}}
        ]
    }))
    .unwrap()
}

pub fn created_ack() -> ConfirmAck {
    ConfirmAck {
        success: true,
        message: Some("规格表上传成功".to_string()),
        spec_id: Some(SpecId::new("spec-1").unwrap()),
        filename: Some("规格表.xlsx".to_string()),
        record_count: Some(40),
        ..ConfirmAck::default()
    }
}
