//! Blocking client for the spec server.

use std::path::Path;
use std::time::Duration;

use ordercheck_map::MappingApi;
use ordercheck_model::{
    Acknowledgment, ApiError, ColumnConfig, ColumnConfigResponse, ColumnMappingInfo,
    CompareRequest, CompareResponse, ConfirmAck, ConfirmRequest, Conversion, ConvertedFile,
    ConvertedList, FileId, FileStatus, PdfPreview, PdfUpload, PreviewRequest, PreviewResponse,
    ResultId, SheetPreview, SpecId, SpecListResponse, SpecSummary, UploadResponse,
};
use reqwest::blocking::multipart::Form;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::USER_AGENT;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::response::{error_response, network, parse_response};

/// Default server address.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Connection settings for [`SpecClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    /// No timeout when unset.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

/// Client for the spec-mapping endpoints.
#[derive(Debug, Clone)]
pub struct SpecClient {
    client: Client,
    base_url: String,
}

impl SpecClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(network)?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL of an API path.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `POST /api/upload_for_mapping` with the spec file as multipart `file`.
    pub fn upload_for_mapping(&self, path: &Path) -> Result<UploadResponse, ApiError> {
        debug!(path = %path.display(), "Uploading spec file for mapping");
        self.send(
            self.client
                .post(self.url("/api/upload_for_mapping"))
                .multipart(file_form(path)?),
            "Upload failed",
        )
    }

    /// `GET /api/preview_spec/:id`
    pub fn preview_spec(&self, spec_id: &SpecId) -> Result<SheetPreview, ApiError> {
        self.send(
            self.client
                .get(self.url(&format!("/api/preview_spec/{spec_id}"))),
            "Preview failed",
        )
    }

    /// `GET /api/column_mapping_info`, the format guide for spec files.
    pub fn column_mapping_info(&self) -> Result<ColumnMappingInfo, ApiError> {
        self.send(
            self.client.get(self.url("/api/column_mapping_info")),
            "Could not load the format guide",
        )
    }

    /// `POST /api/compare_orders`
    pub fn compare_orders(&self, request: &CompareRequest) -> Result<CompareResponse, ApiError> {
        debug!(
            order_file_id = %request.order_file_id,
            spec_id = %request.spec_id,
            check_total_calc = request.check_total_calc,
            "Comparing order against spec"
        );
        self.send(
            self.client
                .post(self.url("/api/compare_orders"))
                .json(request),
            "Order check failed",
        )
    }

    /// `GET /api/preview_comparison/:id`
    pub fn preview_comparison(&self, result_id: &ResultId) -> Result<SheetPreview, ApiError> {
        self.send(
            self.client
                .get(self.url(&format!("/api/preview_comparison/{result_id}"))),
            "Preview failed",
        )
    }

    /// `GET /api/download_comparison/:id`, returning the result workbook.
    pub fn download_comparison(&self, result_id: &ResultId) -> Result<Vec<u8>, ApiError> {
        self.download(
            self.url(&format!("/api/download_comparison/{result_id}")),
            "Download failed",
        )
    }

    /// `POST /api/pdf/upload` with the order PDF as multipart `file`.
    pub fn upload_pdf(&self, path: &Path) -> Result<PdfUpload, ApiError> {
        debug!(path = %path.display(), "Uploading order PDF");
        self.send(
            self.client
                .post(self.url("/api/pdf/upload"))
                .multipart(file_form(path)?),
            "Upload failed",
        )
    }

    /// `POST /api/pdf/convert/:id`
    pub fn convert_pdf(&self, file_id: &FileId) -> Result<Conversion, ApiError> {
        self.send(
            self.client
                .post(self.url(&format!("/api/pdf/convert/{file_id}"))),
            "Conversion failed",
        )
    }

    /// `GET /api/pdf/preview/:id`, tables re-extracted from the uploaded PDF.
    pub fn preview_pdf(&self, file_id: &FileId) -> Result<PdfPreview, ApiError> {
        self.send(
            self.client
                .get(self.url(&format!("/api/pdf/preview/{file_id}"))),
            "Preview failed",
        )
    }

    /// `GET /api/pdf/list_converted`, newest first.
    pub fn list_converted(&self) -> Result<Vec<ConvertedFile>, ApiError> {
        let response: ConvertedList = self.send(
            self.client.get(self.url("/api/pdf/list_converted")),
            "Could not load the converted files",
        )?;
        Ok(response.files)
    }

    /// `DELETE /api/pdf/delete_converted/:id`
    pub fn delete_converted(&self, file_id: &FileId) -> Result<Acknowledgment, ApiError> {
        self.send(
            self.client
                .delete(self.url(&format!("/api/pdf/delete_converted/{file_id}"))),
            "Delete failed",
        )
    }

    /// `GET /api/pdf/download_converted/:id`, returning the order workbook.
    pub fn download_converted(&self, file_id: &FileId) -> Result<Vec<u8>, ApiError> {
        self.download(
            self.url(&format!("/api/pdf/download_converted/{file_id}")),
            "Download failed",
        )
    }

    /// `GET /api/list_specs`
    pub fn list_specs(&self) -> Result<Vec<SpecSummary>, ApiError> {
        let response: SpecListResponse = self.send(
            self.client.get(self.url("/api/list_specs")),
            "Could not load the spec list",
        )?;
        Ok(response.specs)
    }

    /// `DELETE /api/delete_spec/:id`
    pub fn delete_spec(&self, spec_id: &SpecId) -> Result<Acknowledgment, ApiError> {
        self.send(
            self.client
                .delete(self.url(&format!("/api/delete_spec/{spec_id}"))),
            "Delete failed",
        )
    }

    /// `GET /api/pdf/status/:id`
    pub fn file_status(&self, file_id: &FileId) -> Result<FileStatus, ApiError> {
        self.send(
            self.client
                .get(self.url(&format!("/api/pdf/status/{file_id}"))),
            "Could not check the file status",
        )
    }

    /// `GET /api/download_spec_template?rows=N`, returning the file bytes.
    pub fn download_template(&self, rows: u32) -> Result<Vec<u8>, ApiError> {
        self.download(
            format!("{}?rows={rows}", self.url("/api/download_spec_template")),
            "Template download failed",
        )
    }

    fn download(&self, url: String, fallback: &str) -> Result<Vec<u8>, ApiError> {
        debug!(%url, "Downloading file");
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, user_agent())
            .send()
            .map_err(network)?;
        let status = response.status().as_u16();
        if !response.status().is_success() {
            let text = response.text().map_err(network)?;
            return Err(error_response(status, &text, fallback));
        }
        let bytes = response.bytes().map_err(network)?;
        Ok(bytes.to_vec())
    }

    fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> Result<T, ApiError> {
        let response = request
            .header(USER_AGENT, user_agent())
            .send()
            .map_err(network)?;
        let status = response.status().as_u16();
        let url = response.url().path().to_string();
        let text = response.text().map_err(network)?;
        debug!(%url, status, bytes = text.len(), "Response received");
        let result = parse_response(status, &text, fallback);
        if let Err(err) = &result {
            warn!(%url, status, error = %err, "Request failed");
        }
        result
    }
}

impl MappingApi for SpecClient {
    fn column_config(&self) -> Result<ColumnConfig, ApiError> {
        let response: ColumnConfigResponse = self.send(
            self.client.get(self.url("/api/config/column_mappings")),
            "Could not load the column configuration",
        )?;
        Ok(response.config.unwrap_or_else(|| {
            warn!("Server sent no column configuration, using defaults");
            ColumnConfig::default()
        }))
    }

    fn preview_mapping(&self, file_id: &FileId) -> Result<PreviewResponse, ApiError> {
        let body = PreviewRequest {
            file_id: file_id.clone(),
        };
        self.send(
            self.client.post(self.url("/api/preview_mapping")).json(&body),
            "Preview failed",
        )
    }

    fn confirm_mapping(&self, request: &ConfirmRequest) -> Result<ConfirmAck, ApiError> {
        self.send(
            self.client
                .post(self.url("/api/confirm_mapping"))
                .json(request),
            "Confirm failed",
        )
    }
}

fn file_form(path: &Path) -> Result<Form, ApiError> {
    Form::new()
        .file("file", path)
        .map_err(|err| ApiError::Network(format!("cannot read {}: {err}", path.display())))
}

fn user_agent() -> String {
    format!("ordercheck/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_join_without_duplicate_slashes() {
        let client = SpecClient::new(&ClientConfig {
            base_url: "http://localhost:5000/".to_string(),
            timeout: Some(Duration::from_secs(5)),
        })
        .unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000");
        assert_eq!(
            client.url("/api/list_specs"),
            "http://localhost:5000/api/list_specs"
        );
        assert_eq!(
            client.url("api/preview_mapping"),
            "http://localhost:5000/api/preview_mapping"
        );
    }

    #[test]
    fn unreadable_upload_is_reported_before_sending() {
        let path = std::env::temp_dir().join("ordercheck-missing-order.pdf");
        let err = file_form(&path).unwrap_err();
        assert!(matches!(err, ApiError::Network(ref m) if m.starts_with("cannot read")));
    }

    #[test]
    fn default_config_has_no_timeout() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.timeout.is_none());
    }
}
