//! Seam between the mapping workflow and the spec server.

use ordercheck_model::{
    ApiError, ColumnConfig, ConfirmAck, ConfirmRequest, FileId, PreviewResponse,
};

/// Server calls the mapping workflow depends on.
///
/// The HTTP implementation lives in `ordercheck-client`; tests use an
/// in-memory fake.
pub trait MappingApi {
    /// `GET /api/config/column_mappings`
    fn column_config(&self) -> Result<ColumnConfig, ApiError>;

    /// `POST /api/preview_mapping`
    fn preview_mapping(&self, file_id: &FileId) -> Result<PreviewResponse, ApiError>;

    /// `POST /api/confirm_mapping`
    fn confirm_mapping(&self, request: &ConfirmRequest) -> Result<ConfirmAck, ApiError>;
}

impl<T: MappingApi + ?Sized> MappingApi for &T {
    fn column_config(&self) -> Result<ColumnConfig, ApiError> {
        (**self).column_config()
    }

    fn preview_mapping(&self, file_id: &FileId) -> Result<PreviewResponse, ApiError> {
        (**self).preview_mapping(file_id)
    }

    fn confirm_mapping(&self, request: &ConfirmRequest) -> Result<ConfirmAck, ApiError> {
        (**self).confirm_mapping(request)
    }
}

/// Everything a session needs to become ready.
#[derive(Debug, Clone)]
pub struct LoadedPreview {
    pub config: ColumnConfig,
    pub preview: PreviewResponse,
}

/// Fetch the column configuration and the mapping preview for `file_id`.
pub fn load_preview<A: MappingApi + ?Sized>(
    api: &A,
    file_id: &FileId,
) -> Result<LoadedPreview, ApiError> {
    let config = api.column_config()?;
    let preview = api.preview_mapping(file_id)?;
    Ok(LoadedPreview { config, preview })
}
