//! Wire types shared by the ordercheck client crates.

#![deny(unsafe_code)]

pub mod check;
pub mod config;
pub mod confirm;
pub mod error;
pub mod feedback;
pub mod files;
pub mod ids;
pub mod pdf;
pub mod preview;
pub mod sheet;

pub use check::{CheckErrorKind, CompareRequest, CompareResponse, CompareStats};
pub use config::{ColumnConfig, ColumnConfigResponse};
pub use confirm::{ConfirmAck, ConfirmRequest, MappingMode};
pub use error::{ApiError, ModelError};
pub use feedback::{
    ColumnMappingInfo, ColumnRequirement, DataError, DataErrorKind, ErrorBody, ErrorFeedback,
    FormatRequirements, MappingProblems, Suggestion,
};
pub use files::{Acknowledgment, FileStatus, SpecListResponse, SpecSummary, UploadResponse};
pub use ids::{FileId, ResultId, SpecId};
pub use pdf::{Conversion, ConvertedFile, ConvertedList, ExtractedTable, PdfPreview, PdfUpload};
pub use preview::{ColumnSuggestion, PreviewRequest, PreviewResponse, PreviewRow, display_cell};
pub use sheet::SheetPreview;
