//! Column-mapping confirmation for uploaded spec files.
//!
//! The server proposes a mapping from the file's original headers to the
//! configured standard columns; [`MappingSession`] lets the user accept it or
//! edit an override table, previews the result, and submits the
//! confirmation. [`MappingDialog`] wraps a session in a modal lifecycle.

#![deny(unsafe_code)]

pub mod api;
pub mod dialog;
pub mod error;
pub mod projection;
pub mod session;

pub use api::{LoadedPreview, MappingApi, load_preview};
pub use dialog::{DialogEvent, DialogOutcome, DialogStatus, EventScope, MappingDialog};
pub use error::{SessionError, ValidationError};
pub use projection::{
    MappedPreview, PreviewColumn, ProjectedRow, ProjectedTable, invert_mapping, mapped_table,
    original_table,
};
pub use session::{
    Completion, MappingSession, RequestKind, RequestTicket, ServerSuggestion, SessionPhase,
};
