//! Mapping confirmation session.
//!
//! A [`MappingSession`] mediates between the server's column-mapping
//! suggestion for one uploaded spec file and the mapping the user finally
//! confirms. It never infers mappings itself.
//!
//! # Lifecycle
//!
//! ```text
//! Idle -> Loading -> Ready | LoadFailed
//! Ready -> Confirming -> Closed (confirmed) | Ready (error shown)
//! LoadFailed | Closed -> Loading (retry / reopen)
//! ```
//!
//! Network calls happen outside the session. `begin_*` validates and hands
//! out a [`RequestTicket`]; `complete_*` applies the outcome only when the
//! ticket still matches the session's current request generation and file,
//! so responses that arrive after a close or reopen are dropped. At most one
//! request is outstanding per session.

use std::collections::BTreeMap;
use std::fmt;

use ordercheck_model::{
    ApiError, ColumnConfig, ColumnSuggestion, ConfirmAck, ConfirmRequest, FileId, MappingMode,
    PreviewRow,
};
use tracing::{debug, info, warn};

use crate::api::{LoadedPreview, MappingApi, load_preview};
use crate::error::{SessionError, ValidationError};
use crate::projection::{MappedPreview, invert_mapping, mapped_table, original_table};

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionPhase {
    /// Nothing opened yet.
    #[default]
    Idle,
    /// Preview request outstanding.
    Loading,
    /// Preview loaded; overrides may be edited.
    Ready,
    /// Preview request failed; the session may be reopened.
    LoadFailed,
    /// Confirm request outstanding.
    Confirming,
    /// Discarded, or confirmed successfully.
    Closed,
}

impl SessionPhase {
    /// True while a request is outstanding.
    pub fn is_busy(self) -> bool {
        matches!(self, Self::Loading | Self::Confirming)
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::LoadFailed => "load failed",
            Self::Confirming => "confirming",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Load,
    Confirm,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load => f.write_str("load"),
            Self::Confirm => f.write_str("confirm"),
        }
    }
}

/// Identifies one outstanding request of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    generation: u64,
    file_id: FileId,
    kind: RequestKind,
}

impl RequestTicket {
    pub fn file_id(&self) -> &FileId {
        &self.file_id
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }
}

/// Result of applying a response to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion<T> {
    /// The response belonged to the current request and was applied.
    Applied(T),
    /// The session was closed or reopened since; the response was dropped.
    Stale,
}

impl<T> Completion<T> {
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale)
    }
}

/// The server's mapping suggestion, as received.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerSuggestion {
    /// original column -> standard column
    pub mapped_columns: BTreeMap<String, String>,
    pub unmapped_columns: Vec<String>,
    pub missing_required: Vec<String>,
    /// True when every required standard column was recognised.
    pub success: bool,
    /// Candidate standard columns for unmapped originals.
    pub hints: BTreeMap<String, ColumnSuggestion>,
}

#[derive(Debug, Clone)]
struct Upload {
    file_id: FileId,
    original_filename: String,
}

#[derive(Debug, Clone)]
struct LoadedState {
    config: ColumnConfig,
    suggestion: ServerSuggestion,
    original_columns: Vec<String>,
    preview_rows: Vec<PreviewRow>,
    /// standard column -> original column
    overrides: BTreeMap<String, String>,
}

impl LoadedState {
    fn from_preview(loaded: LoadedPreview) -> Self {
        let LoadedPreview { config, preview } = loaded;
        let original_columns = if preview.original_columns.is_empty() {
            preview
                .mapped_columns
                .keys()
                .chain(preview.unmapped_columns.iter())
                .cloned()
                .collect()
        } else {
            preview.original_columns
        };

        let mut overrides = invert_mapping(&preview.mapped_columns);
        overrides.retain(|standard, original| {
            let keep = config.is_known(standard) && original_columns.contains(original);
            if !keep {
                warn!(
                    standard = %standard,
                    original = %original,
                    "Dropping server mapping outside the configured columns"
                );
            }
            keep
        });

        Self {
            config,
            suggestion: ServerSuggestion {
                mapped_columns: preview.mapped_columns,
                unmapped_columns: preview.unmapped_columns,
                missing_required: preview.missing_required,
                success: preview.mapping_success,
                hints: preview.suggestions,
            },
            original_columns,
            preview_rows: preview.preview_data,
            overrides,
        }
    }

    fn missing_required(&self) -> Vec<String> {
        self.config
            .required_columns
            .iter()
            .filter(|column| !self.overrides.contains_key(*column))
            .cloned()
            .collect()
    }
}

/// Per-upload mapping state; see the module docs for the lifecycle.
#[derive(Debug, Clone, Default)]
pub struct MappingSession {
    phase: SessionPhase,
    generation: u64,
    upload: Option<Upload>,
    loaded: Option<LoadedState>,
    last_error: Option<String>,
    acknowledgment: Option<ConfirmAck>,
}

impl MappingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn file_id(&self) -> Option<&FileId> {
        self.upload.as_ref().map(|u| &u.file_id)
    }

    pub fn original_filename(&self) -> Option<&str> {
        self.upload.as_ref().map(|u| u.original_filename.as_str())
    }

    pub fn config(&self) -> Option<&ColumnConfig> {
        self.loaded.as_ref().map(|l| &l.config)
    }

    pub fn suggestion(&self) -> Option<&ServerSuggestion> {
        self.loaded.as_ref().map(|l| &l.suggestion)
    }

    /// Columns discovered in the uploaded file, in file order.
    pub fn original_columns(&self) -> &[String] {
        self.loaded
            .as_ref()
            .map(|l| l.original_columns.as_slice())
            .unwrap_or_default()
    }

    pub fn preview_rows(&self) -> &[PreviewRow] {
        self.loaded
            .as_ref()
            .map(|l| l.preview_rows.as_slice())
            .unwrap_or_default()
    }

    /// The user's standard -> original mapping.
    pub fn overrides(&self) -> Option<&BTreeMap<String, String>> {
        self.loaded.as_ref().map(|l| &l.overrides)
    }

    /// Message of the last failed request, kept until the next request.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Acknowledgment of a successful confirm.
    pub fn acknowledgment(&self) -> Option<&ConfirmAck> {
        self.acknowledgment.as_ref()
    }

    /// Required standard columns without an override entry.
    pub fn missing_required(&self) -> Vec<String> {
        self.loaded
            .as_ref()
            .map(LoadedState::missing_required)
            .unwrap_or_default()
    }

    /// Start loading the mapping preview for an uploaded file.
    ///
    /// Discards any previous upload state. Rejected while another request is
    /// outstanding.
    pub fn begin_open(
        &mut self,
        file_id: FileId,
        original_filename: impl Into<String>,
    ) -> Result<RequestTicket, SessionError> {
        self.ensure_idle_network()?;
        self.generation += 1;
        self.upload = Some(Upload {
            file_id: file_id.clone(),
            original_filename: original_filename.into(),
        });
        self.loaded = None;
        self.last_error = None;
        self.acknowledgment = None;
        self.phase = SessionPhase::Loading;
        info!(file_id = %file_id, generation = self.generation, "Loading mapping preview");
        Ok(RequestTicket {
            generation: self.generation,
            file_id,
            kind: RequestKind::Load,
        })
    }

    /// Apply the outcome of a preview request.
    ///
    /// On success the overrides start as the inverse of the server's
    /// `mapped_columns`. On failure the session moves to `LoadFailed` and the
    /// error is returned.
    pub fn complete_open(
        &mut self,
        ticket: RequestTicket,
        result: Result<LoadedPreview, ApiError>,
    ) -> Result<Completion<()>, SessionError> {
        if !self.accepts(&ticket, RequestKind::Load) {
            return Ok(Completion::Stale);
        }
        match result {
            Ok(loaded) => {
                let state = LoadedState::from_preview(loaded);
                info!(
                    file_id = %ticket.file_id,
                    success = state.suggestion.success,
                    mapped = state.overrides.len(),
                    missing = state.suggestion.missing_required.len(),
                    "Mapping preview loaded"
                );
                self.loaded = Some(state);
                self.phase = SessionPhase::Ready;
                Ok(Completion::Applied(()))
            }
            Err(err) => {
                warn!(file_id = %ticket.file_id, error = %err, "Mapping preview failed");
                self.last_error = Some(err.user_message().to_string());
                self.phase = SessionPhase::LoadFailed;
                Err(err.into())
            }
        }
    }

    /// Load the preview for `file_id` through `api`.
    pub fn open<A: MappingApi + ?Sized>(
        &mut self,
        api: &A,
        file_id: FileId,
        original_filename: impl Into<String>,
    ) -> Result<(), SessionError> {
        let ticket = self.begin_open(file_id, original_filename)?;
        let result = load_preview(api, ticket.file_id());
        self.complete_open(ticket, result).map(|_| ())
    }

    /// Set (`Some`) or clear (`None`) the source column of a standard column.
    ///
    /// Completeness is not checked here; `confirm` does that.
    pub fn set_override(
        &mut self,
        standard: &str,
        original: Option<&str>,
    ) -> Result<(), SessionError> {
        self.ensure_idle_network()?;
        let phase = self.phase;
        let loaded = match (phase, self.loaded.as_mut()) {
            (SessionPhase::Ready, Some(loaded)) => loaded,
            _ => return Err(SessionError::NotReady(phase)),
        };
        if !loaded.config.is_known(standard) {
            return Err(ValidationError::UnknownStandardColumn(standard.to_string()).into());
        }
        match original {
            Some(original) => {
                if !loaded.original_columns.iter().any(|c| c == original) {
                    return Err(
                        ValidationError::UnknownOriginalColumn(original.to_string()).into(),
                    );
                }
                debug!(standard, original, "Override set");
                loaded
                    .overrides
                    .insert(standard.to_string(), original.to_string());
            }
            None => {
                debug!(standard, "Override cleared");
                loaded.overrides.remove(standard);
            }
        }
        Ok(())
    }

    /// The standard -> original mapping a confirm in `mode` would apply.
    ///
    /// Auto mode always reflects the server's suggestion; overrides only take
    /// effect in custom mode.
    pub fn mapping(&self, mode: MappingMode) -> Option<BTreeMap<String, String>> {
        let loaded = self.loaded.as_ref()?;
        Some(match mode {
            MappingMode::Auto => invert_mapping(&loaded.suggestion.mapped_columns),
            MappingMode::Custom => loaded.overrides.clone(),
        })
    }

    /// Project the sample rows through the mapping of `mode`.
    pub fn preview(&self, mode: MappingMode) -> Result<MappedPreview, SessionError> {
        let (Some(loaded), Some(mapping)) = (self.loaded.as_ref(), self.mapping(mode)) else {
            return Err(SessionError::NotReady(self.phase));
        };
        Ok(MappedPreview {
            mode,
            original: original_table(&loaded.original_columns, &loaded.preview_rows),
            mapped: mapped_table(&loaded.config, &mapping, &loaded.preview_rows),
        })
    }

    /// Check `mode` against the loaded state without sending anything.
    pub fn validate(&self, mode: MappingMode) -> Result<(), SessionError> {
        let loaded = self
            .loaded
            .as_ref()
            .ok_or(SessionError::NotReady(self.phase))?;
        match mode {
            MappingMode::Custom => {
                let missing = loaded.missing_required();
                if !missing.is_empty() {
                    return Err(ValidationError::MissingRequired(missing).into());
                }
            }
            MappingMode::Auto => {
                if !loaded.suggestion.success {
                    return Err(ValidationError::AutoMappingIncomplete {
                        missing: loaded.suggestion.missing_required.clone(),
                    }
                    .into());
                }
            }
        }
        Ok(())
    }

    /// Validate and build the confirm request for `mode`.
    pub fn begin_confirm(
        &mut self,
        mode: MappingMode,
    ) -> Result<(RequestTicket, ConfirmRequest), SessionError> {
        self.ensure_idle_network()?;
        if self.phase != SessionPhase::Ready {
            return Err(SessionError::NotReady(self.phase));
        }
        self.validate(mode)?;
        let (Some(upload), Some(loaded)) = (self.upload.as_ref(), self.loaded.as_ref()) else {
            return Err(SessionError::NotReady(self.phase));
        };
        let request = ConfirmRequest {
            file_id: upload.file_id.clone(),
            mapping_type: mode,
            original_filename: upload.original_filename.clone(),
            column_mapping: match mode {
                MappingMode::Auto => None,
                MappingMode::Custom => Some(loaded.overrides.clone()),
            },
        };
        let ticket = RequestTicket {
            generation: self.generation,
            file_id: upload.file_id.clone(),
            kind: RequestKind::Confirm,
        };
        self.last_error = None;
        self.phase = SessionPhase::Confirming;
        info!(file_id = %ticket.file_id, mode = %mode, "Confirming mapping");
        Ok((ticket, request))
    }

    /// Apply the outcome of a confirm request.
    ///
    /// Success closes the session and discards the upload state. Failure
    /// returns to `Ready` with the message kept for display.
    pub fn complete_confirm(
        &mut self,
        ticket: RequestTicket,
        result: Result<ConfirmAck, ApiError>,
    ) -> Result<Completion<ConfirmAck>, SessionError> {
        if !self.accepts(&ticket, RequestKind::Confirm) {
            return Ok(Completion::Stale);
        }
        match result {
            Ok(ack) => {
                info!(
                    file_id = %ticket.file_id,
                    spec_id = ack.spec_id.as_ref().map(|id| id.as_str()).unwrap_or("-"),
                    "Mapping confirmed"
                );
                self.upload = None;
                self.loaded = None;
                self.acknowledgment = Some(ack.clone());
                self.phase = SessionPhase::Closed;
                Ok(Completion::Applied(ack))
            }
            Err(err) => {
                warn!(file_id = %ticket.file_id, error = %err, "Mapping confirmation failed");
                self.last_error = Some(err.user_message().to_string());
                self.phase = SessionPhase::Ready;
                Err(err.into())
            }
        }
    }

    /// Validate, submit and apply a confirm through `api`.
    pub fn confirm<A: MappingApi + ?Sized>(
        &mut self,
        api: &A,
        mode: MappingMode,
    ) -> Result<ConfirmAck, SessionError> {
        let (ticket, request) = self.begin_confirm(mode)?;
        let result = api.confirm_mapping(&request);
        match self.complete_confirm(ticket, result)? {
            Completion::Applied(ack) => Ok(ack),
            // The ticket was issued above with no intervening mutation.
            Completion::Stale => Err(SessionError::NotReady(self.phase)),
        }
    }

    /// Discard all upload state. Responses to requests still in flight will
    /// be dropped when they arrive.
    pub fn close(&mut self) {
        if self.phase != SessionPhase::Closed || self.upload.is_some() {
            debug!(phase = %self.phase, "Closing mapping session");
        }
        self.generation += 1;
        self.upload = None;
        self.loaded = None;
        self.last_error = None;
        self.acknowledgment = None;
        self.phase = SessionPhase::Closed;
    }

    fn ensure_idle_network(&self) -> Result<(), SessionError> {
        match self.phase {
            SessionPhase::Loading => Err(SessionError::Busy(RequestKind::Load)),
            SessionPhase::Confirming => Err(SessionError::Busy(RequestKind::Confirm)),
            _ => Ok(()),
        }
    }

    fn accepts(&self, ticket: &RequestTicket, kind: RequestKind) -> bool {
        let expected_phase = match kind {
            RequestKind::Load => SessionPhase::Loading,
            RequestKind::Confirm => SessionPhase::Confirming,
        };
        let current = ticket.kind == kind
            && ticket.generation == self.generation
            && self.phase == expected_phase
            && self.file_id() == Some(&ticket.file_id);
        if !current {
            warn!(
                file_id = %ticket.file_id,
                kind = %ticket.kind,
                phase = %self.phase,
                "Ignoring stale response"
            );
        }
        current
    }
}
