//! Mapping dialog controller.
//!
//! [`MappingDialog`] owns the injected API, one [`MappingSession`] and the
//! modal lifecycle. A front end (the CLI, or a GUI) feeds it
//! [`DialogEvent`]s tagged with the [`EventScope`] handed out by
//! [`MappingDialog::show`]; events from a scope released by `hide` are
//! ignored.

use ordercheck_model::{ConfirmAck, FileId, MappingMode};
use tracing::{debug, info};

use crate::api::MappingApi;
use crate::error::{SessionError, ValidationError};
use crate::projection::MappedPreview;
use crate::session::{MappingSession, RequestKind, SessionPhase};

/// Identifies one showing of the dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventScope(u64);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum ModalState {
    #[default]
    Closed,
    Open(EventScope),
}

/// Status banner shown above the preview.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DialogStatus {
    #[default]
    Idle,
    Loading,
    /// The server mapped every required column.
    AutoComplete { mapped: usize },
    /// The server could not map these required columns.
    AutoIncomplete { missing: Vec<String> },
    Error(String),
    Confirmed { message: String },
}

impl DialogStatus {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// User interaction with the dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogEvent {
    CloseClicked,
    BackdropClicked,
    CancelClicked,
    TabSelected(MappingMode),
    /// A selection in the custom mapping form; `None` clears the entry.
    ColumnSelected {
        standard: String,
        original: Option<String>,
    },
    ConfirmClicked,
    /// Reload the preview after a failed load.
    RetryClicked,
}

/// What handling an event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogOutcome {
    /// The event belonged to a released scope.
    Ignored,
    Updated,
    Closed,
    Confirmed(ConfirmAck),
}

#[derive(Debug, Clone)]
struct Target {
    file_id: FileId,
    original_filename: String,
}

/// Modal column-mapping dialog.
#[derive(Debug)]
pub struct MappingDialog<A> {
    api: A,
    modal: ModalState,
    next_scope: u64,
    target: Option<Target>,
    session: MappingSession,
    active_tab: MappingMode,
    status: DialogStatus,
}

impl<A: MappingApi> MappingDialog<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            modal: ModalState::Closed,
            next_scope: 0,
            target: None,
            session: MappingSession::new(),
            active_tab: MappingMode::Auto,
            status: DialogStatus::Idle,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn session(&self) -> &MappingSession {
        &self.session
    }

    pub fn active_tab(&self) -> MappingMode {
        self.active_tab
    }

    pub fn status(&self) -> &DialogStatus {
        &self.status
    }

    pub fn is_open(&self) -> bool {
        matches!(self.modal, ModalState::Open(_))
    }

    /// Open the dialog for an uploaded file and load its preview.
    ///
    /// Any previous showing is hidden first. Load failures are reported in
    /// the status banner; the dialog stays open for retry or cancel.
    pub fn show(&mut self, file_id: FileId, original_filename: impl Into<String>) -> EventScope {
        if self.is_open() {
            self.hide();
        }
        self.next_scope += 1;
        let scope = EventScope(self.next_scope);
        self.modal = ModalState::Open(scope);
        self.active_tab = MappingMode::Auto;
        self.target = Some(Target {
            file_id,
            original_filename: original_filename.into(),
        });
        debug!(scope = scope.0, "Mapping dialog shown");
        self.load();
        scope
    }

    /// Close the dialog and discard the session.
    pub fn hide(&mut self) {
        if let ModalState::Open(scope) = self.modal {
            debug!(scope = scope.0, "Mapping dialog hidden");
        }
        self.modal = ModalState::Closed;
        self.target = None;
        self.session.close();
        if !matches!(self.status, DialogStatus::Confirmed { .. }) {
            self.status = DialogStatus::Idle;
        }
    }

    /// Preview for the active tab.
    pub fn preview(&self) -> Result<MappedPreview, SessionError> {
        self.session.preview(self.active_tab)
    }

    /// True when a confirm click would be submitted.
    pub fn confirm_enabled(&self) -> bool {
        self.is_open() && self.session.phase() == SessionPhase::Ready
    }

    /// Dispatch one event. Errors are also shown in the status banner.
    pub fn handle(
        &mut self,
        scope: EventScope,
        event: DialogEvent,
    ) -> Result<DialogOutcome, SessionError> {
        if self.modal != ModalState::Open(scope) {
            debug!(scope = scope.0, ?event, "Ignoring event from released scope");
            return Ok(DialogOutcome::Ignored);
        }
        match event {
            DialogEvent::CloseClicked | DialogEvent::BackdropClicked | DialogEvent::CancelClicked => {
                self.hide();
                Ok(DialogOutcome::Closed)
            }
            DialogEvent::TabSelected(mode) => {
                self.active_tab = mode;
                Ok(DialogOutcome::Updated)
            }
            DialogEvent::ColumnSelected { standard, original } => {
                self.session
                    .set_override(&standard, original.as_deref())
                    .map_err(|err| self.report(err))?;
                Ok(DialogOutcome::Updated)
            }
            DialogEvent::ConfirmClicked => self.confirm(),
            DialogEvent::RetryClicked => {
                if self.session.phase().is_busy() {
                    return Err(self.report(SessionError::Busy(RequestKind::Load)));
                }
                self.load();
                Ok(DialogOutcome::Updated)
            }
        }
    }

    fn load(&mut self) {
        let Some(target) = self.target.clone() else {
            return;
        };
        self.status = DialogStatus::Loading;
        match self
            .session
            .open(&self.api, target.file_id, target.original_filename)
        {
            Ok(()) => self.status = self.loaded_status(),
            Err(err) => {
                self.report(err);
            }
        }
    }

    fn confirm(&mut self) -> Result<DialogOutcome, SessionError> {
        let mode = self.active_tab;
        match self.session.confirm(&self.api, mode) {
            Ok(ack) => {
                let message = ack
                    .message
                    .clone()
                    .unwrap_or_else(|| "Mapping confirmed".to_string());
                info!(mode = %mode, "Mapping dialog confirmed");
                self.hide();
                self.status = DialogStatus::Confirmed { message };
                Ok(DialogOutcome::Confirmed(ack))
            }
            Err(err) => {
                if matches!(
                    err,
                    SessionError::Validation(ValidationError::AutoMappingIncomplete { .. })
                ) {
                    self.active_tab = MappingMode::Custom;
                }
                Err(self.report(err))
            }
        }
    }

    fn loaded_status(&self) -> DialogStatus {
        match self.session.suggestion() {
            Some(suggestion) if suggestion.success => DialogStatus::AutoComplete {
                mapped: suggestion.mapped_columns.len(),
            },
            Some(suggestion) => DialogStatus::AutoIncomplete {
                missing: suggestion.missing_required.clone(),
            },
            None => DialogStatus::Idle,
        }
    }

    fn report(&mut self, err: SessionError) -> SessionError {
        self.status = DialogStatus::Error(err.user_message());
        err
    }
}
