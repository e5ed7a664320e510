//! Submission workflow: draft → validate → confirm → commit → reset
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::commit::{CommitBackend, HttpCommit, LocalCommit};
use crate::config::{CommitMode, WorkflowConfig};
use crate::draft::LeaveRequestDraft;
use crate::error::{CommitError, FieldErrors, HistoryError, WorkflowError};
use crate::gate::ConfirmationGate;
use crate::history::{HistoryPage, HistoryQuery, HistoryStore, SortState, DEFAULT_PAGE_SIZE};
use crate::notify::{Notification, NotificationSink, DEFAULT_DURATION};
use crate::types::{LeaveRequestRecord, Recipient, TimeStamp};
use crate::validation::{self, ValidatedRequest, ValidationPolicy};

/// Where the workflow is in its cycle. `Validating` and `Committing` are only
/// ever held while `submit` or `confirm` is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowState {
    Editing,
    Validating,
    AwaitingConfirmation,
    Committing,
    /// Just committed; the draft has been reset and editing may start again
    Idle,
}

pub(crate) enum Phase {
    Editing,
    Validating,
    AwaitingConfirmation(ValidatedRequest),
    Committing,
    Idle,
}

impl Phase {
    fn state(&self) -> WorkflowState {
        match self {
            Phase::Editing => WorkflowState::Editing,
            Phase::Validating => WorkflowState::Validating,
            Phase::AwaitingConfirmation(_) => WorkflowState::AwaitingConfirmation,
            Phase::Committing => WorkflowState::Committing,
            Phase::Idle => WorkflowState::Idle,
        }
    }
}

/// Result of a submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Every rule passed; the candidate waits behind the confirmation gate
    AwaitingConfirmation,
    /// The draft is back in editing with these errors attached
    Rejected(FieldErrors),
}

/// Result of a confirmed commit.
#[derive(Debug)]
pub enum Confirmation {
    Committed(LeaveRequestRecord),
    /// The backend refused or could not be reached. The draft is untouched.
    Failed(CommitError),
    /// The backend accepted the request but the history append failed. The
    /// record is handed back so the caller still has the acknowledged id.
    Unrecorded {
        record: LeaveRequestRecord,
        error: HistoryError,
    },
}

pub struct SubmissionWorkflow {
    pub(crate) phase: Phase,
    draft: LeaveRequestDraft,
    errors: FieldErrors,
    policy: ValidationPolicy,
    history: HistoryStore,
    backend: Arc<dyn CommitBackend>,
    sink: Arc<dyn NotificationSink>,
    notify_duration: Duration,
    page_size: usize,
}

impl SubmissionWorkflow {
    pub fn new(
        policy: ValidationPolicy,
        history: HistoryStore,
        backend: Arc<dyn CommitBackend>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            phase: Phase::Editing,
            draft: LeaveRequestDraft::new(),
            errors: FieldErrors::new(),
            policy,
            history,
            backend,
            sink,
            notify_duration: DEFAULT_DURATION,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Build a workflow with a session-scoped history and the backend the
    /// config selects.
    pub fn from_config(
        config: &WorkflowConfig,
        sink: Arc<dyn NotificationSink>,
    ) -> Result<Self, WorkflowError> {
        let backend: Arc<dyn CommitBackend> = match config.commit.mode {
            CommitMode::Local => Arc::new(LocalCommit),
            CommitMode::Remote => Arc::new(HttpCommit::new(
                &config.commit.base_url,
                &config.commit.endpoint,
                Duration::from_secs(config.commit.timeout_secs),
            )?),
        };
        let workflow = Self::new(
            config.policy.clone(),
            HistoryStore::temporary()?,
            backend,
            sink,
        )
        .with_notification_duration(Duration::from_millis(config.notifications.duration_ms))
        .with_page_size(config.history.page_size);

        Ok(workflow)
    }

    pub fn with_notification_duration(mut self, duration: Duration) -> Self {
        self.notify_duration = duration;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn state(&self) -> WorkflowState {
        self.phase.state()
    }

    pub fn draft(&self) -> &LeaveRequestDraft {
        &self.draft
    }

    /// Errors from the last rejected submit, empty otherwise
    pub fn field_errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    /// The candidate waiting for confirmation, if any
    pub fn pending(&self) -> Option<&ValidatedRequest> {
        match &self.phase {
            Phase::AwaitingConfirmation(candidate) => Some(candidate),
            _ => None,
        }
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Query the history using the configured page size.
    pub fn query_history(
        &self,
        filter: &str,
        sort: SortState,
        page: i64,
    ) -> Result<HistoryPage, WorkflowError> {
        let query = HistoryQuery::new()
            .set_filter(filter)
            .set_sort(sort)
            .set_page(page)
            .set_page_size(self.page_size);
        Ok(self.history.query(&query)?)
    }

    /// Apply a field edit. Only allowed while editing; a freshly reset
    /// workflow goes back to editing on the first edit.
    pub fn edit<F>(&mut self, f: F) -> Result<(), WorkflowError>
    where
        F: FnOnce(LeaveRequestDraft) -> LeaveRequestDraft,
    {
        self.ensure_editable("edit")?;
        self.draft = f(std::mem::take(&mut self.draft));
        self.phase = Phase::Editing;
        debug!(draft = ?self.draft, "draft edited");
        Ok(())
    }

    /// Freeze the draft and run the rule set over it.
    pub fn submit(&mut self) -> Result<Submission, WorkflowError> {
        self.ensure_editable("submit")?;
        self.phase = Phase::Validating;

        match validation::validate(&self.draft, &self.policy) {
            Ok(candidate) => {
                info!(
                    leave_type = %candidate.leave_type(),
                    days = candidate.day_span(),
                    "leave request awaiting confirmation"
                );
                self.errors = FieldErrors::new();
                self.phase = Phase::AwaitingConfirmation(candidate);
                Ok(Submission::AwaitingConfirmation)
            }
            Err(errors) => {
                warn!(fields = ?errors.fields().collect::<Vec<_>>(), "leave request rejected");
                self.errors = errors.clone();
                self.phase = Phase::Editing;
                self.notify(Notification::error(
                    "Please check the form",
                    format!("{} field(s) need attention.", errors.len()),
                ));
                Ok(Submission::Rejected(errors))
            }
        }
    }

    /// The confirmation gate, open only while a candidate is waiting.
    pub fn gate(&mut self) -> Option<ConfirmationGate<'_>> {
        match std::mem::replace(&mut self.phase, Phase::Committing) {
            Phase::AwaitingConfirmation(candidate) => Some(ConfirmationGate::new(self, candidate)),
            other => {
                self.phase = other;
                None
            }
        }
    }

    /// Confirm the waiting candidate. See [`ConfirmationGate::confirm`].
    pub async fn confirm(&mut self) -> Result<Confirmation, WorkflowError> {
        if self.pending().is_none() {
            return Err(self.no_candidate("confirm"));
        }
        let Some(gate) = self.gate() else {
            return Err(WorkflowError::NoCandidate);
        };
        gate.confirm().await
    }

    /// Drop the waiting candidate and go back to editing with the draft as it was.
    pub fn cancel(&mut self) -> Result<(), WorkflowError> {
        if self.pending().is_none() {
            return Err(self.no_candidate("cancel"));
        }
        if let Some(gate) = self.gate() {
            gate.cancel();
        }
        Ok(())
    }

    pub(crate) fn discard_candidate(&mut self) {
        info!("leave request confirmation cancelled");
        self.phase = Phase::Editing;
    }

    /// The only path that writes to history. The phase is `Committing` only
    /// while the backend is answering; the caller keeps hold of the candidate
    /// until this returns.
    pub(crate) async fn commit(&mut self, candidate: &ValidatedRequest) -> Confirmation {
        self.phase = Phase::Committing;

        match self.backend.commit(candidate).await {
            Ok(ack) => self.record(ack.id, candidate, TimeStamp::new()),
            Err(err) => {
                warn!(error = %err, "leave request commit failed");
                self.phase = Phase::Editing;
                self.notify(Notification::error(
                    "Error",
                    "Something went wrong. Try again later.",
                ));
                Confirmation::Failed(err)
            }
        }
    }

    /// Append the acknowledged request to history and reset the form. The
    /// backend has already accepted it, so the form resets even when the
    /// append fails.
    fn record(
        &mut self,
        id: String,
        candidate: &ValidatedRequest,
        applied_on: TimeStamp<Utc>,
    ) -> Confirmation {
        let record = LeaveRequestRecord::new(
            id,
            candidate.leave_type(),
            candidate.range(),
            candidate.reason().to_string(),
            applied_on,
            candidate.recipients().to_vec(),
        );
        let appended = self.history.append(&record);

        self.draft = LeaveRequestDraft::new();
        self.errors = FieldErrors::new();
        self.phase = Phase::Idle;

        if let Err(error) = appended {
            error!(error = %error, id = record.id(), "committed leave request could not be recorded");
            self.notify(Notification::error(
                "Leave request submitted",
                format!(
                    "Sent to {}, but it could not be added to your history.",
                    recipient_list(record.recipients())
                ),
            ));
            return Confirmation::Unrecorded { record, error };
        }

        info!(id = record.id(), leave_type = %record.leave_type(), "leave request committed");
        self.notify(Notification::success(
            "Leave request submitted!",
            format!("Sent to {}.", recipient_list(record.recipients())),
        ));

        Confirmation::Committed(record)
    }

    fn ensure_editable(&self, action: &'static str) -> Result<(), WorkflowError> {
        match self.phase {
            Phase::Editing | Phase::Idle => Ok(()),
            _ => {
                debug!(action, state = ?self.state(), "action refused in current state");
                Err(WorkflowError::InvalidTransition {
                    action,
                    state: self.state(),
                })
            }
        }
    }

    fn no_candidate(&self, action: &'static str) -> WorkflowError {
        error!(action, state = ?self.state(), "no leave request awaiting confirmation");
        WorkflowError::NoCandidate
    }

    fn notify(&self, notification: Notification) {
        self.sink
            .notify(notification.with_duration(self.notify_duration));
    }
}

// "HR", "HR and Manager", "HR, Manager and Team Lead"
fn recipient_list(recipients: &[Recipient]) -> String {
    match recipients {
        [] => "no one".to_string(),
        [only] => only.to_string(),
        [init @ .., last] => {
            let init: Vec<_> = init.iter().map(Recipient::to_string).collect();
            format!("{} and {last}", init.join(", "))
        }
    }
}
