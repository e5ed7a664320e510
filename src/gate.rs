//! Two-phase commit handle over a validated leave request
use crate::error::WorkflowError;
use crate::validation::ValidatedRequest;
use crate::workflow::{Confirmation, Phase, SubmissionWorkflow};

/// Holds the validated candidate between submit and commit. A gate can only
/// be obtained from [`SubmissionWorkflow::gate`] while a candidate is waiting,
/// so confirming or cancelling without one cannot be expressed through it.
///
/// Dropping the gate without deciding, or dropping a confirm that has not
/// finished, leaves the candidate waiting.
pub struct ConfirmationGate<'a> {
    workflow: &'a mut SubmissionWorkflow,
    candidate: Option<ValidatedRequest>,
}

impl<'a> ConfirmationGate<'a> {
    pub(crate) fn new(workflow: &'a mut SubmissionWorkflow, candidate: ValidatedRequest) -> Self {
        Self {
            workflow,
            candidate: Some(candidate),
        }
    }

    /// The request the user is being asked to confirm
    pub fn candidate(&self) -> Option<&ValidatedRequest> {
        self.candidate.as_ref()
    }

    /// Commit the candidate. On success the record is appended to history,
    /// the draft is reset and the workflow goes idle; on a backend failure
    /// the workflow returns to editing with the draft intact.
    ///
    /// The candidate stays in the gate until the backend answers. If this
    /// future is dropped first, the candidate goes back to waiting for
    /// confirmation.
    pub async fn confirm(mut self) -> Result<Confirmation, WorkflowError> {
        let Some(candidate) = self.candidate.as_ref() else {
            return Err(WorkflowError::NoCandidate);
        };
        let confirmation = self.workflow.commit(candidate).await;
        self.candidate = None;
        Ok(confirmation)
    }

    /// Discard the candidate and return to editing. The draft is not cleared.
    pub fn cancel(mut self) {
        self.candidate = None;
        self.workflow.discard_candidate();
    }
}

impl Drop for ConfirmationGate<'_> {
    fn drop(&mut self) {
        if let Some(candidate) = self.candidate.take() {
            self.workflow.phase = Phase::AwaitingConfirmation(candidate);
        }
    }
}
