//! Leave request workflow: a draft is edited, validated, held for explicit
//! confirmation, committed through a backend and recorded in a session
//! history that can be filtered, sorted and paged.

pub mod commit;
pub mod config;
pub mod draft;
pub mod error;
pub mod gate;
pub mod history;
pub mod notify;
pub mod types;
pub mod utils;
pub mod validation;
pub mod workflow;

pub use draft::LeaveRequestDraft;
pub use error::{CommitError, Field, FieldErrors, WorkflowError};
pub use types::{DateRange, LeaveRequestRecord, LeaveStatus, LeaveType, Recipient};
pub use workflow::{Confirmation, Submission, SubmissionWorkflow, WorkflowState};
