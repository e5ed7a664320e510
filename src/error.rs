//! Error types for the leave request workflow
use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;

use crate::workflow::WorkflowState;

/// A form field that validation can flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    LeaveType,
    FromDate,
    ToDate,
    Reason,
    Recipients,
}

impl Field {
    /// The key the rendering layer binds its error message to.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::LeaveType => "leaveType",
            Field::FromDate => "fromDate",
            Field::ToDate => "toDate",
            Field::Reason => "reason",
            Field::Recipients => "recipients",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every rule that failed for a draft, keyed by field. All rules run, so a
/// draft with several problems reports all of them at once.
#[derive(thiserror::Error, Debug, Clone, Default, PartialEq, Eq)]
#[error("{} field(s) failed validation", .0.len())]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }
    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, msg)| (*field, msg.as_str()))
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error("end date {to} is before start date {from}")]
    EndBeforeStart { from: NaiveDate, to: NaiveDate },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} '{value}'")]
pub struct ParseError {
    pub kind: &'static str,
    pub value: String,
}

/// Failure reported by a [`crate::commit::CommitBackend`].
#[derive(thiserror::Error, Debug)]
pub enum CommitError {
    #[error("commit rejected: {reason}")]
    Rejected { reason: String },
    #[error("leave service returned {status}: {reason}")]
    Status { status: u16, reason: String },
    #[error("request to leave service failed")]
    Transport(#[source] reqwest::Error),
    #[error("leave service acknowledgement was not valid JSON")]
    Decode(#[source] reqwest::Error),
    #[error("failed to mint a record id")]
    Id(#[from] bech32::EncodeError),
}

#[derive(thiserror::Error, Debug)]
pub enum HistoryError {
    #[error("history storage failed")]
    Storage(#[from] sled::Error),
    #[error("failed to encode leave record")]
    Encode(#[from] minicbor::encode::Error<std::convert::Infallible>),
    #[error("failed to decode leave record")]
    Decode(#[from] minicbor::decode::Error),
}

/// Errors the workflow hands back to its caller. Validation and commit
/// failures are not among them; those are absorbed into field errors and
/// notifications.
#[derive(thiserror::Error, Debug)]
pub enum WorkflowError {
    #[error("no leave request is awaiting confirmation")]
    NoCandidate,
    #[error("cannot {action} while {state:?}")]
    InvalidTransition {
        action: &'static str,
        state: WorkflowState,
    },
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error("commit backend could not be built")]
    Backend(#[from] CommitError),
}
