//! Field rules applied to a draft before it may be confirmed
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::draft::LeaveRequestDraft;
use crate::error::{Field, FieldErrors};
use crate::types::{DateRange, LeaveType, Recipient};

/// Knobs for the rule set. Which recipients exist and whether one must be
/// picked differs between deployments, so neither is fixed in the rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationPolicy {
    /// Minimum reason length in characters, counted after trimming
    pub min_reason_len: usize,
    pub require_recipient: bool,
    /// When false a start date before today is rejected
    pub allow_past_start: bool,
    pub allowed_recipients: Vec<Recipient>,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            min_reason_len: 10,
            require_recipient: false,
            allow_past_start: true,
            allowed_recipients: Recipient::ALL.to_vec(),
        }
    }
}

/// A draft that passed every rule. Only [`validate`] builds one, so holding a
/// `ValidatedRequest` is proof the checks ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    leave_type: LeaveType,
    range: DateRange,
    reason: String,
    recipients: Vec<Recipient>,
}

impl ValidatedRequest {
    pub fn leave_type(&self) -> LeaveType {
        self.leave_type
    }
    pub fn range(&self) -> DateRange {
        self.range
    }
    pub fn reason(&self) -> &str {
        &self.reason
    }
    pub fn recipients(&self) -> &[Recipient] {
        &self.recipients
    }
    pub fn day_span(&self) -> i64 {
        self.range.day_span()
    }
}

/// Run every rule against `draft` using today's date (UTC) for the past-start rule.
pub fn validate(
    draft: &LeaveRequestDraft,
    policy: &ValidationPolicy,
) -> Result<ValidatedRequest, FieldErrors> {
    validate_at(draft, policy, Utc::now().date_naive())
}

/// Run every rule against `draft`. Rules do not short circuit: the returned
/// errors name every field that failed.
pub fn validate_at(
    draft: &LeaveRequestDraft,
    policy: &ValidationPolicy,
    today: NaiveDate,
) -> Result<ValidatedRequest, FieldErrors> {
    let mut errors = FieldErrors::new();

    if draft.leave_type().is_none() {
        errors.insert(Field::LeaveType, "Please select leave type");
    }

    match draft.from_date() {
        None => errors.insert(Field::FromDate, "Please select start date"),
        Some(from) if !policy.allow_past_start && from < today => {
            errors.insert(Field::FromDate, "Start date can't be in the past")
        }
        Some(_) => {}
    }

    match (draft.from_date(), draft.to_date()) {
        (_, None) => errors.insert(Field::ToDate, "Please select end date"),
        (Some(from), Some(to)) if to < from => {
            errors.insert(Field::ToDate, "End date can't be before start date")
        }
        _ => {}
    }

    let reason = draft.reason().trim();
    if reason.is_empty() {
        errors.insert(Field::Reason, "Please enter reason");
    } else if reason.chars().count() < policy.min_reason_len {
        errors.insert(
            Field::Reason,
            format!(
                "Reason must be at least {} characters",
                policy.min_reason_len
            ),
        );
    }

    let recipients = draft.recipients();
    if let Some(unknown) = recipients
        .iter()
        .find(|r| !policy.allowed_recipients.contains(*r))
    {
        errors.insert(
            Field::Recipients,
            format!("{unknown} is not an allowed recipient"),
        );
    } else if policy.require_recipient && recipients.is_empty() {
        errors.insert(Field::Recipients, "Please select at least one recipient");
    }

    let (Some(leave_type), Some(from), Some(to)) =
        (draft.leave_type(), draft.from_date(), draft.to_date())
    else {
        return Err(errors);
    };
    if !errors.is_empty() {
        return Err(errors);
    }
    let range = DateRange::new(from, to).map_err(|_| {
        let mut errors = FieldErrors::new();
        errors.insert(Field::ToDate, "End date can't be before start date");
        errors
    })?;

    Ok(ValidatedRequest {
        leave_type,
        range,
        reason: reason.to_string(),
        recipients: recipients.to_vec(),
    })
}
