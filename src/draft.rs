//! The leave request form state while the user is still editing it
use chrono::NaiveDate;

use crate::types::{LeaveType, Recipient};
use crate::utils;

/// Mutable working copy of a leave request. Nothing here is checked until the
/// draft is handed to [`crate::validation::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaveRequestDraft {
    leave_type: Option<LeaveType>,
    from_date: Option<NaiveDate>,
    to_date: Option<NaiveDate>,
    reason: String,
    recipients: Vec<Recipient>, // insertion ordered, no duplicates
}

impl LeaveRequestDraft {
    /// An empty draft, as the form starts out
    pub fn new() -> Self {
        Self::default()
    }
    pub fn set_leave_type(mut self, leave_type: LeaveType) -> Self {
        self.leave_type = Some(leave_type);
        self
    }
    pub fn clear_leave_type(mut self) -> Self {
        self.leave_type = None;
        self
    }
    pub fn set_from_date(mut self, date: NaiveDate) -> Self {
        self.from_date = Some(date);
        self
    }
    pub fn clear_from_date(mut self) -> Self {
        self.from_date = None;
        self
    }
    pub fn set_to_date(mut self, date: NaiveDate) -> Self {
        self.to_date = Some(date);
        self
    }
    pub fn clear_to_date(mut self) -> Self {
        self.to_date = None;
        self
    }
    pub fn set_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }
    /// Adding a recipient that is already selected leaves the draft unchanged.
    pub fn add_recipient(mut self, recipient: Recipient) -> Self {
        if !self.recipients.contains(&recipient) {
            self.recipients.push(recipient);
        }
        self
    }
    pub fn remove_recipient(mut self, recipient: Recipient) -> Self {
        self.recipients.retain(|r| *r != recipient);
        self
    }
    pub fn set_recipients(self, recipients: impl IntoIterator<Item = Recipient>) -> Self {
        let mut draft = Self {
            recipients: Vec::new(),
            ..self
        };
        for recipient in recipients {
            draft = draft.add_recipient(recipient);
        }
        draft
    }

    pub fn leave_type(&self) -> Option<LeaveType> {
        self.leave_type
    }
    pub fn from_date(&self) -> Option<NaiveDate> {
        self.from_date
    }
    pub fn to_date(&self) -> Option<NaiveDate> {
        self.to_date
    }
    pub fn reason(&self) -> &str {
        &self.reason
    }
    pub fn recipients(&self) -> &[Recipient] {
        &self.recipients
    }
    /// Days covered by the dates picked so far, 0 until both are set
    pub fn day_span(&self) -> i64 {
        utils::day_span(self.from_date, self.to_date)
    }
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipients_are_a_set_in_insertion_order() {
        let draft = LeaveRequestDraft::new()
            .add_recipient(Recipient::TeamLead)
            .add_recipient(Recipient::HR)
            .add_recipient(Recipient::TeamLead);

        assert_eq!(draft.recipients(), &[Recipient::TeamLead, Recipient::HR]);

        let draft = draft.remove_recipient(Recipient::TeamLead);
        assert_eq!(draft.recipients(), &[Recipient::HR]);

        let draft = draft.set_recipients([Recipient::Manager, Recipient::Manager]);
        assert_eq!(draft.recipients(), &[Recipient::Manager]);
    }

    #[test]
    fn clearing_restores_empty_draft() {
        let draft = LeaveRequestDraft::new()
            .set_leave_type(LeaveType::Casual)
            .set_from_date(NaiveDate::from_ymd_opt(2025, 5, 1).unwrap())
            .clear_leave_type()
            .clear_from_date();

        assert!(draft.is_empty());
    }

    #[test]
    fn day_span_tracks_partial_range() {
        let draft = LeaveRequestDraft::new().set_from_date(NaiveDate::from_ymd_opt(2025, 5, 1).unwrap());
        assert_eq!(draft.day_span(), 0);

        let draft = draft.set_to_date(NaiveDate::from_ymd_opt(2025, 5, 5).unwrap());
        assert_eq!(draft.day_span(), 5);
    }
}
