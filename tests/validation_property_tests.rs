//! Property-based tests for draft validation and the day calculator
//!
//! These exercise the rule set over randomly generated drafts. Each required
//! field is knocked out on its own and in combination, and the date-order rule
//! is checked for every ordering of start and end.

use chrono::{Duration, NaiveDate};
use leave_request::{
    draft::LeaveRequestDraft,
    error::Field,
    types::{LeaveType, Recipient},
    utils::day_span,
    validation::{ValidationPolicy, validate},
};
use proptest::prelude::*;

// PROPERTY TEST STRATEGIES

fn leave_type_strategy() -> impl Strategy<Value = LeaveType> {
    prop::sample::select(LeaveType::ALL.to_vec())
}

fn recipients_strategy() -> impl Strategy<Value = Vec<Recipient>> {
    prop::sample::subsequence(Recipient::ALL.to_vec(), 0..=3)
}

/// Any date between 2020 and the end of 2030
fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0i64..4018).prop_map(|offset| NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + Duration::days(offset))
}

/// A start date and a non-negative span in days
fn ordered_dates_strategy() -> impl Strategy<Value = (NaiveDate, NaiveDate)> {
    (date_strategy(), 0i64..60).prop_map(|(from, len)| (from, from + Duration::days(len)))
}

/// A reason long enough to pass the default rule, possibly padded with whitespace
fn valid_reason_strategy() -> impl Strategy<Value = String> {
    ("[a-zA-Z][a-zA-Z ]{8,40}[a-zA-Z]", " {0,3}").prop_map(|(text, pad)| format!("{pad}{text}{pad}"))
}

/// Which required fields to leave blank
fn missing_fields_strategy() -> impl Strategy<Value = (bool, bool, bool, bool)> {
    (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>())
        .prop_filter("at least one field missing", |(a, b, c, d)| *a || *b || *c || *d)
}

fn complete_draft(
    leave_type: LeaveType,
    (from, to): (NaiveDate, NaiveDate),
    reason: String,
    recipients: Vec<Recipient>,
) -> LeaveRequestDraft {
    LeaveRequestDraft::new()
        .set_leave_type(leave_type)
        .set_from_date(from)
        .set_to_date(to)
        .set_reason(reason)
        .set_recipients(recipients)
}

// PROPERTY TESTS
proptest! {
    /// Property: a fully filled draft with ordered dates always validates
    #[test]
    fn prop_complete_draft_validates(
        leave_type in leave_type_strategy(),
        dates in ordered_dates_strategy(),
        reason in valid_reason_strategy(),
        recipients in recipients_strategy(),
    ) {
        let draft = complete_draft(leave_type, dates, reason.clone(), recipients.clone());
        let result = validate(&draft, &ValidationPolicy::default());

        prop_assert!(result.is_ok(), "complete draft should validate: {:?}", result.err());
        let candidate = result.unwrap();
        prop_assert_eq!(candidate.leave_type(), leave_type);
        prop_assert_eq!(candidate.reason(), reason.trim());
        prop_assert_eq!(candidate.recipients(), recipients.as_slice());
        prop_assert_eq!(candidate.range().from(), dates.0);
        prop_assert_eq!(candidate.range().to(), dates.1);
    }

    /// Property: every blanked required field is reported, and nothing else is
    #[test]
    fn prop_missing_fields_each_reported(
        leave_type in leave_type_strategy(),
        dates in ordered_dates_strategy(),
        reason in valid_reason_strategy(),
        (no_type, no_from, no_to, no_reason) in missing_fields_strategy(),
    ) {
        let mut draft = complete_draft(leave_type, dates, reason, vec![]);
        if no_type { draft = draft.clear_leave_type(); }
        if no_from { draft = draft.clear_from_date(); }
        if no_to { draft = draft.clear_to_date(); }
        if no_reason { draft = draft.set_reason("   "); }

        let errors = validate(&draft, &ValidationPolicy::default()).unwrap_err();

        prop_assert_eq!(errors.contains(Field::LeaveType), no_type);
        prop_assert_eq!(errors.contains(Field::FromDate), no_from);
        prop_assert_eq!(errors.contains(Field::ToDate), no_to);
        prop_assert_eq!(errors.contains(Field::Reason), no_reason);
        prop_assert!(!errors.contains(Field::Recipients));
    }

    /// Property: an end date before the start is always flagged on `toDate`
    #[test]
    fn prop_end_before_start_rejected(
        leave_type in leave_type_strategy(),
        from in date_strategy(),
        back in 1i64..400,
        reason in valid_reason_strategy(),
    ) {
        let draft = complete_draft(leave_type, (from, from), reason, vec![])
            .set_to_date(from - Duration::days(back));
        let errors = validate(&draft, &ValidationPolicy::default()).unwrap_err();

        prop_assert_eq!(errors.len(), 1);
        prop_assert!(errors.get(Field::ToDate).unwrap().contains("before start date"));
    }

    /// Property: reasons shorter than the minimum fail whatever the minimum is
    #[test]
    fn prop_short_reason_rejected(
        min_len in 2usize..40,
        reason in "[a-z]{1,40}",
        dates in ordered_dates_strategy(),
    ) {
        let policy = ValidationPolicy { min_reason_len: min_len, ..Default::default() };
        let draft = complete_draft(LeaveType::Annual, dates, reason.clone(), vec![]);
        let result = validate(&draft, &policy);

        prop_assert_eq!(result.is_err(), reason.len() < min_len);
    }

    /// Property: the day span is the inclusive count of days
    #[test]
    fn prop_day_span_is_inclusive((from, to) in ordered_dates_strategy()) {
        let span = day_span(Some(from), Some(to));

        prop_assert!(span >= 1);
        prop_assert_eq!(span, (to - from).num_days() + 1);
        prop_assert_eq!(from + Duration::days(span - 1), to);
    }
}

#[test]
fn single_day_leave_is_valid() {
    let day = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
    let draft = complete_draft(
        LeaveType::Casual,
        (day, day),
        "Moving to a new flat".into(),
        vec![],
    );
    let candidate = validate(&draft, &ValidationPolicy::default()).unwrap();

    assert_eq!(candidate.day_span(), 1);
}

#[test]
fn day_span_examples() {
    let d = |day| NaiveDate::from_ymd_opt(2025, 5, day);
    assert_eq!(day_span(d(1), d(1)), 1);
    assert_eq!(day_span(d(1), d(5)), 5);
}
