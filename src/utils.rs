//! Utility functions for id generation and day arithmetic

use bech32::{Bech32m, Hrp};
use chrono::NaiveDate;
use uuid7::uuid7;

/// Mint an id for a leave record, `leave_1...`. uuid7 keeps ids minted in the
/// same session roughly time ordered.
pub fn new_record_id() -> Result<String, bech32::EncodeError> {
    let hrp = Hrp::parse_unchecked("leave_");
    bech32::encode::<Bech32m>(hrp, uuid7().as_bytes())
}

/// Inclusive number of days between two dates: `(to - from) + 1`.
///
/// Returns 0 while either end of the range is missing. An inverted range is
/// not clamped, so `to` one day before `from` yields 0 and earlier dates go
/// negative; the value only feeds the summary display.
pub fn day_span(from: Option<NaiveDate>, to: Option<NaiveDate>) -> i64 {
    match (from, to) {
        (Some(from), Some(to)) => (to - from).num_days() + 1,
        _ => 0,
    }
}
