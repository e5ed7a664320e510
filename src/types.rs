//! Core leave request types
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, RangeError};
use crate::utils;

#[derive(
    minicbor::Encode,
    minicbor::Decode,
    Serialize,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
)]
pub enum LeaveType {
    #[n(0)]
    Annual,
    #[n(1)]
    Sick,
    #[n(2)]
    Casual,
}

#[derive(
    minicbor::Encode,
    minicbor::Decode,
    Serialize,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
)]
pub enum Recipient {
    #[n(0)]
    HR,
    #[n(1)]
    Manager,
    #[n(2)]
    TeamLead,
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeaveStatus {
    #[n(0)]
    Pending,
    #[n(1)]
    Approved,
    #[n(2)]
    Rejected,
}

impl LeaveType {
    pub const ALL: [LeaveType; 3] = [LeaveType::Annual, LeaveType::Sick, LeaveType::Casual];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveType::Annual => "Annual",
            LeaveType::Sick => "Sick",
            LeaveType::Casual => "Casual",
        }
    }
}

impl Recipient {
    pub const ALL: [Recipient; 3] = [Recipient::HR, Recipient::Manager, Recipient::TeamLead];

    pub fn as_str(&self) -> &'static str {
        match self {
            Recipient::HR => "HR",
            Recipient::Manager => "Manager",
            Recipient::TeamLead => "Team Lead",
        }
    }
}

impl LeaveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveStatus::Pending => "Pending",
            LeaveStatus::Approved => "Approved",
            LeaveStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for LeaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// select boxes hand us the option value as text
impl FromStr for LeaveType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LeaveType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseError {
                kind: "leave type",
                value: s.to_string(),
            })
    }
}

impl FromStr for Recipient {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        Recipient::ALL
            .into_iter()
            .find(|r| format!("{r:?}").eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| ParseError {
                kind: "recipient",
                value: s.to_string(),
            })
    }
}

/// An inclusive span of calendar days. `from <= to` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, RangeError> {
        if to < from {
            return Err(RangeError::EndBeforeStart { from, to });
        }
        Ok(Self { from, to })
    }
    pub fn from(&self) -> NaiveDate {
        self.from
    }
    pub fn to(&self) -> NaiveDate {
        self.to
    }
    pub fn day_span(&self) -> i64 {
        utils::day_span(Some(self.from), Some(self.to))
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct TimeStamp<T: TimeZone>(DateTime<T>);

// `Utc` itself is not `Ord`, so a derive would never apply
impl PartialOrd for TimeStamp<Utc> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimeStamp<Utc> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl TimeStamp<Utc> {
    pub fn new() -> Self {
        Self(Utc::now())
    }
    pub fn to_datetime_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

impl Default for TimeStamp<Utc> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TimeZone> From<DateTime<T>> for TimeStamp<T> {
    fn from(value: DateTime<T>) -> Self {
        TimeStamp(value)
    }
}

/// A committed leave request. Created once by the workflow's commit step and
/// never edited afterwards.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct LeaveRequestRecord {
    #[n(0)]
    id: String, // bech32m uuid7, or the id the leave service acknowledged with
    #[n(1)]
    leave_type: LeaveType,
    #[n(2)]
    range: DateRange,
    #[n(3)]
    reason: String,
    #[n(4)]
    status: LeaveStatus,
    #[n(5)]
    applied_on: TimeStamp<Utc>,
    #[n(6)]
    recipients: Vec<Recipient>,
}

impl LeaveRequestRecord {
    pub(crate) fn new(
        id: String,
        leave_type: LeaveType,
        range: DateRange,
        reason: String,
        applied_on: TimeStamp<Utc>,
        recipients: Vec<Recipient>,
    ) -> Self {
        Self {
            id,
            leave_type,
            range,
            reason,
            status: LeaveStatus::Pending,
            applied_on,
            recipients,
        }
    }
    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn leave_type(&self) -> LeaveType {
        self.leave_type
    }
    pub fn range(&self) -> DateRange {
        self.range
    }
    pub fn reason(&self) -> &str {
        &self.reason
    }
    pub fn status(&self) -> LeaveStatus {
        self.status
    }
    pub fn applied_on(&self) -> &TimeStamp<Utc> {
        &self.applied_on
    }
    pub fn recipients(&self) -> &[Recipient] {
        &self.recipients
    }
    pub fn day_span(&self) -> i64 {
        self.range.day_span()
    }
}

impl<C> minicbor::Encode<C> for TimeStamp<Utc> {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        if let Some(nsec) = self.0.timestamp_nanos_opt() {
            return e.i64(nsec)?.ok();
        }

        Err(minicbor::encode::Error::message(
            "failed to encode timestamp. timestamp_nanos_opt returned None",
        ))
    }
}

impl<'b, C> minicbor::Decode<'b, C> for TimeStamp<Utc> {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let nsecs = d.i64()?;

        Ok(TimeStamp(DateTime::from_timestamp_nanos(nsecs)))
    }
}

// stored as [from, to] in days since 0001-01-01
impl<C> minicbor::Encode<C> for DateRange {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.array(2)?
            .i32(self.from.num_days_from_ce())?
            .i32(self.to.num_days_from_ce())?
            .ok()
    }
}

impl<'b, C> minicbor::Decode<'b, C> for DateRange {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        if d.array()? != Some(2) {
            return Err(minicbor::decode::Error::message(
                "date range must be a two element array",
            ));
        }
        let from = NaiveDate::from_num_days_from_ce_opt(d.i32()?)
            .ok_or(minicbor::decode::Error::message("start date out of range"))?;
        let to = NaiveDate::from_num_days_from_ce_opt(d.i32()?)
            .ok_or(minicbor::decode::Error::message("end date out of range"))?;

        DateRange::new(from, to)
            .map_err(|_| minicbor::decode::Error::message("stored date range is inverted"))
    }
}
