//! Session history of committed leave requests
//!
//! Records are CBOR encoded and kept in a sled tree keyed by sled's monotonic
//! id, so iterating the tree yields records in the order they were committed.
//! The store only ever grows: the workflow's commit step is the single caller
//! of [`HistoryStore::append`] and nothing removes or rewrites an entry.
use std::cmp::Ordering;
use std::path::Path;

use tracing::debug;

use crate::error::HistoryError;
use crate::types::{LeaveRequestRecord, LeaveType};

pub const DEFAULT_PAGE_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Type,
    From,
    To,
    Status,
    AppliedOn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Which column the history table is sorted by. Starts out newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    key: SortKey,
    direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            key: SortKey::AppliedOn,
            direction: SortDirection::Descending,
        }
    }
}

impl SortState {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }
    pub fn key(&self) -> SortKey {
        self.key
    }
    pub fn direction(&self) -> SortDirection {
        self.direction
    }
    /// A header click. The current key flips direction, any other key starts
    /// ascending.
    pub fn toggle(&mut self, key: SortKey) {
        if self.key == key {
            self.direction = self.direction.reversed();
        } else {
            self.key = key;
            self.direction = SortDirection::Ascending;
        }
    }

    fn compare(&self, a: &LeaveRequestRecord, b: &LeaveRequestRecord) -> Ordering {
        let ordering = match self.key {
            SortKey::Type => compare_text(a.leave_type().as_str(), b.leave_type().as_str()),
            SortKey::From => a.range().from().cmp(&b.range().from()),
            SortKey::To => a.range().to().cmp(&b.range().to()),
            SortKey::Status => compare_text(a.status().as_str(), b.status().as_str()),
            SortKey::AppliedOn => a.applied_on().cmp(b.applied_on()),
        };
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

// case-insensitive first, exact text as the tie breaker
fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// A view request against the history: filter text, ordering, and a 1-indexed
/// page window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    filter: String,
    sort: SortState,
    page: i64,
    page_size: usize,
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            filter: String::new(),
            sort: SortState::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl HistoryQuery {
    pub fn new() -> Self {
        Self::default()
    }
    /// Matched case-insensitively against the leave type name
    pub fn set_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }
    pub fn set_sort(mut self, sort: SortState) -> Self {
        self.sort = sort;
        self
    }
    /// Out of range pages are clamped when the query runs
    pub fn set_page(mut self, page: i64) -> Self {
        self.page = page;
        self
    }
    pub fn set_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn matches(&self, leave_type: LeaveType) -> bool {
        leave_type
            .as_str()
            .to_lowercase()
            .contains(&self.filter.trim().to_lowercase())
    }
}

/// One page of the filtered, sorted history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryPage {
    pub records: Vec<LeaveRequestRecord>,
    /// Records matching the filter across all pages
    pub total_count: usize,
    /// 0 when nothing matches
    pub total_pages: usize,
    /// The page actually served after clamping
    pub page: usize,
    pub page_size: usize,
}

impl HistoryPage {
    pub fn has_previous(&self) -> bool {
        self.total_pages > 0 && self.page > 1
    }
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

pub struct HistoryStore {
    db: sled::Db,
}

impl HistoryStore {
    /// A store that lives as long as the session; sled deletes it on drop.
    pub fn temporary() -> Result<Self, HistoryError> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    /// A store backed by a sled database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, HistoryError> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    pub(crate) fn append(&self, record: &LeaveRequestRecord) -> Result<(), HistoryError> {
        let seq = self.db.generate_id()?;
        self.db
            .insert(seq.to_be_bytes(), minicbor::to_vec(record)?)?;
        debug!(id = record.id(), seq, "leave record appended");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    /// Every record in commit order
    pub fn records(&self) -> Result<Vec<LeaveRequestRecord>, HistoryError> {
        self.db
            .iter()
            .values()
            .map(|value| -> Result<LeaveRequestRecord, HistoryError> {
                Ok(minicbor::decode(&value?)?)
            })
            .collect()
    }

    pub fn get(&self, id: &str) -> Result<Option<LeaveRequestRecord>, HistoryError> {
        Ok(self.records()?.into_iter().find(|r| r.id() == id))
    }

    /// Filter, then stable sort, then cut out the requested page.
    pub fn query(&self, query: &HistoryQuery) -> Result<HistoryPage, HistoryError> {
        let mut records: Vec<_> = self
            .records()?
            .into_iter()
            .filter(|r| query.matches(r.leave_type()))
            .collect();
        records.sort_by(|a, b| query.sort.compare(a, b));

        let page_size = query.page_size.max(1);
        let total_count = records.len();
        let total_pages = total_count.div_ceil(page_size);
        let page = query.page.clamp(1, total_pages.max(1) as i64) as usize;

        let records: Vec<_> = records
            .into_iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .collect();

        debug!(
            filter = %query.filter,
            total_count,
            page,
            total_pages,
            "history queried"
        );

        Ok(HistoryPage {
            records,
            total_count,
            total_pages,
            page,
            page_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, Utc};

    use super::*;
    use crate::types::{DateRange, Recipient, TimeStamp};

    fn record(n: i64, leave_type: LeaveType) -> LeaveRequestRecord {
        let from = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap() + Duration::days(n);
        let applied = Utc::now() + Duration::seconds(n);
        LeaveRequestRecord::new(
            format!("leave_{n}"),
            leave_type,
            DateRange::new(from, from + Duration::days(1)).unwrap(),
            "family commitments".into(),
            TimeStamp::from(applied),
            vec![Recipient::Manager],
        )
    }

    fn store_with(count: i64) -> HistoryStore {
        let store = HistoryStore::temporary().unwrap();
        for n in 0..count {
            let leave_type = LeaveType::ALL[(n % 3) as usize];
            store.append(&record(n, leave_type)).unwrap();
        }
        store
    }

    #[test]
    fn records_come_back_in_commit_order() {
        let store = store_with(4);
        let ids: Vec<_> = store
            .records()
            .unwrap()
            .iter()
            .map(|r| r.id().to_string())
            .collect();

        assert_eq!(ids, ["leave_0", "leave_1", "leave_2", "leave_3"]);
        assert_eq!(store.len(), 4);
        assert_eq!(store.get("leave_2").unwrap().unwrap().leave_type(), LeaveType::Casual);
        assert!(store.get("leave_9").unwrap().is_none());
    }

    #[test]
    fn default_query_is_newest_first() {
        let store = store_with(3);
        let page = store.query(&HistoryQuery::new()).unwrap();

        assert_eq!(page.records[0].id(), "leave_2");
        assert_eq!(page.records[2].id(), "leave_0");
    }

    #[test]
    fn filter_matches_leave_type_case_insensitively() {
        let store = store_with(6);
        let page = store.query(&HistoryQuery::new().set_filter("SIC")).unwrap();

        assert_eq!(page.total_count, 2);
        assert!(page.records.iter().all(|r| r.leave_type() == LeaveType::Sick));
    }

    #[test]
    fn pages_are_clamped() {
        let store = store_with(12);

        let page = store.query(&HistoryQuery::new().set_page(4)).unwrap();
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.page, 3);
        assert_eq!(page.records.len(), 2);
        assert!(!page.has_next());
        assert!(page.has_previous());

        let page = store.query(&HistoryQuery::new().set_page(-2)).unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.records.len(), 5);
        assert!(!page.has_previous());
    }

    #[test]
    fn empty_result_disables_navigation() {
        let store = store_with(3);
        let page = store.query(&HistoryQuery::new().set_filter("maternity")).unwrap();

        assert_eq!(page.total_pages, 0);
        assert!(page.records.is_empty());
        assert!(!page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn toggle_flips_same_key_and_resets_new_key() {
        let mut sort = SortState::default();
        sort.toggle(SortKey::AppliedOn);
        assert_eq!(sort.direction(), SortDirection::Ascending);

        sort.toggle(SortKey::Type);
        assert_eq!(sort, SortState::new(SortKey::Type, SortDirection::Ascending));

        sort.toggle(SortKey::Type);
        assert_eq!(sort.direction(), SortDirection::Descending);

        sort.toggle(SortKey::From);
        assert_eq!(sort, SortState::new(SortKey::From, SortDirection::Ascending));
    }

    #[test]
    fn sort_by_type_is_stable() {
        let store = store_with(6);
        let query = HistoryQuery::new()
            .set_sort(SortState::new(SortKey::Type, SortDirection::Ascending))
            .set_page_size(10);
        let ids: Vec<_> = store
            .query(&query)
            .unwrap()
            .records
            .iter()
            .map(|r| r.id().to_string())
            .collect();

        // Annual, Casual, Sick; ties keep commit order
        assert_eq!(
            ids,
            ["leave_0", "leave_3", "leave_2", "leave_5", "leave_1", "leave_4"]
        );
    }
}
