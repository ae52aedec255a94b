//! Bounded record history.
//!
//! A fixed-size sliding window over arrival order. Pushing into a full
//! history evicts the oldest record first, so memory and the rendered table
//! stay bounded no matter how fast producers write.

use std::collections::{VecDeque, vec_deque};

use auditview_proto::AuditRecord;

/// Default number of rows kept for display.
pub const MAX_ROWS: usize = 15;

/// Upper bound on the up-front allocation for large windows.
const PREALLOCATED_ROWS: usize = 1024;

/// Most recent audit records, oldest first.
///
/// # Invariants
///
/// - `len() <= capacity()` after every operation.
/// - Records are kept in insertion order; only the oldest is ever evicted.
#[derive(Debug, Clone)]
pub struct History {
    records: VecDeque<AuditRecord>,
    capacity: usize,
    evicted: u64,
}

impl History {
    /// Create an empty history holding at most `capacity` records.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let records = VecDeque::with_capacity(capacity.min(PREALLOCATED_ROWS));
        Self { records, capacity, evicted: 0 }
    }

    /// Append a record, evicting and returning the oldest one when full.
    pub fn push(&mut self, record: AuditRecord) -> Option<AuditRecord> {
        let evicted = if self.records.len() == self.capacity {
            self.evicted = self.evicted.saturating_add(1);
            self.records.pop_front()
        } else {
            None
        };

        self.records.push_back(record);
        debug_assert!(self.records.len() <= self.capacity);
        evicted
    }

    /// Records oldest first.
    pub fn iter(&self) -> vec_deque::Iter<'_, AuditRecord> {
        self.records.iter()
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no record has been kept yet.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Maximum number of records held.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records evicted since creation.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(MAX_ROWS)
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a AuditRecord;
    type IntoIter = vec_deque::Iter<'a, AuditRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
