//! Per-call accumulation state.

use crate::criteria::FilterCriteria;
use crate::filter;
use crate::record::ContentRecord;
use std::collections::HashSet;
use tracing::debug;

/// Records gathered by one harvest call, unique by id in first-seen order.
///
/// Owned by a single call and dropped with it; never persisted.
#[derive(Debug, Default)]
pub struct HarvestSession {
    records: Vec<ContentRecord>,
    seen: HashSet<String>,
    limit: usize,
    passes: u32,
    scrolls: u32,
    stalled_passes: u32,
}

impl HarvestSession {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Admit one extraction pass.
    ///
    /// Ids already seen are dropped. New ids count as progress whether or not
    /// the post-filter keeps them; kept records are appended until `limit`.
    /// Returns the number of new ids.
    pub fn admit(&mut self, batch: Vec<ContentRecord>, criteria: &FilterCriteria) -> usize {
        let mut fresh = 0;
        let mut kept = 0;
        for record in batch {
            if !self.seen.insert(record.id.clone()) {
                continue;
            }
            fresh += 1;
            if self.records.len() < self.limit && filter::keeps(&record, criteria) {
                self.records.push(record);
                kept += 1;
            }
        }

        self.passes += 1;
        if fresh == 0 {
            self.stalled_passes += 1;
        } else {
            self.stalled_passes = 0;
        }
        debug!(
            pass = self.passes,
            fresh,
            kept,
            total = self.records.len(),
            stalled = self.stalled_passes,
            "extraction pass admitted"
        );
        fresh
    }

    pub fn record_scroll(&mut self) {
        self.scrolls += 1;
    }

    pub fn is_full(&self) -> bool {
        self.records.len() >= self.limit
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn passes(&self) -> u32 {
        self.passes
    }

    pub fn scrolls(&self) -> u32 {
        self.scrolls
    }

    /// Consecutive passes that produced no new id.
    pub fn stalled_passes(&self) -> u32 {
        self.stalled_passes
    }

    /// Accumulated records cut to the limit, order preserved.
    pub fn into_records(self) -> Vec<ContentRecord> {
        let mut records = self.records;
        records.truncate(self.limit);
        records
    }
}
