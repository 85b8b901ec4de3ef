// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Post-filter for criteria the navigation query cannot enforce exactly.
//!
//! The rendered feed does not reliably honor date, verification or
//! engagement operators, so every record is checked again here. Pure and
//! order-preserving: applying it twice equals applying it once.

use crate::criteria::FilterCriteria;
use crate::record::ContentRecord;
use chrono::{DateTime, NaiveDate, Utc};

/// Whether `record` satisfies `criteria`.
pub fn keeps(record: &ContentRecord, criteria: &FilterCriteria) -> bool {
    if !criteria.include_replies && record.flags.is_reply {
        return false;
    }
    if !criteria.include_retweets && record.flags.is_retweet {
        return false;
    }
    if criteria.verified_only && !record.author.verified {
        return false;
    }
    if record.likes() < criteria.min_likes {
        return false;
    }
    if let Some(since) = criteria.since {
        if record.created_at < start_of_day(since) {
            return false;
        }
    }
    if let Some(until) = criteria.until {
        if record.created_at > start_of_day(until) {
            return false;
        }
    }
    true
}

/// Records of `records` that satisfy `criteria`, in their original order.
pub fn apply(records: Vec<ContentRecord>, criteria: &FilterCriteria) -> Vec<ContentRecord> {
    records
        .into_iter()
        .filter(|r| keeps(r, criteria))
        .collect()
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}
