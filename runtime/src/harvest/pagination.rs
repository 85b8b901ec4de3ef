//! Scroll-extract-decide state machine.
//!
//! ```text
//! Idle -> Extracting -> Deciding -> ScrollingMore -> Extracting -> ...
//!                          \-> Done(reason)
//! ```
//!
//! The machine holds no records; it reads the [`HarvestSession`] to decide.
//! Every cycle through `ScrollingMore` spends one unit of a finite scroll
//! budget, so a run always reaches `Done`.

use super::session::HarvestSession;
use serde::Serialize;
use std::fmt;

/// Why a harvest stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The session holds `limit` records.
    LimitReached,
    /// Consecutive passes found nothing new.
    Stalled,
    /// The scroll budget ran out first.
    ScrollBudgetExhausted,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::LimitReached => "limit reached",
            Self::Stalled => "feed stalled",
            Self::ScrollBudgetExhausted => "scroll budget exhausted",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationState {
    Idle,
    Extracting,
    Deciding,
    ScrollingMore,
    Done(StopReason),
}

/// Drives one harvest from `Idle` to `Done`.
#[derive(Debug, Clone)]
pub struct Pagination {
    state: PaginationState,
    scroll_budget: u32,
    stall_threshold: u32,
}

impl Pagination {
    pub fn new(scroll_budget: u32, stall_threshold: u32) -> Self {
        Self {
            state: PaginationState::Idle,
            scroll_budget,
            stall_threshold: stall_threshold.max(1),
        }
    }

    pub fn state(&self) -> PaginationState {
        self.state
    }

    /// Move to the next state. The caller performs the work the new state
    /// names (extract, scroll) before advancing again.
    pub fn advance(&mut self, session: &HarvestSession) -> PaginationState {
        self.state = match self.state {
            PaginationState::Idle => PaginationState::Extracting,
            PaginationState::Extracting => PaginationState::Deciding,
            PaginationState::Deciding => match self.stop_reason(session) {
                Some(reason) => PaginationState::Done(reason),
                None => PaginationState::ScrollingMore,
            },
            PaginationState::ScrollingMore => PaginationState::Extracting,
            done @ PaginationState::Done(_) => done,
        };
        self.state
    }

    /// Terminal checks in priority order: limit, stall, scroll budget.
    pub fn stop_reason(&self, session: &HarvestSession) -> Option<StopReason> {
        if session.is_full() {
            Some(StopReason::LimitReached)
        } else if session.stalled_passes() >= self.stall_threshold {
            Some(StopReason::Stalled)
        } else if session.scrolls() >= self.scroll_budget {
            Some(StopReason::ScrollBudgetExhausted)
        } else {
            None
        }
    }
}
