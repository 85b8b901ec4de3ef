// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Cortex harvest library: resilient timeline harvesting over a live browser
//! session.
//!
//! [`harvest::Harvester`] drives a [`renderer::RenderContext`] through
//! navigation, readiness and the scroll/extract/decide loop, returning
//! deduplicated [`record::ContentRecord`]s that satisfy a
//! [`criteria::FilterCriteria`].

pub mod cli;
pub mod config;
pub mod credentials;
pub mod criteria;
pub mod error;
pub mod extract;
pub mod filter;
pub mod harvest;
pub mod locator;
pub mod query;
pub mod record;
pub mod renderer;

pub use config::HarvestConfig;
pub use criteria::FilterCriteria;
pub use error::{HarvestError, HarvestResult};
pub use harvest::{HarvestReport, Harvester, StopReason};
pub use record::ContentRecord;
