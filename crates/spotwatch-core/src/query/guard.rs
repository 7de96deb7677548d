//! Completeness check run before any selection-driven request.
//!
//! An incomplete selection is the normal "nothing picked yet" state of the
//! dashboard, so rejection is not a failure: callers answer with an empty
//! result and never reach the network.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

use crate::models::{FilterSelection, HistoryOrder};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No activities selected")]
    NoActivities,

    #[error("Date range is incomplete")]
    MissingRange,
}

/// A selection that passed the guard, with the date range unwrapped.
#[derive(Debug, Clone, Copy)]
pub struct ValidSelection<'a> {
    pub activities: &'a BTreeSet<String>,
    pub locations: &'a BTreeSet<String>,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub order_by: HistoryOrder,
    pub desc: bool,
}

pub struct FetchGuard;

impl FetchGuard {
    pub fn check(selection: &FilterSelection) -> Result<ValidSelection<'_>, ValidationError> {
        if selection.activities.is_empty() {
            return Err(ValidationError::NoActivities);
        }
        let (from, to) = match (selection.from, selection.to) {
            (Some(from), Some(to)) => (from, to),
            _ => return Err(ValidationError::MissingRange),
        };
        Ok(ValidSelection {
            activities: &selection.activities,
            locations: &selection.locations,
            from,
            to,
            order_by: selection.order_by,
            desc: selection.desc,
        })
    }

    /// Like `check`, but logs the rejection and discards the reason.
    pub fn admit(selection: &FilterSelection) -> Option<ValidSelection<'_>> {
        match Self::check(selection) {
            Ok(valid) => Some(valid),
            Err(reason) => {
                debug!(reason = %reason, "Selection not fetchable, skipping request");
                None
            }
        }
    }
}

pub fn is_fetchable(selection: &FilterSelection) -> bool {
    FetchGuard::check(selection).is_ok()
}
