//! Per-view status tracking.

use std::collections::HashMap;

use course_commerce::CommerceError;
use course_data::DependencyTag;
use serde::Serialize;

/// Lifecycle of one course view.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ViewStatus {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A load for the current course is in flight.
    Loading,
    /// The course loaded and every status fetch settled.
    Ready,
    /// The course itself could not be loaded.
    Error(CommerceError),
}

impl ViewStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn error(&self) -> Option<&CommerceError> {
        match self {
            Self::Error(err) => Some(err),
            _ => None,
        }
    }
}

/// Status of one status fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum FetchStatus {
    /// Issued and not yet settled.
    Pending,
    /// Settled with data.
    Succeeded,
    /// Settled with its safe default after a failure or timeout.
    Degraded(String),
    /// Not issued because the viewer is a guest.
    Skipped,
}

impl FetchStatus {
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Tracks the four status fetches of the current course view.
///
/// Readiness holds once every fetch has settled, whichever way it settled.
#[derive(Debug, Clone)]
pub struct StatusBoard {
    fetches: HashMap<DependencyTag, FetchStatus>,
}

impl StatusBoard {
    /// A board with every status fetch pending.
    pub fn new() -> Self {
        Self {
            fetches: DependencyTag::STATUS
                .iter()
                .map(|tag| (*tag, FetchStatus::Pending))
                .collect(),
        }
    }

    /// A board for a guest, where nothing remote is fetched.
    pub fn skipped() -> Self {
        let mut board = Self::new();
        for tag in DependencyTag::STATUS {
            board.settle(tag, FetchStatus::Skipped);
        }
        board
    }

    /// Record how a fetch settled. Tags outside the status set are ignored.
    pub fn settle(&mut self, tag: DependencyTag, status: FetchStatus) {
        if let Some(slot) = self.fetches.get_mut(&tag) {
            *slot = status;
        }
    }

    /// Record a fetch result.
    pub fn record<T, E: std::fmt::Display>(&mut self, tag: DependencyTag, result: &Result<T, E>) {
        let status = match result {
            Ok(_) => FetchStatus::Succeeded,
            Err(err) => FetchStatus::Degraded(err.to_string()),
        };
        self.settle(tag, status);
    }

    pub fn status(&self, tag: DependencyTag) -> Option<&FetchStatus> {
        self.fetches.get(&tag)
    }

    /// Check if every status fetch has settled.
    pub fn is_ready(&self) -> bool {
        self.fetches.values().all(FetchStatus::is_settled)
    }

    /// Fetches that settled by falling back.
    pub fn degraded(&self) -> Vec<DependencyTag> {
        DependencyTag::STATUS
            .into_iter()
            .filter(|tag| matches!(self.fetches.get(tag), Some(FetchStatus::Degraded(_))))
            .collect()
    }
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new()
    }
}
