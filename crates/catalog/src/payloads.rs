//! Bodies for list mutations (`PATCH /ulist/<id>`, `PATCH /rlist/<id>`).
//!
//! Only the fields that are set are sent. Nullable fields use
//! `Option<Option<T>>`: `None` leaves the field unchanged, `Some(None)` sends
//! `null` and clears it on the remote.

use serde::Serialize;

use crate::{ReleaseDate, ReleaseStatus, Vote};

/// Changes to a visual novel entry on the user's list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UlistUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vote: Option<Option<Vote>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started: Option<Option<ReleaseDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished: Option<Option<ReleaseDate>>,
    /// Replaces the full label set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<u32>>,
    /// Labels to add.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels_set: Vec<u32>,
    /// Labels to remove.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels_unset: Vec<u32>,
}

impl UlistUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn vote(mut self, vote: Vote) -> Self {
        self.vote = Some(Some(vote));
        self
    }

    #[must_use]
    pub fn clear_vote(mut self) -> Self {
        self.vote = Some(None);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(Some(notes.into()));
        self
    }

    #[must_use]
    pub fn clear_notes(mut self) -> Self {
        self.notes = Some(None);
        self
    }

    #[must_use]
    pub fn started(mut self, date: ReleaseDate) -> Self {
        self.started = Some(Some(date));
        self
    }

    #[must_use]
    pub fn finished(mut self, date: ReleaseDate) -> Self {
        self.finished = Some(Some(date));
        self
    }

    #[must_use]
    pub fn labels(mut self, labels: impl IntoIterator<Item = u32>) -> Self {
        self.labels = Some(labels.into_iter().collect());
        self
    }

    #[must_use]
    pub fn set_label(mut self, label: u32) -> Self {
        self.labels_set.push(label);
        self
    }

    #[must_use]
    pub fn unset_label(mut self, label: u32) -> Self {
        self.labels_unset.push(label);
        self
    }

    /// Returns `true` if nothing would be changed.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Changes to a release entry on the user's list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RlistUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ReleaseStatus>,
}

impl RlistUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn status(mut self, status: ReleaseStatus) -> Self {
        self.status = Some(status);
        self
    }
}
