//! Domain types for the song catalog
//!
//! Absent values are modelled with `Option` throughout: a song id of zero,
//! an empty lyrics blob or an unset release date never stand in for "missing".

use chrono::NaiveDate;
use std::fmt;

/// Identity of a persisted song. Always non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SongId(i64);

impl SongId {
    /// Returns `None` for `0` and for values outside the storage id range.
    pub fn new(raw: u64) -> Option<Self> {
        if raw == 0 || raw > i64::MAX as u64 {
            None
        } else {
            Some(SongId(raw as i64))
        }
    }

    /// Wrap an id read back from storage.
    pub(crate) fn from_row(id: i64) -> Self {
        SongId(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
    pub id: SongId,
    pub group: String,
    pub title: String,
    pub release_date: Option<NaiveDate>,
    pub text: Option<String>,
    pub link: Option<String>,
}

/// A song submitted for creation. Lyrics, date and link start unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongDraft {
    pub group: String,
    pub title: String,
}

impl SongDraft {
    pub fn new(group: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            title: title.into(),
        }
    }
}

/// Partial update keyed by id. `None` fields are left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongUpdate {
    pub id: SongId,
    pub group: Option<String>,
    pub title: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub text: Option<String>,
    pub link: Option<String>,
}

impl SongUpdate {
    pub fn new(id: SongId) -> Self {
        Self {
            id,
            group: None,
            title: None,
            release_date: None,
            text: None,
            link: None,
        }
    }

    pub fn has_changes(&self) -> bool {
        self.group.is_some()
            || self.title.is_some()
            || self.release_date.is_some()
            || self.text.is_some()
            || self.link.is_some()
    }

    pub fn apply_to(&self, song: &mut Song) {
        if let Some(group) = &self.group {
            song.group = group.clone();
        }
        if let Some(title) = &self.title {
            song.title = title.clone();
        }
        if let Some(date) = self.release_date {
            song.release_date = Some(date);
        }
        if let Some(text) = &self.text {
            song.text = Some(text.clone());
        }
        if let Some(link) = &self.link {
            song.link = Some(link.clone());
        }
    }
}
