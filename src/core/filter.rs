//! Filter composition for song listings
//!
//! `FilterCriteria` holds what the caller asked for; `SongFilter::compose`
//! turns it into a conjunction of `Predicate`s. Storage backends only ever see
//! the composed filter.

use chrono::NaiveDate;

use crate::core::models::{Song, SongId};
use crate::core::pagination::Page;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub id: Option<SongId>,
    pub group: Option<String>,
    pub title: Option<String>,
    pub text: Option<String>,
    pub link: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub page: Page,
}

/// Text columns that support substring search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Group,
    Title,
    Lyrics,
    Link,
}

impl TextField {
    pub fn value<'a>(&self, song: &'a Song) -> Option<&'a str> {
        match self {
            TextField::Group => Some(song.group.as_str()),
            TextField::Title => Some(song.title.as_str()),
            TextField::Lyrics => song.text.as_deref(),
            TextField::Link => song.link.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    IdEquals(SongId),
    /// Case-insensitive substring match. `needle` is stored lowercased.
    Contains { field: TextField, needle: String },
    ReleasedBetween { start: NaiveDate, end: NaiveDate },
    ReleasedOnOrAfter(NaiveDate),
    ReleasedOnOrBefore(NaiveDate),
}

impl Predicate {
    pub fn contains(field: TextField, needle: &str) -> Self {
        Predicate::Contains {
            field,
            needle: needle.to_lowercase(),
        }
    }

    pub fn matches(&self, song: &Song) -> bool {
        match self {
            Predicate::IdEquals(id) => song.id == *id,
            Predicate::Contains { field, needle } => field
                .value(song)
                .is_some_and(|value| value.to_lowercase().contains(needle.as_str())),
            Predicate::ReleasedBetween { start, end } => song
                .release_date
                .is_some_and(|date| *start <= date && date <= *end),
            Predicate::ReleasedOnOrAfter(start) => song.release_date.is_some_and(|date| date >= *start),
            Predicate::ReleasedOnOrBefore(end) => song.release_date.is_some_and(|date| date <= *end),
        }
    }
}

/// Conjunction of predicates. An empty filter matches every song.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongFilter {
    predicates: Vec<Predicate>,
}

impl SongFilter {
    pub fn compose(criteria: &FilterCriteria) -> Self {
        let mut predicates = Vec::new();

        if let Some(id) = criteria.id {
            predicates.push(Predicate::IdEquals(id));
        }

        let text_criteria = [
            (TextField::Group, &criteria.group),
            (TextField::Title, &criteria.title),
            (TextField::Lyrics, &criteria.text),
            (TextField::Link, &criteria.link),
        ];
        for (field, value) in text_criteria {
            if let Some(needle) = value.as_deref().filter(|needle| !needle.is_empty()) {
                predicates.push(Predicate::contains(field, needle));
            }
        }

        match (criteria.start_date, criteria.end_date) {
            (Some(start), Some(end)) => predicates.push(Predicate::ReleasedBetween { start, end }),
            (Some(start), None) => predicates.push(Predicate::ReleasedOnOrAfter(start)),
            (None, Some(end)) => predicates.push(Predicate::ReleasedOnOrBefore(end)),
            (None, None) => {}
        }

        Self { predicates }
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn matches(&self, song: &Song) -> bool {
        self.predicates.iter().all(|predicate| predicate.matches(song))
    }
}
