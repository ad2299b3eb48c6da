//! Request and response shapes for the HTTP API
//!
//! Query strings and JSON bodies are parsed here into domain types; nothing
//! downstream sees raw strings for ids, dates or page bounds.

use serde::{Deserialize, Deserializer, Serialize};

use crate::core::dates::{format_date, parse_optional_date};
use crate::core::filter::FilterCriteria;
use crate::core::models::{Song, SongDraft, SongId, SongUpdate};
use crate::core::pagination::Page;
use crate::error::{Result, SongCatalogError};

/// Numeric query values: missing or empty means "not supplied".
fn optional_u64<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<u64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("expected a non-negative integer, got '{}'", value))),
    }
}

fn required_id(raw: Option<u64>) -> Result<SongId> {
    raw.and_then(SongId::new)
        .ok_or_else(|| SongCatalogError::Validation("id must be a positive integer".to_string()))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSongsParams {
    #[serde(default, deserialize_with = "optional_u64")]
    pub id: Option<u64>,
    pub group: Option<String>,
    pub song: Option<String>,
    pub text: Option<String>,
    pub link: Option<String>,
    #[serde(alias = "startTime")]
    pub start_date: Option<String>,
    #[serde(alias = "endTime")]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "optional_u64")]
    pub offset: Option<u64>,
    #[serde(default, deserialize_with = "optional_u64")]
    pub limit: Option<u64>,
}

impl ListSongsParams {
    /// Dates are parsed before anything else so a malformed one never
    /// reaches storage. An id of zero filters nothing; an id outside the
    /// storage range is rejected.
    pub fn into_criteria(self) -> Result<FilterCriteria> {
        let start_date = parse_optional_date("startDate", self.start_date.as_deref())?;
        let end_date = parse_optional_date("endDate", self.end_date.as_deref())?;
        let id = match self.id {
            None | Some(0) => None,
            Some(raw) => Some(required_id(Some(raw))?),
        };

        Ok(FilterCriteria {
            id,
            group: self.group,
            title: self.song,
            text: self.text,
            link: self.link,
            start_date,
            end_date,
            page: Page::new(self.offset, self.limit),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct VersesParams {
    #[serde(default, deserialize_with = "optional_u64")]
    pub id: Option<u64>,
    #[serde(default, deserialize_with = "optional_u64")]
    pub offset: Option<u64>,
    #[serde(default, deserialize_with = "optional_u64")]
    pub limit: Option<u64>,
}

impl VersesParams {
    pub fn into_request(self) -> Result<(SongId, Page)> {
        Ok((required_id(self.id)?, Page::new(self.offset, self.limit)))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct IdParams {
    #[serde(default, deserialize_with = "optional_u64")]
    pub id: Option<u64>,
}

impl IdParams {
    pub fn song_id(&self) -> Result<SongId> {
        required_id(self.id)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DetailsParams {
    pub group: Option<String>,
    pub song: Option<String>,
}

impl DetailsParams {
    pub fn into_key(self) -> Result<(String, String)> {
        match (self.group, self.song) {
            (Some(group), Some(song)) if !group.is_empty() && !song.is_empty() => Ok((group, song)),
            _ => Err(SongCatalogError::Validation("group and song are required".to_string())),
        }
    }
}

/// Body item of `POST /songs`.
#[derive(Debug, Deserialize)]
pub struct NewSong {
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub song: String,
}

impl From<NewSong> for SongDraft {
    fn from(new_song: NewSong) -> Self {
        SongDraft::new(new_song.group, new_song.song)
    }
}

/// Wire form of a song. Unset values travel as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongPayload {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub song: String,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub link: String,
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

impl SongPayload {
    /// Non-empty fields become the update; empty ones are left alone.
    pub fn into_update(self) -> Result<SongUpdate> {
        let id = required_id(Some(self.id))?;
        let release_date = parse_optional_date("releaseDate", Some(&self.release_date))?;

        Ok(SongUpdate {
            id,
            group: non_empty(self.group),
            title: non_empty(self.song),
            release_date,
            text: non_empty(self.text),
            link: non_empty(self.link),
        })
    }
}

impl From<Song> for SongPayload {
    fn from(song: Song) -> Self {
        Self {
            id: song.id.get() as u64,
            group: song.group,
            song: song.title,
            release_date: song.release_date.map(format_date).unwrap_or_default(),
            text: song.text.unwrap_or_default(),
            link: song.link.unwrap_or_default(),
        }
    }
}

impl From<SongUpdate> for SongPayload {
    fn from(update: SongUpdate) -> Self {
        Self {
            id: update.id.get() as u64,
            group: update.group.unwrap_or_default(),
            song: update.title.unwrap_or_default(),
            release_date: update.release_date.map(format_date).unwrap_or_default(),
            text: update.text.unwrap_or_default(),
            link: update.link.unwrap_or_default(),
        }
    }
}

/// Body of `GET /info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongDetails {
    pub release_date: String,
    pub text: String,
    pub link: String,
}

impl From<Song> for SongDetails {
    fn from(song: Song) -> Self {
        Self {
            release_date: song.release_date.map(format_date).unwrap_or_default(),
            text: song.text.unwrap_or_default(),
            link: song.link.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_list_params_into_criteria() {
        let params = ListSongsParams {
            id: Some(0),
            group: Some("Muse".into()),
            start_date: Some("01.01.2006".into()),
            limit: Some(0),
            ..Default::default()
        };

        let criteria = params.into_criteria().unwrap();
        assert_eq!(criteria.id, None);
        assert_eq!(criteria.group.as_deref(), Some("Muse"));
        assert_eq!(criteria.start_date, NaiveDate::from_ymd_opt(2006, 1, 1));
        assert_eq!(criteria.page, Page::new(None, None));
    }

    #[test]
    fn test_list_params_reject_malformed_dates() {
        let params = ListSongsParams { end_date: Some("2024-01-01".into()), ..Default::default() };
        assert!(matches!(
            params.into_criteria(),
            Err(SongCatalogError::InvalidDate { field: "endDate", .. })
        ));
    }

    #[test]
    fn test_list_params_reject_out_of_range_id() {
        let params = ListSongsParams { id: Some(i64::MAX as u64 + 1), ..Default::default() };
        assert!(params.into_criteria().unwrap_err().is_client_error());

        let params = ListSongsParams { id: Some(i64::MAX as u64), ..Default::default() };
        assert_eq!(params.into_criteria().unwrap().id.map(SongId::get), Some(i64::MAX));
    }

    #[test]
    fn test_verses_params_require_nonzero_id() {
        assert!(VersesParams { id: Some(0), ..Default::default() }.into_request().is_err());
        assert!(VersesParams::default().into_request().is_err());

        let (id, page) = VersesParams { id: Some(3), offset: Some(2), limit: None }.into_request().unwrap();
        assert_eq!(id.get(), 3);
        assert_eq!(page, Page::new(Some(2), Some(10)));
    }

    #[test]
    fn test_payload_into_partial_update() {
        let payload: SongPayload = serde_json::from_str(
            r#"{"id": 5, "group": "", "song": "Uprising", "releaseDate": "07.09.2009"}"#,
        )
        .unwrap();

        let update = payload.into_update().unwrap();
        assert_eq!(update.id.get(), 5);
        assert_eq!(update.group, None);
        assert_eq!(update.title.as_deref(), Some("Uprising"));
        assert_eq!(update.release_date, NaiveDate::from_ymd_opt(2009, 9, 7));
        assert_eq!(update.text, None);
    }

    #[test]
    fn test_payload_with_zero_id_is_rejected() {
        let payload = SongPayload { song: "Uprising".into(), ..Default::default() };
        assert!(payload.into_update().unwrap_err().is_client_error());
    }

    #[test]
    fn test_song_serializes_unset_values_as_empty_strings() {
        let song = Song {
            id: SongId::new(1).unwrap(),
            group: "G".into(),
            title: "S".into(),
            release_date: None,
            text: None,
            link: None,
        };
        let json = serde_json::to_value(SongPayload::from(song)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 1, "group": "G", "song": "S", "releaseDate": "", "text": "", "link": ""})
        );
    }
}
