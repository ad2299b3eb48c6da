use chrono::NaiveDate;

use crate::error::{Result, SongCatalogError};

/// Day.month.year, the only date format accepted on the wire.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// Exactly two day digits, two month digits and four year digits. chrono
/// alone also takes single digits and signed or five-digit years.
fn has_date_shape(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() == 10
        && bytes[2] == b'.'
        && bytes[5] == b'.'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 2 || i == 5 || b.is_ascii_digit())
}

/// Parse an optional `DD.MM.YYYY` value. Empty input means "not supplied".
pub fn parse_optional_date(field: &'static str, value: Option<&str>) -> Result<Option<NaiveDate>> {
    let raw = match value {
        None | Some("") => return Ok(None),
        Some(raw) => raw,
    };
    let invalid = || SongCatalogError::InvalidDate {
        field,
        value: raw.to_string(),
    };

    if !has_date_shape(raw) {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map(Some)
        .map_err(|_| invalid())
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
