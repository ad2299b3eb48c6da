//! Verse segmentation for song lyrics
//!
//! A verse is a block of lyrics separated from its neighbours by a blank line.
//! Verses are derived on every request and never stored.

use crate::core::pagination::Page;

pub const VERSE_SEPARATOR: &str = "\n\n";

/// Split lyrics into verses. Blocks are returned exactly as they appear
/// between separators; empty lyrics have no verses.
pub fn split_verses(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split(VERSE_SEPARATOR).collect()
}

/// The verses of `text` that fall inside `page`.
pub fn verse_window(text: Option<&str>, page: Page) -> Vec<String> {
    let verses = split_verses(text.unwrap_or_default());
    page.slice(&verses)
        .into_iter()
        .map(str::to_string)
        .collect()
}
