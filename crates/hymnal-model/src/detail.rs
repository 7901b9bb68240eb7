use serde::{Deserialize, Serialize};

/// Structured lyrics extracted from a song's detail page.
///
/// Related to a [`crate::CatalogEntry`] only through the slug used to fetch
/// the page. The default value is what a page without embedded song data
/// produces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailRecord {
    /// Slug reported by the page itself (`data.slugName`).
    pub slug: String,
    /// Display title, taken from the first media asset's description.
    pub title: String,
    pub verses: Vec<VerseRecord>,
}

/// A single block of the lyric listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerseRecord {
    /// HTML fragment, typically a run of `<p>` elements.
    pub body: String,
    /// Position of the verse. Zero marks a non-lyric block (title, refrain
    /// marker) that is never rendered.
    pub verse_number: i64,
    pub url: String,
}

impl VerseRecord {
    pub fn is_lyric(&self) -> bool {
        self.verse_number != 0
    }
}

impl DetailRecord {
    /// Verses that belong in rendered lyrics, in page order.
    pub fn lyric_verses(&self) -> impl Iterator<Item = &VerseRecord> {
        self.verses.iter().filter(|v| v.is_lyric())
    }

    pub fn is_empty(&self) -> bool {
        self.verses.is_empty() && self.title.is_empty()
    }
}
