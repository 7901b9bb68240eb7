use serde::{Deserialize, Serialize};

/// The ordered list of songs belonging to one hymn book, as returned by the
/// filtered-list API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(rename = "Data", default)]
    pub data: Vec<CatalogEntry>,
}

/// One song's identifying metadata within a catalog.
///
/// The slug is unique within a book and is what the detail page is keyed on.
/// The section title is a grouping label only and is shared by many entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CatalogEntry {
    pub title: String,
    pub slug: String,
    pub book_slug: String,
    #[serde(rename = "BookSectionTitle")]
    pub section_title: String,
    pub song_number: String,
    pub sheet_music_available: bool,
}

impl Catalog {
    /// Decode a list response body.
    pub fn from_json(body: &str) -> serde_json::Result<Self> {
        serde_json::from_str(body)
    }

    /// Entries in response order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl CatalogEntry {
    /// File name shared by the canonical lyric file and its section link,
    /// e.g. `1-the-morning-breaks.txt`.
    pub fn file_name(&self) -> String {
        song_file_name(&self.song_number, &self.slug)
    }
}

/// `<number>-<slug>.txt`
pub fn song_file_name(number: &str, slug: &str) -> String {
    format!("{number}-{slug}.txt")
}
