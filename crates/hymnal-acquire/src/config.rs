use crate::error::{AcquireError, Result};
use std::path::PathBuf;
use url::Url;

/// Books downloaded when none are named on the command line.
pub const DEFAULT_BOOKS: [&str; 3] = ["hymns-for-home-and-church", "hymns", "childrens-songbook"];

pub const DEFAULT_COLLECTION_ROOT: &str = "collection";

/// Remote endpoints and the fixed parameters of the catalog query.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Base of the filtered-list API; query parameters are appended.
    pub catalog_api_url: String,
    pub lang: String,
    /// Maximum entries requested in the single catalog batch.
    pub page_size: u32,
    /// Detail page URL whose last path segment is the `{slug}` placeholder.
    pub detail_url_template: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            catalog_api_url: "https://www.churchofjesuschrist.org/media/music/api".to_string(),
            lang: "eng".to_string(),
            page_size: 500,
            detail_url_template: "https://www.churchofjesuschrist.org/media/music/songs/{slug}?lang=en"
                .to_string(),
        }
    }
}

/// The `{slug}` placeholder as it reads once the template is parsed.
const SLUG_SEGMENT: &str = "%7Bslug%7D";

impl SourceConfig {
    /// Detail page URL for one song, with the slug percent-encoded as a
    /// single path segment.
    pub fn detail_url(&self, slug: &str) -> Result<String> {
        let template = &self.detail_url_template;
        let mut url = Url::parse(template).map_err(|e| AcquireError::InvalidUrl {
            url: template.clone(),
            source: e,
        })?;
        let invalid = || AcquireError::InvalidTemplate {
            template: template.clone(),
        };

        let ends_with_slug = url
            .path_segments()
            .and_then(|segments| segments.last())
            .is_some_and(|last| last == SLUG_SEGMENT);
        if !ends_with_slug {
            return Err(invalid());
        }
        url.path_segments_mut()
            .map_err(|()| invalid())?
            .pop()
            .push(slug);

        Ok(url.into())
    }
}

/// Everything the pipeline needs, passed in explicitly at construction.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub collection_root: PathBuf,
    pub books: Vec<String>,
    pub source: SourceConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            collection_root: PathBuf::from(DEFAULT_COLLECTION_ROOT),
            books: DEFAULT_BOOKS.iter().map(|b| b.to_string()).collect(),
            source: SourceConfig::default(),
        }
    }
}

/// Split a comma-delimited book list, dropping blank items.
pub fn parse_book_list(books: &str) -> Vec<String> {
    books
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
