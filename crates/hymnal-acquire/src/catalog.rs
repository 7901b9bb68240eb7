use crate::config::SourceConfig;
use crate::error::{AcquireError, Result};
use crate::transport::Transport;
use hymnal_model::{Catalog, CatalogEntry};
use serde::Serialize;
use url::Url;

/// Filter object the list API expects, JSON-encoded into the `identifier`
/// query parameter.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CatalogQuery<'a> {
    lang: &'a str,
    limit: u32,
    offset: u32,
    order_by_key: [&'a str; 1],
    book_query_list: [&'a str; 1],
}

/// Build the filtered-list request URL for one book.
pub fn catalog_url(source: &SourceConfig, book: &str) -> Result<String> {
    let query = CatalogQuery {
        lang: &source.lang,
        limit: source.page_size,
        offset: 0,
        order_by_key: ["bookSongPosition"],
        book_query_list: [book],
    };
    let identifier = serde_json::to_string(&query).map_err(|e| AcquireError::Decode {
        context: "catalog query".to_string(),
        source: e,
    })?;

    let mut url = Url::parse(&source.catalog_api_url).map_err(|e| AcquireError::InvalidUrl {
        url: source.catalog_api_url.clone(),
        source: e,
    })?;
    url.query_pairs_mut()
        .append_pair("type", "songsFilteredList")
        .append_pair("lang", &source.lang)
        .append_pair("batchSize", &source.page_size.to_string())
        .append_pair("identifier", &identifier);

    Ok(url.into())
}

/// Fetch the catalog of one book in a single batch.
///
/// Only the first `page_size` entries are requested; anything beyond that is
/// not fetched.
pub async fn fetch_catalog<T: Transport>(
    transport: &T,
    source: &SourceConfig,
    book: &str,
) -> Result<Vec<CatalogEntry>> {
    let url = catalog_url(source, book)?;
    tracing::debug!(book = %book, url = %url, "Fetching catalog");

    let response = transport.get(&url).await?.error_for_status(&url)?;

    let catalog = Catalog::from_json(&response.body).map_err(|e| AcquireError::Decode {
        context: format!("catalog for {book}"),
        source: e,
    })?;

    if catalog.len() as u64 >= u64::from(source.page_size) {
        tracing::warn!(book = %book, limit = source.page_size, "Catalog filled the whole batch; later entries may be missing");
    }
    tracing::info!(book = %book, entries = catalog.len(), "Fetched catalog");

    Ok(catalog.data)
}
