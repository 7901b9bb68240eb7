use crate::config::SourceConfig;
use crate::error::Result;
use crate::extract;
use crate::transport::Transport;
use hymnal_model::DetailRecord;

/// Fetch a song's detail page and extract its lyric data.
///
/// A page without embedded song data comes back as an empty record.
pub async fn fetch_detail<T: Transport>(
    transport: &T,
    source: &SourceConfig,
    slug: &str,
) -> Result<DetailRecord> {
    let url = source.detail_url(slug)?;
    tracing::debug!(slug = %slug, url = %url, "Fetching detail page");

    let response = transport.get(&url).await?.error_for_status(&url)?;
    tracing::debug!(slug = %slug, bytes = response.body.len(), "Received HTML");

    let record = extract::extract_detail(&response.body)?;
    if record.verses.is_empty() {
        tracing::warn!(slug = %slug, "Detail page has no lyric data");
    }

    Ok(record)
}
