use crate::error::{AcquireError, Result};
use hymnal_model::{DetailRecord, VerseRecord};
use scraper::{Html, Selector};
use serde::Deserialize;

/// Text that only the script carrying the song data contains.
const DATA_MARKER: &str = "verseNumber";

/// Assignment the server-rendered data blob is wrapped in.
const RENDER_DATA_PREFIX: &str = "window.renderData=";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RenderData {
    data: RenderPayload,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RenderPayload {
    slug_name: String,
    song_data: SongData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SongData {
    assets: Vec<Asset>,
    lyrics: Lyrics,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Asset {
    media_object: MediaObject,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MediaObject {
    description: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Lyrics {
    verse_list: Vec<VerseItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct VerseItem {
    verse: Verse,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Verse {
    body: String,
    verse_number: i64,
    url: String,
}

impl From<RenderData> for DetailRecord {
    fn from(render: RenderData) -> Self {
        let payload = render.data;
        let title = payload
            .song_data
            .assets
            .into_iter()
            .next()
            .map(|a| a.media_object.description)
            .unwrap_or_default();
        let verses = payload
            .song_data
            .lyrics
            .verse_list
            .into_iter()
            .map(|item| VerseRecord {
                body: item.verse.body,
                verse_number: item.verse.verse_number,
                url: item.verse.url,
            })
            .collect();

        DetailRecord {
            slug: payload.slug_name,
            title,
            verses,
        }
    }
}

/// Locate the embedded song data in a detail page and decode it.
///
/// Scripts are scanned in document order and the first one mentioning
/// `verseNumber` wins. A page with no such script yields an empty record,
/// not an error. A matching script that fails to decode is an error.
pub fn extract_detail(html: &str) -> Result<DetailRecord> {
    let document = Html::parse_document(html);
    let script_sel = Selector::parse("script").expect("valid selector");

    let Some(text) = document
        .select(&script_sel)
        .map(|script| script.text().collect::<String>())
        .find(|text| text.contains(DATA_MARKER))
    else {
        tracing::debug!("No embedded song data found in page");
        return Ok(DetailRecord::default());
    };

    let json = strip_render_prefix(&text);
    let render: RenderData = serde_json::from_str(json).map_err(|e| AcquireError::Decode {
        context: "embedded song data".to_string(),
        source: e,
    })?;

    Ok(render.into())
}

/// Remove the `window.renderData=` assignment (and a trailing `;`) around
/// the JSON document. Text without the prefix is passed through trimmed.
fn strip_render_prefix(text: &str) -> &str {
    let text = text.trim();
    let text = text.strip_prefix(RENDER_DATA_PREFIX).unwrap_or(text);
    text.trim_end_matches(';').trim()
}
