//! Plain-text rendering of verse bodies.
//!
//! This is a narrow filter for the simple paragraph markup the lyric pages
//! use, not an HTML parser: entities are left as-is and `<br>` is dropped
//! without a line break.

use hymnal_model::DetailRecord;
use regex::Regex;
use std::sync::LazyLock;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Render every lyric verse of `record` as plain text, each followed by a
/// newline. Verses numbered 0 are left out.
pub fn verses_as_text(record: &DetailRecord) -> String {
    record
        .lyric_verses()
        .map(|verse| format!("{}\n", html_to_text(&verse.body)))
        .collect()
}

/// Turn paragraph ends into newlines, then drop every remaining tag.
pub fn html_to_text(fragment: &str) -> String {
    let with_breaks = fragment.replace("</p>", "\n");
    TAG.replace_all(&with_breaks, "").into_owned()
}

/// Title header followed by the rendered verses, for printing a song to a
/// terminal.
pub fn display_text(record: &DetailRecord) -> String {
    format!("Title: {}\n\n{}", record.title, verses_as_text(record))
}
