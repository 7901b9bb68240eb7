use crate::catalog;
use crate::config::PipelineConfig;
use crate::detail;
use crate::normalize;
use crate::output::{check_names, SongStore};
use crate::transport::Transport;
use anyhow::{Context, Result};
use hymnal_model::CatalogEntry;

/// Counts gathered over one [`Pipeline::run`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub books: usize,
    /// Songs fetched and stored in this run.
    pub downloaded: usize,
    /// Songs whose canonical file was already present; no request was made.
    pub skipped: usize,
    /// Songs whose detail fetch failed.
    pub failed: usize,
    /// Songs fetched but not stored because of a filesystem error.
    pub persist_errors: usize,
}

/// Drives catalog → detail → normalize → store for each configured book,
/// one request at a time.
pub struct Pipeline<T> {
    transport: T,
    config: PipelineConfig,
    store: SongStore,
}

impl<T: Transport> Pipeline<T> {
    pub fn new(transport: T, config: PipelineConfig) -> Self {
        let store = SongStore::new(&config.collection_root);
        Self {
            transport,
            config,
            store,
        }
    }

    pub fn store(&self) -> &SongStore {
        &self.store
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Download every configured book in order.
    ///
    /// A catalog failure aborts the whole run. A failure on one song is
    /// logged and the run moves on to the next.
    pub async fn run(&self) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        for book in &self.config.books {
            let entries = catalog::fetch_catalog(&self.transport, &self.config.source, book)
                .await
                .with_context(|| format!("failed to fetch hymns from {book}"))?;
            summary.books += 1;

            for entry in &entries {
                self.process_entry(book, entry, &mut summary).await;
            }
        }

        tracing::info!(
            books = summary.books,
            downloaded = summary.downloaded,
            skipped = summary.skipped,
            failed = summary.failed,
            persist_errors = summary.persist_errors,
            "Run complete"
        );
        Ok(summary)
    }

    async fn process_entry(&self, book: &str, entry: &CatalogEntry, summary: &mut RunSummary) {
        let book_slug = if entry.book_slug.is_empty() {
            book
        } else {
            entry.book_slug.as_str()
        };
        let number = entry.song_number.as_str();
        let slug = entry.slug.as_str();

        if let Err(e) = check_names(book_slug, number, slug) {
            tracing::warn!(book = %book, error = %e, "Skipping catalog entry");
            summary.failed += 1;
            return;
        }

        match self.store.song_exists(book_slug, number, slug) {
            Ok(true) => {
                tracing::debug!(book = %book, number = %number, slug = %slug, "Already downloaded");
                if let Err(e) = self
                    .store
                    .link_section(number, book_slug, &entry.section_title, slug)
                {
                    tracing::warn!(book = %book, slug = %slug, error = %e, "Failed to link song into section");
                    summary.persist_errors += 1;
                }
                summary.skipped += 1;
                return;
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(book = %book, slug = %slug, error = %e, "Cannot check for existing song");
                summary.persist_errors += 1;
                return;
            }
        }

        tracing::info!("Downloading {book}/{number}-{slug}");
        let record = match detail::fetch_detail(&self.transport, &self.config.source, slug).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(book = %book, slug = %slug, error = %e, "Failed to fetch song; skipping");
                summary.failed += 1;
                return;
            }
        };

        match self
            .store
            .persist(number, book_slug, &entry.section_title, slug, &record)
        {
            Ok(_) => summary.downloaded += 1,
            Err(e) => {
                tracing::warn!(book = %book, slug = %slug, error = %e, "Failed to save song");
                summary.persist_errors += 1;
            }
        }
    }

    /// Fetch one song and render it with its title, without storing it.
    pub async fn show_song(&self, slug: &str) -> Result<String> {
        let record = detail::fetch_detail(&self.transport, &self.config.source, slug)
            .await
            .with_context(|| format!("failed to fetch song {slug}"))?;
        Ok(normalize::display_text(&record))
    }
}
