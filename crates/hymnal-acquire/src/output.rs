use crate::error::{AcquireError, Result};
use crate::normalize;
use hymnal_model::{song_file_name, DetailRecord};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Directory under each book holding the canonical lyric files.
pub const SONGS_DIR: &str = "songs";

/// What [`SongStore::persist`] actually did. Both fields are false when the
/// song was already fully stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistOutcome {
    pub song_written: bool,
    pub link_created: bool,
}

/// The on-disk collection:
///
/// - `<root>/<book>/songs/<number>-<slug>.txt`: canonical lyric file
/// - `<root>/<book>/<section>/<number>-<slug>.txt`: symlink to
///   `../songs/<number>-<slug>.txt`
///
/// Files are only ever created, never rewritten or removed. The canonical
/// file's presence is what marks a song as done.
#[derive(Debug, Clone)]
pub struct SongStore {
    root: PathBuf,
}

impl SongStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn song_path(&self, book: &str, number: &str, slug: &str) -> PathBuf {
        self.root
            .join(book)
            .join(SONGS_DIR)
            .join(song_file_name(number, slug))
    }

    /// Path of the section link, or `None` when the section title gives no
    /// usable directory name.
    pub fn section_link_path(
        &self,
        book: &str,
        section: &str,
        number: &str,
        slug: &str,
    ) -> Option<PathBuf> {
        let dir = section_dir_name(section)?;
        Some(
            self.root
                .join(book)
                .join(dir)
                .join(song_file_name(number, slug)),
        )
    }

    /// Whether the canonical lyric file for this song is already stored.
    pub fn song_exists(&self, book: &str, number: &str, slug: &str) -> Result<bool> {
        check_names(book, number, slug)?;
        path_exists(&self.song_path(book, number, slug))
    }

    /// Store a song: write the canonical file if it is missing, then create
    /// the section link if it is missing. The two steps are independent, so
    /// a missing link is repaired even when the song file already exists.
    pub fn persist(
        &self,
        number: &str,
        book: &str,
        section: &str,
        slug: &str,
        record: &DetailRecord,
    ) -> Result<PersistOutcome> {
        check_names(book, number, slug)?;
        let mut outcome = PersistOutcome::default();

        let song_path = self.song_path(book, number, slug);
        create_parent_dir(&song_path)?;
        if !path_exists(&song_path)? {
            let text = normalize::verses_as_text(record);
            outcome.song_written = write_new_file(&song_path, &text)?;
            if outcome.song_written {
                tracing::info!(path = %song_path.display(), lines = text.lines().count(), "Wrote song");
            }
        }

        outcome.link_created = self.link_section(number, book, section, slug)?;

        Ok(outcome)
    }

    /// Create the section link for a song if it is missing, whether or not
    /// the canonical file exists yet. Returns whether a link was created.
    pub fn link_section(&self, number: &str, book: &str, section: &str, slug: &str) -> Result<bool> {
        check_names(book, number, slug)?;
        let Some(link_path) = self.section_link_path(book, section, number, slug) else {
            tracing::debug!(book = %book, slug = %slug, "No section title; skipping section link");
            return Ok(false);
        };
        create_parent_dir(&link_path)?;
        if path_exists(&link_path)? {
            return Ok(false);
        }

        let target = Path::new("..")
            .join(SONGS_DIR)
            .join(song_file_name(number, slug));
        let created = create_new_symlink(&target, &link_path)?;
        if created {
            tracing::debug!(path = %link_path.display(), target = %target.display(), "Linked song into section");
        }
        Ok(created)
    }
}

/// Book slugs, song numbers and song slugs come from the remote catalog and
/// are used as single path components: they must be non-empty, must not be
/// `.`/`..` and must not contain a path separator.
pub fn is_safe_name(name: &str) -> bool {
    !matches!(name, "" | "." | "..") && !name.contains(['/', '\\'])
}

/// Reject catalog values that would not stay inside the book's directory.
pub fn check_names(book: &str, number: &str, slug: &str) -> Result<()> {
    for (field, value) in [("book", book), ("number", number), ("slug", slug)] {
        if !is_safe_name(value) {
            return Err(AcquireError::UnsafeName {
                field,
                value: value.to_string(),
            });
        }
    }
    Ok(())
}

/// Directory name for a section title. Path separators become `-`; titles
/// that are empty or name `.`/`..` have no directory.
fn section_dir_name(section: &str) -> Option<String> {
    let name = section.trim().replace(['/', '\\'], "-");
    match name.as_str() {
        "" | "." | ".." => None,
        _ => Some(name),
    }
}

/// Existence check on the path itself (links are not followed). Only
/// `NotFound` counts as absent; other stat failures are errors.
fn path_exists(path: &Path) -> Result<bool> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(AcquireError::filesystem(path, e)),
    }
}

fn create_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| AcquireError::filesystem(dir, e))?;
    }
    Ok(())
}

/// Create `path` with `contents` unless something already exists there.
/// Returns whether the file was written.
fn write_new_file(path: &Path, contents: &str) -> Result<bool> {
    let file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(AcquireError::filesystem(path, e)),
    };
    fill_or_remove(path, file, contents)?;
    Ok(true)
}

/// Write `contents` into the freshly created `path`, removing it again if
/// the write fails. A partial file would mark the song as done on every
/// later run.
fn fill_or_remove(path: &Path, mut file: impl Write, contents: &str) -> Result<()> {
    if let Err(e) = file.write_all(contents.as_bytes()) {
        drop(file);
        if let Err(remove_err) = fs::remove_file(path) {
            tracing::warn!(path = %path.display(), error = %remove_err, "Failed to remove partial song file");
        }
        return Err(AcquireError::filesystem(path, e));
    }
    Ok(())
}

/// Create a symlink at `link` pointing to `target` unless something already
/// exists there. Returns whether the link was created.
fn create_new_symlink(target: &Path, link: &Path) -> Result<bool> {
    match symlink(target, link) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(AcquireError::filesystem(link, e)),
    }
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hymnal_model::VerseRecord;
    use tempfile::TempDir;

    fn record() -> DetailRecord {
        DetailRecord {
            slug: "the-morning-breaks".into(),
            title: "The Morning Breaks".into(),
            verses: vec![
                VerseRecord {
                    body: "<p>The Morning Breaks</p>".into(),
                    verse_number: 0,
                    url: String::new(),
                },
                VerseRecord {
                    body: "<p>The morning breaks,</p><p>the shadows flee;</p>".into(),
                    verse_number: 1,
                    url: String::new(),
                },
            ],
        }
    }

    #[test]
    fn test_persist_writes_song_and_link() {
        let tmp = TempDir::new().unwrap();
        let store = SongStore::new(tmp.path());

        let outcome = store
            .persist("1", "hymns", "Restoration", "the-morning-breaks", &record())
            .unwrap();
        assert_eq!(outcome, PersistOutcome { song_written: true, link_created: true });

        let song = tmp.path().join("hymns/songs/1-the-morning-breaks.txt");
        assert_eq!(
            fs::read_to_string(&song).unwrap(),
            "The morning breaks,\nthe shadows flee;\n\n"
        );

        let link = tmp.path().join("hymns/Restoration/1-the-morning-breaks.txt");
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(
            fs::read_link(&link).unwrap(),
            Path::new("../songs/1-the-morning-breaks.txt")
        );
        // Resolved relative to its own directory, the link lands on the song.
        let resolved = link.parent().unwrap().join(fs::read_link(&link).unwrap());
        assert_eq!(fs::canonicalize(resolved).unwrap(), fs::canonicalize(&song).unwrap());
        assert_eq!(fs::read_to_string(&link).unwrap(), fs::read_to_string(&song).unwrap());
    }

    #[test]
    fn test_persist_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let store = SongStore::new(tmp.path());

        store.persist("1", "hymns", "Restoration", "the-morning-breaks", &record()).unwrap();
        let again = store
            .persist("1", "hymns", "Restoration", "the-morning-breaks", &DetailRecord::default())
            .unwrap();
        assert_eq!(again, PersistOutcome::default());

        // Existing content is never re-rendered.
        let song = tmp.path().join("hymns/songs/1-the-morning-breaks.txt");
        assert!(fs::read_to_string(song).unwrap().starts_with("The morning breaks,"));
    }

    #[test]
    fn test_persist_repairs_missing_link() {
        let tmp = TempDir::new().unwrap();
        let store = SongStore::new(tmp.path());
        let song = store.song_path("hymns", "1", "the-morning-breaks");
        fs::create_dir_all(song.parent().unwrap()).unwrap();
        fs::write(&song, "already here\n").unwrap();

        let outcome = store
            .persist("1", "hymns", "Restoration", "the-morning-breaks", &record())
            .unwrap();
        assert_eq!(outcome, PersistOutcome { song_written: false, link_created: true });
        assert_eq!(fs::read_to_string(&song).unwrap(), "already here\n");
    }

    #[test]
    fn test_persist_empty_record_writes_empty_file() {
        let tmp = TempDir::new().unwrap();
        let store = SongStore::new(tmp.path());

        store.persist("7", "hymns", "Praise", "empty", &DetailRecord::default()).unwrap();
        let song = tmp.path().join("hymns/songs/7-empty.txt");
        assert_eq!(fs::read_to_string(song).unwrap(), "");
    }

    #[test]
    fn test_song_exists() {
        let tmp = TempDir::new().unwrap();
        let store = SongStore::new(tmp.path());
        assert!(!store.song_exists("hymns", "1", "the-morning-breaks").unwrap());

        store.persist("1", "hymns", "Restoration", "the-morning-breaks", &record()).unwrap();
        assert!(store.song_exists("hymns", "1", "the-morning-breaks").unwrap());
        assert!(!store.song_exists("hymns", "2", "the-morning-breaks").unwrap());
    }

    #[test]
    fn test_section_with_separator() {
        let tmp = TempDir::new().unwrap();
        let store = SongStore::new(tmp.path());

        store.persist("3", "hymns", "Easter/Resurrection", "he-is-risen", &record()).unwrap();
        let link = tmp.path().join("hymns/Easter-Resurrection/3-he-is-risen.txt");
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert!(fs::read_to_string(&link).is_ok());
    }

    #[test]
    fn test_empty_section_skips_link() {
        let tmp = TempDir::new().unwrap();
        let store = SongStore::new(tmp.path());

        let outcome = store.persist("4", "hymns", "  ", "no-section", &record()).unwrap();
        assert_eq!(outcome, PersistOutcome { song_written: true, link_created: false });
        assert!(store.section_link_path("hymns", "", "4", "no-section").is_none());
        assert!(store.section_link_path("hymns", "..", "4", "no-section").is_none());
    }

    #[test]
    fn test_link_section_without_song_write() {
        let tmp = TempDir::new().unwrap();
        let store = SongStore::new(tmp.path());

        assert!(store.link_section("1", "hymns", "Restoration", "the-morning-breaks").unwrap());
        assert!(!store.link_section("1", "hymns", "Restoration", "the-morning-breaks").unwrap());
        let link = tmp.path().join("hymns/Restoration/1-the-morning-breaks.txt");
        assert_eq!(
            fs::read_link(link).unwrap(),
            Path::new("../songs/1-the-morning-breaks.txt")
        );
    }

    #[test]
    fn test_unsafe_names_rejected() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("collection");
        let store = SongStore::new(&root);

        for (book, number, slug) in [
            ("hymns", "1", "../../../../../escaped"),
            ("hymns", "1", ".."),
            ("../outside", "1", "song"),
            ("hymns", "1/2", "song"),
            ("hymns", "1", "back\\slash"),
            ("hymns", "", "song"),
            ("", "1", "song"),
        ] {
            let err = store.persist(number, book, "Restoration", slug, &record()).unwrap_err();
            assert!(matches!(err, AcquireError::UnsafeName { .. }), "{book}/{number}/{slug}");
            assert!(matches!(
                store.song_exists(book, number, slug),
                Err(AcquireError::UnsafeName { .. })
            ));
        }
        assert!(fs::read_dir(tmp.path()).unwrap().next().is_none());
    }

    #[test]
    fn test_is_safe_name() {
        assert!(is_safe_name("the-morning-breaks"));
        assert!(is_safe_name("1a"));
        assert!(is_safe_name("..."));
        assert!(!is_safe_name(""));
        assert!(!is_safe_name("."));
        assert!(!is_safe_name("a/b"));
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_write_leaves_no_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("1-partial.txt");
        fs::write(&path, "").unwrap();

        let err = fill_or_remove(&path, FailingWriter, "The morning breaks,\n").unwrap_err();
        assert!(matches!(err, AcquireError::Filesystem { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_directory_creation_failure() {
        let tmp = TempDir::new().unwrap();
        // A file where the book directory should be.
        fs::write(tmp.path().join("hymns"), "not a dir").unwrap();
        let store = SongStore::new(tmp.path());

        let err = store
            .persist("1", "hymns", "Restoration", "the-morning-breaks", &record())
            .unwrap_err();
        assert!(matches!(err, AcquireError::Filesystem { .. }));
    }
}
