//! [`RecordStore`]: a single text record persisted at a file path.

use std::fs::File;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use common::{SealError, StoredForm};

use super::{open_record, seal_record, Sealing};

/// One record on disk, sealed when a [`Sealing`] is configured.
///
/// On load the document decides its own form: a `{"v","n","d"}` wrapper is
/// opened, other JSON is returned as plaintext. This lets a store switch from
/// plaintext to sealed without a migration step. With sealing configured, a
/// document that is not JSON at all is rejected rather than passed through.
///
/// Saves replace the file atomically, so a failed save leaves the previous
/// record intact.
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
    sealing: Option<Sealing>,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>, sealing: Option<Sealing>) -> Self {
        Self {
            path: path.into(),
            sealing,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_sealing(&self) -> bool {
        self.sealing.is_some()
    }

    /// Write `text`, sealing it first when sealing is configured.
    ///
    /// # Errors
    ///
    /// [`SealError::Io`] if the file cannot be written. The previous record,
    /// if any, is left untouched.
    pub fn save(&self, text: &str) -> Result<(), SealError> {
        let document = match &self.sealing {
            Some(sealing) => {
                let blob = seal_record(text, sealing.secret(), sealing.version());
                blob.to_json_pretty()
                    .map_err(|e| SealError::Format(format!("failed to render record: {e}")))?
            }
            None => text.to_owned(),
        };
        replace_file(&self.path, |file| file.write_all(document.as_bytes()))?;
        info!(
            path = %self.path.display(),
            sealed = self.is_sealing(),
            "record saved"
        );
        Ok(())
    }

    /// Read the record back as plaintext.
    ///
    /// Returns `Ok(None)` when the file is missing or blank.
    ///
    /// # Errors
    ///
    /// - [`SealError::Io`] if the file exists but cannot be read.
    /// - [`SealError::Config`] if the record is sealed and no sealing is configured.
    /// - [`SealError::Format`] if sealing is configured and the document is not
    ///   JSON, which is what an interrupted write of a sealed record looks like.
    /// - [`SealError::Format`] / [`SealError::Auth`] if a sealed record cannot be opened.
    pub fn load(&self) -> Result<Option<String>, SealError> {
        let document = match std::fs::read_to_string(&self.path) {
            Ok(d) => d,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no record on disk");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        if document.trim().is_empty() {
            return Ok(None);
        }

        let blob = match StoredForm::classify(&document) {
            StoredForm::Sealed(blob) => blob,
            StoredForm::NotJson if self.is_sealing() => {
                return Err(SealError::Format(
                    "record is neither a sealed wrapper nor valid JSON".into(),
                ));
            }
            StoredForm::PlainJson | StoredForm::NotJson => {
                debug!(path = %self.path.display(), "record is plaintext");
                return Ok(Some(document));
            }
        };

        let sealing = self.sealing.as_ref().ok_or_else(|| {
            SealError::Config("record is sealed but no encryption secret is configured".into())
        })?;
        open_record(&blob, sealing.secret()).map(Some)
    }

    /// [`load`](Self::load), with every failure logged and treated as "no record".
    ///
    /// Callers start from empty state instead of refusing to run when the
    /// record is corrupt, tampered with, or sealed under another secret.
    pub fn load_or_empty(&self) -> Option<String> {
        match self.load() {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    unreadable = e.is_unreadable_record(),
                    "failed to load record; starting empty"
                );
                None
            }
        }
    }
}

/// Write `path` through a temporary file in the same directory, synced and then
/// renamed over the target. On any error the temporary file is removed and
/// `path` keeps its previous contents.
fn replace_file<F>(path: &Path, fill: F) -> Result<(), SealError>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    fill(tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| SealError::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Secret;
    use common::CiphertextBlob;

    fn sealing() -> Sealing {
        Sealing::new(Secret::new("0123456789abcdef"), 3).unwrap()
    }

    fn store_in(dir: &tempfile::TempDir, sealing: Option<Sealing>) -> RecordStore {
        RecordStore::new(dir.path().join("data.json"), sealing)
    }

    #[test]
    fn sealed_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir, Some(sealing()));
        store.save("{\"ok\":true}").unwrap();

        let on_disk = std::fs::read_to_string(store.path()).unwrap();
        assert!(!on_disk.contains("{\"ok\""));
        let blob = CiphertextBlob::detect(&on_disk).expect("written record is sealed");
        assert_eq!(blob.version, 3);
        assert!(on_disk.contains("\n\t\""));

        assert_eq!(store.load().unwrap().as_deref(), Some("{\"ok\":true}"));
    }

    #[test]
    fn plaintext_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir, None);
        store.save("{\"ok\":true}").unwrap();
        assert_eq!(
            std::fs::read_to_string(store.path()).unwrap(),
            "{\"ok\":true}"
        );
        assert_eq!(store.load().unwrap().as_deref(), Some("{\"ok\":true}"));
    }

    #[test]
    fn sealed_store_reads_existing_plaintext() {
        let dir = tempfile::tempdir().unwrap();
        store_in(&dir, None).save("{\"legacy\":1}").unwrap();
        let store = store_in(&dir, Some(sealing()));
        assert_eq!(store.load().unwrap().as_deref(), Some("{\"legacy\":1}"));
    }

    #[test]
    fn missing_and_blank_files_load_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir, Some(sealing()));
        assert_eq!(store.load().unwrap(), None);

        std::fs::write(store.path(), "  \n").unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn sealed_record_without_secret_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        store_in(&dir, Some(sealing())).save("x").unwrap();
        let err = store_in(&dir, None).load().unwrap_err();
        assert!(matches!(err, SealError::Config(_)));
    }

    #[test]
    fn wrong_secret_fails_then_falls_back_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        store_in(&dir, Some(sealing())).save("x").unwrap();

        let other = Sealing::new(Secret::new("fedcba9876543210"), 3).unwrap();
        let store = store_in(&dir, Some(other));
        assert!(matches!(store.load(), Err(SealError::Auth)));
        assert_eq!(store.load_or_empty(), None);
    }

    #[test]
    fn corrupt_payload_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir, Some(sealing()));
        std::fs::write(store.path(), r#"{"v":3,"n":"abc","d":"AAAA"}"#).unwrap();
        assert!(matches!(store.load(), Err(SealError::Format(_))));
        assert_eq!(store.load_or_empty(), None);
    }

    #[test]
    fn failed_write_keeps_previous_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir, Some(sealing()));
        store.save("{\"ok\":true}").unwrap();
        let before = std::fs::read_to_string(store.path()).unwrap();

        let err = replace_file(store.path(), |file| {
            file.write_all(&before.as_bytes()[..before.len() / 2])?;
            Err(io::Error::new(ErrorKind::Other, "file too large"))
        })
        .unwrap_err();
        assert!(matches!(err, SealError::Io(_)));

        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), before);
        assert_eq!(store.load().unwrap().as_deref(), Some("{\"ok\":true}"));

        let leftovers: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1, "temporary file was not cleaned up");
    }

    #[test]
    fn save_into_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("absent").join("data.json"), None);
        assert!(matches!(store.save("x"), Err(SealError::Io(_))));
        assert!(!store.path().exists());
    }

    #[test]
    fn torn_sealed_record_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir, Some(sealing()));
        store.save("{\"ok\":true}").unwrap();
        let full = std::fs::read_to_string(store.path()).unwrap();
        std::fs::write(store.path(), &full[..full.len() / 2]).unwrap();

        assert!(matches!(store.load(), Err(SealError::Format(_))));
        assert_eq!(store.load_or_empty(), None);
    }

    #[test]
    fn plaintext_store_passes_non_json_text_through() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir, None);
        store.save("just some notes").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("just some notes"));
    }
}
