//! Reading and writing the configuration document.
//!
//! The file is written atomically: first to a `.tmp` sibling, then renamed
//! over the final path, so an interrupted export never leaves a truncated
//! document behind.

use gongfig_core::{ConfigDocument, DocumentFormat, SyncError};
use std::path::Path;

/// Load a document. A missing or malformed file is an error; nothing is
/// sent to the gateway before this succeeds.
pub fn read_document(path: &Path) -> Result<ConfigDocument, SyncError> {
    let bytes = std::fs::read(path).map_err(|e| SyncError::Document {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    DocumentFormat::from_path(path)
        .decode(&bytes)
        .map_err(|e| SyncError::Document {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
}

pub fn write_document(path: &Path, doc: &ConfigDocument) -> Result<(), SyncError> {
    let bytes = DocumentFormat::from_path(path).encode(doc)?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = Path::new(&tmp);

    std::fs::write(tmp, &bytes)?;
    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(e.into());
    }

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "document written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gongfig_core::service::Service;
    use tempfile::tempdir;

    #[test]
    fn written_document_reads_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kong.json");
        let doc = ConfigDocument {
            services: vec![Service {
                name: Some("mail".into()),
                host: "mail.internal".into(),
                ..Default::default()
            }],
            ..Default::default()
        };

        write_document(&path, &doc).unwrap();
        assert_eq!(read_document(&path).unwrap(), doc);
        assert!(!dir.path().join("kong.json.tmp").exists(), "tmp file should be renamed away");
    }

    #[test]
    fn write_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("kong.yaml");
        write_document(&path, &ConfigDocument::default()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn failed_rename_leaves_no_tmp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kong.json");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("occupied"), "x").unwrap();

        let err = write_document(&path, &ConfigDocument::default()).unwrap_err();
        assert!(matches!(err, SyncError::Io(_)), "got {err:?}");
        assert!(!dir.path().join("kong.json.tmp").exists());
    }

    #[test]
    fn missing_file_is_a_document_error() {
        let err = read_document(Path::new("/nonexistent/kong.json")).unwrap_err();
        assert!(matches!(err, SyncError::Document { .. }));
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn malformed_file_is_a_document_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kong.json");
        std::fs::write(&path, "{\"services\": [").unwrap();
        assert!(matches!(read_document(&path), Err(SyncError::Document { .. })));
    }
}
