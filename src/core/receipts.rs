//! Opaque storage for receipt images. The ledger only keeps the returned URL.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::utils::ensure_dir;
use crate::errors::{LedgerError, Result};

/// Where a stored receipt can be fetched and how to remove it again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptRef {
    pub url: String,
    pub public_id: String,
}

pub trait ReceiptStore: Send + Sync {
    fn store(&self, bytes: &[u8], extension: Option<&str>) -> Result<ReceiptRef>;
    fn delete(&self, public_id: &str) -> Result<()>;
}

/// Keeps receipts as files under a directory and hands out `file://` URLs.
#[derive(Debug, Clone)]
pub struct LocalReceiptStore {
    root: PathBuf,
}

impl LocalReceiptStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, public_id: &str) -> Result<PathBuf> {
        let valid = !public_id.is_empty()
            && public_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
            && !public_id.starts_with('.');
        if !valid {
            return Err(LedgerError::validation(
                "public_id",
                format!("`{public_id}` is not a receipt id"),
            ));
        }
        Ok(self.root.join(public_id))
    }
}

impl ReceiptStore for LocalReceiptStore {
    fn store(&self, bytes: &[u8], extension: Option<&str>) -> Result<ReceiptRef> {
        if bytes.is_empty() {
            return Err(LedgerError::validation("file", "no file uploaded"));
        }
        ensure_dir(&self.root)?;

        let extension = extension
            .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));
        let public_id = match extension {
            Some(ext) => format!("{}.{ext}", Uuid::new_v4()),
            None => Uuid::new_v4().to_string(),
        };
        let path = self.path_for(&public_id)?;
        fs::write(&path, bytes)?;

        let absolute = fs::canonicalize(&path)?;
        tracing::info!(%public_id, size = bytes.len(), "receipt stored");
        Ok(ReceiptRef {
            url: format!("file://{}", absolute.display()),
            public_id,
        })
    }

    fn delete(&self, public_id: &str) -> Result<()> {
        let path = self.path_for(public_id)?;
        if path.exists() {
            fs::remove_file(&path)?;
            tracing::info!(%public_id, "receipt removed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_and_removes_receipts() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalReceiptStore::new(dir.path().join("receipts"));
        let receipt = store.store(b"jpeg-bytes", Some(".JPG")).unwrap();

        assert!(receipt.public_id.ends_with(".jpg"));
        assert!(receipt.url.starts_with("file://"));
        let on_disk = store.root().join(&receipt.public_id);
        assert_eq!(fs::read(&on_disk).unwrap(), b"jpeg-bytes");

        store.delete(&receipt.public_id).unwrap();
        assert!(!on_disk.exists());
    }

    #[test]
    fn empty_upload_is_a_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalReceiptStore::new(dir.path());
        assert!(matches!(
            store.store(&[], None),
            Err(LedgerError::Validation { field: "file", .. })
        ));
    }

    #[test]
    fn path_traversal_ids_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalReceiptStore::new(dir.path());
        assert!(store.delete("../config.json").is_err());
    }
}
