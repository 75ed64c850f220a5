//! Integrity manifest for artifact directories.
//!
//! `manifest.json` maps artifact file names (relative to the model
//! directory) to their SHA-256 digests:
//!
//! ```json
//! { "version": 1, "files": { "diabetes_model.json": "9f86d0..." } }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::ports::ModelError;

/// File name of the manifest inside a model directory.
pub const MANIFEST_FILE: &str = "manifest.json";

const MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: u32,
    pub files: BTreeMap<String, String>,
}

impl Manifest {
    /// Read and validate a manifest file.
    ///
    /// # Errors
    /// Returns `ModelError::Integrity` if the manifest is unreadable,
    /// malformed, of an unsupported version or empty.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let integrity = |reason: String| ModelError::Integrity {
            path: path.to_path_buf(),
            reason,
        };

        let content =
            fs::read(path).map_err(|e| integrity(format!("Failed to read manifest: {e}")))?;
        let manifest: Manifest = serde_json::from_slice(&content)
            .map_err(|e| integrity(format!("Invalid manifest format: {e}")))?;

        if manifest.version != MANIFEST_VERSION {
            return Err(integrity(format!(
                "Unsupported manifest version: {}",
                manifest.version
            )));
        }
        if manifest.files.is_empty() {
            return Err(integrity("Manifest lists no files".into()));
        }

        Ok(manifest)
    }

    /// Build a manifest over every `*.json` artifact in `dir` (except the
    /// manifest itself).
    ///
    /// # Errors
    /// Returns `ModelError::Unreadable` if the directory or a file cannot be read.
    pub fn generate(dir: &Path) -> Result<Self, ModelError> {
        let unreadable = |path: &Path, source: std::io::Error| ModelError::Unreadable {
            path: path.to_path_buf(),
            source,
        };

        let mut files = BTreeMap::new();
        for entry in fs::read_dir(dir).map_err(|e| unreadable(dir, e))? {
            let entry = entry.map_err(|e| unreadable(dir, e))?;
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name == MANIFEST_FILE || path.extension().and_then(|e| e.to_str()) != Some("json")
            {
                continue;
            }
            let bytes = fs::read(&path).map_err(|e| unreadable(&path, e))?;
            files.insert(name.to_string(), sha256_hex(&bytes));
        }

        Ok(Self {
            version: MANIFEST_VERSION,
            files,
        })
    }

    /// Whether `name` is bound by this manifest.
    #[must_use]
    pub fn binds(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    /// Check `bytes` against the digest recorded for `name`.
    ///
    /// # Errors
    /// Returns `ModelError::Integrity` if `name` is not listed or its digest
    /// does not match.
    pub fn verify(&self, name: &str, path: &Path, bytes: &[u8]) -> Result<(), ModelError> {
        let integrity = |reason: String| ModelError::Integrity {
            path: path.to_path_buf(),
            reason,
        };

        let expected = self
            .files
            .get(name)
            .ok_or_else(|| integrity(format!("{name} is not listed in the manifest")))?;

        if !constant_time_eq_str(&sha256_hex(bytes), expected) {
            return Err(integrity(format!("SHA-256 mismatch for {name}")));
        }

        Ok(())
    }
}

/// Lowercase hex SHA-256 digest.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

fn constant_time_eq_str(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
