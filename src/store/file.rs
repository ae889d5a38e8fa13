//! File-backed store
//!
//! One framed file per key:
//!
//! ```text
//! {root}/
//!   └── {table}/
//!         ├── table.ftb
//!         ├── index_{column}.ftb
//!         └── page_{000000}.ftb
//! ```
//!
//! Table and column names are percent-encoded into path components: bytes
//! outside `[A-Za-z0-9_-]` become `%XX` and the empty name becomes `%`.
//! Names whose encoded file name exceeds 255 bytes are rejected.
//!
//! ```text
//! "first name" → index_first%20name.ftb
//! "../escape"  → %2E%2E%2Fescape/
//! ```

use std::fmt::Write as _;
use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::config::SyncStrategy;
use crate::error::{FileTableError, Result};

use super::codec::{decode_framed, encode_framed};
use super::{Store, StoreKey};

const EXTENSION: &str = "ftb";
const TABLE_FILE_STEM: &str = "table";
const INDEX_PREFIX: &str = "index_";
const PAGE_PREFIX: &str = "page_";

/// Longest path component most filesystems accept
const MAX_COMPONENT_LEN: usize = 255;

/// Stand-in for the empty name; never produced by escaping
const EMPTY_NAME: &str = "%";

/// Persistent [`Store`] rooted at a directory
#[derive(Debug)]
pub struct FileStore {
    /// Root directory; one subdirectory per table
    root: PathBuf,

    /// Whether to fsync each written blob
    sync_strategy: SyncStrategy,
}

impl FileStore {
    /// Open or create a store in `root`
    pub fn open(root: &Path, sync_strategy: SyncStrategy) -> Result<Self> {
        fs::create_dir_all(root)?;
        tracing::debug!(root = %root.display(), "opened file store");
        Ok(Self {
            root: root.to_path_buf(),
            sync_strategy,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File path for `key`
    pub fn path_for(&self, key: &StoreKey) -> Result<PathBuf> {
        let table = key.table_name();
        let dir = Self::checked_component(table, encode_name(table))?;
        let file = match key {
            StoreKey::Table(_) => format!("{}.{}", TABLE_FILE_STEM, EXTENSION),
            StoreKey::Index { column, .. } => Self::checked_component(
                column,
                format!("{}{}.{}", INDEX_PREFIX, encode_name(column), EXTENSION),
            )?,
            StoreKey::Page { page, .. } => format!("{}{:06}.{}", PAGE_PREFIX, page, EXTENSION),
        };
        Ok(self.root.join(dir).join(file))
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn checked_component(name: &str, component: String) -> Result<String> {
        if component.len() > MAX_COMPONENT_LEN {
            return Err(FileTableError::InvalidName(name.to_string()));
        }
        Ok(component)
    }

    /// Parse a key back from `{table}/{file}`
    /// "page_000042.ftb" → Some(Page { table, page: 42 })
    fn parse_key(table: &str, path: &Path) -> Option<StoreKey> {
        if path.extension()?.to_str()? != EXTENSION {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;

        if stem == TABLE_FILE_STEM {
            return Some(StoreKey::table(table));
        }
        if let Some(column) = stem.strip_prefix(INDEX_PREFIX) {
            return Some(StoreKey::index(table, decode_name(column)?));
        }
        let page = stem.strip_prefix(PAGE_PREFIX)?.parse().ok()?;
        Some(StoreKey::page(table, page))
    }
}

impl Store for FileStore {
    fn store(&self, key: &StoreKey, blob: Bytes) -> Result<()> {
        let path = self.path_for(key)?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;

        let mut writer = BufWriter::new(file);
        writer.write_all(&encode_framed(&blob))?;
        writer.flush()?;

        if self.sync_strategy == SyncStrategy::EveryWrite {
            let file = writer.into_inner().map_err(|e| {
                FileTableError::Storage(format!("Failed to flush {}: {}", key, e))
            })?;
            file.sync_all()?;
        }

        tracing::trace!(%key, bytes = blob.len(), "stored blob");
        Ok(())
    }

    fn load(&self, key: &StoreKey) -> Result<Option<Bytes>> {
        let path = self.path_for(key)?;
        let frame = match fs::read(&path) {
            Ok(frame) => frame,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let payload = decode_framed(Bytes::from(frame)).map_err(|e| {
            tracing::warn!(%key, error = %e, "corrupted blob");
            e
        })?;
        Ok(Some(payload))
    }

    fn remove(&self, key: &StoreKey) -> Result<bool> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn reset(&self) -> Result<()> {
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.is_dir() {
                fs::remove_dir_all(&path)?;
            } else {
                fs::remove_file(&path)?;
            }
        }
        tracing::info!(root = %self.root.display(), "store reset");
        Ok(())
    }

    fn keys(&self) -> Result<Vec<StoreKey>> {
        let mut keys = Vec::new();

        for entry in fs::read_dir(&self.root)? {
            let table_dir = entry?.path();
            if !table_dir.is_dir() {
                continue;
            }
            let Some(table) = table_dir
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(decode_name)
            else {
                continue;
            };

            for file in fs::read_dir(&table_dir)? {
                let file_path = file?.path();
                if let Some(key) = Self::parse_key(&table, &file_path) {
                    keys.push(key);
                }
            }
        }

        keys.sort();
        Ok(keys)
    }
}

// =============================================================================
// Name Encoding
// =============================================================================

fn is_plain(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-'
}

/// Percent-encode a table or column name into a single path component
fn encode_name(name: &str) -> String {
    if name.is_empty() {
        return EMPTY_NAME.to_string();
    }

    let mut out = String::with_capacity(name.len());
    for byte in name.bytes() {
        if is_plain(byte) {
            out.push(byte as char);
        } else {
            let _ = write!(out, "%{:02X}", byte);
        }
    }
    out
}

/// Inverse of [`encode_name`]; `None` for anything it could not have produced
fn decode_name(encoded: &str) -> Option<String> {
    if encoded == EMPTY_NAME {
        return Some(String::new());
    }

    let bytes = encoded.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hex = bytes.get(i + 1..i + 3)?;
                // only the canonical uppercase form maps back to the same path
                if !hex.iter().all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(b)) {
                    return None;
                }
                let hex = std::str::from_utf8(hex).ok()?;
                out.push(u8::from_str_radix(hex, 16).ok()?);
                i += 3;
            }
            b if is_plain(b) => {
                out.push(b);
                i += 1;
            }
            _ => return None,
        }
    }
    String::from_utf8(out).ok()
}
