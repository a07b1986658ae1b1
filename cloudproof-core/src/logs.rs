//! Access to CloudTrail log files on disk.

use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;

use crate::error::{CloudProofError, Result};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Largest decompressed size accepted for a gzip log file.
pub const MAX_DECODED_LOG_BYTES: usize = 256 * 1024 * 1024;

/// Abstraction over log file access for testability.
#[cfg_attr(test, mockall::automock)]
pub trait LogSource {
    /// List all CloudTrail log files reachable from the root path.
    fn list_logs(&self, root: &Path) -> Result<Vec<PathBuf>>;
    /// Read a log file, decompressing gzip content.
    fn read_log(&self, path: &Path) -> Result<Vec<u8>>;
}

/// Default log source backed by `std::fs`.
///
/// Picks up `.json` and `.json.gz` files and skips hidden entries. Paths are
/// returned sorted so ingestion order is stable.
#[derive(Debug, Default, Clone)]
pub struct StdLogSource;

impl StdLogSource {
    /// Create a new standard log source.
    pub fn new() -> Self {
        Self
    }
}

impl LogSource for StdLogSource {
    fn list_logs(&self, root: &Path) -> Result<Vec<PathBuf>> {
        if root.is_file() {
            return Ok(vec![root.to_path_buf()]);
        }

        let mut files = Vec::new();
        let mut pending = vec![root.to_path_buf()];

        while let Some(dir) = pending.pop() {
            for entry in std::fs::read_dir(&dir)? {
                let entry = entry?;
                let path = entry.path();
                if is_hidden(&path) {
                    continue;
                }
                let file_type = entry.file_type()?;
                if file_type.is_dir() {
                    pending.push(path);
                } else if file_type.is_file() && is_log_file(&path) {
                    files.push(path);
                }
            }
        }

        files.sort();
        Ok(files)
    }

    fn read_log(&self, path: &Path) -> Result<Vec<u8>> {
        let raw = std::fs::read(path)?;
        decode_log_bytes(raw)
    }
}

/// Decompress gzip content; other content is returned unchanged.
pub fn decode_log_bytes(raw: Vec<u8>) -> Result<Vec<u8>> {
    decode_log_bytes_limited(raw, MAX_DECODED_LOG_BYTES)
}

/// Like [`decode_log_bytes`], but gzip output larger than `limit` bytes is an
/// error. Decompression stops one byte past the limit.
pub fn decode_log_bytes_limited(raw: Vec<u8>, limit: usize) -> Result<Vec<u8>> {
    if !raw.starts_with(&GZIP_MAGIC) {
        return Ok(raw);
    }
    let mut decoded = Vec::new();
    GzDecoder::new(raw.as_slice())
        .take(limit as u64 + 1)
        .read_to_end(&mut decoded)?;
    if decoded.len() > limit {
        return Err(CloudProofError::Other(format!(
            "decompressed log exceeds {limit} bytes"
        )));
    }
    Ok(decoded)
}

fn is_log_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| {
            let name = name.to_lowercase();
            name.ends_with(".json") || name.ends_with(".json.gz")
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}
