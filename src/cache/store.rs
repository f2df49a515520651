// Cache store for reading and writing cached data.
// Handles JSON serialization, mtime-based freshness, and atomic file replacement.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::{Duration, SystemTime};

use serde::{Serialize, de::DeserializeOwned};

use crate::error::Result;

/// True iff `path` exists and was modified less than `ttl` ago.
/// Any stat failure counts as stale. A modification time in the future counts as age zero.
pub fn is_fresh(path: &Path, ttl: Duration) -> bool {
    match modified_at(path) {
        Ok(modified) => modified.elapsed().unwrap_or(Duration::ZERO) < ttl,
        Err(_) => false,
    }
}

/// Read JSON data from a cache file. Missing or corrupt files are errors.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path)?;
    let data = serde_json::from_str(&contents)?;
    Ok(data)
}

/// Write data to cache as pretty-printed JSON.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    write_text(path, &json)
}

/// Read raw text from a cache file.
pub fn read_text(path: &Path) -> Result<String> {
    Ok(fs::read_to_string(path)?)
}

/// Write raw text to cache, replacing any previous file atomically.
pub fn write_text(path: &Path, text: &str) -> Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    // Write atomically via temp file
    let temp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&temp_path)?;
    file.write_all(text.as_bytes())?;
    file.sync_all()?;
    fs::rename(&temp_path, path)?;

    Ok(())
}

/// Get the modification time of a cache file.
pub fn modified_at(path: &Path) -> io::Result<SystemTime> {
    fs::metadata(path)?.modified()
}
