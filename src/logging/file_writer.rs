//! Log file access
//!
//! Every write opens the file in append mode and issues a single write, so a
//! restarted process never clobbers the day's existing file.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use super::error::{LoggerError, Result};

/// Create the log directory and any missing parents
pub fn ensure_directory(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|source| LoggerError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// Append `text` to `path`, creating the file if needed
pub fn append_text(path: &Path, text: &str) -> Result<()> {
    let write = || -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(text.as_bytes())?;
        file.flush()
    };
    write().map_err(|source| LoggerError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Check whether `path` exists as a regular file
pub fn file_exists(path: &Path) -> bool {
    path.is_file()
}

/// Current size of `path` in bytes, if it can be read
pub fn file_len(path: &Path) -> Option<u64> {
    fs::metadata(path).ok().map(|meta| meta.len())
}

/// Ensure a banner ends with exactly one newline before it is written
pub fn terminate_line(text: &str) -> String {
    let mut out = text.trim_end_matches('\n').to_string();
    out.push('\n');
    out
}
