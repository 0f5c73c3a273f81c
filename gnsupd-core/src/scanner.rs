//! Definition directory scanning.
//!
//! ```text
//! /etc/ipsets/
//!   office.json     -> set "office"
//!   vpn.json        -> set "vpn"
//!   README.txt      (ignored)
//!   archive/        (ignored, no recursion)
//! ```

use std::path::{Path, PathBuf};

use crate::error::ScanError;
use crate::types::SetName;

/// Suffix a file must carry to be treated as a set definition.
pub const DEFINITION_SUFFIX: &str = ".json";

/// List set names in `dir`: every non-directory entry ending in
/// [`DEFINITION_SUFFIX`], with the suffix stripped. Sorted by name.
///
/// Subdirectories are skipped, never descended into. The check uses the
/// entry's own type, so a symlink to a directory is listed and then fails
/// at load; an entry whose type cannot be read is listed too. Names that
/// are not valid UTF-8 are skipped.
///
/// Any listing failure returns [`ScanError`] and no names at all.
pub fn scan_dir(dir: &Path) -> Result<Vec<SetName>, ScanError> {
    let scan_err = |source| ScanError {
        path: dir.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(scan_err)? {
        let entry = entry.map_err(scan_err)?;
        if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            continue;
        }
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        match file_name.strip_suffix(DEFINITION_SUFFIX) {
            Some(stem) if !stem.is_empty() => names.push(SetName::from(stem)),
            _ => {}
        }
    }
    names.sort();
    Ok(names)
}

/// `<dir>/<name>.json`: pure, no I/O.
pub fn definition_path(dir: &Path, name: &SetName) -> PathBuf {
    dir.join(format!("{}{DEFINITION_SUFFIX}", name.0))
}
