//! Centralized validation and helper functions.

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

/// Accepted sequence-file extensions (compared case-insensitively, without the dot)
pub const SEQUENCE_EXTENSIONS: [&str; 3] = ["fa", "fasta", "fna"];

/// Check whether a path carries one of the FASTA-family extensions.
///
/// Only the final dot-extension is considered, so `genome.fasta.gz` is rejected.
///
/// # Examples
///
/// ```
/// use phorager::utils::validation::has_sequence_extension;
/// use std::path::Path;
///
/// assert!(has_sequence_extension(Path::new("genome.fna")));
/// assert!(has_sequence_extension(Path::new("GENOME.FASTA")));
/// assert!(!has_sequence_extension(Path::new("genome.fasta.gz")));
/// ```
#[must_use]
pub fn has_sequence_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            SEQUENCE_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
}

/// Human-readable list of the accepted extensions, e.g. `.fa, .fasta, .fna`
#[must_use]
pub fn sequence_extensions_display() -> String {
    SEQUENCE_EXTENSIONS
        .iter()
        .map(|ext| format!(".{ext}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Inclusive range check for floating point parameters. NaN is never in range.
#[must_use]
pub fn in_range_f64(value: f64, range: &RangeInclusive<f64>) -> bool {
    range.contains(&value)
}

/// Inclusive range check for integer parameters.
#[must_use]
pub fn in_range_i64(value: i64, range: &RangeInclusive<i64>) -> bool {
    range.contains(&value)
}

/// Split a comma-separated selection into trimmed, non-empty tokens.
///
/// Order is preserved and duplicates are kept; callers decide what a
/// repeated token means.
#[must_use]
pub fn split_comma_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Expand a leading `~` and make the path absolute against `base`.
///
/// No filesystem access happens here; the path does not need to exist.
#[must_use]
pub fn absolutize(path: &Path, base: &Path) -> PathBuf {
    let expanded = match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    };

    if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    }
}

/// Check that a directory accepts new files by creating (and dropping) an
/// anonymous temporary file inside it.
///
/// # Errors
///
/// Returns the underlying I/O error if the directory cannot be written.
pub fn check_writable(dir: &Path) -> std::io::Result<()> {
    tempfile::tempfile_in(dir).map(drop)
}
