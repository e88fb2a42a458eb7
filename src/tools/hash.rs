// std imports
use std::fs::{read, read_to_string};
use std::path::{Path, PathBuf};

// 3rd party imports
use anyhow::{Context, Result};
use indicatif::ProgressStyle;
use sha2::{Digest, Sha256};
use tracing::{debug, info_span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

/// Suffixes of files which are hashed as text with normalized line endings
///
pub const TEXT_FILE_SUFFIXES: [&str; 8] = ["csv", "txt", "yaml", "yml", "json", "pdb", "cif", "hxms"];

/// Returns true if the file is hashed as text
///
/// # Arguments
/// * `path` - File path
///
pub fn is_text_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            TEXT_FILE_SUFFIXES.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Replaces `\r\n` and `\r` with `\n`
///
pub fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n").replace('\r', "\n")
}

/// SHA-256 hex digest over the content of all files.
/// Files are hashed in order of their path, text files with normalized line endings,
/// so the digest does not depend on the order of `paths` or the platform the files were written on.
///
/// # Arguments
/// * `paths` - Files to hash
///
pub fn hash_files(paths: &[PathBuf]) -> Result<String> {
    let mut sorted: Vec<&PathBuf> = paths.iter().collect();
    sorted.sort_by_key(|path| path.to_string_lossy().replace('\\', "/"));
    sorted.dedup();

    let span = info_span!("hashing files");
    span.pb_set_style(&ProgressStyle::default_bar());
    span.pb_set_length(sorted.len() as u64);
    let _span_guard = span.enter();

    let mut hasher = Sha256::new();
    for path in sorted {
        if is_text_file(path) {
            let content = read_to_string(path)
                .with_context(|| format!("Cannot read {}", path.display()))?;
            hasher.update(normalize_line_endings(&content).as_bytes());
        } else {
            let content = read(path).with_context(|| format!("Cannot read {}", path.display()))?;
            hasher.update(&content);
        }
        debug!("Hashed {}", path.display());
        span.pb_inc(1);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Returns the first `length` characters of a hex digest
///
/// # Arguments
/// * `hash` - Hex digest
/// * `length` - Number of characters to keep
///
pub fn truncate_hash(hash: &str, length: usize) -> String {
    hash.chars().take(length).collect()
}
