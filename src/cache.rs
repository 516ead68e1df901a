//! Existence-based thumbnail cache.
//!
//! There is no manifest and no index: a thumbnail is cached when a file is
//! present at its canonical output path. Because that path encodes every
//! generation parameter (see [`paths`](crate::paths)), a present file is by
//! construction the result of an identical request.
//!
//! What the cache does **not** do:
//!
//! - no expiry or eviction; files stay until someone deletes them
//! - no source fingerprinting; replacing `cat.png` in place keeps serving the
//!   thumbnails made from the old image. Delete them (or pass `--force` on the
//!   CLI) to regenerate.
//! - no locking; two processes asking for the same thumbnail at once may both
//!   generate it. Each encodes into its own hidden staging file and renames it
//!   into place, so the last writer wins with identical, complete content.

use crate::naming::{ParsedThumbName, parse_thumb_name};
use crate::paths::ResolvedPaths;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use walkdir::WalkDir;

/// Whether a thumbnail for these paths is already on disk.
pub fn exists(paths: &ResolvedPaths) -> bool {
    paths.output_full_path.is_file()
}

/// How a thumbnail was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    /// Found on disk, no decoding happened.
    Hit,
    /// Generated during this call.
    Generated,
}

/// Summary of cache performance for a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn record(&mut self, outcome: CacheOutcome) {
        match outcome {
            CacheOutcome::Hit => self.hit(),
            CacheOutcome::Generated => self.miss(),
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.hits, self.misses) {
            (0, 0) => write!(f, "nothing to do"),
            (0, m) => write!(f, "{} generated", m),
            (h, 0) => write!(f, "{} cached", h),
            (h, m) => write!(f, "{} cached, {} generated", h, m),
        }
    }
}

/// One file found under the thumbnails directory.
#[derive(Debug, Clone, Serialize)]
pub struct ListedThumb {
    /// Path relative to the thumbnails directory, `/`-separated.
    pub path: String,
    pub size_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<u32>,
}

impl ListedThumb {
    pub fn new(path: String, size_bytes: u64, parsed: Option<&ParsedThumbName>) -> Self {
        Self {
            path,
            size_bytes,
            width: parsed.and_then(|p| p.width),
            height: parsed.and_then(|p| p.height),
            mode: parsed.map(|p| p.mode.to_string()),
            quality: parsed.map(|p| p.quality.value()),
        }
    }
}

/// Walk a thumbnails directory, sorted by path. A missing directory is empty.
///
/// Hidden files are skipped: they are staging files of a generation still in
/// flight (or one that was killed mid-write).
pub fn list(destination: &Path) -> Result<Vec<ListedThumb>, walkdir::Error> {
    if !destination.exists() {
        return Ok(Vec::new());
    }
    let mut thumbs = Vec::new();
    for entry in WalkDir::new(destination).sort_by_file_name() {
        let entry = entry?;
        let file_name = entry.file_name().to_string_lossy();
        if !entry.file_type().is_file() || file_name.starts_with('.') {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(destination)
            .unwrap_or(entry.path())
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let parsed = parse_thumb_name(&file_name);
        let size = entry.metadata()?.len();
        thumbs.push(ListedThumb::new(relative, size, parsed.as_ref()));
    }
    Ok(thumbs)
}
