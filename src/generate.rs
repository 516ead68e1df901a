//! Thumbnail generation.
//!
//! [`ThumbnailGenerator`] ties the stages together:
//!
//! ```text
//! normalize → resolve → cache check ──hit──→ return canonical path
//!                            │
//!                           miss
//!                            ↓
//!              open → dispatch → create dir → stage + rename → return canonical path
//! ```
//!
//! All validation happens in [`normalize`], before any I/O. The encoder
//! writes to a hidden staging file that is renamed onto the output path only
//! on success, so a failed call never leaves a file the cache would trust.
//!
//! ## Backend
//!
//! The generator is generic over [`ImageBackend`]. Production code uses
//! [`RustBackend`]; tests use a recording mock to prove that a cache hit does
//! no decoding at all.

use crate::cache::{self, CacheOutcome};
use crate::config::{ConfigError, load_config};
use crate::imaging::{BackendError, ImageBackend, RustBackend, Transform};
use crate::paths::{Layout, ResolvedPaths, ensure_output_dir, resolve};
use crate::request::{RequestError, ThumbnailRequest, normalize, normalize_source_path};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ThumbError {
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error("Source image not found: {}", .0.display())]
    SourceNotFound(PathBuf),
    #[error("Could not create thumbnail directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image processing failed: {0}")]
    Backend(BackendError),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl From<BackendError> for ThumbError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::NotFound(path) => ThumbError::SourceNotFound(path),
            other => ThumbError::Backend(other),
        }
    }
}

/// A thumbnail that exists on disk after a successful call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    /// Canonical path relative to the public root, e.g. `thumbnails/photos/cat_200x100_fit_80.png`.
    pub path: String,
    /// Where the file lives on disk.
    pub output_full_path: PathBuf,
    pub outcome: CacheOutcome,
}

/// Result for one input of [`ThumbnailGenerator::make_many`].
#[derive(Debug)]
pub struct BatchItem {
    /// The path as the caller wrote it.
    pub input: String,
    pub result: Result<Thumbnail, ThumbError>,
}

/// Run the pixel operation selected by `transform`.
pub fn dispatch<B: ImageBackend>(
    backend: &B,
    image: B::Image,
    transform: Transform,
) -> Result<B::Image, BackendError> {
    match transform {
        Transform::Resize { width, height } => backend.resize(image, width, height),
        Transform::Crop { width, height } => backend.crop(image, width, height),
        Transform::Fit { width, height } => backend.fit(image, width, height),
    }
}

pub struct ThumbnailGenerator<B: ImageBackend = RustBackend> {
    backend: B,
    layout: Layout,
}

impl ThumbnailGenerator<RustBackend> {
    /// Generator for a project directory, configured from its `config.toml`.
    pub fn for_project(project_dir: &Path) -> Result<Self, ThumbError> {
        let config = load_config(project_dir)?;
        Ok(Self::new(
            RustBackend::new(),
            Layout::from_config(project_dir, &config),
        ))
    }
}

impl<B: ImageBackend> ThumbnailGenerator<B> {
    pub fn new(backend: B, layout: Layout) -> Self {
        Self { backend, layout }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Compute where a thumbnail would live, without touching the disk.
    pub fn resolve(
        &self,
        path: &str,
        width: Option<u32>,
        height: Option<u32>,
        mode: Option<&str>,
        quality: Option<u32>,
    ) -> Result<ResolvedPaths, ThumbError> {
        let request = normalize(path, width, height, mode, quality)?;
        Ok(resolve(&self.layout, &request))
    }

    /// Return the canonical path of a thumbnail, generating it if needed.
    pub fn make(
        &self,
        path: &str,
        width: Option<u32>,
        height: Option<u32>,
        mode: Option<&str>,
        quality: Option<u32>,
    ) -> Result<String, ThumbError> {
        self.make_with_outcome(path, width, height, mode, quality)
            .map(|thumb| thumb.path)
    }

    /// Like [`make`](Self::make), also reporting whether the cache was hit.
    pub fn make_with_outcome(
        &self,
        path: &str,
        width: Option<u32>,
        height: Option<u32>,
        mode: Option<&str>,
        quality: Option<u32>,
    ) -> Result<Thumbnail, ThumbError> {
        let request = normalize(path, width, height, mode, quality)?;
        self.make_request(&request)
    }

    /// Generate (or reuse) the thumbnail for an already-normalized request.
    pub fn make_request(&self, request: &ThumbnailRequest) -> Result<Thumbnail, ThumbError> {
        let paths = resolve(&self.layout, request);

        if cache::exists(&paths) {
            debug!("Cache hit for {}", paths.relative_output);
            return Ok(Thumbnail {
                path: paths.relative_output,
                output_full_path: paths.output_full_path,
                outcome: CacheOutcome::Hit,
            });
        }

        let (width, height) = request.transform.dimensions();
        debug!(
            "Cache miss for {}, running {} {}x{} on {:?}",
            paths.relative_output,
            request.transform.mode(),
            width,
            height,
            paths.source_full_path
        );
        let image = self.backend.open(&paths.source_full_path)?;
        let image = dispatch(&self.backend, image, request.transform)?;

        ensure_output_dir(&paths).map_err(|source| ThumbError::CreateDir {
            path: paths.output_dir.clone(),
            source,
        })?;
        self.save_staged(&image, &paths, request)?;
        drop(image);

        info!("Generated {}", paths.relative_output);
        Ok(Thumbnail {
            path: paths.relative_output,
            output_full_path: paths.output_full_path,
            outcome: CacheOutcome::Generated,
        })
    }

    /// Encode into a hidden temporary sibling of the output, then rename it
    /// into place.
    ///
    /// The cache only checks existence, so the output path must never hold a
    /// half-written file. On failure the staged file is removed when dropped.
    fn save_staged(
        &self,
        image: &B::Image,
        paths: &ResolvedPaths,
        request: &ThumbnailRequest,
    ) -> Result<(), ThumbError> {
        let suffix = Path::new(&paths.output_file_name)
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        let mut builder = tempfile::Builder::new();
        builder.prefix(".").suffix(&suffix);
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(std::fs::Permissions::from_mode(0o644));
        }
        let staged = builder.tempfile_in(&paths.output_dir)?;

        self.backend.save(image, staged.path(), request.quality)?;
        staged
            .persist(&paths.output_full_path)
            .map_err(|err| err.error)?;
        Ok(())
    }

    /// Delete the cached file for a request, if any.
    ///
    /// Returns whether a file was removed. The next `make` regenerates it.
    pub fn invalidate(&self, request: &ThumbnailRequest) -> Result<bool, ThumbError> {
        let paths = resolve(&self.layout, request);
        if !cache::exists(&paths) {
            return Ok(false);
        }
        std::fs::remove_file(&paths.output_full_path)?;
        debug!("Removed cached {}", paths.relative_output);
        Ok(true)
    }

    /// Run [`make`](Self::make_with_outcome) for several sources on the rayon pool.
    ///
    /// Inputs naming the same source (`a.jpg` and `/a.jpg`) are collapsed to
    /// the first occurrence, so one batch never races with itself on an
    /// output file. Results keep input order.
    pub fn make_many<S: AsRef<str>>(
        &self,
        paths: &[S],
        width: Option<u32>,
        height: Option<u32>,
        mode: Option<&str>,
        quality: Option<u32>,
    ) -> Vec<BatchItem> {
        let mut seen = HashSet::new();
        let unique: Vec<&str> = paths
            .iter()
            .map(AsRef::as_ref)
            .filter(|p| seen.insert(normalize_source_path(p).unwrap_or_else(|_| p.to_string())))
            .collect();

        unique
            .par_iter()
            .map(|input| BatchItem {
                input: input.to_string(),
                result: self.make_with_outcome(input, width, height, mode, quality),
            })
            .collect()
    }
}
