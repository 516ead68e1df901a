//! Image codec backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the whole contract the generator has with a
//! pixel library: open a source, resize/crop/fit it, save it. Releasing the
//! decoded image is just dropping the backend's `Image` value.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use a recording mock so dispatch and caching can be asserted
//! without decoding anything.

use super::params::Quality;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Source image not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Trait for image codec backends.
///
/// Every transform consumes the decoded image and returns the transformed
/// one, so a pipeline never holds two full-size buffers longer than needed.
pub trait ImageBackend: Sync {
    /// Decoded in-memory image.
    type Image;

    /// Decode the image at `path`. A missing file is [`BackendError::NotFound`].
    fn open(&self, path: &Path) -> Result<Self::Image, BackendError>;

    /// Scale into `width × height` preserving aspect ratio. Upscaling allowed.
    fn resize(
        &self,
        image: Self::Image,
        width: u32,
        height: u32,
    ) -> Result<Self::Image, BackendError>;

    /// Cut a centered `width × height` region, no scaling.
    fn crop(
        &self,
        image: Self::Image,
        width: u32,
        height: u32,
    ) -> Result<Self::Image, BackendError>;

    /// Scale to cover `width × height`, then center-crop to exactly that size.
    fn fit(
        &self,
        image: Self::Image,
        width: u32,
        height: u32,
    ) -> Result<Self::Image, BackendError>;

    /// Encode to `path`; the format follows the file extension.
    fn save(&self, image: &Self::Image, path: &Path, quality: Quality) -> Result<(), BackendError>;
}
