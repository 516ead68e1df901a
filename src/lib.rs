//! # Simple Thumb
//!
//! On-demand image thumbnails with a filesystem cache. Ask for an image, a
//! size and a mode; get back a path you can drop into a template:
//!
//! ```no_run
//! # fn main() -> Result<(), simple_thumb::ThumbError> {
//! let path = simple_thumb::make(
//!     std::path::Path::new("."),
//!     "photos/cat.png",
//!     Some(200),
//!     Some(100),
//!     Some("fit"),
//!     Some(80),
//! )?;
//! assert_eq!(path, "thumbnails/photos/cat_200x100_fit_80.png");
//! # Ok(())
//! # }
//! ```
//!
//! # How a request flows
//!
//! ```text
//! normalize   raw input   →  ThumbnailRequest   (validate, fill dimensions)
//! resolve     request     →  ResolvedPaths      (deterministic output name)
//! cache       paths       →  hit? return path
//! generate    source      →  thumbnail file     (open, transform, save)
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`request`] | Validates caller input into an immutable [`ThumbnailRequest`] |
//! | [`paths`] | Project [`Layout`](paths::Layout) and the output-naming rule |
//! | [`cache`] | Existence check, hit/miss statistics, directory listing |
//! | [`generate`] | [`ThumbnailGenerator`]: the pipeline, mode dispatch, batches |
//! | [`imaging`] | Codec backend trait, `image`-crate backend, dimension math |
//! | [`config`] | `config.toml` loading, validation and key lookup |
//! | [`naming`] | Parses generated filenames back into their parameters |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## The filesystem is the cache
//!
//! The output filename encodes every parameter that affects the pixels:
//! `cat.png` at 200×100, fit, quality 80 becomes `cat_200x100_fit_80.png`.
//! If that file exists, it is the answer. There is no manifest to corrupt and
//! nothing to warm up; deleting the thumbnails folder is a full reset.
//!
//! The price is that the cache never notices a source image changing in
//! place. Callers that replace images under the same name should clear the
//! matching thumbnails.
//!
//! ## Validation before I/O
//!
//! Dimension bounds (2000px per side), mode names and missing dimensions are
//! all checked in [`request::normalize`], before the source is opened.
//!
//! Since a present file *is* a cache hit, the output path must never hold a
//! half-written image. Encoding goes to a hidden staging file next to the
//! output, which is renamed into place only once the encoder succeeds.
//!
//! ## Modes are a closed set
//!
//! [`Mode`](imaging::Mode) is an enum and dispatch is an exhaustive `match`.
//! An unknown mode string is rejected at normalization time with
//! [`RequestError::InvalidMode`].

pub mod cache;
pub mod config;
pub mod generate;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod paths;
pub mod request;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use generate::{ThumbError, Thumbnail, ThumbnailGenerator};
pub use request::{RequestError, ThumbnailRequest};

use std::path::Path;

/// One-shot helper: load the project's config and make one thumbnail with
/// the default backend.
pub fn make(
    project_dir: &Path,
    path: &str,
    width: Option<u32>,
    height: Option<u32>,
    mode: Option<&str>,
    quality: Option<u32>,
) -> Result<String, ThumbError> {
    ThumbnailGenerator::for_project(project_dir)?.make(path, width, height, mode, quality)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::setup_project;

    #[test]
    fn make_with_stock_config() {
        let project = setup_project();

        let path = make(
            project.path(),
            "photos/cat.png",
            Some(200),
            Some(100),
            Some("fit"),
            Some(80),
        )
        .unwrap();

        assert_eq!(path, "thumbnails/photos/cat_200x100_fit_80.png");
        let written = project.path().join("public").join(&path);
        assert_eq!(image::image_dimensions(written).unwrap(), (200, 100));
    }

    #[test]
    fn make_honors_project_config() {
        let project = setup_project();
        std::fs::write(
            project.path().join("config.toml"),
            "[paths]\nthumbnails = \"cache/small\"\n",
        )
        .unwrap();

        let path = make(project.path(), "landscape.jpg", Some(160), None, None, None).unwrap();

        assert_eq!(path, "cache/small/landscape_160x90_resize_100.jpg");
        assert!(project.path().join("public/cache/small/landscape_160x90_resize_100.jpg").is_file());
    }

    #[test]
    fn make_surfaces_bad_config() {
        let project = setup_project();
        std::fs::write(project.path().join("config.toml"), "[paths\n").unwrap();

        let result = make(project.path(), "landscape.jpg", Some(10), Some(10), None, None);
        assert!(matches!(result, Err(ThumbError::Config(_))));
    }
}
