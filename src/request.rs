//! Request normalization.
//!
//! Every generation call starts by turning loosely-typed caller input
//! (`"crop"`, `Some(1600)`, `None`, ...) into one immutable
//! [`ThumbnailRequest`]. All validation happens here, before any file is
//! touched, so a rejected request never leaves a partial output behind.
//!
//! Missing dimensions are filled per mode, once:
//!
//! | Mode | Both missing | One missing | Name shows |
//! |---|---|---|---|
//! | `resize` | error | 16:9 fill | filled values |
//! | `crop` | error | 16:9 fill | filled values |
//! | `fit` | error | square box | only what the caller gave |

use crate::imaging::{Mode, Quality, Transform, auto_fill_dimensions, square_fill_dimensions};
use thiserror::Error;

/// Largest width or height a caller may ask for.
pub const MAX_DIMENSION: u32 = 2000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("Width or height can not be greater than 2000 (got {width:?}x{height:?})")]
    DimensionTooLarge {
        width: Option<u32>,
        height: Option<u32>,
    },
    #[error("Width and height must be greater than zero")]
    ZeroDimension,
    #[error("Width or height needs to be defined for {0} mode")]
    MissingDimension(Mode),
    #[error("Invalid mode {0:?}, expected one of: resize, crop, fit")]
    InvalidMode(String),
    #[error("Invalid source path {0:?}")]
    InvalidPath(String),
}

/// A validated, normalized thumbnail request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailRequest {
    /// Source path relative to the image repository, always starting with `/`.
    pub source: String,
    /// Width used in the output name (`None` renders as an empty token).
    pub width: Option<u32>,
    /// Height used in the output name (`None` renders as an empty token).
    pub height: Option<u32>,
    pub mode: Mode,
    pub quality: Quality,
    /// The pixel operation, with every dimension resolved.
    pub transform: Transform,
}

/// Canonical `/`-rooted form of a source path.
///
/// Empty and `.` segments are dropped, so `photos//./cat.png` and
/// `/photos/cat.png` share one cache entry. Parent traversal and paths with
/// no file segment left are rejected.
pub fn normalize_source_path(path: &str) -> Result<String, RequestError> {
    let mut segments = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => return Err(RequestError::InvalidPath(path.to_string())),
            name => segments.push(name),
        }
    }
    if segments.is_empty() {
        return Err(RequestError::InvalidPath(path.to_string()));
    }
    Ok(format!("/{}", segments.join("/")))
}

/// Build a [`ThumbnailRequest`] from raw caller input.
///
/// Checks run in this order: path, dimension bounds, mode, missing
/// dimensions. The bound check only looks at what the caller supplied, so
/// an auto-filled side may exceed [`MAX_DIMENSION`].
pub fn normalize(
    path: &str,
    width: Option<u32>,
    height: Option<u32>,
    mode: Option<&str>,
    quality: Option<u32>,
) -> Result<ThumbnailRequest, RequestError> {
    let source = normalize_source_path(path)?;

    if width.is_some_and(|w| w > MAX_DIMENSION) || height.is_some_and(|h| h > MAX_DIMENSION) {
        return Err(RequestError::DimensionTooLarge { width, height });
    }
    if width == Some(0) || height == Some(0) {
        return Err(RequestError::ZeroDimension);
    }

    let mode = match mode {
        Some(name) => name
            .parse::<Mode>()
            .map_err(|e| RequestError::InvalidMode(e.0))?,
        None => Mode::default(),
    };
    let quality = quality.map(Quality::new).unwrap_or_default();

    let (width, height, transform) = match mode {
        Mode::Resize => {
            let (w, h) =
                auto_fill_dimensions(width, height).ok_or(RequestError::MissingDimension(mode))?;
            (Some(w), Some(h), Transform::Resize { width: w, height: h })
        }
        Mode::Crop => {
            let (w, h) =
                auto_fill_dimensions(width, height).ok_or(RequestError::MissingDimension(mode))?;
            (Some(w), Some(h), Transform::Crop { width: w, height: h })
        }
        Mode::Fit => {
            let (w, h) =
                square_fill_dimensions(width, height).ok_or(RequestError::MissingDimension(mode))?;
            (width, height, Transform::Fit { width: w, height: h })
        }
    };

    Ok(ThumbnailRequest {
        source,
        width,
        height,
        mode,
        quality,
        transform,
    })
}
