//! Parameter types for image operations.
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 100). Clamped on construction.
//! - [`Mode`]: The geometric strategy (resize, crop or fit).
//! - [`Transform`]: A mode with concrete target dimensions, ready for a backend.

use std::fmt;
use std::str::FromStr;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(100)
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the source image is mapped onto the target box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Scale into the box, preserving aspect ratio.
    #[default]
    Resize,
    /// Cut an exact region out of the source, no scaling.
    Crop,
    /// Scale to cover the box, then cut it to exact size.
    Fit,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Resize, Mode::Crop, Mode::Fit];

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Resize => "resize",
            Mode::Crop => "crop",
            Mode::Fit => "fit",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a mode string is not one of `resize`, `crop`, `fit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMode(pub String);

impl FromStr for Mode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownMode(s.to_string()))
    }
}

/// A fully resolved pixel operation. All dimensions are concrete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    Resize { width: u32, height: u32 },
    Crop { width: u32, height: u32 },
    Fit { width: u32, height: u32 },
}

impl Transform {
    pub fn mode(self) -> Mode {
        match self {
            Transform::Resize { .. } => Mode::Resize,
            Transform::Crop { .. } => Mode::Crop,
            Transform::Fit { .. } => Mode::Fit,
        }
    }

    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Transform::Resize { width, height }
            | Transform::Crop { width, height }
            | Transform::Fit { width, height } => (width, height),
        }
    }
}
