//! Image processing: the codec collaborator behind the generator.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` |
//! | **Resize** | Lanczos3, aspect-preserving |
//! | **Crop** | centered `crop_imm` |
//! | **Fit** | cover-resize + centered crop |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: [`Mode`], [`Quality`] and the resolved [`Transform`]
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
mod calculations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use calculations::{
    CropRect, auto_fill_dimensions, calculate_fill_dimensions, center_crop_rect,
    square_fill_dimensions,
};
pub use params::{Mode, Quality, Transform, UnknownMode};
pub use rust_backend::RustBackend;
