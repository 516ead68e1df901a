//! Shared test utilities.
//!
//! Synthetic image writers and a throwaway project directory laid out the way
//! the stock config expects:
//!
//! ```text
//! <tmp>/
//! └── public/
//!     └── images/
//!         ├── landscape.jpg   (800x600)
//!         └── photos/
//!             └── cat.png     (300x200)
//! ```

use image::{ImageEncoder, RgbImage};
use std::path::Path;
use tempfile::TempDir;

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

/// Write a small valid JPEG file with the given dimensions.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let img = gradient(width, height);
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Write a small valid PNG file with the given dimensions.
pub fn create_test_png(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    gradient(width, height).save(path).unwrap();
}

/// Build a project directory with a couple of source images.
pub fn setup_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let images = tmp.path().join("public/images");
    create_test_jpeg(&images.join("landscape.jpg"), 800, 600);
    create_test_png(&images.join("photos/cat.png"), 300, 200);
    tmp
}
