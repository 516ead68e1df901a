//! Pure Rust codec backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::ImageReader` |
//! | Resize | `DynamicImage::resize` with `Lanczos3` (aspect-preserving, upscales) |
//! | Crop | `DynamicImage::crop_imm` around the center |
//! | Fit | `resize_exact` to the cover size, then centered `crop_imm` |
//! | Encode JPEG | `JpegEncoder::new_with_quality` |
//! | Encode AVIF | `AvifEncoder::new_with_speed_quality` (rav1e, speed 6) |
//! | Encode PNG / TIFF / WebP | `DynamicImage::save_with_format` (lossless, quality ignored) |
//!
//! Color types an encoder cannot write (gray+alpha in TIFF, 16-bit in WebP,
//! float in PNG) are converted first, so any decodable source can be saved in
//! any supported output format.

use super::backend::{BackendError, ImageBackend};
use super::calculations::{calculate_fill_dimensions, center_crop_rect};
use super::params::Quality;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::borrow::Cow;
use std::io::BufWriter;
use std::path::Path;

/// Extensions this backend can both decode and encode.
const FORMATS: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
    ("avif", ImageFormat::Avif),
];

fn format_for(path: &Path) -> Result<ImageFormat, BackendError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    FORMATS
        .iter()
        .find(|(candidate, _)| *candidate == ext)
        .map(|(_, fmt)| *fmt)
        .ok_or(BackendError::UnsupportedFormat(ext))
}

/// Backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

fn center_crop(image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    let rect = center_crop_rect((image.width(), image.height()), (width, height));
    image.crop_imm(rect.x, rect.y, rect.width, rect.height)
}

/// Convert to a color type `format`'s encoder accepts, borrowing when it
/// already does.
fn encodable(image: &DynamicImage, format: ImageFormat) -> Cow<'_, DynamicImage> {
    let converted = match (format, image) {
        (ImageFormat::Tiff, DynamicImage::ImageLumaA8(_)) => {
            DynamicImage::ImageRgba8(image.to_rgba8())
        }
        (ImageFormat::Tiff, DynamicImage::ImageLumaA16(_)) => {
            DynamicImage::ImageRgba16(image.to_rgba16())
        }
        (ImageFormat::WebP, DynamicImage::ImageLuma8(_) | DynamicImage::ImageLumaA8(_))
        | (
            ImageFormat::WebP | ImageFormat::Avif,
            DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_),
        ) => return Cow::Borrowed(image),
        (ImageFormat::WebP | ImageFormat::Avif, _) if image.color().has_alpha() => {
            DynamicImage::ImageRgba8(image.to_rgba8())
        }
        (ImageFormat::WebP | ImageFormat::Avif, _) => DynamicImage::ImageRgb8(image.to_rgb8()),
        (ImageFormat::Png, DynamicImage::ImageRgb32F(_)) => {
            DynamicImage::ImageRgb16(image.to_rgb16())
        }
        (ImageFormat::Png, DynamicImage::ImageRgba32F(_)) => {
            DynamicImage::ImageRgba16(image.to_rgba16())
        }
        _ => return Cow::Borrowed(image),
    };
    Cow::Owned(converted)
}

fn encode(image: &DynamicImage, path: &Path, quality: Quality) -> Result<(), BackendError> {
    let format = format_for(path)?;
    let pixels = encodable(image, format);
    let failed = |e: image::ImageError| {
        BackendError::ProcessingFailed(format!("Failed to encode {}: {}", path.display(), e))
    };

    match format {
        ImageFormat::Jpeg => {
            let writer = BufWriter::new(std::fs::File::create(path)?);
            let encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(writer, quality.value() as u8);
            // JPEG has no alpha channel
            DynamicImage::ImageRgb8(pixels.to_rgb8())
                .write_with_encoder(encoder)
                .map_err(failed)
        }
        ImageFormat::Avif => {
            let writer = BufWriter::new(std::fs::File::create(path)?);
            let encoder = image::codecs::avif::AvifEncoder::new_with_speed_quality(
                writer,
                6,
                quality.value() as u8,
            );
            pixels.write_with_encoder(encoder).map_err(failed)
        }
        other => pixels.save_with_format(path, other).map_err(failed),
    }
}

impl ImageBackend for RustBackend {
    type Image = DynamicImage;

    fn open(&self, path: &Path) -> Result<DynamicImage, BackendError> {
        if !path.is_file() {
            return Err(BackendError::NotFound(path.to_path_buf()));
        }
        ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(|e| {
                BackendError::ProcessingFailed(format!(
                    "Failed to decode {}: {}",
                    path.display(),
                    e
                ))
            })
    }

    fn resize(
        &self,
        image: DynamicImage,
        width: u32,
        height: u32,
    ) -> Result<DynamicImage, BackendError> {
        Ok(image.resize(width, height, FilterType::Lanczos3))
    }

    fn crop(
        &self,
        image: DynamicImage,
        width: u32,
        height: u32,
    ) -> Result<DynamicImage, BackendError> {
        Ok(center_crop(&image, width, height))
    }

    fn fit(
        &self,
        image: DynamicImage,
        width: u32,
        height: u32,
    ) -> Result<DynamicImage, BackendError> {
        let (fill_w, fill_h) =
            calculate_fill_dimensions((image.width(), image.height()), (width, height));
        let filled = image.resize_exact(fill_w, fill_h, FilterType::Lanczos3);
        Ok(center_crop(&filled, width, height))
    }

    fn save(&self, image: &DynamicImage, path: &Path, quality: Quality) -> Result<(), BackendError> {
        encode(image, path, quality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{create_test_jpeg, create_test_png};

    #[test]
    fn open_nonexistent_file_is_not_found() {
        let backend = RustBackend::new();
        let result = backend.open(Path::new("/nonexistent/image.jpg"));
        assert!(matches!(result, Err(BackendError::NotFound(_))));
    }

    #[test]
    fn open_garbage_file_fails_to_decode() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("broken.jpg");
        std::fs::write(&path, b"not an image").unwrap();

        let result = RustBackend::new().open(&path);
        assert!(matches!(result, Err(BackendError::ProcessingFailed(_))));
    }

    #[test]
    fn resize_preserves_aspect_ratio() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("source.jpg");
        create_test_jpeg(&path, 400, 200);

        let backend = RustBackend::new();
        let image = backend.open(&path).unwrap();
        let resized = backend.resize(image, 100, 100).unwrap();
        assert_eq!((resized.width(), resized.height()), (100, 50));
    }

    #[test]
    fn resize_upscales() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("source.png");
        create_test_png(&path, 40, 20);

        let backend = RustBackend::new();
        let image = backend.open(&path).unwrap();
        let resized = backend.resize(image, 400, 400).unwrap();
        assert_eq!((resized.width(), resized.height()), (400, 200));
    }

    #[test]
    fn crop_is_exact_and_unscaled() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("source.png");
        create_test_png(&path, 300, 200);

        let backend = RustBackend::new();
        let image = backend.open(&path).unwrap();
        let cropped = backend.crop(image, 160, 90).unwrap();
        assert_eq!((cropped.width(), cropped.height()), (160, 90));
    }

    #[test]
    fn crop_larger_than_source_clamps() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("source.png");
        create_test_png(&path, 100, 80);

        let backend = RustBackend::new();
        let image = backend.open(&path).unwrap();
        let cropped = backend.crop(image, 1600, 900).unwrap();
        assert_eq!((cropped.width(), cropped.height()), (100, 80));
    }

    #[test]
    fn fit_fills_exact_box() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("source.jpg");
        create_test_jpeg(&path, 800, 600);

        let backend = RustBackend::new();
        let image = backend.open(&path).unwrap();
        let fitted = backend.fit(image, 200, 300).unwrap();
        assert_eq!((fitted.width(), fitted.height()), (200, 300));
    }

    #[test]
    fn fit_upscales_to_exact_box() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("source.png");
        create_test_png(&path, 30, 20);

        let backend = RustBackend::new();
        let image = backend.open(&path).unwrap();
        let fitted = backend.fit(image, 300, 300).unwrap();
        assert_eq!((fitted.width(), fitted.height()), (300, 300));
    }

    #[test]
    fn save_jpeg_and_reopen() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        create_test_jpeg(&source, 120, 80);

        let backend = RustBackend::new();
        let image = backend.open(&source).unwrap();
        let output = tmp.path().join("out.jpg");
        backend.save(&image, &output, Quality::new(60)).unwrap();

        let reopened = backend.open(&output).unwrap();
        assert_eq!((reopened.width(), reopened.height()), (120, 80));
    }

    #[test]
    fn save_png_with_alpha() {
        let tmp = tempfile::TempDir::new().unwrap();
        let output = tmp.path().join("out.png");
        let image = DynamicImage::new_rgba8(10, 10);

        RustBackend::new()
            .save(&image, &output, Quality::default())
            .unwrap();
        assert!(output.exists());
    }

    #[test]
    fn save_gray_alpha_as_tiff() {
        let tmp = tempfile::TempDir::new().unwrap();
        let backend = RustBackend::new();
        for (name, image) in [
            ("la8.tiff", DynamicImage::new_luma_a8(16, 12)),
            ("la16.tif", DynamicImage::new_luma_a16(16, 12)),
        ] {
            let output = tmp.path().join(name);
            backend.save(&image, &output, Quality::new(80)).unwrap();

            let reopened = backend.open(&output).unwrap();
            assert_eq!((reopened.width(), reopened.height()), (16, 12));
            assert!(reopened.color().has_alpha());
        }
    }

    #[test]
    fn save_sixteen_bit_as_webp() {
        let tmp = tempfile::TempDir::new().unwrap();
        let output = tmp.path().join("deep.webp");
        let image = DynamicImage::new_rgb16(8, 8);

        RustBackend::new()
            .save(&image, &output, Quality::default())
            .unwrap();
        assert_eq!(image::image_dimensions(&output).unwrap(), (8, 8));
    }

    #[test]
    fn encodable_borrows_supported_color_types() {
        let rgb = DynamicImage::new_rgb8(2, 2);
        assert!(matches!(encodable(&rgb, ImageFormat::Tiff), Cow::Borrowed(_)));
        assert!(matches!(encodable(&rgb, ImageFormat::WebP), Cow::Borrowed(_)));

        let gray_alpha = DynamicImage::new_luma_a8(2, 2);
        assert!(matches!(encodable(&gray_alpha, ImageFormat::Png), Cow::Borrowed(_)));
        assert!(matches!(
            &*encodable(&gray_alpha, ImageFormat::Tiff),
            DynamicImage::ImageRgba8(_)
        ));
    }

    #[test]
    fn save_unknown_extension_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let output = tmp.path().join("out.xyz");
        let image = DynamicImage::new_rgb8(10, 10);

        let result = RustBackend::new().save(&image, &output, Quality::default());
        assert!(matches!(result, Err(BackendError::UnsupportedFormat(ext)) if ext == "xyz"));
        assert!(!output.exists());
    }
}
