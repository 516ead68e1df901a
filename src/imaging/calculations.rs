//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Fill in a missing side using a 16:9 frame.
///
/// - width missing → `round(height * 16 / 9)`
/// - height missing → `round(width * 9 / 16)`
///
/// Returns `None` when both sides are missing.
///
/// # Examples
/// ```
/// # use simple_thumb::imaging::auto_fill_dimensions;
/// assert_eq!(auto_fill_dimensions(Some(1600), None), Some((1600, 900)));
/// assert_eq!(auto_fill_dimensions(None, Some(90)), Some((160, 90)));
/// assert_eq!(auto_fill_dimensions(None, None), None);
/// ```
pub fn auto_fill_dimensions(width: Option<u32>, height: Option<u32>) -> Option<(u32, u32)> {
    match (width, height) {
        (Some(w), Some(h)) => Some((w, h)),
        (None, Some(h)) => Some(((h as f64 * 16.0 / 9.0).round() as u32, h)),
        (Some(w), None) => Some((w, (w as f64 * 9.0 / 16.0).round() as u32)),
        (None, None) => None,
    }
}

/// Fill in a missing side by mirroring the present one (square box).
pub fn square_fill_dimensions(width: Option<u32>, height: Option<u32>) -> Option<(u32, u32)> {
    match (width, height) {
        (Some(w), Some(h)) => Some((w, h)),
        (Some(side), None) | (None, Some(side)) => Some((side, side)),
        (None, None) => None,
    }
}

/// Calculate dimensions needed to fill a target area (resize before crop).
///
/// Returns dimensions that completely cover the target area while maintaining
/// the source aspect ratio. One dimension will match exactly, the other may exceed.
pub fn calculate_fill_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    let src_aspect = src_w as f64 / src_h as f64;
    let tgt_aspect = tgt_w as f64 / tgt_h as f64;

    if src_aspect > tgt_aspect {
        // Source is wider: height will match, width will exceed
        let h = tgt_h;
        let w = ((h as f64 * src_aspect).round() as u32).max(tgt_w);
        (w, h)
    } else {
        // Source is taller: width will match, height will exceed
        let w = tgt_w;
        let h = ((w as f64 / src_aspect).round() as u32).max(tgt_h);
        (w, h)
    }
}

/// A rectangular region inside an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Center a `target` sized region inside `source`.
///
/// A target larger than the source on either axis is clamped to the source
/// extent on that axis, so the rect always lies inside the image.
pub fn center_crop_rect(source: (u32, u32), target: (u32, u32)) -> CropRect {
    let width = target.0.min(source.0);
    let height = target.1.min(source.1);
    CropRect {
        x: (source.0 - width) / 2,
        y: (source.1 - height) / 2,
        width,
        height,
    }
}
