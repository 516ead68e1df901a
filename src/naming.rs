//! Parser for generated thumbnail filenames.
//!
//! The inverse of [`output_file_name`](crate::paths::output_file_name):
//!
//! - `"cat_200x100_fit_80.png"` → stem `cat`, 200×100, fit, quality 80, `png`
//! - `"my_cat_x90_fit_50.png"` → stem `my_cat`, width missing, height 90
//! - `"readme_10x10_resize_100"` → no extension
//!
//! Anything that doesn't follow the pattern (stray files a user dropped into
//! the thumbnails folder) parses to `None`.

use crate::imaging::{Mode, Quality};

/// Parameters recovered from a thumbnail filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedThumbName {
    /// Original filename stem, before the parameter suffix.
    pub stem: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub mode: Mode,
    pub quality: Quality,
    /// Extension without the dot, if the source had one.
    pub extension: Option<String>,
}

impl ParsedThumbName {
    /// The source filename this thumbnail was made from.
    pub fn source_file_name(&self) -> String {
        match &self.extension {
            Some(ext) => format!("{}.{}", self.stem, ext),
            None => self.stem.clone(),
        }
    }
}

fn parse_dimension(token: &str) -> Option<Option<u32>> {
    if token.is_empty() {
        Some(None)
    } else {
        token.parse::<u32>().ok().map(Some)
    }
}

/// Parse a thumbnail filename. Returns `None` when it doesn't match.
pub fn parse_thumb_name(file_name: &str) -> Option<ParsedThumbName> {
    let (body, extension) = match file_name.rfind('.') {
        Some(dot) => (&file_name[..dot], Some(file_name[dot + 1..].to_string())),
        None => (file_name, None),
    };

    let mut parts = body.rsplitn(4, '_');
    let quality_token = parts.next()?;
    let mode_token = parts.next()?;
    let dims_token = parts.next()?;
    let stem = parts.next()?;

    let quality = quality_token.parse::<u32>().ok()?;
    if !(1..=100).contains(&quality) {
        return None;
    }
    let mode = mode_token.parse::<Mode>().ok()?;
    let (w, h) = dims_token.split_once('x')?;

    Some(ParsedThumbName {
        stem: stem.to_string(),
        width: parse_dimension(w)?,
        height: parse_dimension(h)?,
        mode,
        quality: Quality::new(quality),
        extension,
    })
}
