//! Deterministic output paths.
//!
//! A thumbnail's location is a pure function of the normalized request and
//! the project [`Layout`]. The same function is used to look a thumbnail up
//! and to store it, which is what makes the filesystem usable as a cache.
//!
//! ```text
//! request:  /photos/cat.png  200x100  fit  q80
//! source:   <root>/images/photos/cat.png
//! output:   <root>/thumbnails/photos/cat_200x100_fit_80.png
//! returned: thumbnails/photos/cat_200x100_fit_80.png
//! ```

use crate::config::SiteConfig;
use crate::imaging::{Mode, Quality};
use crate::request::ThumbnailRequest;
use std::path::{Path, PathBuf};

/// Where source images are read from and thumbnails written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Absolute (or project-relative) directory holding source images.
    pub repository: PathBuf,
    /// Directory holding generated thumbnails.
    pub destination: PathBuf,
    /// Destination folder name as it appears in returned paths, `/`-separated.
    pub destination_name: String,
}

impl Layout {
    pub fn new(
        repository: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
        destination_name: impl Into<String>,
    ) -> Self {
        Self {
            repository: repository.into(),
            destination: destination.into(),
            destination_name: destination_name.into().trim_matches('/').to_string(),
        }
    }

    /// Build the layout for a project directory from its config.
    pub fn from_config(project_dir: &Path, config: &SiteConfig) -> Self {
        let root = project_dir.join(&config.paths.root);
        Self::new(
            root.join(&config.paths.images),
            root.join(&config.paths.thumbnails),
            config.paths.thumbnails.replace('\\', "/"),
        )
    }
}

/// Every path derived from one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub source_full_path: PathBuf,
    pub destination_dir: PathBuf,
    pub output_file_name: String,
    /// `destination_dir` plus the source's mirrored subfolder.
    pub output_dir: PathBuf,
    pub output_full_path: PathBuf,
    /// Canonical path handed back to callers, relative to the public root.
    pub relative_output: String,
}

/// Insert `_{width}x{height}_{mode}_{quality}` before the extension of the
/// last path component. Missing dimensions render as empty tokens.
///
/// ```
/// # use simple_thumb::paths::output_file_name;
/// # use simple_thumb::imaging::{Mode, Quality};
/// assert_eq!(
///     output_file_name("/photos/cat.png", Some(200), Some(100), Mode::Fit, Quality::new(80)),
///     "cat_200x100_fit_80.png"
/// );
/// assert_eq!(
///     output_file_name("/cat.png", Some(200), None, Mode::Fit, Quality::new(80)),
///     "cat_200x_fit_80.png"
/// );
/// ```
pub fn output_file_name(
    source: &str,
    width: Option<u32>,
    height: Option<u32>,
    mode: Mode,
    quality: Quality,
) -> String {
    let file_name = source.rsplit('/').next().unwrap_or(source);
    let token = |d: Option<u32>| d.map(|v| v.to_string()).unwrap_or_default();
    let suffix = format!("_{}x{}_{}_{}", token(width), token(height), mode, quality);

    match file_name.rfind('.') {
        Some(dot) => format!("{}{}{}", &file_name[..dot], suffix, &file_name[dot..]),
        None => format!("{file_name}{suffix}"),
    }
}

/// Directory part of a normalized source path, without surrounding slashes.
///
/// `/photos/2024/cat.png` → `photos/2024`, `/cat.png` → ``.
pub fn source_subfolder(source: &str) -> &str {
    match source.rfind('/') {
        Some(slash) => source[..slash].trim_matches('/'),
        None => "",
    }
}

/// Join a `/`-separated relative path onto a filesystem path, one segment at a time.
fn join_segments(base: &Path, relative: &str) -> PathBuf {
    relative
        .split('/')
        .filter(|s| !s.is_empty())
        .fold(base.to_path_buf(), |acc, segment| acc.join(segment))
}

/// Compute every path for a request. Pure: no filesystem access.
pub fn resolve(layout: &Layout, request: &ThumbnailRequest) -> ResolvedPaths {
    let file_name = output_file_name(
        &request.source,
        request.width,
        request.height,
        request.mode,
        request.quality,
    );
    let subfolder = source_subfolder(&request.source);
    let output_dir = join_segments(&layout.destination, subfolder);

    let relative_output = [layout.destination_name.as_str(), subfolder, &file_name]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    ResolvedPaths {
        source_full_path: join_segments(&layout.repository, &request.source),
        destination_dir: layout.destination.clone(),
        output_full_path: output_dir.join(&file_name),
        output_dir,
        output_file_name: file_name,
        relative_output,
    }
}

/// Create the output directory (and parents) for a resolved request.
///
/// New directories get mode 0755 on Unix.
pub fn ensure_output_dir(paths: &ResolvedPaths) -> std::io::Result<()> {
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }
    builder.create(&paths.output_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::normalize;

    fn layout() -> Layout {
        Layout::new("/srv/public/images", "/srv/public/thumbnails", "thumbnails")
    }

    #[test]
    fn naming_inserts_suffix_before_extension() {
        assert_eq!(
            output_file_name(
                "/photos/cat.png",
                Some(200),
                Some(100),
                Mode::Fit,
                Quality::new(80)
            ),
            "cat_200x100_fit_80.png"
        );
    }

    #[test]
    fn naming_uses_last_dot_only() {
        assert_eq!(
            output_file_name(
                "/a.b.c.jpeg",
                Some(1),
                Some(2),
                Mode::Crop,
                Quality::new(3)
            ),
            "a.b.c_1x2_crop_3.jpeg"
        );
    }

    #[test]
    fn naming_ignores_dots_in_directories() {
        assert_eq!(
            output_file_name(
                "/v1.2/readme",
                Some(10),
                Some(10),
                Mode::Resize,
                Quality::default()
            ),
            "readme_10x10_resize_100"
        );
    }

    #[test]
    fn naming_renders_missing_dimensions_empty() {
        assert_eq!(
            output_file_name("/cat.png", None, Some(90), Mode::Fit, Quality::new(50)),
            "cat_x90_fit_50.png"
        );
        assert_eq!(
            output_file_name("/cat.png", Some(200), None, Mode::Fit, Quality::new(50)),
            "cat_200x_fit_50.png"
        );
    }

    #[test]
    fn subfolder_extraction() {
        assert_eq!(source_subfolder("/photos/2024/cat.png"), "photos/2024");
        assert_eq!(source_subfolder("/cat.png"), "");
        assert_eq!(source_subfolder("cat.png"), "");
    }

    #[test]
    fn resolve_mirrors_source_folder() {
        let req = normalize("/photos/cat.png", Some(200), Some(100), Some("fit"), Some(80)).unwrap();
        let paths = resolve(&layout(), &req);

        assert_eq!(
            paths.source_full_path,
            PathBuf::from("/srv/public/images/photos/cat.png")
        );
        assert_eq!(
            paths.destination_dir,
            PathBuf::from("/srv/public/thumbnails")
        );
        assert_eq!(paths.output_dir, PathBuf::from("/srv/public/thumbnails/photos"));
        assert_eq!(paths.output_file_name, "cat_200x100_fit_80.png");
        assert_eq!(
            paths.output_full_path,
            PathBuf::from("/srv/public/thumbnails/photos/cat_200x100_fit_80.png")
        );
        assert_eq!(paths.relative_output, "thumbnails/photos/cat_200x100_fit_80.png");
    }

    #[test]
    fn resolve_root_level_source() {
        let req = normalize("a.jpg", Some(10), Some(20), Some("crop"), Some(90)).unwrap();
        let paths = resolve(&layout(), &req);
        assert_eq!(paths.relative_output, "thumbnails/a_10x20_crop_90.jpg");
        assert_eq!(paths.output_dir, PathBuf::from("/srv/public/thumbnails"));
    }

    #[test]
    fn resolve_is_deterministic() {
        let req = normalize("/x/y.jpg", Some(64), None, Some("crop"), None).unwrap();
        assert_eq!(resolve(&layout(), &req), resolve(&layout(), &req));
    }

    #[test]
    fn leading_slash_does_not_change_paths() {
        let a = normalize("photos/cat.png", Some(5), Some(5), None, None).unwrap();
        let b = normalize("/photos/cat.png", Some(5), Some(5), None, None).unwrap();
        assert_eq!(resolve(&layout(), &a), resolve(&layout(), &b));
    }

    #[test]
    fn dot_segments_do_not_change_paths() {
        let plain = normalize("/photos/cat.png", Some(5), Some(5), None, None).unwrap();
        let canonical = resolve(&layout(), &plain);
        for raw in ["photos/./cat.png", "photos//cat.png"] {
            let req = normalize(raw, Some(5), Some(5), None, None).unwrap();
            let paths = resolve(&layout(), &req);
            assert_eq!(paths, canonical);
            assert_eq!(paths.relative_output, "thumbnails/photos/cat_5x5_resize_100.png");
        }
    }

    #[test]
    fn different_parameters_never_collide() {
        let base = normalize("/cat.png", Some(100), Some(100), Some("crop"), Some(80)).unwrap();
        let other_mode = normalize("/cat.png", Some(100), Some(100), Some("fit"), Some(80)).unwrap();
        let other_quality =
            normalize("/cat.png", Some(100), Some(100), Some("crop"), Some(81)).unwrap();
        let a = resolve(&layout(), &base).output_full_path;
        assert_ne!(a, resolve(&layout(), &other_mode).output_full_path);
        assert_ne!(a, resolve(&layout(), &other_quality).output_full_path);
    }

    #[test]
    fn layout_from_config_joins_project_dir() {
        let config = SiteConfig::default();
        let layout = Layout::from_config(Path::new("/proj"), &config);
        assert_eq!(layout.repository, PathBuf::from("/proj/public/images"));
        assert_eq!(layout.destination, PathBuf::from("/proj/public/thumbnails"));
        assert_eq!(layout.destination_name, "thumbnails");
    }

    #[test]
    fn ensure_output_dir_creates_nested_folders() {
        let tmp = tempfile::TempDir::new().unwrap();
        let layout = Layout::new(tmp.path().join("images"), tmp.path().join("thumbs"), "thumbs");
        let req = normalize("/a/b/c.jpg", Some(10), Some(10), None, None).unwrap();
        let paths = resolve(&layout, &req);

        ensure_output_dir(&paths).unwrap();
        assert!(tmp.path().join("thumbs/a/b").is_dir());
        // Second call is a no-op, not an error.
        ensure_output_dir(&paths).unwrap();
    }
}
