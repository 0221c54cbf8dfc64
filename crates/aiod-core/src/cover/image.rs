//! Cover image formats and the transient working copy.

use tempfile::TempPath;

use crate::url_model::extension_from_url_path;

/// Source image formats recognised from the URL suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Webp,
    Heic,
}

impl ImageFormat {
    /// Format and temp-file extension inferred from the URL path (query
    /// stripped). Unknown or missing suffixes default to `jpg`.
    pub fn from_url(url: &str) -> (Self, &'static str) {
        match extension_from_url_path(url).as_deref() {
            Some("jpeg") => (ImageFormat::Jpeg, "jpeg"),
            Some("png") => (ImageFormat::Png, "png"),
            Some("webp") => (ImageFormat::Webp, "webp"),
            Some("heic") => (ImageFormat::Heic, "heic"),
            _ => (ImageFormat::Jpeg, "jpg"),
        }
    }

    /// Embeddable as-is, or the format it must be converted to first.
    pub fn normalized(self) -> NormalizedFormat {
        match self {
            ImageFormat::Jpeg => NormalizedFormat::Jpeg,
            ImageFormat::Png | ImageFormat::Webp | ImageFormat::Heic => NormalizedFormat::Png,
        }
    }

    pub fn needs_conversion(self) -> bool {
        matches!(self, ImageFormat::Webp | ImageFormat::Heic)
    }
}

/// Formats ID3 players reliably show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizedFormat {
    Jpeg,
    Png,
}

impl NormalizedFormat {
    /// Video codec name the transcoding agent uses for the attached picture.
    pub fn codec(self) -> &'static str {
        match self {
            NormalizedFormat::Jpeg => "mjpeg",
            NormalizedFormat::Png => "png",
        }
    }
}

/// The image being embedded. Dropping it deletes every temp file it owns.
#[derive(Debug)]
pub struct CoverSpec {
    pub source_url: String,
    /// Downloaded bytes, in the source format.
    pub working_copy: TempPath,
    /// PNG conversion of `working_copy`, when the source needed one.
    pub converted: Option<TempPath>,
    pub normalized_format: NormalizedFormat,
}

impl CoverSpec {
    /// The file handed to the embed step.
    pub fn embed_path(&self) -> &std::path::Path {
        self.converted.as_deref().unwrap_or(&*self.working_copy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_url_suffix() {
        assert_eq!(ImageFormat::from_url("https://i/c.png?w=1"), (ImageFormat::Png, "png"));
        assert_eq!(ImageFormat::from_url("https://i/c.JPEG"), (ImageFormat::Jpeg, "jpeg"));
        assert_eq!(ImageFormat::from_url("https://i/c.webp"), (ImageFormat::Webp, "webp"));
        assert_eq!(ImageFormat::from_url("https://i/c.heic"), (ImageFormat::Heic, "heic"));
    }

    #[test]
    fn unknown_suffix_defaults_to_jpg() {
        assert_eq!(ImageFormat::from_url("https://i/cover"), (ImageFormat::Jpeg, "jpg"));
        assert_eq!(ImageFormat::from_url("https://i/c.gif"), (ImageFormat::Jpeg, "jpg"));
        assert_eq!(ImageFormat::from_url("https://i/c.jpg"), (ImageFormat::Jpeg, "jpg"));
    }

    #[test]
    fn only_webp_and_heic_are_converted() {
        assert!(ImageFormat::Webp.needs_conversion());
        assert!(ImageFormat::Heic.needs_conversion());
        assert!(!ImageFormat::Png.needs_conversion());
        assert!(!ImageFormat::Jpeg.needs_conversion());
        assert_eq!(ImageFormat::Webp.normalized().codec(), "png");
        assert_eq!(ImageFormat::Jpeg.normalized().codec(), "mjpeg");
    }
}
