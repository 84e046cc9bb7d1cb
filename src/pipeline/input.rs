/*!
 * Input model for a pipeline run.
 *
 * A run analyzes one source artifact (an image or literal text) toward a
 * target language. Image artifacts carry their sniffed format so providers
 * can attach them without touching the filesystem again.
 */

use std::fmt;
use std::path::PathBuf;

use bytes::Bytes;
use sha2::{Digest, Sha256};

/// Image container format, sniffed from leading magic bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
    Gif,
}

impl ImageFormat {
    /// Sniff the format from the leading magic bytes
    pub fn sniff(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(ImageFormat::Png);
        }

        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }

        // RIFF container with a WEBP chunk
        if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }

        if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            return Some(ImageFormat::Gif);
        }

        None
    }

    /// Get the MIME type for the format
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Gif => "image/gif",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::WebP => "webp",
            ImageFormat::Gif => "gif",
        };
        write!(f, "{}", name)
    }
}

/// An image to analyze, with its raw bytes and sniffed format
#[derive(Debug, Clone)]
pub struct ImageArtifact {
    /// Raw image bytes
    pub bytes: Bytes,

    /// Sniffed container format
    pub format: ImageFormat,

    /// Path the image was loaded from, if it came from disk
    pub source_path: Option<PathBuf>,
}

impl ImageArtifact {
    /// Create a new image artifact
    pub fn new(bytes: Bytes, format: ImageFormat, source_path: Option<PathBuf>) -> Self {
        Self {
            bytes,
            format,
            source_path,
        }
    }

    /// Hex-encoded SHA-256 of the image content
    pub fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.bytes);
        format!("{:x}", hasher.finalize())
    }

    /// Check whether the artifact carries no bytes
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// The source material for one pipeline run
#[derive(Debug, Clone)]
pub enum SourceArtifact {
    /// An image to read text out of
    Image(ImageArtifact),

    /// Literal text that skips the extraction call
    Text(String),
}

impl SourceArtifact {
    /// True when there is no content to analyze
    pub fn is_empty(&self) -> bool {
        match self {
            SourceArtifact::Image(image) => image.is_empty(),
            SourceArtifact::Text(text) => text.trim().is_empty(),
        }
    }

    /// Short label for status lines and run history
    pub fn describe(&self) -> String {
        match self {
            SourceArtifact::Image(image) => match &image.source_path {
                Some(path) => format!("image {}", path.display()),
                None => format!("{} image, {} bytes", image.format, image.bytes.len()),
            },
            SourceArtifact::Text(text) => format!("text ({} chars)", text.chars().count()),
        }
    }

    /// Hex-encoded SHA-256 of the artifact content
    pub fn content_hash(&self) -> String {
        match self {
            SourceArtifact::Image(image) => image.content_hash(),
            SourceArtifact::Text(text) => {
                let mut hasher = Sha256::new();
                hasher.update(text.as_bytes());
                format!("{:x}", hasher.finalize())
            }
        }
    }

    /// Path the artifact came from, if it was loaded from disk
    pub fn source_path(&self) -> Option<&PathBuf> {
        match self {
            SourceArtifact::Image(image) => image.source_path.as_ref(),
            SourceArtifact::Text(_) => None,
        }
    }
}

/// Input for one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineInput {
    /// The artifact to analyze
    pub artifact: SourceArtifact,

    /// Language code the user wants to read the results in
    pub target_language: String,
}

impl PipelineInput {
    /// Create an input from an image artifact
    pub fn from_image(image: ImageArtifact, target_language: &str) -> Self {
        Self {
            artifact: SourceArtifact::Image(image),
            target_language: target_language.to_string(),
        }
    }

    /// Create an input from literal text
    pub fn from_text(text: &str, target_language: &str) -> Self {
        Self {
            artifact: SourceArtifact::Text(text.to_string()),
            target_language: target_language.to_string(),
        }
    }
}
