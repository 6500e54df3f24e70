//! Media probing: pixel dimensions and MIME type from raw bytes.
//!
//! Probing reads only what the header decoders need and never fails.
//! Anything that cannot be determined is reported as `None`.

use std::io::Cursor;

use serde::{Deserialize, Serialize};

use crate::types::{AssetRef, MediaKind};

/// What could be learned about an asset's media without decoding it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaProbe {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub mime_type: Option<String>,
}

impl MediaProbe {
    /// Probe raw media bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mime_type = infer::get(bytes).map(|kind| kind.mime_type().to_string());

        let dimensions = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .ok()
            .and_then(|reader| reader.into_dimensions().ok());

        if dimensions.is_none() {
            tracing::debug!(mime = ?mime_type, "Could not read pixel dimensions");
        }

        Self {
            width: dimensions.map(|(w, _)| w),
            height: dimensions.map(|(_, h)| h),
            mime_type,
        }
    }

    /// Probe an asset. Videos are never decoded, only sniffed for MIME type.
    pub fn for_asset(asset: &AssetRef) -> Self {
        match (&asset.media, asset.media_kind) {
            (None, kind) => Self {
                mime_type: mime_from_extension(&asset.location, kind).map(str::to_string),
                ..Default::default()
            },
            (Some(bytes), MediaKind::Video) => Self {
                mime_type: infer::get(bytes)
                    .map(|kind| kind.mime_type().to_string())
                    .or_else(|| {
                        mime_from_extension(&asset.location, MediaKind::Video).map(str::to_string)
                    }),
                ..Default::default()
            },
            (Some(bytes), MediaKind::Image) => {
                let mut probe = Self::from_bytes(bytes);
                if probe.mime_type.is_none() {
                    probe.mime_type =
                        mime_from_extension(&asset.location, MediaKind::Image).map(str::to_string);
                }
                probe
            }
        }
    }

    /// Both pixel dimensions, if known.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.width.zip(self.height)
    }

    /// Whether the MIME type names an image format a vision model can read.
    pub fn is_image(&self) -> bool {
        self.mime_type
            .as_deref()
            .is_some_and(|mime| mime.starts_with("image/"))
    }
}

/// MIME type implied by a location's extension.
pub fn mime_from_extension(location: &str, kind: MediaKind) -> Option<&'static str> {
    let ext = location.rsplit('.').next()?.to_ascii_lowercase();
    let mime = match (kind, ext.as_str()) {
        (MediaKind::Image, "png") => "image/png",
        (MediaKind::Image, "jpg" | "jpeg") => "image/jpeg",
        (MediaKind::Image, "gif") => "image/gif",
        (MediaKind::Image, "webp") => "image/webp",
        (MediaKind::Image, "bmp") => "image/bmp",
        (MediaKind::Video, "mp4") => "video/mp4",
        (MediaKind::Video, "webm") => "video/webm",
        (MediaKind::Video, "mov") => "video/quicktime",
        _ => return None,
    };
    Some(mime)
}
