//! Asset descriptor parsing from YAML/JSON.
//!
//! A descriptor is the serialized form of an [`AssetRef`] without its media
//! bytes. Callers resolve `location` to bytes themselves and attach them with
//! [`AssetDescriptor::into_asset`].

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::types::{AssetRef, BrandProfile, MediaKind};

/// Errors that can occur when parsing descriptors.
#[derive(Error, Debug)]
pub enum DescriptorError {
    #[error("Failed to read descriptor file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Serialized description of one asset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssetDescriptor {
    /// Media kind; inferred from the location's extension when omitted
    #[serde(default)]
    pub media_kind: Option<MediaKind>,

    /// Opaque path or URI of the media
    pub location: String,

    /// Generation prompt
    #[serde(default)]
    pub prompt: String,

    /// Brand context
    #[serde(default)]
    pub brand: Option<BrandProfile>,
}

impl AssetDescriptor {
    /// Parse a descriptor from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, DescriptorError> {
        let descriptor: Self = serde_yaml::from_str(yaml)?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Parse a descriptor from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, DescriptorError> {
        let descriptor: Self = serde_json::from_str(json)?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Load a descriptor file, choosing the format by extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DescriptorError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json(&content)
        } else {
            Self::from_yaml(&content)
        }
    }

    fn validate(&self) -> Result<(), DescriptorError> {
        if self.location.trim().is_empty() {
            return Err(DescriptorError::MissingField("location".to_string()));
        }
        Ok(())
    }

    /// Effective media kind.
    pub fn media_kind(&self) -> MediaKind {
        self.media_kind
            .unwrap_or_else(|| MediaKind::from_path(&self.location))
    }

    /// Build the asset, attaching media bytes the caller has already read.
    pub fn into_asset(self, media: Option<Vec<u8>>) -> AssetRef {
        let media_kind = self.media_kind();
        AssetRef {
            media_kind,
            location: self.location,
            media,
            prompt: self.prompt,
            brand: self.brand,
        }
    }
}
