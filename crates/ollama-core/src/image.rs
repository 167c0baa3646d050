//! Image inputs for multimodal generate and chat requests.
//!
//! The server expects every image as a base64 string. An [`Image`] is encoded
//! once, when it is constructed, so serializing a request never touches the
//! filesystem.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::Path;
use thiserror::Error;

/// Extensions that mark a string as an image path rather than base64 data.
const IMAGE_EXTENSIONS: [&str; 4] = [".png", ".jpg", ".jpeg", ".webp"];

/// Errors raised while building an [`Image`].
#[derive(Error, Debug)]
pub enum ImageError {
    /// A path with an image extension was given but no such file exists.
    #[error("File {path} does not exist")]
    FileNotFound {
        /// The missing path.
        path: String,
    },

    /// The value is neither an existing file nor valid base64.
    #[error("Invalid image data, expected base64 string or path to image file")]
    InvalidData,

    /// Reading an existing file failed.
    #[error("Failed to read image: {0}")]
    Io(#[from] std::io::Error),
}

/// A base64-encoded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image(String);

impl Image {
    /// Encode raw image bytes.
    pub fn from_bytes(bytes: impl AsRef<[u8]>) -> Self {
        Self(STANDARD.encode(bytes))
    }

    /// Read and encode the file at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ImageError> {
        let bytes = std::fs::read(path)?;
        Ok(Self::from_bytes(bytes))
    }

    /// Wrap text that is already base64, validating it first.
    pub fn from_base64(data: impl Into<String>) -> Result<Self, ImageError> {
        let data = data.into();
        STANDARD
            .decode(data.as_bytes())
            .map_err(|_| ImageError::InvalidData)?;
        Ok(Self(data))
    }

    /// Interpret a loosely-typed string the way the reference client does.
    ///
    /// An existing file (any extension) is read and encoded. A missing file
    /// with an image extension is an error. Anything else must be base64.
    pub fn from_value(value: &str) -> Result<Self, ImageError> {
        let path = Path::new(value);
        if path.is_file() {
            return Self::from_path(path);
        }

        let lower = value.to_ascii_lowercase();
        if IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
            return Err(ImageError::FileNotFound {
                path: value.to_string(),
            });
        }

        Self::from_base64(value)
    }

    /// The encoded payload.
    pub fn as_base64(&self) -> &str {
        &self.0
    }
}

impl From<Vec<u8>> for Image {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_bytes(bytes)
    }
}

impl Serialize for Image {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Image {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self)
    }
}
