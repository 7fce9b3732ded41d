use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::clipboard::{is_image_type, IMAGE_TYPE_PREFERENCE};
use crate::codec;

const OCTET_STREAM: &str = "application/octet-stream";

/// A file picked by the user, with its type sniffed up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Build a selection from raw bytes. The type follows the file
    /// extension; only a name without one falls back to the magic number,
    /// and then only for PNG, JPEG and WEBP.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let mime = match Path::new(&name).extension() {
            Some(ext) => ext.to_str().and_then(codec::mime_from_extension),
            None => codec::sniff_mime(&bytes).filter(|m| IMAGE_TYPE_PREFERENCE.contains(m)),
        }
        .unwrap_or(OCTET_STREAM);
        Self::new(name, mime, bytes)
    }

    /// Read a file from disk.
    pub async fn load(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read {:?}", path))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::from_bytes(name, bytes))
    }

    pub fn is_image(&self) -> bool {
        is_image_type(&self.mime)
    }
}

/// The file-selection surface used when the clipboard yields no image.
#[async_trait]
pub trait FileChooserPort: Send + Sync {
    /// Let the user pick at most one image file. `Ok(None)` means cancelled.
    async fn choose_image(&self) -> Result<Option<SelectedFile>>;
}
