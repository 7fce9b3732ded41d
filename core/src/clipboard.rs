use arboard::Clipboard;
use async_trait::async_trait;
use tracing::{debug, info};

use crate::codec;
use crate::error::ClipboardError;

pub const TEXT_PLAIN: &str = "text/plain";
pub const IMAGE_PNG: &str = "image/png";
pub const IMAGE_JPEG: &str = "image/jpeg";
pub const IMAGE_WEBP: &str = "image/webp";

/// Image types accepted from a clipboard read, most preferred first.
pub const IMAGE_TYPE_PREFERENCE: [&str; 3] = [IMAGE_PNG, IMAGE_JPEG, IMAGE_WEBP];

/// Whether a type tag names an image of any format.
pub fn is_image_type(mime: &str) -> bool {
    mime.starts_with("image/")
}

/// One payload of a clipboard item under a single type tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Representation {
    pub mime: String,
    pub data: Vec<u8>,
}

/// A clipboard item, offering its content under one or more type tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipboardItem {
    representations: Vec<Representation>,
}

impl ClipboardItem {
    pub fn new() -> Self {
        Self::default()
    }

    /// A plain-text item.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new().with(TEXT_PLAIN, text.into().into_bytes())
    }

    /// Add a representation under `mime`.
    pub fn with(mut self, mime: impl Into<String>, data: Vec<u8>) -> Self {
        self.representations.push(Representation {
            mime: mime.into(),
            data,
        });
        self
    }

    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.representations.iter().map(|r| r.mime.as_str())
    }

    /// Payload for `mime`, if the item offers it.
    pub fn get(&self, mime: &str) -> Option<&[u8]> {
        self.representations
            .iter()
            .find(|r| r.mime == mime)
            .map(|r| r.data.as_slice())
    }

    fn take(self, mime: &str) -> Option<Vec<u8>> {
        self.representations
            .into_iter()
            .find(|r| r.mime == mime)
            .map(|r| r.data)
    }

    pub fn into_representations(self) -> Vec<Representation> {
        self.representations
    }
}

/// Everything on the clipboard at the moment of one read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipboardSnapshot {
    items: Vec<ClipboardItem>,
}

impl ClipboardSnapshot {
    pub fn new(items: Vec<ClipboardItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[ClipboardItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consume the snapshot, keeping the single most preferred image.
    ///
    /// PNG beats JPEG beats WEBP regardless of item order; within one type
    /// the first item wins. Empty payloads never qualify.
    pub fn take_image(mut self) -> Option<(&'static str, Vec<u8>)> {
        for mime in IMAGE_TYPE_PREFERENCE {
            let found = self
                .items
                .iter()
                .position(|item| item.get(mime).is_some_and(|data| !data.is_empty()));
            if let Some(index) = found {
                let item = self.items.swap_remove(index);
                return item.take(mime).map(|data| (mime, data));
            }
        }
        None
    }

    /// Text of the first item exposing a UTF-8 `text/plain` payload.
    pub fn first_text(&self) -> Option<String> {
        self.items.iter().find_map(|item| {
            item.get(TEXT_PLAIN)
                .and_then(|data| std::str::from_utf8(data).ok())
                .map(str::to_owned)
        })
    }

    pub fn into_items(self) -> Vec<ClipboardItem> {
        self.items
    }
}

/// Access to the system clipboard.
#[async_trait]
pub trait ClipboardPort: Send + Sync {
    /// Enumerate everything currently on the clipboard.
    async fn read(&self) -> Result<ClipboardSnapshot, ClipboardError>;

    /// Replace the clipboard contents with a single payload of type `mime`.
    async fn write(&self, mime: &str, payload: &[u8]) -> Result<(), ClipboardError>;
}

/// The real system clipboard, through arboard.
///
/// arboard offers no custom-format writes: images are decoded and set as
/// bitmaps, so reading one back yields a PNG re-encoding, not the written
/// bytes. Text round-trips unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl SystemClipboard {
    fn open() -> Result<Clipboard, ClipboardError> {
        Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))
    }

    fn read_blocking() -> Result<ClipboardSnapshot, ClipboardError> {
        let mut clipboard = Self::open()?;
        let mut items = Vec::new();

        match clipboard.get_text() {
            Ok(text) if !text.is_empty() => items.push(ClipboardItem::text(text)),
            Ok(_) | Err(arboard::Error::ContentNotAvailable) => {}
            Err(e) => debug!("clipboard text not readable: {}", e),
        }

        // Copied files keep their original format.
        if let Ok(files) = clipboard.get().file_list() {
            for path in files {
                let mime = path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .and_then(codec::mime_from_extension);
                let Some(mime) = mime.filter(|m| IMAGE_TYPE_PREFERENCE.contains(m)) else {
                    continue;
                };
                match std::fs::read(&path) {
                    Ok(data) => items.push(ClipboardItem::new().with(mime, data)),
                    Err(e) => debug!("skipping copied file {:?}: {}", path, e),
                }
            }
        }

        // Raw bitmaps arrive as RGBA and are offered as PNG.
        match clipboard.get_image() {
            Ok(img) => {
                match codec::encode_rgba_to_png(&img.bytes, img.width as u32, img.height as u32) {
                    Ok(png) => {
                        debug!(
                            "clipboard bitmap read ({}x{}, {} bytes PNG)",
                            img.width,
                            img.height,
                            png.len()
                        );
                        items.push(ClipboardItem::new().with(IMAGE_PNG, png));
                    }
                    Err(e) => debug!("clipboard bitmap not encodable: {}", e),
                }
            }
            Err(arboard::Error::ContentNotAvailable) => {}
            Err(e) => debug!("clipboard bitmap not readable: {}", e),
        }

        Ok(ClipboardSnapshot::new(items))
    }

    fn write_blocking(mime: &str, payload: &[u8]) -> Result<(), ClipboardError> {
        if mime == TEXT_PLAIN {
            let text = std::str::from_utf8(payload)
                .map_err(|_| ClipboardError::UnsupportedType("text/plain (not UTF-8)".into()))?;
            let mut clipboard = Self::open()?;
            clipboard
                .set_text(text)
                .map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
            info!("clipboard updated ({} chars)", text.len());
            return Ok(());
        }

        if !is_image_type(mime) {
            return Err(ClipboardError::UnsupportedType(mime.to_string()));
        }

        let (rgba, width, height) = codec::decode_to_rgba(payload)?;
        let image_data = arboard::ImageData {
            width: width as usize,
            height: height as usize,
            bytes: rgba.into(),
        };
        let mut clipboard = Self::open()?;
        clipboard
            .set_image(image_data)
            .map_err(|e| ClipboardError::Unavailable(e.to_string()))?;

        info!(
            "clipboard image set ({}x{}, {} bytes {})",
            width,
            height,
            payload.len(),
            mime
        );
        Ok(())
    }
}

#[async_trait]
impl ClipboardPort for SystemClipboard {
    async fn read(&self) -> Result<ClipboardSnapshot, ClipboardError> {
        tokio::task::spawn_blocking(Self::read_blocking)
            .await
            .map_err(|e| ClipboardError::Unavailable(e.to_string()))?
    }

    async fn write(&self, mime: &str, payload: &[u8]) -> Result<(), ClipboardError> {
        let mime = mime.to_string();
        let payload = payload.to_vec();
        tokio::task::spawn_blocking(move || Self::write_blocking(&mime, &payload))
            .await
            .map_err(|e| ClipboardError::Unavailable(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_item(mime: &str, data: &[u8]) -> ClipboardItem {
        ClipboardItem::new().with(mime, data.to_vec())
    }

    #[test]
    fn test_png_preferred_over_jpeg_regardless_of_order() {
        let snapshot = ClipboardSnapshot::new(vec![
            image_item(IMAGE_JPEG, b"jpeg"),
            image_item(IMAGE_WEBP, b"webp"),
            image_item(IMAGE_PNG, b"png"),
        ]);
        assert_eq!(snapshot.take_image(), Some((IMAGE_PNG, b"png".to_vec())));
    }

    #[test]
    fn test_jpeg_preferred_over_webp_within_one_item() {
        let item = ClipboardItem::new()
            .with(IMAGE_WEBP, b"webp".to_vec())
            .with(IMAGE_JPEG, b"jpeg".to_vec());
        let snapshot = ClipboardSnapshot::new(vec![item]);
        assert_eq!(snapshot.take_image(), Some((IMAGE_JPEG, b"jpeg".to_vec())));
    }

    #[test]
    fn test_first_item_wins_within_a_type() {
        let snapshot = ClipboardSnapshot::new(vec![
            image_item(IMAGE_PNG, b"first"),
            image_item(IMAGE_PNG, b"second"),
        ]);
        assert_eq!(snapshot.take_image(), Some((IMAGE_PNG, b"first".to_vec())));
    }

    #[test]
    fn test_unlisted_and_empty_images_are_ignored() {
        let snapshot = ClipboardSnapshot::new(vec![
            image_item("image/gif", b"gif"),
            image_item(IMAGE_PNG, b""),
            ClipboardItem::text("hello"),
        ]);
        assert_eq!(snapshot.take_image(), None);
        assert_eq!(ClipboardSnapshot::default().take_image(), None);
    }

    #[test]
    fn test_first_text() {
        let snapshot = ClipboardSnapshot::new(vec![
            image_item(IMAGE_PNG, b"png"),
            ClipboardItem::new().with(TEXT_PLAIN, vec![0xff, 0xfe]),
            ClipboardItem::text("hello"),
            ClipboardItem::text("world"),
        ]);
        assert_eq!(snapshot.first_text().as_deref(), Some("hello"));
        assert_eq!(ClipboardSnapshot::default().first_text(), None);
    }

    #[test]
    fn test_item_types() {
        let item = ClipboardItem::text("hi").with(IMAGE_PNG, vec![1]);
        assert_eq!(item.types().collect::<Vec<_>>(), vec![TEXT_PLAIN, IMAGE_PNG]);
        assert_eq!(item.get(IMAGE_JPEG), None);
        assert!(is_image_type(IMAGE_WEBP));
        assert!(!is_image_type(TEXT_PLAIN));
    }

    #[test]
    fn test_system_write_rejects_invalid_utf8_text() {
        let err = SystemClipboard::write_blocking(TEXT_PLAIN, &[0x68, 0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, ClipboardError::UnsupportedType(_)));
    }

    #[test]
    fn test_system_write_rejects_non_image_types() {
        let err = SystemClipboard::write_blocking("application/pdf", b"%PDF").unwrap_err();
        assert!(matches!(err, ClipboardError::UnsupportedType(_)));
    }

    #[tokio::test]
    #[ignore = "needs a desktop clipboard"]
    async fn test_system_image_write_reads_back_as_png() {
        let jpeg = crate::testing::jpeg_bytes(4, 4);
        SystemClipboard.write(IMAGE_JPEG, &jpeg).await.unwrap();

        let (mime, data) = SystemClipboard.read().await.unwrap().take_image().unwrap();
        assert_eq!(mime, IMAGE_PNG);
        assert_ne!(data, jpeg);
        assert_eq!(codec::image_dimensions(&data).unwrap(), (4, 4));
    }
}
