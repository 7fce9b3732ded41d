use crate::clipboard::{is_image_type, ClipboardSnapshot, TEXT_PLAIN};

/// One data item carried by a system paste event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteItem {
    pub mime: String,
    pub data: Vec<u8>,
}

impl PasteItem {
    pub fn new(mime: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            data,
        }
    }
}

/// A user-initiated paste (keystroke or menu action).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasteEvent {
    items: Vec<PasteItem>,
}

impl PasteEvent {
    pub fn new(items: Vec<PasteItem>) -> Self {
        Self { items }
    }

    /// The event a paste keystroke would carry for these clipboard contents:
    /// every representation becomes its own item, in order.
    pub fn from_snapshot(snapshot: ClipboardSnapshot) -> Self {
        let items = snapshot
            .into_items()
            .into_iter()
            .flat_map(|item| item.into_representations())
            .map(|r| PasteItem::new(r.mime, r.data))
            .collect();
        Self { items }
    }

    pub fn items(&self) -> &[PasteItem] {
        &self.items
    }

    /// First item whose type is any image format and whose payload is not empty.
    pub fn first_image(&self) -> Option<&PasteItem> {
        self.items
            .iter()
            .find(|item| is_image_type(&item.mime) && !item.data.is_empty())
    }

    /// Text the default paste handling would insert.
    pub fn text(&self) -> Option<String> {
        self.items
            .iter()
            .filter(|item| item.mime == TEXT_PLAIN)
            .find_map(|item| String::from_utf8(item.data.clone()).ok())
    }
}

/// What the host should do with the event after the bridge has seen it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasteDisposition {
    /// The bridge consumed an image; skip the default paste behaviour.
    SuppressDefault,
    /// Nothing for the bridge; let the default paste behaviour run.
    Default,
}

impl PasteDisposition {
    pub fn is_suppressed(self) -> bool {
        self == Self::SuppressDefault
    }
}
