//! Pastebox core: the clipboard bridge that turns pastes into displayed
//! text and images, and the view state it publishes to.

pub mod bridge;
pub mod chooser;
pub mod clipboard;
pub mod codec;
pub mod error;
pub mod events;
pub mod paste;
pub mod view;

#[cfg(test)]
mod testing;

pub use bridge::{ClipboardBridge, FileSelectionOutcome, ImagePasteOutcome, TextPasteOutcome};
pub use chooser::{FileChooserPort, SelectedFile};
pub use clipboard::{ClipboardItem, ClipboardPort, ClipboardSnapshot, SystemClipboard};
pub use error::ClipboardError;
pub use events::ViewEvent;
pub use paste::{PasteDisposition, PasteEvent, PasteItem};
pub use view::{ImageResource, Placeholders, RenderedView, SharedView};
