//! The Clipboard Bridge: every clipboard read and write, and the file fallback.
//!
//! Each image-producing path publishes to the view first and only then
//! spawns a detached write-back to the clipboard. Nothing awaits those writes
//! except [`ClipboardBridge::settle`], and their failures are only logged.

use std::sync::Arc;

use tokio_util::task::TaskTracker;
use tracing::{debug, info};

use crate::chooser::{FileChooserPort, SelectedFile};
use crate::clipboard::{ClipboardPort, IMAGE_PNG, TEXT_PLAIN};
use crate::codec;
use crate::error::ClipboardError;
use crate::events::ViewEvent;
use crate::paste::{PasteDisposition, PasteEvent};
use crate::view::{ImageResource, SharedView};

/// Result of [`ClipboardBridge::request_image_paste`].
#[derive(Debug)]
pub enum ImagePasteOutcome {
    /// An image from the clipboard is now displayed.
    Pasted { mime: &'static str, id: u64 },
    /// The clipboard gave no image; the file chooser was offered instead.
    FellBack {
        cause: ClipboardError,
        selection: FileSelectionOutcome,
    },
}

/// Result of a file chooser round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSelectionOutcome {
    Published { mime: String, id: u64 },
    /// Not an image (or empty); silently discarded.
    Rejected { mime: String },
    Cancelled,
}

/// Result of [`ClipboardBridge::request_text_paste`].
#[derive(Debug)]
pub enum TextPasteOutcome {
    Pasted { chars: usize },
    Unchanged { cause: ClipboardError },
}

#[derive(Clone)]
pub struct ClipboardBridge {
    clipboard: Arc<dyn ClipboardPort>,
    chooser: Arc<dyn FileChooserPort>,
    view: SharedView,
    mirrors: TaskTracker,
}

impl ClipboardBridge {
    pub fn new(
        clipboard: Arc<dyn ClipboardPort>,
        chooser: Arc<dyn FileChooserPort>,
        view: SharedView,
    ) -> Self {
        Self {
            clipboard,
            chooser,
            view,
            mirrors: TaskTracker::new(),
        }
    }

    pub fn view(&self) -> &SharedView {
        &self.view
    }

    pub fn clipboard(&self) -> &Arc<dyn ClipboardPort> {
        &self.clipboard
    }

    /// Show the best image on the clipboard, or fall back to the file chooser.
    pub async fn request_image_paste(&self) -> ImagePasteOutcome {
        let cause = match self.clipboard.read().await {
            Ok(snapshot) => {
                if let Some((mime, data)) = snapshot.take_image() {
                    if let Some(id) = self.publish_and_mirror(mime, data).await {
                        return ImagePasteOutcome::Pasted { mime, id };
                    }
                }
                ClipboardError::NoMatchingContent("image".to_string())
            }
            Err(e) => e,
        };

        debug!("image paste falling back to file chooser: {}", cause);
        let selection = self.fallback_file_choice().await;
        ImagePasteOutcome::FellBack { cause, selection }
    }

    /// Replace the text with the clipboard's plain text, if it has any.
    pub async fn request_text_paste(&self) -> TextPasteOutcome {
        let snapshot = match self.clipboard.read().await {
            Ok(snapshot) => snapshot,
            Err(cause) => {
                debug!("text paste skipped: {}", cause);
                return TextPasteOutcome::Unchanged { cause };
            }
        };

        match snapshot.first_text() {
            Some(text) => {
                let chars = text.chars().count();
                self.view.set_text(text).await;
                info!("pasted text ({} chars)", chars);
                TextPasteOutcome::Pasted { chars }
            }
            None => {
                debug!("text paste skipped: clipboard has no plain text");
                TextPasteOutcome::Unchanged {
                    cause: ClipboardError::NoMatchingContent(TEXT_PLAIN.to_string()),
                }
            }
        }
    }

    /// Handle a system paste. Only the first image item is taken; without
    /// one the host keeps its default paste behaviour.
    pub async fn on_system_paste(&self, event: &PasteEvent) -> PasteDisposition {
        let Some(item) = event.first_image() else {
            return PasteDisposition::Default;
        };
        self.publish_and_mirror(&item.mime, item.data.clone()).await;
        PasteDisposition::SuppressDefault
    }

    /// Open the file chooser and route its selection into the view.
    pub async fn fallback_file_choice(&self) -> FileSelectionOutcome {
        self.view.emit(ViewEvent::ChooserOpened);
        match self.chooser.choose_image().await {
            Ok(Some(file)) => self.handle_file_selection(file).await,
            Ok(None) => FileSelectionOutcome::Cancelled,
            Err(e) => {
                debug!("file chooser failed: {:#}", e);
                FileSelectionOutcome::Cancelled
            }
        }
    }

    /// Show a chosen image file as-is and mirror it to the clipboard as PNG.
    pub async fn handle_file_selection(&self, file: SelectedFile) -> FileSelectionOutcome {
        if !file.is_image() {
            debug!("ignoring non-image selection {:?} ({})", file.name, file.mime);
            return FileSelectionOutcome::Rejected { mime: file.mime };
        }

        let SelectedFile { name, mime, bytes } = file;
        let Some(resource) = ImageResource::new(mime.clone(), bytes) else {
            debug!("ignoring empty selection {:?}", name);
            return FileSelectionOutcome::Rejected { mime };
        };

        let id = resource.id();
        let bytes = resource.shared_bytes();
        info!("showing {} from {:?} ({} bytes)", mime, name, bytes.len());
        self.view.set_image(resource).await;
        self.mirror_as_png(bytes);
        FileSelectionOutcome::Published { mime, id }
    }

    /// Wait for every mirror write spawned so far.
    pub async fn settle(&self) {
        self.mirrors.close();
        self.mirrors.wait().await;
        self.mirrors.reopen();
    }

    pub fn pending_mirrors(&self) -> usize {
        self.mirrors.len()
    }

    async fn publish_and_mirror(&self, mime: &str, data: Vec<u8>) -> Option<u64> {
        let resource = ImageResource::new(mime, data)?;
        let id = resource.id();
        let bytes = resource.shared_bytes();
        info!("showing pasted {} image ({} bytes)", mime, bytes.len());
        self.view.set_image(resource).await;
        self.mirror(mime.to_string(), bytes);
        Some(id)
    }

    /// Write the displayed bytes back under their own type.
    fn mirror(&self, mime: String, bytes: Arc<[u8]>) {
        let clipboard = Arc::clone(&self.clipboard);
        let view = self.view.clone();
        self.mirrors.spawn(async move {
            write_mirror(clipboard.as_ref(), &view, &mime, &bytes).await;
        });
    }

    fn mirror_as_png(&self, bytes: Arc<[u8]>) {
        let clipboard = Arc::clone(&self.clipboard);
        let view = self.view.clone();
        self.mirrors.spawn(async move {
            let encoded =
                tokio::task::spawn_blocking(move || codec::reencode_as_png(&bytes)).await;
            match encoded {
                Ok(Ok(png)) => write_mirror(clipboard.as_ref(), &view, IMAGE_PNG, &png).await,
                Ok(Err(e)) => mirror_failed(&view, IMAGE_PNG, &e.to_string()),
                Err(e) => mirror_failed(&view, IMAGE_PNG, &e.to_string()),
            }
        });
    }
}

async fn write_mirror(
    clipboard: &dyn ClipboardPort,
    view: &SharedView,
    mime: &str,
    payload: &[u8],
) {
    match clipboard.write(mime, payload).await {
        Ok(()) => {
            debug!("mirrored {} bytes to clipboard as {}", payload.len(), mime);
            view.emit(ViewEvent::MirrorWritten {
                mime: mime.to_string(),
                bytes: payload.len(),
            });
        }
        Err(e) => mirror_failed(view, mime, &e.to_string()),
    }
}

fn mirror_failed(view: &SharedView, mime: &str, reason: &str) {
    debug!("clipboard mirror as {} dropped: {}", mime, reason);
    view.emit(ViewEvent::MirrorFailed {
        mime: mime.to_string(),
        reason: reason.to_string(),
    });
}
