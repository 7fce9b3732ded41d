//! View State: the current text and image, and how they render.
//!
//! `ViewState` is the plain data; `SharedView` wraps it for the async world,
//! announcing every change on an [`EventBus`].

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use base64::Engine;
use sha2::{Digest, Sha256};
use tokio::sync::{broadcast, RwLock};

use crate::codec;
use crate::events::{EventBus, ViewEvent};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

pub const DEFAULT_TEXT_PLACEHOLDER: &str = "Your text will appear here";
pub const DEFAULT_IMAGE_PLACEHOLDER: &str = "Your image will appear here";

/// Handle to one displayed image's bytes.
///
/// Clones share the same buffer; it is freed when the last clone goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageResource {
    id: u64,
    mime: String,
    bytes: Arc<[u8]>,
}

impl ImageResource {
    /// Returns `None` for an empty payload.
    pub fn new(mime: impl Into<String>, bytes: Vec<u8>) -> Option<Self> {
        if bytes.is_empty() {
            return None;
        }
        Some(Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            mime: mime.into(),
            bytes: bytes.into(),
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Opaque URL naming this resource.
    pub fn url(&self) -> String {
        format!("blob:pastebox/{}", self.id)
    }

    /// Self-contained `data:` URL carrying the bytes.
    pub fn data_url(&self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.bytes);
        format!("data:{};base64,{}", self.mime, encoded)
    }

    /// Short SHA-256 prefix of the bytes.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(&self.bytes);
        hex::encode(&digest[..6])
    }

    /// Pixel size, when the codec can read the header.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        codec::image_dimensions(&self.bytes).ok()
    }
}

/// Messages shown in place of absent content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholders {
    pub text: String,
    pub image: String,
}

impl Default for Placeholders {
    fn default() -> Self {
        Self {
            text: DEFAULT_TEXT_PLACEHOLDER.to_string(),
            image: DEFAULT_IMAGE_PLACEHOLDER.to_string(),
        }
    }
}

/// One frame of output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedView {
    pub text: String,
    pub image: String,
    pub text_is_placeholder: bool,
    pub image_is_placeholder: bool,
}

impl fmt::Display for RenderedView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Text:  {}", self.text)?;
        write!(f, "Image: {}", self.image)
    }
}

#[derive(Debug, Default)]
pub struct ViewState {
    text: String,
    image: Option<ImageResource>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn image(&self) -> Option<&ImageResource> {
        self.image.as_ref()
    }

    pub fn set_text(&mut self, text: String) {
        self.text = text;
    }

    pub fn clear_text(&mut self) {
        self.text.clear();
    }

    /// Replace the image, handing back the one it supersedes.
    pub fn set_image(&mut self, resource: ImageResource) -> Option<ImageResource> {
        self.image.replace(resource)
    }

    pub fn take_image(&mut self) -> Option<ImageResource> {
        self.image.take()
    }

    pub fn render(&self, placeholders: &Placeholders) -> RenderedView {
        let (text, text_is_placeholder) = if self.text.is_empty() {
            (placeholders.text.clone(), true)
        } else {
            (self.text.clone(), false)
        };

        let (image, image_is_placeholder) = match &self.image {
            Some(resource) => (describe_image(resource), false),
            None => (placeholders.image.clone(), true),
        };

        RenderedView {
            text,
            image,
            text_is_placeholder,
            image_is_placeholder,
        }
    }
}

fn describe_image(resource: &ImageResource) -> String {
    let mut parts = vec![
        resource.mime().to_string(),
        format!("{} bytes", resource.len()),
    ];
    if let Some((width, height)) = resource.dimensions() {
        parts.push(format!("{}x{}", width, height));
    }
    parts.push(resource.url());
    parts.push(format!("sha256:{}", resource.fingerprint()));
    parts.join(", ")
}

/// The View State shared between the bridge and the front end.
#[derive(Debug, Clone, Default)]
pub struct SharedView {
    state: Arc<RwLock<ViewState>>,
    events: EventBus,
}

impl SharedView {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_text(&self, text: impl Into<String>) {
        let text = text.into();
        let chars = text.chars().count();
        self.state.write().await.set_text(text);
        self.events.emit(ViewEvent::TextChanged { chars });
    }

    pub async fn clear_text(&self) {
        self.state.write().await.clear_text();
        self.events.emit(ViewEvent::TextCleared);
    }

    /// Show `resource`, releasing whatever image it supersedes.
    pub async fn set_image(&self, resource: ImageResource) {
        let event = ViewEvent::ImageChanged {
            id: resource.id(),
            mime: resource.mime().to_string(),
            bytes: resource.len(),
        };
        let prior = self.state.write().await.set_image(resource);
        self.events.emit(event);
        if let Some(prior) = prior {
            self.release(prior);
        }
    }

    pub async fn text(&self) -> String {
        self.state.read().await.text().to_string()
    }

    pub async fn image(&self) -> Option<ImageResource> {
        self.state.read().await.image().cloned()
    }

    pub async fn render(&self, placeholders: &Placeholders) -> RenderedView {
        self.state.read().await.render(placeholders)
    }

    /// Drop the displayed image when the view goes away.
    pub async fn teardown(&self) {
        let image = self.state.write().await.take_image();
        if let Some(image) = image {
            self.release(image);
        }
    }

    pub fn emit(&self, event: ViewEvent) {
        self.events.emit(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.events.subscribe()
    }

    fn release(&self, resource: ImageResource) {
        let id = resource.id();
        drop(resource);
        self.events.emit(ViewEvent::ImageReleased { id });
    }
}
