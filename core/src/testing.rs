//! Scripted ports and sample images for tests.

use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use tokio::sync::oneshot;

use crate::chooser::{FileChooserPort, SelectedFile};
use crate::clipboard::{ClipboardItem, ClipboardPort, ClipboardSnapshot};
use crate::error::ClipboardError;

fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([200, 40, 10]));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, format)
        .unwrap();
    buf.into_inner()
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Png)
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Jpeg)
}

pub fn webp_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::WebP)
}

/// In-memory clipboard with scripted contents and recorded writes.
#[derive(Default)]
pub struct FakeClipboard {
    contents: Mutex<ClipboardSnapshot>,
    gates: Mutex<VecDeque<oneshot::Receiver<ClipboardSnapshot>>>,
    deny_read: AtomicBool,
    deny_write: AtomicBool,
    reads: AtomicUsize,
    write_attempts: AtomicUsize,
    writes: Mutex<Vec<(String, Vec<u8>)>>,
}

impl FakeClipboard {
    pub fn with_items(items: Vec<ClipboardItem>) -> Self {
        let fake = Self::default();
        fake.set_items(items);
        fake
    }

    pub fn set_items(&self, items: Vec<ClipboardItem>) {
        *self.contents.lock().unwrap() = ClipboardSnapshot::new(items);
    }

    pub fn deny_reads(&self) {
        self.deny_read.store(true, Ordering::SeqCst);
    }

    pub fn deny_writes(&self) {
        self.deny_write.store(true, Ordering::SeqCst);
    }

    /// Make the next read wait until the returned sender supplies its snapshot.
    pub fn gate(&self) -> oneshot::Sender<ClipboardSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().push_back(rx);
        tx
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn write_attempts(&self) -> usize {
        self.write_attempts.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> Vec<(String, Vec<u8>)> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl ClipboardPort for FakeClipboard {
    async fn read(&self) -> Result<ClipboardSnapshot, ClipboardError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.deny_read.load(Ordering::SeqCst) {
            return Err(ClipboardError::PermissionDenied);
        }
        let gate = self.gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            return gate
                .await
                .map_err(|_| ClipboardError::Unavailable("gate dropped".into()));
        }
        Ok(self.contents.lock().unwrap().clone())
    }

    async fn write(&self, mime: &str, payload: &[u8]) -> Result<(), ClipboardError> {
        self.write_attempts.fetch_add(1, Ordering::SeqCst);
        if self.deny_write.load(Ordering::SeqCst) {
            return Err(ClipboardError::PermissionDenied);
        }
        self.writes
            .lock()
            .unwrap()
            .push((mime.to_string(), payload.to_vec()));
        self.set_items(vec![ClipboardItem::new().with(mime, payload.to_vec())]);
        Ok(())
    }
}

/// File chooser that hands out one scripted selection.
#[derive(Default)]
pub struct FakeChooser {
    selection: Mutex<Option<SelectedFile>>,
    fail: AtomicBool,
    opened: AtomicUsize,
}

impl FakeChooser {
    pub fn with_selection(file: SelectedFile) -> Self {
        let fake = Self::default();
        *fake.selection.lock().unwrap() = Some(file);
        fake
    }

    pub fn cancelled() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let fake = Self::default();
        fake.fail.store(true, Ordering::SeqCst);
        fake
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FileChooserPort for FakeChooser {
    async fn choose_image(&self) -> Result<Option<SelectedFile>> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("chooser unavailable"));
        }
        Ok(self.selection.lock().unwrap().take())
    }
}

