//! Test doubles shared by the unit tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::layout::Size;
use crate::render::{Font, ResourceProvider, Texture};
use crate::status::{BatterySnapshot, StatusProbe};

pub struct MockTexture {
    path: String,
    size: Size,
}

impl MockTexture {
    pub fn new(path: &str, size: Size) -> Self {
        Self {
            path: path.to_string(),
            size,
        }
    }
}

impl Texture for MockTexture {
    fn path(&self) -> &str {
        &self.path
    }

    fn source_size(&self) -> Size {
        self.size
    }
}

/// Monospace font: every char is half the font size wide
pub struct MockFont {
    size: f32,
}

impl MockFont {
    pub fn new(size: f32) -> Self {
        Self { size }
    }
}

impl Font for MockFont {
    fn size(&self) -> f32 {
        self.size
    }

    fn size_text(&self, text: &str) -> Size {
        Size::new(text.chars().count() as f32 * self.size * 0.5, self.size)
    }
}

/// In-memory resource set keyed by path
#[derive(Default)]
pub struct MockResources {
    images: HashMap<String, Size>,
    texture_loads: AtomicUsize,
    font_loads: AtomicUsize,
}

impl MockResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, path: &str, size: Size) -> Self {
        self.images.insert(path.to_string(), size);
        self
    }

    pub fn texture_loads(&self) -> usize {
        self.texture_loads.load(Ordering::SeqCst)
    }

    pub fn font_loads(&self) -> usize {
        self.font_loads.load(Ordering::SeqCst)
    }
}

impl ResourceProvider for MockResources {
    fn file_exists(&self, path: &str) -> bool {
        self.images.contains_key(path)
    }

    fn texture(&self, path: &str) -> Option<Arc<dyn Texture>> {
        let size = *self.images.get(path)?;
        self.texture_loads.fetch_add(1, Ordering::SeqCst);
        Some(Arc::new(MockTexture::new(path, size)))
    }

    fn font(&self, _path: Option<&str>, size: f32) -> Option<Arc<dyn Font>> {
        self.font_loads.fetch_add(1, Ordering::SeqCst);
        Some(Arc::new(MockFont::new(size)))
    }
}

/// Probe returning whatever the test last set
#[derive(Default)]
pub struct MockProbe {
    connected: Mutex<bool>,
    battery: Mutex<BatterySnapshot>,
    network_queries: AtomicUsize,
    battery_queries: AtomicUsize,
}

impl MockProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_connected(&self, connected: bool) {
        *self.connected.lock() = connected;
    }

    pub fn set_battery(&self, battery: BatterySnapshot) {
        *self.battery.lock() = battery;
    }

    pub fn network_queries(&self) -> usize {
        self.network_queries.load(Ordering::SeqCst)
    }

    pub fn battery_queries(&self) -> usize {
        self.battery_queries.load(Ordering::SeqCst)
    }
}

impl StatusProbe for MockProbe {
    fn network_connected(&self) -> bool {
        self.network_queries.fetch_add(1, Ordering::SeqCst);
        *self.connected.lock()
    }

    fn battery(&self) -> BatterySnapshot {
        self.battery_queries.fetch_add(1, Ordering::SeqCst);
        *self.battery.lock()
    }
}
