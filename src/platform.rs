//! Host collaborators backed by the local machine
//!
//! [`SystemProbe`] reads battery and link state from Linux sysfs.
//! [`FileResources`] resolves theme paths on disk and reads image headers
//! for native texture sizes. Neither decodes pixels; the frontend owns that.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::layout::Size;
use crate::render::{Font, ResourceProvider, Texture};
use crate::status::{BatterySnapshot, StatusProbe};

/// Status probe reading `/sys/class/power_supply` and `/sys/class/net`
#[derive(Debug, Clone)]
pub struct SystemProbe {
    sysfs_root: PathBuf,
}

impl SystemProbe {
    pub fn new() -> Self {
        Self::with_root("/sys/class")
    }

    /// Probe a sysfs-like tree rooted at `root` (contains `power_supply/` and `net/`)
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            sysfs_root: root.into(),
        }
    }

    fn read_attr(dir: &Path, name: &str) -> Option<String> {
        fs::read_to_string(dir.join(name))
            .ok()
            .map(|value| value.trim().to_string())
    }
}

impl Default for SystemProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusProbe for SystemProbe {
    fn network_connected(&self) -> bool {
        let Ok(entries) = fs::read_dir(self.sysfs_root.join("net")) else {
            return false;
        };

        entries.flatten().any(|entry| {
            let name = entry.file_name();
            if name == "lo" {
                return false;
            }
            let up = Self::read_attr(&entry.path(), "operstate").as_deref() == Some("up");
            trace!("Interface {:?}: up={}", name, up);
            up
        })
    }

    fn battery(&self) -> BatterySnapshot {
        let Ok(entries) = fs::read_dir(self.sysfs_root.join("power_supply")) else {
            return BatterySnapshot::default();
        };

        for entry in entries.flatten() {
            let dir = entry.path();
            if Self::read_attr(&dir, "type").as_deref() != Some("Battery") {
                continue;
            }

            let Some(level) = Self::read_attr(&dir, "capacity").and_then(|c| c.parse::<u8>().ok())
            else {
                continue;
            };

            return match Self::read_attr(&dir, "status").as_deref() {
                Some("Charging") => BatterySnapshot::charging(level),
                _ => BatterySnapshot::discharging(level),
            };
        }

        BatterySnapshot::default()
    }
}

/// Texture handle carrying the image's path and header size
#[derive(Debug, Clone)]
pub struct FileTexture {
    path: String,
    size: Size,
}

impl Texture for FileTexture {
    fn path(&self) -> &str {
        &self.path
    }

    fn source_size(&self) -> Size {
        self.size
    }

    fn bind(&self) -> bool {
        !self.size.is_empty()
    }
}

/// Font with estimated metrics, for headless rendering
#[derive(Debug, Clone)]
pub struct EstimatedFont {
    size: f32,
}

/// Average glyph advance relative to the pixel size
const GLYPH_ADVANCE: f32 = 0.6;

impl EstimatedFont {
    pub fn new(size: f32) -> Self {
        Self { size }
    }
}

impl Font for EstimatedFont {
    fn size(&self) -> f32 {
        self.size
    }

    fn size_text(&self, text: &str) -> Size {
        let width = text.chars().count() as f32 * self.size * GLYPH_ADVANCE;
        Size::new(width, self.size)
    }
}

/// Resources resolved against a theme directory
///
/// Textures are memoized by path; a path is read from disk once.
pub struct FileResources {
    root: PathBuf,
    textures: Mutex<HashMap<String, Arc<FileTexture>>>,
}

impl FileResources {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            textures: Mutex::new(HashMap::new()),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Number of distinct textures loaded so far
    pub fn cached_textures(&self) -> usize {
        self.textures.lock().len()
    }
}

impl ResourceProvider for FileResources {
    fn file_exists(&self, path: &str) -> bool {
        self.resolve(path).is_file()
    }

    fn texture(&self, path: &str) -> Option<Arc<dyn Texture>> {
        let mut textures = self.textures.lock();
        if let Some(texture) = textures.get(path) {
            return Some(Arc::clone(texture) as Arc<dyn Texture>);
        }

        let full_path = self.resolve(path);
        if !full_path.is_file() {
            debug!("Texture not found: {}", full_path.display());
            return None;
        }

        // Vector sources have no readable header; they stay zero-sized
        let size = match image::image_dimensions(&full_path) {
            Ok((width, height)) => Size::new(width as f32, height as f32),
            Err(e) => {
                debug!("Cannot read image size of {}: {}", full_path.display(), e);
                Size::ZERO
            }
        };

        let texture = Arc::new(FileTexture {
            path: path.to_string(),
            size,
        });
        textures.insert(path.to_string(), Arc::clone(&texture));
        Some(texture)
    }

    fn font(&self, path: Option<&str>, size: f32) -> Option<Arc<dyn Font>> {
        if let Some(path) = path {
            if !self.file_exists(path) {
                debug!("Font not found, using default face: {}", path);
            }
        }
        Some(Arc::new(EstimatedFont::new(size)))
    }
}
