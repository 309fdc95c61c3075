//! Rendering and resource contracts
//!
//! Texture decoding, font rasterization and the actual draw backend are
//! provided by the host frontend. The widget only needs the handful of
//! operations below. [`RecordingRenderer`] is a headless backend that
//! records draw calls, used by the demo binary and the tests.

use std::sync::Arc;

use serde::Serialize;

use crate::layout::{Rect, Size, Vec2};

/// Packed 0xRRGGBBAA color
pub type Color = u32;

/// A loaded image resource
pub trait Texture: Send + Sync {
    /// Path the texture was loaded from
    fn path(&self) -> &str;

    /// Native size of the source image (zero when unknown or unreadable)
    fn source_size(&self) -> Size;

    /// Make the texture current for drawing; false if it cannot be used
    fn bind(&self) -> bool {
        true
    }

    /// Re-rasterize vector sources at the given pixel size
    fn rasterize_at(&self, _width: u32, _height: u32) {}
}

/// A font face at a fixed pixel size
pub trait Font: Send + Sync {
    fn size(&self) -> f32;

    /// Rendered extent of `text`
    fn size_text(&self, text: &str) -> Size;
}

/// Pre-laid-out text, rebuilt only when its content changes
#[derive(Debug, Clone, PartialEq)]
pub struct TextCache {
    pub text: String,
    pub size: Size,
    pub color: Color,
}

impl TextCache {
    pub fn build(font: &dyn Font, text: impl Into<String>, color: Color) -> Self {
        let text = text.into();
        let size = font.size_text(&text);
        Self { text, size, color }
    }
}

/// Source of textures and fonts
pub trait ResourceProvider: Send + Sync {
    /// Whether a resource path refers to something that exists
    fn file_exists(&self, path: &str) -> bool;

    /// Load (or fetch from cache) the texture at `path`
    fn texture(&self, path: &str) -> Option<Arc<dyn Texture>>;

    /// Load a font face; `None` path selects the default face
    fn font(&self, path: Option<&str>, size: f32) -> Option<Arc<dyn Font>>;
}

/// Draw backend
///
/// Coordinates passed to the draw methods are relative to the origin last
/// set with [`Renderer::set_origin`].
pub trait Renderer {
    /// Whether a screen-space rectangle is at least partly on screen
    fn is_visible_on_screen(&self, bounds: Rect) -> bool;

    fn set_origin(&mut self, origin: Vec2);

    fn draw_rect(&mut self, rect: Rect, color: Color);

    fn draw_texture(&mut self, texture: &dyn Texture, rect: Rect, color: Color);

    fn draw_text(&mut self, font: &dyn Font, text: &TextCache, position: Vec2);
}

/// A recorded draw call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Rect {
        rect: Rect,
        color: Color,
    },
    Texture {
        path: String,
        rect: Rect,
        color: Color,
    },
    Text {
        text: String,
        font_size: f32,
        position: Vec2,
        color: Color,
    },
}

/// Headless renderer that records every draw call in screen space
#[derive(Debug, Clone)]
pub struct RecordingRenderer {
    viewport: Rect,
    origin: Vec2,
    commands: Vec<DrawCommand>,
}

impl RecordingRenderer {
    pub fn new(viewport: Size) -> Self {
        Self {
            viewport: Rect::from_origin_size(Vec2::ZERO, viewport),
            origin: Vec2::ZERO,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Take the recorded commands, leaving the recorder empty
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    fn to_screen(&self, rect: Rect) -> Rect {
        Rect::new(rect.x + self.origin.x, rect.y + self.origin.y, rect.width, rect.height)
    }
}

impl Renderer for RecordingRenderer {
    fn is_visible_on_screen(&self, bounds: Rect) -> bool {
        bounds.intersects(&self.viewport)
    }

    fn set_origin(&mut self, origin: Vec2) {
        self.origin = origin;
    }

    fn draw_rect(&mut self, rect: Rect, color: Color) {
        let rect = self.to_screen(rect);
        self.commands.push(DrawCommand::Rect { rect, color });
    }

    fn draw_texture(&mut self, texture: &dyn Texture, rect: Rect, color: Color) {
        let rect = self.to_screen(rect);
        self.commands.push(DrawCommand::Texture {
            path: texture.path().to_string(),
            rect,
            color,
        });
    }

    fn draw_text(&mut self, font: &dyn Font, text: &TextCache, position: Vec2) {
        self.commands.push(DrawCommand::Text {
            text: text.text.clone(),
            font_size: font.size(),
            position: position + self.origin,
            color: text.color,
        });
    }
}
