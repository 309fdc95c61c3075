//! Row geometry for the activity strip
//!
//! Pure functions and value types used by the widget's two-pass layout:
//! items are measured against a common row height first, then placed
//! left-to-right from an alignment-dependent starting x.

use serde::Serialize;

/// 2D point / offset in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl std::ops::Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// Width/height pair in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size { width: 0.0, height: 0.0 };

    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True if either axis is zero (or negative)
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn from_origin_size(origin: Vec2, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    /// True if the two rectangles overlap with a non-empty area
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

/// Horizontal alignment of the item row inside the widget bounds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HorizontalAlignment {
    #[default]
    Left,
    Center,
    Right,
}

impl HorizontalAlignment {
    /// Parse a theme alignment string
    ///
    /// `"left"` and `"right"` are recognized; anything else centers.
    pub fn from_theme_str(value: &str) -> Self {
        match value {
            "left" => Self::Left,
            "right" => Self::Right,
            _ => Self::Center,
        }
    }

    /// Starting x of a row of `content_width` inside `row_width`
    pub fn start_x(self, row_width: f32, content_width: f32) -> f32 {
        match self {
            Self::Left => 0.0,
            Self::Center => row_width / 2.0 - content_width / 2.0,
            Self::Right => row_width - content_width,
        }
    }
}

/// Fit an image of `native` size into `bounds`, preserving aspect ratio
///
/// The tighter axis determines the common scale. Width is rounded and
/// height is rounded then clamped to the box height. A zero-sized source
/// yields [`Size::ZERO`].
pub fn scale_image_to_box(native: Size, bounds: Size) -> Size {
    if native.is_empty() || bounds.is_empty() {
        return Size::ZERO;
    }

    let scale_x = bounds.width / native.width;
    let scale_y = bounds.height / native.height;
    let scale = scale_x.min(scale_y);

    Size::new(
        (native.width * scale).round(),
        (native.height * scale).round().min(bounds.height),
    )
}

/// What a row item represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemKind {
    /// Controller icon for the activity record at `slot`
    Controller { slot: usize },
    Network,
    BatteryIcon,
    BatteryText,
}

/// A measured row item, recomputed every frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderItem {
    pub kind: ItemKind,
    pub size: Size,
    pub color: u32,
}

impl RenderItem {
    pub fn new(kind: ItemKind, size: Size, color: u32) -> Self {
        Self { kind, size, color }
    }
}

/// An item with its final position inside the widget
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedItem {
    pub item: RenderItem,
    /// Bounds relative to the widget origin, vertically centered in the row
    pub bounds: Rect,
}

/// Result of the measure and placement passes for one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowLayout {
    pub content_width: f32,
    pub start_x: f32,
    pub items: Vec<PlacedItem>,
}

impl RowLayout {
    /// Measure `items` and place them inside a row of `row_size`
    ///
    /// Zero-width items are dropped before measuring, so they neither add
    /// width nor consume a spacing gap. Spacing is inserted between
    /// consecutive items only, never after the last one.
    pub fn compute(
        items: impl IntoIterator<Item = RenderItem>,
        row_size: Size,
        spacing: f32,
        alignment: HorizontalAlignment,
    ) -> Self {
        let items: Vec<RenderItem> = items
            .into_iter()
            .filter(|item| item.size.width > 0.0)
            .collect();

        if items.is_empty() {
            return Self::default();
        }

        let content_width = items.iter().map(|item| item.size.width).sum::<f32>()
            + spacing * (items.len() - 1) as f32;

        let start_x = alignment.start_x(row_size.width, content_width);

        let mut cursor = start_x;
        let placed = items
            .into_iter()
            .map(|item| {
                let top = row_size.height / 2.0 - item.size.height / 2.0;
                let bounds = Rect::new(cursor, top, item.size.width, item.size.height);
                cursor += item.size.width + spacing;
                PlacedItem { item, bounds }
            })
            .collect();

        Self {
            content_width,
            start_x,
            items: placed,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
