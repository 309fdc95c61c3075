//! Theme property bag and widget binding
//!
//! Themes are YAML documents of `views -> elements -> properties`. The
//! widget's element is resolved once per theme application into a
//! [`ThemeBinding`]; path-valued properties are only honored when the
//! resource they point to exists.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::activity::MAX_PLAYERS;
use crate::battery::{BatteryIconSet, BatteryTier};
use crate::config::ScreenMetrics;
use crate::error::ThemeError;
use crate::layout::{HorizontalAlignment, Size, Vec2};
use crate::render::{Color, ResourceProvider};

/// Default tint for idle items
pub const DEFAULT_COLOR: Color = 0xFFFFFF99;
/// Default tint for a slot with ordinary activity
pub const DEFAULT_ACTIVITY_COLOR: Color = 0xFF000066;
/// Default tint for a slot with hotkey activity
pub const DEFAULT_HOTKEY_COLOR: Color = 0x0000FF66;

/// A single theme property value
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ThemeValue {
    Integer(u64),
    Float(f64),
    Text(String),
    Pair([f64; 2]),
}

/// Properties of one theme element
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ThemeElement {
    properties: HashMap<String, ThemeValue>,
}

impl ThemeElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: ThemeValue) -> Self {
        self.properties.insert(name.to_string(), value);
        self
    }

    pub fn has(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ThemeValue> {
        self.properties.get(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            ThemeValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Color as packed RGBA
    ///
    /// Colors are hex (`FFFFFF99`, `0xFFFFFF99`, `#FFFFFF`); six-digit hex
    /// gets full alpha. YAML reads an all-digit color such as `11223344` as
    /// an integer, so integers are parsed from their digits as hex. Leading
    /// zeros are lost that way and such colors must be quoted.
    pub fn color(&self, name: &str) -> Option<Color> {
        match self.get(name)? {
            ThemeValue::Integer(value) => parse_hex_color(&value.to_string()),
            ThemeValue::Text(text) => parse_hex_color(text),
            other => {
                debug!("Theme color '{}' is not hex text: {:?}", name, other);
                None
            }
        }
    }

    pub fn float(&self, name: &str) -> Option<f32> {
        match self.get(name)? {
            ThemeValue::Integer(value) => Some(*value as f32),
            ThemeValue::Float(value) => Some(*value as f32),
            _ => None,
        }
    }

    pub fn pair(&self, name: &str) -> Option<Vec2> {
        match self.get(name)? {
            ThemeValue::Pair([x, y]) => Some(Vec2::new(*x as f32, *y as f32)),
            _ => None,
        }
    }

    /// Path-valued property, only if the resource exists
    fn existing_path(&self, name: &str, resources: &dyn ResourceProvider) -> Option<String> {
        let path = self.text(name)?;
        if resources.file_exists(path) {
            Some(path.to_string())
        } else {
            debug!("Theme property '{}' points to missing resource: {}", name, path);
            None
        }
    }
}

fn parse_hex_color(text: &str) -> Option<Color> {
    let hex = text
        .trim()
        .trim_start_matches('#')
        .trim_start_matches("0x")
        .trim_start_matches("0X");

    match hex.len() {
        6 => Color::from_str_radix(hex, 16).ok().map(|rgb| (rgb << 8) | 0xFF),
        8 => Color::from_str_radix(hex, 16).ok(),
        _ => None,
    }
}

/// A parsed theme file
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ThemeDocument {
    #[serde(default)]
    pub views: HashMap<String, HashMap<String, ThemeElement>>,
}

impl ThemeDocument {
    pub fn from_yaml(contents: &str) -> Result<Self, ThemeError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Load a theme file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ThemeError> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ThemeError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_yaml(&contents)
    }

    pub fn element(&self, view: &str, element: &str) -> Option<&ThemeElement> {
        self.views.get(view)?.get(element)
    }

    pub fn require_element(&self, view: &str, element: &str) -> Result<&ThemeElement, ThemeError> {
        self.element(view, element)
            .ok_or_else(|| ThemeError::MissingElement {
                view: view.to_string(),
                element: element.to_string(),
            })
    }
}

/// Which property groups a theme application reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeProperties {
    pub paths: bool,
    pub colors: bool,
    pub alignment: bool,
    pub geometry: bool,
}

impl ThemeProperties {
    pub const ALL: ThemeProperties = ThemeProperties {
        paths: true,
        colors: true,
        alignment: true,
        geometry: true,
    };
}

impl Default for ThemeProperties {
    fn default() -> Self {
        Self::ALL
    }
}

/// Optional parts of the strip the theme turned on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityView {
    pub controllers: bool,
    pub network: bool,
    pub battery: bool,
}

impl Default for ActivityView {
    fn default() -> Self {
        Self {
            controllers: true,
            network: false,
            battery: false,
        }
    }
}

/// Resolved theme state for the widget
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeBinding {
    pub controller_icon: Option<String>,
    pub network_icon: Option<String>,
    pub battery_icons: BatteryIconSet,
    pub color: Color,
    pub activity_color: Color,
    pub hotkey_color: Color,
    pub spacing: f32,
    pub alignment: HorizontalAlignment,
    pub view: ActivityView,
    pub position: Vec2,
    pub size: Size,
}

impl ThemeBinding {
    /// Binding used before any theme is applied
    pub fn defaults(screen: ScreenMetrics) -> Self {
        let spacing = (screen.height / 200.0).trunc();
        let item_size = screen.height / 100.0;
        let size = Size::new(
            item_size * MAX_PLAYERS as f32 + spacing * (MAX_PLAYERS - 1) as f32,
            item_size,
        );
        let margin = (screen.height / 280.0).trunc();

        Self {
            controller_icon: None,
            network_icon: None,
            battery_icons: BatteryIconSet::new(),
            color: DEFAULT_COLOR,
            activity_color: DEFAULT_ACTIVITY_COLOR,
            hotkey_color: DEFAULT_HOTKEY_COLOR,
            spacing,
            alignment: HorizontalAlignment::Left,
            view: ActivityView::default(),
            position: Vec2::new(margin, screen.height - size.height - margin),
            size,
        }
    }

    /// Resolve `element` on top of the defaults
    pub fn resolve(
        element: &ThemeElement,
        properties: ThemeProperties,
        screen: ScreenMetrics,
        resources: &dyn ResourceProvider,
    ) -> Self {
        let mut binding = Self::defaults(screen);

        if properties.geometry {
            if let Some(pos) = element.pair("pos") {
                binding.position = Vec2::new(pos.x * screen.width, pos.y * screen.height);
            }
            if let Some(size) = element.pair("size") {
                binding.size = Size::new(size.x * screen.width, size.y * screen.height);
            }
        }

        if properties.paths {
            binding.controller_icon = element.existing_path("imagePath", resources);

            binding.network_icon = element.existing_path("networkIcon", resources);
            binding.view.network = binding.network_icon.is_some();

            for tier in BatteryTier::ALL {
                if let Some(path) = element.existing_path(tier.theme_property(), resources) {
                    binding.battery_icons.set(tier, path);
                }
            }
            binding.view.battery = binding.battery_icons.get(BatteryTier::Charging).is_some();
        }

        if properties.colors {
            if let Some(color) = element.color("color") {
                binding.color = color;
            }
            if let Some(color) = element.color("activityColor") {
                binding.activity_color = color;
            }
            if let Some(color) = element.color("hotkeyColor") {
                binding.hotkey_color = color;
            }
            if let Some(spacing) = element.float("itemSpacing") {
                binding.spacing = spacing * screen.width;
            }
        }

        if properties.alignment {
            if let Some(alignment) = element.text("horizontalAlignment") {
                binding.alignment = HorizontalAlignment::from_theme_str(alignment);
            }
        }

        debug!(
            "Theme bound: controllers={} network={} battery={} alignment={:?} spacing={}",
            binding.controller_icon.is_some(),
            binding.view.network,
            binding.view.battery,
            binding.alignment,
            binding.spacing
        );

        binding
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockResources;

    const SCREEN: ScreenMetrics = ScreenMetrics {
        width: 1280.0,
        height: 720.0,
    };

    fn text(value: &str) -> ThemeValue {
        ThemeValue::Text(value.to_string())
    }

    fn resources() -> MockResources {
        MockResources::new()
            .with_image("pad.svg", Size::new(32.0, 32.0))
            .with_image("wifi.svg", Size::new(32.0, 32.0))
            .with_image("incharge.svg", Size::new(48.0, 24.0))
            .with_image("full.svg", Size::new(48.0, 24.0))
    }

    #[test]
    fn test_defaults_geometry() {
        let binding = ThemeBinding::defaults(SCREEN);
        assert_eq!(binding.spacing, 3.0);
        assert_eq!(binding.size, Size::new(7.2 * 8.0 + 3.0 * 7.0, 7.2));
        assert_eq!(binding.position.x, 2.0);
        assert_eq!(binding.alignment, HorizontalAlignment::Left);
        assert_eq!(binding.view, ActivityView::default());
    }

    #[test]
    fn test_missing_resources_disable_features() {
        let element = ThemeElement::new()
            .with("imagePath", text("missing.svg"))
            .with("networkIcon", text("missing-wifi.svg"))
            .with("incharge", text("missing-charge.svg"))
            .with("full", text("full.svg"));

        let binding = ThemeBinding::resolve(&element, ThemeProperties::ALL, SCREEN, &resources());

        assert_eq!(binding.controller_icon, None);
        assert!(!binding.view.network);
        assert!(!binding.view.battery);
        // Level icons are still recorded, the feature is just off
        assert_eq!(binding.battery_icons.get(BatteryTier::Full), Some("full.svg"));
    }

    #[test]
    fn test_full_binding() {
        let element = ThemeElement::new()
            .with("imagePath", text("pad.svg"))
            .with("networkIcon", text("wifi.svg"))
            .with("incharge", text("incharge.svg"))
            .with("full", text("full.svg"))
            .with("color", text("FFFFFFFF"))
            .with("activityColor", text("0x00FF00FF"))
            .with("hotkeyColor", text("#FF0000"))
            .with("itemSpacing", ThemeValue::Float(0.005))
            .with("horizontalAlignment", text("right"))
            .with("pos", ThemeValue::Pair([0.5, 0.9]))
            .with("size", ThemeValue::Pair([0.25, 0.05]));

        let binding = ThemeBinding::resolve(&element, ThemeProperties::ALL, SCREEN, &resources());

        assert_eq!(binding.controller_icon.as_deref(), Some("pad.svg"));
        assert_eq!(binding.network_icon.as_deref(), Some("wifi.svg"));
        assert_eq!(
            binding.view,
            ActivityView {
                controllers: true,
                network: true,
                battery: true
            }
        );
        assert_eq!(binding.color, 0xFFFFFFFF);
        assert_eq!(binding.activity_color, 0x00FF00FF);
        assert_eq!(binding.hotkey_color, 0xFF0000FF);
        assert_eq!(binding.spacing, 0.005 * 1280.0);
        assert_eq!(binding.alignment, HorizontalAlignment::Right);
        assert_eq!(binding.position, Vec2::new(640.0, 648.0));
        assert_eq!(binding.size, Size::new(320.0, 36.0));
    }

    #[test]
    fn test_property_groups_respected() {
        let element = ThemeElement::new()
            .with("imagePath", text("pad.svg"))
            .with("color", text("FFFFFFFF"))
            .with("horizontalAlignment", text("center"));

        let properties = ThemeProperties {
            paths: false,
            colors: false,
            alignment: true,
            geometry: false,
        };
        let binding = ThemeBinding::resolve(&element, properties, SCREEN, &resources());

        assert_eq!(binding.controller_icon, None);
        assert_eq!(binding.color, DEFAULT_COLOR);
        assert_eq!(binding.alignment, HorizontalAlignment::Center);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let element = ThemeElement::new()
            .with("imagePath", text("pad.svg"))
            .with("incharge", text("incharge.svg"));
        let resources = resources();

        let first = ThemeBinding::resolve(&element, ThemeProperties::ALL, SCREEN, &resources);
        let second = ThemeBinding::resolve(&element, ThemeProperties::ALL, SCREEN, &resources);
        assert_eq!(first, second);
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("FFFFFF99"), Some(0xFFFFFF99));
        assert_eq!(parse_hex_color("0x0000FF66"), Some(0x0000FF66));
        assert_eq!(parse_hex_color("#102030"), Some(0x102030FF));
        assert_eq!(parse_hex_color("nope"), None);
        assert_eq!(parse_hex_color("GGGGGGGG"), None);
    }

    #[test]
    fn test_all_digit_colors_read_as_hex() {
        let yaml = r#"
views:
  system:
    controllerActivity:
      color: 11223344
      activityColor: 1E000066
      hotkeyColor: 112233
      quoted: "00000066"
"#;
        let document = ThemeDocument::from_yaml(yaml).unwrap();
        let element = document.require_element("system", "controllerActivity").unwrap();

        assert_eq!(element.color("color"), Some(0x11223344));
        assert_eq!(element.color("hotkeyColor"), Some(0x112233FF));
        assert_eq!(element.color("quoted"), Some(0x00000066));
        // Exponent-looking hex parses as a float and is rejected
        assert_eq!(element.color("activityColor"), None);

        let binding = ThemeBinding::resolve(element, ThemeProperties::ALL, SCREEN, &resources());
        assert_eq!(binding.color, 0x11223344);
        assert_eq!(binding.activity_color, DEFAULT_ACTIVITY_COLOR);
    }

    #[test]
    fn test_document_from_yaml() {
        let yaml = r#"
views:
  system:
    controllerActivity:
      imagePath: pad.svg
      color: FFFFFF99
      itemSpacing: 0.002
      pos: [0.01, 0.95]
"#;
        let document = ThemeDocument::from_yaml(yaml).unwrap();
        let element = document.require_element("system", "controllerActivity").unwrap();

        assert_eq!(element.text("imagePath"), Some("pad.svg"));
        assert_eq!(element.color("color"), Some(0xFFFFFF99));
        assert_eq!(element.float("itemSpacing"), Some(0.002));
        assert_eq!(element.pair("pos"), Some(Vec2::new(0.01, 0.95)));

        assert!(matches!(
            document.require_element("gamelist", "controllerActivity"),
            Err(ThemeError::MissingElement { .. })
        ));
    }
}
