//! Battery icon resolution
//!
//! Maps a battery snapshot onto one of six theme icon tiers and memoizes
//! the loaded icon and percentage text so they are only rebuilt when what
//! they show actually changes.

use std::sync::Arc;

use tracing::debug;

use crate::render::{Color, Font, ResourceProvider, TextCache, Texture};
use crate::status::BatterySnapshot;

/// Battery icon bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatteryTier {
    Charging,
    /// Above 75%
    Full,
    /// Above 50%
    ThreeQuarter,
    /// Above 25%
    Half,
    /// Above 5%
    Quarter,
    Empty,
}

impl BatteryTier {
    pub const ALL: [BatteryTier; 6] = [
        BatteryTier::Charging,
        BatteryTier::Full,
        BatteryTier::ThreeQuarter,
        BatteryTier::Half,
        BatteryTier::Quarter,
        BatteryTier::Empty,
    ];

    /// Theme property naming this tier's icon
    pub fn theme_property(self) -> &'static str {
        match self {
            BatteryTier::Charging => "incharge",
            BatteryTier::Full => "full",
            BatteryTier::ThreeQuarter => "at75",
            BatteryTier::Half => "at50",
            BatteryTier::Quarter => "at25",
            BatteryTier::Empty => "empty",
        }
    }

    /// Level tier for a charge percentage, ignoring charging state
    pub fn for_level(level_percent: u8) -> Self {
        match level_percent {
            76.. => BatteryTier::Full,
            51..=75 => BatteryTier::ThreeQuarter,
            26..=50 => BatteryTier::Half,
            6..=25 => BatteryTier::Quarter,
            _ => BatteryTier::Empty,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Icon paths per tier, resolved once when the theme is applied
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatteryIconSet {
    icons: [Option<String>; 6],
}

impl BatteryIconSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, tier: BatteryTier, path: impl Into<String>) -> Self {
        self.set(tier, path);
        self
    }

    pub fn set(&mut self, tier: BatteryTier, path: impl Into<String>) {
        self.icons[tier.index()] = Some(path.into());
    }

    pub fn get(&self, tier: BatteryTier) -> Option<&str> {
        self.icons[tier.index()].as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.iter().all(Option::is_none)
    }

    /// Tier to display for `battery`
    ///
    /// Charging wins only when the theme supplies a charging icon; the
    /// level tiers never fall through to a neighbour when their own icon
    /// is missing.
    pub fn resolve_tier(&self, battery: &BatterySnapshot) -> BatteryTier {
        if battery.is_charging && self.get(BatteryTier::Charging).is_some() {
            BatteryTier::Charging
        } else {
            BatteryTier::for_level(battery.level_percent)
        }
    }

    /// Icon path to display for `battery`, `None` if there is no battery
    /// or the matched tier has no icon
    pub fn resolve(&self, battery: &BatterySnapshot) -> Option<&str> {
        if !battery.has_battery {
            return None;
        }
        self.get(self.resolve_tier(battery))
    }
}

/// Currently displayed battery icon, reloaded only when its path changes
#[derive(Default)]
pub struct BatteryIcon {
    current: Option<String>,
    texture: Option<Arc<dyn Texture>>,
}

impl BatteryIcon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-resolve the icon for `battery`
    ///
    /// Returns true if a different icon was selected. Without a battery
    /// the icon is cleared.
    pub fn update(
        &mut self,
        battery: &BatterySnapshot,
        icons: &BatteryIconSet,
        resources: &dyn ResourceProvider,
    ) -> bool {
        let resolved = icons.resolve(battery);
        if resolved == self.current.as_deref() {
            return false;
        }

        debug!("Battery icon: {:?} -> {:?}", self.current, resolved);
        self.current = resolved.map(str::to_string);
        self.texture = resolved.and_then(|path| resources.texture(path));
        true
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn texture(&self) -> Option<&Arc<dyn Texture>> {
        self.texture.as_ref()
    }

    pub fn reset(&mut self) {
        self.current = None;
        self.texture = None;
    }
}

/// Cached render of the battery percentage text
#[derive(Debug, Default)]
pub struct BatteryLabel {
    cache: Option<Arc<TextCache>>,
    dirty: bool,
}

impl BatteryLabel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force a rebuild on next use
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    /// Cached text for `text`, rebuilt if invalidated or the content differs
    pub fn get_or_build(&mut self, font: &dyn Font, text: &str, color: Color) -> Arc<TextCache> {
        match &self.cache {
            Some(cache) if !self.dirty && cache.text == text && cache.color == color => {
                Arc::clone(cache)
            }
            _ => {
                let cache = Arc::new(TextCache::build(font, text, color));
                self.cache = Some(Arc::clone(&cache));
                self.dirty = false;
                cache
            }
        }
    }

    /// Current cache, without building
    pub fn cached(&self) -> Option<&Arc<TextCache>> {
        self.cache.as_ref()
    }

    pub fn reset(&mut self) {
        self.cache = None;
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Size;
    use crate::testing::{MockFont, MockResources};

    fn full_set() -> BatteryIconSet {
        BatteryTier::ALL
            .iter()
            .fold(BatteryIconSet::new(), |set, tier| {
                set.with(*tier, format!("{}.svg", tier.theme_property()))
            })
    }

    #[test]
    fn test_tier_precedence() {
        let icons = full_set();
        let tier = |battery: BatterySnapshot| icons.resolve_tier(&battery);

        assert_eq!(tier(BatterySnapshot::discharging(80)), BatteryTier::Full);
        assert_eq!(tier(BatterySnapshot::discharging(60)), BatteryTier::ThreeQuarter);
        assert_eq!(tier(BatterySnapshot::discharging(30)), BatteryTier::Half);
        assert_eq!(tier(BatterySnapshot::discharging(10)), BatteryTier::Quarter);
        assert_eq!(tier(BatterySnapshot::discharging(3)), BatteryTier::Empty);
        assert_eq!(tier(BatterySnapshot::charging(80)), BatteryTier::Charging);
        assert_eq!(tier(BatterySnapshot::charging(3)), BatteryTier::Charging);
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(BatteryTier::for_level(100), BatteryTier::Full);
        assert_eq!(BatteryTier::for_level(76), BatteryTier::Full);
        assert_eq!(BatteryTier::for_level(75), BatteryTier::ThreeQuarter);
        assert_eq!(BatteryTier::for_level(51), BatteryTier::ThreeQuarter);
        assert_eq!(BatteryTier::for_level(50), BatteryTier::Half);
        assert_eq!(BatteryTier::for_level(26), BatteryTier::Half);
        assert_eq!(BatteryTier::for_level(25), BatteryTier::Quarter);
        assert_eq!(BatteryTier::for_level(6), BatteryTier::Quarter);
        assert_eq!(BatteryTier::for_level(5), BatteryTier::Empty);
        assert_eq!(BatteryTier::for_level(0), BatteryTier::Empty);
    }

    #[test]
    fn test_charging_without_icon_uses_level() {
        let icons = BatteryIconSet::new().with(BatteryTier::Full, "full.svg");
        assert_eq!(
            icons.resolve_tier(&BatterySnapshot::charging(90)),
            BatteryTier::Full
        );
    }

    #[test]
    fn test_missing_tier_icon_does_not_fall_through() {
        let icons = BatteryIconSet::new()
            .with(BatteryTier::Full, "full.svg")
            .with(BatteryTier::Half, "at50.svg");

        // 60% matches the three-quarter tier, which has no icon
        assert_eq!(icons.resolve(&BatterySnapshot::discharging(60)), None);
        assert_eq!(icons.resolve(&BatterySnapshot::discharging(40)), Some("at50.svg"));
    }

    #[test]
    fn test_no_battery_resolves_nothing() {
        let icons = full_set();
        assert_eq!(icons.resolve(&BatterySnapshot::default()), None);
    }

    #[test]
    fn test_icon_reloads_only_on_path_change() {
        let resources = MockResources::new()
            .with_image("full.svg", Size::new(32.0, 16.0))
            .with_image("at75.svg", Size::new(32.0, 16.0));
        let icons = BatteryIconSet::new()
            .with(BatteryTier::Full, "full.svg")
            .with(BatteryTier::ThreeQuarter, "at75.svg");
        let mut icon = BatteryIcon::new();

        assert!(icon.update(&BatterySnapshot::discharging(90), &icons, &resources));
        assert_eq!(icon.current(), Some("full.svg"));
        assert_eq!(resources.texture_loads(), 1);

        // Same tier, different level
        assert!(!icon.update(&BatterySnapshot::discharging(80), &icons, &resources));
        assert_eq!(resources.texture_loads(), 1);

        assert!(icon.update(&BatterySnapshot::discharging(70), &icons, &resources));
        assert_eq!(icon.current(), Some("at75.svg"));
        assert_eq!(resources.texture_loads(), 2);
    }

    #[test]
    fn test_icon_cleared_for_blank_tier() {
        let resources = MockResources::new().with_image("full.svg", Size::new(32.0, 16.0));
        let icons = BatteryIconSet::new().with(BatteryTier::Full, "full.svg");
        let mut icon = BatteryIcon::new();

        icon.update(&BatterySnapshot::discharging(90), &icons, &resources);
        assert!(icon.texture().is_some());

        assert!(icon.update(&BatterySnapshot::discharging(20), &icons, &resources));
        assert_eq!(icon.current(), None);
        assert!(icon.texture().is_none());
    }

    #[test]
    fn test_icon_cleared_when_battery_removed() {
        let resources = MockResources::new().with_image("full.svg", Size::new(32.0, 16.0));
        let icons = BatteryIconSet::new().with(BatteryTier::Full, "full.svg");
        let mut icon = BatteryIcon::new();

        icon.update(&BatterySnapshot::discharging(90), &icons, &resources);
        assert_eq!(icon.current(), Some("full.svg"));

        assert!(icon.update(&BatterySnapshot::default(), &icons, &resources));
        assert_eq!(icon.current(), None);
        assert!(icon.texture().is_none());

        // Already blank
        assert!(!icon.update(&BatterySnapshot::default(), &icons, &resources));
    }

    #[test]
    fn test_label_memoization() {
        let font = MockFont::new(12.0);
        let mut label = BatteryLabel::new();

        let first = label.get_or_build(&font, "80%", 0xFFFFFFFF);
        let again = label.get_or_build(&font, "80%", 0xFFFFFFFF);
        assert!(Arc::ptr_eq(&first, &again));

        label.invalidate();
        let rebuilt = label.get_or_build(&font, "80%", 0xFFFFFFFF);
        assert!(!Arc::ptr_eq(&first, &rebuilt));

        let changed = label.get_or_build(&font, "79%", 0xFFFFFFFF);
        assert_eq!(changed.text, "79%");
    }
}
