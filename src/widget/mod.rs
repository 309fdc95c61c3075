//! Controller activity widget
//!
//! Ties the activity tracker, status pollers, battery icon resolver and
//! row layout together behind the component lifecycle the frontend drives:
//! `apply_theme`, `input`, `update` and `render`.
//!
//! All collaborators (settings, resources, status probe, player mapping)
//! are injected; the widget looks nothing up globally.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::activity::{ActivityKind, ActivityTracker};
use crate::battery::{BatteryIcon, BatteryLabel};
use crate::config::{AppConfig, ScreenMetrics, Settings, TimingConfig};
use crate::input::{InputEvent, PlayerMapping};
use crate::layout::{scale_image_to_box, ItemKind, Rect, RenderItem, RowLayout, Size, Vec2};
use crate::render::{Color, Font, Renderer, ResourceProvider, TextCache, Texture};
use crate::status::{BatteryChange, BatterySnapshot, NetworkSnapshot, StatusPollers, StatusProbe};
use crate::theme::{ThemeBinding, ThemeElement, ThemeProperties};

/// Outline color used when `debug_image` is on
pub const DEBUG_OUTLINE_COLOR: Color = 0xFFFF0090;

/// Battery text height relative to the row height
pub const BATTERY_TEXT_SCALE: f32 = 0.66;

/// Construction-time options
#[derive(Debug, Clone)]
pub struct WidgetOptions {
    pub screen: ScreenMetrics,
    pub settings: Settings,
    pub timing: TimingConfig,
    /// Font path for the battery percentage text
    pub small_font: Option<String>,
}

impl WidgetOptions {
    pub fn new(screen: ScreenMetrics) -> Self {
        Self {
            screen,
            settings: Settings::default(),
            timing: TimingConfig::default(),
            small_font: None,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            screen: config.screen,
            settings: config.settings,
            timing: config.timing,
            small_font: config.fonts.small_text.clone(),
        }
    }
}

/// On-screen strip showing controller activity, network and battery state
pub struct ControllerActivity {
    options: WidgetOptions,
    resources: Arc<dyn ResourceProvider>,
    probe: Arc<dyn StatusProbe>,

    binding: ThemeBinding,
    tracker: ActivityTracker,
    pollers: StatusPollers,

    pad_texture: Option<Arc<dyn Texture>>,
    network_texture: Option<Arc<dyn Texture>>,
    battery_icon: BatteryIcon,
    battery_label: BatteryLabel,
    battery_font: Option<Arc<dyn Font>>,

    visible: bool,
}

impl ControllerActivity {
    /// Create the widget with default theme values and poll status once
    pub fn new(
        options: WidgetOptions,
        resources: Arc<dyn ResourceProvider>,
        probe: Arc<dyn StatusProbe>,
    ) -> Self {
        let binding = ThemeBinding::defaults(options.screen);
        let tracker = ActivityTracker::new(options.timing.pad_timeout_ms);
        let pollers = StatusPollers::new(
            options.timing.network_interval_ms,
            options.timing.battery_interval_ms,
        );

        let mut widget = Self {
            options,
            resources,
            probe,
            binding,
            tracker,
            pollers,
            pad_texture: None,
            network_texture: None,
            battery_icon: BatteryIcon::new(),
            battery_label: BatteryLabel::new(),
            battery_font: None,
            visible: true,
        };
        widget.poll_now();
        widget
    }

    /// Return to the unthemed initial state and poll status immediately
    pub fn reset(&mut self) {
        self.reset_state();
        self.poll_now();
    }

    fn reset_state(&mut self) {
        let timing = self.options.timing;

        self.binding = ThemeBinding::defaults(self.options.screen);
        self.tracker = ActivityTracker::new(timing.pad_timeout_ms);
        self.pollers = StatusPollers::new(timing.network_interval_ms, timing.battery_interval_ms);
        self.pad_texture = None;
        self.network_texture = None;
        self.battery_icon.reset();
        self.battery_label.reset();
        self.battery_font = None;
    }

    /// Reset and bind to a theme element
    ///
    /// Applying the same element twice yields the same state.
    pub fn apply_theme(&mut self, element: &ThemeElement, properties: ThemeProperties) {
        self.reset_state();

        self.binding = ThemeBinding::resolve(
            element,
            properties,
            self.options.screen,
            self.resources.as_ref(),
        );
        self.pad_texture = self
            .binding
            .controller_icon
            .as_deref()
            .and_then(|path| self.resources.texture(path));
        self.network_texture = self
            .binding
            .network_icon
            .as_deref()
            .and_then(|path| self.resources.texture(path));

        debug!(
            "Theme applied: pad_texture={} network_texture={}",
            self.pad_texture.is_some(),
            self.network_texture.is_some()
        );

        self.on_size_changed();
        self.poll_now();
    }

    /// Poll network and battery right away, restarting both throttles
    ///
    /// The network is queried even before a theme enables its icon.
    fn poll_now(&mut self) {
        let network_enabled = self.options.settings.show_network_indicator;
        let battery_enabled = self.battery_enabled();

        self.pollers.poll_network(self.probe.as_ref(), network_enabled);
        let change = self.pollers.poll_battery(self.probe.as_ref(), battery_enabled);
        self.apply_battery_change(change);
    }

    fn battery_enabled(&self) -> bool {
        self.binding.view.battery && self.options.settings.show_battery_indicator
    }

    fn apply_battery_change(&mut self, change: BatteryChange) {
        if change.is_unchanged() {
            return;
        }

        if change.level_changed {
            self.battery_label.invalidate();
        }

        let battery = self.pollers.battery();
        self.battery_icon.update(
            &battery,
            &self.binding.battery_icons,
            self.resources.as_ref(),
        );
    }

    fn on_size_changed(&mut self) {
        let height = self.binding.size.height;
        if height > 0.0 {
            if let Some(texture) = &self.pad_texture {
                let px = height.round() as u32;
                texture.rasterize_at(px, px);
            }
        }

        // Font size follows the row height
        self.battery_font = None;
        self.battery_label.invalidate();
    }

    /// Feed an input event; never consumes it
    pub fn input(&mut self, event: &InputEvent) -> bool {
        if let Some(slot) = event.activity_slot() {
            self.tracker.record(slot, event.is_hotkey);
        }
        false
    }

    /// Advance timers by `delta_ms`
    pub fn update(&mut self, delta_ms: u32) {
        let view = self.binding.view;

        if view.battery {
            let enabled = self.options.settings.show_battery_indicator;
            if let Some(change) =
                self.pollers
                    .advance_battery(delta_ms, self.probe.as_ref(), enabled)
            {
                self.apply_battery_change(change);
            }
        }

        if view.network {
            let enabled = self.options.settings.show_network_indicator;
            self.pollers
                .advance_network(delta_ms, self.probe.as_ref(), enabled);
        }

        if view.controllers {
            self.tracker.tick(delta_ms);
        }
    }

    fn battery_font(&mut self) -> Option<Arc<dyn Font>> {
        if self.battery_font.is_none() {
            let size = self.binding.size.height * BATTERY_TEXT_SCALE;
            self.battery_font = self
                .resources
                .font(self.options.small_font.as_deref(), size);
        }
        self.battery_font.clone()
    }

    fn slot_color(&self, slot: usize) -> Color {
        match self.tracker.kind(slot) {
            ActivityKind::None => self.binding.color,
            ActivityKind::Active => self.binding.activity_color,
            ActivityKind::Hotkey => self.binding.hotkey_color,
        }
    }

    /// Measure pass: visible items in display order
    fn measure(&mut self, players: &PlayerMapping) -> Vec<RenderItem> {
        let row_height = self.binding.size.height;
        let item_box = Size::new(row_height, row_height);
        let view = self.binding.view;
        let mut items = Vec::new();

        if view.controllers && self.options.settings.show_controller_activity {
            for slot in players.active_slots() {
                // Without a pad texture each slot is a plain square
                let size = match &self.pad_texture {
                    Some(texture) => scale_image_to_box(texture.source_size(), item_box),
                    None => item_box,
                };
                items.push(RenderItem::new(
                    ItemKind::Controller { slot },
                    size,
                    self.slot_color(slot),
                ));
            }
        }

        if view.network && self.pollers.network().connected {
            if let Some(texture) = &self.network_texture {
                items.push(RenderItem::new(
                    ItemKind::Network,
                    scale_image_to_box(texture.source_size(), item_box),
                    self.binding.color,
                ));
            }
        }

        let battery = self.pollers.battery();
        if view.battery && battery.has_battery {
            if let Some(texture) = self.battery_icon.texture() {
                items.push(RenderItem::new(
                    ItemKind::BatteryIcon,
                    scale_image_to_box(texture.source_size(), item_box),
                    self.binding.color,
                ));
            }

            if let Some(font) = self.battery_font() {
                let color = self.binding.color;
                let text = self
                    .battery_label
                    .get_or_build(font.as_ref(), &battery.label(), color);
                items.push(RenderItem::new(ItemKind::BatteryText, text.size, color));
            }
        }

        items
    }

    /// Measure and place this frame's items
    pub fn layout(&mut self, players: &PlayerMapping) -> RowLayout {
        let items = self.measure(players);
        RowLayout::compute(
            items,
            self.binding.size,
            self.binding.spacing,
            self.binding.alignment,
        )
    }

    /// Draw the strip at `parent` + the widget position
    pub fn render(&mut self, parent: Vec2, players: &PlayerMapping, renderer: &mut dyn Renderer) {
        if !self.visible {
            return;
        }

        let origin = parent + self.binding.position;
        let bounds = Rect::from_origin_size(origin, self.binding.size);
        if !renderer.is_visible_on_screen(bounds) {
            trace!("Activity bar off screen, skipping render");
            return;
        }

        renderer.set_origin(origin);

        if self.options.settings.debug_image {
            renderer.draw_rect(
                Rect::from_origin_size(Vec2::ZERO, self.binding.size),
                DEBUG_OUTLINE_COLOR,
            );
        }

        let layout = self.layout(players);
        for placed in &layout.items {
            let color = placed.item.color;
            match placed.item.kind {
                ItemKind::Controller { .. } => match &self.pad_texture {
                    Some(texture) if texture.bind() => {
                        renderer.draw_texture(texture.as_ref(), placed.bounds, color)
                    }
                    _ => renderer.draw_rect(placed.bounds, color),
                },
                ItemKind::Network => {
                    if let Some(texture) = self.network_texture.as_ref().filter(|t| t.bind()) {
                        renderer.draw_texture(texture.as_ref(), placed.bounds, color);
                    }
                }
                ItemKind::BatteryIcon => {
                    if let Some(texture) = self.battery_icon.texture().filter(|t| t.bind()) {
                        renderer.draw_texture(texture.as_ref(), placed.bounds, color);
                    }
                }
                ItemKind::BatteryText => {
                    if let (Some(font), Some(text)) =
                        (&self.battery_font, self.battery_label.cached())
                    {
                        let position = Vec2::new(placed.bounds.x, placed.bounds.y);
                        renderer.draw_text(font.as_ref(), text, position);
                    }
                }
            }
        }
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.options.settings = settings;
    }

    pub fn settings(&self) -> &Settings {
        &self.options.settings
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.binding.position = position;
    }

    pub fn set_size(&mut self, size: Size) {
        self.binding.size = size;
        self.on_size_changed();
    }

    pub fn binding(&self) -> &ThemeBinding {
        &self.binding
    }

    pub fn tracker(&self) -> &ActivityTracker {
        &self.tracker
    }

    pub fn network(&self) -> NetworkSnapshot {
        self.pollers.network()
    }

    pub fn battery(&self) -> BatterySnapshot {
        self.pollers.battery()
    }

    pub fn battery_icon(&self) -> Option<&str> {
        self.battery_icon.current()
    }

    /// Cached battery text handle, if built
    pub fn battery_text(&self) -> Option<&Arc<TextCache>> {
        self.battery_label.cached()
    }
}
