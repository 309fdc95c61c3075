//! Activity bar
//!
//! On-screen strip for a game frontend showing which controllers are
//! producing input, whether the network is up, and the battery state.

pub mod activity;
pub mod battery;
pub mod config;
pub mod error;
pub mod input;
pub mod layout;
pub mod platform;
pub mod render;
pub mod status;
pub mod theme;
pub mod widget;

#[cfg(test)]
pub(crate) mod testing;

pub use activity::{ActivityKind, ActivityTracker, MAX_PLAYERS, PAD_TIMEOUT_MS};
pub use config::{AppConfig, ScreenMetrics, Settings};
pub use error::ThemeError;
pub use input::{InputEvent, InputKind, PlayerMapping};
pub use layout::{HorizontalAlignment, Rect, Size, Vec2};
pub use render::{DrawCommand, RecordingRenderer, Renderer, ResourceProvider};
pub use status::{BackgroundProbe, BatterySnapshot, NetworkSnapshot, StatusProbe};
pub use theme::{ThemeDocument, ThemeElement, ThemeProperties};
pub use widget::{ControllerActivity, WidgetOptions};
