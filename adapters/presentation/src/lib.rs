#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Presentation-side contracts: per-frame input snapshots and display
//! configuration.
//!
//! Rendering adapters own the device event stream; this crate folds those
//! raw transitions into [`FrameInput`] snapshots the session layer can
//! consume without knowing anything about windows or canvases.

use glam::Vec2;
use pathing_core::CellCoord;
use serde::Deserialize;
use std::collections::BTreeSet;
use thiserror::Error;

/// Pointer buttons the games care about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Primary (left) button.
    Primary,
    /// Secondary (right) button.
    Secondary,
}

/// Held/pressed state of one pointer button.
///
/// `down` is level-triggered; `pressed` is edge-triggered and lasts exactly
/// one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ButtonState {
    /// The button is currently held.
    pub down: bool,
    /// The button went down since the previous frame snapshot.
    pub pressed: bool,
}

/// Input snapshot handed to the session layer once per frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameInput {
    /// Pointer position in raw pixels, relative to the render surface.
    pub pointer_pixel: Vec2,
    /// Pointer position in normalized device coordinates, `[-1, 1]` on both
    /// axes with `+y` up.
    pub pointer_normalized: Vec2,
    /// Primary button state.
    pub primary: ButtonState,
    /// Secondary button state.
    pub secondary: ButtonState,
    /// Keys currently held, lowercased.
    pub held_keys: BTreeSet<String>,
    /// Grid cell under the pointer, when the renderer resolved one.
    pub cursor_cell: Option<CellCoord>,
}

impl FrameInput {
    /// Whether the primary button went down this frame.
    #[must_use]
    pub const fn primary_pressed(&self) -> bool {
        self.primary.pressed
    }

    /// Whether the named key is currently held. Lookup is case-insensitive.
    #[must_use]
    pub fn is_key_down(&self, key: &str) -> bool {
        self.held_keys.contains(&key.to_lowercase())
    }
}

/// Folds raw device transitions into successive [`FrameInput`] snapshots.
///
/// Adapters feed transitions as they arrive; [`InputCollector::frame`] then
/// produces the snapshot for the tick and retires the edge-triggered flags,
/// so a press is observable for exactly one frame however many device events
/// arrived in between.
#[derive(Clone, Debug, Default)]
pub struct InputCollector {
    pointer_pixel: Vec2,
    pointer_normalized: Vec2,
    primary: ButtonState,
    secondary: ButtonState,
    held_keys: BTreeSet<String>,
}

impl InputCollector {
    /// Creates a collector with no pointer movement or held state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a pointer move in surface pixels.
    ///
    /// `surface` is the render surface size in pixels, used to derive the
    /// normalized device position.
    pub fn pointer_moved(&mut self, pixel: Vec2, surface: Vec2) {
        self.pointer_pixel = pixel;
        self.pointer_normalized = Vec2::new(
            (pixel.x / surface.x) * 2.0 - 1.0,
            -(pixel.y / surface.y) * 2.0 + 1.0,
        );
    }

    /// Records a button transition.
    pub fn button_changed(&mut self, button: PointerButton, down: bool) {
        let state = match button {
            PointerButton::Primary => &mut self.primary,
            PointerButton::Secondary => &mut self.secondary,
        };
        if down && !state.down {
            state.pressed = true;
        }
        state.down = down;
    }

    /// Records a key transition. Keys are stored lowercased.
    pub fn key_changed(&mut self, key: &str, down: bool) {
        let key = key.to_lowercase();
        if down {
            let _ = self.held_keys.insert(key);
        } else {
            let _ = self.held_keys.remove(&key);
        }
    }

    /// Drops all held buttons and pending presses, as when the pointer
    /// leaves the render surface.
    pub fn pointer_left(&mut self) {
        self.primary = ButtonState::default();
        self.secondary = ButtonState::default();
    }

    /// Produces the snapshot for this frame and retires one-frame edges.
    pub fn frame(&mut self, cursor_cell: Option<CellCoord>) -> FrameInput {
        let snapshot = FrameInput {
            pointer_pixel: self.pointer_pixel,
            pointer_normalized: self.pointer_normalized,
            primary: self.primary,
            secondary: self.secondary,
            held_keys: self.held_keys.clone(),
            cursor_cell,
        };

        self.primary.pressed = false;
        self.secondary.pressed = false;

        snapshot
    }
}

/// Display settings the UI exposes to the player.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct PresentationConfig {
    /// Resolution multiplier applied to the render surface.
    pub render_scale: f32,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self { render_scale: 1.0 }
    }
}

/// Reasons a presentation config cannot be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML payload could not be parsed.
    #[error("malformed presentation config: {0}")]
    Parse(#[from] toml::de::Error),
    /// The render scale must be a positive finite number.
    #[error("render scale must be positive, got {0}")]
    InvalidRenderScale(f32),
}

impl PresentationConfig {
    /// Parses a config from TOML, falling back to defaults for absent keys.
    pub fn from_toml(payload: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(payload)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.render_scale.is_finite() && self.render_scale > 0.0) {
            return Err(ConfigError::InvalidRenderScale(self.render_scale));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_is_observable_for_exactly_one_frame() {
        let mut collector = InputCollector::new();
        collector.button_changed(PointerButton::Primary, true);

        let first = collector.frame(None);
        assert!(first.primary_pressed());
        assert!(first.primary.down);

        let second = collector.frame(None);
        assert!(!second.primary_pressed(), "edge retires after one frame");
        assert!(second.primary.down, "hold persists until release");
    }

    #[test]
    fn repeated_down_events_do_not_retrigger_the_edge() {
        let mut collector = InputCollector::new();
        collector.button_changed(PointerButton::Primary, true);
        let _ = collector.frame(None);

        collector.button_changed(PointerButton::Primary, true);
        assert!(!collector.frame(None).primary_pressed());

        collector.button_changed(PointerButton::Primary, false);
        collector.button_changed(PointerButton::Primary, true);
        assert!(collector.frame(None).primary_pressed());
    }

    #[test]
    fn pointer_move_produces_both_coordinate_spaces() {
        let mut collector = InputCollector::new();
        collector.pointer_moved(Vec2::new(400.0, 150.0), Vec2::new(800.0, 600.0));

        let input = collector.frame(None);
        assert_eq!(input.pointer_pixel, Vec2::new(400.0, 150.0));
        assert_eq!(input.pointer_normalized, Vec2::new(0.0, 0.5));
    }

    #[test]
    fn keys_are_tracked_case_insensitively() {
        let mut collector = InputCollector::new();
        collector.key_changed("W", true);

        let input = collector.frame(None);
        assert!(input.is_key_down("w"));
        assert!(input.is_key_down("W"));

        collector.key_changed("w", false);
        assert!(!collector.frame(None).is_key_down("w"));
    }

    #[test]
    fn pointer_leave_clears_buttons() {
        let mut collector = InputCollector::new();
        collector.button_changed(PointerButton::Primary, true);
        collector.button_changed(PointerButton::Secondary, true);
        collector.pointer_left();

        let input = collector.frame(None);
        assert_eq!(input.primary, ButtonState::default());
        assert_eq!(input.secondary, ButtonState::default());
    }

    #[test]
    fn cursor_cell_passes_through_the_snapshot() {
        let mut collector = InputCollector::new();
        let input = collector.frame(Some(CellCoord::new(3, 4)));
        assert_eq!(input.cursor_cell, Some(CellCoord::new(3, 4)));
    }

    #[test]
    fn config_defaults_apply_to_missing_keys() {
        let config = PresentationConfig::from_toml("").expect("empty config parses");
        assert_eq!(config, PresentationConfig::default());

        let scaled = PresentationConfig::from_toml("render_scale = 0.5").expect("parses");
        assert_eq!(scaled.render_scale, 0.5);
    }

    #[test]
    fn config_rejects_non_positive_render_scale() {
        assert!(matches!(
            PresentationConfig::from_toml("render_scale = 0.0"),
            Err(ConfigError::InvalidRenderScale(_))
        ));
        assert!(matches!(
            PresentationConfig::from_toml("render_scale = ???"),
            Err(ConfigError::Parse(_))
        ));
    }
}
