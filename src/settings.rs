//! Simulation tunables and preferences
//!
//! Persisted separately from anything else in LocalStorage. Every field has a
//! default, so partial JSON documents load fine.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SimResult;

/// Legacy viewport confinement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub width: f32,
    pub height: f32,
    /// Fraction of speed kept when bouncing off a wall
    pub restitution: f32,
}

impl WorldBounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            restitution: RESTITUTION,
        }
    }
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Physics ===
    /// Gravity constant, multiplied by each object's mass
    pub gravity: f32,
    /// Longest frame step the simulation will integrate, seconds
    pub max_frame_dt: f32,
    /// Vertical velocity given to an object after landing
    pub resting_velocity: f32,
    /// Vertical velocity given after bumping a platform's underside
    pub ceiling_velocity: f32,
    /// Horizontal speed given after a side push (sign set by side)
    pub push_velocity: f32,
    /// How far a supported object may drift from the platform top and keep its support
    pub support_tolerance: f32,
    /// Exchange impulses between overlapping non-platform bodies
    pub elastic_collisions: bool,
    /// Keep bodies inside the viewport rectangle
    pub bounds: Option<WorldBounds>,

    // === View ===
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Camera offset kept between the followed object and the view origin
    pub camera_lead: Vec2,

    // === HUD ===
    pub show_fps: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gravity: G,
            max_frame_dt: MAX_FRAME_DT,
            resting_velocity: RESTING_VELOCITY,
            ceiling_velocity: CEILING_VELOCITY,
            push_velocity: PUSH_VELOCITY,
            support_tolerance: SUPPORT_TOLERANCE,
            elastic_collisions: false,
            bounds: None,

            viewport_width: VIEWPORT_WIDTH,
            viewport_height: VIEWPORT_HEIGHT,
            camera_lead: Vec2::new(CAMERA_LEAD, CAMERA_LEAD),

            show_fps: false,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Clamp a raw frame delta into the range the integrator accepts
    pub fn clamp_frame_dt(&self, dt: f32) -> f32 {
        if !dt.is_finite() || dt < 0.0 {
            return 0.0;
        }
        dt.min(self.max_frame_dt)
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "winter_run_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = self.to_json() {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings = Settings::from_json(r#"{"gravity": 3.5, "show_fps": true}"#).unwrap();
        assert_eq!(settings.gravity, 3.5);
        assert!(settings.show_fps);
        assert_eq!(settings.max_frame_dt, MAX_FRAME_DT);
        assert_eq!(settings.bounds, None);
    }

    #[test]
    fn test_json_keeps_bounds() {
        let mut settings = Settings::default();
        settings.bounds = Some(WorldBounds::new(800.0, 600.0));
        let back = Settings::from_json(&settings.to_json().unwrap()).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(matches!(
            Settings::from_json("{gravity: }"),
            Err(SimError::Settings(_))
        ));
    }

    #[test]
    fn test_clamp_frame_dt() {
        let settings = Settings::default();
        assert_eq!(settings.clamp_frame_dt(0.01), 0.01);
        assert_eq!(settings.clamp_frame_dt(5.0), MAX_FRAME_DT);
        assert_eq!(settings.clamp_frame_dt(-1.0), 0.0);
        assert_eq!(settings.clamp_frame_dt(f32::NAN), 0.0);
    }
}
