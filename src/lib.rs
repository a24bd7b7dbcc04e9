//! Winter Run - a 2D browser platformer
//!
//! Core modules:
//! - `sim`: Simulation core (objects, triggers, intersections, platform resolution, driver)
//! - `renderer`: Drawing boundary objects render through
//! - `platform`: Browser/native abstraction (frame scheduling, key mapping)
//! - `settings`: Tunables and preferences
//! - `scene`: Level wiring for the demo world

pub mod error;
pub mod platform;
pub mod renderer;
pub mod scene;
pub mod settings;
pub mod sim;

pub use error::{SimError, SimResult};
pub use settings::{Settings, WorldBounds};

/// Game configuration constants
pub mod consts {
    /// Gravity constant (scaled by mass)
    pub const G: f32 = 9.8;
    /// Longest step integrated per frame; slower frames are clamped
    pub const MAX_FRAME_DT: f32 = 0.05;

    /// Velocity sentinels written by the platform resolver
    pub const RESTING_VELOCITY: f32 = 1.0;
    pub const CEILING_VELOCITY: f32 = -1.0;
    pub const PUSH_VELOCITY: f32 = 1.0;
    pub const SUPPORT_TOLERANCE: f32 = 2.0;

    /// Wall bounce for legacy viewport confinement
    pub const RESTITUTION: f32 = 0.1;

    /// Viewport defaults
    pub const VIEWPORT_WIDTH: f32 = 1280.0;
    pub const VIEWPORT_HEIGHT: f32 = 720.0;
    pub const CAMERA_LEAD: f32 = 250.0;

    /// Player defaults
    pub const PLAYER_SIZE: f32 = 64.0;
    /// Sprite padding on the right that is not part of the collider
    pub const PLAYER_RIGHT_INSET: f32 = 16.0;
    pub const PLAYER_MASS: f32 = 100.0;
    pub const PLAYER_FRICTION: f32 = 0.1;
    pub const PLAYER_MOVE_SPEED: f32 = 500.0;
    pub const PLAYER_JUMP_IMPULSE: f32 = 500.0;
}
