//! 2D vector helpers
//!
//! Positions and velocities are plain `glam::Vec2` values in "math" space
//! (y grows upward). The extension trait adds the handful of operations the
//! rest of the core is written against, including a guarded division.

use glam::Vec2;

use crate::error::{SimError, SimResult};

/// Position/velocity type used throughout the simulation
pub type Vector2D = Vec2;

pub trait Vector2DExt {
    /// `self - other` as a new vector
    fn difference(self, other: Vec2) -> Vec2;

    /// Euclidean distance between two points
    fn distance_to(self, other: Vec2) -> f32;

    /// Divide both components by a scalar, refusing zero (and non-finite results)
    fn checked_div(self, divisor: f32) -> SimResult<Vec2>;

    /// Flip into screen space (y grows downward) for a viewport of the given height
    fn to_screen_space(self, viewport_height: f32) -> Vec2;
}

impl Vector2DExt for Vec2 {
    #[inline]
    fn difference(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x - other.x, self.y - other.y)
    }

    #[inline]
    fn distance_to(self, other: Vec2) -> f32 {
        let d = self.difference(other);
        (d.x * d.x + d.y * d.y).sqrt()
    }

    fn checked_div(self, divisor: f32) -> SimResult<Vec2> {
        if divisor == 0.0 {
            return Err(SimError::DivisionByZero);
        }
        let out = Vec2::new(self.x / divisor, self.y / divisor);
        if !out.is_finite() {
            return Err(SimError::DivisionByZero);
        }
        Ok(out)
    }

    #[inline]
    fn to_screen_space(self, viewport_height: f32) -> Vec2 {
        Vec2::new(self.x, viewport_height - self.y)
    }
}
