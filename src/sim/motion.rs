//! Scripted motion for moving platforms
//!
//! A platform travels from its spawn point toward a target at constant
//! velocity (displacement / duration). Arrival is detected when the distance
//! to the target grows across a tick, at which point the repeat policy runs.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::vector::Vector2DExt;
use crate::error::{SimError, SimResult};

/// What happens when the platform reaches its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RepeatPolicy {
    /// Stop at the target
    #[default]
    None,
    /// Teleport back to spawn and run again
    FromStart,
    /// Swap spawn and target (ping-pong)
    FromEnd,
}

/// Level-data description of a platform's motion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovingBehavior {
    pub target: Vec2,
    /// Seconds per leg
    pub duration: f32,
    #[serde(default)]
    pub repeat: RepeatPolicy,
    /// Seconds to hold still before the first leg
    #[serde(default)]
    pub delay: f32,
    /// Starting phase along the first leg, 0..1
    #[serde(default)]
    pub shift: f32,
}

/// Runtime state of a moving platform
#[derive(Debug, Clone)]
pub struct PlatformMotion {
    spawn: Vec2,
    target: Vec2,
    duration: f32,
    repeat: RepeatPolicy,
    shift: f32,
    delay_left: f32,
    last_distance: f32,
}

impl PlatformMotion {
    pub fn new(spawn: Vec2, behavior: MovingBehavior) -> SimResult<Self> {
        if !(behavior.duration.is_finite() && behavior.duration > 0.0) {
            return Err(SimError::InvalidDuration(behavior.duration));
        }
        Ok(Self {
            spawn,
            target: behavior.target,
            duration: behavior.duration,
            repeat: behavior.repeat,
            shift: behavior.shift.clamp(0.0, 1.0),
            delay_left: behavior.delay.max(0.0),
            last_distance: behavior.target.distance_to(spawn),
        })
    }

    pub fn spawn(&self) -> Vec2 {
        self.spawn
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn repeat(&self) -> RepeatPolicy {
        self.repeat
    }

    /// Spawn point moved along the first leg by `shift`
    pub fn initial_position(&self) -> Vec2 {
        self.spawn + self.target.difference(self.spawn) * self.shift
    }

    pub fn initial_velocity(&self) -> Vec2 {
        if self.delay_left > 0.0 {
            Vec2::ZERO
        } else {
            self.leg_velocity()
        }
    }

    fn leg_velocity(&self) -> Vec2 {
        match self.target.difference(self.spawn).checked_div(self.duration) {
            Ok(velocity) => velocity,
            Err(err) => {
                log::warn!("Platform leg velocity unavailable ({}), holding still", err);
                Vec2::ZERO
            }
        }
    }

    /// Move `position` by one tick and apply the repeat policy on arrival
    pub fn advance(&mut self, position: &mut Vec2, velocity: &mut Vec2, dt: f32) {
        if self.delay_left > 0.0 {
            self.delay_left -= dt;
            if self.delay_left <= 0.0 {
                self.delay_left = 0.0;
                *velocity = self.leg_velocity();
            }
            return;
        }

        position.x += velocity.x * dt;
        position.y += velocity.y * dt;

        let distance = self.target.distance_to(*position);
        if self.last_distance < distance {
            self.finish_leg(position, velocity);
        } else {
            self.last_distance = distance;
        }
    }

    fn finish_leg(&mut self, position: &mut Vec2, velocity: &mut Vec2) {
        match self.repeat {
            RepeatPolicy::FromStart => {
                *position = self.spawn;
                self.last_distance = self.target.distance_to(self.spawn);
            }
            RepeatPolicy::FromEnd => {
                std::mem::swap(&mut self.spawn, &mut self.target);
                *position = self.spawn;
                *velocity = self.leg_velocity();
                self.last_distance = self.target.distance_to(self.spawn);
            }
            RepeatPolicy::None => {
                *velocity = Vec2::ZERO;
            }
        }
    }
}
