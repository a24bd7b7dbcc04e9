//! Game objects and their capability set
//!
//! An object carries any subset of capabilities (shape, collider, physics,
//! platform body, controls). Intersection and resolution code dispatches on
//! which of these are present instead of probing for fields.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::event::{EventId, Listener};
use super::motion::{MovingBehavior, PlatformMotion};
use super::vector::Vector2DExt;
use crate::consts::*;
use crate::error::{SimError, SimResult};
use crate::renderer::{DrawableHandle, ScreenRect, Surface, colors};

/// Unique object id, never reused within a world
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out object and listener ids
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next_object: u32,
    next_event: u32,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self {
            next_object: 1,
            next_event: 1,
        }
    }
}

impl IdAllocator {
    pub fn next_object_id(&mut self) -> ObjectId {
        let id = ObjectId(self.next_object);
        self.next_object += 1;
        id
    }

    pub fn next_event_id(&mut self) -> EventId {
        let id = EventId(self.next_event);
        self.next_event += 1;
        id
    }
}

/// Geometric shape used by intersection tests
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// Anchored at its bottom-left corner
    Rect { width: f32, height: f32 },
    /// Anchored at its center
    Round { radius: f32 },
}

impl Shape {
    pub fn default_extents(&self) -> Extents {
        match *self {
            Shape::Rect { width, height } => Extents {
                top: height,
                bottom: 0.0,
                left: 0.0,
                right: width,
            },
            Shape::Round { radius } => Extents {
                top: radius,
                bottom: -radius,
                left: -radius,
                right: radius,
            },
        }
    }
}

/// Edge offsets relative to an object's position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extents {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

/// Absolute edges in math space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
}

impl Bounds {
    pub fn at(position: Vec2, extents: Extents) -> Self {
        Self {
            left: position.x + extents.left,
            right: position.x + extents.right,
            bottom: position.y + extents.bottom,
            top: position.y + extents.top,
        }
    }

    /// Degenerate bounds for objects without extents
    pub fn point(position: Vec2) -> Self {
        Self {
            left: position.x,
            right: position.x,
            bottom: position.y,
            top: position.y,
        }
    }

    /// Strict overlap: touching edges do not count
    #[inline]
    pub fn overlaps_horizontally(&self, other: &Bounds) -> bool {
        self.right > other.left && self.left < other.right
    }

    /// Strict overlap: touching edges do not count
    #[inline]
    pub fn overlaps_vertically(&self, other: &Bounds) -> bool {
        self.top > other.bottom && self.bottom < other.top
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.left + self.right) * 0.5,
            (self.bottom + self.top) * 0.5,
        )
    }
}

/// Colliding capability
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub is_colliding: bool,
    pub extents: Extents,
}

/// Physics capability
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Physics {
    pub friction: f32,
    pub mass: f32,
    /// Platform this object currently stands on (non-owning)
    pub platform: Option<ObjectId>,
}

/// Marks an object as a platform; moving platforms carry their motion here
#[derive(Debug, Clone, Default)]
pub struct PlatformBody {
    pub motion: Option<PlatformMotion>,
}

/// Intent flags written by the input provider, read during update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Controls {
    pub move_right: bool,
    pub move_left: bool,
    pub jumping: bool,
    pub move_speed: f32,
    pub jump_impulse: f32,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            move_right: false,
            move_left: false,
            jumping: false,
            move_speed: PLAYER_MOVE_SPEED,
            jump_impulse: PLAYER_JUMP_IMPULSE,
        }
    }
}

/// Discrete start/stop actions from the controls provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    StartJump,
    StopJump,
    StartMoveRight,
    StopMoveRight,
    StartMoveLeft,
    StopMoveLeft,
}

impl Action {
    /// Key releases; these still apply while the loop is paused
    pub fn is_release(self) -> bool {
        matches!(self, Action::StopJump | Action::StopMoveRight | Action::StopMoveLeft)
    }
}

impl Controls {
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::StartJump => self.jumping = true,
            Action::StopJump => self.jumping = false,
            Action::StartMoveRight => self.move_right = true,
            Action::StopMoveRight => self.move_right = false,
            Action::StartMoveLeft => self.move_left = true,
            Action::StopMoveLeft => self.move_left = false,
        }
    }
}

/// A simulated entity
#[derive(Debug)]
pub struct GameObject {
    id: ObjectId,
    /// Human-readable name for logs
    pub label: String,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Position at the start of the current tick
    pub previous_position: Vec2,
    pub shape: Option<Shape>,
    pub collider: Option<Collider>,
    pub physics: Option<Physics>,
    pub platform: Option<PlatformBody>,
    pub controls: Option<Controls>,
    pub sprite: Option<DrawableHandle>,
    /// Draw order, lower draws first
    pub depth: i32,
    pub(crate) listeners: Vec<Listener>,
}

impl GameObject {
    pub(crate) fn new(id: ObjectId, position: Vec2, velocity: Vec2) -> Self {
        Self {
            id,
            label: String::new(),
            position,
            velocity,
            previous_position: position,
            shape: None,
            collider: None,
            physics: None,
            platform: None,
            controls: None,
            sprite: None,
            depth: 0,
            listeners: Vec::new(),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_rect(mut self, width: f32, height: f32) -> Self {
        self.shape = Some(Shape::Rect { width, height });
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.shape = Some(Shape::Round { radius });
        self
    }

    /// Colliding capability with extents taken from the shape
    pub fn with_collider(mut self) -> Self {
        let extents = self
            .shape
            .map(|s| s.default_extents())
            .unwrap_or(Extents {
                top: 0.0,
                bottom: 0.0,
                left: 0.0,
                right: 0.0,
            });
        self.collider = Some(Collider {
            is_colliding: false,
            extents,
        });
        self
    }

    pub fn with_collider_extents(mut self, extents: Extents) -> Self {
        self.collider = Some(Collider {
            is_colliding: false,
            extents,
        });
        self
    }

    pub fn with_physics(mut self, friction: f32, mass: f32) -> Self {
        self.physics = Some(Physics {
            friction,
            mass,
            platform: None,
        });
        self
    }

    pub fn as_platform(mut self) -> Self {
        self.platform = Some(PlatformBody::default());
        self
    }

    /// Turn into a moving platform following `behavior` from the current position
    pub fn with_motion(mut self, behavior: MovingBehavior) -> SimResult<Self> {
        let motion = PlatformMotion::new(self.position, behavior)?;
        self.position = motion.initial_position();
        self.previous_position = self.position;
        self.velocity = motion.initial_velocity();
        self.platform = Some(PlatformBody {
            motion: Some(motion),
        });
        Ok(self)
    }

    pub fn with_controls(mut self, controls: Controls) -> Self {
        self.controls = Some(controls);
        self
    }

    pub fn with_sprite(mut self, sprite: Option<DrawableHandle>) -> Self {
        self.sprite = sprite;
        self
    }

    pub fn with_depth(mut self, depth: i32) -> Self {
        self.depth = depth;
        self
    }

    pub fn is_platform(&self) -> bool {
        self.platform.is_some()
    }

    /// Subject to gravity and platform resolution
    pub fn is_mover(&self) -> bool {
        self.physics.is_some() && !self.is_platform() && self.extents().is_some()
    }

    pub fn is_colliding(&self) -> bool {
        self.collider.is_some_and(|c| c.is_colliding)
    }

    pub fn resting_platform(&self) -> Option<ObjectId> {
        self.physics.and_then(|p| p.platform)
    }

    pub(crate) fn clear_resting_platform(&mut self) {
        if let Some(physics) = self.physics.as_mut() {
            physics.platform = None;
        }
    }

    /// Collider extents when present, otherwise the shape's own
    pub fn extents(&self) -> Option<Extents> {
        self.collider
            .map(|c| c.extents)
            .or_else(|| self.shape.map(|s| s.default_extents()))
    }

    pub fn bounds(&self) -> Bounds {
        match self.extents() {
            Some(extents) => Bounds::at(self.position, extents),
            None => Bounds::point(self.position),
        }
    }

    pub fn previous_bounds(&self) -> Bounds {
        match self.extents() {
            Some(extents) => Bounds::at(self.previous_position, extents),
            None => Bounds::point(self.previous_position),
        }
    }

    pub fn listeners(&self) -> &[Listener] {
        &self.listeners
    }

    pub fn has_listener(&self, id: EventId) -> bool {
        self.listeners.iter().any(|l| l.id == id)
    }

    pub(crate) fn push_listener(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    /// No-op when the id is not attached
    pub(crate) fn remove_listener(&mut self, id: EventId) -> Option<Listener> {
        let index = self.listeners.iter().position(|l| l.id == id)?;
        Some(self.listeners.remove(index))
    }

    pub fn apply_action(&mut self, action: Action) -> SimResult<()> {
        let controls = self.controls.as_mut().ok_or(SimError::MissingCapability {
            id: self.id,
            capability: "controls",
        })?;
        controls.apply(action);
        Ok(())
    }

    /// Advance one tick: platform motion, or gravity + intents + integration.
    ///
    /// `carried` is the velocity of the platform this object rests on.
    pub(crate) fn step(&mut self, dt: f32, gravity: f32, carried: Option<Vec2>) {
        self.previous_position = self.position;

        if let Some(motion) = self.platform.as_mut().and_then(|p| p.motion.as_mut()) {
            motion.advance(&mut self.position, &mut self.velocity, dt);
            return;
        }
        if self.platform.is_some() {
            return;
        }

        if let Some(physics) = self.physics.as_ref() {
            self.velocity.y -= (gravity * physics.mass) * dt;
        }

        if let Some(controls) = self.controls {
            self.velocity.x = 0.0;
            if controls.move_right {
                self.velocity.x += controls.move_speed;
            }
            if controls.move_left {
                self.velocity.x -= controls.move_speed;
            }
            if let Some(carried) = carried {
                self.velocity.x += carried.x;
            }
            if controls.jumping {
                if let Some(physics) = self.physics.as_mut() {
                    if physics.platform.take().is_some() {
                        self.velocity.y = controls.jump_impulse;
                    }
                }
            }
        }

        self.position.x += self.velocity.x * dt;
        self.position.y += self.velocity.y * dt;
    }

    /// Draw in screen space, shifted by the camera offset
    pub fn draw(&self, surface: &mut dyn Surface, viewport_height: f32, camera: Vec2) {
        let view = self.position.to_screen_space(viewport_height);
        let color = if self.is_colliding() {
            colors::BODY_COLLIDING
        } else {
            colors::BODY
        };

        match self.shape {
            Some(Shape::Rect { width, height }) => {
                let rect = ScreenRect::new(
                    view.x - camera.x,
                    view.y - height + camera.y,
                    width,
                    height,
                );
                match self.sprite {
                    Some(image) => surface.draw_image(image, rect),
                    None => surface.fill_rect(rect, color),
                }
            }
            Some(Shape::Round { radius }) => {
                let center = Vec2::new(view.x - camera.x, view.y + camera.y);
                match self.sprite {
                    Some(image) => surface.draw_image(
                        image,
                        ScreenRect::new(
                            center.x - radius,
                            center.y - radius,
                            radius * 2.0,
                            radius * 2.0,
                        ),
                    ),
                    None => surface.fill_circle(center, radius, color),
                }
            }
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{DrawCall, RecordingSurface};

    fn object(id: u32) -> GameObject {
        GameObject::new(ObjectId(id), Vec2::new(10.0, 20.0), Vec2::ZERO)
    }

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let mut ids = IdAllocator::default();
        let a = ids.next_object_id();
        let b = ids.next_object_id();
        assert!(a < b);
        assert_ne!(ids.next_event_id(), ids.next_event_id());
    }

    #[test]
    fn test_extents_prefer_collider() {
        let player = object(1)
            .with_rect(64.0, 64.0)
            .with_collider_extents(Extents {
                top: 64.0,
                bottom: 0.0,
                left: 0.0,
                right: 48.0,
            });
        let bounds = player.bounds();
        assert_eq!(bounds.right, 58.0);
        assert_eq!(bounds.top, 84.0);

        let ball = object(2).with_radius(5.0);
        let bounds = ball.bounds();
        assert_eq!(bounds.left, 5.0);
        assert_eq!(bounds.top, 25.0);

        let bare = object(3);
        assert_eq!(bare.bounds(), Bounds::point(Vec2::new(10.0, 20.0)));
    }

    #[test]
    fn test_gravity_scales_with_mass() {
        let mut light = object(1).with_rect(10.0, 10.0).with_physics(0.1, 1.0);
        let mut heavy = object(2).with_rect(10.0, 10.0).with_physics(0.1, 100.0);
        light.step(0.1, G, None);
        heavy.step(0.1, G, None);
        assert_eq!(light.velocity.y, -(G * 1.0) * 0.1);
        assert_eq!(heavy.velocity.y, -(G * 100.0) * 0.1);
        assert!(heavy.position.y < light.position.y);
        assert_eq!(light.previous_position, Vec2::new(10.0, 20.0));
    }

    #[test]
    fn test_static_platform_does_not_move() {
        let mut platform = object(1)
            .with_rect(100.0, 20.0)
            .with_physics(0.0, 50.0)
            .as_platform();
        platform.step(0.5, G, None);
        assert_eq!(platform.position, Vec2::new(10.0, 20.0));
        assert_eq!(platform.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_controls_intent_and_carry() {
        let mut player = object(1)
            .with_rect(64.0, 64.0)
            .with_physics(0.1, 100.0)
            .with_controls(Controls::default());
        player.apply_action(Action::StartMoveRight).unwrap();
        player.step(0.0, G, Some(Vec2::new(25.0, 0.0)));
        assert_eq!(player.velocity.x, PLAYER_MOVE_SPEED + 25.0);

        player.apply_action(Action::StartMoveLeft).unwrap();
        player.step(0.0, G, None);
        assert_eq!(player.velocity.x, 0.0);
    }

    #[test]
    fn test_jump_requires_support() {
        let mut player = object(1)
            .with_rect(64.0, 64.0)
            .with_physics(0.1, 100.0)
            .with_controls(Controls::default());
        player.apply_action(Action::StartJump).unwrap();

        // Airborne: no jump
        player.step(0.01, G, None);
        assert!(player.velocity.y < 0.0);

        // Supported: jump clears support and sets the impulse
        player.physics.as_mut().unwrap().platform = Some(ObjectId(9));
        player.step(0.01, G, None);
        assert_eq!(player.velocity.y, PLAYER_JUMP_IMPULSE);
        assert_eq!(player.resting_platform(), None);
    }

    #[test]
    fn test_release_while_paused_unlatches() {
        let mut controls = Controls::default();
        controls.apply(Action::StartMoveRight);

        // Only releases get through while paused
        for action in [Action::StartMoveLeft, Action::StopMoveRight] {
            if action.is_release() {
                controls.apply(action);
            }
        }
        assert!(!controls.move_right);
        assert!(!controls.move_left);
        assert!(!Action::StartJump.is_release());
    }

    #[test]
    fn test_action_without_controls_fails() {
        let mut crate_box = object(4).with_rect(10.0, 10.0);
        let err = crate_box.apply_action(Action::StartJump).unwrap_err();
        assert!(matches!(
            err,
            SimError::MissingCapability {
                capability: "controls",
                ..
            }
        ));
    }

    #[test]
    fn test_draw_flips_and_offsets() {
        let rect = object(1).with_rect(30.0, 40.0);
        let mut surface = RecordingSurface::new();
        rect.draw(&mut surface, 600.0, Vec2::new(5.0, 7.0));
        assert_eq!(
            surface.calls,
            vec![DrawCall::Rect(
                ScreenRect::new(5.0, 600.0 - 20.0 - 40.0 + 7.0, 30.0, 40.0),
                colors::BODY
            )]
        );

        let mut ball = object(2).with_radius(4.0).with_collider();
        ball.collider.as_mut().unwrap().is_colliding = true;
        let mut surface = RecordingSurface::new();
        ball.draw(&mut surface, 100.0, Vec2::ZERO);
        assert_eq!(
            surface.calls,
            vec![DrawCall::Circle(
                Vec2::new(10.0, 80.0),
                4.0,
                colors::BODY_COLLIDING
            )]
        );
    }
}
