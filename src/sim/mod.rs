//! Simulation module
//!
//! Everything that moves, collides or fires lives here:
//! - Stable iteration order (by object id)
//! - Listener side effects are queued and applied after each owner's pass
//! - Seeded RNG only, no wall-clock reads
//! - No browser dependencies; drawing goes through `renderer::Surface`

pub mod driver;
pub mod event;
pub mod intersect;
pub mod motion;
pub mod object;
pub mod resolver;
pub mod vector;
pub mod world;

pub use driver::{DriverMode, GameDriver, Overlay};
pub use event::{
    Axis, EdgeSign, Event, EventContext, EventHandler, EventId, HandlerResult, Listener, Trigger,
    edge_crossed,
};
pub use intersect::{Body, intersects};
pub use motion::{MovingBehavior, RepeatPolicy};
pub use object::{Action, Bounds, Controls, Extents, GameObject, ObjectId, Shape};
pub use resolver::{Contact, ContactKind};
pub use vector::{Vector2D, Vector2DExt};
pub use world::World;
