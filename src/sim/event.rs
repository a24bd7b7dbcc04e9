//! Collision and edge-crossing triggers
//!
//! Gameplay code attaches listeners to objects. The world evaluates them once
//! per owner update and invokes the handler with an [`EventContext`], through
//! which the handler queues world changes. Queued changes are applied after
//! the owner's listener pass, so handlers never observe a half-mutated world.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::driver::Overlay;
use super::object::{Bounds, GameObject, IdAllocator, ObjectId};
use crate::error::SimError;

/// Listener id, unique within a world
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventId(pub u32);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "event#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

/// Which side of the threshold the object must be entirely on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeSign {
    /// Far edge (top/right) below the value: exited toward the low side
    Less,
    /// Near edge (bottom/left) above the value: entered the high side
    Greater,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trigger {
    Collision {
        target: ObjectId,
    },
    Edge {
        axis: Axis,
        sign: EdgeSign,
        value: f32,
    },
}

/// True when `bounds` lies entirely past `value` on the `sign` side
pub fn edge_crossed(bounds: &Bounds, axis: Axis, sign: EdgeSign, value: f32) -> bool {
    match (axis, sign) {
        (Axis::Y, EdgeSign::Less) => bounds.top < value,
        (Axis::Y, EdgeSign::Greater) => bounds.bottom > value,
        (Axis::X, EdgeSign::Less) => bounds.right < value,
        (Axis::X, EdgeSign::Greater) => bounds.left > value,
    }
}

pub type HandlerResult = Result<(), SimError>;

/// Callback object invoked when a trigger matches
pub trait EventHandler {
    fn handle(&mut self, ctx: &mut EventContext<'_>) -> HandlerResult;
}

impl<F> EventHandler for F
where
    F: FnMut(&mut EventContext<'_>) -> HandlerResult,
{
    fn handle(&mut self, ctx: &mut EventContext<'_>) -> HandlerResult {
        self(ctx)
    }
}

pub struct Event {
    pub trigger: Trigger,
    /// Detach after the first firing
    pub once: bool,
    pub(crate) handler: Box<dyn EventHandler>,
}

impl Event {
    pub fn collision<F>(target: ObjectId, once: bool, handler: F) -> Self
    where
        F: FnMut(&mut EventContext<'_>) -> HandlerResult + 'static,
    {
        Self::with_handler(Trigger::Collision { target }, once, Box::new(handler))
    }

    pub fn edge<F>(sign: EdgeSign, axis: Axis, value: f32, once: bool, handler: F) -> Self
    where
        F: FnMut(&mut EventContext<'_>) -> HandlerResult + 'static,
    {
        Self::with_handler(Trigger::Edge { axis, sign, value }, once, Box::new(handler))
    }

    pub fn with_handler(trigger: Trigger, once: bool, handler: Box<dyn EventHandler>) -> Self {
        Self {
            trigger,
            once,
            handler,
        }
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("trigger", &self.trigger)
            .field("once", &self.once)
            .finish_non_exhaustive()
    }
}

/// An event attached to an owner
#[derive(Debug)]
pub struct Listener {
    pub id: EventId,
    pub event: Event,
}

/// World change requested from inside a handler
#[derive(Debug)]
pub(crate) enum Command {
    Spawn(GameObject),
    Despawn(ObjectId),
    SetPosition(ObjectId, Vec2),
    SetVelocity(ObjectId, Vec2),
    AddListener(ObjectId, Listener),
    RemoveListener(ObjectId, EventId),
    ShowOverlay(Overlay),
}

/// Handle given to handlers while they run
pub struct EventContext<'a> {
    owner: ObjectId,
    event: EventId,
    ids: &'a mut IdAllocator,
    commands: &'a mut Vec<Command>,
}

impl<'a> EventContext<'a> {
    pub(crate) fn new(
        owner: ObjectId,
        event: EventId,
        ids: &'a mut IdAllocator,
        commands: &'a mut Vec<Command>,
    ) -> Self {
        Self {
            owner,
            event,
            ids,
            commands,
        }
    }

    /// Object whose listener fired
    pub fn owner(&self) -> ObjectId {
        self.owner
    }

    pub fn event_id(&self) -> EventId {
        self.event
    }

    /// New object with a fresh id; pass it to [`spawn`](Self::spawn)
    pub fn create_object(&mut self, position: Vec2, velocity: Vec2) -> GameObject {
        GameObject::new(self.ids.next_object_id(), position, velocity)
    }

    pub fn spawn(&mut self, object: GameObject) -> ObjectId {
        let id = object.id();
        self.commands.push(Command::Spawn(object));
        id
    }

    pub fn despawn(&mut self, id: ObjectId) {
        self.commands.push(Command::Despawn(id));
    }

    /// Teleport; the move is not swept by the platform resolver
    pub fn set_position(&mut self, id: ObjectId, position: Vec2) {
        self.commands.push(Command::SetPosition(id, position));
    }

    pub fn set_velocity(&mut self, id: ObjectId, velocity: Vec2) {
        self.commands.push(Command::SetVelocity(id, velocity));
    }

    pub fn add_listener(&mut self, owner: ObjectId, event: Event) -> EventId {
        let id = self.ids.next_event_id();
        self.commands
            .push(Command::AddListener(owner, Listener { id, event }));
        id
    }

    pub fn remove_listener(&mut self, owner: ObjectId, event: EventId) {
        self.commands.push(Command::RemoveListener(owner, event));
    }

    /// Ask the driver to suspend the world behind an overlay
    pub fn show_overlay(&mut self, overlay: Overlay) {
        self.commands.push(Command::ShowOverlay(overlay));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(bottom: f32, top: f32) -> Bounds {
        Bounds {
            left: 0.0,
            right: 10.0,
            bottom,
            top,
        }
    }

    #[test]
    fn test_edge_less_uses_top() {
        // Straddling zero does not count as exited below
        assert!(!edge_crossed(&bounds(-5.0, 5.0), Axis::Y, EdgeSign::Less, 0.0));
        assert!(edge_crossed(&bounds(-15.0, -1.0), Axis::Y, EdgeSign::Less, 0.0));
        // Exactly at the threshold is not past it
        assert!(!edge_crossed(&bounds(-10.0, 0.0), Axis::Y, EdgeSign::Less, 0.0));
    }

    #[test]
    fn test_edge_greater_uses_near_edge() {
        assert!(edge_crossed(&bounds(1.0, 11.0), Axis::Y, EdgeSign::Greater, 0.0));
        assert!(!edge_crossed(&bounds(-1.0, 9.0), Axis::Y, EdgeSign::Greater, 0.0));
        assert!(edge_crossed(&bounds(0.0, 1.0), Axis::X, EdgeSign::Less, 11.0));
        assert!(edge_crossed(&bounds(0.0, 1.0), Axis::X, EdgeSign::Greater, -0.5));
        assert!(!edge_crossed(&bounds(0.0, 1.0), Axis::X, EdgeSign::Greater, 0.0));
    }

    #[test]
    fn test_context_queues_commands() {
        let mut ids = IdAllocator::default();
        let mut commands = Vec::new();
        let owner = ids.next_object_id();
        let mut ctx = EventContext::new(owner, EventId(1), &mut ids, &mut commands);

        let spark = ctx.create_object(Vec2::ZERO, Vec2::ZERO);
        let spark_id = ctx.spawn(spark);
        assert_ne!(spark_id, owner);
        ctx.set_velocity(owner, Vec2::new(1.0, 2.0));
        let listener = ctx.add_listener(
            spark_id,
            Event::edge(EdgeSign::Less, Axis::Y, 0.0, true, |_| Ok(())),
        );
        ctx.remove_listener(spark_id, listener);
        ctx.despawn(spark_id);

        assert_eq!(commands.len(), 5);
        assert!(matches!(commands[0], Command::Spawn(_)));
        assert!(matches!(commands[4], Command::Despawn(id) if id == spark_id));
    }

    #[test]
    fn test_handler_objects_and_closures() {
        struct Counter(u32);
        impl EventHandler for Counter {
            fn handle(&mut self, _ctx: &mut EventContext<'_>) -> HandlerResult {
                self.0 += 1;
                Ok(())
            }
        }

        let mut ids = IdAllocator::default();
        let mut commands = Vec::new();
        let mut ctx = EventContext::new(ObjectId(1), EventId(1), &mut ids, &mut commands);

        let mut event = Event::with_handler(
            Trigger::Collision {
                target: ObjectId(2),
            },
            false,
            Box::new(Counter(0)),
        );
        assert!(event.handler.handle(&mut ctx).is_ok());

        let mut failing = Event::collision(ObjectId(2), true, |_ctx| {
            Err(SimError::Handler("boom".into()))
        });
        assert!(failing.handler.handle(&mut ctx).is_err());
    }
}
