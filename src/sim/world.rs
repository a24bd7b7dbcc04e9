//! Object registry and per-tick update
//!
//! Objects are kept sorted by id, which is also the update order. A tick walks
//! a snapshot of the ids taken when it starts: for each object it integrates
//! motion, evaluates the object's listeners, then applies whatever the
//! handlers queued. Objects spawned during a tick are first updated on the
//! next one; objects despawned during a tick are skipped for the rest of it.

use glam::Vec2;

use super::driver::Overlay;
use super::event::{Command, Event, EventContext, EventId, Listener, Trigger, edge_crossed};
use super::intersect::intersects;
use super::object::{Action, GameObject, IdAllocator, ObjectId};
use super::resolver::{confine_to_bounds, exchange_impulses, mark_collisions, resolve_platforms};
use crate::error::{SimError, SimResult};
use crate::renderer::Surface;
use crate::settings::Settings;

pub struct World {
    settings: Settings,
    objects: Vec<GameObject>,
    ids: IdAllocator,
    commands: Vec<Command>,
    camera: Vec2,
    camera_target: Option<ObjectId>,
    overlay_request: Option<Overlay>,
    ticks: u64,
}

impl World {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            objects: Vec::new(),
            ids: IdAllocator::default(),
            commands: Vec::new(),
            camera: Vec2::ZERO,
            camera_target: None,
            overlay_request: None,
            ticks: 0,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Ticks advanced since creation
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// New object with a fresh id, not yet registered
    pub fn create_object(&mut self, position: Vec2, velocity: Vec2) -> GameObject {
        GameObject::new(self.ids.next_object_id(), position, velocity)
    }

    pub fn spawn(&mut self, object: GameObject) -> ObjectId {
        let id = object.id();
        match self.objects.binary_search_by_key(&id, |o| o.id()) {
            Ok(index) => {
                log::warn!("Object {} spawned twice, replacing", id);
                self.objects[index] = object;
            }
            Err(index) => {
                log::debug!("Spawned {} {:?}", id, object.label);
                self.objects.insert(index, object);
            }
        }
        id
    }

    pub fn despawn(&mut self, id: ObjectId) -> Option<GameObject> {
        let index = self.index_of(id)?;
        let object = self.objects.remove(index);
        if self.camera_target == Some(id) {
            self.camera_target = None;
        }
        log::debug!("Despawned {} {:?}", id, object.label);
        Some(object)
    }

    fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.binary_search_by_key(&id, |o| o.id()).ok()
    }

    pub fn get(&self, id: ObjectId) -> Option<&GameObject> {
        self.index_of(id).map(|i| &self.objects[i])
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut GameObject> {
        self.index_of(id).map(|i| &mut self.objects[i])
    }

    pub fn objects(&self) -> &[GameObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn add_event_listener(&mut self, owner: ObjectId, event: Event) -> SimResult<EventId> {
        let index = self.index_of(owner).ok_or(SimError::UnknownObject(owner))?;
        let id = self.ids.next_event_id();
        self.objects[index].push_listener(Listener { id, event });
        Ok(id)
    }

    /// Returns false when the owner or listener is unknown
    pub fn remove_event_listener(&mut self, owner: ObjectId, id: EventId) -> bool {
        self.get_mut(owner)
            .and_then(|o| o.remove_listener(id))
            .is_some()
    }

    pub fn apply_action(&mut self, id: ObjectId, action: Action) -> SimResult<()> {
        self.get_mut(id)
            .ok_or(SimError::UnknownObject(id))?
            .apply_action(action)
    }

    pub fn set_camera_target(&mut self, target: Option<ObjectId>) {
        self.camera_target = target;
    }

    pub fn camera(&self) -> Vec2 {
        self.camera
    }

    pub fn reset(&mut self) {
        self.camera = Vec2::ZERO;
    }

    /// Overlay requested by a handler since the last call
    pub fn take_overlay_request(&mut self) -> Option<Overlay> {
        self.overlay_request.take()
    }

    /// Advance every object by `dt` seconds
    pub fn tick(&mut self, dt: f32) {
        self.ticks += 1;

        let order: Vec<ObjectId> = self.objects.iter().map(|o| o.id()).collect();
        for id in order {
            // Despawned by an earlier handler this tick
            if self.index_of(id).is_none() {
                continue;
            }
            self.update_object(id, dt);
            self.dispatch_listeners(id);
            self.apply_commands();
        }

        if let Some(bounds) = self.settings.bounds {
            confine_to_bounds(&mut self.objects, &bounds);
        }
        mark_collisions(&mut self.objects);
        if self.settings.elastic_collisions {
            exchange_impulses(&mut self.objects);
        }
        resolve_platforms(&mut self.objects, &self.settings);

        self.follow_camera();
    }

    fn update_object(&mut self, id: ObjectId, dt: f32) {
        let support = self.get(id).and_then(|o| o.resting_platform());
        let carried = support.and_then(|p| self.get(p)).map(|p| p.velocity);
        let gravity = self.settings.gravity;

        let Some(object) = self.get_mut(id) else {
            return;
        };
        if support.is_some() && carried.is_none() {
            object.clear_resting_platform();
        }
        object.step(dt, gravity, carried);
    }

    fn trigger_matches(&self, owner: &GameObject, trigger: &Trigger) -> bool {
        match *trigger {
            Trigger::Collision { target } => self
                .get(target)
                .is_some_and(|target| target.id() != owner.id() && intersects(owner, target)),
            Trigger::Edge { axis, sign, value } => edge_crossed(&owner.bounds(), axis, sign, value),
        }
    }

    fn dispatch_listeners(&mut self, id: ObjectId) {
        let Some(index) = self.index_of(id) else {
            return;
        };

        let owner = &self.objects[index];
        let fired: Vec<EventId> = owner
            .listeners
            .iter()
            .filter(|l| self.trigger_matches(owner, &l.event.trigger))
            .map(|l| l.id)
            .collect();

        // Handlers only queue commands, so `index` stays valid for this loop
        for event_id in fired {
            let object = &mut self.objects[index];
            let Some(position) = object.listeners.iter().position(|l| l.id == event_id) else {
                continue;
            };
            let mut ctx = EventContext::new(id, event_id, &mut self.ids, &mut self.commands);

            let result = if object.listeners[position].event.once {
                let mut listener = object.listeners.remove(position);
                listener.event.handler.handle(&mut ctx)
            } else {
                object.listeners[position].event.handler.handle(&mut ctx)
            };

            if let Err(err) = result {
                log::warn!("Listener {} on {} failed: {}", event_id, id, err);
            }
        }
    }

    fn apply_commands(&mut self) {
        for command in std::mem::take(&mut self.commands) {
            match command {
                Command::Spawn(object) => {
                    self.spawn(object);
                }
                Command::Despawn(id) => {
                    self.despawn(id);
                }
                Command::SetPosition(id, position) => match self.get_mut(id) {
                    Some(object) => {
                        object.position = position;
                        object.previous_position = position;
                    }
                    None => log::debug!("set_position on missing {}", id),
                },
                Command::SetVelocity(id, velocity) => match self.get_mut(id) {
                    Some(object) => object.velocity = velocity,
                    None => log::debug!("set_velocity on missing {}", id),
                },
                Command::AddListener(owner, listener) => match self.get_mut(owner) {
                    Some(object) => object.push_listener(listener),
                    None => log::warn!("Dropping {} for missing owner {}", listener.id, owner),
                },
                Command::RemoveListener(owner, event) => {
                    self.remove_event_listener(owner, event);
                }
                Command::ShowOverlay(overlay) => {
                    self.overlay_request = Some(overlay);
                }
            }
        }
    }

    fn follow_camera(&mut self) {
        let Some(target) = self.camera_target else {
            return;
        };
        if let Some(position) = self.get(target).map(|o| o.position) {
            self.camera = position - self.settings.camera_lead;
        }
    }

    /// Draw every object, lowest depth first
    pub fn render(&self, surface: &mut dyn Surface) {
        let mut order: Vec<&GameObject> = self.objects.iter().collect();
        order.sort_by_key(|o| (o.depth, o.id()));
        for object in order {
            object.draw(surface, self.settings.viewport_height, self.camera);
        }
    }
}
