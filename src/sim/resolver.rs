//! Platform collision resolution
//!
//! For every platform/mover pair that intersects, four corrective snaps are
//! tried in a fixed order: land on top, hit the underside, push from the left,
//! push from the right. Each case re-checks its own condition against the
//! mover's bounds as left by the previous case, comparing the mover's
//! previous-tick bounds with the platform's previous-tick bounds so that
//! platforms moving into a mover resolve the same way as a mover moving into
//! a platform.
//!
//! This is a heuristic snap, not a contact solver. The order and the snap
//! targets define how the game feels; keep them stable.

use super::intersect::{Body, bodies_intersect, intersects};
use super::object::{Bounds, Extents, GameObject, ObjectId};
use super::vector::Vector2DExt;
use crate::settings::{Settings, WorldBounds};

/// Which corrective snap was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    Landed,
    HitUnderside,
    PushedFromLeft,
    PushedFromRight,
}

/// One applied snap, reported for logging and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub mover: ObjectId,
    pub platform: ObjectId,
    pub kind: ContactKind,
}

/// Platform state captured before any mover is touched
#[derive(Debug, Clone, Copy)]
struct PlatformSnapshot {
    id: ObjectId,
    body: Body,
    bounds: Bounds,
    previous: Bounds,
}

impl PlatformSnapshot {
    fn capture(object: &GameObject) -> Option<Self> {
        if !object.is_platform() {
            return None;
        }
        Some(Self {
            id: object.id(),
            body: Body::of(object)?,
            bounds: object.bounds(),
            previous: object.previous_bounds(),
        })
    }
}

/// Resolve every mover against every platform
pub fn resolve_platforms(objects: &mut [GameObject], settings: &Settings) -> Vec<Contact> {
    let platforms: Vec<PlatformSnapshot> =
        objects.iter().filter_map(PlatformSnapshot::capture).collect();
    let mut contacts = Vec::new();

    for mover in objects.iter_mut() {
        // Objects without physics or extents are skipped, not an error
        if !mover.is_mover() {
            continue;
        }
        let Some(extents) = mover.extents() else {
            continue;
        };

        release_lost_support(mover, &platforms, settings.support_tolerance);

        for platform in &platforms {
            let Some(body) = Body::of(mover) else {
                break;
            };
            if !bodies_intersect(&platform.body, &body) {
                continue;
            }
            resolve_pair(mover, extents, platform, settings, &mut contacts);
        }
    }

    for contact in &contacts {
        log::trace!(
            "{:?}: mover {} against platform {}",
            contact.kind,
            contact.mover,
            contact.platform
        );
    }
    contacts
}

/// Drop the support reference when the platform is gone or no longer underfoot
fn release_lost_support(mover: &mut GameObject, platforms: &[PlatformSnapshot], tolerance: f32) {
    let Some(platform_id) = mover.resting_platform() else {
        return;
    };
    let bounds = mover.bounds();
    let still_supported = platforms
        .iter()
        .find(|p| p.id == platform_id)
        .is_some_and(|p| {
            bounds.overlaps_horizontally(&p.bounds)
                && bounds.bottom <= p.bounds.top + tolerance
                && bounds.bottom >= p.bounds.bottom
        });
    if !still_supported {
        log::debug!("{} left platform {}", mover.id(), platform_id);
        mover.clear_resting_platform();
    }
}

fn resolve_pair(
    mover: &mut GameObject,
    extents: Extents,
    platform: &PlatformSnapshot,
    settings: &Settings,
    contacts: &mut Vec<Contact>,
) {
    let prev = Bounds::at(mover.previous_position, extents);
    let p = platform.bounds;
    let pp = platform.previous;
    let mut cur = Bounds::at(mover.position, extents);
    let mover_id = mover.id();
    // The landing snap can round `prev.bottom` to just under the top
    let was_above = prev.bottom >= pp.top || mover.resting_platform() == Some(platform.id);
    let mut record = |kind| {
        contacts.push(Contact {
            mover: mover_id,
            platform: platform.id,
            kind,
        })
    };

    // Land on top
    if was_above && cur.bottom < p.top && cur.overlaps_horizontally(&p) {
        mover.position.y = p.top - extents.bottom;
        if let Some(physics) = mover.physics.as_mut() {
            mover.velocity.x *= 1.0 - physics.friction;
            physics.platform = Some(platform.id);
        }
        mover.velocity.y = settings.resting_velocity;
        cur = Bounds::at(mover.position, extents);
        record(ContactKind::Landed);
    }

    // Hit the underside
    if prev.top <= pp.bottom && cur.top > p.bottom && cur.overlaps_horizontally(&p) {
        mover.position.y = p.bottom - extents.top;
        mover.velocity.y = settings.ceiling_velocity;
        cur = Bounds::at(mover.position, extents);
        record(ContactKind::HitUnderside);
    }

    // Pushed from the left side
    if prev.right <= pp.left && cur.right > p.left && cur.overlaps_vertically(&p) {
        mover.position.x = p.left - extents.right;
        mover.velocity.x = -settings.push_velocity;
        cur = Bounds::at(mover.position, extents);
        record(ContactKind::PushedFromLeft);
    }

    // Pushed from the right side
    if prev.left >= pp.right && cur.left < p.right && cur.overlaps_vertically(&p) {
        mover.position.x = p.right - extents.left;
        mover.velocity.x = settings.push_velocity;
        record(ContactKind::PushedFromRight);
    }
}

/// Reset and recompute the `is_colliding` flag of every collider
pub fn mark_collisions(objects: &mut [GameObject]) {
    for object in objects.iter_mut() {
        if let Some(collider) = object.collider.as_mut() {
            collider.is_colliding = false;
        }
    }

    for i in 0..objects.len() {
        let (head, tail) = objects.split_at_mut(i + 1);
        let a = &mut head[i];
        if a.collider.is_none() {
            continue;
        }
        for b in tail.iter_mut() {
            if b.collider.is_none() || !intersects(a, b) {
                continue;
            }
            if let Some(c) = a.collider.as_mut() {
                c.is_colliding = true;
            }
            if let Some(c) = b.collider.as_mut() {
                c.is_colliding = true;
            }
        }
    }
}

fn is_elastic(object: &GameObject) -> bool {
    object.is_mover() && object.shape.is_some()
}

/// Legacy elastic response between overlapping free bodies.
///
/// Coincident centers have no collision normal; those pairs are left alone.
pub fn exchange_impulses(objects: &mut [GameObject]) {
    for i in 0..objects.len() {
        let (head, tail) = objects.split_at_mut(i + 1);
        let a = &mut head[i];
        if !is_elastic(a) {
            continue;
        }
        for b in tail.iter_mut() {
            if !is_elastic(b) || !intersects(a, b) {
                continue;
            }
            let (Some(pa), Some(pb)) = (a.physics, b.physics) else {
                continue;
            };

            let ca = a.bounds().center();
            let cb = b.bounds().center();
            let distance = ca.distance_to(cb);
            let Ok(normal) = cb.difference(ca).checked_div(distance) else {
                log::warn!("{} and {} share a center, skipping impulse", a.id(), b.id());
                continue;
            };

            let relative = a.velocity.difference(b.velocity);
            let speed = relative.x * normal.x + relative.y * normal.y;
            // Already separating
            if speed < 0.0 {
                continue;
            }

            let total_mass = pa.mass + pb.mass;
            if total_mass <= 0.0 {
                continue;
            }
            let impulse = 2.0 * speed / total_mass;
            a.velocity -= normal * (impulse * pb.mass);
            b.velocity += normal * (impulse * pa.mass);
        }
    }
}

/// Legacy viewport confinement with restitution
pub fn confine_to_bounds(objects: &mut [GameObject], bounds: &WorldBounds) {
    let keep = bounds.restitution;
    for object in objects.iter_mut() {
        if !object.is_mover() {
            continue;
        }
        let Some(extents) = object.extents() else {
            continue;
        };
        let b = object.bounds();

        if b.left < 0.0 {
            object.velocity.x = object.velocity.x.abs() * keep;
            object.position.x = -extents.left;
            object.velocity.y *= 1.0 - keep;
        } else if b.right > bounds.width {
            object.velocity.x = -object.velocity.x.abs() * keep;
            object.position.x = bounds.width - extents.right;
            object.velocity.y *= 1.0 - keep;
        }

        if b.bottom < 0.0 {
            object.velocity.y = object.velocity.y.abs() * keep;
            object.position.y = -extents.bottom;
            object.velocity.x *= 1.0 - keep;
        } else if b.top > bounds.height {
            object.velocity.y = -object.velocity.y.abs() * keep;
            object.position.y = bounds.height - extents.top;
            object.velocity.x *= 1.0 - keep;
        }
    }
}
