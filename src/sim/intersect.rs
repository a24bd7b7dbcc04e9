//! Intersection predicates
//!
//! Pure functions, dispatched on the shape variants of the two operands.
//! Objects without a shape never intersect anything.

use glam::Vec2;

use super::object::{Bounds, GameObject, Shape};
use super::vector::Vector2DExt;

/// Collision geometry of one object at its current position
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Body {
    Rect(Bounds),
    Circle { center: Vec2, radius: f32 },
}

impl Body {
    pub fn of(object: &GameObject) -> Option<Body> {
        match object.shape? {
            Shape::Rect { .. } => Some(Body::Rect(object.bounds())),
            Shape::Round { radius } => Some(Body::Circle {
                center: object.position,
                radius,
            }),
        }
    }
}

/// AABB overlap; touching edges count as intersecting
pub fn rect_intersect(a: &Bounds, b: &Bounds) -> bool {
    !(b.left > a.right || a.left > b.right || b.bottom > a.top || a.bottom > b.top)
}

/// Nearest point of the rectangle to the circle center, compared to the radius
pub fn rect_circle_intersect(rect: &Bounds, center: Vec2, radius: f32) -> bool {
    let mut test = center;

    if center.x < rect.left {
        test.x = rect.left;
    } else if center.x > rect.right {
        test.x = rect.right;
    }

    if center.y < rect.bottom {
        test.y = rect.bottom;
    } else if center.y > rect.top {
        test.y = rect.top;
    }

    center.distance_to(test) <= radius
}

pub fn circle_intersect(c1: Vec2, r1: f32, c2: Vec2, r2: f32) -> bool {
    c1.distance_to(c2) <= r1 + r2
}

pub fn bodies_intersect(a: &Body, b: &Body) -> bool {
    match (a, b) {
        (Body::Rect(ra), Body::Rect(rb)) => rect_intersect(ra, rb),
        (Body::Rect(rect), Body::Circle { center, radius })
        | (Body::Circle { center, radius }, Body::Rect(rect)) => {
            rect_circle_intersect(rect, *center, *radius)
        }
        (
            Body::Circle {
                center: c1,
                radius: r1,
            },
            Body::Circle {
                center: c2,
                radius: r2,
            },
        ) => circle_intersect(*c1, *r1, *c2, *r2),
    }
}

/// Shape-dispatched test; unrecognized pairs report no intersection
pub fn intersects(a: &GameObject, b: &GameObject) -> bool {
    match (Body::of(a), Body::of(b)) {
        (Some(a), Some(b)) => bodies_intersect(&a, &b),
        _ => false,
    }
}
