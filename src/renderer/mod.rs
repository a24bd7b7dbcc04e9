//! Rendering boundary
//!
//! The simulation never knows concrete drawing primitives. Each object draws
//! itself through the [`Surface`] trait in screen space; the browser shell
//! backs it with a 2D canvas and tests back it with [`RecordingSurface`].

#[cfg(target_arch = "wasm32")]
pub mod canvas;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// RGBA color, components in 0..=1
pub type Color = [f32; 4];

/// Colors for fallback (sprite-less) drawing
pub mod colors {
    use super::Color;

    pub const BODY: Color = [0.0, 0.6, 0.69, 1.0];
    pub const BODY_COLLIDING: Color = [1.0, 0.5, 0.5, 1.0];
    pub const OVERLAY_SHADE: Color = [0.0, 0.0, 0.0, 1.0];
    pub const OVERLAY_TEXT: Color = [1.0, 1.0, 1.0, 1.0];
    pub const FPS_TEXT: Color = [0.0, 0.0, 0.0, 1.0];
}

/// Opaque handle to a pre-loaded image owned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DrawableHandle(pub u32);

/// Axis-aligned rectangle in screen space (y grows downward, origin top-left)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ScreenRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Draw target handed to every object's `draw`
pub trait Surface {
    fn clear(&mut self);
    fn draw_image(&mut self, image: DrawableHandle, rect: ScreenRect);
    fn fill_rect(&mut self, rect: ScreenRect, color: Color);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);
    fn draw_text(&mut self, text: &str, at: Vec2, color: Color);
}

/// Name → handle lookup for images the host has already loaded
#[derive(Debug, Clone, Default)]
pub struct AssetCatalog {
    handles: HashMap<String, DrawableHandle>,
}

impl AssetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, handle: DrawableHandle) {
        self.handles.insert(name.into(), handle);
    }

    /// Missing names are not an error: callers fall back to shape drawing
    pub fn get(&self, name: &str) -> Option<DrawableHandle> {
        let handle = self.handles.get(name).copied();
        if handle.is_none() {
            log::debug!("No drawable registered for '{}'", name);
        }
        handle
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

/// A single recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Clear,
    Image(DrawableHandle, ScreenRect),
    Rect(ScreenRect, Color),
    Circle(Vec2, f32, Color),
    Text(String, Vec2),
}

/// Surface that only records calls; used by the headless runner and tests
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub calls: Vec<DrawCall>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls made since the most recent `clear`
    pub fn last_frame(&self) -> &[DrawCall] {
        let start = self
            .calls
            .iter()
            .rposition(|c| *c == DrawCall::Clear)
            .map(|i| i + 1)
            .unwrap_or(0);
        &self.calls[start..]
    }
}

impl Surface for RecordingSurface {
    /// Drops the previous frame so a long run does not accumulate
    fn clear(&mut self) {
        self.calls.clear();
        self.calls.push(DrawCall::Clear);
    }

    fn draw_image(&mut self, image: DrawableHandle, rect: ScreenRect) {
        self.calls.push(DrawCall::Image(image, rect));
    }

    fn fill_rect(&mut self, rect: ScreenRect, color: Color) {
        self.calls.push(DrawCall::Rect(rect, color));
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.calls.push(DrawCall::Circle(center, radius, color));
    }

    fn draw_text(&mut self, text: &str, at: Vec2, _color: Color) {
        self.calls.push(DrawCall::Text(text.to_string(), at));
    }
}
