//! Canvas 2D backed surface

use glam::Vec2;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use super::{Color, DrawableHandle, ScreenRect, Surface};

pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    images: Vec<HtmlImageElement>,
    width: f64,
    height: f64,
}

fn css(color: Color) -> String {
    let [r, g, b, a] = color;
    format!(
        "rgba({}, {}, {}, {})",
        (r * 255.0).round() as u8,
        (g * 255.0).round() as u8,
        (b * 255.0).round() as u8,
        a
    )
}

impl CanvasSurface {
    pub fn new(ctx: CanvasRenderingContext2d, width: f64, height: f64) -> Self {
        ctx.set_font("24px sans-serif");
        Self {
            ctx,
            images: Vec::new(),
            width,
            height,
        }
    }

    /// Keep an already-loading image and hand back its handle
    pub fn register_image(&mut self, image: HtmlImageElement) -> DrawableHandle {
        self.images.push(image);
        DrawableHandle((self.images.len() - 1) as u32)
    }
}

impl Surface for CanvasSurface {
    fn clear(&mut self) {
        self.ctx.clear_rect(0.0, 0.0, self.width, self.height);
    }

    fn draw_image(&mut self, image: DrawableHandle, rect: ScreenRect) {
        let Some(element) = self.images.get(image.0 as usize) else {
            log::warn!("Unknown drawable {:?}", image);
            return;
        };
        // Not loaded yet; draw nothing this frame
        if !element.complete() {
            return;
        }
        let _ = self
            .ctx
            .draw_image_with_html_image_element_and_dw_and_dh(
                element,
                rect.x as f64,
                rect.y as f64,
                rect.width as f64,
                rect.height as f64,
            );
    }

    fn fill_rect(&mut self, rect: ScreenRect, color: Color) {
        self.ctx.set_fill_style_str(&css(color));
        self.ctx
            .fill_rect(rect.x as f64, rect.y as f64, rect.width as f64, rect.height as f64);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.ctx.set_fill_style_str(&css(color));
        self.ctx.begin_path();
        let _ = self.ctx.arc(
            center.x as f64,
            center.y as f64,
            radius as f64,
            0.0,
            std::f64::consts::TAU,
        );
        self.ctx.fill();
    }

    fn draw_text(&mut self, text: &str, at: Vec2, color: Color) {
        self.ctx.set_fill_style_str(&css(color));
        let _ = self.ctx.fill_text(text, at.x as f64, at.y as f64);
    }
}
