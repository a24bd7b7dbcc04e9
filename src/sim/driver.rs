//! Frame-driven game driver
//!
//! Owns the world and a frame scheduler. Each frame callback computes a
//! clamped delta from the host timestamp, ticks the world when running,
//! renders, then asks for the next frame. Pausing cancels the pending request;
//! a callback carrying any other handle is stale and ignored.

use glam::Vec2;

use super::object::{GameObject, ObjectId};
use super::world::World;
use crate::platform::{FrameHandle, FrameScheduler};
use crate::renderer::{DrawableHandle, ScreenRect, Surface, colors};

/// Full-screen message that suspends the world until dismissed
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub text: String,
    pub image: Option<DrawableHandle>,
}

impl Overlay {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image: None,
        }
    }

    pub fn with_image(mut self, image: Option<DrawableHandle>) -> Self {
        self.image = image;
        self
    }

    pub fn draw(&self, surface: &mut dyn Surface, viewport: Vec2) {
        surface.fill_rect(
            ScreenRect::new(0.0, 0.0, viewport.x, viewport.y),
            colors::OVERLAY_SHADE,
        );
        if let Some(image) = self.image {
            surface.draw_image(
                image,
                ScreenRect::new(
                    viewport.x * 0.25,
                    viewport.y * 0.1,
                    viewport.x * 0.5,
                    viewport.y * 0.5,
                ),
            );
        }
        surface.draw_text(
            &self.text,
            Vec2::new(viewport.x * 0.1, viewport.y * 0.75),
            colors::OVERLAY_TEXT,
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverMode {
    Running,
    SuspendedForOverlay,
}

pub struct GameDriver<S: FrameScheduler> {
    world: World,
    scheduler: S,
    mode: DriverMode,
    overlay: Option<Overlay>,
    pending_frame: Option<FrameHandle>,
    last_timestamp: Option<f64>,
    // FPS tracking
    frame_times: [f64; 60],
    frame_index: usize,
    fps: u32,
}

impl<S: FrameScheduler> GameDriver<S> {
    pub fn new(world: World, scheduler: S) -> Self {
        Self {
            world,
            scheduler,
            mode: DriverMode::Running,
            overlay: None,
            pending_frame: None,
            last_timestamp: None,
            frame_times: [0.0; 60],
            frame_index: 0,
            fps: 0,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn mode(&self) -> DriverMode {
        self.mode
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn spawn(&mut self, object: GameObject) -> ObjectId {
        self.world.spawn(object)
    }

    pub fn despawn(&mut self, id: ObjectId) -> Option<GameObject> {
        self.world.despawn(id)
    }

    /// Begin (or resume) the frame loop; the first frame integrates nothing
    pub fn start(&mut self) {
        if self.pending_frame.is_some() {
            return;
        }
        self.last_timestamp = None;
        self.pending_frame = Some(self.scheduler.request_frame());
        log::info!("Driver started");
    }

    /// Stop the frame loop without touching world state
    pub fn pause(&mut self) {
        if let Some(handle) = self.pending_frame.take() {
            self.scheduler.cancel_frame(handle);
            log::info!("Driver paused");
        }
    }

    pub fn is_running(&self) -> bool {
        self.pending_frame.is_some()
    }

    pub fn show_overlay(&mut self, overlay: Overlay) {
        log::info!("Suspending for overlay: {:?}", overlay.text);
        self.overlay = Some(overlay);
        self.mode = DriverMode::SuspendedForOverlay;
    }

    pub fn dismiss_overlay(&mut self) {
        if self.mode == DriverMode::SuspendedForOverlay {
            log::info!("Overlay dismissed, resuming");
        }
        self.overlay = None;
        self.mode = DriverMode::Running;
    }

    /// Frame callback; `timestamp_ms` is the host's monotonic frame time
    pub fn on_frame(&mut self, handle: FrameHandle, timestamp_ms: f64, surface: &mut dyn Surface) {
        if self.pending_frame != Some(handle) {
            log::debug!("Ignoring stale frame {:?}", handle);
            return;
        }
        self.pending_frame = None;

        let dt = match self.last_timestamp {
            Some(last) => self
                .world
                .settings()
                .clamp_frame_dt(((timestamp_ms - last) / 1000.0) as f32),
            None => 0.0,
        };
        self.last_timestamp = Some(timestamp_ms);
        self.track_fps(timestamp_ms);

        if self.mode == DriverMode::Running {
            self.world.tick(dt);
            if let Some(overlay) = self.world.take_overlay_request() {
                self.show_overlay(overlay);
            }
        }

        self.render(surface);
        self.pending_frame = Some(self.scheduler.request_frame());
    }

    fn track_fps(&mut self, time: f64) {
        self.frame_times[self.frame_index] = time;
        self.frame_index = (self.frame_index + 1) % self.frame_times.len();

        // Oldest sample is the slot we write next
        let oldest = self.frame_times[self.frame_index];
        if oldest > 0.0 {
            let elapsed = time - oldest;
            if elapsed > 0.0 {
                let intervals = (self.frame_times.len() - 1) as f64;
                self.fps = (intervals * 1000.0 / elapsed).round() as u32;
            }
        }
    }

    fn render(&self, surface: &mut dyn Surface) {
        let settings = self.world.settings();
        let viewport = Vec2::new(settings.viewport_width, settings.viewport_height);

        surface.clear();
        match (self.mode, &self.overlay) {
            (DriverMode::SuspendedForOverlay, Some(overlay)) => overlay.draw(surface, viewport),
            _ => self.world.render(surface),
        }

        if settings.show_fps {
            surface.draw_text(
                &format!("FPS: {}", self.fps),
                Vec2::new(10.0, 20.0),
                colors::FPS_TEXT,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::platform::ManualScheduler;
    use crate::renderer::{DrawCall, RecordingSurface};
    use crate::settings::Settings;
    use crate::sim::event::{Axis, EdgeSign, Event};

    fn driver(settings: Settings) -> (GameDriver<ManualScheduler>, ObjectId) {
        let mut world = World::new(settings);
        let faller = world
            .create_object(Vec2::new(0.0, 1000.0), Vec2::ZERO)
            .with_rect(10.0, 10.0)
            .with_collider()
            .with_physics(0.0, 1.0);
        let id = world.spawn(faller);
        (GameDriver::new(world, ManualScheduler::new()), id)
    }

    fn frame(driver: &mut GameDriver<ManualScheduler>, at: f64, surface: &mut RecordingSurface) {
        let handle = driver.scheduler().pending().unwrap();
        driver.on_frame(handle, at, surface);
    }

    #[test]
    fn test_first_frame_has_zero_dt() {
        let (mut driver, id) = driver(Settings::default());
        let mut surface = RecordingSurface::new();
        driver.start();
        assert!(driver.is_running());

        frame(&mut driver, 5000.0, &mut surface);
        assert_eq!(driver.world().ticks(), 1);
        assert_eq!(driver.world().get(id).unwrap().position.y, 1000.0);
        // Next frame already requested
        assert_eq!(driver.scheduler().requested, 2);
    }

    #[test]
    fn test_long_frames_are_clamped() {
        let (mut driver, id) = driver(Settings::default());
        let mut surface = RecordingSurface::new();
        driver.start();
        frame(&mut driver, 0.0, &mut surface);
        frame(&mut driver, 3000.0, &mut surface);

        let velocity = driver.world().get(id).unwrap().velocity.y;
        assert_eq!(velocity, -(G * 1.0) * MAX_FRAME_DT);
    }

    #[test]
    fn test_pause_cancels_and_ignores_stale_frames() {
        let (mut driver, _) = driver(Settings::default());
        let mut surface = RecordingSurface::new();
        driver.start();
        frame(&mut driver, 0.0, &mut surface);

        let stale = driver.scheduler().pending().unwrap();
        driver.pause();
        assert!(!driver.is_running());
        assert_eq!(driver.scheduler().cancelled, 1);

        // A callback that fires anyway must not tick
        driver.on_frame(stale, 16.0, &mut surface);
        assert_eq!(driver.world().ticks(), 1);

        // Resume: first frame after start integrates nothing
        driver.start();
        let before = driver.world().objects()[0].position;
        frame(&mut driver, 60_000.0, &mut surface);
        assert_eq!(driver.world().ticks(), 2);
        assert_eq!(driver.world().objects()[0].position, before);
    }

    #[test]
    fn test_start_twice_keeps_one_request() {
        let (mut driver, _) = driver(Settings::default());
        driver.start();
        driver.start();
        assert_eq!(driver.scheduler().requested, 1);
    }

    #[test]
    fn test_overlay_suspends_world() {
        let (mut driver, id) = driver(Settings::default());
        driver
            .world_mut()
            .add_event_listener(
                id,
                Event::edge(EdgeSign::Greater, Axis::Y, 0.0, true, |ctx| {
                    ctx.show_overlay(
                        Overlay::text("Hello there").with_image(Some(DrawableHandle(3))),
                    );
                    Ok(())
                }),
            )
            .unwrap();

        let mut surface = RecordingSurface::new();
        driver.start();
        frame(&mut driver, 0.0, &mut surface);
        assert_eq!(driver.mode(), DriverMode::SuspendedForOverlay);
        assert_eq!(driver.overlay().unwrap().text, "Hello there");

        // Only the overlay is drawn, and the world stands still
        let ticks = driver.world().ticks();
        frame(&mut driver, 16.0, &mut surface);
        assert_eq!(driver.world().ticks(), ticks);
        let calls = surface.last_frame();
        assert_eq!(calls.len(), 3);
        assert!(matches!(calls[1], DrawCall::Image(DrawableHandle(3), _)));
        assert!(matches!(&calls[2], DrawCall::Text(text, _) if text == "Hello there"));

        driver.dismiss_overlay();
        frame(&mut driver, 32.0, &mut surface);
        assert_eq!(driver.mode(), DriverMode::Running);
        assert_eq!(driver.world().ticks(), ticks + 1);
    }

    #[test]
    fn test_fps_text_when_enabled() {
        let settings = Settings {
            show_fps: true,
            ..Default::default()
        };
        let (mut driver, _) = driver(settings);
        let mut surface = RecordingSurface::new();
        driver.start();
        for i in 0..61 {
            frame(&mut driver, 1000.0 + i as f64 * 1000.0 / 60.0, &mut surface);
        }
        assert_eq!(driver.fps(), 60);
        assert!(matches!(
            surface.last_frame().last(),
            Some(DrawCall::Text(text, _)) if text == "FPS: 60"
        ));
    }

    #[test]
    fn test_delegates_spawn_and_despawn() {
        let (mut driver, _) = driver(Settings::default());
        let extra = driver
            .world_mut()
            .create_object(Vec2::ZERO, Vec2::ZERO)
            .with_radius(2.0);
        let extra = driver.spawn(extra);
        assert_eq!(driver.world().len(), 2);
        assert!(driver.despawn(extra).is_some());
        assert_eq!(driver.world().len(), 1);
    }
}
