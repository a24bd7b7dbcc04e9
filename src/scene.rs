//! Demo level wiring
//!
//! Spawns a small level into a world and hooks up the two gameplay triggers:
//! meeting the snowman opens a dialogue overlay, and falling below the
//! bottom of the world sends the player back to the respawn point.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::error::SimResult;
use crate::renderer::AssetCatalog;
use crate::sim::{
    Axis, Controls, EdgeSign, Event, Extents, MovingBehavior, ObjectId, Overlay, RepeatPolicy,
    World,
};

pub const PLAYER_RESPAWN: Vec2 = Vec2::new(250.0, 250.0);

pub const SNOWMAN_LINE: &str =
    "So you made it this far! Your presents stay with me. No holiday for you this year!";

/// Ids of everything the demo spawned
#[derive(Debug, Clone)]
pub struct DemoScene {
    pub player: ObjectId,
    pub snowman: ObjectId,
    pub ground: ObjectId,
    pub ledge: ObjectId,
    pub lift: ObjectId,
    pub debris: Vec<ObjectId>,
}

/// Populate `world` with the demo level; `debris` seeded circles are dropped in
pub fn build_demo(
    world: &mut World,
    assets: &AssetCatalog,
    seed: u64,
    debris: usize,
) -> SimResult<DemoScene> {
    let ground = world
        .create_object(Vec2::new(0.0, 0.0), Vec2::ZERO)
        .with_label("ground")
        .with_rect(2000.0, 150.0)
        .as_platform()
        .with_sprite(assets.get("platform.ground"));
    let ground = world.spawn(ground);

    let ledge = world
        .create_object(Vec2::new(600.0, 300.0), Vec2::ZERO)
        .with_label("ledge")
        .with_rect(300.0, 40.0)
        .as_platform()
        .with_sprite(assets.get("platform.ledge"));
    let ledge = world.spawn(ledge);

    let lift = world
        .create_object(Vec2::new(1000.0, 200.0), Vec2::ZERO)
        .with_label("lift")
        .with_rect(200.0, 30.0)
        .with_sprite(assets.get("platform.lift"))
        .with_motion(MovingBehavior {
            target: Vec2::new(1000.0, 450.0),
            duration: 3.0,
            repeat: RepeatPolicy::FromEnd,
            delay: 0.5,
            shift: 0.0,
        })?;
    let lift = world.spawn(lift);

    let snowman = world
        .create_object(Vec2::new(1500.0, 150.0), Vec2::ZERO)
        .with_label("snowman")
        .with_rect(48.0, 64.0)
        .with_collider()
        .with_sprite(assets.get("characters.snowman"))
        .with_depth(1);
    let snowman = world.spawn(snowman);

    let player = world
        .create_object(PLAYER_RESPAWN, Vec2::ZERO)
        .with_label("player")
        .with_rect(PLAYER_SIZE, PLAYER_SIZE)
        .with_collider_extents(Extents {
            top: PLAYER_SIZE,
            bottom: 0.0,
            left: 0.0,
            right: PLAYER_SIZE - PLAYER_RIGHT_INSET,
        })
        .with_physics(PLAYER_FRICTION, PLAYER_MASS)
        .with_controls(Controls::default())
        .with_sprite(assets.get("characters.player"))
        .with_depth(2);
    let player = world.spawn(player);
    world.set_camera_target(Some(player));

    let dialog = assets.get("dialog.overlay");
    world.add_event_listener(
        player,
        Event::collision(snowman, true, move |ctx| {
            ctx.show_overlay(Overlay::text(SNOWMAN_LINE).with_image(dialog));
            Ok(())
        }),
    )?;

    world.add_event_listener(
        player,
        Event::edge(EdgeSign::Less, Axis::Y, 0.0, false, |ctx| {
            let owner = ctx.owner();
            log::info!("{} fell out of the world, respawning", owner);
            ctx.set_position(owner, PLAYER_RESPAWN);
            ctx.set_velocity(owner, Vec2::ZERO);
            Ok(())
        }),
    )?;

    let mut rng = Pcg32::seed_from_u64(seed);
    let debris = (0..debris)
        .map(|_| {
            let position = Vec2::new(
                rng.random_range(100.0..1900.0),
                rng.random_range(400.0..800.0),
            );
            let radius = rng.random_range(10.0..25.0);
            let mass = rng.random_range(1.0..20.0);
            let body = world
                .create_object(position, Vec2::ZERO)
                .with_label("debris")
                .with_radius(radius)
                .with_collider()
                .with_physics(0.3, mass);
            world.spawn(body)
        })
        .collect();

    log::info!("Demo scene built with seed {}", seed);
    Ok(DemoScene {
        player,
        snowman,
        ground,
        ledge,
        lift,
        debris,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::DrawableHandle;
    use crate::settings::Settings;

    const DT: f32 = 1.0 / 60.0;

    fn demo(debris: usize) -> (World, DemoScene) {
        let mut world = World::new(Settings::default());
        let scene = build_demo(&mut world, &AssetCatalog::new(), 7, debris).unwrap();
        (world, scene)
    }

    #[test]
    fn test_player_lands_on_ground() {
        let (mut world, scene) = demo(0);
        for _ in 0..120 {
            world.tick(DT);
        }
        let player = world.get(scene.player).unwrap();
        assert_eq!(player.resting_platform(), Some(scene.ground));
        assert_eq!(player.position.y, 150.0);
        assert_eq!(player.extents().unwrap().right, PLAYER_SIZE - PLAYER_RIGHT_INSET);
    }

    #[test]
    fn test_falling_out_respawns() {
        let (mut world, scene) = demo(0);
        let player = world.get_mut(scene.player).unwrap();
        player.position = Vec2::new(3000.0, -200.0);
        player.velocity = Vec2::new(0.0, -400.0);

        world.tick(DT);
        let player = world.get(scene.player).unwrap();
        assert_eq!(player.position, PLAYER_RESPAWN);
        assert_eq!(player.velocity, Vec2::ZERO);
        assert_eq!(world.camera(), PLAYER_RESPAWN - Vec2::splat(CAMERA_LEAD));
    }

    #[test]
    fn test_meeting_snowman_opens_overlay_once() {
        let mut world = World::new(Settings::default());
        let mut assets = AssetCatalog::new();
        assets.insert("dialog.overlay", DrawableHandle(4));
        let scene = build_demo(&mut world, &assets, 1, 0).unwrap();

        let player = world.get_mut(scene.player).unwrap();
        player.position = Vec2::new(1490.0, 150.0);
        player.previous_position = player.position;

        world.tick(DT);
        let overlay = world.take_overlay_request().unwrap();
        assert_eq!(overlay.text, SNOWMAN_LINE);
        assert_eq!(overlay.image, Some(DrawableHandle(4)));

        world.tick(DT);
        assert!(world.take_overlay_request().is_none());
        assert!(world.get(scene.snowman).unwrap().is_colliding());
    }

    #[test]
    fn test_debris_is_seeded() {
        let (a, scene_a) = demo(5);
        let (b, scene_b) = demo(5);
        assert_eq!(scene_a.debris.len(), 5);
        for (x, y) in scene_a.debris.iter().zip(&scene_b.debris) {
            let (x, y) = (a.get(*x).unwrap(), b.get(*y).unwrap());
            assert_eq!(x.position, y.position);
            assert_eq!(x.physics, y.physics);
        }

        let mut other = World::new(Settings::default());
        let scene_c = build_demo(&mut other, &AssetCatalog::new(), 8, 5).unwrap();
        let first = |w: &World, s: &DemoScene| w.get(s.debris[0]).unwrap().position;
        assert_ne!(first(&a, &scene_a), first(&other, &scene_c));
    }

    #[test]
    fn test_lift_waits_then_moves() {
        let (mut world, scene) = demo(0);
        let start = world.get(scene.lift).unwrap().position;
        for _ in 0..20 {
            world.tick(DT);
        }
        assert_eq!(world.get(scene.lift).unwrap().position, start);
        for _ in 0..30 {
            world.tick(DT);
        }
        assert!(world.get(scene.lift).unwrap().position.y > start.y);
        assert!(world.get(scene.ledge).unwrap().is_platform());
    }
}
