//! End-to-end tests against the Rapier3D backend.
#![cfg(feature = "rapier3d")]

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bevy_rapier3d::prelude::*;
use msg_fps_controller::prelude::*;

/// Create an app where every update advances exactly one 60 Hz physics step.
fn create_test_app() -> App {
    let mut app = App::new();

    app.add_plugins(MinimalPlugins);
    app.add_plugins(TransformPlugin);
    app.add_plugins(RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule());
    app.add_plugins(FirstPersonControllerPlugin::<Rapier3dBackend, ExternalInput>::default());
    app.insert_resource(Time::<Fixed>::from_hz(60.0));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
        1.0 / 60.0,
    )));

    app.finish();
    app.cleanup();
    app
}

/// Spawn a 100 x 1 x 100 slab whose top face is at y = 0.5.
fn spawn_ground(app: &mut App) -> Entity {
    app.world_mut()
        .spawn((
            Transform::default(),
            RigidBody::Fixed,
            Collider::cuboid(50.0, 0.5, 50.0),
        ))
        .id()
}

/// Spawn an avatar with the default 1.8 tall capsule.
fn spawn_avatar(app: &mut App, position: Vec3, config: LocomotionConfig) -> Entity {
    let rig = app
        .world_mut()
        .spawn(Transform::from_xyz(0.0, 0.7, 0.0))
        .id();
    app.world_mut()
        .spawn((
            Transform::from_translation(position),
            config,
            CameraRig(rig),
            Rapier3dCharacterBundle::default(),
        ))
        .id()
}

fn run_frames(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}

fn state(app: &App, entity: Entity) -> LocomotionState {
    *app.world().get::<LocomotionState>(entity).unwrap()
}

fn position(app: &App, entity: Entity) -> Vec3 {
    app.world().get::<Transform>(entity).unwrap().translation
}

#[test]
fn avatar_lands_on_ground() {
    let mut app = create_test_app();
    spawn_ground(&mut app);
    let avatar = spawn_avatar(&mut app, Vec3::new(0.0, 3.0, 0.0), LocomotionConfig::default());

    run_frames(&mut app, 240);

    // Capsule centre rests 0.9 above the slab top
    let y = position(&app, avatar).y;
    assert!(y > 1.3 && y < 1.6, "avatar rests at y = {y}");
    assert!(state(&app, avatar).grounded);
    assert_eq!(state(&app, avatar).vertical_velocity, -2.0);
    assert!(app.world().get::<Grounded>(avatar).is_some());

    // Sphere recorded under the capsule: 0.9 to the feet, 0.2 below that
    let probe = *app.world().get::<GroundProbe>(avatar).unwrap();
    assert!((probe.center.y - (y - 1.1)).abs() < 0.05);
}

#[test]
fn avatar_without_ground_keeps_falling() {
    let mut app = create_test_app();
    let avatar = spawn_avatar(&mut app, Vec3::new(0.0, 100.0, 0.0), LocomotionConfig::default());

    for _ in 0..120 {
        app.update();
        assert!(state(&app, avatar).vertical_velocity >= -54.0);
    }

    assert!(!state(&app, avatar).grounded);
    assert!(state(&app, avatar).vertical_velocity < 0.0);
    assert!(position(&app, avatar).y < 100.0);
    assert!(app.world().get::<Airborne>(avatar).is_some());
}

#[test]
fn avatar_walks_forward_on_ground() {
    let mut app = create_test_app();
    spawn_ground(&mut app);
    let avatar = spawn_avatar(&mut app, Vec3::new(0.0, 1.5, 0.0), LocomotionConfig::default());
    run_frames(&mut app, 60);
    let start = position(&app, avatar);

    app.world_mut()
        .get_mut::<InputSnapshot>(avatar)
        .unwrap()
        .set_move(Vec2::new(0.0, 1.0));
    run_frames(&mut app, 120);

    let end = position(&app, avatar);
    assert!(end.z < start.z - 3.0, "moved from {start} to {end}");
    assert!((end.y - start.y).abs() < 0.1);
    assert!(state(&app, avatar).grounded);
    assert!((state(&app, avatar).current_speed - 4.0).abs() < 0.2);
}

#[test]
fn ground_outside_mask_is_ignored() {
    let mut app = create_test_app();
    app.world_mut().spawn((
        Transform::default(),
        RigidBody::Fixed,
        Collider::cuboid(50.0, 0.5, 50.0),
        CollisionGroups::new(Group::GROUP_2, Group::ALL),
    ));
    let config =
        LocomotionConfig::default().with_ground_mask(GroundMask::from_bits(Group::GROUP_1.bits()));
    let avatar = spawn_avatar(&mut app, Vec3::new(0.0, 1.5, 0.0), config);

    run_frames(&mut app, 60);

    // The capsule still collides with the slab but never counts as grounded
    assert!(!state(&app, avatar).grounded);
    assert!(position(&app, avatar).y > 1.0);
}
