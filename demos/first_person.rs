//! First Person Example
//!
//! A walkable scene for the Rapier3D backend:
//! - A floor slab
//! - A staircase the capsule climbs with autostep
//! - A raised platform to jump onto
//!
//! ## Controls
//! - **WASD** or **Arrows**: Move
//! - **Mouse** or **Right stick**: Look
//! - **Shift** (hold): Sprint
//! - **Space**: Jump
//! - **G**: Toggle ground probe gizmos
//! - **Escape**: Release the cursor, click to grab it again

use bevy::prelude::*;
use bevy::window::{CursorGrabMode, CursorOptions, PrimaryWindow};
use bevy_rapier3d::prelude::*;
use msg_fps_controller::prelude::*;

// ==================== Constants ====================

const FLOOR_SIZE: f32 = 40.0;
const STEP_HEIGHT: f32 = 0.2;
const STEP_DEPTH: f32 = 0.6;
const STEP_COUNT: usize = 6;

const CAPSULE_HALF_HEIGHT: f32 = 0.6;
const CAPSULE_RADIUS: f32 = 0.3;
const EYE_HEIGHT: f32 = 0.7;

// ==================== Main ====================

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "First Person - Locomotion Controller Example".into(),
                resolution: (1280, 720).into(),
                ..default()
            }),
            ..default()
        }))
        // Physics
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule())
        // Character controller
        .add_plugins(FirstPersonControllerPlugin::<Rapier3dBackend>::default())
        .add_plugins(GroundProbeGizmoPlugin)
        .add_systems(Startup, (setup_scene, spawn_player))
        .add_systems(Update, (toggle_gizmos, cursor_controls))
        .run();
}

// ==================== Setup ====================

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let floor_material = materials.add(Color::srgb(0.35, 0.4, 0.35));
    let block_material = materials.add(Color::srgb(0.6, 0.55, 0.5));

    // Floor, top face at y = 0
    commands.spawn((
        Mesh3d(meshes.add(Cuboid::new(FLOOR_SIZE, 1.0, FLOOR_SIZE))),
        MeshMaterial3d(floor_material),
        Transform::from_xyz(0.0, -0.5, 0.0),
        RigidBody::Fixed,
        Collider::cuboid(FLOOR_SIZE / 2.0, 0.5, FLOOR_SIZE / 2.0),
    ));

    // Staircase heading away from the spawn point
    for i in 0..STEP_COUNT {
        let height = STEP_HEIGHT * (i + 1) as f32;
        commands.spawn((
            Mesh3d(meshes.add(Cuboid::new(3.0, height, STEP_DEPTH))),
            MeshMaterial3d(block_material.clone()),
            Transform::from_xyz(0.0, height / 2.0, -4.0 - STEP_DEPTH * i as f32),
            RigidBody::Fixed,
            Collider::cuboid(1.5, height / 2.0, STEP_DEPTH / 2.0),
        ));
    }

    // Platform at jump height
    commands.spawn((
        Mesh3d(meshes.add(Cuboid::new(4.0, 1.0, 4.0))),
        MeshMaterial3d(block_material),
        Transform::from_xyz(6.0, 0.5, -3.0),
        RigidBody::Fixed,
        Collider::cuboid(2.0, 0.5, 2.0),
    ));

    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 10.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

fn spawn_player(mut commands: Commands) {
    let rig = commands
        .spawn((Camera3d::default(), Transform::from_xyz(0.0, EYE_HEIGHT, 0.0)))
        .id();

    commands
        .spawn((
            Name::new("Player"),
            Transform::from_xyz(0.0, 2.0, 4.0),
            LocomotionConfig::player(),
            CameraRig(rig),
            PlayerControlled,
            Rapier3dCharacterBundle::capsule(CAPSULE_HALF_HEIGHT, CAPSULE_RADIUS),
        ))
        .add_child(rig);
}

// ==================== Controls ====================

fn toggle_gizmos(keyboard: Res<ButtonInput<KeyCode>>, mut gizmos: ResMut<GroundProbeGizmos>) {
    if keyboard.just_pressed(KeyCode::KeyG) {
        gizmos.enabled = !gizmos.enabled;
    }
}

/// Escape frees the cursor and stops mouse look; a click takes both back.
fn cursor_controls(
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    mut cursor: Single<&mut CursorOptions, With<PrimaryWindow>>,
    mut snapshots: Query<&mut InputSnapshot, With<PlayerControlled>>,
) {
    let locked = if keyboard.just_pressed(KeyCode::Escape) {
        false
    } else if mouse.just_pressed(MouseButton::Left) {
        true
    } else {
        return;
    };

    cursor.grab_mode = if locked {
        CursorGrabMode::Locked
    } else {
        CursorGrabMode::None
    };
    cursor.visible = !locked;

    for mut snapshot in &mut snapshots {
        snapshot.cursor_locked = locked;
        snapshot.cursor_input_for_look = locked;
    }
}
