//! Rapier3D physics backend implementation.
//!
//! Capsule moves go through Rapier's `KinematicCharacterController`, which
//! slides along walls and climbs small steps. Ground detection is a sphere
//! intersection query against the Rapier context. Enable with the `rapier3d`
//! feature (on by default).

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::backend::{GroundProbe, LocomotionBackend};
use crate::config::LocomotionConfig;
use crate::state::LocomotionState;
use crate::LocomotionSet;

/// Rapier3D physics backend for the first-person controller.
///
/// The avatar needs a kinematic rigid body, a collider and a
/// [`KinematicCharacterController`]; [`Rapier3dCharacterBundle`] provides all
/// three. Run Rapier in the fixed schedule
/// (`RapierPhysicsPlugin::in_fixed_schedule`) so each move request is resolved
/// once per controller tick.
pub struct Rapier3dBackend;

impl LocomotionBackend for Rapier3dBackend {
    fn plugin() -> impl Plugin {
        Rapier3dBackendPlugin
    }

    fn get_velocity(world: &World, entity: Entity) -> Vec3 {
        let dt = Self::get_fixed_timestep(world);
        world
            .get::<KinematicCharacterControllerOutput>(entity)
            .map(|output| output.effective_translation / dt)
            .unwrap_or(Vec3::ZERO)
    }

    fn move_capsule(world: &mut World, entity: Entity, displacement: Vec3) {
        if let Some(mut controller) = world.get_mut::<KinematicCharacterController>(entity) {
            controller.translation = Some(displacement);
        } else {
            warn_once!("{entity} has no KinematicCharacterController; capsule moves are dropped");
        }
    }
}

/// Plugin that registers the Rapier ground sensor.
pub struct Rapier3dBackendPlugin;

impl Plugin for Rapier3dBackendPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            rapier_ground_check.in_set(LocomotionSet::Sensors),
        );
    }
}

/// Distance from a collider's centre down to its lowest point.
///
/// Capsules report half height plus radius, balls their radius and cuboids
/// their half extent. Other shapes report 0, so the probe is measured from the
/// entity origin.
pub fn get_collider_bottom_offset(collider: &Collider) -> f32 {
    if let Some(capsule) = collider.as_capsule() {
        let segment = capsule.segment();
        (segment.a().y - segment.b().y).abs() / 2.0 + capsule.radius()
    } else if let Some(ball) = collider.as_ball() {
        ball.radius()
    } else if let Some(cuboid) = collider.as_cuboid() {
        cuboid.half_extents().y
    } else {
        0.0
    }
}

/// Query filter for a ground probe cast from `entity`.
///
/// Sensors never count as ground and the avatar's own body is skipped. The
/// probe is a member of every group and filters by the configured mask.
pub fn ground_filter(probe: &GroundProbe, entity: Entity) -> QueryFilter<'static> {
    QueryFilter::default()
        .exclude_sensors()
        .exclude_rigid_body(entity)
        .exclude_collider(entity)
        .groups(CollisionGroups::new(
            Group::ALL,
            Group::from_bits_truncate(probe.mask.bits()),
        ))
}

/// Rapier ground detection using a sphere intersection query.
fn rapier_ground_check(
    rapier_context: ReadRapierContext,
    mut q_controllers: Query<(
        Entity,
        &Transform,
        &LocomotionConfig,
        &mut LocomotionState,
        Option<&Collider>,
        Option<&mut GroundProbe>,
    )>,
) {
    let Ok(context) = rapier_context.single() else {
        warn_once!("No Rapier context found; every avatar reads as airborne");
        for (_, _, _, mut state, _, _) in &mut q_controllers {
            state.grounded = false;
        }
        return;
    };

    for (entity, transform, config, mut state, collider, last_probe) in &mut q_controllers {
        let feet_offset = collider.map(get_collider_bottom_offset).unwrap_or(0.0);
        let probe = GroundProbe::below(transform.translation, feet_offset, config);
        if let Some(mut last_probe) = last_probe {
            *last_probe = probe;
        }

        let sphere = Collider::ball(probe.radius);
        let mut hit = false;
        context.intersect_shape(
            probe.center,
            Quat::IDENTITY,
            sphere.raw.as_ref(),
            ground_filter(&probe, entity),
            |_| {
                hit = true;
                false
            },
        );
        state.grounded = hit;
    }
}

/// Bundle of the Rapier components a first-person avatar needs.
///
/// # Example
///
/// ```ignore
/// use bevy::prelude::*;
/// use msg_fps_controller::prelude::*;
/// use msg_fps_controller::rapier::Rapier3dCharacterBundle;
///
/// fn spawn_player(mut commands: Commands) {
///     let rig = commands
///         .spawn((Camera3d::default(), Transform::from_xyz(0.0, 0.7, 0.0)))
///         .id();
///     commands
///         .spawn((
///             Transform::from_xyz(0.0, 2.0, 0.0),
///             LocomotionConfig::player(),
///             CameraRig(rig),
///             PlayerControlled,
///             Rapier3dCharacterBundle::capsule(0.6, 0.3),
///         ))
///         .add_child(rig);
/// }
/// ```
///
/// # Defaults
///
/// - `rigid_body`: [`RigidBody::KinematicPositionBased`]
/// - `controller`: autostep up to 0.3, no ground snapping (the controller
///   keeps a small downward velocity while grounded instead)
/// - `collider`: capsule with half height 0.6 and radius 0.3 (1.8 tall)
#[derive(Bundle)]
pub struct Rapier3dCharacterBundle {
    /// Kinematic body moved by the character controller.
    pub rigid_body: RigidBody,
    /// Rapier's collide-and-slide mover.
    pub controller: KinematicCharacterController,
    /// The avatar's capsule.
    pub collider: Collider,
}

impl Default for Rapier3dCharacterBundle {
    fn default() -> Self {
        Self::capsule(0.6, 0.3)
    }
}

impl Rapier3dCharacterBundle {
    /// Create a bundle with a vertical capsule centred on the entity origin.
    pub fn capsule(half_height: f32, radius: f32) -> Self {
        Self {
            rigid_body: RigidBody::KinematicPositionBased,
            controller: KinematicCharacterController {
                snap_to_ground: None,
                autostep: Some(CharacterAutostep {
                    max_height: CharacterLength::Absolute(0.3),
                    min_width: CharacterLength::Absolute(0.2),
                    include_dynamic_bodies: false,
                }),
                ..default()
            },
            collider: Collider::capsule_y(half_height, radius),
        }
    }

    /// Set the maximum step height climbed automatically. Zero disables it.
    pub fn with_step_height(mut self, height: f32) -> Self {
        self.controller.autostep = (height > 0.0).then(|| CharacterAutostep {
            max_height: CharacterLength::Absolute(height),
            min_width: CharacterLength::Absolute(0.2),
            include_dynamic_bodies: false,
        });
        self
    }

    /// Set the collision groups the capsule itself collides with.
    pub fn with_filter_groups(mut self, groups: CollisionGroups) -> Self {
        self.controller.filter_groups = Some(groups);
        self
    }
}
