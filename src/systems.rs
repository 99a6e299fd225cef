//! Core controller systems.
//!
//! The fixed-step systems are generic over the physics backend and run as
//! exclusive systems so they can hand the world to the backend's move call.
//! Camera rotation runs every rendered frame.

use bevy::prelude::*;

use crate::backend::{GroundProbe, LocomotionBackend};
use crate::camera::{apply_look, CameraRig};
use crate::config::LocomotionConfig;
use crate::error::ControllerSetupError;
use crate::input::InputSnapshot;
use crate::jump::{update_jump_and_gravity, JumpOutcome};
use crate::movement::integrate_movement;
use crate::state::{Airborne, Grounded, LocomotionState};

/// Attach runtime state to newly configured avatars.
///
/// Every avatar with a [`LocomotionConfig`] must link a valid [`CameraRig`].
/// A missing snapshot is filled with the default so external providers can
/// start writing immediately.
pub fn initialize_controllers(
    mut commands: Commands,
    q_new: Query<
        (Entity, &LocomotionConfig, Option<&CameraRig>, Has<InputSnapshot>),
        Without<LocomotionState>,
    >,
    q_transforms: Query<(), With<Transform>>,
) -> Result {
    for (entity, config, rig, has_input) in &q_new {
        let rig = rig.ok_or(ControllerSetupError::NoCameraRig { avatar: entity })?;
        if rig.entity() == entity {
            return Err(ControllerSetupError::RigIsAvatar { avatar: entity }.into());
        }
        if !q_transforms.contains(rig.entity()) {
            return Err(ControllerSetupError::InvalidCameraRig {
                avatar: entity,
                rig: rig.entity(),
            }
            .into());
        }

        let mut avatar = commands.entity(entity);
        avatar.insert((LocomotionState::new(config), Grounded, GroundProbe::default()));
        if !has_input {
            avatar.insert(InputSnapshot::default());
        }

        debug!("Initialized locomotion for {entity} with camera rig {}", rig.entity());
    }
    Ok(())
}

/// Smooth speed and issue this tick's capsule move.
pub fn apply_movement<B: LocomotionBackend>(world: &mut World) {
    let dt = B::get_fixed_timestep(world);

    let entities: Vec<(Entity, LocomotionConfig, InputSnapshot, Quat)> = world
        .query::<(Entity, &LocomotionConfig, &InputSnapshot, &Transform)>()
        .iter(world)
        .map(|(e, config, input, transform)| (e, *config, *input, transform.rotation))
        .collect();

    for (entity, config, input, rotation) in entities {
        let velocity = B::get_velocity(world, entity);

        let displacement = {
            let Some(mut state) = world.get_mut::<LocomotionState>(entity) else {
                continue;
            };
            integrate_movement(&mut state, &input, velocity, rotation, dt, &config)
        };

        B::move_capsule(world, entity, displacement);
    }
}

/// Run the jump and gravity state machine.
///
/// Consumes the ground result written by the backend's sensor earlier in the
/// tick. The vertical velocity it produces is used by the next move.
pub fn apply_jump_and_gravity<B: LocomotionBackend>(world: &mut World) {
    let dt = B::get_fixed_timestep(world);

    let mut q_controllers =
        world.query::<(Entity, &LocomotionConfig, &mut LocomotionState, &mut InputSnapshot)>();

    for (entity, config, mut state, mut input) in q_controllers.iter_mut(world) {
        let outcome = update_jump_and_gravity(&mut state, &mut input, dt, config);
        if outcome == JumpOutcome::Launched {
            trace!(
                "{entity} jumped with vertical velocity {:.3}",
                state.vertical_velocity
            );
        }
    }
}

/// Sync [`Grounded`] / [`Airborne`] markers with the controller state.
pub fn sync_state_markers(
    mut commands: Commands,
    q_controllers: Query<(Entity, &LocomotionState, Has<Grounded>, Has<Airborne>)>,
) {
    for (entity, state, has_grounded, has_airborne) in &q_controllers {
        if state.grounded && !has_grounded {
            commands.entity(entity).insert(Grounded).remove::<Airborne>();
            debug!("{entity} landed");
        } else if !state.grounded && !has_airborne {
            commands.entity(entity).insert(Airborne).remove::<Grounded>();
            debug!("{entity} left the ground");
        }
    }
}

/// Pitch camera rigs and yaw avatars from look input.
pub fn apply_camera_rotation(
    time: Res<Time>,
    mut q_avatars: Query<(
        &mut LocomotionState,
        &InputSnapshot,
        &LocomotionConfig,
        &CameraRig,
        &mut Transform,
    )>,
    mut q_rigs: Query<&mut Transform, Without<LocomotionState>>,
) {
    let dt = time.delta_secs();

    for (mut state, input, config, rig, mut transform) in &mut q_avatars {
        let Some(rotation) = apply_look(&mut state, input, dt, config) else {
            continue;
        };

        if let Ok(mut rig_transform) = q_rigs.get_mut(rig.entity()) {
            rig_transform.rotation = rotation.rig_rotation();
        }
        transform.rotate(rotation.yaw_rotation());
    }
}
