//! Physics backend abstraction.
//!
//! This module defines the trait that physics backends must implement
//! to work with the controller. The core never talks to a physics engine
//! directly: it asks the backend to move the capsule and reads back the
//! collision-resolved velocity. Ground detection is performed by a sensor
//! system the backend registers in [`LocomotionSet::Sensors`](crate::LocomotionSet),
//! which fills [`LocomotionState::grounded`](crate::state::LocomotionState)
//! from a [`GroundProbe`] and stores that probe on the avatar.

use bevy::prelude::*;

use crate::config::{GroundMask, LocomotionConfig};

/// Trait for physics backend implementations.
///
/// Implement this trait to integrate a physics engine with the controller.
/// See the `rapier` module's `Rapier3dBackend` for a complete implementation.
pub trait LocomotionBackend: 'static + Send + Sync {
    /// Returns the plugin that sets up this backend, including its ground
    /// sensor system.
    fn plugin() -> impl Plugin;

    /// Get the capsule's velocity as resolved by the last move.
    ///
    /// This is the velocity the capsule actually achieved after collisions,
    /// not the velocity that was requested.
    fn get_velocity(world: &World, entity: Entity) -> Vec3;

    /// Request a collision-respecting displacement of the capsule.
    ///
    /// Called at most once per entity per tick.
    fn move_capsule(world: &mut World, entity: Entity, displacement: Vec3);

    /// Get the current position of an entity.
    fn get_position(world: &World, entity: Entity) -> Vec3 {
        world
            .get::<Transform>(entity)
            .map(|t| t.translation)
            .unwrap_or(Vec3::ZERO)
    }

    /// Get the fixed timestep delta time.
    fn get_fixed_timestep(world: &World) -> f32 {
        world
            .get_resource::<Time<Fixed>>()
            .map(|t| t.delta_secs())
            .filter(|&d| d > 0.0)
            .unwrap_or(1.0 / 60.0)
    }
}

/// The sphere overlap used to decide whether the avatar stands on ground.
///
/// Also a component: sensors overwrite it with the probe they cast each tick,
/// which is what [`GroundProbeGizmoPlugin`](crate::debug::GroundProbeGizmoPlugin)
/// draws.
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq)]
#[reflect(Component)]
pub struct GroundProbe {
    /// Sphere centre in world space.
    pub center: Vec3,
    /// Sphere radius.
    pub radius: f32,
    /// Collision groups that count as ground.
    pub mask: GroundMask,
}

impl GroundProbe {
    /// Build the probe below an avatar.
    ///
    /// `feet_offset` is the distance from the entity origin down to the
    /// bottom of its collider (zero when the origin already sits at the
    /// feet). The sphere is centred `ground_offset` below the feet.
    pub fn below(position: Vec3, feet_offset: f32, config: &LocomotionConfig) -> Self {
        Self {
            center: Vec3::new(
                position.x,
                position.y - feet_offset - config.ground_offset,
                position.z,
            ),
            radius: config.ground_radius,
            mask: config.ground_mask,
        }
    }

    /// Check the probe against a horizontal floor plane at `floor_height`.
    ///
    /// Useful for simple backends and tests that have no collision world.
    pub fn overlaps_floor(&self, floor_height: f32) -> bool {
        self.center.y - self.radius <= floor_height
    }
}
