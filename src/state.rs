//! Locomotion state and marker components.
//!
//! [`LocomotionState`] holds everything the controller mutates between ticks.
//! The [`Grounded`] and [`Airborne`] markers mirror `LocomotionState::grounded`
//! for convenient filtering in gameplay queries.

use bevy::prelude::*;

use crate::config::LocomotionConfig;

/// Mutable per-avatar locomotion state.
///
/// Created once per avatar by the controller's initialization system and owned
/// exclusively by the controller systems afterwards.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct LocomotionState {
    /// Smoothed horizontal speed.
    pub current_speed: f32,
    /// Signed vertical velocity. Never below `-terminal_velocity`.
    pub vertical_velocity: f32,
    /// Result of the most recent ground probe.
    pub grounded: bool,
    /// Countdown gating the next jump while grounded.
    pub jump_cooldown: f32,
    /// Countdown before gravity takes over after leaving the ground.
    pub fall_cooldown: f32,
    /// Accumulated camera pitch in degrees. Positive looks down.
    pub camera_pitch: f32,
    /// Last normalized horizontal movement direction.
    pub last_direction: Vec3,
}

impl Default for LocomotionState {
    fn default() -> Self {
        Self::new(&LocomotionConfig::default())
    }
}

impl LocomotionState {
    /// Create a fresh state with cooldowns primed from the config.
    pub fn new(config: &LocomotionConfig) -> Self {
        Self {
            current_speed: 0.0,
            vertical_velocity: 0.0,
            grounded: true,
            jump_cooldown: config.jump_timeout,
            fall_cooldown: config.fall_timeout,
            camera_pitch: 0.0,
            last_direction: Vec3::NEG_Z,
        }
    }

    /// Check if airborne.
    #[inline]
    pub fn is_airborne(&self) -> bool {
        !self.grounded
    }

    /// Check if a jump request would launch right now.
    #[inline]
    pub fn can_jump(&self) -> bool {
        self.grounded && self.jump_cooldown <= 0.0
    }

    /// Check if gravity is currently being integrated.
    #[inline]
    pub fn is_falling(&self) -> bool {
        !self.grounded && self.fall_cooldown <= 0.0
    }

    /// Horizontal velocity implied by the smoothed speed and last direction.
    pub fn horizontal_velocity(&self) -> Vec3 {
        self.last_direction * self.current_speed
    }
}

/// Marker component indicating the avatar is grounded.
///
/// Mutually exclusive with [`Airborne`].
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Grounded;

/// Marker component indicating the avatar is airborne.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Airborne;
