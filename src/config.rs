//! Controller configuration components.
//!
//! This module defines the tuning for first-person locomotion: walk and sprint
//! speeds, jump height, gravity, the jump/fall timeouts, the ground probe sphere
//! and the camera pitch range.

use bevy::prelude::*;

/// Collision groups the ground probe tests against.
///
/// This is a plain bitmask so the core stays independent of the physics
/// engine. Backends translate it into their own filtering type (for Rapier,
/// the `filters` half of `CollisionGroups`).
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroundMask(pub u32);

impl GroundMask {
    /// Matches every collision group.
    pub const ALL: Self = Self(u32::MAX);
    /// Matches nothing. A probe with this mask never reports ground.
    pub const NONE: Self = Self(0);

    /// Create a mask from raw group bits.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw group bits.
    #[inline]
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Check whether the mask accepts any of the given groups.
    #[inline]
    pub const fn accepts(&self, groups: u32) -> bool {
        self.0 & groups != 0
    }
}

impl Default for GroundMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// Configuration parameters for the first-person controller.
///
/// Speeds are in units per second, angles in degrees and durations in seconds.
/// Values are not validated: out-of-range settings produce odd motion but never
/// panic.
#[derive(Component, Reflect, Debug, Clone, Copy)]
#[reflect(Component)]
pub struct LocomotionConfig {
    // === Movement Settings ===
    /// Walking speed.
    pub move_speed: f32,

    /// Speed while the sprint input is held.
    pub sprint_speed: f32,

    /// Look sensitivity. Degrees per pointer unit, or degrees per second at
    /// full stick deflection.
    pub rotation_speed: f32,

    /// Rate of the exponential approach toward the target speed.
    pub sprint_change_rate: f32,

    /// Deadband around the target speed inside which smoothing is skipped.
    pub speed_offset: f32,

    // === Jump & Gravity Settings ===
    /// Apex height of a jump.
    pub jump_height: f32,

    /// Vertical acceleration. Negative pulls down.
    pub gravity: f32,

    /// Time that must elapse on the ground before another jump is allowed.
    pub jump_timeout: f32,

    /// Grace period after leaving the ground before gravity is integrated.
    pub fall_timeout: f32,

    /// Magnitude of the fastest allowed fall.
    pub terminal_velocity: f32,

    /// Vertical velocity held while grounded, keeping the capsule pressed
    /// against the floor.
    pub grounded_velocity: f32,

    // === Ground Probe Settings ===
    /// Distance below the feet at which the probe sphere is centred.
    pub ground_offset: f32,

    /// Radius of the probe sphere.
    pub ground_radius: f32,

    /// Collision groups considered ground.
    pub ground_mask: GroundMask,

    // === Camera Settings ===
    /// Highest camera pitch (looking down, positive).
    pub top_pitch: f32,

    /// Lowest camera pitch (looking up, negative).
    pub bottom_pitch: f32,

    /// Squared look magnitude below which look input is ignored.
    pub look_threshold: f32,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            // Movement settings
            move_speed: 4.0,
            sprint_speed: 6.0,
            rotation_speed: 1.0,
            sprint_change_rate: 10.0,
            speed_offset: 0.1,

            // Jump & gravity settings
            jump_height: 1.2,
            gravity: -15.0,
            jump_timeout: 0.1,
            fall_timeout: 0.14,
            terminal_velocity: 54.0,
            grounded_velocity: -2.0,

            // Ground probe settings
            ground_offset: 0.2,
            ground_radius: 0.5,
            ground_mask: GroundMask::ALL,

            // Camera settings
            top_pitch: 90.0,
            bottom_pitch: -90.0,
            look_threshold: 0.1,
        }
    }
}

impl LocomotionConfig {
    /// Launch velocity that reaches `jump_height` under `gravity`.
    ///
    /// Returns 0 for non-negative gravity instead of NaN.
    #[inline]
    pub fn jump_velocity(&self) -> f32 {
        (self.jump_height * -2.0 * self.gravity).max(0.0).sqrt()
    }

    /// Target speed before the input magnitude is applied.
    ///
    /// Zero when there is no movement input, regardless of sprint.
    #[inline]
    pub fn target_speed(&self, sprint: bool, has_move_input: bool) -> f32 {
        if !has_move_input {
            0.0
        } else if sprint {
            self.sprint_speed
        } else {
            self.move_speed
        }
    }

    /// Create a config tuned for a snappier player avatar.
    pub fn player() -> Self {
        Self {
            sprint_speed: 6.5,
            sprint_change_rate: 12.0,
            ..default()
        }
    }

    /// Builder: set walking and sprint speeds.
    pub fn with_speeds(mut self, move_speed: f32, sprint_speed: f32) -> Self {
        self.move_speed = move_speed;
        self.sprint_speed = sprint_speed;
        self
    }

    /// Builder: set the speed change rate.
    pub fn with_sprint_change_rate(mut self, rate: f32) -> Self {
        self.sprint_change_rate = rate;
        self
    }

    /// Builder: set look sensitivity.
    pub fn with_rotation_speed(mut self, speed: f32) -> Self {
        self.rotation_speed = speed;
        self
    }

    /// Builder: set jump height.
    pub fn with_jump_height(mut self, height: f32) -> Self {
        self.jump_height = height;
        self
    }

    /// Builder: set gravity.
    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    /// Builder: set jump and fall timeouts.
    pub fn with_timeouts(mut self, jump_timeout: f32, fall_timeout: f32) -> Self {
        self.jump_timeout = jump_timeout;
        self.fall_timeout = fall_timeout;
        self
    }

    /// Builder: set terminal fall velocity (magnitude).
    pub fn with_terminal_velocity(mut self, velocity: f32) -> Self {
        self.terminal_velocity = velocity;
        self
    }

    /// Builder: set the ground probe sphere.
    pub fn with_ground_probe(mut self, offset: f32, radius: f32) -> Self {
        self.ground_offset = offset;
        self.ground_radius = radius;
        self
    }

    /// Builder: set the ground collision mask.
    pub fn with_ground_mask(mut self, mask: GroundMask) -> Self {
        self.ground_mask = mask;
        self
    }

    /// Builder: set the camera pitch range.
    pub fn with_pitch_range(mut self, bottom: f32, top: f32) -> Self {
        self.bottom_pitch = bottom;
        self.top_pitch = top;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_reference_tuning() {
        let config = LocomotionConfig::default();
        assert_eq!(config.move_speed, 4.0);
        assert_eq!(config.sprint_speed, 6.0);
        assert_eq!(config.rotation_speed, 1.0);
        assert_eq!(config.jump_height, 1.2);
        assert_eq!(config.sprint_change_rate, 10.0);
        assert_eq!(config.gravity, -15.0);
        assert_eq!(config.jump_timeout, 0.1);
        assert_eq!(config.fall_timeout, 0.14);
        assert_eq!(config.ground_offset, 0.2);
        assert_eq!(config.ground_radius, 0.5);
        assert_eq!(config.top_pitch, 90.0);
        assert_eq!(config.bottom_pitch, -90.0);
        assert_eq!(config.terminal_velocity, 54.0);
        assert_eq!(config.ground_mask, GroundMask::ALL);
    }

    #[test]
    fn jump_velocity_reaches_jump_height() {
        let config = LocomotionConfig::default();
        // sqrt(1.2 * 30) = 6
        assert!((config.jump_velocity() - 6.0).abs() < 1e-5);
    }

    #[test]
    fn jump_velocity_with_upward_gravity_is_zero() {
        let config = LocomotionConfig::default().with_gravity(5.0);
        assert_eq!(config.jump_velocity(), 0.0);
    }

    #[test]
    fn target_speed_selects_sprint() {
        let config = LocomotionConfig::default();
        assert_eq!(config.target_speed(false, true), 4.0);
        assert_eq!(config.target_speed(true, true), 6.0);
    }

    #[test]
    fn target_speed_is_zero_without_input() {
        let config = LocomotionConfig::default();
        assert_eq!(config.target_speed(false, false), 0.0);
        assert_eq!(config.target_speed(true, false), 0.0);
    }

    #[test]
    fn builders_override_fields() {
        let config = LocomotionConfig::default()
            .with_speeds(2.0, 3.0)
            .with_ground_probe(0.3, 0.4)
            .with_pitch_range(-45.0, 60.0)
            .with_ground_mask(GroundMask::from_bits(0b10));
        assert_eq!(config.move_speed, 2.0);
        assert_eq!(config.sprint_speed, 3.0);
        assert_eq!(config.ground_offset, 0.3);
        assert_eq!(config.ground_radius, 0.4);
        assert_eq!(config.bottom_pitch, -45.0);
        assert_eq!(config.top_pitch, 60.0);
        assert_eq!(config.ground_mask.bits(), 0b10);
    }

    #[test]
    fn ground_mask_accepts() {
        let mask = GroundMask::from_bits(0b0101);
        assert!(mask.accepts(0b0001));
        assert!(!mask.accepts(0b0010));
        assert!(!GroundMask::NONE.accepts(u32::MAX));
    }

    #[test]
    fn player_preset_sprints_faster() {
        let player = LocomotionConfig::player();
        let default = LocomotionConfig::default();
        assert!(player.sprint_speed >= default.sprint_speed);
    }
}
