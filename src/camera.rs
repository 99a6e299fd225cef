//! First-person camera rotation.
//!
//! Look input pitches a separate camera rig entity and yaws the avatar itself,
//! so the capsule never tilts. Pitch is accumulated in degrees on
//! [`LocomotionState::camera_pitch`] and clamped to the configured range.

use bevy::prelude::*;

use crate::config::LocomotionConfig;
use crate::input::InputSnapshot;
use crate::state::LocomotionState;

/// Link from an avatar to the entity that carries its camera.
///
/// The rig is usually a child of the avatar holding the `Camera3d`. It only
/// ever receives a pure pitch rotation; yaw is applied to the avatar.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq, Eq)]
#[reflect(Component)]
pub struct CameraRig(pub Entity);

impl CameraRig {
    /// The rig entity.
    #[inline]
    pub fn entity(&self) -> Entity {
        self.0
    }
}

/// Rotation produced by one look update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookRotation {
    /// Camera pitch after the update, in degrees.
    pub pitch: f32,
    /// Yaw to add to the avatar this update, in degrees. Positive turns right.
    pub yaw_delta: f32,
}

impl LookRotation {
    /// Local rotation for the camera rig.
    #[inline]
    pub fn rig_rotation(&self) -> Quat {
        pitch_rotation(self.pitch)
    }

    /// Incremental rotation for the avatar around world up.
    #[inline]
    pub fn yaw_rotation(&self) -> Quat {
        Quat::from_rotation_y(-self.yaw_delta.to_radians())
    }
}

/// Rig rotation for a pitch in degrees. Positive pitch looks down.
#[inline]
pub fn pitch_rotation(pitch: f32) -> Quat {
    Quat::from_rotation_x(-pitch.to_radians())
}

/// Clamp an accumulated angle into `[min, max]`.
///
/// A full turn or more snaps to the opposite full turn before clamping, so
/// -370 becomes 360 rather than -10.
pub fn clamp_angle(mut angle: f32, min: f32, max: f32) -> f32 {
    if angle <= -360.0 {
        angle = 360.0;
    }
    if angle >= 360.0 {
        angle = -360.0;
    }
    angle.clamp(min, max)
}

/// Apply one frame of look input to the camera pitch.
///
/// Returns `None` when the look vector is below the noise threshold, in which
/// case nothing changes. The device kind decides whether the look vector is a
/// delta (pointer) or a rate scaled by `dt` (gamepad).
pub fn apply_look(
    state: &mut LocomotionState,
    input: &InputSnapshot,
    dt: f32,
    config: &LocomotionConfig,
) -> Option<LookRotation> {
    if input.look.length_squared() <= config.look_threshold {
        return None;
    }

    let multiplier = input.device.look_multiplier(dt);
    let pitch = state.camera_pitch + input.look.y * config.rotation_speed * multiplier;
    state.camera_pitch = clamp_angle(pitch, config.bottom_pitch, config.top_pitch);

    Some(LookRotation {
        pitch: state.camera_pitch,
        yaw_delta: input.look.x * config.rotation_speed * multiplier,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputDeviceKind;

    fn looking(look: Vec2) -> InputSnapshot {
        let mut input = InputSnapshot::default();
        input.set_look(look);
        input
    }

    #[test]
    fn clamp_angle_inside_range() {
        assert_eq!(clamp_angle(45.0, -90.0, 90.0), 45.0);
        assert_eq!(clamp_angle(120.0, -90.0, 90.0), 90.0);
        assert_eq!(clamp_angle(-120.0, -90.0, 90.0), -90.0);
    }

    #[test]
    fn clamp_angle_snaps_full_turns() {
        // Snap, not modulo: -370 becomes 360 and then clamps to max
        assert_eq!(clamp_angle(-370.0, -400.0, 400.0), 360.0);
        assert_eq!(clamp_angle(370.0, -400.0, 400.0), -360.0);
        assert_eq!(clamp_angle(-370.0, -90.0, 90.0), 90.0);
    }

    #[test]
    fn small_look_is_ignored() {
        let config = LocomotionConfig::default();
        let mut state = LocomotionState::new(&config);

        let result = apply_look(&mut state, &looking(Vec2::new(0.2, 0.2)), 0.02, &config);
        assert!(result.is_none());
        assert_eq!(state.camera_pitch, 0.0);
    }

    #[test]
    fn pointer_look_is_frame_independent() {
        let config = LocomotionConfig::default();
        let mut state = LocomotionState::new(&config);

        let result = apply_look(&mut state, &looking(Vec2::new(3.0, 5.0)), 0.02, &config)
            .expect("look above threshold");
        assert_eq!(result.pitch, 5.0);
        assert_eq!(result.yaw_delta, 3.0);
    }

    #[test]
    fn gamepad_look_scales_with_dt() {
        let config = LocomotionConfig::default().with_rotation_speed(100.0);
        let mut state = LocomotionState::new(&config);
        let mut input = looking(Vec2::new(1.0, -1.0));
        input.device = InputDeviceKind::Gamepad;

        let result = apply_look(&mut state, &input, 0.5, &config).expect("look above threshold");
        assert_eq!(result.pitch, -50.0);
        assert_eq!(result.yaw_delta, 50.0);
    }

    #[test]
    fn pitch_pins_at_top() {
        let config = LocomotionConfig::default();
        let mut state = LocomotionState::new(&config);
        let input = looking(Vec2::new(0.0, 50.0));

        for _ in 0..20 {
            apply_look(&mut state, &input, 0.02, &config);
            assert!(state.camera_pitch <= config.top_pitch);
        }
        assert_eq!(state.camera_pitch, config.top_pitch);
    }

    #[test]
    fn pitch_pins_at_bottom() {
        let config = LocomotionConfig::default();
        let mut state = LocomotionState::new(&config);
        let input = looking(Vec2::new(0.0, -50.0));

        for _ in 0..20 {
            apply_look(&mut state, &input, 0.02, &config);
            assert!(state.camera_pitch >= config.bottom_pitch);
        }
        assert_eq!(state.camera_pitch, config.bottom_pitch);
    }

    #[test]
    fn yaw_ignores_ground_state() {
        let config = LocomotionConfig::default();
        let mut state = LocomotionState::new(&config);
        state.grounded = false;

        let result = apply_look(&mut state, &looking(Vec2::new(10.0, 0.0)), 0.02, &config)
            .expect("look above threshold");
        assert_eq!(result.yaw_delta, 10.0);
    }

    #[test]
    fn positive_yaw_turns_right() {
        let rotation = LookRotation {
            pitch: 0.0,
            yaw_delta: 90.0,
        };
        let forward = rotation.yaw_rotation() * Vec3::NEG_Z;
        assert!((forward - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn positive_pitch_looks_down() {
        let forward = pitch_rotation(45.0) * Vec3::NEG_Z;
        assert!(forward.y < 0.0);
    }
}
