//! Horizontal speed smoothing and per-tick displacement.
//!
//! Speed approaches its target with frame-rate independent exponential damping.
//! The displacement combines the horizontal motion along the avatar's facing
//! with the current vertical velocity so the backend receives a single move
//! request per tick.

use bevy::prelude::*;

use crate::config::LocomotionConfig;
use crate::input::InputSnapshot;
use crate::state::LocomotionState;

/// Round to three decimal places.
///
/// Applied after each smoothing step to keep floating point noise from
/// creeping into the speed.
#[inline]
pub fn round_to_millis(value: f32) -> f32 {
    (value * 1000.0).round() / 1000.0
}

/// Fraction of the remaining gap covered in one tick of exponential damping.
#[inline]
pub fn damping_factor(rate: f32, dt: f32) -> f32 {
    1.0 - (-rate * dt).exp()
}

/// Advance `current_speed` toward the input's target speed.
///
/// `horizontal_speed` is the capsule's actual speed on the ground plane after
/// its last move. Inside the `speed_offset` deadband around the target the
/// speed snaps to the target; outside it the speed is damped toward
/// `target * input magnitude` and rounded.
///
/// Returns the new speed.
pub fn smooth_speed(
    state: &mut LocomotionState,
    input: &InputSnapshot,
    horizontal_speed: f32,
    dt: f32,
    config: &LocomotionConfig,
) -> f32 {
    let target_speed = config.target_speed(input.sprint, input.has_move_input());

    let outside_deadband = horizontal_speed < target_speed - config.speed_offset
        || horizontal_speed > target_speed + config.speed_offset;

    state.current_speed = if outside_deadband {
        let target = target_speed * input.move_magnitude();
        let speed = state.current_speed
            + (target - state.current_speed) * damping_factor(config.sprint_change_rate, dt);
        round_to_millis(speed)
    } else {
        target_speed
    };

    state.current_speed
}

/// Resolve the world-space movement direction for this tick.
///
/// With input, the move vector is mapped onto the avatar's right and forward
/// axes (flattened to the ground plane). Without input the previous direction
/// is kept so deceleration continues along the same heading.
pub fn movement_direction(
    state: &mut LocomotionState,
    input: &InputSnapshot,
    rotation: Quat,
) -> Vec3 {
    if input.has_move_input() {
        let right = flatten(rotation * Vec3::X);
        let forward = flatten(rotation * Vec3::NEG_Z);
        let direction = (right * input.move_axis.x + forward * input.move_axis.y).normalize_or_zero();
        if direction != Vec3::ZERO {
            state.last_direction = direction;
        }
    }
    state.last_direction
}

/// Displacement for one tick from the current speed, direction and vertical
/// velocity.
#[inline]
pub fn displacement(state: &LocomotionState, dt: f32) -> Vec3 {
    state.last_direction * (state.current_speed * dt) + Vec3::Y * (state.vertical_velocity * dt)
}

/// Run the full speed and translation step.
///
/// `capsule_velocity` is the collision-resolved velocity reported by the
/// backend; only its horizontal part is used. Returns the displacement to hand
/// to the backend.
pub fn integrate_movement(
    state: &mut LocomotionState,
    input: &InputSnapshot,
    capsule_velocity: Vec3,
    rotation: Quat,
    dt: f32,
    config: &LocomotionConfig,
) -> Vec3 {
    let horizontal_speed = Vec2::new(capsule_velocity.x, capsule_velocity.z).length();
    smooth_speed(state, input, horizontal_speed, dt, config);
    movement_direction(state, input, rotation);
    displacement(state, dt)
}

fn flatten(axis: Vec3) -> Vec3 {
    Vec3::new(axis.x, 0.0, axis.z).normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn forward_input() -> InputSnapshot {
        let mut input = InputSnapshot::default();
        input.set_move(Vec2::new(0.0, 1.0));
        input
    }

    #[test]
    fn first_tick_from_rest() {
        let config = LocomotionConfig::default();
        let mut state = LocomotionState::new(&config);
        let input = forward_input();

        let dt = 0.02;
        let displacement =
            integrate_movement(&mut state, &input, Vec3::ZERO, Quat::IDENTITY, dt, &config);

        // 4 * (1 - e^-0.2) = 0.72508 -> 0.725
        assert_eq!(state.current_speed, 0.725);
        assert!((displacement.z - (-0.725 * dt)).abs() < 1e-6);
        assert!(displacement.x.abs() < 1e-6);
    }

    #[test]
    fn snaps_inside_deadband() {
        let config = LocomotionConfig::default();
        let mut state = LocomotionState::new(&config);
        state.current_speed = 3.95;
        let input = forward_input();

        smooth_speed(&mut state, &input, 3.95, 0.02, &config);
        assert_eq!(state.current_speed, 4.0);
    }

    #[test]
    fn sprint_raises_target() {
        let config = LocomotionConfig::default();
        let mut state = LocomotionState::new(&config);
        let mut input = forward_input();
        input.set_sprint(true);

        for _ in 0..200 {
            let speed = state.current_speed;
            smooth_speed(&mut state, &input, speed, 0.02, &config);
        }
        assert_eq!(state.current_speed, 6.0);
    }

    #[test]
    fn analog_magnitude_scales_speed() {
        let config = LocomotionConfig::default();
        let mut state = LocomotionState::new(&config);
        let mut input = InputSnapshot::analog();
        input.set_move(Vec2::new(0.0, 0.5));

        for _ in 0..200 {
            let speed = state.current_speed;
            smooth_speed(&mut state, &input, speed, 0.02, &config);
        }
        assert!((state.current_speed - 2.0).abs() <= 0.01);
    }

    #[test]
    fn decelerates_to_rest_monotonically() {
        let config = LocomotionConfig::default();
        let mut state = LocomotionState::new(&config);
        state.current_speed = 6.0;
        let input = InputSnapshot::default();

        let mut previous = state.current_speed;
        for _ in 0..500 {
            let speed = state.current_speed;
            smooth_speed(&mut state, &input, speed, 0.02, &config);
            assert!(state.current_speed <= previous);
            previous = state.current_speed;
        }
        assert_eq!(state.current_speed, 0.0);
    }

    #[test]
    fn sprint_without_input_still_stops() {
        let config = LocomotionConfig::default();
        let mut state = LocomotionState::new(&config);
        state.current_speed = 4.0;
        let mut input = InputSnapshot::default();
        input.set_sprint(true);

        smooth_speed(&mut state, &input, 4.0, 0.02, &config);
        // Damped, not an instant stop
        assert!(state.current_speed > 0.0 && state.current_speed < 4.0);
    }

    #[test]
    fn direction_follows_avatar_yaw() {
        let mut state = LocomotionState::default();
        let input = forward_input();

        // Turned 90 degrees left: forward is now -X
        let rotation = Quat::from_rotation_y(FRAC_PI_2);
        let direction = movement_direction(&mut state, &input, rotation);
        assert!((direction - Vec3::NEG_X).length() < 1e-5);
    }

    #[test]
    fn strafe_maps_to_right_axis() {
        let mut state = LocomotionState::default();
        let mut input = InputSnapshot::default();
        input.set_move(Vec2::new(1.0, 0.0));

        let direction = movement_direction(&mut state, &input, Quat::IDENTITY);
        assert!((direction - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn diagonal_direction_is_normalized() {
        let mut state = LocomotionState::default();
        let mut input = InputSnapshot::default();
        input.set_move(Vec2::new(1.0, 1.0));

        let direction = movement_direction(&mut state, &input, Quat::IDENTITY);
        assert!((direction.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn no_input_keeps_previous_direction() {
        let mut state = LocomotionState::default();
        state.last_direction = Vec3::X;

        let direction = movement_direction(&mut state, &InputSnapshot::default(), Quat::IDENTITY);
        assert_eq!(direction, Vec3::X);
    }

    #[test]
    fn displacement_includes_vertical_velocity() {
        let mut state = LocomotionState::default();
        state.last_direction = Vec3::X;
        state.current_speed = 2.0;
        state.vertical_velocity = -2.0;

        let d = displacement(&state, 0.5);
        assert_eq!(d, Vec3::new(1.0, -1.0, 0.0));
    }

    #[test]
    fn vertical_capsule_velocity_is_ignored() {
        let config = LocomotionConfig::default();
        let mut state = LocomotionState::new(&config);
        state.current_speed = 4.0;
        let input = forward_input();

        // Falling fast but moving horizontally at target speed
        integrate_movement(
            &mut state,
            &input,
            Vec3::new(0.0, -20.0, -4.0),
            Quat::IDENTITY,
            0.02,
            &config,
        );
        assert_eq!(state.current_speed, 4.0);
    }
}
