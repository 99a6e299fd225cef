//! Jump and gravity state machine.
//!
//! Two states, driven purely by the last ground probe:
//!
//! - **Grounded**: re-arms the fall grace period, counts the jump cooldown down,
//!   keeps the capsule pressed to the floor and launches jumps.
//! - **Airborne**: re-arms the jump cooldown, counts the fall grace period down,
//!   integrates gravity once the grace period expires and discards jump
//!   requests so they cannot carry over to the landing.

use crate::config::LocomotionConfig;
use crate::input::InputSnapshot;
use crate::state::LocomotionState;

/// What the state machine did this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpOutcome {
    /// Grounded, no launch.
    Standing,
    /// Grounded and a jump was launched.
    Launched,
    /// Airborne inside the fall grace period.
    Coasting,
    /// Airborne with gravity applied.
    Falling,
}

/// Advance the jump and gravity state by one tick.
///
/// Reads `state.grounded` as set by the most recent ground probe. The only
/// write to `input` is clearing `jump` while airborne.
pub fn update_jump_and_gravity(
    state: &mut LocomotionState,
    input: &mut InputSnapshot,
    dt: f32,
    config: &LocomotionConfig,
) -> JumpOutcome {
    if state.grounded {
        state.fall_cooldown = config.fall_timeout;

        if state.jump_cooldown >= 0.0 {
            state.jump_cooldown -= dt;
        }

        if state.vertical_velocity <= 0.0 {
            state.vertical_velocity = config.grounded_velocity;
        }

        // The cooldown is only re-armed by the airborne branch, so holding
        // the latch on the ground cannot launch twice without leaving it.
        if input.jump && state.jump_cooldown <= 0.0 {
            state.vertical_velocity = config.jump_velocity();
            return JumpOutcome::Launched;
        }

        JumpOutcome::Standing
    } else {
        state.jump_cooldown = config.jump_timeout;

        if state.fall_cooldown >= 0.0 {
            state.fall_cooldown -= dt;
        }

        input.jump = false;

        if state.fall_cooldown <= 0.0 {
            state.vertical_velocity =
                (state.vertical_velocity + config.gravity * dt).max(-config.terminal_velocity);
            JumpOutcome::Falling
        } else {
            JumpOutcome::Coasting
        }
    }
}
