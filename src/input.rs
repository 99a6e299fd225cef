//! Input snapshot components.
//!
//! The snapshot is the only thing the controller knows about input. Whoever
//! acquires input (the bundled [`DeviceInput`](crate::device::DeviceInput)
//! provider, an AI, a replay) overwrites it once per frame; the controller
//! reads it and only ever writes back by clearing `jump`.

use bevy::prelude::*;

/// Which kind of device produced the most recent input.
///
/// Pointer look values are already per-frame deltas; gamepad look values are
/// rates and get scaled by the frame time.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputDeviceKind {
    /// Mouse or another absolute-delta pointing device.
    #[default]
    Pointer,
    /// Rate-based analog stick.
    Gamepad,
}

impl InputDeviceKind {
    /// Scale applied to look input for a frame of length `dt`.
    #[inline]
    pub fn look_multiplier(self, dt: f32) -> f32 {
        match self {
            InputDeviceKind::Pointer => 1.0,
            InputDeviceKind::Gamepad => dt,
        }
    }
}

/// Per-frame input state for one avatar.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use msg_fps_controller::prelude::*;
///
/// let mut input = InputSnapshot::default();
/// input.set_move(Vec2::new(0.0, 1.0));
/// input.set_sprint(true);
/// assert!(input.has_move_input());
/// assert_eq!(input.move_magnitude(), 1.0);
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct InputSnapshot {
    /// Strafe (x) and forward (y) intent, components roughly in [-1, 1].
    pub move_axis: Vec2,
    /// Look delta (pointer) or look rate (gamepad). Positive y pitches down.
    pub look: Vec2,
    /// Latched jump request.
    pub jump: bool,
    /// Sprint selector.
    pub sprint: bool,
    /// When true the stick magnitude scales the target speed.
    pub analog_movement: bool,
    /// Whether the cursor should be locked while the window has focus.
    pub cursor_locked: bool,
    /// Whether pointer motion is accepted as look input.
    pub cursor_input_for_look: bool,
    /// Device that produced the latest input.
    pub device: InputDeviceKind,
}

impl Default for InputSnapshot {
    fn default() -> Self {
        Self {
            move_axis: Vec2::ZERO,
            look: Vec2::ZERO,
            jump: false,
            sprint: false,
            analog_movement: false,
            cursor_locked: true,
            cursor_input_for_look: true,
            device: InputDeviceKind::Pointer,
        }
    }
}

impl InputSnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a snapshot that scales speed by stick deflection.
    pub fn analog() -> Self {
        Self {
            analog_movement: true,
            device: InputDeviceKind::Gamepad,
            ..default()
        }
    }

    /// Set the movement vector.
    pub fn set_move(&mut self, direction: Vec2) {
        self.move_axis = direction;
    }

    /// Set the look vector.
    pub fn set_look(&mut self, look: Vec2) {
        self.look = look;
    }

    /// Set the jump request.
    pub fn set_jump(&mut self, pressed: bool) {
        self.jump = pressed;
    }

    /// Set the sprint state.
    pub fn set_sprint(&mut self, pressed: bool) {
        self.sprint = pressed;
    }

    /// Drop a pending jump request.
    pub fn clear_jump(&mut self) {
        self.jump = false;
    }

    /// Check if there is any movement input.
    #[inline]
    pub fn has_move_input(&self) -> bool {
        self.move_axis != Vec2::ZERO
    }

    /// Multiplier applied to the target speed.
    ///
    /// The stick length in analog mode, otherwise 1 (digital input always
    /// moves at full speed).
    #[inline]
    pub fn move_magnitude(&self) -> f32 {
        if self.analog_movement {
            self.move_axis.length()
        } else {
            1.0
        }
    }

    /// Clear movement and look, keeping preferences and the jump latch.
    pub fn clear_axes(&mut self) {
        self.move_axis = Vec2::ZERO;
        self.look = Vec2::ZERO;
    }
}

/// Source of [`InputSnapshot`] data.
///
/// Exactly one provider is selected through the plugin's type parameter. The
/// controller core never depends on which one it is.
pub trait InputProvider: 'static + Send + Sync {
    /// Returns the plugin that keeps snapshots up to date.
    fn plugin() -> impl Plugin;
}

/// Provider for apps that write snapshots themselves (AI, replays, tests).
pub struct ExternalInput;

impl InputProvider for ExternalInput {
    fn plugin() -> impl Plugin {
        ExternalInputPlugin
    }
}

/// Empty plugin used by [`ExternalInput`].
pub struct ExternalInputPlugin;

impl Plugin for ExternalInputPlugin {
    fn build(&self, _app: &mut App) {}
}
