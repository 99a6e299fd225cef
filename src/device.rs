//! Keyboard, mouse and gamepad input provider.
//!
//! [`DeviceInput`] fills the [`InputSnapshot`] of every [`PlayerControlled`]
//! avatar from Bevy's input resources once per frame, before the controller
//! runs. Keyboard and mouse report as [`InputDeviceKind::Pointer`], sticks as
//! [`InputDeviceKind::Gamepad`]; whichever was used last drives the snapshot.
//!
//! Requires Bevy's `InputPlugin` (part of `DefaultPlugins`).

use bevy::input::mouse::MouseMotion;
use bevy::input::InputSystems;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, CursorOptions, WindowFocused};

use crate::input::{InputDeviceKind, InputProvider, InputSnapshot};
use crate::LocomotionSet;

/// Input provider backed by physical devices.
pub struct DeviceInput;

impl InputProvider for DeviceInput {
    fn plugin() -> impl Plugin {
        DeviceInputPlugin
    }
}

/// Marker for avatars driven by local devices.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct PlayerControlled;

/// Device tuning.
///
/// Mouse motion is not scaled here. Pointer look stays in raw pixels and
/// [`LocomotionConfig::rotation_speed`](crate::config::LocomotionConfig) sets
/// degrees per pixel.
#[derive(Resource, Reflect, Debug, Clone, Copy)]
#[reflect(Resource)]
pub struct DeviceInputSettings {
    /// Look rate at full right stick deflection.
    pub gamepad_look_rate: f32,
    /// Stick deflection below which a stick reads as centred.
    pub stick_deadzone: f32,
}

impl Default for DeviceInputSettings {
    fn default() -> Self {
        Self {
            gamepad_look_rate: 120.0,
            stick_deadzone: 0.1,
        }
    }
}

/// What one device reported this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DeviceFrame {
    /// Movement vector, each axis in `[-1, 1]`.
    pub move_axis: Vec2,
    /// Raw pixel delta for the pointer, look rate for sticks.
    pub look: Vec2,
    /// Jump went down this frame.
    pub jump_pressed: bool,
    /// Sprint is held.
    pub sprint: bool,
    /// Whether the device was touched at all.
    pub active: bool,
}

impl DeviceFrame {
    /// Frame from the keyboard and the mouse motion accumulated this frame.
    ///
    /// WASD and the arrow keys form a normalized digital vector.
    pub fn from_keyboard(keyboard: &ButtonInput<KeyCode>, mouse_delta: Vec2) -> Self {
        let axis = |negative: [KeyCode; 2], positive: [KeyCode; 2]| {
            let mut value = 0.0;
            if keyboard.any_pressed(negative) {
                value -= 1.0;
            }
            if keyboard.any_pressed(positive) {
                value += 1.0;
            }
            value
        };

        let move_axis = Vec2::new(
            axis(
                [KeyCode::KeyA, KeyCode::ArrowLeft],
                [KeyCode::KeyD, KeyCode::ArrowRight],
            ),
            axis(
                [KeyCode::KeyS, KeyCode::ArrowDown],
                [KeyCode::KeyW, KeyCode::ArrowUp],
            ),
        )
        .normalize_or_zero();

        Self {
            move_axis,
            look: mouse_delta,
            jump_pressed: keyboard.just_pressed(KeyCode::Space),
            sprint: keyboard.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]),
            active: keyboard.get_pressed().next().is_some() || mouse_delta != Vec2::ZERO,
        }
    }

    /// Frame from raw stick values and button states.
    ///
    /// Stick up is positive y, so the right stick is flipped to make pushing
    /// up look up.
    pub fn from_sticks(
        left: Vec2,
        right: Vec2,
        buttons: GamepadButtons,
        settings: &DeviceInputSettings,
    ) -> Self {
        let dead = |stick: Vec2| {
            if stick.length() < settings.stick_deadzone {
                Vec2::ZERO
            } else {
                stick.clamp_length_max(1.0)
            }
        };
        let left = dead(left);
        let right = dead(right);

        Self {
            move_axis: left,
            look: Vec2::new(right.x, -right.y) * settings.gamepad_look_rate,
            jump_pressed: buttons.jump_pressed,
            sprint: buttons.sprint,
            active: left != Vec2::ZERO
                || right != Vec2::ZERO
                || buttons.jump_pressed
                || buttons.sprint,
        }
    }

    /// Frame from a connected gamepad.
    pub fn from_gamepad(gamepad: &Gamepad, settings: &DeviceInputSettings) -> Self {
        let buttons = GamepadButtons {
            jump_pressed: gamepad.just_pressed(GamepadButton::South),
            sprint: gamepad.pressed(GamepadButton::LeftThumb)
                || gamepad.pressed(GamepadButton::LeftTrigger),
        };
        Self::from_sticks(gamepad.left_stick(), gamepad.right_stick(), buttons, settings)
    }
}

/// Button edges relevant to locomotion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GamepadButtons {
    /// Jump button went down this frame.
    pub jump_pressed: bool,
    /// Sprint button is held.
    pub sprint: bool,
}

/// Write a device frame into a snapshot.
///
/// A press sets the jump latch and nothing here clears it. The controller
/// consumes it on the fixed tick, so a tap shorter than one tick still
/// launches. Look is dropped while `cursor_input_for_look` is off.
pub fn apply_frame(snapshot: &mut InputSnapshot, frame: &DeviceFrame, device: InputDeviceKind) {
    snapshot.device = device;
    snapshot.set_move(frame.move_axis);
    snapshot.set_sprint(frame.sprint);

    if snapshot.cursor_input_for_look {
        snapshot.set_look(frame.look);
    } else {
        snapshot.set_look(Vec2::ZERO);
    }

    if frame.jump_pressed {
        snapshot.set_jump(true);
    }
}

/// Plugin registering the device input systems.
pub struct DeviceInputPlugin;

impl Plugin for DeviceInputPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<PlayerControlled>()
            .register_type::<DeviceInputSettings>()
            .init_resource::<DeviceInputSettings>()
            .add_message::<MouseMotion>()
            .add_message::<WindowFocused>();

        app.add_systems(
            PreUpdate,
            (gather_device_input, lock_cursor_on_focus)
                .in_set(LocomotionSet::Input)
                .after(InputSystems),
        );
    }
}

/// Fill player snapshots from the keyboard, mouse and gamepads.
pub fn gather_device_input(
    settings: Res<DeviceInputSettings>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mut mouse_motion: MessageReader<MouseMotion>,
    gamepads: Query<&Gamepad>,
    mut snapshots: Query<&mut InputSnapshot, With<PlayerControlled>>,
) {
    let mouse_delta: Vec2 = mouse_motion.read().map(|motion| motion.delta).sum();
    let pointer = DeviceFrame::from_keyboard(&keyboard, mouse_delta);

    let pad = gamepads
        .iter()
        .map(|gamepad| DeviceFrame::from_gamepad(gamepad, &settings))
        .find(|frame| frame.active)
        .unwrap_or_default();

    for mut snapshot in &mut snapshots {
        // Pointer wins a tie so a mouse nudge is never swallowed
        let device = if pointer.active {
            InputDeviceKind::Pointer
        } else if pad.active {
            InputDeviceKind::Gamepad
        } else {
            snapshot.device
        };

        let mut frame = match device {
            InputDeviceKind::Pointer => pointer,
            InputDeviceKind::Gamepad => pad,
        };
        frame.jump_pressed |= pointer.jump_pressed || pad.jump_pressed;

        if device != snapshot.device {
            debug!("Input device switched to {device:?}");
        }
        apply_frame(&mut snapshot, &frame, device);
    }
}

/// Re-apply the cursor lock preference when a window gains focus.
pub fn lock_cursor_on_focus(
    mut focus: MessageReader<WindowFocused>,
    mut cursors: Query<&mut CursorOptions>,
    snapshots: Query<&InputSnapshot, With<PlayerControlled>>,
) {
    let locked = snapshots.iter().next().map(|snapshot| snapshot.cursor_locked);

    for event in focus.read() {
        let (true, Some(locked)) = (event.focused, locked) else {
            continue;
        };
        if let Ok(mut cursor) = cursors.get_mut(event.window) {
            cursor.grab_mode = if locked {
                CursorGrabMode::Locked
            } else {
                CursorGrabMode::None
            };
            cursor.visible = !locked;
        }
    }
}
