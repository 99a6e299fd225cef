//! # `msg_fps_controller`
//!
//! A first-person kinematic character controller for Bevy with physics backend
//! abstraction.
//!
//! This crate provides a walk/sprint/jump controller that:
//! - Smooths horizontal speed with frame-rate independent damping
//! - Runs a grounded/airborne jump state machine with jump cooldown and a
//!   fall grace period before gravity kicks in
//! - Detects ground with a sphere probe below the feet
//! - Pitches a camera rig and yaws the avatar from mouse or gamepad look input
//! - Abstracts the physics backend (Rapier3D included) and the input source
//!
//! ## Architecture
//!
//! Each fixed tick runs three phases in order:
//! 1. **Sensors**: the backend probes for ground and sets `grounded`
//! 2. **Movement**: speed is smoothed and one displacement is sent to the backend
//! 3. **Jump & gravity**: the state machine updates vertical velocity for the
//!    next move
//!
//! Input is gathered in `PreUpdate` and camera rotation applied in `Update`.
//!
//! ## Usage
//!
//! ```rust
//! use bevy::prelude::*;
//! use msg_fps_controller::prelude::*;
//!
//! // Tuning and input for one avatar
//! let config = LocomotionConfig::player();
//! let mut input = InputSnapshot::default();
//! input.set_move(Vec2::new(0.0, 1.0));
//!
//! assert!((LocomotionConfig::default().jump_velocity() - 6.0).abs() < 1e-5);
//! # let _ = (config, input);
//! ```

use bevy::prelude::*;

pub mod backend;
pub mod camera;
pub mod config;
pub mod debug;
pub mod device;
pub mod error;
pub mod input;
pub mod jump;
pub mod movement;
pub mod state;
pub mod systems;

#[cfg(feature = "rapier3d")]
pub mod rapier;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::backend::{GroundProbe, LocomotionBackend};
    pub use crate::camera::CameraRig;
    pub use crate::config::{GroundMask, LocomotionConfig};
    pub use crate::debug::{GroundProbeGizmoPlugin, GroundProbeGizmos};
    pub use crate::device::{DeviceInput, DeviceInputSettings, PlayerControlled};
    pub use crate::error::ControllerSetupError;
    pub use crate::input::{ExternalInput, InputDeviceKind, InputProvider, InputSnapshot};
    pub use crate::state::{Airborne, Grounded, LocomotionState};
    pub use crate::{FirstPersonControllerPlugin, LocomotionSet};

    #[cfg(feature = "rapier3d")]
    pub use crate::rapier::{Rapier3dBackend, Rapier3dCharacterBundle};
}

/// System sets for the controller.
///
/// `Sensors`, `Movement` and `JumpAndGravity` run chained in `FixedUpdate`.
/// Backends put their ground sensor in `Sensors`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum LocomotionSet {
    /// Attach runtime state to new avatars (`PreUpdate`).
    Setup,
    /// Fill input snapshots (`PreUpdate`).
    Input,
    /// Ground detection.
    Sensors,
    /// Speed smoothing and capsule moves.
    Movement,
    /// Jump and gravity state machine, plus marker sync.
    JumpAndGravity,
    /// Camera pitch and avatar yaw (`Update`).
    Camera,
}

/// Main plugin for the first-person controller.
///
/// # Type Parameters
/// - `B`: The physics backend (e.g. `Rapier3dBackend`)
/// - `I`: The input provider, [`DeviceInput`](device::DeviceInput) unless an
///   app writes snapshots itself with [`ExternalInput`](input::ExternalInput)
///
/// # Examples
///
/// ```rust,no_run
/// use bevy::prelude::*;
/// use bevy_rapier3d::prelude::*;
/// use msg_fps_controller::prelude::*;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule())
///     .add_plugins(FirstPersonControllerPlugin::<Rapier3dBackend>::default())
///     .run();
/// ```
pub struct FirstPersonControllerPlugin<B: backend::LocomotionBackend, I = device::DeviceInput>
where
    I: input::InputProvider,
{
    _marker: std::marker::PhantomData<(B, I)>,
}

impl<B: backend::LocomotionBackend, I: input::InputProvider> Default
    for FirstPersonControllerPlugin<B, I>
{
    fn default() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<B: backend::LocomotionBackend, I: input::InputProvider> Plugin
    for FirstPersonControllerPlugin<B, I>
{
    fn build(&self, app: &mut App) {
        // Register core types
        app.register_type::<config::LocomotionConfig>();
        app.register_type::<config::GroundMask>();
        app.register_type::<input::InputSnapshot>();
        app.register_type::<input::InputDeviceKind>();
        app.register_type::<state::LocomotionState>();
        app.register_type::<state::Grounded>();
        app.register_type::<state::Airborne>();
        app.register_type::<camera::CameraRig>();
        app.register_type::<backend::GroundProbe>();

        app.configure_sets(
            PreUpdate,
            (LocomotionSet::Setup, LocomotionSet::Input).chain(),
        );
        app.configure_sets(
            FixedUpdate,
            (
                LocomotionSet::Sensors,
                LocomotionSet::Movement,
                LocomotionSet::JumpAndGravity,
            )
                .chain(),
        );

        // Add the physics backend and input provider
        app.add_plugins(B::plugin());
        app.add_plugins(I::plugin());

        app.add_systems(
            PreUpdate,
            systems::initialize_controllers.in_set(LocomotionSet::Setup),
        );

        app.add_systems(
            FixedUpdate,
            (
                systems::apply_movement::<B>.in_set(LocomotionSet::Movement),
                (
                    systems::apply_jump_and_gravity::<B>,
                    systems::sync_state_markers,
                )
                    .chain()
                    .in_set(LocomotionSet::JumpAndGravity),
            ),
        );

        app.add_systems(
            Update,
            systems::apply_camera_rotation.in_set(LocomotionSet::Camera),
        );
    }
}
