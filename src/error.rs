//! Controller setup errors.

use bevy::prelude::Entity;
use thiserror::Error;

/// A controlled avatar is missing something it needs to run.
///
/// Returned by the initialization system; the app's error handler decides
/// what happens next (Bevy panics by default).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ControllerSetupError {
    /// The avatar has a config but no [`CameraRig`](crate::camera::CameraRig).
    #[error("avatar {avatar} has a LocomotionConfig but no CameraRig")]
    NoCameraRig {
        /// The offending avatar.
        avatar: Entity,
    },
    /// The rig entity does not exist or has no `Transform`.
    #[error("camera rig {rig} of avatar {avatar} does not exist or has no Transform")]
    InvalidCameraRig {
        /// The offending avatar.
        avatar: Entity,
        /// The entity the rig link points at.
        rig: Entity,
    },
    /// The rig points back at the avatar, so pitch would tilt the capsule.
    #[error("avatar {avatar} uses itself as its camera rig")]
    RigIsAvatar {
        /// The offending avatar.
        avatar: Entity,
    },
}
