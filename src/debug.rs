//! Gizmo drawing of the ground probe.
//!
//! Opt-in: add [`GroundProbeGizmoPlugin`] next to the controller plugin. It
//! needs Bevy's gizmo rendering, which `DefaultPlugins` provides.

use bevy::prelude::*;

use crate::backend::GroundProbe;
use crate::state::LocomotionState;
use crate::LocomotionSet;

/// Probe colour while grounded.
pub const GROUNDED_COLOR: Color = Color::srgba(0.0, 1.0, 0.0, 0.35);
/// Probe colour while airborne.
pub const AIRBORNE_COLOR: Color = Color::srgba(1.0, 0.0, 0.0, 0.35);

/// Toggle for the probe gizmos.
#[derive(Resource, Reflect, Debug, Clone, Copy)]
#[reflect(Resource)]
pub struct GroundProbeGizmos {
    /// Draw the probes. Defaults to on once the plugin is added.
    pub enabled: bool,
}

impl Default for GroundProbeGizmos {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Draws each avatar's last ground probe as a sphere, green when grounded and
/// red otherwise.
pub struct GroundProbeGizmoPlugin;

impl Plugin for GroundProbeGizmoPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<GroundProbeGizmos>()
            .init_resource::<GroundProbeGizmos>();

        app.add_systems(
            Update,
            draw_ground_probes
                .after(LocomotionSet::Camera)
                .run_if(|gizmos: Res<GroundProbeGizmos>| gizmos.enabled),
        );
    }
}

/// Colour of a probe for the given grounded state.
#[inline]
pub fn probe_color(grounded: bool) -> Color {
    if grounded {
        GROUNDED_COLOR
    } else {
        AIRBORNE_COLOR
    }
}

fn draw_ground_probes(mut gizmos: Gizmos, q_probes: Query<(&GroundProbe, &LocomotionState)>) {
    for (probe, state) in &q_probes {
        gizmos.sphere(
            Isometry3d::from_translation(probe.center),
            probe.radius,
            probe_color(state.grounded),
        );
    }
}
