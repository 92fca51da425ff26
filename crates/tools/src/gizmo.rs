use glam::Vec3;
use std::fmt::Write as _;
use thirdperson_common::EntityId;
use thirdperson_kernel::{FrameObserver, Phase, SkipReason};

/// Linear RGB in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const YELLOW: Self = Self::rgb(1.0, 0.92, 0.016);
    pub const GREEN: Self = Self::rgb(0.0, 1.0, 0.0);
    pub const RED: Self = Self::rgb(1.0, 0.0, 0.0);
    pub const GREY: Self = Self::rgb(0.5, 0.5, 0.5);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

/// A debug primitive for a viewport to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gizmo {
    WireSphere {
        center: Vec3,
        radius: f32,
        color: Color,
    },
    Line {
        from: Vec3,
        to: Vec3,
        color: Color,
    },
}

/// Collects gizmos from controller callbacks for one frame.
///
/// Ground probes draw yellow, grey when nothing was touched. Camera
/// collision draws a line from the ideal to the resolved position, red when
/// geometry pulled the camera in.
#[derive(Debug, Default)]
pub struct GizmoRecorder {
    gizmos: Vec<Gizmo>,
    jumps: Vec<(EntityId, f32)>,
    skips: Vec<(Phase, Option<EntityId>, SkipReason)>,
}

impl GizmoRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop everything recorded for the previous frame.
    pub fn begin_frame(&mut self) {
        self.gizmos.clear();
        self.jumps.clear();
        self.skips.clear();
    }

    pub fn gizmos(&self) -> &[Gizmo] {
        &self.gizmos
    }

    pub fn jumps(&self) -> &[(EntityId, f32)] {
        &self.jumps
    }

    pub fn skips(&self) -> &[(Phase, Option<EntityId>, SkipReason)] {
        &self.skips
    }

    /// One line per gizmo, for terminals and logs.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for gizmo in &self.gizmos {
            let _ = match gizmo {
                Gizmo::WireSphere {
                    center,
                    radius,
                    color,
                } => writeln!(
                    out,
                    "sphere c=({:.2}, {:.2}, {:.2}) r={:.2} {}",
                    center.x,
                    center.y,
                    center.z,
                    radius,
                    color_name(*color)
                ),
                Gizmo::Line { from, to, color } => writeln!(
                    out,
                    "line ({:.2}, {:.2}, {:.2}) -> ({:.2}, {:.2}, {:.2}) {}",
                    from.x,
                    from.y,
                    from.z,
                    to.x,
                    to.y,
                    to.z,
                    color_name(*color)
                ),
            };
        }
        out
    }
}

fn color_name(color: Color) -> &'static str {
    match color {
        c if c == Color::YELLOW => "yellow",
        c if c == Color::GREEN => "green",
        c if c == Color::RED => "red",
        c if c == Color::GREY => "grey",
        _ => "custom",
    }
}

impl FrameObserver for GizmoRecorder {
    fn on_ground_probe(&mut self, _entity: EntityId, center: Vec3, radius: f32, grounded: bool) {
        self.gizmos.push(Gizmo::WireSphere {
            center,
            radius,
            color: if grounded { Color::YELLOW } else { Color::GREY },
        });
    }

    fn on_jump(&mut self, entity: EntityId, velocity: f32) {
        self.jumps.push((entity, velocity));
    }

    fn on_camera_resolved(
        &mut self,
        _target: EntityId,
        ideal: Vec3,
        resolved: Vec3,
        clamped: bool,
    ) {
        self.gizmos.push(Gizmo::Line {
            from: ideal,
            to: resolved,
            color: if clamped { Color::RED } else { Color::GREEN },
        });
    }

    fn on_skip(&mut self, phase: Phase, entity: Option<EntityId>, reason: SkipReason) {
        tracing::trace!(?phase, ?entity, %reason, "gizmo recorder saw skip");
        self.skips.push((phase, entity, reason));
    }
}
