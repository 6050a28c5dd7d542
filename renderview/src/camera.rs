//! Perspective camera and the orbit controller that drives it.
//!
//! The controller keeps the camera on a sphere around a target point.
//! Pointer input accumulates pending deltas (azimuth, polar, pan, dolly);
//! [`OrbitController::update`] folds them into the pose and writes the pose
//! to a [`Camera`]. With damping enabled, pending deltas decay over several
//! updates instead of being consumed at once.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use std::f32::consts::{PI, TAU};

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_FAR, DEFAULT_FOV_Y_DEG, DEFAULT_NEAR, POLAR_EPSILON, WHEEL_STEP_PX};
use crate::event::{Button, PointerEvent, PointerKind};

/// Perspective camera looking from `position` at `target`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees.
    pub fov_y_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y_deg: DEFAULT_FOV_Y_DEG,
            aspect: 1.0,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
        }
    }
}

impl Camera {
    #[must_use]
    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        Self { position, target, ..Self::default() }
    }

    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// OpenGL-style projection (clip-space depth in `[-1, 1]`).
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(
            self.fov_y_deg.to_radians(),
            self.aspect.max(f32::EPSILON),
            self.near,
            self.far,
        )
    }

    #[must_use]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Project a world point to normalized device coordinates.
    ///
    /// Returns `None` for points on or behind the camera plane.
    #[must_use]
    pub fn project(&self, world: Vec3) -> Option<Vec3> {
        let clip = self.view_projection_matrix() * world.extend(1.0);
        if clip.w <= f32::EPSILON {
            return None;
        }
        Some(clip.truncate() / clip.w)
    }

    /// Unit vector from the camera towards its target (zero if they coincide).
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }
}

/// Tunables for [`OrbitController`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct OrbitSettings {
    pub rotate_speed: f32,
    pub pan_speed: f32,
    pub dolly_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Lower polar limit in radians (0 = looking straight down).
    pub min_polar: f32,
    /// Upper polar limit in radians (π = looking straight up).
    pub max_polar: f32,
    pub enable_rotate: bool,
    pub enable_pan: bool,
    pub enable_dolly: bool,
    pub enable_damping: bool,
    /// Fraction of the pending motion applied per update when damping.
    pub damping_factor: f32,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            rotate_speed: 1.0,
            pan_speed: 1.0,
            dolly_speed: 1.0,
            min_distance: 0.01,
            max_distance: 1.0e6,
            min_polar: 0.0,
            max_polar: PI,
            enable_rotate: true,
            enable_pan: true,
            enable_dolly: true,
            enable_damping: false,
            damping_factor: 0.05,
        }
    }
}

/// What a drag currently does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrbitState {
    #[default]
    Idle,
    Rotate,
    Pan,
    Dolly,
}

/// Orbit / pan / dolly controller around a target point (Y up).
#[derive(Debug, Clone)]
pub struct OrbitController {
    pub settings: OrbitSettings,
    target: Vec3,
    radius: f32,
    /// Rotation around +Y, measured from +Z towards +X.
    azimuth: f32,
    /// Angle from +Y.
    polar: f32,
    pending_azimuth: f32,
    pending_polar: f32,
    pending_pan: Vec3,
    pending_dolly: f32,
    state: OrbitState,
    viewport_height: f64,
    fov_y_deg: f32,
}

impl Default for OrbitController {
    fn default() -> Self {
        Self::from_camera(&Camera::default(), OrbitSettings::default())
    }
}

impl OrbitController {
    /// Start orbiting from the camera's current pose.
    #[must_use]
    pub fn from_camera(camera: &Camera, settings: OrbitSettings) -> Self {
        let mut controller = Self {
            settings,
            target: camera.target,
            radius: 1.0,
            azimuth: 0.0,
            polar: PI / 2.0,
            pending_azimuth: 0.0,
            pending_polar: 0.0,
            pending_pan: Vec3::ZERO,
            pending_dolly: 1.0,
            state: OrbitState::Idle,
            viewport_height: 1.0,
            fov_y_deg: camera.fov_y_deg,
        };
        controller.sync_from_camera(camera);
        controller
    }

    /// Re-derive the spherical pose from a camera, dropping pending motion.
    pub fn sync_from_camera(&mut self, camera: &Camera) {
        let offset = camera.position - camera.target;
        let radius = offset.length();
        self.target = camera.target;
        self.fov_y_deg = camera.fov_y_deg;
        self.radius = radius.max(self.settings.min_distance);
        if radius > f32::EPSILON {
            self.azimuth = offset.x.atan2(offset.z);
            self.polar = (offset.y / radius).clamp(-1.0, 1.0).acos();
        }
        self.pending_azimuth = 0.0;
        self.pending_polar = 0.0;
        self.pending_pan = Vec3::ZERO;
        self.pending_dolly = 1.0;
    }

    #[must_use]
    pub fn target(&self) -> Vec3 {
        self.target
    }

    #[must_use]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    #[must_use]
    pub fn azimuth(&self) -> f32 {
        self.azimuth
    }

    #[must_use]
    pub fn polar(&self) -> f32 {
        self.polar
    }

    #[must_use]
    pub fn state(&self) -> OrbitState {
        self.state
    }

    /// Height in pixels of the viewport this controller is attached to.
    /// Pointer deltas are normalized against it.
    pub fn set_viewport_height(&mut self, height: f64) {
        self.viewport_height = height.max(1.0);
    }

    /// Camera position implied by the current (applied) pose.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.target + self.offset()
    }

    fn offset(&self) -> Vec3 {
        let sin_polar = self.polar.sin();
        Vec3::new(
            self.radius * sin_polar * self.azimuth.sin(),
            self.radius * self.polar.cos(),
            self.radius * sin_polar * self.azimuth.cos(),
        )
    }

    #[allow(clippy::cast_possible_truncation)]
    fn height_px(&self) -> f32 {
        self.viewport_height as f32
    }

    /// Queue an orbit by a pointer drag of `(dx, dy)` pixels.
    ///
    /// A drag across the full viewport height turns the camera once around.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        let height = self.height_px();
        self.pending_azimuth -= TAU * dx / height * self.settings.rotate_speed;
        self.pending_polar -= TAU * dy / height * self.settings.rotate_speed;
    }

    /// Queue a pan by a pointer drag of `(dx, dy)` pixels.
    ///
    /// The target moves so that the point under the pointer stays under it
    /// at the target's depth.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let offset = self.offset();
        let forward = (-offset).normalize_or_zero();
        let Some(right) = forward.cross(Vec3::Y).try_normalize() else {
            return;
        };
        let up = right.cross(forward);
        let target_distance = offset.length() * (self.fov_y_deg.to_radians() / 2.0).tan();
        let scale = 2.0 * target_distance / self.height_px() * self.settings.pan_speed;
        self.pending_pan += -right * dx * scale + up * dy * scale;
    }

    /// Queue a dolly. Factors above 1 move away from the target.
    pub fn dolly(&mut self, factor: f32) {
        if factor > 0.0 && factor.is_finite() {
            self.pending_dolly *= factor;
        }
    }

    /// Dolly by a wheel or drag distance in pixels; positive moves away.
    pub fn dolly_by_pixels(&mut self, delta: f32) {
        let steps = delta / WHEEL_STEP_PX * self.settings.dolly_speed;
        self.dolly((1.0 / 0.95_f32).powf(steps));
    }

    /// Feed a routed pointer event. Returns whether the controller used it.
    #[allow(clippy::cast_possible_truncation)]
    pub fn handle_pointer(&mut self, event: &PointerEvent) -> bool {
        let dx = event.movement.x as f32;
        let dy = event.movement.y as f32;
        match event.kind {
            PointerKind::Down => {
                self.state = self.state_for_down(event);
                self.state != OrbitState::Idle
            }
            PointerKind::Move => match self.state {
                OrbitState::Idle => false,
                OrbitState::Rotate => {
                    self.rotate(dx, dy);
                    true
                }
                OrbitState::Pan => {
                    self.pan(dx, dy);
                    true
                }
                OrbitState::Dolly => {
                    self.dolly_by_pixels(dy);
                    true
                }
            },
            PointerKind::Up | PointerKind::Cancel => {
                let was_active = self.state != OrbitState::Idle;
                self.state = OrbitState::Idle;
                was_active
            }
            PointerKind::Wheel => {
                if !self.settings.enable_dolly {
                    return false;
                }
                self.dolly_by_pixels(dy);
                true
            }
            PointerKind::Hover => false,
        }
    }

    fn state_for_down(&self, event: &PointerEvent) -> OrbitState {
        let s = &self.settings;
        let pan_modifier = event.modifiers.shift || event.modifiers.ctrl || event.modifiers.meta;
        let wanted = if event.pointer_count >= 2 {
            OrbitState::Pan
        } else {
            match event.button {
                Button::Primary if pan_modifier => OrbitState::Pan,
                Button::Primary => OrbitState::Rotate,
                Button::Secondary => OrbitState::Pan,
                Button::Middle => OrbitState::Dolly,
            }
        };
        let enabled = match wanted {
            OrbitState::Rotate => s.enable_rotate,
            OrbitState::Pan => s.enable_pan,
            OrbitState::Dolly => s.enable_dolly,
            OrbitState::Idle => false,
        };
        if enabled { wanted } else { OrbitState::Idle }
    }

    /// Fold pending motion into the pose and write it to `camera`.
    ///
    /// Returns `true` when the camera moved.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        let s = self.settings;
        let blend = if s.enable_damping { s.damping_factor.clamp(0.0, 1.0) } else { 1.0 };

        self.azimuth += self.pending_azimuth * blend;
        let min_polar = s.min_polar.max(POLAR_EPSILON);
        let max_polar = s.max_polar.min(PI - POLAR_EPSILON);
        self.polar = (self.polar + self.pending_polar * blend).clamp(min_polar, max_polar.max(min_polar));
        self.radius = (self.radius * self.pending_dolly).clamp(s.min_distance, s.max_distance.max(s.min_distance));
        self.target += self.pending_pan * blend;

        if s.enable_damping {
            self.pending_azimuth *= 1.0 - blend;
            self.pending_polar *= 1.0 - blend;
            self.pending_pan *= 1.0 - blend;
        } else {
            self.pending_azimuth = 0.0;
            self.pending_polar = 0.0;
            self.pending_pan = Vec3::ZERO;
        }
        self.pending_dolly = 1.0;

        let position = self.position();
        let moved = position.distance_squared(camera.position) > f32::EPSILON
            || self.target.distance_squared(camera.target) > f32::EPSILON;
        camera.position = position;
        camera.target = self.target;
        self.fov_y_deg = camera.fov_y_deg;
        moved
    }
}
