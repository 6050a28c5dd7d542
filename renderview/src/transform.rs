//! Local transform of a scene node.
//!
//! A [`Transform`] is translation, rotation and scale relative to the parent
//! node. Composition into world space is done by [`crate::scene::Scene`],
//! which walks the parent chain; the matrix math itself is `glam`'s.

#[cfg(test)]
#[path = "transform_test.rs"]
mod transform_test;

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    #[must_use]
    pub fn from_translation(translation: Vec3) -> Self {
        Self { translation, ..Self::IDENTITY }
    }

    #[must_use]
    pub fn from_rotation(rotation: Quat) -> Self {
        Self { rotation, ..Self::IDENTITY }
    }

    #[must_use]
    pub fn from_scale(scale: Vec3) -> Self {
        Self { scale, ..Self::IDENTITY }
    }

    /// Decompose an affine matrix. Shear is lost.
    #[must_use]
    pub fn from_matrix(matrix: Mat4) -> Self {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        Self { translation, rotation, scale }
    }

    /// Local matrix: translate × rotate × scale.
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    #[must_use]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.matrix().transform_point3(point)
    }

    /// Rotate about an axis expressed in local space.
    pub fn rotate_on_axis(&mut self, axis: Vec3, angle: f32) {
        let Some(axis) = axis.try_normalize() else {
            return;
        };
        self.rotation = (self.rotation * Quat::from_axis_angle(axis, angle)).normalize();
    }

    /// Move along an axis expressed in local space.
    pub fn translate_on_axis(&mut self, axis: Vec3, distance: f32) {
        let Some(axis) = axis.try_normalize() else {
            return;
        };
        self.translation += self.rotation * axis * distance;
    }

    /// Orient so the local -Z axis points at `target` (parent space).
    ///
    /// Leaves the rotation untouched when `target` coincides with the
    /// translation or the view direction is parallel to `up`.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let Some(forward) = (target - self.translation).try_normalize() else {
            return;
        };
        let Some(right) = forward.cross(up).try_normalize() else {
            return;
        };
        let true_up = right.cross(forward);
        let basis = glam::Mat3::from_cols(right, true_up, -forward);
        self.rotation = Quat::from_mat3(&basis).normalize();
    }
}
