use std::f32::consts::FRAC_PI_2;

use super::*;

const EPSILON: f32 = 1e-5;

fn vec_approx_eq(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < EPSILON
}

#[test]
fn identity_leaves_points_alone() {
    let p = Vec3::new(1.0, 2.0, 3.0);
    assert!(vec_approx_eq(Transform::IDENTITY.transform_point(p), p));
    assert_eq!(Transform::default(), Transform::IDENTITY);
}

#[test]
fn matrix_applies_scale_then_rotation_then_translation() {
    let t = Transform {
        translation: Vec3::new(10.0, 0.0, 0.0),
        rotation: Quat::from_rotation_z(FRAC_PI_2),
        scale: Vec3::splat(2.0),
    };
    // (1,0,0) → scale (2,0,0) → rotate 90° about Z (0,2,0) → translate (10,2,0)
    let p = t.transform_point(Vec3::X);
    assert!(vec_approx_eq(p, Vec3::new(10.0, 2.0, 0.0)), "got {p}");
}

#[test]
fn from_matrix_round_trips_a_trs_transform() {
    let t = Transform {
        translation: Vec3::new(1.0, -2.0, 3.0),
        rotation: Quat::from_rotation_y(0.7),
        scale: Vec3::new(1.0, 2.0, 3.0),
    };
    let back = Transform::from_matrix(t.matrix());
    assert!(vec_approx_eq(back.translation, t.translation));
    assert!(vec_approx_eq(back.scale, t.scale));
    assert!(back.rotation.angle_between(t.rotation) < EPSILON);
}

#[test]
fn rotate_on_axis_is_local() {
    let mut t = Transform::from_rotation(Quat::from_rotation_y(FRAC_PI_2));
    // Local X after a 90° yaw is world -Z; rotating about it tips local Y.
    t.rotate_on_axis(Vec3::X, FRAC_PI_2);
    let up = t.rotation * Vec3::Y;
    assert!(vec_approx_eq(up, Vec3::X), "got {up}");
}

#[test]
fn rotate_on_zero_axis_is_ignored() {
    let mut t = Transform::IDENTITY;
    t.rotate_on_axis(Vec3::ZERO, 1.0);
    assert_eq!(t, Transform::IDENTITY);
}

#[test]
fn translate_on_axis_follows_rotation() {
    let mut t = Transform::from_rotation(Quat::from_rotation_y(FRAC_PI_2));
    t.translate_on_axis(Vec3::Z, 2.0);
    assert!(vec_approx_eq(t.translation, Vec3::new(2.0, 0.0, 0.0)), "got {}", t.translation);
}

#[test]
fn look_at_points_negative_z_at_target() {
    let mut t = Transform::from_translation(Vec3::new(0.0, 0.0, 5.0));
    t.look_at(Vec3::new(5.0, 0.0, 5.0), Vec3::Y);
    let forward = t.rotation * Vec3::NEG_Z;
    assert!(vec_approx_eq(forward, Vec3::X), "got {forward}");
}

#[test]
fn look_at_degenerate_cases_keep_rotation() {
    let mut t = Transform::from_rotation(Quat::from_rotation_x(0.3));
    let before = t.rotation;
    t.look_at(t.translation, Vec3::Y);
    assert_eq!(t.rotation, before);
    t.look_at(Vec3::new(0.0, 10.0, 0.0), Vec3::Y);
    assert_eq!(t.rotation, before);
}
