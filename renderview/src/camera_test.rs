#![allow(clippy::float_cmp)]

use super::*;

const EPSILON: f32 = 1e-4;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn vec_approx_eq(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < EPSILON
}

fn controller() -> OrbitController {
    let mut c = OrbitController::from_camera(&Camera::default(), OrbitSettings::default());
    c.set_viewport_height(400.0);
    c
}

fn down(button: Button) -> PointerEvent {
    PointerEvent::new(PointerKind::Down, crate::event::Point::new(0.0, 0.0)).with_button(button)
}

fn drag(dx: f64, dy: f64) -> PointerEvent {
    PointerEvent::new(PointerKind::Move, crate::event::Point::new(0.0, 0.0)).with_movement(dx, dy)
}

// --- Camera ---

#[test]
fn default_camera_looks_down_negative_z() {
    let cam = Camera::default();
    assert!(vec_approx_eq(cam.forward(), Vec3::NEG_Z));
}

#[test]
fn target_projects_to_ndc_origin() {
    let cam = Camera::looking_at(Vec3::new(3.0, 4.0, 5.0), Vec3::new(1.0, 1.0, 1.0));
    let ndc = cam.project(Vec3::new(1.0, 1.0, 1.0));
    let Some(ndc) = ndc else {
        panic!("target should be in front of the camera");
    };
    assert!(approx_eq(ndc.x, 0.0) && approx_eq(ndc.y, 0.0));
    assert!(ndc.z > -1.0 && ndc.z < 1.0);
}

#[test]
fn points_behind_camera_do_not_project() {
    let cam = Camera::default();
    assert!(cam.project(Vec3::new(0.0, 0.0, 10.0)).is_none());
}

#[test]
fn point_right_of_target_projects_right() {
    let cam = Camera::default();
    let ndc = cam.project(Vec3::new(1.0, 0.0, 0.0)).unwrap();
    assert!(ndc.x > 0.0);
    assert!(approx_eq(ndc.y, 0.0));
}

// --- OrbitController: pose ---

#[test]
fn from_camera_recovers_spherical_pose() {
    let c = controller();
    assert!(approx_eq(c.radius(), 5.0));
    assert!(approx_eq(c.azimuth(), 0.0));
    assert!(approx_eq(c.polar(), std::f32::consts::FRAC_PI_2));
    assert!(vec_approx_eq(c.position(), Vec3::new(0.0, 0.0, 5.0)));
}

#[test]
fn update_without_input_keeps_camera() {
    let mut c = controller();
    let mut cam = Camera::default();
    assert!(!c.update(&mut cam));
    assert!(vec_approx_eq(cam.position, Vec3::new(0.0, 0.0, 5.0)));
}

// --- OrbitController: rotate ---

#[test]
fn full_height_horizontal_drag_turns_once_around() {
    let mut c = controller();
    let mut cam = Camera::default();
    c.rotate(400.0, 0.0);
    c.update(&mut cam);
    assert!(vec_approx_eq(cam.position, Vec3::new(0.0, 0.0, 5.0)), "got {}", cam.position);
}

#[test]
fn quarter_drag_moves_camera_around_target() {
    let mut c = controller();
    let mut cam = Camera::default();
    c.rotate(-100.0, 0.0);
    assert!(c.update(&mut cam));
    assert!(vec_approx_eq(cam.position, Vec3::new(5.0, 0.0, 0.0)), "got {}", cam.position);
    assert!(approx_eq(cam.position.length(), 5.0));
}

#[test]
fn polar_is_clamped_away_from_poles() {
    let mut c = controller();
    let mut cam = Camera::default();
    c.rotate(0.0, 10_000.0);
    c.update(&mut cam);
    assert!(c.polar() >= POLAR_EPSILON);
    assert!(cam.position.y > 0.0);
    assert!(cam.position.x.is_finite() && cam.position.z.is_finite());
}

// --- OrbitController: dolly ---

#[test]
fn dolly_scales_radius() {
    let mut c = controller();
    let mut cam = Camera::default();
    c.dolly(2.0);
    c.update(&mut cam);
    assert!(approx_eq(c.radius(), 10.0));
}

#[test]
fn dolly_is_clamped_to_distance_limits() {
    let settings = OrbitSettings { min_distance: 2.0, max_distance: 8.0, ..OrbitSettings::default() };
    let mut c = OrbitController::from_camera(&Camera::default(), settings);
    let mut cam = Camera::default();
    c.dolly(100.0);
    c.update(&mut cam);
    assert!(approx_eq(c.radius(), 8.0));
    c.dolly(0.001);
    c.update(&mut cam);
    assert!(approx_eq(c.radius(), 2.0));
}

#[test]
fn invalid_dolly_factors_are_ignored() {
    let mut c = controller();
    let mut cam = Camera::default();
    c.dolly(0.0);
    c.dolly(-1.0);
    c.dolly(f32::NAN);
    c.update(&mut cam);
    assert!(approx_eq(c.radius(), 5.0));
}

#[test]
fn positive_wheel_moves_away() {
    let mut c = controller();
    let mut cam = Camera::default();
    let wheel = PointerEvent::new(PointerKind::Wheel, crate::event::Point::new(0.0, 0.0)).with_movement(0.0, 100.0);
    assert!(c.handle_pointer(&wheel));
    c.update(&mut cam);
    assert!(approx_eq(c.radius(), 5.0 / 0.95));
}

// --- OrbitController: pan ---

#[test]
fn pan_moves_target_and_camera_together() {
    let mut c = controller();
    let mut cam = Camera::default();
    c.pan(50.0, 0.0);
    c.update(&mut cam);
    // Dragging right slides the scene right, so the target moves left.
    assert!(cam.target.x < 0.0);
    assert!(approx_eq(cam.target.y, 0.0));
    assert!(vec_approx_eq(cam.position - cam.target, Vec3::new(0.0, 0.0, 5.0)));
}

// --- OrbitController: pointer mapping ---

#[test]
fn buttons_select_modes() {
    let mut c = controller();
    c.handle_pointer(&down(Button::Primary));
    assert_eq!(c.state(), OrbitState::Rotate);
    c.handle_pointer(&down(Button::Secondary));
    assert_eq!(c.state(), OrbitState::Pan);
    c.handle_pointer(&down(Button::Middle));
    assert_eq!(c.state(), OrbitState::Dolly);
}

#[test]
fn shift_primary_pans() {
    let mut c = controller();
    let ev = down(Button::Primary).with_modifiers(crate::event::Modifiers { shift: true, ..Default::default() });
    c.handle_pointer(&ev);
    assert_eq!(c.state(), OrbitState::Pan);
}

#[test]
fn two_pointers_pan() {
    let mut c = controller();
    let p = crate::event::Point::new(0.0, 0.0);
    c.handle_pointer(&down(Button::Primary).with_positions(vec![p, p]));
    assert_eq!(c.state(), OrbitState::Pan);
}

#[test]
fn disabled_mode_stays_idle() {
    let settings = OrbitSettings { enable_rotate: false, ..OrbitSettings::default() };
    let mut c = OrbitController::from_camera(&Camera::default(), settings);
    assert!(!c.handle_pointer(&down(Button::Primary)));
    assert_eq!(c.state(), OrbitState::Idle);
}

#[test]
fn drag_then_release_rotates_and_returns_to_idle() {
    let mut c = controller();
    let mut cam = Camera::default();
    c.handle_pointer(&down(Button::Primary));
    assert!(c.handle_pointer(&drag(-100.0, 0.0)));
    let up = PointerEvent::new(PointerKind::Up, crate::event::Point::new(0.0, 0.0));
    assert!(c.handle_pointer(&up));
    assert_eq!(c.state(), OrbitState::Idle);
    assert!(!c.handle_pointer(&drag(50.0, 0.0)));
    c.update(&mut cam);
    assert!(vec_approx_eq(cam.position, Vec3::new(5.0, 0.0, 0.0)));
}

// --- Damping ---

#[test]
fn damping_spreads_motion_over_updates() {
    let settings = OrbitSettings { enable_damping: true, damping_factor: 0.5, ..OrbitSettings::default() };
    let mut c = OrbitController::from_camera(&Camera::default(), settings);
    c.set_viewport_height(400.0);
    let mut cam = Camera::default();
    c.rotate(-100.0, 0.0);
    c.update(&mut cam);
    let first = c.azimuth();
    c.update(&mut cam);
    let second = c.azimuth();
    assert!(approx_eq(first, std::f32::consts::FRAC_PI_4));
    assert!(approx_eq(second, std::f32::consts::FRAC_PI_4 * 1.5));
}

#[test]
fn settings_deserialize_with_defaults() {
    let s: OrbitSettings = serde_json::from_str(r#"{ "rotate_speed": 2.0 }"#).unwrap();
    assert_eq!(s.rotate_speed, 2.0);
    assert_eq!(s.pan_speed, 1.0);
    assert!(s.enable_rotate);
}
