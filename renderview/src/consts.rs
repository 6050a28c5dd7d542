//! Shared constants for the renderview crate.

// ── Picking ─────────────────────────────────────────────────────

/// Pick index written for pixels that belong to no object.
pub const BACKGROUND_PICK_INDEX: u32 = 0;

/// Largest CPU pick buffer, in pixels (an 8192 × 8192 canvas). Larger
/// requests produce an empty buffer.
pub const MAX_PICK_BUFFER_PIXELS: usize = 8192 * 8192;

// ── Camera ──────────────────────────────────────────────────────

/// Default vertical field of view in degrees.
pub const DEFAULT_FOV_Y_DEG: f32 = 50.0;

/// Default near clipping plane distance.
pub const DEFAULT_NEAR: f32 = 0.1;

/// Default far clipping plane distance.
pub const DEFAULT_FAR: f32 = 2000.0;

// ── Orbit control ───────────────────────────────────────────────

/// Keeps the polar angle away from the poles so the view basis stays defined.
pub const POLAR_EPSILON: f32 = 1e-4;

/// Wheel delta (in pixels) that corresponds to one dolly step.
pub const WHEEL_STEP_PX: f32 = 100.0;
