//! Scalar helpers shared by the gesture pipeline.

/// Euclidean distance between two 2D points.
pub fn distance(x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    let dx = x2 - x1;
    let dy = y2 - y1;
    (dx * dx + dy * dy).sqrt()
}

/// Linearly remap `value` from `[in_min, in_max]` onto `[out_min, out_max]`.
///
/// The result is not clamped: inputs outside the source range extrapolate.
pub fn map_range(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    ((value - in_min) * (out_max - out_min)) / (in_max - in_min) + out_min
}

/// Linear interpolation; `t` is the per-frame blend factor.
pub fn lerp(start: f32, end: f32, t: f32) -> f32 {
    start * (1.0 - t) + end * t
}
