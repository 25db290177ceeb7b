//! Smooth 2D value noise used for particle wander.

/// Pseudo-random value in `[0, 1)` for an integer lattice point.
pub fn hash2(ix: f64, iy: f64) -> f32 {
    let s = (ix * 127.1 + iy * 311.7).sin() * 43_758.545_312_3;
    let h = (s - s.floor()) as f32;
    // rounding to f32 can land exactly on 1.0
    if h >= 1.0 {
        0.0
    } else {
        h
    }
}

#[inline]
fn smoothstep(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Value noise in `[-1, 1]`.
///
/// Bilinear blend of the four surrounding lattice hashes, eased with
/// smoothstep on both axes so the field and its first derivative are
/// continuous across cell boundaries. Coordinates are `f64` so the field
/// keeps animating when the time term grows large.
pub fn smooth_noise(x: f64, y: f64) -> f32 {
    let xi = x.floor();
    let yi = y.floor();
    let u = smoothstep(x - xi);
    let v = smoothstep(y - yi);

    let a = f64::from(hash2(xi, yi));
    let b = f64::from(hash2(xi + 1.0, yi));
    let c = f64::from(hash2(xi, yi + 1.0));
    let d = f64::from(hash2(xi + 1.0, yi + 1.0));

    let val = lerp(lerp(a, b, u), lerp(c, d, u), v);
    ((val * 2.0 - 1.0) as f32).clamp(-1.0, 1.0)
}
