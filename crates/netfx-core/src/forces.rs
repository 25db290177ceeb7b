//! Per-frame velocity contributions: wander, pointer field, separation.
//!
//! Every function here only adds to velocities. Positions are untouched
//! until [`crate::integrator`] runs, so the order particles are visited in
//! does not change the result.

use glam::Vec2;

use crate::config::NetworkConfig;
use crate::noise::smooth_noise;
use crate::particle::Particle;
use crate::pointer::PointerState;

/// Guards unit-vector normalisation when two points coincide.
pub const DIST_EPSILON: f32 = 1e-6;

/// Nudges the particle along a slowly evolving noise field.
///
/// `time_ms` animates the field; the particle's seed decorrelates it from
/// neighbours sampling the same region.
pub fn apply_wander(p: &mut Particle, config: &NetworkConfig, time_ms: f64) {
    let scale = f64::from(config.wander_scale);
    let drift = time_ms * f64::from(config.wander_time);
    let [ox, oy] = config.timing.wander_axis_offset.map(f64::from);
    let (x, y, seed) = (f64::from(p.pos.x), f64::from(p.pos.y), f64::from(p.seed));

    let nx = smooth_noise((x + seed) * scale, (y - seed) * scale + drift);
    let ny = smooth_noise((x - seed) * scale + ox, (y + seed) * scale + drift + oy);
    p.vel += Vec2::new(nx, ny) * config.wander_strength;
}

/// Attraction toward the pointer plus the contact bump.
///
/// Attraction fades linearly from full strength at the core-hold radius to
/// zero at the attraction radius and is absent inside the core, so particles
/// gather in a ring instead of collapsing onto the pointer.
pub fn apply_local_field(p: &mut Particle, pointer: &PointerState, config: &NetworkConfig, core_hold: f32) {
    if !pointer.active {
        return;
    }

    let delta = pointer.pos - p.pos;
    let dist = delta.length();
    if dist > config.attract_radius {
        return;
    }
    let dir = delta / (dist + DIST_EPSILON);
    let k = config.timing.frame_rate_scale;

    if dist > core_hold {
        let span = (config.attract_radius - core_hold).max(DIST_EPSILON);
        let t = ((dist - core_hold) / span).clamp(0.0, 1.0);
        let pull = config.attract_strength * (1.0 - t);
        p.vel += dir * pull * k;
    }

    let cr = config.cursor_collider_radius;
    if dist < cr {
        let overlap = (cr - dist) / cr;
        p.vel -= dir * config.bump_strength * overlap * k;
        p.vel += pointer.vel * config.inherit_mouse * overlap;
    }
}

/// Pushes particle `i` and every later particle within `separation_dist`
/// apart, equal and opposite.
pub fn apply_separation(particles: &mut [Particle], i: usize, config: &NetworkConfig) {
    let sd = config.separation_dist;
    if sd <= 0.0 {
        return;
    }
    if i >= particles.len() {
        return;
    }
    let (head, tail) = particles.split_at_mut(i + 1);
    let p = &mut head[i];
    let k = config.separation_strength * config.timing.frame_rate_scale;

    for q in tail.iter_mut() {
        let delta = q.pos - p.pos;
        let dist = delta.length() + DIST_EPSILON;
        if dist < sd {
            let push = delta / dist * ((sd - dist) / sd) * k;
            p.vel -= push;
            q.vel += push;
        }
    }
}
