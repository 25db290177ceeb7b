//! Particle records and the resizable store that owns them.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::NetworkConfig;

/// Size of the drawable area in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub width: f32,
    pub height: f32,
}

impl Extent {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Offsets this particle's wander samples from its neighbours'.
    pub seed: f32,
    /// Remaining lifetime; infinite when the lifecycle is disabled.
    pub life_ms: f32,
}

/// `a + u * (b - a)` with `u` in `[0, 1)`; fine for empty or inverted ranges.
#[inline]
pub(crate) fn uniform<R: Rng + ?Sized>(rng: &mut R, a: f32, b: f32) -> f32 {
    a + rng.gen::<f32>() * (b - a)
}

/// Coordinate strictly inside `(0, len)`; zero for an empty axis.
fn interior<R: Rng + ?Sized>(rng: &mut R, len: f32) -> f32 {
    if !(len > 0.0) {
        return 0.0;
    }
    // gen_range on floats is half-open, so only the zero draw needs lifting
    rng.gen_range(0.0..len).max(f32::MIN_POSITIVE)
}

fn new_life_ms<R: Rng + ?Sized>(config: &NetworkConfig, rng: &mut R) -> f32 {
    if config.lifecycle.enable {
        uniform(rng, config.lifecycle.life_min_ms, config.lifecycle.life_max_ms)
    } else {
        f32::INFINITY
    }
}

/// Creates a fresh particle, either scattered over the extent or at its centre.
pub fn make_particle<R: Rng + ?Sized>(
    config: &NetworkConfig,
    extent: Extent,
    random_pos: bool,
    rng: &mut R,
) -> Particle {
    let pos = if random_pos {
        Vec2::new(interior(rng, extent.width), interior(rng, extent.height))
    } else {
        extent.center()
    };
    let angle = uniform(rng, 0.0, std::f32::consts::TAU);
    let speed = uniform(rng, 0.4, 1.0) * config.initial_speed;

    Particle {
        pos,
        vel: Vec2::from_angle(angle) * speed,
        radius: uniform(rng, config.dot_size_min, config.dot_size_max),
        seed: uniform(rng, 0.0, 1000.0),
        life_ms: new_life_ms(config, rng),
    }
}

/// Reinitialises `p` in place exactly as `make_particle(.., true, ..)` would.
pub fn respawn<R: Rng + ?Sized>(p: &mut Particle, config: &NetworkConfig, extent: Extent, rng: &mut R) {
    *p = make_particle(config, extent, true, rng);
}

/// Number of particles wanted for an extent: area times density, clamped.
pub fn target_count(config: &NetworkConfig, extent: Extent) -> usize {
    let raw = (f64::from(extent.width) * f64::from(extent.height) * config.density).floor();
    let raw = if raw.is_finite() && raw > 0.0 { raw as usize } else { 0 };
    raw.clamp(config.min_particles, config.max_particles.max(config.min_particles))
}

#[derive(Debug, Default, Clone)]
pub struct ParticleStore {
    particles: Vec<Particle>,
}

impl ParticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    pub fn as_mut_slice(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn push(&mut self, particle: Particle) {
        self.particles.push(particle);
    }

    /// Grows or truncates the store to exactly `target_count` in one call.
    pub fn adjust_count<R: Rng + ?Sized>(&mut self, config: &NetworkConfig, extent: Extent, rng: &mut R) {
        let target = target_count(config, extent);
        let before = self.particles.len();
        if before == target {
            return;
        }
        if before < target {
            self.particles.reserve(target - before);
            while self.particles.len() < target {
                self.particles.push(make_particle(config, extent, true, rng));
            }
        } else {
            self.particles.truncate(target);
        }
        debug!(before, after = target, "adjusted particle count");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn target_count_clamps_to_bounds() {
        let c = NetworkConfig::default();
        assert_eq!(target_count(&c, Extent::new(1000.0, 800.0)), 140);
        assert_eq!(target_count(&c, Extent::new(1600.0, 1200.0)), 249);
        assert_eq!(target_count(&c, Extent::new(4000.0, 3000.0)), 320);
        assert_eq!(target_count(&c, Extent::new(0.0, 0.0)), 140);
    }

    #[test]
    fn adjust_count_converges_in_one_call_from_any_size() {
        let c = NetworkConfig::default();
        let extent = Extent::new(1600.0, 1200.0);
        let target = target_count(&c, extent);
        let mut rng = rng();
        for start in [0, 1, 140, target, 300, 320, 500] {
            let mut store = ParticleStore::new();
            for _ in 0..start {
                store.push(make_particle(&c, extent, true, &mut rng));
            }
            store.adjust_count(&c, extent, &mut rng);
            assert_eq!(store.len(), target, "starting from {start}");
        }
    }

    #[test]
    fn make_particle_respects_ranges() {
        let c = NetworkConfig::default();
        let extent = Extent::new(300.0, 200.0);
        let mut rng = rng();
        for _ in 0..500 {
            let p = make_particle(&c, extent, true, &mut rng);
            assert!((0.0..=300.0).contains(&p.pos.x) && (0.0..=200.0).contains(&p.pos.y));
            let speed = p.vel.length();
            assert!(speed >= 0.4 * c.initial_speed - 1e-4 && speed <= c.initial_speed + 1e-4);
            assert!((c.dot_size_min..=c.dot_size_max).contains(&p.radius));
            assert!((0.0..1000.0).contains(&p.seed));
            assert!((c.lifecycle.life_min_ms..=c.lifecycle.life_max_ms).contains(&p.life_ms));
        }
    }

    #[test]
    fn random_positions_are_strictly_interior() {
        let c = NetworkConfig::default();
        let extent = Extent::new(3.0, 2.0);
        let mut rng = rng();
        for _ in 0..20_000 {
            let p = make_particle(&c, extent, true, &mut rng);
            assert!(p.pos.x > 0.0 && p.pos.x < extent.width, "x = {}", p.pos.x);
            assert!(p.pos.y > 0.0 && p.pos.y < extent.height, "y = {}", p.pos.y);
        }
    }

    #[test]
    fn empty_extent_places_particles_at_origin() {
        let c = NetworkConfig::default();
        let p = make_particle(&c, Extent::new(0.0, 0.0), true, &mut rng());
        assert_eq!(p.pos, Vec2::ZERO);
    }

    #[test]
    fn centered_particle_starts_in_the_middle() {
        let c = NetworkConfig::default();
        let p = make_particle(&c, Extent::new(300.0, 200.0), false, &mut rng());
        assert_eq!(p.pos, Vec2::new(150.0, 100.0));
    }

    #[test]
    fn lifetime_is_unbounded_without_lifecycle() {
        let mut c = NetworkConfig::default();
        c.lifecycle.enable = false;
        let p = make_particle(&c, Extent::new(10.0, 10.0), true, &mut rng());
        assert!(p.life_ms.is_infinite());
    }

    #[test]
    fn respawn_reuses_the_slot() {
        let c = NetworkConfig::default();
        let extent = Extent::new(300.0, 200.0);
        let mut rng = rng();
        let mut store = ParticleStore::new();
        store.adjust_count(&c, extent, &mut rng);
        let len = store.len();
        let p = &mut store.as_mut_slice()[3];
        p.pos = Vec2::new(-50.0, -50.0);
        p.life_ms = -1.0;
        respawn(p, &c, extent, &mut rng);
        assert_eq!(store.len(), len);
        let p = store.as_slice()[3];
        assert!(p.pos.x >= 0.0 && p.pos.y >= 0.0);
        assert!(p.life_ms >= c.lifecycle.life_min_ms);
    }
}
