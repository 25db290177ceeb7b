//! Damping, speed clamp, position update, edges and lifetime.

use rand::Rng;

use crate::config::NetworkConfig;
use crate::particle::{respawn, Extent, Particle};

/// What happens to a particle that reaches the viewport edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgePolicy {
    /// Respawn once the particle touches the extent shrunk by `pad`.
    Respawn { pad: f32 },
    /// Clamp to the extent and reflect the offending velocity component.
    Bounce,
}

impl EdgePolicy {
    pub fn from_config(config: &NetworkConfig) -> Self {
        let lc = &config.lifecycle;
        if lc.enable && lc.respawn_on_edge {
            EdgePolicy::Respawn { pad: lc.edge_padding }
        } else {
            EdgePolicy::Bounce
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Moved,
    RespawnedAtEdge,
    Expired,
}

/// Advances one particle by one frame.
///
/// Motion is frame-referenced: velocity is a per-frame displacement. Only
/// the lifetime countdown consumes the measured `dt_ms`.
pub fn step<R: Rng + ?Sized>(
    p: &mut Particle,
    config: &NetworkConfig,
    extent: Extent,
    dt_ms: f32,
    rng: &mut R,
) -> StepOutcome {
    p.vel *= config.damping;

    let speed = p.vel.length();
    if speed > config.max_speed {
        p.vel *= config.max_speed / speed;
    }

    p.pos += p.vel;

    match EdgePolicy::from_config(config) {
        EdgePolicy::Respawn { pad } => {
            let out = p.pos.x <= pad
                || p.pos.x >= extent.width - pad
                || p.pos.y <= pad
                || p.pos.y >= extent.height - pad;
            if out {
                respawn(p, config, extent, rng);
                return StepOutcome::RespawnedAtEdge;
            }
        }
        EdgePolicy::Bounce => {
            if p.pos.x < 0.0 {
                p.pos.x = 0.0;
                p.vel.x = -p.vel.x;
            }
            if p.pos.x > extent.width {
                p.pos.x = extent.width;
                p.vel.x = -p.vel.x;
            }
            if p.pos.y < 0.0 {
                p.pos.y = 0.0;
                p.vel.y = -p.vel.y;
            }
            if p.pos.y > extent.height {
                p.pos.y = extent.height;
                p.vel.y = -p.vel.y;
            }
        }
    }

    if config.lifecycle.enable {
        p.life_ms -= dt_ms;
        if p.life_ms <= 0.0 {
            respawn(p, config, extent, rng);
            return StepOutcome::Expired;
        }
    }

    StepOutcome::Moved
}
