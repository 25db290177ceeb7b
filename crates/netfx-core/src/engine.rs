//! The simulation context: one independent network effect.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, trace};

use crate::config::NetworkConfig;
use crate::forces::{apply_local_field, apply_separation, apply_wander};
use crate::integrator::{step, StepOutcome};
use crate::particle::{Extent, Particle, ParticleStore};
use crate::pointer::{PointerEvent, PointerState};
use crate::render::{draw_frame, DrawList};

/// Owns every piece of mutable state the effect needs.
///
/// Nothing here is global, so several engines can run side by side and each
/// one can be driven frame by frame from a test without a display.
pub struct NetworkEngine {
    config: NetworkConfig,
    core_hold: f32,
    store: ParticleStore,
    pointer: PointerState,
    extent: Extent,
    rng: StdRng,
    /// Animation clock; f64 so small deltas still register after days.
    elapsed_ms: f64,
    last_timestamp: Option<f64>,
    frame: u64,
    draw_list: DrawList,
}

/// Per-frame counters, mostly for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub particles: usize,
    pub respawned_at_edge: usize,
    pub expired: usize,
}

impl NetworkEngine {
    pub fn new(config: NetworkConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Reproducible engine: identical seeds and inputs give identical frames.
    pub fn with_seed(config: NetworkConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: NetworkConfig, rng: StdRng) -> Self {
        let config = config.sanitized();
        let core_hold = config.core_hold_radius();
        Self {
            draw_list: DrawList {
                color: config.color,
                commands: Vec::new(),
            },
            config,
            core_hold,
            store: ParticleStore::new(),
            pointer: PointerState::new(),
            extent: Extent::default(),
            rng,
            elapsed_ms: 0.0,
            last_timestamp: None,
            frame: 0,
        }
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn particles(&self) -> &[Particle] {
        self.store.as_slice()
    }

    /// Direct access for hosts and tests that need to place particles.
    pub fn particles_mut(&mut self) -> &mut [Particle] {
        self.store.as_mut_slice()
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    pub fn draw_list(&self) -> &DrawList {
        &self.draw_list
    }

    /// New viewport size; the population follows immediately.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.extent = Extent::new(width as f32, height as f32);
        self.adjust_count();
        info!(width, height, particles = self.store.len(), "network resized");
    }

    pub fn adjust_count(&mut self) {
        self.store.adjust_count(&self.config, self.extent, &mut self.rng);
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) {
        trace!(?event, "pointer event");
        self.pointer.apply(event);
    }

    /// Steps using a host timestamp, measuring the delta from the previous
    /// call. The first call uses the nominal frame time.
    pub fn frame(&mut self, timestamp_ms: f64) -> &DrawList {
        let dt_ms = match self.last_timestamp {
            Some(last) => (timestamp_ms - last).max(0.0) as f32,
            None => self.config.timing.nominal_frame_ms,
        };
        self.last_timestamp = Some(timestamp_ms);
        self.step(dt_ms)
    }

    /// Advances the simulation by one frame and renders it.
    pub fn step(&mut self, dt_ms: f32) -> &DrawList {
        let stats = self.simulate(dt_ms);
        draw_frame(
            &self.config,
            self.store.as_slice(),
            &self.pointer,
            &mut self.draw_list,
        );
        if stats.respawned_at_edge + stats.expired > 0 {
            debug!(
                frame = self.frame,
                edge = stats.respawned_at_edge,
                expired = stats.expired,
                "particles respawned"
            );
        }
        trace!(
            frame = self.frame,
            commands = self.draw_list.commands.len(),
            "frame rendered"
        );
        &self.draw_list
    }

    /// Replenish, accumulate forces, integrate. No drawing.
    pub fn simulate(&mut self, dt_ms: f32) -> FrameStats {
        self.elapsed_ms += f64::from(dt_ms);
        self.frame += 1;

        self.pointer
            .update_velocity(self.config.timing.pointer_velocity_decay);

        if self.config.lifecycle.enable && self.config.lifecycle.replenish {
            self.adjust_count();
        }

        let particles = self.store.as_mut_slice();
        for i in 0..particles.len() {
            apply_wander(&mut particles[i], &self.config, self.elapsed_ms);
            apply_local_field(&mut particles[i], &self.pointer, &self.config, self.core_hold);
            apply_separation(particles, i, &self.config);
        }

        let mut stats = FrameStats {
            particles: particles.len(),
            ..FrameStats::default()
        };
        for p in particles.iter_mut() {
            match step(p, &self.config, self.extent, dt_ms, &mut self.rng) {
                StepOutcome::Moved => {}
                StepOutcome::RespawnedAtEdge => stats.respawned_at_edge += 1,
                StepOutcome::Expired => stats.expired += 1,
            }
        }
        stats
    }
}
