//! Tunable parameters for the network effect.
//!
//! Every number the solver or renderer reads lives here so a run can be
//! reproduced or restyled from a TOML file alone. Tables mirror the struct
//! layout; keys that are omitted keep their defaults:
//!
//! ```toml
//! density = 0.0002
//! link_dist = 140.0
//!
//! [mouse_point]
//! link_only_radius = 120.0
//!
//! [lifecycle]
//! respawn_on_edge = false
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;

/// Behaviour of the always-present pointer point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MousePointConfig {
    pub enable: bool,
    pub dot_radius: f32,
    pub dot_alpha: f32,
    /// Max distance for pointer-particle links.
    pub link_dist: f32,
    pub link_alpha: f32,
    pub link_width: f32,
    /// Particles inside this radius link only to the pointer. Falls back to
    /// `link_dist` when unset.
    pub link_only_radius: Option<f32>,
}

impl Default for MousePointConfig {
    fn default() -> Self {
        Self {
            enable: true,
            dot_radius: 2.2,
            dot_alpha: 0.85,
            link_dist: 160.0,
            link_alpha: 0.30,
            link_width: 1.0,
            link_only_radius: Some(90.0),
        }
    }
}

impl MousePointConfig {
    pub fn link_only_radius(&self) -> f32 {
        self.link_only_radius.unwrap_or(self.link_dist)
    }
}

/// Spawn, expiry and respawn rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    pub enable: bool,
    pub life_min_ms: f32,
    pub life_max_ms: f32,
    /// Respawn particles that touch the padded viewport edge instead of bouncing.
    pub respawn_on_edge: bool,
    pub edge_padding: f32,
    /// Re-run population adjustment every frame.
    pub replenish: bool,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            enable: true,
            life_min_ms: 24_000.0,
            life_max_ms: 60_000.0,
            respawn_on_edge: true,
            edge_padding: 0.0,
            replenish: true,
        }
    }
}

/// Constants that tie the solver to its assumed frame rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Multiplier applied to pointer and separation forces (assumes ~60 Hz stepping).
    pub frame_rate_scale: f32,
    /// Delta used for the very first frame, before one can be measured.
    pub nominal_frame_ms: f32,
    /// Per-frame multiplicative decay of the pointer velocity while inactive.
    pub pointer_velocity_decay: f32,
    /// Coordinate offsets between the x and y wander samples.
    pub wander_axis_offset: [f32; 2],
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            frame_rate_scale: 60.0,
            nominal_frame_ms: 16.7,
            pointer_velocity_decay: 0.85,
            wander_axis_offset: [19.7, 7.3],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    // population
    pub density: f64,
    pub min_particles: usize,
    pub max_particles: usize,

    // particle links
    pub link_dist: f32,
    pub link_alpha: f32,
    pub link_width: f32,

    // dots
    pub dot_alpha: f32,
    pub dot_size_min: f32,
    pub dot_size_max: f32,

    /// Alpha erased from the whole surface each frame.
    pub fade_alpha: f32,

    // motion
    pub damping: f32,
    pub max_speed: f32,
    pub initial_speed: f32,

    // pointer attraction
    pub attract_radius: f32,
    pub attract_strength: f32,
    pub core_hold_ratio: f32,
    /// Overrides `core_hold_ratio` when set to a finite value.
    pub core_hold_radius: Option<f32>,

    // pointer contact
    pub cursor_collider_radius: f32,
    pub bump_strength: f32,
    pub inherit_mouse: f32,

    // particle-particle volume
    pub separation_dist: f32,
    pub separation_strength: f32,

    // wander
    pub wander_strength: f32,
    pub wander_scale: f32,
    pub wander_time: f32,

    /// RGB of every stroke and fill; only opacity varies.
    pub color: [u8; 3],

    pub mouse_point: MousePointConfig,
    pub lifecycle: LifecycleConfig,
    pub timing: TimingConfig,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            density: 0.00013,
            min_particles: 140,
            max_particles: 320,
            link_dist: 160.0,
            link_alpha: 0.20,
            link_width: 1.0,
            dot_alpha: 0.85,
            dot_size_min: 1.2,
            dot_size_max: 2.3,
            fade_alpha: 0.16,
            damping: 0.987,
            max_speed: 2.15,
            initial_speed: 0.7,
            attract_radius: 140.0,
            attract_strength: 0.0008,
            core_hold_ratio: 0.50,
            core_hold_radius: None,
            cursor_collider_radius: 16.0,
            bump_strength: 0.020,
            inherit_mouse: 0.66,
            separation_dist: 12.0,
            separation_strength: 0.010,
            wander_strength: 0.002,
            wander_scale: 0.010,
            wander_time: 0.00050,
            color: [234, 240, 255],
            mouse_point: MousePointConfig::default(),
            lifecycle: LifecycleConfig::default(),
            timing: TimingConfig::default(),
        }
    }
}

impl NetworkConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Radius around the pointer inside which attraction stops.
    ///
    /// Always strictly below `attract_radius` (unless that is zero, in which
    /// case no particle is ever inside the attraction zone).
    pub fn core_hold_radius(&self) -> f32 {
        let r = match self.core_hold_radius {
            Some(r) if r.is_finite() => r,
            _ => self.attract_radius * self.core_hold_ratio,
        };
        r.min(self.attract_radius - 1.0).max(0.0)
    }

    /// Returns a copy with degenerate values clamped into a usable range.
    ///
    /// Nothing is rejected: each adjustment is logged and the run carries on.
    pub fn sanitized(&self) -> Self {
        let mut c = self.clone();

        if c.min_particles > c.max_particles {
            warn!(
                min = c.min_particles,
                max = c.max_particles,
                "min_particles above max_particles; swapping"
            );
            std::mem::swap(&mut c.min_particles, &mut c.max_particles);
        }
        if c.dot_size_min > c.dot_size_max {
            warn!("dot_size_min above dot_size_max; swapping");
            std::mem::swap(&mut c.dot_size_min, &mut c.dot_size_max);
        }
        if c.lifecycle.life_min_ms > c.lifecycle.life_max_ms {
            warn!("life_min_ms above life_max_ms; swapping");
            std::mem::swap(&mut c.lifecycle.life_min_ms, &mut c.lifecycle.life_max_ms);
        }

        if !(c.density >= 0.0) {
            warn!(value = c.density, "density must be non-negative; clamping to 0");
            c.density = 0.0;
        }
        non_negative(&mut c.link_dist, "link_dist");
        non_negative(&mut c.dot_size_min, "dot_size_min");
        non_negative(&mut c.max_speed, "max_speed");
        non_negative(&mut c.attract_radius, "attract_radius");
        non_negative(&mut c.cursor_collider_radius, "cursor_collider_radius");
        non_negative(&mut c.separation_dist, "separation_dist");
        non_negative(&mut c.mouse_point.link_dist, "mouse_point.link_dist");
        non_negative(&mut c.lifecycle.edge_padding, "lifecycle.edge_padding");
        non_negative(&mut c.lifecycle.life_min_ms, "lifecycle.life_min_ms");
        if let Some(r) = c.mouse_point.link_only_radius.as_mut() {
            non_negative(r, "mouse_point.link_only_radius");
        }

        unit_interval(&mut c.damping, "damping");
        unit_interval(&mut c.fade_alpha, "fade_alpha");
        unit_interval(&mut c.timing.pointer_velocity_decay, "timing.pointer_velocity_decay");

        if c.timing.nominal_frame_ms <= 0.0 || !c.timing.nominal_frame_ms.is_finite() {
            warn!(value = c.timing.nominal_frame_ms, "nominal_frame_ms must be positive; using 16.7");
            c.timing.nominal_frame_ms = TimingConfig::default().nominal_frame_ms;
        }

        // Resolve the core-hold radius once so the stored value already honours
        // core < attract.
        let core = c.core_hold_radius();
        if let Some(requested) = c.core_hold_radius {
            if requested.is_finite() && requested != core {
                warn!(requested, clamped = core, "core_hold_radius clamped below attract_radius");
            }
        }
        c.core_hold_radius = Some(core);

        c
    }
}

fn non_negative(value: &mut f32, name: &str) {
    if !(*value >= 0.0) {
        warn!(value = *value, "{name} must be non-negative; clamping to 0");
        *value = 0.0;
    }
}

fn unit_interval(value: &mut f32, name: &str) {
    if !(0.0..=1.0).contains(value) {
        let clamped = if value.is_nan() { 1.0 } else { value.clamp(0.0, 1.0) };
        warn!(value = *value, clamped, "{name} outside [0, 1]");
        *value = clamped;
    }
}
