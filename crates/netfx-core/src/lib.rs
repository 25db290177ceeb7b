//! Netfx core engine: platform-agnostic particle network simulation and draw-list rendering.
//!
//! A [`NetworkEngine`] owns the particle population, the pointer state and
//! the viewport size. Hosts feed it [`PointerEvent`]s and resize
//! notifications between frames, call [`NetworkEngine::frame`] (or
//! [`NetworkEngine::step`]) once per display refresh, and replay the
//! returned [`DrawList`] onto whatever surface they own.

pub mod config;
pub mod engine;
pub mod error;
pub mod forces;
pub mod integrator;
pub mod noise;
pub mod particle;
pub mod pointer;
pub mod render;

pub use config::{LifecycleConfig, MousePointConfig, NetworkConfig, TimingConfig};
pub use engine::{FrameStats, NetworkEngine};
pub use error::ConfigError;
pub use particle::{Extent, Particle, ParticleStore};
pub use pointer::{PointerEvent, PointerState};
pub use render::{DotKind, DrawCommand, DrawList, LinkKind};
