//! Headless host for netfx: software raster, scripted input, fixed-rate frames.
use netfx_core::{ConfigError, NetworkConfig, NetworkEngine};
use netfx_platform::{FrameScheduler, HostEvent, InputSource, RenderSurface, Result, Viewport};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use glam::Vec2;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

mod raster;
mod script;
pub use crate::raster::SoftwareSurface;
pub use crate::script::{PointerScript, ScriptedPointer};

/// Everything a headless run needs, loadable from one TOML file with the
/// engine parameters under `[network]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadlessConfig {
    pub width: f32,
    pub height: f32,
    pub device_pixel_ratio: f32,
    /// Client-space position of the canvas' top-left corner.
    pub canvas_origin: [f32; 2],
    pub frames: u64,
    pub frame_interval_ms: f64,
    /// `None` seeds from entropy.
    pub seed: Option<u64>,
    pub output_dir: PathBuf,
    /// Save every n-th frame as PNG; 0 disables export.
    pub save_every: u64,
    /// Newline-delimited JSON draw lists, one per frame.
    pub trace_path: Option<PathBuf>,
    /// Page colour the transparent canvas is composited over on export.
    pub background: [u8; 3],
    pub script: PointerScript,
    pub network: NetworkConfig,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            device_pixel_ratio: 1.0,
            canvas_origin: [0.0, 0.0],
            frames: 600,
            frame_interval_ms: 1000.0 / 60.0,
            seed: None,
            output_dir: PathBuf::from("frames"),
            save_every: 30,
            trace_path: None,
            background: [11, 15, 26],
            script: PointerScript::default(),
            network: NetworkConfig::default(),
        }
    }
}

impl HeadlessConfig {
    pub fn from_toml_str(text: &str) -> std::result::Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> std::result::Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::from_window(self.width, self.height, self.device_pixel_ratio)
    }
}

/// Simulated display refresh: evenly spaced timestamps for a fixed count.
pub struct IntervalScheduler {
    interval_ms: f64,
    remaining: u64,
    now_ms: f64,
}

impl IntervalScheduler {
    pub fn new(interval_ms: f64, frames: u64) -> Self {
        Self {
            interval_ms: interval_ms.max(0.0),
            remaining: frames,
            now_ms: 0.0,
        }
    }
}

impl FrameScheduler for IntervalScheduler {
    fn next_frame(&mut self) -> Option<f64> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.now_ms += self.interval_ms;
        Some(self.now_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub saved: u64,
    pub particles: usize,
}

/// Drives the engine until the scheduler stops, replaying host events
/// between frames and rendering every frame to the software surface.
pub fn run_app(config: &HeadlessConfig) -> Result<RunSummary> {
    let viewport = config.viewport();
    let canvas_origin = Vec2::from(config.canvas_origin);

    let mut engine = match config.seed {
        Some(seed) => NetworkEngine::with_seed(config.network.clone(), seed),
        None => NetworkEngine::new(config.network.clone()),
    };
    engine.resize(viewport.width, viewport.height);

    let mut surface = SoftwareSurface::new(viewport, config.background);
    surface.init()?;

    if config.save_every > 0 {
        std::fs::create_dir_all(&config.output_dir)?;
    }
    let mut trace = match &config.trace_path {
        Some(path) => Some(BufWriter::new(File::create(path)?)),
        None => None,
    };

    let (event_sender, event_receiver) = crossbeam_channel::unbounded::<HostEvent>();
    let mut input = ScriptedPointer::new(config.script.clone(), viewport, canvas_origin);
    input.start()?;

    let mut scheduler = IntervalScheduler::new(config.frame_interval_ms, config.frames);
    let mut summary = RunSummary {
        frames: 0,
        saved: 0,
        particles: 0,
    };
    info!(frames = config.frames, "netfx headless run starting");

    while let Some(now_ms) = scheduler.next_frame() {
        input.pump(now_ms, &event_sender)?;
        for event in event_receiver.try_iter() {
            match event {
                HostEvent::Resize(next) => {
                    engine.resize(next.width, next.height);
                    surface.resize(next)?;
                }
                other => match other.to_pointer_event(canvas_origin) {
                    Some(pointer_event) => engine.handle_pointer(pointer_event),
                    None => warn!(?other, "host event without a pointer position ignored"),
                },
            }
        }

        let frame = engine.frame(now_ms);
        surface.render_frame(frame)?;
        if let Some(writer) = trace.as_mut() {
            serde_json::to_writer(&mut *writer, frame)?;
            writer.write_all(b"\n")?;
        }

        summary.frames += 1;
        if config.save_every > 0 && summary.frames % config.save_every == 0 {
            let path = config
                .output_dir
                .join(format!("frame_{:05}.png", summary.frames));
            surface.save_png(&path)?;
            summary.saved += 1;
        }
        if summary.frames % 60 == 0 {
            debug!(
                frame = summary.frames,
                particles = engine.particles().len(),
                pointer_active = engine.pointer().active,
                "frame"
            );
        }
    }

    input.stop()?;
    if let Some(mut writer) = trace {
        writer.flush()?;
    }
    summary.particles = engine.particles().len();
    info!(
        "netfx headless run finished: {} frames, {} saved, {} particles",
        summary.frames, summary.saved, summary.particles
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheduler_emits_evenly_spaced_timestamps() {
        let mut s = IntervalScheduler::new(10.0, 3);
        assert_eq!(s.next_frame(), Some(10.0));
        assert_eq!(s.next_frame(), Some(20.0));
        assert_eq!(s.next_frame(), Some(30.0));
        assert_eq!(s.next_frame(), None);
    }

    #[test]
    fn config_reads_nested_network_table() {
        let c = HeadlessConfig::from_toml_str(
            r#"
            width = 640.0
            height = 480.0
            seed = 3
            [script]
            touch = true
            [network]
            max_particles = 200
            [network.mouse_point]
            enable = false
            "#,
        )
        .unwrap();
        assert_eq!(c.viewport().width, 640);
        assert_eq!(c.seed, Some(3));
        assert!(c.script.touch);
        assert_eq!(c.network.max_particles, 200);
        assert!(!c.network.mouse_point.enable);
        assert_eq!(c.network.min_particles, 140);
    }

    #[test]
    fn run_exports_png_frames_and_json_trace() {
        let dir = std::env::temp_dir().join(format!("netfx-export-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let trace_path = dir.join("trace.jsonl");
        std::fs::create_dir_all(&dir).unwrap();

        let config = HeadlessConfig {
            width: 120.0,
            height: 90.0,
            device_pixel_ratio: 2.0,
            frames: 6,
            seed: Some(4),
            save_every: 3,
            output_dir: dir.join("frames"),
            trace_path: Some(trace_path.clone()),
            script: PointerScript {
                enter_ms: 0.0,
                ..PointerScript::default()
            },
            ..HeadlessConfig::default()
        };
        let summary = run_app(&config).unwrap();
        assert_eq!(summary.saved, 2);

        for n in [3, 6] {
            let png = config.output_dir.join(format!("frame_{n:05}.png"));
            let image = image::open(&png).unwrap().to_rgba8();
            assert_eq!(image.dimensions(), (240, 180));
        }
        let pngs = std::fs::read_dir(&config.output_dir).unwrap().count();
        assert_eq!(pngs, 2);

        let text = std::fs::read_to_string(&trace_path).unwrap();
        let frames: Vec<netfx_core::DrawList> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(frames.len(), 6);
        assert!(frames.iter().all(|f| f.color == config.network.color));
        assert!(frames
            .iter()
            .all(|f| matches!(f.commands.first(), Some(netfx_core::DrawCommand::Fade { .. }))));
        assert_eq!(frames[5].dots(netfx_core::DotKind::Pointer).count(), 1);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn short_run_without_export() {
        let config = HeadlessConfig {
            width: 200.0,
            height: 150.0,
            frames: 90,
            seed: Some(1),
            save_every: 0,
            script: PointerScript {
                enter_ms: 100.0,
                leave_ms: Some(1_000.0),
                resize: Some((800.0, [240.0, 160.0])),
                ..PointerScript::default()
            },
            ..HeadlessConfig::default()
        };
        let summary = run_app(&config).unwrap();
        assert_eq!(summary.frames, 90);
        assert_eq!(summary.saved, 0);
        assert_eq!(summary.particles, 140);
    }
}
