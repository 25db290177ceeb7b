//! Host abstraction traits so `netfx-core` stays host-agnostic.

use crossbeam_channel::Sender;
use glam::Vec2;
use netfx_core::{DrawList, PointerEvent};
use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Device pixel ratios outside this range are clamped.
pub const MIN_PIXEL_RATIO: f32 = 1.0;
pub const MAX_PIXEL_RATIO: f32 = 2.0;

/// Drawable area: CSS size plus the backing-store scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f32,
}

impl Viewport {
    /// Builds a viewport from raw window metrics, flooring the size and
    /// clamping the pixel ratio into `[1, 2]`.
    pub fn from_window(inner_width: f32, inner_height: f32, device_pixel_ratio: f32) -> Self {
        let pixel_ratio = if device_pixel_ratio.is_finite() {
            device_pixel_ratio.clamp(MIN_PIXEL_RATIO, MAX_PIXEL_RATIO)
        } else {
            MIN_PIXEL_RATIO
        };
        Self {
            width: inner_width.max(0.0).floor() as u32,
            height: inner_height.max(0.0).floor() as u32,
            pixel_ratio,
        }
    }

    /// Backing-store size in device pixels.
    pub fn physical_size(&self) -> (u32, u32) {
        (
            (self.width as f32 * self.pixel_ratio).floor() as u32,
            (self.height as f32 * self.pixel_ratio).floor() as u32,
        )
    }
}

/// Raw host notifications, before translation into engine terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HostEvent {
    Resize(Viewport),
    MouseMove { client: Vec2 },
    MouseLeave,
    WindowBlur,
    /// Client positions of every active touch; only the first is used.
    TouchStart { touches: Vec<Vec2> },
    TouchMove { touches: Vec<Vec2> },
    TouchEnd,
}

impl HostEvent {
    /// Converts to a pointer transition in canvas coordinates, given the
    /// canvas' top-left corner in client space. Resizes and touch events
    /// without a touch point yield `None`.
    pub fn to_pointer_event(&self, canvas_origin: Vec2) -> Option<PointerEvent> {
        match self {
            HostEvent::Resize(_) => None,
            HostEvent::MouseMove { client } => Some(PointerEvent::Move(*client - canvas_origin)),
            HostEvent::MouseLeave => Some(PointerEvent::Leave),
            HostEvent::WindowBlur => Some(PointerEvent::Blur),
            HostEvent::TouchStart { touches } => touches
                .first()
                .map(|t| PointerEvent::TouchStart(*t - canvas_origin)),
            HostEvent::TouchMove { touches } => touches
                .first()
                .map(|t| PointerEvent::TouchMove(*t - canvas_origin)),
            HostEvent::TouchEnd => Some(PointerEvent::TouchEnd),
        }
    }
}

/// Source of pointer, touch and resize notifications.
pub trait InputSource {
    fn start(&mut self) -> Result<()>;
    /// Queues every event that happened up to `now_ms`.
    fn pump(&mut self, now_ms: f64, sink: &Sender<HostEvent>) -> Result<()>;
    fn stop(&mut self) -> Result<()>;
}

/// Surface that replays the engine's draw list.
pub trait RenderSurface {
    fn init(&mut self) -> Result<()>;
    fn render_frame(&mut self, frame: &DrawList) -> Result<()>;
    /// Reallocates the backing store; its contents are cleared.
    fn resize(&mut self, _viewport: Viewport) -> Result<()> { Ok(()) }
}

/// "Run before the next repaint" scheduling.
pub trait FrameScheduler {
    /// Timestamp in milliseconds of the next frame, or `None` once the host
    /// has torn the loop down.
    fn next_frame(&mut self) -> Option<f64>;
}
