use crossbeam_channel::Sender;
use glam::Vec2;
use netfx_platform::{HostEvent, InputSource, Result, Viewport};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Synthetic pointer session: the pointer enters, circles, and leaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerScript {
    /// Emit touch events instead of mouse events.
    pub touch: bool,
    pub enter_ms: f64,
    /// `None` keeps the pointer on the canvas for the whole run.
    pub leave_ms: Option<f64>,
    /// Orbit centre as a fraction of the viewport.
    pub center: [f32; 2],
    /// Orbit radius as a fraction of the smaller viewport side.
    pub radius: f32,
    pub period_ms: f64,
    /// Optional resize: `(at_ms, [width, height])`.
    pub resize: Option<(f64, [f32; 2])>,
}

impl Default for PointerScript {
    fn default() -> Self {
        Self {
            touch: false,
            enter_ms: 500.0,
            leave_ms: Some(6_000.0),
            center: [0.5, 0.5],
            radius: 0.25,
            period_ms: 4_000.0,
            resize: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Waiting,
    Inside,
    Gone,
}

/// Replays a [`PointerScript`] as client-space host events.
pub struct ScriptedPointer {
    script: PointerScript,
    viewport: Viewport,
    canvas_origin: Vec2,
    phase: Phase,
    resized: bool,
}

impl ScriptedPointer {
    pub fn new(script: PointerScript, viewport: Viewport, canvas_origin: Vec2) -> Self {
        Self {
            script,
            viewport,
            canvas_origin,
            phase: Phase::Idle,
            resized: false,
        }
    }

    /// Pointer position in client space at `now_ms`.
    pub fn position_at(&self, now_ms: f64) -> Vec2 {
        let w = self.viewport.width as f32;
        let h = self.viewport.height as f32;
        let center = Vec2::new(self.script.center[0] * w, self.script.center[1] * h);
        let radius = self.script.radius * w.min(h);
        let period = self.script.period_ms.max(1.0);
        let angle = (((now_ms - self.script.enter_ms) / period) * std::f64::consts::TAU) as f32;
        // 1:2 Lissajous so the path crosses itself and varies speed
        self.canvas_origin + center + Vec2::new(angle.cos(), (2.0 * angle).sin() * 0.5) * radius
    }

    fn position_event(&self, now_ms: f64, first: bool) -> HostEvent {
        let client = self.position_at(now_ms);
        match (self.script.touch, first) {
            (false, _) => HostEvent::MouseMove { client },
            (true, true) => HostEvent::TouchStart { touches: vec![client] },
            (true, false) => HostEvent::TouchMove { touches: vec![client] },
        }
    }
}

impl InputSource for ScriptedPointer {
    fn start(&mut self) -> Result<()> {
        info!(touch = self.script.touch, "scripted pointer start");
        self.phase = Phase::Waiting;
        Ok(())
    }

    fn pump(&mut self, now_ms: f64, sink: &Sender<HostEvent>) -> Result<()> {
        if let Some((at_ms, [w, h])) = self.script.resize {
            if !self.resized && now_ms >= at_ms {
                self.resized = true;
                self.viewport = Viewport::from_window(w, h, self.viewport.pixel_ratio);
                sink.send(HostEvent::Resize(self.viewport))?;
            }
        }

        match self.phase {
            Phase::Idle | Phase::Gone => {}
            Phase::Waiting if now_ms >= self.script.enter_ms => {
                sink.send(self.position_event(now_ms, true))?;
                self.phase = Phase::Inside;
            }
            Phase::Waiting => {}
            Phase::Inside => match self.script.leave_ms {
                Some(leave) if now_ms >= leave => {
                    let ev = if self.script.touch {
                        HostEvent::TouchEnd
                    } else {
                        HostEvent::MouseLeave
                    };
                    sink.send(ev)?;
                    self.phase = Phase::Gone;
                }
                _ => sink.send(self.position_event(now_ms, false))?,
            },
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if self.phase == Phase::Inside {
            self.phase = Phase::Gone;
        }
        info!("scripted pointer stop");
        Ok(())
    }
}
