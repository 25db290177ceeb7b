//! Pointer (mouse or single touch) state, driven by explicit events.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Input transitions the engine understands, in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Move(Vec2),
    Leave,
    Blur,
    TouchStart(Vec2),
    TouchMove(Vec2),
    TouchEnd,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PointerState {
    pub pos: Vec2,
    pub prev: Vec2,
    /// Position delta per frame.
    pub vel: Vec2,
    pub active: bool,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one input event. Leaves the record consistent for the next frame.
    pub fn apply(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Move(pos) => {
                self.pos = pos;
                if !self.active {
                    // entering: no velocity spike from a stale previous position
                    self.active = true;
                    self.prev = pos;
                }
            }
            PointerEvent::TouchStart(pos) => {
                self.active = true;
                self.pos = pos;
                self.prev = pos;
            }
            PointerEvent::TouchMove(pos) => self.pos = pos,
            PointerEvent::Leave | PointerEvent::Blur | PointerEvent::TouchEnd => {
                self.active = false;
            }
        }
    }

    /// Once per frame: derive velocity from movement, or decay it while inactive.
    pub fn update_velocity(&mut self, decay: f32) {
        if !self.active {
            self.vel *= decay;
            return;
        }
        self.vel = self.pos - self.prev;
        self.prev = self.pos;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_move_activates_without_velocity() {
        let mut p = PointerState::new();
        p.apply(PointerEvent::Move(Vec2::new(100.0, 50.0)));
        p.update_velocity(0.85);
        assert!(p.active);
        assert_eq!(p.vel, Vec2::ZERO);
    }

    #[test]
    fn velocity_is_frame_delta() {
        let mut p = PointerState::new();
        p.apply(PointerEvent::Move(Vec2::new(0.0, 0.0)));
        p.update_velocity(0.85);
        p.apply(PointerEvent::Move(Vec2::new(3.0, -4.0)));
        p.apply(PointerEvent::Move(Vec2::new(6.0, -8.0)));
        p.update_velocity(0.85);
        assert_eq!(p.vel, Vec2::new(6.0, -8.0));
        p.update_velocity(0.85);
        assert_eq!(p.vel, Vec2::ZERO);
    }

    #[test]
    fn inactive_velocity_decays() {
        let mut p = PointerState::new();
        p.apply(PointerEvent::TouchStart(Vec2::ZERO));
        p.apply(PointerEvent::TouchMove(Vec2::new(10.0, 0.0)));
        p.update_velocity(0.85);
        p.apply(PointerEvent::TouchEnd);
        p.update_velocity(0.85);
        assert!(!p.active);
        assert!((p.vel.x - 8.5).abs() < 1e-5);
        for _ in 0..200 {
            p.update_velocity(0.85);
        }
        assert!(p.vel.length() < 1e-6);
    }

    #[test]
    fn leave_and_blur_deactivate() {
        for ev in [PointerEvent::Leave, PointerEvent::Blur, PointerEvent::TouchEnd] {
            let mut p = PointerState::new();
            p.apply(PointerEvent::Move(Vec2::ONE));
            p.apply(ev);
            assert!(!p.active, "{ev:?} should deactivate");
        }
    }

    #[test]
    fn touch_move_does_not_activate() {
        let mut p = PointerState::new();
        p.apply(PointerEvent::TouchMove(Vec2::new(5.0, 5.0)));
        assert!(!p.active);
        assert_eq!(p.pos, Vec2::new(5.0, 5.0));
    }
}
