//! Builds the per-frame draw list.
//!
//! Order is fixed back to front: trail fade, particle links, pointer links
//! and pointer dot, particle dots. The list is plain data so any surface can
//! replay it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::NetworkConfig;
use crate::particle::Particle;
use crate::pointer::PointerState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkKind {
    Particle,
    Pointer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DotKind {
    Particle,
    Pointer,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    /// Erase `alpha` of every pixel's coverage (destination-out).
    Fade { alpha: f32 },
    Line {
        kind: LinkKind,
        from: Vec2,
        to: Vec2,
        width: f32,
        alpha: f32,
        /// Particle indices; `b` is `None` for pointer links.
        a: usize,
        b: Option<usize>,
    },
    Dot {
        kind: DotKind,
        center: Vec2,
        radius: f32,
        alpha: f32,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawList {
    /// Shared RGB for every command.
    pub color: [u8; 3],
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn lines(&self, kind: LinkKind) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(move |c| matches!(c, DrawCommand::Line { kind: k, .. } if *k == kind))
    }

    pub fn dots(&self, kind: DotKind) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(move |c| matches!(c, DrawCommand::Dot { kind: k, .. } if *k == kind))
    }
}

/// Renders one frame of the network into `out`, replacing its contents.
pub fn draw_frame(config: &NetworkConfig, particles: &[Particle], pointer: &PointerState, out: &mut DrawList) {
    out.clear();
    out.color = config.color;

    out.commands.push(DrawCommand::Fade {
        alpha: config.fade_alpha,
    });
    draw_links(config, particles, pointer, out);
    draw_pointer(config, particles, pointer, out);
    draw_dots(config, particles, out);
}

fn pointer_links_enabled(config: &NetworkConfig, pointer: &PointerState) -> bool {
    pointer.active && config.mouse_point.enable
}

/// Particles near the pointer link only to it, never to each other.
fn in_link_only_zone(p: &Particle, config: &NetworkConfig, pointer: &PointerState) -> bool {
    if !pointer_links_enabled(config, pointer) {
        return false;
    }
    let r = config.mouse_point.link_only_radius();
    p.pos.distance_squared(pointer.pos) < r * r
}

fn draw_links(config: &NetworkConfig, particles: &[Particle], pointer: &PointerState, out: &mut DrawList) {
    let ld = config.link_dist;
    if ld <= 0.0 {
        return;
    }
    let excluded: Vec<bool> = particles
        .iter()
        .map(|p| in_link_only_zone(p, config, pointer))
        .collect();

    for (i, p) in particles.iter().enumerate() {
        if excluded[i] {
            continue;
        }
        for (j, q) in particles.iter().enumerate().skip(i + 1) {
            if excluded[j] {
                continue;
            }
            let dist = p.pos.distance(q.pos);
            if dist < ld {
                out.commands.push(DrawCommand::Line {
                    kind: LinkKind::Particle,
                    from: p.pos,
                    to: q.pos,
                    width: config.link_width,
                    alpha: (1.0 - dist / ld) * config.link_alpha,
                    a: i,
                    b: Some(j),
                });
            }
        }
    }
}

fn draw_pointer(config: &NetworkConfig, particles: &[Particle], pointer: &PointerState, out: &mut DrawList) {
    if !pointer_links_enabled(config, pointer) {
        return;
    }
    let mp = &config.mouse_point;

    if mp.link_dist > 0.0 {
        for (i, p) in particles.iter().enumerate() {
            let dist = p.pos.distance(pointer.pos);
            if dist < mp.link_dist {
                out.commands.push(DrawCommand::Line {
                    kind: LinkKind::Pointer,
                    from: pointer.pos,
                    to: p.pos,
                    width: mp.link_width,
                    alpha: (1.0 - dist / mp.link_dist) * mp.link_alpha,
                    a: i,
                    b: None,
                });
            }
        }
    }

    if mp.dot_radius > 0.0 {
        out.commands.push(DrawCommand::Dot {
            kind: DotKind::Pointer,
            center: pointer.pos,
            radius: mp.dot_radius,
            alpha: mp.dot_alpha,
        });
    }
}

fn draw_dots(config: &NetworkConfig, particles: &[Particle], out: &mut DrawList) {
    out.commands.extend(particles.iter().map(|p| DrawCommand::Dot {
        kind: DotKind::Particle,
        center: p.pos,
        radius: p.radius,
        alpha: config.dot_alpha,
    }));
}
