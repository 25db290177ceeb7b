use glam::Vec2;
use netfx_core::{DrawCommand, DrawList};
use netfx_platform::{RenderSurface, Result, Viewport};
use tracing::{debug, info};

use std::path::Path;

/// CPU surface with canvas-2D blending: premultiplied RGBA, transparent
/// until drawn on, composited over a background only when exported.
pub struct SoftwareSurface {
    viewport: Viewport,
    width: u32,
    height: u32,
    /// Premultiplied RGBA in `[0, 1]`, row-major.
    pixels: Vec<[f32; 4]>,
    background: [u8; 3],
}

impl SoftwareSurface {
    pub fn new(viewport: Viewport, background: [u8; 3]) -> Self {
        let (width, height) = viewport.physical_size();
        Self {
            viewport,
            width,
            height,
            pixels: vec![[0.0; 4]; (width * height) as usize],
            background,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Premultiplied pixel at device coordinates.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[f32; 4]> {
        if x < self.width && y < self.height {
            Some(self.pixels[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    /// destination-out with a constant alpha: every pixel keeps `1 - alpha`.
    fn fade(&mut self, alpha: f32) {
        let keep = 1.0 - alpha.clamp(0.0, 1.0);
        for px in &mut self.pixels {
            for ch in px.iter_mut() {
                *ch *= keep;
            }
        }
    }

    fn blend(&mut self, x: i64, y: i64, color: [f32; 3], alpha: f32) {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) || alpha <= 0.0 {
            return;
        }
        let px = &mut self.pixels[(y as u32 * self.width + x as u32) as usize];
        let inv = 1.0 - alpha;
        for (dst, src) in px.iter_mut().zip(color) {
            *dst = src * alpha + *dst * inv;
        }
        px[3] = alpha + px[3] * inv;
    }

    /// Antialiased coverage of a shape given as a signed distance in device
    /// pixels, over the shape's bounding box.
    fn fill_sdf(
        &mut self,
        min: Vec2,
        max: Vec2,
        color: [f32; 3],
        alpha: f32,
        distance: impl Fn(Vec2) -> f32,
    ) {
        let x0 = (min.x.floor() as i64 - 1).max(0);
        let y0 = (min.y.floor() as i64 - 1).max(0);
        let x1 = (max.x.ceil() as i64 + 1).min(i64::from(self.width) - 1);
        let y1 = (max.y.ceil() as i64 + 1).min(i64::from(self.height) - 1);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let center = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let coverage = (0.5 - distance(center)).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(x, y, color, alpha * coverage);
                }
            }
        }
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: [f32; 3], alpha: f32) {
        let scale = self.viewport.pixel_ratio;
        let (a, b) = (from * scale, to * scale);
        let half = (width * scale / 2.0).max(0.5);
        let pad = Vec2::splat(half);
        let ab = b - a;
        let len2 = ab.length_squared();
        self.fill_sdf(a.min(b) - pad, a.max(b) + pad, color, alpha, |p| {
            let t = if len2 > 0.0 { ((p - a).dot(ab) / len2).clamp(0.0, 1.0) } else { 0.0 };
            p.distance(a + ab * t) - half
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: [f32; 3], alpha: f32) {
        let scale = self.viewport.pixel_ratio;
        let c = center * scale;
        let r = radius * scale;
        let pad = Vec2::splat(r);
        self.fill_sdf(c - pad, c + pad, color, alpha, |p| p.distance(c) - r);
    }

    /// Flattens over the background into straight RGBA8.
    pub fn to_rgba8(&self) -> Vec<[u8; 4]> {
        let bg = self.background.map(|c| f32::from(c) / 255.0);
        self.pixels
            .iter()
            .map(|px| {
                let inv = 1.0 - px[3];
                let ch = |i: usize| ((px[i] + bg[i] * inv).clamp(0.0, 1.0) * 255.0).round() as u8;
                [ch(0), ch(1), ch(2), 255]
            })
            .collect()
    }

    pub fn save_png(&self, path: &Path) -> Result<()> {
        let rgba = self.to_rgba8();
        let bytes: &[u8] = bytemuck::cast_slice(&rgba);
        let image = image::RgbaImage::from_raw(self.width, self.height, bytes.to_vec())
            .ok_or("frame buffer does not match surface size")?;
        image.save(path)?;
        debug!("saved frame to {}", path.display());
        Ok(())
    }
}

impl RenderSurface for SoftwareSurface {
    fn init(&mut self) -> Result<()> {
        info!(
            "software surface {}x{} (css {}x{} @ {}x)",
            self.width, self.height, self.viewport.width, self.viewport.height, self.viewport.pixel_ratio
        );
        Ok(())
    }

    fn render_frame(&mut self, frame: &DrawList) -> Result<()> {
        let color = frame.color.map(|c| f32::from(c) / 255.0);
        for cmd in &frame.commands {
            match *cmd {
                DrawCommand::Fade { alpha } => self.fade(alpha),
                DrawCommand::Line { from, to, width, alpha, .. } => {
                    self.stroke_line(from, to, width, color, alpha)
                }
                DrawCommand::Dot { center, radius, alpha, .. } => {
                    self.fill_circle(center, radius, color, alpha)
                }
            }
        }
        Ok(())
    }

    fn resize(&mut self, viewport: Viewport) -> Result<()> {
        *self = Self::new(viewport, self.background);
        info!(
            "software surface resized to {}x{}",
            self.width, self.height
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netfx_core::{DotKind, LinkKind};

    fn surface(ratio: f32) -> SoftwareSurface {
        SoftwareSurface::new(Viewport::from_window(40.0, 30.0, ratio), [0, 0, 0])
    }

    fn list(commands: Vec<DrawCommand>) -> DrawList {
        DrawList {
            color: [255, 255, 255],
            commands,
        }
    }

    fn dot(x: f32, y: f32, r: f32, alpha: f32) -> DrawCommand {
        DrawCommand::Dot {
            kind: DotKind::Particle,
            center: Vec2::new(x, y),
            radius: r,
            alpha,
        }
    }

    #[test]
    fn dot_covers_its_center_only() {
        let mut s = surface(1.0);
        s.render_frame(&list(vec![dot(10.0, 10.0, 3.0, 0.5)])).unwrap();
        let center = s.pixel(10, 10).unwrap();
        assert!((center[3] - 0.5).abs() < 1e-5);
        assert_eq!(s.pixel(30, 20).unwrap(), [0.0; 4]);
    }

    #[test]
    fn overlapping_draws_blend_source_over() {
        let mut s = surface(1.0);
        s.render_frame(&list(vec![dot(10.0, 10.0, 3.0, 0.5), dot(10.0, 10.0, 3.0, 0.5)]))
            .unwrap();
        let px = s.pixel(10, 10).unwrap();
        for ch in px {
            assert!((ch - 0.75).abs() < 1e-5, "{px:?}");
        }
    }

    #[test]
    fn fade_erases_a_constant_fraction() {
        let mut s = surface(1.0);
        s.render_frame(&list(vec![dot(10.0, 10.0, 3.0, 1.0)])).unwrap();
        s.render_frame(&list(vec![DrawCommand::Fade { alpha: 0.25 }])).unwrap();
        let px = s.pixel(10, 10).unwrap();
        assert!((px[3] - 0.75).abs() < 1e-5);
        assert!((px[0] - 0.75).abs() < 1e-5);
    }

    #[test]
    fn lines_are_drawn_between_endpoints() {
        let mut s = surface(1.0);
        s.render_frame(&list(vec![DrawCommand::Line {
            kind: LinkKind::Particle,
            from: Vec2::new(2.5, 5.5),
            to: Vec2::new(30.5, 5.5),
            width: 1.0,
            alpha: 1.0,
            a: 0,
            b: Some(1),
        }]))
        .unwrap();
        assert!(s.pixel(15, 5).unwrap()[3] > 0.9);
        assert_eq!(s.pixel(15, 15).unwrap()[3], 0.0);
        assert_eq!(s.pixel(35, 5).unwrap()[3], 0.0);
    }

    #[test]
    fn pixel_ratio_scales_geometry() {
        let mut s = surface(2.0);
        assert_eq!(s.size(), (80, 60));
        s.render_frame(&list(vec![dot(10.0, 10.0, 2.0, 1.0)])).unwrap();
        assert!(s.pixel(20, 20).unwrap()[3] > 0.99);
        assert_eq!(s.pixel(10, 10).unwrap()[3], 0.0);
    }

    #[test]
    fn export_composites_over_background() {
        let mut s = SoftwareSurface::new(Viewport::from_window(4.0, 4.0, 1.0), [10, 20, 30]);
        assert_eq!(s.to_rgba8()[0], [10, 20, 30, 255]);
        s.render_frame(&list(vec![dot(0.5, 0.5, 3.0, 1.0)])).unwrap();
        assert_eq!(s.to_rgba8()[0], [255, 255, 255, 255]);
    }

    #[test]
    fn resize_clears_the_backing_store() {
        let mut s = surface(1.0);
        s.render_frame(&list(vec![dot(10.0, 10.0, 3.0, 1.0)])).unwrap();
        s.resize(Viewport::from_window(20.0, 20.0, 1.0)).unwrap();
        assert_eq!(s.size(), (20, 20));
        assert_eq!(s.pixel(10, 10).unwrap(), [0.0; 4]);
    }
}
