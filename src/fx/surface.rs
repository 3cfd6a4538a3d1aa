//! Drawing surfaces the effects render onto.
//!
//! Coordinates are in logical pixels. The terminal raster maps every cell to
//! an 8x16 pixel block split into two 8x8 "dots" (upper and lower half
//! block), which is enough resolution for soft blobs and jagged bolts.

use std::f32::consts::TAU;

use ratatui::{buffer::Buffer, layout::Rect, style::Color};

pub const PX_PER_COL: f32 = 8.0;
pub const PX_PER_ROW: f32 = 16.0;
const DOT_PX: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn for_cells(cols: u16, rows: u16) -> Self {
        Self {
            width: f32::from(cols) * PX_PER_COL,
            height: f32::from(rows) * PX_PER_ROW,
        }
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Straight (non-premultiplied) colour with a 0..=1 alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[must_use]
    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    fn lerp(self, other: Self, t: f32) -> Self {
        let mix = |a: u8, b: u8| (f32::from(a) + (f32::from(b) - f32::from(a)) * t).round() as u8;
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: self.a + (other.a - self.a) * t,
        }
    }

    fn premultiplied(self) -> [f32; 4] {
        let a = self.a.clamp(0.0, 1.0);
        [
            f32::from(self.r) / 255.0 * a,
            f32::from(self.g) / 255.0 * a,
            f32::from(self.b) / 255.0 * a,
            a,
        ]
    }
}

/// The drawing operations both effects need.
pub trait Surface {
    fn viewport(&self) -> Viewport;
    fn resize(&mut self, viewport: Viewport);
    fn clear(&mut self);
    /// Whole-surface translucent fill, composited source-over.
    fn fill(&mut self, color: Rgba);
    fn radial_gradient(&mut self, center: Point, radius: f32, inner: Rgba, outer: Rgba);
    /// Filled circular sector from `from_angle` to `to_angle` (radians,
    /// clockwise in screen space), fading out towards `length`.
    fn wedge(&mut self, origin: Point, from_angle: f32, to_angle: f32, length: f32, color: Rgba);
    fn stroke(&mut self, points: &[Point], width: f32, color: Rgba);
}

#[derive(Debug, Clone, PartialEq)]
pub struct RasterSurface {
    viewport: Viewport,
    cols: usize,
    dot_rows: usize,
    dots: Vec<[f32; 4]>,
}

impl RasterSurface {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        let mut surface = Self {
            viewport: Viewport::default(),
            cols: 0,
            dot_rows: 0,
            dots: Vec::new(),
        };
        surface.resize(viewport);
        surface
    }

    #[must_use]
    pub fn dims(&self) -> (usize, usize) {
        (self.cols, self.dot_rows)
    }

    /// Surface colour at a dot, un-premultiplied, `None` when untouched.
    #[must_use]
    pub fn sample(&self, col: usize, dot_row: usize) -> Option<Rgba> {
        let [r, g, b, a] = *self.dots.get(dot_row * self.cols + col)?;
        if a <= f32::EPSILON {
            return None;
        }
        let channel = |c: f32| ((c / a).clamp(0.0, 1.0) * 255.0).round() as u8;
        Some(Rgba::new(channel(r), channel(g), channel(b), a))
    }

    /// Dot colour composited over `backdrop` with the screen blend mode.
    #[must_use]
    pub fn composite(&self, col: usize, dot_row: usize, backdrop: [u8; 3]) -> [u8; 3] {
        let Some(layer) = self.sample(col, dot_row) else {
            return backdrop;
        };
        let a = layer.a.clamp(0.0, 1.0);
        let blend = |base: u8, top: u8| {
            let b = f32::from(base) / 255.0;
            let s = f32::from(top) / 255.0;
            let screen = 1.0 - (1.0 - b) * (1.0 - s);
            ((b * (1.0 - a) + screen * a) * 255.0).round() as u8
        };
        [
            blend(backdrop[0], layer.r),
            blend(backdrop[1], layer.g),
            blend(backdrop[2], layer.b),
        ]
    }

    /// Paints the surface into `area` as upper-half blocks.
    pub fn blit(&self, buf: &mut Buffer, area: Rect, backdrop: [u8; 3]) {
        for row in 0..area.height {
            for col in 0..area.width {
                let (c, r) = (usize::from(col), usize::from(row) * 2);
                let top = if c < self.cols && r < self.dot_rows {
                    self.composite(c, r, backdrop)
                } else {
                    backdrop
                };
                let bottom = if c < self.cols && r + 1 < self.dot_rows {
                    self.composite(c, r + 1, backdrop)
                } else {
                    backdrop
                };
                if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
                    cell.set_symbol("▀")
                        .set_fg(Color::Rgb(top[0], top[1], top[2]))
                        .set_bg(Color::Rgb(bottom[0], bottom[1], bottom[2]));
                }
            }
        }
    }

    fn dot_center(col: usize, dot_row: usize) -> Point {
        Point::new(
            (col as f32 + 0.5) * DOT_PX,
            (dot_row as f32 + 0.5) * DOT_PX,
        )
    }

    /// Dot index range covering `[lo, hi]` pixels, clipped to `limit`.
    fn span(lo: f32, hi: f32, limit: usize) -> std::ops::Range<usize> {
        let start = (lo / DOT_PX).floor().max(0.0) as usize;
        let end = ((hi / DOT_PX).ceil().max(0.0) as usize).min(limit);
        start.min(end)..end
    }

    fn blend_over(&mut self, col: usize, dot_row: usize, color: Rgba) {
        let src = color.premultiplied();
        if src[3] <= 0.0 {
            return;
        }
        let dst = &mut self.dots[dot_row * self.cols + col];
        for (d, s) in dst.iter_mut().zip(src) {
            *d = s + *d * (1.0 - src[3]);
        }
    }
}

impl Surface for RasterSurface {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.cols = (viewport.width.max(0.0) / DOT_PX).ceil() as usize;
        self.dot_rows = (viewport.height.max(0.0) / DOT_PX).ceil() as usize;
        self.dots = vec![[0.0; 4]; self.cols * self.dot_rows];
    }

    fn clear(&mut self) {
        self.dots.fill([0.0; 4]);
    }

    fn fill(&mut self, color: Rgba) {
        for row in 0..self.dot_rows {
            for col in 0..self.cols {
                self.blend_over(col, row, color);
            }
        }
    }

    fn radial_gradient(&mut self, center: Point, radius: f32, inner: Rgba, outer: Rgba) {
        if radius <= 0.0 {
            return;
        }
        let cols = Self::span(center.x - radius, center.x + radius, self.cols);
        let rows = Self::span(center.y - radius, center.y + radius, self.dot_rows);
        for row in rows {
            for col in cols.clone() {
                let p = Self::dot_center(col, row);
                let dist = (p.x - center.x).hypot(p.y - center.y);
                if dist >= radius {
                    continue;
                }
                self.blend_over(col, row, inner.lerp(outer, dist / radius));
            }
        }
    }

    fn wedge(&mut self, origin: Point, from_angle: f32, to_angle: f32, length: f32, color: Rgba) {
        if length <= 0.0 {
            return;
        }
        let sweep = (to_angle - from_angle).rem_euclid(TAU);
        let cols = Self::span(origin.x - length, origin.x + length, self.cols);
        let rows = Self::span(origin.y - length, origin.y + length, self.dot_rows);
        for row in rows {
            for col in cols.clone() {
                let p = Self::dot_center(col, row);
                let (dx, dy) = (p.x - origin.x, p.y - origin.y);
                let dist = dx.hypot(dy);
                if dist >= length {
                    continue;
                }
                let offset = (dy.atan2(dx) - from_angle).rem_euclid(TAU);
                if offset <= sweep || dist < DOT_PX {
                    self.blend_over(col, row, color.with_alpha(color.a * (1.0 - dist / length)));
                }
            }
        }
    }

    fn stroke(&mut self, points: &[Point], width: f32, color: Rgba) {
        if points.len() < 2 || self.dots.is_empty() {
            return;
        }
        let reach = (width / 2.0).max(DOT_PX / 2.0);
        let mut covered = vec![false; self.dots.len()];
        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let cols = Self::span(a.x.min(b.x) - reach, a.x.max(b.x) + reach, self.cols);
            let rows = Self::span(a.y.min(b.y) - reach, a.y.max(b.y) + reach, self.dot_rows);
            for row in rows {
                for col in cols.clone() {
                    if distance_to_segment(Self::dot_center(col, row), a, b) <= reach {
                        covered[row * self.cols + col] = true;
                    }
                }
            }
        }
        for (idx, hit) in covered.into_iter().enumerate() {
            if hit {
                self.blend_over(idx % self.cols, idx / self.cols, color);
            }
        }
    }
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let (abx, aby) = (b.x - a.x, b.y - a.y);
    let len_sq = abx * abx + aby * aby;
    let t = if len_sq <= f32::EPSILON {
        0.0
    } else {
        (((p.x - a.x) * abx + (p.y - a.y) * aby) / len_sq).clamp(0.0, 1.0)
    };
    (p.x - (a.x + abx * t)).hypot(p.y - (a.y + aby * t))
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Resize(Viewport),
    Clear,
    Fill(Rgba),
    RadialGradient {
        center: Point,
        radius: f32,
        inner: Rgba,
        outer: Rgba,
    },
    Wedge {
        origin: Point,
        from_angle: f32,
        to_angle: f32,
        length: f32,
        color: Rgba,
    },
    Stroke {
        points: Vec<Point>,
        width: f32,
        color: Rgba,
    },
}

/// Surface that only records the calls made against it.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    viewport: Viewport,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            commands: Vec::new(),
        }
    }

    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl Surface for RecordingSurface {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.commands.push(DrawCommand::Resize(viewport));
    }

    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn fill(&mut self, color: Rgba) {
        self.commands.push(DrawCommand::Fill(color));
    }

    fn radial_gradient(&mut self, center: Point, radius: f32, inner: Rgba, outer: Rgba) {
        self.commands.push(DrawCommand::RadialGradient {
            center,
            radius,
            inner,
            outer,
        });
    }

    fn wedge(&mut self, origin: Point, from_angle: f32, to_angle: f32, length: f32, color: Rgba) {
        self.commands.push(DrawCommand::Wedge {
            origin,
            from_angle,
            to_angle,
            length,
            color,
        });
    }

    fn stroke(&mut self, points: &[Point], width: f32, color: Rgba) {
        self.commands.push(DrawCommand::Stroke {
            points: points.to_vec(),
            width,
            color,
        });
    }
}
