use glam::{Vec2, Vec3, Vec4};
use vanity_engine::coords::Viewport;
use vanity_engine::draw::{DrawList, Primitive};

use crate::consumer::DisplayList;
use crate::wire::Command;

use super::{Bounds, View, CLIP_CORRECTION};

/// Side length of a point marker, in pixels.
pub const POINT_PX: f32 = 4.0;
/// Width of a line ribbon, in pixels.
pub const LINE_PX: f32 = 1.0;

/// Emits every command of `list` into `draw` as clip-space triangles.
///
/// Returns the fitted view, or `None` when there is nothing to draw (no
/// coordinates, or a zero-sized viewport).
pub fn tessellate(list: &DisplayList, viewport: Viewport, draw: &mut DrawList) -> Option<View> {
    if !viewport.is_valid() {
        return None;
    }
    let view = View::fit(Bounds::of(list)?, viewport);
    let mut out = Emitter {
        view,
        draw,
        color: Vec3::ZERO,
    };

    out.draw.load_matrix(CLIP_CORRECTION);

    for cmd in list {
        match cmd {
            &Command::Color { r, g, b } => out.color = Vec3::new(r, g, b),
            &Command::Point { x, y } => {
                out.open();
                out.point(x, y);
                out.draw.end();
            }
            Command::PointArray { xs, ys } if !xs.is_empty() => {
                out.open();
                for (&x, &y) in xs.iter().zip(ys) {
                    out.point(x, y);
                }
                out.draw.end();
            }
            &Command::Line { x1, y1, x2, y2 } => {
                let Some(ribbon) = out.ribbon((x1, y1), (x2, y2)) else {
                    continue;
                };
                out.open();
                out.quad(ribbon);
                out.draw.end();
            }
            Command::PolyLine { xs, ys } if xs.len() >= 2 => out.polyline(xs, ys),
            _ => {}
        }
    }

    Some(view)
}

/// Corners of a quad, counter-clockwise from the start-side bottom.
type Quad = [Vec4; 4];

struct Emitter<'a> {
    view: View,
    draw: &'a mut DrawList,
    color: Vec3,
}

impl Emitter<'_> {
    fn open(&mut self) {
        self.draw.begin(Primitive::Triangles);
        self.draw.color3(self.color);
    }

    fn tri(&mut self, a: Vec4, b: Vec4, c: Vec4) {
        self.draw.vertex4(a);
        self.draw.vertex4(b);
        self.draw.vertex4(c);
    }

    fn quad(&mut self, [p0, p1, p2, p3]: Quad) {
        self.tri(p0, p1, p2);
        self.tri(p0, p2, p3);
    }

    fn point(&mut self, x: f32, y: f32) {
        let c = self.view.project(x, y);
        let h = self.view.pixel(POINT_PX);
        self.quad([
            offset(c, Vec2::new(-h.x, -h.y)),
            offset(c, Vec2::new(h.x, -h.y)),
            offset(c, Vec2::new(h.x, h.y)),
            offset(c, Vec2::new(-h.x, h.y)),
        ]);
    }

    /// One-pixel ribbon from `a` to `b`; `None` for coincident endpoints.
    ///
    /// The tangent is taken in pixel-aspect space so the width stays
    /// constant on screen whatever the segment's direction.
    fn ribbon(&self, a: (f32, f32), b: (f32, f32)) -> Option<Quad> {
        if a == b {
            return None;
        }
        let s0 = self.view.project(a.0, a.1);
        let s1 = self.view.project(b.0, b.1);

        let d = (s1 - s0).truncate().truncate();
        let tangent = Vec2::new(d.x, d.y / self.view.viewport.aspect()).normalize_or_zero();
        if tangent == Vec2::ZERO {
            return None;
        }
        let n = tangent.perp() * self.view.pixel(LINE_PX);

        Some([
            offset(s0, -n),
            offset(s1, -n),
            offset(s1, n),
            offset(s0, n),
        ])
    }

    fn polyline(&mut self, xs: &[f32], ys: &[f32]) {
        let pts: Vec<(f32, f32)> = xs.iter().copied().zip(ys.iter().copied()).collect();

        self.open();
        let mut last: Option<Quad> = None;
        for pair in pts.windows(2) {
            let Some(q) = self.ribbon(pair[0], pair[1]) else {
                continue;
            };
            self.quad(q);
            // Fill the wedge between this segment's start and the previous end.
            if let Some(prev) = last {
                self.tri(q[0], prev[2], prev[1]);
                self.tri(q[3], prev[2], prev[1]);
            }
            last = Some(q);
        }
        self.draw.end();
    }
}

#[inline]
fn offset(p: Vec4, d: Vec2) -> Vec4 {
    Vec4::new(p.x + d.x, p.y + d.y, p.z, p.w)
}
