use glam::{Mat4, Vec2, Vec4};
use vanity_engine::coords::Viewport;

use super::Bounds;

/// Maps GL clip depth [-1, 1] onto wgpu's [0, 1]. X and Y pass through;
/// both conventions have +Y up.
pub const CLIP_CORRECTION: Mat4 = Mat4::from_cols(
    Vec4::X,
    Vec4::Y,
    Vec4::new(0.0, 0.0, 0.5, 0.0),
    Vec4::new(0.0, 0.0, 0.5, 1.0),
);

/// Data-to-clip transform for one frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct View {
    pub transform: Mat4,
    pub viewport: Viewport,
}

impl View {
    /// Fits the padded `bounds` to the whole viewport.
    pub fn fit(bounds: Bounds, viewport: Viewport) -> View {
        let b = bounds.padded();
        View {
            transform: Mat4::orthographic_rh_gl(b.min.x, b.max.x, b.min.y, b.max.y, -1.0, 1.0),
            viewport,
        }
    }

    /// Data point to GL clip space.
    #[inline]
    pub fn project(&self, x: f32, y: f32) -> Vec4 {
        self.transform * Vec4::new(x, y, 0.0, 1.0)
    }

    /// Clip offset covering `px` pixels on each side.
    #[inline]
    pub fn pixel(&self, px: f32) -> Vec2 {
        self.viewport.half_extent_px(px)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn single_point_lands_in_the_center() {
        let b = Bounds {
            min: Vec2::new(7.0, -4.0),
            max: Vec2::new(7.0, -4.0),
        };
        let view = View::fit(b, Viewport::new(800.0, 600.0));

        let clip = CLIP_CORRECTION * view.project(7.0, -4.0);
        assert_relative_eq!(clip.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(clip.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(clip.z, 0.5, epsilon = 1e-6);
        assert_relative_eq!(clip.w, 1.0);
    }

    #[test]
    fn padded_corners_hit_the_edges() {
        let b = Bounds {
            min: Vec2::new(0.0, 0.0),
            max: Vec2::new(10.0, 100.0),
        };
        let view = View::fit(b, Viewport::new(800.0, 600.0));
        let p = b.padded();

        let lo = view.project(p.min.x, p.min.y);
        let hi = view.project(p.max.x, p.max.y);
        assert_relative_eq!(lo.x, -1.0, epsilon = 1e-5);
        assert_relative_eq!(lo.y, -1.0, epsilon = 1e-5);
        assert_relative_eq!(hi.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(hi.y, 1.0, epsilon = 1e-5);

        // Data stays inside the margin.
        let data = view.project(10.0, 100.0);
        assert!(data.x < 1.0 && data.y < 1.0);
    }

    #[test]
    fn correction_keeps_xy_and_maps_depth() {
        let near = CLIP_CORRECTION * Vec4::new(0.3, -0.2, -1.0, 1.0);
        let far = CLIP_CORRECTION * Vec4::new(0.3, -0.2, 1.0, 1.0);
        assert_eq!(near, Vec4::new(0.3, -0.2, 0.0, 1.0));
        assert_eq!(far, Vec4::new(0.3, -0.2, 1.0, 1.0));
    }
}
