use glam::Vec2;

/// Drawable size in physical pixels.
///
/// The tessellator sizes points and line ribbons against this so that they
/// keep a constant on-screen size regardless of the data range.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Width over height.
    #[inline]
    pub fn aspect(self) -> f32 {
        self.width / self.height
    }

    /// Clip-space extent covered by `px` pixels on each axis, halved.
    ///
    /// Clip space spans 2 units across the viewport, so half of `px` pixels
    /// is `px / width` on X and `px / height` on Y.
    #[inline]
    pub fn half_extent_px(self, px: f32) -> Vec2 {
        Vec2::new(px / self.width, px / self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn zero_size_is_invalid() {
        assert!(!Viewport::new(0.0, 600.0).is_valid());
        assert!(Viewport::new(800.0, 600.0).is_valid());
    }

    #[test]
    fn half_extent_scales_per_axis() {
        let v = Viewport::new(800.0, 400.0);
        let h = v.half_extent_px(4.0);
        assert_relative_eq!(h.x, 0.005);
        assert_relative_eq!(h.y, 0.01);

        // Two half extents of `px` pixels span `px` pixels of the 2-unit clip range.
        assert_relative_eq!(2.0 * h.x * v.width / 2.0, 4.0);
        assert_relative_eq!(v.aspect(), 2.0);
    }
}
