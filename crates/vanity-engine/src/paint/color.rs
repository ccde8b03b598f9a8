use glam::{Vec3, Vec4};

/// Straight-alpha RGBA color, components in `[0, 1]`.
///
/// Plot colors arrive as three floats over the wire and are written into
/// vertices unchanged, so no premultiplication happens anywhere.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

    #[inline]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color.
    #[inline]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    pub fn to_vec4(self) -> Vec4 {
        Vec4::from_array(self.to_array())
    }

    pub fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.r as f64,
            g: self.g as f64,
            b: self.b as f64,
            a: self.a as f64,
        }
    }
}

impl From<Vec3> for Color {
    #[inline]
    fn from(v: Vec3) -> Self {
        Color::rgb(v.x, v.y, v.z)
    }
}

impl From<Vec4> for Color {
    #[inline]
    fn from(v: Vec4) -> Self {
        Color::rgba(v.x, v.y, v.z, v.w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_is_opaque() {
        assert_eq!(Color::rgb(1.0, 0.0, 0.0).a, 1.0);
    }

    #[test]
    fn vec3_conversion_adds_alpha() {
        let c: Color = Vec3::new(0.25, 0.5, 0.75).into();
        assert_eq!(c.to_array(), [0.25, 0.5, 0.75, 1.0]);
    }
}
