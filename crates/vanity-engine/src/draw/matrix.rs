use glam::Mat4;

use super::grow::GrowArray;

/// Transform stack. Never empty: the bottom entry can be replaced through
/// `load` but not popped.
#[derive(Debug, Clone)]
pub struct MatrixStack {
    stack: GrowArray<Mat4>,
}

impl MatrixStack {
    pub fn new() -> Self {
        let mut stack = GrowArray::new();
        stack.push(Mat4::IDENTITY);
        Self { stack }
    }

    /// Back to a single identity entry.
    pub fn reset(&mut self) {
        self.load(Mat4::IDENTITY);
    }

    /// Replaces the whole stack with `m`.
    pub fn load(&mut self, m: Mat4) {
        self.stack.clear();
        self.stack.push(m);
    }

    /// Pushes `top * m`, so `m` applies to vertices before the current top.
    pub fn push(&mut self, m: Mat4) {
        let top = self.top();
        self.stack.push(top * m);
    }

    /// # Panics
    /// Panics when only the base entry is left.
    pub fn pop(&mut self) {
        assert!(
            self.stack.len() > 1,
            "pop_matrix would remove the base of the matrix stack"
        );
        self.stack.pop();
    }

    #[inline]
    pub fn top(&self) -> Mat4 {
        match self.stack.last() {
            Some(m) => *m,
            None => unreachable!("matrix stack is never empty"),
        }
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl Default for MatrixStack {
    fn default() -> Self {
        Self::new()
    }
}

/// Bitwise matrix equality; `-0.0` and `0.0` differ, NaNs compare by payload.
pub(crate) fn same_bits(a: &Mat4, b: &Mat4) -> bool {
    a.to_cols_array()
        .iter()
        .zip(b.to_cols_array().iter())
        .all(|(x, y)| x.to_bits() == y.to_bits())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn push_composes_with_top() {
        let mut s = MatrixStack::new();
        let t = Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0));
        let k = Mat4::from_scale(Vec3::splat(2.0));
        s.load(t);
        s.push(k);
        assert_eq!(s.depth(), 2);
        assert_eq!(s.top(), t * k);

        s.pop();
        assert_eq!(s.top(), t);
    }

    #[test]
    #[should_panic(expected = "base of the matrix stack")]
    fn pop_below_floor_panics() {
        let mut s = MatrixStack::new();
        s.pop();
    }

    #[test]
    fn load_collapses_stack() {
        let mut s = MatrixStack::new();
        s.push(Mat4::from_scale(Vec3::splat(3.0)));
        s.push(Mat4::from_scale(Vec3::splat(3.0)));
        s.load(Mat4::IDENTITY);
        assert_eq!(s.depth(), 1);
    }

    #[test]
    fn same_bits_distinguishes_signed_zero() {
        let a = Mat4::ZERO;
        let b = Mat4::from_cols_array(&[-0.0; 16]);
        assert!(same_bits(&a, &a));
        assert!(!same_bits(&a, &b));
    }
}
