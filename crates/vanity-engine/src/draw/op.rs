use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::paint::Color;

/// Vertex layout shared by the engine arrays and the GPU pipeline.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 4],
    pub color: [f32; 4],
}

/// Half-open range `[first, first + count)` of vertices or indices.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct DrawRange {
    pub first: u32,
    pub count: u32,
}

impl DrawRange {
    #[inline]
    pub const fn new(first: u32, count: u32) -> Self {
        Self { first, count }
    }

    #[inline]
    pub fn end(self) -> u32 {
        self.first + self.count
    }
}

/// Recorded engine instruction, replayed in order by `submit`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Op {
    /// Non-indexed draw over a vertex range.
    DrawArrays(DrawRange),
    /// Indexed draw over an index range; indices are already rebased.
    DrawElements(DrawRange),
    LoadMatrix(Mat4),
    ClearColor(Color),
}

impl Op {
    #[inline]
    pub fn is_draw(&self) -> bool {
        matches!(self, Op::DrawArrays(_) | Op::DrawElements(_))
    }
}

impl Default for Op {
    fn default() -> Self {
        Op::DrawArrays(DrawRange::default())
    }
}
