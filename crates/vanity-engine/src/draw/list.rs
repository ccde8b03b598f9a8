use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::paint::Color;

use super::attrib::{AttribPointer, AttribSlot};
use super::grow::GrowArray;
use super::matrix::{same_bits, MatrixStack};
use super::op::{DrawRange, Op, Vertex};

/// Primitive kinds accepted by `begin` and the array draws.
///
/// Only triangles are rasterized; the other kinds exist so callers fail
/// loudly instead of silently drawing something else.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Primitive {
    Points,
    Lines,
    Triangles,
}

/// Primitive-assembly state.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Assembly {
    Idle,
    Triangles,
}

const DEFAULT_COLOR: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);
const UNCOLORED_ARRAY: Vec4 = Vec4::ONE;

/// Attribute data copied out of caller memory, waiting for the next array draw.
#[derive(Debug, Default)]
struct Staged {
    positions: GrowArray<Vec4>,
    colors: GrowArray<Vec4>,
    has_positions: bool,
    has_colors: bool,
    changed: bool,
    /// Where the last appended batch starts in `vertices`.
    base: u32,
    count: u32,
}

/// Retained immediate-mode draw list.
///
/// Vertex/color calls between `begin` and `end`, and array draws staged via
/// `attribute_pointer`, all land in one vertex array, one index array and
/// one opcode list, in call order. `submit` uploads the arrays and replays
/// the opcodes.
///
/// Call `reset` at the start of every frame. Misuse (wrong state, bad
/// indices, unsupported primitive) panics: the only caller is the plot
/// tessellator and a mistake there is a bug, not an input error.
#[derive(Debug)]
pub struct DrawList {
    state: Assembly,
    range_start: u32,
    active_color: Vec4,

    vertices: GrowArray<Vertex>,
    indices: GrowArray<u32>,
    ops: GrowArray<Op>,

    matrices: MatrixStack,
    last_matrix: Option<Mat4>,

    staged: Staged,
}

impl DrawList {
    pub fn new() -> Self {
        Self {
            state: Assembly::Idle,
            range_start: 0,
            active_color: DEFAULT_COLOR,
            vertices: GrowArray::new(),
            indices: GrowArray::new(),
            ops: GrowArray::new(),
            matrices: MatrixStack::new(),
            last_matrix: None,
            staged: Staged::default(),
        }
    }

    /// Starts a new frame. Counts drop to zero, capacity is kept.
    pub fn reset(&mut self) {
        self.state = Assembly::Idle;
        self.range_start = 0;
        self.active_color = DEFAULT_COLOR;

        self.vertices.clear();
        self.indices.clear();
        self.ops.clear();

        self.matrices.reset();
        self.last_matrix = None;

        self.staged.positions.clear();
        self.staged.colors.clear();
        self.staged.has_positions = false;
        self.staged.has_colors = false;
        self.staged.changed = false;
        self.staged.base = 0;
        self.staged.count = 0;
    }

    /// Records a full-target clear.
    pub fn clear_color(&mut self, color: Color) {
        self.ops.push(Op::ClearColor(color));
    }

    // ── primitive assembly ────────────────────────────────────────────────

    pub fn begin(&mut self, primitive: Primitive) {
        assert_triangles(primitive);
        assert!(
            self.state == Assembly::Idle,
            "begin called while a primitive is already open"
        );

        self.range_start = self.vertex_count();
        self.active_color = DEFAULT_COLOR;
        self.state = Assembly::Triangles;
    }

    pub fn end(&mut self) {
        assert!(self.state != Assembly::Idle, "end called without begin");

        self.upload_matrix();
        let count = self.vertex_count() - self.range_start;
        self.ops
            .push(Op::DrawArrays(DrawRange::new(self.range_start, count)));

        self.state = Assembly::Idle;
    }

    pub fn vertex4(&mut self, pos: Vec4) {
        assert!(self.state != Assembly::Idle, "vertex called outside begin/end");

        self.vertices.push(Vertex {
            pos: pos.to_array(),
            color: self.active_color.to_array(),
        });
    }

    #[inline]
    pub fn vertex3(&mut self, pos: Vec3) {
        self.vertex4(pos.extend(1.0));
    }

    #[inline]
    pub fn vertex2(&mut self, pos: Vec2) {
        self.vertex4(Vec4::new(pos.x, pos.y, 0.0, 1.0));
    }

    /// Sets the color of subsequent vertices.
    #[inline]
    pub fn color4(&mut self, color: Vec4) {
        self.active_color = color;
    }

    #[inline]
    pub fn color3(&mut self, color: Vec3) {
        self.color4(color.extend(1.0));
    }

    #[inline]
    pub fn color(&mut self, color: Color) {
        self.color4(color.to_vec4());
    }

    // ── matrices ──────────────────────────────────────────────────────────

    pub fn load_matrix(&mut self, m: Mat4) {
        self.matrices.load(m);
    }

    pub fn push_matrix(&mut self, m: Mat4) {
        self.matrices.push(m);
    }

    pub fn pop_matrix(&mut self) {
        self.matrices.pop();
    }

    /// Appends a matrix load only if the stack top changed since the last one.
    fn upload_matrix(&mut self) {
        let top = self.matrices.top();
        if let Some(last) = &self.last_matrix {
            if same_bits(last, &top) {
                return;
            }
        }
        self.last_matrix = Some(top);
        self.ops.push(Op::LoadMatrix(top));
    }

    // ── array draws ───────────────────────────────────────────────────────

    /// Copies `pointer`'s data into engine storage for the next array draw.
    pub fn attribute_pointer(&mut self, slot: AttribSlot, pointer: AttribPointer<'_>) {
        pointer.validate(slot);

        let (dst, present) = match slot {
            AttribSlot::Position => (&mut self.staged.positions, &mut self.staged.has_positions),
            AttribSlot::Color => (&mut self.staged.colors, &mut self.staged.has_colors),
        };
        dst.clear();
        dst.reserve(pointer.count);
        for i in 0..pointer.count {
            dst.push(pointer.read(i));
        }
        *present = true;
        self.staged.changed = true;
    }

    /// Draws `count` staged vertices starting at `first`.
    pub fn draw_arrays(&mut self, primitive: Primitive, first: u32, count: u32) {
        assert_triangles(primitive);
        assert!(self.state == Assembly::Idle, "draw_arrays inside begin/end");

        self.upload_staged();
        assert!(
            first
                .checked_add(count)
                .is_some_and(|end| end <= self.staged.count),
            "draw_arrays range {first}+{count} exceeds {} staged vertices",
            self.staged.count
        );
        self.upload_matrix();

        self.ops.push(Op::DrawArrays(DrawRange::new(
            self.staged.base + first,
            count,
        )));
    }

    /// Draws staged vertices through `indices`, which are relative to the
    /// staged batch and get rebased onto its position in the vertex array.
    pub fn draw_elements(&mut self, primitive: Primitive, indices: &[u32]) {
        assert_triangles(primitive);
        assert!(self.state == Assembly::Idle, "draw_elements inside begin/end");

        self.upload_staged();
        self.upload_matrix();

        let first = self.indices.len() as u32;
        let base = self.staged.base;
        let staged = self.staged.count;
        self.indices.reserve(indices.len());
        for &i in indices {
            assert!(i < staged, "index {i} out of range for {staged} staged vertices");
            self.indices.push(base + i);
        }

        self.ops.push(Op::DrawElements(DrawRange::new(
            first,
            indices.len() as u32,
        )));
    }

    fn upload_staged(&mut self) {
        if !self.staged.changed {
            return;
        }
        self.staged.changed = false;

        let count = self.staged.positions.len();
        assert!(
            self.staged.has_positions && count > 0,
            "array draw without a position attribute"
        );
        if self.staged.has_colors {
            assert_eq!(
                self.staged.colors.len(),
                count,
                "color attribute count differs from position count"
            );
        }

        let base = self.vertex_count();
        self.vertices.reserve(count);
        for i in 0..count {
            let color = if self.staged.has_colors {
                self.staged.colors.as_slice()[i]
            } else {
                UNCOLORED_ARRAY
            };
            self.vertices.push(Vertex {
                pos: self.staged.positions.as_slice()[i].to_array(),
                color: color.to_array(),
            });
        }

        self.staged.base = base;
        self.staged.count = count as u32;
    }

    // ── inspection ────────────────────────────────────────────────────────

    #[inline]
    pub fn state(&self) -> Assembly {
        self.state
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        self.vertices.as_slice()
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        self.indices.as_slice()
    }

    #[inline]
    pub fn ops(&self) -> &[Op] {
        self.ops.as_slice()
    }

    #[inline]
    pub fn matrix_depth(&self) -> usize {
        self.matrices.depth()
    }

    #[inline]
    pub fn top_matrix(&self) -> Mat4 {
        self.matrices.top()
    }

    /// Capacities of the vertex, index and opcode arrays.
    pub fn capacities(&self) -> (usize, usize, usize) {
        (
            self.vertices.capacity(),
            self.indices.capacity(),
            self.ops.capacity(),
        )
    }

    #[inline]
    fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }
}

impl Default for DrawList {
    fn default() -> Self {
        Self::new()
    }
}

fn assert_triangles(primitive: Primitive) {
    assert!(
        primitive == Primitive::Triangles,
        "unsupported primitive {primitive:?}; only Triangles is implemented"
    );
}
