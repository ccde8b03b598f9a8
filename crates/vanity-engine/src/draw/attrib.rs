use glam::Vec4;

/// Which per-vertex array an [`AttribPointer`] feeds.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AttribSlot {
    Position,
    Color,
}

/// Element type of an attribute array. Only `F32` can be staged.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ScalarType {
    F32,
    U8,
    U16,
    U32,
    I8,
    I16,
    I32,
}

impl ScalarType {
    pub const fn size(self) -> usize {
        match self {
            ScalarType::U8 | ScalarType::I8 => 1,
            ScalarType::U16 | ScalarType::I16 => 2,
            ScalarType::F32 | ScalarType::U32 | ScalarType::I32 => 4,
        }
    }
}

/// Borrowed description of caller-owned per-vertex data.
///
/// Element `i` starts at byte `offset + i * stride`; a zero `stride` means
/// tightly packed. The borrow only has to live for the
/// [`DrawList::attribute_pointer`](super::DrawList::attribute_pointer) call,
/// which copies what it needs.
#[derive(Debug, Copy, Clone)]
pub struct AttribPointer<'a> {
    pub width: usize,
    pub scalar: ScalarType,
    pub count: usize,
    pub stride: usize,
    pub data: &'a [u8],
    pub offset: usize,
}

impl<'a> AttribPointer<'a> {
    /// Tightly packed `f32` vectors of `width` components.
    pub fn floats(width: usize, data: &'a [f32]) -> Self {
        Self {
            width,
            scalar: ScalarType::F32,
            count: data.len() / width.max(1),
            stride: 0,
            data: bytemuck::cast_slice(data),
            offset: 0,
        }
    }

    #[inline]
    pub fn effective_stride(&self) -> usize {
        if self.stride == 0 {
            self.width * self.scalar.size()
        } else {
            self.stride
        }
    }

    /// Reads element `i`, filling missing components from `(0, 0, 0, 1)`.
    pub(crate) fn read(&self, i: usize) -> Vec4 {
        let mut out = [0.0, 0.0, 0.0, 1.0];
        let base = self.offset + i * self.effective_stride();
        for (c, slot) in out.iter_mut().enumerate().take(self.width) {
            let at = base + c * 4;
            *slot = bytemuck::pod_read_unaligned(&self.data[at..at + 4]);
        }
        Vec4::from_array(out)
    }

    pub(crate) fn validate(&self, slot: AttribSlot) {
        assert!(
            self.scalar == ScalarType::F32,
            "unsupported attribute type {:?}; only F32 can be staged",
            self.scalar
        );
        let min_width = match slot {
            AttribSlot::Position => 2,
            AttribSlot::Color => 3,
        };
        assert!(
            (min_width..=4).contains(&self.width),
            "{slot:?} attribute width {} outside {min_width}..=4",
            self.width
        );
        if self.count > 0 {
            let last_end = self.offset
                + (self.count - 1) * self.effective_stride()
                + self.width * self.scalar.size();
            assert!(
                last_end <= self.data.len(),
                "{slot:?} attribute reads {last_end} bytes from a {}-byte array",
                self.data.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_floats_fill_missing_components() {
        let data = [1.0f32, 2.0, 3.0, 4.0];
        let p = AttribPointer::floats(2, &data);
        assert_eq!(p.count, 2);
        assert_eq!(p.read(1), Vec4::new(3.0, 4.0, 0.0, 1.0));
    }

    #[test]
    fn stride_and_offset_select_interleaved_fields() {
        // x, y, r, g, b per vertex
        let data = [0.0f32, 1.0, 0.1, 0.2, 0.3, 5.0, 6.0, 0.4, 0.5, 0.6];
        let bytes: &[u8] = bytemuck::cast_slice(&data);
        let color = AttribPointer {
            width: 3,
            scalar: ScalarType::F32,
            count: 2,
            stride: 20,
            data: bytes,
            offset: 8,
        };
        color.validate(AttribSlot::Color);
        assert_eq!(color.read(1), Vec4::new(0.4, 0.5, 0.6, 1.0));
    }

    #[test]
    #[should_panic(expected = "unsupported attribute type")]
    fn non_float_rejected() {
        let bytes = [0u8; 16];
        AttribPointer {
            width: 2,
            scalar: ScalarType::U16,
            count: 2,
            stride: 0,
            data: &bytes,
            offset: 0,
        }
        .validate(AttribSlot::Position);
    }
}
