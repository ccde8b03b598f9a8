use anyhow::Result;
use glam::Mat4;

use crate::paint::Color;

use super::list::{Assembly, DrawList};
use super::op::{DrawRange, Op};

/// Smallest device buffer the ring allocates, in bytes.
pub const MIN_BUFFER_SIZE: u64 = 256;

/// Which of the two upload regions a frame writes into.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum Parity {
    #[default]
    Even,
    Odd,
}

impl Parity {
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Parity::Even => 0,
            Parity::Odd => 1,
        }
    }

    #[inline]
    pub fn flip(self) -> Self {
        match self {
            Parity::Even => Parity::Odd,
            Parity::Odd => Parity::Even,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferKind {
    Vertex,
    Index,
}

/// Buffer allocation seam between the engine and a graphics device.
pub trait Device {
    type Buffer;

    /// Creates a buffer of exactly `size` bytes.
    fn create_buffer(&mut self, kind: BufferKind, size: u64) -> Result<Self::Buffer>;

    /// Writes `data` at offset 0.
    fn write_buffer(&mut self, buffer: &Self::Buffer, data: &[u8]);

    fn destroy_buffer(&mut self, buffer: Self::Buffer) {
        drop(buffer);
    }
}

/// Receiver of replayed opcodes.
pub trait Target<B> {
    fn bind_buffers(&mut self, vertices: &B, indices: Option<&B>);
    fn load_matrix(&mut self, matrix: Mat4);
    fn draw(&mut self, range: DrawRange);
    fn draw_indexed(&mut self, range: DrawRange);
    fn clear(&mut self, color: Color);
}

#[derive(Debug)]
pub struct DeviceBuffer<B> {
    pub buffer: B,
    pub size: u64,
}

#[derive(Debug)]
struct Slot<B> {
    vertices: Option<DeviceBuffer<B>>,
    indices: Option<DeviceBuffer<B>>,
}

impl<B> Default for Slot<B> {
    fn default() -> Self {
        Self {
            vertices: None,
            indices: None,
        }
    }
}

/// Per-parity device buffers for vertex and index uploads.
///
/// A slot's buffers are only grown, never shrunk. Whoever drives `submit`
/// must make sure the device has finished reading a parity before
/// submitting into it again.
#[derive(Debug)]
pub struct UploadRing<B> {
    slots: [Slot<B>; 2],
}

impl<B> UploadRing<B> {
    pub fn new() -> Self {
        Self {
            slots: [Slot::default(), Slot::default()],
        }
    }

    /// Current buffer size for `parity`/`kind`, if one was allocated.
    pub fn buffer_size(&self, parity: Parity, kind: BufferKind) -> Option<u64> {
        let slot = &self.slots[parity.index()];
        let buf = match kind {
            BufferKind::Vertex => &slot.vertices,
            BufferKind::Index => &slot.indices,
        };
        buf.as_ref().map(|b| b.size)
    }

    /// Hands every buffer back to `device`.
    pub fn release<D>(&mut self, device: &mut D)
    where
        D: Device<Buffer = B>,
    {
        for slot in &mut self.slots {
            for buf in [slot.vertices.take(), slot.indices.take()].into_iter().flatten() {
                device.destroy_buffer(buf.buffer);
            }
        }
    }
}

impl<B> Default for UploadRing<B> {
    fn default() -> Self {
        Self::new()
    }
}

/// Makes sure `cell` holds at least `bytes.len()` bytes and writes `bytes`.
fn upload<'r, D: Device>(
    cell: &'r mut Option<DeviceBuffer<D::Buffer>>,
    device: &mut D,
    kind: BufferKind,
    bytes: &[u8],
) -> Result<Option<&'r D::Buffer>> {
    if bytes.is_empty() {
        return Ok(None);
    }

    let needed = bytes.len() as u64;
    if cell.as_ref().is_none_or(|b| b.size < needed) {
        let size = needed.max(MIN_BUFFER_SIZE).next_power_of_two();
        let buffer = device.create_buffer(kind, size)?;
        log::debug!("{kind:?} upload buffer grown to {size} bytes");

        if let Some(old) = cell.replace(DeviceBuffer { buffer, size }) {
            device.destroy_buffer(old.buffer);
        }
    }

    let Some(buf) = cell.as_ref() else {
        unreachable!("upload buffer allocated above");
    };
    device.write_buffer(&buf.buffer, bytes);
    Ok(Some(&buf.buffer))
}

impl DrawList {
    /// Uploads this frame's arrays into `parity`'s buffers and replays the
    /// opcodes into `target`, starting from an identity transform.
    ///
    /// Buffer creation failures are returned; nothing is replayed then.
    pub fn submit<D, T>(
        &self,
        ring: &mut UploadRing<D::Buffer>,
        device: &mut D,
        target: &mut T,
        parity: Parity,
    ) -> Result<()>
    where
        D: Device,
        T: Target<D::Buffer>,
    {
        assert!(
            self.state() == Assembly::Idle,
            "submit called inside begin/end"
        );

        let slot = &mut ring.slots[parity.index()];
        let vertices = upload(
            &mut slot.vertices,
            device,
            BufferKind::Vertex,
            bytemuck::cast_slice(self.vertices()),
        )?;
        let indices = upload(
            &mut slot.indices,
            device,
            BufferKind::Index,
            bytemuck::cast_slice(self.indices()),
        )?;

        if let Some(vertices) = vertices {
            target.bind_buffers(vertices, indices);
        }

        target.load_matrix(Mat4::IDENTITY);
        for op in self.ops() {
            match *op {
                Op::DrawArrays(range) if range.count > 0 => target.draw(range),
                Op::DrawElements(range) if range.count > 0 => target.draw_indexed(range),
                Op::DrawArrays(_) | Op::DrawElements(_) => {}
                Op::LoadMatrix(m) => target.load_matrix(m),
                Op::ClearColor(c) => target.clear(c),
            }
        }

        Ok(())
    }
}
