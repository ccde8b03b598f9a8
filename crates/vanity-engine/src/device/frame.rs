use crate::draw::Parity;

/// Represents a single acquired frame.
///
/// This object is short-lived and must be finalized promptly. Holding the surface
/// texture prevents acquisition of subsequent frames.
///
/// `parity` names the upload region this frame may write; the fence guarding
/// it has already signaled when the frame is handed out.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
    pub parity: Parity,
}
