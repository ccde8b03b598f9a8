use crate::coords::Viewport;
use crate::device::Gpu;
use crate::paint::Color;

/// Device handles a renderer needs for one frame.
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub surface_format: wgpu::TextureFormat,
    /// Drawable size in physical pixels.
    pub viewport: Viewport,
}

impl<'a> RenderCtx<'a> {
    pub fn from_gpu(gpu: &'a Gpu<'_>) -> Self {
        let size = gpu.size();
        Self {
            device: gpu.device(),
            queue: gpu.queue(),
            surface_format: gpu.surface_format(),
            viewport: Viewport::new(size.width as f32, size.height as f32),
        }
    }

    /// Rounds `size` up to the device's dynamic uniform offset alignment.
    pub fn uniform_stride(&self, size: u64) -> u64 {
        let align = u64::from(self.device.limits().min_uniform_buffer_offset_alignment).max(1);
        size.div_ceil(align) * align
    }
}

/// Encoder and color attachment of the frame being recorded.
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
}

impl<'a> RenderTarget<'a> {
    #[inline]
    pub fn new(encoder: &'a mut wgpu::CommandEncoder, color_view: &'a wgpu::TextureView) -> Self {
        Self { encoder, color_view }
    }

    /// Opens a color-only pass. `clear` wipes the target first; `None`
    /// keeps what earlier passes drew.
    pub fn begin_pass(&mut self, label: &str, clear: Option<Color>) -> wgpu::RenderPass<'_> {
        let load = match clear {
            Some(c) => wgpu::LoadOp::Clear(c.to_wgpu()),
            None => wgpu::LoadOp::Load,
        };

        self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: self.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
    }
}
