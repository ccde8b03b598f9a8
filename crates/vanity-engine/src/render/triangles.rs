use std::num::NonZeroU64;
use std::ops::Range;

use anyhow::Result;
use glam::Mat4;

use crate::draw::{BufferKind, Device, DrawRange, Target, Vertex};
use crate::paint::Color;
use crate::render::{RenderCtx, RenderTarget};

const MATRIX_SIZE: u64 = std::mem::size_of::<[f32; 16]>() as u64;

/// `draw::Device` over a wgpu device/queue pair.
pub struct WgpuDevice<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
}

impl<'a> WgpuDevice<'a> {
    pub fn new(device: &'a wgpu::Device, queue: &'a wgpu::Queue) -> Self {
        Self { device, queue }
    }
}

impl Device for WgpuDevice<'_> {
    type Buffer = wgpu::Buffer;

    fn create_buffer(&mut self, kind: BufferKind, size: u64) -> Result<wgpu::Buffer> {
        let max = self.device.limits().max_buffer_size;
        anyhow::ensure!(
            size <= max,
            "{kind:?} buffer of {size} bytes exceeds the device limit of {max}"
        );

        let (label, usage) = match kind {
            BufferKind::Vertex => ("vanity vertex buffer", wgpu::BufferUsages::VERTEX),
            BufferKind::Index => ("vanity index buffer", wgpu::BufferUsages::INDEX),
        };

        Ok(self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: usage | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }))
    }

    fn write_buffer(&mut self, buffer: &wgpu::Buffer, data: &[u8]) {
        self.queue.write_buffer(buffer, 0, data);
    }

    // Dropping (not `destroy`) lets in-flight submissions keep the buffer alive.
    fn destroy_buffer(&mut self, buffer: wgpu::Buffer) {
        drop(buffer);
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
enum Recorded {
    Bind(usize),
    Matrix(u32),
    Draw(DrawRange),
    DrawIndexed(DrawRange),
    Clear(Color),
}

/// Collects replayed opcodes for one frame so they can be encoded into
/// render passes afterwards.
#[derive(Default)]
pub struct TriangleRecorder {
    bindings: Vec<(wgpu::Buffer, Option<wgpu::Buffer>)>,
    matrices: Vec<Mat4>,
    ops: Vec<Recorded>,
}

impl TriangleRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops last frame's recording; keeps allocations.
    pub fn clear(&mut self) {
        self.bindings.clear();
        self.matrices.clear();
        self.ops.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl Target<wgpu::Buffer> for TriangleRecorder {
    fn bind_buffers(&mut self, vertices: &wgpu::Buffer, indices: Option<&wgpu::Buffer>) {
        self.bindings.push((vertices.clone(), indices.cloned()));
        self.ops.push(Recorded::Bind(self.bindings.len() - 1));
    }

    fn load_matrix(&mut self, matrix: Mat4) {
        self.matrices.push(matrix);
        self.ops.push(Recorded::Matrix(self.matrices.len() as u32 - 1));
    }

    fn draw(&mut self, range: DrawRange) {
        self.ops.push(Recorded::Draw(range));
    }

    fn draw_indexed(&mut self, range: DrawRange) {
        self.ops.push(Recorded::DrawIndexed(range));
    }

    fn clear(&mut self, color: Color) {
        self.ops.push(Recorded::Clear(color));
    }
}

/// One render pass worth of recorded ops.
#[derive(Debug, Clone, PartialEq)]
struct PassPlan {
    clear: Option<Color>,
    ops: Range<usize>,
    draws: bool,
}

/// Splits the recording at every clear. A clear with no draws since the
/// previous one replaces it instead of opening another pass.
fn plan_passes(ops: &[Recorded]) -> Vec<PassPlan> {
    let mut passes = vec![PassPlan {
        clear: None,
        ops: 0..0,
        draws: false,
    }];

    for (i, op) in ops.iter().enumerate() {
        let Some(current) = passes.last_mut() else {
            unreachable!("pass list starts non-empty");
        };
        match op {
            Recorded::Clear(c) if !current.draws => {
                current.clear = Some(*c);
                current.ops.end = i + 1;
            }
            Recorded::Clear(c) => passes.push(PassPlan {
                clear: Some(*c),
                ops: i + 1..i + 1,
                draws: false,
            }),
            Recorded::Draw(_) | Recorded::DrawIndexed(_) => {
                current.draws = true;
                current.ops.end = i + 1;
            }
            Recorded::Bind(_) | Recorded::Matrix(_) => current.ops.end = i + 1,
        }
    }

    passes.retain(|p| p.clear.is_some() || p.draws);
    passes
}

/// Draws a `TriangleRecorder` recording into a render target.
///
/// Every `load_matrix` gets its own slot in one uniform buffer, selected
/// per draw with a dynamic offset. Each clear starts a new render pass.
#[derive(Default)]
pub struct TriangleRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,

    bind_group_layout: Option<wgpu::BindGroupLayout>,
    bind_group: Option<wgpu::BindGroup>,

    matrix_ubo: Option<wgpu::Buffer>,
    matrix_capacity: usize,
    matrix_stride: u64,
    staging: Vec<u8>,
}

impl TriangleRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        recording: &TriangleRecorder,
    ) {
        if recording.is_empty() {
            return;
        }

        self.ensure_pipeline(ctx);
        self.ensure_matrix_capacity(ctx, recording.matrices.len().max(1));
        self.write_matrices(ctx, &recording.matrices);

        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(bind_group) = self.bind_group.as_ref() else { return };
        let stride = self.matrix_stride as u32;

        let mut bound: Option<usize> = None;
        let mut matrix_slot = 0u32;

        for pass in plan_passes(&recording.ops) {
            let mut rpass = target.begin_pass("vanity triangle pass", pass.clear);

            rpass.set_pipeline(pipeline);
            rpass.set_bind_group(0, bind_group, &[matrix_slot * stride]);
            if let Some(b) = bound {
                bind(&mut rpass, &recording.bindings[b]);
            }

            for op in &recording.ops[pass.ops] {
                match *op {
                    Recorded::Bind(b) => {
                        bound = Some(b);
                        bind(&mut rpass, &recording.bindings[b]);
                    }
                    Recorded::Matrix(slot) => {
                        matrix_slot = slot;
                        rpass.set_bind_group(0, bind_group, &[matrix_slot * stride]);
                    }
                    Recorded::Draw(r) => {
                        if bound.is_some() {
                            rpass.draw(r.first..r.end(), 0..1);
                        }
                    }
                    Recorded::DrawIndexed(r) => {
                        let indexed = bound.is_some_and(|b| recording.bindings[b].1.is_some());
                        if indexed {
                            rpass.draw_indexed(r.first..r.end(), 0, 0..1);
                        }
                    }
                    Recorded::Clear(_) => {}
                }
            }
        }
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let shader_src = include_str!("shaders/triangles.wgsl");
        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("vanity triangle shader"),
            source: wgpu::ShaderSource::Wgsl(shader_src.into()),
        });

        let bind_group_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("vanity triangle bgl"),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: true,
                            min_binding_size: NonZeroU64::new(MATRIX_SIZE),
                        },
                        count: None,
                    }],
                });

        let pipeline_layout =
            ctx.device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("vanity triangle pipeline layout"),
                    bind_group_layouts: &[&bind_group_layout],
                    immediate_size: 0,
                });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("vanity triangle pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[vertex_layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        self.bind_group_layout = Some(bind_group_layout);

        self.bind_group = None;
        self.matrix_ubo = None;
        self.matrix_capacity = 0;
    }

    fn ensure_matrix_capacity(&mut self, ctx: &RenderCtx<'_>, required: usize) {
        if required <= self.matrix_capacity && self.bind_group.is_some() {
            return;
        }
        let Some(bgl) = self.bind_group_layout.as_ref() else { return };

        self.matrix_stride = ctx.uniform_stride(MATRIX_SIZE);

        let new_cap = required.next_power_of_two().max(16);
        let matrix_ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("vanity matrix ubo"),
            size: new_cap as u64 * self.matrix_stride,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("vanity triangle bind group"),
            layout: bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &matrix_ubo,
                    offset: 0,
                    size: NonZeroU64::new(MATRIX_SIZE),
                }),
            }],
        });

        log::debug!("matrix uniform buffer grown to {new_cap} slots");
        self.matrix_ubo = Some(matrix_ubo);
        self.bind_group = Some(bind_group);
        self.matrix_capacity = new_cap;
    }

    fn write_matrices(&mut self, ctx: &RenderCtx<'_>, matrices: &[Mat4]) {
        let Some(ubo) = self.matrix_ubo.as_ref() else { return };
        let stride = self.matrix_stride as usize;

        self.staging.clear();
        self.staging.resize(matrices.len().max(1) * stride, 0);
        for (i, m) in matrices.iter().enumerate() {
            let cols = m.to_cols_array();
            let at = i * stride;
            self.staging[at..at + MATRIX_SIZE as usize].copy_from_slice(bytemuck::cast_slice(&cols));
        }

        ctx.queue.write_buffer(ubo, 0, &self.staging);
    }
}

fn bind(rpass: &mut wgpu::RenderPass<'_>, (vertices, indices): &(wgpu::Buffer, Option<wgpu::Buffer>)) {
    rpass.set_vertex_buffer(0, vertices.slice(..));
    if let Some(indices) = indices {
        rpass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
    }
}

const VERTEX_ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
    0 => Float32x4, // pos
    1 => Float32x4  // color
];

fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VERTEX_ATTRS,
    }
}
