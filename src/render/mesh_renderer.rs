//! A batched 2D mesh renderer.
//!
//! Every draw item of a frame is folded into one vertex/index upload:
//! - positions are pre-transformed by the item's `world_from_local` (CPU side)
//! - the item's fill becomes a per-vertex color
//! - indices are rebased into one `u32` index list
//!
//! One uniform (the camera's clip_from_world) serves the whole batch, and the frame is a
//! single `draw_indexed`. Painter's order is preserved because items are appended in the
//! order given (callers sort by `z`). No depth buffer.

use std::{borrow::Cow, mem};

use anyhow::Context as _;
use log::debug;

use crate::render::gpu::Gpu;
use crate::scene::{Camera2D, DrawItem2D};

fn round_up_to(v: u64, align: u64) -> u64 {
    debug_assert!(align.is_power_of_two());
    (v + (align - 1)) & !(align - 1)
}

/// GPU vertex format: world-space position plus straight-alpha color.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex2D {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex2D {
    pub const ATTRS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4];

    #[inline]
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<Vertex2D>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
struct CameraUniforms {
    clip_from_world: [[f32; 4]; 4],
}

/// CPU-side geometry for one frame.
#[derive(Debug, Clone, Default)]
pub struct MeshBatch {
    pub vertices: Vec<Vertex2D>,
    pub indices: Vec<u32>,
}

impl MeshBatch {
    /// Fold `items` (already in draw order) into one batch.
    ///
    /// Empty meshes and fully transparent items are skipped.
    pub fn from_items(items: &[DrawItem2D]) -> Self {
        let mut batch = Self::default();
        for item in items {
            batch.push_item(item);
        }
        batch
    }

    pub fn push_item(&mut self, item: &DrawItem2D) {
        if item.mesh.is_empty() || item.fill.a <= 0.0 {
            return;
        }

        let base = self.vertices.len() as u32;
        let color = item.fill.to_array();
        let xf = item.world_from_local;

        self.vertices.extend(item.mesh.positions.iter().map(|&[x, y]| {
            let (wx, wy) = xf.transform_point(x, y);
            Vertex2D {
                position: [wx, wy],
                color,
            }
        }));
        self.indices
            .extend(item.mesh.indices.iter().map(|&i| base + u32::from(i)));
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Draws a frame's worth of `DrawItem2D`s with alpha blending.
pub struct MeshRenderer {
    pipeline: wgpu::RenderPipeline,

    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,

    // Reusable GPU buffers; grown on demand.
    vertex_buffer: wgpu::Buffer,
    vertex_capacity_bytes: u64,

    index_buffer: wgpu::Buffer,
    index_capacity_bytes: u64,

    batch: MeshBatch,
}

impl MeshRenderer {
    /// Build the pipeline for `gpu`'s sRGB surface view format.
    pub fn new(gpu: &Gpu) -> anyhow::Result<Self> {
        let shader = gpu
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("MeshRenderer Shader"),
                source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!(
                    "shaders/solid_mesh.wgsl"
                ))),
            });

        let uniform_size = wgpu::BufferSize::new(mem::size_of::<CameraUniforms>() as u64)
            .context("mesh renderer: zero-sized camera uniform")?;

        let uniform_bind_group_layout =
            gpu.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("MeshRenderer Camera BGL"),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: Some(uniform_size),
                        },
                        count: None,
                    }],
                });

        let uniform_buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("MeshRenderer Camera Buffer"),
            size: uniform_size.get(),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("MeshRenderer Camera BG"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = gpu
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("MeshRenderer Pipeline Layout"),
                bind_group_layouts: &[&uniform_bind_group_layout],
                immediate_size: 0,
            });

        let pipeline = gpu
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("MeshRenderer Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[Vertex2D::layout()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: gpu.surface_format.add_srgb_suffix(),
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            });

        let initial_vb = 4096u64;
        let initial_ib = 4096u64;

        let vertex_buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("MeshRenderer Vertex Buffer"),
            size: initial_vb,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let index_buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("MeshRenderer Index Buffer"),
            size: initial_ib,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(Self {
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            vertex_buffer,
            vertex_capacity_bytes: initial_vb,
            index_buffer,
            index_capacity_bytes: initial_ib,
            batch: MeshBatch::default(),
        })
    }

    fn ensure_capacity(&mut self, gpu: &Gpu, vb_bytes: u64, ib_bytes: u64) {
        if vb_bytes > self.vertex_capacity_bytes {
            let new_size = vb_bytes.next_power_of_two().max(4096);
            debug!(
                "mesh renderer: vertex buffer {} -> {new_size} bytes",
                self.vertex_capacity_bytes
            );
            self.vertex_buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("MeshRenderer Vertex Buffer (resized)"),
                size: new_size,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            self.vertex_capacity_bytes = new_size;
        }

        if ib_bytes > self.index_capacity_bytes {
            let new_size = ib_bytes.next_power_of_two().max(4096);
            debug!(
                "mesh renderer: index buffer {} -> {new_size} bytes",
                self.index_capacity_bytes
            );
            self.index_buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("MeshRenderer Index Buffer (resized)"),
                size: new_size,
                usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            self.index_capacity_bytes = new_size;
        }
    }

    /// Upload `items` and record one draw into `pass`.
    ///
    /// Items must already be in painter's order. Vertex positions end up in world space,
    /// so the only transform left for the GPU is the camera.
    pub fn draw_items(
        &mut self,
        gpu: &Gpu,
        pass: &mut wgpu::RenderPass<'_>,
        camera: &Camera2D,
        items: &[DrawItem2D],
    ) {
        self.batch.vertices.clear();
        self.batch.indices.clear();
        for item in items {
            self.batch.push_item(item);
        }
        if self.batch.is_empty() {
            return;
        }

        let uniforms = CameraUniforms {
            clip_from_world: camera.clip_from_world().to_mat4(),
        };
        gpu.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        // `Queue::write_buffer` needs COPY_BUFFER_ALIGNMENT-sized writes; pad the upload and
        // slice only the real range when drawing.
        let vb_bytes = (self.batch.vertices.len() * mem::size_of::<Vertex2D>()) as u64;
        let ib_bytes = (self.batch.indices.len() * mem::size_of::<u32>()) as u64;

        let align = wgpu::COPY_BUFFER_ALIGNMENT;
        let vb_upload = round_up_to(vb_bytes, align);
        let ib_upload = round_up_to(ib_bytes, align);

        self.ensure_capacity(gpu, vb_upload, ib_upload);
        write_padded(
            gpu,
            &self.vertex_buffer,
            bytemuck::cast_slice(&self.batch.vertices),
            vb_upload,
        );
        write_padded(
            gpu,
            &self.index_buffer,
            bytemuck::cast_slice(&self.batch.indices),
            ib_upload,
        );

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..vb_bytes));
        pass.set_index_buffer(self.index_buffer.slice(..ib_bytes), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..(self.batch.indices.len() as u32), 0, 0..1);
    }
}

fn write_padded(gpu: &Gpu, buffer: &wgpu::Buffer, raw: &[u8], upload_bytes: u64) {
    if upload_bytes == raw.len() as u64 {
        gpu.queue.write_buffer(buffer, 0, raw);
    } else {
        let mut padded = Vec::<u8>::with_capacity(upload_bytes as usize);
        padded.extend_from_slice(raw);
        padded.resize(upload_bytes as usize, 0);
        gpu.queue.write_buffer(buffer, 0, &padded);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Affine2, Mesh2D, Rgba};

    fn item(origin: [f32; 2], fill: Rgba, xf: Affine2, z: i32) -> DrawItem2D {
        DrawItem2D {
            mesh: Mesh2D::rect(origin, [1.0, 1.0]),
            fill,
            world_from_local: xf,
            z,
        }
    }

    #[test]
    fn batch_rebases_indices_and_transforms_positions() {
        let items = [
            item([0.0, 0.0], Rgba::RED, Affine2::IDENTITY, 0),
            item([0.0, 0.0], Rgba::WHITE, Affine2::translate(10.0, 20.0), 1),
        ];
        let batch = MeshBatch::from_items(&items);

        assert_eq!(batch.vertices.len(), 8);
        assert_eq!(&batch.indices[6..], &[4, 5, 6, 4, 6, 7]);
        assert_eq!(batch.vertices[4].position, [10.0, 20.0]);
        assert_eq!(batch.vertices[6].position, [11.0, 21.0]);
        assert_eq!(batch.vertices[0].color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(batch.vertices[7].color, [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn batch_skips_invisible_items() {
        let items = [
            item([0.0, 0.0], Rgba::WHITE.with_alpha(0.0), Affine2::IDENTITY, 0),
            DrawItem2D {
                mesh: Mesh2D::default(),
                fill: Rgba::WHITE,
                world_from_local: Affine2::IDENTITY,
                z: 1,
            },
        ];
        assert!(MeshBatch::from_items(&items).is_empty());
    }

    #[test]
    fn padding_rounds_to_alignment() {
        assert_eq!(round_up_to(6, 4), 8);
        assert_eq!(round_up_to(8, 4), 8);
        assert_eq!(round_up_to(0, 4), 0);
    }
}
