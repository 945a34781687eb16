//! 3D mesh rendering pass with depth testing.
//!
//! [`MeshPass`] owns the render pipeline, the per-frame uniform buffer, and
//! the depth buffer. Each frame it uploads the combined
//! model-view-projection matrix and the normal matrix, then issues a single
//! indexed draw for the loaded mesh. The mesh carries no model transform of
//! its own; its coordinates are already world space.
//!
//! # Depth Buffer
//!
//! The pass maintains its own depth texture sized to the surface. Call
//! [`MeshPass::ensure_depth_size`] before rendering in case the window was
//! resized.

use glam::Mat4;

use crate::camera::{self, Camera};
use crate::gpu::GpuContext;
use crate::mesh::{Mesh, Vertex3d};
use crate::shader::{ShaderError, ShaderStage, validation_scope};

/// Per-frame uniforms for the mesh shader.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniforms {
    /// Combined projection * view matrix. There is no separate model
    /// transform.
    pub mvp: [[f32; 4]; 4],
    /// Normal matrix: inverse transpose of the view's upper 3x3 block,
    /// padded to 4x4 for uniform layout.
    pub normal: [[f32; 4]; 4],
}

/// Renders the loaded mesh with depth testing.
///
/// Pipeline configuration: back-face culling with counter-clockwise front
/// faces, depth write with Less comparison, 32-bit float depth buffer.
pub struct MeshPass {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    /// View into the depth texture for render pass attachment.
    pub(crate) depth_view: wgpu::TextureView,
    depth_size: (u32, u32),
}

impl MeshPass {
    /// Creates the mesh pipeline from compiled vertex and fragment stages.
    ///
    /// Pipeline creation runs inside a validation error scope: a stage whose
    /// inputs do not line up with the vertex layout or whose entry points
    /// are missing is reported as [`ShaderError::Linkage`] rather than left
    /// as an uncaptured device error.
    pub fn new(
        gpu: &GpuContext,
        vertex: &ShaderStage,
        fragment: &ShaderStage,
    ) -> Result<Self, ShaderError> {
        let device = &gpu.device;

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniforms"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Frame Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = validation_scope(gpu, || {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Mesh Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &vertex.module,
                    entry_point: Some("vs"),
                    buffers: &[Vertex3d::LAYOUT],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &fragment.module,
                    entry_point: Some("fs"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: gpu.config.format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: Some(wgpu::Face::Back),
                    front_face: wgpu::FrontFace::Ccw,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: wgpu::TextureFormat::Depth32Float,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        })
        .map_err(|message| {
            ShaderError::Linkage(format!(
                "pipeline for '{}' + '{}': {}",
                vertex.path.display(),
                fragment.path.display(),
                message
            ))
        })?;

        let depth_view = Self::create_depth_view(gpu);

        Ok(Self {
            pipeline,
            uniform_buffer,
            bind_group,
            depth_view,
            depth_size: (gpu.width(), gpu.height()),
        })
    }

    fn create_depth_view(gpu: &GpuContext) -> wgpu::TextureView {
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: gpu.width(),
                height: gpu.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Ensures the depth buffer matches the current surface size.
    ///
    /// Call at the start of each frame; recreates the depth texture when
    /// the window was resized since the last frame.
    pub fn ensure_depth_size(&mut self, gpu: &GpuContext) {
        if self.depth_size != (gpu.width(), gpu.height()) {
            self.depth_view = Self::create_depth_view(gpu);
            self.depth_size = (gpu.width(), gpu.height());
        }
    }

    /// Draws the mesh with the current camera and projection.
    ///
    /// Uploads `projection * view` and the view-derived normal matrix, then
    /// issues one indexed draw. The render pass must have this pass's depth
    /// view attached.
    pub fn render(
        &self,
        gpu: &GpuContext,
        render_pass: &mut wgpu::RenderPass,
        camera: &Camera,
        projection: Mat4,
        mesh: &Mesh,
    ) {
        let view = camera.view_matrix();
        let mvp = projection * view;
        let normal = camera::normal_matrix(view);

        let uniforms = FrameUniforms {
            mvp: mvp.to_cols_array_2d(),
            normal: normal.to_cols_array_2d(),
        };

        gpu.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
    }
}
