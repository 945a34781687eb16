//! GPU-resident mesh geometry.
//!
//! [`Vertex3d`] is the vertex format shared by the loader and the render
//! pipeline: position and normal, interleaved at a 24-byte stride. [`Mesh`]
//! owns the vertex and index buffers and is immutable after upload; the
//! viewer creates exactly one at startup and draws it every frame.

use crate::gpu::GpuContext;

/// A vertex with position and surface normal.
///
/// # Memory Layout
///
/// Each vertex occupies 24 bytes:
/// - `position`: 12 bytes (3 × f32) at offset 0, shader location 0
/// - `normal`: 12 bytes (3 × f32) at offset 12, shader location 1
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3d {
    /// The 3D position of this vertex in world space.
    pub position: [f32; 3],
    /// The surface normal vector (should be normalized for correct lighting).
    pub normal: [f32; 3],
}

impl Vertex3d {
    /// The wgpu vertex buffer layout descriptor for this vertex type.
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex3d>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            // normal
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            },
        ],
    };

    /// Creates a new vertex with the given position and normal.
    pub fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }
}

/// GPU-resident triangle geometry with vertex and index buffers.
///
/// Once created the data lives on the GPU and the CPU-side copies can be
/// dropped. Meshes are immutable after creation.
#[derive(Debug)]
pub struct Mesh {
    /// The GPU buffer containing vertex data.
    pub(crate) vertex_buffer: wgpu::Buffer,
    /// The GPU buffer containing index data (u32 indices).
    pub(crate) index_buffer: wgpu::Buffer,
    /// The number of indices in the mesh (determines draw call size).
    pub(crate) index_count: u32,
}

impl Mesh {
    /// Uploads vertex and index data to GPU buffers.
    ///
    /// Indices are triangle lists, 3 indices per triangle. The mesh is
    /// ready to render immediately after creation.
    pub fn new(gpu: &GpuContext, vertices: &[Vertex3d], indices: &[u32]) -> Self {
        use wgpu::util::DeviceExt;

        let vertex_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Vertex Buffer"),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let index_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Index Buffer"),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }

    /// Number of triangles in the mesh.
    pub fn triangle_count(&self) -> u32 {
        self.index_count / 3
    }
}
