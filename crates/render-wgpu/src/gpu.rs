use crate::shaders::{FRAGMENT_ENTRY, VERTEX_ENTRY};
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use std::collections::BTreeMap;
use std::ops::Range;
use wgpu::util::DeviceExt;
use wireorbit_common::{FLOATS_PER_VERTEX, VertexLayout, geometry};
use wireorbit_render::{
    DrawCall, GpuBackend, MeshHandle, ProgramHandle, RenderError, ShaderCompiler, Topology,
};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct ObjectUniforms {
    model: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
}

impl ObjectUniforms {
    fn from_call(call: &DrawCall) -> Self {
        Self {
            model: call.model.to_cols_array_2d(),
            view: call.frame.view.to_cols_array_2d(),
            projection: call.frame.projection.to_cols_array_2d(),
        }
    }
}

impl Default for ObjectUniforms {
    fn default() -> Self {
        Self {
            model: Mat4::IDENTITY.to_cols_array_2d(),
            view: Mat4::IDENTITY.to_cols_array_2d(),
            projection: Mat4::IDENTITY.to_cols_array_2d(),
        }
    }
}

struct GpuMesh {
    label: String,
    vertex_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    vertex_count: u32,
}

struct QueuedDraw {
    program: ProgramHandle,
    mesh: MeshHandle,
    vertices: Range<u32>,
}

/// Convert a float-interleaved layout into wgpu vertex attributes.
fn vertex_attributes(layout: &VertexLayout) -> Option<Vec<wgpu::VertexAttribute>> {
    layout
        .attributes
        .iter()
        .map(|attr| {
            let format = match attr.components {
                1 => wgpu::VertexFormat::Float32,
                2 => wgpu::VertexFormat::Float32x2,
                3 => wgpu::VertexFormat::Float32x3,
                4 => wgpu::VertexFormat::Float32x4,
                _ => return None,
            };
            Some(wgpu::VertexAttribute {
                format,
                offset: attr.offset as u64 * std::mem::size_of::<f32>() as u64,
                shader_location: attr.location,
            })
        })
        .collect()
}

const PLACEHOLDER_VERTEX: [f32; FLOATS_PER_VERTEX] = [0.0; FLOATS_PER_VERTEX];

/// Data to put in a vertex buffer. wgpu rejects zero-sized buffers, so empty
/// geometry gets one zeroed vertex that is never drawn.
fn upload_contents(vertices: &[f32]) -> &[f32] {
    if vertices.is_empty() {
        &PLACEHOLDER_VERTEX
    } else {
        vertices
    }
}

fn primitive_topology(topology: Topology) -> wgpu::PrimitiveTopology {
    match topology {
        Topology::LineList => wgpu::PrimitiveTopology::LineList,
    }
}

/// wgpu implementation of the backend interface.
///
/// Owns the device and queue. Draws are queued by [`GpuBackend::draw`] and
/// encoded into a single pass by [`WgpuBackend::submit`]; the host presents
/// the surface texture afterwards.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_format: wgpu::TextureFormat,
    object_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    attributes: Vec<wgpu::VertexAttribute>,
    programs: Vec<wgpu::RenderPipeline>,
    meshes: BTreeMap<MeshHandle, GpuMesh>,
    next_mesh: u32,
    queued: Vec<QueuedDraw>,
    depth_texture: wgpu::TextureView,
    clear_color: wgpu::Color,
}

impl WgpuBackend {
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("object_uniform_layout"),
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

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("wireframe_pipeline_layout"),
            bind_group_layouts: &[&object_layout],
            push_constant_ranges: &[],
        });

        // POSITION_COLOR only has 3-component attributes, so conversion
        // always succeeds.
        let attributes = vertex_attributes(&VertexLayout::POSITION_COLOR).unwrap_or_default();
        let depth_texture = Self::create_depth_texture(&device, width, height);

        Self {
            device,
            queue,
            surface_format,
            object_layout,
            pipeline_layout,
            attributes,
            programs: Vec::new(),
            meshes: BTreeMap::new(),
            next_mesh: 0,
            queued: Vec::new(),
            depth_texture,
            clear_color: wgpu::Color::BLACK,
        }
    }

    /// Background color for the next submitted frames (RGBA).
    pub fn set_clear_color(&mut self, rgba: [f64; 4]) {
        self.clear_color = wgpu::Color {
            r: rgba[0],
            g: rgba[1],
            b: rgba[2],
            a: rgba[3],
        };
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(&self.device, width, height);
    }

    /// Encode every queued draw into one pass targeting `target`, clearing
    /// color and depth first, and submit it.
    pub fn submit(&mut self, target: &wgpu::TextureView) {
        let queued = std::mem::take(&mut self.queued);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("wireframe_encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("wireframe_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            for draw in &queued {
                let (Some(pipeline), Some(mesh)) = (
                    self.programs.get(draw.program.0 as usize),
                    self.meshes.get(&draw.mesh),
                ) else {
                    // Mesh released between draw and submit.
                    continue;
                };
                pass.set_pipeline(pipeline);
                pass.set_bind_group(0, &mesh.bind_group, &[]);
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.draw(draw.vertices.clone(), 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        tracing::trace!(draws = queued.len(), "frame submitted");
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

impl ShaderCompiler for WgpuBackend {
    fn compile(
        &mut self,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<ProgramHandle, RenderError> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let vertex_module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("wireframe_vs"),
                source: wgpu::ShaderSource::Wgsl(vertex_src.into()),
            });
        let fragment_module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("wireframe_fs"),
                source: wgpu::ShaderSource::Wgsl(fragment_src.into()),
            });

        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("wireframe_pipeline"),
                layout: Some(&self.pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &vertex_module,
                    entry_point: Some(VERTEX_ENTRY),
                    compilation_options: Default::default(),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: VertexLayout::POSITION_COLOR.stride_bytes(),
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &self.attributes,
                    }],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &fragment_module,
                    entry_point: Some(FRAGMENT_ENTRY),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.surface_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: primitive_topology(Topology::LineList),
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: Default::default(),
                    bias: Default::default(),
                }),
                multisample: Default::default(),
                multiview: None,
                cache: None,
            });

        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            tracing::error!("shader build failed: {err}");
            return Err(RenderError::ShaderBuild {
                log: err.to_string(),
            });
        }

        let program = ProgramHandle(self.programs.len() as u32);
        self.programs.push(pipeline);
        tracing::debug!(?program, "shader program built");
        Ok(program)
    }
}

impl GpuBackend for WgpuBackend {
    fn create_mesh(
        &mut self,
        label: &str,
        vertices: &[f32],
        layout: &VertexLayout,
    ) -> Result<MeshHandle, RenderError> {
        if *layout != VertexLayout::POSITION_COLOR {
            return Err(RenderError::UnsupportedLayout);
        }
        geometry::validate(vertices)?;

        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label}_vertices")),
                contents: bytemuck::cast_slice(upload_contents(vertices)),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let uniform_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label}_uniforms")),
                contents: bytemuck::bytes_of(&ObjectUniforms::default()),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label}_bind_group")),
            layout: &self.object_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let mesh = MeshHandle(self.next_mesh);
        self.next_mesh += 1;
        let vertex_count = geometry::vertex_count(vertices) as u32;
        self.meshes.insert(
            mesh,
            GpuMesh {
                label: label.to_owned(),
                vertex_buffer,
                uniform_buffer,
                bind_group,
                vertex_count,
            },
        );
        tracing::debug!(label, ?mesh, vertex_count, "mesh uploaded");
        Ok(mesh)
    }

    fn destroy_mesh(&mut self, mesh: MeshHandle) {
        if let Some(gpu_mesh) = self.meshes.remove(&mesh) {
            gpu_mesh.vertex_buffer.destroy();
            gpu_mesh.uniform_buffer.destroy();
            tracing::debug!(label = %gpu_mesh.label, ?mesh, "mesh destroyed");
        }
    }

    fn begin_frame(&mut self) {
        self.queued.clear();
    }

    fn draw(&mut self, call: &DrawCall) -> Result<(), RenderError> {
        if call.program.0 as usize >= self.programs.len() {
            return Err(RenderError::UnknownProgram(call.program));
        }
        let mesh = self
            .meshes
            .get(&call.mesh)
            .ok_or(RenderError::UnknownMesh(call.mesh))?;
        if call.vertices.start > call.vertices.end || call.vertices.end > mesh.vertex_count {
            return Err(RenderError::DrawOutOfRange {
                start: call.vertices.start,
                end: call.vertices.end,
                available: mesh.vertex_count,
            });
        }

        // Uniform writes land before the pass executes, so a second draw of
        // the same mesh in one frame would see the last write.
        if self.queued.iter().any(|d| d.mesh == call.mesh) {
            tracing::warn!(label = %mesh.label, "mesh drawn twice in one frame");
        }
        self.queue.write_buffer(
            &mesh.uniform_buffer,
            0,
            bytemuck::bytes_of(&ObjectUniforms::from_call(call)),
        );
        self.queued.push(QueuedDraw {
            program: call.program,
            mesh: call.mesh,
            vertices: call.vertices.clone(),
        });
        tracing::trace!(label = %mesh.label, vertices = ?call.vertices, "draw queued");
        Ok(())
    }
}
