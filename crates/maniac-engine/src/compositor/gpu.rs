use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::render::RenderTarget;

use super::{CompositorBackend, CompositorError, UploadRegion};

// ── blend ─────────────────────────────────────────────────────────────────

/// Premultiplied "over": the surface already carries `rgb * a`.
fn premul_alpha_blend() -> wgpu::BlendState {
    let component = wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
        operation: wgpu::BlendOperation::Add,
    };
    wgpu::BlendState {
        color: component,
        alpha: component,
    }
}

// ── GPU types ─────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct BlitUniform {
    uv_scale: [f32; 2],
    /// 1.0 when the target encodes sRGB on write.
    linearize: f32,
    _pad: f32, // 16-byte alignment
}

impl BlitUniform {
    fn new(uv_scale: [f32; 2], target: wgpu::TextureFormat) -> Self {
        Self {
            uv_scale,
            linearize: if target.is_srgb() { 1.0 } else { 0.0 },
            _pad: 0.0,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct QuadVertex {
    pos: [f32; 2], // 0..1
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { pos: [0.0, 0.0] },
    QuadVertex { pos: [1.0, 0.0] },
    QuadVertex { pos: [1.0, 1.0] },
    QuadVertex { pos: [0.0, 1.0] },
];

const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

/// tiny-skia premultiplies sRGB-encoded values, so the texture holds them
/// raw and the shader does the decode after un-premultiplying.
const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

// ── backend ───────────────────────────────────────────────────────────────

/// wgpu implementation of [`CompositorBackend`].
///
/// Pipeline, sampler and quad buffers are created on first draw; the bind
/// group is rebuilt whenever `allocate` replaces the texture.
pub struct GpuCompositorBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    label: &'static str,

    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
    bind_group_layout: Option<wgpu::BindGroupLayout>,

    texture: Option<wgpu::Texture>,
    texture_view: Option<wgpu::TextureView>,
    texture_generation: u64,

    bind_group: Option<wgpu::BindGroup>,
    bind_group_generation: u64,
    uniform: Option<wgpu::Buffer>,
    sampler: Option<wgpu::Sampler>,

    quad_vbo: Option<wgpu::Buffer>,
    quad_ibo: Option<wgpu::Buffer>,
}

impl GpuCompositorBackend {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, label: &'static str) -> Self {
        Self {
            device: device.clone(),
            queue: queue.clone(),
            label,
            pipeline_format: None,
            pipeline: None,
            bind_group_layout: None,
            texture: None,
            texture_view: None,
            texture_generation: 0,
            bind_group: None,
            bind_group_generation: u64::MAX,
            uniform: None,
            sampler: None,
            quad_vbo: None,
            quad_ibo: None,
        }
    }

    // ── lazy-init helpers ──────────────────────────────────────────────────

    fn ensure_pipeline(&mut self, format: wgpu::TextureFormat) {
        if self.pipeline_format == Some(format) && self.pipeline.is_some() {
            return;
        }

        let shader = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("maniac blit shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/blit.wgsl").into()),
        });

        let bgl = self.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("maniac blit bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<BlitUniform>() as u64,
                        ),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = self.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("maniac blit pipeline layout"),
            bind_group_layouts: &[&bgl],
            immediate_size: 0,
        });

        let pipeline = self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("maniac blit pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[QuadVertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(premul_alpha_blend()),
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

        self.pipeline_format = Some(format);
        self.pipeline = Some(pipeline);
        self.bind_group_layout = Some(bgl);
        self.bind_group = None;
        self.bind_group_generation = u64::MAX;
    }

    fn ensure_static_resources(&mut self) {
        if self.sampler.is_none() {
            // Nearest: the surface maps 1:1 onto the framebuffer.
            self.sampler = Some(self.device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("maniac blit sampler"),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: wgpu::FilterMode::Nearest,
                min_filter: wgpu::FilterMode::Nearest,
                mipmap_filter: wgpu::MipmapFilterMode::Nearest,
                ..Default::default()
            }));
        }
        if self.uniform.is_none() {
            self.uniform = Some(self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("maniac blit ubo"),
                size: std::mem::size_of::<BlitUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
        }
        if self.quad_vbo.is_none() || self.quad_ibo.is_none() {
            self.quad_vbo = Some(self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("maniac blit quad vbo"),
                contents: bytemuck::cast_slice(&QUAD_VERTICES),
                usage: wgpu::BufferUsages::VERTEX,
            }));
            self.quad_ibo = Some(self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("maniac blit quad ibo"),
                contents: bytemuck::cast_slice(&QUAD_INDICES),
                usage: wgpu::BufferUsages::INDEX,
            }));
        }
    }

    fn ensure_bindings(&mut self) {
        if self.bind_group_generation == self.texture_generation && self.bind_group.is_some() {
            return;
        }

        let Some(bgl) = self.bind_group_layout.as_ref() else { return; };
        let Some(view) = self.texture_view.as_ref() else { return; };
        let Some(sampler) = self.sampler.as_ref() else { return; };
        let Some(uniform) = self.uniform.as_ref() else { return; };

        self.bind_group = Some(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("maniac blit bind group"),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        }));
        self.bind_group_generation = self.texture_generation;
    }
}

impl CompositorBackend for GpuCompositorBackend {
    type Target<'a> = RenderTarget<'a>;

    fn allocate(&mut self, width: u32, height: u32) -> Result<(), CompositorError> {
        let max = self.device.limits().max_texture_dimension_2d;
        if width == 0 || height == 0 || width > max || height > max {
            return Err(CompositorError::allocation(
                width,
                height,
                format!("texture dimensions must be within 1..={max}"),
            ));
        }

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(self.label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.texture_view = Some(texture.create_view(&wgpu::TextureViewDescriptor::default()));
        self.texture = Some(texture);
        self.texture_generation += 1;

        log::debug!("{}: allocated {width}x{height} texture", self.label);
        Ok(())
    }

    fn upload(&mut self, region: UploadRegion<'_>) {
        let Some(texture) = self.texture.as_ref() else {
            log::warn!("{}: upload before allocation", self.label);
            return;
        };

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            region.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(region.stride),
                rows_per_image: Some(region.height),
            },
            wgpu::Extent3d {
                width: region.width,
                height: region.height,
                depth_or_array_layers: 1,
            },
        );
    }

    fn draw(&mut self, target: &mut RenderTarget<'_>, uv_scale: [f32; 2]) {
        self.ensure_pipeline(target.format);
        self.ensure_static_resources();
        self.ensure_bindings();

        if let Some(ubo) = self.uniform.as_ref() {
            self.queue.write_buffer(
                ubo,
                0,
                bytemuck::bytes_of(&BlitUniform::new(uv_scale, target.format)),
            );
        }

        let Some(pipeline) = self.pipeline.as_ref() else { return; };
        let Some(bind_group) = self.bind_group.as_ref() else { return; };
        let Some(quad_vbo) = self.quad_vbo.as_ref() else { return; };
        let Some(quad_ibo) = self.quad_ibo.as_ref() else { return; };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("maniac blit pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(0, quad_vbo.slice(..));
        rpass.set_index_buffer(quad_ibo.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..6, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_texture_is_not_decoded_by_the_sampler() {
        assert!(!TEXTURE_FORMAT.is_srgb());
    }

    #[test]
    fn shader_linearizes_only_for_srgb_targets() {
        let srgb = BlitUniform::new([0.5, 0.25], wgpu::TextureFormat::Bgra8UnormSrgb);
        assert_eq!(srgb.linearize, 1.0);
        assert_eq!(srgb.uv_scale, [0.5, 0.25]);

        let plain = BlitUniform::new([1.0, 1.0], wgpu::TextureFormat::Bgra8Unorm);
        assert_eq!(plain.linearize, 0.0);
        assert_eq!(std::mem::size_of::<BlitUniform>(), 16);
    }
}
