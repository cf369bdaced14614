// wgpu_backend.rs - on-screen RenderBackend
//
// One pipeline, one camera uniform, eight texture slots per draw. Draws are
// recorded by `draw_indexed` and executed in a single pass by `present`.

use crate::backend::{validate_levels, MipLevel, RenderBackend, TextureHandle};
use crate::error::RenderError;
use crate::vertex::SpriteVertex;
use glam::Mat4;
use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;
use tracing::{debug, info, warn};
use winit::window::Window;

/// Texture bindings in the sprite shader.
pub const TEXTURE_SLOTS: usize = 8;

const SAMPLER_BINDING: u32 = TEXTURE_SLOTS as u32;
const INITIAL_SPRITES: u64 = 1024;

struct GpuTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

struct PendingDraw {
    textures: Vec<TextureHandle>,
    indices: Range<u32>,
}

/// Vertex or index buffer that grows to the next power of two.
struct GrowableBuffer {
    label: &'static str,
    usage: wgpu::BufferUsages,
    buffer: wgpu::Buffer,
    capacity: u64,
}

impl GrowableBuffer {
    fn new(device: &wgpu::Device, label: &'static str, usage: wgpu::BufferUsages, capacity: u64) -> Self {
        let usage = usage | wgpu::BufferUsages::COPY_DST;
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: capacity,
            usage,
            mapped_at_creation: false,
        });
        Self {
            label,
            usage,
            buffer,
            capacity,
        }
    }

    fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, bytes: &[u8]) {
        let needed = bytes.len() as u64;
        if needed == 0 {
            return;
        }
        if needed > self.capacity {
            let capacity = needed.next_power_of_two();
            debug!(buffer = self.label, capacity, "growing GPU buffer");
            *self = Self::new(device, self.label, self.usage, capacity);
        }
        queue.write_buffer(&self.buffer, 0, bytes);
    }
}

pub struct WgpuBackend {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    fallback: GpuTexture,
    textures: HashMap<TextureHandle, GpuTexture>,
    next_texture: u32,
    bind_groups: HashMap<Vec<TextureHandle>, wgpu::BindGroup>,
    vertex_buffer: GrowableBuffer,
    index_buffer: GrowableBuffer,
    uploaded_indices: usize,
    draws: Vec<PendingDraw>,
}

impl WgpuBackend {
    pub async fn new(window: Arc<Window>) -> Result<Self, RenderError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::NoAdapter)?;
        info!(adapter = ?adapter.get_info().name, "GPU adapter selected");

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("sable device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or(RenderError::NoSurfaceFormat)?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: caps.alpha_modes.first().copied().unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("camera layout"),
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

        let mut texture_entries: Vec<wgpu::BindGroupLayoutEntry> = (0..TEXTURE_SLOTS as u32)
            .map(|binding| wgpu::BindGroupLayoutEntry {
                binding,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            })
            .collect();
        texture_entries.push(wgpu::BindGroupLayoutEntry {
            binding: SAMPLER_BINDING,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        });
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sprite texture layout"),
            entries: &texture_entries,
        });

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("camera uniform"),
            size: std::mem::size_of::<[f32; 16]>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("camera bind group"),
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("sprite sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sprite shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/sprite.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sprite pipeline layout"),
            bind_group_layouts: &[&camera_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sprite pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[SpriteVertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
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
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        let fallback = upload_texture(
            &device,
            &queue,
            "fallback white",
            &[MipLevel::new(1, 1, vec![255; 4])],
        );

        let vertex_buffer = GrowableBuffer::new(
            &device,
            "sprite vertices",
            wgpu::BufferUsages::VERTEX,
            INITIAL_SPRITES * 4 * std::mem::size_of::<SpriteVertex>() as u64,
        );
        let index_buffer = GrowableBuffer::new(
            &device,
            "sprite indices",
            wgpu::BufferUsages::INDEX,
            INITIAL_SPRITES * 6 * std::mem::size_of::<u32>() as u64,
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            camera_buffer,
            camera_bind_group,
            texture_layout,
            sampler,
            fallback,
            textures: HashMap::new(),
            next_texture: 1,
            bind_groups: HashMap::new(),
            vertex_buffer,
            index_buffer,
            uploaded_indices: 0,
            draws: Vec::new(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
    }

    pub fn surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.config.width as f32 / self.config.height as f32
    }

    /// Clear to `clear_color`, run every recorded draw and present.
    ///
    /// A lost or outdated surface is reconfigured and the frame dropped.
    pub fn present(&mut self, clear_color: [f32; 4]) -> Result<(), RenderError> {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                self.draws.clear();
                return Ok(());
            }
            Err(e) => {
                self.draws.clear();
                return Err(e.into());
            }
        };
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("sprite encoder"),
        });

        {
            let [r, g, b, a] = clear_color.map(f64::from);
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("sprite pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if !self.draws.is_empty() {
                pass.set_pipeline(&self.pipeline);
                pass.set_bind_group(0, &self.camera_bind_group, &[]);
                pass.set_vertex_buffer(0, self.vertex_buffer.buffer.slice(..));
                pass.set_index_buffer(self.index_buffer.buffer.slice(..), wgpu::IndexFormat::Uint32);

                for draw in &self.draws {
                    if let Some(bind_group) = self.bind_groups.get(&draw.textures) {
                        pass.set_bind_group(1, bind_group, &[]);
                        pass.draw_indexed(draw.indices.clone(), 0, 0..1);
                    }
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        self.draws.clear();
        Ok(())
    }

    fn ensure_bind_group(&mut self, textures: &[TextureHandle]) -> Result<(), RenderError> {
        if self.bind_groups.contains_key(textures) {
            return Ok(());
        }

        let mut views = Vec::with_capacity(TEXTURE_SLOTS);
        for handle in textures {
            let texture = self
                .textures
                .get(handle)
                .ok_or(RenderError::UnknownTexture(*handle))?;
            views.push(&texture.view);
        }
        views.resize(TEXTURE_SLOTS, &self.fallback.view);

        let mut entries: Vec<wgpu::BindGroupEntry> = views
            .into_iter()
            .enumerate()
            .map(|(binding, view)| wgpu::BindGroupEntry {
                binding: binding as u32,
                resource: wgpu::BindingResource::TextureView(view),
            })
            .collect();
        entries.push(wgpu::BindGroupEntry {
            binding: SAMPLER_BINDING,
            resource: wgpu::BindingResource::Sampler(&self.sampler),
        });

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sprite textures"),
            layout: &self.texture_layout,
            entries: &entries,
        });
        self.bind_groups.insert(textures.to_vec(), bind_group);
        Ok(())
    }
}

impl RenderBackend for WgpuBackend {
    fn create_texture(&mut self, label: &str, levels: &[MipLevel]) -> Result<TextureHandle, RenderError> {
        validate_levels(label, levels)?;
        let texture = upload_texture(&self.device, &self.queue, label, levels);
        let handle = TextureHandle::from_raw(self.next_texture);
        self.next_texture += 1;
        debug!(%handle, label, width = texture.width, height = texture.height, "texture uploaded");
        self.textures.insert(handle, texture);
        Ok(handle)
    }

    fn destroy_texture(&mut self, texture: TextureHandle) -> Result<(), RenderError> {
        let gpu = self
            .textures
            .remove(&texture)
            .ok_or(RenderError::UnknownTexture(texture))?;
        gpu.texture.destroy();
        self.bind_groups.retain(|key, _| !key.contains(&texture));
        Ok(())
    }

    fn texture_size(&self, texture: TextureHandle) -> Option<(u32, u32)> {
        self.textures.get(&texture).map(|t| (t.width, t.height))
    }

    fn max_textures_per_draw(&self) -> usize {
        TEXTURE_SLOTS
    }

    fn upload_geometry(
        &mut self,
        view_projection: Mat4,
        vertices: &[SpriteVertex],
        indices: &[u32],
    ) -> Result<(), RenderError> {
        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&view_projection.to_cols_array()),
        );
        self.vertex_buffer
            .write(&self.device, &self.queue, bytemuck::cast_slice(vertices));
        self.index_buffer
            .write(&self.device, &self.queue, bytemuck::cast_slice(indices));
        self.uploaded_indices = indices.len();
        self.draws.clear();
        Ok(())
    }

    fn draw_indexed(&mut self, textures: &[TextureHandle], indices: Range<u32>) -> Result<(), RenderError> {
        if textures.len() > TEXTURE_SLOTS {
            return Err(RenderError::TooManyTextures {
                count: textures.len(),
                max: TEXTURE_SLOTS,
            });
        }
        if indices.start > indices.end || indices.end as usize > self.uploaded_indices {
            return Err(RenderError::IndexRange {
                start: indices.start,
                end: indices.end,
                uploaded: self.uploaded_indices,
            });
        }
        self.ensure_bind_group(textures)?;
        self.draws.push(PendingDraw {
            textures: textures.to_vec(),
            indices,
        });
        Ok(())
    }
}

fn upload_texture(device: &wgpu::Device, queue: &wgpu::Queue, label: &str, levels: &[MipLevel]) -> GpuTexture {
    let (width, height) = (levels[0].width, levels[0].height);
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: levels.len() as u32,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    for (mip_level, level) in levels.iter().enumerate() {
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: mip_level as u32,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &level.pixels,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * level.width),
                rows_per_image: Some(level.height),
            },
            wgpu::Extent3d {
                width: level.width,
                height: level.height,
                depth_or_array_layers: 1,
            },
        );
    }

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    GpuTexture {
        texture,
        view,
        width,
        height,
    }
}
