use std::sync::Arc;

use anyhow::{Result, anyhow};
use image::RgbaImage;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::config::RenderConfig;
use crate::render::batcher::Vertex;
use crate::render::color::{color_to_wgpu, ortho_projection};
use crate::render::shader;
use crate::render::texture::TextureManager;
use crate::traits::render::{RenderBackend, TextureId};

/// GPU-backed mesh renderer using wgpu.
///
/// Vertex and index buffers are allocated once at the batcher's capacity and
/// rewritten on every draw.
pub struct WgpuRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,

    pipeline: wgpu::RenderPipeline,
    texture_bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,

    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    max_vertices: usize,
    max_indices: usize,
    // Copy buffer writes must be 4-byte aligned; odd index counts get one pad.
    index_scratch: Vec<u16>,

    texture_manager: TextureManager,

    current_frame: Option<wgpu::SurfaceTexture>,
    current_view: Option<wgpu::TextureView>,
    clear_color: [f32; 4],

    screen_width: u32,
    screen_height: u32,
}

impl WgpuRenderer {
    /// Create a new WgpuRenderer for the given window.
    pub async fn new(window: Arc<Window>, config: &RenderConfig) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| anyhow!("failed to create surface: {e}"))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow!("failed to find a suitable GPU adapter"))?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("armature_device"),
                    ..Default::default()
                },
                None,
            )
            .await
            .map_err(|e| anyhow!("failed to create device: {e}"))?;

        let size = window.inner_size();
        let width = size.width.max(1);
        let height = size.height.max(1);
        let surface_caps = surface.get_capabilities(&adapter);
        // Blending happens in gamma space, like a WebGL canvas.
        let format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow!("surface reports no supported formats"))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: if config.vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            desired_maximum_frame_latency: 2,
            alpha_mode,
            view_formats: vec![],
        };
        surface.configure(&device, &surface_config);
        tracing::info!("surface configured: {width}x{height} {format:?}");

        let uniform_bind_group_layout = shader::create_uniform_bind_group_layout(&device);
        let texture_bind_group_layout = shader::create_texture_bind_group_layout(&device);
        let pipeline = shader::create_mesh_pipeline(
            &device,
            format,
            &uniform_bind_group_layout,
            &texture_bind_group_layout,
        );

        let projection = ortho_projection(width as f32, height as f32);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::cast_slice(&projection),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("vertex_buffer"),
            size: (config.max_vertices * std::mem::size_of::<Vertex>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let padded_indices = config.max_indices.next_multiple_of(2);
        let index_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("index_buffer"),
            size: (padded_indices * std::mem::size_of::<u16>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(Self {
            device,
            queue,
            surface,
            surface_config,
            pipeline,
            texture_bind_group_layout,
            uniform_buffer,
            uniform_bind_group,
            vertex_buffer,
            index_buffer,
            max_vertices: config.max_vertices,
            max_indices: config.max_indices,
            index_scratch: Vec::with_capacity(padded_indices),
            texture_manager: TextureManager::new(),
            current_frame: None,
            current_view: None,
            clear_color: config.clear_color,
            screen_width: width,
            screen_height: height,
        })
    }

    /// Resize the renderer surface.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.screen_width = width;
        self.screen_height = height;
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);

        let projection = ortho_projection(width as f32, height as f32);
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&projection));
        tracing::debug!("surface resized to {width}x{height}");
    }

    pub fn set_clear_color(&mut self, color: [f32; 4]) {
        self.clear_color = color;
    }

    fn clear(&mut self, view: &wgpu::TextureView) {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("clear_encoder"),
            });
        {
            let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("clear_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(color_to_wgpu(self.clear_color)),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });
        }
        self.queue.submit(std::iter::once(encoder.finish()));
    }
}

impl RenderBackend for WgpuRenderer {
    fn begin_frame(&mut self) -> Result<()> {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::debug!("surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.surface_config);
                self.surface
                    .get_current_texture()
                    .map_err(|e| anyhow!("failed to get surface texture: {e}"))?
            }
            Err(e) => return Err(anyhow!("failed to get surface texture: {e}")),
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.clear(&view);
        self.current_view = Some(view);
        self.current_frame = Some(frame);
        Ok(())
    }

    fn end_frame(&mut self) -> Result<()> {
        self.current_view = None;
        if let Some(frame) = self.current_frame.take() {
            frame.present();
        }
        Ok(())
    }

    fn create_texture(&mut self, image: &RgbaImage) -> Result<TextureId> {
        if image.width() == 0 || image.height() == 0 {
            return Err(anyhow!(
                "cannot create a {}x{} texture",
                image.width(),
                image.height()
            ));
        }
        Ok(self.texture_manager.create(
            &self.device,
            &self.queue,
            &self.texture_bind_group_layout,
            image,
        ))
    }

    fn texture_size(&self, id: TextureId) -> Option<(u32, u32)> {
        self.texture_manager.size(id)
    }

    fn remove_texture(&mut self, id: TextureId) -> bool {
        self.texture_manager.remove(id)
    }

    fn draw_triangles(
        &mut self,
        texture: TextureId,
        vertices: &[Vertex],
        indices: &[u16],
    ) -> Result<()> {
        if vertices.len() > self.max_vertices || indices.len() > self.max_indices {
            return Err(anyhow!(
                "draw of {} vertices / {} indices exceeds buffer capacity",
                vertices.len(),
                indices.len()
            ));
        }
        let entry = self
            .texture_manager
            .get(texture)
            .ok_or_else(|| anyhow!("unknown texture: {:?}", texture))?;
        let view = self
            .current_view
            .as_ref()
            .ok_or_else(|| anyhow!("draw outside begin_frame/end_frame"))?;
        if vertices.is_empty() || indices.is_empty() {
            return Ok(());
        }

        self.index_scratch.clear();
        self.index_scratch.extend_from_slice(indices);
        if self.index_scratch.len() % 2 == 1 {
            self.index_scratch.push(0);
        }
        self.queue
            .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(vertices));
        self.queue.write_buffer(
            &self.index_buffer,
            0,
            bytemuck::cast_slice(&self.index_scratch),
        );

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("mesh_encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("mesh_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            render_pass.set_bind_group(1, &entry.bind_group, &[]);
            let vertex_bytes = (vertices.len() * std::mem::size_of::<Vertex>()) as u64;
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..vertex_bytes));
            render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            render_pass.draw_indexed(0..indices.len() as u32, 0, 0..1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    fn screen_size(&self) -> (u32, u32) {
        (self.screen_width, self.screen_height)
    }
}
