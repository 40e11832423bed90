//! WGPU-based renderer for the maze walk.
//!
//! This module provides [`WgpuRenderer`], which owns the surface, the device and every GPU
//! resource: the scene pipeline, one texture per material, the vertex buffers built from the
//! session and the text layer.
//!
//! # Frame layout
//! 1. The maze pass clears to the sky colour and draws every material, dimmed while the
//!    preview card is open.
//! 2. The preview pass (card open only) clears depth and draws the spinning model.
//! 3. The text pass draws the crosshair, the card text and the escape banner.
//!
//! # Usage
//! Create a [`WgpuRenderer`] via [`WgpuRenderer::new`] and call [`WgpuRenderer::render`]
//! each frame with a [`FrameView`] of the current state.

use crate::assets::PosterSurface;
use crate::game::Session;
use crate::math::mat::Mat4;
use crate::math::vec::Vec3;
use crate::renderer::pipeline_builder::{
    BindGroupLayoutBuilder, PipelineBuilder, create_depth_view, depth_state,
};
use crate::renderer::primitives::{Mesh, Vertex};
use crate::renderer::scene::{build_scene, preview_mesh};
use crate::renderer::text::{TextError, TextPosition, TextRenderer, TextStyle};
use crate::renderer::uniform::Uniforms;
use crate::ui::overlay::Overlay;
use glyphon::{Color, Weight};
use thiserror::Error;
use wgpu::util::DeviceExt;
use winit::window::Window;

const FIELD_OF_VIEW_DEGREES: f32 = 75.0;
const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 1000.0;
/// `0xaaaaaa` converted to linear space.
const SKY: wgpu::Color = wgpu::Color {
    r: 0.402,
    g: 0.402,
    b: 0.402,
    a: 1.0,
};
const SUN: [f32; 3] = [30.0, 50.0, 30.0];
const DIMMED: f32 = 0.35;
const PREVIEW_EYE: [f32; 3] = [0.0, 0.0, 3.0];

const CROSSHAIR: &str = "crosshair";
const CARD_TITLE: &str = "card_title";
const CARD_BODY: &str = "card_body";
const BANNER: &str = "banner";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no graphics adapter is compatible with the window surface")]
    NoAdapter,
    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("the surface reports no texture formats")]
    NoSurfaceFormat,
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
    #[error(transparent)]
    Text(#[from] TextError),
}

/// Everything one frame draws.
pub struct FrameView<'a> {
    pub session: &'a Session,
    pub overlay: &'a Overlay,
    pub escaped: bool,
}

struct SceneBuffer {
    material: usize,
    buffer: wgpu::Buffer,
    vertex_count: u32,
}

/// Main WGPU renderer.
pub struct WgpuRenderer {
    /// The WGPU surface for presenting rendered frames.
    pub surface: wgpu::Surface<'static>,
    /// The surface configuration (format, size, etc.).
    pub surface_config: wgpu::SurfaceConfiguration,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pipeline: wgpu::RenderPipeline,
    scene_uniforms: wgpu::Buffer,
    scene_uniform_bind_group: wgpu::BindGroup,
    preview_uniforms: wgpu::Buffer,
    preview_uniform_bind_group: wgpu::BindGroup,
    /// Slot 0 is the untextured white material, then one per sculpture batch.
    materials: Vec<wgpu::BindGroup>,
    scene: Vec<SceneBuffer>,
    scene_revision: Option<u64>,
    depth_view: wgpu::TextureView,
    text: TextRenderer,
}

impl WgpuRenderer {
    /// Initializes the device, the pipeline and one material per poster.
    pub async fn new(
        instance: &wgpu::Instance,
        surface: wgpu::Surface<'static>,
        window: &Window,
        posters: &[PosterSurface],
    ) -> Result<Self, RenderError> {
        let size = window.inner_size();
        let adapter = Self::create_adapter(instance, &surface).await?;
        let (device, queue) = Self::create_device(&adapter).await?;
        let surface_config =
            Self::create_surface_config(&surface, &adapter, size.width, size.height)?;
        surface.configure(&device, &surface_config);
        tracing::info!(
            "surface configured: {}x{} {:?}",
            surface_config.width,
            surface_config.height,
            surface_config.format
        );

        let uniform_layout = Uniforms::create_bind_group_layout(&device);
        let material_layout = BindGroupLayoutBuilder::new(&device)
            .with_label("Material Bind Group Layout")
            .with_texture(0, wgpu::ShaderStages::FRAGMENT)
            .with_sampler(1, wgpu::ShaderStages::FRAGMENT)
            .build();
        let pipeline = PipelineBuilder::new(
            &device,
            surface_config.format,
            include_str!("shaders/scene.wgsl"),
        )
        .with_label("Scene Pipeline")
        .with_vertex_buffer(Vertex::desc())
        .with_bind_group_layout(&uniform_layout)
        .with_bind_group_layout(&material_layout)
        .with_depth_stencil(depth_state())
        .build();

        let scene_uniforms = Uniforms::new().create_buffer(&device);
        let scene_uniform_bind_group =
            Uniforms::create_bind_group(&scene_uniforms, &uniform_layout, &device);
        let preview_uniforms = Uniforms::new().create_buffer(&device);
        let preview_uniform_bind_group =
            Uniforms::create_bind_group(&preview_uniforms, &uniform_layout, &device);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        let white = PosterSurface::Placeholder([0xff, 0xff, 0xff]);
        let materials = std::iter::once(&white)
            .chain(posters)
            .enumerate()
            .map(|(slot, poster)| {
                create_material(&device, &queue, &material_layout, &sampler, poster, slot)
            })
            .collect();

        let depth_view = create_depth_view(&device, surface_config.width, surface_config.height);
        let mut text = TextRenderer::new(&device, &queue, surface_config.format, window);
        text.resize(&queue, surface_config.width, surface_config.height);

        let mut renderer = Self {
            surface,
            surface_config,
            device,
            queue,
            pipeline,
            scene_uniforms,
            scene_uniform_bind_group,
            preview_uniforms,
            preview_uniform_bind_group,
            materials,
            scene: Vec::new(),
            scene_revision: None,
            depth_view,
            text,
        };
        renderer.create_text();
        Ok(renderer)
    }

    /// Reconfigures the surface, the depth buffer and the text layout.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
        self.depth_view = create_depth_view(&self.device, width, height);
        self.text.resize(&self.queue, width, height);
        if let Err(e) = self.layout_text() {
            tracing::warn!("failed to lay out text: {e}");
        }
    }

    /// Draws and presents one frame.
    pub fn render(&mut self, frame: &FrameView) -> Result<(), RenderError> {
        let surface_texture = self.surface.get_current_texture()?;
        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.sync_scene(frame.session);
        self.write_uniforms(frame);
        self.update_text(frame)?;
        self.text.prepare(&self.device, &self.queue)?;

        let preview = frame
            .overlay
            .descriptor()
            .map(|descriptor| preview_mesh(descriptor, frame.overlay.spin()))
            .map(|mesh| self.upload(&mesh, "Preview Vertex Buffer"));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut render_pass = self.begin_pass(
                &mut encoder,
                &surface_view,
                "Maze Render Pass",
                wgpu::LoadOp::Clear(SKY),
            );
            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.scene_uniform_bind_group, &[]);
            for part in &self.scene {
                render_pass.set_bind_group(1, &self.materials[part.material], &[]);
                render_pass.set_vertex_buffer(0, part.buffer.slice(..));
                render_pass.draw(0..part.vertex_count, 0..1);
            }
        }

        if let Some((buffer, vertex_count)) = &preview {
            let mut render_pass = self.begin_pass(
                &mut encoder,
                &surface_view,
                "Preview Render Pass",
                wgpu::LoadOp::Load,
            );
            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.preview_uniform_bind_group, &[]);
            render_pass.set_bind_group(1, &self.materials[0], &[]);
            render_pass.set_vertex_buffer(0, buffer.slice(..));
            render_pass.draw(0..*vertex_count, 0..1);
        }

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Text Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            self.text.render(&mut render_pass)?;
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        self.text.trim();
        Ok(())
    }

    // Private helper methods

    async fn create_adapter(
        instance: &wgpu::Instance,
        surface: &wgpu::Surface<'static>,
    ) -> Result<wgpu::Adapter, RenderError> {
        instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                force_fallback_adapter: false,
                compatible_surface: Some(surface),
            })
            .await
            .ok_or(RenderError::NoAdapter)
    }

    async fn create_device(
        adapter: &wgpu::Adapter,
    ) -> Result<(wgpu::Device, wgpu::Queue), RenderError> {
        let pair = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    required_features: wgpu::Features::empty(),
                    required_limits: Default::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;
        Ok(pair)
    }

    fn create_surface_config(
        surface: &wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> Result<wgpu::SurfaceConfiguration, RenderError> {
        let capabilities = surface.get_capabilities(adapter);
        let format = capabilities
            .formats
            .iter()
            .find(|&&f| f == wgpu::TextureFormat::Bgra8UnormSrgb)
            .or_else(|| capabilities.formats.first())
            .copied()
            .ok_or(RenderError::NoSurfaceFormat)?;

        Ok(wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            desired_maximum_frame_latency: 2,
            alpha_mode: capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
        })
    }

    fn aspect(&self) -> f32 {
        self.surface_config.width as f32 / self.surface_config.height.max(1) as f32
    }

    fn projection(&self) -> Mat4 {
        Mat4::perspective(
            FIELD_OF_VIEW_DEGREES.to_radians(),
            self.aspect(),
            Z_NEAR,
            Z_FAR,
        )
    }

    /// Rebuilds the vertex buffers when the session changed since the last upload.
    fn sync_scene(&mut self, session: &Session) {
        if self.scene_revision == Some(session.revision()) {
            return;
        }
        let meshes = build_scene(session, self.materials.len());
        self.scene = meshes
            .iter()
            .enumerate()
            .filter(|(_, mesh)| !mesh.is_empty())
            .map(|(material, mesh)| {
                let (buffer, vertex_count) = self.upload(mesh, "Scene Vertex Buffer");
                SceneBuffer {
                    material,
                    buffer,
                    vertex_count,
                }
            })
            .collect();
        self.scene_revision = Some(session.revision());
        tracing::debug!(
            "scene rebuilt at revision {} ({} buffers)",
            session.revision(),
            self.scene.len()
        );
    }

    fn upload(&self, mesh: &Mesh, label: &str) -> (wgpu::Buffer, u32) {
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(&mesh.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        (buffer, mesh.len() as u32)
    }

    fn write_uniforms(&self, frame: &FrameView) {
        let player = frame.session.player();
        let view = Mat4::look_at(player.eye(), player.look_target(), Vec3::UP);
        let brightness = if frame.overlay.is_open() { DIMMED } else { 1.0 };
        let scene = Uniforms::new()
            .with_camera(self.projection().multiply(&view))
            .with_light(Vec3::from(SUN))
            .with_brightness(brightness)
            .with_pulse(frame.session.exit_glow());
        self.queue
            .write_buffer(&self.scene_uniforms, 0, scene.as_bytes());

        if frame.overlay.is_open() {
            let view = Mat4::look_at(Vec3::from(PREVIEW_EYE), Vec3::ZERO, Vec3::UP);
            let preview = Uniforms::new()
                .with_camera(self.projection().multiply(&view))
                .with_light(Vec3::from(PREVIEW_EYE) + Vec3::UP);
            self.queue
                .write_buffer(&self.preview_uniforms, 0, preview.as_bytes());
        }
    }

    fn begin_pass<'e>(
        &self,
        encoder: &'e mut wgpu::CommandEncoder,
        surface_view: &wgpu::TextureView,
        label: &str,
        load: wgpu::LoadOp<wgpu::Color>,
    ) -> wgpu::RenderPass<'e> {
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: surface_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        })
    }

    fn create_text(&mut self) {
        self.text.create_text_buffer(
            CROSSHAIR,
            "+",
            Some(TextStyle {
                font_size: 24.0,
                line_height: 24.0,
                ..TextStyle::default()
            }),
            None,
        );
        self.text.create_text_buffer(
            CARD_TITLE,
            "",
            Some(TextStyle {
                font_size: 40.0,
                line_height: 48.0,
                weight: Weight::BOLD,
                ..TextStyle::default()
            }),
            None,
        );
        self.text.create_text_buffer(
            CARD_BODY,
            "",
            Some(TextStyle {
                font_size: 18.0,
                line_height: 26.0,
                color: Color::rgb(220, 220, 220),
                ..TextStyle::default()
            }),
            None,
        );
        self.text.create_text_buffer(
            BANNER,
            "You escaped!",
            Some(TextStyle {
                font_size: 64.0,
                line_height: 72.0,
                color: Color::rgb(100, 255, 100),
                weight: Weight::BOLD,
                ..TextStyle::default()
            }),
            None,
        );
        if let Err(e) = self.layout_text() {
            tracing::warn!("failed to lay out text: {e}");
        }
    }

    fn layout_text(&mut self) -> Result<(), TextError> {
        let (w, h) = (
            self.surface_config.width as f32,
            self.surface_config.height as f32,
        );
        self.text
            .update_position(CROSSHAIR, TextPosition::centered(w, h, 24.0, 24.0))?;
        let column = (w * 0.45).max(200.0);
        self.text.update_position(
            CARD_TITLE,
            TextPosition {
                x: w * 0.06,
                y: h * 0.22,
                max_width: Some(column),
                max_height: Some(110.0),
            },
        )?;
        self.text.update_position(
            CARD_BODY,
            TextPosition {
                x: w * 0.06,
                y: h * 0.22 + 120.0,
                max_width: Some(column),
                max_height: Some(h * 0.5),
            },
        )?;
        self.text
            .update_position(BANNER, TextPosition::centered(w, h, 480.0, 80.0))?;
        Ok(())
    }

    fn update_text(&mut self, frame: &FrameView) -> Result<(), TextError> {
        let open = frame.overlay.is_open();
        self.text
            .set_visible(CROSSHAIR, !open && !frame.escaped)?;
        self.text.set_visible(CARD_TITLE, open)?;
        self.text.set_visible(CARD_BODY, open)?;
        self.text.set_visible(BANNER, frame.escaped && !open)?;
        if let Some(title) = frame.overlay.title() {
            self.text.update_text(CARD_TITLE, &title)?;
            self.text
                .update_text(CARD_BODY, &frame.overlay.body().join("\n\n"))?;
        }
        Ok(())
    }
}

fn create_material(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    poster: &PosterSurface,
    slot: usize,
) -> wgpu::BindGroup {
    let (width, height, rgba) = poster.to_rgba();
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Material Texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            aspect: wgpu::TextureAspect::All,
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
        },
        &rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        size,
    );
    tracing::debug!("material {slot}: {width}x{height}");

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
        label: Some("Material Bind Group"),
    })
}
