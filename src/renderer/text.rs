//! Screen-space text for the crosshair, the preview card and the escape banner.
//!
//! Text lives in named buffers so the renderer can update one line without
//! reshaping the others.

use glyphon::{
    Attrs, Buffer, Cache, Color, Family, FontSystem, Metrics, Resolution, Shaping, Style,
    SwashCache, TextArea, TextAtlas, TextBounds, TextRenderer as GlyphonTextRenderer, Viewport,
    Weight,
};
use std::collections::HashMap;
use thiserror::Error;
use wgpu::{Device, Queue, RenderPass};
use winit::window::Window;

#[derive(Debug, Error)]
pub enum TextError {
    #[error("text buffer '{0}' not found")]
    UnknownBuffer(String),
    #[error("failed to prepare text: {0}")]
    Prepare(#[from] glyphon::PrepareError),
    #[error("failed to render text: {0}")]
    Render(#[from] glyphon::RenderError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_size: f32,
    pub line_height: f32,
    pub color: Color,
    pub weight: Weight,
    pub style: Style,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 16.0,
            line_height: 20.0,
            color: Color::rgb(255, 255, 255),
            weight: Weight::NORMAL,
            style: Style::Normal,
        }
    }
}

impl TextStyle {
    fn attrs(&self) -> Attrs<'static> {
        Attrs::new()
            .family(Family::SansSerif)
            .weight(self.weight)
            .style(self.style)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextPosition {
    pub x: f32,
    pub y: f32,
    pub max_width: Option<f32>,
    pub max_height: Option<f32>,
}

impl TextPosition {
    /// Box of `width` x `height` centred in a `screen_width` x `screen_height` surface.
    pub fn centered(screen_width: f32, screen_height: f32, width: f32, height: f32) -> Self {
        Self {
            x: ((screen_width - width) / 2.0).max(0.0),
            y: ((screen_height - height) / 2.0).max(0.0),
            max_width: Some(width),
            max_height: Some(height),
        }
    }
}

#[derive(Debug)]
pub struct TextBuffer {
    pub buffer: Buffer,
    pub style: TextStyle,
    pub position: TextPosition,
    pub visible: bool,
    pub text_content: String,
}

pub struct TextRenderer {
    pub font_system: FontSystem,
    pub swash_cache: SwashCache,
    pub viewport: Viewport,
    pub atlas: TextAtlas,
    pub text_renderer: GlyphonTextRenderer,
    pub text_buffers: HashMap<String, TextBuffer>,
    pub window_scale_factor: f32,
    pub window_size: winit::dpi::PhysicalSize<u32>,
}

impl TextRenderer {
    pub fn new(
        device: &Device,
        queue: &Queue,
        surface_format: wgpu::TextureFormat,
        window: &Window,
    ) -> Self {
        let font_system = FontSystem::new();
        let swash_cache = SwashCache::new();
        let cache = Cache::new(device);
        let viewport = Viewport::new(device, &cache);
        let mut atlas = TextAtlas::new(device, queue, &cache, surface_format);
        let text_renderer =
            GlyphonTextRenderer::new(&mut atlas, device, wgpu::MultisampleState::default(), None);

        Self {
            font_system,
            swash_cache,
            viewport,
            atlas,
            text_renderer,
            text_buffers: HashMap::new(),
            window_scale_factor: window.scale_factor() as f32,
            window_size: window.inner_size(),
        }
    }

    /// Create a new text buffer with the given ID, text, style, and position.
    /// An existing buffer with the same ID is replaced.
    pub fn create_text_buffer(
        &mut self,
        id: &str,
        text: &str,
        style: Option<TextStyle>,
        position: Option<TextPosition>,
    ) {
        let style = style.unwrap_or_default();
        let position = position.unwrap_or_default();

        let metrics = Metrics::new(style.font_size, style.line_height);
        let mut buffer = Buffer::new(&mut self.font_system, metrics);

        let width = position.max_width.unwrap_or(self.window_size.width as f32);
        let height = position
            .max_height
            .unwrap_or(self.window_size.height as f32);
        buffer.set_size(&mut self.font_system, Some(width), Some(height));
        buffer.set_text(&mut self.font_system, text, style.attrs(), Shaping::Advanced);
        buffer.shape_until_scroll(&mut self.font_system, false);

        tracing::debug!("created text buffer '{}' ({}x{})", id, width, height);
        self.text_buffers.insert(
            id.to_string(),
            TextBuffer {
                buffer,
                style,
                position,
                visible: true,
                text_content: text.to_string(),
            },
        );
    }

    /// Update the text content of an existing buffer. Unchanged text is not reshaped.
    pub fn update_text(&mut self, id: &str, text: &str) -> Result<(), TextError> {
        let text_buffer = self
            .text_buffers
            .get_mut(id)
            .ok_or_else(|| TextError::UnknownBuffer(id.to_string()))?;
        if text_buffer.text_content == text {
            return Ok(());
        }

        text_buffer.buffer.set_text(
            &mut self.font_system,
            text,
            text_buffer.style.attrs(),
            Shaping::Advanced,
        );
        text_buffer
            .buffer
            .shape_until_scroll(&mut self.font_system, false);
        text_buffer.text_content = text.to_string();
        Ok(())
    }

    /// Update the position of an existing buffer
    pub fn update_position(&mut self, id: &str, position: TextPosition) -> Result<(), TextError> {
        let text_buffer = self
            .text_buffers
            .get_mut(id)
            .ok_or_else(|| TextError::UnknownBuffer(id.to_string()))?;

        if text_buffer.position.max_width != position.max_width
            || text_buffer.position.max_height != position.max_height
        {
            let width = position.max_width.unwrap_or(self.window_size.width as f32);
            let height = position
                .max_height
                .unwrap_or(self.window_size.height as f32);
            text_buffer
                .buffer
                .set_size(&mut self.font_system, Some(width), Some(height));
        }

        text_buffer.position = position;
        Ok(())
    }

    pub fn set_visible(&mut self, id: &str, visible: bool) -> Result<(), TextError> {
        let text_buffer = self
            .text_buffers
            .get_mut(id)
            .ok_or_else(|| TextError::UnknownBuffer(id.to_string()))?;
        text_buffer.visible = visible;
        Ok(())
    }

    /// Resize the viewport after the surface changed size.
    pub fn resize(&mut self, queue: &Queue, width: u32, height: u32) {
        self.window_size = winit::dpi::PhysicalSize::new(width, height);
        self.viewport.update(queue, Resolution { width, height });
    }

    /// Prepare text rendering for the current frame
    pub fn prepare(&mut self, device: &Device, queue: &Queue) -> Result<(), TextError> {
        let (screen_w, screen_h) = (
            self.window_size.width as f32,
            self.window_size.height as f32,
        );
        let text_areas: Vec<TextArea> = self
            .text_buffers
            .values()
            .filter(|buffer| buffer.visible)
            .map(|buffer| TextArea {
                buffer: &buffer.buffer,
                left: buffer.position.x,
                top: buffer.position.y,
                scale: self.window_scale_factor,
                bounds: TextBounds {
                    left: buffer.position.x as i32,
                    top: buffer.position.y as i32,
                    right: (buffer.position.x + buffer.position.max_width.unwrap_or(screen_w))
                        as i32,
                    bottom: (buffer.position.y + buffer.position.max_height.unwrap_or(screen_h))
                        as i32,
                },
                default_color: buffer.style.color,
                custom_glyphs: &[],
            })
            .collect();

        self.text_renderer.prepare(
            device,
            queue,
            &mut self.font_system,
            &mut self.atlas,
            &self.viewport,
            text_areas,
            &mut self.swash_cache,
        )?;
        Ok(())
    }

    /// Render all visible text buffers
    pub fn render(&mut self, render_pass: &mut RenderPass) -> Result<(), TextError> {
        self.text_renderer
            .render(&self.atlas, &self.viewport, render_pass)?;
        Ok(())
    }

    /// Trim the atlas to free up unused space
    pub fn trim(&mut self) {
        self.atlas.trim();
    }
}
