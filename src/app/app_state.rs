//! AppState module.
//!
//! This module defines the [`AppState`] struct, which holds everything a running window needs:
//! the renderer, the audio output and the [`PlayState`] that owns the session.

use crate::app::update::PlayState;
use crate::assets::{self, PosterSurface};
use crate::game::Session;
use crate::game::audio::{GameAudioManager, SilentSoundtrack, Soundtrack};
use crate::renderer::wgpu_lib::{RenderError, WgpuRenderer};
use std::time::Instant;
use winit::window::{CursorGrabMode, Window};

/// Holds all state required for a running session.
pub struct AppState {
    /// The WGPU renderer for the maze, the preview and the text.
    pub wgpu_renderer: WgpuRenderer,
    /// Session, overlay and input routing.
    pub play: PlayState,
    /// Kira output, or silence when no audio device is available.
    pub audio: Box<dyn Soundtrack>,
    pub last_frame: Instant,
}

impl AppState {
    /// Loads the posters, brings up the renderer and the audio output.
    ///
    /// # Arguments
    /// - `instance`: The WGPU instance.
    /// - `surface`: The WGPU surface for rendering.
    /// - `window`: The application window.
    /// - `session`: The carved and populated maze.
    pub async fn new(
        instance: &wgpu::Instance,
        surface: wgpu::Surface<'static>,
        window: &Window,
        session: Session,
    ) -> Result<Self, RenderError> {
        let posters: Vec<PosterSurface> = session
            .config()
            .sculptures
            .iter()
            .map(|batch| assets::load_surface(&batch.image, batch.placeholder))
            .collect();
        let placeholders = posters.iter().filter(|p| p.is_placeholder()).count();
        if placeholders > 0 {
            tracing::warn!("{placeholders} of {} posters use placeholders", posters.len());
        }

        let wgpu_renderer = WgpuRenderer::new(instance, surface, window, &posters).await?;

        let audio: Box<dyn Soundtrack> = match GameAudioManager::new(session.clip_sources()) {
            Ok(manager) => Box::new(manager),
            Err(e) => {
                tracing::warn!("{e}, continuing without sound");
                Box::new(SilentSoundtrack)
            }
        };

        Ok(Self {
            wgpu_renderer,
            play: PlayState::new(session),
            audio,
            last_frame: Instant::now(),
        })
    }

    /// Reconfigures the surface and everything sized after it.
    pub fn resize_surface(&mut self, width: u32, height: u32) {
        self.wgpu_renderer.resize(width, height);
    }

    /// Locks and hides the cursor while captured, releases it otherwise.
    pub fn triage_mouse(&self, window: &Window) {
        if self.play.capture_mouse {
            let grabbed = window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
            if let Err(e) = grabbed {
                tracing::warn!("failed to lock cursor: {e}");
            }
            window.set_cursor_visible(false);
        } else {
            if let Err(e) = window.set_cursor_grab(CursorGrabMode::None) {
                tracing::warn!("failed to unlock cursor: {e}");
            }
            window.set_cursor_visible(true);
        }
    }
}
