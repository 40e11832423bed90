//! Update logic for the maze walk.
//!
//! [`PlayState`] routes input between the session, the preview overlay and the
//! pointer capture flag. It holds no GPU or window handle, so every rule about
//! who receives input is exercised by plain unit tests. The per-frame redraw
//! on [`App`] drives it and hands the result to the renderer.

use crate::game::Session;
use crate::game::audio::Soundtrack;
use crate::game::interaction::{ClickOutcome, SessionEvent};
use crate::game::keys::{GameKey, KeyState};
use crate::game::player::MoveInput;
use crate::renderer::wgpu_lib::{FrameView, RenderError};
use crate::ui::overlay::Overlay;
use std::time::Instant;

use super::event_handler::App;

/// Longest simulated step; a stalled frame must not tunnel the player.
const MAX_FRAME_SECONDS: f32 = 0.1;

/// Input-facing state around a [`Session`].
pub struct PlayState {
    pub session: Session,
    pub overlay: Overlay,
    pub key_state: KeyState,
    /// Whether the pointer is locked to the window and drives the view.
    pub capture_mouse: bool,
    /// Set once the escape animation has finished.
    pub escaped: bool,
}

impl PlayState {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            overlay: Overlay::new(),
            key_state: KeyState::new(),
            capture_mouse: false,
            escaped: false,
        }
    }

    /// Pointer delta from the device. Ignored unless captured and the card is closed.
    pub fn mouse_motion(&mut self, delta_x: f64, delta_y: f64) {
        if self.capture_mouse && !self.overlay.is_open() {
            self.session.look(delta_x, delta_y);
        }
    }

    /// Left button pressed.
    ///
    /// The first press only captures the pointer. While the card is open the
    /// press freezes the preview spin instead of clicking.
    pub fn press_primary(
        &mut self,
        now: Instant,
        audio: &mut dyn Soundtrack,
    ) -> Option<ClickOutcome> {
        if self.overlay.is_open() {
            self.overlay.set_paused(true);
            return None;
        }
        if !self.capture_mouse {
            self.capture_mouse = true;
            return None;
        }

        let outcome = self.session.click(now, audio);
        if let ClickOutcome::Preview(descriptor) = &outcome {
            self.overlay.open(descriptor.clone());
            self.capture_mouse = false;
            self.key_state.clear();
        }
        Some(outcome)
    }

    pub fn release_primary(&mut self) {
        self.overlay.set_paused(false);
    }

    /// Esc closes the card and recaptures, or releases the pointer.
    pub fn press_escape(&mut self) {
        if self.overlay.is_open() {
            self.overlay.close();
            self.capture_mouse = true;
        } else {
            self.capture_mouse = false;
        }
    }

    pub fn key(&mut self, key: GameKey, pressed: bool) {
        if key == GameKey::Escape {
            if pressed {
                self.press_escape();
            }
            return;
        }
        if pressed {
            self.key_state.press_key(key);
        } else {
            self.key_state.release_key(key);
        }
    }

    /// Drops held keys and the pointer; the next click recaptures.
    pub fn focus_lost(&mut self) {
        self.key_state.clear();
        self.capture_mouse = false;
    }

    /// Advances the session and the card by `dt` seconds.
    pub fn tick(&mut self, dt: f32, now: Instant) -> Vec<SessionEvent> {
        let dt = dt.clamp(0.0, MAX_FRAME_SECONDS);
        let input = if self.overlay.is_open() {
            MoveInput::default()
        } else {
            self.key_state.move_input()
        };
        let events = self.session.update(&input, dt, now);
        self.overlay.advance(dt);
        if events.contains(&SessionEvent::EscapeCompleted) {
            self.escaped = true;
        }
        events
    }
}

impl App {
    /// Simulates one frame and renders it.
    pub fn handle_redraw(&mut self) {
        let (Some(window), Some(state)) = (self.window.as_ref(), self.state.as_mut()) else {
            return;
        };
        if window.is_minimized().unwrap_or(false) {
            return;
        }

        let now = Instant::now();
        let dt = now.duration_since(state.last_frame).as_secs_f32();
        state.last_frame = now;

        state.audio.poll();
        for event in state.play.tick(dt, now) {
            if let SessionEvent::Removed(id) = event {
                tracing::debug!("entity {} left the scene", id.0);
            }
        }

        let frame = FrameView {
            session: &state.play.session,
            overlay: &state.play.overlay,
            escaped: state.play.escaped,
        };
        match state.wgpu_renderer.render(&frame) {
            Ok(()) => {}
            Err(RenderError::Surface(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                let size = window.inner_size();
                tracing::warn!("surface lost, reconfiguring");
                state.resize_surface(size.width, size.height);
            }
            Err(e) => tracing::error!("failed to render frame: {e}"),
        }

        window.request_redraw();
    }
}
