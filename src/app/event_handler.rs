//! Event handler module.
//!
//! Contains the App struct and its event handling logic.

use crate::app::app_state::AppState;
use crate::game::Session;
use crate::game::interaction::ClickOutcome;
use crate::game::keys::winit_key_to_game_key;
use std::{sync::Arc, time::Instant};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, MouseButton, WindowEvent},
    event_loop::ActiveEventLoop,
    window::{Window, WindowId},
};

const INITIAL_WIDTH: u32 = 1360;
const INITIAL_HEIGHT: u32 = 768;

/// Main application struct that manages the window lifecycle and event handling.
///
/// # Lifecycle
/// 1. Created with `App::new(session)`: the maze is already carved
/// 2. `resumed` creates the window; `set_window` builds the surface and [`AppState`]
/// 3. Events are handled via `ApplicationHandler` trait methods
/// 4. Application runs until the window is closed
pub struct App {
    /// The WGPU instance for graphics operations.
    pub instance: wgpu::Instance,
    /// The current application state, None until initialized.
    pub state: Option<AppState>,
    /// The application window, None until set.
    pub window: Option<Arc<Window>>,
    /// Session waiting for a window to be shown in.
    pending: Option<Session>,
}

impl App {
    pub fn new(session: Session) -> Self {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        Self {
            instance,
            state: None,
            window: None,
            pending: Some(session),
        }
    }

    /// Creates the surface and initializes the renderer and audio for `window`.
    ///
    /// Failures are logged and leave the app without state; the event loop is
    /// then closed by the caller.
    pub async fn set_window(&mut self, window: Window) -> bool {
        let window = Arc::new(window);
        let _ = window.request_inner_size(PhysicalSize::new(INITIAL_WIDTH, INITIAL_HEIGHT));
        window.set_title("mazeway");

        let Some(session) = self.pending.take() else {
            return self.state.is_some();
        };
        let surface = match self.instance.create_surface(window.clone()) {
            Ok(surface) => surface,
            Err(e) => {
                tracing::error!("failed to create surface: {e}");
                return false;
            }
        };

        match AppState::new(&self.instance, surface, &window, session).await {
            Ok(state) => {
                state.triage_mouse(&window);
                window.request_redraw();
                self.state = Some(state);
                self.window = Some(window);
                true
            }
            Err(e) => {
                tracing::error!("failed to initialize renderer: {e}");
                false
            }
        }
    }

    /// Handles window resize events. Zero-sized (minimized) windows are skipped.
    pub fn handle_resized(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        match &mut self.state {
            Some(state) => state.resize_surface(width, height),
            None => tracing::debug!("resize before initialization ignored"),
        }
    }

    fn handle_mouse_input(&mut self, button: MouseButton, pressed: ElementState) {
        let (Some(state), Some(window)) = (self.state.as_mut(), self.window.as_ref()) else {
            return;
        };
        if button != MouseButton::Left {
            return;
        }
        match pressed {
            ElementState::Pressed => {
                let outcome = state
                    .play
                    .press_primary(Instant::now(), state.audio.as_mut());
                match outcome {
                    Some(ClickOutcome::EscapeStarted) => tracing::info!("the walls are lifting"),
                    Some(ClickOutcome::Struck { clicks }) => {
                        tracing::debug!("sculpture struck ({clicks} clicks)")
                    }
                    _ => {}
                }
            }
            ElementState::Released => state.play.release_primary(),
        }
        state.triage_mouse(window);
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let window = match event_loop.create_window(Window::default_attributes()) {
            Ok(window) => window,
            Err(err) => {
                tracing::error!("failed to create window: {err}");
                event_loop.exit();
                return;
            }
        };
        if !pollster::block_on(self.set_window(window)) {
            event_loop.exit();
        }
    }

    /// Mouse movement turns the view while the pointer is captured.
    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if let Some(state) = self.state.as_mut() {
                state.play.mouse_motion(delta.0, delta.1);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("close requested; stopping");
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                self.handle_resized(new_size.width, new_size.height);
            }

            WindowEvent::Focused(false) => {
                if let (Some(state), Some(window)) = (self.state.as_mut(), self.window.as_ref()) {
                    state.play.focus_lost();
                    state.triage_mouse(window);
                }
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: key,
                        state: key_state,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                let (Some(state), Some(window)) = (self.state.as_mut(), self.window.as_ref())
                else {
                    return;
                };
                if let Some(game_key) = winit_key_to_game_key(&key) {
                    state
                        .play
                        .key(game_key, key_state == ElementState::Pressed);
                    state.triage_mouse(window);
                }
            }

            WindowEvent::MouseInput {
                state: pressed,
                button,
                ..
            } => self.handle_mouse_input(button, pressed),

            WindowEvent::RedrawRequested => self.handle_redraw(),

            _ => {}
        }
    }
}
