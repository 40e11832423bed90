//! Keyboard input handling for the maze walk.
//!
//! This module defines the [`GameKey`] enum for abstracting game actions from physical keys,
//! and provides [`KeyState`] for tracking which of them are held. Key events arrive
//! edge-triggered from winit; the simulation samples them level-triggered once per frame
//! through [`KeyState::move_input`].

use crate::game::player::MoveInput;
use std::collections::HashSet;
use winit::keyboard;

/// Enum representing all in-game actions that can be triggered by keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameKey {
    /// Move player forward (W or Up Arrow).
    MoveForward,
    /// Move player backward (S or Down Arrow).
    MoveBackward,
    /// Strafe left (A or Left Arrow).
    MoveLeft,
    /// Strafe right (D or Right Arrow).
    MoveRight,
    /// Run (Shift).
    Run,
    /// Escape key: closes the preview overlay or releases the pointer.
    Escape,
}

/// Tracks the set of currently pressed game keys.
#[derive(Debug, Default)]
pub struct KeyState {
    /// Set of currently pressed keys.
    pub pressed_keys: HashSet<GameKey>,
}

impl KeyState {
    /// Creates a new, empty [`KeyState`]
    pub fn new() -> Self {
        Self {
            pressed_keys: HashSet::new(),
        }
    }

    /// Marks a key as pressed.
    pub fn press_key(&mut self, key: GameKey) {
        self.pressed_keys.insert(key);
    }

    /// Marks a key as released.
    pub fn release_key(&mut self, key: GameKey) {
        self.pressed_keys.remove(&key);
    }

    /// Checks if a key is currently pressed.
    pub fn is_pressed(&self, key: GameKey) -> bool {
        self.pressed_keys.contains(&key)
    }

    /// Forgets every held key, e.g. when the window loses focus or an overlay
    /// takes input.
    pub fn clear(&mut self) {
        self.pressed_keys.clear();
    }

    /// Snapshot of the movement keys for this frame.
    pub fn move_input(&self) -> MoveInput {
        MoveInput {
            forward: self.is_pressed(GameKey::MoveForward),
            back: self.is_pressed(GameKey::MoveBackward),
            left: self.is_pressed(GameKey::MoveLeft),
            right: self.is_pressed(GameKey::MoveRight),
            run: self.is_pressed(GameKey::Run),
        }
    }
}

macro_rules! match_char_key {
    ($c:expr, {
        $($key:literal => $variant:expr),* $(,)?
    }) => {{
        match $c.to_ascii_lowercase().as_str() {
            $($key => Some($variant),)*
            _ => None,
        }
    }};
}

macro_rules! match_named_key {
    ($k:expr, {
        $($key:ident => $variant:expr),* $(,)?
    }) => {{
        match $k {
            $(winit::keyboard::NamedKey::$key => Some($variant),)*
            _ => None,
        }
    }};
}

/// Converts a winit [`keyboard::Key`] to a [`GameKey`] if it matches a mapped action.
///
/// Supports both named keys (arrows, shift, escape) and character keys (WASD).
pub fn winit_key_to_game_key(key: &keyboard::Key) -> Option<GameKey> {
    match key {
        keyboard::Key::Named(named) => match_named_key!(named, {
            ArrowUp => GameKey::MoveForward,
            ArrowDown => GameKey::MoveBackward,
            ArrowLeft => GameKey::MoveLeft,
            ArrowRight => GameKey::MoveRight,
            Shift => GameKey::Run,
            Escape => GameKey::Escape,
        }),

        keyboard::Key::Character(c) => match_char_key!(c, {
            "w" => GameKey::MoveForward,
            "s" => GameKey::MoveBackward,
            "a" => GameKey::MoveLeft,
            "d" => GameKey::MoveRight,
        }),

        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::{Key, NamedKey, SmolStr};

    /// WASD and the arrow keys map to the same actions, case-insensitively.
    #[test]
    fn test_key_mapping() {
        assert_eq!(
            winit_key_to_game_key(&Key::Character(SmolStr::new("W"))),
            Some(GameKey::MoveForward)
        );
        assert_eq!(
            winit_key_to_game_key(&Key::Named(NamedKey::ArrowLeft)),
            Some(GameKey::MoveLeft)
        );
        assert_eq!(
            winit_key_to_game_key(&Key::Named(NamedKey::Shift)),
            Some(GameKey::Run)
        );
        assert_eq!(winit_key_to_game_key(&Key::Character(SmolStr::new("q"))), None);
    }

    #[test]
    fn test_move_input_snapshot() {
        let mut keys = KeyState::new();
        keys.press_key(GameKey::MoveForward);
        keys.press_key(GameKey::Run);
        let input = keys.move_input();
        assert!(input.forward && input.run && !input.back);
        keys.release_key(GameKey::MoveForward);
        assert!(keys.move_input().is_idle());
        keys.clear();
        assert!(!keys.is_pressed(GameKey::Run));
    }
}
