//! Preview overlay shown after clicking a mini figure.
//!
//! While the overlay is open it owns input: movement, look and clicks never
//! reach the session. The selected shape spins slowly in the middle of the
//! screen; holding a mouse button freezes it.

use crate::game::entity::{PreviewCategory, PreviewDescriptor, Shape};

/// Spin rates of the preview model in radians per second.
const SPIN_YAW: f32 = 0.6;
const SPIN_PITCH: f32 = 0.24;

const BLURB: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. \
Sed do eiusmod tempor incididunt ut labore et dolore magna aliqua.";

#[derive(Debug, Default)]
pub struct Overlay {
    current: Option<PreviewDescriptor>,
    /// Accumulated `(yaw, pitch)` of the preview model.
    spin: (f32, f32),
    paused: bool,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, descriptor: PreviewDescriptor) {
        tracing::info!("overlay opened: {}", descriptor.info);
        self.current = Some(descriptor);
        self.spin = (0.0, 0.0);
        self.paused = false;
    }

    pub fn close(&mut self) {
        if self.current.take().is_some() {
            tracing::info!("overlay closed");
        }
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    pub fn descriptor(&self) -> Option<&PreviewDescriptor> {
        self.current.as_ref()
    }

    /// Freezes the spin while a mouse button is held.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn advance(&mut self, dt: f32) {
        if self.current.is_none() || self.paused {
            return;
        }
        self.spin.0 += SPIN_YAW * dt;
        self.spin.1 += SPIN_PITCH * dt;
    }

    pub fn spin(&self) -> (f32, f32) {
        self.spin
    }

    /// Heading of the overlay card.
    pub fn title(&self) -> Option<String> {
        let descriptor = self.current.as_ref()?;
        let title = match descriptor.category {
            PreviewCategory::Sculpture if descriptor.info.is_empty() => "Sculpture".to_string(),
            PreviewCategory::Sculpture => descriptor.info.clone(),
            PreviewCategory::Mini => match descriptor.shape {
                Shape::Box => "Cube".to_string(),
                Shape::Sphere => "Sphere".to_string(),
                Shape::Cylinder => "Cylinder".to_string(),
            },
        };
        Some(title)
    }

    /// Body text under the title, one entry per paragraph.
    pub fn body(&self) -> Vec<String> {
        let Some(descriptor) = &self.current else {
            return Vec::new();
        };
        vec![
            BLURB.to_string(),
            format!("Info: {}", descriptor.info),
            "Press Esc to close".to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_titles_per_category() {
        let mut overlay = Overlay::new();
        assert_eq!(overlay.title(), None);

        overlay.open(PreviewDescriptor::mini(Shape::Box, [0, 255, 0]));
        assert_eq!(overlay.title().as_deref(), Some("Cube"));

        overlay.open(PreviewDescriptor::sculpture(PathBuf::from("posters/robocop.webp")));
        assert_eq!(
            overlay.title().as_deref(),
            Some("Sculpture (posters/robocop.webp)")
        );

        let mut bare = PreviewDescriptor::sculpture(PathBuf::from("x.webp"));
        bare.info.clear();
        overlay.open(bare);
        assert_eq!(overlay.title().as_deref(), Some("Sculpture"));
    }

    /// The body ends with the info line and the close hint.
    #[test]
    fn test_body_lines() {
        let mut overlay = Overlay::new();
        assert!(overlay.body().is_empty());
        overlay.open(PreviewDescriptor::mini(Shape::Sphere, [0, 255, 0]));
        let body = overlay.body();
        assert_eq!(body[1], "Info: Mini figure, Sphere");
        assert_eq!(body[2], "Press Esc to close");
        overlay.close();
        assert!(!overlay.is_open());
    }

    /// Spin only accumulates while open and not held.
    #[test]
    fn test_spin_pauses() {
        let mut overlay = Overlay::new();
        overlay.advance(1.0);
        assert_eq!(overlay.spin(), (0.0, 0.0));

        overlay.open(PreviewDescriptor::mini(Shape::Cylinder, [0, 255, 0]));
        overlay.advance(1.0);
        assert!((overlay.spin().0 - 0.6).abs() < 1e-6);
        assert!((overlay.spin().1 - 0.24).abs() < 1e-6);

        overlay.set_paused(true);
        overlay.advance(1.0);
        assert!((overlay.spin().0 - 0.6).abs() < 1e-6);
    }
}
