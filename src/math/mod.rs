//! Math utilities and types for 3D graphics and game logic.
//!
//! This module provides matrix and vector types and operations, plus the ray
//! intersection tests used for picking. All types are designed to be
//! compatible with GPU memory layouts (e.g., for use with WGPU/WGSL).
//!
//! # Module Organization
//!
//! - [`vec`] module contains all vector operations
//! - [`mat`] module contains all matrix operations
//! - [`ray`] module contains ray/shape intersection
//! - Easing curves are provided at root level

pub mod mat;
pub mod ray;
pub mod vec;

/// Cubic ease-out: fast start, gentle landing. `t` is clamped to `[0, 1]`.
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ease_out_cubic_endpoints() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert_eq!(ease_out_cubic(2.0), 1.0);
        assert!((ease_out_cubic(0.5) - 0.875).abs() < 1e-6);
    }
}
