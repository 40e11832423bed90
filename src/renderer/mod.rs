//! Main renderer module.
//!
//! This module contains submodules for geometry, uniform management, text and the wgpu renderer
//! implementation. It turns a [`crate::game::Session`] into frames.

/// Pipeline building utilities for WGPU.
pub mod pipeline_builder;
/// Triangle-list geometry and the vertex format.
pub mod primitives;
/// Session-to-mesh conversion.
pub mod scene;
/// Text rendering system.
pub mod text;
pub mod uniform;
/// Core WGPU library and utilities.
pub mod wgpu_lib;
