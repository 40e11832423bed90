//! Uniform buffer utilities for wgpu rendering.
//!
//! This module provides the [`Uniforms`] struct for storing and uploading per-pass data
//! (camera matrix, light and shading parameters) to the GPU, as well as helper methods for
//! buffer and bind group creation.

use crate::math::mat::Mat4;
use crate::math::vec::Vec3;
use wgpu::util::DeviceExt;

/// Uniforms for the scene pipeline.
///
/// - `view_proj`: projection times view, column-major.
/// - `light_dir`: direction toward the sun in `xyz`.
/// - `params`: `x` overall brightness, `y` exit pulse, `z` ambient, `w` diffuse strength.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Uniforms {
    pub view_proj: [[f32; 4]; 4],
    pub light_dir: [f32; 4],
    pub params: [f32; 4],
}

impl Default for Uniforms {
    fn default() -> Self {
        Self::new()
    }
}

impl Uniforms {
    pub const AMBIENT: f32 = 0.6;
    pub const DIFFUSE: f32 = 0.7;

    /// Identity camera, full brightness, light from above.
    pub fn new() -> Self {
        Self {
            view_proj: Mat4::identity().0,
            light_dir: [0.0, 1.0, 0.0, 0.0],
            params: [1.0, 0.0, Self::AMBIENT, Self::DIFFUSE],
        }
    }

    pub fn with_camera(mut self, view_proj: Mat4) -> Self {
        self.view_proj = view_proj.0;
        self
    }

    pub fn with_light(mut self, toward_light: Vec3) -> Self {
        let dir = toward_light.normalize();
        self.light_dir = [dir.x(), dir.y(), dir.z(), 0.0];
        self
    }

    pub fn with_brightness(mut self, brightness: f32) -> Self {
        self.params[0] = brightness;
        self
    }

    pub fn with_pulse(mut self, pulse: f32) -> Self {
        self.params[1] = pulse;
        self
    }

    /// Returns the raw bytes of the uniform struct for uploading to the GPU.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }

    /// Creates a GPU buffer containing the uniform data.
    pub fn create_buffer(&self, device: &wgpu::Device) -> wgpu::Buffer {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: self.as_bytes(),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        })
    }

    /// Bind group layout shared by every pass that uses [`Uniforms`].
    pub fn create_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("uniform_bind_group_layout"),
        })
    }

    pub fn create_bind_group(
        buffer: &wgpu::Buffer,
        layout: &wgpu::BindGroupLayout,
        device: &wgpu::Device,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("uniform_bind_group"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The struct matches the WGSL layout: one mat4 and two vec4s.
    #[test]
    fn test_uniform_layout() {
        assert_eq!(std::mem::size_of::<Uniforms>(), 96);
        let uniforms = Uniforms::new()
            .with_light(Vec3::new(30.0, 50.0, 30.0))
            .with_brightness(0.4)
            .with_pulse(0.75);
        let light = Vec3::new(uniforms.light_dir[0], uniforms.light_dir[1], uniforms.light_dir[2]);
        assert!((light.length() - 1.0).abs() < 1e-5);
        assert_eq!(uniforms.params, [0.4, 0.75, Uniforms::AMBIENT, Uniforms::DIFFUSE]);
        assert_eq!(uniforms.as_bytes().len(), 96);
    }
}
