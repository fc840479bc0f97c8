//! Constant buffer layouts shared with shaders.
//!
//! All structures use `#[repr(C)]` and implement `Pod`/`Zeroable` so they can
//! be copied byte-for-byte into upload buffers. Every block is padded to a
//! multiple of 16 bytes so that HLSL packing rules (no field straddling a
//! 16-byte register) hold. Matrices are stored column-major, as glam lays them
//! out.
//!
//! # Overview
//!
//! - [`ObjectConstants`] - per render item (register b0)
//! - [`MaterialConstants`] - per material (register b1)
//! - [`PassConstants`] - per pass: camera, timing and lights (register b2)
//!
//! # Example
//!
//! ```
//! use waveframe_resources::ubo::{ObjectConstants, PassConstants};
//! use glam::{Mat4, Vec3};
//!
//! let object = ObjectConstants::new(Mat4::from_translation(Vec3::Y), Mat4::IDENTITY, 2);
//! let pass = PassConstants::new(
//!     Mat4::look_at_lh(Vec3::new(0.0, 5.0, -10.0), Vec3::ZERO, Vec3::Y),
//!     Mat4::perspective_lh(45.0_f32.to_radians(), 16.0 / 9.0, 1.0, 1000.0),
//!     Vec3::new(0.0, 5.0, -10.0),
//! );
//!
//! let bytes: &[u8] = bytemuck::bytes_of(&object);
//! assert_eq!(bytes.len(), ObjectConstants::SIZE);
//! assert_eq!(pass.view_proj, pass.proj * pass.view);
//! ```

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3, Vec4};

/// Number of light slots in [`PassConstants`].
pub const MAX_LIGHTS: usize = 16;

/// Per-object constants.
///
/// # Memory Layout
///
/// | Offset | Size | Field |
/// |--------|------|-------|
/// | 0      | 64   | world |
/// | 64     | 64   | tex_transform |
/// | 128    | 4    | material_index |
/// | 132    | 12   | _padding |
///
/// Total size: 144 bytes
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ObjectConstants {
    /// Object to world transform.
    pub world: Mat4,
    /// Texture coordinate transform.
    pub tex_transform: Mat4,
    /// Index of the material this object samples.
    pub material_index: u32,
    /// Padding to a 16-byte multiple.
    pub _padding: [u32; 3],
}

impl ObjectConstants {
    /// Size of the struct in bytes.
    pub const SIZE: usize = size_of::<Self>();

    /// Creates object constants.
    #[inline]
    pub fn new(world: Mat4, tex_transform: Mat4, material_index: u32) -> Self {
        Self {
            world,
            tex_transform,
            material_index,
            _padding: [0; 3],
        }
    }
}

/// Per-material constants.
///
/// # Memory Layout
///
/// | Offset | Size | Field |
/// |--------|------|-------|
/// | 0      | 16   | diffuse_albedo |
/// | 16     | 12   | fresnel_r0 |
/// | 28     | 4    | roughness |
/// | 32     | 64   | mat_transform |
/// | 96     | 4    | diffuse_map_index |
/// | 100    | 12   | _padding |
///
/// Total size: 112 bytes
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct MaterialConstants {
    /// Diffuse reflectance (RGBA).
    pub diffuse_albedo: Vec4,
    /// Reflectance at normal incidence.
    pub fresnel_r0: Vec3,
    /// Roughness in [0, 1].
    pub roughness: f32,
    /// Texture coordinate animation transform.
    pub mat_transform: Mat4,
    /// Index of the diffuse texture in the shader resource table.
    pub diffuse_map_index: u32,
    /// Padding to a 16-byte multiple.
    pub _padding: [u32; 3],
}

/// A light in the pass block.
///
/// Directional, point and spot lights share one layout; unused fields are
/// ignored by the shader for the light kind.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Light {
    /// Radiant strength (RGB).
    pub strength: Vec3,
    /// Point/spot: distance where falloff starts.
    pub falloff_start: f32,
    /// Directional/spot: direction the light travels.
    pub direction: Vec3,
    /// Point/spot: distance where the light reaches zero.
    pub falloff_end: f32,
    /// Point/spot: position in world space.
    pub position: Vec3,
    /// Spot: cone exponent.
    pub spot_power: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            strength: Vec3::splat(0.5),
            falloff_start: 1.0,
            direction: Vec3::new(0.0, -1.0, 0.0),
            falloff_end: 10.0,
            position: Vec3::ZERO,
            spot_power: 64.0,
        }
    }
}

impl Light {
    /// Creates a directional light.
    pub fn directional(direction: Vec3, strength: Vec3) -> Self {
        Self {
            direction,
            strength,
            ..Self::default()
        }
    }
}

/// Per-pass constants: camera, render target, timing and lights.
///
/// Total size: 1216 bytes (six matrices, scalars, ambient term and
/// [`MAX_LIGHTS`] lights).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct PassConstants {
    pub view: Mat4,
    pub inv_view: Mat4,
    pub proj: Mat4,
    pub inv_proj: Mat4,
    pub view_proj: Mat4,
    pub inv_view_proj: Mat4,
    /// Eye position in world space.
    pub eye_pos_w: Vec3,
    pub _padding: f32,
    pub render_target_size: Vec2,
    pub inv_render_target_size: Vec2,
    pub near_z: f32,
    pub far_z: f32,
    /// Seconds since the timer started, excluding pauses.
    pub total_time: f32,
    /// Seconds since the previous frame.
    pub delta_time: f32,
    pub ambient_light: Vec4,
    pub lights: [Light; MAX_LIGHTS],
}

impl Default for PassConstants {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY,
            inv_view: Mat4::IDENTITY,
            proj: Mat4::IDENTITY,
            inv_proj: Mat4::IDENTITY,
            view_proj: Mat4::IDENTITY,
            inv_view_proj: Mat4::IDENTITY,
            eye_pos_w: Vec3::ZERO,
            _padding: 0.0,
            render_target_size: Vec2::ZERO,
            inv_render_target_size: Vec2::ZERO,
            near_z: 0.0,
            far_z: 0.0,
            total_time: 0.0,
            delta_time: 0.0,
            ambient_light: Vec4::new(0.0, 0.0, 0.0, 1.0),
            lights: [Light::default(); MAX_LIGHTS],
        }
    }
}

impl PassConstants {
    /// Size of the struct in bytes.
    pub const SIZE: usize = size_of::<Self>();

    /// Creates pass constants from a camera; inverses are derived.
    pub fn new(view: Mat4, proj: Mat4, eye_pos_w: Vec3) -> Self {
        let mut constants = Self {
            eye_pos_w,
            ..Self::default()
        };
        constants.set_camera(view, proj, eye_pos_w);
        constants
    }

    /// Replaces the camera matrices and recomputes products and inverses.
    pub fn set_camera(&mut self, view: Mat4, proj: Mat4, eye_pos_w: Vec3) {
        let view_proj = proj * view;
        self.view = view;
        self.inv_view = view.inverse();
        self.proj = proj;
        self.inv_proj = proj.inverse();
        self.view_proj = view_proj;
        self.inv_view_proj = view_proj.inverse();
        self.eye_pos_w = eye_pos_w;
    }

    /// Sets render target size; the reciprocal is zero for an empty target.
    pub fn with_render_target(mut self, width: u32, height: u32) -> Self {
        let size = Vec2::new(width as f32, height as f32);
        self.render_target_size = size;
        self.inv_render_target_size = if width == 0 || height == 0 {
            Vec2::ZERO
        } else {
            size.recip()
        };
        self
    }

    /// Sets the depth range.
    pub fn with_depth_range(mut self, near_z: f32, far_z: f32) -> Self {
        self.near_z = near_z;
        self.far_z = far_z;
        self
    }

    /// Sets frame timing.
    pub fn with_time(mut self, total_time: f32, delta_time: f32) -> Self {
        self.total_time = total_time;
        self.delta_time = delta_time;
        self
    }

    /// Sets the ambient term.
    pub fn with_ambient(mut self, ambient_light: Vec4) -> Self {
        self.ambient_light = ambient_light;
        self
    }

    /// Places lights into the first slots; extra lights are dropped.
    pub fn with_lights(mut self, lights: &[Light]) -> Self {
        for (slot, light) in self.lights.iter_mut().zip(lights) {
            *slot = *light;
        }
        self
    }
}
