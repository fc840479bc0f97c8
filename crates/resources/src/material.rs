//! Materials and the material library.

use std::collections::HashMap;

use glam::{Mat4, Vec3, Vec4};
use tracing::debug;

use crate::dirty::DirtyCounter;
use crate::error::{ResourceError, ResourceResult};
use crate::ubo::MaterialConstants;

/// Surface material.
///
/// Every setter marks the material dirty so the change reaches all frame
/// slots' material buffers.
#[derive(Debug, Clone)]
pub struct Material {
    name: String,
    /// Slot in the material constant buffer.
    cb_index: usize,
    /// Slot of the diffuse texture in the shader resource table.
    diffuse_srv_index: u32,
    diffuse_albedo: Vec4,
    fresnel_r0: Vec3,
    roughness: f32,
    mat_transform: Mat4,
    dirty: DirtyCounter,
}

impl Material {
    /// Creates a material with neutral parameters, dirty in every slot.
    pub fn new(name: impl Into<String>, cb_index: usize, frames_in_flight: usize) -> Self {
        Self {
            name: name.into(),
            cb_index,
            diffuse_srv_index: 0,
            diffuse_albedo: Vec4::ONE,
            fresnel_r0: Vec3::splat(0.01),
            roughness: 0.25,
            mat_transform: Mat4::IDENTITY,
            dirty: DirtyCounter::new(frames_in_flight),
        }
    }

    /// Builder: diffuse albedo.
    pub fn with_diffuse_albedo(mut self, albedo: Vec4) -> Self {
        self.diffuse_albedo = albedo;
        self
    }

    /// Builder: Fresnel reflectance at normal incidence.
    pub fn with_fresnel_r0(mut self, fresnel_r0: Vec3) -> Self {
        self.fresnel_r0 = fresnel_r0;
        self
    }

    /// Builder: roughness.
    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness;
        self
    }

    /// Builder: diffuse texture slot.
    pub fn with_diffuse_srv_index(mut self, index: u32) -> Self {
        self.diffuse_srv_index = index;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cb_index(&self) -> usize {
        self.cb_index
    }

    pub fn diffuse_albedo(&self) -> Vec4 {
        self.diffuse_albedo
    }

    pub fn roughness(&self) -> f32 {
        self.roughness
    }

    pub fn mat_transform(&self) -> Mat4 {
        self.mat_transform
    }

    pub fn set_diffuse_albedo(&mut self, albedo: Vec4) {
        self.diffuse_albedo = albedo;
        self.dirty.mark_dirty();
    }

    pub fn set_roughness(&mut self, roughness: f32) {
        self.roughness = roughness;
        self.dirty.mark_dirty();
    }

    pub fn set_mat_transform(&mut self, transform: Mat4) {
        self.mat_transform = transform;
        self.dirty.mark_dirty();
    }

    /// Scrolls the texture transform's translation, wrapping each component
    /// back into [0, 1).
    ///
    /// Used to animate flowing water.
    pub fn scroll_texture(&mut self, du: f32, dv: f32) {
        let mut u = self.mat_transform.w_axis.x + du;
        let mut v = self.mat_transform.w_axis.y + dv;
        if u >= 1.0 {
            u -= 1.0;
        }
        if v >= 1.0 {
            v -= 1.0;
        }
        self.mat_transform.w_axis.x = u;
        self.mat_transform.w_axis.y = v;
        self.dirty.mark_dirty();
    }

    /// Dirty counter; the frame pipeline consumes it on upload.
    pub fn dirty(&self) -> &DirtyCounter {
        &self.dirty
    }

    pub fn dirty_mut(&mut self) -> &mut DirtyCounter {
        &mut self.dirty
    }

    /// Shader-visible representation.
    pub fn constants(&self) -> MaterialConstants {
        MaterialConstants {
            diffuse_albedo: self.diffuse_albedo,
            fresnel_r0: self.fresnel_r0,
            roughness: self.roughness,
            mat_transform: self.mat_transform,
            diffuse_map_index: self.diffuse_srv_index,
            _padding: [0; 3],
        }
    }
}

/// Named materials in insertion order.
#[derive(Debug, Default)]
pub struct MaterialLibrary {
    materials: Vec<Material>,
    by_name: HashMap<String, usize>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a material and returns its position in the library.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::DuplicateMaterial`] if the name is taken.
    pub fn insert(&mut self, material: Material) -> ResourceResult<usize> {
        if self.by_name.contains_key(material.name()) {
            return Err(ResourceError::DuplicateMaterial(material.name().to_owned()));
        }
        let index = self.materials.len();
        debug!(
            "Registered material '{}' (cb index {})",
            material.name(),
            material.cb_index()
        );
        self.by_name.insert(material.name().to_owned(), index);
        self.materials.push(material);
        Ok(index)
    }

    /// Looks up a material by name.
    pub fn get(&self, name: &str) -> ResourceResult<&Material> {
        self.by_name
            .get(name)
            .map(|&index| &self.materials[index])
            .ok_or_else(|| ResourceError::UnknownMaterial(name.to_owned()))
    }

    /// Looks up a material by name for modification.
    pub fn get_mut(&mut self, name: &str) -> ResourceResult<&mut Material> {
        match self.by_name.get(name) {
            Some(&index) => Ok(&mut self.materials[index]),
            None => Err(ResourceError::UnknownMaterial(name.to_owned())),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Material> {
        self.materials.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}
