//! Render items: one drawable instance with its per-object constants.

use glam::Mat4;

use crate::dirty::DirtyCounter;
use crate::ubo::ObjectConstants;

/// Parameters of the indexed draw for a render item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawArgs {
    pub index_count: u32,
    pub start_index: u32,
    pub base_vertex: i32,
}

/// A drawable instance.
#[derive(Debug, Clone)]
pub struct RenderItem {
    world: Mat4,
    tex_transform: Mat4,
    /// Slot in the object constant buffer.
    obj_cb_index: usize,
    /// Material constant buffer slot this item samples.
    material_index: u32,
    /// Draw parameters into the shared geometry buffers.
    pub draw: DrawArgs,
    dirty: DirtyCounter,
}

impl RenderItem {
    /// Creates an item at the origin, dirty in every frame slot.
    pub fn new(obj_cb_index: usize, material_index: u32, frames_in_flight: usize) -> Self {
        Self {
            world: Mat4::IDENTITY,
            tex_transform: Mat4::IDENTITY,
            obj_cb_index,
            material_index,
            draw: DrawArgs::default(),
            dirty: DirtyCounter::new(frames_in_flight),
        }
    }

    /// Builder: initial world transform.
    pub fn with_world(mut self, world: Mat4) -> Self {
        self.world = world;
        self
    }

    /// Builder: initial texture transform.
    pub fn with_tex_transform(mut self, tex_transform: Mat4) -> Self {
        self.tex_transform = tex_transform;
        self
    }

    /// Builder: draw parameters.
    pub fn with_draw(mut self, draw: DrawArgs) -> Self {
        self.draw = draw;
        self
    }

    #[inline]
    pub fn world(&self) -> Mat4 {
        self.world
    }

    #[inline]
    pub fn obj_cb_index(&self) -> usize {
        self.obj_cb_index
    }

    #[inline]
    pub fn material_index(&self) -> u32 {
        self.material_index
    }

    /// Moves the item; the new transform must reach every frame slot.
    pub fn set_world(&mut self, world: Mat4) {
        self.world = world;
        self.dirty.mark_dirty();
    }

    pub fn set_tex_transform(&mut self, tex_transform: Mat4) {
        self.tex_transform = tex_transform;
        self.dirty.mark_dirty();
    }

    pub fn set_material_index(&mut self, material_index: u32) {
        self.material_index = material_index;
        self.dirty.mark_dirty();
    }

    pub fn dirty(&self) -> &DirtyCounter {
        &self.dirty
    }

    pub fn dirty_mut(&mut self) -> &mut DirtyCounter {
        &mut self.dirty
    }

    /// Shader-visible representation.
    pub fn constants(&self) -> ObjectConstants {
        ObjectConstants::new(self.world, self.tex_transform, self.material_index)
    }
}
