//! Vertex format for dynamically updated meshes.
//!
//! The wave surface is re-uploaded every frame as an array of [`Vertex`].
//! [`Vertex::ATTRIBUTES`] describes the layout for whoever builds the input
//! layout of the pipeline state object.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

/// Component format of one vertex attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VertexFormat {
    /// Two 32-bit floats.
    Float32x2,
    /// Three 32-bit floats.
    Float32x3,
}

impl VertexFormat {
    /// Size in bytes.
    pub const fn size(self) -> u32 {
        match self {
            VertexFormat::Float32x2 => 8,
            VertexFormat::Float32x3 => 12,
        }
    }
}

/// One entry of an input layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Shader semantic name.
    pub semantic: &'static str,
    /// Component format.
    pub format: VertexFormat,
    /// Byte offset within the vertex.
    pub offset: u32,
}

/// Vertex with position, normal, texture coordinate and tangent.
///
/// # Memory Layout
///
/// - Offset 0: position (12 bytes)
/// - Offset 12: normal (12 bytes)
/// - Offset 24: tex_coord (8 bytes)
/// - Offset 32: tangent_u (12 bytes)
/// - Total size: 44 bytes
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Position in object space.
    pub position: Vec3,
    /// Unit surface normal.
    pub normal: Vec3,
    /// Texture coordinates (UV).
    pub tex_coord: Vec2,
    /// Unit tangent along increasing U.
    pub tangent_u: Vec3,
}

impl Vertex {
    /// Size of one vertex in bytes.
    pub const STRIDE: u32 = size_of::<Self>() as u32;

    /// Input layout matching the field order.
    pub const ATTRIBUTES: [VertexAttribute; 4] = [
        VertexAttribute {
            semantic: "POSITION",
            format: VertexFormat::Float32x3,
            offset: 0,
        },
        VertexAttribute {
            semantic: "NORMAL",
            format: VertexFormat::Float32x3,
            offset: 12,
        },
        VertexAttribute {
            semantic: "TEXCOORD",
            format: VertexFormat::Float32x2,
            offset: 24,
        },
        VertexAttribute {
            semantic: "TANGENT",
            format: VertexFormat::Float32x3,
            offset: 32,
        },
    ];

    /// Creates a new vertex.
    #[inline]
    pub const fn new(position: Vec3, normal: Vec3, tex_coord: Vec2, tangent_u: Vec3) -> Self {
        Self {
            position,
            normal,
            tex_coord,
            tangent_u,
        }
    }
}
