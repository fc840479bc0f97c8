//! CPU-visible upload buffers.
//!
//! An [`UploadBuffer`] is a typed array living in memory the CPU writes and the
//! GPU reads directly (an upload heap). Each frame slot owns its own buffers, so
//! writing into one never races with the GPU reading another.
//!
//! # Overview
//!
//! - [`BufferUsage`] decides the element stride
//! - Constant buffers round each element up to
//!   [`CONSTANT_BUFFER_ALIGNMENT`] bytes, as required for constant buffer views
//! - Vertex buffers are tightly packed
//!
//! # Example
//!
//! ```
//! use waveframe_rhi::buffer::{BufferUsage, UploadBuffer};
//!
//! # fn example() -> Result<(), waveframe_rhi::RhiError> {
//! let mut buffer = UploadBuffer::<[f32; 4]>::new("tint", BufferUsage::Constant, 2)?;
//! buffer.copy_data(1, &[1.0, 0.5, 0.25, 1.0])?;
//!
//! assert_eq!(buffer.stride(), 256);
//! assert_eq!(buffer.read(1)?, [1.0, 0.5, 0.25, 1.0]);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use std::marker::PhantomData;

use bytemuck::Pod;
use tracing::debug;

use crate::error::{RhiError, RhiResult};

/// Required alignment of each constant buffer element, in bytes.
pub const CONSTANT_BUFFER_ALIGNMENT: usize = 256;

/// Rounds `byte_size` up to the next multiple of [`CONSTANT_BUFFER_ALIGNMENT`].
#[inline]
pub const fn constant_buffer_byte_size(byte_size: usize) -> usize {
    (byte_size + CONSTANT_BUFFER_ALIGNMENT - 1) & !(CONSTANT_BUFFER_ALIGNMENT - 1)
}

/// Buffer usage type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferUsage {
    /// Constant (uniform) data, one 256-byte aligned element per view.
    Constant,
    /// Dynamic vertex data rewritten every frame.
    Vertex,
    /// Structured data read as an array by shaders (tight stride).
    Structured,
}

impl BufferUsage {
    /// Element stride for a type of `element_size` bytes.
    pub const fn stride(self, element_size: usize) -> usize {
        match self {
            BufferUsage::Constant => constant_buffer_byte_size(element_size),
            BufferUsage::Vertex | BufferUsage::Structured => element_size,
        }
    }

    /// Returns a human-readable name for the buffer type.
    pub fn name(self) -> &'static str {
        match self {
            BufferUsage::Constant => "constant",
            BufferUsage::Vertex => "vertex",
            BufferUsage::Structured => "structured",
        }
    }
}

/// Typed CPU-visible buffer of `len` elements.
#[derive(Debug)]
pub struct UploadBuffer<T> {
    name: String,
    usage: BufferUsage,
    data: Vec<u8>,
    stride: usize,
    len: usize,
    _marker: PhantomData<T>,
}

impl<T: Pod> UploadBuffer<T> {
    /// Creates a zero-filled buffer.
    ///
    /// # Errors
    ///
    /// Returns [`RhiError::InvalidConfig`] for zero-sized element types.
    pub fn new(name: impl Into<String>, usage: BufferUsage, len: usize) -> RhiResult<Self> {
        let name = name.into();
        let element_size = size_of::<T>();
        if element_size == 0 {
            return Err(RhiError::InvalidConfig(format!(
                "buffer '{name}' has a zero-sized element type"
            )));
        }
        let stride = usage.stride(element_size);
        debug!(
            "Created {} buffer '{}': {} x {} bytes",
            usage.name(),
            name,
            len,
            stride
        );
        Ok(Self {
            name,
            usage,
            data: vec![0; stride * len],
            stride,
            len,
            _marker: PhantomData,
        })
    }

    fn range(&self, index: usize) -> RhiResult<std::ops::Range<usize>> {
        if index >= self.len {
            return Err(RhiError::OutOfRange {
                name: self.name.clone(),
                index,
                len: self.len,
            });
        }
        let start = index * self.stride;
        Ok(start..start + size_of::<T>())
    }

    /// Writes one element.
    ///
    /// # Errors
    ///
    /// Returns [`RhiError::OutOfRange`] if `index >= len`.
    pub fn copy_data(&mut self, index: usize, value: &T) -> RhiResult<()> {
        let range = self.range(index)?;
        self.data[range].copy_from_slice(bytemuck::bytes_of(value));
        Ok(())
    }

    /// Writes consecutive elements starting at `first`.
    ///
    /// # Errors
    ///
    /// Returns [`RhiError::OutOfRange`] if the slice runs past the end; nothing
    /// is written in that case.
    pub fn copy_slice(&mut self, first: usize, values: &[T]) -> RhiResult<()> {
        if values.is_empty() {
            return Ok(());
        }
        self.range(first + values.len() - 1)?;
        if self.stride == size_of::<T>() {
            let start = first * self.stride;
            let bytes: &[u8] = bytemuck::cast_slice(values);
            self.data[start..start + bytes.len()].copy_from_slice(bytes);
        } else {
            for (offset, value) in values.iter().enumerate() {
                self.copy_data(first + offset, value)?;
            }
        }
        Ok(())
    }

    /// Reads one element back (what the GPU would see).
    pub fn read(&self, index: usize) -> RhiResult<T> {
        let range = self.range(index)?;
        Ok(bytemuck::pod_read_unaligned(&self.data[range]))
    }

    /// Byte offset of element `index` from the start of the buffer.
    #[inline]
    pub fn element_offset(&self, index: usize) -> usize {
        index * self.stride
    }

    /// Raw contents.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Debug name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Usage the stride was derived from.
    #[inline]
    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    /// Element stride in bytes.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the buffer holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total size in bytes.
    #[inline]
    pub fn byte_size(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_buffer_byte_size() {
        assert_eq!(constant_buffer_byte_size(1), 256);
        assert_eq!(constant_buffer_byte_size(256), 256);
        assert_eq!(constant_buffer_byte_size(257), 512);
        assert_eq!(constant_buffer_byte_size(1216), 1280);
    }

    #[test]
    fn test_vertex_buffer_is_tightly_packed() {
        let buffer = UploadBuffer::<[f32; 3]>::new("positions", BufferUsage::Vertex, 4).unwrap();
        assert_eq!(buffer.stride(), 12);
        assert_eq!(buffer.byte_size(), 48);
        assert_eq!(buffer.element_offset(2), 24);
    }

    #[test]
    fn test_copy_and_read_constant_element() {
        let mut buffer = UploadBuffer::<u32>::new("ids", BufferUsage::Constant, 3).unwrap();
        buffer.copy_data(2, &42).unwrap();
        assert_eq!(buffer.read(2).unwrap(), 42);
        assert_eq!(buffer.read(0).unwrap(), 0);
        assert_eq!(buffer.as_bytes()[512], 42);
    }

    #[test]
    fn test_out_of_range_write_is_rejected() {
        let mut buffer = UploadBuffer::<u32>::new("ids", BufferUsage::Constant, 1).unwrap();
        let err = buffer.copy_data(1, &7).unwrap_err();
        assert!(matches!(err, RhiError::OutOfRange { index: 1, len: 1, .. }));
    }

    #[test]
    fn test_copy_slice_packed_and_strided() {
        let mut packed = UploadBuffer::<u32>::new("packed", BufferUsage::Vertex, 4).unwrap();
        packed.copy_slice(1, &[5, 6, 7]).unwrap();
        assert_eq!(packed.read(3).unwrap(), 7);

        let mut strided = UploadBuffer::<u32>::new("strided", BufferUsage::Constant, 2).unwrap();
        strided.copy_slice(0, &[8, 9]).unwrap();
        assert_eq!(strided.read(1).unwrap(), 9);
    }

    #[test]
    fn test_copy_slice_overflow_writes_nothing() {
        let mut buffer = UploadBuffer::<u32>::new("packed", BufferUsage::Vertex, 2).unwrap();
        assert!(buffer.copy_slice(1, &[1, 2]).is_err());
        assert_eq!(buffer.read(1).unwrap(), 0);
    }

    #[test]
    fn test_empty_buffer() {
        let buffer = UploadBuffer::<u32>::new("none", BufferUsage::Vertex, 0).unwrap();
        assert!(buffer.is_empty());
        assert!(buffer.read(0).is_err());
    }
}
