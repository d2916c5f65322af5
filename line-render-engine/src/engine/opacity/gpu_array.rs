use bevy::render::{
    render_resource::{
        BindingResource, Buffer, BufferDescriptor, BufferInitDescriptor, BufferUsages,
    },
    renderer::RenderDevice,
};
use bytemuck::Pod;

/// Element type stored in a [`GpuArray`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    F32,
    U32,
    /// f32 opacity stored as raw bits so `atomicMin` can gather it.
    AlphaBits,
    /// Three packed f32, read as a flat `array<f32>` in WGSL.
    Position,
    LowResLink,
    FragmentLink,
    FourierCoefficients,
}

impl ElementKind {
    pub const fn size(self) -> u64 {
        match self {
            ElementKind::F32 | ElementKind::U32 | ElementKind::AlphaBits => 4,
            ElementKind::Position => 12,
            ElementKind::LowResLink | ElementKind::FragmentLink => 16,
            ElementKind::FourierCoefficients => 32,
        }
    }

    /// Kinds whose elements a shader may read as plain `f32`.
    pub const fn reads_as_f32(self) -> bool {
        matches!(self, ElementKind::F32 | ElementKind::AlphaBits)
    }

    pub const fn byte_len(self, len: u32) -> u64 {
        self.size() * len as u64
    }
}

/// A GPU buffer tagged with its element type and length.
///
/// Empty arrays still allocate one element; a zero-sized storage binding is
/// rejected by the device.
#[derive(Clone)]
pub struct GpuArray {
    pub buffer: Buffer,
    pub kind: ElementKind,
    pub len: u32,
}

impl GpuArray {
    pub fn with_data<T: Pod>(
        render_device: &RenderDevice,
        label: &str,
        kind: ElementKind,
        data: &[T],
        usage: BufferUsages,
    ) -> Self {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        let len = (bytes.len() as u64 / kind.size()) as u32;
        debug_assert_eq!(kind.byte_len(len), bytes.len() as u64);

        let buffer = if bytes.is_empty() {
            render_device.create_buffer(&BufferDescriptor {
                label: Some(label),
                size: kind.size(),
                usage,
                mapped_at_creation: false,
            })
        } else {
            render_device.create_buffer_with_data(&BufferInitDescriptor {
                label: Some(label),
                contents: bytes,
                usage,
            })
        };

        Self { buffer, kind, len }
    }

    pub fn zeroed(
        render_device: &RenderDevice,
        label: &str,
        kind: ElementKind,
        len: u32,
        usage: BufferUsages,
    ) -> Self {
        let buffer = render_device.create_buffer(&BufferDescriptor {
            label: Some(label),
            size: kind.byte_len(len.max(1)),
            usage,
            mapped_at_creation: false,
        });

        Self { buffer, kind, len }
    }

    /// Views an opacity array as `f32`. Alpha bits are `f32::to_bits`, so the
    /// smoothing kernel can write them as floats.
    pub fn as_f32(&self) -> Self {
        debug_assert!(self.kind.reads_as_f32(), "{:?} is not f32 data", self.kind);
        Self {
            buffer: self.buffer.clone(),
            kind: ElementKind::F32,
            len: self.len,
        }
    }

    pub fn byte_len(&self) -> u64 {
        self.kind.byte_len(self.len)
    }

    pub fn binding(&self) -> BindingResource<'_> {
        self.buffer.as_entire_binding()
    }
}
