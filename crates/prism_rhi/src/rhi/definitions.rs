//! Shared value types and enums used across every backend

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Two-dimensional extent in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Size2D {
    pub width: u32,
    pub height: u32,
}

impl Size2D {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height; zero-height extents yield 0.0
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            0.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// Three-dimensional extent in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Size3D {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

/// Signed two-dimensional offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Offset2D {
    pub x: i32,
    pub y: i32,
}

/// Axis-aligned rectangle (offset + extent)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect2D {
    pub offset: Offset2D,
    pub size: Size2D,
}

impl Rect2D {
    /// Rectangle anchored at the origin
    pub fn from_size(size: Size2D) -> Self {
        Self {
            offset: Offset2D::default(),
            size,
        }
    }
}

/// Viewport transform parameters
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

/// Which backend implements the RHI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RhiBackendType {
    Vulkan,
    D3d12,
    /// GPU-less backend for tests and driverless environments
    Headless,
}

impl RhiBackendType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Vulkan => "Vulkan",
            Self::D3d12 => "D3D12",
            Self::Headless => "Headless",
        }
    }
}

/// Queue categories; only graphics queues are implemented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandQueueType {
    Graphics,
    AsyncCompute,
}

/// Usage category of a buffer; immutable after creation.
///
/// The category determines memory placement: `Vertex` and `Index` buffers
/// live in device-local memory and must be filled through the staging path,
/// the rest are host-visible and writable with [`set_data`].
///
/// [`set_data`]: crate::rhi::RhiBuffer::set_data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferType {
    Vertex,
    Index,
    Uniform,
    Storage,
    Staging,
}

impl BufferType {
    /// Whether buffers of this type are mappable from the CPU
    pub fn is_host_visible(&self) -> bool {
        matches!(self, Self::Uniform | Self::Storage | Self::Staging)
    }

    pub fn usage_flags(&self) -> BufferUsageFlags {
        match self {
            Self::Vertex => BufferUsageFlags::VERTEX_BUFFER | BufferUsageFlags::TRANSFER_DST,
            Self::Index => BufferUsageFlags::INDEX_BUFFER | BufferUsageFlags::TRANSFER_DST,
            Self::Uniform => BufferUsageFlags::UNIFORM_BUFFER,
            Self::Storage => BufferUsageFlags::STORAGE_BUFFER | BufferUsageFlags::TRANSFER_DST,
            Self::Staging => BufferUsageFlags::TRANSFER_SRC,
        }
    }
}

bitflags! {
    /// Buffer usage bits; values match the Vulkan flag bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BufferUsageFlags: u32 {
        const TRANSFER_SRC   = 1;
        const TRANSFER_DST   = 1 << 1;
        const UNIFORM_BUFFER = 1 << 4;
        const STORAGE_BUFFER = 1 << 5;
        const INDEX_BUFFER   = 1 << 6;
        const VERTEX_BUFFER  = 1 << 7;
    }
}

/// Texel formats understood by the RHI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Format {
    /// Swapchain format
    B8G8R8A8Unorm,
    R32G32B32A32Sfloat,
    R32G32B32Sfloat,
    R32G32Sfloat,
    R32Sfloat,
    D32Sfloat,
}

impl Format {
    pub fn is_depth(&self) -> bool {
        matches!(self, Self::D32Sfloat)
    }
}

/// Image layouts an attachment can end a pass in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageLayout {
    Undefined,
    ColorAttachmentOptimal,
    DepthAttachmentOptimal,
    /// Ready for presentation; used by swapchain-backed attachments
    PresentSrc,
}

/// What happens to an attachment's contents at pass start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentLoadOp {
    /// Clear to the configured clear value
    Clear,
    /// Preserve prior contents
    Load,
    /// Contents are undefined; performance hint
    DontCare,
}

/// What happens to an attachment's contents at pass end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentStoreOp {
    Store,
    DontCare,
}

/// Triangle facing to discard during rasterization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullMode {
    None,
    Front,
    Back,
}

/// Programmable pipeline stages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

/// How a vertex binding steps through its buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexInputRate {
    Vertex,
    Instance,
}

/// Assembled primitive kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveTopology {
    TriangleList,
    TriangleStrip,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_aspect_ratio() {
        assert_relative_eq!(Size2D::new(1600, 900).aspect_ratio(), 16.0 / 9.0);
        assert_relative_eq!(Size2D::new(0, 0).aspect_ratio(), 0.0);
    }

    #[test]
    fn test_buffer_type_placement() {
        assert!(!BufferType::Vertex.is_host_visible());
        assert!(!BufferType::Index.is_host_visible());
        assert!(BufferType::Uniform.is_host_visible());
        assert!(BufferType::Storage.is_host_visible());
        assert!(BufferType::Staging.is_host_visible());
    }

    #[test]
    fn test_usage_flags_match_vulkan_bits() {
        assert_eq!(BufferUsageFlags::VERTEX_BUFFER.bits(), 128);
        assert_eq!(BufferUsageFlags::INDEX_BUFFER.bits(), 64);
        assert!(BufferType::Vertex
            .usage_flags()
            .contains(BufferUsageFlags::TRANSFER_DST));
        assert!(BufferType::Staging
            .usage_flags()
            .contains(BufferUsageFlags::TRANSFER_SRC));
    }
}
