//! GPU texture resources

use crate::backends::headless::HeadlessTexture;
use crate::backends::vulkan::VulkanTexture;
use crate::rhi::{Format, Size2D};

/// Configuration for texture creation
pub struct RhiTextureCreateInfo<'a> {
    pub size: Size2D,
    pub format: Format,
    /// Whether shaders will sample the texture (color formats only)
    pub sampled: bool,
    /// Name attached to the native object for debugging tools
    pub debug_name: &'a str,
}

/// Device-local image usable as a render-pass attachment
pub trait RhiTexture {
    fn size(&self) -> Size2D;

    fn format(&self) -> Format;

    /// Capability accessor for the Vulkan backend
    fn as_vulkan(&self) -> Option<&VulkanTexture> {
        None
    }

    /// Capability accessor for the headless backend
    fn as_headless(&self) -> Option<&HeadlessTexture> {
        None
    }
}
