//! Presentable image set and its derived state
//!
//! Acquire and present are backend-internal: the facade drives them from
//! `begin_frame`/`submit_frame` with the backend's own synchronization
//! primitives, so they never appear on this trait.

use crate::backends::headless::HeadlessSwapchain;
use crate::backends::vulkan::VulkanSwapchain;
use crate::rhi::{Format, Rect2D, RhiCommandList, RhiResult, Size2D, Viewport};

/// The images a windowing system cycles through for presentation.
///
/// All accessors return state derived once at creation; there is no runtime
/// resize handling.
pub trait RhiSwapchain {
    fn size(&self) -> Size2D;

    fn format(&self) -> Format;

    /// Cached full-surface viewport (Y-flipped on Vulkan)
    fn viewport(&self) -> Viewport;

    /// Cached full-surface scissor rectangle
    fn scissor(&self) -> Rect2D;

    fn aspect_ratio(&self) -> f32 {
        self.size().aspect_ratio()
    }

    /// Number of presentable images
    fn image_count(&self) -> u32;

    /// Record the cached viewport and scissor onto a command list
    fn set_viewport_scissor(&self, command_list: &mut dyn RhiCommandList) -> RhiResult<()> {
        command_list.set_viewport(self.viewport())?;
        command_list.set_scissor(self.scissor())
    }

    /// Capability accessor for the Vulkan backend
    fn as_vulkan(&self) -> Option<&VulkanSwapchain> {
        None
    }

    /// Capability accessor for the headless backend
    fn as_headless(&self) -> Option<&HeadlessSwapchain> {
        None
    }
}
