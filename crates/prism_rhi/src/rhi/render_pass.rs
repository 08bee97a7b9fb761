//! Render passes and framebuffers
//!
//! A render pass describes attachment load/store behavior; executing one
//! wraps caller-recorded draws between the backend's begin/end target
//! transitions. The closure shape makes an unbalanced begin/end impossible
//! to express.

use crate::backends::headless::{HeadlessFramebuffer, HeadlessRenderPass};
use crate::backends::vulkan::{VulkanFramebuffer, VulkanRenderPass};
use crate::rhi::{
    AttachmentLoadOp, AttachmentStoreOp, Format, ImageLayout, Rect2D, RhiCommandList, RhiResult,
    RhiTexture, Size2D,
};

/// Load/store and clear configuration for one color attachment
pub struct ColorAttachmentDescription {
    pub format: Format,
    pub final_layout: ImageLayout,
    pub load_op: AttachmentLoadOp,
    pub store_op: AttachmentStoreOp,
    /// RGBA clear color applied when `load_op` is `Clear`
    pub clear_value: [f32; 4],
}

impl Default for ColorAttachmentDescription {
    fn default() -> Self {
        Self {
            format: Format::B8G8R8A8Unorm,
            final_layout: ImageLayout::PresentSrc,
            load_op: AttachmentLoadOp::Clear,
            store_op: AttachmentStoreOp::Store,
            clear_value: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

/// Clear configuration for the depth attachment
pub struct DepthAttachmentDescription {
    pub format: Format,
    pub final_layout: ImageLayout,
    pub depth_clear_value: f32,
    pub stencil_clear_value: u32,
}

impl Default for DepthAttachmentDescription {
    fn default() -> Self {
        Self {
            format: Format::D32Sfloat,
            final_layout: ImageLayout::DepthAttachmentOptimal,
            depth_clear_value: 1.0,
            stencil_clear_value: 0,
        }
    }
}

/// Configuration for render pass creation
pub struct RhiRenderPassCreateInfo<'a> {
    pub color_attachments: Vec<ColorAttachmentDescription>,
    pub depth_attachment: Option<DepthAttachmentDescription>,
    pub render_area: Rect2D,
    pub debug_name: &'a str,
}

/// Where a framebuffer attachment's image view comes from
pub enum AttachmentSource<'a> {
    /// Swapchain image `i` backs framebuffer `i` of the set
    Swapchain,
    /// A single texture shared by every framebuffer of the set
    Texture(&'a dyn RhiTexture),
}

/// One attachment slot of a framebuffer set
pub struct FramebufferAttachment<'a> {
    pub source: AttachmentSource<'a>,
    /// Position within the render pass's attachment list
    pub attachment_index: u32,
}

/// Configuration for framebuffer-set creation
pub struct RhiFramebufferCreateInfo<'a> {
    /// Number of framebuffers in the set, usually the swapchain image count
    pub count: u32,
    pub render_pass: &'a dyn RhiRenderPass,
    pub extent: Size2D,
    pub attachments: Vec<FramebufferAttachment<'a>>,
    /// Name attached to the native objects for debugging tools
    pub debug_name: &'a str,
}

/// A set of logical render target bindings, one per swapchain image
pub trait RhiFramebuffer {
    /// Number of framebuffers in the set
    fn count(&self) -> u32;

    fn extent(&self) -> Size2D;

    /// Capability accessor for the Vulkan backend
    fn as_vulkan(&self) -> Option<&VulkanFramebuffer> {
        None
    }

    /// Capability accessor for the headless backend
    fn as_headless(&self) -> Option<&HeadlessFramebuffer> {
        None
    }
}

/// Attachment load/store orchestration around a block of draws
pub trait RhiRenderPass {
    /// Record begin-target transitions (clears per load op, target binding)
    /// on `command_list`, invoke `body` exactly once, then record the
    /// end-target transitions into each attachment's final layout.
    ///
    /// `image_index` selects the framebuffer within the set; indexing past
    /// the set is an `OutOfRange` error. The command list must already be
    /// recording.
    fn execute(
        &self,
        command_list: &mut dyn RhiCommandList,
        framebuffer: &dyn RhiFramebuffer,
        image_index: u32,
        body: &mut dyn FnMut(&mut dyn RhiCommandList) -> RhiResult<()>,
    ) -> RhiResult<()>;

    fn render_area(&self) -> Rect2D;

    /// Whether the pass was created with a depth attachment
    fn has_depth_attachment(&self) -> bool;

    /// Capability accessor for the Vulkan backend
    fn as_vulkan(&self) -> Option<&VulkanRenderPass> {
        None
    }

    /// Capability accessor for the headless backend
    fn as_headless(&self) -> Option<&HeadlessRenderPass> {
        None
    }
}
