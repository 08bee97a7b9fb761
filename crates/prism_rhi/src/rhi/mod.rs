//! Backend-agnostic RHI layer
//!
//! Traits for the objects a rendering backend must provide, the shared
//! frame/recording state machines, and the error taxonomy. Backends live
//! under [`crate::backends`] and are reached through the factory in
//! [`dynamic_rhi`].

use thiserror::Error;

pub mod buffer;
pub mod command_list;
pub mod command_queue;
pub mod definitions;
pub mod deletion_queue;
pub mod dynamic_rhi;
pub mod frame;
pub mod pipeline;
pub mod render_pass;
pub mod swapchain;
pub mod texture;
pub mod window;

pub use buffer::{RhiBuffer, RhiBufferCreateInfo};
pub use command_list::{RecordState, RhiCommandList};
pub use command_queue::RhiCommandQueue;
pub use definitions::{
    AttachmentLoadOp, AttachmentStoreOp, BufferType, BufferUsageFlags, CommandQueueType, CullMode,
    Format, ImageLayout, Offset2D, PrimitiveTopology, Rect2D, RhiBackendType, ShaderStage, Size2D,
    Size3D, VertexInputRate, Viewport,
};
pub use deletion_queue::{DeletionQueue, RetiredResource};
pub use dynamic_rhi::{create_rhi, DynamicRhi, RhiCreateInfo};
pub use frame::{Frame, FrameBeginInfo, FrameCycle};
pub use pipeline::{
    AttachmentBlendState, RhiPipeline, RhiPipelineCreateInfo, ShaderStageCreateInfo,
    VertexInputAttribute, VertexInputBinding,
};
pub use render_pass::{
    AttachmentSource, ColorAttachmentDescription, DepthAttachmentDescription,
    FramebufferAttachment, RhiFramebuffer, RhiFramebufferCreateInfo, RhiRenderPass,
    RhiRenderPassCreateInfo,
};
pub use swapchain::RhiSwapchain;
pub use texture::{RhiTexture, RhiTextureCreateInfo};
pub use window::RhiWindow;

/// Errors produced by RHI operations.
///
/// Every variant is unrecoverable for the operation in progress; there is no
/// retry logic in this layer. Frame-loop conditions an application may want
/// to react to (swapchain invalidation, surface loss) get their own variants
/// so the policy decision stays above the RHI.
#[derive(Error, Debug)]
pub enum RhiError {
    /// An operation was invoked in a state that forbids it
    #[error("invalid state: {reason}")]
    InvalidState { reason: String },

    /// An index exceeded a bounded pool
    #[error("index {index} out of range for pool of size {size}")]
    OutOfRange { index: usize, size: usize },

    /// An enum value has no mapping to the active backend
    #[error("unsupported {what}: {value}")]
    UnsupportedValue { what: &'static str, value: String },

    /// A native API call returned a failure code
    #[error("{backend} backend failed during {operation}: {code}")]
    Backend {
        backend: &'static str,
        operation: &'static str,
        code: String,
    },

    /// The requested backend cannot run here; raised at factory time
    #[error("{backend} backend unavailable: {reason}")]
    UnsupportedPlatform {
        backend: &'static str,
        reason: String,
    },

    /// The surface was resized or invalidated; the swapchain must be rebuilt
    #[error("swapchain is out of date")]
    SwapchainOutOfDate,

    /// The presentation surface is gone
    #[error("presentation surface was lost")]
    SurfaceLost,
}

impl RhiError {
    /// Shorthand for [`RhiError::InvalidState`]
    pub fn invalid_state(reason: impl Into<String>) -> Self {
        Self::InvalidState {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`RhiError::Backend`]
    pub fn backend(
        backend: &'static str,
        operation: &'static str,
        code: impl std::fmt::Debug,
    ) -> Self {
        Self::Backend {
            backend,
            operation,
            code: format!("{code:?}"),
        }
    }
}

/// Result type for RHI operations
pub type RhiResult<T> = Result<T, RhiError>;
