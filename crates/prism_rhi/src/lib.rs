//! # Prism RHI
//!
//! A render hardware interface: a backend-agnostic layer for recording and
//! submitting GPU work without depending on the native graphics API.
//!
//! ## Features
//!
//! - **Frame lifecycle**: fenced frames-in-flight with per-slot
//!   synchronization objects and explicit begin/submit tokens
//! - **Command recording**: pooled command lists with a checked
//!   begin/end state machine
//! - **Resources**: buffers and textures with usage-driven memory
//!   placement and a staging upload path
//! - **Backends**: Vulkan (via `ash`) and a headless backend for tests
//!   and CI
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use prism_rhi::prelude::*;
//!
//! fn main() -> RhiResult<()> {
//!     let settings = RhiSettings::default();
//!     let mut rhi = create_rhi(&RhiCreateInfo {
//!         backend: RhiBackendType::Headless,
//!         window: None,
//!         settings,
//!     })?;
//!
//!     let frame = rhi.begin_frame(&FrameBeginInfo::default())?;
//!     // record command lists against frame.current_slot() ...
//!     rhi.submit_frame(frame)?;
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod backends;
pub mod config;
pub mod rhi;

/// Commonly used types for downstream code
pub mod prelude {
    pub use crate::config::{Config, RhiSettings};
    pub use crate::rhi::{
        create_rhi, AttachmentLoadOp, AttachmentSource, AttachmentStoreOp, BufferType, CullMode,
        DynamicRhi, Format, Frame, FrameBeginInfo, ImageLayout, Offset2D, Rect2D, RhiBackendType,
        RhiBuffer, RhiBufferCreateInfo, RhiCommandList, RhiCommandQueue, RhiCreateInfo, RhiError,
        RhiFramebuffer, RhiFramebufferCreateInfo, RhiPipeline, RhiPipelineCreateInfo,
        RhiRenderPass, RhiRenderPassCreateInfo, RhiResult, RhiSwapchain, RhiTexture,
        RhiTextureCreateInfo, RhiWindow, ShaderStage, Size2D, Viewport,
    };
}
