//! Graphics pipelines
//!
//! A pipeline couples precompiled shader bytecode with fixed-function state.
//! The RHI never compiles shaders; callers hand it `.spv`-style blobs from
//! whatever toolchain produced them.

use crate::backends::headless::HeadlessPipeline;
use crate::backends::vulkan::VulkanPipeline;
use crate::rhi::{
    CullMode, Format, RhiCommandList, RhiRenderPass, RhiResult, ShaderStage, VertexInputRate,
};

/// One shader stage of a pipeline
pub struct ShaderStageCreateInfo<'a> {
    pub stage: ShaderStage,
    /// Precompiled bytecode (SPIR-V for the Vulkan backend)
    pub bytecode: &'a [u8],
    pub entry_point: &'a str,
}

/// Describes one vertex attribute within a binding
#[derive(Debug, Clone, Copy)]
pub struct VertexInputAttribute {
    pub location: u32,
    pub binding: u32,
    pub format: Format,
    pub offset: u32,
}

/// Describes one vertex buffer binding slot
#[derive(Debug, Clone, Copy)]
pub struct VertexInputBinding {
    pub binding: u32,
    pub stride: u32,
    pub input_rate: VertexInputRate,
}

/// Blend configuration for one color attachment
#[derive(Debug, Clone, Copy)]
pub struct AttachmentBlendState {
    pub blend_enable: bool,
}

impl AttachmentBlendState {
    /// Opaque write, no blending
    pub fn disabled() -> Self {
        Self {
            blend_enable: false,
        }
    }
}

/// Configuration for pipeline creation
pub struct RhiPipelineCreateInfo<'a> {
    pub shader_stages: Vec<ShaderStageCreateInfo<'a>>,
    pub cull_mode: CullMode,
    pub vertex_attributes: Vec<VertexInputAttribute>,
    pub vertex_bindings: Vec<VertexInputBinding>,
    pub blend_states: Vec<AttachmentBlendState>,
    /// Render pass this pipeline will draw inside
    pub render_pass: &'a dyn RhiRenderPass,
    /// Name attached to the native object for debugging tools
    pub debug_name: &'a str,
}

/// Compiled shader stages plus fixed-function state
pub trait RhiPipeline {
    /// Bind the pipeline on a recording command list
    fn bind(&self, command_list: &mut dyn RhiCommandList) -> RhiResult<()>;

    /// Capability accessor for the Vulkan backend
    fn as_vulkan(&self) -> Option<&VulkanPipeline> {
        None
    }

    /// Capability accessor for the headless backend
    fn as_headless(&self) -> Option<&HeadlessPipeline> {
        None
    }
}
