//! Vulkan rendering backend
//!
//! RAII wrappers over `ash` implementing the RHI traits. Resource wrappers
//! hold a clone of the `ash::Device` so destruction order follows Rust drop
//! order instead of a manual teardown pass.

mod buffer;
mod commands;
mod context;
mod pipeline;
mod queue;
mod render_pass;
mod rhi;
mod surface;
mod swapchain;
mod sync;
mod texture;

pub use buffer::VulkanBuffer;
pub use commands::VulkanCommandList;
pub use context::{LogicalDevice, PhysicalDeviceInfo, VulkanInstance};
pub use pipeline::{VulkanPipeline, VulkanShaderModule};
pub use queue::VulkanCommandQueue;
pub use render_pass::{VulkanFramebuffer, VulkanRenderPass};
pub use rhi::VulkanRhi;
pub use surface::VulkanSurface;
pub use swapchain::VulkanSwapchain;
pub use sync::{Fence, FrameSync, Semaphore};
pub use texture::VulkanTexture;

use ash::vk;

use crate::rhi::{
    AttachmentLoadOp, AttachmentStoreOp, BufferType, CullMode, Format, ImageLayout, Rect2D,
    RhiError, RhiResult, ShaderStage, Size2D, VertexInputRate, Viewport,
};

pub(crate) const BACKEND: &str = "Vulkan";

pub(crate) fn to_vk_format(format: Format) -> vk::Format {
    match format {
        Format::B8G8R8A8Unorm => vk::Format::B8G8R8A8_UNORM,
        Format::R32G32B32A32Sfloat => vk::Format::R32G32B32A32_SFLOAT,
        Format::R32G32B32Sfloat => vk::Format::R32G32B32_SFLOAT,
        Format::R32G32Sfloat => vk::Format::R32G32_SFLOAT,
        Format::R32Sfloat => vk::Format::R32_SFLOAT,
        Format::D32Sfloat => vk::Format::D32_SFLOAT,
    }
}

/// Formats legal as vertex attribute inputs
pub(crate) fn to_vk_attribute_format(format: Format) -> RhiResult<vk::Format> {
    if format.is_depth() {
        return Err(RhiError::UnsupportedValue {
            what: "vertex attribute format",
            value: format!("{format:?}"),
        });
    }
    Ok(to_vk_format(format))
}

pub(crate) fn to_vk_layout(layout: ImageLayout) -> vk::ImageLayout {
    match layout {
        ImageLayout::Undefined => vk::ImageLayout::UNDEFINED,
        ImageLayout::ColorAttachmentOptimal => vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
        ImageLayout::DepthAttachmentOptimal => vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
        ImageLayout::PresentSrc => vk::ImageLayout::PRESENT_SRC_KHR,
    }
}

pub(crate) fn to_vk_load_op(op: AttachmentLoadOp) -> vk::AttachmentLoadOp {
    match op {
        AttachmentLoadOp::Clear => vk::AttachmentLoadOp::CLEAR,
        AttachmentLoadOp::Load => vk::AttachmentLoadOp::LOAD,
        AttachmentLoadOp::DontCare => vk::AttachmentLoadOp::DONT_CARE,
    }
}

pub(crate) fn to_vk_store_op(op: AttachmentStoreOp) -> vk::AttachmentStoreOp {
    match op {
        AttachmentStoreOp::Store => vk::AttachmentStoreOp::STORE,
        AttachmentStoreOp::DontCare => vk::AttachmentStoreOp::DONT_CARE,
    }
}

pub(crate) fn to_vk_cull_mode(mode: CullMode) -> vk::CullModeFlags {
    match mode {
        CullMode::None => vk::CullModeFlags::NONE,
        CullMode::Front => vk::CullModeFlags::FRONT,
        CullMode::Back => vk::CullModeFlags::BACK,
    }
}

pub(crate) fn to_vk_shader_stage(stage: ShaderStage) -> vk::ShaderStageFlags {
    match stage {
        ShaderStage::Vertex => vk::ShaderStageFlags::VERTEX,
        ShaderStage::Fragment => vk::ShaderStageFlags::FRAGMENT,
    }
}

pub(crate) fn to_vk_input_rate(rate: VertexInputRate) -> vk::VertexInputRate {
    match rate {
        VertexInputRate::Vertex => vk::VertexInputRate::VERTEX,
        VertexInputRate::Instance => vk::VertexInputRate::INSTANCE,
    }
}

pub(crate) fn to_vk_buffer_usage(buffer_type: BufferType) -> vk::BufferUsageFlags {
    match buffer_type {
        BufferType::Vertex => {
            vk::BufferUsageFlags::VERTEX_BUFFER | vk::BufferUsageFlags::TRANSFER_DST
        }
        BufferType::Index => {
            vk::BufferUsageFlags::INDEX_BUFFER | vk::BufferUsageFlags::TRANSFER_DST
        }
        BufferType::Uniform => vk::BufferUsageFlags::UNIFORM_BUFFER,
        BufferType::Storage => {
            vk::BufferUsageFlags::STORAGE_BUFFER | vk::BufferUsageFlags::TRANSFER_DST
        }
        BufferType::Staging => vk::BufferUsageFlags::TRANSFER_SRC,
    }
}

pub(crate) fn to_vk_memory_properties(buffer_type: BufferType) -> vk::MemoryPropertyFlags {
    if buffer_type.is_host_visible() {
        vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT
    } else {
        vk::MemoryPropertyFlags::DEVICE_LOCAL
    }
}

pub(crate) fn to_vk_viewport(viewport: Viewport) -> vk::Viewport {
    vk::Viewport {
        x: viewport.x,
        y: viewport.y,
        width: viewport.width,
        height: viewport.height,
        min_depth: viewport.min_depth,
        max_depth: viewport.max_depth,
    }
}

pub(crate) fn to_vk_rect(rect: Rect2D) -> vk::Rect2D {
    vk::Rect2D {
        offset: vk::Offset2D {
            x: rect.offset.x,
            y: rect.offset.y,
        },
        extent: vk::Extent2D {
            width: rect.size.width,
            height: rect.size.height,
        },
    }
}

pub(crate) fn to_rhi_size(extent: vk::Extent2D) -> Size2D {
    Size2D::new(extent.width, extent.height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_format_rejected_as_vertex_attribute() {
        assert!(to_vk_attribute_format(Format::R32G32B32Sfloat).is_ok());
        assert!(matches!(
            to_vk_attribute_format(Format::D32Sfloat).unwrap_err(),
            RhiError::UnsupportedValue { .. }
        ));
    }

    #[test]
    fn test_placement_follows_buffer_type() {
        assert_eq!(
            to_vk_memory_properties(BufferType::Vertex),
            vk::MemoryPropertyFlags::DEVICE_LOCAL
        );
        assert!(to_vk_memory_properties(BufferType::Staging)
            .contains(vk::MemoryPropertyFlags::HOST_VISIBLE));
    }
}
