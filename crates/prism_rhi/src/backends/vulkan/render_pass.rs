//! Render passes and framebuffer sets

use ash::{vk, Device};

use crate::backends::vulkan::{
    to_vk_layout, to_vk_load_op, to_vk_rect, to_vk_store_op, BACKEND,
};
use crate::rhi::{
    AttachmentSource, Rect2D, RhiCommandList, RhiError, RhiFramebuffer, RhiFramebufferCreateInfo,
    RhiRenderPass, RhiRenderPassCreateInfo, RhiResult, Size2D,
};

/// Render pass wrapper with RAII cleanup.
///
/// Keeps the clear values and render area from creation so `execute` can
/// record a complete begin-info without caller involvement.
pub struct VulkanRenderPass {
    device: Device,
    render_pass: vk::RenderPass,
    render_area: Rect2D,
    clear_values: Vec<vk::ClearValue>,
    color_attachment_count: u32,
    has_depth: bool,
}

impl VulkanRenderPass {
    pub fn new(device: Device, info: &RhiRenderPassCreateInfo) -> RhiResult<Self> {
        let mut attachments = Vec::new();
        let mut clear_values = Vec::new();
        let mut color_refs = Vec::new();

        for color in &info.color_attachments {
            color_refs.push(
                vk::AttachmentReference::builder()
                    .attachment(attachments.len() as u32)
                    .layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL)
                    .build(),
            );
            attachments.push(
                vk::AttachmentDescription::builder()
                    .format(super::to_vk_format(color.format))
                    .samples(vk::SampleCountFlags::TYPE_1)
                    .load_op(to_vk_load_op(color.load_op))
                    .store_op(to_vk_store_op(color.store_op))
                    .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
                    .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
                    .initial_layout(vk::ImageLayout::UNDEFINED)
                    .final_layout(to_vk_layout(color.final_layout))
                    .build(),
            );
            clear_values.push(vk::ClearValue {
                color: vk::ClearColorValue {
                    float32: color.clear_value,
                },
            });
        }

        let depth_ref = info.depth_attachment.as_ref().map(|depth| {
            let reference = vk::AttachmentReference::builder()
                .attachment(attachments.len() as u32)
                .layout(vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL)
                .build();
            attachments.push(
                vk::AttachmentDescription::builder()
                    .format(super::to_vk_format(depth.format))
                    .samples(vk::SampleCountFlags::TYPE_1)
                    .load_op(vk::AttachmentLoadOp::CLEAR)
                    .store_op(vk::AttachmentStoreOp::DONT_CARE)
                    .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
                    .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
                    .initial_layout(vk::ImageLayout::UNDEFINED)
                    .final_layout(to_vk_layout(depth.final_layout))
                    .build(),
            );
            clear_values.push(vk::ClearValue {
                depth_stencil: vk::ClearDepthStencilValue {
                    depth: depth.depth_clear_value,
                    stencil: depth.stencil_clear_value,
                },
            });
            reference
        });

        let mut subpass = vk::SubpassDescription::builder()
            .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
            .color_attachments(&color_refs);
        if let Some(depth_ref) = &depth_ref {
            subpass = subpass.depth_stencil_attachment(depth_ref);
        }
        let subpasses = [subpass.build()];

        let dependency = vk::SubpassDependency::builder()
            .src_subpass(vk::SUBPASS_EXTERNAL)
            .dst_subpass(0)
            .src_stage_mask(
                vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT
                    | vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS,
            )
            .src_access_mask(vk::AccessFlags::empty())
            .dst_stage_mask(
                vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT
                    | vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS,
            )
            .dst_access_mask(
                vk::AccessFlags::COLOR_ATTACHMENT_WRITE
                    | vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE,
            )
            .build();
        let dependencies = [dependency];

        let render_pass_create_info = vk::RenderPassCreateInfo::builder()
            .attachments(&attachments)
            .subpasses(&subpasses)
            .dependencies(&dependencies);

        let render_pass = unsafe { device.create_render_pass(&render_pass_create_info, None) }
            .map_err(|e| RhiError::backend(BACKEND, "vkCreateRenderPass", e))?;

        log::debug!(
            "created render pass '{}' ({} color, depth: {})",
            info.debug_name,
            info.color_attachments.len(),
            info.depth_attachment.is_some()
        );

        Ok(Self {
            device,
            render_pass,
            render_area: info.render_area,
            clear_values,
            color_attachment_count: info.color_attachments.len() as u32,
            has_depth: info.depth_attachment.is_some(),
        })
    }

    pub fn handle(&self) -> vk::RenderPass {
        self.render_pass
    }

    pub fn color_attachment_count(&self) -> u32 {
        self.color_attachment_count
    }
}

impl RhiRenderPass for VulkanRenderPass {
    fn execute(
        &self,
        command_list: &mut dyn RhiCommandList,
        framebuffer: &dyn RhiFramebuffer,
        image_index: u32,
        body: &mut dyn FnMut(&mut dyn RhiCommandList) -> RhiResult<()>,
    ) -> RhiResult<()> {
        let list = command_list.as_vulkan().ok_or_else(|| {
            RhiError::invalid_state("render pass execute: command list is not a Vulkan list")
        })?;
        list.record_state().require_recording("render pass execute")?;
        let framebuffer = framebuffer.as_vulkan().ok_or_else(|| {
            RhiError::invalid_state("render pass execute: framebuffer is not a Vulkan framebuffer")
        })?;
        let framebuffer_handle = framebuffer.vk_handle(image_index)?;
        let command_buffer = list.handle();

        let begin_info = vk::RenderPassBeginInfo::builder()
            .render_pass(self.render_pass)
            .framebuffer(framebuffer_handle)
            .render_area(to_vk_rect(self.render_area))
            .clear_values(&self.clear_values);

        unsafe {
            self.device.cmd_begin_render_pass(
                command_buffer,
                &begin_info,
                vk::SubpassContents::INLINE,
            );
        }

        body(command_list)?;

        unsafe {
            self.device.cmd_end_render_pass(command_buffer);
        }
        Ok(())
    }

    fn render_area(&self) -> Rect2D {
        self.render_area
    }

    fn has_depth_attachment(&self) -> bool {
        self.has_depth
    }

    fn as_vulkan(&self) -> Option<&VulkanRenderPass> {
        Some(self)
    }
}

impl Drop for VulkanRenderPass {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_render_pass(self.render_pass, None);
        }
    }
}

/// One native framebuffer per swapchain image, sharing non-swapchain
/// attachments
pub struct VulkanFramebuffer {
    device: Device,
    framebuffers: Vec<vk::Framebuffer>,
    extent: Size2D,
}

impl VulkanFramebuffer {
    pub fn new(
        device: Device,
        info: &RhiFramebufferCreateInfo,
        swapchain: &super::VulkanSwapchain,
    ) -> RhiResult<Self> {
        let render_pass = info.render_pass.as_vulkan().ok_or_else(|| {
            RhiError::invalid_state("framebuffer render pass is not a Vulkan render pass")
        })?;

        // Attachment slots in render-pass order
        let mut slots: Vec<_> = info.attachments.iter().collect();
        slots.sort_by_key(|attachment| attachment.attachment_index);

        let mut framebuffers = Vec::with_capacity(info.count as usize);
        for index in 0..info.count {
            let views: RhiResult<Vec<vk::ImageView>> = slots
                .iter()
                .map(|slot| match &slot.source {
                    AttachmentSource::Swapchain => swapchain.image_view(index),
                    AttachmentSource::Texture(texture) => texture
                        .as_vulkan()
                        .map(|texture| texture.image_view())
                        .ok_or_else(|| {
                            RhiError::invalid_state(
                                "framebuffer attachment texture is not a Vulkan texture",
                            )
                        }),
                })
                .collect();
            let views = views?;

            let framebuffer_create_info = vk::FramebufferCreateInfo::builder()
                .render_pass(render_pass.handle())
                .attachments(&views)
                .width(info.extent.width)
                .height(info.extent.height)
                .layers(1);

            let framebuffer =
                unsafe { device.create_framebuffer(&framebuffer_create_info, None) }
                    .map_err(|e| RhiError::backend(BACKEND, "vkCreateFramebuffer", e))?;
            framebuffers.push(framebuffer);
        }

        log::debug!(
            "created framebuffer set '{}' ({} framebuffers)",
            info.debug_name,
            info.count
        );

        Ok(Self {
            device,
            framebuffers,
            extent: info.extent,
        })
    }

    /// Native handle for framebuffer `index` of the set
    pub fn vk_handle(&self, index: u32) -> RhiResult<vk::Framebuffer> {
        self.framebuffers
            .get(index as usize)
            .copied()
            .ok_or(RhiError::OutOfRange {
                index: index as usize,
                size: self.framebuffers.len(),
            })
    }
}

impl RhiFramebuffer for VulkanFramebuffer {
    fn count(&self) -> u32 {
        self.framebuffers.len() as u32
    }

    fn extent(&self) -> Size2D {
        self.extent
    }

    fn as_vulkan(&self) -> Option<&VulkanFramebuffer> {
        Some(self)
    }
}

impl Drop for VulkanFramebuffer {
    fn drop(&mut self) {
        unsafe {
            for &framebuffer in &self.framebuffers {
                self.device.destroy_framebuffer(framebuffer, None);
            }
        }
    }
}
