//! Headless RHI facade
//!
//! Runs the exact same frame/deletion machinery as the Vulkan facade; the
//! fence and semaphore waits are no-ops because nothing executes
//! asynchronously.

use crate::backends::headless::{
    HeadlessBuffer, HeadlessCommandQueue, HeadlessFramebuffer, HeadlessPipeline,
    HeadlessRenderPass, HeadlessSwapchain, HeadlessTexture,
};
use crate::config::RhiSettings;
use crate::rhi::{
    AttachmentSource, DeletionQueue, DynamicRhi, Frame, FrameBeginInfo, RetiredResource,
    RhiBackendType, RhiBuffer, RhiBufferCreateInfo, RhiCommandQueue, RhiError, RhiFramebuffer,
    RhiFramebufferCreateInfo, RhiPipeline, RhiPipelineCreateInfo, RhiRenderPass,
    RhiRenderPassCreateInfo, RhiResult, RhiSwapchain, RhiTexture, RhiTextureCreateInfo,
};
use crate::rhi::frame::FrameCycle;

/// GPU-less [`DynamicRhi`] implementation
pub struct HeadlessRhi {
    cycle: FrameCycle,
    deletion_queue: DeletionQueue,
    frame_uses_swapchain: bool,
    queue: HeadlessCommandQueue,
    swapchain: HeadlessSwapchain,
}

impl HeadlessRhi {
    pub fn new(settings: &RhiSettings) -> Self {
        let frames_in_flight = settings.frames_in_flight.max(1);
        let image_count = settings.swapchain_images.max(1);
        log::info!(
            "Headless RHI initialized ({frames_in_flight} frames in flight, {image_count} swapchain images)"
        );
        Self {
            cycle: FrameCycle::new(frames_in_flight),
            deletion_queue: DeletionQueue::new(frames_in_flight),
            frame_uses_swapchain: true,
            queue: HeadlessCommandQueue::new(frames_in_flight),
            swapchain: HeadlessSwapchain::new(settings.headless_extent, image_count),
        }
    }

    /// The concrete swapchain, for test assertions on presentation history
    pub fn headless_swapchain(&self) -> &HeadlessSwapchain {
        &self.swapchain
    }
}

impl DynamicRhi for HeadlessRhi {
    fn backend_type(&self) -> RhiBackendType {
        RhiBackendType::Headless
    }

    fn wait_idle(&mut self) -> RhiResult<()> {
        self.deletion_queue.flush();
        Ok(())
    }

    fn begin_frame(&mut self, info: &FrameBeginInfo) -> RhiResult<Frame> {
        let slot = self.cycle.begin()?;
        // The fence wait is a no-op here; the retired-resource drain keeps
        // the same ordering as the Vulkan facade
        self.deletion_queue.collect(slot);
        self.frame_uses_swapchain = info.use_swapchain;
        let image_index = if info.use_swapchain {
            self.swapchain.acquire_next_image()
        } else {
            0
        };
        Ok(Frame::new(slot, image_index))
    }

    fn submit_frame(&mut self, frame: Frame) -> RhiResult<()> {
        self.queue.validate_for_submit(frame.command_lists())?;
        if self.frame_uses_swapchain {
            self.swapchain.present(frame.image_index());
        }
        self.cycle.complete(frame.current_slot())
    }

    fn frames_in_flight(&self) -> u32 {
        self.cycle.frames_in_flight()
    }

    fn graphics_queue(&mut self) -> &mut dyn RhiCommandQueue {
        &mut self.queue
    }

    fn swapchain(&self) -> &dyn RhiSwapchain {
        &self.swapchain
    }

    fn create_buffer(&mut self, info: &RhiBufferCreateInfo) -> RhiResult<Box<dyn RhiBuffer>> {
        let buffer = HeadlessBuffer::new(info.size, info.buffer_type, info.debug_name);
        if let Some(data) = info.initial_data {
            if info.buffer_type.is_host_visible() {
                buffer.set_data(data)?;
            } else {
                // Transparent stage-and-copy, as the Vulkan backend does it
                let staging = HeadlessBuffer::new(
                    info.size,
                    crate::rhi::BufferType::Staging,
                    &format!("{} staging", info.debug_name),
                );
                self.queue.execute_single_time_command(&mut |cmd| {
                    buffer.upload_data(data, cmd, &staging)
                })?;
            }
        }
        Ok(Box::new(buffer))
    }

    fn create_texture(&mut self, info: &RhiTextureCreateInfo) -> RhiResult<Box<dyn RhiTexture>> {
        Ok(Box::new(HeadlessTexture::new(
            info.size,
            info.format,
            info.debug_name,
        )))
    }

    fn create_render_pass(
        &mut self,
        info: &RhiRenderPassCreateInfo,
    ) -> RhiResult<Box<dyn RhiRenderPass>> {
        Ok(Box::new(HeadlessRenderPass::new(
            info.debug_name,
            info.render_area,
            info.color_attachments.len() as u32,
            info.depth_attachment.is_some(),
        )))
    }

    fn create_framebuffer(
        &mut self,
        info: &RhiFramebufferCreateInfo,
    ) -> RhiResult<Box<dyn RhiFramebuffer>> {
        for attachment in &info.attachments {
            if let AttachmentSource::Texture(texture) = &attachment.source {
                if texture.as_headless().is_none() {
                    return Err(RhiError::invalid_state(
                        "framebuffer attachment texture is not a headless texture",
                    ));
                }
            }
        }
        Ok(Box::new(HeadlessFramebuffer::new(info.count, info.extent)))
    }

    fn create_pipeline(&mut self, info: &RhiPipelineCreateInfo) -> RhiResult<Box<dyn RhiPipeline>> {
        let render_pass = info.render_pass.as_headless().ok_or_else(|| {
            RhiError::invalid_state("pipeline render pass is not a headless render pass")
        })?;
        if info.blend_states.len() as u32 != render_pass.color_attachment_count() {
            return Err(RhiError::invalid_state(format!(
                "{} blend states for {} color attachments",
                info.blend_states.len(),
                render_pass.color_attachment_count()
            )));
        }
        Ok(Box::new(HeadlessPipeline::new(info.debug_name)))
    }

    fn retire_buffer(&mut self, buffer: Box<dyn RhiBuffer>) {
        self.deletion_queue
            .retire(self.cycle.current_slot(), RetiredResource::Buffer(buffer));
    }

    fn retire_texture(&mut self, texture: Box<dyn RhiTexture>) {
        self.deletion_queue
            .retire(self.cycle.current_slot(), RetiredResource::Texture(texture));
    }
}
