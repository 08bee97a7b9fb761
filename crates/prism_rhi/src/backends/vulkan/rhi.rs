//! Vulkan RHI facade
//!
//! Owns the instance, device, surface, swapchain, graphics queue, and the
//! per-slot frame synchronization objects. Fields are declared in reverse
//! creation order so Rust's drop order tears everything down before the
//! device and instance go away.

use ash::vk;

use crate::backends::vulkan::{
    FrameSync, LogicalDevice, PhysicalDeviceInfo, VulkanBuffer, VulkanCommandQueue,
    VulkanFramebuffer, VulkanInstance, VulkanPipeline, VulkanRenderPass, VulkanSurface,
    VulkanSwapchain, VulkanTexture, BACKEND,
};
use crate::config::RhiSettings;
use crate::rhi::frame::FrameCycle;
use crate::rhi::{
    BufferType, DeletionQueue, DynamicRhi, Frame, FrameBeginInfo, RetiredResource, RhiBackendType,
    RhiBuffer, RhiBufferCreateInfo, RhiCommandQueue, RhiError, RhiFramebuffer,
    RhiFramebufferCreateInfo, RhiPipeline, RhiPipelineCreateInfo, RhiRenderPass,
    RhiRenderPassCreateInfo, RhiResult, RhiSwapchain, RhiTexture, RhiTextureCreateInfo, RhiWindow,
};

const NO_TIMEOUT: u64 = u64::MAX;

/// Vulkan implementation of [`DynamicRhi`]
pub struct VulkanRhi {
    cycle: FrameCycle,
    deletion_queue: DeletionQueue,
    frame_uses_swapchain: bool,
    frame_sync: Vec<FrameSync>,
    queue: VulkanCommandQueue,
    swapchain: VulkanSwapchain,
    surface: VulkanSurface,
    device: LogicalDevice,
    physical_device: PhysicalDeviceInfo,
    instance: VulkanInstance,
}

impl VulkanRhi {
    pub fn new(window: &dyn RhiWindow, settings: &RhiSettings) -> RhiResult<Self> {
        let frames_in_flight = settings.frames_in_flight.max(1);

        let instance =
            VulkanInstance::new(window, &settings.app_name, settings.enable_validation)?;
        let surface = VulkanSurface::new(&instance, window)?;
        let physical_device = PhysicalDeviceInfo::select_suitable_device(
            instance.instance(),
            surface.handle(),
            surface.loader(),
        )?;
        let device = LogicalDevice::new(instance.instance(), &physical_device)?;

        let swapchain = VulkanSwapchain::new(
            instance.instance(),
            device.device.clone(),
            device.present_queue,
            &surface,
            &physical_device,
            window.framebuffer_size(),
            settings.swapchain_images.max(1),
        )?;

        let queue = VulkanCommandQueue::new(
            device.device.clone(),
            device.graphics_queue,
            device.graphics_family,
            frames_in_flight,
        )?;

        let frame_sync: RhiResult<Vec<FrameSync>> = (0..frames_in_flight)
            .map(|_| FrameSync::new(device.device.clone()))
            .collect();
        let frame_sync = frame_sync?;

        log::info!(
            "Vulkan RHI initialized ({frames_in_flight} frames in flight, {} swapchain images)",
            swapchain.image_count()
        );

        Ok(Self {
            cycle: FrameCycle::new(frames_in_flight),
            deletion_queue: DeletionQueue::new(frames_in_flight),
            frame_uses_swapchain: true,
            frame_sync,
            queue,
            swapchain,
            surface,
            device,
            physical_device,
            instance,
        })
    }

    /// Raw instance access for tooling and platform integration
    pub fn instance(&self) -> &VulkanInstance {
        &self.instance
    }

    pub fn device(&self) -> &LogicalDevice {
        &self.device
    }

    pub fn surface(&self) -> &VulkanSurface {
        &self.surface
    }

    pub fn physical_device(&self) -> &PhysicalDeviceInfo {
        &self.physical_device
    }

    fn create_buffer_inner(&self, info: &RhiBufferCreateInfo) -> RhiResult<VulkanBuffer> {
        VulkanBuffer::new(
            self.device.device.clone(),
            self.instance.instance(),
            self.physical_device.device,
            info.size,
            info.buffer_type,
            info.debug_name,
        )
    }
}

impl DynamicRhi for VulkanRhi {
    fn backend_type(&self) -> RhiBackendType {
        RhiBackendType::Vulkan
    }

    fn wait_idle(&mut self) -> RhiResult<()> {
        unsafe { self.device.device.device_wait_idle() }
            .map_err(|e| RhiError::backend(BACKEND, "vkDeviceWaitIdle", e))?;
        self.deletion_queue.flush();
        Ok(())
    }

    fn begin_frame(&mut self, info: &FrameBeginInfo) -> RhiResult<Frame> {
        let slot = self.cycle.begin()?;
        let sync = &self.frame_sync[slot as usize];

        // The GPU must be done with this slot's previous frame before its
        // command list and fence are reused
        if let Err(e) = sync.frame_in_flight.wait(NO_TIMEOUT) {
            self.cycle.abort();
            return Err(e);
        }
        if let Err(e) = sync.frame_in_flight.reset() {
            self.cycle.abort();
            return Err(e);
        }

        self.deletion_queue.collect(slot);

        self.frame_uses_swapchain = info.use_swapchain;
        let image_index = if info.use_swapchain {
            match self
                .swapchain
                .acquire_next_image(NO_TIMEOUT, self.frame_sync[slot as usize].image_ready.handle())
            {
                Ok(index) => index,
                Err(e) => {
                    self.cycle.abort();
                    return Err(e);
                }
            }
        } else {
            0
        };

        Ok(Frame::new(slot, image_index))
    }

    fn submit_frame(&mut self, frame: Frame) -> RhiResult<()> {
        let slot = frame.current_slot();
        let command_buffers = self.queue.collect_for_submit(frame.command_lists())?;
        let sync = &self.frame_sync[slot as usize];

        let wait_semaphores = [sync.image_ready.handle()];
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let signal_semaphores = [sync.rendering_finished.handle()];

        let mut submit_info = vk::SubmitInfo::builder()
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores);
        if self.frame_uses_swapchain {
            submit_info = submit_info
                .wait_semaphores(&wait_semaphores)
                .wait_dst_stage_mask(&wait_stages);
        }

        unsafe {
            self.device.device.queue_submit(
                self.device.graphics_queue,
                &[submit_info.build()],
                sync.frame_in_flight.handle(),
            )
        }
        .map_err(|e| RhiError::backend(BACKEND, "vkQueueSubmit", e))?;

        if self.frame_uses_swapchain {
            self.swapchain
                .present(sync.rendering_finished.handle(), frame.image_index())?;
        }

        // Per-slot fencing only; the next use of this slot waits in
        // begin_frame, and the CPU moves straight on to the next frame
        self.cycle.complete(slot)
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
        let buffer = self.create_buffer_inner(info)?;

        if let Some(data) = info.initial_data {
            if info.buffer_type.is_host_visible() {
                buffer.set_data(data)?;
            } else {
                // Transparent stage-and-copy: the caller gets a filled
                // device-local buffer without touching the staging protocol
                let staging = self.create_buffer_inner(&RhiBufferCreateInfo {
                    size: info.size,
                    buffer_type: BufferType::Staging,
                    initial_data: None,
                    debug_name: &format!("{} staging", info.debug_name),
                })?;
                self.queue.execute_single_time_command(&mut |cmd| {
                    buffer.upload_data(data, cmd, &staging)
                })?;
                // The blocking wait above makes the staging buffer safe to
                // drop here
            }
        }

        Ok(Box::new(buffer))
    }

    fn create_texture(&mut self, info: &RhiTextureCreateInfo) -> RhiResult<Box<dyn RhiTexture>> {
        Ok(Box::new(VulkanTexture::new(
            self.device.device.clone(),
            self.instance.instance(),
            self.physical_device.device,
            info.size,
            info.format,
            info.sampled,
            info.debug_name,
        )?))
    }

    fn create_render_pass(
        &mut self,
        info: &RhiRenderPassCreateInfo,
    ) -> RhiResult<Box<dyn RhiRenderPass>> {
        Ok(Box::new(VulkanRenderPass::new(
            self.device.device.clone(),
            info,
        )?))
    }

    fn create_framebuffer(
        &mut self,
        info: &RhiFramebufferCreateInfo,
    ) -> RhiResult<Box<dyn RhiFramebuffer>> {
        Ok(Box::new(VulkanFramebuffer::new(
            self.device.device.clone(),
            info,
            &self.swapchain,
        )?))
    }

    fn create_pipeline(&mut self, info: &RhiPipelineCreateInfo) -> RhiResult<Box<dyn RhiPipeline>> {
        Ok(Box::new(VulkanPipeline::new(
            self.device.device.clone(),
            info,
        )?))
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

impl Drop for VulkanRhi {
    fn drop(&mut self) {
        // Pending deletions and live wrappers both need an idle device
        let _ = unsafe { self.device.device.device_wait_idle() };
        self.deletion_queue.flush();
    }
}
