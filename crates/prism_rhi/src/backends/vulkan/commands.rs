//! Command list recording

use ash::{vk, Device};

use crate::backends::vulkan::{to_vk_rect, to_vk_viewport};
use crate::rhi::{
    BufferType, Rect2D, RecordState, RhiBuffer, RhiCommandList, RhiError, RhiResult, Viewport,
};

fn vulkan_buffer<'a>(
    buffer: &'a dyn RhiBuffer,
    what: &str,
) -> RhiResult<&'a super::VulkanBuffer> {
    buffer
        .as_vulkan()
        .ok_or_else(|| RhiError::invalid_state(format!("{what} was not created by this backend")))
}

/// Command list backed by a pooled primary command buffer.
///
/// `begin` resets the buffer implicitly (the pool is created with
/// per-buffer reset) and records for one-time submission.
pub struct VulkanCommandList {
    device: Device,
    command_buffer: vk::CommandBuffer,
    id: u32,
    state: RecordState,
}

impl std::fmt::Debug for VulkanCommandList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VulkanCommandList")
            .field("command_buffer", &self.command_buffer)
            .field("id", &self.id)
            .field("state", &self.state)
            .finish()
    }
}

impl VulkanCommandList {
    pub(crate) fn new(device: Device, command_buffer: vk::CommandBuffer, id: u32) -> Self {
        Self {
            device,
            command_buffer,
            id,
            state: RecordState::default(),
        }
    }

    pub fn handle(&self) -> vk::CommandBuffer {
        self.command_buffer
    }

    pub(crate) fn record_state(&self) -> &RecordState {
        &self.state
    }

    pub(crate) fn device(&self) -> &Device {
        &self.device
    }
}

impl RhiCommandList for VulkanCommandList {
    fn begin(&mut self) -> RhiResult<()> {
        self.state.begin()?;

        let begin_info = vk::CommandBufferBeginInfo::builder()
            .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);

        let result = unsafe {
            self.device
                .begin_command_buffer(self.command_buffer, &begin_info)
        };
        if let Err(e) = result {
            // Keep the state machine consistent with the native buffer
            self.state = RecordState::Initial;
            return Err(RhiError::backend(super::BACKEND, "vkBeginCommandBuffer", e));
        }
        Ok(())
    }

    fn end(&mut self) -> RhiResult<()> {
        self.state.end()?;
        unsafe { self.device.end_command_buffer(self.command_buffer) }
            .map_err(|e| RhiError::backend(super::BACKEND, "vkEndCommandBuffer", e))
    }

    fn state(&self) -> RecordState {
        self.state
    }

    fn id(&self) -> u32 {
        self.id
    }

    fn draw(
        &mut self,
        vertex_count: u32,
        instance_count: u32,
        first_vertex: u32,
        first_instance: u32,
    ) -> RhiResult<()> {
        self.state.require_recording("draw")?;
        unsafe {
            self.device.cmd_draw(
                self.command_buffer,
                vertex_count,
                instance_count,
                first_vertex,
                first_instance,
            );
        }
        Ok(())
    }

    fn draw_indexed(
        &mut self,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        first_instance: u32,
    ) -> RhiResult<()> {
        self.state.require_recording("draw_indexed")?;
        unsafe {
            self.device.cmd_draw_indexed(
                self.command_buffer,
                index_count,
                instance_count,
                first_index,
                vertex_offset,
                first_instance,
            );
        }
        Ok(())
    }

    fn bind_vertex_buffer(&mut self, buffer: &dyn RhiBuffer) -> RhiResult<()> {
        self.state.require_recording("bind_vertex_buffer")?;
        if buffer.buffer_type() != BufferType::Vertex {
            return Err(RhiError::invalid_state(format!(
                "bind_vertex_buffer on a {:?} buffer",
                buffer.buffer_type()
            )));
        }
        let buffer = vulkan_buffer(buffer, "vertex buffer")?;
        unsafe {
            self.device
                .cmd_bind_vertex_buffers(self.command_buffer, 0, &[buffer.handle()], &[0]);
        }
        Ok(())
    }

    fn bind_index_buffer(&mut self, buffer: &dyn RhiBuffer) -> RhiResult<()> {
        self.state.require_recording("bind_index_buffer")?;
        if buffer.buffer_type() != BufferType::Index {
            return Err(RhiError::invalid_state(format!(
                "bind_index_buffer on a {:?} buffer",
                buffer.buffer_type()
            )));
        }
        let buffer = vulkan_buffer(buffer, "index buffer")?;
        unsafe {
            self.device.cmd_bind_index_buffer(
                self.command_buffer,
                buffer.handle(),
                0,
                vk::IndexType::UINT32,
            );
        }
        Ok(())
    }

    fn copy_buffer(&mut self, src: &dyn RhiBuffer, dst: &dyn RhiBuffer) -> RhiResult<()> {
        self.state.require_recording("copy_buffer")?;
        let src = vulkan_buffer(src, "copy source")?;
        let dst = vulkan_buffer(dst, "copy destination")?;
        if src.size() > dst.size() {
            return Err(RhiError::invalid_state(format!(
                "copy of {} bytes exceeds destination '{}' ({} bytes)",
                src.size(),
                dst.debug_name(),
                dst.size()
            )));
        }

        let region = vk::BufferCopy {
            src_offset: src.offset(),
            dst_offset: dst.offset(),
            size: src.size(),
        };
        unsafe {
            self.device.cmd_copy_buffer(
                self.command_buffer,
                src.handle(),
                dst.handle(),
                &[region],
            );
        }
        Ok(())
    }

    fn set_viewport(&mut self, viewport: Viewport) -> RhiResult<()> {
        self.state.require_recording("set_viewport")?;
        unsafe {
            self.device
                .cmd_set_viewport(self.command_buffer, 0, &[to_vk_viewport(viewport)]);
        }
        Ok(())
    }

    fn set_scissor(&mut self, scissor: Rect2D) -> RhiResult<()> {
        self.state.require_recording("set_scissor")?;
        unsafe {
            self.device
                .cmd_set_scissor(self.command_buffer, 0, &[to_vk_rect(scissor)]);
        }
        Ok(())
    }

    fn as_vulkan(&self) -> Option<&VulkanCommandList> {
        Some(self)
    }
}
