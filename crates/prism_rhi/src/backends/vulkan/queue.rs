//! Graphics command queue and its command list pool

use ash::{vk, Device};

use crate::backends::vulkan::{Fence, VulkanCommandList, BACKEND};
use crate::rhi::{CommandQueueType, RhiCommandList, RhiCommandQueue, RhiError, RhiResult};

/// Owns the command pool, one command list per frame-in-flight slot, and a
/// dedicated single-time list with its completion fence
pub struct VulkanCommandQueue {
    single_time: VulkanCommandList,
    single_time_fence: Fence,
    lists: Vec<VulkanCommandList>,
    command_pool: vk::CommandPool,
    queue: vk::Queue,
    device: Device,
}

impl VulkanCommandQueue {
    pub fn new(
        device: Device,
        queue: vk::Queue,
        queue_family_index: u32,
        pool_size: u32,
    ) -> RhiResult<Self> {
        let pool_create_info = vk::CommandPoolCreateInfo::builder()
            .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER)
            .queue_family_index(queue_family_index);

        let command_pool = unsafe { device.create_command_pool(&pool_create_info, None) }
            .map_err(|e| RhiError::backend(BACKEND, "vkCreateCommandPool", e))?;

        // Pool lists plus the single-time list in one allocation
        let alloc_info = vk::CommandBufferAllocateInfo::builder()
            .command_pool(command_pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(pool_size + 1);

        let command_buffers = unsafe { device.allocate_command_buffers(&alloc_info) }
            .map_err(|e| RhiError::backend(BACKEND, "vkAllocateCommandBuffers", e))?;

        let Some((&single_time_buffer, pool_buffers)) = command_buffers.split_last() else {
            return Err(RhiError::backend(
                BACKEND,
                "vkAllocateCommandBuffers",
                "empty allocation",
            ));
        };
        let lists: Vec<VulkanCommandList> = pool_buffers
            .iter()
            .enumerate()
            .map(|(id, &cb)| VulkanCommandList::new(device.clone(), cb, id as u32))
            .collect();
        let single_time = VulkanCommandList::new(device.clone(), single_time_buffer, pool_size);

        let single_time_fence = Fence::new(device.clone(), false)?;

        Ok(Self {
            single_time,
            single_time_fence,
            lists,
            command_pool,
            queue,
            device,
        })
    }

    /// Resolve frame-token list ids into submittable handles, rejecting
    /// unknown ids and lists that are not executable
    pub(crate) fn collect_for_submit(&self, ids: &[u32]) -> RhiResult<Vec<vk::CommandBuffer>> {
        ids.iter()
            .map(|&id| {
                let list = self.lists.get(id as usize).ok_or(RhiError::OutOfRange {
                    index: id as usize,
                    size: self.lists.len(),
                })?;
                list.record_state().require_executable("submit_frame")?;
                Ok(list.handle())
            })
            .collect()
    }
}

impl RhiCommandQueue for VulkanCommandQueue {
    fn command_list(&mut self, index: u32) -> RhiResult<&mut dyn RhiCommandList> {
        let size = self.lists.len();
        self.lists
            .get_mut(index as usize)
            .map(|list| list as &mut dyn RhiCommandList)
            .ok_or(RhiError::OutOfRange {
                index: index as usize,
                size,
            })
    }

    fn pool_size(&self) -> u32 {
        self.lists.len() as u32
    }

    fn queue_type(&self) -> CommandQueueType {
        CommandQueueType::Graphics
    }

    fn execute_single_time_command(
        &mut self,
        record: &mut dyn FnMut(&mut dyn RhiCommandList) -> RhiResult<()>,
    ) -> RhiResult<()> {
        if self.single_time.state().is_recording() {
            return Err(RhiError::invalid_state(
                "single-time command list is already recording",
            ));
        }

        self.single_time.begin()?;
        let body_result = record(&mut self.single_time);
        self.single_time.end()?;
        // Nothing is submitted for a failed recording
        body_result?;

        let command_buffers = [self.single_time.handle()];
        let submit_info = vk::SubmitInfo::builder().command_buffers(&command_buffers);

        unsafe {
            self.device.queue_submit(
                self.queue,
                &[submit_info.build()],
                self.single_time_fence.handle(),
            )
        }
        .map_err(|e| RhiError::backend(BACKEND, "vkQueueSubmit", e))?;

        // The deliberate blocking point: one-shot transfers trade throughput
        // for a simple completion guarantee
        self.single_time_fence.wait(u64::MAX)?;
        self.single_time_fence.reset()
    }
}

impl Drop for VulkanCommandQueue {
    fn drop(&mut self) {
        unsafe {
            // All pooled buffers must be off the GPU before the pool goes
            let _ = self.device.device_wait_idle();
            self.device.destroy_command_pool(self.command_pool, None);
        }
    }
}
