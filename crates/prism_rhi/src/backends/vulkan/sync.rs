//! Synchronization primitives for CPU/GPU coordination
//!
//! Semaphores order work on the GPU timeline; fences let the CPU observe
//! completion. One [`FrameSync`] per frame-in-flight slot carries the three
//! objects the frame loop needs.

use ash::{vk, Device};

use crate::backends::vulkan::BACKEND;
use crate::rhi::{RhiError, RhiResult};

/// GPU-GPU synchronization primitive with RAII cleanup
pub struct Semaphore {
    device: Device,
    semaphore: vk::Semaphore,
}

impl Semaphore {
    pub fn new(device: Device) -> RhiResult<Self> {
        let create_info = vk::SemaphoreCreateInfo::builder();

        let semaphore = unsafe { device.create_semaphore(&create_info, None) }
            .map_err(|e| RhiError::backend(BACKEND, "vkCreateSemaphore", e))?;

        Ok(Self { device, semaphore })
    }

    pub fn handle(&self) -> vk::Semaphore {
        self.semaphore
    }
}

impl Drop for Semaphore {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_semaphore(self.semaphore, None);
        }
    }
}

/// GPU-CPU fence with RAII cleanup
pub struct Fence {
    device: Device,
    fence: vk::Fence,
}

impl Fence {
    pub fn new(device: Device, signaled: bool) -> RhiResult<Self> {
        let flags = if signaled {
            vk::FenceCreateFlags::SIGNALED
        } else {
            vk::FenceCreateFlags::empty()
        };

        let create_info = vk::FenceCreateInfo::builder().flags(flags);

        let fence = unsafe { device.create_fence(&create_info, None) }
            .map_err(|e| RhiError::backend(BACKEND, "vkCreateFence", e))?;

        Ok(Self { device, fence })
    }

    /// Block until signaled, bounded by `timeout` nanoseconds
    pub fn wait(&self, timeout: u64) -> RhiResult<()> {
        unsafe { self.device.wait_for_fences(&[self.fence], true, timeout) }
            .map_err(|e| RhiError::backend(BACKEND, "vkWaitForFences", e))
    }

    /// Return to the unsignaled state
    pub fn reset(&self) -> RhiResult<()> {
        unsafe { self.device.reset_fences(&[self.fence]) }
            .map_err(|e| RhiError::backend(BACKEND, "vkResetFences", e))
    }

    pub fn handle(&self) -> vk::Fence {
        self.fence
    }
}

impl Drop for Fence {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_fence(self.fence, None);
        }
    }
}

/// Synchronization objects for one frame-in-flight slot.
///
/// The fence starts signaled so the first pass through each slot does not
/// block.
pub struct FrameSync {
    /// Signaled when the acquired swapchain image is ready to render into
    pub image_ready: Semaphore,
    /// Signaled when rendering completes; presentation waits on it
    pub rendering_finished: Semaphore,
    /// Signaled when the GPU finishes the slot's submitted work
    pub frame_in_flight: Fence,
}

impl FrameSync {
    pub fn new(device: Device) -> RhiResult<Self> {
        let image_ready = Semaphore::new(device.clone())?;
        let rendering_finished = Semaphore::new(device.clone())?;
        let frame_in_flight = Fence::new(device, true)?;

        Ok(Self {
            image_ready,
            rendering_finished,
            frame_in_flight,
        })
    }
}
