//! GPU buffer resources
//!
//! A buffer's declared [`BufferType`] is fixed at creation and decides both
//! its memory placement and which write paths apply: host-visible buffers
//! accept [`set_data`], device-local buffers go through the staging
//! [`upload_data`] protocol.
//!
//! [`set_data`]: RhiBuffer::set_data
//! [`upload_data`]: RhiBuffer::upload_data

use crate::backends::headless::HeadlessBuffer;
use crate::backends::vulkan::VulkanBuffer;
use crate::rhi::{BufferType, RhiCommandList, RhiResult};

/// Configuration for buffer creation
pub struct RhiBufferCreateInfo<'a> {
    /// Size of the allocation in bytes
    pub size: u64,
    /// Usage category; immutable after creation
    pub buffer_type: BufferType,
    /// Optional contents to upload at creation. For device-local types the
    /// implementation stages and copies transparently, blocking until the
    /// transfer completes.
    pub initial_data: Option<&'a [u8]>,
    /// Name attached to the native object for debugging tools
    pub debug_name: &'a str,
}

/// GPU-resident memory with a declared usage category
pub trait RhiBuffer {
    /// Size of the allocation in bytes
    fn size(&self) -> u64;

    /// Offset of this buffer within its allocation
    fn offset(&self) -> u64;

    fn buffer_type(&self) -> BufferType;

    /// Write data through a memory mapping. Only valid for host-visible
    /// buffers; on device-local buffers this is a warn-and-no-op so callers
    /// that do not track placement need no special casing.
    fn set_data(&self, data: &[u8]) -> RhiResult<()>;

    /// Upload to a device-local buffer through `staging`: `data` is written
    /// into `staging` with [`set_data`](Self::set_data), then a
    /// staging-to-self copy is recorded on `command_list`. The caller owns
    /// `staging` and must keep it alive until GPU execution of the copy has
    /// completed.
    fn upload_data(
        &self,
        data: &[u8],
        command_list: &mut dyn RhiCommandList,
        staging: &dyn RhiBuffer,
    ) -> RhiResult<()>;

    /// Capability accessor for the Vulkan backend
    fn as_vulkan(&self) -> Option<&VulkanBuffer> {
        None
    }

    /// Capability accessor for the headless backend
    fn as_headless(&self) -> Option<&HeadlessBuffer> {
        None
    }
}
