//! Buffer resources and memory placement

use ash::{vk, Device, Instance};

use crate::backends::vulkan::{to_vk_buffer_usage, to_vk_memory_properties, BACKEND};
use crate::rhi::{BufferType, RhiBuffer, RhiCommandList, RhiError, RhiResult};

/// Buffer with its own device memory allocation.
///
/// Placement follows the declared [`BufferType`]: host-visible types map for
/// direct writes, device-local types fill through the staging copy path.
pub struct VulkanBuffer {
    device: Device,
    buffer: vk::Buffer,
    memory: vk::DeviceMemory,
    size: u64,
    buffer_type: BufferType,
    debug_name: String,
}

impl VulkanBuffer {
    pub fn new(
        device: Device,
        instance: &Instance,
        physical_device: vk::PhysicalDevice,
        size: u64,
        buffer_type: BufferType,
        debug_name: &str,
    ) -> RhiResult<Self> {
        let buffer_info = vk::BufferCreateInfo::builder()
            .size(size)
            .usage(to_vk_buffer_usage(buffer_type))
            .sharing_mode(vk::SharingMode::EXCLUSIVE);

        let buffer = unsafe { device.create_buffer(&buffer_info, None) }
            .map_err(|e| RhiError::backend(BACKEND, "vkCreateBuffer", e))?;

        let mem_requirements = unsafe { device.get_buffer_memory_requirements(buffer) };

        let memory_type_index = find_memory_type(
            instance,
            physical_device,
            mem_requirements.memory_type_bits,
            to_vk_memory_properties(buffer_type),
        )?;

        let alloc_info = vk::MemoryAllocateInfo::builder()
            .allocation_size(mem_requirements.size)
            .memory_type_index(memory_type_index);

        let memory = unsafe { device.allocate_memory(&alloc_info, None) }
            .map_err(|e| RhiError::backend(BACKEND, "vkAllocateMemory", e))?;

        unsafe { device.bind_buffer_memory(buffer, memory, 0) }
            .map_err(|e| RhiError::backend(BACKEND, "vkBindBufferMemory", e))?;

        log::debug!("created buffer '{debug_name}' ({size} bytes, {buffer_type:?})");

        Ok(Self {
            device,
            buffer,
            memory,
            size,
            buffer_type,
            debug_name: debug_name.to_string(),
        })
    }

    pub fn handle(&self) -> vk::Buffer {
        self.buffer
    }

    pub fn debug_name(&self) -> &str {
        &self.debug_name
    }
}

impl RhiBuffer for VulkanBuffer {
    fn size(&self) -> u64 {
        self.size
    }

    fn offset(&self) -> u64 {
        0
    }

    fn buffer_type(&self) -> BufferType {
        self.buffer_type
    }

    fn set_data(&self, data: &[u8]) -> RhiResult<()> {
        if !self.buffer_type.is_host_visible() {
            log::warn!(
                "set_data on device-local buffer '{}' ignored; use the staging upload path",
                self.debug_name
            );
            return Ok(());
        }
        if data.len() as u64 > self.size {
            return Err(RhiError::invalid_state(format!(
                "{} bytes do not fit buffer '{}' ({} bytes)",
                data.len(),
                self.debug_name,
                self.size
            )));
        }

        let mapped = unsafe {
            self.device
                .map_memory(self.memory, 0, self.size, vk::MemoryMapFlags::empty())
        }
        .map_err(|e| RhiError::backend(BACKEND, "vkMapMemory", e))?;

        unsafe {
            std::ptr::copy_nonoverlapping(data.as_ptr(), mapped.cast::<u8>(), data.len());
            self.device.unmap_memory(self.memory);
        }
        Ok(())
    }

    fn upload_data(
        &self,
        data: &[u8],
        command_list: &mut dyn RhiCommandList,
        staging: &dyn RhiBuffer,
    ) -> RhiResult<()> {
        if !staging.buffer_type().is_host_visible() {
            return Err(RhiError::invalid_state(
                "upload_data staging buffer must be host-visible",
            ));
        }
        staging.set_data(data)?;
        command_list.copy_buffer(staging, self)
    }

    fn as_vulkan(&self) -> Option<&VulkanBuffer> {
        Some(self)
    }
}

impl Drop for VulkanBuffer {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_buffer(self.buffer, None);
            self.device.free_memory(self.memory, None);
        }
    }
}

/// Find a memory type satisfying `properties` within `type_filter`
pub(crate) fn find_memory_type(
    instance: &Instance,
    physical_device: vk::PhysicalDevice,
    type_filter: u32,
    properties: vk::MemoryPropertyFlags,
) -> RhiResult<u32> {
    let mem_properties = unsafe { instance.get_physical_device_memory_properties(physical_device) };

    for i in 0..mem_properties.memory_type_count {
        if (type_filter & (1 << i)) != 0
            && mem_properties.memory_types[i as usize]
                .property_flags
                .contains(properties)
        {
            return Ok(i);
        }
    }

    Err(RhiError::Backend {
        backend: BACKEND,
        operation: "memory type selection",
        code: format!("no memory type supports {properties:?}"),
    })
}
