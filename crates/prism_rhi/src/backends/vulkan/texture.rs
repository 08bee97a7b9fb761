//! Texture resources

use ash::{vk, Device, Instance};

use crate::backends::vulkan::buffer::find_memory_type;
use crate::backends::vulkan::{to_vk_format, BACKEND};
use crate::rhi::{Format, RhiError, RhiResult, RhiTexture, Size2D};

/// Device-local image with its memory and default view.
///
/// Depth formats get depth-attachment usage; color formats are color
/// attachments, optionally sampled.
pub struct VulkanTexture {
    device: Device,
    image: vk::Image,
    memory: vk::DeviceMemory,
    image_view: vk::ImageView,
    size: Size2D,
    format: Format,
}

impl VulkanTexture {
    pub fn new(
        device: Device,
        instance: &Instance,
        physical_device: vk::PhysicalDevice,
        size: Size2D,
        format: Format,
        sampled: bool,
        debug_name: &str,
    ) -> RhiResult<Self> {
        if format.is_depth() && sampled {
            return Err(RhiError::UnsupportedValue {
                what: "sampled texture format",
                value: format!("{format:?}"),
            });
        }

        let vk_format = to_vk_format(format);
        let (usage, aspect_mask) = if format.is_depth() {
            (
                vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT,
                vk::ImageAspectFlags::DEPTH,
            )
        } else {
            let mut usage = vk::ImageUsageFlags::COLOR_ATTACHMENT;
            if sampled {
                usage |= vk::ImageUsageFlags::SAMPLED;
            }
            (usage, vk::ImageAspectFlags::COLOR)
        };

        let image_create_info = vk::ImageCreateInfo::builder()
            .image_type(vk::ImageType::TYPE_2D)
            .extent(vk::Extent3D {
                width: size.width,
                height: size.height,
                depth: 1,
            })
            .mip_levels(1)
            .array_layers(1)
            .format(vk_format)
            .tiling(vk::ImageTiling::OPTIMAL)
            .initial_layout(vk::ImageLayout::UNDEFINED)
            .usage(usage)
            .sharing_mode(vk::SharingMode::EXCLUSIVE)
            .samples(vk::SampleCountFlags::TYPE_1);

        let image = unsafe { device.create_image(&image_create_info, None) }
            .map_err(|e| RhiError::backend(BACKEND, "vkCreateImage", e))?;

        let memory_requirements = unsafe { device.get_image_memory_requirements(image) };

        let memory_type_index = find_memory_type(
            instance,
            physical_device,
            memory_requirements.memory_type_bits,
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
        )?;

        let alloc_info = vk::MemoryAllocateInfo::builder()
            .allocation_size(memory_requirements.size)
            .memory_type_index(memory_type_index);

        let memory = unsafe { device.allocate_memory(&alloc_info, None) }
            .map_err(|e| RhiError::backend(BACKEND, "vkAllocateMemory", e))?;

        unsafe { device.bind_image_memory(image, memory, 0) }
            .map_err(|e| RhiError::backend(BACKEND, "vkBindImageMemory", e))?;

        let image_view_create_info = vk::ImageViewCreateInfo::builder()
            .image(image)
            .view_type(vk::ImageViewType::TYPE_2D)
            .format(vk_format)
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask,
                base_mip_level: 0,
                level_count: 1,
                base_array_layer: 0,
                layer_count: 1,
            });

        let image_view = unsafe { device.create_image_view(&image_view_create_info, None) }
            .map_err(|e| RhiError::backend(BACKEND, "vkCreateImageView", e))?;

        log::debug!(
            "created texture '{debug_name}' ({}x{}, {format:?})",
            size.width,
            size.height
        );

        Ok(Self {
            device,
            image,
            memory,
            image_view,
            size,
            format,
        })
    }

    pub fn image_view(&self) -> vk::ImageView {
        self.image_view
    }

    pub fn image(&self) -> vk::Image {
        self.image
    }
}

impl RhiTexture for VulkanTexture {
    fn size(&self) -> Size2D {
        self.size
    }

    fn format(&self) -> Format {
        self.format
    }

    fn as_vulkan(&self) -> Option<&VulkanTexture> {
        Some(self)
    }
}

impl Drop for VulkanTexture {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_image_view(self.image_view, None);
            self.device.destroy_image(self.image, None);
            self.device.free_memory(self.memory, None);
        }
    }
}
