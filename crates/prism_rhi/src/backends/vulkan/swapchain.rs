//! Swapchain creation and presentation

use ash::extensions::khr::Swapchain as SwapchainLoader;
use ash::{vk, Device, Instance};

use crate::backends::vulkan::{
    to_rhi_size, PhysicalDeviceInfo, VulkanSurface, BACKEND,
};
use crate::rhi::{
    Format, Offset2D, Rect2D, RhiError, RhiResult, RhiSwapchain, Size2D, Viewport,
};

/// Swapchain wrapper with RAII cleanup.
///
/// Surface format, extent, and the cached viewport/scissor are negotiated
/// once at creation; there is no runtime resize handling.
pub struct VulkanSwapchain {
    device: Device,
    loader: SwapchainLoader,
    swapchain: vk::SwapchainKHR,
    images: Vec<vk::Image>,
    image_views: Vec<vk::ImageView>,
    format: vk::SurfaceFormatKHR,
    extent: vk::Extent2D,
    image_count: u32,
    present_queue: vk::Queue,
    viewport: Viewport,
    scissor: Rect2D,
}

impl VulkanSwapchain {
    pub fn new(
        instance: &Instance,
        device: Device,
        present_queue: vk::Queue,
        surface: &VulkanSurface,
        physical_device: &PhysicalDeviceInfo,
        window_extent: Size2D,
        image_count: u32,
    ) -> RhiResult<Self> {
        let loader = SwapchainLoader::new(instance, &device);

        let surface_caps = surface.capabilities(physical_device.device)?;

        // The requested back buffer count must be inside the surface's range
        let max_images = if surface_caps.max_image_count > 0 {
            surface_caps.max_image_count
        } else {
            u32::MAX
        };
        if image_count < surface_caps.min_image_count || image_count > max_images {
            return Err(RhiError::UnsupportedValue {
                what: "swapchain image count",
                value: format!(
                    "{image_count} (surface supports {}..={max_images})",
                    surface_caps.min_image_count
                ),
            });
        }

        // B8G8R8A8 + sRGB nonlinear is the one surface format the RHI speaks
        let surface_formats = surface.formats(physical_device.device)?;
        let format = surface_formats
            .iter()
            .find(|sf| {
                sf.format == vk::Format::B8G8R8A8_UNORM
                    && sf.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR
            })
            .copied()
            .ok_or(RhiError::UnsupportedValue {
                what: "surface format",
                value: "B8G8R8A8_UNORM / SRGB_NONLINEAR".to_string(),
            })?;

        let present_modes = surface.present_modes(physical_device.device)?;
        let present_mode = present_modes
            .iter()
            .copied()
            .find(|&mode| mode == vk::PresentModeKHR::MAILBOX)
            .unwrap_or(vk::PresentModeKHR::FIFO);

        let extent = if surface_caps.current_extent.width != u32::MAX {
            surface_caps.current_extent
        } else {
            vk::Extent2D {
                width: window_extent.width.clamp(
                    surface_caps.min_image_extent.width,
                    surface_caps.max_image_extent.width,
                ),
                height: window_extent.height.clamp(
                    surface_caps.min_image_extent.height,
                    surface_caps.max_image_extent.height,
                ),
            }
        };

        let swapchain_create_info = vk::SwapchainCreateInfoKHR::builder()
            .surface(surface.handle())
            .min_image_count(image_count)
            .image_format(format.format)
            .image_color_space(format.color_space)
            .image_extent(extent)
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
            .image_sharing_mode(vk::SharingMode::EXCLUSIVE)
            .pre_transform(surface_caps.current_transform)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(present_mode)
            .clipped(true)
            .old_swapchain(vk::SwapchainKHR::null());

        let swapchain = unsafe { loader.create_swapchain(&swapchain_create_info, None) }
            .map_err(|e| RhiError::backend(BACKEND, "vkCreateSwapchainKHR", e))?;

        let images = unsafe { loader.get_swapchain_images(swapchain) }
            .map_err(|e| RhiError::backend(BACKEND, "vkGetSwapchainImagesKHR", e))?;

        let image_views: Result<Vec<_>, _> = images
            .iter()
            .map(|&image| {
                let create_info = vk::ImageViewCreateInfo::builder()
                    .image(image)
                    .view_type(vk::ImageViewType::TYPE_2D)
                    .format(format.format)
                    .components(vk::ComponentMapping {
                        r: vk::ComponentSwizzle::IDENTITY,
                        g: vk::ComponentSwizzle::IDENTITY,
                        b: vk::ComponentSwizzle::IDENTITY,
                        a: vk::ComponentSwizzle::IDENTITY,
                    })
                    .subresource_range(vk::ImageSubresourceRange {
                        aspect_mask: vk::ImageAspectFlags::COLOR,
                        base_mip_level: 0,
                        level_count: 1,
                        base_array_layer: 0,
                        layer_count: 1,
                    });

                unsafe { device.create_image_view(&create_info, None) }
            })
            .collect();
        let image_views =
            image_views.map_err(|e| RhiError::backend(BACKEND, "vkCreateImageView", e))?;

        let actual_count = images.len() as u32;

        // Flipped along Y for GL-style clip space; Maintenance1 (core since
        // 1.1) permits the negative height
        let viewport = Viewport {
            x: 0.0,
            y: extent.height as f32,
            width: extent.width as f32,
            height: -(extent.height as f32),
            min_depth: 0.0,
            max_depth: 1.0,
        };
        let scissor = Rect2D {
            offset: Offset2D::default(),
            size: to_rhi_size(extent),
        };

        log::debug!(
            "created swapchain ({actual_count} images, {}x{}, {:?})",
            extent.width,
            extent.height,
            present_mode
        );

        Ok(Self {
            device,
            loader,
            swapchain,
            images,
            image_views,
            format,
            extent,
            image_count: actual_count,
            present_queue,
            viewport,
            scissor,
        })
    }

    /// Block until an image is available, signaling `image_ready` when the
    /// GPU may render into it. Returns the acquired image index, which is
    /// not required to match the frame-in-flight slot.
    pub fn acquire_next_image(&self, timeout: u64, image_ready: vk::Semaphore) -> RhiResult<u32> {
        let result = unsafe {
            self.loader
                .acquire_next_image(self.swapchain, timeout, image_ready, vk::Fence::null())
        };
        match result {
            Ok((index, suboptimal)) => {
                if suboptimal {
                    log::warn!("acquired image from a suboptimal swapchain");
                }
                Ok(index)
            }
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Err(RhiError::SwapchainOutOfDate),
            Err(vk::Result::ERROR_SURFACE_LOST_KHR) => Err(RhiError::SurfaceLost),
            Err(e) => Err(RhiError::backend(BACKEND, "vkAcquireNextImageKHR", e)),
        }
    }

    /// Queue presentation of `image_index`, waiting on `rendering_finished`
    pub fn present(&self, rendering_finished: vk::Semaphore, image_index: u32) -> RhiResult<()> {
        let wait_semaphores = [rendering_finished];
        let swapchains = [self.swapchain];
        let image_indices = [image_index];
        let present_info = vk::PresentInfoKHR::builder()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        let result = unsafe { self.loader.queue_present(self.present_queue, &present_info) };
        match result {
            Ok(suboptimal) => {
                if suboptimal {
                    log::warn!("presented to a suboptimal swapchain");
                }
                Ok(())
            }
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Err(RhiError::SwapchainOutOfDate),
            Err(vk::Result::ERROR_SURFACE_LOST_KHR) => Err(RhiError::SurfaceLost),
            Err(e) => Err(RhiError::backend(BACKEND, "vkQueuePresentKHR", e)),
        }
    }

    /// Raw swapchain images, in acquisition-index order
    pub fn images(&self) -> &[vk::Image] {
        &self.images
    }

    /// Image view for swapchain image `index`
    pub fn image_view(&self, index: u32) -> RhiResult<vk::ImageView> {
        self.image_views
            .get(index as usize)
            .copied()
            .ok_or(RhiError::OutOfRange {
                index: index as usize,
                size: self.image_views.len(),
            })
    }

    pub fn vk_extent(&self) -> vk::Extent2D {
        self.extent
    }
}

impl RhiSwapchain for VulkanSwapchain {
    fn size(&self) -> Size2D {
        to_rhi_size(self.extent)
    }

    fn format(&self) -> Format {
        // Creation pinned the surface format to B8G8R8A8_UNORM
        debug_assert_eq!(self.format.format, vk::Format::B8G8R8A8_UNORM);
        Format::B8G8R8A8Unorm
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn scissor(&self) -> Rect2D {
        self.scissor
    }

    fn image_count(&self) -> u32 {
        self.image_count
    }

    fn as_vulkan(&self) -> Option<&VulkanSwapchain> {
        Some(self)
    }
}

impl Drop for VulkanSwapchain {
    fn drop(&mut self) {
        unsafe {
            for &image_view in &self.image_views {
                self.device.destroy_image_view(image_view, None);
            }
            self.loader.destroy_swapchain(self.swapchain, None);
        }
    }
}
