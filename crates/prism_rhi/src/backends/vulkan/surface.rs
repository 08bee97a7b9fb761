//! Presentation surface management

use ash::extensions::khr;
use ash::vk;
use raw_window_handle::{HasRawDisplayHandle, HasRawWindowHandle};

use crate::backends::vulkan::{VulkanInstance, BACKEND};
use crate::rhi::{RhiError, RhiResult, RhiWindow};

/// Surface wrapper with RAII cleanup
pub struct VulkanSurface {
    surface_loader: khr::Surface,
    surface: vk::SurfaceKHR,
}

impl VulkanSurface {
    /// Create a presentable surface from the window's raw handles
    pub fn new(instance: &VulkanInstance, window: &dyn RhiWindow) -> RhiResult<Self> {
        let surface_loader = khr::Surface::new(instance.entry(), instance.instance());

        let surface = unsafe {
            ash_window::create_surface(
                instance.entry(),
                instance.instance(),
                window.raw_display_handle(),
                window.raw_window_handle(),
                None,
            )
        }
        .map_err(|e| RhiError::backend(BACKEND, "surface creation", e))?;

        Ok(Self {
            surface_loader,
            surface,
        })
    }

    pub fn handle(&self) -> vk::SurfaceKHR {
        self.surface
    }

    pub fn loader(&self) -> &khr::Surface {
        &self.surface_loader
    }

    pub fn capabilities(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> RhiResult<vk::SurfaceCapabilitiesKHR> {
        unsafe {
            self.surface_loader
                .get_physical_device_surface_capabilities(physical_device, self.surface)
        }
        .map_err(|e| RhiError::backend(BACKEND, "vkGetPhysicalDeviceSurfaceCapabilitiesKHR", e))
    }

    pub fn formats(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> RhiResult<Vec<vk::SurfaceFormatKHR>> {
        unsafe {
            self.surface_loader
                .get_physical_device_surface_formats(physical_device, self.surface)
        }
        .map_err(|e| RhiError::backend(BACKEND, "vkGetPhysicalDeviceSurfaceFormatsKHR", e))
    }

    pub fn present_modes(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> RhiResult<Vec<vk::PresentModeKHR>> {
        unsafe {
            self.surface_loader
                .get_physical_device_surface_present_modes(physical_device, self.surface)
        }
        .map_err(|e| RhiError::backend(BACKEND, "vkGetPhysicalDeviceSurfacePresentModesKHR", e))
    }
}

impl Drop for VulkanSurface {
    fn drop(&mut self) {
        unsafe {
            self.surface_loader.destroy_surface(self.surface, None);
        }
    }
}
