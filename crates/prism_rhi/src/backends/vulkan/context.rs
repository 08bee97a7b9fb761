//! Vulkan instance and device initialization
//!
//! Construction-time failures abort RHI initialization with the step that
//! failed and the native result code; there is no fallback device selection.

use ash::extensions::ext::DebugUtils;
use ash::extensions::khr::{Surface, Swapchain as SwapchainLoader};
use ash::vk;
use ash::{Device, Entry, Instance};
use std::ffi::{CStr, CString};

use crate::backends::vulkan::BACKEND;
use crate::rhi::{RhiError, RhiResult, RhiWindow};

/// Vulkan instance wrapper with RAII cleanup
pub struct VulkanInstance {
    entry: Entry,
    instance: Instance,
    debug_utils: Option<DebugUtils>,
    debug_messenger: Option<vk::DebugUtilsMessengerEXT>,
}

impl VulkanInstance {
    /// Create the instance, with the validation layer and debug messenger
    /// when requested
    pub fn new(window: &dyn RhiWindow, app_name: &str, enable_validation: bool) -> RhiResult<Self> {
        let entry = unsafe { Entry::load() }.map_err(|e| RhiError::Backend {
            backend: BACKEND,
            operation: "loading the Vulkan library",
            code: format!("{e:?}"),
        })?;

        let app_name_cstr = CString::new(app_name).unwrap_or_default();
        let engine_name_cstr = CString::new("prism").unwrap_or_default();
        let app_info = vk::ApplicationInfo::builder()
            .application_name(&app_name_cstr)
            .application_version(vk::make_api_version(0, 1, 0, 0))
            .engine_name(&engine_name_cstr)
            .engine_version(vk::make_api_version(0, 1, 0, 0))
            // 1.1 for negative-height viewports (Maintenance1)
            .api_version(vk::API_VERSION_1_1);

        // Surface extensions come from the windowing system when it reports
        // them (GLFW does), otherwise from ash-window's platform tables
        let window_extensions = window.required_instance_extensions();
        let cstr_extensions: Vec<CString> = match &window_extensions {
            Some(names) => names
                .iter()
                .map(|name| CString::new(name.as_str()).unwrap_or_default())
                .collect(),
            None => {
                use raw_window_handle::HasRawDisplayHandle;
                ash_window::enumerate_required_extensions(window.raw_display_handle())
                    .map_err(|e| RhiError::backend(BACKEND, "enumerating surface extensions", e))?
                    .iter()
                    .map(|&ptr| unsafe { CStr::from_ptr(ptr) }.to_owned())
                    .collect()
            }
        };

        let mut extensions: Vec<*const i8> = cstr_extensions.iter().map(|ext| ext.as_ptr()).collect();
        if enable_validation {
            extensions.push(DebugUtils::name().as_ptr());
        }

        let layer_names = if enable_validation {
            vec![CString::new("VK_LAYER_KHRONOS_validation").unwrap_or_default()]
        } else {
            vec![]
        };
        let layer_names_ptrs: Vec<*const i8> = layer_names.iter().map(|name| name.as_ptr()).collect();

        let create_info = vk::InstanceCreateInfo::builder()
            .application_info(&app_info)
            .enabled_extension_names(&extensions)
            .enabled_layer_names(&layer_names_ptrs);

        let instance = unsafe { entry.create_instance(&create_info, None) }
            .map_err(|e| RhiError::backend(BACKEND, "vkCreateInstance", e))?;

        let (debug_utils, debug_messenger) = if enable_validation {
            let debug_utils = DebugUtils::new(&entry, &instance);
            let messenger = Self::create_debug_messenger(&debug_utils)?;
            (Some(debug_utils), Some(messenger))
        } else {
            (None, None)
        };

        log::debug!("created Vulkan instance (validation: {enable_validation})");

        Ok(Self {
            entry,
            instance,
            debug_utils,
            debug_messenger,
        })
    }

    fn create_debug_messenger(debug_utils: &DebugUtils) -> RhiResult<vk::DebugUtilsMessengerEXT> {
        let create_info = vk::DebugUtilsMessengerCreateInfoEXT::builder()
            .message_severity(
                vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                    | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
            )
            .message_type(
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                    | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                    | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
            )
            .pfn_user_callback(Some(debug_callback));

        unsafe { debug_utils.create_debug_utils_messenger(&create_info, None) }
            .map_err(|e| RhiError::backend(BACKEND, "vkCreateDebugUtilsMessengerEXT", e))
    }

    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    pub fn instance(&self) -> &Instance {
        &self.instance
    }
}

impl Drop for VulkanInstance {
    fn drop(&mut self) {
        unsafe {
            if let (Some(debug_utils), Some(messenger)) = (&self.debug_utils, self.debug_messenger)
            {
                debug_utils.destroy_debug_utils_messenger(messenger, None);
            }
            self.instance.destroy_instance(None);
        }
    }
}

/// Routes validation-layer messages into the log
unsafe extern "system" fn debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _user_data: *mut std::ffi::c_void,
) -> vk::Bool32 {
    let callback_data = *callback_data;
    let message = CStr::from_ptr(callback_data.p_message).to_string_lossy();

    if message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        log::error!("[vulkan] {message_type:?} - {message}");
    } else if message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        log::warn!("[vulkan] {message_type:?} - {message}");
    } else {
        log::debug!("[vulkan] {message_type:?} - {message}");
    }

    vk::FALSE
}

/// Physical device selection and capabilities
pub struct PhysicalDeviceInfo {
    pub device: vk::PhysicalDevice,
    pub properties: vk::PhysicalDeviceProperties,
    pub graphics_family: u32,
    pub present_family: u32,
}

impl PhysicalDeviceInfo {
    /// Pick the first device with graphics + present queues and swapchain
    /// support
    pub fn select_suitable_device(
        instance: &Instance,
        surface: vk::SurfaceKHR,
        surface_loader: &Surface,
    ) -> RhiResult<Self> {
        let devices = unsafe { instance.enumerate_physical_devices() }
            .map_err(|e| RhiError::backend(BACKEND, "vkEnumeratePhysicalDevices", e))?;

        for device in devices {
            if let Some(info) = Self::evaluate_device(instance, device, surface, surface_loader)? {
                log::info!("selected GPU: {}", unsafe {
                    CStr::from_ptr(info.properties.device_name.as_ptr()).to_string_lossy()
                });
                return Ok(info);
            }
        }

        Err(RhiError::Backend {
            backend: BACKEND,
            operation: "physical device selection",
            code: "no suitable GPU found".to_string(),
        })
    }

    fn evaluate_device(
        instance: &Instance,
        device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
        surface_loader: &Surface,
    ) -> RhiResult<Option<Self>> {
        let properties = unsafe { instance.get_physical_device_properties(device) };
        let queue_families =
            unsafe { instance.get_physical_device_queue_family_properties(device) };

        let mut graphics_family = None;
        let mut present_family = None;

        for (index, family) in queue_families.iter().enumerate() {
            let index = index as u32;

            if family.queue_flags.contains(vk::QueueFlags::GRAPHICS) && graphics_family.is_none() {
                graphics_family = Some(index);
            }

            let present_support = unsafe {
                surface_loader.get_physical_device_surface_support(device, index, surface)
            }
            .map_err(|e| RhiError::backend(BACKEND, "vkGetPhysicalDeviceSurfaceSupportKHR", e))?;

            if present_support && present_family.is_none() {
                present_family = Some(index);
            }

            if graphics_family.is_some() && present_family.is_some() {
                break;
            }
        }

        let (Some(graphics_family), Some(present_family)) = (graphics_family, present_family)
        else {
            return Ok(None);
        };

        // The swapchain extension must be present
        let extensions = unsafe { instance.enumerate_device_extension_properties(device) }
            .map_err(|e| RhiError::backend(BACKEND, "vkEnumerateDeviceExtensionProperties", e))?;
        let has_swapchain = extensions.iter().any(|available| {
            (unsafe { CStr::from_ptr(available.extension_name.as_ptr()) }) == SwapchainLoader::name()
        });
        if !has_swapchain {
            return Ok(None);
        }

        Ok(Some(Self {
            device,
            properties,
            graphics_family,
            present_family,
        }))
    }
}

/// Logical device wrapper with RAII cleanup
pub struct LogicalDevice {
    pub device: Device,
    pub graphics_queue: vk::Queue,
    pub present_queue: vk::Queue,
    pub graphics_family: u32,
    pub swapchain_loader: SwapchainLoader,
}

impl LogicalDevice {
    /// Create the logical device with graphics and present queues
    pub fn new(instance: &Instance, physical_device: &PhysicalDeviceInfo) -> RhiResult<Self> {
        let unique_families: std::collections::HashSet<u32> = [
            physical_device.graphics_family,
            physical_device.present_family,
        ]
        .into_iter()
        .collect();

        let queue_infos: Vec<vk::DeviceQueueCreateInfo> = unique_families
            .iter()
            .map(|&family| {
                vk::DeviceQueueCreateInfo::builder()
                    .queue_family_index(family)
                    .queue_priorities(&[1.0])
                    .build()
            })
            .collect();

        let required_extensions = [SwapchainLoader::name().as_ptr()];

        let create_info = vk::DeviceCreateInfo::builder()
            .queue_create_infos(&queue_infos)
            .enabled_extension_names(&required_extensions);

        let device =
            unsafe { instance.create_device(physical_device.device, &create_info, None) }
                .map_err(|e| RhiError::backend(BACKEND, "vkCreateDevice", e))?;

        let graphics_queue =
            unsafe { device.get_device_queue(physical_device.graphics_family, 0) };
        let present_queue = unsafe { device.get_device_queue(physical_device.present_family, 0) };
        let swapchain_loader = SwapchainLoader::new(instance, &device);

        Ok(Self {
            device,
            graphics_queue,
            present_queue,
            graphics_family: physical_device.graphics_family,
            swapchain_loader,
        })
    }
}

impl Drop for LogicalDevice {
    fn drop(&mut self) {
        unsafe {
            let _ = self.device.device_wait_idle();
            self.device.destroy_device(None);
        }
    }
}
