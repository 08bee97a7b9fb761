//! Window/surface provider interface
//!
//! Windowing is an external collaborator: the RHI needs only the pixel
//! dimensions for the swapchain extent and the raw handles to create a
//! presentable surface. The GLFW wrapper lives with the application.

use crate::rhi::Size2D;
use raw_window_handle::{HasRawDisplayHandle, HasRawWindowHandle};

/// The two capabilities the RHI consumes from a window
pub trait RhiWindow: HasRawWindowHandle + HasRawDisplayHandle {
    /// Framebuffer dimensions in pixels (not screen coordinates)
    fn framebuffer_size(&self) -> Size2D;

    /// Instance extensions the windowing system needs for surface creation,
    /// if it reports them (GLFW does)
    fn required_instance_extensions(&self) -> Option<Vec<String>> {
        None
    }
}
