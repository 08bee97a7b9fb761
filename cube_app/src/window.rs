//! GLFW window wrapper
//!
//! The RHI only sees this through the `RhiWindow` trait; everything else is
//! application plumbing.

use prism_rhi::prelude::*;
use raw_window_handle::{
    HasRawDisplayHandle, HasRawWindowHandle, RawDisplayHandle, RawWindowHandle,
};
use thiserror::Error;

/// Window management errors
#[derive(Error, Debug)]
pub enum WindowError {
    #[error("GLFW initialization failed")]
    InitializationFailed,

    #[error("Window creation failed")]
    CreationFailed,
}

/// GLFW window with its event receiver
pub struct Window {
    glfw: glfw::Glfw,
    window: glfw::PWindow,
    _events: glfw::GlfwReceiver<(f64, glfw::WindowEvent)>,
}

impl Window {
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self, WindowError> {
        let mut glfw =
            glfw::init(glfw::fail_on_errors).map_err(|_| WindowError::InitializationFailed)?;

        // Vulkan only, no OpenGL context
        glfw.window_hint(glfw::WindowHint::ClientApi(glfw::ClientApiHint::NoApi));
        glfw.window_hint(glfw::WindowHint::Resizable(false));

        let (mut window, events) = glfw
            .create_window(width, height, title, glfw::WindowMode::Windowed)
            .ok_or(WindowError::CreationFailed)?;

        window.set_key_polling(true);
        window.set_close_polling(true);

        Ok(Self {
            glfw,
            window,
            _events: events,
        })
    }

    pub fn should_close(&self) -> bool {
        self.window.should_close()
    }

    pub fn poll_events(&mut self) {
        self.glfw.poll_events();
    }
}

impl HasRawWindowHandle for Window {
    fn raw_window_handle(&self) -> RawWindowHandle {
        self.window.raw_window_handle()
    }
}

impl HasRawDisplayHandle for Window {
    fn raw_display_handle(&self) -> RawDisplayHandle {
        self.window.raw_display_handle()
    }
}

impl RhiWindow for Window {
    fn framebuffer_size(&self) -> Size2D {
        let (width, height) = self.window.get_framebuffer_size();
        Size2D::new(width as u32, height as u32)
    }

    fn required_instance_extensions(&self) -> Option<Vec<String>> {
        self.glfw.get_required_instance_extensions()
    }
}
