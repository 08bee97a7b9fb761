//! Swapchain stand-in with round-robin image acquisition

use std::cell::{Cell, RefCell};

use crate::rhi::{Format, Offset2D, Rect2D, RhiSwapchain, Size2D, Viewport};

/// Presentable image set without a presentation engine.
///
/// Acquisition walks the image indices round-robin, which satisfies the real
/// swapchain's only contract: every acquired index is a valid image and the
/// sequence is independent of the frame-in-flight slot.
pub struct HeadlessSwapchain {
    extent: Size2D,
    format: Format,
    image_count: u32,
    viewport: Viewport,
    scissor: Rect2D,
    next_image: Cell<u32>,
    presented: RefCell<Vec<u32>>,
}

impl HeadlessSwapchain {
    pub fn new(extent: Size2D, image_count: u32) -> Self {
        let viewport = Viewport {
            x: 0.0,
            y: 0.0,
            width: extent.width as f32,
            height: extent.height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        };
        let scissor = Rect2D {
            offset: Offset2D::default(),
            size: extent,
        };
        Self {
            extent,
            format: Format::B8G8R8A8Unorm,
            image_count,
            viewport,
            scissor,
            next_image: Cell::new(0),
            presented: RefCell::new(Vec::new()),
        }
    }

    /// Hand out the next image index
    pub fn acquire_next_image(&self) -> u32 {
        let index = self.next_image.get();
        self.next_image.set((index + 1) % self.image_count);
        index
    }

    /// Record a presentation of `image_index`
    pub fn present(&self, image_index: u32) {
        self.presented.borrow_mut().push(image_index);
    }

    /// Every image index presented so far, in order
    pub fn presented(&self) -> Vec<u32> {
        self.presented.borrow().clone()
    }
}

impl RhiSwapchain for HeadlessSwapchain {
    fn size(&self) -> Size2D {
        self.extent
    }

    fn format(&self) -> Format {
        self.format
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

    fn as_headless(&self) -> Option<&HeadlessSwapchain> {
        Some(self)
    }
}
