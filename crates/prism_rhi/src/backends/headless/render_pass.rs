//! Render pass, framebuffer, and pipeline stand-ins

use crate::backends::headless::commands::RecordedCommand;
use crate::rhi::{
    Rect2D, RhiCommandList, RhiError, RhiFramebuffer, RhiPipeline, RhiRenderPass, RhiResult,
    Size2D,
};

fn headless_list<'a>(
    command_list: &'a mut dyn RhiCommandList,
    what: &str,
) -> RhiResult<&'a mut super::HeadlessCommandList> {
    command_list
        .as_headless_mut()
        .ok_or_else(|| RhiError::invalid_state(format!("{what}: command list is not headless")))
}

/// Render pass that records begin/end markers around the caller's body
pub struct HeadlessRenderPass {
    debug_name: String,
    render_area: Rect2D,
    color_attachment_count: u32,
    has_depth: bool,
}

impl HeadlessRenderPass {
    pub fn new(
        debug_name: &str,
        render_area: Rect2D,
        color_attachment_count: u32,
        has_depth: bool,
    ) -> Self {
        Self {
            debug_name: debug_name.to_string(),
            render_area,
            color_attachment_count,
            has_depth,
        }
    }

    pub fn color_attachment_count(&self) -> u32 {
        self.color_attachment_count
    }
}

impl RhiRenderPass for HeadlessRenderPass {
    fn execute(
        &self,
        command_list: &mut dyn RhiCommandList,
        framebuffer: &dyn RhiFramebuffer,
        image_index: u32,
        body: &mut dyn FnMut(&mut dyn RhiCommandList) -> RhiResult<()>,
    ) -> RhiResult<()> {
        if image_index >= framebuffer.count() {
            return Err(RhiError::OutOfRange {
                index: image_index as usize,
                size: framebuffer.count() as usize,
            });
        }
        {
            let list = headless_list(command_list, "render pass execute")?;
            list.record_state().require_recording("render pass execute")?;
            list.push(RecordedCommand::BeginRenderPass {
                pass: self.debug_name.clone(),
            });
        }
        body(command_list)?;
        let list = headless_list(command_list, "render pass execute")?;
        list.push(RecordedCommand::EndRenderPass {
            pass: self.debug_name.clone(),
        });
        Ok(())
    }

    fn render_area(&self) -> Rect2D {
        self.render_area
    }

    fn has_depth_attachment(&self) -> bool {
        self.has_depth
    }

    fn as_headless(&self) -> Option<&HeadlessRenderPass> {
        Some(self)
    }
}

/// Framebuffer set stand-in
pub struct HeadlessFramebuffer {
    count: u32,
    extent: Size2D,
}

impl HeadlessFramebuffer {
    pub fn new(count: u32, extent: Size2D) -> Self {
        Self { count, extent }
    }
}

impl RhiFramebuffer for HeadlessFramebuffer {
    fn count(&self) -> u32 {
        self.count
    }

    fn extent(&self) -> Size2D {
        self.extent
    }

    fn as_headless(&self) -> Option<&HeadlessFramebuffer> {
        Some(self)
    }
}

/// Pipeline stand-in; binding records a log entry
pub struct HeadlessPipeline {
    debug_name: String,
}

impl HeadlessPipeline {
    pub fn new(debug_name: &str) -> Self {
        Self {
            debug_name: debug_name.to_string(),
        }
    }
}

impl RhiPipeline for HeadlessPipeline {
    fn bind(&self, command_list: &mut dyn RhiCommandList) -> RhiResult<()> {
        let list = headless_list(command_list, "pipeline bind")?;
        list.record_state().require_recording("pipeline bind")?;
        list.push(RecordedCommand::BindPipeline {
            pipeline: self.debug_name.clone(),
        });
        Ok(())
    }

    fn as_headless(&self) -> Option<&HeadlessPipeline> {
        Some(self)
    }
}
