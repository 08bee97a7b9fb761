//! Byte-backed buffer and texture stand-ins

use std::cell::{Ref, RefCell};

use crate::rhi::{
    BufferType, Format, RhiBuffer, RhiCommandList, RhiError, RhiResult, RhiTexture, Size2D,
};

/// Buffer whose "GPU memory" is a plain byte vector.
///
/// Placement rules match the Vulkan backend: host-visible types accept
/// `set_data`, device-local types only fill through the staging copy path.
pub struct HeadlessBuffer {
    size: u64,
    buffer_type: BufferType,
    contents: RefCell<Vec<u8>>,
    debug_name: String,
}

impl HeadlessBuffer {
    pub fn new(size: u64, buffer_type: BufferType, debug_name: &str) -> Self {
        log::debug!("created headless buffer '{debug_name}' ({size} bytes, {buffer_type:?})");
        Self {
            size,
            buffer_type,
            contents: RefCell::new(vec![0; size as usize]),
            debug_name: debug_name.to_string(),
        }
    }

    pub fn debug_name(&self) -> &str {
        &self.debug_name
    }

    /// Current contents; the read-back half of the upload round trip
    pub fn contents(&self) -> Ref<'_, Vec<u8>> {
        self.contents.borrow()
    }

    /// Copy `len` bytes out of `src`, bypassing placement rules the way a
    /// device-side copy does
    pub(crate) fn write_from(&self, src: &HeadlessBuffer, len: u64) -> RhiResult<()> {
        if len > self.size {
            return Err(RhiError::invalid_state(format!(
                "copy of {len} bytes exceeds destination '{}' ({} bytes)",
                self.debug_name, self.size
            )));
        }
        let src_contents = src.contents.borrow();
        self.contents.borrow_mut()[..len as usize].copy_from_slice(&src_contents[..len as usize]);
        Ok(())
    }
}

impl RhiBuffer for HeadlessBuffer {
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
        self.contents.borrow_mut()[..data.len()].copy_from_slice(data);
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

    fn as_headless(&self) -> Option<&HeadlessBuffer> {
        Some(self)
    }
}

/// Texture stand-in; carries only its descriptive state
pub struct HeadlessTexture {
    size: Size2D,
    format: Format,
    debug_name: String,
}

impl HeadlessTexture {
    pub fn new(size: Size2D, format: Format, debug_name: &str) -> Self {
        log::debug!(
            "created headless texture '{debug_name}' ({}x{}, {format:?})",
            size.width,
            size.height
        );
        Self {
            size,
            format,
            debug_name: debug_name.to_string(),
        }
    }

    pub fn debug_name(&self) -> &str {
        &self.debug_name
    }
}

impl RhiTexture for HeadlessTexture {
    fn size(&self) -> Size2D {
        self.size
    }

    fn format(&self) -> Format {
        self.format
    }

    fn as_headless(&self) -> Option<&HeadlessTexture> {
        Some(self)
    }
}
