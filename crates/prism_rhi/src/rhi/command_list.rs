//! Command list recording interface and its state machine
//!
//! Both backends run the same `Initial → Recording → Executable` lifecycle;
//! the transition checks live here so neither backend re-implements them.

use crate::backends::headless::HeadlessCommandList;
use crate::backends::vulkan::VulkanCommandList;
use crate::rhi::{Rect2D, RhiBuffer, RhiError, RhiResult, Viewport};

/// Recording lifecycle of a command list.
///
/// `begin` resets the underlying recording target, so `Executable` lists can
/// be re-begun without an explicit reset operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordState {
    #[default]
    Initial,
    Recording,
    /// Recording finished; ready for submission
    Executable,
}

impl RecordState {
    /// Transition into `Recording`
    pub fn begin(&mut self) -> RhiResult<()> {
        match self {
            Self::Recording => Err(RhiError::invalid_state("command list is already recording")),
            Self::Initial | Self::Executable => {
                *self = Self::Recording;
                Ok(())
            }
        }
    }

    /// Transition out of `Recording`
    pub fn end(&mut self) -> RhiResult<()> {
        match self {
            Self::Recording => {
                *self = Self::Executable;
                Ok(())
            }
            _ => Err(RhiError::invalid_state(
                "command list is not in a recording state",
            )),
        }
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording)
    }

    /// Guard for operations that may only be recorded
    pub fn require_recording(&self, operation: &str) -> RhiResult<()> {
        if self.is_recording() {
            Ok(())
        } else {
            Err(RhiError::invalid_state(format!(
                "{operation} requires an active recording"
            )))
        }
    }

    /// Guard for submission; a list mid-recording must never reach the queue
    pub fn require_executable(&self, operation: &str) -> RhiResult<()> {
        match self {
            Self::Executable => Ok(()),
            Self::Recording => Err(RhiError::invalid_state(format!(
                "{operation}: command list is still recording"
            ))),
            Self::Initial => Err(RhiError::invalid_state(format!(
                "{operation}: command list has not recorded anything"
            ))),
        }
    }
}

/// Records a sequence of GPU commands into a backend-specific buffer.
///
/// Lists are owned by a [`RhiCommandQueue`] pool and addressed by a stable
/// `id`; the [`Frame`] token references lists by id rather than by borrow.
///
/// [`RhiCommandQueue`]: crate::rhi::RhiCommandQueue
/// [`Frame`]: crate::rhi::Frame
pub trait RhiCommandList: std::fmt::Debug {
    /// Begin recording, resetting the underlying recording target.
    ///
    /// Fails with `InvalidState` if the list is already recording.
    fn begin(&mut self) -> RhiResult<()>;

    /// End recording, leaving the list executable.
    ///
    /// Fails with `InvalidState` if the list is not recording.
    fn end(&mut self) -> RhiResult<()>;

    fn state(&self) -> RecordState;

    /// Stable index of this list within its owning queue's pool
    fn id(&self) -> u32;

    /// Encode a non-indexed draw. No bounds validation against bound
    /// buffers is performed.
    fn draw(
        &mut self,
        vertex_count: u32,
        instance_count: u32,
        first_vertex: u32,
        first_instance: u32,
    ) -> RhiResult<()>;

    /// Encode an indexed draw
    fn draw_indexed(
        &mut self,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        first_instance: u32,
    ) -> RhiResult<()>;

    /// Bind a vertex buffer; the buffer must have been created with
    /// `BufferType::Vertex`
    fn bind_vertex_buffer(&mut self, buffer: &dyn RhiBuffer) -> RhiResult<()>;

    /// Bind an index buffer (u32 indices); the buffer must have been created
    /// with `BufferType::Index`
    fn bind_index_buffer(&mut self, buffer: &dyn RhiBuffer) -> RhiResult<()>;

    /// Encode a full-size device copy. Both buffers must stay alive until
    /// GPU execution of this list completes, not just until recording ends.
    fn copy_buffer(&mut self, src: &dyn RhiBuffer, dst: &dyn RhiBuffer) -> RhiResult<()>;

    /// Set the dynamic viewport
    fn set_viewport(&mut self, viewport: Viewport) -> RhiResult<()>;

    /// Set the dynamic scissor rectangle
    fn set_scissor(&mut self, scissor: Rect2D) -> RhiResult<()>;

    /// Capability accessor for the Vulkan backend
    fn as_vulkan(&self) -> Option<&VulkanCommandList> {
        None
    }

    /// Capability accessor for the headless backend
    fn as_headless(&self) -> Option<&HeadlessCommandList> {
        None
    }

    /// Mutable capability accessor for the headless backend; recording
    /// through `&mut dyn` needs it
    fn as_headless_mut(&mut self) -> Option<&mut HeadlessCommandList> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_state_can_begin() {
        let mut state = RecordState::default();
        assert_eq!(state, RecordState::Initial);
        assert!(state.begin().is_ok());
        assert!(state.is_recording());
    }

    #[test]
    fn test_begin_while_recording_fails() {
        let mut state = RecordState::default();
        state.begin().unwrap();
        let err = state.begin().unwrap_err();
        assert!(matches!(err, RhiError::InvalidState { .. }));
        // The failed begin must not corrupt the state
        assert!(state.is_recording());
    }

    #[test]
    fn test_end_without_begin_fails() {
        let mut state = RecordState::default();
        assert!(matches!(
            state.end().unwrap_err(),
            RhiError::InvalidState { .. }
        ));
    }

    #[test]
    fn test_end_twice_fails() {
        let mut state = RecordState::default();
        state.begin().unwrap();
        state.end().unwrap();
        assert!(matches!(
            state.end().unwrap_err(),
            RhiError::InvalidState { .. }
        ));
    }

    #[test]
    fn test_executable_list_can_rebegin() {
        let mut state = RecordState::default();
        state.begin().unwrap();
        state.end().unwrap();
        assert_eq!(state, RecordState::Executable);
        assert!(state.begin().is_ok());
    }

    #[test]
    fn test_submission_guards() {
        let mut state = RecordState::default();
        assert!(state.require_executable("submit").is_err());
        state.begin().unwrap();
        assert!(state.require_executable("submit").is_err());
        assert!(state.require_recording("draw").is_ok());
        state.end().unwrap();
        assert!(state.require_executable("submit").is_ok());
        assert!(state.require_recording("draw").is_err());
    }
}
