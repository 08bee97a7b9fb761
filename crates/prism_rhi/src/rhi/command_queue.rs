//! Command queue interface
//!
//! A queue owns a pool of command lists sized to the frames-in-flight count,
//! plus one dedicated list for synchronous one-shot work.

use crate::rhi::{CommandQueueType, RhiCommandList, RhiResult};

/// Owns command lists and submits recorded work to the GPU
pub trait RhiCommandQueue {
    /// Borrow the pooled command list at `index`.
    ///
    /// The index is expected to be the current frame-in-flight slot, not the
    /// acquired swapchain image index. `OutOfRange` beyond the pool.
    fn command_list(&mut self, index: u32) -> RhiResult<&mut dyn RhiCommandList>;

    /// Number of pooled command lists (equals frames in flight)
    fn pool_size(&self) -> u32;

    fn queue_type(&self) -> CommandQueueType;

    /// Record and run a one-shot command list synchronously.
    ///
    /// The dedicated single-time list is begun, `record` runs with it, the
    /// recording is closed on every exit path, and on success the list is
    /// submitted and the calling thread blocks until the GPU finishes. If
    /// `record` fails, nothing is submitted and its error propagates.
    ///
    /// Deliberately synchronous: one-off transfer work (staging uploads) is
    /// not worth overlapping with the frame pipeline. Calling this while the
    /// single-time list is already recording is an `InvalidState` error —
    /// there is no nested recording.
    fn execute_single_time_command(
        &mut self,
        record: &mut dyn FnMut(&mut dyn RhiCommandList) -> RhiResult<()>,
    ) -> RhiResult<()>;
}
