//! Deferred destruction of GPU resources
//!
//! Dropping a buffer or texture frees its native allocation immediately,
//! which is unsound while GPU work referencing it is still in flight. The
//! deletion queue holds retired resources in per-frame-slot bins and drops a
//! bin only after its slot's fence has been waited on again. Because a
//! single queue executes submissions in order, the fence of the retiring
//! frame also bounds every earlier frame's work.

use crate::rhi::{RhiBuffer, RhiTexture};

/// A resource whose ownership has been handed to the deletion queue
pub enum RetiredResource {
    Buffer(Box<dyn RhiBuffer>),
    Texture(Box<dyn RhiTexture>),
}

/// Per-slot bins of resources awaiting their safe destruction point
pub struct DeletionQueue {
    bins: Vec<Vec<RetiredResource>>,
}

impl DeletionQueue {
    pub fn new(frames_in_flight: u32) -> Self {
        Self {
            bins: (0..frames_in_flight).map(|_| Vec::new()).collect(),
        }
    }

    /// Park a resource in `slot`'s bin; `slot` must be the frame slot that
    /// was current when the resource was last referenced
    pub fn retire(&mut self, slot: u32, resource: RetiredResource) {
        self.bins[slot as usize].push(resource);
    }

    /// Drop everything parked in `slot`'s bin. Call after waiting on that
    /// slot's frame-in-flight fence.
    pub fn collect(&mut self, slot: u32) {
        let bin = &mut self.bins[slot as usize];
        if !bin.is_empty() {
            log::debug!("dropping {} retired resource(s) for slot {slot}", bin.len());
            bin.clear();
        }
    }

    /// Drop every bin. Only valid once the device is idle.
    pub fn flush(&mut self) {
        for slot in 0..self.bins.len() {
            self.collect(slot as u32);
        }
    }

    /// Number of resources currently awaiting destruction
    pub fn pending(&self) -> usize {
        self.bins.iter().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rhi::{BufferType, RhiCommandList, RhiResult};
    use std::rc::Rc;

    struct DropProbe {
        _alive: Rc<()>,
    }

    impl RhiBuffer for DropProbe {
        fn size(&self) -> u64 {
            0
        }
        fn offset(&self) -> u64 {
            0
        }
        fn buffer_type(&self) -> BufferType {
            BufferType::Staging
        }
        fn set_data(&self, _data: &[u8]) -> RhiResult<()> {
            Ok(())
        }
        fn upload_data(
            &self,
            _data: &[u8],
            _command_list: &mut dyn RhiCommandList,
            _staging: &dyn RhiBuffer,
        ) -> RhiResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_collect_drops_only_the_given_slot() {
        let alive = Rc::new(());
        let mut queue = DeletionQueue::new(2);
        queue.retire(
            0,
            RetiredResource::Buffer(Box::new(DropProbe {
                _alive: alive.clone(),
            })),
        );
        queue.retire(
            1,
            RetiredResource::Buffer(Box::new(DropProbe {
                _alive: alive.clone(),
            })),
        );
        assert_eq!(Rc::strong_count(&alive), 3);

        queue.collect(0);
        assert_eq!(Rc::strong_count(&alive), 2);
        assert_eq!(queue.pending(), 1);

        queue.collect(1);
        assert_eq!(Rc::strong_count(&alive), 1);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn test_flush_empties_every_bin() {
        let alive = Rc::new(());
        let mut queue = DeletionQueue::new(3);
        for slot in 0..3 {
            queue.retire(
                slot,
                RetiredResource::Buffer(Box::new(DropProbe {
                    _alive: alive.clone(),
                })),
            );
        }
        queue.flush();
        assert_eq!(Rc::strong_count(&alive), 1);
    }
}
