//! Command recording as an inspectable log

use crate::rhi::{
    BufferType, CommandQueueType, Rect2D, RecordState, RhiBuffer, RhiCommandList, RhiCommandQueue,
    RhiError, RhiResult, Viewport,
};

/// One entry of a headless command list's log
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCommand {
    Begin,
    End,
    BeginRenderPass { pass: String },
    EndRenderPass { pass: String },
    BindPipeline { pipeline: String },
    BindVertexBuffer,
    BindIndexBuffer,
    CopyBuffer { bytes: u64 },
    SetViewport(Viewport),
    SetScissor(Rect2D),
    Draw { vertex_count: u32, instance_count: u32 },
    DrawIndexed { index_count: u32, instance_count: u32 },
}

/// Command list that records into a log instead of a GPU buffer.
///
/// Transfers execute eagerly at record time; everything else is observable
/// ordering for tests.
#[derive(Debug)]
pub struct HeadlessCommandList {
    id: u32,
    state: RecordState,
    commands: Vec<RecordedCommand>,
}

impl HeadlessCommandList {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            state: RecordState::default(),
            commands: Vec::new(),
        }
    }

    /// The log of the current/most recent recording
    pub fn commands(&self) -> &[RecordedCommand] {
        &self.commands
    }

    pub(crate) fn push(&mut self, command: RecordedCommand) {
        self.commands.push(command);
    }

    pub(crate) fn record_state(&self) -> &RecordState {
        &self.state
    }
}

impl RhiCommandList for HeadlessCommandList {
    fn begin(&mut self) -> RhiResult<()> {
        self.state.begin()?;
        // Matches the implicit command-buffer reset of a real begin
        self.commands.clear();
        self.commands.push(RecordedCommand::Begin);
        Ok(())
    }

    fn end(&mut self) -> RhiResult<()> {
        self.state.end()?;
        self.commands.push(RecordedCommand::End);
        Ok(())
    }

    fn state(&self) -> RecordState {
        self.state
    }

    fn id(&self) -> u32 {
        self.id
    }

    fn draw(
        &mut self,
        vertex_count: u32,
        instance_count: u32,
        _first_vertex: u32,
        _first_instance: u32,
    ) -> RhiResult<()> {
        self.state.require_recording("draw")?;
        self.commands.push(RecordedCommand::Draw {
            vertex_count,
            instance_count,
        });
        Ok(())
    }

    fn draw_indexed(
        &mut self,
        index_count: u32,
        instance_count: u32,
        _first_index: u32,
        _vertex_offset: i32,
        _first_instance: u32,
    ) -> RhiResult<()> {
        self.state.require_recording("draw_indexed")?;
        self.commands.push(RecordedCommand::DrawIndexed {
            index_count,
            instance_count,
        });
        Ok(())
    }

    fn bind_vertex_buffer(&mut self, buffer: &dyn RhiBuffer) -> RhiResult<()> {
        self.state.require_recording("bind_vertex_buffer")?;
        if buffer.buffer_type() != BufferType::Vertex {
            return Err(RhiError::invalid_state(format!(
                "bind_vertex_buffer on a {:?} buffer",
                buffer.buffer_type()
            )));
        }
        self.commands.push(RecordedCommand::BindVertexBuffer);
        Ok(())
    }

    fn bind_index_buffer(&mut self, buffer: &dyn RhiBuffer) -> RhiResult<()> {
        self.state.require_recording("bind_index_buffer")?;
        if buffer.buffer_type() != BufferType::Index {
            return Err(RhiError::invalid_state(format!(
                "bind_index_buffer on a {:?} buffer",
                buffer.buffer_type()
            )));
        }
        self.commands.push(RecordedCommand::BindIndexBuffer);
        Ok(())
    }

    fn copy_buffer(&mut self, src: &dyn RhiBuffer, dst: &dyn RhiBuffer) -> RhiResult<()> {
        self.state.require_recording("copy_buffer")?;
        let src = src
            .as_headless()
            .ok_or_else(|| RhiError::invalid_state("copy source is not a headless buffer"))?;
        let dst = dst
            .as_headless()
            .ok_or_else(|| RhiError::invalid_state("copy destination is not a headless buffer"))?;
        dst.write_from(src, src.size())?;
        self.commands
            .push(RecordedCommand::CopyBuffer { bytes: src.size() });
        Ok(())
    }

    fn set_viewport(&mut self, viewport: Viewport) -> RhiResult<()> {
        self.state.require_recording("set_viewport")?;
        self.commands.push(RecordedCommand::SetViewport(viewport));
        Ok(())
    }

    fn set_scissor(&mut self, scissor: Rect2D) -> RhiResult<()> {
        self.state.require_recording("set_scissor")?;
        self.commands.push(RecordedCommand::SetScissor(scissor));
        Ok(())
    }

    fn as_headless(&self) -> Option<&HeadlessCommandList> {
        Some(self)
    }

    fn as_headless_mut(&mut self) -> Option<&mut HeadlessCommandList> {
        Some(self)
    }
}

/// Queue with the standard pool layout: one list per frame in flight plus a
/// dedicated single-time list
pub struct HeadlessCommandQueue {
    lists: Vec<HeadlessCommandList>,
    single_time: HeadlessCommandList,
}

impl HeadlessCommandQueue {
    pub fn new(pool_size: u32) -> Self {
        Self {
            lists: (0..pool_size).map(HeadlessCommandList::new).collect(),
            single_time: HeadlessCommandList::new(pool_size),
        }
    }

    /// Submission-time validation: every id must address the pool and every
    /// addressed list must be executable
    pub(crate) fn validate_for_submit(&self, ids: &[u32]) -> RhiResult<()> {
        for &id in ids {
            let list = self
                .lists
                .get(id as usize)
                .ok_or(RhiError::OutOfRange {
                    index: id as usize,
                    size: self.lists.len(),
                })?;
            list.record_state().require_executable("submit_frame")?;
        }
        Ok(())
    }
}

impl RhiCommandQueue for HeadlessCommandQueue {
    fn command_list(&mut self, index: u32) -> RhiResult<&mut dyn RhiCommandList> {
        let size = self.lists.len();
        self.lists
            .get_mut(index as usize)
            .map(|list| list as &mut dyn RhiCommandList)
            .ok_or(RhiError::OutOfRange {
                index: index as usize,
                size,
            })
    }

    fn pool_size(&self) -> u32 {
        self.lists.len() as u32
    }

    fn queue_type(&self) -> CommandQueueType {
        CommandQueueType::Graphics
    }

    fn execute_single_time_command(
        &mut self,
        record: &mut dyn FnMut(&mut dyn RhiCommandList) -> RhiResult<()>,
    ) -> RhiResult<()> {
        if self.single_time.state().is_recording() {
            return Err(RhiError::invalid_state(
                "single-time command list is already recording",
            ));
        }
        self.single_time.begin()?;
        let body_result = record(&mut self.single_time);
        self.single_time.end()?;
        // Nothing is submitted for a failed recording
        body_result?;
        log::debug!("single-time command executed ({} commands)", self.single_time.commands().len());
        Ok(())
    }
}
