use std::collections::HashMap;

use crate::error::Result;
use crate::render::buffer::{BufferHandle, BufferTarget, BufferUsage, OrphanedBuffers};
use crate::render::context::tracker::ContextTracker;
use crate::render::context::{
    AttributeLocation, AttributeSource, IndexType, QueuedDraw, RenderContext,
    VertexAttributeLayout,
};
use crate::render::primitive::Topology;

#[derive(Debug, Clone, PartialEq)]
pub enum ContextCall {
    CreateBuffers(Vec<BufferHandle>),
    DeleteBuffers(Vec<BufferHandle>),
    BindBuffer {
        target: BufferTarget,
        buffer: Option<BufferHandle>,
    },
    BufferData {
        target: BufferTarget,
        buffer: BufferHandle,
        size: usize,
        usage: BufferUsage,
    },
    EnableVertexAttribute(AttributeLocation),
    DisableVertexAttribute(AttributeLocation),
    VertexAttributeLayout {
        location: AttributeLocation,
        buffer: BufferHandle,
        layout: VertexAttributeLayout,
    },
    DrawElements {
        topology: Topology,
        count: usize,
        index_type: IndexType,
        offset: u64,
        index_buffer: BufferHandle,
    },
}

#[derive(Debug, Default)]
pub struct RecordingContext {
    calls: Vec<ContextCall>,
    contents: HashMap<BufferHandle, Vec<u8>>,
    tracker: ContextTracker,
    orphans: OrphanedBuffers,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_program_inputs(
        inputs: impl IntoIterator<Item = (AttributeLocation, VertexAttributeLayout)>,
    ) -> Self {
        Self {
            tracker: ContextTracker::with_program_inputs(inputs),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> &[ContextCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn count_calls(&self, predicate: impl Fn(&ContextCall) -> bool) -> usize {
        self.calls.iter().filter(|call| predicate(call)).count()
    }

    pub fn queued_draws(&self) -> &[QueuedDraw] {
        self.tracker.queued_draws()
    }

    pub fn is_live(&self, buffer: BufferHandle) -> bool {
        self.tracker.is_live(buffer)
    }

    pub fn live_buffer_count(&self) -> usize {
        self.tracker.live_buffer_count()
    }

    pub fn buffer_contents(&self, buffer: BufferHandle) -> Option<&[u8]> {
        self.contents.get(&buffer).map(Vec::as_slice)
    }

    pub fn buffer_f32s(&self, buffer: BufferHandle) -> Option<Vec<f32>> {
        self.buffer_contents(buffer).map(|bytes| {
            bytes
                .chunks_exact(4)
                .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
                .collect()
        })
    }

    pub fn buffer_u16s(&self, buffer: BufferHandle) -> Option<Vec<u16>> {
        self.buffer_contents(buffer).map(|bytes| {
            bytes
                .chunks_exact(2)
                .map(|b| u16::from_ne_bytes([b[0], b[1]]))
                .collect()
        })
    }

    pub fn is_attribute_enabled(&self, location: AttributeLocation) -> bool {
        self.tracker.is_attribute_enabled(location)
    }

    pub fn attribute_source(&self, location: AttributeLocation) -> Option<AttributeSource> {
        self.tracker.attribute_source(location)
    }
}

impl RenderContext for RecordingContext {
    fn create_buffers(&mut self, count: usize) -> Result<Vec<BufferHandle>> {
        let handles = self.tracker.create_buffers(count);

        for handle in handles.iter() {
            self.contents.insert(*handle, Vec::new());
        }

        self.calls.push(ContextCall::CreateBuffers(handles.clone()));
        Ok(handles)
    }

    fn delete_buffers(&mut self, buffers: &[BufferHandle]) {
        for buffer in self.tracker.delete_buffers(buffers) {
            self.contents.remove(&buffer);
        }

        self.calls.push(ContextCall::DeleteBuffers(buffers.to_vec()));
    }

    fn bound_buffer(&self, target: BufferTarget) -> Option<BufferHandle> {
        self.tracker.bound_buffer(target)
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferHandle>) -> Result<()> {
        self.tracker.bind_buffer(target, buffer)?;
        self.calls.push(ContextCall::BindBuffer { target, buffer });
        Ok(())
    }

    fn buffer_data(&mut self, target: BufferTarget, data: &[u8], usage: BufferUsage) -> Result<()> {
        let upload = self.tracker.record_upload(target, data.len())?;

        self.contents.insert(upload.buffer, data.to_vec());
        self.calls.push(ContextCall::BufferData {
            target,
            buffer: upload.buffer,
            size: data.len(),
            usage,
        });
        Ok(())
    }

    fn enable_vertex_attribute(&mut self, location: AttributeLocation) {
        self.tracker.enable_vertex_attribute(location);
        self.calls.push(ContextCall::EnableVertexAttribute(location));
    }

    fn disable_vertex_attribute(&mut self, location: AttributeLocation) {
        self.tracker.disable_vertex_attribute(location);
        self.calls.push(ContextCall::DisableVertexAttribute(location));
    }

    fn vertex_attribute_layout(
        &mut self,
        location: AttributeLocation,
        layout: VertexAttributeLayout,
    ) -> Result<()> {
        let buffer = self.tracker.vertex_attribute_layout(location, layout)?;

        self.calls.push(ContextCall::VertexAttributeLayout {
            location,
            buffer,
            layout,
        });
        Ok(())
    }

    fn draw_elements(
        &mut self,
        topology: Topology,
        count: usize,
        index_type: IndexType,
        offset: u64,
    ) -> Result<()> {
        let index_buffer = self
            .tracker
            .draw_elements(topology, count, index_type, offset)?;

        self.calls.push(ContextCall::DrawElements {
            topology,
            count,
            index_type,
            offset,
            index_buffer,
        });
        Ok(())
    }

    fn queued_draw_count(&self) -> usize {
        self.tracker.queued_draws().len()
    }

    fn discard_queued_draws(&mut self, from: usize) {
        self.tracker.discard_draws_from(from);
    }

    fn orphaned_buffers(&self) -> OrphanedBuffers {
        self.orphans.clone()
    }
}
