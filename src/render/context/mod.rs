use crate::error::Result;
use crate::render::buffer::{BufferHandle, BufferTarget, BufferUsage, OrphanedBuffers};
use crate::render::primitive::Topology;

pub mod gpu;
pub mod recording;
mod tracker;

pub use tracker::{AttributeSource, QueuedDraw};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttributeLocation(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexType {
    U16,
}

impl IndexType {
    pub fn size(&self) -> usize {
        match self {
            IndexType::U16 => std::mem::size_of::<u16>(),
        }
    }

    pub fn to_wgpu(self) -> wgpu::IndexFormat {
        match self {
            IndexType::U16 => wgpu::IndexFormat::Uint16,
        }
    }
}

// A stride of 0 means tightly packed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttributeLayout {
    pub components: u32,
    pub stride: u32,
    pub offset: u64,
}

impl VertexAttributeLayout {
    pub fn packed_floats(components: u32) -> Self {
        Self {
            components,
            stride: 0,
            offset: 0,
        }
    }

    pub fn effective_stride(&self) -> u64 {
        match self.stride {
            0 => u64::from(self.components) * std::mem::size_of::<f32>() as u64,
            stride => u64::from(stride),
        }
    }
}

pub trait RenderContext {
    fn create_buffers(&mut self, count: usize) -> Result<Vec<BufferHandle>>;

    /// Unknown handles are ignored. Deleted buffers are unbound.
    fn delete_buffers(&mut self, buffers: &[BufferHandle]);

    fn bound_buffer(&self, target: BufferTarget) -> Option<BufferHandle>;

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferHandle>) -> Result<()>;

    fn buffer_data(&mut self, target: BufferTarget, data: &[u8], usage: BufferUsage) -> Result<()>;

    fn enable_vertex_attribute(&mut self, location: AttributeLocation);

    fn disable_vertex_attribute(&mut self, location: AttributeLocation);

    fn vertex_attribute_layout(
        &mut self,
        location: AttributeLocation,
        layout: VertexAttributeLayout,
    ) -> Result<()>;

    fn draw_elements(
        &mut self,
        topology: Topology,
        count: usize,
        index_type: IndexType,
        offset: u64,
    ) -> Result<()>;

    fn queued_draw_count(&self) -> usize;

    fn discard_queued_draws(&mut self, from: usize);

    fn orphaned_buffers(&self) -> OrphanedBuffers;

    /// Drops the draws `record` queued if it fails.
    fn record_frame<F>(&mut self, record: F) -> Result<()>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let mark = self.queued_draw_count();
        let result = record(self);

        if result.is_err() {
            log::debug!(
                "Discarding {} draws of a failed frame",
                self.queued_draw_count().saturating_sub(mark)
            );
            self.discard_queued_draws(mark);
        }

        result
    }

    fn collect_orphaned_buffers(&mut self) -> usize {
        let orphans = self.orphaned_buffers().take();

        if !orphans.is_empty() {
            log::debug!("Deleting {} orphaned buffers", orphans.len());
            self.delete_buffers(&orphans);
        }

        orphans.len()
    }
}
