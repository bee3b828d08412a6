use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::render::buffer::{BufferHandle, BufferTarget, BufferUsage, OrphanedBuffers};
use crate::render::context::tracker::ContextTracker;
use crate::render::context::{AttributeLocation, IndexType, RenderContext, VertexAttributeLayout};
use crate::render::primitive::Topology;

/// Draws are queued until [`WgpuRenderContext::replay_draws`]. Attribute
/// location `N` is fed from vertex buffer slot `N`.
pub struct WgpuRenderContext {
    device: Rc<wgpu::Device>,
    queue: Rc<wgpu::Queue>,
    tracker: ContextTracker,
    gpu_buffers: HashMap<BufferHandle, wgpu::Buffer>,
    orphans: OrphanedBuffers,
}

impl WgpuRenderContext {
    pub fn for_program(
        device: Rc<wgpu::Device>,
        queue: Rc<wgpu::Queue>,
        program_inputs: Vec<(AttributeLocation, VertexAttributeLayout)>,
    ) -> Self {
        Self {
            device,
            queue,
            tracker: ContextTracker::with_program_inputs(program_inputs),
            gpu_buffers: HashMap::new(),
            orphans: OrphanedBuffers::default(),
        }
    }

    pub fn replay_draws<'p>(
        &mut self,
        render_pass: &mut wgpu::RenderPass,
        pipeline_for: impl Fn(Topology) -> Option<&'p wgpu::RenderPipeline>,
    ) -> Result<usize> {
        let draws = self.tracker.take_draws();

        // Empty buffers cannot be sliced.
        for draw in draws.iter().filter(|draw| draw.count > 0) {
            let pipeline = pipeline_for(draw.topology).ok_or_else(|| {
                Error::context(format!("No render pipeline for {:?}", draw.topology))
            })?;
            render_pass.set_pipeline(pipeline);

            for (location, source) in draw.vertex_buffers.iter() {
                let gpu_buffer = self.gpu_buffer(source.buffer)?;
                render_pass.set_vertex_buffer(location.0, gpu_buffer.slice(source.layout.offset..));
            }

            let index_buffer = self.gpu_buffer(draw.index_buffer)?;
            render_pass.set_index_buffer(
                index_buffer.slice(draw.index_offset..),
                draw.index_type.to_wgpu(),
            );
            render_pass.draw_indexed(0..draw.count, 0, 0..1);
        }

        log::trace!("Replayed {} draws", draws.len());
        Ok(draws.len())
    }

    fn gpu_buffer(&self, buffer: BufferHandle) -> Result<&wgpu::Buffer> {
        self.gpu_buffers
            .get(&buffer)
            .ok_or(Error::UnknownBuffer(buffer))
    }
}

impl RenderContext for WgpuRenderContext {
    fn create_buffers(&mut self, count: usize) -> Result<Vec<BufferHandle>> {
        Ok(self.tracker.create_buffers(count))
    }

    fn delete_buffers(&mut self, buffers: &[BufferHandle]) {
        for buffer in self.tracker.delete_buffers(buffers) {
            if let Some(gpu_buffer) = self.gpu_buffers.remove(&buffer) {
                gpu_buffer.destroy();
            }
        }
    }

    fn bound_buffer(&self, target: BufferTarget) -> Option<BufferHandle> {
        self.tracker.bound_buffer(target)
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferHandle>) -> Result<()> {
        self.tracker.bind_buffer(target, buffer)
    }

    fn buffer_data(&mut self, target: BufferTarget, data: &[u8], usage: BufferUsage) -> Result<()> {
        let upload = self.tracker.record_upload(target, data.len())?;

        if upload.reallocate {
            if let Some(previous) = self.gpu_buffers.remove(&upload.buffer) {
                previous.destroy();
            }

            log::trace!(
                "Allocating {} bytes for buffer {} ({usage:?})",
                upload.capacity,
                upload.buffer.id()
            );

            let gpu_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(&format!("MESH_BUFFER_{}", upload.buffer.id())),
                size: upload.capacity,
                usage: wgpu::BufferUsages::VERTEX
                    | wgpu::BufferUsages::INDEX
                    | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            self.gpu_buffers.insert(upload.buffer, gpu_buffer);
        }

        if data.is_empty() {
            return Ok(());
        }

        let gpu_buffer = self.gpu_buffer(upload.buffer)?;
        match data.len() as u64 == upload.capacity {
            true => self.queue.write_buffer(gpu_buffer, 0, data),
            false => {
                let mut padded = data.to_vec();
                padded.resize(upload.capacity as usize, 0);
                self.queue.write_buffer(gpu_buffer, 0, &padded);
            }
        }

        Ok(())
    }

    fn enable_vertex_attribute(&mut self, location: AttributeLocation) {
        self.tracker.enable_vertex_attribute(location);
    }

    fn disable_vertex_attribute(&mut self, location: AttributeLocation) {
        self.tracker.disable_vertex_attribute(location);
    }

    fn vertex_attribute_layout(
        &mut self,
        location: AttributeLocation,
        layout: VertexAttributeLayout,
    ) -> Result<()> {
        self.tracker.vertex_attribute_layout(location, layout)?;
        Ok(())
    }

    fn draw_elements(
        &mut self,
        topology: Topology,
        count: usize,
        index_type: IndexType,
        offset: u64,
    ) -> Result<()> {
        self.tracker
            .draw_elements(topology, count, index_type, offset)?;
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
