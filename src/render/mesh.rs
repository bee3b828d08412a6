use crate::error::{Error, Result};
use crate::render::buffer::{
    BufferBinding, BufferHandle, BufferTarget, BufferUsage, OrphanedBuffers,
};
use crate::render::context::{AttributeLocation, IndexType, RenderContext, VertexAttributeLayout};
use crate::render::primitive::Topology;

pub const POSITION_COMPONENTS: usize = 3;
pub const TEX_COORD_COMPONENTS: usize = 2;

/// Indexed geometry kept on the CPU, mirrored into three GPU buffers between
/// [`Mesh::create_gpu_buffers`] and [`Mesh::release_gpu_buffers`].
pub struct Mesh {
    positions: Vec<f32>,
    tex_coords: Vec<f32>,
    indices: Vec<u16>,
    vertex_count: usize,
    topology: Topology,
    gpu_buffers: Option<MeshBuffers>,
}

#[derive(Debug)]
pub struct MeshBuffers {
    position: BufferHandle,
    tex_coord: BufferHandle,
    index: BufferHandle,
    orphans: OrphanedBuffers,
}

impl MeshBuffers {
    pub fn position(&self) -> BufferHandle {
        self.position
    }

    pub fn tex_coord(&self) -> BufferHandle {
        self.tex_coord
    }

    pub fn index(&self) -> BufferHandle {
        self.index
    }

    fn handles(&self) -> [BufferHandle; 3] {
        [self.position, self.tex_coord, self.index]
    }
}

impl Mesh {
    pub fn new(
        positions: Vec<f32>,
        tex_coords: Vec<f32>,
        indices: Vec<u16>,
        topology: Topology,
    ) -> Result<Self> {
        if positions.len() % POSITION_COMPONENTS != 0 {
            return Err(Error::PositionLength {
                length: positions.len(),
            });
        }

        let vertex_count = positions.len() / POSITION_COMPONENTS;
        check_tex_coord_length(vertex_count, tex_coords.len())?;

        if let Some((position, &index)) = indices
            .iter()
            .enumerate()
            .find(|(_, &index)| usize::from(index) >= vertex_count)
        {
            return Err(Error::IndexOutOfRange {
                position,
                index,
                vertex_count,
            });
        }

        Ok(Self {
            positions,
            tex_coords,
            indices,
            vertex_count,
            topology,
            gpu_buffers: None,
        })
    }

    pub fn from_slices(
        positions: &[f32],
        tex_coords: &[f32],
        indices: &[u16],
        topology: Topology,
    ) -> Result<Self> {
        Self::new(
            positions.to_vec(),
            tex_coords.to_vec(),
            indices.to_vec(),
            topology,
        )
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn tex_coords(&self) -> &[f32] {
        &self.tex_coords
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn gpu_buffers(&self) -> Option<&MeshBuffers> {
        self.gpu_buffers.as_ref()
    }

    /// Does nothing if the buffers already exist.
    pub fn create_gpu_buffers<C: RenderContext + ?Sized>(&mut self, context: &mut C) -> Result<()> {
        if self.gpu_buffers.is_some() {
            log::debug!("Mesh buffers already created, skipping upload");
            return Ok(());
        }

        let handles = context.create_buffers(3)?;
        let [position, tex_coord, index] = match handles[..] {
            [position, tex_coord, index] => [position, tex_coord, index],
            _ => {
                context.delete_buffers(&handles);
                return Err(Error::context(format!(
                    "Expected 3 buffers from the context, got {}",
                    handles.len()
                )));
            }
        };

        if let Err(error) = self.upload(context, position, tex_coord, index) {
            context.delete_buffers(&handles);
            return Err(error);
        }

        self.gpu_buffers = Some(MeshBuffers {
            position,
            tex_coord,
            index,
            orphans: context.orphaned_buffers(),
        });

        log::debug!(
            "Created mesh buffers: {} vertices, {} indices, {:?}",
            self.vertex_count,
            self.indices.len(),
            self.topology
        );

        Ok(())
    }

    fn upload<C: RenderContext + ?Sized>(
        &self,
        context: &mut C,
        position: BufferHandle,
        tex_coord: BufferHandle,
        index: BufferHandle,
    ) -> Result<()> {
        {
            let mut array = BufferBinding::bind(&mut *context, BufferTarget::Array, position)?;
            array.buffer_data(
                BufferTarget::Array,
                bytemuck::cast_slice(&self.positions),
                BufferUsage::StaticDraw,
            )?;

            array.rebind(tex_coord)?;
            array.buffer_data(
                BufferTarget::Array,
                bytemuck::cast_slice(&self.tex_coords),
                BufferUsage::StaticDraw,
            )?;
        }

        let mut element = BufferBinding::bind(context, BufferTarget::ElementArray, index)?;
        element.buffer_data(
            BufferTarget::ElementArray,
            bytemuck::cast_slice(&self.indices),
            BufferUsage::StaticDraw,
        )?;

        Ok(())
    }

    // Both attribute locations stay enabled afterwards.
    pub fn draw<C: RenderContext + ?Sized>(
        &self,
        context: &mut C,
        position_attribute: AttributeLocation,
        tex_coord_attribute: AttributeLocation,
    ) -> Result<()> {
        let buffers = self.gpu_buffers.as_ref().ok_or(Error::BuffersNotCreated)?;

        context.enable_vertex_attribute(position_attribute);
        let mut array = BufferBinding::bind(context, BufferTarget::Array, buffers.position)?;
        array.vertex_attribute_layout(
            position_attribute,
            VertexAttributeLayout::packed_floats(POSITION_COMPONENTS as u32),
        )?;

        array.enable_vertex_attribute(tex_coord_attribute);
        array.rebind(buffers.tex_coord)?;
        array.vertex_attribute_layout(
            tex_coord_attribute,
            VertexAttributeLayout::packed_floats(TEX_COORD_COMPONENTS as u32),
        )?;

        let mut element =
            BufferBinding::bind(&mut *array, BufferTarget::ElementArray, buffers.index)?;
        element.draw_elements(self.topology, self.indices.len(), IndexType::U16, 0)?;

        log::trace!("Drew {} indices as {:?}", self.indices.len(), self.topology);
        Ok(())
    }

    pub fn update_tex_coords<C: RenderContext + ?Sized>(
        &mut self,
        context: &mut C,
        tex_coords: &[f32],
    ) -> Result<()> {
        check_tex_coord_length(self.vertex_count, tex_coords.len())?;
        self.tex_coords.copy_from_slice(tex_coords);

        if let Some(buffers) = &self.gpu_buffers {
            let mut array = BufferBinding::bind(context, BufferTarget::Array, buffers.tex_coord)?;
            array.buffer_data(
                BufferTarget::Array,
                bytemuck::cast_slice(&self.tex_coords),
                BufferUsage::StaticDraw,
            )?;
        }

        Ok(())
    }

    pub fn release_gpu_buffers<C: RenderContext + ?Sized>(&mut self, context: &mut C) {
        if let Some(buffers) = self.gpu_buffers.take() {
            context.delete_buffers(&buffers.handles());
            log::debug!("Released mesh buffers");
        }
    }
}

impl Drop for Mesh {
    fn drop(&mut self) {
        if let Some(buffers) = self.gpu_buffers.take() {
            log::debug!("Mesh dropped with live buffers, queueing them for deletion");
            buffers.orphans.push(&buffers.handles());
        }
    }
}

fn check_tex_coord_length(vertex_count: usize, length: usize) -> Result<()> {
    let expected = vertex_count * TEX_COORD_COMPONENTS;
    match length == expected {
        true => Ok(()),
        false => Err(Error::TexCoordLength {
            expected,
            actual: length,
        }),
    }
}
