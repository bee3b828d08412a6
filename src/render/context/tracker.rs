use std::collections::{BTreeMap, HashMap};

use crate::error::{Error, Result};
use crate::render::buffer::{BufferHandle, BufferTarget};
use crate::render::context::{AttributeLocation, IndexType, VertexAttributeLayout};
use crate::render::primitive::Topology;

#[derive(Debug, Default)]
struct TrackedBuffer {
    len: u64,
    // Padded size of the current allocation, None before the first upload.
    capacity: Option<u64>,
}

#[derive(Debug, Default)]
struct AttributeState {
    enabled: bool,
    source: Option<AttributeSource>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeSource {
    pub buffer: BufferHandle,
    pub layout: VertexAttributeLayout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedDraw {
    pub topology: Topology,
    pub count: u32,
    pub index_type: IndexType,
    pub index_buffer: BufferHandle,
    pub index_offset: u64,
    pub vertex_buffers: Vec<(AttributeLocation, AttributeSource)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Upload {
    pub buffer: BufferHandle,
    pub capacity: u64,
    pub reallocate: bool,
}

#[derive(Debug)]
pub struct ContextTracker {
    buffers: HashMap<BufferHandle, TrackedBuffer>,
    next_buffer_id: u64,
    array_buffer: Option<BufferHandle>,
    element_buffer: Option<BufferHandle>,
    attributes: BTreeMap<AttributeLocation, AttributeState>,
    program_inputs: BTreeMap<AttributeLocation, VertexAttributeLayout>,
    draws: Vec<QueuedDraw>,
}

impl Default for ContextTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextTracker {
    pub fn new() -> Self {
        Self {
            buffers: HashMap::new(),
            next_buffer_id: 1,
            array_buffer: None,
            element_buffer: None,
            attributes: BTreeMap::new(),
            program_inputs: BTreeMap::new(),
            draws: Vec::new(),
        }
    }

    // Locations the program does not read are left out of queued draws.
    pub fn with_program_inputs(
        inputs: impl IntoIterator<Item = (AttributeLocation, VertexAttributeLayout)>,
    ) -> Self {
        Self {
            program_inputs: inputs.into_iter().collect(),
            ..Self::new()
        }
    }

    pub fn create_buffers(&mut self, count: usize) -> Vec<BufferHandle> {
        (0..count)
            .map(|_| {
                let handle = BufferHandle(self.next_buffer_id);
                self.next_buffer_id += 1;
                self.buffers.insert(handle, TrackedBuffer::default());
                handle
            })
            .collect()
    }

    /// Returns the handles that were live.
    pub fn delete_buffers(&mut self, buffers: &[BufferHandle]) -> Vec<BufferHandle> {
        let mut deleted = Vec::with_capacity(buffers.len());

        for buffer in buffers {
            if self.buffers.remove(buffer).is_some() {
                deleted.push(*buffer);
            }

            for slot in [&mut self.array_buffer, &mut self.element_buffer] {
                if *slot == Some(*buffer) {
                    *slot = None;
                }
            }

            // Enabled stays as it is.
            for state in self.attributes.values_mut() {
                if state.source.map(|source| source.buffer) == Some(*buffer) {
                    state.source = None;
                }
            }
        }

        deleted
    }

    pub fn is_live(&self, buffer: BufferHandle) -> bool {
        self.buffers.contains_key(&buffer)
    }

    pub fn live_buffer_count(&self) -> usize {
        self.buffers.len()
    }

    pub fn bound_buffer(&self, target: BufferTarget) -> Option<BufferHandle> {
        match target {
            BufferTarget::Array => self.array_buffer,
            BufferTarget::ElementArray => self.element_buffer,
        }
    }

    pub fn bind_buffer(
        &mut self,
        target: BufferTarget,
        buffer: Option<BufferHandle>,
    ) -> Result<()> {
        if let Some(buffer) = buffer {
            if !self.is_live(buffer) {
                return Err(Error::UnknownBuffer(buffer));
            }
        }

        match target {
            BufferTarget::Array => self.array_buffer = buffer,
            BufferTarget::ElementArray => self.element_buffer = buffer,
        }
        Ok(())
    }

    // The allocation is reused while the padded size stays the same.
    pub fn record_upload(&mut self, target: BufferTarget, len: usize) -> Result<Upload> {
        let buffer = self
            .bound_buffer(target)
            .ok_or(Error::NothingBound(target))?;
        let tracked = self
            .buffers
            .get_mut(&buffer)
            .ok_or(Error::UnknownBuffer(buffer))?;

        let capacity = padded_len(len) as u64;
        let reallocate = tracked.capacity != Some(capacity);
        tracked.capacity = Some(capacity);
        tracked.len = len as u64;

        Ok(Upload {
            buffer,
            capacity,
            reallocate,
        })
    }

    pub fn enable_vertex_attribute(&mut self, location: AttributeLocation) {
        self.attributes.entry(location).or_default().enabled = true;
    }

    pub fn disable_vertex_attribute(&mut self, location: AttributeLocation) {
        if let Some(state) = self.attributes.get_mut(&location) {
            state.enabled = false;
        }
    }

    pub fn is_attribute_enabled(&self, location: AttributeLocation) -> bool {
        self.attributes
            .get(&location)
            .is_some_and(|state| state.enabled)
    }

    pub fn attribute_source(&self, location: AttributeLocation) -> Option<AttributeSource> {
        self.attributes
            .get(&location)
            .and_then(|state| state.source)
    }

    pub fn vertex_attribute_layout(
        &mut self,
        location: AttributeLocation,
        layout: VertexAttributeLayout,
    ) -> Result<BufferHandle> {
        let buffer = self
            .array_buffer
            .ok_or(Error::NothingBound(BufferTarget::Array))?;

        self.attributes.entry(location).or_default().source =
            Some(AttributeSource { buffer, layout });
        Ok(buffer)
    }

    pub fn draw_elements(
        &mut self,
        topology: Topology,
        count: usize,
        index_type: IndexType,
        offset: u64,
    ) -> Result<BufferHandle> {
        let index_buffer = self
            .element_buffer
            .ok_or(Error::NothingBound(BufferTarget::ElementArray))?;

        let count = u32::try_from(count).map_err(|_| Error::TooManyIndices(count))?;

        let available = self
            .buffers
            .get(&index_buffer)
            .map(|tracked| tracked.len)
            .ok_or(Error::UnknownBuffer(index_buffer))?;
        let required = offset + u64::from(count) * index_type.size() as u64;
        if required > available {
            return Err(Error::IndexBufferTooSmall {
                required,
                available,
            });
        }

        let vertex_buffers = self.vertex_buffers()?;

        self.draws.push(QueuedDraw {
            topology,
            count,
            index_type,
            index_buffer,
            index_offset: offset,
            vertex_buffers,
        });
        Ok(index_buffer)
    }

    fn vertex_buffers(&self) -> Result<Vec<(AttributeLocation, AttributeSource)>> {
        let mut vertex_buffers = Vec::new();

        for (location, state) in self.attributes.iter().filter(|(_, state)| state.enabled) {
            let Some(source) = state.source else {
                log::trace!("Skipping enabled attribute {} without a source", location.0);
                continue;
            };

            match self.program_inputs.get(location) {
                Some(expected) => check_layout(*location, expected, &source.layout)?,
                None if !self.program_inputs.is_empty() => {
                    log::trace!("Skipping attribute {} the program does not read", location.0);
                    continue;
                }
                None => {}
            }

            vertex_buffers.push((*location, source));
        }

        if let Some(missing) = self
            .program_inputs
            .keys()
            .find(|location| !vertex_buffers.iter().any(|(sourced, _)| sourced == *location))
        {
            return Err(Error::AttributeNotDescribed(missing.0));
        }

        Ok(vertex_buffers)
    }

    pub fn queued_draws(&self) -> &[QueuedDraw] {
        &self.draws
    }

    pub fn take_draws(&mut self) -> Vec<QueuedDraw> {
        std::mem::take(&mut self.draws)
    }

    pub fn discard_draws_from(&mut self, from: usize) {
        self.draws.truncate(from);
    }
}

fn check_layout(
    location: AttributeLocation,
    expected: &VertexAttributeLayout,
    actual: &VertexAttributeLayout,
) -> Result<()> {
    match actual.components == expected.components
        && actual.effective_stride() == expected.effective_stride()
    {
        true => Ok(()),
        false => Err(Error::AttributeLayoutMismatch {
            location: location.0,
            expected: *expected,
            actual: *actual,
        }),
    }
}

fn padded_len(len: usize) -> usize {
    let alignment = wgpu::COPY_BUFFER_ALIGNMENT as usize;
    len.div_ceil(alignment) * alignment
}

#[cfg(test)]
mod tests {
    use super::*;

    const POSITION: AttributeLocation = AttributeLocation(0);
    const TEX_COORD: AttributeLocation = AttributeLocation(1);

    fn textured_inputs() -> [(AttributeLocation, VertexAttributeLayout); 2] {
        [
            (POSITION, VertexAttributeLayout::packed_floats(3)),
            (TEX_COORD, VertexAttributeLayout::packed_floats(2)),
        ]
    }

    fn upload(
        tracker: &mut ContextTracker,
        target: BufferTarget,
        buffer: BufferHandle,
        len: usize,
    ) {
        tracker.bind_buffer(target, Some(buffer)).unwrap();
        tracker.record_upload(target, len).unwrap();
    }

    fn describe(
        tracker: &mut ContextTracker,
        location: AttributeLocation,
        buffer: BufferHandle,
        components: u32,
    ) {
        tracker.enable_vertex_attribute(location);
        tracker.bind_buffer(BufferTarget::Array, Some(buffer)).unwrap();
        tracker
            .vertex_attribute_layout(location, VertexAttributeLayout::packed_floats(components))
            .unwrap();
    }

    #[test]
    fn uploads_are_padded_to_copy_alignment() {
        assert_eq!(padded_len(0), 0);
        assert_eq!(padded_len(6), 8);
        assert_eq!(padded_len(12), 12);
    }

    #[test]
    fn same_size_upload_reuses_the_allocation() {
        let mut tracker = ContextTracker::new();
        let buffers = tracker.create_buffers(1);
        tracker
            .bind_buffer(BufferTarget::Array, Some(buffers[0]))
            .unwrap();

        let first = tracker.record_upload(BufferTarget::Array, 24).unwrap();
        let same = tracker.record_upload(BufferTarget::Array, 24).unwrap();
        let grown = tracker.record_upload(BufferTarget::Array, 30).unwrap();

        assert!(first.reallocate);
        assert!(!same.reallocate);
        assert!(grown.reallocate);
        assert_eq!(grown.capacity, 32);
    }

    #[test]
    fn first_empty_upload_still_allocates() {
        let mut tracker = ContextTracker::new();
        let buffers = tracker.create_buffers(1);
        tracker
            .bind_buffer(BufferTarget::ElementArray, Some(buffers[0]))
            .unwrap();

        let upload = tracker.record_upload(BufferTarget::ElementArray, 0).unwrap();
        assert!(upload.reallocate);
        assert_eq!(upload.capacity, 0);
    }

    #[test]
    fn deleting_clears_bindings_and_sources_but_not_enables() {
        let mut tracker = ContextTracker::new();
        let buffers = tracker.create_buffers(2);
        describe(&mut tracker, TEX_COORD, buffers[0], 2);
        tracker
            .bind_buffer(BufferTarget::ElementArray, Some(buffers[1]))
            .unwrap();

        let deleted = tracker.delete_buffers(&[buffers[0], BufferHandle(99)]);

        assert_eq!(deleted, vec![buffers[0]]);
        assert_eq!(tracker.bound_buffer(BufferTarget::Array), None);
        assert_eq!(tracker.bound_buffer(BufferTarget::ElementArray), Some(buffers[1]));
        assert_eq!(tracker.attribute_source(TEX_COORD), None);
        assert!(tracker.is_attribute_enabled(TEX_COORD));
    }

    #[test]
    fn draw_past_the_end_of_the_index_buffer_fails() {
        let mut tracker = ContextTracker::new();
        let buffers = tracker.create_buffers(1);
        upload(&mut tracker, BufferTarget::ElementArray, buffers[0], 6);

        assert_eq!(
            tracker.draw_elements(Topology::Triangles, 4, IndexType::U16, 0),
            Err(Error::IndexBufferTooSmall {
                required: 8,
                available: 6
            })
        );
        assert_eq!(
            tracker.draw_elements(Topology::Triangles, 3, IndexType::U16, 2),
            Err(Error::IndexBufferTooSmall {
                required: 8,
                available: 6
            })
        );
        assert_eq!(
            tracker.draw_elements(Topology::Triangles, 3, IndexType::U16, 0),
            Ok(buffers[0])
        );
        assert_eq!(tracker.queued_draws().len(), 1);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn index_count_must_fit_in_u32() {
        let mut tracker = ContextTracker::new();
        let buffers = tracker.create_buffers(1);
        upload(&mut tracker, BufferTarget::ElementArray, buffers[0], 6);

        let count = u32::MAX as usize + 1;
        assert_eq!(
            tracker.draw_elements(Topology::Points, count, IndexType::U16, 0),
            Err(Error::TooManyIndices(count))
        );
        assert!(tracker.queued_draws().is_empty());
    }

    #[test]
    fn released_neighbour_does_not_break_the_next_draw() {
        let mut tracker = ContextTracker::new();
        let first = tracker.create_buffers(3);
        let second = tracker.create_buffers(3);
        upload(&mut tracker, BufferTarget::ElementArray, first[2], 6);
        upload(&mut tracker, BufferTarget::ElementArray, second[2], 6);

        // First mesh feeds locations 0 and 1, second mesh 0 and 2.
        describe(&mut tracker, AttributeLocation(0), first[0], 3);
        describe(&mut tracker, AttributeLocation(1), first[1], 2);
        tracker
            .bind_buffer(BufferTarget::ElementArray, Some(first[2]))
            .unwrap();
        tracker
            .draw_elements(Topology::Triangles, 3, IndexType::U16, 0)
            .unwrap();

        describe(&mut tracker, AttributeLocation(0), second[0], 3);
        describe(&mut tracker, AttributeLocation(2), second[1], 2);
        tracker
            .bind_buffer(BufferTarget::ElementArray, Some(second[2]))
            .unwrap();
        tracker
            .draw_elements(Topology::Triangles, 3, IndexType::U16, 0)
            .unwrap();

        tracker.delete_buffers(&first);
        tracker
            .bind_buffer(BufferTarget::ElementArray, Some(second[2]))
            .unwrap();
        tracker
            .draw_elements(Topology::Triangles, 3, IndexType::U16, 0)
            .unwrap();

        let last = tracker.queued_draws().last().unwrap();
        let locations: Vec<_> = last
            .vertex_buffers
            .iter()
            .map(|(location, source)| (location.0, source.buffer))
            .collect();
        assert_eq!(locations, vec![(0, second[0]), (2, second[1])]);
        assert!(tracker.is_attribute_enabled(AttributeLocation(1)));
    }

    #[test]
    fn layouts_must_match_what_the_program_reads() {
        let mut tracker = ContextTracker::with_program_inputs(textured_inputs());
        let buffers = tracker.create_buffers(3);
        upload(&mut tracker, BufferTarget::ElementArray, buffers[2], 6);

        describe(&mut tracker, POSITION, buffers[0], 3);
        // Three floats where the program reads two.
        describe(&mut tracker, TEX_COORD, buffers[1], 3);
        tracker
            .bind_buffer(BufferTarget::ElementArray, Some(buffers[2]))
            .unwrap();

        assert_eq!(
            tracker.draw_elements(Topology::Triangles, 3, IndexType::U16, 0),
            Err(Error::AttributeLayoutMismatch {
                location: 1,
                expected: VertexAttributeLayout::packed_floats(2),
                actual: VertexAttributeLayout::packed_floats(3),
            })
        );

        tracker
            .vertex_attribute_layout(
                TEX_COORD,
                VertexAttributeLayout {
                    components: 2,
                    stride: 20,
                    offset: 0,
                },
            )
            .unwrap();
        assert!(matches!(
            tracker.draw_elements(Topology::Triangles, 3, IndexType::U16, 0),
            Err(Error::AttributeLayoutMismatch { location: 1, .. })
        ));

        tracker
            .vertex_attribute_layout(
                TEX_COORD,
                VertexAttributeLayout {
                    components: 2,
                    stride: 8,
                    offset: 4,
                },
            )
            .unwrap();
        tracker
            .draw_elements(Topology::Triangles, 3, IndexType::U16, 0)
            .unwrap();
        assert_eq!(tracker.queued_draws().len(), 1);
    }

    #[test]
    fn program_inputs_need_a_source() {
        let mut tracker = ContextTracker::with_program_inputs(textured_inputs());
        let buffers = tracker.create_buffers(2);
        upload(&mut tracker, BufferTarget::ElementArray, buffers[1], 6);

        describe(&mut tracker, POSITION, buffers[0], 3);
        describe(&mut tracker, AttributeLocation(7), buffers[0], 4);
        tracker
            .bind_buffer(BufferTarget::ElementArray, Some(buffers[1]))
            .unwrap();

        assert_eq!(
            tracker.draw_elements(Topology::Points, 3, IndexType::U16, 0),
            Err(Error::AttributeNotDescribed(1))
        );

        describe(&mut tracker, TEX_COORD, buffers[0], 2);
        tracker
            .draw_elements(Topology::Points, 3, IndexType::U16, 0)
            .unwrap();

        let sourced: Vec<_> = tracker.queued_draws()[0]
            .vertex_buffers
            .iter()
            .map(|(location, _)| *location)
            .collect();
        assert_eq!(sourced, vec![POSITION, TEX_COORD]);
    }

    #[test]
    fn discarding_keeps_earlier_draws() {
        let mut tracker = ContextTracker::new();
        let buffers = tracker.create_buffers(1);
        upload(&mut tracker, BufferTarget::ElementArray, buffers[0], 4);

        tracker
            .draw_elements(Topology::Lines, 2, IndexType::U16, 0)
            .unwrap();
        let mark = tracker.queued_draws().len();
        tracker
            .draw_elements(Topology::Points, 1, IndexType::U16, 2)
            .unwrap();

        tracker.discard_draws_from(mark);

        assert_eq!(tracker.queued_draws().len(), 1);
        assert_eq!(tracker.take_draws()[0].topology, Topology::Lines);
        assert!(tracker.queued_draws().is_empty());
    }
}
