use std::cell::RefCell;
use std::rc::Rc;

pub mod binding;

pub use binding::BufferBinding;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferHandle(pub(crate) u64);

impl BufferHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    Array,
    ElementArray,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferUsage {
    StaticDraw,
    DynamicDraw,
}

/// Buffers whose owner was dropped before handing them back to the context.
#[derive(Debug, Clone, Default)]
pub struct OrphanedBuffers {
    handles: Rc<RefCell<Vec<BufferHandle>>>,
}

impl OrphanedBuffers {
    pub fn push(&self, handles: &[BufferHandle]) {
        self.handles.borrow_mut().extend_from_slice(handles);
    }

    pub fn take(&self) -> Vec<BufferHandle> {
        std::mem::take(&mut *self.handles.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.handles.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.borrow().is_empty()
    }
}
