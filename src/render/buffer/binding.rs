use std::ops::{Deref, DerefMut};

use crate::error::Result;
use crate::render::buffer::{BufferHandle, BufferTarget};
use crate::render::context::RenderContext;

/// Binds a buffer until dropped, then binds back whatever was there before.
pub struct BufferBinding<'a, C: RenderContext + ?Sized> {
    context: &'a mut C,
    target: BufferTarget,
    previous: Option<BufferHandle>,
}

impl<'a, C: RenderContext + ?Sized> BufferBinding<'a, C> {
    pub fn bind(context: &'a mut C, target: BufferTarget, buffer: BufferHandle) -> Result<Self> {
        let previous = context.bound_buffer(target);
        context.bind_buffer(target, Some(buffer))?;

        Ok(Self {
            context,
            target,
            previous,
        })
    }

    pub fn rebind(&mut self, buffer: BufferHandle) -> Result<()> {
        self.context.bind_buffer(self.target, Some(buffer))
    }
}

impl<C: RenderContext + ?Sized> Deref for BufferBinding<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.context
    }
}

impl<C: RenderContext + ?Sized> DerefMut for BufferBinding<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        self.context
    }
}

impl<C: RenderContext + ?Sized> Drop for BufferBinding<'_, C> {
    fn drop(&mut self) {
        if let Err(error) = self.context.bind_buffer(self.target, self.previous) {
            log::warn!(
                "Failed to restore {:?} binding to {:?}: {error}",
                self.target,
                self.previous
            );
        }
    }
}
