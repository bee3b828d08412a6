use crate::render::buffer::{BufferHandle, BufferTarget};
use crate::render::context::VertexAttributeLayout;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    PositionLength {
        length: usize,
    },
    TexCoordLength {
        expected: usize,
        actual: usize,
    },
    IndexOutOfRange {
        position: usize,
        index: u16,
        vertex_count: usize,
    },
    BuffersNotCreated,
    UnknownBuffer(BufferHandle),
    NothingBound(BufferTarget),
    AttributeNotDescribed(u32),
    AttributeLayoutMismatch {
        location: u32,
        expected: VertexAttributeLayout,
        actual: VertexAttributeLayout,
    },
    IndexBufferTooSmall {
        required: u64,
        available: u64,
    },
    TooManyIndices(usize),
    Context(String),
}

impl Error {
    pub fn context(message: impl Into<String>) -> Self {
        Self::Context(message.into())
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::PositionLength { length } => write!(
                f,
                "position data has {length} floats, which is not a multiple of 3"
            ),
            Error::TexCoordLength { expected, actual } => write!(
                f,
                "expected {expected} texture coordinate floats (2 per vertex), got {actual}"
            ),
            Error::IndexOutOfRange {
                position,
                index,
                vertex_count,
            } => write!(
                f,
                "index {index} at position {position} is out of range for {vertex_count} vertices"
            ),
            Error::BuffersNotCreated => {
                write!(f, "GPU buffers have not been created for this mesh")
            }
            Error::UnknownBuffer(handle) => write!(f, "unknown buffer handle {}", handle.id()),
            Error::NothingBound(target) => write!(f, "no buffer is bound to {target:?}"),
            Error::AttributeNotDescribed(location) => write!(
                f,
                "vertex attribute {location} is read by the program but has no buffer layout"
            ),
            Error::AttributeLayoutMismatch {
                location,
                expected,
                actual,
            } => write!(
                f,
                "attribute {location}: {} floats every {} bytes, program reads {} every {}",
                actual.components,
                actual.effective_stride(),
                expected.components,
                expected.effective_stride()
            ),
            Error::IndexBufferTooSmall {
                required,
                available,
            } => write!(
                f,
                "draw needs {required} bytes of indices, the index buffer holds {available}"
            ),
            Error::TooManyIndices(count) => write!(f, "{count} indices do not fit in one draw"),
            Error::Context(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
