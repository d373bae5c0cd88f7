use thiserror::Error;

/// Malformed geometry found while preparing a scene for tracing.
///
/// Raised once, before any acceleration structure exists; rendering must not
/// continue past it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("shape {shape} has no triangles")]
    EmptyShape { shape: usize },

    #[error("shape {shape} has {count} indices, which is not a multiple of 3")]
    IndexCountMismatch { shape: usize, count: usize },

    #[error("shape {shape} index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        shape: usize,
        index: u32,
        vertex_count: usize,
    },
}
