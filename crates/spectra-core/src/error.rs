//! Engine error taxonomy.

/// Errors returned by engine operations.
///
/// Every variant is raised before any state is written, so a failed call
/// leaves the session exactly as it was.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("{what} is {actual:?}, expected {expected:?} to match the loaded image")]
    InvalidDimensions {
        what: &'static str,
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("no image loaded")]
    EmptyImage,

    #[error("image has zero width or height")]
    ZeroSizedImage,

    #[error("image has {pixels} pixels, limit is {limit}")]
    ImageTooLarge { pixels: u64, limit: u64 },

    #[error("pixel buffer holds {actual} entries, expected {expected}")]
    BufferLength { expected: usize, actual: usize },
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, EngineError>;
