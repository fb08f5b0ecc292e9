//! I/O utilities for archive operations.

pub mod staging;

pub use staging::StagedFile;

/// Size of the buffer used to stream entry contents.
pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;
