//! Contains the crate-wide error type.

use std::path::PathBuf;

use thiserror::Error;

/// The error type returned by all fallible operations in this crate.
///
/// None of these errors are transient, so nothing in the crate retries.
#[derive(Debug, Error)]
pub enum Error {
    /// The mode identifier is not present in the mode registry.
    #[error("unknown mode: {0}")]
    UnknownMode(String),

    /// A resize was requested to (or from) an image with a zero dimension.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// The offending width.
        width: u32,
        /// The offending height.
        height: u32,
    },

    /// The color budget is below `2` or above [`MAX_COLORS`](crate::MAX_COLORS).
    #[error("invalid color budget: {0} (must be between 2 and {max})", max = crate::MAX_COLORS)]
    InvalidColorBudget(u16),

    /// The source image file does not exist.
    #[error("source image not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// The source image exists but could not be read or decoded.
    #[error("failed to decode source image {}", path.display())]
    SourceDecode {
        /// The path of the source image.
        path: PathBuf,
        /// The underlying decode error.
        #[source]
        source: image::ImageError,
    },

    /// An output directory or file could not be written.
    #[error("failed to write {}", path.display())]
    Persistence {
        /// The path that could not be written.
        path: PathBuf,
        /// The underlying encode or I/O error.
        #[source]
        source: image::ImageError,
    },
}

/// A `Result` alias using the crate's [`Error`] type.
pub type Result<T, E = Error> = std::result::Result<T, E>;
