//! Error types for grid construction and scan acquisition.

use thiserror::Error;

/// The reasons a scan can fail.
///
/// Both variants are terminal for one invocation: the scan never starts and no partial
/// [`FrequencyTable`](crate::FrequencyTable) exists. Nothing is retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// The image source could not be found, read, or decoded.
    #[error("Failed to acquire image: {0}")]
    AcquisitionFailure(String),
    /// The sampling surface for the image could not be created.
    #[error("Sampling context unavailable: {0}")]
    ContextUnavailable(String),
}

/// An error type for when the samples given to a [`SampleGrid`](crate::SampleGrid)
/// do not describe a valid grid.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    /// The number of samples does not equal `width * height`.
    #[error("expected {expected} samples for the grid but got {actual}")]
    LengthMismatch {
        /// `width * height`.
        expected: u64,
        /// The number of samples provided.
        actual: u64,
    },
    /// `width * height` is above [`MAX_PIXELS`](crate::MAX_PIXELS).
    #[error("above the maximum length of {0}")]
    TooLarge(u32),
}

impl From<GridError> for ScanError {
    fn from(err: GridError) -> Self {
        ScanError::AcquisitionFailure(err.to_string())
    }
}

#[cfg(feature = "image")]
impl From<image::ImageError> for ScanError {
    fn from(err: image::ImageError) -> Self {
        ScanError::AcquisitionFailure(err.to_string())
    }
}

impl From<std::io::Error> for ScanError {
    fn from(err: std::io::Error) -> Self {
        ScanError::AcquisitionFailure(err.to_string())
    }
}
