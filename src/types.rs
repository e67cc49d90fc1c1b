//! Contains various types needed across the crate.

use crate::{GridError, MAX_PIXELS};
use palette::Srgba;
use std::ops::Deref;
#[cfg(feature = "image")]
use {image::RgbaImage, palette::cast::ComponentsAs};

/// An owned, row-major grid of RGBA samples with the invariant that
/// `samples.len() == width * height` and `width * height <= MAX_PIXELS`.
///
/// # Examples
/// From a raw sample `Vec`:
/// ```
/// # use swatchscan::{SampleGrid, GridError};
/// # use palette::Srgba;
/// # fn main() -> Result<(), GridError> {
/// let samples = vec![Srgba::new(0, 0, 0, 255); 6];
/// let grid = SampleGrid::new(3, 2, samples)?;
/// assert_eq!(grid.dimensions(), (3, 2));
/// # Ok(())
/// # }
/// ```
///
/// From an image (needs the `image` feature to be enabled):
/// ```no_run
/// # use swatchscan::SampleGrid;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let img = image::open("some image")?.into_rgba8();
/// let grid = SampleGrid::try_from(&img)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SampleGrid {
    /// The number of columns.
    width: u32,
    /// The number of rows.
    height: u32,
    /// The samples in row-major order.
    samples: Vec<Srgba<u8>>,
}

/// Returns `width * height` if it does not exceed [`MAX_PIXELS`].
pub(crate) fn checked_area(width: u32, height: u32) -> Result<u32, GridError> {
    width.checked_mul(height).ok_or(GridError::TooLarge(MAX_PIXELS))
}

impl SampleGrid {
    /// Creates a new [`SampleGrid`] from row-major samples.
    ///
    /// # Errors
    /// Returns an error if the number of samples is not `width * height`
    /// or if the grid would contain more than [`MAX_PIXELS`] samples.
    pub fn new(width: u32, height: u32, samples: Vec<Srgba<u8>>) -> Result<Self, GridError> {
        let expected = checked_area(width, height)?;
        if samples.len() == expected as usize {
            Ok(Self { width, height, samples })
        } else {
            Err(GridError::LengthMismatch {
                expected: u64::from(expected),
                actual: samples.len() as u64,
            })
        }
    }

    /// Creates a grid where every sample is `sample`.
    ///
    /// # Errors
    /// Returns an error if the grid would contain more than [`MAX_PIXELS`] samples.
    pub fn filled(width: u32, height: u32, sample: Srgba<u8>) -> Result<Self, GridError> {
        let area = checked_area(width, height)?;
        Ok(Self {
            width,
            height,
            samples: vec![sample; area as usize],
        })
    }

    /// The number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// The number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Returns `(width, height)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// The total number of samples, `width * height`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn num_samples(&self) -> u32 {
        self.samples.len() as u32
    }

    /// Returns the sample at `(row, column)`, or `None` if out of bounds.
    #[must_use]
    pub fn get(&self, row: u32, column: u32) -> Option<Srgba<u8>> {
        (row < self.height && column < self.width)
            .then(|| self.samples[row as usize * self.width as usize + column as usize])
    }

    /// Returns the samples of row `row`.
    #[must_use]
    pub fn row(&self, row: u32) -> &[Srgba<u8>] {
        let width = self.width as usize;
        let start = row as usize * width;
        &self.samples[start..start + width]
    }

    /// Consumes the grid, returning the row-major samples.
    #[must_use]
    pub fn into_samples(self) -> Vec<Srgba<u8>> {
        self.samples
    }
}

impl AsRef<[Srgba<u8>]> for SampleGrid {
    fn as_ref(&self) -> &[Srgba<u8>] {
        self
    }
}

impl Deref for SampleGrid {
    type Target = [Srgba<u8>];

    fn deref(&self) -> &Self::Target {
        &self.samples
    }
}

#[cfg(feature = "image")]
impl TryFrom<&RgbaImage> for SampleGrid {
    type Error = GridError;

    fn try_from(image: &RgbaImage) -> Result<Self, Self::Error> {
        let (width, height) = image.dimensions();
        let area = checked_area(width, height)? as usize;
        let samples: &[Srgba<u8>] = image.as_raw()[..(area * 4)].components_as();
        Self::new(width, height, samples.to_vec())
    }
}
