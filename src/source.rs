//! Image sources consumed by a scan, and the providers that acquire them by identifier.

use crate::{SampleGrid, ScanError, MAX_PIXELS};
use palette::Srgba;
use std::collections::HashMap;
#[cfg(feature = "image")]
use {
    crate::types::checked_area,
    image::{imageops::FilterType, RgbaImage},
    std::path::Path,
};

/// A 2D grid of RGBA samples with known dimensions.
///
/// Implementors must return a sample for every `row < height()` and `column < width()`.
/// A scan never asks for coordinates outside of that range.
pub trait ImageSource {
    /// The number of columns.
    fn width(&self) -> u32;

    /// The number of rows.
    fn height(&self) -> u32;

    /// Returns the sample at `(row, column)`.
    fn sample(&self, row: u32, column: u32) -> Srgba<u8>;

    /// The total number of samples, `width * height`.
    fn num_samples(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }
}

impl<S: ImageSource + ?Sized> ImageSource for &S {
    fn width(&self) -> u32 {
        (**self).width()
    }

    fn height(&self) -> u32 {
        (**self).height()
    }

    fn sample(&self, row: u32, column: u32) -> Srgba<u8> {
        (**self).sample(row, column)
    }
}

impl ImageSource for SampleGrid {
    fn width(&self) -> u32 {
        self.width()
    }

    fn height(&self) -> u32 {
        self.height()
    }

    fn sample(&self, row: u32, column: u32) -> Srgba<u8> {
        self.row(row)[column as usize]
    }
}

#[cfg(feature = "image")]
impl ImageSource for RgbaImage {
    fn width(&self) -> u32 {
        self.width()
    }

    fn height(&self) -> u32 {
        self.height()
    }

    fn sample(&self, row: u32, column: u32) -> Srgba<u8> {
        let [r, g, b, a] = self.get_pixel(column, row).0;
        Srgba::new(r, g, b, a)
    }
}

/// Checks that every sample of `source` can be counted,
/// i.e. that it has no more than [`MAX_PIXELS`] samples.
pub(crate) fn ensure_countable<S>(source: &S) -> Result<(), ScanError>
where
    S: ImageSource + ?Sized,
{
    let num_samples = source.num_samples();
    if num_samples > u64::from(MAX_PIXELS) {
        Err(ScanError::ContextUnavailable(format!(
            "{num_samples} samples is above the maximum of {MAX_PIXELS}"
        )))
    } else {
        Ok(())
    }
}

/// Acquires [`ImageSource`]s by identifier.
///
/// Acquisition is asynchronous and has two outcomes: a ready source, or a [`ScanError`].
/// A failed acquisition is never retried.
#[allow(async_fn_in_trait)]
pub trait SourceProvider {
    /// The type of source this provider hands out.
    type Source: ImageSource;

    /// Acquires the source named `id`.
    ///
    /// # Errors
    /// Returns [`ScanError::AcquisitionFailure`] if the source does not exist or cannot be read,
    /// or [`ScanError::ContextUnavailable`] if no sampling surface can be created for it.
    async fn acquire(&self, id: &str) -> Result<Self::Source, ScanError>;
}

/// An in-memory [`SourceProvider`] mapping identifiers to grids.
#[derive(Debug, Clone, Default)]
pub struct MemorySources {
    /// The grids by identifier.
    grids: HashMap<String, SampleGrid>,
}

impl MemorySources {
    /// Creates an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `grid` under `id`, returning the grid previously registered there, if any.
    pub fn insert(&mut self, id: impl Into<String>, grid: SampleGrid) -> Option<SampleGrid> {
        self.grids.insert(id.into(), grid)
    }

    /// Removes the grid registered under `id`.
    pub fn remove(&mut self, id: &str) -> Option<SampleGrid> {
        self.grids.remove(id)
    }
}

impl SourceProvider for MemorySources {
    type Source = SampleGrid;

    async fn acquire(&self, id: &str) -> Result<Self::Source, ScanError> {
        self.grids
            .get(id)
            .cloned()
            .ok_or_else(|| ScanError::AcquisitionFailure(format!("Image not found: {id}")))
    }
}

/// A [`SourceProvider`] that treats identifiers as image file paths.
///
/// Images are decoded with the [`image`] crate and downsampled to a fixed sampling width,
/// keeping the aspect ratio (`height = floor(sample_width / width * height)`).
/// Scanning a small thumbnail keeps the swatches representative while bounding the scan time.
#[cfg(feature = "image")]
#[derive(Debug, Clone, Copy)]
pub struct ImageFiles {
    /// The width of the sampling surface, or `None` to sample at full resolution.
    sample_width: Option<u32>,
}

#[cfg(feature = "image")]
impl Default for ImageFiles {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "image")]
impl ImageFiles {
    /// The default width of the sampling surface.
    pub const DEFAULT_SAMPLE_WIDTH: u32 = 25;

    /// Creates a new [`ImageFiles`] with the default sampling width.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sample_width: Some(Self::DEFAULT_SAMPLE_WIDTH),
        }
    }

    /// Sets the width of the sampling surface.
    ///
    /// `None` samples every pixel of the decoded image.
    /// The default is `Some(25)`.
    #[must_use]
    pub const fn sample_width(mut self, sample_width: Option<u32>) -> Self {
        self.sample_width = sample_width;
        self
    }

    /// Builds the sampling surface for a decoded image.
    fn sampling_surface(&self, image: &RgbaImage) -> Result<RgbaImage, ScanError> {
        let (width, height) = image.dimensions();
        if width == 0 {
            return Err(ScanError::ContextUnavailable(
                "image has zero width".to_owned(),
            ));
        }

        let Some(target_width) = self.sample_width else {
            ensure_countable(image)?;
            return Ok(image.clone());
        };

        let target_height = u64::from(target_width) * u64::from(height) / u64::from(width);
        let target_height = u32::try_from(target_height)
            .map_err(|_| ScanError::ContextUnavailable("sampling surface too tall".to_owned()))?;
        checked_area(target_width, target_height)
            .map_err(|e| ScanError::ContextUnavailable(e.to_string()))?;

        Ok(image::imageops::resize(
            image,
            target_width,
            target_height,
            FilterType::Triangle,
        ))
    }
}

#[cfg(feature = "image")]
impl SourceProvider for ImageFiles {
    type Source = RgbaImage;

    async fn acquire(&self, id: &str) -> Result<Self::Source, ScanError> {
        let path = Path::new(id);
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ScanError::AcquisitionFailure(format!("Image not found: {id}"))
            } else {
                ScanError::from(e)
            }
        })?;

        let image = image::load_from_memory(&bytes)?.into_rgba8();
        tracing::debug!(
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            "decoded image"
        );

        self.sampling_surface(&image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::*;

    #[test]
    fn grid_source_matches_grid() {
        let grid = test_grid(7, 3);
        for row in 0..3 {
            for column in 0..7 {
                assert_eq!(Some(grid.sample(row, column)), grid.get(row, column));
            }
        }
        assert_eq!(ImageSource::num_samples(&grid), 21);
    }

    #[tokio::test]
    async fn memory_sources_acquire_registered_grid() {
        let mut sources = MemorySources::new();
        sources.insert("img", two_by_two());

        let grid = sources.acquire("img").await.unwrap();
        assert_eq!(grid, two_by_two());
    }

    #[tokio::test]
    async fn memory_sources_report_missing_grid() {
        let sources = MemorySources::new();
        let err = sources.acquire("nope").await.unwrap_err();
        assert_eq!(
            err,
            ScanError::AcquisitionFailure("Image not found: nope".to_owned())
        );
    }

    #[cfg(feature = "image")]
    mod files {
        use super::*;
        use image::Rgba;

        fn temp_png(name: &str, image: &RgbaImage) -> std::path::PathBuf {
            let path = std::env::temp_dir().join(format!(
                "swatchscan-{}-{name}.png",
                std::process::id()
            ));
            image.save(&path).unwrap();
            path
        }

        #[tokio::test]
        async fn missing_file_is_an_acquisition_failure() {
            let err = ImageFiles::new()
                .acquire("/definitely/not/here.png")
                .await
                .unwrap_err();
            assert!(matches!(err, ScanError::AcquisitionFailure(_)));
        }

        #[tokio::test]
        async fn undecodable_file_is_an_acquisition_failure() {
            let path = std::env::temp_dir().join(format!(
                "swatchscan-{}-garbage.png",
                std::process::id()
            ));
            std::fs::write(&path, b"not an image").unwrap();

            let err = ImageFiles::new()
                .acquire(path.to_str().unwrap())
                .await
                .unwrap_err();
            assert!(matches!(err, ScanError::AcquisitionFailure(_)));

            std::fs::remove_file(path).unwrap();
        }

        #[tokio::test]
        async fn downsamples_to_sample_width() {
            let image = RgbaImage::from_pixel(100, 50, Rgba([200, 10, 10, 255]));
            let path = temp_png("downsample", &image);

            let surface = ImageFiles::new()
                .acquire(path.to_str().unwrap())
                .await
                .unwrap();
            assert_eq!(surface.dimensions(), (25, 12));
            assert_eq!(surface.sample(0, 0), Srgba::new(200, 10, 10, 255));

            std::fs::remove_file(path).unwrap();
        }

        #[tokio::test]
        async fn full_resolution_keeps_dimensions() {
            let image = RgbaImage::from_pixel(30, 20, Rgba([0, 0, 0, 255]));
            let path = temp_png("full", &image);

            let surface = ImageFiles::new()
                .sample_width(None)
                .acquire(path.to_str().unwrap())
                .await
                .unwrap();
            assert_eq!(surface.dimensions(), (30, 20));

            std::fs::remove_file(path).unwrap();
        }

        #[test]
        fn zero_width_has_no_sampling_surface() {
            let image = RgbaImage::new(0, 10);
            let err = ImageFiles::new().sampling_surface(&image).unwrap_err();
            assert!(matches!(err, ScanError::ContextUnavailable(_)));
        }
    }
}
