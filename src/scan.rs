//! The cooperative sampler/aggregator.
//!
//! A scan walks every coordinate of an [`ImageSource`] exactly once in row-major order
//! (column varies fastest), quantizes each sample and counts it in a fresh [`FrequencyTable`].
//! It is meant to run on the same single-threaded executor as the caller's event loop,
//! so after every [`ScanOptions::yield_interval`] samples it suspends with
//! [`tokio::task::yield_now`] and lets other pending tasks run before resuming at the next coordinate.
//!
//! Dropping the scan future cancels it at its next suspension point.

use crate::{
    source::ensure_countable, FrequencyTable, ImageSource, ScanError, DEFAULT_YIELD_INTERVAL,
    MAX_SWATCHES,
};
use tracing::{debug, trace};

/// A builder struct to specify the parameters of a scan.
///
/// # Examples
/// ```
/// # use swatchscan::ScanOptions;
/// let options = ScanOptions::new()
///     .yield_interval(100)
///     .max_swatches(10);
/// assert_eq!(options.get_max_swatches(), 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// The number of samples processed between cooperative yields.
    yield_interval: u32,
    /// The maximum number of swatches to report.
    max_swatches: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanOptions {
    /// Creates a new [`ScanOptions`] with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            yield_interval: DEFAULT_YIELD_INTERVAL,
            max_swatches: MAX_SWATCHES,
        }
    }

    /// Sets the number of samples to process between cooperative yields.
    ///
    /// Values below `1` are treated as `1`. The default is `50`.
    #[must_use]
    pub const fn yield_interval(mut self, yield_interval: u32) -> Self {
        self.yield_interval = if yield_interval == 0 { 1 } else { yield_interval };
        self
    }

    /// Sets the maximum number of swatches to report.
    ///
    /// This is clamped to [`MAX_SWATCHES`], which is also the default.
    #[must_use]
    pub const fn max_swatches(mut self, max_swatches: usize) -> Self {
        self.max_swatches = if max_swatches < MAX_SWATCHES {
            max_swatches
        } else {
            MAX_SWATCHES
        };
        self
    }

    /// Returns the number of samples processed between cooperative yields.
    #[must_use]
    pub const fn get_yield_interval(&self) -> u32 {
        self.yield_interval
    }

    /// Returns the maximum number of swatches to report.
    #[must_use]
    pub const fn get_max_swatches(&self) -> usize {
        self.max_swatches
    }
}

/// Returns `floor(rows_completed / height * 100)`.
#[allow(clippy::cast_possible_truncation)]
fn percent(rows_completed: u32, height: u32) -> u8 {
    // rows_completed <= height, so the result is at most 100
    (u64::from(rows_completed) * 100 / u64::from(height)) as u8
}

/// Scans every sample of `source` and returns the resulting [`FrequencyTable`].
///
/// `on_progress` is called once after each completed row with the integer percentage of rows completed,
/// so the values are non-decreasing and the last one is `100`.
/// A source with zero width or height completes immediately with an empty table and no progress.
///
/// # Errors
/// Returns [`ScanError::ContextUnavailable`] without sampling anything
/// if `source` has more than [`MAX_PIXELS`](crate::MAX_PIXELS) samples.
///
/// # Examples
/// ```
/// # use swatchscan::{scan, SampleGrid, ScanOptions};
/// # use palette::Srgba;
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let grid = SampleGrid::filled(4, 4, Srgba::new(0, 0, 0, 255))?;
/// let mut progress = Vec::new();
/// let table = scan(&grid, &ScanOptions::new(), |p| progress.push(p)).await?;
/// assert_eq!(table.total_count(), 16);
/// assert_eq!(progress, [25, 50, 75, 100]);
/// # Ok(())
/// # }
/// ```
pub async fn scan<S>(
    source: &S,
    options: &ScanOptions,
    on_progress: impl FnMut(u8),
) -> Result<FrequencyTable, ScanError>
where
    S: ImageSource + ?Sized,
{
    ensure_countable(source)?;
    Ok(scan_countable(source, options, on_progress).await)
}

/// [`scan`] for a source already checked with [`ensure_countable`].
pub(crate) async fn scan_countable<S>(
    source: &S,
    options: &ScanOptions,
    mut on_progress: impl FnMut(u8),
) -> FrequencyTable
where
    S: ImageSource + ?Sized,
{
    let (width, height) = (source.width(), source.height());
    let mut table = FrequencyTable::new();

    if width == 0 || height == 0 {
        debug!(width, height, "skipping scan of empty source");
        return table;
    }

    debug!(width, height, "starting scan");

    let yield_interval = options.yield_interval.max(1);
    let mut since_yield = 0;
    for row in 0..height {
        for column in 0..width {
            table.add(source.sample(row, column));

            if column + 1 == width {
                on_progress(percent(row + 1, height));
            }

            since_yield += 1;
            if since_yield == yield_interval {
                since_yield = 0;
                trace!(row, column, "yielding");
                tokio::task::yield_now().await;
            }
        }
    }

    debug!(
        samples = table.total_count(),
        distinct = table.len(),
        "finished scan"
    );

    table
}
