//! Contains the frequency table that counts quantized colors.

use crate::{key::KEY_SPACE, source::ensure_countable, ColorKey, ImageSource, ScanError};
use bitvec::{array::BitArray, BitArr};
use palette::Srgba;
#[cfg(feature = "threads")]
use {crate::SampleGrid, rayon::prelude::*};

/// A running count of occurrences per [`ColorKey`].
///
/// There are only `6^4` possible keys, so the table is a dense array indexed by
/// [`ColorKey::index`] alongside a bitmask of the keys seen so far.
/// Every count starts at zero and each call to [`FrequencyTable::add`] increments exactly one count by one,
/// so [`FrequencyTable::total_count`] is always the sum of all counts.
#[derive(Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    /// The count for each key index.
    counts: Box<[u32; KEY_SPACE]>,
    /// Which keys have a nonzero count.
    seen: BitArr!(for KEY_SPACE),
    /// The sum of `counts`.
    total_count: u32,
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FrequencyTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl FrequencyTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            counts: Box::new([0; KEY_SPACE]),
            seen: BitArray::ZERO,
            total_count: 0,
        }
    }

    /// Counts one occurrence of `key`.
    #[inline]
    pub fn increment(&mut self, key: ColorKey) {
        let i = key.index();
        self.counts[i] += 1;
        self.seen.set(i, true);
        self.total_count += 1;
    }

    /// Quantizes `sample` and counts one occurrence of its key.
    #[inline]
    pub fn add(&mut self, sample: Srgba<u8>) {
        self.increment(ColorKey::from_sample(sample));
    }

    /// Returns the count for `key`, which is `0` for unseen keys.
    #[must_use]
    pub fn get(&self, key: ColorKey) -> u32 {
        self.counts[key.index()]
    }

    /// Returns the number of samples counted.
    ///
    /// This is equal to the sum of all counts.
    #[must_use]
    pub fn total_count(&self) -> u32 {
        self.total_count
    }

    /// Returns the number of distinct keys with a nonzero count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.count_ones()
    }

    /// Whether no samples have been counted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }

    /// Iterates over each seen key and its count in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (ColorKey, u32)> + '_ {
        self.seen.iter_ones().filter_map(|i| {
            let key = ColorKey::from_index(i)?;
            Some((key, self.counts[i]))
        })
    }

    /// Adds all counts of `other` to this table.
    pub fn merge(&mut self, other: &Self) {
        for i in other.seen.iter_ones() {
            self.counts[i] += other.counts[i];
            self.seen.set(i, true);
        }
        self.total_count += other.total_count;
    }

    /// Counts every sample of `source` synchronously, in row-major order.
    ///
    /// # Errors
    /// Returns [`ScanError::ContextUnavailable`] without sampling anything
    /// if `source` has more than [`MAX_PIXELS`](crate::MAX_PIXELS) samples.
    pub fn tally(source: &impl ImageSource) -> Result<Self, ScanError> {
        ensure_countable(source)?;

        let mut table = Self::new();
        for row in 0..source.height() {
            for column in 0..source.width() {
                table.add(source.sample(row, column));
            }
        }
        Ok(table)
    }

    /// Counts every sample of `grid` in parallel.
    ///
    /// Rows are split across the [`rayon`] thread pool and the partial tables are merged,
    /// giving the same table as [`FrequencyTable::tally`].
    #[cfg(feature = "threads")]
    #[must_use]
    pub fn tally_par(grid: &SampleGrid) -> Self {
        let width = grid.width() as usize;
        if width == 0 {
            return Self::new();
        }

        let rows_per_chunk = (grid.height() as usize)
            .div_ceil(rayon::current_num_threads())
            .max(1);

        grid.par_chunks(rows_per_chunk * width)
            .map(|chunk| {
                let mut table = Self::new();
                for &sample in chunk {
                    table.add(sample);
                }
                table
            })
            .reduce(Self::new, |mut a, b| {
                a.merge(&b);
                a
            })
    }
}

impl Extend<Srgba<u8>> for FrequencyTable {
    fn extend<T: IntoIterator<Item = Srgba<u8>>>(&mut self, iter: T) {
        for sample in iter {
            self.add(sample);
        }
    }
}

impl FromIterator<Srgba<u8>> for FrequencyTable {
    fn from_iter<T: IntoIterator<Item = Srgba<u8>>>(iter: T) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}
