//! Contains the quantized color key used as the identity for aggregation.

use crate::{BUCKET_SIZE, LEVELS};
use palette::Srgba;
use std::fmt::{self, Display};

/// The number of distinct [`ColorKey`]s (`LEVELS^4`).
pub(crate) const KEY_SPACE: usize = (LEVELS as usize).pow(4);

/// Rounds a channel value to the nearest multiple of [`BUCKET_SIZE`].
///
/// `0, 51, 102, 153, 204, 255` are fixed points.
#[must_use]
#[inline]
pub const fn quantize_channel(value: u8) -> u8 {
    level(value) * BUCKET_SIZE
}

/// Returns the bucket index (`0..LEVELS`) of a channel value.
#[inline]
#[allow(clippy::cast_possible_truncation)]
const fn level(value: u8) -> u8 {
    // 255 + 25 does not fit in a u8
    ((value as u16 + BUCKET_SIZE as u16 / 2) / BUCKET_SIZE as u16) as u8
}

/// A quantized RGBA color.
///
/// Each channel of a sample is independently rounded to the nearest multiple of [`BUCKET_SIZE`],
/// so any two samples with equal quantized channels share the same key.
/// Internally this is the packed index of the four bucket levels,
/// which orders keys by red, then green, then blue, then alpha.
///
/// # Examples
/// ```
/// # use swatchscan::ColorKey;
/// # use palette::Srgba;
/// let key = ColorKey::from_sample(Srgba::new(200, 10, 10, 255));
/// assert_eq!(key.channels(), [204, 0, 0, 255]);
/// assert_eq!(key.to_string(), "204,0,0,255");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ColorKey(u16);

impl ColorKey {
    /// Quantizes a sample into its key.
    #[must_use]
    #[inline]
    pub fn from_sample(sample: Srgba<u8>) -> Self {
        let Srgba { color, alpha } = sample;
        Self::from_levels([level(color.red), level(color.green), level(color.blue), level(alpha)])
    }

    /// Packs four bucket levels into a key.
    #[inline]
    fn from_levels(levels: [u8; 4]) -> Self {
        let index = levels
            .iter()
            .fold(0, |index, &l| index * u16::from(LEVELS) + u16::from(l));
        Self(index)
    }

    /// Creates a key from its packed index.
    ///
    /// Returns `None` if `index` is not below the number of distinct keys.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_index(index: usize) -> Option<Self> {
        (index < KEY_SPACE).then_some(Self(index as u16))
    }

    /// The packed index of this key in `0..1296`.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The quantized `[red, green, blue, alpha]` channel values.
    #[must_use]
    pub fn channels(self) -> [u8; 4] {
        let levels = u16::from(LEVELS);
        let mut index = self.0;
        let mut channels = [0; 4];
        for channel in channels.iter_mut().rev() {
            // index % LEVELS < 6
            #[allow(clippy::cast_possible_truncation)]
            {
                *channel = (index % levels) as u8 * BUCKET_SIZE;
            }
            index /= levels;
        }
        channels
    }

    /// The quantized color as an [`Srgba`].
    #[must_use]
    pub fn to_srgba(self) -> Srgba<u8> {
        let [r, g, b, a] = self.channels();
        Srgba::new(r, g, b, a)
    }
}

impl From<Srgba<u8>> for ColorKey {
    fn from(sample: Srgba<u8>) -> Self {
        Self::from_sample(sample)
    }
}

impl From<ColorKey> for Srgba<u8> {
    fn from(key: ColorKey) -> Self {
        key.to_srgba()
    }
}

impl Display for ColorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.channels();
        write!(f, "{r},{g},{b},{a}")
    }
}
