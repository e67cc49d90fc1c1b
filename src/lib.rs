//! A library for finding the most frequent colors of an image without blocking the caller's event loop.
//!
//! `swatchscan` quantizes every sample of an RGBA grid to a coarse palette of six levels per channel
//! (multiples of [`BUCKET_SIZE`]), counts how often each quantized color occurs,
//! and reports the top [`MAX_SWATCHES`] colors together with their share of the image.
//!
//! The scan runs cooperatively on an async executor: every few samples it yields back to the scheduler,
//! so a viewer sharing the same single-threaded runtime can keep rendering progress.
//!
//! # Features
//! To reduce dependencies and compile times, `swatchscan` has several `cargo` features
//! that can be turned off or on:
//! - `threads`: exposes a parallel version of the frequency tally via [`rayon`].
//! - `image`: enables integration with the [`image`] crate, including loading sources from files.
//!
//! # High-Level API
//! To get started, see [`SwatchScanner`]. Here is an example scanning an in-memory grid:
//! ```
//! # use swatchscan::{SwatchScanner, MemorySources, SampleGrid, LogPresenter};
//! # use palette::Srgba;
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let grid = SampleGrid::filled(10, 10, Srgba::new(200, 10, 10, 255))?;
//! let mut sources = MemorySources::new();
//! sources.insert("img", grid);
//!
//! let report = SwatchScanner::new()
//!     .process(&sources, "img", &mut LogPresenter::default())
//!     .await?;
//!
//! assert_eq!(report.swatches().len(), 1);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::pedantic,
    clippy::cargo,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,
    clippy::unwrap_in_result,
    clippy::expect_used,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice,
    missing_docs,
    clippy::missing_docs_in_private_items,
    rustdoc::all,
    clippy::float_cmp_const,
    clippy::lossy_float_literal
)]
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::missing_panics_doc,
    clippy::unreadable_literal,
    clippy::wildcard_imports
)]

mod error;
mod frequency;
mod key;
mod report;
mod scan;
mod session;
mod source;
mod types;

pub use error::*;
pub use frequency::FrequencyTable;
pub use key::{quantize_channel, ColorKey};
pub use report::*;
pub use scan::{scan, ScanOptions};
pub use session::SwatchScanner;
pub use source::*;
pub use types::*;

/// The maximum supported grid size in number of samples is `u32::MAX`.
pub const MAX_PIXELS: u32 = u32::MAX;

/// The width of a quantization bucket.
///
/// `0..=255` maps onto exactly six levels: `0, 51, 102, 153, 204, 255`.
pub const BUCKET_SIZE: u8 = 51;

/// The number of quantization levels per channel.
pub const LEVELS: u8 = u8::MAX / BUCKET_SIZE + 1;

/// The maximum number of swatches included in a report.
pub const MAX_SWATCHES: usize = 20;

/// The default number of samples processed between cooperative yields.
pub const DEFAULT_YIELD_INTERVAL: u32 = 50;
