//! Ranking of a finished [`FrequencyTable`] and relaying of scan events to a presenter.

use crate::{ColorKey, FrequencyTable, ScanError, MAX_SWATCHES};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

/// A quantized color and the number of samples that mapped to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Swatch {
    /// The quantized color.
    pub key: ColorKey,
    /// The number of samples with this quantized color.
    pub count: u32,
}

impl Swatch {
    /// Returns `round(count / total * 100)`, the integer percentage of `total` samples
    /// covered by this swatch. Returns `0` if `total` is `0`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn share(&self, total: u32) -> u8 {
        if total == 0 {
            return 0;
        }
        let (count, total) = (u64::from(self.count), u64::from(total));
        // round half up
        ((count * 200 + total) / (total * 2)).min(100) as u8
    }
}

/// The most frequent swatches of a scan, sorted by count descending.
///
/// Swatches with equal counts are ordered by ascending [`ColorKey`].
/// At most [`MAX_SWATCHES`] swatches are kept.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RankedSwatches {
    /// The ranked swatches.
    swatches: Vec<Swatch>,
    /// The number of samples in the scanned grid.
    total_count: u32,
}

impl RankedSwatches {
    /// Ranks the entries of `table`, keeping at most `max_swatches` (clamped to [`MAX_SWATCHES`]).
    #[must_use]
    pub fn from_table(table: &FrequencyTable, max_swatches: usize) -> Self {
        let mut swatches = table
            .iter()
            .map(|(key, count)| Swatch { key, count })
            .collect::<Vec<_>>();

        // table.iter() is in ascending key order, so a stable sort keeps ties ordered by key
        swatches.sort_by(|a, b| b.count.cmp(&a.count));
        swatches.truncate(max_swatches.min(MAX_SWATCHES));

        Self {
            swatches,
            total_count: table.total_count(),
        }
    }

    /// Returns the ranked swatches.
    #[must_use]
    pub fn swatches(&self) -> &[Swatch] {
        &self.swatches
    }

    /// The number of samples in the scanned grid.
    #[must_use]
    pub fn total_count(&self) -> u32 {
        self.total_count
    }

    /// Returns the number of ranked swatches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.swatches.len()
    }

    /// Whether there are no swatches.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.swatches.is_empty()
    }

    /// Iterates over each swatch together with its share of the grid in percent.
    pub fn iter_shares(&self) -> impl Iterator<Item = (Swatch, u8)> + '_ {
        self.swatches
            .iter()
            .map(|&swatch| (swatch, swatch.share(self.total_count)))
    }
}

/// Converts elapsed time into whole tenths of a second, rounding half up.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn elapsed_tenths(elapsed: Duration) -> u32 {
    let tenths = (elapsed.as_micros() + 50_000) / 100_000;
    tenths.min(u128::from(u32::MAX)) as u32
}

/// The result of a completed scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// The ranked swatches.
    pub swatches: RankedSwatches,
    /// Wall-clock time since the scan started, in whole tenths of a second.
    pub elapsed_tenths: u32,
}

impl Report {
    /// Returns the ranked swatches.
    #[must_use]
    pub fn swatches(&self) -> &[Swatch] {
        self.swatches.swatches()
    }

    /// The elapsed time in seconds, as shown to a viewer.
    #[must_use]
    pub fn elapsed_seconds(&self) -> f64 {
        f64::from(self.elapsed_tenths) / 10.0
    }
}

/// A collaborator that shows scan events to a viewer.
///
/// For one scan, a presenter receives either `start`, zero or more `progress` calls
/// with non-decreasing percentages, and a final `complete`; or exactly one `error` and nothing else.
pub trait Presenter {
    /// The scan has acquired its source and is starting.
    fn start(&mut self);

    /// `percent` (`0..=100`) of the rows have been scanned.
    fn progress(&mut self, percent: u8);

    /// The source could not be acquired. The scan never started.
    fn error(&mut self, error: &ScanError);

    /// The scan finished.
    fn complete(&mut self, report: &Report);
}

impl<P: Presenter + ?Sized> Presenter for &mut P {
    fn start(&mut self) {
        (**self).start();
    }

    fn progress(&mut self, percent: u8) {
        (**self).progress(percent);
    }

    fn error(&mut self, error: &ScanError) {
        (**self).error(error);
    }

    fn complete(&mut self, report: &Report) {
        (**self).complete(report);
    }
}

/// A scan event, as delivered by a [`ChannelPresenter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// See [`Presenter::start`].
    Start,
    /// See [`Presenter::progress`].
    Progress(u8),
    /// See [`Presenter::error`].
    Error(ScanError),
    /// See [`Presenter::complete`].
    Complete(Report),
}

/// A [`Presenter`] that forwards every event over an unbounded channel,
/// for viewers running as separate tasks.
#[derive(Debug, Clone)]
pub struct ChannelPresenter {
    /// The sending half of the event channel.
    tx: UnboundedSender<ScanEvent>,
}

impl ChannelPresenter {
    /// Creates a presenter and the receiver of its events.
    #[must_use]
    pub fn new() -> (Self, UnboundedReceiver<ScanEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Sends `event`, dropping it if the viewer has gone away.
    fn send(&self, event: ScanEvent) {
        if self.tx.send(event).is_err() {
            debug!("scan event receiver dropped");
        }
    }
}

impl Presenter for ChannelPresenter {
    fn start(&mut self) {
        self.send(ScanEvent::Start);
    }

    fn progress(&mut self, percent: u8) {
        self.send(ScanEvent::Progress(percent));
    }

    fn error(&mut self, error: &ScanError) {
        self.send(ScanEvent::Error(error.clone()));
    }

    fn complete(&mut self, report: &Report) {
        self.send(ScanEvent::Complete(report.clone()));
    }
}

/// A [`Presenter`] that writes events to the [`tracing`] log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogPresenter;

impl Presenter for LogPresenter {
    fn start(&mut self) {
        info!("scan started");
    }

    fn progress(&mut self, percent: u8) {
        debug!(percent, "scan progress");
    }

    fn error(&mut self, error: &ScanError) {
        warn!(%error, "scan failed");
    }

    fn complete(&mut self, report: &Report) {
        info!(seconds = report.elapsed_seconds(), "Total time {} seconds", report.elapsed_seconds());
        for (rank, (swatch, share)) in report.swatches.iter_shares().enumerate() {
            info!(
                rank = rank + 1,
                count = swatch.count,
                "{share}% rgba({})",
                swatch.key
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::*;
    use palette::Srgba;

    fn key(r: u8, g: u8, b: u8, a: u8) -> ColorKey {
        ColorKey::from_sample(Srgba::new(r, g, b, a))
    }

    #[test]
    fn two_by_two_ranking() {
        let table = FrequencyTable::tally(&two_by_two()).unwrap();
        let ranked = RankedSwatches::from_table(&table, MAX_SWATCHES);

        assert_eq!(
            ranked.swatches(),
            [
                Swatch { key: key(0, 0, 0, 255), count: 2 },
                Swatch { key: key(51, 51, 51, 255), count: 1 },
                Swatch { key: key(255, 255, 255, 255), count: 1 },
            ]
        );

        let shares = ranked.iter_shares().map(|(_, share)| share).collect::<Vec<_>>();
        assert_eq!(shares, [50, 25, 25]);
    }

    #[test]
    fn ranking_is_sorted_and_truncated() {
        let table = test_samples(10_000, 2).into_iter().collect::<FrequencyTable>();
        assert!(table.len() > MAX_SWATCHES);

        let ranked = RankedSwatches::from_table(&table, MAX_SWATCHES);
        assert_eq!(ranked.len(), MAX_SWATCHES);
        assert_eq!(ranked.total_count(), 10_000);

        for pair in ranked.swatches().windows(2) {
            let [a, b] = pair else { unreachable!() };
            assert!(a.count > b.count || (a.count == b.count && a.key < b.key));
        }

        let best = table.iter().map(|(_, count)| count).max().unwrap();
        assert_eq!(ranked.swatches()[0].count, best);

        assert_eq!(RankedSwatches::from_table(&table, 5).len(), 5);
        assert_eq!(RankedSwatches::from_table(&table, 1000).len(), MAX_SWATCHES);
    }

    #[test]
    fn empty_table_ranks_empty() {
        let ranked = RankedSwatches::from_table(&FrequencyTable::new(), MAX_SWATCHES);
        assert!(ranked.is_empty());
        assert_eq!(ranked.total_count(), 0);
    }

    #[test]
    fn share_rounds_to_nearest_percent() {
        let swatch = |count| Swatch { key: key(0, 0, 0, 0), count };
        assert_eq!(swatch(100).share(100), 100);
        assert_eq!(swatch(1).share(3), 33);
        assert_eq!(swatch(2).share(3), 67);
        assert_eq!(swatch(1).share(200), 1);
        assert_eq!(swatch(1).share(201), 0);
        assert_eq!(swatch(5).share(0), 0);
    }

    #[test]
    fn elapsed_rounds_to_tenths() {
        assert_eq!(elapsed_tenths(Duration::ZERO), 0);
        assert_eq!(elapsed_tenths(Duration::from_millis(49)), 0);
        assert_eq!(elapsed_tenths(Duration::from_millis(50)), 1);
        assert_eq!(elapsed_tenths(Duration::from_millis(1234)), 12);
        assert_eq!(elapsed_tenths(Duration::from_millis(1250)), 13);
    }

    #[tokio::test]
    async fn channel_presenter_forwards_events() {
        let (mut presenter, mut rx) = ChannelPresenter::new();
        let report = Report {
            swatches: RankedSwatches::default(),
            elapsed_tenths: 3,
        };

        presenter.start();
        presenter.progress(100);
        presenter.complete(&report);
        drop(presenter);

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        assert_eq!(
            events,
            [ScanEvent::Start, ScanEvent::Progress(100), ScanEvent::Complete(report)]
        );
    }

    #[test]
    fn channel_presenter_survives_dropped_receiver() {
        let (mut presenter, rx) = ChannelPresenter::new();
        drop(rx);
        presenter.progress(10);
    }
}
