//! The top-level scan entry point.

use crate::{
    report::elapsed_tenths, scan::scan_countable, source::ensure_countable, Presenter,
    RankedSwatches, Report, ScanError, ScanOptions, SourceProvider,
};
use std::time::Instant;
use tracing::{info_span, warn, Instrument};

/// Acquires an image by identifier, scans it cooperatively and reports its swatches to a [`Presenter`].
///
/// Every call to [`SwatchScanner::process`] starts from a fresh frequency table,
/// so one scanner can be reused for any number of independent scans.
///
/// # Examples
/// ```
/// # use swatchscan::{SwatchScanner, ScanOptions, MemorySources, SampleGrid, ChannelPresenter, ScanEvent};
/// # use palette::Srgba;
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut sources = MemorySources::new();
/// sources.insert("img", SampleGrid::filled(4, 2, Srgba::new(0, 0, 0, 255))?);
///
/// let (mut presenter, mut events) = ChannelPresenter::new();
/// let scanner = SwatchScanner::with_options(ScanOptions::new().max_swatches(5));
/// scanner.process(&sources, "img", &mut presenter).await?;
///
/// assert_eq!(events.recv().await, Some(ScanEvent::Start));
/// assert_eq!(events.recv().await, Some(ScanEvent::Progress(50)));
/// assert_eq!(events.recv().await, Some(ScanEvent::Progress(100)));
/// assert!(matches!(events.recv().await, Some(ScanEvent::Complete(_))));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SwatchScanner {
    /// The options for each scan.
    options: ScanOptions,
}

impl SwatchScanner {
    /// Creates a new [`SwatchScanner`] with default [`ScanOptions`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new [`SwatchScanner`] with the given options.
    #[must_use]
    pub fn with_options(options: ScanOptions) -> Self {
        Self { options }
    }

    /// Returns the options used for each scan.
    #[must_use]
    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Scans the image named `id` from `provider`, relaying events to `presenter`.
    ///
    /// On success, `presenter` sees `start`, one `progress` per scanned row, then `complete`,
    /// and the same [`Report`] is returned.
    /// If the image cannot be acquired, `presenter` sees a single `error` and nothing else.
    ///
    /// # Errors
    /// Returns the acquisition error of `provider`, or [`ScanError::ContextUnavailable`]
    /// if the acquired source has more than [`MAX_PIXELS`](crate::MAX_PIXELS) samples.
    /// The scan is not retried.
    pub async fn process<P>(
        &self,
        provider: &P,
        id: &str,
        mut presenter: impl Presenter,
    ) -> Result<Report, ScanError>
    where
        P: SourceProvider + ?Sized,
    {
        let span = info_span!("scan", id);
        async {
            let acquired = provider
                .acquire(id)
                .await
                .and_then(|source| ensure_countable(&source).map(|()| source));

            let source = match acquired {
                Ok(source) => source,
                Err(err) => {
                    warn!(%err, "failed to acquire image");
                    presenter.error(&err);
                    return Err(err);
                }
            };

            let start = Instant::now();
            presenter.start();

            let table =
                scan_countable(&source, &self.options, |percent| presenter.progress(percent)).await;

            let report = Report {
                swatches: RankedSwatches::from_table(&table, self.options.get_max_swatches()),
                elapsed_tenths: elapsed_tenths(start.elapsed()),
            };
            presenter.complete(&report);

            Ok(report)
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        tests::*, ChannelPresenter, ColorKey, ImageSource, MemorySources, SampleGrid, ScanEvent,
    };
    use palette::Srgba;

    async fn collect_events<P: SourceProvider>(
        sources: &P,
        id: &str,
        scanner: SwatchScanner,
    ) -> (Result<Report, ScanError>, Vec<ScanEvent>) {
        let (mut presenter, mut rx) = ChannelPresenter::new();
        let result = scanner.process(sources, id, &mut presenter).await;
        drop(presenter);

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        (result, events)
    }

    #[tokio::test]
    async fn uniform_grid_reports_one_swatch() {
        let mut sources = MemorySources::new();
        sources.insert(
            "img",
            SampleGrid::filled(10, 10, Srgba::new(200, 10, 10, 255)).unwrap(),
        );

        let (report, events) = collect_events(&sources, "img", SwatchScanner::new()).await;
        let report = report.unwrap();

        let shares = report.swatches.iter_shares().collect::<Vec<_>>();
        assert_eq!(shares.len(), 1);
        let (swatch, share) = shares[0];
        assert_eq!(swatch.count, 100);
        assert_eq!(swatch.key.channels(), [204, 0, 0, 255]);
        assert_eq!(share, 100);

        assert_eq!(events.first(), Some(&ScanEvent::Start));
        assert_eq!(events.last(), Some(&ScanEvent::Complete(report)));
        let progress = events[1..events.len() - 1]
            .iter()
            .map(|event| match event {
                ScanEvent::Progress(p) => *p,
                other => panic!("unexpected event {other:?}"),
            })
            .collect::<Vec<_>>();
        assert_eq!(progress, [10, 20, 30, 40, 50, 60, 70, 80, 90, 100]);
    }

    #[tokio::test]
    async fn two_by_two_ranks_black_first() {
        let mut sources = MemorySources::new();
        sources.insert("img", two_by_two());

        let (report, _) = collect_events(&sources, "img", SwatchScanner::new()).await;
        let report = report.unwrap();

        assert_eq!(report.swatches.total_count(), 4);
        let first = report.swatches()[0];
        assert_eq!(first.key, ColorKey::from_sample(Srgba::new(0, 0, 0, 255)));
        assert_eq!(first.count, 2);
        assert_eq!(report.swatches().len(), 3);
    }

    #[tokio::test]
    async fn missing_image_yields_only_an_error() {
        let sources = MemorySources::new();

        let (result, events) = collect_events(&sources, "missing", SwatchScanner::new()).await;
        let err = result.unwrap_err();

        assert!(matches!(err, ScanError::AcquisitionFailure(_)));
        assert_eq!(events, [ScanEvent::Error(err)]);
    }

    #[tokio::test]
    async fn zero_area_completes_with_no_swatches() {
        let mut sources = MemorySources::new();
        sources.insert("empty", SampleGrid::new(0, 3, Vec::new()).unwrap());

        let (report, events) = collect_events(&sources, "empty", SwatchScanner::new()).await;
        let report = report.unwrap();

        assert!(report.swatches.is_empty());
        assert_eq!(events, [ScanEvent::Start, ScanEvent::Complete(report)]);
    }

    #[tokio::test]
    async fn each_scan_starts_fresh() {
        let mut sources = MemorySources::new();
        sources.insert("img", test_grid(40, 30));

        let scanner = SwatchScanner::with_options(ScanOptions::new().max_swatches(8));
        let (first, _) = collect_events(&sources, "img", scanner).await;
        let (second, _) = collect_events(&sources, "img", scanner).await;

        let (first, second) = (first.unwrap(), second.unwrap());
        assert_eq!(first.swatches, second.swatches);
        assert_eq!(first.swatches.total_count(), 1200);
        assert_eq!(first.swatches.len(), 8);
    }

    #[tokio::test]
    async fn removed_image_is_no_longer_found() {
        let mut sources = MemorySources::new();
        sources.insert("img", two_by_two());
        assert_eq!(sources.remove("img"), Some(two_by_two()));
        assert_eq!(sources.remove("img"), None);

        let (result, events) = collect_events(&sources, "img", SwatchScanner::new()).await;
        let err = result.unwrap_err();
        assert_eq!(err, ScanError::AcquisitionFailure("Image not found: img".to_owned()));
        assert_eq!(events, [ScanEvent::Error(err)]);
    }

    /// A source whose dimensions alone make it impossible to count.
    struct Oversized;

    impl ImageSource for Oversized {
        fn width(&self) -> u32 {
            u32::MAX
        }

        fn height(&self) -> u32 {
            2
        }

        fn sample(&self, _: u32, _: u32) -> Srgba<u8> {
            panic!("oversized source was sampled")
        }
    }

    /// Hands out sources that cannot be scanned.
    enum Unscannable {
        NoContext,
        TooLarge,
    }

    impl SourceProvider for Unscannable {
        type Source = Oversized;

        async fn acquire(&self, id: &str) -> Result<Self::Source, ScanError> {
            match self {
                Self::NoContext => Err(ScanError::ContextUnavailable(format!(
                    "no sampling surface for {id}"
                ))),
                Self::TooLarge => Ok(Oversized),
            }
        }
    }

    #[tokio::test]
    async fn context_unavailable_yields_only_an_error() {
        let (result, events) =
            collect_events(&Unscannable::NoContext, "img", SwatchScanner::new()).await;
        let err = result.unwrap_err();

        assert_eq!(
            err,
            ScanError::ContextUnavailable("no sampling surface for img".to_owned())
        );
        assert_eq!(events, [ScanEvent::Error(err)]);
    }

    #[tokio::test]
    async fn oversized_source_yields_only_an_error() {
        let (result, events) =
            collect_events(&Unscannable::TooLarge, "huge", SwatchScanner::new()).await;
        let err = result.unwrap_err();

        assert!(matches!(err, ScanError::ContextUnavailable(_)));
        assert_eq!(events, [ScanEvent::Error(err)]);
    }

    #[test]
    fn options_are_kept() {
        let options = ScanOptions::new().max_swatches(3).yield_interval(7);
        let scanner = SwatchScanner::with_options(options);
        assert_eq!(scanner.options(), &options);
        assert_eq!(scanner.options().get_max_swatches(), 3);
        assert_eq!(SwatchScanner::new().options(), &ScanOptions::new());
    }
}
