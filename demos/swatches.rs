#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice
)]

use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use swatchscan::{
    ChannelPresenter, ImageFiles, ScanEvent, ScanOptions, SwatchScanner, MAX_SWATCHES,
};
use tracing::Level;

#[derive(Parser)]
pub struct Options {
    /// Width of the sampling surface; 0 scans the image at full resolution.
    #[arg(short, long, default_value_t = ImageFiles::DEFAULT_SAMPLE_WIDTH)]
    width: u32,

    /// Maximum number of swatches to print.
    #[arg(short = 'n', long, default_value_t = MAX_SWATCHES)]
    swatches: usize,

    /// Samples processed between cooperative yields.
    #[arg(long, default_value_t = swatchscan::DEFAULT_YIELD_INTERVAL)]
    yield_interval: u32,

    #[arg(long)]
    verbose: bool,

    input: PathBuf,
}

/// Draws progress while the scan runs on the same thread.
async fn view(mut events: tokio::sync::mpsc::UnboundedReceiver<ScanEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            ScanEvent::Start => println!("scanning..."),
            ScanEvent::Progress(percent) => {
                let bar = "#".repeat(usize::from(percent) / 5);
                println!("[{bar:<20}] {percent}%");
            }
            ScanEvent::Error(err) => println!("{err}"),
            ScanEvent::Complete(report) => {
                println!("Total time {} seconds", report.elapsed_seconds());
                for (i, (swatch, share)) in report.swatches.iter_shares().enumerate() {
                    let [r, g, b, a] = swatch.key.channels();
                    println!(
                        "{:>2}. {:>6} {share:>3}% rgba({r},{g},{b},{a}) \x1b[48;2;{r};{g};{b}m      \x1b[0m",
                        i + 1,
                        swatch.count,
                    );
                }
            }
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let Options { width, swatches, yield_interval, verbose, input } = Options::parse();

    tracing_subscriber::fmt()
        .with_max_level(if verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let files = ImageFiles::new().sample_width((width != 0).then_some(width));
    let scanner = SwatchScanner::with_options(
        ScanOptions::new()
            .max_swatches(swatches)
            .yield_interval(yield_interval),
    );

    let (presenter, events) = ChannelPresenter::new();
    let viewer = tokio::spawn(view(events));

    let Some(id) = input.to_str() else {
        eprintln!("input path is not valid UTF-8");
        return ExitCode::FAILURE;
    };
    let result = scanner.process(&files, id, presenter).await;

    if let Err(err) = viewer.await {
        tracing::error!(%err, "viewer task failed");
        return ExitCode::FAILURE;
    }

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
