//! mast - Main entry point
//!
//! A command-line file downloader with resumable transfers, custom headers
//! and cookies, and progress display.

use anyhow::{Context, Result};
use mast::cli::progress::render_summary;
use mast::{CliArgs, Command, Config, DownloadArgs, Downloader, ProgressTracker};
use tracing::{debug, error, info};

/// Set up panic handler for unexpected errors
fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        let backtrace = std::backtrace::Backtrace::capture();

        if let Some(location) = panic_info.location() {
            error!(
                "PANIC occurred at {}:{}:{}",
                location.file(),
                location.line(),
                location.column()
            );
        } else {
            error!("PANIC occurred at unknown location");
        }
        let payload = panic_info.payload();
        if let Some(s) = payload.downcast_ref::<&str>() {
            error!("Panic message: {}", s);
        } else if let Some(s) = payload.downcast_ref::<String>() {
            error!("Panic message: {}", s);
        } else {
            error!("Panic message: unknown");
        }
        error!("Backtrace:\n{:?}", backtrace);
    }));
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_panic_handler();

    let args = CliArgs::parse_args();
    init_logging(&args);
    debug!("CLI arguments: {:?}", args);

    match &args.command {
        Command::Version => {
            println!("mast {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Command::Download(download_args) => run_download(download_args, args.is_quiet()).await,
    }
}

/// Initialize logging based on verbosity settings
fn init_logging(args: &CliArgs) {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if args.is_verbose() {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }

    debug!("Logging initialized with level {:?}", args.log_level());
}

/// Run the `download` subcommand
async fn run_download(args: &DownloadArgs, quiet: bool) -> Result<()> {
    let config = Config::from_args(args).context("Invalid arguments")?;
    config.validate().context("Invalid configuration")?;
    debug!("Download config: {:?}", config.download);
    debug!("Destination: {}", config.destination().display());

    let downloader = Downloader::new(config.download.clone())
        .context("Failed to initialize downloader")?;
    let mut progress = ProgressTracker::new(quiet);

    let outcome = match downloader.download(&config.task, &mut progress).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Download failed: {}", e);
            return Err(anyhow::Error::from(e).context("Download failed"));
        }
    };

    info!(
        "Saved {} ({} bytes{})",
        outcome.destination.display(),
        outcome.file_size,
        if outcome.resumed { ", resumed" } else { "" }
    );

    if config.json {
        let json = serde_json::to_string_pretty(&outcome)
            .context("Failed to serialize download result")?;
        println!("{}", json);
    } else if !quiet {
        println!("{}", render_summary(&outcome));
    }

    Ok(())
}
