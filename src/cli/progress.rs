//! Progress display module
//!
//! Draws a single, self-overwriting progress line while a download runs,
//! and formats the completion summary.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::download::{DownloadOutcome, ProgressCounter, ProgressObserver, ProgressSnapshot};

/// Format bytes to human readable string
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_index])
}

/// Format speed to human readable string
pub fn format_speed(bytes_per_sec: f64) -> String {
    format!("{}/s", format_bytes(bytes_per_sec as u64))
}

/// Format duration to human readable string
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Render the progress line for a snapshot
pub fn render_progress(snapshot: &ProgressSnapshot) -> String {
    match (snapshot.percent(), snapshot.total) {
        (Some(percent), Some(total)) => {
            let eta = snapshot
                .eta()
                .map(format_duration)
                .unwrap_or_else(|| "∞".to_string());
            format!(
                "Progress: {:.1}% ({} / {}) {} ETA {}",
                percent,
                format_bytes(snapshot.transferred),
                format_bytes(total),
                format_speed(snapshot.speed()),
                eta,
            )
        }
        _ => format!(
            "Downloaded: {} ({})",
            format_bytes(snapshot.transferred),
            format_speed(snapshot.speed()),
        ),
    }
}

/// Render the summary printed after a successful download
pub fn render_summary(outcome: &DownloadOutcome) -> String {
    let mut lines = vec![
        "Download Complete!".to_string(),
        format!("  Saved to: {}", outcome.destination.display()),
        format!("  Size: {}", format_bytes(outcome.file_size)),
    ];
    if outcome.resumed {
        lines.push(format!("  Resumed from: {}", format_bytes(outcome.resumed_from)));
    }
    lines.push(format!("  Type: {}", outcome.file_type.category));
    let elapsed = Duration::from_secs_f64(outcome.elapsed_secs.max(0.0));
    lines.push(format!("  Elapsed Time: {}", format_duration(elapsed)));
    if outcome.elapsed_secs > 0.0 {
        let speed = outcome.bytes_written as f64 / outcome.elapsed_secs;
        lines.push(format!("  Average Speed: {}", format_speed(speed)));
    }
    lines.join("\n")
}

/// Terminal progress line for a single transfer
pub struct ProgressTracker<W: Write = io::Stderr> {
    /// Output for the progress line
    writer: W,
    /// Counter for the running transfer
    counter: Option<ProgressCounter>,
    /// Last time the line was drawn
    last_draw: Option<Instant>,
    /// Minimum time between redraws
    update_interval: Duration,
    /// Quiet mode (no progress output)
    quiet: bool,
}

impl ProgressTracker<io::Stderr> {
    /// Create a tracker drawing to stderr
    pub fn new(quiet: bool) -> Self {
        Self::with_writer(io::stderr(), quiet, Duration::from_millis(100))
    }
}

impl<W: Write> ProgressTracker<W> {
    /// Create a tracker drawing to `writer`
    pub fn with_writer(writer: W, quiet: bool, update_interval: Duration) -> Self {
        Self {
            writer,
            counter: None,
            last_draw: None,
            update_interval,
            quiet,
        }
    }

    /// Current state of the transfer, if one started
    pub fn snapshot(&self) -> Option<ProgressSnapshot> {
        self.counter.as_ref().map(ProgressCounter::snapshot)
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Give back the writer
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn draw(&mut self, force: bool) {
        if self.quiet {
            return;
        }
        if !force {
            if let Some(last) = self.last_draw {
                if last.elapsed() < self.update_interval {
                    return;
                }
            }
        }
        let Some(snapshot) = self.snapshot() else {
            return;
        };

        self.last_draw = Some(Instant::now());
        let line = render_progress(&snapshot);
        let result = write!(self.writer, "\r\x1b[2K{}", line).and_then(|_| self.writer.flush());
        if let Err(e) = result {
            debug!("Failed to draw progress: {}", e);
        }
    }
}

impl<W: Write + Send> ProgressObserver for ProgressTracker<W> {
    fn start(&mut self, total: Option<u64>, offset: u64) {
        self.counter = Some(ProgressCounter::new(total, offset));
        self.last_draw = None;
        self.draw(true);
    }

    fn advance(&mut self, bytes: u64) {
        if let Some(counter) = self.counter.as_mut() {
            counter.add(bytes);
        }
        self.draw(false);
    }

    fn finish(&mut self) {
        self.draw(true);
        if self.quiet || self.counter.is_none() {
            return;
        }
        if let Err(e) = writeln!(self.writer).and_then(|_| self.writer.flush()) {
            debug!("Failed to finish progress line: {}", e);
        }
    }
}
