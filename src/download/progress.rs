//! Progress observation
//!
//! The downloader reports bytes as they reach disk. Observers turn that into
//! a percentage and a throughput.

use std::time::{Duration, Instant};

/// Receives progress events from a transfer
pub trait ProgressObserver: Send {
    /// Transfer started. `offset` bytes were already on disk.
    fn start(&mut self, total: Option<u64>, offset: u64);

    /// `bytes` more bytes were written
    fn advance(&mut self, bytes: u64);

    /// Transfer finished
    fn finish(&mut self);
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn start(&mut self, _total: Option<u64>, _offset: u64) {}

    fn advance(&mut self, _bytes: u64) {}

    fn finish(&mut self) {}
}

/// Point-in-time view of a transfer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    /// Bytes on disk, including the resume offset
    pub transferred: u64,
    /// Expected final size, if known
    pub total: Option<u64>,
    /// Bytes that were on disk before this session
    pub offset: u64,
    /// Time since the transfer started
    pub elapsed: Duration,
}

impl ProgressSnapshot {
    /// Bytes received in this session
    pub fn session_bytes(&self) -> u64 {
        self.transferred.saturating_sub(self.offset)
    }

    /// Completion percentage, `None` when the total is unknown
    pub fn percent(&self) -> Option<f64> {
        match self.total {
            Some(total) if total > 0 => Some(self.transferred as f64 / total as f64 * 100.0),
            _ => None,
        }
    }

    /// Throughput of this session in bytes per second
    pub fn speed(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        self.session_bytes() as f64 / secs
    }

    /// Estimated time left
    pub fn eta(&self) -> Option<Duration> {
        let total = self.total?;
        let speed = self.speed();
        if speed <= 0.0 || self.transferred >= total {
            return None;
        }
        let remaining = total.saturating_sub(self.transferred) as f64;
        Some(Duration::from_secs_f64(remaining / speed))
    }

    /// Whether every expected byte is on disk
    pub fn is_complete(&self) -> bool {
        matches!(self.total, Some(total) if self.transferred >= total)
    }
}

/// Running byte counter for one transfer
#[derive(Debug, Clone)]
pub struct ProgressCounter {
    transferred: u64,
    total: Option<u64>,
    offset: u64,
    started: Instant,
}

impl ProgressCounter {
    /// Start counting at `offset`
    pub fn new(total: Option<u64>, offset: u64) -> Self {
        Self {
            transferred: offset,
            total,
            offset,
            started: Instant::now(),
        }
    }

    /// Record `bytes` written
    pub fn add(&mut self, bytes: u64) {
        self.transferred = self.transferred.saturating_add(bytes);
    }

    /// Current state
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            transferred: self.transferred,
            total: self.total,
            offset: self.offset,
            elapsed: self.started.elapsed(),
        }
    }
}
