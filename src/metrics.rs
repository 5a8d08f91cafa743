use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// Counters for one extractor: how much I/O the binary searches cost
#[derive(Debug)]
pub struct MetricsCollector {
    // Operation counts
    /// Number of shard loads
    shard_reads: AtomicUsize,
    /// Number of record locator runs
    record_searches: AtomicUsize,
    /// Number of completed extractions
    extractions: AtomicUsize,

    // Data metrics
    /// Records materialized from shard loads
    records_read: AtomicUsize,
    /// Records returned to callers
    records_emitted: AtomicUsize,

    // Timing metrics
    /// Total shard load duration in nanoseconds
    read_duration_ns: AtomicU64,
    /// Total extraction duration in nanoseconds
    extract_duration_ns: AtomicU64,
}

/// A point-in-time copy of the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub shard_reads: usize,
    pub record_searches: usize,
    pub extractions: usize,
    pub records_read: usize,
    pub records_emitted: usize,
    pub read_duration: Duration,
    pub extract_duration: Duration,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCollector {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            shard_reads: AtomicUsize::new(0),
            record_searches: AtomicUsize::new(0),
            extractions: AtomicUsize::new(0),

            records_read: AtomicUsize::new(0),
            records_emitted: AtomicUsize::new(0),

            read_duration_ns: AtomicU64::new(0),
            extract_duration_ns: AtomicU64::new(0),
        }
    }

    /// Record one shard load of `records` rows
    pub fn record_shard_read(&self, records: usize, duration: Duration) {
        self.shard_reads.fetch_add(1, Ordering::Relaxed);
        self.records_read.fetch_add(records, Ordering::Relaxed);
        self.read_duration_ns.fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    /// Increment record search count
    pub fn increment_record_searches(&self) {
        self.record_searches.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a finished extraction
    pub fn record_extraction(&self, emitted: usize, duration: Duration) {
        self.extractions.fetch_add(1, Ordering::Relaxed);
        self.records_emitted.fetch_add(emitted, Ordering::Relaxed);
        self.extract_duration_ns.fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    /// Get number of shard loads
    pub fn get_shard_reads(&self) -> usize {
        self.shard_reads.load(Ordering::Relaxed)
    }

    /// Copy every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            shard_reads: self.shard_reads.load(Ordering::Relaxed),
            record_searches: self.record_searches.load(Ordering::Relaxed),
            extractions: self.extractions.load(Ordering::Relaxed),
            records_read: self.records_read.load(Ordering::Relaxed),
            records_emitted: self.records_emitted.load(Ordering::Relaxed),
            read_duration: Duration::from_nanos(self.read_duration_ns.load(Ordering::Relaxed)),
            extract_duration: Duration::from_nanos(self.extract_duration_ns.load(Ordering::Relaxed)),
        }
    }

    /// Reset all metrics
    pub fn reset(&self) {
        self.shard_reads.store(0, Ordering::Relaxed);
        self.record_searches.store(0, Ordering::Relaxed);
        self.extractions.store(0, Ordering::Relaxed);
        self.records_read.store(0, Ordering::Relaxed);
        self.records_emitted.store(0, Ordering::Relaxed);
        self.read_duration_ns.store(0, Ordering::Relaxed);
        self.extract_duration_ns.store(0, Ordering::Relaxed);
    }

    /// Get a report of all metrics
    pub fn get_report(&self) -> String {
        let snapshot = self.snapshot();
        let mut report = String::new();

        report.push_str("=== Extraction Metrics ===\n\n");

        report.push_str("Operation Counts:\n");
        report.push_str(&format!("  Extractions: {}\n", snapshot.extractions));
        report.push_str(&format!("  Record Searches: {}\n", snapshot.record_searches));
        report.push_str(&format!("  Shard Reads: {}\n\n", snapshot.shard_reads));

        report.push_str("Data Metrics:\n");
        report.push_str(&format!("  Records Read: {}\n", snapshot.records_read));
        report.push_str(&format!("  Records Emitted: {}\n\n", snapshot.records_emitted));

        report.push_str("Performance Metrics:\n");
        if snapshot.shard_reads > 0 {
            let avg_read = snapshot.read_duration.as_micros() / snapshot.shard_reads as u128;
            report.push_str(&format!("  Avg. Shard Read Time: {}µs\n", avg_read));
        }
        report.push_str(&format!("  Total Extraction Time: {:?}\n", snapshot.extract_duration));

        report
    }
}
