//! Batch statistics.
//!
//! This module defines the `PipelineStats` structure summarizing a batch run:
//! how many scans were processed, how many failed and why, and the average
//! per-scan processing time.

use super::batch::ScanOutcome;
use scan_cae_core::core::ErrorKind;
use std::collections::BTreeMap;
use std::fmt;

/// Statistics for a batch of scans.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineStats {
    /// The total number of scans processed.
    pub total_processed: usize,
    /// The number of scans that produced a tensor.
    pub successful: usize,
    /// The number of scans that were skipped.
    pub failed: usize,
    /// Skipped scans grouped by failure kind.
    pub failures_by_kind: BTreeMap<ErrorKind, usize>,
    /// The average processing time per scan in milliseconds.
    pub average_time_ms: f64,
}

impl PipelineStats {
    /// Creates an empty statistics record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Summarizes the outcomes of a batch run.
    pub fn from_outcomes(outcomes: &[ScanOutcome]) -> Self {
        let mut stats = Self::new();
        let mut total_ms = 0.0;

        for outcome in outcomes {
            stats.total_processed += 1;
            total_ms += outcome.elapsed.as_secs_f64() * 1000.0;
            match &outcome.result {
                Ok(_) => stats.successful += 1,
                Err(e) => {
                    stats.failed += 1;
                    *stats.failures_by_kind.entry(e.kind()).or_insert(0) += 1;
                }
            }
        }

        if stats.total_processed > 0 {
            stats.average_time_ms = total_ms / stats.total_processed as f64;
        }
        stats
    }

    /// Returns the success rate as a percentage (0.0 to 100.0).
    pub fn success_rate(&self) -> f64 {
        if self.total_processed == 0 {
            0.0
        } else {
            (self.successful as f64 / self.total_processed as f64) * 100.0
        }
    }

    /// Returns the failure rate as a percentage (0.0 to 100.0).
    pub fn failure_rate(&self) -> f64 {
        if self.total_processed == 0 {
            0.0
        } else {
            (self.failed as f64 / self.total_processed as f64) * 100.0
        }
    }
}

impl fmt::Display for PipelineStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pipeline Statistics:")?;
        writeln!(f, "  Total processed: {}", self.total_processed)?;
        writeln!(
            f,
            "  Successful: {} ({:.1}%)",
            self.successful,
            self.success_rate()
        )?;
        writeln!(f, "  Failed: {} ({:.1}%)", self.failed, self.failure_rate())?;
        for (kind, count) in &self.failures_by_kind {
            writeln!(f, "    {kind}: {count}")?;
        }
        writeln!(f, "  Average time: {:.2} ms", self.average_time_ms)?;
        Ok(())
    }
}
