//! Batch driver.
//!
//! Scans are independent, so a batch is a plain map over the inputs. Every
//! input yields exactly one [`ScanOutcome`] in input order; a failing scan is
//! logged and recorded, never fatal for the rest of the batch.

use super::{PreprocessedScan, ScanPipeline};
use rayon::prelude::*;
use scan_cae_core::core::{ScanError, ScanResult};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// The result of preprocessing one input of a batch.
#[derive(Debug)]
pub struct ScanOutcome {
    /// The input path.
    pub path: PathBuf,
    /// The preprocessed scan, or why it was skipped.
    pub result: ScanResult<PreprocessedScan>,
    /// Wall time spent on this input.
    pub elapsed: Duration,
}

impl ScanOutcome {
    /// Returns true if the scan produced a tensor.
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

impl ScanPipeline {
    /// Preprocesses every path in `paths`.
    ///
    /// Batches larger than the configured image threshold run on rayon, in a
    /// dedicated pool when `max_threads` is set.
    pub fn process_batch<P: AsRef<Path> + Sync>(&self, paths: &[P]) -> Vec<ScanOutcome> {
        let start = Instant::now();
        let parallel = self.parallel_policy().should_parallelize(paths.len());

        let outcomes: Vec<ScanOutcome> = if !parallel {
            paths.iter().map(|p| self.process_one(p.as_ref())).collect()
        } else if let Some(threads) = self.parallel_policy().max_threads {
            match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
                Ok(pool) => pool.install(|| self.process_parallel(paths)),
                Err(e) => {
                    let err =
                        ScanError::batch_processing(&format!("build a {threads}-thread pool"), e);
                    warn!(error = ?err, "using the global rayon pool");
                    self.process_parallel(paths)
                }
            }
        } else {
            self.process_parallel(paths)
        };

        let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
        info!(
            total = paths.len(),
            failed,
            parallel,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "batch finished"
        );
        outcomes
    }

    fn process_parallel<P: AsRef<Path> + Sync>(&self, paths: &[P]) -> Vec<ScanOutcome> {
        paths
            .par_iter()
            .map(|p| self.process_one(p.as_ref()))
            .collect()
    }

    fn process_one(&self, path: &Path) -> ScanOutcome {
        let start = Instant::now();
        let result = self.process(path);
        let elapsed = start.elapsed();

        match &result {
            Ok(scan) => debug!(
                path = %path.display(),
                crop = ?scan.crop.region,
                "preprocessed scan"
            ),
            Err(e) => warn!(path = %path.display(), kind = %e.kind(), "skipping scan: {e}"),
        }

        ScanOutcome {
            path: path.to_path_buf(),
            result,
            elapsed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{PipelineConfig, PipelineStats};
    use image::{Rgb, RgbImage};
    use scan_cae_core::core::{ErrorKind, ParallelPolicy};

    fn write_disk(dir: &Path, name: &str, radius: i32) -> PathBuf {
        let image = RgbImage::from_fn(224, 224, |x, y| {
            let (dx, dy) = (x as i32 - 112, y as i32 - 112);
            if dx * dx + dy * dy <= radius * radius {
                Rgb([200, 180, 160])
            } else {
                Rgb([5, 5, 5])
            }
        });
        let path = dir.join(name);
        image.save(&path).unwrap();
        path
    }

    fn mixed_batch(dir: &Path) -> Vec<PathBuf> {
        let black = dir.join("black.png");
        RgbImage::new(64, 64).save(&black).unwrap();
        let garbage = dir.join("garbage.png");
        std::fs::write(&garbage, b"definitely not a png").unwrap();

        vec![
            write_disk(dir, "a.png", 40),
            black,
            dir.join("missing.png"),
            write_disk(dir, "b.png", 60),
            garbage,
        ]
    }

    fn assert_mixed_outcomes(outcomes: &[ScanOutcome], paths: &[PathBuf]) {
        assert_eq!(outcomes.len(), paths.len());
        for (outcome, path) in outcomes.iter().zip(paths) {
            assert_eq!(&outcome.path, path);
        }
        assert!(outcomes[0].is_ok());
        assert!(outcomes[3].is_ok());

        let stats = PipelineStats::from_outcomes(outcomes);
        assert_eq!(stats.successful, 2);
        assert_eq!(stats.failed, 3);
        assert_eq!(stats.failures_by_kind[&ErrorKind::NoRegionFound], 1);
        assert_eq!(stats.failures_by_kind[&ErrorKind::UnreadableImage], 2);
    }

    #[test]
    fn test_sequential_batch_keeps_order_and_skips_failures() {
        let dir = tempfile::tempdir().unwrap();
        let paths = mixed_batch(dir.path());
        let config = PipelineConfig {
            parallel: ParallelPolicy::new().with_image_threshold(100),
            ..Default::default()
        };
        let pipeline = ScanPipeline::new(config).unwrap();
        assert_mixed_outcomes(&pipeline.process_batch(&paths), &paths);
    }

    #[test]
    fn test_parallel_batch_matches_sequential() {
        let dir = tempfile::tempdir().unwrap();
        let paths = mixed_batch(dir.path());
        let config = PipelineConfig {
            parallel: ParallelPolicy::new()
                .with_image_threshold(1)
                .with_max_threads(Some(2)),
            ..Default::default()
        };
        let pipeline = ScanPipeline::new(config).unwrap();
        let outcomes = pipeline.process_batch(&paths);
        assert_mixed_outcomes(&outcomes, &paths);

        let sequential = ScanPipeline::default().process(&paths[3]).unwrap();
        let parallel = outcomes[3].result.as_ref().unwrap();
        assert_eq!(parallel.tensor, sequential.tensor);
    }

    #[test]
    fn test_empty_batch() {
        let pipeline = ScanPipeline::default();
        let paths: Vec<PathBuf> = Vec::new();
        assert!(pipeline.process_batch(&paths).is_empty());
    }
}
