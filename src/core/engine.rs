//! Runs scan jobs one scan type at a time and collects the results.

use crate::core::context::{ScanJob, ScanOptions};
use crate::core::registry::scanner_for;
use crate::reporting::aggregate::ResultAggregator;

pub struct Engine {
    opts: ScanOptions,
}

impl Engine {
    pub fn new(opts: ScanOptions) -> Self {
        Self { opts }
    }

    /// Jobs run in order and each job's scans run sequentially, so every
    /// request to a target honours the pacing interval. Cancellation stops
    /// new scans from starting; results gathered so far are kept.
    pub async fn run(&self, jobs: Vec<ScanJob>) -> ResultAggregator {
        let mut aggregator = ResultAggregator::new();

        'jobs: for job in jobs {
            if job.plan.is_empty() {
                self.opts
                    .warn(&format!("No scan types selected for {}, skipping", job.target));
                continue;
            }
            self.opts.info(&format!(
                "Scanning {} ({} scan type(s), delay {:.2}s)",
                job.target,
                job.plan.types().len(),
                self.opts.delay.as_secs_f64()
            ));

            for scan_type in job.plan.types() {
                if self.opts.cancel.is_cancelled() {
                    self.opts.warn("Scan cancelled, reporting results collected so far");
                    break 'jobs;
                }
                let scanner = scanner_for(*scan_type);
                let result = scanner.scan(&job.target, &self.opts).await;
                aggregator.record(&job.target, *scan_type, result);
            }
        }

        aggregator
    }
}
