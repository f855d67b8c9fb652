//! Batch dispatch: one blocking worker invocation per image, bounded by a
//! fixed pool size, with every worker pushing a single tagged report onto a
//! shared unbounded channel that is drained once the batch completes.

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};

use crate::models::{BatchResults, FailureKind, ImageOutcome, ImageReport};
use crate::output::output_paths;
use crate::pipeline::{analyze_image, AnalysisSettings, ImageJob};

/// Build the job list, deriving collision-free output paths for each image.
pub fn plan_jobs(paths: &[PathBuf], settings: &AnalysisSettings) -> Vec<ImageJob> {
    paths
        .iter()
        .enumerate()
        .map(|(index, path)| ImageJob {
            index,
            path: path.clone(),
            outputs: output_paths(&settings.output_dir, index, path, paths.len()),
        })
        .collect()
}

/// Process `paths` on a pool of `workers` and block until every job has
/// finished or failed.
pub fn run_batch(
    paths: &[PathBuf],
    settings: &AnalysisSettings,
    workers: usize,
) -> Result<BatchResults> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let jobs = plan_jobs(paths, settings);
    Ok(runtime.block_on(dispatch(jobs, Arc::new(settings.clone()), workers)))
}

/// Fan `jobs` out to blocking workers and aggregate their reports.
pub async fn dispatch(
    jobs: Vec<ImageJob>,
    settings: Arc<AnalysisSettings>,
    workers: usize,
) -> BatchResults {
    let pool_size = workers.max(1);
    tracing::info!(
        "🚀 Dispatching {} image(s) to {} worker(s)",
        jobs.len(),
        pool_size
    );

    let permits = Arc::new(Semaphore::new(pool_size));
    let (report_tx, report_rx) = mpsc::unbounded_channel::<ImageReport>();
    let mut handles = Vec::with_capacity(jobs.len());

    for job in jobs {
        let permits = Arc::clone(&permits);
        let settings = Arc::clone(&settings);
        let report_tx = report_tx.clone();

        handles.push(tokio::spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                return;
            };

            let index = job.index;
            let path = job.path.clone();
            let report = match tokio::task::spawn_blocking(move || analyze_image(&job, &settings))
                .await
            {
                Ok(report) => report,
                Err(e) => {
                    tracing::error!("❌ Worker for {} panicked: {}", path.display(), e);
                    ImageReport {
                        index,
                        path,
                        outcome: ImageOutcome::Failed {
                            kind: FailureKind::WorkerPanic,
                            reason: e.to_string(),
                        },
                    }
                }
            };

            publish_report(&report_tx, report);
        }));
    }
    drop(report_tx);

    for handle in handles {
        if let Err(e) = handle.await {
            tracing::error!("❌ Dispatch task failed: {}", e);
        }
    }

    drain_reports(report_rx)
}

/// Push one report onto the shared channel; returns whether it was queued.
pub fn publish_report(
    report_tx: &mpsc::UnboundedSender<ImageReport>,
    report: ImageReport,
) -> bool {
    match report_tx.send(report) {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(
                "❌ Result channel closed, dropping report for {}",
                e.0.path.display()
            );
            false
        }
    }
}

/// Drain every queued report and pair them back up by image index.
pub fn drain_reports(mut report_rx: mpsc::UnboundedReceiver<ImageReport>) -> BatchResults {
    let mut reports = Vec::new();
    while let Ok(report) = report_rx.try_recv() {
        reports.push(report);
    }

    let results = BatchResults::from_unordered(reports);
    tracing::debug!(
        "📋 Aggregated {} report(s): {} succeeded, {} failed",
        results.reports.len(),
        results.succeeded().count(),
        results.failed().count()
    );
    results
}
