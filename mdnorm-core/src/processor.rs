use crate::config::{DiscoveryConfig, NormalizerConfig};
use crate::discovery::discover;
use crate::file::{failure_report, FileNormalizer};
use crate::rules::RuleEngine;
use crate::types::{BatchReport, FileReport, WriteMode};
use chrono::Utc;
use crossbeam_channel::unbounded;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

/// Shared flag that stops workers from picking up further files.
/// Files already being processed finish normally.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Runs the file boundary over many files with a bounded worker pool.
/// Files are independent; one file's failure never stops the others.
pub struct BatchProcessor {
    engine: RuleEngine,
    mode: WriteMode,
    workers: usize,
    cancel: CancelHandle,
}

impl BatchProcessor {
    pub fn new(config: &NormalizerConfig, mode: WriteMode) -> Self {
        Self::with_engine(RuleEngine::from_config(config), mode).workers(config.workers)
    }

    pub fn with_engine(engine: RuleEngine, mode: WriteMode) -> Self {
        Self {
            engine,
            mode,
            workers: 0,
            cancel: CancelHandle::default(),
        }
    }

    /// Worker thread count; 0 picks the machine's available parallelism
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Discover Markdown files under `inputs`, then process them
    pub fn process_paths(&self, inputs: &[PathBuf], discovery: &DiscoveryConfig) -> BatchReport {
        let started_at = Utc::now();
        let found = discover(inputs, discovery);
        tracing::debug!("discovered {} files", found.files.len());

        let (mut reports, skipped) = self.run_pool(found.files);
        reports.extend(found.errors.iter().map(|(path, err)| failure_report(path, err)));
        BatchReport::new(self.mode, started_at, reports, skipped)
    }

    pub fn process_files(&self, files: Vec<PathBuf>) -> BatchReport {
        let started_at = Utc::now();
        let (reports, skipped) = self.run_pool(files);
        BatchReport::new(self.mode, started_at, reports, skipped)
    }

    fn effective_workers(&self, jobs: usize) -> usize {
        let wanted = if self.workers == 0 {
            thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
        } else {
            self.workers
        };
        wanted.clamp(1, jobs.max(1))
    }

    /// Returns per-file reports (unordered) and the number of files left
    /// unprocessed because of cancellation.
    fn run_pool(&self, files: Vec<PathBuf>) -> (Vec<FileReport>, usize) {
        if files.is_empty() {
            return (Vec::new(), 0);
        }

        let workers = self.effective_workers(files.len());
        let (job_tx, job_rx) = unbounded::<PathBuf>();
        let (report_tx, report_rx) = unbounded::<FileReport>();
        for file in files {
            // receiver is alive for the whole scope
            let _ = job_tx.send(file);
        }
        drop(job_tx);

        let skipped = AtomicUsize::new(0);
        let normalizer = FileNormalizer::new(&self.engine);

        thread::scope(|scope| {
            for _ in 0..workers {
                let job_rx = job_rx.clone();
                let report_tx = report_tx.clone();
                let normalizer = &normalizer;
                let skipped = &skipped;
                let cancel = &self.cancel;
                let mode = self.mode;
                scope.spawn(move || {
                    for path in job_rx.iter() {
                        if cancel.is_cancelled() {
                            skipped.fetch_add(1, Ordering::Relaxed);
                            continue;
                        }
                        let _ = report_tx.send(normalizer.normalize_file(&path, mode));
                    }
                });
            }
        });
        drop(report_tx);

        let skipped = skipped.into_inner();
        if skipped > 0 {
            tracing::warn!("cancelled with {skipped} files left unprocessed");
        }
        (report_rx.iter().collect(), skipped)
    }
}
