use crate::{
    decode_image, validate_url, Config, Fetcher, Histogram, PaletteError, PipelineMetrics,
    ResultRecord, ShortfallPolicy,
};
use futures::future::join_all;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, watch, Mutex};
use tracing::{debug, error, info, warn};

/// Turns one URL at a time into a [`ResultRecord`].
#[derive(Clone)]
pub struct ImageFetchWorker {
    id: usize,
    fetcher: Arc<dyn Fetcher>,
    top_k: usize,
    shortfall_policy: ShortfallPolicy,
    metrics: PipelineMetrics,
    is_running: Arc<AtomicBool>,
    processed_count: Arc<AtomicUsize>,
    skipped_count: Arc<AtomicUsize>,
    error_count: Arc<AtomicUsize>,
}

impl ImageFetchWorker {
    pub fn new(id: usize, fetcher: Arc<dyn Fetcher>, config: &Config, metrics: PipelineMetrics) -> Self {
        Self {
            id,
            fetcher,
            top_k: config.top_k,
            shortfall_policy: config.shortfall_policy,
            metrics,
            is_running: Arc::new(AtomicBool::new(false)),
            processed_count: Arc::new(AtomicUsize::new(0)),
            skipped_count: Arc::new(AtomicUsize::new(0)),
            error_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Fetches, decodes and ranks one image.
    ///
    /// Failures are logged and yield `None`; they never stop the worker.
    pub async fn process(&self, url: &str) -> Option<ResultRecord> {
        match self.try_process(url).await {
            Ok(Some(record)) => {
                self.processed_count.fetch_add(1, Ordering::Relaxed);
                self.metrics.images_processed.increment(1);
                debug!("Worker {} processed {}", self.id, url);
                Some(record)
            }
            Ok(None) => {
                self.skipped_count.fetch_add(1, Ordering::Relaxed);
                self.metrics.images_skipped.increment(1);
                None
            }
            Err(e) => {
                self.error_count.fetch_add(1, Ordering::Relaxed);
                self.metrics.record_error(&e);
                if e.is_per_url() {
                    warn!("Worker {} skipping {}: {}", self.id, url, e);
                } else {
                    error!("Worker {} failed on {}: {}", self.id, url, e);
                }
                None
            }
        }
    }

    async fn try_process(&self, url: &str) -> Result<Option<ResultRecord>, PaletteError> {
        validate_url(url)?;

        let start = Instant::now();
        let bytes = self.fetcher.fetch(url).await?;

        // Decoding and counting are CPU-bound; keep them off the async workers.
        let top_k = self.top_k;
        let (ranking, distinct) = tokio::task::spawn_blocking(move || {
            let image = decode_image(&bytes)?;
            let histogram = Histogram::from_image(&image);
            Ok::<_, PaletteError>((histogram.top(top_k), histogram.distinct_colors()))
        })
        .await??;

        self.metrics.record_duration(start.elapsed());

        let record = ResultRecord::from_ranking(url, &ranking, top_k, self.shortfall_policy);
        if record.is_none() {
            warn!(
                "Worker {} skipping {}: only {} distinct colors, {} required",
                self.id, url, distinct, top_k
            );
        } else if distinct < top_k {
            debug!(
                "Worker {} padded {}: only {} distinct colors",
                self.id, url, distinct
            );
        }

        Ok(record)
    }

    /// Pulls URLs from the shared queue until it is closed and drained, or
    /// until `shutdown` turns true. An image already in progress is finished.
    pub async fn run_with_shared_receiver(
        &self,
        urls: Arc<Mutex<mpsc::UnboundedReceiver<String>>>,
        results: mpsc::UnboundedSender<ResultRecord>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        debug!("Starting image worker {}", self.id);
        self.is_running.store(true, Ordering::Relaxed);

        loop {
            let url = {
                let mut receiver = urls.lock().await;
                tokio::select! {
                    biased;
                    _ = shutdown.wait_for(|stop| *stop) => None,
                    url = receiver.recv() => url,
                }
            };

            let Some(url) = url else { break };

            if let Some(record) = self.process(&url).await {
                if let Err(e) = results.send(record) {
                    error!("Worker {} failed to send result: {}", self.id, e);
                    break;
                }
            }
        }

        self.is_running.store(false, Ordering::Relaxed);
        debug!("Image worker {} stopped", self.id);
    }

    pub fn get_stats(&self) -> WorkerStats {
        WorkerStats {
            id: self.id,
            is_running: self.is_running(),
            processed_count: self.processed_count.load(Ordering::Relaxed),
            skipped_count: self.skipped_count.load(Ordering::Relaxed),
            error_count: self.error_count.load(Ordering::Relaxed),
        }
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone)]
pub struct WorkerStats {
    pub id: usize,
    pub is_running: bool,
    pub processed_count: usize,
    pub skipped_count: usize,
    pub error_count: usize,
}

/// Fixed set of workers sharing one input queue and one output queue.
pub struct WorkerPool {
    workers: Vec<ImageFetchWorker>,
}

impl WorkerPool {
    pub fn new(
        config: &Config,
        fetcher: Arc<dyn Fetcher>,
        metrics: PipelineMetrics,
    ) -> Result<Self, PaletteError> {
        if config.concurrency == 0 {
            return Err(PaletteError::Configuration(
                "Worker pool needs at least one worker".to_string(),
            ));
        }

        let workers = (0..config.concurrency)
            .map(|id| ImageFetchWorker::new(id, fetcher.clone(), config, metrics.clone()))
            .collect();

        Ok(Self { workers })
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Runs every worker to completion.
    ///
    /// Returns once all workers have drained `urls`, or have stopped after
    /// `shutdown` turned true. The pool's copies of `results` are dropped by
    /// then, so the output queue closes as soon as the caller drops any sender
    /// it kept.
    pub async fn run(
        &self,
        urls: mpsc::UnboundedReceiver<String>,
        results: mpsc::UnboundedSender<ResultRecord>,
        shutdown: watch::Receiver<bool>,
    ) -> Result<PoolSummary, PaletteError> {
        info!("Starting {} image workers", self.workers.len());

        let shared_receiver = Arc::new(Mutex::new(urls));

        let handles: Vec<_> = self
            .workers
            .iter()
            .map(|worker| {
                let worker = worker.clone();
                let rx = shared_receiver.clone();
                let tx = results.clone();
                let stop = shutdown.clone();

                tokio::spawn(async move {
                    worker.run_with_shared_receiver(rx, tx, stop).await;
                })
            })
            .collect();
        drop(results);

        for outcome in join_all(handles).await {
            outcome?;
        }

        let summary = self.summary();
        info!(
            "All workers finished. Processed: {}, Skipped: {}, Errors: {}",
            summary.total_processed, summary.total_skipped, summary.total_errors
        );
        Ok(summary)
    }

    pub fn summary(&self) -> PoolSummary {
        let worker_stats: Vec<WorkerStats> = self.workers.iter().map(|w| w.get_stats()).collect();

        PoolSummary {
            total_processed: worker_stats.iter().map(|s| s.processed_count).sum(),
            total_skipped: worker_stats.iter().map(|s| s.skipped_count).sum(),
            total_errors: worker_stats.iter().map(|s| s.error_count).sum(),
            worker_stats,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PoolSummary {
    pub worker_stats: Vec<WorkerStats>,
    pub total_processed: usize,
    pub total_skipped: usize,
    pub total_errors: usize,
}
