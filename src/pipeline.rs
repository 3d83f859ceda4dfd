//! Orchestration of the fetch → rank → write pipeline
//!
//! The input file and output file are both opened before any task starts, so
//! setup failures come back as errors instead of an empty run. After that the
//! source, the sink and every worker run concurrently:
//!
//! 1. `LineSource` publishes URLs and drops its sender at end of input.
//! 2. Workers drain the input queue and push records to the output queue.
//! 3. Once every worker has returned, the last output sender is gone and
//!    `LineSink` flushes and finishes.
//!
//! [`Pipeline::run_until`] adds a shutdown future. When it completes the
//! workers stop taking new URLs, finish the image in hand, and the sink still
//! flushes everything produced so far.

use crate::{
    Config, Fetcher, HttpFetcher, LineSink, LineSource, PaletteError, PipelineMetrics,
    PoolSummary, WorkerPool,
};
use std::future::{self, Future};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

pub struct Pipeline {
    config: Config,
    fetcher: Arc<dyn Fetcher>,
    metrics: PipelineMetrics,
}

impl Pipeline {
    pub fn new(config: Config, fetcher: Arc<dyn Fetcher>) -> Result<Self, PaletteError> {
        config.validate()?;

        Ok(Self {
            config,
            fetcher,
            metrics: PipelineMetrics::new(),
        })
    }

    /// Pipeline backed by a reqwest client built from `config`.
    pub fn with_http(config: Config) -> Result<Self, PaletteError> {
        let fetcher = HttpFetcher::new(&config)?;
        Self::new(config, Arc::new(fetcher))
    }

    /// Processes the whole input file.
    pub async fn run(&self) -> Result<PipelineSummary, PaletteError> {
        self.run_until(future::pending()).await
    }

    /// Like [`Pipeline::run`], but stops early once `shutdown` completes.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<PipelineSummary, PaletteError>
    where
        F: Future<Output = ()>,
    {
        let source = LineSource::open(&self.config.input_path).await?;
        let sink = LineSink::open(&self.config.output_path).await?;
        let pool = WorkerPool::new(&self.config, self.fetcher.clone(), self.metrics.clone())?;

        info!(
            "Processing {} with {} workers, appending to {}",
            self.config.input_path.display(),
            pool.size(),
            self.config.output_path.display()
        );

        let (url_tx, url_rx) = mpsc::unbounded_channel();
        let (result_tx, result_rx) = mpsc::unbounded_channel();

        let source_handle = tokio::spawn(source.run(url_tx));
        let sink_handle = tokio::spawn(sink.run(result_rx));

        let (stop_tx, stop_rx) = watch::channel(false);

        let pool_run = pool.run(url_rx, result_tx, stop_rx);
        tokio::pin!(pool_run);

        let mut interrupted = false;
        let pool_result = tokio::select! {
            result = &mut pool_run => result,
            _ = shutdown => {
                warn!("Shutdown requested, finishing images in progress");
                interrupted = true;
                let _ = stop_tx.send(true);
                pool_run.await
            }
        };
        let sink_result = sink_handle.await?;
        let source_result = source_handle.await?;

        let records_written = sink_result?;
        let urls_read = source_result?;
        let pool_summary = pool_result?;

        self.metrics.urls_read.increment(urls_read as u64);
        self.metrics.records_written.increment(records_written as u64);

        let summary = PipelineSummary {
            urls_read,
            records_written,
            pool: pool_summary,
            interrupted,
        };
        info!(
            "Finished: {} URLs read, {} records written, {} failed, {} skipped",
            summary.urls_read, summary.records_written, summary.pool.total_errors, summary.pool.total_skipped
        );

        Ok(summary)
    }
}

#[derive(Debug, Clone)]
pub struct PipelineSummary {
    pub urls_read: usize,
    pub records_written: usize,
    pub pool: PoolSummary,
    /// The run was cut short by the shutdown future
    pub interrupted: bool,
}
