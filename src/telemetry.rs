use crate::PaletteError;
use metrics::{register_counter, register_histogram, Counter, Histogram};
use std::time::Duration;

/// Pipeline counters, recorded through the global `metrics` recorder.
///
/// Handles are no-ops until a recorder is installed, so the library never
/// requires one.
#[derive(Clone)]
pub struct PipelineMetrics {
    pub urls_read: Counter,
    pub images_processed: Counter,
    pub images_skipped: Counter,
    pub fetch_errors: Counter,
    pub decode_errors: Counter,
    pub records_written: Counter,
    pub image_duration: Histogram,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self {
            urls_read: register_counter!("dominant_colors_urls_read_total"),
            images_processed: register_counter!("dominant_colors_images_processed_total"),
            images_skipped: register_counter!("dominant_colors_images_skipped_total"),
            fetch_errors: register_counter!("dominant_colors_fetch_errors_total"),
            decode_errors: register_counter!("dominant_colors_decode_errors_total"),
            records_written: register_counter!("dominant_colors_records_written_total"),
            image_duration: register_histogram!("dominant_colors_image_duration_seconds"),
        }
    }

    /// Fetch-to-ranking time of one decoded image, whether or not it yields a record.
    pub fn record_duration(&self, duration: Duration) {
        self.image_duration.record(duration.as_secs_f64());
    }

    pub fn record_error(&self, error: &PaletteError) {
        match error {
            PaletteError::Fetch { .. } => self.fetch_errors.increment(1),
            PaletteError::Decode(_) => self.decode_errors.increment(1),
            _ => {}
        }
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}
