use crate::PaletteError;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Streams the URLs of an input file onto the work queue.
pub struct LineSource {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
}

impl LineSource {
    /// Opens the input file. A missing or unreadable file is reported here,
    /// before any work starts.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, PaletteError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)
            .await
            .map_err(|e| PaletteError::file_open(&path, e))?;

        Ok(Self {
            path,
            lines: BufReader::new(file).lines(),
        })
    }

    /// Publishes every non-blank line, then closes the queue by dropping
    /// `urls`. Returns the number of lines published.
    pub async fn run(mut self, urls: mpsc::UnboundedSender<String>) -> Result<usize, PaletteError> {
        let mut published = 0;

        while let Some(line) = self
            .lines
            .next_line()
            .await
            .map_err(|e| PaletteError::file_open(&self.path, e))?
        {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if urls.send(line.to_string()).is_err() {
                warn!("Work queue closed after {} URLs; stopping input", published);
                break;
            }
            published += 1;
        }

        info!("Loaded {} URLs from {}", published, self.path.display());
        Ok(published)
    }
}
