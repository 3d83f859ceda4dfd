use crate::{PaletteError, ResultRecord};
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Appends result records to the output file.
pub struct LineSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl LineSink {
    /// Opens `path` for appending, creating it if absent.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, PaletteError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| PaletteError::file_write(&path, e))?;

        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    /// Writes records verbatim until the queue is closed and drained, then
    /// flushes. Returns the number of records written.
    pub async fn run(mut self, mut results: mpsc::UnboundedReceiver<ResultRecord>) -> Result<usize, PaletteError> {
        let mut written = 0;

        while let Some(record) = results.recv().await {
            self.writer
                .write_all(record.line().as_bytes())
                .await
                .map_err(|e| PaletteError::file_write(&self.path, e))?;
            written += 1;
            debug!("Wrote record for {}", record.url);
        }

        self.writer
            .flush()
            .await
            .map_err(|e| PaletteError::file_write(&self.path, e))?;

        info!("Wrote {} records to {}", written, self.path.display());
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ColorKey;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("dominant-colors-{}-{}", uuid::Uuid::new_v4(), name))
    }

    fn record(url: &str) -> ResultRecord {
        ResultRecord {
            url: url.to_string(),
            colors: vec![ColorKey::new(255, 0, 0), ColorKey::new(0, 255, 0), ColorKey::new(0, 0, 255)],
        }
    }

    #[tokio::test]
    async fn test_appends_to_existing_file() {
        let path = temp_path("output.txt");
        tokio::fs::write(&path, "previous run\n").await.unwrap();

        let sink = LineSink::open(&path).await.unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(record("https://a.example/1.png")).unwrap();
        tx.send(record("https://a.example/2.png")).unwrap();
        drop(tx);

        assert_eq!(sink.run(rx).await.unwrap(), 2);

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(
            content,
            "previous run\n\
             https://a.example/1.png,#FF0000,#00FF00,#0000FF\n\
             https://a.example/2.png,#FF0000,#00FF00,#0000FF\n"
        );

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn test_creates_missing_file() {
        let path = temp_path("fresh.txt");

        let sink = LineSink::open(&path).await.unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        drop(tx);

        assert_eq!(sink.run(rx).await.unwrap(), 0);
        assert!(tokio::fs::metadata(&path).await.is_ok());

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn test_unwritable_path_is_reported() {
        let path = temp_path("no-such-dir").join("output.txt");
        let result = LineSink::open(&path).await;
        assert!(matches!(result, Err(PaletteError::FileWrite { .. })));
    }
}
