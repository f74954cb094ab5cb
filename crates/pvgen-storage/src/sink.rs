//! Result logging.
//!
//! Each batch run appends one row per user to a sheet named after the
//! client and row window, so concurrent containers working different
//! windows never contend for the same tab. Failures land on a shared
//! `Failures` sheet.

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;

use pvgen_models::PipelineOutcome;

use crate::error::{StorageError, StorageResult};

/// Sheet name all failure rows are appended to.
pub const FAILURES_SHEET: &str = "Failures";

/// Sheet name for one batch run's results.
pub fn batch_sheet_name(client_name: &str, start_row: u32, end_row: u32) -> String {
    format!("{}_rows_{}_{}", client_name, start_row, end_row)
}

/// Flatten an outcome into the row its sheet expects.
///
/// Success rows: key, video URL, cover image URL, duration.
/// Failure rows: key, failed stage, message.
pub fn outcome_row(outcome: &PipelineOutcome) -> Vec<String> {
    match outcome {
        PipelineOutcome::Success {
            key,
            video_url,
            cover_image_url,
            video_duration,
        } => vec![
            key.clone(),
            video_url.clone(),
            cover_image_url.clone(),
            format!("{:.2}", video_duration),
        ],
        PipelineOutcome::Failure {
            key,
            stage,
            message,
        } => vec![key.clone(), stage.to_string(), message.clone()],
    }
}

/// Destination for per-user result rows.
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Create the sheet if it does not exist.
    async fn ensure_sheet(&self, sheet: &str) -> StorageResult<()>;

    /// Append one row to a sheet.
    async fn append_row(&self, sheet: &str, row: &[String]) -> StorageResult<()>;

    /// Drop every row from a sheet, keeping the sheet itself.
    async fn clear_sheet(&self, sheet: &str) -> StorageResult<()>;
}

/// Sink writing each sheet as a CSV file in a local directory.
///
/// The directory is synced or uploaded out of band; keeping the sink on the
/// local filesystem means a mid-batch crash loses no already-written rows.
pub struct CsvResultSink {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvResultSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn sheet_path(&self, sheet: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", sheet))
    }
}

#[async_trait]
impl ResultSink for CsvResultSink {
    async fn ensure_sheet(&self, sheet: &str) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;
        std::fs::create_dir_all(&self.dir)?;
        let path = self.sheet_path(sheet);
        if !path.exists() {
            std::fs::File::create(&path)?;
        }
        Ok(())
    }

    async fn append_row(&self, sheet: &str, row: &[String]) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;
        std::fs::create_dir_all(&self.dir)?;
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.sheet_path(sheet))?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        writer.write_record(row)?;
        writer.flush()?;
        Ok(())
    }

    async fn clear_sheet(&self, sheet: &str) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;
        std::fs::create_dir_all(&self.dir)?;
        // Truncates an existing file, creates a missing one
        std::fs::File::create(self.sheet_path(sheet))?;
        Ok(())
    }
}

/// In-memory sink for tests.
#[derive(Default)]
pub struct MemorySink {
    rows: Mutex<BTreeMap<String, Vec<Vec<String>>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows appended to a sheet so far.
    pub async fn rows(&self, sheet: &str) -> Vec<Vec<String>> {
        self.rows.lock().await.get(sheet).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl ResultSink for MemorySink {
    async fn ensure_sheet(&self, sheet: &str) -> StorageResult<()> {
        self.rows.lock().await.entry(sheet.to_string()).or_default();
        Ok(())
    }

    async fn append_row(&self, sheet: &str, row: &[String]) -> StorageResult<()> {
        self.rows
            .lock()
            .await
            .entry(sheet.to_string())
            .or_default()
            .push(row.to_vec());
        Ok(())
    }

    async fn clear_sheet(&self, sheet: &str) -> StorageResult<()> {
        self.rows
            .lock()
            .await
            .entry(sheet.to_string())
            .or_default()
            .clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pvgen_models::Stage;

    #[test]
    fn test_batch_sheet_name() {
        assert_eq!(batch_sheet_name("acme", 154, 300), "acme_rows_154_300");
    }

    #[test]
    fn test_outcome_rows() {
        let success = PipelineOutcome::Success {
            key: "911234567890".to_string(),
            video_url: "https://cdn/videos/911234567890.mp4".to_string(),
            cover_image_url: "https://cdn/covers/911234567890.jpg".to_string(),
            video_duration: 21.5,
        };
        assert_eq!(
            outcome_row(&success),
            vec![
                "911234567890",
                "https://cdn/videos/911234567890.mp4",
                "https://cdn/covers/911234567890.jpg",
                "21.50"
            ]
        );

        let failure = PipelineOutcome::Failure {
            key: "911234567890".to_string(),
            stage: Stage::VideoRender,
            message: "ffmpeg exited 1".to_string(),
        };
        let row = outcome_row(&failure);
        assert_eq!(row[1], "video_render");
    }

    #[tokio::test]
    async fn test_csv_sink_appends() {
        let dir = tempfile::tempdir().unwrap();
        let sink = CsvResultSink::new(dir.path());
        sink.ensure_sheet("acme_rows_1_2").await.unwrap();
        sink.append_row(
            "acme_rows_1_2",
            &["k1".to_string(), "url".to_string()],
        )
        .await
        .unwrap();
        sink.append_row(
            "acme_rows_1_2",
            &["k2".to_string(), "url2".to_string()],
        )
        .await
        .unwrap();

        let content = std::fs::read_to_string(dir.path().join("acme_rows_1_2.csv")).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec!["k1,url", "k2,url2"]);
    }

    #[tokio::test]
    async fn test_csv_sink_clear_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let sink = CsvResultSink::new(dir.path());
        sink.append_row("Failures", &["k1".to_string(), "oops".to_string()])
            .await
            .unwrap();
        sink.clear_sheet("Failures").await.unwrap();

        let path = dir.path().join("Failures.csv");
        assert!(path.exists());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[tokio::test]
    async fn test_memory_sink_clear_keeps_other_sheets() {
        let sink = MemorySink::new();
        sink.append_row("a", &["1".to_string()]).await.unwrap();
        sink.append_row("b", &["2".to_string()]).await.unwrap();
        sink.clear_sheet("a").await.unwrap();
        assert!(sink.rows("a").await.is_empty());
        assert_eq!(sink.rows("b").await, vec![vec!["2".to_string()]]);
    }

    #[tokio::test]
    async fn test_memory_sink_isolates_sheets() {
        let sink = MemorySink::new();
        sink.append_row("a", &["1".to_string()]).await.unwrap();
        sink.append_row("b", &["2".to_string()]).await.unwrap();
        assert_eq!(sink.rows("a").await, vec![vec!["1".to_string()]]);
        assert_eq!(sink.rows("b").await, vec![vec!["2".to_string()]]);
        assert!(sink.rows("c").await.is_empty());
    }
}
