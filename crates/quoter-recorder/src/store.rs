//! Fill persistence stores.
//!
//! The production store writes JSON Lines (.jsonl): each line is a
//! complete JSON object, so an interrupted write corrupts at most one
//! record and the file stays readable.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write as _};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::error::StoreResult;
use quoter_core::FillRecord;

/// Sink for confirmed fills. Appends are best-effort at-most-once: a
/// failed append is logged by the caller and never retried.
pub trait FillStore: Send {
    fn append(&mut self, record: &FillRecord) -> StoreResult<()>;
}

struct ActiveFile {
    writer: BufWriter<File>,
    date: String,
    records_written: usize,
}

/// JSON Lines store with one file per UTC day (`fills_YYYY-MM-DD.jsonl`).
///
/// Files are opened in append mode so restarts never truncate earlier
/// records, and every append is flushed to disk immediately since fills
/// are rare relative to ticks.
pub struct JsonLinesStore {
    base_dir: PathBuf,
    active: Option<ActiveFile>,
}

impl JsonLinesStore {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        if let Err(e) = std::fs::create_dir_all(&base_dir) {
            warn!(?e, dir = %base_dir.display(), "failed to create fill data directory");
        }
        Self {
            base_dir,
            active: None,
        }
    }

    fn close_active(&mut self) {
        if let Some(mut active) = self.active.take() {
            if let Err(e) = active.writer.flush() {
                warn!(?e, "failed to flush fill store on close");
            }
            info!(
                date = %active.date,
                records = active.records_written,
                "closed fill store file"
            );
        }
    }

    fn open_for_date(&mut self, date: &str) -> StoreResult<()> {
        let path = self.base_dir.join(format!("fills_{date}.jsonl"));
        info!(path = %path.display(), "opening fill store file (append mode)");
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        self.active = Some(ActiveFile {
            writer: BufWriter::new(file),
            date: date.to_string(),
            records_written: 0,
        });
        Ok(())
    }
}

impl FillStore for JsonLinesStore {
    fn append(&mut self, record: &FillRecord) -> StoreResult<()> {
        let today = Utc::now().format("%Y-%m-%d").to_string();

        let needs_rotation = self
            .active
            .as_ref()
            .map(|a| a.date != today)
            .unwrap_or(false);
        if needs_rotation {
            self.close_active();
        }
        if self.active.is_none() {
            self.open_for_date(&today)?;
        }

        let active = self.active.as_mut().expect("active file was just opened");
        let json = serde_json::to_string(record)?;
        writeln!(active.writer, "{json}")?;
        active.writer.flush()?;
        active.records_written += 1;

        debug!(date = %today, order_id = %record.order_id, "fill appended");
        Ok(())
    }
}

impl Drop for JsonLinesStore {
    fn drop(&mut self) {
        self.close_active();
    }
}

/// In-memory store with a shared handle for inspection from tests.
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<Vec<FillRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<FillRecord> {
        self.records.lock().clone()
    }
}

impl FillStore for MemoryStore {
    fn append(&mut self, record: &FillRecord) -> StoreResult<()> {
        self.records.lock().push(record.clone());
        Ok(())
    }
}
