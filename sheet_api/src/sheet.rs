use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{Cell, FlatRow};
use flattener::Table;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
#[error("sheet write failed: {0}")]
pub struct SheetError(pub String);

/// Everything one sync writes: a metadata line, the header row and the data rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetBlock {
    pub metadata: Vec<Cell>,
    pub headers: Vec<String>,
    pub rows: Vec<FlatRow>,
}

impl SheetBlock {
    pub fn new(table: Table, cached_at: Option<&str>, updated_at: DateTime<Utc>) -> Self {
        let mut metadata = vec![Cell::text(format!(
            "Last updated: {}",
            updated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ))];
        if let Some(cached_at) = cached_at {
            metadata.push(Cell::text(format!("Data cached at: {cached_at}")));
        }
        Self {
            metadata,
            headers: table.headers,
            rows: table.rows,
        }
    }

    /// Number of sheet rows the block occupies.
    pub fn height(&self) -> usize {
        self.rows.len() + 2
    }
}

/// Destination for rendered rows. Implementations append below existing content.
#[async_trait]
pub trait SheetWriter: Send + Sync {
    /// Returns the 1-based sheet row where the block starts.
    async fn write_block(&self, block: &SheetBlock) -> Result<usize, SheetError>;
}

/// Grid held in memory, used by the one-shot sync and in tests.
#[derive(Default)]
pub struct MemorySheet {
    grid: Mutex<Vec<Vec<Cell>>>,
}

impl MemorySheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn last_row(&self) -> usize {
        self.grid.lock().await.len()
    }

    pub async fn snapshot(&self) -> Vec<Vec<Cell>> {
        self.grid.lock().await.clone()
    }
}

#[async_trait]
impl SheetWriter for MemorySheet {
    async fn write_block(&self, block: &SheetBlock) -> Result<usize, SheetError> {
        let mut grid = self.grid.lock().await;
        let start = grid.len() + 1;
        grid.reserve(block.height());
        grid.push(block.metadata.clone());
        grid.push(block.headers.iter().cloned().map(Cell::Text).collect());
        grid.extend(block.rows.iter().map(|row| row.cells().to_vec()));
        Ok(start)
    }
}
