use chrono::Utc;
use domain::{normalize_address, AddressError, ChainMode};
use flattener::{flatten, FlattenError, Table};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    services::{FetchError, PortfolioClient},
    sheet::{SheetBlock, SheetError, SheetWriter},
};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Address(#[from] AddressError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("API returned error: {error}")]
    RemoteReported {
        error: String,
        message: Option<String>,
    },
    #[error(transparent)]
    Sheet(#[from] SheetError),
}

impl From<FlattenError> for SyncError {
    fn from(err: FlattenError) -> Self {
        match err {
            FlattenError::InvalidDocument { error, message } => {
                SyncError::RemoteReported { error, message }
            }
        }
    }
}

/// Result of a sync that did not fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SyncOutcome {
    /// The remote had no projects or no renderable rows; nothing was written.
    Empty { address: String, mode: ChainMode },
    Written {
        address: String,
        mode: ChainMode,
        start_row: usize,
        rows: usize,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedPortfolio {
    pub address: String,
    pub mode: ChainMode,
    #[serde(flatten)]
    pub table: Table,
    pub cached_at: Option<String>,
}

#[derive(Clone)]
pub struct SyncService {
    client: PortfolioClient,
}

impl SyncService {
    pub fn new(client: PortfolioClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &PortfolioClient {
        &self.client
    }

    /// Fetches and flattens without writing anywhere. `mode` defaults to the
    /// one implied by the address format.
    pub async fn render(
        &self,
        address: &str,
        mode: Option<ChainMode>,
    ) -> Result<RenderedPortfolio, SyncError> {
        let address = normalize_address(address)?;
        let mode = mode.unwrap_or_else(|| ChainMode::detect(&address));
        let document = self.client.fetch(&address).await?;
        if let Some(error) = document.remote_error() {
            warn!(
                %address,
                %error,
                message = document.message.as_deref().unwrap_or(""),
                "portfolio API reported an error"
            );
        }
        let table = flatten(&document, mode)?;
        info!(
            %address,
            %mode,
            projects = document.project_count(),
            rows = table.rows.len(),
            "portfolio flattened"
        );
        Ok(RenderedPortfolio {
            address,
            mode,
            table,
            cached_at: document.cached_at,
        })
    }

    /// Renders and writes one block. Nothing is written unless every row was
    /// produced, and nothing is written for an empty portfolio.
    pub async fn sync<W>(
        &self,
        address: &str,
        mode: Option<ChainMode>,
        writer: &W,
    ) -> Result<SyncOutcome, SyncError>
    where
        W: SheetWriter + ?Sized,
    {
        let rendered = self.render(address, mode).await?;
        if rendered.table.is_empty() {
            info!(address = %rendered.address, "no portfolio data found; sheet left untouched");
            return Ok(SyncOutcome::Empty {
                address: rendered.address,
                mode: rendered.mode,
            });
        }

        let rows = rendered.table.rows.len();
        let block = SheetBlock::new(rendered.table, rendered.cached_at.as_deref(), Utc::now());
        let start_row = writer.write_block(&block).await?;
        info!(address = %rendered.address, start_row, rows, "rows written to sheet");
        Ok(SyncOutcome::Written {
            address: rendered.address,
            mode: rendered.mode,
            start_row,
            rows,
        })
    }
}
