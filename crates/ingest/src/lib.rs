//! Upload ingestion
//!
//! This is where user-selected files enter the catalog. A batch of files
//! becomes an ordered list of [`TransferItem`]s, each driven through
//! `Pending → Uploading → Succeeded | Failed` by the [`UploadOrchestrator`].
//!
//! ## What we do here
//!
//! - **Admit files** - extension and size checks against [`IngestConfig`];
//!   refused files never become items and never touch the network
//! - **Sequence transfers** - exactly one upload in flight per orchestrator,
//!   in selection order
//! - **Isolate failures** - a failed upload is recorded on its item and the
//!   batch moves on
//! - **Report progress** - [`TransferObserver`]s see every transition and
//!   [`UploadSummary`] gives the aggregate counts
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use ingest::{IngestConfig, UploadOrchestrator};
//! use transport::{FilePayload, HttpCatalogApi, TransportConfig};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let api = Arc::new(HttpCatalogApi::new(TransportConfig::default())?);
//! let mut uploads = UploadOrchestrator::new(api, IngestConfig::default());
//!
//! let queued = uploads.enqueue([
//!     FilePayload::new("harbor.jpg", std::fs::read("harbor.jpg")?),
//!     FilePayload::new("notes.txt", b"not media".to_vec()),
//! ]);
//! assert_eq!(queued.rejected.len(), 1);
//!
//! let summary = uploads.run_all().await;
//! println!("{}/{} uploaded", summary.succeeded, summary.total);
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod item;
mod orchestrator;

pub use crate::config::{AcceptedExtensions, ConfigError, IngestConfig, DEFAULT_MAX_UPLOAD_BYTES};
pub use crate::error::IngestError;
pub use crate::item::{TransferId, TransferItem, TransferStatus};
pub use crate::orchestrator::{
    admit, Enqueued, Rejected, TransferEvent, TransferObserver, UploadOrchestrator, UploadSummary,
};
