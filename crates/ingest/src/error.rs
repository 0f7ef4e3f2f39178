//! Error types produced by the ingest crate.
//!
//! Two families live here:
//!
//! | Error | When |
//! |-------|------|
//! | [`MissingExtension`](IngestError::MissingExtension) | enqueue: file name has no extension |
//! | [`UnsupportedExtension`](IngestError::UnsupportedExtension) | enqueue: extension outside the accepted set |
//! | [`EmptyFile`](IngestError::EmptyFile) | enqueue: zero bytes |
//! | [`FileTooLarge`](IngestError::FileTooLarge) | enqueue: above `max_upload_bytes` |
//! | [`UnknownTransfer`](IngestError::UnknownTransfer) | `run_one` / lookups with a stale id |
//! | [`NotRunnable`](IngestError::NotRunnable) | `run_one` on an item that already succeeded or is in flight |
//!
//! Transfer failures themselves are never returned as errors; they are
//! recorded on the item as [`TransferStatus::Failed`](crate::TransferStatus::Failed).
use thiserror::Error;

use crate::item::{TransferId, TransferStatus};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IngestError {
    #[error("`{0}` has no file extension")]
    MissingExtension(String),

    #[error("`{file_name}` has unsupported extension `{extension}`")]
    UnsupportedExtension {
        file_name: String,
        extension: String,
    },

    #[error("`{0}` is empty")]
    EmptyFile(String),

    #[error("`{file_name}` is {size} bytes, above the {limit} byte upload limit")]
    FileTooLarge {
        file_name: String,
        size: u64,
        limit: u64,
    },

    #[error("no transfer with id {0}")]
    UnknownTransfer(TransferId),

    #[error("transfer {id} cannot run while {status}")]
    NotRunnable { id: TransferId, status: TransferStatus },
}
