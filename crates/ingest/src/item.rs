//! Transfer items: one selected file's upload lifecycle.
//!
//! ```text
//! Pending ──► Uploading ──► Succeeded
//!    ▲            │
//!    │            └──────► Failed ──► (run_one) ──► Uploading
//!    └── enqueue
//! ```
use std::fmt;

use serde::{Deserialize, Serialize};
use transport::{AssetRef, FilePayload, MediaType};
use uuid::Uuid;

/// Client-side identifier assigned at selection time. Unrelated to the
/// asset id the server assigns after a successful upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransferId(Uuid);

impl TransferId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum TransferStatus {
    Pending,
    Uploading,
    Succeeded,
    /// Carries a human-readable error detail.
    Failed(String),
}

impl TransferStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, TransferStatus::Pending)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferStatus::Succeeded | TransferStatus::Failed(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            TransferStatus::Pending => "pending",
            TransferStatus::Uploading => "uploading",
            TransferStatus::Succeeded => "succeeded",
            TransferStatus::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One file moving through the upload lifecycle.
#[derive(Debug, Clone)]
pub struct TransferItem {
    id: TransferId,
    payload: FilePayload,
    media_type: MediaType,
    status: TransferStatus,
    asset: Option<AssetRef>,
}

impl TransferItem {
    pub(crate) fn new(payload: FilePayload, media_type: MediaType) -> Self {
        Self {
            id: TransferId::generate(),
            payload,
            media_type,
            status: TransferStatus::Pending,
            asset: None,
        }
    }

    pub fn id(&self) -> TransferId {
        self.id
    }

    pub fn payload(&self) -> &FilePayload {
        &self.payload
    }

    pub fn file_name(&self) -> &str {
        &self.payload.file_name
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    pub fn status(&self) -> &TransferStatus {
        &self.status
    }

    /// Error detail, present only while the item is `Failed`.
    pub fn error_detail(&self) -> Option<&str> {
        match &self.status {
            TransferStatus::Failed(detail) => Some(detail),
            _ => None,
        }
    }

    /// Asset created by the server, present only after success.
    pub fn asset(&self) -> Option<&AssetRef> {
        self.asset.as_ref()
    }

    pub(crate) fn set_status(&mut self, status: TransferStatus) {
        self.status = status;
    }

    pub(crate) fn succeed(&mut self, asset: AssetRef) {
        self.status = TransferStatus::Succeeded;
        self.asset = Some(asset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_items_are_pending_with_unique_ids() {
        let a = TransferItem::new(FilePayload::new("a.jpg", vec![1]), MediaType::Image);
        let b = TransferItem::new(FilePayload::new("a.jpg", vec![1]), MediaType::Image);
        assert_ne!(a.id(), b.id());
        assert!(a.status().is_pending());
        assert!(a.error_detail().is_none());
        assert!(a.asset().is_none());
    }

    #[test]
    fn error_detail_only_when_failed() {
        let mut item = TransferItem::new(FilePayload::new("a.mp3", vec![1]), MediaType::Audio);
        item.set_status(TransferStatus::Failed("HTTP error 500: boom".into()));
        assert_eq!(item.error_detail(), Some("HTTP error 500: boom"));
        assert!(item.status().is_terminal());

        item.set_status(TransferStatus::Uploading);
        assert!(item.error_detail().is_none());
        assert!(!item.status().is_terminal());
    }

    #[test]
    fn status_serializes_with_error_detail() {
        let failed = TransferStatus::Failed("timeout".into());
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            serde_json::json!({"status": "failed", "error": "timeout"})
        );
        assert_eq!(
            serde_json::to_value(TransferStatus::Pending).unwrap(),
            serde_json::json!({"status": "pending"})
        );
    }
}
