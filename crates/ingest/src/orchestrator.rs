use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn, Instrument, Level};
use transport::{CatalogApi, FilePayload, MediaType, UploadRequest};

use crate::config::IngestConfig;
use crate::error::IngestError;
use crate::item::{TransferId, TransferItem, TransferStatus};

/// A status change of one transfer item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEvent {
    pub id: TransferId,
    pub status: TransferStatus,
}

/// Receives every transfer transition, synchronously, in order.
pub trait TransferObserver: Send + Sync {
    fn on_transition(&self, event: &TransferEvent);
}

impl TransferObserver for UnboundedSender<TransferEvent> {
    fn on_transition(&self, event: &TransferEvent) {
        // A dropped receiver just means nobody is watching any more.
        let _ = self.send(event.clone());
    }
}

/// A file refused at enqueue time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected {
    pub file_name: String,
    pub error: IngestError,
}

/// Outcome of [`UploadOrchestrator::enqueue`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enqueued {
    pub accepted: Vec<TransferId>,
    pub rejected: Vec<Rejected>,
}

/// Aggregate counts the view layer uses to gate its actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadSummary {
    pub total: usize,
    pub pending: usize,
    pub uploading: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl UploadSummary {
    /// Whether an upload run would have anything to do.
    pub fn can_start(&self) -> bool {
        self.pending > 0 && self.uploading == 0
    }

    /// Every item succeeded; the "done" affordance replaces "upload".
    pub fn is_done(&self) -> bool {
        self.total > 0 && self.succeeded == self.total
    }
}

/// Check a selected file against the acceptance policy.
///
/// Returns the media type the file will be uploaded as.
pub fn admit(config: &IngestConfig, file: &FilePayload) -> Result<MediaType, IngestError> {
    let extension = file
        .extension()
        .ok_or_else(|| IngestError::MissingExtension(file.file_name.clone()))?;
    let media_type =
        config
            .accepted
            .classify(&extension)
            .ok_or_else(|| IngestError::UnsupportedExtension {
                file_name: file.file_name.clone(),
                extension: extension.clone(),
            })?;
    if file.is_empty() {
        return Err(IngestError::EmptyFile(file.file_name.clone()));
    }
    if let Some(limit) = config.max_upload_bytes {
        let size = file.len() as u64;
        if size > limit {
            return Err(IngestError::FileTooLarge {
                file_name: file.file_name.clone(),
                size,
                limit,
            });
        }
    }
    Ok(media_type)
}

/// Owns an ordered batch of transfer items and uploads them one at a time.
///
/// Failures are captured per item; a failed transfer never stops the batch
/// and is never retried automatically.
pub struct UploadOrchestrator {
    api: Arc<dyn CatalogApi>,
    config: IngestConfig,
    items: Vec<TransferItem>,
    observers: Vec<Arc<dyn TransferObserver>>,
}

impl UploadOrchestrator {
    pub fn new(api: Arc<dyn CatalogApi>, config: IngestConfig) -> Self {
        Self {
            api,
            config,
            items: Vec::new(),
            observers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, observer: Arc<dyn TransferObserver>) {
        self.observers.push(observer);
    }

    pub fn unsubscribe_all(&mut self) {
        self.observers.clear();
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Items in selection order.
    pub fn items(&self) -> &[TransferItem] {
        &self.items
    }

    pub fn get(&self, id: TransferId) -> Option<&TransferItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Append the selected files as new `Pending` items.
    ///
    /// Existing items are left untouched and duplicates are not merged: the
    /// same file selected twice becomes two independent items. Files the
    /// acceptance policy refuses are reported back instead of being queued.
    pub fn enqueue<I>(&mut self, files: I) -> Enqueued
    where
        I: IntoIterator<Item = FilePayload>,
    {
        let mut outcome = Enqueued::default();
        for file in files {
            match admit(&self.config, &file) {
                Ok(media_type) => {
                    let item = TransferItem::new(file, media_type);
                    debug!(id = %item.id(), file = item.file_name(), %media_type, "transfer_enqueued");
                    outcome.accepted.push(item.id());
                    self.items.push(item);
                }
                Err(error) => {
                    warn!(file = %file.file_name, %error, "transfer_rejected");
                    outcome.rejected.push(Rejected {
                        file_name: file.file_name,
                        error,
                    });
                }
            }
        }
        outcome
    }

    /// Remove a `Pending` item. Anything else is left in place and `false`
    /// is returned.
    pub fn remove(&mut self, id: TransferId) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        if !self.items[index].status().is_pending() {
            debug!(%id, status = %self.items[index].status(), "transfer_remove_refused");
            return false;
        }
        self.items.remove(index);
        true
    }

    /// Discard every item regardless of status.
    pub fn clear(&mut self) {
        debug!(discarded = self.items.len(), "transfers_cleared");
        self.items.clear();
    }

    pub fn summary(&self) -> UploadSummary {
        let mut summary = UploadSummary {
            total: self.items.len(),
            ..UploadSummary::default()
        };
        for item in &self.items {
            match item.status() {
                TransferStatus::Pending => summary.pending += 1,
                TransferStatus::Uploading => summary.uploading += 1,
                TransferStatus::Succeeded => summary.succeeded += 1,
                TransferStatus::Failed(_) => summary.failed += 1,
            }
        }
        summary
    }

    /// Upload every item that is `Pending` right now, in selection order,
    /// strictly one after another.
    ///
    /// The pending set is captured before the first transfer starts, so the
    /// meaning of "next item" never shifts mid-run. Items that failed in an
    /// earlier run stay `Failed`; use [`run_one`](Self::run_one) to retry one.
    pub async fn run_all(&mut self) -> UploadSummary {
        let batch: Vec<TransferId> = self
            .items
            .iter()
            .filter(|item| item.status().is_pending())
            .map(TransferItem::id)
            .collect();
        if batch.is_empty() {
            return self.summary();
        }

        let span = tracing::span!(Level::INFO, "ingest.run_all", batch = batch.len());
        let start = Instant::now();

        async {
            for id in batch {
                if let Some(index) = self.position(id) {
                    if self.items[index].status().is_pending() {
                        self.transfer(index).await;
                    }
                }
            }

            let summary = self.summary();
            info!(
                succeeded = summary.succeeded,
                failed = summary.failed,
                total = summary.total,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "upload_batch_finished"
            );
            summary
        }
        .instrument(span)
        .await
    }

    /// Run the transfer for one item. Allowed for `Pending` items and, as an
    /// explicit retry, for `Failed` ones.
    pub async fn run_one(&mut self, id: TransferId) -> Result<TransferStatus, IngestError> {
        let index = self.position(id).ok_or(IngestError::UnknownTransfer(id))?;
        match self.items[index].status() {
            TransferStatus::Pending | TransferStatus::Failed(_) => {}
            other => {
                return Err(IngestError::NotRunnable {
                    id,
                    status: other.clone(),
                })
            }
        }
        self.transfer(index).await;
        Ok(self.items[index].status().clone())
    }

    fn position(&self, id: TransferId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    async fn transfer(&mut self, index: usize) {
        let id = self.items[index].id();
        self.transition(index, TransferStatus::Uploading);

        let request = UploadRequest::from(self.items[index].payload().clone());
        let api = Arc::clone(&self.api);
        let start = Instant::now();
        let result = api.upload_asset(request).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(asset) => {
                info!(%id, asset_id = %asset.id, elapsed_ms, "transfer_succeeded");
                self.items[index].succeed(asset);
                self.notify(index);
            }
            Err(err) => {
                warn!(%id, file = self.items[index].file_name(), error = %err, elapsed_ms, "transfer_failed");
                self.transition(index, TransferStatus::Failed(err.to_string()));
            }
        }
    }

    fn transition(&mut self, index: usize, status: TransferStatus) {
        self.items[index].set_status(status);
        self.notify(index);
    }

    fn notify(&self, index: usize) {
        let item = &self.items[index];
        let event = TransferEvent {
            id: item.id(),
            status: item.status().clone(),
        };
        for observer in &self.observers {
            observer.on_transition(&event);
        }
    }
}
