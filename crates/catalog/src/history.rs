//! Best-effort interaction history.
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;
use transport::{AssetRef, CatalogApi, HistoryAction, TransportError};

/// Records interactions without ever holding up the action they accompany.
///
/// Each call starts a detached task; its outcome is logged at debug level and
/// otherwise lost. Nothing is retried or queued.
#[derive(Clone)]
pub struct HistoryRecorder {
    api: Arc<dyn CatalogApi>,
}

impl HistoryRecorder {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self { api }
    }

    /// Fire one history record.
    ///
    /// Returns the handle of the detached task, or `None` when no tokio
    /// runtime is available and the event was dropped. Callers are free to
    /// ignore it; dropping the handle does not cancel the task.
    pub fn record(&self, asset_id: impl Into<String>, action: HistoryAction) -> Option<JoinHandle<()>> {
        let asset_id = asset_id.into();
        let Ok(runtime) = Handle::try_current() else {
            debug!(%asset_id, %action, "history_dropped_no_runtime");
            return None;
        };
        let api = Arc::clone(&self.api);
        Some(runtime.spawn(async move {
            match api.record_history(&asset_id, action).await {
                Ok(()) => debug!(%asset_id, %action, "history_recorded"),
                Err(err) => debug!(%asset_id, %action, error = %err, "history_record_failed"),
            }
        }))
    }
}

impl std::fmt::Debug for HistoryRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryRecorder").finish_non_exhaustive()
    }
}

/// Load an asset's detail and record a `view` for it.
///
/// The record is fired only once the detail has loaded and never affects the
/// returned result.
pub async fn open_asset(
    api: &dyn CatalogApi,
    recorder: &HistoryRecorder,
    id: &str,
) -> Result<AssetRef, TransportError> {
    let (asset, _) = open_asset_tracked(api, recorder, id).await?;
    Ok(asset)
}

/// [`open_asset`], also handing back the view record's task so a
/// short-lived caller can wait for it before exiting.
pub async fn open_asset_tracked(
    api: &dyn CatalogApi,
    recorder: &HistoryRecorder,
    id: &str,
) -> Result<(AssetRef, Option<JoinHandle<()>>), TransportError> {
    let asset = api.get_asset(id).await?;
    let pending = recorder.record(asset.id.clone(), HistoryAction::View);
    Ok((asset, pending))
}
