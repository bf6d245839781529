// movement/coordinator.rs — two-phase move execution.

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::storage::StoreError;

use super::{build_payload, DestinationPayload, MoveError, MoveSource, StoreKind};

/// Store operations the coordinator needs. Implemented by the SQLite
/// [`crate::storage::Storage`]; tests substitute doubles to inject failures.
#[async_trait]
pub trait MoveStore: Send + Sync {
    async fn load_source(
        &self,
        owner_id: &str,
        kind: StoreKind,
        id: &str,
    ) -> Result<Option<MoveSource>, StoreError>;

    async fn create_destination(
        &self,
        owner_id: &str,
        payload: &DestinationPayload,
    ) -> Result<String, StoreError>;

    async fn delete_record(
        &self,
        owner_id: &str,
        kind: StoreKind,
        id: &str,
    ) -> Result<bool, StoreError>;
}

/// Outcome of a move whose destination create succeeded.
///
/// `partial` marks the case where the source delete failed afterwards: the
/// destination record exists AND the source record still exists. Nothing
/// cleans that up automatically; callers must surface it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveReport {
    pub destination_kind: StoreKind,
    pub destination_id: String,
    pub partial: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Executes moves as a create-then-delete sequence over a [`MoveStore`].
///
/// There is no cross-store transaction and no idempotency key: two
/// concurrent moves of the same source can both create at the destination
/// before either delete lands. That duplicate is tolerated, not hidden.
#[derive(Clone)]
pub struct MovementCoordinator<S> {
    store: S,
}

impl<S: MoveStore> MovementCoordinator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Move one record into another collection.
    ///
    /// Phase 1 (payload build + destination create) aborts on any failure
    /// with the source untouched. Phase 2 (source delete) failure yields a
    /// partial [`MoveReport`], never an error and never a rollback.
    pub async fn move_record(
        &self,
        owner_id: &str,
        source_kind: StoreKind,
        source_id: &str,
        destination_kind: StoreKind,
        sub_type: Option<&str>,
        note: Option<&str>,
    ) -> Result<MoveReport, MoveError> {
        let source = self
            .store
            .load_source(owner_id, source_kind, source_id)
            .await
            .map_err(MoveError::SourceLoadFailed)?
            .ok_or(MoveError::SourceNotFound)?;

        let payload = build_payload(&source, destination_kind, sub_type, note, Utc::now())?;

        let destination_id = self
            .store
            .create_destination(owner_id, &payload)
            .await
            .map_err(MoveError::CreateFailed)?;

        match self.store.delete_record(owner_id, source_kind, source_id).await {
            Ok(true) => {
                info!(
                    source = %source_kind,
                    destination = %destination_kind,
                    source_id,
                    destination_id = %destination_id,
                    "record moved"
                );
                Ok(MoveReport {
                    destination_kind,
                    destination_id,
                    partial: false,
                    detail: None,
                })
            }
            Ok(false) => {
                warn!(
                    source = %source_kind,
                    source_id,
                    destination_id = %destination_id,
                    "move left a duplicate: source record was already gone or not removed"
                );
                Ok(MoveReport {
                    destination_kind,
                    destination_id,
                    partial: true,
                    detail: Some("created at destination but source record was not removed".to_string()),
                })
            }
            Err(e) => {
                warn!(
                    source = %source_kind,
                    source_id,
                    destination_id = %destination_id,
                    err = %e,
                    "move left a duplicate: source delete failed"
                );
                Ok(MoveReport {
                    destination_kind,
                    destination_id,
                    partial: true,
                    detail: Some(format!(
                        "created at destination but source delete failed: {e}"
                    )),
                })
            }
        }
    }
}
