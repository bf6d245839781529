// movement — the record-movement protocol shared by all four entity stores.
//
// A "move" transplants a record into another collection: build a
// destination-shaped payload, create it at the destination, then delete the
// source. The two steps are not wrapped in a transaction; a failed second
// step is reported as a partial outcome, never rolled back.

pub mod coordinator;
pub mod mapper;

use serde::{Deserialize, Serialize};

use crate::storage::StoreError;

pub use coordinator::{MoveReport, MoveStore, MovementCoordinator};
pub use mapper::{build_payload, DestinationPayload, MoveSource};

/// The four collections a record can live in. A record belongs to exactly
/// one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreKind {
    #[serde(rename = "prospects")]
    Prospect,
    #[serde(rename = "interactions")]
    Interaction,
    #[serde(rename = "followups")]
    Followup,
    #[serde(rename = "routed-contacts")]
    RoutedContact,
}

impl StoreKind {
    /// Collection name, used as the origin tag on moved-in records.
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Prospect => "prospects",
            StoreKind::Interaction => "interactions",
            StoreKind::Followup => "followups",
            StoreKind::RoutedContact => "routed-contacts",
        }
    }
}

impl std::fmt::Display for StoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The five fixed sector buckets of the routing board.
pub const SECTOR_BUCKETS: [&str; 5] = ["clinics", "real-estate", "automotive", "enterprise", "other"];

/// Channels a logged interaction can use.
pub const INTERACTION_CHANNELS: [&str; 4] = ["CALL", "EMAIL", "WHATSAPP", "LINKEDIN"];

/// Channel/task types a followup can be scheduled as.
pub const FOLLOWUP_CHANNELS: [&str; 5] = ["CALL", "EMAIL", "WHATSAPP", "MEETING", "TASK"];

pub fn is_valid_bucket(bucket: &str) -> bool {
    SECTOR_BUCKETS.contains(&bucket)
}

/// Errors that abort a move before or during the destination create.
/// A failed source delete is NOT an error — it is a partial [`MoveReport`].
#[derive(Debug, thiserror::Error)]
pub enum MoveError {
    #[error("invalid destination")]
    InvalidDestination,
    #[error("missing type")]
    MissingType,
    #[error("invalid type: {0}")]
    InvalidType(String),
    #[error("source record not found")]
    SourceNotFound,
    #[error("failed to load source: {0}")]
    SourceLoadFailed(#[source] StoreError),
    #[error("create at destination failed: {0}")]
    CreateFailed(#[source] StoreError),
}
