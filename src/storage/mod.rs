use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteConnectOptions, SqlitePool};
use std::{path::Path, str::FromStr};
use uuid::Uuid;

use crate::movement::{DestinationPayload, MoveSource, MoveStore, StoreKind};
use crate::query::{
    FollowupQuery, InteractionQuery, ProspectQuery, RoutedContactQuery, FOLLOWUP_LIST_CAP,
    INTERACTION_LIST_CAP, PROSPECT_LIST_CAP, ROUTED_CONTACT_LIST_CAP,
};

/// Default timeout for individual SQLite queries.
/// Prevents hung queries from blocking the server indefinitely.
const QUERY_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Execute a future with the standard query timeout.
async fn with_timeout<T>(
    fut: impl std::future::Future<Output = Result<T, StoreError>>,
) -> Result<T, StoreError> {
    match tokio::time::timeout(QUERY_TIMEOUT, fut).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(QUERY_TIMEOUT.as_secs())),
    }
}

/// Errors surfaced by the entity stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("referenced prospect not found")]
    MissingProspect,
    #[error("email already registered")]
    DuplicateEmail,
    #[error("database query timed out after {0}s")]
    Timeout(u64),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

// ─── Row types ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    /// Bearer credential for the REST API. Treat as a secret.
    pub api_token: String,
    pub created_at: String,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProspectRow {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub company: String,
    pub title: String,
    pub email: String,
    pub phone: String,
    pub whatsapp: String,
    pub sector: String,
    pub city: String,
    pub province: String,
    pub country: String,
    /// Channel the lead came in through (WEB, REFERRAL, or an originating
    /// store name when the record was moved in).
    pub source_channel: String,
    pub status: String,
    pub priority: String,
    pub notes: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRow {
    pub id: String,
    pub owner_id: String,
    pub prospect_id: String,
    /// Name snapshot taken at creation; survives prospect deletion.
    pub prospect_name: String,
    pub channel: String,
    pub subject: String,
    pub body: String,
    pub occurred_at: String,
    pub duration: Option<String>,
    pub outcome: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowupRow {
    pub id: String,
    pub owner_id: String,
    pub prospect_id: String,
    pub channel: String,
    pub title: String,
    pub description: String,
    pub scheduled_at: String,
    pub priority: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutedContactRow {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub company: String,
    pub email: String,
    pub phone: String,
    /// "manual" for hand-entered contacts, otherwise the originating store name.
    pub origin: String,
    pub bucket: String,
    pub status: String,
    pub notes: String,
    pub prospect_id: Option<String>,
    pub routed_at: String,
}

// ─── Creation payloads ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewProspect {
    pub name: String,
    pub company: String,
    pub title: String,
    pub email: String,
    pub phone: String,
    pub whatsapp: String,
    pub sector: String,
    pub city: String,
    pub province: String,
    pub country: String,
    pub source_channel: String,
    pub status: String,
    pub priority: String,
    pub notes: String,
}

impl Default for NewProspect {
    fn default() -> Self {
        Self {
            name: String::new(),
            company: String::new(),
            title: String::new(),
            email: String::new(),
            phone: String::new(),
            whatsapp: String::new(),
            sector: String::new(),
            city: String::new(),
            province: String::new(),
            country: String::new(),
            source_channel: "WEB".to_string(),
            status: "NEW".to_string(),
            priority: "MEDIUM".to_string(),
            notes: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewInteraction {
    pub prospect_id: String,
    pub channel: String,
    pub subject: String,
    pub body: String,
    pub duration: Option<String>,
    pub outcome: Option<String>,
    /// RFC 3339; defaults to now when absent.
    pub occurred_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewFollowup {
    pub prospect_id: String,
    pub channel: String,
    pub title: String,
    pub description: String,
    pub scheduled_at: String,
    pub priority: String,
    // No status field: followups always start PENDING regardless of input.
}

impl Default for NewFollowup {
    fn default() -> Self {
        Self {
            prospect_id: String::new(),
            channel: "CALL".to_string(),
            title: String::new(),
            description: String::new(),
            scheduled_at: String::new(),
            priority: "MEDIUM".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewRoutedContact {
    pub name: String,
    pub company: String,
    pub email: String,
    pub phone: String,
    pub origin: String,
    pub bucket: String,
    pub notes: String,
    pub prospect_id: Option<String>,
}

impl Default for NewRoutedContact {
    fn default() -> Self {
        Self {
            name: String::new(),
            company: String::new(),
            email: String::new(),
            phone: String::new(),
            origin: "manual".to_string(),
            bucket: String::new(),
            notes: String::new(),
            prospect_id: None,
        }
    }
}

// ─── Update patches ───────────────────────────────────────────────────────────
// None = leave the column unchanged.

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProspectPatch {
    pub name: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub sector: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub country: Option<String>,
    pub source_channel: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FollowupPatch {
    pub channel: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub scheduled_at: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RoutedContactPatch {
    pub name: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub bucket: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
    pub prospect_id: Option<String>,
}

// ─── Storage ──────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    pub async fn new(data_dir: &Path) -> Result<Self, StoreError> {
        Self::new_with_slow_query(data_dir, 0).await
    }

    /// Create storage with slow-query logging enabled.
    ///
    /// `slow_query_ms` is the threshold in milliseconds — queries exceeding it
    /// are logged at WARN level. Set to 0 to disable slow-query logging.
    pub async fn new_with_slow_query(
        data_dir: &Path,
        slow_query_ms: u64,
    ) -> Result<Self, StoreError> {
        tokio::fs::create_dir_all(data_dir)
            .await
            .map_err(|e| StoreError::Db(sqlx::Error::Io(e)))?;
        let db_path = data_dir.join("prospectord.db");
        let mut opts =
            SqliteConnectOptions::from_str(&format!("sqlite://{}?mode=rwc", db_path.display()))?
                .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
                .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
                .create_if_missing(true);

        if slow_query_ms > 0 {
            use sqlx::ConnectOptions as _;
            opts = opts.log_slow_statements(
                log::LevelFilter::Warn,
                std::time::Duration::from_millis(slow_query_ms),
            );
        }

        let pool = SqlitePool::connect_with(opts).await?;
        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    /// Return a clone of the connection pool (cheap — Arc-backed).
    pub fn pool(&self) -> SqlitePool {
        self.pool.clone()
    }

    async fn migrate(pool: &SqlitePool) -> Result<(), StoreError> {
        sqlx::migrate!("src/storage/migrations")
            .run(pool)
            .await
            .map_err(|e| StoreError::Db(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    // ─── Users ────────────────────────────────────────────────────────────────

    /// Create a user and mint its API token (UUID v4, hex without dashes).
    pub async fn create_user(
        &self,
        email: &str,
        name: &str,
        role: &str,
    ) -> Result<UserRow, StoreError> {
        let id = Uuid::new_v4().to_string();
        let token = Uuid::new_v4().to_string().replace('-', "");
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO users (id, email, name, role, api_token, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(email)
        .bind(name)
        .bind(role)
        .bind(&token)
        .bind(&now)
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            if e.as_database_error()
                .map(|d| d.is_unique_violation())
                .unwrap_or(false)
            {
                return Err(StoreError::DuplicateEmail);
            }
            return Err(e.into());
        }

        self.find_user_by_email(email)
            .await?
            .ok_or(StoreError::Db(sqlx::Error::RowNotFound))
    }

    pub async fn find_user_by_token(&self, token: &str) -> Result<Option<UserRow>, StoreError> {
        Ok(sqlx::query_as("SELECT * FROM users WHERE api_token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRow>, StoreError> {
        Ok(sqlx::query_as("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn delete_user_by_email(&self, email: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE email = ?")
            .bind(email)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ─── Prospects ────────────────────────────────────────────────────────────

    pub async fn create_prospect(
        &self,
        owner_id: &str,
        payload: &NewProspect,
    ) -> Result<ProspectRow, StoreError> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO prospects
             (id, owner_id, name, company, title, email, phone, whatsapp, sector,
              city, province, country, source_channel, status, priority, notes,
              created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(owner_id)
        .bind(&payload.name)
        .bind(&payload.company)
        .bind(&payload.title)
        .bind(&payload.email)
        .bind(&payload.phone)
        .bind(&payload.whatsapp)
        .bind(&payload.sector)
        .bind(&payload.city)
        .bind(&payload.province)
        .bind(&payload.country)
        .bind(&payload.source_channel)
        .bind(&payload.status)
        .bind(&payload.priority)
        .bind(&payload.notes)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        self.get_prospect(owner_id, &id)
            .await?
            .ok_or(StoreError::Db(sqlx::Error::RowNotFound))
    }

    pub async fn get_prospect(
        &self,
        owner_id: &str,
        id: &str,
    ) -> Result<Option<ProspectRow>, StoreError> {
        Ok(
            sqlx::query_as("SELECT * FROM prospects WHERE id = ? AND owner_id = ?")
                .bind(id)
                .bind(owner_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    pub async fn list_prospects(
        &self,
        owner_id: &str,
        q: &ProspectQuery,
    ) -> Result<Vec<ProspectRow>, StoreError> {
        let pool = self.pool.clone();
        let owner = owner_id.to_string();
        let mut rows: Vec<ProspectRow> = with_timeout(async {
            Ok(sqlx::query_as(
                "SELECT * FROM prospects WHERE owner_id = ? ORDER BY created_at DESC",
            )
            .bind(&owner)
            .fetch_all(&pool)
            .await?)
        })
        .await?;

        // Filter composition happens in memory (dynamic WHERE support in
        // SQLite is limited without a query builder).
        rows.retain(|r| q.matches(r));
        q.sort(&mut rows);
        rows.truncate(PROSPECT_LIST_CAP);
        Ok(rows)
    }

    pub async fn update_prospect(
        &self,
        owner_id: &str,
        id: &str,
        patch: &ProspectPatch,
    ) -> Result<Option<ProspectRow>, StoreError> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "UPDATE prospects SET
               name = COALESCE(?, name),
               company = COALESCE(?, company),
               title = COALESCE(?, title),
               email = COALESCE(?, email),
               phone = COALESCE(?, phone),
               whatsapp = COALESCE(?, whatsapp),
               sector = COALESCE(?, sector),
               city = COALESCE(?, city),
               province = COALESCE(?, province),
               country = COALESCE(?, country),
               source_channel = COALESCE(?, source_channel),
               status = COALESCE(?, status),
               priority = COALESCE(?, priority),
               notes = COALESCE(?, notes),
               updated_at = ?
             WHERE id = ? AND owner_id = ?",
        )
        .bind(&patch.name)
        .bind(&patch.company)
        .bind(&patch.title)
        .bind(&patch.email)
        .bind(&patch.phone)
        .bind(&patch.whatsapp)
        .bind(&patch.sector)
        .bind(&patch.city)
        .bind(&patch.province)
        .bind(&patch.country)
        .bind(&patch.source_channel)
        .bind(&patch.status)
        .bind(&patch.priority)
        .bind(&patch.notes)
        .bind(&now)
        .bind(id)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_prospect(owner_id, id).await
    }

    pub async fn delete_prospect(&self, owner_id: &str, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM prospects WHERE id = ? AND owner_id = ?")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_prospects(&self, owner_id: &str) -> Result<u64, StoreError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM prospects WHERE owner_id = ?")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0 as u64)
    }

    pub async fn count_won_prospects_since(
        &self,
        owner_id: &str,
        since: &str,
    ) -> Result<u64, StoreError> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM prospects
             WHERE owner_id = ? AND status = 'WON' AND updated_at >= ?",
        )
        .bind(owner_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0 as u64)
    }

    // ─── Interactions ─────────────────────────────────────────────────────────

    /// Create an interaction. The referenced prospect must exist and belong to
    /// the owner; its name is snapshotted onto the interaction.
    pub async fn create_interaction(
        &self,
        owner_id: &str,
        payload: &NewInteraction,
    ) -> Result<InteractionRow, StoreError> {
        let prospect = self
            .get_prospect(owner_id, &payload.prospect_id)
            .await?
            .ok_or(StoreError::MissingProspect)?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let occurred_at = payload.occurred_at.clone().unwrap_or_else(|| now.clone());
        sqlx::query(
            "INSERT INTO interactions
             (id, owner_id, prospect_id, prospect_name, channel, subject, body,
              occurred_at, duration, outcome, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(owner_id)
        .bind(&payload.prospect_id)
        .bind(&prospect.name)
        .bind(&payload.channel)
        .bind(&payload.subject)
        .bind(&payload.body)
        .bind(&occurred_at)
        .bind(&payload.duration)
        .bind(&payload.outcome)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        self.get_interaction(owner_id, &id)
            .await?
            .ok_or(StoreError::Db(sqlx::Error::RowNotFound))
    }

    pub async fn get_interaction(
        &self,
        owner_id: &str,
        id: &str,
    ) -> Result<Option<InteractionRow>, StoreError> {
        Ok(
            sqlx::query_as("SELECT * FROM interactions WHERE id = ? AND owner_id = ?")
                .bind(id)
                .bind(owner_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    pub async fn list_interactions(
        &self,
        owner_id: &str,
        q: &InteractionQuery,
    ) -> Result<Vec<InteractionRow>, StoreError> {
        let pool = self.pool.clone();
        let owner = owner_id.to_string();
        let mut rows: Vec<InteractionRow> = with_timeout(async {
            Ok(sqlx::query_as(
                "SELECT * FROM interactions WHERE owner_id = ? ORDER BY occurred_at DESC",
            )
            .bind(&owner)
            .fetch_all(&pool)
            .await?)
        })
        .await?;

        rows.retain(|r| q.matches(r));
        rows.truncate(INTERACTION_LIST_CAP);
        Ok(rows)
    }

    pub async fn delete_interaction(&self, owner_id: &str, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM interactions WHERE id = ? AND owner_id = ?")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_interactions_since(
        &self,
        owner_id: &str,
        since: &str,
    ) -> Result<u64, StoreError> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM interactions WHERE owner_id = ? AND occurred_at >= ?",
        )
        .bind(owner_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0 as u64)
    }

    // ─── Followups ────────────────────────────────────────────────────────────

    /// Create a followup. Status always starts PENDING; the referenced
    /// prospect must exist and belong to the owner.
    pub async fn create_followup(
        &self,
        owner_id: &str,
        payload: &NewFollowup,
    ) -> Result<FollowupRow, StoreError> {
        self.get_prospect(owner_id, &payload.prospect_id)
            .await?
            .ok_or(StoreError::MissingProspect)?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO followups
             (id, owner_id, prospect_id, channel, title, description, scheduled_at,
              priority, status, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'PENDING', ?, ?)",
        )
        .bind(&id)
        .bind(owner_id)
        .bind(&payload.prospect_id)
        .bind(&payload.channel)
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(&payload.scheduled_at)
        .bind(&payload.priority)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        self.get_followup(owner_id, &id)
            .await?
            .ok_or(StoreError::Db(sqlx::Error::RowNotFound))
    }

    pub async fn get_followup(
        &self,
        owner_id: &str,
        id: &str,
    ) -> Result<Option<FollowupRow>, StoreError> {
        Ok(
            sqlx::query_as("SELECT * FROM followups WHERE id = ? AND owner_id = ?")
                .bind(id)
                .bind(owner_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    pub async fn list_followups(
        &self,
        owner_id: &str,
        q: &FollowupQuery,
    ) -> Result<Vec<FollowupRow>, StoreError> {
        let pool = self.pool.clone();
        let owner = owner_id.to_string();
        let mut rows: Vec<FollowupRow> = with_timeout(async {
            Ok(sqlx::query_as(
                "SELECT * FROM followups WHERE owner_id = ? ORDER BY scheduled_at ASC",
            )
            .bind(&owner)
            .fetch_all(&pool)
            .await?)
        })
        .await?;

        rows.retain(|r| q.matches(r));
        rows.truncate(FOLLOWUP_LIST_CAP);
        Ok(rows)
    }

    pub async fn update_followup(
        &self,
        owner_id: &str,
        id: &str,
        patch: &FollowupPatch,
    ) -> Result<Option<FollowupRow>, StoreError> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "UPDATE followups SET
               channel = COALESCE(?, channel),
               title = COALESCE(?, title),
               description = COALESCE(?, description),
               scheduled_at = COALESCE(?, scheduled_at),
               priority = COALESCE(?, priority),
               status = COALESCE(?, status),
               updated_at = ?
             WHERE id = ? AND owner_id = ?",
        )
        .bind(&patch.channel)
        .bind(&patch.title)
        .bind(&patch.description)
        .bind(&patch.scheduled_at)
        .bind(&patch.priority)
        .bind(&patch.status)
        .bind(&now)
        .bind(id)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_followup(owner_id, id).await
    }

    pub async fn delete_followup(&self, owner_id: &str, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM followups WHERE id = ? AND owner_id = ?")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_pending_followups_between(
        &self,
        owner_id: &str,
        start: &str,
        end: &str,
    ) -> Result<u64, StoreError> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM followups
             WHERE owner_id = ? AND status = 'PENDING' AND scheduled_at >= ? AND scheduled_at < ?",
        )
        .bind(owner_id)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0 as u64)
    }

    // ─── Routed contacts ──────────────────────────────────────────────────────

    pub async fn create_routed_contact(
        &self,
        owner_id: &str,
        payload: &NewRoutedContact,
    ) -> Result<RoutedContactRow, StoreError> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO routed_contacts
             (id, owner_id, name, company, email, phone, origin, bucket, status,
              notes, prospect_id, routed_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'PENDING', ?, ?, ?)",
        )
        .bind(&id)
        .bind(owner_id)
        .bind(&payload.name)
        .bind(&payload.company)
        .bind(&payload.email)
        .bind(&payload.phone)
        .bind(&payload.origin)
        .bind(&payload.bucket)
        .bind(&payload.notes)
        .bind(&payload.prospect_id)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        self.get_routed_contact(owner_id, &id)
            .await?
            .ok_or(StoreError::Db(sqlx::Error::RowNotFound))
    }

    pub async fn get_routed_contact(
        &self,
        owner_id: &str,
        id: &str,
    ) -> Result<Option<RoutedContactRow>, StoreError> {
        Ok(
            sqlx::query_as("SELECT * FROM routed_contacts WHERE id = ? AND owner_id = ?")
                .bind(id)
                .bind(owner_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    pub async fn list_routed_contacts(
        &self,
        owner_id: &str,
        q: &RoutedContactQuery,
    ) -> Result<Vec<RoutedContactRow>, StoreError> {
        let pool = self.pool.clone();
        let owner = owner_id.to_string();
        let mut rows: Vec<RoutedContactRow> = with_timeout(async {
            Ok(sqlx::query_as(
                "SELECT * FROM routed_contacts WHERE owner_id = ? ORDER BY routed_at DESC",
            )
            .bind(&owner)
            .fetch_all(&pool)
            .await?)
        })
        .await?;

        rows.retain(|r| q.matches(r));
        rows.truncate(ROUTED_CONTACT_LIST_CAP);
        Ok(rows)
    }

    pub async fn update_routed_contact(
        &self,
        owner_id: &str,
        id: &str,
        patch: &RoutedContactPatch,
    ) -> Result<Option<RoutedContactRow>, StoreError> {
        let result = sqlx::query(
            "UPDATE routed_contacts SET
               name = COALESCE(?, name),
               company = COALESCE(?, company),
               email = COALESCE(?, email),
               phone = COALESCE(?, phone),
               bucket = COALESCE(?, bucket),
               status = COALESCE(?, status),
               notes = COALESCE(?, notes),
               prospect_id = COALESCE(?, prospect_id)
             WHERE id = ? AND owner_id = ?",
        )
        .bind(&patch.name)
        .bind(&patch.company)
        .bind(&patch.email)
        .bind(&patch.phone)
        .bind(&patch.bucket)
        .bind(&patch.status)
        .bind(&patch.notes)
        .bind(&patch.prospect_id)
        .bind(id)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_routed_contact(owner_id, id).await
    }

    pub async fn delete_routed_contact(
        &self,
        owner_id: &str,
        id: &str,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM routed_contacts WHERE id = ? AND owner_id = ?")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ─── MoveStore ────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MoveStore for Storage {
    async fn load_source(
        &self,
        owner_id: &str,
        kind: StoreKind,
        id: &str,
    ) -> Result<Option<MoveSource>, StoreError> {
        let source = match kind {
            StoreKind::Prospect => self.get_prospect(owner_id, id).await?.map(|r| MoveSource {
                kind,
                id: r.id.clone(),
                name: r.name,
                company: r.company,
                email: r.email,
                phone: r.phone,
                prospect_id: Some(r.id),
                context: r.sector,
            }),
            StoreKind::Interaction => {
                self.get_interaction(owner_id, id).await?.map(|r| MoveSource {
                    kind,
                    id: r.id,
                    name: r.prospect_name,
                    company: String::new(),
                    email: String::new(),
                    phone: String::new(),
                    prospect_id: Some(r.prospect_id),
                    context: r.subject,
                })
            }
            StoreKind::Followup => self.get_followup(owner_id, id).await?.map(|r| MoveSource {
                kind,
                id: r.id,
                name: r.title.clone(),
                company: String::new(),
                email: String::new(),
                phone: String::new(),
                prospect_id: Some(r.prospect_id),
                context: r.title,
            }),
            StoreKind::RoutedContact => {
                self.get_routed_contact(owner_id, id)
                    .await?
                    .map(|r| MoveSource {
                        kind,
                        id: r.id,
                        name: r.name,
                        company: r.company,
                        email: r.email,
                        phone: r.phone,
                        prospect_id: r.prospect_id,
                        context: r.bucket,
                    })
            }
        };
        Ok(source)
    }

    async fn create_destination(
        &self,
        owner_id: &str,
        payload: &DestinationPayload,
    ) -> Result<String, StoreError> {
        match payload {
            DestinationPayload::Prospect(p) => Ok(self.create_prospect(owner_id, p).await?.id),
            DestinationPayload::Interaction(p) => {
                Ok(self.create_interaction(owner_id, p).await?.id)
            }
            DestinationPayload::Followup(p) => Ok(self.create_followup(owner_id, p).await?.id),
            DestinationPayload::RoutedContact(p) => {
                Ok(self.create_routed_contact(owner_id, p).await?.id)
            }
        }
    }

    async fn delete_record(
        &self,
        owner_id: &str,
        kind: StoreKind,
        id: &str,
    ) -> Result<bool, StoreError> {
        match kind {
            StoreKind::Prospect => self.delete_prospect(owner_id, id).await,
            StoreKind::Interaction => self.delete_interaction(owner_id, id).await,
            StoreKind::Followup => self.delete_followup(owner_id, id).await,
            StoreKind::RoutedContact => self.delete_routed_contact(owner_id, id).await,
        }
    }
}
