//! Postgres-backed profile store.
//!
//! Profiles are kept as JSONB documents keyed by identity id, mirroring the
//! hosted document database. Validation stays in [`ProfileStore::load`].
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `AlreadyExists` |
//! | anything else | any | `Unavailable` |

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tracing::instrument;

use bizdesk_auth::{ProfileStore, StoreError};
use bizdesk_core::IdentityId;

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS profiles (
    id         TEXT PRIMARY KEY,
    document   JSONB NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

#[derive(Debug, Clone)]
pub struct PostgresProfileStore {
    pool: Arc<PgPool>,
}

impl PostgresProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create the `profiles` table if it does not exist.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE)
            .execute(&*self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}

fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some("23505") {
            return StoreError::AlreadyExists;
        }
    }
    StoreError::Unavailable(err.to_string())
}

#[async_trait]
impl ProfileStore for PostgresProfileStore {
    #[instrument(skip(self), fields(identity_id = %id))]
    async fn get(&self, id: &IdentityId) -> Result<Option<serde_json::Value>, StoreError> {
        let row = sqlx::query("SELECT document FROM profiles WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&*self.pool)
            .await
            .map_err(map_sqlx_error)?;

        match row {
            Some(row) => {
                let Json(document) = row
                    .try_get::<Json<serde_json::Value>, _>("document")
                    .map_err(map_sqlx_error)?;
                Ok(Some(document))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self, document), fields(identity_id = %id))]
    async fn put(&self, id: &IdentityId, document: serde_json::Value) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO profiles (id, document, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (id) DO UPDATE SET document = EXCLUDED.document, updated_at = now()
            "#,
        )
        .bind(id.as_str())
        .bind(Json(document))
        .execute(&*self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    #[instrument(skip(self, document), fields(identity_id = %id))]
    async fn create(&self, id: &IdentityId, document: serde_json::Value) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO profiles (id, document) VALUES ($1, $2)")
            .bind(id.as_str())
            .bind(Json(document))
            .execute(&*self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}
