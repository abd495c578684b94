//! Refresh session storage.
//!
//! Only refresh tokens are persisted; access tokens are stateless and
//! short-lived. Revocation marks the row instead of deleting it so revoked
//! sessions stay visible for audit. A session authorizes a refresh iff
//! `revoked_at IS NULL AND expires_at > now`.

use sqlx::sqlite::SqlitePool;

/// A refresh session record.
#[derive(Debug, Clone)]
pub struct RefreshSession {
    pub token: String,
    pub user_id: String,
    pub created_at: String,
    pub updated_at: String,
    pub expires_at: String,
    pub revoked_at: Option<String>,
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    token: String,
    user_id: String,
    created_at: String,
    updated_at: String,
    expires_at: String,
    revoked_at: Option<String>,
}

impl From<SessionRow> for RefreshSession {
    fn from(row: SessionRow) -> Self {
        Self {
            token: row.token,
            user_id: row.user_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            expires_at: row.expires_at,
            revoked_at: row.revoked_at,
        }
    }
}

impl RefreshSession {
    /// Whether this session has been explicitly revoked.
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }
}

#[derive(Clone)]
pub struct SessionStore {
    pool: SqlitePool,
}

impl SessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a new refresh session expiring `ttl_secs` from now.
    /// A negative ttl creates an already-expired row (used by tests).
    pub async fn create(
        &self,
        token: &str,
        user_id: &str,
        ttl_secs: i64,
    ) -> Result<RefreshSession, sqlx::Error> {
        sqlx::query(
            "INSERT INTO refresh_tokens (token, user_id, expires_at)
             VALUES (?, ?, datetime('now', ? || ' seconds'))",
        )
        .bind(token)
        .bind(user_id)
        .bind(ttl_secs)
        .execute(&self.pool)
        .await?;

        let row: SessionRow = sqlx::query_as(
            "SELECT token, user_id, created_at, updated_at, expires_at, revoked_at
             FROM refresh_tokens WHERE token = ?",
        )
        .bind(token)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    /// Look up a session by token value, regardless of validity.
    pub async fn get(&self, token: &str) -> Result<Option<RefreshSession>, sqlx::Error> {
        let row: Option<SessionRow> = sqlx::query_as(
            "SELECT token, user_id, created_at, updated_at, expires_at, revoked_at
             FROM refresh_tokens WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(RefreshSession::from))
    }

    /// Mark a session revoked. Idempotent: revoking an unknown or
    /// already-revoked token is not an error.
    pub async fn revoke(&self, token: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE refresh_tokens
             SET revoked_at = datetime('now'), updated_at = datetime('now')
             WHERE token = ? AND revoked_at IS NULL",
        )
        .bind(token)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Purge sessions past their expiry. Revoked-but-unexpired rows are
    /// kept for audit.
    pub async fn delete_expired(&self) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at < datetime('now')")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use crate::db::{Database, UserRole};

    async fn db_with_user() -> (Database, String) {
        let db = Database::open(":memory:").await.unwrap();
        let user = db
            .users()
            .create("a@b.com", "hash", "", "", UserRole::User)
            .await
            .unwrap();
        (db, user.id)
    }

    #[tokio::test]
    async fn test_create_and_get_session() {
        let (db, user_id) = db_with_user().await;

        let session = db
            .sessions()
            .create("token-1", &user_id, 3600)
            .await
            .unwrap();
        assert_eq!(session.user_id, user_id);
        assert!(!session.is_revoked());

        let found = db.sessions().get("token-1").await.unwrap().unwrap();
        assert_eq!(found.token, "token-1");
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent_and_keeps_row() {
        let (db, user_id) = db_with_user().await;
        db.sessions()
            .create("token-1", &user_id, 3600)
            .await
            .unwrap();

        db.sessions().revoke("token-1").await.unwrap();
        db.sessions().revoke("token-1").await.unwrap();
        db.sessions().revoke("never-existed").await.unwrap();

        // Row persists for audit, but is revoked.
        let session = db.sessions().get("token-1").await.unwrap().unwrap();
        assert!(session.is_revoked());

        // And no longer resolves a user.
        assert!(
            db.users()
                .get_by_refresh_token("token-1")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_expired_session_rejected_for_auth() {
        let (db, user_id) = db_with_user().await;
        db.sessions()
            .create("stale", &user_id, -60)
            .await
            .unwrap();

        assert!(
            db.users()
                .get_by_refresh_token("stale")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_delete_expired_keeps_live_and_revoked_rows() {
        let (db, user_id) = db_with_user().await;
        db.sessions().create("live", &user_id, 3600).await.unwrap();
        db.sessions().create("stale", &user_id, -60).await.unwrap();
        db.sessions()
            .create("revoked", &user_id, 3600)
            .await
            .unwrap();
        db.sessions().revoke("revoked").await.unwrap();

        let purged = db.sessions().delete_expired().await.unwrap();
        assert_eq!(purged, 1);

        assert!(db.sessions().get("live").await.unwrap().is_some());
        assert!(db.sessions().get("revoked").await.unwrap().is_some());
        assert!(db.sessions().get("stale").await.unwrap().is_none());
    }
}
