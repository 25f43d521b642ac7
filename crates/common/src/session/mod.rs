//! Session storage and flash messages
//!
//! A tower-sessions `SessionStore` backed by the `sessions` table, so the
//! browser session (user_id/user_name, flash notices) lives next to the
//! rest of the data. Records are JSON-encoded; expired rows are ignored on
//! load and swept by a background task.

use crate::db::models::{SessionActiveModel, SessionColumn, SessionEntity};
use crate::errors::AppError;
use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use time::OffsetDateTime;
use tower_sessions::{
    session::{Id, Record},
    session_store, SessionStore,
};

/// Session key for the one-shot notice shown after a redirect
pub const FLASH_KEY: &str = "flash";

/// SeaORM-backed session store
#[derive(Clone, Debug)]
pub struct SeaOrmSessionStore {
    conn: DatabaseConnection,
}

impl SeaOrmSessionStore {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Delete rows whose expiry has passed. Returns the number removed.
    pub async fn delete_expired(&self) -> crate::errors::Result<u64> {
        let result = SessionEntity::delete_many()
            .filter(SessionColumn::ExpiryDate.lte(now_fixed()))
            .exec(&self.conn)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected)
    }
}

fn now_fixed() -> chrono::DateTime<chrono::FixedOffset> {
    chrono::Utc::now().fixed_offset()
}

fn to_chrono(ts: OffsetDateTime) -> chrono::DateTime<chrono::FixedOffset> {
    chrono::DateTime::from_timestamp(ts.unix_timestamp(), ts.nanosecond())
        .unwrap_or(chrono::DateTime::UNIX_EPOCH)
        .fixed_offset()
}

fn backend(err: sea_orm::DbErr) -> session_store::Error {
    session_store::Error::Backend(err.to_string())
}

#[async_trait]
impl SessionStore for SeaOrmSessionStore {
    async fn save(&self, record: &Record) -> session_store::Result<()> {
        let data = serde_json::to_vec(record)
            .map_err(|e| session_store::Error::Encode(e.to_string()))?;

        let row = SessionActiveModel {
            id: Set(record.id.to_string()),
            data: Set(data),
            expiry_date: Set(to_chrono(record.expiry_date)),
        };

        SessionEntity::insert(row)
            .on_conflict(
                OnConflict::column(SessionColumn::Id)
                    .update_columns([SessionColumn::Data, SessionColumn::ExpiryDate])
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await
            .map_err(backend)?;

        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        let row = SessionEntity::find_by_id(session_id.to_string())
            .filter(SessionColumn::ExpiryDate.gt(now_fixed()))
            .one(&self.conn)
            .await
            .map_err(backend)?;

        row.map(|model| serde_json::from_slice::<Record>(&model.data))
            .transpose()
            .map_err(|e| session_store::Error::Decode(e.to_string()))
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        SessionEntity::delete_by_id(session_id.to_string())
            .exec(&self.conn)
            .await
            .map_err(backend)?;

        Ok(())
    }
}

/// Queue a one-shot notice for the next page view
pub async fn set_flash(session: &tower_sessions::Session, message: &str) -> crate::errors::Result<()> {
    session.insert(FLASH_KEY, message).await?;
    Ok(())
}

/// Take the pending notice, clearing it
pub async fn take_flash(session: &tower_sessions::Session) -> crate::errors::Result<Option<String>> {
    Ok(session.remove::<String>(FLASH_KEY).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tower_sessions::{MemoryStore, Session};

    #[test]
    fn test_expiry_conversion() {
        let ts = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let converted = to_chrono(ts);
        assert_eq!(converted.timestamp(), 1_700_000_000);
    }

    #[tokio::test]
    async fn test_flash_is_one_shot() {
        let store = Arc::new(MemoryStore::default());
        let session = Session::new(None, store, None);

        set_flash(&session, "Article not found.").await.unwrap();
        assert_eq!(
            take_flash(&session).await.unwrap().as_deref(),
            Some("Article not found.")
        );
        assert_eq!(take_flash(&session).await.unwrap(), None);
    }
}
