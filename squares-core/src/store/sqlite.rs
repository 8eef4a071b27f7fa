use super::GroupStore;
use crate::error::{Result, SquaresError};
use crate::group::Group;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use tokio::sync::Mutex;

/// Single-file store: a few filter columns plus the whole group record
/// as JSON, upserted per write.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub async fn open(db_path: &Path) -> Result<Self> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SquaresError::internal(format!("Failed to create directory: {}", e)))?;
        }

        let conn = Connection::open(db_path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };

        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().await;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS groups (
                id TEXT PRIMARY KEY,
                visibility TEXT NOT NULL,
                invite_code TEXT,
                status TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                data TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }
}

#[async_trait]
impl GroupStore for SqliteStore {
    async fn get(&self, id: &str) -> Result<Option<Group>> {
        let conn = self.conn.lock().await;

        let data: Option<String> = conn
            .query_row("SELECT data FROM groups WHERE id = ?1", params![id], |row| {
                row.get(0)
            })
            .optional()?;

        data.map(|d| serde_json::from_str(&d))
            .transpose()
            .map_err(Into::into)
    }

    async fn find_by_invite_code(&self, code: &str) -> Result<Option<Group>> {
        let conn = self.conn.lock().await;

        let data: Option<String> = conn
            .query_row(
                "SELECT data FROM groups WHERE invite_code = ?1",
                params![code.to_uppercase()],
                |row| row.get(0),
            )
            .optional()?;

        data.map(|d| serde_json::from_str(&d))
            .transpose()
            .map_err(Into::into)
    }

    async fn list_public_active(&self) -> Result<Vec<Group>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn.prepare(
            "SELECT data FROM groups
             WHERE visibility = 'public' AND status != 'completed'
             ORDER BY created_at DESC",
        )?;

        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut groups = Vec::new();
        for data in rows {
            groups.push(serde_json::from_str(&data?)?);
        }

        Ok(groups)
    }

    async fn put(&self, group: &Group) -> Result<()> {
        let conn = self.conn.lock().await;

        conn.execute(
            "INSERT OR REPLACE INTO groups (id, visibility, invite_code, status, created_at, data)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                group.id,
                group.visibility.to_string(),
                group.invite_code,
                group.status.to_string(),
                group.created_at.timestamp(),
                serde_json::to_string(group)?,
            ],
        )?;

        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock().await;

        let deleted = conn.execute("DELETE FROM groups WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::{CreateGroupInput, Currency, NumberRandomization, Visibility};
    use crate::grid::GridSize;
    use crate::payout::PayoutSettings;
    use chrono::Utc;
    use tempfile::tempdir;

    fn make_group(visibility: Visibility) -> Group {
        Group::new(
            CreateGroupInput {
                name: "pool".to_string(),
                team1: None,
                team2: None,
                price_per_square: 0.25,
                currency: Currency::Usdc,
                visibility,
                payouts: PayoutSettings::default(),
                number_randomization: NumberRandomization::PerQuarter,
                grid_size: GridSize::Reduced,
                creator_name: Some("Pat".to_string()),
            },
            "CreatorWalletAddress1111",
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_roundtrip_preserves_record() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::open(&dir.path().join("groups.db")).await.unwrap();

        let mut group = make_group(Visibility::Public);
        group.purchase(&[0, 1, 24], "BuyerWalletAddress000001", Utc::now());
        group.assign_numbers(Utc::now());
        group.record_result(crate::group::Quarter::Q1, 7, 3).unwrap();

        store.put(&group).await.unwrap();
        let loaded = store.get(&group.id).await.unwrap().unwrap();
        assert_eq!(loaded, group);
    }

    #[tokio::test]
    async fn test_upsert_overwrites() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::open(&dir.path().join("groups.db")).await.unwrap();

        let mut group = make_group(Visibility::Public);
        store.put(&group).await.unwrap();

        group.purchase(&[5], "BuyerWalletAddress000001", Utc::now());
        store.put(&group).await.unwrap();

        let loaded = store.get(&group.id).await.unwrap().unwrap();
        assert_eq!(loaded.filled_count(), 1);
    }

    #[tokio::test]
    async fn test_invite_code_and_listing() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::open(&dir.path().join("groups.db")).await.unwrap();

        let public = make_group(Visibility::Public);
        let private = make_group(Visibility::Private);
        store.put(&public).await.unwrap();
        store.put(&private).await.unwrap();

        let code = private.invite_code.clone().unwrap();
        let found = store
            .find_by_invite_code(&code.to_lowercase())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, private.id);

        let listed = store.list_public_active().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, public.id);
    }

    #[tokio::test]
    async fn test_remove() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::open(&dir.path().join("groups.db")).await.unwrap();

        let group = make_group(Visibility::Public);
        store.put(&group).await.unwrap();

        assert!(store.remove(&group.id).await.unwrap());
        assert!(store.get(&group.id).await.unwrap().is_none());
        assert!(!store.remove(&group.id).await.unwrap());
    }
}
