//! Per-user document storage.
//!
//! Each top-level key of a user's document is one row, keyed by
//! `(user_id, data_type)`. Writes to the same key replace the row, so the
//! last writer wins.

use chrono::Utc;
use serde_json::{Map, Value};
use sqlx::SqlitePool;

/// Rejects data type names that are empty or not plain identifiers.
pub fn validate_data_type(data_type: &str) -> bool {
    !data_type.is_empty()
        && data_type.len() <= 64
        && data_type
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[derive(sqlx::FromRow)]
struct DataRow {
    data_type: String,
    data: String,
}

#[derive(Debug, Clone)]
pub struct UserDataRepository {
    pool: SqlitePool,
}

impl UserDataRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts or replaces one data type for a user.
    pub async fn save(
        &self,
        user_id: i64,
        data_type: &str,
        data: &Value,
    ) -> Result<(), sqlx::Error> {
        let json = serde_json::to_string(data).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO user_data (user_id, data_type, data, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(user_id, data_type) DO UPDATE SET
                data = excluded.data,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id)
        .bind(data_type)
        .bind(&json)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Saves every top-level key of `document` as its own row.
    pub async fn save_all(
        &self,
        user_id: i64,
        document: &Map<String, Value>,
    ) -> Result<usize, sqlx::Error> {
        for (data_type, data) in document {
            self.save(user_id, data_type, data).await?;
        }
        Ok(document.len())
    }

    /// All stored data types for a user. Rows that fail to parse are skipped.
    pub async fn load_all(&self, user_id: i64) -> Result<Map<String, Value>, sqlx::Error> {
        let rows = sqlx::query_as::<_, DataRow>(
            "SELECT data_type, data FROM user_data WHERE user_id = ? ORDER BY data_type",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut document = Map::new();
        for row in rows {
            match serde_json::from_str(&row.data) {
                Ok(value) => {
                    document.insert(row.data_type, value);
                }
                Err(e) => {
                    tracing::warn!(user_id, data_type = %row.data_type, error = %e, "Skipping unreadable row");
                }
            }
        }
        Ok(document)
    }

    pub async fn load(&self, user_id: i64, data_type: &str) -> Result<Option<Value>, sqlx::Error> {
        let row = sqlx::query_as::<_, DataRow>(
            "SELECT data_type, data FROM user_data WHERE user_id = ? AND data_type = ?",
        )
        .bind(user_id)
        .bind(data_type)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.and_then(|row| serde_json::from_str(&row.data).ok()))
    }

    /// Returns the number of rows removed.
    pub async fn delete(&self, user_id: i64, data_type: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_data WHERE user_id = ? AND data_type = ?")
            .bind(user_id)
            .bind(data_type)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::{init_db, UserRepository};
    use serde_json::json;
    use tempfile::TempDir;

    async fn setup() -> (UserDataRepository, i64, i64, TempDir) {
        let temp = TempDir::new().unwrap();
        let pool = init_db(&temp.path().join("test.db")).await.unwrap();
        let users = UserRepository::new(pool.clone());
        let a = users.create("a@example.com", "hash", None).await.unwrap();
        let b = users.create("b@example.com", "hash", None).await.unwrap();
        (UserDataRepository::new(pool), a.id, b.id, temp)
    }

    #[test]
    fn test_validate_data_type() {
        assert!(validate_data_type("workoutHistory"));
        assert!(validate_data_type("meal_history-2"));

        assert!(!validate_data_type(""));
        assert!(!validate_data_type("../evil"));
        assert!(!validate_data_type("has space"));
        assert!(!validate_data_type(&"x".repeat(65)));
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let (repo, user, _, _temp) = setup().await;

        repo.save(user, "workoutHistory", &json!([{"id": "1"}]))
            .await
            .unwrap();

        let loaded = repo.load(user, "workoutHistory").await.unwrap().unwrap();
        assert_eq!(loaded, json!([{"id": "1"}]));
        assert!(repo.load(user, "mealHistory").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_replaces_existing_row() {
        let (repo, user, _, _temp) = setup().await;

        repo.save(user, "preferences", &json!({"theme": "light"}))
            .await
            .unwrap();
        repo.save(user, "preferences", &json!({"theme": "dark"}))
            .await
            .unwrap();

        let all = repo.load_all(user).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all["preferences"]["theme"], "dark");
    }

    #[tokio::test]
    async fn test_save_all_and_users_are_isolated() {
        let (repo, a, b, _temp) = setup().await;

        let doc = json!({"workoutHistory": [], "preferences": {"theme": "dark"}});
        let saved = repo.save_all(a, doc.as_object().unwrap()).await.unwrap();
        assert_eq!(saved, 2);

        assert_eq!(Value::Object(repo.load_all(a).await.unwrap()), doc);
        assert!(repo.load_all(b).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete() {
        let (repo, user, _, _temp) = setup().await;
        repo.save(user, "mealHistory", &json!([])).await.unwrap();

        assert_eq!(repo.delete(user, "mealHistory").await.unwrap(), 1);
        assert_eq!(repo.delete(user, "mealHistory").await.unwrap(), 0);
        assert!(repo.load(user, "mealHistory").await.unwrap().is_none());
    }
}
