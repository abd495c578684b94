use sqlx::sqlite::SqlitePool;

/// A catalog item. Cost is integer cents.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub description: String,
    pub cost: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Clone)]
pub struct ItemStore {
    pool: SqlitePool,
}

impl ItemStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Item>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, name, description, cost, created_at, updated_at FROM items ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Item>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, name, description, cost, created_at, updated_at FROM items WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Create an item. Returns the generated ID.
    pub async fn create(
        &self,
        name: &str,
        description: &str,
        cost: i64,
    ) -> Result<String, sqlx::Error> {
        let id = uuid::Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO items (id, name, description, cost) VALUES (?, ?, ?, ?)")
            .bind(&id)
            .bind(name)
            .bind(description)
            .bind(cost)
            .execute(&self.pool)
            .await?;
        Ok(id)
    }

    pub async fn update(
        &self,
        id: &str,
        name: &str,
        description: &str,
        cost: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE items SET name = ?, description = ?, cost = ?, updated_at = datetime('now')
             WHERE id = ?",
        )
        .bind(name)
        .bind(description)
        .bind(cost)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::db::Database;

    #[tokio::test]
    async fn test_item_crud() {
        let db = Database::open(":memory:").await.unwrap();

        let id = db.items().create("Latte", "12oz", 450).await.unwrap();

        let item = db.items().get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(item.name, "Latte");
        assert_eq!(item.cost, 450);

        assert!(db.items().update(&id, "Latte", "16oz", 525).await.unwrap());
        let item = db.items().get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(item.description, "16oz");
        assert_eq!(item.cost, 525);

        assert!(db.items().delete(&id).await.unwrap());
        assert!(db.items().get_by_id(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_item_reports_false() {
        let db = Database::open(":memory:").await.unwrap();
        assert!(!db.items().update("nope", "x", "", 1).await.unwrap());
        assert!(!db.items().delete("nope").await.unwrap());
    }
}
