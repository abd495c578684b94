//! Order storage. Creation writes the header and every line item inside a
//! single transaction; a failure on any row rolls the whole order back.

use serde::Serialize;
use sqlx::sqlite::SqlitePool;

#[derive(Debug, Clone)]
pub struct CreateOrderParams {
    pub for_name: String,
    pub for_email: String,
    pub order_date: String,
    pub status: String,
    /// Cents
    pub total: i64,
    pub notes: String,
    pub items: Vec<CreateOrderItemParams>,
}

#[derive(Debug, Clone)]
pub struct CreateOrderItemParams {
    pub item_id: String,
    pub quantity: i64,
    /// Cents
    pub price: i64,
    pub notes: String,
}

/// An order header with its embedded line items.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: i64,
    pub for_name: String,
    pub for_email: String,
    pub order_date: String,
    pub status: String,
    pub total: i64,
    pub notes: String,
    pub created_at: String,
    pub updated_at: String,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub item_name: String,
    pub item_description: String,
    pub quantity: i64,
    pub price: i64,
    pub notes: String,
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    for_name: String,
    for_email: String,
    order_date: String,
    status: String,
    total: i64,
    notes: String,
    created_at: String,
    updated_at: String,
}

#[derive(Clone)]
pub struct OrderStore {
    pool: SqlitePool,
}

impl OrderStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List open (not completed) orders by order date, items embedded.
    pub async fn list_open(&self) -> Result<Vec<Order>, sqlx::Error> {
        let rows: Vec<OrderRow> = sqlx::query_as(
            "SELECT id, for_name, for_email, order_date, status, total, notes,
                    created_at, updated_at
             FROM orders WHERE status != 'completed' ORDER BY order_date ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let items: Vec<OrderItem> = sqlx::query_as(
                "SELECT oi.id, oi.order_id, i.name AS item_name,
                        i.description AS item_description, oi.quantity, oi.price, oi.notes
                 FROM order_items oi
                 JOIN items i ON oi.item_id = i.id
                 WHERE oi.order_id = ?
                 ORDER BY oi.id",
            )
            .bind(row.id)
            .fetch_all(&self.pool)
            .await?;

            orders.push(Order {
                id: row.id,
                for_name: row.for_name,
                for_email: row.for_email,
                order_date: row.order_date,
                status: row.status,
                total: row.total,
                notes: row.notes,
                created_at: row.created_at,
                updated_at: row.updated_at,
                items,
            });
        }
        Ok(orders)
    }

    /// Create an order with its line items atomically. Returns the order ID.
    /// Partial orders are never visible: any line-item failure rolls back
    /// the header too.
    pub async fn create(&self, params: &CreateOrderParams) -> Result<i64, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let (order_id,): (i64,) = sqlx::query_as(
            "INSERT INTO orders (for_name, for_email, order_date, status, total, notes)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING id",
        )
        .bind(&params.for_name)
        .bind(&params.for_email)
        .bind(&params.order_date)
        .bind(&params.status)
        .bind(params.total)
        .bind(&params.notes)
        .fetch_one(&mut *tx)
        .await?;

        for item in &params.items {
            sqlx::query(
                "INSERT INTO order_items (order_id, item_id, quantity, price, notes)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(order_id)
            .bind(&item.item_id)
            .bind(item.quantity)
            .bind(item.price)
            .bind(&item.notes)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(order_id)
    }

    /// Update an order's status.
    pub async fn update_status(&self, id: i64, status: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE orders SET status = ?, updated_at = datetime('now') WHERE id = ?",
        )
        .bind(status)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn exists(&self, id: i64) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM orders WHERE id = ?)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM orders WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
