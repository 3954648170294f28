//! SQLite-backed order store implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::{FulfillmentState, Order, OrderItem, OrderState, OrderStore, PaymentState, StoreError};

/// Raw column values of one `orders` row, decoded after the connection is released.
struct OrderRow {
    id: String,
    items: String,
    state: String,
    payment_state: Option<String>,
    fulfillment_state: Option<String>,
}

/// SQLite-backed order store.
///
/// Items and the tagged payment/fulfillment states are stored as JSON text,
/// so the on-disk shape matches the API shape.
pub struct SqliteOrderStore {
    conn: Mutex<Connection>,
}

impl SqliteOrderStore {
    /// Create a new SQLite order store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite order store (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS orders (
                id TEXT PRIMARY KEY,
                items TEXT NOT NULL,
                state TEXT NOT NULL,
                payment_state TEXT,
                fulfillment_state TEXT,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_orders_state ON orders(state);
            "#,
        )?;
        Ok(())
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Database("connection mutex poisoned".to_string()))
    }

    fn parse_state(value: &str) -> Result<OrderState, StoreError> {
        match value {
            "created" => Ok(OrderState::Created),
            "paid" => Ok(OrderState::Paid),
            "in_fulfillment" => Ok(OrderState::InFulfillment),
            "closed" => Ok(OrderState::Closed),
            other => Err(StoreError::Serialization(format!(
                "unknown order state '{}'",
                other
            ))),
        }
    }

    fn row_to_order(row: OrderRow) -> Result<Order, StoreError> {
        let items: Vec<OrderItem> = serde_json::from_str(&row.items)?;
        let state = Self::parse_state(&row.state)?;
        let payment_state: Option<PaymentState> = row
            .payment_state
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;
        let fulfillment_state: Option<FulfillmentState> = row
            .fulfillment_state
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;

        Ok(Order {
            id: row.id,
            items,
            state,
            payment_state,
            fulfillment_state,
        })
    }
}

#[async_trait]
impl OrderStore for SqliteOrderStore {
    async fn save(&self, order: Order) -> Result<Order, StoreError> {
        let items_json = serde_json::to_string(&order.items)?;
        let payment_json = order
            .payment_state
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let fulfillment_json = order
            .fulfillment_state
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let conn = self.connection()?;
        conn.execute(
            r#"
            INSERT INTO orders (id, items, state, payment_state, fulfillment_state, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                items = excluded.items,
                state = excluded.state,
                payment_state = excluded.payment_state,
                fulfillment_state = excluded.fulfillment_state,
                updated_at = excluded.updated_at
            "#,
            params![
                order.id,
                items_json,
                order.state.as_str(),
                payment_json,
                fulfillment_json,
                Utc::now().to_rfc3339(),
            ],
        )?;

        Ok(order)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Order>, StoreError> {
        let row = {
            let conn = self.connection()?;
            conn.query_row(
                "SELECT id, items, state, payment_state, fulfillment_state FROM orders WHERE id = ?",
                params![id],
                |row| {
                    Ok(OrderRow {
                        id: row.get(0)?,
                        items: row.get(1)?,
                        state: row.get(2)?,
                        payment_state: row.get(3)?,
                        fulfillment_state: row.get(4)?,
                    })
                },
            )
            .optional()?
        };

        row.map(Self::row_to_order).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_store() -> SqliteOrderStore {
        SqliteOrderStore::in_memory().unwrap()
    }

    fn create_test_order(id: &str) -> Order {
        Order::new(
            id,
            vec![OrderItem::new("p1", 2), OrderItem::new("p2", 1)],
        )
    }

    #[tokio::test]
    async fn test_save_and_find_order() {
        let store = create_test_store();
        let order = create_test_order("o1");

        let saved = store.save(order.clone()).await.unwrap();
        assert_eq!(saved, order);

        let fetched = store.find_by_id("o1").await.unwrap();
        assert_eq!(fetched, Some(order));
    }

    #[tokio::test]
    async fn test_find_nonexistent_order() {
        let store = create_test_store();
        let result = store.find_by_id("nonexistent-id").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_save_is_upsert() {
        let store = create_test_store();
        let order = create_test_order("o1");
        store.save(order.clone()).await.unwrap();

        let paid = Order {
            state: OrderState::Paid,
            payment_state: Some(PaymentState::Paid {
                timestamp: Utc::now(),
            }),
            ..order
        };
        store.save(paid.clone()).await.unwrap();

        let fetched = store.find_by_id("o1").await.unwrap().unwrap();
        assert_eq!(fetched, paid);

        let conn = store.connection().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM orders", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_failed_fulfillment_round_trips_through_storage() {
        let store = create_test_store();
        let order = Order {
            fulfillment_state: Some(FulfillmentState::Failed {
                timestamp: Utc::now(),
                reason: Some("Fulfillment order for order with id 'o1' failed".to_string()),
            }),
            ..create_test_order("o1").with_state(OrderState::Paid)
        };
        store.save(order.clone()).await.unwrap();

        let fetched = store.find_by_id("o1").await.unwrap().unwrap();
        assert_eq!(fetched.state, OrderState::Paid);
        assert_eq!(fetched.fulfillment_state, order.fulfillment_state);
    }

    #[tokio::test]
    async fn test_unknown_state_is_a_serialization_error() {
        let store = create_test_store();
        {
            let conn = store.connection().unwrap();
            conn.execute(
                "INSERT INTO orders (id, items, state, updated_at) VALUES ('bad', '[]', 'shipped', '')",
                [],
            )
            .unwrap();
        }

        let result = store.find_by_id("bad").await;
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_file_based_store() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("orders.db");

        {
            let store = SqliteOrderStore::new(&db_path).unwrap();
            store.save(create_test_order("o1")).await.unwrap();
        }

        // Verify file was created
        assert!(db_path.exists());

        // Reopen and verify the order survived
        let store = SqliteOrderStore::new(&db_path).unwrap();
        let fetched = store.find_by_id("o1").await.unwrap();
        assert!(fetched.is_some());
    }
}
