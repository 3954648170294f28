//! Order model and storage backends.

mod memory_store;
mod sqlite_store;
mod store;
mod types;

pub use memory_store::InMemoryOrderStore;
pub use sqlite_store::SqliteOrderStore;
pub use store::{OrderStore, StoreError};
pub use types::{FulfillmentState, Order, OrderItem, OrderState, PaymentState};
