pub mod config;
pub mod fulfillment;
pub mod lock;
pub mod metrics;
pub mod order;
pub mod orchestrator;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, FulfillmentConfig,
    MockFulfillmentMode, StoreBackend,
};
pub use fulfillment::{FulfillmentClient, FulfillmentError, RestFulfillmentClient};
pub use lock::{InMemoryEntityLock, LockConfig, LockCoordinator, LockError, LockKey};
pub use order::{
    FulfillmentState, InMemoryOrderStore, Order, OrderItem, OrderState, OrderStore,
    PaymentState, SqliteOrderStore, StoreError,
};
pub use orchestrator::{LifecycleConfig, OrderError, OrderOrchestrator};
