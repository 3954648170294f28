//! Order lifecycle orchestrator implementation.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::fulfillment::FulfillmentClient;
use crate::lock::{LockCoordinator, LockKey};
use crate::metrics::{FULFILLMENT_ATTEMPTS, ORDER_OPERATIONS};
use crate::order::{FulfillmentState, Order, OrderItem, OrderState, OrderStore, PaymentState};

use super::config::LifecycleConfig;
use super::types::{OrderError, Outcome, ResultLabel};

/// The order orchestrator - moves orders through their lifecycle.
///
/// Holds no order state of its own. Everything is read from and written to the
/// [`OrderStore`] while the order's lock is held.
pub struct OrderOrchestrator {
    config: LifecycleConfig,
    store: Arc<dyn OrderStore>,
    locks: LockCoordinator,
    fulfillment: Arc<dyn FulfillmentClient>,
}

impl OrderOrchestrator {
    /// Create a new orchestrator.
    pub fn new(
        config: LifecycleConfig,
        store: Arc<dyn OrderStore>,
        locks: LockCoordinator,
        fulfillment: Arc<dyn FulfillmentClient>,
    ) -> Self {
        Self {
            config,
            store,
            locks,
            fulfillment,
        }
    }

    /// Look up an order without taking its lock.
    pub async fn find_order(&self, id: &str) -> Result<Option<Order>, OrderError> {
        Ok(self.store.find_by_id(id).await?)
    }

    /// Create an order, or return the existing one if it is still `Created`.
    ///
    /// Items supplied for an already existing order are ignored.
    pub async fn create_order(
        &self,
        id: &str,
        items: Vec<OrderItem>,
    ) -> Result<Order, OrderError> {
        self.locked("create_order", id, || self.create_locked(id, items))
            .await
            .map(Outcome::into_order)
    }

    /// Mark a `Created` order as paid.
    pub async fn resolve_payment(&self, id: &str) -> Result<Option<Order>, OrderError> {
        self.locked("resolve_payment", id, || self.resolve_payment_locked(id))
            .await
            .map(|outcome| outcome.map(Outcome::into_order))
    }

    /// Hand a `Paid` order to fulfillment, retrying failed submissions.
    ///
    /// When every attempt fails the order is saved with a `Failed` fulfillment
    /// state, stays `Paid`, and `OrderError::FulfillmentBegin` is returned.
    pub async fn start_fulfillment(&self, id: &str) -> Result<Option<Order>, OrderError> {
        self.locked("start_fulfillment", id, || self.start_fulfillment_locked(id))
            .await
            .map(|outcome| outcome.map(Outcome::into_order))
    }

    /// Close an order whose fulfillment is in progress.
    pub async fn resolve_fulfillment(&self, id: &str) -> Result<Option<Order>, OrderError> {
        self.locked("resolve_fulfillment", id, || {
            self.resolve_fulfillment_locked(id)
        })
        .await
        .map(|outcome| outcome.map(Outcome::into_order))
    }

    /// Run one lifecycle step under the order's lock and count its result.
    async fn locked<R, F, Fut>(
        &self,
        operation: &'static str,
        id: &str,
        step: F,
    ) -> Result<R, OrderError>
    where
        R: ResultLabel,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<R, OrderError>>,
    {
        let result = self.locks.with_lock(LockKey::order(id), step).await;

        let label = match &result {
            Ok(outcome) => outcome.result_label(),
            Err(e) if e.is_rejection() => "rejected",
            Err(_) => "failed",
        };
        ORDER_OPERATIONS
            .with_label_values(&[operation, label])
            .inc();

        if let Err(e) = &result {
            debug!("{} on order {} did not complete: {}", operation, id, e);
        }

        result
    }

    async fn create_locked(&self, id: &str, items: Vec<OrderItem>) -> Result<Outcome, OrderError> {
        match self.store.find_by_id(id).await? {
            None => {
                if items.is_empty() {
                    return Err(OrderError::Validation(format!(
                        "Order with id '{}' must contain at least one item",
                        id
                    )));
                }
                let order = self.store.save(Order::new(id, items)).await?;
                info!("Created order {} with {} items", order.id, order.items.len());
                Ok(Outcome::Transitioned(order))
            }
            Some(existing) if existing.state == OrderState::Created => {
                if existing.items != items {
                    debug!(
                        "Order {} already exists, ignoring newly supplied items",
                        existing.id
                    );
                }
                Ok(Outcome::Unchanged(existing))
            }
            Some(existing) => Err(OrderError::unsupported(&existing)),
        }
    }

    async fn resolve_payment_locked(&self, id: &str) -> Result<Option<Outcome>, OrderError> {
        let Some(mut order) = self.store.find_by_id(id).await? else {
            return Ok(None);
        };

        match order.state {
            OrderState::Paid => Ok(Some(Outcome::Unchanged(order))),
            OrderState::Created => {
                order.state = OrderState::Paid;
                order.payment_state = Some(PaymentState::Paid {
                    timestamp: Utc::now(),
                });
                let order = self.store.save(order).await?;
                info!("Order {} paid", order.id);
                Ok(Some(Outcome::Transitioned(order)))
            }
            _ => Err(OrderError::unsupported(&order)),
        }
    }

    async fn start_fulfillment_locked(&self, id: &str) -> Result<Option<Outcome>, OrderError> {
        let Some(order) = self.store.find_by_id(id).await? else {
            return Ok(None);
        };

        match order.state {
            OrderState::InFulfillment => Ok(Some(Outcome::Unchanged(order))),
            OrderState::Paid => self.begin_fulfillment(order).await.map(Some),
            _ => Err(OrderError::unsupported(&order)),
        }
    }

    /// Submission retry loop for a `Paid` order.
    async fn begin_fulfillment(&self, mut order: Order) -> Result<Outcome, OrderError> {
        let items = order.items_by_product();
        let attempts = self.config.fulfillment_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            match self.fulfillment.submit(&order.id, &items).await {
                Ok(()) => {
                    FULFILLMENT_ATTEMPTS.with_label_values(&["success"]).inc();
                    order.state = OrderState::InFulfillment;
                    order.fulfillment_state = Some(FulfillmentState::Started {
                        timestamp: Utc::now(),
                    });
                    let order = self.store.save(order).await?;
                    info!(
                        "Order {} handed to fulfillment on attempt {}/{}",
                        order.id, attempt, attempts
                    );
                    return Ok(Outcome::Transitioned(order));
                }
                Err(e) => {
                    FULFILLMENT_ATTEMPTS.with_label_values(&["failure"]).inc();
                    warn!(
                        "Fulfillment attempt {}/{} for order {} failed: {}",
                        attempt, attempts, order.id, e
                    );
                    last_error = Some(e);
                    if attempt < attempts {
                        tokio::time::sleep(self.config.retry_delay()).await;
                    }
                }
            }
        }

        order.fulfillment_state = Some(FulfillmentState::Failed {
            timestamp: Utc::now(),
            reason: last_error.map(|e| e.to_string()),
        });
        let order = self.store.save(order).await?;
        error!(
            "Could not begin fulfillment for order {} after {} attempts",
            order.id, attempts
        );

        Err(OrderError::FulfillmentBegin {
            id: order.id,
            attempts,
        })
    }

    async fn resolve_fulfillment_locked(&self, id: &str) -> Result<Option<Outcome>, OrderError> {
        let Some(mut order) = self.store.find_by_id(id).await? else {
            return Ok(None);
        };

        match order.state {
            state if state.is_terminal() => Ok(Some(Outcome::Unchanged(order))),
            OrderState::InFulfillment => {
                order.state = OrderState::Closed;
                order.fulfillment_state = Some(FulfillmentState::Fulfilled {
                    timestamp: Utc::now(),
                });
                let order = self.store.save(order).await?;
                info!("Order {} closed", order.id);
                Ok(Some(Outcome::Transitioned(order)))
            }
            _ => Err(OrderError::unsupported(&order)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fulfillment::FulfillmentError;
    use crate::lock::{InMemoryEntityLock, LockConfig};
    use crate::order::InMemoryOrderStore;
    use crate::testing::{fixtures, MockFulfillmentClient};

    struct Harness {
        orchestrator: OrderOrchestrator,
        store: Arc<InMemoryOrderStore>,
        fulfillment: Arc<MockFulfillmentClient>,
    }

    fn harness() -> Harness {
        let store = Arc::new(InMemoryOrderStore::new());
        let fulfillment = Arc::new(MockFulfillmentClient::new());
        let locks = LockCoordinator::new(
            Arc::new(InMemoryEntityLock::new()),
            LockConfig::default(),
        );
        let config = LifecycleConfig {
            fulfillment_attempts: 3,
            retry_delay_ms: 10,
        };

        Harness {
            orchestrator: OrderOrchestrator::new(
                config,
                store.clone(),
                locks,
                fulfillment.clone(),
            ),
            store,
            fulfillment,
        }
    }

    async fn seed(h: &Harness, id: &str, state: OrderState) -> Order {
        h.store
            .save(Order::new(id, fixtures::single_item("p1")).with_state(state))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_persists_created_order() {
        let h = harness();
        let order = h
            .orchestrator
            .create_order("o1", fixtures::items(&[("p1", 2)]))
            .await
            .unwrap();

        assert_eq!(order.state, OrderState::Created);
        assert_eq!(h.store.find_by_id("o1").await.unwrap(), Some(order));
    }

    #[tokio::test]
    async fn test_create_with_no_items_is_rejected() {
        let h = harness();
        let err = h.orchestrator.create_order("o1", vec![]).await.unwrap_err();

        assert!(matches!(err, OrderError::Validation(_)));
        assert!(h.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_create_existing_created_order_keeps_stored_items() {
        let h = harness();
        let first = h
            .orchestrator
            .create_order("o1", fixtures::items(&[("p1", 2)]))
            .await
            .unwrap();
        let second = h
            .orchestrator
            .create_order("o1", fixtures::items(&[("p9", 7)]))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(second.items, fixtures::items(&[("p1", 2)]));
    }

    #[tokio::test]
    async fn test_create_on_paid_order_is_unsupported() {
        let h = harness();
        seed(&h, "o1", OrderState::Paid).await;

        let err = h
            .orchestrator
            .create_order("o1", fixtures::single_item("p1"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            OrderError::UnsupportedState { state: OrderState::Paid, .. }
        ));
    }

    #[tokio::test]
    async fn test_operations_on_missing_order_return_none() {
        let h = harness();
        assert!(h.orchestrator.resolve_payment("nope").await.unwrap().is_none());
        assert!(h.orchestrator.start_fulfillment("nope").await.unwrap().is_none());
        assert!(h.orchestrator.resolve_fulfillment("nope").await.unwrap().is_none());
        assert!(h.orchestrator.find_order("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_resolve_payment_sets_paid_state() {
        let h = harness();
        seed(&h, "o1", OrderState::Created).await;

        let order = h.orchestrator.resolve_payment("o1").await.unwrap().unwrap();
        assert_eq!(order.state, OrderState::Paid);
        assert!(matches!(order.payment_state, Some(PaymentState::Paid { .. })));
    }

    #[tokio::test]
    async fn test_resolve_payment_is_idempotent() {
        let h = harness();
        seed(&h, "o1", OrderState::Created).await;

        let first = h.orchestrator.resolve_payment("o1").await.unwrap().unwrap();
        let second = h.orchestrator.resolve_payment("o1").await.unwrap().unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_start_fulfillment_requires_paid() {
        let h = harness();
        let before = seed(&h, "o1", OrderState::Created).await;

        let err = h.orchestrator.start_fulfillment("o1").await.unwrap_err();
        assert!(matches!(err, OrderError::UnsupportedState { .. }));
        assert_eq!(h.fulfillment.call_count().await, 0);
        assert_eq!(h.store.find_by_id("o1").await.unwrap(), Some(before));
    }

    #[tokio::test]
    async fn test_start_fulfillment_submits_items_by_product() {
        let h = harness();
        h.store
            .save(
                Order::new("o1", fixtures::items(&[("p1", 2), ("p2", 5)]))
                    .with_state(OrderState::Paid),
            )
            .await
            .unwrap();

        let order = h.orchestrator.start_fulfillment("o1").await.unwrap().unwrap();
        assert_eq!(order.state, OrderState::InFulfillment);
        assert!(matches!(
            order.fulfillment_state,
            Some(FulfillmentState::Started { .. })
        ));

        let calls = h.fulfillment.recorded_calls().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].order_id, "o1");
        assert_eq!(calls[0].items.get("p2"), Some(&5));
    }

    #[tokio::test]
    async fn test_start_fulfillment_retries_until_success() {
        let h = harness();
        seed(&h, "o1", OrderState::Paid).await;
        h.fulfillment.fail_times(2, "warehouse busy").await;

        let order = h.orchestrator.start_fulfillment("o1").await.unwrap().unwrap();
        assert_eq!(order.state, OrderState::InFulfillment);
        assert_eq!(h.fulfillment.call_count().await, 3);
    }

    #[tokio::test]
    async fn test_start_fulfillment_records_last_failure() {
        let h = harness();
        seed(&h, "o1", OrderState::Paid).await;
        h.fulfillment.fail_times(2, "first").await;
        h.fulfillment
            .push_outcome(Err(FulfillmentError::Rejected("last".to_string())))
            .await;

        let err = h.orchestrator.start_fulfillment("o1").await.unwrap_err();
        assert!(matches!(
            err,
            OrderError::FulfillmentBegin { ref id, attempts: 3 } if id == "o1"
        ));

        let stored = h.store.find_by_id("o1").await.unwrap().unwrap();
        assert_eq!(stored.state, OrderState::Paid);
        match stored.fulfillment_state {
            Some(FulfillmentState::Failed { reason, .. }) => {
                assert_eq!(reason.as_deref(), Some("last"));
            }
            other => panic!("expected failed fulfillment state, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_start_fulfillment_can_be_retried_after_failure() {
        let h = harness();
        seed(&h, "o1", OrderState::Paid).await;
        h.fulfillment.fail_times(3, "down").await;

        assert!(h.orchestrator.start_fulfillment("o1").await.is_err());
        let order = h.orchestrator.start_fulfillment("o1").await.unwrap().unwrap();

        assert_eq!(order.state, OrderState::InFulfillment);
        assert_eq!(h.fulfillment.call_count().await, 4);
    }

    #[tokio::test]
    async fn test_resolve_fulfillment_closes_order() {
        let h = harness();
        seed(&h, "o1", OrderState::InFulfillment).await;

        let order = h
            .orchestrator
            .resolve_fulfillment("o1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(order.state, OrderState::Closed);
        assert!(matches!(
            order.fulfillment_state,
            Some(FulfillmentState::Fulfilled { .. })
        ));

        let again = h
            .orchestrator
            .resolve_fulfillment("o1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(order, again);
    }

    #[tokio::test]
    async fn test_resolve_fulfillment_on_closed_order_is_unchanged() {
        let h = harness();
        let before = seed(&h, "o1", OrderState::Closed).await;

        let order = h
            .orchestrator
            .resolve_fulfillment("o1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(order, before);
        assert!(order.fulfillment_state.is_none());
    }

    #[tokio::test]
    async fn test_resolve_fulfillment_on_paid_is_unsupported() {
        let h = harness();
        seed(&h, "o1", OrderState::Paid).await;

        let err = h.orchestrator.resolve_fulfillment("o1").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Order with id 'o1' has an unsupported state of 'paid'"
        );
    }
}
