//! Mock fulfillment client for testing.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::fulfillment::{FulfillmentClient, FulfillmentError, FulfillmentRequest};

/// Mock implementation of the FulfillmentClient trait.
///
/// Outcomes are scripted per call: queued results are consumed in order,
/// and once the queue is empty every call succeeds. Every call is recorded.
///
/// # Example
///
/// ```rust,ignore
/// use orderflow_core::testing::MockFulfillmentClient;
///
/// let client = MockFulfillmentClient::new();
/// client.fail_times(2, "warehouse busy").await;
///
/// // Third submission succeeds.
/// assert_eq!(client.call_count().await, 0);
/// ```
#[derive(Debug, Default)]
pub struct MockFulfillmentClient {
    calls: Arc<RwLock<Vec<FulfillmentRequest>>>,
    outcomes: Arc<RwLock<VecDeque<Result<(), FulfillmentError>>>>,
    fail_always: Arc<RwLock<Option<FulfillmentError>>>,
    delay: Arc<RwLock<Duration>>,
}

impl MockFulfillmentClient {
    /// Create a mock that accepts every submission.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one outcome for the next unscripted call.
    pub async fn push_outcome(&self, outcome: Result<(), FulfillmentError>) {
        self.outcomes.write().await.push_back(outcome);
    }

    /// Reject the next `times` calls with `reason`.
    pub async fn fail_times(&self, times: usize, reason: &str) {
        let mut outcomes = self.outcomes.write().await;
        for _ in 0..times {
            outcomes.push_back(Err(FulfillmentError::Rejected(reason.to_string())));
        }
    }

    /// Reject every call with `error`, ignoring queued outcomes.
    pub async fn set_always_fail(&self, error: FulfillmentError) {
        *self.fail_always.write().await = Some(error);
    }

    /// Go back to accepting calls.
    pub async fn reset(&self) {
        *self.fail_always.write().await = None;
        self.outcomes.write().await.clear();
        self.calls.write().await.clear();
    }

    /// Make each call take at least `delay` before answering.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    /// Get all recorded submissions.
    pub async fn recorded_calls(&self) -> Vec<FulfillmentRequest> {
        self.calls.read().await.clone()
    }

    /// Get the number of submissions received.
    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }
}

#[async_trait]
impl FulfillmentClient for MockFulfillmentClient {
    async fn submit(
        &self,
        order_id: &str,
        items: &BTreeMap<String, i32>,
    ) -> Result<(), FulfillmentError> {
        self.calls.write().await.push(FulfillmentRequest {
            order_id: order_id.to_string(),
            items: items.clone(),
        });

        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.fail_always.read().await.clone() {
            return Err(error);
        }

        self.outcomes.write().await.pop_front().unwrap_or(Ok(()))
    }
}
