//! HTTP fulfillment client.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::config::FulfillmentConfig;

use super::{FulfillmentClient, FulfillmentError, FulfillmentRequest};

/// Posts orders to a fulfillment endpoint. Only `200 OK` counts as accepted.
pub struct RestFulfillmentClient {
    client: Client,
    url: String,
}

impl RestFulfillmentClient {
    /// Create a new REST fulfillment client.
    pub fn new(config: &FulfillmentConfig) -> Result<Self, FulfillmentError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| FulfillmentError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }
}

#[async_trait]
impl FulfillmentClient for RestFulfillmentClient {
    async fn submit(
        &self,
        order_id: &str,
        items: &BTreeMap<String, i32>,
    ) -> Result<(), FulfillmentError> {
        let request = FulfillmentRequest {
            order_id: order_id.to_string(),
            items: items.clone(),
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FulfillmentError::Timeout
                } else {
                    FulfillmentError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        debug!(order_id, status = %status, "Fulfillment endpoint responded");

        if status != StatusCode::OK {
            return Err(FulfillmentError::Rejected(format!(
                "Fulfillment order for order with id '{}' failed",
                order_id
            )));
        }

        Ok(())
    }
}
