//! Test utilities and mocks for adapterkit unit tests.
//!
//! Provides a recording [`BackendClient`] whose behavior is scripted per
//! test, plus fixture schemas and capabilities (see `fixtures.rs`).
//!
//! # Example
//!
//! ```rust,ignore
//! use adapterkit::test_support::{fixture_registry, ClientBehavior, RecordingClient};
//!
//! #[test]
//! fn test_example() {
//!     let client = RecordingClient::new(ClientBehavior::Succeed);
//!     let registry = fixture_registry(&client);
//!
//!     // Connect, run operations, then assert on client.calls()...
//! }
//! ```

pub mod fixtures;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::adapter::registry::AdapterConstructor;
use crate::adapter::trait_def::{
    BackendClient, ClientError, DeliveryReport, DeliveryRow, InventoryItem, InventoryProfile,
    InventorySnapshot, LineItemReceipt, LineItemRequest, LineItemStatus, OperationScope,
    ProductSyncReport, ProductSyncRequest, ReportRequest, WebhookRequest, WebhookSubscription,
};

// Re-export fixtures for convenience
pub use fixtures::*;

/// Scripted behavior for [`RecordingClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientBehavior {
    /// Return a canned value.
    Succeed,
    /// Fail with a transient error.
    Transient,
    /// Fail with a permanent error.
    Permanent,
    /// Block for the duration (or until the scope ends), then succeed.
    Block(Duration),
    /// Panic on the worker thread.
    Panic,
}

/// Backend client that counts calls and constructions.
///
/// Clones share counters, so a test keeps one handle while the registry's
/// constructor hands out others.
#[derive(Debug, Clone)]
pub struct RecordingClient {
    behavior: ClientBehavior,
    calls: Arc<AtomicUsize>,
    constructed: Arc<AtomicUsize>,
}

impl RecordingClient {
    /// Create a new client with the given behavior.
    pub fn new(behavior: ClientBehavior) -> Self {
        RecordingClient {
            behavior,
            calls: Arc::default(),
            constructed: Arc::default(),
        }
    }

    /// Number of operations that reached the client.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of times the constructor built this client.
    pub fn constructed(&self) -> usize {
        self.constructed.load(Ordering::SeqCst)
    }

    /// Constructor that hands out clones of this client.
    pub fn constructor(&self) -> AdapterConstructor {
        let client = self.clone();
        AdapterConstructor::new(move |_config| {
            client.constructed.fetch_add(1, Ordering::SeqCst);
            let built: Arc<dyn BackendClient> = Arc::new(client.clone());
            Ok(built)
        })
    }

    fn respond<T>(
        &self,
        scope: &OperationScope,
        value: impl FnOnce() -> T,
    ) -> Result<T, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match self.behavior {
            ClientBehavior::Succeed => Ok(value()),
            ClientBehavior::Transient => {
                Err(ClientError::Transient("503 service unavailable".to_string()))
            }
            ClientBehavior::Permanent => {
                Err(ClientError::Permanent("401 unauthorized".to_string()))
            }
            ClientBehavior::Block(duration) => {
                let until = Instant::now().checked_add(duration);
                while until.map_or(true, |until| Instant::now() < until) {
                    if scope.is_cancelled() || scope.is_expired() {
                        return Err(ClientError::Cancelled);
                    }
                    thread::sleep(Duration::from_millis(5));
                }
                Ok(value())
            }
            ClientBehavior::Panic => panic!("scripted client panic"),
        }
    }
}

impl BackendClient for RecordingClient {
    fn sync_inventory(&self, scope: &OperationScope) -> Result<InventorySnapshot, ClientError> {
        self.respond(scope, || InventorySnapshot {
            entity_label: "Widgets".to_string(),
            items: vec![InventoryItem {
                id: "w-1".to_string(),
                name: "Homepage".to_string(),
                sizes: vec!["300x250".to_string()],
            }],
            synced: 1,
        })
    }

    fn fetch_inventory_profile(
        &self,
        profile_id: &str,
        scope: &OperationScope,
    ) -> Result<InventoryProfile, ClientError> {
        self.respond(scope, || InventoryProfile {
            profile_id: profile_id.to_string(),
            item_ids: vec!["w-1".to_string()],
            formats: vec!["display".to_string()],
        })
    }

    fn create_line_item(
        &self,
        request: &LineItemRequest,
        scope: &OperationScope,
    ) -> Result<LineItemReceipt, ClientError> {
        self.respond(scope, || LineItemReceipt {
            line_item_id: format!("li-{}", request.order_id),
            order_id: request.order_id.clone(),
            status: LineItemStatus::Active,
        })
    }

    fn sync_products(
        &self,
        request: &ProductSyncRequest,
        scope: &OperationScope,
    ) -> Result<ProductSyncReport, ClientError> {
        self.respond(scope, || ProductSyncReport {
            synced: request.product_ids.clone(),
        })
    }

    fn report_metrics(
        &self,
        request: &ReportRequest,
        scope: &OperationScope,
    ) -> Result<DeliveryReport, ClientError> {
        self.respond(scope, || DeliveryReport {
            rows: request
                .line_item_ids
                .iter()
                .map(|id| DeliveryRow {
                    line_item_id: id.clone(),
                    impressions: 1000,
                    clicks: 10,
                    spend: 5.0,
                })
                .collect(),
        })
    }

    fn register_webhook(
        &self,
        request: &WebhookRequest,
        scope: &OperationScope,
    ) -> Result<WebhookSubscription, ClientError> {
        self.respond(scope, || WebhookSubscription {
            subscription_id: "sub-1".to_string(),
            url: request.url.clone(),
            events: request.events.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_client_counts_calls() {
        let client = RecordingClient::new(ClientBehavior::Succeed);
        let handle = client.clone();

        client.sync_inventory(&OperationScope::new()).unwrap();
        client
            .fetch_inventory_profile("p-1", &OperationScope::new())
            .unwrap();
        assert_eq!(handle.calls(), 2);
    }

    #[test]
    fn test_block_observes_cancellation() {
        let client = RecordingClient::new(ClientBehavior::Block(Duration::from_secs(5)));
        let scope = OperationScope::new();
        scope.cancel_handle().cancel();

        let started = Instant::now();
        let err = client.sync_inventory(&scope).unwrap_err();
        assert_eq!(err, ClientError::Cancelled);
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
