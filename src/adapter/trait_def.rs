//! BackendClient trait definition, operation scope and result types.
//!
//! The BackendClient trait is the seam to the outbound ad-server calls.
//! Operations only - capability gating and dry-run handling happen in the
//! adapter interface before a client is ever reached.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::adapter::capabilities::{GeoTargeting, PricingModel};

/// Opaque caller identity passed through for audit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal(String);

impl Principal {
    pub fn new(id: impl Into<String>) -> Self {
        Principal(id.into())
    }

    /// Display id used in logs.
    pub fn id(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Failure reported by a backend client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Safe to retry (rate limits, 5xx, connection resets)
    #[error("{0}")]
    Transient(String),

    /// Will not succeed on retry (auth, bad request)
    #[error("{0}")]
    Permanent(String),

    /// The client gave up waiting on its own
    #[error("client timed out")]
    TimedOut,

    /// The client observed the scope's cancellation flag
    #[error("client observed cancellation")]
    Cancelled,
}

/// Handle used by the caller to cancel an in-flight operation.
#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Deadline and cancellation flag for one operation.
///
/// Clones share the cancellation flag, so a client running on a worker
/// thread sees cancellation raised by the caller.
#[derive(Debug, Clone, Default)]
pub struct OperationScope {
    deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

impl OperationScope {
    /// Scope with no deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scope that expires `timeout` from now. A timeout too large to
    /// represent as an instant means no deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        OperationScope {
            deadline: Instant::now().checked_add(timeout),
            cancelled: Arc::default(),
        }
    }

    /// Scope that expires at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        OperationScope {
            deadline: Some(deadline),
            cancelled: Arc::default(),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Handle that cancels this scope and all its clones.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle(Arc::clone(&self.cancelled))
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Time left before the deadline, if one is set.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Narrow the deadline to at most `timeout` from now.
    pub fn tightened(&self, timeout: Duration) -> Self {
        let deadline = match (self.deadline, Instant::now().checked_add(timeout)) {
            (Some(existing), Some(candidate)) => Some(existing.min(candidate)),
            (existing, candidate) => existing.or(candidate),
        };
        OperationScope {
            deadline,
            cancelled: Arc::clone(&self.cancelled),
        }
    }
}

/// A single inventory entity (ad unit, zone, station, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    pub sizes: Vec<String>,
}

/// Result of an inventory sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    /// Display noun from the capability descriptor
    pub entity_label: String,
    pub items: Vec<InventoryItem>,
    /// Number of entities created or updated
    pub synced: usize,
}

/// An inventory profile resolved from the ad server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryProfile {
    pub profile_id: String,
    pub item_ids: Vec<String>,
    pub formats: Vec<String>,
}

/// Request to book a line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemRequest {
    pub order_id: String,
    pub name: String,
    pub pricing_model: PricingModel,
    pub rate: f64,
    pub budget: f64,
    #[serde(default)]
    pub geo: GeoTargeting,
    #[serde(default)]
    pub custom_targeting: std::collections::BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub inventory_ids: Vec<String>,
}

/// Lifecycle state of a booked line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineItemStatus {
    Active,
    PendingApproval,
    Draft,
}

/// Receipt for a booked line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemReceipt {
    pub line_item_id: String,
    pub order_id: String,
    pub status: LineItemStatus,
}

/// Request to push dynamically generated products to the ad server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductSyncRequest {
    pub product_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductSyncReport {
    pub synced: Vec<String>,
}

/// Request for delivery metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportRequest {
    pub line_item_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryRow {
    pub line_item_id: String,
    pub impressions: u64,
    pub clicks: u64,
    pub spend: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliveryReport {
    pub rows: Vec<DeliveryRow>,
}

/// Request to subscribe to ad-server notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookRequest {
    pub url: String,
    pub events: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookSubscription {
    pub subscription_id: String,
    pub url: String,
    pub events: Vec<String>,
}

/// Outbound operations against one ad server.
///
/// Implementations may block on network I/O and must observe `scope`:
/// poll `scope.is_cancelled()` and `scope.is_expired()` between steps and
/// return promptly once either holds. The adapter reports `TimedOut` or
/// `Cancelled` as soon as the scope ends, but it cannot stop the worker
/// thread; a client that ignores its scope keeps running in the background
/// until its call returns, and that late result is discarded.
///
/// Operations a backend does not implement keep the default, which fails
/// permanently.
pub trait BackendClient: Send + Sync {
    /// Pull the ad server's inventory.
    fn sync_inventory(&self, scope: &OperationScope) -> Result<InventorySnapshot, ClientError> {
        let _ = scope;
        Err(ClientError::Permanent("sync_inventory not implemented".to_string()))
    }

    fn fetch_inventory_profile(
        &self,
        profile_id: &str,
        scope: &OperationScope,
    ) -> Result<InventoryProfile, ClientError> {
        let _ = (profile_id, scope);
        Err(ClientError::Permanent(
            "fetch_inventory_profile not implemented".to_string(),
        ))
    }

    fn create_line_item(
        &self,
        request: &LineItemRequest,
        scope: &OperationScope,
    ) -> Result<LineItemReceipt, ClientError> {
        let _ = (request, scope);
        Err(ClientError::Permanent("create_line_item not implemented".to_string()))
    }

    fn sync_products(
        &self,
        request: &ProductSyncRequest,
        scope: &OperationScope,
    ) -> Result<ProductSyncReport, ClientError> {
        let _ = (request, scope);
        Err(ClientError::Permanent("sync_products not implemented".to_string()))
    }

    fn report_metrics(
        &self,
        request: &ReportRequest,
        scope: &OperationScope,
    ) -> Result<DeliveryReport, ClientError> {
        let _ = (request, scope);
        Err(ClientError::Permanent("report_metrics not implemented".to_string()))
    }

    fn register_webhook(
        &self,
        request: &WebhookRequest,
        scope: &OperationScope,
    ) -> Result<WebhookSubscription, ClientError> {
        let _ = (request, scope);
        Err(ClientError::Permanent("register_webhook not implemented".to_string()))
    }
}
