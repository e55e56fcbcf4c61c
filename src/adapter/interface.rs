//! Capability-gated adapter interface.
//!
//! An [`Adapter`] is bound to one backend, one validated connection config
//! and one principal. Every operation checks its capability gate first and
//! fails with `CapabilityNotSupported` before any client is touched. In dry
//! run mode the client is never built and every operation returns a
//! simulated value of the same type.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::adapter::capabilities::{AdapterCapabilities, BackendId, Capability};
use crate::adapter::error::{AdapterError, UpstreamKind};
use crate::adapter::registry::{AdapterRegistration, ConnectOptions};
use crate::adapter::schema::SchemaKind;
use crate::adapter::trait_def::{
    BackendClient, ClientError, DeliveryReport, DeliveryRow, InventoryProfile, InventorySnapshot,
    LineItemReceipt, LineItemRequest, LineItemStatus, OperationScope, Principal,
    ProductSyncReport, ProductSyncRequest, ReportRequest, WebhookRequest, WebhookSubscription,
};
use crate::adapter::validated::ValidatedConfig;

/// How often a waiting call re-checks cancellation.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// The fixed operation set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    SyncInventory,
    FetchInventoryProfile,
    CreateLineItem,
    SyncProducts,
    ReportMetrics,
    RegisterWebhook,
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Operation::SyncInventory,
        Operation::FetchInventoryProfile,
        Operation::CreateLineItem,
        Operation::SyncProducts,
        Operation::ReportMetrics,
        Operation::RegisterWebhook,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::SyncInventory => "sync_inventory",
            Operation::FetchInventoryProfile => "fetch_inventory_profile",
            Operation::CreateLineItem => "create_line_item",
            Operation::SyncProducts => "sync_products",
            Operation::ReportMetrics => "report_metrics",
            Operation::RegisterWebhook => "register_webhook",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown operation '{}'", s))
    }
}

/// What a dry-run call would have sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedAction {
    pub backend: BackendId,
    pub operation: Operation,
    pub principal: Principal,
    pub summary: String,
}

/// How an operation's value was produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Execution {
    Executed,
    Simulated { action: PlannedAction },
}

/// Result of a gated operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome<T> {
    pub value: T,
    pub execution: Execution,
}

impl<T> Outcome<T> {
    fn executed(value: T) -> Self {
        Outcome {
            value,
            execution: Execution::Executed,
        }
    }

    pub fn is_simulated(&self) -> bool {
        matches!(self.execution, Execution::Simulated { .. })
    }

    /// The recorded action, for simulated outcomes.
    pub fn planned_action(&self) -> Option<&PlannedAction> {
        match &self.execution {
            Execution::Simulated { action } => Some(action),
            Execution::Executed => None,
        }
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// Runtime adapter bound to one (backend, connection config, principal).
pub struct Adapter {
    backend: BackendId,
    capabilities: Arc<AdapterCapabilities>,
    config: ValidatedConfig,
    principal: Principal,
    dry_run: bool,
    default_timeout: Option<Duration>,
    client: Option<Arc<dyn BackendClient>>,
}

impl std::fmt::Debug for Adapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Adapter")
            .field("backend", &self.backend)
            .field("principal", &self.principal)
            .field("dry_run", &self.dry_run)
            .field("default_timeout", &self.default_timeout)
            .field("has_client", &self.client.is_some())
            .finish()
    }
}

impl Adapter {
    /// Build an adapter from a registration and a validated connection config.
    ///
    /// Outside dry run the registration's constructor builds the client; a
    /// failing constructor yields `ClientUnavailable`.
    pub(crate) fn new(
        registration: &AdapterRegistration,
        config: ValidatedConfig,
        principal: Principal,
        options: &ConnectOptions,
    ) -> Result<Self, AdapterError> {
        if config.backend() != registration.id() || config.kind() != SchemaKind::Connection {
            return Err(AdapterError::ConfigMismatch {
                expected_backend: registration.id().clone(),
                expected_kind: SchemaKind::Connection,
                found_backend: config.backend().clone(),
                found_kind: config.kind(),
            });
        }

        let client = if options.dry_run {
            None
        } else {
            let client = registration.constructor().build(&config).map_err(|e| {
                AdapterError::ClientUnavailable {
                    backend: registration.id().clone(),
                    reason: format!("{:#}", e),
                }
            })?;
            Some(client)
        };

        tracing::debug!(
            "Adapter for {} bound to {}{}",
            registration.id(),
            principal,
            if options.dry_run { " (dry-run)" } else { "" }
        );

        Ok(Adapter {
            backend: registration.id().clone(),
            capabilities: Arc::clone(registration.capabilities()),
            config,
            principal,
            dry_run: options.dry_run,
            default_timeout: options.timeout,
            client,
        })
    }

    pub fn backend(&self) -> &BackendId {
        &self.backend
    }

    pub fn capabilities(&self) -> &AdapterCapabilities {
        &self.capabilities
    }

    pub fn config(&self) -> &ValidatedConfig {
        &self.config
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn manual_approval_required(&self) -> bool {
        self.config.manual_approval_required()
    }

    /// Pull inventory from the ad server.
    pub fn sync_inventory(
        &self,
        scope: &OperationScope,
    ) -> Result<Outcome<InventorySnapshot>, AdapterError> {
        let op = Operation::SyncInventory;
        self.require(op, Capability::InventorySync, None)?;

        if self.dry_run {
            let label = self.capabilities.inventory_entity_label.clone();
            let summary = format!("sync {} from {}", label, self.backend);
            let value = InventorySnapshot {
                entity_label: label,
                items: Vec::new(),
                synced: 0,
            };
            return Ok(self.simulate(op, summary, value));
        }

        self.dispatch(op, scope, |client, scope| client.sync_inventory(scope))
            .map(Outcome::executed)
    }

    /// Resolve one inventory profile.
    pub fn fetch_inventory_profile(
        &self,
        profile_id: &str,
        scope: &OperationScope,
    ) -> Result<Outcome<InventoryProfile>, AdapterError> {
        let op = Operation::FetchInventoryProfile;
        self.require(op, Capability::InventoryProfiles, None)?;

        if self.dry_run {
            let value = InventoryProfile {
                profile_id: profile_id.to_string(),
                item_ids: Vec::new(),
                formats: Vec::new(),
            };
            return Ok(self.simulate(
                op,
                format!("fetch inventory profile '{}'", profile_id),
                value,
            ));
        }

        let profile_id = profile_id.to_string();
        self.dispatch(op, scope, move |client, scope| {
            client.fetch_inventory_profile(&profile_id, scope)
        })
        .map(Outcome::executed)
    }

    /// Book a line item.
    ///
    /// The pricing model must be supported, custom targeting needs custom
    /// targeting support, and geo targeting needs geo support plus support
    /// for every metro and postal system named in the request.
    pub fn create_line_item(
        &self,
        request: &LineItemRequest,
        scope: &OperationScope,
    ) -> Result<Outcome<LineItemReceipt>, AdapterError> {
        let op = Operation::CreateLineItem;
        self.check_line_item(request)?;

        if self.dry_run {
            let value = LineItemReceipt {
                line_item_id: format!("dry-run-{}", request.order_id),
                order_id: request.order_id.clone(),
                status: LineItemStatus::Draft,
            };
            let summary = format!(
                "create line item '{}' on order {} at {} {} (budget {})",
                request.name, request.order_id, request.rate, request.pricing_model, request.budget
            );
            return Ok(self.simulate(op, summary, value));
        }

        let request = request.clone();
        self.dispatch(op, scope, move |client, scope| {
            client.create_line_item(&request, scope)
        })
        .map(Outcome::executed)
    }

    /// Push dynamically generated products to the ad server.
    pub fn sync_products(
        &self,
        request: &ProductSyncRequest,
        scope: &OperationScope,
    ) -> Result<Outcome<ProductSyncReport>, AdapterError> {
        let op = Operation::SyncProducts;
        self.require(op, Capability::DynamicProducts, None)?;

        if self.dry_run {
            let summary = format!("sync {} product(s)", request.product_ids.len());
            return Ok(self.simulate(op, summary, ProductSyncReport::default()));
        }

        let request = request.clone();
        self.dispatch(op, scope, move |client, scope| {
            client.sync_products(&request, scope)
        })
        .map(Outcome::executed)
    }

    /// Fetch realtime delivery metrics.
    pub fn report_metrics(
        &self,
        request: &ReportRequest,
        scope: &OperationScope,
    ) -> Result<Outcome<DeliveryReport>, AdapterError> {
        let op = Operation::ReportMetrics;
        self.require(op, Capability::RealtimeReporting, None)?;

        if self.dry_run {
            let rows = request
                .line_item_ids
                .iter()
                .map(|id| DeliveryRow {
                    line_item_id: id.clone(),
                    impressions: 0,
                    clicks: 0,
                    spend: 0.0,
                })
                .collect();
            let summary = format!(
                "report metrics for {} line item(s)",
                request.line_item_ids.len()
            );
            return Ok(self.simulate(op, summary, DeliveryReport { rows }));
        }

        let request = request.clone();
        self.dispatch(op, scope, move |client, scope| {
            client.report_metrics(&request, scope)
        })
        .map(Outcome::executed)
    }

    /// Subscribe to ad-server notifications.
    pub fn register_webhook(
        &self,
        request: &WebhookRequest,
        scope: &OperationScope,
    ) -> Result<Outcome<WebhookSubscription>, AdapterError> {
        let op = Operation::RegisterWebhook;
        self.require(op, Capability::Webhooks, None)?;

        if self.dry_run {
            let value = WebhookSubscription {
                subscription_id: "dry-run-subscription".to_string(),
                url: request.url.clone(),
                events: request.events.clone(),
            };
            return Ok(self.simulate(op, format!("register webhook {}", request.url), value));
        }

        let request = request.clone();
        self.dispatch(op, scope, move |client, scope| {
            client.register_webhook(&request, scope)
        })
        .map(Outcome::executed)
    }

    fn check_line_item(&self, request: &LineItemRequest) -> Result<(), AdapterError> {
        let op = Operation::CreateLineItem;
        let caps = &self.capabilities;

        if !caps.supports_pricing_model(request.pricing_model) {
            let supported: Vec<&str> = caps
                .supported_pricing_models
                .iter()
                .map(|m| m.as_str())
                .collect();
            let detail = if supported.is_empty() {
                "supported pricing models: none".to_string()
            } else {
                format!("supported pricing models: {}", supported.join(", "))
            };
            self.require(op, Capability::PricingModel(request.pricing_model), Some(detail))?;
        }

        if !request.custom_targeting.is_empty() {
            self.require(op, Capability::CustomTargeting, None)?;
        }

        let geo = &request.geo;
        if !geo.is_empty() {
            self.require(op, Capability::GeoTargeting, None)?;

            if !geo.countries.is_empty() && !caps.targeting.geo_countries {
                self.reject(
                    op,
                    Capability::GeoTargeting,
                    Some("country targeting is not supported".to_string()),
                )?;
            }
            if !geo.regions.is_empty() && !caps.targeting.geo_regions {
                self.reject(
                    op,
                    Capability::GeoTargeting,
                    Some("region targeting is not supported".to_string()),
                )?;
            }

            let problems = caps.targeting.validate_geo_systems(geo);
            if let Some(first) = problems.first() {
                let detail = problems
                    .iter()
                    .map(|p| p.to_string())
                    .collect::<Vec<_>>()
                    .join("; ");
                self.reject(op, Capability::GeoSystem(first.system.clone()), Some(detail))?;
            }
        }

        Ok(())
    }

    fn require(
        &self,
        op: Operation,
        capability: Capability,
        detail: Option<String>,
    ) -> Result<(), AdapterError> {
        if self.capabilities.supports(&capability) {
            return Ok(());
        }
        self.reject(op, capability, detail)
    }

    fn reject(
        &self,
        op: Operation,
        capability: Capability,
        detail: Option<String>,
    ) -> Result<(), AdapterError> {
        tracing::debug!(
            "Rejected {} on {}: {} not supported",
            op,
            self.backend,
            capability
        );
        Err(AdapterError::CapabilityNotSupported {
            backend: self.backend.clone(),
            operation: op.to_string(),
            capability,
            detail,
        })
    }

    fn simulate<T>(&self, op: Operation, summary: String, value: T) -> Outcome<T> {
        tracing::info!(
            "(dry-run) {} {} for {}: {}",
            self.backend,
            op,
            self.principal,
            summary
        );
        Outcome {
            value,
            execution: Execution::Simulated {
                action: PlannedAction {
                    backend: self.backend.clone(),
                    operation: op,
                    principal: self.principal.clone(),
                    summary,
                },
            },
        }
    }

    /// Run a client call on a worker thread, honoring the scope.
    ///
    /// A result that arrives after the deadline or cancellation is dropped.
    fn dispatch<T, F>(
        &self,
        op: Operation,
        scope: &OperationScope,
        call: F,
    ) -> Result<T, AdapterError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn BackendClient, &OperationScope) -> Result<T, ClientError> + Send + 'static,
    {
        let started = Instant::now();
        if scope.is_cancelled() {
            return Err(self.cancelled(op));
        }

        let scope = match self.default_timeout {
            Some(timeout) => scope.tightened(timeout),
            None => scope.clone(),
        };
        if scope.is_expired() {
            return Err(self.timed_out(op, started.elapsed()));
        }

        let client = self
            .client
            .as_ref()
            .map(Arc::clone)
            .ok_or_else(|| AdapterError::ClientUnavailable {
                backend: self.backend.clone(),
                reason: "adapter was built without a client".to_string(),
            })?;

        tracing::debug!("Dispatching {} to {}", op, self.backend);

        let (tx, rx) = mpsc::channel();
        let worker_scope = scope.clone();
        thread::Builder::new()
            .name(format!("adapterkit-{}", op))
            .spawn(move || {
                let result = call(client.as_ref(), &worker_scope);
                // The receiver is gone if the caller already gave up.
                let _ = tx.send(result);
            })
            .map_err(|e| AdapterError::Upstream {
                backend: self.backend.clone(),
                operation: op.to_string(),
                kind: UpstreamKind::Transient,
                message: format!("failed to start worker: {}", e),
            })?;

        loop {
            if scope.is_cancelled() {
                return Err(self.cancelled(op));
            }

            let wait = match scope.remaining() {
                Some(remaining) if remaining.is_zero() => {
                    return Err(self.timed_out(op, started.elapsed()));
                }
                Some(remaining) => remaining.min(POLL_INTERVAL),
                None => POLL_INTERVAL,
            };

            match rx.recv_timeout(wait) {
                Ok(result) => {
                    return result.map_err(|e| self.client_error(op, e, started.elapsed()));
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(self.client_error(
                        op,
                        ClientError::Permanent("client worker exited without a result".to_string()),
                        started.elapsed(),
                    ));
                }
            }
        }
    }

    fn client_error(&self, op: Operation, error: ClientError, elapsed: Duration) -> AdapterError {
        match error {
            ClientError::TimedOut => self.timed_out(op, elapsed),
            ClientError::Cancelled => self.cancelled(op),
            ClientError::Transient(message) => self.upstream(op, UpstreamKind::Transient, message),
            ClientError::Permanent(message) => self.upstream(op, UpstreamKind::Permanent, message),
        }
    }

    fn upstream(&self, op: Operation, kind: UpstreamKind, message: String) -> AdapterError {
        tracing::warn!("{} {} failed ({}): {}", self.backend, op, kind, message);
        AdapterError::Upstream {
            backend: self.backend.clone(),
            operation: op.to_string(),
            kind,
            message,
        }
    }

    fn timed_out(&self, op: Operation, after: Duration) -> AdapterError {
        tracing::warn!("{} {} timed out after {:?}", self.backend, op, after);
        AdapterError::TimedOut {
            backend: self.backend.clone(),
            operation: op.to_string(),
            after,
        }
    }

    fn cancelled(&self, op: Operation) -> AdapterError {
        tracing::debug!("{} {} cancelled", self.backend, op);
        AdapterError::Cancelled {
            backend: self.backend.clone(),
            operation: op.to_string(),
        }
    }
}
