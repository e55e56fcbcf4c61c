//! Mock backend - an in-process ad server for development and tests.
//!
//! The client never leaves the process. Line-item ids come from a counter,
//! and delivery numbers are derived from the product defaults below scaled
//! by the connection's `scenario`.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};

use crate::adapter::capabilities::{AdapterCapabilities, PricingModel};
use crate::adapter::registry::AdapterConstructor;
use crate::adapter::schema::{ConfigSchema, FieldSpec, SchemaDeclaration};
use crate::adapter::trait_def::{
    BackendClient, ClientError, DeliveryReport, DeliveryRow, InventoryItem, InventorySnapshot,
    LineItemReceipt, LineItemRequest, LineItemStatus, OperationScope, ReportRequest,
};
use crate::adapter::validated::ValidatedConfig;

pub const ID: &str = "mock";

pub const DEFAULT_DAILY_IMPRESSIONS: i64 = 10_000;
pub const DEFAULT_FILL_RATE: f64 = 0.85;
pub const DEFAULT_CTR: f64 = 0.02;
pub const DEFAULT_VIEWABILITY: f64 = 0.65;

const MAX_LATENCY_MS: f64 = 60_000.0;
const TICK: Duration = Duration::from_millis(5);

/// Simulated ad-server condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    Normal,
    HighDemand,
    Degraded,
    Outage,
}

impl Scenario {
    pub const NAMES: [&'static str; 4] = ["normal", "high_demand", "degraded", "outage"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::Normal => "normal",
            Scenario::HighDemand => "high_demand",
            Scenario::Degraded => "degraded",
            Scenario::Outage => "outage",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "normal" => Some(Scenario::Normal),
            "high_demand" => Some(Scenario::HighDemand),
            "degraded" => Some(Scenario::Degraded),
            "outage" => Some(Scenario::Outage),
            _ => None,
        }
    }

    /// Share of requested impressions that get served.
    pub fn fill_rate(&self) -> f64 {
        match self {
            Scenario::Normal => DEFAULT_FILL_RATE,
            Scenario::HighDemand => 0.98,
            Scenario::Degraded => 0.4,
            Scenario::Outage => 0.0,
        }
    }
}

/// Schemas of the mock backend.
pub fn schemas() -> SchemaDeclaration {
    let connection = ConfigSchema::connection("MockConnectionConfig")
        .field(
            FieldSpec::string("api_key")
                .required()
                .secret()
                .order(1)
                .describe("Any non-empty key; the mock server does not check it"),
        )
        .field(
            FieldSpec::enumeration("scenario", &Scenario::NAMES)
                .default_value("normal")
                .order(2)
                .describe("Simulated ad-server condition"),
        )
        .field(
            FieldSpec::integer("latency_ms")
                .default_value(0)
                .range(Some(0.0), Some(MAX_LATENCY_MS))
                .order(3)
                .describe("Artificial latency added to every call"),
        );

    let product = ConfigSchema::new("MockProductConfig")
        .field(
            FieldSpec::integer("daily_impressions")
                .default_value(DEFAULT_DAILY_IMPRESSIONS)
                .range(Some(0.0), None)
                .describe("Impressions available per day"),
        )
        .field(
            FieldSpec::number("fill_rate")
                .default_value(DEFAULT_FILL_RATE)
                .range(Some(0.0), Some(1.0)),
        )
        .field(
            FieldSpec::number("ctr")
                .default_value(DEFAULT_CTR)
                .range(Some(0.0), Some(1.0))
                .describe("Click-through rate"),
        )
        .field(
            FieldSpec::number("viewability")
                .default_value(DEFAULT_VIEWABILITY)
                .range(Some(0.0), Some(1.0)),
        );

    SchemaDeclaration::new(connection).with_product(product)
}

/// Capabilities of the mock backend: geo targeting and every pricing model.
pub fn capabilities() -> AdapterCapabilities {
    AdapterCapabilities::builder()
        .inventory(false, false, "Mock Items")
        .geo_targeting(true, false)
        .pricing_models(&PricingModel::ALL)
        .build()
}

/// Constructor building a [`MockClient`] from the connection config.
pub fn constructor() -> AdapterConstructor {
    AdapterConstructor::new(|config| {
        let client: Arc<dyn BackendClient> = Arc::new(MockClient::from_config(config)?);
        Ok(client)
    })
}

#[derive(Debug, Clone, Copy)]
struct Booking {
    pricing_model: PricingModel,
    rate: f64,
}

/// In-process client for the mock backend.
#[derive(Debug)]
pub struct MockClient {
    scenario: Scenario,
    latency: Duration,
    manual_approval: bool,
    next_id: AtomicU64,
    bookings: Mutex<BTreeMap<String, Booking>>,
}

impl MockClient {
    pub fn new(scenario: Scenario, latency: Duration) -> Self {
        MockClient {
            scenario,
            latency,
            manual_approval: false,
            next_id: AtomicU64::new(1),
            bookings: Mutex::new(BTreeMap::new()),
        }
    }

    /// Build a client from a validated mock connection config.
    pub fn from_config(config: &ValidatedConfig) -> Result<Self> {
        if config.get_str("api_key").map_or(true, |key| key.trim().is_empty()) {
            bail!("mock connection needs a non-empty api_key");
        }

        let raw = config.get_str("scenario").unwrap_or("normal");
        let scenario = match Scenario::parse(raw) {
            Some(scenario) => scenario,
            None => bail!("unknown mock scenario '{}'", raw),
        };
        let latency_ms = config.get_i64("latency_ms").unwrap_or(0).max(0) as u64;

        let mut client = MockClient::new(scenario, Duration::from_millis(latency_ms));
        client.manual_approval = config.manual_approval_required();
        Ok(client)
    }

    pub fn scenario(&self) -> Scenario {
        self.scenario
    }

    /// Apply the configured latency and scenario before answering.
    fn serve(&self, scope: &OperationScope) -> Result<(), ClientError> {
        let until = Instant::now() + self.latency;
        while Instant::now() < until {
            if scope.is_cancelled() {
                return Err(ClientError::Cancelled);
            }
            if scope.is_expired() {
                return Err(ClientError::TimedOut);
            }
            thread::sleep(TICK);
        }

        if self.scenario == Scenario::Outage {
            return Err(ClientError::Transient(
                "mock ad server is unavailable (scenario: outage)".to_string(),
            ));
        }
        Ok(())
    }

    fn delivery(&self, line_item_id: &str, booking: Booking) -> DeliveryRow {
        let impressions = (DEFAULT_DAILY_IMPRESSIONS as f64 * self.scenario.fill_rate()).round();
        let clicks = (impressions * DEFAULT_CTR).round();
        let spend = match booking.pricing_model {
            PricingModel::FlatRate => booking.rate,
            PricingModel::Cpc => clicks * booking.rate,
            PricingModel::Vcpm => impressions * DEFAULT_VIEWABILITY / 1000.0 * booking.rate,
            _ => impressions / 1000.0 * booking.rate,
        };

        DeliveryRow {
            line_item_id: line_item_id.to_string(),
            impressions: impressions as u64,
            clicks: clicks as u64,
            spend,
        }
    }
}

impl BackendClient for MockClient {
    fn sync_inventory(&self, scope: &OperationScope) -> Result<InventorySnapshot, ClientError> {
        self.serve(scope)?;

        let items: Vec<InventoryItem> = (1..=3)
            .map(|n| InventoryItem {
                id: format!("mock-item-{}", n),
                name: format!("Mock Item {}", n),
                sizes: vec!["300x250".to_string(), "728x90".to_string()],
            })
            .collect();

        Ok(InventorySnapshot {
            entity_label: "Mock Items".to_string(),
            synced: items.len(),
            items,
        })
    }

    fn create_line_item(
        &self,
        request: &LineItemRequest,
        scope: &OperationScope,
    ) -> Result<LineItemReceipt, ClientError> {
        self.serve(scope)?;

        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let line_item_id = format!("mock-li-{:06}", n);
        self.bookings
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(
                line_item_id.clone(),
                Booking {
                    pricing_model: request.pricing_model,
                    rate: request.rate,
                },
            );

        let status = if self.manual_approval {
            LineItemStatus::PendingApproval
        } else {
            LineItemStatus::Active
        };

        Ok(LineItemReceipt {
            line_item_id,
            order_id: request.order_id.clone(),
            status,
        })
    }

    fn report_metrics(
        &self,
        request: &ReportRequest,
        scope: &OperationScope,
    ) -> Result<DeliveryReport, ClientError> {
        self.serve(scope)?;

        let bookings = self
            .bookings
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut rows = Vec::with_capacity(request.line_item_ids.len());
        for id in &request.line_item_ids {
            match bookings.get(id) {
                Some(booking) => rows.push(self.delivery(id, *booking)),
                None => {
                    return Err(ClientError::Permanent(format!("unknown line item '{}'", id)));
                }
            }
        }
        Ok(DeliveryReport { rows })
    }
}
