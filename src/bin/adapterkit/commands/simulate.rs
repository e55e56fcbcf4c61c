//! `adapterkit simulate` command
//!
//! Connects to a backend in dry-run mode and runs one operation, printing
//! the planned action and the simulated result as JSON. Capability gates
//! apply exactly as they would for a real call. With `--live` the operation
//! is dispatched to the backend client, unless configuration forces dry run.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cli::SimulateArgs;
use adapterkit::adapter::trait_def::{
    LineItemRequest, ProductSyncRequest, ReportRequest, WebhookRequest,
};
use adapterkit::adapter::{
    Adapter, ConnectOptions, Operation, OperationScope, Outcome, Principal,
};

#[derive(Debug, Deserialize)]
struct ProfileRequest {
    profile_id: String,
}

pub fn execute(args: SimulateArgs) -> Result<()> {
    let config = super::load_settings()?;
    let mode = super::configured_mode(&config)?;
    let registry = super::catalog(&config, mode)?;

    let operation: Operation = args
        .operation
        .parse()
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    let connection = super::read_json(&args.config)?;
    let request = args
        .request
        .as_deref()
        .map(super::read_json)
        .transpose()?;

    let dry_run = !args.live || config.dry_run();
    if args.live && dry_run {
        tracing::warn!("`--live` ignored: dry run is forced by configuration");
    }

    let options = ConnectOptions {
        dry_run,
        timeout: config.timeout(),
        mode: Some(mode),
    };
    let adapter = registry.connect(
        &args.backend,
        &connection,
        Principal::new(args.principal),
        options,
    )?;

    let scope = OperationScope::new();
    let output = match operation {
        Operation::SyncInventory => render(adapter.sync_inventory(&scope)?)?,
        Operation::FetchInventoryProfile => {
            let body: ProfileRequest = parse_request(operation, request)?;
            render(adapter.fetch_inventory_profile(&body.profile_id, &scope)?)?
        }
        Operation::CreateLineItem => {
            let body: LineItemRequest = parse_request(operation, request)?;
            render(adapter.create_line_item(&body, &scope)?)?
        }
        Operation::SyncProducts => {
            let body: ProductSyncRequest = parse_or_default(operation, request)?;
            render(adapter.sync_products(&body, &scope)?)?
        }
        Operation::ReportMetrics => {
            let body: ReportRequest = parse_or_default(operation, request)?;
            render(adapter.report_metrics(&body, &scope)?)?
        }
        Operation::RegisterWebhook => {
            let body: WebhookRequest = parse_request(operation, request)?;
            render(adapter.register_webhook(&body, &scope)?)?
        }
    };

    log_connection(&adapter);
    println!("{}", output);
    Ok(())
}

fn parse_request<T: DeserializeOwned>(operation: Operation, request: Option<Value>) -> Result<T> {
    let body = request
        .with_context(|| format!("`{}` needs a request body (--request <file>)", operation))?;
    serde_json::from_value(body).with_context(|| format!("invalid `{}` request", operation))
}

fn parse_or_default<T: DeserializeOwned + Default>(
    operation: Operation,
    request: Option<Value>,
) -> Result<T> {
    match request {
        Some(_) => parse_request(operation, request),
        None => Ok(T::default()),
    }
}

fn render<T: Serialize>(outcome: Outcome<T>) -> Result<String> {
    Ok(serde_json::to_string_pretty(&outcome)?)
}

fn log_connection(adapter: &Adapter) {
    tracing::debug!(
        "Ran against {} (dry run: {}, schema {} v{}, manual approval: {})",
        adapter.backend(),
        adapter.is_dry_run(),
        adapter.config().schema_name(),
        adapter.config().schema_version(),
        adapter.manual_approval_required()
    );
}
