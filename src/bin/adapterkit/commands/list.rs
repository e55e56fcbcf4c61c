//! `adapterkit list` command
//!
//! Lists registered backends with their aliases and capability summary.

use anyhow::Result;
use serde_json::json;

use crate::cli::ListArgs;
use adapterkit::adapter::{AdapterCapabilities, AdapterRegistry};

pub fn execute(args: ListArgs) -> Result<()> {
    let config = super::load_settings()?;
    let mode = super::configured_mode(&config)?;
    let registry = super::catalog(&config, mode)?;

    if args.json {
        print_json(&registry)
    } else {
        print_table(&registry);
        Ok(())
    }
}

fn print_json(registry: &AdapterRegistry) -> Result<()> {
    let mut entries = Vec::new();
    for id in registry.backends() {
        let registration = registry.resolve(id.as_str())?;
        let aliases: Vec<&str> = registry.aliases_of(id).into_iter().map(|a| a.as_str()).collect();
        entries.push(json!({
            "backend": id.as_str(),
            "aliases": aliases,
            "capabilities": registration.capabilities().to_flat_map(),
        }));
    }

    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}

fn print_table(registry: &AdapterRegistry) {
    println!("Registered backends ({} mode):", registry.mode());
    println!();

    for id in registry.backends() {
        let Ok(registration) = registry.resolve(id.as_str()) else {
            continue;
        };
        let caps = registration.capabilities();

        let aliases: Vec<&str> = registry.aliases_of(id).into_iter().map(|a| a.as_str()).collect();
        if aliases.is_empty() {
            println!("  {}", id);
        } else {
            println!("  {} (alias: {})", id, aliases.join(", "));
        }

        println!("    Inventory:  {}", inventory_summary(caps));
        println!("    Pricing:    {}", pricing_summary(caps));
        println!("    Features:   {}", feature_summary(caps));
        println!();
    }
}

fn inventory_summary(caps: &AdapterCapabilities) -> String {
    let mut modes = Vec::new();
    if caps.supports_inventory_sync {
        modes.push("sync");
    }
    if caps.supports_inventory_profiles {
        modes.push("profiles");
    }

    if modes.is_empty() {
        caps.inventory_entity_label.clone()
    } else {
        format!("{} ({})", caps.inventory_entity_label, modes.join(", "))
    }
}

fn pricing_summary(caps: &AdapterCapabilities) -> String {
    if caps.supported_pricing_models.is_empty() {
        return "none".to_string();
    }
    caps.supported_pricing_models
        .iter()
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn feature_summary(caps: &AdapterCapabilities) -> String {
    let flags = [
        (caps.supports_custom_targeting, "custom_targeting"),
        (caps.supports_geo_targeting, "geo_targeting"),
        (caps.supports_dynamic_products, "dynamic_products"),
        (caps.supports_webhooks, "webhooks"),
        (caps.supports_realtime_reporting, "realtime_reporting"),
    ];

    let enabled: Vec<&str> = flags
        .iter()
        .filter(|(on, _)| *on)
        .map(|(_, name)| *name)
        .collect();

    if enabled.is_empty() {
        "none".to_string()
    } else {
        enabled.join(", ")
    }
}
