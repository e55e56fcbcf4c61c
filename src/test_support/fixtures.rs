//! Test fixtures for common test scenarios.
//!
//! A small "fixture" backend with one schema of each shape (secret string,
//! enum, nested object, nested object list) and a capability profile that leaves some
//! gates closed, so both the accepted and rejected paths can be exercised.

use crate::adapter::capabilities::{
    AdapterCapabilities, GeoTargeting, MetroSystem, PostalSystem, PricingModel,
};
use crate::adapter::registry::{AdapterConstructor, AdapterRegistry, RegistryBuilder};
use crate::adapter::schema::{ConfigSchema, FieldSpec, SchemaDeclaration};
use crate::adapter::trait_def::LineItemRequest;

use super::RecordingClient;

/// Schemas of the fixture backend.
pub fn fixture_schemas() -> SchemaDeclaration {
    let slot = ConfigSchema::new("Slot")
        .field(FieldSpec::string("slot_id").required())
        .field(FieldSpec::integer("width").range(Some(1.0), None));
    let proxy = ConfigSchema::new("ProxyCredentials")
        .field(FieldSpec::string("user").required())
        .field(FieldSpec::string("password").required().secret())
        .field(
            FieldSpec::integer("port")
                .default_value(8080)
                .range(Some(1.0), Some(65535.0)),
        );

    SchemaDeclaration::new(
        ConfigSchema::connection("FixtureConnection")
            .field(FieldSpec::string("api_key").required().secret().describe("API key"))
            .field(FieldSpec::string("endpoint").default_value("https://ads.example.com"))
            .field(FieldSpec::object("proxy", proxy).describe("Outbound proxy")),
    )
    .with_product(
        ConfigSchema::new("FixtureProduct")
            .field(
                FieldSpec::enumeration("tier", &["standard", "premium"])
                    .default_value("standard"),
            )
            .field(FieldSpec::object_list("slots", slot)),
    )
    .with_inventory(ConfigSchema::new("FixtureInventory").field(FieldSpec::string("profile_id")))
}

/// Capabilities of the fixture backend.
///
/// Inventory sync, country geo targeting (nielsen_dma, us_zip) and
/// cpm/flat_rate pricing are open; everything else is closed.
pub fn fixture_capabilities() -> AdapterCapabilities {
    AdapterCapabilities::builder()
        .inventory(true, false, "Widgets")
        .geo_targeting(true, false)
        .metro_systems(&[MetroSystem::NielsenDma])
        .postal_systems(&[PostalSystem::UsZip])
        .pricing_models(&[PricingModel::Cpm, PricingModel::FlatRate])
        .build()
}

/// Register the fixture declaration under `id`.
pub fn register_fixture(builder: &mut RegistryBuilder, id: &str, constructor: AdapterConstructor) {
    builder
        .register(id, fixture_schemas(), fixture_capabilities(), constructor)
        .expect("fixture registration");
}

/// Frozen registry with the fixture backend wired to `client`.
pub fn fixture_registry(client: &RecordingClient) -> AdapterRegistry {
    let mut builder = RegistryBuilder::new();
    register_fixture(&mut builder, "fixture", client.constructor());
    builder.freeze()
}

/// A minimal line item request.
pub fn line_item(pricing_model: PricingModel) -> LineItemRequest {
    LineItemRequest {
        order_id: "order-1".to_string(),
        name: "Spring Campaign".to_string(),
        pricing_model,
        rate: 12.5,
        budget: 5000.0,
        geo: GeoTargeting::default(),
        custom_targeting: Default::default(),
        inventory_ids: Vec::new(),
    }
}
