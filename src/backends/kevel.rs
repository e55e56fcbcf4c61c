//! Kevel declarations.

use crate::adapter::capabilities::{AdapterCapabilities, MetroSystem, PricingModel};
use crate::adapter::schema::{ConfigSchema, FieldSpec, SchemaDeclaration};

pub const ID: &str = "kevel";

pub fn schemas() -> SchemaDeclaration {
    let connection = ConfigSchema::connection("KevelConnectionConfig")
        .field(
            FieldSpec::string("network_id")
                .required()
                .pattern(r"^\d+$")
                .order(1)
                .describe("Kevel network id"),
        )
        .field(FieldSpec::string("api_key").required().secret().order(2));

    let product = ConfigSchema::new("KevelProductConfig")
        .field(FieldSpec::string_list("site_ids").default_value(Vec::<String>::new()))
        .field(
            FieldSpec::string_list("zone_ids")
                .default_value(Vec::<String>::new())
                .component("zone_selector"),
        )
        .field(
            FieldSpec::integer("priority_id")
                .range(Some(1.0), None)
                .describe("Flight priority"),
        );

    SchemaDeclaration::new(connection).with_product(product)
}

pub fn capabilities() -> AdapterCapabilities {
    AdapterCapabilities::builder()
        .inventory(false, false, "Sites")
        .custom_targeting(true)
        .geo_targeting(true, true)
        .metro_systems(&[MetroSystem::NielsenDma])
        .pricing_models(&[PricingModel::Cpm, PricingModel::Cpc, PricingModel::FlatRate])
        .webhooks(true)
        .build()
}
