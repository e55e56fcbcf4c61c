//! Broadstreet declarations.
//!
//! Broadstreet sells display placements by zone. Products pick zones either
//! by id (`targeted_zone_ids`) or with per-zone creative requirements
//! (`zone_targeting`).

use crate::adapter::capabilities::{AdapterCapabilities, PricingModel};
use crate::adapter::schema::{ConfigSchema, FieldSpec, SchemaDeclaration};

pub const ID: &str = "broadstreet";

fn creative_size() -> ConfigSchema {
    ConfigSchema::new("CreativeSize")
        .field(
            FieldSpec::integer("width")
                .required()
                .range(Some(1.0), None)
                .describe("Creative width in pixels"),
        )
        .field(
            FieldSpec::integer("height")
                .required()
                .range(Some(1.0), None)
                .describe("Creative height in pixels"),
        )
        .field(
            FieldSpec::integer("expected_count")
                .default_value(1)
                .range(Some(1.0), None)
                .describe("Number of creatives expected for this size"),
        )
}

fn zone_targeting() -> ConfigSchema {
    ConfigSchema::new("ZoneTargeting")
        .field(FieldSpec::string("zone_id").required().describe("Broadstreet zone ID"))
        .field(FieldSpec::string("zone_name"))
        .field(FieldSpec::object_list("sizes", creative_size()))
        .field(FieldSpec::enumeration("position", &["above_fold", "below_fold"]))
}

pub fn schemas() -> SchemaDeclaration {
    let connection = ConfigSchema::connection("BroadstreetConnectionConfig")
        .field(
            FieldSpec::string("network_id")
                .required()
                .order(1)
                .describe("Broadstreet network ID"),
        )
        .field(
            FieldSpec::string("api_key")
                .required()
                .secret()
                .order(2)
                .describe("Broadstreet API key"),
        )
        .field(
            FieldSpec::string("default_advertiser_id")
                .order(3)
                .describe("Advertiser used when the buyer has no mapping"),
        );

    let product = ConfigSchema::new("BroadstreetProductConfig")
        .field(
            FieldSpec::string_list("targeted_zone_ids")
                .default_value(Vec::<String>::new())
                .component("zone_selector")
                .order(1),
        )
        .field(FieldSpec::object_list("zone_targeting", zone_targeting()).order(2))
        .field(
            FieldSpec::enumeration("cost_type", &["CPM", "FLAT_RATE"])
                .default_value("CPM")
                .order(3),
        )
        .field(
            FieldSpec::enumeration("delivery_rate", &["EVEN", "FRONTLOADED", "ASAP"])
                .default_value("EVEN")
                .order(4),
        )
        .field(
            FieldSpec::integer("frequency_cap")
                .range(Some(1.0), None)
                .order(5)
                .describe("Maximum impressions per user per day"),
        )
        .field(
            FieldSpec::enumeration("ad_format", &["display", "html", "text"])
                .default_value("display")
                .order(6),
        )
        .field(FieldSpec::boolean("allow_html_creatives").default_value(true).order(7))
        .field(FieldSpec::boolean("allow_text_creatives").default_value(true).order(8));

    SchemaDeclaration::new(connection).with_product(product)
}

pub fn capabilities() -> AdapterCapabilities {
    AdapterCapabilities::builder()
        .inventory(true, true, "Zones")
        .geo_targeting(true, false)
        .pricing_models(&[PricingModel::Cpm, PricingModel::FlatRate])
        .realtime_reporting(true)
        .build()
}
