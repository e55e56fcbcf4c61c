//! Google Ad Manager declarations.
//!
//! The richest profile of the built-in backends: inventory sync and
//! profiles over ad units and placements, custom key-value targeting,
//! dynamic products and realtime reporting.

use crate::adapter::capabilities::{AdapterCapabilities, MetroSystem, PostalSystem, PricingModel};
use crate::adapter::schema::{ConfigSchema, FieldSpec, SchemaDeclaration};

pub const ID: &str = "google_ad_manager";
pub const ALIAS: &str = "gam";

const DEFAULT_ORDER_NAME_TEMPLATE: &str = "AdCP-{po_number}-{product_name}-{timestamp}";

pub fn schemas() -> SchemaDeclaration {
    let connection = ConfigSchema::connection("GoogleAdManagerConnectionConfig")
        .field(
            FieldSpec::string("network_code")
                .required()
                .pattern(r"^\d+$")
                .order(1)
                .describe("GAM network code"),
        )
        .field(
            FieldSpec::enumeration("auth_method", &["oauth", "service_account"])
                .default_value("oauth")
                .order(2)
                .describe("Authentication method"),
        )
        .field(FieldSpec::string("refresh_token").secret().order(3))
        .field(
            FieldSpec::string("service_account_json")
                .secret()
                .component("textarea")
                .order(4),
        )
        .field(FieldSpec::string("service_account_email").order(5))
        .field(
            FieldSpec::string("network_currency")
                .pattern("^[A-Z]{3}$")
                .order(6)
                .describe("ISO 4217 currency of the network"),
        )
        .field(FieldSpec::string_list("secondary_currencies").order(7))
        .field(FieldSpec::string("network_timezone").order(8))
        .field(
            FieldSpec::string("trafficker_id")
                .order(9)
                .describe("User id recorded as trafficker on new orders"),
        )
        .field(FieldSpec::string("order_name_template").order(10))
        .field(FieldSpec::string("line_item_name_template").order(11));

    let product = ConfigSchema::new("GoogleAdManagerProductConfig")
        .field(
            FieldSpec::string_list("targeted_ad_unit_ids")
                .default_value(Vec::<String>::new())
                .component("ad_unit_selector"),
        )
        .field(
            FieldSpec::string_list("targeted_placement_ids")
                .default_value(Vec::<String>::new())
                .component("placement_selector"),
        )
        .field(FieldSpec::boolean("include_descendants").default_value(true))
        .field(FieldSpec::string("order_name_template").default_value(DEFAULT_ORDER_NAME_TEMPLATE))
        .field(
            FieldSpec::enumeration(
                "creative_rotation_type",
                &["EVEN", "OPTIMIZED", "MANUAL", "SEQUENTIAL"],
            )
            .default_value("EVEN"),
        )
        .field(
            FieldSpec::enumeration(
                "delivery_rate_type",
                &["EVENLY", "FRONTLOADED", "AS_FAST_AS_POSSIBLE"],
            )
            .default_value("EVENLY"),
        )
        .field(FieldSpec::boolean("allow_overbook").default_value(false));

    let inventory = ConfigSchema::new("GoogleAdManagerInventoryConfig")
        .field(FieldSpec::string_list("ad_unit_ids").default_value(Vec::<String>::new()))
        .field(FieldSpec::string_list("placement_ids").default_value(Vec::<String>::new()))
        .field(
            FieldSpec::string_list("custom_targeting_keys")
                .default_value(Vec::<String>::new())
                .describe("Key-value keys exposed to buyers"),
        );

    SchemaDeclaration::new(connection)
        .with_product(product)
        .with_inventory(inventory)
}

pub fn capabilities() -> AdapterCapabilities {
    AdapterCapabilities::builder()
        .inventory(true, true, "Ad Units & Placements")
        .custom_targeting(true)
        .geo_targeting(true, true)
        .metro_systems(&[MetroSystem::NielsenDma])
        .postal_systems(&[PostalSystem::UsZip, PostalSystem::UsZipPlusFour])
        .dynamic_products(true)
        .pricing_models(&[
            PricingModel::Cpm,
            PricingModel::Vcpm,
            PricingModel::Cpc,
            PricingModel::FlatRate,
        ])
        .realtime_reporting(true)
        .build()
}
