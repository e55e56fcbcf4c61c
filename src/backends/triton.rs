//! Triton Digital declarations (audio stations).

use crate::adapter::capabilities::{AdapterCapabilities, PricingModel};
use crate::adapter::schema::{ConfigSchema, FieldSpec, SchemaDeclaration};

pub const ID: &str = "triton_digital";
pub const ALIAS: &str = "triton";

pub fn schemas() -> SchemaDeclaration {
    let connection = ConfigSchema::connection("TritonConnectionConfig")
        .field(FieldSpec::string("station_id").required().order(1))
        .field(FieldSpec::string("api_key").required().secret().order(2));

    let product = ConfigSchema::new("TritonProductConfig")
        .field(FieldSpec::string_list("station_ids").default_value(Vec::<String>::new()))
        .field(
            FieldSpec::enumeration("ad_format", &["audio", "companion_display"])
                .default_value("audio"),
        )
        .field(
            FieldSpec::integer("max_spot_seconds")
                .default_value(30)
                .range(Some(5.0), Some(120.0)),
        );

    SchemaDeclaration::new(connection).with_product(product)
}

pub fn capabilities() -> AdapterCapabilities {
    AdapterCapabilities::builder()
        .inventory(false, false, "Stations")
        .geo_targeting(true, false)
        .pricing_models(&[PricingModel::Cpm, PricingModel::FlatRate])
        .build()
}
