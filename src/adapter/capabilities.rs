//! Adapter capability types - fixed-shape facts about what a backend can do.
//!
//! Capabilities are declared once per backend at registration time and never
//! change afterwards. Every flag defaults to the conservative value (`false`
//! or empty) so a backend that declares nothing advertises nothing.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Stable identifier for a registered ad-server backend.
///
/// Identifiers are lowercase ASCII alphanumerics and underscores. Parsing
/// normalizes case, so `"GAM"` and `"gam"` name the same backend.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BackendId(String);

impl BackendId {
    /// Parse and normalize a backend identifier.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, BackendIdParseError> {
        let normalized = raw.as_ref().trim().to_ascii_lowercase();
        let valid = !normalized.is_empty()
            && normalized
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

        if valid {
            Ok(BackendId(normalized))
        } else {
            Err(BackendIdParseError(raw.as_ref().to_string()))
        }
    }

    /// Get the identifier as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BackendId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for BackendId {
    type Err = BackendIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BackendId::new(s)
    }
}

impl TryFrom<String> for BackendId {
    type Error = BackendIdParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        BackendId::new(value)
    }
}

impl From<BackendId> for String {
    fn from(id: BackendId) -> Self {
        id.0
    }
}

/// Error returned when parsing an invalid backend ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendIdParseError(pub String);

impl std::fmt::Display for BackendIdParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid backend ID '{}', expected lowercase letters, digits and '_'",
            self.0
        )
    }
}

impl std::error::Error for BackendIdParseError {}

/// Pricing models a backend can book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingModel {
    /// Cost per thousand impressions
    Cpm,
    /// Cost per thousand viewable impressions
    Vcpm,
    /// Cost per click
    Cpc,
    /// Cost per completed view
    Cpcv,
    /// Cost per point
    Cpp,
    /// Cost per view
    Cpv,
    /// Fixed price for the flight
    FlatRate,
}

impl PricingModel {
    /// All pricing models, in declaration order.
    pub const ALL: [PricingModel; 7] = [
        PricingModel::Cpm,
        PricingModel::Vcpm,
        PricingModel::Cpc,
        PricingModel::Cpcv,
        PricingModel::Cpp,
        PricingModel::Cpv,
        PricingModel::FlatRate,
    ];

    /// Get the pricing model name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PricingModel::Cpm => "cpm",
            PricingModel::Vcpm => "vcpm",
            PricingModel::Cpc => "cpc",
            PricingModel::Cpcv => "cpcv",
            PricingModel::Cpp => "cpp",
            PricingModel::Cpv => "cpv",
            PricingModel::FlatRate => "flat_rate",
        }
    }
}

impl std::fmt::Display for PricingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PricingModel {
    type Err = PricingModelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_ascii_lowercase();
        PricingModel::ALL
            .into_iter()
            .find(|model| model.as_str() == lowered)
            .ok_or_else(|| PricingModelParseError(s.to_string()))
    }
}

/// Error returned when parsing an invalid pricing model.
#[derive(Debug, Clone)]
pub struct PricingModelParseError(pub String);

impl std::fmt::Display for PricingModelParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid pricing model '{}', valid values: cpm, vcpm, cpc, cpcv, cpp, cpv, flat_rate",
            self.0
        )
    }
}

impl std::error::Error for PricingModelParseError {}

/// Metro-area classification systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetroSystem {
    /// US Nielsen DMAs
    NielsenDma,
    /// EU NUTS2 regions
    EurostatNuts2,
    /// UK ITL1 regions
    UkItl1,
    /// UK ITL2 regions
    UkItl2,
}

impl MetroSystem {
    /// Get the system name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetroSystem::NielsenDma => "nielsen_dma",
            MetroSystem::EurostatNuts2 => "eurostat_nuts2",
            MetroSystem::UkItl1 => "uk_itl1",
            MetroSystem::UkItl2 => "uk_itl2",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "nielsen_dma" => Some(MetroSystem::NielsenDma),
            "eurostat_nuts2" => Some(MetroSystem::EurostatNuts2),
            "uk_itl1" => Some(MetroSystem::UkItl1),
            "uk_itl2" => Some(MetroSystem::UkItl2),
            _ => None,
        }
    }
}

/// Postal-code classification systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostalSystem {
    UsZip,
    UsZipPlusFour,
    GbOutward,
    GbFull,
    CaFsa,
    CaFull,
    DePlz,
    FrCodePostal,
    AuPostcode,
}

impl PostalSystem {
    /// Get the system name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PostalSystem::UsZip => "us_zip",
            PostalSystem::UsZipPlusFour => "us_zip_plus_four",
            PostalSystem::GbOutward => "gb_outward",
            PostalSystem::GbFull => "gb_full",
            PostalSystem::CaFsa => "ca_fsa",
            PostalSystem::CaFull => "ca_full",
            PostalSystem::DePlz => "de_plz",
            PostalSystem::FrCodePostal => "fr_code_postal",
            PostalSystem::AuPostcode => "au_postcode",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "us_zip" => Some(PostalSystem::UsZip),
            "us_zip_plus_four" => Some(PostalSystem::UsZipPlusFour),
            "gb_outward" => Some(PostalSystem::GbOutward),
            "gb_full" => Some(PostalSystem::GbFull),
            "ca_fsa" => Some(PostalSystem::CaFsa),
            "ca_full" => Some(PostalSystem::CaFull),
            "de_plz" => Some(PostalSystem::DePlz),
            "fr_code_postal" => Some(PostalSystem::FrCodePostal),
            "au_postcode" => Some(PostalSystem::AuPostcode),
            _ => None,
        }
    }
}

/// A set of geographic values expressed in one classification system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoArea {
    /// System name, e.g. "nielsen_dma" or "us_zip"
    pub system: String,
    /// Values within that system
    pub values: Vec<String>,
}

impl GeoArea {
    /// Create a geo area.
    pub fn new(system: impl Into<String>, values: &[&str]) -> Self {
        GeoArea {
            system: system.into(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }
}

/// Geographic part of a targeting request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoTargeting {
    pub countries: Vec<String>,
    pub regions: Vec<String>,
    pub metros: Vec<GeoArea>,
    pub metros_exclude: Vec<GeoArea>,
    pub postal_areas: Vec<GeoArea>,
    pub postal_areas_exclude: Vec<GeoArea>,
}

impl GeoTargeting {
    /// Check if any geographic constraint is present.
    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
            && self.regions.is_empty()
            && self.metros.is_empty()
            && self.metros_exclude.is_empty()
            && self.postal_areas.is_empty()
            && self.postal_areas_exclude.is_empty()
    }
}

/// Which geographic classification systems a backend can target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TargetingCapabilities {
    /// Country-level targeting
    pub geo_countries: bool,

    /// Region/state-level targeting
    pub geo_regions: bool,

    /// Supported metro systems
    pub metro_systems: BTreeSet<MetroSystem>,

    /// Supported postal systems
    pub postal_systems: BTreeSet<PostalSystem>,
}

/// An unsupported geo system found in a targeting request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoSystemProblem {
    /// "metro" or "postal"
    pub category: &'static str,
    /// The requested system name
    pub system: String,
    /// Systems the backend does support in this category
    pub supported: Vec<&'static str>,
}

impl std::fmt::Display for GeoSystemProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let alternatives = if self.supported.is_empty() {
            "none".to_string()
        } else {
            self.supported.join(", ")
        };
        write!(
            f,
            "unsupported {} system '{}', this adapter supports: {}",
            self.category, self.system, alternatives
        )
    }
}

impl TargetingCapabilities {
    /// Check if a metro system is supported.
    pub fn supports_metro(&self, system: MetroSystem) -> bool {
        self.metro_systems.contains(&system)
    }

    /// Check if a postal system is supported.
    pub fn supports_postal(&self, system: PostalSystem) -> bool {
        self.postal_systems.contains(&system)
    }

    /// Report every metro or postal entry (include and exclude) whose
    /// system this backend cannot target.
    pub fn validate_geo_systems(&self, targeting: &GeoTargeting) -> Vec<GeoSystemProblem> {
        let mut problems = Vec::new();

        let supported_metros: Vec<&'static str> =
            self.metro_systems.iter().map(|m| m.as_str()).collect();
        for area in targeting.metros.iter().chain(&targeting.metros_exclude) {
            let ok = MetroSystem::parse(&area.system).is_some_and(|m| self.supports_metro(m));
            if !ok {
                problems.push(GeoSystemProblem {
                    category: "metro",
                    system: area.system.clone(),
                    supported: supported_metros.clone(),
                });
            }
        }

        let supported_postal: Vec<&'static str> =
            self.postal_systems.iter().map(|p| p.as_str()).collect();
        for area in targeting
            .postal_areas
            .iter()
            .chain(&targeting.postal_areas_exclude)
        {
            let ok = PostalSystem::parse(&area.system).is_some_and(|p| self.supports_postal(p));
            if !ok {
                problems.push(GeoSystemProblem {
                    category: "postal",
                    system: area.system.clone(),
                    supported: supported_postal.clone(),
                });
            }
        }

        problems
    }
}

/// A named capability, used to report which gate rejected an operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Capability {
    InventorySync,
    InventoryProfiles,
    CustomTargeting,
    GeoTargeting,
    /// A specific geographic system (e.g. "uk_itl1")
    GeoSystem(String),
    DynamicProducts,
    PricingModel(PricingModel),
    Webhooks,
    RealtimeReporting,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::InventorySync => write!(f, "supports_inventory_sync"),
            Capability::InventoryProfiles => write!(f, "supports_inventory_profiles"),
            Capability::CustomTargeting => write!(f, "supports_custom_targeting"),
            Capability::GeoTargeting => write!(f, "supports_geo_targeting"),
            Capability::GeoSystem(system) => write!(f, "geo_system:{}", system),
            Capability::DynamicProducts => write!(f, "supports_dynamic_products"),
            Capability::PricingModel(model) => write!(f, "pricing_model:{}", model),
            Capability::Webhooks => write!(f, "supports_webhooks"),
            Capability::RealtimeReporting => write!(f, "supports_realtime_reporting"),
        }
    }
}

/// Complete capability descriptor for one backend.
///
/// Serializes to a flat map (targeting fields are flattened in) for the
/// introspection document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdapterCapabilities {
    /// Can sync inventory from the ad server
    pub supports_inventory_sync: bool,

    /// Supports inventory profile configuration
    pub supports_inventory_profiles: bool,

    /// Display noun for inventory entities (e.g. "Zones", "Ad Units")
    pub inventory_entity_label: String,

    /// Supports custom key-value targeting
    pub supports_custom_targeting: bool,

    /// Supports geographic targeting
    pub supports_geo_targeting: bool,

    /// Supports AI-driven product configuration
    pub supports_dynamic_products: bool,

    /// Pricing models the backend can book
    pub supported_pricing_models: BTreeSet<PricingModel>,

    /// Supports webhook notifications
    pub supports_webhooks: bool,

    /// Supports real-time delivery reporting
    pub supports_realtime_reporting: bool,

    /// Geographic systems detail
    #[serde(flatten)]
    pub targeting: TargetingCapabilities,
}

impl Default for AdapterCapabilities {
    fn default() -> Self {
        AdapterCapabilities {
            supports_inventory_sync: false,
            supports_inventory_profiles: false,
            inventory_entity_label: "Items".to_string(),
            supports_custom_targeting: false,
            supports_geo_targeting: false,
            supports_dynamic_products: false,
            supported_pricing_models: BTreeSet::new(),
            supports_webhooks: false,
            supports_realtime_reporting: false,
            targeting: TargetingCapabilities::default(),
        }
    }
}

impl AdapterCapabilities {
    /// Start building a capability descriptor from the conservative defaults.
    pub fn builder() -> AdapterCapabilitiesBuilder {
        AdapterCapabilitiesBuilder::default()
    }

    /// Check a boolean capability flag.
    ///
    /// Parameterized capabilities (pricing models, geo systems) are checked
    /// against their sets.
    pub fn supports(&self, capability: &Capability) -> bool {
        match capability {
            Capability::InventorySync => self.supports_inventory_sync,
            Capability::InventoryProfiles => self.supports_inventory_profiles,
            Capability::CustomTargeting => self.supports_custom_targeting,
            Capability::GeoTargeting => self.supports_geo_targeting,
            Capability::GeoSystem(system) => {
                MetroSystem::parse(system).is_some_and(|m| self.targeting.supports_metro(m))
                    || PostalSystem::parse(system)
                        .is_some_and(|p| self.targeting.supports_postal(p))
            }
            Capability::DynamicProducts => self.supports_dynamic_products,
            Capability::PricingModel(model) => self.supported_pricing_models.contains(model),
            Capability::Webhooks => self.supports_webhooks,
            Capability::RealtimeReporting => self.supports_realtime_reporting,
        }
    }

    /// Check if a pricing model is supported.
    pub fn supports_pricing_model(&self, model: PricingModel) -> bool {
        self.supported_pricing_models.contains(&model)
    }

    /// Render as the flat capability map used by the introspection document.
    pub fn to_flat_map(&self) -> serde_json::Map<String, serde_json::Value> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        }
    }
}

/// Builder for [`AdapterCapabilities`].
#[derive(Debug, Clone, Default)]
pub struct AdapterCapabilitiesBuilder {
    caps: AdapterCapabilities,
}

impl AdapterCapabilitiesBuilder {
    /// Declare inventory sync and profile support.
    pub fn inventory(mut self, sync: bool, profiles: bool, label: impl Into<String>) -> Self {
        self.caps.supports_inventory_sync = sync;
        self.caps.supports_inventory_profiles = profiles;
        self.caps.inventory_entity_label = label.into();
        self
    }

    /// Declare custom key-value targeting support.
    pub fn custom_targeting(mut self, supported: bool) -> Self {
        self.caps.supports_custom_targeting = supported;
        self
    }

    /// Declare geographic targeting support at country/region level.
    pub fn geo_targeting(mut self, countries: bool, regions: bool) -> Self {
        self.caps.supports_geo_targeting = countries || regions;
        self.caps.targeting.geo_countries = countries;
        self.caps.targeting.geo_regions = regions;
        self
    }

    /// Declare supported metro systems.
    pub fn metro_systems(mut self, systems: &[MetroSystem]) -> Self {
        self.caps.targeting.metro_systems = systems.iter().copied().collect();
        self
    }

    /// Declare supported postal systems.
    pub fn postal_systems(mut self, systems: &[PostalSystem]) -> Self {
        self.caps.targeting.postal_systems = systems.iter().copied().collect();
        self
    }

    /// Declare dynamic product support.
    pub fn dynamic_products(mut self, supported: bool) -> Self {
        self.caps.supports_dynamic_products = supported;
        self
    }

    /// Declare supported pricing models.
    pub fn pricing_models(mut self, models: &[PricingModel]) -> Self {
        self.caps.supported_pricing_models = models.iter().copied().collect();
        self
    }

    /// Declare webhook support.
    pub fn webhooks(mut self, supported: bool) -> Self {
        self.caps.supports_webhooks = supported;
        self
    }

    /// Declare realtime reporting support.
    pub fn realtime_reporting(mut self, supported: bool) -> Self {
        self.caps.supports_realtime_reporting = supported;
        self
    }

    /// Finish building.
    pub fn build(self) -> AdapterCapabilities {
        self.caps
    }
}
