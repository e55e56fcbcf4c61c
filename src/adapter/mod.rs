//! Adapter schema and capability system.
//!
//! Each ad-server backend declares three configuration schemas (connection,
//! product, inventory) and a capability profile. Raw payloads are validated
//! against those schemas before anything else sees them, and every adapter
//! operation is gated on the declared capabilities.
//!
//! # Architecture
//!
//! ```text
//!        (backend id, raw payload)
//!                   │
//!                   ▼
//!         ┌───────────────────┐        ┌───────────────────┐
//!         │  AdapterRegistry  │───────▶│    describe()     │ (form metadata)
//!         └─────────┬─────────┘        └───────────────────┘
//!                   │ resolve
//!                   ▼
//!         ┌───────────────────┐
//!         │     Validator     │ strict / lenient
//!         └─────────┬─────────┘
//!                   │ ValidatedConfig
//!                   ▼
//!         ┌───────────────────┐
//!         │      Adapter      │ capability gate, dry run
//!         └─────────┬─────────┘
//!                   │
//!          ┌────────┴────────┐
//!          ▼                 ▼
//!   ┌─────────────┐   ┌─────────────┐
//!   │  Simulated  │   │BackendClient│
//!   └─────────────┘   └─────────────┘
//! ```
//!
//! # Key Concepts
//!
//! - **Capabilities** - What a backend can do, conservative by default (in `capabilities.rs`)
//! - **Schemas** - Typed field contracts and their evolution rules (in `schema.rs`)
//! - **Validation** - Payload checking with collected field problems (in `validation.rs`)
//! - **ValidatedConfig** - Immutable typed result of validation (in `validated.rs`)
//! - **BackendClient** - Trait for the outbound calls (in `trait_def.rs`)
//! - **Adapter** - Capability-gated operations with dry run (in `interface.rs`)
//! - **Registry** - Builder, freeze and process-wide install (in `registry.rs`)
//! - **Introspection** - JSON Schema documents for form rendering (in `introspect.rs`)
//!
//! # Usage
//!
//! ```ignore
//! use adapterkit::adapter::{ConnectOptions, OperationScope, Principal, RegistryBuilder};
//!
//! let mut builder = RegistryBuilder::new();
//! adapterkit::backends::register_builtin(&mut builder, Default::default())?;
//! let registry = adapterkit::adapter::install(builder.freeze())?;
//!
//! let adapter = registry.connect(
//!     "mock",
//!     &payload,
//!     Principal::new("tenant-1"),
//!     ConnectOptions::default(),
//! )?;
//! let receipt = adapter.create_line_item(&request, &OperationScope::new())?;
//! ```

pub mod capabilities;
pub mod error;
pub mod interface;
pub mod introspect;
pub mod registry;
pub mod schema;
pub mod trait_def;
pub mod validated;
pub mod validation;

// Re-export commonly used types
pub use capabilities::{
    AdapterCapabilities, AdapterCapabilitiesBuilder, BackendId, BackendIdParseError, Capability,
    GeoArea, GeoTargeting, MetroSystem, PostalSystem, PricingModel, TargetingCapabilities,
};

pub use error::{AdapterError, UpstreamKind};

pub use interface::{Adapter, Execution, Operation, Outcome, PlannedAction};

pub use introspect::{BackendDescription, FieldDescriptor, SchemaDescription};

pub use registry::{
    global, install, AdapterConstructor, AdapterRegistration, AdapterRegistry, ConnectOptions,
    RegistryBuilder,
};

pub use schema::{
    check_evolution, ConfigSchema, EvolutionIssue, FieldSpec, FieldType, SchemaDeclaration,
    SchemaKind, UiHints,
};

pub use trait_def::{BackendClient, CancelHandle, ClientError, OperationScope, Principal};

pub use validated::{ConfigValue, ValidatedConfig};

pub use validation::{
    ConfigValidationError, FieldIssue, FieldPath, Problem, Validated, ValidationMode,
    ValidationWarning,
};
