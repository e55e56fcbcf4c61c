//! adapterkit - typed configuration and capability contracts for ad servers
//!
//! This crate provides the core library functionality for adapterkit:
//! backend registration, configuration validation, capability-gated
//! adapters and schema introspection.

pub mod adapter;
pub mod backends;
pub mod util;

/// Test utilities and mocks for adapterkit unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a scripted backend client and fixture
/// schemas.
#[cfg(test)]
pub mod test_support;

pub use adapter::{
    Adapter, AdapterCapabilities, AdapterError, AdapterRegistry, BackendId, ConfigSchema,
    RegistryBuilder, SchemaDeclaration, ValidatedConfig, ValidationMode,
};
pub use util::config::Config;
