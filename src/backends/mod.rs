//! Built-in backend declarations.
//!
//! Each backend module exposes `schemas()` and `capabilities()`; this module
//! registers them. Only the mock backend ships a client. The embedding
//! application supplies constructors for the others through
//! [`BuiltinConstructors`]; without one a backend can still be validated,
//! described and run in dry-run mode.
//!
//! ```ignore
//! use adapterkit::backends::{register_builtin, BuiltinConstructors};
//!
//! let mut builder = RegistryBuilder::new();
//! register_builtin(&mut builder, BuiltinConstructors {
//!     kevel: kevel_client_constructor(),
//!     ..Default::default()
//! })?;
//! let registry = builder.freeze();
//! ```

pub mod broadstreet;
pub mod google_ad_manager;
pub mod kevel;
pub mod mock;
pub mod triton;

use std::time::Duration;

use crate::adapter::error::AdapterError;
use crate::adapter::registry::{AdapterConstructor, AdapterRegistry, RegistryBuilder};
use crate::adapter::validation::ValidationMode;

pub use mock::MockClient;

/// Client constructors for the backends whose wire clients live outside
/// this crate.
#[derive(Debug, Clone)]
pub struct BuiltinConstructors {
    pub google_ad_manager: AdapterConstructor,
    pub kevel: AdapterConstructor,
    pub triton_digital: AdapterConstructor,
    pub broadstreet: AdapterConstructor,
}

impl Default for BuiltinConstructors {
    fn default() -> Self {
        BuiltinConstructors {
            google_ad_manager: AdapterConstructor::unavailable(
                "no Google Ad Manager client is configured",
            ),
            kevel: AdapterConstructor::unavailable("no Kevel client is configured"),
            triton_digital: AdapterConstructor::unavailable(
                "no Triton Digital client is configured",
            ),
            broadstreet: AdapterConstructor::unavailable("no Broadstreet client is configured"),
        }
    }
}

/// Register every built-in backend and its aliases.
pub fn register_builtin(
    builder: &mut RegistryBuilder,
    constructors: BuiltinConstructors,
) -> Result<(), AdapterError> {
    builder.register(mock::ID, mock::schemas(), mock::capabilities(), mock::constructor())?;
    builder.register(
        google_ad_manager::ID,
        google_ad_manager::schemas(),
        google_ad_manager::capabilities(),
        constructors.google_ad_manager,
    )?;
    builder.register(
        kevel::ID,
        kevel::schemas(),
        kevel::capabilities(),
        constructors.kevel,
    )?;
    builder.register(
        triton::ID,
        triton::schemas(),
        triton::capabilities(),
        constructors.triton_digital,
    )?;
    builder.register(
        broadstreet::ID,
        broadstreet::schemas(),
        broadstreet::capabilities(),
        constructors.broadstreet,
    )?;

    builder.register_alias(google_ad_manager::ALIAS, google_ad_manager::ID)?;
    builder.register_alias(triton::ALIAS, triton::ID)?;
    Ok(())
}

/// Frozen registry of the built-in backends with default constructors.
///
/// Used by the CLI for introspection, validation and dry runs.
pub fn catalog(
    mode: ValidationMode,
    timeout: Option<Duration>,
) -> Result<AdapterRegistry, AdapterError> {
    let mut builder = RegistryBuilder::new();
    builder.validation_mode(mode).default_timeout(timeout);
    register_builtin(&mut builder, BuiltinConstructors::default())?;
    Ok(builder.freeze())
}
