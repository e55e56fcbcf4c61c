//! Adapter registry - maps backend identifiers to schemas, capabilities and
//! client constructors.
//!
//! Registration happens once at startup on a [`RegistryBuilder`]. `freeze()`
//! turns it into an [`AdapterRegistry`] that has no mutating methods and can
//! be shared freely across threads. A process-wide registry can be installed
//! once with [`install`].

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use anyhow::Result;
use serde_json::Value;

use crate::adapter::capabilities::{AdapterCapabilities, BackendId};
use crate::adapter::error::AdapterError;
use crate::adapter::interface::Adapter;
use crate::adapter::introspect::{self, BackendDescription};
use crate::adapter::schema::{SchemaDeclaration, SchemaKind};
use crate::adapter::trait_def::{BackendClient, Principal};
use crate::adapter::validated::ValidatedConfig;
use crate::adapter::validation::{self, FieldIssue, Validated, ValidationMode};

type ConstructFn = dyn Fn(&ValidatedConfig) -> Result<Arc<dyn BackendClient>> + Send + Sync;

/// Builds a backend client from a validated connection config.
#[derive(Clone)]
pub struct AdapterConstructor(Arc<ConstructFn>);

impl AdapterConstructor {
    pub fn new<F>(build: F) -> Self
    where
        F: Fn(&ValidatedConfig) -> Result<Arc<dyn BackendClient>> + Send + Sync + 'static,
    {
        AdapterConstructor(Arc::new(build))
    }

    /// Constructor that always fails; the backend can still be validated,
    /// described and run in dry-run mode.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self::new(move |_| Err(anyhow::anyhow!("{}", reason)))
    }

    pub fn build(&self, config: &ValidatedConfig) -> Result<Arc<dyn BackendClient>> {
        (self.0)(config)
    }
}

impl std::fmt::Debug for AdapterConstructor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AdapterConstructor(..)")
    }
}

/// Everything registered for one backend.
#[derive(Debug, Clone)]
pub struct AdapterRegistration {
    id: BackendId,
    schemas: SchemaDeclaration,
    capabilities: Arc<AdapterCapabilities>,
    constructor: AdapterConstructor,
}

impl AdapterRegistration {
    pub fn id(&self) -> &BackendId {
        &self.id
    }

    pub fn schemas(&self) -> &SchemaDeclaration {
        &self.schemas
    }

    pub fn capabilities(&self) -> &Arc<AdapterCapabilities> {
        &self.capabilities
    }

    pub fn constructor(&self) -> &AdapterConstructor {
        &self.constructor
    }
}

/// Options for [`AdapterRegistry::connect`].
#[derive(Debug, Clone, Default)]
pub struct ConnectOptions {
    /// Simulate every operation; the client is never constructed
    pub dry_run: bool,

    /// Per-call timeout applied on top of each operation scope
    pub timeout: Option<Duration>,

    /// Override the registry's validation mode
    pub mode: Option<ValidationMode>,
}

/// Accepts registrations during startup.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    entries: BTreeMap<BackendId, AdapterRegistration>,
    aliases: BTreeMap<BackendId, BackendId>,
    mode: ValidationMode,
    default_timeout: Option<Duration>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the validation mode used by `validate` and `connect`.
    pub fn validation_mode(&mut self, mode: ValidationMode) -> &mut Self {
        self.mode = mode;
        self
    }

    /// Set the timeout applied to adapters built by `connect`.
    pub fn default_timeout(&mut self, timeout: Option<Duration>) -> &mut Self {
        self.default_timeout = timeout;
        self
    }

    /// Register a backend.
    ///
    /// Fails if the identifier (or an alias with that name) is taken, or if
    /// any declared schema is internally inconsistent.
    pub fn register(
        &mut self,
        id: &str,
        schemas: SchemaDeclaration,
        capabilities: AdapterCapabilities,
        constructor: AdapterConstructor,
    ) -> Result<&mut Self, AdapterError> {
        let id = BackendId::new(id)?;
        self.ensure_free(&id)?;

        for kind in SchemaKind::ALL {
            let issues: Vec<FieldIssue> = schemas
                .schema(kind)
                .check_integrity()
                .into_iter()
                .map(|(path, problem)| FieldIssue::new(path, problem))
                .collect();
            if !issues.is_empty() {
                return Err(AdapterError::InvalidSchema {
                    backend: id,
                    kind,
                    issues,
                });
            }
        }

        tracing::debug!("Registered backend {}", id);

        self.entries.insert(
            id.clone(),
            AdapterRegistration {
                id,
                schemas,
                capabilities: Arc::new(capabilities),
                constructor,
            },
        );
        Ok(self)
    }

    /// Make `alias` resolve to the registered backend `target`.
    pub fn register_alias(&mut self, alias: &str, target: &str) -> Result<&mut Self, AdapterError> {
        let alias = BackendId::new(alias)?;
        let target_id = BackendId::new(target)?;
        self.ensure_free(&alias)?;

        if !self.entries.contains_key(&target_id) {
            return Err(AdapterError::UnknownBackend {
                backend: target.to_string(),
            });
        }

        tracing::debug!("Registered alias {} -> {}", alias, target_id);
        self.aliases.insert(alias, target_id);
        Ok(self)
    }

    fn ensure_free(&self, id: &BackendId) -> Result<(), AdapterError> {
        if self.entries.contains_key(id) || self.aliases.contains_key(id) {
            return Err(AdapterError::DuplicateBackend {
                backend: id.clone(),
            });
        }
        Ok(())
    }

    /// Finish registration.
    pub fn freeze(self) -> AdapterRegistry {
        tracing::debug!(
            "Froze adapter registry with {} backend(s), {} alias(es)",
            self.entries.len(),
            self.aliases.len()
        );
        AdapterRegistry {
            entries: self.entries,
            aliases: self.aliases,
            mode: self.mode,
            default_timeout: self.default_timeout,
        }
    }
}

/// Read-only registry of backends.
#[derive(Debug)]
pub struct AdapterRegistry {
    entries: BTreeMap<BackendId, AdapterRegistration>,
    aliases: BTreeMap<BackendId, BackendId>,
    mode: ValidationMode,
    default_timeout: Option<Duration>,
}

impl AdapterRegistry {
    /// Look up a backend by identifier or alias (case-insensitive).
    pub fn resolve(&self, backend: &str) -> Result<&AdapterRegistration, AdapterError> {
        let unknown = || AdapterError::UnknownBackend {
            backend: backend.to_string(),
        };

        let id = BackendId::new(backend).map_err(|_| unknown())?;
        let id = self.aliases.get(&id).unwrap_or(&id);
        self.entries.get(id).ok_or_else(unknown)
    }

    /// Registered primary identifiers, sorted.
    pub fn backends(&self) -> Vec<&BackendId> {
        self.entries.keys().collect()
    }

    /// Aliases paired with the identifier they resolve to, sorted by alias.
    pub fn aliases(&self) -> impl Iterator<Item = (&BackendId, &BackendId)> + '_ {
        self.aliases.iter()
    }

    /// Aliases pointing at one backend.
    pub fn aliases_of(&self, id: &BackendId) -> Vec<&BackendId> {
        self.aliases
            .iter()
            .filter(|(_, target)| *target == id)
            .map(|(alias, _)| alias)
            .collect()
    }

    pub fn contains(&self, backend: &str) -> bool {
        self.resolve(backend).is_ok()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    pub fn default_timeout(&self) -> Option<Duration> {
        self.default_timeout
    }

    /// Validate a raw payload in the registry's mode.
    pub fn validate(
        &self,
        backend: &str,
        kind: SchemaKind,
        payload: &Value,
    ) -> Result<Validated, AdapterError> {
        self.validate_with_mode(backend, kind, payload, self.mode)
    }

    pub fn validate_with_mode(
        &self,
        backend: &str,
        kind: SchemaKind,
        payload: &Value,
        mode: ValidationMode,
    ) -> Result<Validated, AdapterError> {
        let registration = self.resolve(backend)?;
        let schema = registration.schemas.schema(kind);
        Ok(validation::validate(
            &registration.id,
            kind,
            schema,
            payload,
            mode,
        )?)
    }

    /// Resolve, validate the connection payload and build an adapter.
    pub fn connect(
        &self,
        backend: &str,
        raw_connection: &Value,
        principal: Principal,
        options: ConnectOptions,
    ) -> Result<Adapter, AdapterError> {
        let registration = self.resolve(backend)?;
        let mode = options.mode.unwrap_or(self.mode);

        let validated = validation::validate(
            &registration.id,
            SchemaKind::Connection,
            &registration.schemas.connection,
            raw_connection,
            mode,
        )?;
        for warning in &validated.warnings {
            tracing::warn!("{}: {}", registration.id, warning);
        }

        self.bind(registration, validated.config, principal, options)
    }

    /// Build an adapter from an already validated connection config.
    pub fn build_adapter(
        &self,
        config: ValidatedConfig,
        principal: Principal,
        options: ConnectOptions,
    ) -> Result<Adapter, AdapterError> {
        let registration = self.resolve(config.backend().as_str())?;
        self.bind(registration, config, principal, options)
    }

    fn bind(
        &self,
        registration: &AdapterRegistration,
        config: ValidatedConfig,
        principal: Principal,
        mut options: ConnectOptions,
    ) -> Result<Adapter, AdapterError> {
        options.timeout = options.timeout.or(self.default_timeout);
        Adapter::new(registration, config, principal, &options)
    }

    /// Describe a backend's schemas and capabilities.
    pub fn describe(&self, backend: &str) -> Result<BackendDescription, AdapterError> {
        Ok(introspect::describe(self.resolve(backend)?))
    }

    /// Describe a backend as the pretty-printed JSON document.
    pub fn describe_json(&self, backend: &str) -> Result<String, AdapterError> {
        Ok(self.describe(backend)?.to_json_string())
    }
}

static GLOBAL: OnceLock<AdapterRegistry> = OnceLock::new();

/// Install the process-wide registry. Only the first call succeeds.
pub fn install(registry: AdapterRegistry) -> Result<&'static AdapterRegistry, AdapterError> {
    GLOBAL
        .set(registry)
        .map_err(|_| AdapterError::AlreadyInstalled)?;
    GLOBAL.get().ok_or(AdapterError::AlreadyInstalled)
}

/// The process-wide registry, if installed.
pub fn global() -> Option<&'static AdapterRegistry> {
    GLOBAL.get()
}
