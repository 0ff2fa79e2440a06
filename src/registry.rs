//! The (operation, platform, package) → handler registry.
//!
//! Package modules register one handler per triple while the registry is
//! built at startup; the command drivers then ask for every handler matching
//! the current operation and detected platform and invoke them sequentially.
//!
//! Registration keys are validated against fixed allow-lists (see
//! [`crate::platform::ALLOWED_PLATFORMS`] and [`ALLOWED_OPERATIONS`]); a key
//! outside either list is a [`ConfigError`], surfaced as exit status 1 at the
//! binary boundary. Entries are never removed. Registering the same triple
//! twice keeps the newer handler and logs the overwrite.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use anyhow::Result;

use crate::context::Context;
use crate::error::ConfigError;
use crate::platform::Platform;

/// Operation keys accepted at registration time.
pub const ALLOWED_OPERATIONS: &[&str] = &["install", "uninstall", "check"];

/// Action category a handler performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Install,
    Uninstall,
    Check,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Install => write!(f, "install"),
            Self::Uninstall => write!(f, "uninstall"),
            Self::Check => write!(f, "check"),
        }
    }
}

impl FromStr for Operation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "install" => Ok(Self::Install),
            "uninstall" => Ok(Self::Uninstall),
            "check" => Ok(Self::Check),
            other => Err(ConfigError::UnknownOperation(other.to_string())),
        }
    }
}

/// An install/uninstall unit of work bound to one package.
pub type ActionFn = Box<dyn Fn(&Context) -> Result<()> + Send + Sync>;

/// A check probe bound to one package; `true` means the package is present.
pub type ProbeFn = Box<dyn Fn(&Context) -> Result<bool> + Send + Sync>;

/// A registered unit of work.
///
/// Install and uninstall handlers produce no value; check handlers produce a
/// boolean. The two kinds are kept apart so that a probe cannot silently be
/// dispatched as an action.
pub enum Handler {
    /// Performs a side effect (install or uninstall).
    Action(ActionFn),
    /// Reports whether the package is present.
    Probe(ProbeFn),
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

impl Handler {
    /// `"action"` or `"probe"`.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Action(_) => "action",
            Self::Probe(_) => "probe",
        }
    }

    /// Invoke an action handler.
    ///
    /// # Errors
    ///
    /// Propagates the handler's error, or fails if this is a probe. The
    /// registration-time kind check makes the latter unreachable in practice.
    pub fn run_action(&self, ctx: &Context) -> Result<()> {
        match self {
            Self::Action(f) => f(ctx),
            Self::Probe(_) => anyhow::bail!("probe handler invoked as an action"),
        }
    }

    /// Invoke a probe handler.
    ///
    /// # Errors
    ///
    /// Propagates the handler's error, or fails if this is an action.
    pub fn run_probe(&self, ctx: &Context) -> Result<bool> {
        match self {
            Self::Probe(f) => f(ctx),
            Self::Action(_) => anyhow::bail!("action handler invoked as a probe"),
        }
    }
}

/// Mapping from (operation, platform, package) to a handler.
///
/// The per-(operation, platform) slot is a `BTreeMap` so that the drivers
/// dispatch packages in a stable name order.
#[derive(Debug, Default)]
pub struct Registry {
    methods: HashMap<(Operation, Platform), BTreeMap<String, Handler>>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under the given triple.
    ///
    /// `platform` and `operation` are validated against the allow-lists, and
    /// the handler kind must match the operation (probes under `check`,
    /// actions otherwise). A duplicate triple keeps the newer handler; the
    /// overwrite is logged at warn level.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] on an allow-list violation or a handler-kind
    /// mismatch. The registry is not mutated on error.
    pub fn register(
        &mut self,
        platform: &str,
        operation: &str,
        package: &str,
        handler: Handler,
    ) -> Result<(), ConfigError> {
        let platform: Platform = platform.parse()?;
        let operation: Operation = operation.parse()?;

        let kind_matches = match operation {
            Operation::Check => matches!(handler, Handler::Probe(_)),
            Operation::Install | Operation::Uninstall => matches!(handler, Handler::Action(_)),
        };
        if !kind_matches {
            return Err(ConfigError::HandlerKind {
                package: package.to_string(),
                operation: operation.to_string(),
                kind: handler.kind(),
            });
        }

        let slot = self.methods.entry((operation, platform)).or_default();
        if slot.insert(package.to_string(), handler).is_some() {
            tracing::warn!(
                "handler for {operation}/{platform}/{package} registered twice; keeping the newer one"
            );
        }
        Ok(())
    }

    /// Register a closure as an install/uninstall handler.
    ///
    /// # Errors
    ///
    /// Same as [`Registry::register`].
    pub fn register_action<F>(
        &mut self,
        platform: &str,
        operation: &str,
        package: &str,
        f: F,
    ) -> Result<(), ConfigError>
    where
        F: Fn(&Context) -> Result<()> + Send + Sync + 'static,
    {
        self.register(platform, operation, package, Handler::Action(Box::new(f)))
    }

    /// Register a closure as a check handler.
    ///
    /// # Errors
    ///
    /// Same as [`Registry::register`].
    pub fn register_probe<F>(
        &mut self,
        platform: &str,
        operation: &str,
        package: &str,
        f: F,
    ) -> Result<(), ConfigError>
    where
        F: Fn(&Context) -> Result<bool> + Send + Sync + 'static,
    {
        self.register(platform, operation, package, Handler::Probe(Box::new(f)))
    }

    /// All handlers for `operation` on `platform`, in package-name order.
    ///
    /// Empty when nothing is registered for the pair.
    pub fn get_handlers(
        &self,
        operation: Operation,
        platform: Platform,
    ) -> impl Iterator<Item = (&str, &Handler)> {
        self.methods
            .get(&(operation, platform))
            .into_iter()
            .flat_map(|slot| slot.iter().map(|(name, h)| (name.as_str(), h)))
    }

    /// Look up the handler for a single triple.
    #[must_use]
    pub fn handler(
        &self,
        operation: Operation,
        platform: Platform,
        package: &str,
    ) -> Option<&Handler> {
        self.methods.get(&(operation, platform))?.get(package)
    }

    /// Number of handlers registered for `operation` on `platform`.
    #[must_use]
    pub fn count(&self, operation: Operation, platform: Platform) -> usize {
        self.methods
            .get(&(operation, platform))
            .map_or(0, BTreeMap::len)
    }

    /// Whether the registry holds no handlers at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.values().all(BTreeMap::is_empty)
    }
}
