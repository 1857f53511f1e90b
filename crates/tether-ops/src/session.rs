//! A loaded module universe plus the resolver configured for it.

use std::path::Path;

use tether_core::config::GlobalConfig;
use tether_core::universe::Universe;
use tether_core::{ModuleId, ModuleRegistry};
use tether_resolver::{Resolution, ResolveError, Resolver};
use tether_util::errors::{TetherError, TetherResult};

/// Everything a command needs: the registry and a configured resolver.
pub struct Session {
    registry: ModuleRegistry,
    resolver: Resolver,
}

impl Session {
    /// Load the config (explicit path, or `~/.tether/config.toml`) and the
    /// universe file, then bootstrap pre-resolved modules.
    pub fn load(config_path: Option<&Path>, universe_path: &Path) -> TetherResult<Self> {
        let config = match config_path {
            Some(path) => GlobalConfig::from_path(path)?,
            None => GlobalConfig::load()?,
        };
        let universe = Universe::from_path(universe_path)?;
        Self::from_parts(config, &universe)
    }

    /// Register every module of `universe`, then resolve and commit the
    /// ones marked `resolved = true` in file order.
    pub fn from_parts(config: GlobalConfig, universe: &Universe) -> TetherResult<Self> {
        let mut registry = ModuleRegistry::new();
        for module in universe.to_modules()? {
            registry.add(module)?;
        }
        tracing::debug!("Loaded {} module(s)", registry.len());

        let mut session = Self {
            registry,
            resolver: Resolver::with_config(config.resolver),
        };
        for id in universe.preresolved() {
            session.resolve_and_commit(&id).map_err(|e| TetherError::Universe {
                message: format!("module '{id}' is marked resolved but does not resolve: {e}"),
            })?;
        }
        Ok(session)
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ModuleRegistry {
        &mut self.registry
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Look up a module id given on the command line.
    pub fn module_id(&self, raw: &str) -> Result<ModuleId, ResolveError> {
        let id = ModuleId::new(raw);
        if self.registry.get(&id).is_some() {
            Ok(id)
        } else {
            Err(ResolveError::unknown_module(id))
        }
    }

    /// Resolve `root` and commit the proposed wires.
    pub fn resolve_and_commit(&mut self, root: &ModuleId) -> Result<Resolution, ResolveError> {
        let resolution = self.resolver.resolve(&self.registry, root)?;
        let committed = self.registry.commit(resolution.wires.clone());
        tracing::debug!("Committed {committed} module(s) for {root}");
        Ok(resolution)
    }
}
