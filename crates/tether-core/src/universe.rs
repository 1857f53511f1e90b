//! TOML description of a module universe.
//!
//! ```toml
//! [[module]]
//! name = "com.acme.app"
//! version = "1.0.0"
//!
//! [[module.import]]
//! package = "com.acme.api"
//! version = ">=1.0, <2"
//!
//! [[module]]
//! name = "com.acme.api"
//! version = "1.2.0"
//! resolved = true
//!
//! [[module.export]]
//! package = "com.acme.api"
//! uses = ["com.acme.spi"]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};
use tether_util::errors::{TetherError, TetherResult};

use crate::capability::Capability;
use crate::module::{Module, ModuleId, NativeLibrary};
use crate::requirement::{Requirement, Visibility};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Universe {
    #[serde(default, rename = "module")]
    pub modules: Vec<ModuleEntry>,
}

/// One `[[module]]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ModuleEntry {
    pub name: String,
    /// Defaults to `name`.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub singleton: bool,
    /// Resolve and commit this module before running any command.
    #[serde(default)]
    pub resolved: bool,
    #[serde(default)]
    pub execution_environment: Option<String>,
    #[serde(default)]
    pub content: Vec<String>,
    #[serde(default)]
    pub export: Vec<ExportEntry>,
    #[serde(default)]
    pub import: Vec<ImportEntry>,
    #[serde(default)]
    pub require: Vec<RequireEntry>,
    #[serde(default)]
    pub dynamic_import: Vec<ImportEntry>,
    #[serde(default)]
    pub native: Option<Vec<NativeLibrary>>,
}

fn default_version() -> String {
    "0.0.0".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportEntry {
    pub package: String,
    /// Defaults to the module version.
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub uses: Vec<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportEntry {
    pub package: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequireEntry {
    pub module: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub visibility: Visibility,
}

impl Universe {
    pub fn from_path(path: &Path) -> TetherResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| TetherError::Universe {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        Self::from_str(&content)
    }

    pub fn from_str(content: &str) -> TetherResult<Self> {
        toml::from_str(content).map_err(|e| {
            TetherError::Universe {
                message: format!("Failed to parse universe: {e}"),
            }
            .into()
        })
    }

    /// Build every declared module, in file order.
    pub fn to_modules(&self) -> TetherResult<Vec<Module>> {
        self.modules.iter().map(ModuleEntry::to_module).collect()
    }

    /// Ids of modules marked `resolved = true`, in file order.
    pub fn preresolved(&self) -> Vec<ModuleId> {
        self.modules
            .iter()
            .filter(|m| m.resolved)
            .map(ModuleEntry::module_id)
            .collect()
    }
}

impl ModuleEntry {
    pub fn module_id(&self) -> ModuleId {
        ModuleId::new(self.id.clone().unwrap_or_else(|| self.name.clone()))
    }

    pub fn to_module(&self) -> TetherResult<Module> {
        let id = self.module_id();
        let version = parse_version(&id, &self.version)?;
        let mut builder = Module::builder(id.as_str(), self.name.as_str(), version.clone());

        if self.singleton {
            builder = builder.singleton();
        }
        if let Some(ref env) = self.execution_environment {
            builder = builder.execution_environment(env);
        }
        if let Some(ref libs) = self.native {
            builder = builder.native_libraries(libs.clone());
        }
        for entry in &self.content {
            builder = builder.content(entry);
        }

        for export in &self.export {
            let cap_version = match export.version {
                Some(ref v) => parse_version(&id, v)?,
                None => version.clone(),
            };
            let mut cap = Capability::for_package(id.clone(), export.package.as_str(), cap_version)
                .with_uses(export.uses.iter().cloned());
            cap.attributes = export.attributes.clone();
            builder = builder.capability(cap);
        }

        for import in &self.import {
            builder = builder.requirement(import.to_requirement(&id)?);
        }
        for require in &self.require {
            let mut req = Requirement::require(require.module.as_str());
            if let Some(ref v) = require.version {
                req = req.with_version(parse_range(&id, v)?);
            }
            req.optional = require.optional;
            req.visibility = require.visibility;
            builder = builder.requirement(req);
        }
        for dynamic in &self.dynamic_import {
            builder = builder.dynamic_requirement(dynamic.to_requirement(&id)?);
        }

        Ok(builder.finish())
    }
}

impl ImportEntry {
    fn to_requirement(&self, owner: &ModuleId) -> TetherResult<Requirement> {
        let mut req = Requirement::import(self.package.as_str());
        if let Some(ref v) = self.version {
            req = req.with_version(parse_range(owner, v)?);
        }
        req.optional = self.optional;
        req.attributes = self.attributes.clone();
        Ok(req)
    }
}

fn parse_version(owner: &ModuleId, raw: &str) -> TetherResult<Version> {
    Version::parse(raw.trim()).map_err(|e| {
        TetherError::Universe {
            message: format!("module '{owner}': invalid version '{raw}': {e}"),
        }
        .into()
    })
}

fn parse_range(owner: &ModuleId, raw: &str) -> TetherResult<VersionReq> {
    VersionReq::parse(raw.trim()).map_err(|e| {
        TetherError::Universe {
            message: format!("module '{owner}': invalid version range '{raw}': {e}"),
        }
        .into()
    })
}
