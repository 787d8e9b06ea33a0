//! # Configuration
//!
//! YAML configuration of a generation run:
//!
//! ```yaml
//! apiPath: [/login]
//! typeFile: src/types.rs
//! logic:   { file: src/logic.rs, imports: ["use crate::types;"] }
//! handler: { file: src/handlers.rs, imports: ["use crate::{logic, types};"] }
//! router:  { file: src/router.rs, groupFunc: user_router, imports: ["use crate::handlers;"] }
//! ```
//!
//! Relative paths are resolved against the directory of the configuration file.

use crate::error::{AppError, AppResult};
use crate::route_groups::RouterDialect;
use crate::source::{module_name, read_source};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// A generation run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Prefix of the route paths documented on handlers.
    #[serde(default)]
    pub basic_path: String,
    /// Route paths to generate. Empty means every annotated path.
    #[serde(default)]
    pub api_path: Vec<String>,
    /// File declaring the annotated request/response types.
    pub type_file: PathBuf,
    /// Module the types are referenced through. Defaults to the file stem.
    #[serde(default)]
    pub type_module: Option<String>,
    /// Where logic functions go.
    pub logic: TargetFile,
    /// Where handler functions go.
    pub handler: TargetFile,
    /// Where routes are registered.
    pub router: RouterTarget,
}

/// A file receiving generated declarations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetFile {
    /// Path of the file.
    pub file: PathBuf,
    /// Module the file is referenced through. Defaults to the file stem.
    #[serde(default)]
    pub module: Option<String>,
    /// `use` lines merged into the file.
    #[serde(default)]
    pub imports: Vec<String>,
}

impl TargetFile {
    /// Module name of the file.
    pub fn module_name(&self) -> String {
        self.module.clone().unwrap_or_else(|| module_name(&self.file))
    }
}

/// The routing file and its entry function.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterTarget {
    /// Path of the routing file.
    pub file: PathBuf,
    /// Name of the entry function routes are registered in.
    pub group_func: String,
    /// `use` lines merged into the file.
    #[serde(default)]
    pub imports: Vec<String>,
    /// Router API conventions.
    #[serde(flatten)]
    pub dialect: RouterDialect,
}

impl Config {
    /// Parses a configuration from YAML text. Paths are left as written.
    pub fn from_yaml(text: &str) -> AppResult<Self> {
        let config: Config =
            serde_yaml::from_str(text).map_err(|e| AppError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the configuration file at `path`, resolving relative paths
    /// against its directory.
    pub fn load(path: &Path) -> AppResult<Self> {
        let text = read_source(path)?;
        let mut config = Self::from_yaml(&text).map_err(|e| match e {
            AppError::Config(msg) => AppError::Config(format!("{}: {}", path.display(), msg)),
            other => other,
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        config.resolve_paths(base);
        Ok(config)
    }

    /// Makes every relative path relative to `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        for p in [
            &mut self.type_file,
            &mut self.logic.file,
            &mut self.handler.file,
            &mut self.router.file,
        ] {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        }
    }

    /// Module name of the type file.
    pub fn type_module_name(&self) -> String {
        self.type_module
            .clone()
            .unwrap_or_else(|| module_name(&self.type_file))
    }

    fn validate(&self) -> AppResult<()> {
        if self.router.group_func.trim().is_empty() {
            return Err(AppError::Config("router.groupFunc must not be empty".into()));
        }
        if self.router.dialect.group_method.trim().is_empty() {
            return Err(AppError::Config("router.groupMethod must not be empty".into()));
        }
        if let Some(p) = self.api_path.iter().find(|p| p.trim().is_empty()) {
            return Err(AppError::Config(format!("Invalid apiPath entry '{}'", p)));
        }
        Ok(())
    }
}
