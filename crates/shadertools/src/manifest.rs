//! Module Library Manifest Parser
//!
//! This module provides parsing and validation for YAML manifest files that
//! declare a library of shader modules. Modules refer to their dependencies by
//! name; linking a manifest into shared module graphs is done by
//! [`ModuleRegistry::from_manifest`](crate::ModuleRegistry::from_manifest).

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, sync::LazyLock};
use thiserror::Error;

static MODULE_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$").expect("module name pattern is valid"));

/// Returns true if `name` can be used as a module name
///
/// Names start with a letter or underscore, followed by letters, digits,
/// underscores or hyphens (e.g. `fp64-arithmetic`).
pub fn is_valid_module_name(name: &str) -> bool {
    MODULE_NAME_PATTERN.is_match(name)
}

/// A single module declaration in a library manifest
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModuleSpec {
    /// Unique module name
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Names of the modules this module depends on, in order
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// Raw module library as parsed from YAML
///
/// Contains the unlinked module declarations before they are turned into a
/// shared module graph.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LibraryManifest {
    /// Unique library identifier
    pub id: String,
    /// Human-readable library name
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Module declarations
    pub modules: Vec<ModuleSpec>,
}

impl LibraryManifest {
    /// Parses a module library from YAML content
    ///
    /// # Arguments
    /// * `yaml_content` - YAML string containing the manifest
    pub fn from_yaml(yaml_content: &str) -> Result<Self, serde_norway::Error> {
        serde_norway::from_str(yaml_content)
    }

    /// Parses a module library from a YAML file
    ///
    /// # Arguments
    /// * `path` - Path to the YAML manifest file
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_yaml(&content)?)
    }

    /// Finds a module declaration by name
    pub fn module(&self, name: &str) -> Option<&ModuleSpec> {
        self.modules.iter().find(|module| module.name == name)
    }

    /// Validates the manifest for structural correctness
    ///
    /// Checks for empty identifiers, malformed or duplicate module names,
    /// self-dependencies, repeated dependencies and references to undeclared
    /// modules. Cycles spanning several modules are detected when linking.
    ///
    /// # Returns
    /// Ok(()) if valid, or the first validation error found
    pub fn validate(&self) -> Result<(), ManifestValidationError> {
        if self.id.is_empty() {
            return Err(ManifestValidationError::EmptyId);
        }

        if self.name.is_empty() {
            return Err(ManifestValidationError::EmptyName);
        }

        if self.modules.is_empty() {
            return Err(ManifestValidationError::NoModules);
        }

        let mut declared = HashSet::new();
        for module in &self.modules {
            if !is_valid_module_name(&module.name) {
                return Err(ManifestValidationError::InvalidModuleName(module.name.clone()));
            }
            if !declared.insert(module.name.as_str()) {
                return Err(ManifestValidationError::DuplicateModule(module.name.clone()));
            }
        }

        for module in &self.modules {
            let mut seen = HashSet::new();
            for dependency in &module.dependencies {
                if *dependency == module.name {
                    return Err(ManifestValidationError::SelfDependency(module.name.clone()));
                }
                if !seen.insert(dependency.as_str()) {
                    return Err(ManifestValidationError::DuplicateDependency {
                        module: module.name.clone(),
                        dependency: dependency.clone(),
                    });
                }
                if !declared.contains(dependency.as_str()) {
                    return Err(ManifestValidationError::UnknownDependency {
                        module: module.name.clone(),
                        dependency: dependency.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Errors that can occur during manifest validation
///
/// These errors indicate problems with the library declaration that prevent
/// it from being linked into a module graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManifestValidationError {
    /// Library ID field is empty
    #[error("Library ID cannot be empty")]
    EmptyId,
    /// Library name field is empty
    #[error("Library name cannot be empty")]
    EmptyName,
    /// Library declares no modules
    #[error("Library must declare at least one module")]
    NoModules,
    /// A module name does not match the allowed pattern
    #[error("Invalid module name '{0}'")]
    InvalidModuleName(String),
    /// Two modules share a name
    #[error("Module '{0}' is declared more than once")]
    DuplicateModule(String),
    /// A module lists itself as a dependency
    #[error("Module '{0}' depends on itself")]
    SelfDependency(String),
    /// A dependency appears twice in one module's list
    #[error("Module '{module}' lists dependency '{dependency}' more than once")]
    DuplicateDependency { module: String, dependency: String },
    /// A dependency refers to a module that is not declared
    #[error("Missing dependency: {dependency} required by {module}")]
    UnknownDependency { module: String, dependency: String },
}
