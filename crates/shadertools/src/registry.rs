//! Name-based access to shader modules
//!
//! A [`ModuleRegistry`] is owned by the caller and maps module names to shared
//! modules, so requests can be expressed by name. Registries are also the
//! product of linking a [`LibraryManifest`], which is where dependency cycles
//! in name-based declarations are detected.

use crate::manifest::{LibraryManifest, ManifestValidationError, ModuleSpec};
use crate::modules::{DepthMap, ModuleRef, ShaderModule, dependency_levels, resolve_modules};
use std::{
    collections::{HashMap, hash_map::Entry},
    sync::Arc,
};
use thiserror::Error;
use tracing::{debug, trace};

/// Errors that can occur when looking up, registering or linking modules
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Unknown shader module: {name}")]
    UnknownModule { name: String },

    #[error("Shader module '{name}' is already registered with a different definition")]
    DuplicateModule { name: String },

    #[error("Circular dependency detected: {}", cycle.join(" -> "))]
    CircularDependency { cycle: Vec<String> },

    #[error("Invalid module library: {0}")]
    InvalidManifest(#[from] ManifestValidationError),
}

/// Caller-owned lookup table from module name to shared module
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    /// Registered modules by name
    modules: HashMap<String, ModuleRef>,
    /// Module names in registration order
    names: Vec<String>,
}

impl ModuleRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Links a module library manifest into a registry
    ///
    /// The manifest is validated, then every declared module is built once,
    /// after its dependencies, so a dependency shared by several modules is a
    /// single shared entity. Modules are registered in declaration order.
    ///
    /// # Returns
    /// The linked registry, or an error for invalid manifests and cycles
    pub fn from_manifest(manifest: &LibraryManifest) -> Result<Self, RegistryError> {
        manifest.validate()?;
        debug!("Linking module library '{}' ({} modules)", manifest.id, manifest.modules.len());

        let mut linker = Linker::new(manifest);
        let mut registry = Self::new();
        for spec in &manifest.modules {
            let module = linker.link(&spec.name)?;
            registry.insert(module);
        }

        Ok(registry)
    }

    /// Parses and links a module library from YAML content
    pub fn from_yaml(yaml_content: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let manifest = LibraryManifest::from_yaml(yaml_content)?;
        Ok(Self::from_manifest(&manifest)?)
    }

    /// Parses and links a module library from a YAML file
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let manifest = LibraryManifest::from_file(path)?;
        Ok(Self::from_manifest(&manifest)?)
    }

    /// Registers a module together with all of its transitive dependencies
    ///
    /// Registering the same shared module again is a no-op. Registering a
    /// different module under a name that is already taken fails, and in that
    /// case nothing is registered.
    pub fn register(&mut self, module: ModuleRef) -> Result<(), RegistryError> {
        let mut pending: HashMap<&str, &ModuleRef> = HashMap::new();
        let mut order = Vec::new();
        self.collect_unregistered(&module, &mut pending, &mut order)?;

        for module in order {
            self.insert(module);
        }
        Ok(())
    }

    /// Collects modules that are not yet registered, dependencies first
    fn collect_unregistered<'a>(&self, module: &'a ModuleRef, pending: &mut HashMap<&'a str, &'a ModuleRef>, order: &mut Vec<ModuleRef>) -> Result<(), RegistryError> {
        let existing = self.modules.get(module.name()).or_else(|| pending.get(module.name()).copied());
        if let Some(existing) = existing {
            if Arc::ptr_eq(existing, module) {
                return Ok(());
            }
            return Err(RegistryError::DuplicateModule { name: module.name().to_string() });
        }

        pending.insert(module.name(), module);
        for dependency in module.dependencies() {
            self.collect_unregistered(dependency, pending, order)?;
        }
        order.push(module.clone());
        Ok(())
    }

    fn insert(&mut self, module: ModuleRef) {
        if let Entry::Vacant(entry) = self.modules.entry(module.name().to_string()) {
            trace!("Registering shader module: {}", module.name());
            self.names.push(module.name().to_string());
            entry.insert(module);
        }
    }

    /// Gets a module by name
    pub fn get(&self, name: &str) -> Option<&ModuleRef> {
        self.modules.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Iterates over module names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|name| name.as_str())
    }

    /// Maps module names to the registered modules, keeping the given order
    pub fn lookup<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<ModuleRef>, RegistryError> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.modules.get(name).cloned().ok_or_else(|| RegistryError::UnknownModule { name: name.to_string() })
            })
            .collect()
    }

    /// Resolves the named modules into dependency order
    ///
    /// See [`resolve_modules`] for the ordering rules.
    pub fn resolve<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<String>, RegistryError> {
        Ok(resolve_modules(&self.lookup(names)?))
    }

    /// Computes dependency levels for the named modules
    ///
    /// See [`dependency_levels`] for the level rules.
    pub fn dependency_levels<S: AsRef<str>>(&self, names: &[S], base_level: usize) -> Result<DepthMap, RegistryError> {
        Ok(dependency_levels(&self.lookup(names)?, base_level))
    }
}

/// Builds shared modules from name-based declarations
///
/// Each module is built once, after its dependencies. The chain of modules
/// currently being built is kept to report cycles with their full path.
struct Linker<'a> {
    /// Declarations by name
    declared: HashMap<&'a str, &'a ModuleSpec>,
    /// Modules built so far
    built: HashMap<&'a str, ModuleRef>,
    /// Modules whose dependencies are being built, outermost first
    in_progress: Vec<&'a str>,
}

impl<'a> Linker<'a> {
    fn new(manifest: &'a LibraryManifest) -> Self {
        Self {
            declared: manifest.modules.iter().map(|spec| (spec.name.as_str(), spec)).collect(),
            built: HashMap::new(),
            in_progress: Vec::new(),
        }
    }

    fn link(&mut self, name: &'a str) -> Result<ModuleRef, RegistryError> {
        if let Some(module) = self.built.get(name) {
            return Ok(module.clone());
        }

        if let Some(start) = self.in_progress.iter().position(|&pending| pending == name) {
            let mut cycle: Vec<String> = self.in_progress[start..].iter().map(|pending| pending.to_string()).collect();
            cycle.push(name.to_string());
            return Err(RegistryError::CircularDependency { cycle });
        }

        let spec = *self.declared.get(name).ok_or_else(|| RegistryError::UnknownModule { name: name.to_string() })?;

        self.in_progress.push(name);
        let dependencies = spec.dependencies.iter().map(|dependency| self.link(dependency)).collect::<Result<Vec<_>, _>>()?;
        self.in_progress.pop();

        let mut module = ShaderModule::new(name).with_dependencies(dependencies);
        if let Some(description) = &spec.description {
            module = module.with_description(description.clone());
        }
        let module = module.into_ref();

        trace!("Linked shader module: {}", name);
        self.built.insert(name, module.clone());
        Ok(module)
    }
}
