//! Predefined shader module library.
//!
//! This module embeds the core module library shipped with the toolkit so it
//! can be used without any manifest files on disk.

use crate::{ModuleRegistry, manifest::LibraryManifest};

/// YAML manifest of the core module library.
///
/// Declares the projection modules (`fp32`, `fp64`, `project`, `project64`)
/// together with lighting, picking and geometry.
pub const PREDEFINED_LIBRARY: &str = include_str!("../modules/core.yaml");

/// Parses the core module library manifest.
pub fn manifest() -> Result<LibraryManifest, serde_norway::Error> {
    LibraryManifest::from_yaml(PREDEFINED_LIBRARY)
}

/// Links the core module library into a fresh registry.
pub fn load_registry() -> Result<ModuleRegistry, Box<dyn std::error::Error>> {
    ModuleRegistry::from_yaml(PREDEFINED_LIBRARY)
}
