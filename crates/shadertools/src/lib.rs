//! Shader module dependency resolution
//!
//! This crate flattens sets of reusable shader modules into a composition order
//! where every module follows the modules it depends on, and computes a depth map
//! describing how deeply each module sits in the dependency hierarchy.
//!
//! Modules are built bottom-up as shared, immutable [`ShaderModule`] values, so a
//! module graph assembled through this API is acyclic by construction. Name-based
//! module libraries (YAML manifests) are checked for cycles when they are linked
//! into a [`ModuleRegistry`].

mod modules;
mod registry;

pub mod manifest;
pub mod predefined;

pub use modules::{DepthMap, ModuleRef, ShaderModule, dependency_levels, resolve_modules};
pub use registry::{ModuleRegistry, RegistryError};
