//! Shader module graph and the algorithms that walk it
//!
//! This module provides the shared module type together with the two graph
//! walks consumed by the shader composition pipeline: dependency-ordered
//! resolution and depth analysis.

mod depth;
mod resolve;
mod shader_module;

pub use depth::{DepthMap, dependency_levels};
pub use resolve::resolve_modules;
pub use shader_module::{ModuleRef, ShaderModule};
