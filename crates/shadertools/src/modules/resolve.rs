//! Dependency-ordered module resolution
//!
//! Flattens a requested list of modules into a deduplicated sequence of names in
//! which every module appears after all of its dependencies. The shader
//! composition pipeline concatenates module sources in this order.

use super::{ModuleRef, ShaderModule};
use std::collections::HashSet;
use tracing::{debug, trace};

/// Resolves the requested modules into dependency order
///
/// Modules are visited depth-first in request order, and each module's
/// dependencies are visited in declaration order before the module itself is
/// emitted. A module reachable from several places is emitted once, at the
/// position where it is first reached; later encounters are ignored. The
/// result is therefore deterministic but depends on the order of `requested`
/// and of every dependency list.
///
/// # Arguments
/// * `requested` - Root modules, possibly with duplicates or modules that are
///   also dependencies of other roots
///
/// # Returns
/// Module names, each exactly once, dependencies before dependents
///
/// # Stack usage
/// The walk recurses once per dependency hop, so recursion depth equals the
/// longest dependency chain below `requested`. A chain too long for the
/// calling thread's stack overflows it.
pub fn resolve_modules(requested: &[ModuleRef]) -> Vec<String> {
    let mut added = HashSet::new();
    let mut order = Vec::new();

    for module in requested {
        visit(module, &mut added, &mut order);
    }

    debug!("Resolved {} requested shader modules into {} modules: {}", requested.len(), order.len(), order.join(", "));
    order
}

/// Post-order visit: dependencies first, then the module itself
fn visit<'a>(module: &'a ShaderModule, added: &mut HashSet<&'a str>, order: &mut Vec<String>) {
    if added.contains(module.name()) {
        return;
    }

    for dependency in module.dependencies() {
        visit(dependency, added, order);
    }

    trace!("Adding shader module: {}", module.name());
    added.insert(module.name());
    order.push(module.name().to_string());
}
