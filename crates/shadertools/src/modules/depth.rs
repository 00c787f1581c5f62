//! Dependency depth analysis
//!
//! Assigns every module reachable from a set of requested roots the deepest
//! level at which it was observed, counting one level per dependency hop. The
//! result is used for diagnostics and for grouping modules by how foundational
//! they are; it is not needed for composition order.

use super::{ModuleRef, ShaderModule};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Mapping from module name to its dependency level
///
/// A level is only ever raised, never lowered: a module seen both as a root
/// and as a remote transitive dependency keeps the deeper level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DepthMap {
    levels: BTreeMap<String, usize>,
}

impl DepthMap {
    /// Creates an empty depth map
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the requested modules at `level` and their dependencies below it
    ///
    /// Observations accumulate across calls, so one map can collect several
    /// independent requests. Existing entries are raised to the deeper level
    /// when needed and are never lowered.
    ///
    /// # Arguments
    /// * `requested` - Root modules, processed in order
    /// * `level` - Level assigned to the roots; each dependency hop adds one,
    ///   saturating at `usize::MAX`
    ///
    /// # Stack usage
    /// The walk recurses once per dependency hop, so the longest dependency
    /// chain must fit on the calling thread's stack.
    pub fn record(&mut self, requested: &[ModuleRef], level: usize) {
        for module in requested {
            self.visit(module, level);
        }
    }

    fn visit(&mut self, module: &ShaderModule, level: usize) {
        match self.levels.get_mut(module.name()) {
            // Every descendant already sits at least this deep below the module
            Some(existing) if *existing >= level => return,
            Some(existing) => *existing = level,
            None => {
                self.levels.insert(module.name().to_string(), level);
            }
        }

        for dependency in module.dependencies() {
            self.visit(dependency, level.saturating_add(1));
        }
    }

    /// Returns the level of a module, if it was reached
    pub fn level(&self, name: &str) -> Option<usize> {
        self.levels.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.levels.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Iterates over `(name, level)` pairs sorted by name
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.levels.iter().map(|(name, level)| (name.as_str(), *level))
    }

    /// The deepest level in the map
    pub fn max_level(&self) -> Option<usize> {
        self.levels.values().copied().max()
    }

    /// Groups module names by level
    ///
    /// # Returns
    /// Levels in ascending order, each with its module names sorted by name
    pub fn groups(&self) -> BTreeMap<usize, Vec<&str>> {
        let mut groups: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
        for (name, level) in self.iter() {
            groups.entry(level).or_default().push(name);
        }
        groups
    }

    pub fn into_inner(self) -> BTreeMap<String, usize> {
        self.levels
    }
}

/// Computes the dependency level of every module reachable from `requested`
///
/// The roots are recorded at `base_level` and each dependency hop adds one. A
/// module reachable through several paths ends up at the maximum depth over
/// all of them, regardless of traversal order.
///
/// # Arguments
/// * `requested` - Root modules
/// * `base_level` - Level of the roots (usually 0); levels saturate at
///   `usize::MAX` instead of wrapping
///
/// # Stack usage
/// Recursion depth equals the longest dependency chain below `requested`; a
/// chain too long for the calling thread's stack overflows it.
pub fn dependency_levels(requested: &[ModuleRef], base_level: usize) -> DepthMap {
    let mut depth_map = DepthMap::new();
    depth_map.record(requested, base_level);

    debug!("Computed dependency levels for {} shader modules (max level {:?})", depth_map.len(), depth_map.max_level());
    depth_map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::fixtures::projection_graph;

    fn levels(pairs: &[(&str, usize)]) -> BTreeMap<String, usize> {
        pairs.iter().map(|(name, level)| (name.to_string(), *level)).collect()
    }

    #[test]
    fn test_projection_graph_levels() {
        let graph = projection_graph();

        let depth_map = dependency_levels(&[graph.project64.clone(), graph.project.clone()], 0);
        assert_eq!(depth_map.into_inner(), levels(&[("fp32", 2), ("project", 1), ("fp64", 1), ("project64", 0)]));
    }

    #[test]
    fn test_root_keeps_deeper_level_when_requested_later() {
        let graph = projection_graph();

        // project is first recorded as a root at 0, then raised to 1 via project64
        let depth_map = dependency_levels(&[graph.project.clone(), graph.project64.clone()], 0);
        assert_eq!(depth_map.level("project"), Some(1));
        assert_eq!(depth_map.level("fp32"), Some(2));
        assert_eq!(depth_map.level("project64"), Some(0));
    }

    #[test]
    fn test_base_level_offsets_all_levels() {
        let graph = projection_graph();

        let depth_map = dependency_levels(&[graph.project64.clone()], 3);
        assert_eq!(depth_map.into_inner(), levels(&[("fp32", 5), ("project", 4), ("fp64", 4), ("project64", 3)]));
    }

    #[test]
    fn test_maximum_depth_wins_in_either_traversal_order() {
        // x is reachable directly from the root (depth 1) and via a -> b (depth 3)
        let x = ShaderModule::new("x").into_ref();
        let b = ShaderModule::new("b").with_dependencies([x.clone()]).into_ref();
        let a = ShaderModule::new("a").with_dependencies([b]).into_ref();

        let deep_first = ShaderModule::new("root").with_dependencies([a.clone(), x.clone()]).into_ref();
        let shallow_first = ShaderModule::new("root").with_dependencies([x, a]).into_ref();

        assert_eq!(dependency_levels(&[deep_first], 0).level("x"), Some(3));
        assert_eq!(dependency_levels(&[shallow_first], 0).level("x"), Some(3));
    }

    #[test]
    fn test_raised_level_propagates_to_descendants() {
        // leaf is first seen below mid at depth 2, then mid is raised and leaf with it
        let leaf = ShaderModule::new("leaf").into_ref();
        let mid = ShaderModule::new("mid").with_dependencies([leaf]).into_ref();
        let deep = ShaderModule::new("deep").with_dependencies([mid.clone()]).into_ref();
        let deeper = ShaderModule::new("deeper").with_dependencies([deep]).into_ref();
        let root = ShaderModule::new("root").with_dependencies([mid, deeper]).into_ref();

        let depth_map = dependency_levels(&[root], 0);
        assert_eq!(depth_map.into_inner(), levels(&[("root", 0), ("deeper", 1), ("deep", 2), ("mid", 3), ("leaf", 4)]));
    }

    #[test]
    fn test_record_accumulates_and_never_lowers() {
        let graph = projection_graph();

        let mut depth_map = DepthMap::new();
        depth_map.record(&[graph.project.clone()], 2);
        depth_map.record(&[graph.project64.clone()], 0);

        assert_eq!(depth_map.level("project"), Some(2));
        assert_eq!(depth_map.level("fp32"), Some(3));
        assert_eq!(depth_map.level("fp64"), Some(1));
        assert_eq!(depth_map.level("project64"), Some(0));
    }

    #[test]
    fn test_duplicate_roots_and_empty_request() {
        let a = ShaderModule::new("a").into_ref();

        let depth_map = dependency_levels(&[a.clone(), a], 0);
        assert_eq!(depth_map.len(), 1);
        assert_eq!(depth_map.level("a"), Some(0));

        let empty = dependency_levels(&[], 0);
        assert!(empty.is_empty());
        assert_eq!(empty.max_level(), None);
    }

    #[test]
    fn test_groups_by_level() {
        let graph = projection_graph();

        let depth_map = dependency_levels(&[graph.project64.clone()], 0);
        let groups = depth_map.groups();

        assert_eq!(groups.len(), 3);
        assert_eq!(groups[&0], vec!["project64"]);
        assert_eq!(groups[&1], vec!["fp64", "project"]);
        assert_eq!(groups[&2], vec!["fp32"]);
        assert_eq!(depth_map.max_level(), Some(2));
    }

    #[test]
    fn test_wide_diamond_chain_matches_longest_path() {
        // Each layer holds two modules depending on both modules of the next layer,
        // so the number of paths doubles per layer while the depth grows linearly
        let mut below: Vec<ModuleRef> = Vec::new();
        for layer in (0..24).rev() {
            below = (0..2).map(|i| ShaderModule::new(format!("l{layer}_{i}")).with_dependencies(below.clone()).into_ref()).collect();
        }

        let depth_map = dependency_levels(&below, 0);
        assert_eq!(depth_map.len(), 48);
        assert_eq!(depth_map.level("l0_0"), Some(0));
        assert_eq!(depth_map.level("l23_1"), Some(23));
        assert_eq!(depth_map.max_level(), Some(23));
    }

    #[test]
    fn test_levels_saturate_at_maximum_base_level() {
        let leaf = ShaderModule::new("leaf").into_ref();
        let mid = ShaderModule::new("mid").with_dependencies([leaf]).into_ref();
        let root = ShaderModule::new("root").with_dependencies([mid]).into_ref();

        let depth_map = dependency_levels(&[root.clone()], usize::MAX);
        assert_eq!(depth_map.level("root"), Some(usize::MAX));
        assert_eq!(depth_map.level("mid"), Some(usize::MAX));
        assert_eq!(depth_map.level("leaf"), Some(usize::MAX));

        let depth_map = dependency_levels(&[root], usize::MAX - 1);
        assert_eq!(depth_map.level("root"), Some(usize::MAX - 1));
        assert_eq!(depth_map.level("mid"), Some(usize::MAX));
        assert_eq!(depth_map.level("leaf"), Some(usize::MAX));
    }

    #[test]
    fn test_long_linear_chain() {
        let mut top = ShaderModule::new("m0").into_ref();
        for i in 1..1000 {
            top = ShaderModule::new(format!("m{i}")).with_dependencies([top]).into_ref();
        }

        let depth_map = dependency_levels(&[top], 0);
        assert_eq!(depth_map.len(), 1000);
        assert_eq!(depth_map.level("m999"), Some(0));
        assert_eq!(depth_map.level("m0"), Some(999));
    }

    #[test]
    fn test_serializes_as_flat_object() {
        let graph = projection_graph();

        let depth_map = dependency_levels(&[graph.project.clone()], 0);
        let json = serde_json::to_string(&depth_map).unwrap();
        assert_eq!(json, r#"{"fp32":1,"project":0}"#);
    }
}
