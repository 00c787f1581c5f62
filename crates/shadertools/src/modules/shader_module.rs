use std::{fmt, sync::Arc};

/// Shared handle to a shader module
///
/// Dependencies are held by reference, so a module required by several
/// dependents is a single entity in the graph.
pub type ModuleRef = Arc<ShaderModule>;

/// A named unit of shader source with an ordered list of dependencies
///
/// A module is immutable once it is shared through [`ModuleRef`]. Since its
/// dependencies must exist before it can be built, a graph of modules never
/// contains a cycle.
#[derive(Clone)]
pub struct ShaderModule {
    /// Unique module name
    name: String,
    /// Optional human-readable description
    description: Option<String>,
    /// Direct dependencies in declaration order
    dependencies: Vec<ModuleRef>,
}

impl ShaderModule {
    /// Creates a module with no dependencies
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            dependencies: Vec::new(),
        }
    }

    /// Appends dependencies, keeping the given order
    pub fn with_dependencies(mut self, dependencies: impl IntoIterator<Item = ModuleRef>) -> Self {
        self.dependencies.extend(dependencies);
        self
    }

    /// Sets the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Freezes the module into a shareable handle
    pub fn into_ref(self) -> ModuleRef {
        Arc::new(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Direct dependencies in declaration order
    pub fn dependencies(&self) -> &[ModuleRef] {
        &self.dependencies
    }
}

// Dependencies are listed by name; printing them in full would repeat every
// shared subgraph.
impl fmt::Debug for ShaderModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderModule")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("dependencies", &self.dependencies.iter().map(|dependency| dependency.name()).collect::<Vec<_>>())
            .finish()
    }
}
