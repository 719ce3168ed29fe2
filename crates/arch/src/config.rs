//! Graph options

use crate::graph::{DotOptions, Targets};
use crate::plantuml::UmlOptions;
use crate::resolver::DependencyScope;

/// Everything `create_graph` can be asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphOptions {
    pub dependencies_only: bool,
    pub recursive: bool,
    pub merge: bool,
    pub no_methods: bool,
    pub no_properties: bool,
    pub no_types: bool,
    pub svg_output: bool,
    pub dot_output: bool,
    pub plant_output: bool,
    pub scope: DependencyScope,
    /// Graphviz executable used for SVG output
    pub dot_program: String,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            dependencies_only: false,
            recursive: false,
            merge: false,
            no_methods: false,
            no_properties: false,
            no_types: false,
            svg_output: false,
            dot_output: false,
            plant_output: false,
            scope: DependencyScope::All,
            dot_program: "dot".to_string(),
        }
    }
}

impl GraphOptions {
    /// Defaults overridden by `TSGRAPH_DEPENDENCY_SCOPE` and `TSGRAPH_DOT_PROGRAM`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut options = Self::default();

        if let Some(v) = lookup("TSGRAPH_DEPENDENCY_SCOPE") {
            match v.parse() {
                Ok(scope) => options.scope = scope,
                Err(e) => tracing::warn!("Ignoring TSGRAPH_DEPENDENCY_SCOPE: {}", e),
            }
        }

        if let Some(v) = lookup("TSGRAPH_DOT_PROGRAM") {
            if !v.trim().is_empty() {
                options.dot_program = v;
            }
        }

        options
    }

    pub fn with_dependencies_only(mut self, on: bool) -> Self {
        self.dependencies_only = on;
        self
    }

    pub fn with_recursive(mut self, on: bool) -> Self {
        self.recursive = on;
        self
    }

    pub fn with_merge(mut self, on: bool) -> Self {
        self.merge = on;
        self
    }

    pub fn with_no_methods(mut self, on: bool) -> Self {
        self.no_methods = on;
        self
    }

    pub fn with_no_properties(mut self, on: bool) -> Self {
        self.no_properties = on;
        self
    }

    pub fn with_no_types(mut self, on: bool) -> Self {
        self.no_types = on;
        self
    }

    pub fn with_svg_output(mut self, on: bool) -> Self {
        self.svg_output = on;
        self
    }

    pub fn with_dot_output(mut self, on: bool) -> Self {
        self.dot_output = on;
        self
    }

    pub fn with_plant_output(mut self, on: bool) -> Self {
        self.plant_output = on;
        self
    }

    pub fn with_scope(mut self, scope: DependencyScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_dot_program(mut self, program: impl Into<String>) -> Self {
        self.dot_program = program.into();
        self
    }

    pub fn dot_options(&self) -> DotOptions {
        DotOptions {
            dependencies_only: self.dependencies_only,
            no_methods: self.no_methods,
            no_properties: self.no_properties,
            scope: self.scope,
        }
    }

    pub fn uml_options(&self) -> UmlOptions {
        UmlOptions {
            no_methods: self.no_methods,
            no_properties: self.no_properties,
            no_types: self.no_types,
        }
    }

    pub fn targets(&self) -> Targets {
        Targets {
            dot: self.dot_output,
            svg: self.svg_output,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_options_default() {
        let options = GraphOptions::default();
        assert_eq!(options.scope, DependencyScope::All);
        assert_eq!(options.dot_program, "dot");
        assert!(!options.plant_output);
    }

    #[test]
    fn test_graph_options_from_lookup() {
        let options = GraphOptions::from_lookup(|key| match key {
            "TSGRAPH_DEPENDENCY_SCOPE" => Some("declarations".to_string()),
            "TSGRAPH_DOT_PROGRAM" => Some("/opt/graphviz/bin/dot".to_string()),
            _ => None,
        });
        assert_eq!(options.scope, DependencyScope::Declarations);
        assert_eq!(options.dot_program, "/opt/graphviz/bin/dot");
    }

    #[test]
    fn test_graph_options_ignore_bad_values() {
        let options = GraphOptions::from_lookup(|key| match key {
            "TSGRAPH_DEPENDENCY_SCOPE" => Some("everything".to_string()),
            "TSGRAPH_DOT_PROGRAM" => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(options, GraphOptions::default());
    }

    #[test]
    fn test_builder_feeds_renderer_options() {
        let options = GraphOptions::default()
            .with_no_methods(true)
            .with_no_types(true)
            .with_svg_output(true)
            .with_scope(DependencyScope::Declarations);
        let dot = options.dot_options();
        assert!(dot.no_methods);
        assert_eq!(dot.scope, DependencyScope::Declarations);
        assert!(options.uml_options().no_types);
        assert!(options.targets().svg);
        assert!(!options.targets().dot);
    }
}
