//! Dependency graph rendering (Graphviz DOT, optionally SVG)
//!
//! Modules that own types become clusters holding one record node per type;
//! edges between modules attach to a type inside the cluster and are clipped
//! to the cluster border with `ltail`/`lhead`.

use crate::backend::ImageBackend;
use crate::dot::{record_label, sanitize_id, DotBuilder};
use crate::error::{Diagnostic, GraphError, Result};
use crate::model::{DeclarationKind, Member, MemberKind, Module, TypeDeclaration};
use crate::resolver::{self, DependencyScope};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default)]
pub struct DotOptions {
    pub dependencies_only: bool,
    pub no_methods: bool,
    pub no_properties: bool,
    pub scope: DependencyScope,
}

/// Which files to produce
#[derive(Debug, Clone, Copy, Default)]
pub struct Targets {
    pub dot: bool,
    pub svg: bool,
}

/// Files written plus non-fatal problems met on the way
#[derive(Debug, Default)]
pub struct WriteOutcome {
    pub written: Vec<PathBuf>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Where a module is drawn
struct Placement {
    /// Node edges attach to
    anchor: String,
    /// Cluster id when the module is drawn as a cluster
    cluster: Option<String>,
}

/// Render modules as DOT text.
///
/// Modules are looked up by name, so when several share a name every edge
/// pointing at that name lands on the first one drawn. Identical edges are
/// emitted once.
pub fn render(modules: &[Module], options: &DotOptions) -> String {
    let mut dot = DotBuilder::new("typegraph");
    dot.attr("compound", "true");
    dot.attr("rankdir", "LR");
    dot.node_style("shape=box, fontname=\"Helvetica\", fontsize=10");

    // one placement per module, in `Module::walk` order
    let mut placements: Vec<Placement> = Vec::new();
    for (i, module) in modules.iter().enumerate() {
        if options.dependencies_only {
            emit_plain(&mut dot, module, &format!("m{i}"), &mut placements);
        } else {
            emit_module(&mut dot, module, &format!("m{i}"), options, &mut placements);
        }
    }

    let walked: Vec<&Module> = modules.iter().flat_map(Module::walk).collect();
    let mut by_name: HashMap<&str, &Placement> = HashMap::new();
    for (module, placement) in walked.iter().zip(&placements) {
        by_name.entry(module.name.as_str()).or_insert(placement);
    }

    let mut edges: Vec<(&Placement, String)> = Vec::new();
    let mut external: BTreeSet<String> = BTreeSet::new();
    for (module, tail) in walked.iter().zip(&placements) {
        for dep in resolver::resolve(module, options.scope) {
            if !by_name.contains_key(dep.as_str()) {
                external.insert(dep.clone());
            }
            edges.push((tail, dep));
        }
    }

    for name in &external {
        dot.node_full(
            &external_id(name),
            &[("label", name.as_str()), ("style", "dashed"), ("shape", "box")],
        );
    }

    let mut seen: HashSet<(String, String)> = HashSet::new();
    for (tail, to) in edges {
        let (head_anchor, head_cluster) = match by_name.get(to.as_str()) {
            Some(p) => (p.anchor.clone(), p.cluster.clone()),
            None => (external_id(&to), None),
        };
        if tail.anchor == head_anchor || !seen.insert((tail.anchor.clone(), head_anchor.clone())) {
            continue;
        }
        let mut attrs: Vec<(&str, &str)> = Vec::new();
        if let Some(cluster) = &tail.cluster {
            attrs.push(("ltail", cluster.as_str()));
        }
        if let Some(cluster) = &head_cluster {
            attrs.push(("lhead", cluster.as_str()));
        }
        dot.edge_with_attrs(&tail.anchor, &head_anchor, &attrs);
    }

    dot.build()
}

fn module_id(path: &str, module: &Module) -> String {
    format!("{}_{}", path, sanitize_id(&module.name))
}

fn external_id(name: &str) -> String {
    format!("x_{}", sanitize_id(name))
}

fn emit_plain(dot: &mut DotBuilder, module: &Module, path: &str, placements: &mut Vec<Placement>) {
    let id = module_id(path, module);
    dot.node_full(&id, &[("label", module.name.as_str()), ("shape", "folder")]);
    placements.push(Placement {
        anchor: id,
        cluster: None,
    });
    for (j, child) in module.modules.iter().enumerate() {
        emit_plain(dot, child, &format!("{path}_{j}"), placements);
    }
}

fn emit_module(
    dot: &mut DotBuilder,
    module: &Module,
    path: &str,
    options: &DotOptions,
    placements: &mut Vec<Placement>,
) {
    if !module.has_declarations_in_tree() {
        emit_plain(dot, module, path, placements);
        return;
    }

    let id = module_id(path, module);
    dot.start_cluster(&id, &module.name);

    // a module without types of its own gets an invisible point so its edges
    // never share an endpoint with a nested module
    let anchor = match module.declarations().next() {
        Some(decl) => type_id(&id, decl.name()),
        None => {
            let point = format!("{id}__anchor");
            dot.node_full(&point, &[("shape", "point"), ("style", "invis")]);
            point
        }
    };
    placements.push(Placement {
        anchor,
        cluster: Some(format!("cluster_{id}")),
    });

    for decl in module.declarations() {
        dot.record(&type_id(&id, decl.name()), &type_label(decl, options));
    }
    for (j, child) in module.modules.iter().enumerate() {
        emit_module(dot, child, &format!("{path}_{j}"), options, placements);
    }
    dot.end_cluster();
}

fn type_id(module_id: &str, name: &str) -> String {
    format!("{}__{}", module_id, sanitize_id(name))
}

fn type_label(decl: &dyn TypeDeclaration, options: &DotOptions) -> String {
    let title = match decl.kind() {
        DeclarationKind::Class => decl.name().to_string(),
        DeclarationKind::AbstractClass => format!("«abstract» {}", decl.name()),
        DeclarationKind::Interface => format!("«interface» {}", decl.name()),
        DeclarationKind::Enum => format!("«enum» {}", decl.name()),
    };

    let line = |m: &Member| format!("{} {}", m.visibility.marker(), m.signature(true));
    let properties: Vec<String> = if options.no_properties {
        Vec::new()
    } else {
        decl.members()
            .iter()
            .filter(|m| m.kind == MemberKind::EnumValue)
            .map(|m| m.name.clone())
            .chain(decl.members().iter().filter(|m| m.kind == MemberKind::Property).map(line))
            .collect()
    };
    let methods: Vec<String> = if options.no_methods {
        Vec::new()
    } else {
        decl.members().iter().filter(|m| m.is_method()).map(line).collect()
    };
    record_label(&title, &[properties, methods])
}

/// Render and write the requested artifacts.
///
/// The DOT text goes to `output` (or its `.dot` sibling when `output` ends in
/// `.svg`) whenever DOT is requested, no image is requested, or the image
/// backend fails. SVG goes to the `.svg` sibling of `output`.
pub fn write(
    modules: &[Module],
    output: &Path,
    options: &DotOptions,
    targets: Targets,
    backend: &dyn ImageBackend,
) -> Result<WriteOutcome> {
    let text = render(modules, options);
    let mut outcome = WriteOutcome::default();
    let mut write_text = targets.dot || !targets.svg;

    if targets.svg {
        let svg_path = output.with_extension("svg");
        match backend.render_svg(&text) {
            Ok(svg) => {
                std::fs::write(&svg_path, svg).map_err(|e| GraphError::io(&svg_path, e))?;
                tracing::info!("Wrote {}", svg_path.display());
                outcome.written.push(svg_path);
            }
            Err(e) => {
                tracing::warn!("SVG rendering failed, keeping DOT text: {}", e);
                outcome
                    .diagnostics
                    .push(Diagnostic::RenderBackendUnavailable(e.to_string()));
                write_text = true;
            }
        }
    }

    if write_text {
        let text_path = text_path(output);
        std::fs::write(&text_path, &text).map_err(|e| GraphError::io(&text_path, e))?;
        tracing::info!("Wrote {}", text_path.display());
        outcome.written.push(text_path);
    }

    Ok(outcome)
}

fn text_path(output: &Path) -> PathBuf {
    let is_svg = output
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("svg"))
        .unwrap_or(false);
    if is_svg {
        output.with_extension("dot")
    } else {
        output.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendError;
    use crate::model::{Class, Dependency, DependencyKind, Enum, Interface};
    use tempfile::tempdir;

    struct FailingBackend;

    impl ImageBackend for FailingBackend {
        fn render_svg(&self, _dot: &str) -> std::result::Result<Vec<u8>, BackendError> {
            Err(BackendError::Spawn {
                program: "dot".into(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            })
        }
    }

    struct FakeBackend;

    impl ImageBackend for FakeBackend {
        fn render_svg(&self, dot: &str) -> std::result::Result<Vec<u8>, BackendError> {
            Ok(format!("<svg><!-- {} bytes --></svg>", dot.len()).into_bytes())
        }
    }

    fn sample() -> Vec<Module> {
        let mut a = Module::new("A");
        let mut foo = Class {
            name: "Foo".into(),
            ..Default::default()
        };
        foo.members.push(Member::property("bar", Some("Bar")));
        foo.members.push(Member::method("run", Some("void")));
        a.classes.push(foo);
        a.dependencies
            .push(Dependency::new("B", DependencyKind::Reference).with_target("Bar"));
        a.dependencies.push(Dependency::new("lodash", DependencyKind::Import));

        let mut b = Module::new("B");
        b.classes.push(Class {
            name: "Bar".into(),
            ..Default::default()
        });
        b.interfaces.push(Interface {
            name: "Shape".into(),
            ..Default::default()
        });
        b.enums.push(Enum {
            name: "Color".into(),
            members: vec![Member {
                name: "Red".into(),
                kind: MemberKind::EnumValue,
                ..Default::default()
            }],
        });
        vec![a, b]
    }

    #[test]
    fn test_render_empty_model() {
        let text = render(&[], &DotOptions::default());
        assert!(text.starts_with("digraph typegraph {"));
        assert!(text.trim_end().ends_with('}'));
        assert!(!text.contains("->"));
    }

    #[test]
    fn test_render_clusters_records_and_edges() {
        let text = render(&sample(), &DotOptions::default());
        assert!(text.contains("subgraph cluster_m0_A {"));
        assert!(text.contains(concat!(
            "m0_A__Foo[shape=record, ",
            "label=\"{Foo|+ bar: Bar\\l|+ run(): void\\l}\"];"
        )));
        assert!(text.contains("m1_B__Shape[shape=record, label=\"{«interface» Shape}\"];"));
        assert!(text.contains("m1_B__Color[shape=record, label=\"{«enum» Color|Red\\l}\"];"));
        assert!(text.contains(
            "m0_A__Foo -> m1_B__Bar [ltail=\"cluster_m0_A\", lhead=\"cluster_m1_B\"];"
        ));
        assert!(text.contains("x_lodash[label=\"lodash\", style=\"dashed\", shape=\"box\"];"));
        assert!(text.contains("m0_A__Foo -> x_lodash [ltail=\"cluster_m0_A\"];"));
    }

    #[test]
    fn test_render_member_filters() {
        let options = DotOptions {
            no_methods: true,
            no_properties: true,
            ..Default::default()
        };
        let text = render(&sample(), &options);
        assert!(text.contains("m0_A__Foo[shape=record, label=\"{Foo}\"];"));
        assert!(!text.contains("run()"));
    }

    #[test]
    fn test_render_dependencies_only_has_no_type_nodes() {
        let options = DotOptions {
            dependencies_only: true,
            ..Default::default()
        };
        let text = render(&sample(), &options);
        assert!(!text.contains("record"));
        assert!(!text.contains("cluster"));
        assert!(!text.contains("Foo"));
        assert!(text.contains("m0_A[label=\"A\", shape=\"folder\"];"));
        assert!(text.contains("m0_A -> m1_B;"));
    }

    #[test]
    fn test_render_nested_clusters_and_self_edges() {
        let mut file = Module::new("app");
        file.dependencies.push(Dependency::new("app", DependencyKind::Reference));
        let core = file.child_mut("Core");
        core.classes.push(Class {
            name: "Engine".into(),
            ..Default::default()
        });
        core.dependencies.push(Dependency::new("app", DependencyKind::Reference));

        let text = render(&[file], &DotOptions::default());
        assert!(text.contains("subgraph cluster_m0_app {"));
        assert!(text.contains("subgraph cluster_m0_0_Core {"));
        assert!(text.contains("m0_app__anchor[shape=\"point\", style=\"invis\"];"));
        assert!(text.contains(concat!(
            "m0_0_Core__Engine -> m0_app__anchor ",
            "[ltail=\"cluster_m0_0_Core\", lhead=\"cluster_m0_app\"];"
        )));
        assert_eq!(text.matches("->").count(), 1);
    }

    /// File module `index` holding namespace `Shared` that imports lodash
    fn index_file(class: &str) -> Module {
        let mut file = Module::new("index");
        let shared = file.child_mut("Shared");
        shared.classes.push(Class {
            name: class.into(),
            ..Default::default()
        });
        shared.dependencies.push(Dependency::new("lodash", DependencyKind::Import));
        file
    }

    #[test]
    fn test_render_same_named_modules_emit_each_edge_once() {
        let modules = vec![index_file("A"), index_file("B")];

        let full = render(&modules, &DotOptions::default());
        assert_eq!(full.matches("->").count(), 2);
        assert!(full.contains("m0_0_Shared__A -> x_lodash [ltail=\"cluster_m0_0_Shared\"];"));
        assert!(full.contains("m1_0_Shared__B -> x_lodash [ltail=\"cluster_m1_0_Shared\"];"));

        let mut plain = modules;
        for file in &mut plain {
            file.modules[0].classes.clear();
            file.dependencies.push(Dependency::new("lodash", DependencyKind::Import));
        }
        let options = DotOptions {
            dependencies_only: true,
            ..Default::default()
        };
        let text = render(&plain, &options);
        assert_eq!(text.matches("m0_index -> x_lodash;").count(), 1);
        assert_eq!(text.matches("m1_index -> x_lodash;").count(), 1);
        assert_eq!(text.matches("m0_0_Shared -> x_lodash;").count(), 1);
        assert_eq!(text.matches("->").count(), 4);
    }

    #[test]
    fn test_render_points_edges_at_first_same_named_module() {
        let mut a = Module::new("util");
        a.dependencies.push(Dependency::new("core", DependencyKind::Import));
        a.dependencies.push(Dependency::new("core", DependencyKind::Reference));
        let core = Module::new("core");
        let shadow = Module::new("core");

        let options = DotOptions {
            dependencies_only: true,
            ..Default::default()
        };
        let text = render(&[a, core, shadow], &options);
        assert!(text.contains("m2_core[label=\"core\", shape=\"folder\"];"));
        assert_eq!(text.matches("->").count(), 1);
        assert!(text.contains("m0_util -> m1_core;"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let first = render(&sample(), &DotOptions::default());
        let second = render(&sample(), &DotOptions::default());
        assert_eq!(first, second);
    }

    #[test]
    fn test_write_dot_when_no_image_requested() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("graph.dot");
        let options = DotOptions::default();
        let outcome = write(&sample(), &output, &options, Targets::default(), &FailingBackend);
        let outcome = outcome.unwrap();
        assert_eq!(outcome.written, vec![output.clone()]);
        assert!(outcome.diagnostics.is_empty());
        assert!(std::fs::read_to_string(&output).unwrap().starts_with("digraph"));
    }

    #[test]
    fn test_write_svg_only() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("graph.svg");
        let targets = Targets { dot: false, svg: true };
        let outcome = write(&sample(), &output, &DotOptions::default(), targets, &FakeBackend);
        let outcome = outcome.unwrap();
        assert_eq!(outcome.written, vec![output.clone()]);
        assert!(std::fs::read_to_string(&output).unwrap().starts_with("<svg>"));
        assert!(!dir.path().join("graph.dot").exists());
    }

    #[test]
    fn test_write_falls_back_to_dot_when_backend_fails() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("graph.svg");
        let targets = Targets { dot: false, svg: true };
        let outcome = write(&sample(), &output, &DotOptions::default(), targets, &FailingBackend);
        let outcome = outcome.unwrap();

        let dot_path = dir.path().join("graph.dot");
        assert_eq!(outcome.written, vec![dot_path.clone()]);
        assert!(dot_path.exists());
        assert!(!output.exists());
        assert!(matches!(
            outcome.diagnostics.as_slice(),
            [Diagnostic::RenderBackendUnavailable(_)]
        ));
    }

    #[test]
    fn test_write_both_targets() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("graph");
        let targets = Targets { dot: true, svg: true };
        let outcome = write(&sample(), &output, &DotOptions::default(), targets, &FakeBackend);
        let outcome = outcome.unwrap();
        assert_eq!(outcome.written, vec![dir.path().join("graph.svg"), output.clone()]);
    }
}
