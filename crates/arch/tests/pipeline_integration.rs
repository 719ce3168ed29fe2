//! End-to-end tests over temporary TypeScript projects
//!
//! Run: `cargo test -p arch --test pipeline_integration`

use arch::{
    create_graph_with, get_modules_dependencies, get_modules_dependencies_with, BackendError,
    DependencyScope, Diagnostic, GraphError, GraphOptions, ImageBackend, OutputModule,
};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// Graphviz stand-in that is never installed
struct NoGraphviz;

impl ImageBackend for NoGraphviz {
    fn render_svg(&self, _dot: &str) -> Result<Vec<u8>, BackendError> {
        Err(BackendError::Spawn {
            program: "dot".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not installed"),
        })
    }
}

fn write(dir: &Path, rel: &str, source: &str) {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create dir");
    }
    fs::write(path, source).expect("Failed to write source");
}

/// Small layered project with imports, heritage and a namespace
fn create_test_project() -> tempfile::TempDir {
    let dir = tempdir().expect("Failed to create temp dir");
    write(
        dir.path(),
        "model/entity.ts",
        r#"
export interface Entity { id: string; }
export abstract class Base implements Entity {
    id: string = "";
    abstract validate(): boolean;
}
"#,
    );
    write(
        dir.path(),
        "model/user.ts",
        r#"
import { Base } from "./entity";
export enum Role { Admin, Guest }
export class User extends Base {
    constructor(public name: string, private role: Role) { super(); }
    validate(): boolean { return this.name.length > 0; }
}
"#,
    );
    write(
        dir.path(),
        "service.ts",
        r#"
import { User } from "./model/user";
import * as fmt from "./format";
export class UserService {
    private users: Map<string, User> = new Map();
    find(id: string): User | undefined { return this.users.get(id); }
    render(user: User): fmt.Text { return fmt.text(user.name); }
}
export namespace Cache {
    export class Store { service: UserService; }
}
"#,
    );
    write(
        dir.path(),
        "format.ts",
        "export type Text = string;\nexport function text(s: string): Text { return s; }\n",
    );
    dir
}

fn deps(rows: &[OutputModule], name: &str) -> Vec<String> {
    rows.iter()
        .find(|r| r.name == name)
        .map(|r| r.dependencies.clone())
        .unwrap_or_default()
}

#[test]
fn test_two_file_round_trip() {
    let dir = tempdir().expect("Failed to create temp dir");
    write(dir.path(), "A.ts", "class Foo { bar: Bar; }\n");
    write(dir.path(), "B.ts", "class Bar {}\n");

    let rows = get_modules_dependencies(dir.path(), false).expect("query failed");
    assert_eq!(
        rows,
        vec![
            OutputModule {
                name: "A".into(),
                dependencies: vec!["B".into()]
            },
            OutputModule {
                name: "B".into(),
                dependencies: vec![]
            },
        ]
    );

    let json = serde_json::to_string(&rows).expect("Failed to serialize");
    assert_eq!(json, r#"[{"name":"A","dependencies":["B"]},{"name":"B","dependencies":[]}]"#);
}

#[test]
fn test_dependency_query_recursive_project() {
    let project = create_test_project();

    let flat = get_modules_dependencies(project.path(), false).expect("query failed");
    let names: Vec<_> = flat.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["format", "service"]);

    let rows = get_modules_dependencies(project.path(), true).expect("query failed");
    let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["entity", "format", "service", "user"]);

    assert_eq!(deps(&rows, "entity"), Vec::<String>::new());
    assert_eq!(deps(&rows, "user"), vec!["entity"]);
    assert_eq!(deps(&rows, "service"), vec!["format", "user"]);

    for row in &rows {
        let mut sorted = row.dependencies.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(row.dependencies, sorted, "{} must be sorted and unique", row.name);
        assert!(!row.dependencies.contains(&row.name), "{} depends on itself", row.name);
    }
}

#[test]
fn test_dependency_scope_declarations() {
    let dir = tempdir().expect("Failed to create temp dir");
    write(dir.path(), "base.ts", "class Base {}\n");
    write(dir.path(), "util.ts", "class Helper {}\n");
    write(dir.path(), "app.ts", "class App extends Base { helper: Helper; }\n");

    let all = get_modules_dependencies_with(dir.path(), false, DependencyScope::All)
        .expect("query failed");
    assert_eq!(deps(&all, "app"), vec!["base", "util"]);

    let decl = get_modules_dependencies_with(dir.path(), false, DependencyScope::Declarations)
        .expect("query failed");
    assert_eq!(deps(&decl, "app"), vec!["base"]);
}

#[test]
fn test_missing_target_writes_empty_graph() {
    let dir = tempdir().expect("Failed to create temp dir");
    let missing = dir.path().join("does-not-exist");
    let output = dir.path().join("out.dot");

    let report = create_graph_with(&missing, &output, &GraphOptions::default(), &NoGraphviz)
        .expect("graph failed");
    assert_eq!(report.modules, 0);
    assert_eq!(report.diagnostics, vec![Diagnostic::MissingTarget(missing)]);
    assert_eq!(report.written, vec![output.clone()]);

    let text = fs::read_to_string(&output).expect("Failed to read output");
    assert!(text.starts_with("digraph typegraph {"));
    assert!(!text.contains("->"));
}

#[test]
fn test_graph_is_deterministic() {
    let project = create_test_project();
    let out_dir = tempdir().expect("Failed to create temp dir");
    let options = GraphOptions::default().with_recursive(true);

    let first = out_dir.path().join("first.dot");
    let second = out_dir.path().join("second.dot");
    create_graph_with(project.path(), &first, &options, &NoGraphviz).expect("graph failed");
    create_graph_with(project.path(), &second, &options, &NoGraphviz).expect("graph failed");

    let a = fs::read(&first).expect("Failed to read first");
    let b = fs::read(&second).expect("Failed to read second");
    assert_eq!(a, b);
}

#[test]
fn test_dependencies_only_graph_has_no_member_nodes() {
    let project = create_test_project();
    let output = project.path().join("deps.dot");
    let options = GraphOptions::default().with_recursive(true).with_dependencies_only(true);

    create_graph_with(project.path(), &output, &options, &NoGraphviz).expect("graph failed");
    let text = fs::read_to_string(&output).expect("Failed to read output");
    assert!(!text.contains("shape=record"));
    assert!(!text.contains("validate"));
    assert!(!text.contains("UserService"));
    assert!(text.contains("label=\"service\""));
}

#[test]
fn test_same_named_files_draw_each_edge_once() {
    let dir = tempdir().expect("Failed to create temp dir");
    write(dir.path(), "a/index.ts", "import { x } from \"lodash\";\n");
    write(dir.path(), "b/index.ts", "import { x } from \"lodash\";\n");
    let output = dir.path().join("deps.dot");
    let options = GraphOptions::default().with_recursive(true).with_dependencies_only(true);

    create_graph_with(dir.path(), &output, &options, &NoGraphviz).expect("graph failed");
    let text = fs::read_to_string(&output).expect("Failed to read output");
    let edges: Vec<&str> = text.lines().filter(|l| l.contains("->")).collect();
    assert_eq!(edges, vec!["  m0_index -> x_lodash;", "  m1_index -> x_lodash;"]);
}

#[test]
fn test_full_graph_lists_members() {
    let project = create_test_project();
    let output = project.path().join("full.dot");
    let options = GraphOptions::default().with_recursive(true);

    let report = create_graph_with(project.path(), &output, &options, &NoGraphviz)
        .expect("graph failed");
    assert_eq!(report.modules, 4);
    let text = fs::read_to_string(&output).expect("Failed to read output");
    assert!(text.contains("subgraph cluster_"));
    assert!(text.contains("«abstract» Base"));
    assert!(text.contains("+ name: string"));
    assert!(text.contains("- role: Role"));
    assert!(text.contains("+ find(id: string): User \\| undefined"));
}

#[test]
fn test_merge_flattens_namespaces() {
    let project = create_test_project();
    let output = project.path().join("merged.dot");
    let options = GraphOptions::default().with_recursive(true).with_merge(true);

    let report = create_graph_with(project.path(), &output, &options, &NoGraphviz)
        .expect("graph failed");
    // format holds only a type alias and no dependencies, so it disappears; Cache is lifted
    assert_eq!(report.modules, 4);
}

#[test]
fn test_svg_failure_keeps_dot_text() {
    let project = create_test_project();
    let output = project.path().join("graph.svg");
    let options = GraphOptions::default().with_svg_output(true);

    let report = create_graph_with(project.path(), &output, &options, &NoGraphviz)
        .expect("graph failed");
    assert!(matches!(
        report.diagnostics.as_slice(),
        [Diagnostic::RenderBackendUnavailable(_)]
    ));
    assert_eq!(report.written, vec![project.path().join("graph.dot")]);
    assert!(!output.exists());
}

#[test]
fn test_plantuml_names_only() {
    let project = create_test_project();
    let output = project.path().join("classes.puml");
    let options = GraphOptions::default()
        .with_recursive(true)
        .with_plant_output(true)
        .with_no_types(true);

    let report = create_graph_with(project.path(), &output, &options, &NoGraphviz)
        .expect("graph failed");
    assert_eq!(report.written, vec![output.clone()]);

    let text = fs::read_to_string(&output).expect("Failed to read output");
    assert!(text.starts_with("@startuml\nset separator none\n"));
    assert!(text.contains("abstract class \"Base\" as entity__Base"));
    assert!(text.contains("{abstract} +validate()\n"));
    assert!(text.contains("+find(id)\n"));
    assert!(text.contains("entity__Base <|-- user__User"));
    assert!(text.contains("entity__Entity <|.. entity__Base"));
    assert!(text.contains("service__UserService ..> user__User\n"));
    assert!(text.contains("service_Cache__Store ..> service__UserService\n"));
    assert!(!text.contains(": string"));
}

#[test]
fn test_syntax_error_is_fatal() {
    let dir = tempdir().expect("Failed to create temp dir");
    write(dir.path(), "broken.ts", "class {\n");
    let output = dir.path().join("out.dot");

    let err = create_graph_with(dir.path(), &output, &GraphOptions::default(), &NoGraphviz)
        .unwrap_err();
    assert!(matches!(err, GraphError::FrontEnd(_)));
    assert!(!output.exists());
}
