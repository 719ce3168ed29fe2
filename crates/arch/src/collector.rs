//! Builds one `Module` per parsed source unit

use crate::model::{
    Class, Dependency, DependencyKind, Enum, Interface, Member, MemberKind, Module, Parameter,
    TypeRef, Visibility,
};
use crate::symbols::{self, DeclarationTable, ImportBinding, ImportDecl, ImportTable, ProgramIndex};
use crate::syntax::{self, Statement};
use frontend::{Node, Program, SourceUnit};
use std::collections::HashSet;

/// Alias chains (`import A = B.C`) are followed at most this deep
const MAX_ALIAS_DEPTH: usize = 8;

/// Collects the structure of source units against a program-wide index
pub struct Collector<'p> {
    index: &'p ProgramIndex,
}

impl<'p> Collector<'p> {
    pub fn new(index: &'p ProgramIndex) -> Self {
        Self { index }
    }

    /// Build the module for one unit.
    pub fn collect(&self, unit: &SourceUnit) -> Module {
        let name = unit.module_name();
        let mut locals = DeclarationTable::default();
        locals.add_unit(unit, &name);

        let cx = UnitContext {
            unit,
            locals,
            imports: ImportTable::from_unit(unit),
            index: self.index,
        };

        let mut module = Module::new(name);
        let mut scope = Vec::new();
        cx.collect_block(unit.root(), &mut scope, &mut module);
        tracing::debug!(
            "Collected {} from {}: {} class(es), {} interface(s), {} enum(s), {} namespace(s)",
            module.name,
            unit.path().display(),
            module.classes.len(),
            module.interfaces.len(),
            module.enums.len(),
            module.modules.len()
        );
        module
    }
}

/// Collect every non-declaration unit of a program, in program order.
pub fn collect_program(program: &Program) -> Vec<Module> {
    let index = ProgramIndex::build(program);
    let collector = Collector::new(&index);
    program.source_units().map(|unit| collector.collect(unit)).collect()
}

struct UnitContext<'u> {
    unit: &'u SourceUnit,
    locals: DeclarationTable,
    imports: ImportTable,
    index: &'u ProgramIndex,
}

/// Where a type reference occurs
struct Site<'s> {
    scope: &'s [String],
    module: &'s str,
    origin: Option<&'s str>,
    generics: Vec<String>,
}

impl Site<'_> {
    fn with_generics(&self, extra: Vec<String>) -> Site<'_> {
        let mut generics = self.generics.clone();
        generics.extend(extra);
        Site {
            scope: self.scope,
            module: self.module,
            origin: self.origin,
            generics,
        }
    }
}

impl UnitContext<'_> {
    fn collect_block(&self, block: Node<'_>, scope: &mut Vec<String>, module: &mut Module) {
        for statement in syntax::statements(self.unit, block) {
            match statement {
                Statement::Namespace { path, body } => {
                    let Some(body) = body else {
                        continue;
                    };
                    if path.is_empty() {
                        continue;
                    }
                    let mut target = &mut *module;
                    for segment in &path {
                        target = target.child_mut(segment);
                    }
                    let depth = scope.len();
                    scope.extend(path);
                    self.collect_block(body, scope, target);
                    scope.truncate(depth);
                }
                Statement::Global(body) => self.collect_block(body, scope, module),
                Statement::Class(node) => {
                    let mut deps = Vec::new();
                    let class = self.class(node, scope, &module.name, &mut deps);
                    module.classes.push(class);
                    module.dependencies.extend(deps);
                }
                Statement::Interface(node) => {
                    let mut deps = Vec::new();
                    let interface = self.interface(node, scope, &module.name, &mut deps);
                    module.interfaces.push(interface);
                    module.dependencies.extend(deps);
                }
                Statement::Enum(node) => module.enums.push(self.enumeration(node)),
                Statement::TypeAlias(node) => {
                    let mut deps = Vec::new();
                    let site = Site {
                        scope: scope.as_slice(),
                        module: &module.name,
                        origin: None,
                        generics: syntax::type_parameter_names(
                            self.unit,
                            node.child_by_field_name("type_parameters"),
                        ),
                    };
                    if let Some(value) = node.child_by_field_name("value") {
                        self.record_type_node(&site, value, DependencyKind::Reference, &mut deps);
                    }
                    module.dependencies.extend(deps);
                }
                Statement::Import(node) => {
                    if let Some(decl) = symbols::read_import(self.unit, node, None) {
                        push_import(module, decl);
                    }
                }
                Statement::ReExport(node) => {
                    if let Some(decl) = symbols::read_reexport(self.unit, node) {
                        push_import(module, decl);
                    }
                }
                Statement::ImportAlias(_) => {}
            }
        }
    }

    fn class(
        &self,
        node: Node<'_>,
        scope: &[String],
        module: &str,
        deps: &mut Vec<Dependency>,
    ) -> Class {
        let name = syntax::field_text(self.unit, node, "name").unwrap_or("default").to_string();
        let type_parameters =
            syntax::type_parameter_names(self.unit, node.child_by_field_name("type_parameters"));
        let site = Site {
            scope,
            module,
            origin: Some(&name),
            generics: type_parameters.clone(),
        };

        let mut extends = None;
        let mut implements = Vec::new();
        let mut cursor = node.walk();
        let heritage = node.named_children(&mut cursor).find(|c| c.kind() == "class_heritage");
        if let Some(heritage) = heritage {
            let mut hc = heritage.walk();
            for clause in heritage.named_children(&mut hc) {
                match clause.kind() {
                    "extends_clause" => {
                        if let Some(value) = clause.child_by_field_name("value") {
                            extends = Some(match value.kind() {
                                "identifier" | "member_expression" => self.record(
                                    &site,
                                    syntax::split_path(self.unit.text(value)),
                                    DependencyKind::Heritage,
                                    deps,
                                ),
                                _ => {
                                    TypeRef::new(syntax::normalize_ws(self.unit.text(value)), None)
                                }
                            });
                        }
                        if let Some(args) = clause.child_by_field_name("type_arguments") {
                            self.record_type_node(&site, args, DependencyKind::Reference, deps);
                        }
                    }
                    "implements_clause" => {
                        let mut ic = clause.walk();
                        for ty in clause.named_children(&mut ic) {
                            if let Some(type_ref) = self.heritage_type(&site, ty, deps) {
                                implements.push(type_ref);
                            }
                        }
                    }
                    _ => {}
                }
            }
        }

        let members = node
            .child_by_field_name("body")
            .map(|body| self.class_members(body, &site, deps))
            .unwrap_or_default();

        Class {
            name: name.clone(),
            type_parameters,
            is_abstract: node.kind() == "abstract_class_declaration",
            extends,
            implements,
            members,
        }
    }

    fn interface(
        &self,
        node: Node<'_>,
        scope: &[String],
        module: &str,
        deps: &mut Vec<Dependency>,
    ) -> Interface {
        let name = syntax::field_text(self.unit, node, "name").unwrap_or("default").to_string();
        let type_parameters =
            syntax::type_parameter_names(self.unit, node.child_by_field_name("type_parameters"));
        let site = Site {
            scope,
            module,
            origin: Some(&name),
            generics: type_parameters.clone(),
        };

        let mut extends = Vec::new();
        let mut cursor = node.walk();
        let clause = node.named_children(&mut cursor).find(|c| c.kind() == "extends_type_clause");
        if let Some(clause) = clause {
            let mut ec = clause.walk();
            for ty in clause.named_children(&mut ec) {
                if let Some(type_ref) = self.heritage_type(&site, ty, deps) {
                    extends.push(type_ref);
                }
            }
        }

        let mut members = Vec::new();
        if let Some(body) = node.child_by_field_name("body") {
            let mut bc = body.walk();
            for child in body.named_children(&mut bc) {
                match child.kind() {
                    "property_signature" => members.push(self.property(child, &site, deps)),
                    "method_signature" => members.push(self.method(child, &site, deps)),
                    _ => {}
                }
            }
        }

        Interface {
            name: name.clone(),
            type_parameters,
            extends,
            members,
        }
    }

    fn enumeration(&self, node: Node<'_>) -> Enum {
        let name = syntax::field_text(self.unit, node, "name").unwrap_or("default").to_string();
        let mut members = Vec::new();
        if let Some(body) = node.child_by_field_name("body") {
            let mut cursor = body.walk();
            for child in body.named_children(&mut cursor) {
                let value = match child.kind() {
                    "enum_assignment" => syntax::field_text(self.unit, child, "name"),
                    "property_identifier" | "string" | "number" => Some(self.unit.text(child)),
                    _ => None,
                };
                if let Some(value) = value {
                    members.push(Member {
                        name: syntax::strip_quotes(value).to_string(),
                        kind: MemberKind::EnumValue,
                        ..Default::default()
                    });
                }
            }
        }
        Enum { name, members }
    }

    fn class_members(
        &self,
        body: Node<'_>,
        site: &Site<'_>,
        deps: &mut Vec<Dependency>,
    ) -> Vec<Member> {
        let mut members: Vec<Member> = Vec::new();
        let mut overloads: HashSet<String> = HashSet::new();

        let mut cursor = body.walk();
        for child in body.named_children(&mut cursor) {
            match child.kind() {
                "public_field_definition" => members.push(self.property(child, site, deps)),
                "method_signature" | "abstract_method_signature" => {
                    let method = self.method(child, site, deps);
                    overloads.insert(method.name.clone());
                    members.push(method);
                }
                "method_definition" => {
                    let name = self.member_name(child);
                    let kw = syntax::keywords(child);
                    if name == "constructor" {
                        self.constructor(child, site, deps, &mut members);
                    } else if kw.contains(&"get") || kw.contains(&"set") {
                        let accessor = self.accessor(child, site, deps, kw.contains(&"get"));
                        let known = members
                            .iter()
                            .any(|m| m.name == accessor.name && m.kind == MemberKind::Property);
                        if !known {
                            members.push(accessor);
                        }
                    } else {
                        let method = self.method(child, site, deps);
                        // implementation body of an overloaded method
                        if !overloads.contains(&method.name) {
                            members.push(method);
                        }
                    }
                }
                _ => {}
            }
        }
        members
    }

    fn member_name(&self, node: Node<'_>) -> String {
        syntax::field_text(self.unit, node, "name")
            .map(|n| syntax::strip_quotes(n).to_string())
            .unwrap_or_default()
    }

    fn visibility(&self, node: Node<'_>) -> Visibility {
        let private_name = node
            .child_by_field_name("name")
            .map(|n| n.kind() == "private_property_identifier")
            .unwrap_or(false);
        if private_name {
            return Visibility::Private;
        }
        syntax::accessibility(self.unit, node)
            .map(Visibility::from_keyword)
            .unwrap_or_default()
    }

    fn property(&self, node: Node<'_>, site: &Site<'_>, deps: &mut Vec<Dependency>) -> Member {
        let kw = syntax::keywords(node);
        let type_node = node.child_by_field_name("type");
        if let Some(ty) = type_node {
            self.record_type_node(site, ty, DependencyKind::Reference, deps);
        }
        Member {
            name: self.member_name(node),
            kind: MemberKind::Property,
            visibility: self.visibility(node),
            is_static: kw.contains(&"static"),
            is_abstract: kw.contains(&"abstract"),
            is_readonly: kw.contains(&"readonly"),
            is_optional: kw.contains(&"?"),
            parameters: Vec::new(),
            type_annotation: type_node.and_then(|t| syntax::annotation_text(self.unit, t)),
        }
    }

    fn method(&self, node: Node<'_>, site: &Site<'_>, deps: &mut Vec<Dependency>) -> Member {
        let kw = syntax::keywords(node);
        let generics =
            syntax::type_parameter_names(self.unit, node.child_by_field_name("type_parameters"));
        let site = site.with_generics(generics);

        let parameters = node
            .child_by_field_name("parameters")
            .map(|params| self.parameters(params, &site, deps))
            .unwrap_or_default();

        let return_type = node.child_by_field_name("return_type");
        if let Some(ret) = return_type {
            self.record_type_node(&site, ret, DependencyKind::Reference, deps);
        }

        Member {
            name: self.member_name(node),
            kind: MemberKind::Method,
            visibility: self.visibility(node),
            is_static: kw.contains(&"static"),
            is_abstract: kw.contains(&"abstract") || node.kind() == "abstract_method_signature",
            is_readonly: false,
            is_optional: kw.contains(&"?"),
            parameters: parameters.into_iter().map(|(p, _)| p).collect(),
            type_annotation: return_type.and_then(|t| syntax::annotation_text(self.unit, t)),
        }
    }

    /// `get x(): T` / `set x(v: T)` rendered as a property
    fn accessor(
        &self,
        node: Node<'_>,
        site: &Site<'_>,
        deps: &mut Vec<Dependency>,
        getter: bool,
    ) -> Member {
        let method = self.method(node, site, deps);
        let type_annotation = if getter {
            method.type_annotation.clone()
        } else {
            method.parameters.first().and_then(|p| p.type_annotation.clone())
        };
        Member {
            name: method.name,
            kind: MemberKind::Property,
            visibility: method.visibility,
            is_static: method.is_static,
            is_abstract: method.is_abstract,
            is_readonly: false,
            is_optional: false,
            parameters: Vec::new(),
            type_annotation,
        }
    }

    /// Constructor parameters declared with an accessibility modifier or
    /// `readonly` become properties.
    fn constructor(
        &self,
        node: Node<'_>,
        site: &Site<'_>,
        deps: &mut Vec<Dependency>,
        members: &mut Vec<Member>,
    ) {
        let Some(params) = node.child_by_field_name("parameters") else {
            return;
        };
        for (parameter, param_node) in self.parameters(params, site, deps) {
            let access = syntax::accessibility(self.unit, param_node);
            let readonly = syntax::keywords(param_node).contains(&"readonly");
            if access.is_none() && !readonly {
                continue;
            }
            if members.iter().any(|m| m.name == parameter.name.trim_end_matches('?')) {
                continue;
            }
            members.push(Member {
                name: parameter.name.trim_end_matches('?').to_string(),
                kind: MemberKind::Property,
                visibility: access.map(Visibility::from_keyword).unwrap_or_default(),
                is_readonly: readonly,
                is_optional: param_node.kind() == "optional_parameter",
                type_annotation: parameter.type_annotation,
                ..Default::default()
            });
        }
    }

    fn parameters<'t>(
        &self,
        params: Node<'t>,
        site: &Site<'_>,
        deps: &mut Vec<Dependency>,
    ) -> Vec<(Parameter, Node<'t>)> {
        let mut out = Vec::new();
        let mut cursor = params.walk();
        for param in params.named_children(&mut cursor) {
            if !matches!(param.kind(), "required_parameter" | "optional_parameter") {
                continue;
            }
            let mut name = syntax::field_text(self.unit, param, "pattern")
                .map(syntax::normalize_ws)
                .unwrap_or_default();
            if param.kind() == "optional_parameter" {
                name.push('?');
            }
            let type_node = param.child_by_field_name("type");
            if let Some(ty) = type_node {
                self.record_type_node(site, ty, DependencyKind::Reference, deps);
            }
            out.push((
                Parameter {
                    name,
                    type_annotation: type_node.and_then(|t| syntax::annotation_text(self.unit, t)),
                },
                param,
            ));
        }
        out
    }

    /// A type in an `implements` / interface `extends` list
    fn heritage_type(
        &self,
        site: &Site<'_>,
        ty: Node<'_>,
        deps: &mut Vec<Dependency>,
    ) -> Option<TypeRef> {
        let segments = head_segments(self.unit, ty)?;
        let type_ref = self.record(site, segments, DependencyKind::Heritage, deps);
        if let Some(args) = ty.child_by_field_name("type_arguments") {
            self.record_type_node(site, args, DependencyKind::Reference, deps);
        }
        Some(type_ref)
    }

    /// Record every named type mentioned under `node`.
    fn record_type_node(
        &self,
        site: &Site<'_>,
        node: Node<'_>,
        kind: DependencyKind,
        deps: &mut Vec<Dependency>,
    ) {
        let mut found = Vec::new();
        referenced_types(self.unit, node, &mut found);
        for segments in found {
            self.record(site, segments, kind, deps);
        }
    }

    /// Resolve one reference and record a dependency when it leaves the current module.
    fn record(
        &self,
        site: &Site<'_>,
        segments: Vec<String>,
        kind: DependencyKind,
        deps: &mut Vec<Dependency>,
    ) -> TypeRef {
        if segments.len() == 1 && site.generics.contains(&segments[0]) {
            return TypeRef::new(segments[0].clone(), None);
        }
        match self.resolve(site.scope, &segments, 0) {
            Some((module, target)) => {
                if module != site.module {
                    let mut dep = Dependency::new(module.clone(), kind).with_target(target.clone());
                    if let Some(origin) = site.origin {
                        dep = dep.with_origin(origin);
                    }
                    deps.push(dep);
                }
                TypeRef {
                    name: target,
                    module: Some(module),
                }
            }
            None => TypeRef::new(segments.join("."), None),
        }
    }

    /// Returns (owning module, type name).
    fn resolve(
        &self,
        scope: &[String],
        segments: &[String],
        depth: usize,
    ) -> Option<(String, String)> {
        let name = segments.last()?.clone();

        if let Some(module) = self.locals.lookup(scope, segments) {
            return Some((module.to_string(), name));
        }

        if let Some(binding) = self.imports.get(&segments[0]) {
            return match binding {
                ImportBinding::Symbol { module, name: imported } => {
                    let target = if segments.len() == 1 { imported.clone() } else { name };
                    Some((module.clone(), target))
                }
                ImportBinding::Module { module } => Some((module.clone(), name)),
                ImportBinding::Alias { segments: aliased } if depth < MAX_ALIAS_DEPTH => {
                    let mut expanded = aliased.clone();
                    expanded.extend_from_slice(&segments[1..]);
                    self.resolve(scope, &expanded, depth + 1)
                }
                ImportBinding::Alias { .. } => None,
            };
        }

        if segments.len() == 1 && symbols::is_builtin_type(&name) {
            return None;
        }

        self.index
            .lookup(scope, segments)
            .map(|module| (module.to_string(), name))
    }
}

fn push_import(module: &mut Module, decl: ImportDecl) {
    if decl.module == module.name {
        return;
    }
    if decl.symbols.is_empty() {
        module.dependencies.push(Dependency::new(decl.module, DependencyKind::Import));
        return;
    }
    for symbol in decl.symbols {
        module
            .dependencies
            .push(Dependency::new(decl.module.clone(), DependencyKind::Import).with_target(symbol));
    }
}

/// Name segments of the type a heritage entry points at (`Base<T>` -> `[Base]`)
fn head_segments(unit: &SourceUnit, node: Node<'_>) -> Option<Vec<String>> {
    match node.kind() {
        "type_identifier" | "identifier" => Some(vec![unit.text(node).to_string()]),
        "nested_type_identifier" | "member_expression" | "nested_identifier" => {
            Some(syntax::split_path(unit.text(node)))
        }
        "generic_type" => head_segments(unit, node.child_by_field_name("name")?),
        _ => None,
    }
}

/// Every named type under a type node, as name segments
fn referenced_types(unit: &SourceUnit, node: Node<'_>, out: &mut Vec<Vec<String>>) {
    match node.kind() {
        "type_identifier" => out.push(vec![unit.text(node).to_string()]),
        "nested_type_identifier" => out.push(syntax::split_path(unit.text(node))),
        "type_query" | "predefined_type" | "literal_type" => {}
        _ => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                referenced_types(unit, child, out);
            }
        }
    }
}
