//! DOT text building

use std::fmt::Write;

/// Replace every non-alphanumeric character with an underscore.
pub fn sanitize_id(input: &str) -> String {
    input
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Escape a plain (non-record) label.
pub fn escape_label(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// Escape one field of a record label, where `{}|<>` are structural.
pub fn escape_record(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '\\' | '"' | '{' | '}' | '|' | '<' | '>' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push(' '),
            _ => out.push(c),
        }
    }
    out
}

/// Record label `{title|line\lline\l|line\l}`; empty sections are skipped.
pub fn record_label(title: &str, sections: &[Vec<String>]) -> String {
    let mut label = String::from("{");
    label.push_str(&escape_record(title));
    for section in sections.iter().filter(|s| !s.is_empty()) {
        label.push('|');
        for line in section {
            label.push_str(&escape_record(line));
            label.push_str("\\l");
        }
    }
    label.push('}');
    label
}

fn write_indent(output: &mut String, level: usize) {
    for _ in 0..level {
        output.push_str("  ");
    }
}

fn write_attrs(output: &mut String, attrs: &[(&str, &str)]) {
    for (i, (key, value)) in attrs.iter().enumerate() {
        if i > 0 {
            output.push_str(", ");
        }
        let _ = write!(output, "{}=\"{}\"", key, escape_label(value));
    }
}

/// Builder for a `digraph`
pub struct DotBuilder {
    output: String,
    indent: usize,
}

impl DotBuilder {
    pub fn new(name: &str) -> Self {
        let mut output = String::with_capacity(4096);
        let _ = writeln!(output, "digraph {} {{", sanitize_id(name));
        Self { output, indent: 1 }
    }

    /// Graph attribute
    pub fn attr(&mut self, key: &str, value: &str) -> &mut Self {
        write_indent(&mut self.output, self.indent);
        let _ = writeln!(self.output, "{}=\"{}\";", key, escape_label(value));
        self
    }

    /// Default node attributes
    pub fn node_style(&mut self, attrs: &str) -> &mut Self {
        write_indent(&mut self.output, self.indent);
        let _ = writeln!(self.output, "node [{attrs}];");
        self
    }

    pub fn node_full(&mut self, id: &str, attrs: &[(&str, &str)]) -> &mut Self {
        write_indent(&mut self.output, self.indent);
        let _ = write!(self.output, "{id}[");
        write_attrs(&mut self.output, attrs);
        self.output.push_str("];\n");
        self
    }

    /// Record-shaped node; `label` must come from [`record_label`].
    pub fn record(&mut self, id: &str, label: &str) -> &mut Self {
        write_indent(&mut self.output, self.indent);
        let _ = writeln!(self.output, "{id}[shape=record, label=\"{label}\"];");
        self
    }

    pub fn edge(&mut self, from: &str, to: &str) -> &mut Self {
        write_indent(&mut self.output, self.indent);
        let _ = writeln!(self.output, "{from} -> {to};");
        self
    }

    pub fn edge_with_attrs(&mut self, from: &str, to: &str, attrs: &[(&str, &str)]) -> &mut Self {
        if attrs.is_empty() {
            return self.edge(from, to);
        }
        write_indent(&mut self.output, self.indent);
        let _ = write!(self.output, "{from} -> {to} [");
        write_attrs(&mut self.output, attrs);
        self.output.push_str("];\n");
        self
    }

    /// Open `subgraph cluster_<id>`; must be closed with [`end_cluster`](Self::end_cluster).
    pub fn start_cluster(&mut self, id: &str, label: &str) -> &mut Self {
        write_indent(&mut self.output, self.indent);
        let _ = writeln!(self.output, "subgraph cluster_{} {{", sanitize_id(id));
        self.indent += 1;
        write_indent(&mut self.output, self.indent);
        let _ = writeln!(self.output, "label=\"{}\";", escape_label(label));
        self
    }

    pub fn end_cluster(&mut self) -> &mut Self {
        self.indent = self.indent.saturating_sub(1);
        write_indent(&mut self.output, self.indent);
        self.output.push_str("}\n");
        self
    }

    pub fn build(mut self) -> String {
        self.output.push_str("}\n");
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_id() {
        assert_eq!(sanitize_id("user.service"), "user_service");
        assert_eq!(sanitize_id("@scope/pkg"), "_scope_pkg");
    }

    #[test]
    fn test_record_label_escapes_structure() {
        let label = record_label(
            "Box<T>",
            &[vec!["+ items: Map<string, T>".into()], vec![], vec!["+ get(): T | null".into()]],
        );
        assert_eq!(
            label,
            "{Box\\<T\\>|+ items: Map\\<string, T\\>\\l|+ get(): T \\| null\\l}"
        );
    }

    #[test]
    fn test_builder_clusters_and_edges() {
        let mut dot = DotBuilder::new("g");
        dot.attr("compound", "true");
        dot.start_cluster("m_app", "app");
        dot.node_full("a", &[("label", "A")]);
        dot.end_cluster();
        dot.edge_with_attrs("a", "b", &[("style", "dashed")]);
        dot.edge_with_attrs("b", "a", &[]);
        let text = dot.build();
        assert_eq!(
            text,
            concat!(
                "digraph g {\n",
                "  compound=\"true\";\n",
                "  subgraph cluster_m_app {\n",
                "    label=\"app\";\n",
                "    a[label=\"A\"];\n",
                "  }\n",
                "  a -> b [style=\"dashed\"];\n",
                "  b -> a;\n",
                "}\n",
            )
        );
    }
}
