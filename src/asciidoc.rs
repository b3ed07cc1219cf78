//! AsciiDoc rendering of a documented capture tree.
//!
//! Groups become level-1 sections and messages level-2 sections, numbered hierarchically
//! (`1`, `1.2`, `1.2.3`). Every message gets a `REQUEST` listing block, followed by the
//! request's field table when it has one, and likewise a `RESPONSE` block when a response was
//! captured.

use crate::capture::{ApiTree, Group, HttpMessage, Node, Payload};
use crate::schema::FieldDescriptor;
use log::debug;

/// Header row of every field table
pub const TABLE_HEADER: [&str; 4] = ["NAME", "TYPE", "DEFAULT", "DESCRIPTION"];

/// Minimal AsciiDoc writer
#[derive(Debug, Default)]
pub struct AsciidocBuilder {
    out: String,
}

impl AsciidocBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document_title(&mut self, title: &str) -> &mut Self {
        self.out.push_str(&format!("= {}\n\n", title));
        self
    }

    pub fn paragraph(&mut self, text: &str) -> &mut Self {
        self.out.push_str(text.trim_end());
        self.out.push_str("\n\n");
        self
    }

    pub fn section_title_level1(&mut self, title: &str) -> &mut Self {
        self.out.push_str(&format!("== {}\n\n", title));
        self
    }

    pub fn section_title_level2(&mut self, title: &str) -> &mut Self {
        self.out.push_str(&format!("=== {}\n\n", title));
        self
    }

    /// Titled listing block
    pub fn block(&mut self, title: &str, lines: &[String]) -> &mut Self {
        self.out.push_str(&format!(".{}\n----\n", title));
        for line in lines {
            self.out.push_str(line);
            self.out.push('\n');
        }
        self.out.push_str("----\n\n");
        self
    }

    /// Table whose first row is the header
    pub fn table(&mut self, rows: &[Vec<String>]) -> &mut Self {
        self.out.push_str("[options=\"header\"]\n|===\n");
        for row in rows {
            for cell in row {
                self.out.push('|');
                self.out.push_str(&cell.replace('|', "\\|"));
            }
            self.out.push('\n');
        }
        self.out.push_str("|===\n\n");
        self
    }

    pub fn into_string(self) -> String {
        self.out
    }
}

/// Render the whole tree as an AsciiDoc document
pub fn render(tree: &ApiTree) -> String {
    debug!("Rendering AsciiDoc for '{}'", tree.name);

    let mut builder = AsciidocBuilder::new();
    builder.document_title(&tree.name);
    if let Some(description) = &tree.description {
        builder.paragraph(description);
    }

    for (i, node) in tree.nodes.iter().enumerate() {
        render_node(&mut builder, node, "", i + 1);
    }

    builder.into_string()
}

fn render_node(builder: &mut AsciidocBuilder, node: &Node, prefix: &str, num: usize) {
    match node {
        Node::Group(group) => render_group(builder, group, prefix, num),
        Node::Message(message) => render_message(builder, message, prefix, num),
    }
}

fn render_group(builder: &mut AsciidocBuilder, group: &Group, prefix: &str, num: usize) {
    builder.section_title_level1(&format!("{}{} {}", prefix, num, group.name));
    if let Some(description) = &group.description {
        builder.paragraph(description);
    }

    let nested_prefix = format!("{}{}.", prefix, num);
    for (i, node) in group.nodes.iter().enumerate() {
        render_node(builder, node, &nested_prefix, i + 1);
    }
}

fn render_message(builder: &mut AsciidocBuilder, message: &HttpMessage, prefix: &str, num: usize) {
    builder.section_title_level2(&format!("{}{} {}", prefix, num, message.name));
    if let Some(description) = &message.description {
        builder.paragraph(description);
    }

    let request = &message.request;
    let mut lines = vec![format!("{} {} {}", request.method, request.uri, message.version)];
    lines.extend(request.headers.iter().map(|(k, v)| format!("{}: {}", k, v)));
    lines.push(String::new());
    lines.extend(body_lines(&request.payload));
    builder.block("REQUEST", &lines);
    field_table(builder, &request.payload.fields);

    if let Some(response) = message.response.as_ref().filter(|r| !r.is_empty()) {
        let status_line = match response.status {
            Some(status) => format!("{} {}", message.version, status),
            None => message.version.clone(),
        };
        let mut lines = vec![status_line];
        lines.extend(response.headers.iter().map(|(k, v)| format!("{}: {}", k, v)));
        lines.push(String::new());
        lines.extend(body_lines(&response.payload));
        builder.block("RESPONSE", &lines);
        field_table(builder, &response.payload.fields);
    }
}

/// Captured body, or the synthesized example, as display lines
fn body_lines(payload: &Payload) -> Vec<String> {
    let text = match payload.display_body() {
        None => return Vec::new(),
        Some(serde_json::Value::String(text)) => text,
        Some(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string()),
    };
    text.lines().map(String::from).collect()
}

fn field_table(builder: &mut AsciidocBuilder, fields: &[FieldDescriptor]) {
    if fields.is_empty() {
        return;
    }

    let mut rows = vec![TABLE_HEADER.iter().map(|h| h.to_string()).collect::<Vec<_>>()];
    rows.extend(fields.iter().map(|field| field.to_row().to_vec()));
    builder.table(&rows);
}
