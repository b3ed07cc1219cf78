//! Captured HTTP traffic, organised as a document tree.
//!
//! The tree is produced by the test harness that recorded the traffic and read back from a
//! YAML or JSON file. Groups nest arbitrarily; messages are the leaves. The documenter fills in
//! the `example` and `fields` of each payload that names its body type.

use crate::schema::{ExampleValue, FieldDescriptor};
use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Root of the document tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiTree {
    /// Document title
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub nodes: Vec<Node>,
}

/// A group of nodes or a single HTTP exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Node {
    Group(Group),
    Message(HttpMessage),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub nodes: Vec<Node>,
}

/// One captured request/response exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpMessage {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Protocol version shown in the request and status lines
    #[serde(default = "default_version")]
    pub version: String,
    pub request: HttpRequest,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<HttpResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpRequest {
    pub method: String,
    pub uri: String,
    #[serde(default)]
    pub headers: IndexMap<String, String>,
    #[serde(flatten)]
    pub payload: Payload,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default)]
    pub headers: IndexMap<String, String>,
    #[serde(flatten)]
    pub payload: Payload,
}

/// Body of a request or response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Payload {
    /// Body as captured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
    /// Static type of the body, e.g. `CreateUser` or `model::User`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_type: Option<String>,
    /// Example synthesized from `body_type`
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub example: Option<ExampleValue>,
    /// Field table synthesized from `body_type`
    #[serde(skip_deserializing, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldDescriptor>,
}

fn default_version() -> String {
    "HTTP/1.1".to_string()
}

impl Payload {
    /// Captured body if present, otherwise the synthesized example
    pub fn display_body(&self) -> Option<serde_json::Value> {
        self.body
            .clone()
            .or_else(|| self.example.as_ref().map(ExampleValue::to_json))
    }
}

impl HttpResponse {
    /// Whether nothing at all was captured for the response
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.headers.is_empty()
            && self.payload.body.is_none()
            && self.payload.body_type.is_none()
    }
}

impl ApiTree {
    /// Visit every message in document order
    pub fn messages_mut(&mut self) -> Vec<&mut HttpMessage> {
        fn walk<'a>(nodes: &'a mut [Node], out: &mut Vec<&'a mut HttpMessage>) {
            for node in nodes {
                match node {
                    Node::Group(group) => walk(&mut group.nodes, out),
                    Node::Message(message) => out.push(message),
                }
            }
        }

        let mut messages = Vec::new();
        walk(&mut self.nodes, &mut messages);
        messages
    }
}

/// Load a captured traffic tree. `.json` files are read as JSON, anything else as YAML.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not describe a tree.
pub fn load_tree(path: &Path) -> Result<ApiTree> {
    debug!("Loading captured traffic from {}", path.display());

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read capture file: {}", path.display()))?;

    let is_json = path.extension().and_then(|s| s.to_str()) == Some("json");
    let tree: ApiTree = if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON capture file: {}", path.display()))?
    } else {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid YAML capture file: {}", path.display()))?
    };

    debug!("Loaded capture tree '{}' with {} top-level nodes", tree.name, tree.nodes.len());
    Ok(tree)
}
