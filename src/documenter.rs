use crate::capture::{ApiTree, Payload};
use crate::error::SynthesisError;
use crate::synthesizer::Synthesizer;
use crate::type_resolver::TypeResolver;
use log::{debug, info, warn};

/// Enriches captured payloads with synthesized examples and field tables
pub struct Documenter<'a> {
    resolver: &'a TypeResolver,
}

/// Outcome counts of a documentation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentReport {
    /// Payloads that received an example and field table
    pub documented: usize,
    /// Payloads whose body type could not be resolved
    pub unresolved: usize,
    /// Payloads whose body type is generic or otherwise unsupported
    pub unsupported: usize,
    /// Individual fields omitted or cut short while documenting
    pub field_issues: usize,
}

impl<'a> Documenter<'a> {
    pub fn new(resolver: &'a TypeResolver) -> Self {
        Self { resolver }
    }

    /// Document every request and response in `tree` that names its body type.
    ///
    /// Failures only affect the payload concerned; the pass itself never fails.
    pub fn document(&self, tree: &mut ApiTree) -> DocumentReport {
        let mut report = DocumentReport::default();

        for message in tree.messages_mut() {
            debug!("Documenting message: {}", message.name);
            let label = format!("{} {}", message.request.method, message.request.uri);
            let request_label = format!("{} request", label);
            self.document_payload(&request_label, &mut message.request.payload, &mut report);
            if let Some(response) = message.response.as_mut() {
                let response_label = format!("{} response", label);
                self.document_payload(&response_label, &mut response.payload, &mut report);
            }
        }

        info!(
            "Documented {} payloads ({} unresolved, {} unsupported, {} field issues)",
            report.documented, report.unresolved, report.unsupported, report.field_issues
        );
        report
    }

    fn document_payload(&self, label: &str, payload: &mut Payload, report: &mut DocumentReport) {
        let Some(body_type) = payload.body_type.as_deref() else {
            return;
        };

        let Some(handle) = self.resolver.resolve(body_type) else {
            report.unresolved += 1;
            return;
        };

        match Synthesizer::new(self.resolver).synthesize(&handle) {
            Ok(result) => {
                for issue in &result.issues {
                    warn!("{}: {}", label, issue);
                }
                report.field_issues += result.issues.len();
                report.documented += 1;
                payload.example = Some(result.value);
                payload.fields = result.fields;
            }
            Err(err) => {
                warn!("{}: cannot document body: {}", label, err);
                match err {
                    SynthesisError::Unresolved(_) => report.unresolved += 1,
                    SynthesisError::Unsupported(_) => report.unsupported += 1,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{HttpMessage, HttpRequest, HttpResponse, Node};
    use crate::parser::AstParser;
    use indexmap::IndexMap;
    use serde_json::json;
    use std::path::Path;

    const MODELS: &str = r#"
        pub struct CreateUser {
            pub name: String,
            pub tags: Vec<String>,
        }

        pub struct User {
            pub id: u64,
            pub name: String,
            pub manager: Box<User>,
        }
    "#;

    fn resolver() -> TypeResolver {
        let module_path = vec!["model".to_string()];
        let parsed = AstParser::parse_source(Path::new("model.rs"), module_path, MODELS).unwrap();
        TypeResolver::new(&[parsed], &[])
    }

    fn payload(body_type: &str) -> Payload {
        Payload {
            body_type: Some(body_type.to_string()),
            ..Payload::default()
        }
    }

    fn message(request_type: &str, response_type: &str) -> Node {
        Node::Message(HttpMessage {
            name: "Create user".to_string(),
            description: None,
            version: "HTTP/1.1".to_string(),
            request: HttpRequest {
                method: "POST".to_string(),
                uri: "/users".to_string(),
                headers: IndexMap::new(),
                payload: payload(request_type),
            },
            response: Some(HttpResponse {
                status: Some(201),
                headers: IndexMap::new(),
                payload: payload(response_type),
            }),
        })
    }

    fn tree(nodes: Vec<Node>) -> ApiTree {
        ApiTree {
            name: "User API".to_string(),
            description: None,
            nodes,
        }
    }

    #[test]
    fn test_document_fills_example_and_fields() {
        let resolver = resolver();
        let mut tree = tree(vec![message("CreateUser", "User")]);

        let report = Documenter::new(&resolver).document(&mut tree);

        assert_eq!(report.documented, 2);
        // CreateUser.tags is a Vec, User.manager refers back to User
        assert_eq!(report.field_issues, 2);

        let messages = tree.messages_mut();
        let request = &messages[0].request.payload;
        assert_eq!(request.example.as_ref().unwrap().to_json(), json!({"name": ""}));
        assert_eq!(request.fields.len(), 1);

        let response = &messages[0].response.as_ref().unwrap().payload;
        assert_eq!(
            response.example.as_ref().unwrap().to_json(),
            json!({"id": 0, "name": "", "manager": null})
        );
    }

    #[test]
    fn test_failures_are_scoped_to_one_payload() {
        let resolver = resolver();
        let mut tree = tree(vec![
            message("Missing", "Vec<User>"),
            message("CreateUser", "User"),
        ]);

        let report = Documenter::new(&resolver).document(&mut tree);

        assert_eq!(
            report,
            DocumentReport {
                documented: 2,
                unresolved: 1,
                unsupported: 1,
                field_issues: 2,
            }
        );
        let messages = tree.messages_mut();
        assert!(messages[0].request.payload.example.is_none());
        assert!(messages[0].request.payload.fields.is_empty());
        assert!(messages[1].request.payload.example.is_some());
    }

    #[test]
    fn test_payload_without_type_is_left_alone() {
        let resolver = resolver();
        let mut node = message("User", "User");
        if let Node::Message(message) = &mut node {
            message.request.payload = Payload {
                body: Some(json!({"raw": true})),
                ..Payload::default()
            };
            message.response = None;
        }
        let mut tree = tree(vec![node]);

        let report = Documenter::new(&resolver).document(&mut tree);

        assert_eq!(report, DocumentReport::default());
        assert!(tree.messages_mut()[0].request.payload.example.is_none());
    }
}
