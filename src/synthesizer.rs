//! Recursive schema synthesis.
//!
//! Given a [`TypeHandle`], the [`Synthesizer`] produces an example value mirroring the type's
//! shape together with a flat, depth-first list of [`FieldDescriptor`]s. Structured types are
//! expanded ancestors first, then their own declared fields; each field's nested descriptors
//! immediately follow its own descriptor.
//!
//! The identities currently being expanded are tracked along the recursion path. Revisiting
//! one yields a `null` back-reference and a [`IssueKind::Cycle`] issue instead of recursing.

use crate::error::{Result, SynthesisError};
use crate::schema::{
    ExampleValue, FieldDescriptor, FieldIssue, IssueKind, Placeholder, SynthesisResult,
};
use crate::type_model::{Ancestor, FieldDeclaration, TypeDeclaration, TypeHandle, TypeLookup};
use indexmap::IndexMap;
use log::{debug, trace};

/// Schema synthesizer over a [`TypeLookup`]
pub struct Synthesizer<'a, L: TypeLookup + ?Sized> {
    lookup: &'a L,
}

/// Entries, descriptors and issues contributed by one declaration level
#[derive(Default)]
struct Contribution {
    entries: Vec<(String, ExampleValue)>,
    fields: Vec<FieldDescriptor>,
    issues: Vec<FieldIssue>,
}

impl Contribution {
    fn issue(issue: FieldIssue) -> Self {
        Self {
            issues: vec![issue],
            ..Self::default()
        }
    }

    fn append(&mut self, other: Contribution) {
        self.entries.extend(other.entries);
        self.fields.extend(other.fields);
        self.issues.extend(other.issues);
    }
}

impl<'a, L: TypeLookup + ?Sized> Synthesizer<'a, L> {
    pub fn new(lookup: &'a L) -> Self {
        Self { lookup }
    }

    /// Synthesize the example value and field table for `handle`.
    ///
    /// # Errors
    ///
    /// Returns [`SynthesisError::Unsupported`] when `handle` itself is a generic or unmapped
    /// type, and [`SynthesisError::Unresolved`] when it names a structured type the lookup
    /// does not know. Problems with nested fields never fail the call; the field is omitted
    /// and reported in [`SynthesisResult::issues`].
    pub fn synthesize(&self, handle: &TypeHandle) -> Result<SynthesisResult> {
        debug!("Synthesizing example for {}", handle);
        let mut path = Vec::new();
        self.synthesize_in(handle, &mut path)
    }

    fn synthesize_in(
        &self,
        handle: &TypeHandle,
        path: &mut Vec<String>,
    ) -> Result<SynthesisResult> {
        match handle {
            TypeHandle::Primitive(_) => Ok(SynthesisResult::terminal(ExampleValue::Primitive(
                Placeholder::Zero,
            ))),
            TypeHandle::Array(component) => {
                let element = self.synthesize_in(component, path)?;
                Ok(SynthesisResult {
                    value: ExampleValue::Array(vec![element.value]),
                    fields: element.fields,
                    issues: element.issues,
                })
            }
            TypeHandle::Reference { identity, .. } => {
                if self.lookup.is_root(identity) {
                    Ok(SynthesisResult::terminal(ExampleValue::Null))
                } else if self.lookup.is_string_like(identity) {
                    Ok(SynthesisResult::terminal(ExampleValue::Primitive(
                        Placeholder::EmptyText,
                    )))
                } else {
                    self.synthesize_object(identity, path)
                }
            }
            TypeHandle::Parameterized { .. } | TypeHandle::Unsupported(_) => {
                Err(SynthesisError::Unsupported(handle.describe()))
            }
        }
    }

    fn synthesize_object(&self, identity: &str, path: &mut Vec<String>) -> Result<SynthesisResult> {
        if path.iter().any(|expanding| expanding == identity) {
            debug!("{} is already being expanded, emitting back-reference", identity);
            return Ok(SynthesisResult {
                value: ExampleValue::Null,
                fields: Vec::new(),
                issues: vec![FieldIssue::new(
                    "",
                    IssueKind::Cycle {
                        identity: identity.to_string(),
                    },
                )],
            });
        }

        let declaration = self
            .lookup
            .declaration(identity)
            .ok_or_else(|| SynthesisError::Unresolved(identity.to_string()))?;

        path.push(identity.to_string());
        let contribution = self.declaration_contribution(declaration, path);
        path.pop();

        // Later declarations of the same name overwrite the entry but keep their descriptors.
        let mut entries = IndexMap::new();
        for (name, value) in contribution.entries {
            entries.insert(name, value);
        }

        Ok(SynthesisResult {
            value: ExampleValue::Object(entries),
            fields: contribution.fields,
            issues: contribution.issues,
        })
    }

    /// Ancestors first, then own fields. The declaration must already be on `path`.
    fn declaration_contribution(
        &self,
        declaration: &TypeDeclaration,
        path: &mut Vec<String>,
    ) -> Contribution {
        trace!(
            "Collecting {} ancestors and {} fields of {}",
            declaration.ancestors.len(),
            declaration.fields.len(),
            declaration.identity
        );

        let mut contribution = Contribution::default();
        for ancestor in &declaration.ancestors {
            contribution.append(self.ancestor_contribution(ancestor, path));
        }
        for field in &declaration.fields {
            contribution.append(self.field_contribution(field, path));
        }
        contribution
    }

    fn ancestor_contribution(&self, ancestor: &Ancestor, path: &mut Vec<String>) -> Contribution {
        let issue_path = ancestor.issue_path();
        let identity = match &ancestor.ty {
            Some(TypeHandle::Reference { identity, .. }) => identity,
            Some(other) => {
                debug!("Non-nominal ancestor {} cannot be inlined", other);
                return Contribution::issue(FieldIssue::new(
                    issue_path,
                    IssueKind::Unsupported {
                        type_name: other.describe(),
                    },
                ));
            }
            None => {
                return Contribution::issue(FieldIssue::new(
                    issue_path,
                    IssueKind::Unresolved {
                        raw: ancestor.raw_type.clone(),
                    },
                ));
            }
        };

        if self.lookup.is_root(identity) || self.lookup.is_string_like(identity) {
            return Contribution::default();
        }

        if path.iter().any(|expanding| expanding == identity) {
            debug!("Ancestor {} is already being expanded", identity);
            return Contribution::issue(FieldIssue::new(
                issue_path,
                IssueKind::Cycle {
                    identity: identity.clone(),
                },
            ));
        }

        let Some(declaration) = self.lookup.declaration(identity) else {
            debug!("Ancestor {} has no declaration", identity);
            return Contribution::issue(FieldIssue::new(
                issue_path,
                IssueKind::Unresolved {
                    raw: ancestor.raw_type.clone(),
                },
            ));
        };

        path.push(identity.clone());
        let contribution = self.declaration_contribution(declaration, path);
        path.pop();
        contribution
    }

    fn field_contribution(&self, field: &FieldDeclaration, path: &mut Vec<String>) -> Contribution {
        let Some(ty) = &field.ty else {
            return Contribution::issue(FieldIssue::new(
                field.name.clone(),
                IssueKind::Unresolved {
                    raw: field.raw_type.clone(),
                },
            ));
        };

        match self.synthesize_in(ty, path) {
            Ok(result) => {
                let default_value = if result.value.is_leaf() {
                    None
                } else {
                    Some(result.value.clone())
                };

                let mut contribution = Contribution::default();
                contribution
                    .fields
                    .push(FieldDescriptor::new(field.name.clone(), ty.describe(), default_value));
                contribution.fields.extend(result.fields);
                contribution.issues.extend(
                    result
                        .issues
                        .into_iter()
                        .map(|issue| issue.nested_under(&field.name)),
                );
                contribution.entries.push((field.name.clone(), result.value));
                contribution
            }
            Err(err) => {
                trace!("Omitting field {}: {}", field.name, err);
                Contribution::issue(FieldIssue::new(field.name.clone(), err.into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_model::{PrimitiveType, TypeCatalog};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn int() -> TypeHandle {
        TypeHandle::Primitive(PrimitiveType::I32)
    }

    fn point() -> TypeDeclaration {
        TypeDeclaration::new("model::Point", "Point")
            .with_field("x", int())
            .with_field("y", int())
    }

    fn catalog(declarations: Vec<TypeDeclaration>) -> TypeCatalog {
        let mut catalog = TypeCatalog::new();
        for declaration in declarations {
            catalog.insert(declaration);
        }
        catalog
    }

    fn rows(result: &SynthesisResult) -> Vec<[String; 4]> {
        result.fields.iter().map(FieldDescriptor::to_row).collect()
    }

    fn row(name: &str, type_name: &str, default: &str) -> [String; 4] {
        [name, type_name, default, ""].map(String::from)
    }

    #[test]
    fn test_primitive_is_terminal() {
        let catalog = TypeCatalog::new();
        let synthesizer = Synthesizer::new(&catalog);

        let primitives = [
            PrimitiveType::I64,
            PrimitiveType::Bool,
            PrimitiveType::Char,
            PrimitiveType::F32,
        ];
        for primitive in primitives {
            let result = synthesizer.synthesize(&TypeHandle::Primitive(primitive)).unwrap();
            assert_eq!(result.value, ExampleValue::Primitive(Placeholder::Zero));
            assert!(result.fields.is_empty());
            assert!(result.issues.is_empty());
        }
    }

    #[test]
    fn test_root_is_null() {
        let catalog = TypeCatalog::new();
        let result = Synthesizer::new(&catalog).synthesize(&TypeHandle::root()).unwrap();

        assert_eq!(result.value, ExampleValue::Null);
        assert!(result.fields.is_empty());
    }

    #[test]
    fn test_string_like_is_empty_text() {
        let mut catalog = TypeCatalog::new();
        catalog.add_string_like("Uuid");
        let synthesizer = Synthesizer::new(&catalog);

        for handle in [TypeHandle::string(), TypeHandle::reference("Uuid", "Uuid")] {
            let result = synthesizer.synthesize(&handle).unwrap();
            assert_eq!(result.value, ExampleValue::Primitive(Placeholder::EmptyText));
            assert!(result.fields.is_empty());
        }
    }

    #[test]
    fn test_point() {
        let point = point();
        let catalog = catalog(vec![point.clone()]);
        let result = Synthesizer::new(&catalog).synthesize(&point.handle()).unwrap();

        assert_eq!(result.value.to_json(), json!({"x": 0, "y": 0}));
        assert_eq!(rows(&result), vec![row("x", "i32", ""), row("y", "i32", "")]);
    }

    #[test]
    fn test_nested_object_and_string_array() {
        let point = point();
        let wrapper = TypeDeclaration::new("model::Wrapper", "Wrapper")
            .with_field("p", point.handle())
            .with_field("tags", TypeHandle::array(TypeHandle::string()));
        let catalog = catalog(vec![point, wrapper.clone()]);

        let result = Synthesizer::new(&catalog).synthesize(&wrapper.handle()).unwrap();

        assert_eq!(
            result.value.to_json(),
            json!({"p": {"x": 0, "y": 0}, "tags": [""]})
        );
        assert_eq!(
            rows(&result),
            vec![
                row("p", "Point", r#"{"x":0,"y":0}"#),
                row("x", "i32", ""),
                row("y", "i32", ""),
                row("tags", "String[]", ""),
            ]
        );
    }

    #[test]
    fn test_array_passes_component_fields_through() {
        let point = point();
        let catalog = catalog(vec![point.clone()]);
        let synthesizer = Synthesizer::new(&catalog);

        let element = synthesizer.synthesize(&point.handle()).unwrap();
        let array = synthesizer
            .synthesize(&TypeHandle::array(point.handle()))
            .unwrap();

        assert_eq!(array.value, ExampleValue::Array(vec![element.value]));
        assert_eq!(array.fields, element.fields);
    }

    #[test]
    fn test_array_of_objects_keeps_default() {
        let point = point();
        let path = TypeDeclaration::new("model::Path", "Path")
            .with_field("points", TypeHandle::array(point.handle()));
        let catalog = catalog(vec![point, path.clone()]);

        let result = Synthesizer::new(&catalog).synthesize(&path.handle()).unwrap();

        assert_eq!(
            rows(&result),
            vec![
                row("points", "Point[]", r#"[{"x":0,"y":0}]"#),
                row("x", "i32", ""),
                row("y", "i32", ""),
            ]
        );
    }

    #[test]
    fn test_ancestor_fields_come_first() {
        let location = TypeDeclaration::new("geo::Location", "Location")
            .with_field("lat", TypeHandle::Primitive(PrimitiveType::F64));
        let a = TypeDeclaration::new("model::A", "A")
            .with_ancestor(TypeHandle::root())
            .with_field("a1", location.handle());
        let b = TypeDeclaration::new("model::B", "B")
            .with_ancestor(a.handle())
            .with_field("b1", TypeHandle::string());
        let c = TypeDeclaration::new("model::C", "C")
            .with_ancestor(b.handle())
            .with_field("c1", int());
        let catalog = catalog(vec![location, a, b, c.clone()]);

        let result = Synthesizer::new(&catalog).synthesize(&c.handle()).unwrap();

        match &result.value {
            ExampleValue::Object(entries) => {
                let keys: Vec<&str> = entries.keys().map(String::as_str).collect();
                assert_eq!(keys, vec!["a1", "b1", "c1"]);
            }
            other => panic!("Expected object, got {:?}", other),
        }
        assert_eq!(
            rows(&result),
            vec![
                row("a1", "Location", r#"{"lat":0}"#),
                row("lat", "f64", ""),
                row("b1", "String", ""),
                row("c1", "i32", ""),
            ]
        );
    }

    #[test]
    fn test_redeclared_field_overwrites_value_but_keeps_rows() {
        let point = point();
        let base = TypeDeclaration::new("model::Base", "Base")
            .with_field("id", int())
            .with_field("shape", TypeHandle::string());
        let derived = TypeDeclaration::new("model::Derived", "Derived")
            .with_ancestor(base.handle())
            .with_field("shape", point.handle());
        let catalog = catalog(vec![point, base, derived.clone()]);

        let result = Synthesizer::new(&catalog).synthesize(&derived.handle()).unwrap();

        assert_eq!(
            result.value.to_json(),
            json!({"id": 0, "shape": {"x": 0, "y": 0}})
        );
        assert_eq!(
            rows(&result),
            vec![
                row("id", "i32", ""),
                row("shape", "String", ""),
                row("shape", "Point", r#"{"x":0,"y":0}"#),
                row("x", "i32", ""),
                row("y", "i32", ""),
            ]
        );
    }

    #[test]
    fn test_synthesis_is_repeatable() {
        let point = point();
        let wrapper = TypeDeclaration::new("model::Wrapper", "Wrapper")
            .with_field("p", point.handle())
            .with_field("ps", TypeHandle::array(point.handle()));
        let catalog = catalog(vec![point, wrapper.clone()]);
        let synthesizer = Synthesizer::new(&catalog);

        let first = synthesizer.synthesize(&wrapper.handle()).unwrap();
        let second = synthesizer.synthesize(&wrapper.handle()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_self_reference_terminates() {
        let node = TypeDeclaration::new("list::N", "N")
            .with_field("value", int())
            .with_field("next", TypeHandle::reference("list::N", "N"));
        let catalog = catalog(vec![node.clone()]);

        let result = Synthesizer::new(&catalog).synthesize(&node.handle()).unwrap();

        assert_eq!(result.value.to_json(), json!({"value": 0, "next": null}));
        assert_eq!(rows(&result), vec![row("value", "i32", ""), row("next", "N", "")]);
        assert_eq!(
            result.issues,
            vec![FieldIssue::new(
                "next",
                IssueKind::Cycle {
                    identity: "list::N".to_string()
                }
            )]
        );
    }

    #[test]
    fn test_mutual_reference_terminates() {
        let author = TypeDeclaration::new("blog::Author", "Author")
            .with_field("name", TypeHandle::string())
            .with_field("posts", TypeHandle::array(TypeHandle::reference("blog::Post", "Post")));
        let post = TypeDeclaration::new("blog::Post", "Post")
            .with_field("title", TypeHandle::string())
            .with_field("author", author.handle());
        let catalog = catalog(vec![author.clone(), post]);

        let result = Synthesizer::new(&catalog).synthesize(&author.handle()).unwrap();

        assert_eq!(
            result.value.to_json(),
            json!({"name": "", "posts": [{"title": "", "author": null}]})
        );
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].path, "posts.author");
    }

    #[test]
    fn test_inheritance_cycle_terminates() {
        let a = TypeDeclaration::new("model::A", "A")
            .with_ancestor(TypeHandle::reference("model::B", "B"))
            .with_field("a", int());
        let b = TypeDeclaration::new("model::B", "B")
            .with_ancestor(a.handle())
            .with_field("b", int());
        let catalog = catalog(vec![a.clone(), b]);

        let result = Synthesizer::new(&catalog).synthesize(&a.handle()).unwrap();

        assert_eq!(result.value.to_json(), json!({"b": 0, "a": 0}));
        assert_eq!(
            result.issues,
            vec![FieldIssue::new(
                "",
                IssueKind::Cycle {
                    identity: "model::A".to_string()
                }
            )]
        );
        assert_eq!(
            result.issues[0].to_string(),
            "inherited fields not expanded: model::A is already being expanded"
        );
    }

    #[test]
    fn test_non_nominal_flattened_ancestors_are_reported() {
        let meta =
            TypeDeclaration::new("model::Meta", "Meta").with_field("etag", TypeHandle::string());
        let mut item = TypeDeclaration::new("model::Item", "Item").with_field("id", int());
        item.ancestors.push(Ancestor::flattened(
            "extra",
            "HashMap<String, Value>",
            Some(TypeHandle::Parameterized {
                base: "HashMap".to_string(),
                arguments: vec![TypeHandle::string(), TypeHandle::root()],
            }),
        ));
        item.ancestors.push(Ancestor::flattened(
            "meta",
            "Option<Meta>",
            Some(TypeHandle::Parameterized {
                base: "Option".to_string(),
                arguments: vec![meta.handle()],
            }),
        ));
        item.ancestors.push(Ancestor::flattened("audit", "Audit", None));
        let catalog = catalog(vec![meta, item.clone()]);

        let result = Synthesizer::new(&catalog).synthesize(&item.handle()).unwrap();

        assert_eq!(result.value.to_json(), json!({"id": 0}));
        assert_eq!(rows(&result), vec![row("id", "i32", "")]);
        assert_eq!(
            result.issues,
            vec![
                FieldIssue::new(
                    "extra",
                    IssueKind::Unsupported {
                        type_name: "HashMap<String, Value>".to_string()
                    }
                ),
                FieldIssue::new(
                    "meta",
                    IssueKind::Unsupported {
                        type_name: "Option<Meta>".to_string()
                    }
                ),
                FieldIssue::new(
                    "audit",
                    IssueKind::Unresolved {
                        raw: "Audit".to_string()
                    }
                ),
            ]
        );
    }

    #[test]
    fn test_unsupported_field_is_omitted_and_reported() {
        let tagged = TypeDeclaration::new("model::Tagged", "Tagged")
            .with_field("id", int())
            .with_field(
                "labels",
                TypeHandle::Parameterized {
                    base: "Vec".to_string(),
                    arguments: vec![TypeHandle::string()],
                },
            );
        let catalog = catalog(vec![tagged.clone()]);

        let result = Synthesizer::new(&catalog).synthesize(&tagged.handle()).unwrap();

        assert_eq!(result.value.to_json(), json!({"id": 0}));
        assert_eq!(rows(&result), vec![row("id", "i32", "")]);
        assert_eq!(
            result.issues,
            vec![FieldIssue::new(
                "labels",
                IssueKind::Unsupported {
                    type_name: "Vec<String>".to_string()
                }
            )]
        );
    }

    #[test]
    fn test_unresolved_field_is_omitted_and_reported() {
        let mut order = TypeDeclaration::new("shop::Order", "Order").with_field("id", int());
        order
            .fields
            .push(FieldDeclaration::unresolved("customer", "Customer"));
        let catalog = catalog(vec![order.clone()]);

        let result = Synthesizer::new(&catalog).synthesize(&order.handle()).unwrap();

        assert_eq!(result.value.to_json(), json!({"id": 0}));
        assert_eq!(result.fields.len(), 1);
        assert_eq!(
            result.issues,
            vec![FieldIssue::new(
                "customer",
                IssueKind::Unresolved {
                    raw: "Customer".to_string()
                }
            )]
        );
    }

    #[test]
    fn test_top_level_failures() {
        let catalog = TypeCatalog::new();
        let synthesizer = Synthesizer::new(&catalog);

        let option = TypeHandle::Parameterized {
            base: "Option".to_string(),
            arguments: vec![int()],
        };
        assert_eq!(
            synthesizer.synthesize(&option),
            Err(SynthesisError::Unsupported("Option<i32>".to_string()))
        );
        assert_eq!(
            synthesizer.synthesize(&TypeHandle::reference("model::Ghost", "Ghost")),
            Err(SynthesisError::Unresolved("model::Ghost".to_string()))
        );
        let pairs = TypeHandle::array(TypeHandle::Unsupported("(i32, i32)".to_string()));
        assert_eq!(
            synthesizer.synthesize(&pairs),
            Err(SynthesisError::Unsupported("(i32, i32)".to_string()))
        );
    }
}
