use crate::parser::ParsedFile;
use crate::type_model::{
    Ancestor, FieldDeclaration, PrimitiveType, TypeCatalog, TypeDeclaration, TypeHandle, TypeLookup,
    ROOT_IDENTITY,
};
use log::{debug, warn};
use std::collections::{HashMap, HashSet};

/// Type resolver - binds Rust type references found in source code to [`TypeHandle`]s.
///
/// All structs and enums of the parsed files are indexed up front. Named-field structs become
/// [`TypeDeclaration`]s in an internal [`TypeCatalog`], which the resolver exposes through
/// [`TypeLookup`] so it can be handed straight to the synthesizer.
pub struct TypeResolver {
    /// Nominal types indexed by their simple name
    index: HashMap<String, Vec<KnownType>>,
    /// Extra simple names documented as opaque strings
    string_types: HashSet<String>,
    catalog: TypeCatalog,
}

#[derive(Debug, Clone)]
struct KnownType {
    identity: String,
    module_path: Vec<String>,
    kind: KnownKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KnownKind {
    /// Named-field or unit struct
    Struct,
    /// Enum whose variants are all unit variants, serialized as a string
    StringEnum,
    /// Tuple struct or data-carrying enum
    Unsupported,
}

/// Where a type reference appears
#[derive(Clone, Copy)]
struct Scope<'s> {
    module_path: &'s [String],
    /// Declaration that `Self` refers to
    self_type: Option<&'s TypeHandle>,
}

/// Serde attributes for a field
#[derive(Debug, Clone, Default)]
struct SerdeAttributes {
    rename: Option<String>,
    skip: bool,
    flatten: bool,
}

/// Wrappers documented as their single type argument
const TRANSPARENT_WRAPPERS: &[&str] = &["Box", "Rc", "Arc", "Cow"];

impl TypeResolver {
    /// Index all types declared in `parsed_files`.
    ///
    /// `string_types` lists extra simple type names (such as `Uuid` or `DateTime`) to be
    /// documented as opaque strings.
    pub fn new(parsed_files: &[ParsedFile], string_types: &[String]) -> Self {
        debug!("Initializing TypeResolver with {} files", parsed_files.len());

        let mut structs = Vec::new();
        let mut index: HashMap<String, Vec<KnownType>> = HashMap::new();
        for parsed_file in parsed_files {
            collect_items(
                &parsed_file.syntax_tree.items,
                &parsed_file.module_path,
                &mut index,
                &mut structs,
            );
        }

        let mut resolver = Self {
            index,
            string_types: string_types.iter().cloned().collect(),
            catalog: TypeCatalog::new(),
        };

        for name in string_types {
            resolver.catalog.add_string_like(name.clone());
        }
        let string_enums: Vec<String> = resolver
            .index
            .values()
            .flatten()
            .filter(|known| known.kind == KnownKind::StringEnum)
            .map(|known| known.identity.clone())
            .collect();
        for identity in string_enums {
            resolver.catalog.add_string_like(identity);
        }

        let declarations: Vec<TypeDeclaration> = structs
            .iter()
            .map(|(module_path, item_struct)| {
                resolver.parse_struct_definition(module_path, item_struct)
            })
            .collect();
        for declaration in declarations {
            resolver.catalog.insert(declaration);
        }

        debug!("Indexed {} structured types", resolver.catalog.len());
        resolver
    }

    /// Resolve a raw type reference such as `User` or `Vec<model::Order>`.
    ///
    /// Returns `None`, after logging a warning, when the text is not a type or names a type
    /// that is not declared in the scanned sources.
    pub fn resolve(&self, raw: &str) -> Option<TypeHandle> {
        debug!("Resolving type: {}", raw);

        let ty = match syn::parse_str::<syn::Type>(raw) {
            Ok(ty) => ty,
            Err(e) => {
                warn!("try to resolve fail: {} ({})", raw, e);
                return None;
            }
        };

        let resolved = self.resolve_syn_type(&ty, &[]);
        if resolved.is_none() {
            warn!("try to resolve fail: {}", raw);
        }
        resolved
    }

    /// The catalog of structured declarations built from the sources
    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    /// Resolve a `syn::Type` seen in `module_path`
    pub fn resolve_syn_type(&self, ty: &syn::Type, module_path: &[String]) -> Option<TypeHandle> {
        let scope = Scope {
            module_path,
            self_type: None,
        };
        self.resolve_in(ty, scope)
    }

    fn resolve_in(&self, ty: &syn::Type, scope: Scope) -> Option<TypeHandle> {
        match ty {
            syn::Type::Path(type_path) if type_path.qself.is_none() => {
                self.resolve_path(&type_path.path, scope)
            }
            syn::Type::Reference(reference) => self.resolve_in(&reference.elem, scope),
            syn::Type::Paren(paren) => self.resolve_in(&paren.elem, scope),
            syn::Type::Group(group) => self.resolve_in(&group.elem, scope),
            syn::Type::Array(array) => self.resolve_in(&array.elem, scope).map(TypeHandle::array),
            syn::Type::Slice(slice) => self.resolve_in(&slice.elem, scope).map(TypeHandle::array),
            other => Some(TypeHandle::Unsupported(type_display(other))),
        }
    }

    fn resolve_path(&self, path: &syn::Path, scope: Scope) -> Option<TypeHandle> {
        let segment = path.segments.last()?;
        let name = segment.ident.to_string();

        if name == "Self" && path.segments.len() == 1 {
            return scope.self_type.cloned();
        }

        if self.string_types.contains(&name) {
            return Some(TypeHandle::reference(name.clone(), name));
        }

        let type_arguments: Vec<&syn::Type> = match &segment.arguments {
            syn::PathArguments::AngleBracketed(args) => args
                .args
                .iter()
                .filter_map(|arg| match arg {
                    syn::GenericArgument::Type(ty) => Some(ty),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };

        if !type_arguments.is_empty() {
            if type_arguments.len() == 1 && TRANSPARENT_WRAPPERS.contains(&name.as_str()) {
                return self.resolve_in(type_arguments[0], scope);
            }
            let arguments = type_arguments
                .iter()
                .map(|ty| {
                    self.resolve_in(ty, scope)
                        .unwrap_or_else(|| TypeHandle::Unsupported(type_display(ty)))
                })
                .collect();
            return Some(TypeHandle::Parameterized {
                base: name,
                arguments,
            });
        }

        if let Some(primitive) = PrimitiveType::from_name(&name) {
            return Some(TypeHandle::Primitive(primitive));
        }

        let qualifier: Vec<String> = path
            .segments
            .iter()
            .take(path.segments.len() - 1)
            .map(|s| s.ident.to_string())
            .filter(|s| !matches!(s.as_str(), "crate" | "self" | "super"))
            .collect();

        if let Some(known) = self.find_known(&name, &qualifier, scope.module_path) {
            return Some(match known.kind {
                KnownKind::Struct | KnownKind::StringEnum => {
                    TypeHandle::reference(known.identity.clone(), name)
                }
                KnownKind::Unsupported => TypeHandle::Unsupported(name),
            });
        }

        match name.as_str() {
            "String" => Some(TypeHandle::string()),
            "str" => Some(TypeHandle::reference("str", "str")),
            "Value" => Some(TypeHandle::reference(ROOT_IDENTITY, "Value")),
            _ => None,
        }
    }

    /// Pick the declaration `name` refers to.
    ///
    /// An explicit qualifier must match the end of the candidate's module path, possibly after
    /// dropping a leading crate name. Otherwise a candidate from the referring module wins,
    /// then the first one in scan order.
    fn find_known(
        &self,
        name: &str,
        qualifier: &[String],
        module_path: &[String],
    ) -> Option<&KnownType> {
        let candidates = self.index.get(name)?;

        if let Some((_, without_crate)) = qualifier.split_first() {
            return candidates
                .iter()
                .find(|known| known.module_path.ends_with(qualifier))
                .or_else(|| {
                    candidates.iter().find(|known| {
                        if without_crate.is_empty() {
                            known.module_path.is_empty()
                        } else {
                            known.module_path.ends_with(without_crate)
                        }
                    })
                });
        }

        if candidates.len() > 1 {
            debug!(
                "{} candidates for {}, preferring module {:?}",
                candidates.len(),
                name,
                module_path
            );
        }
        candidates
            .iter()
            .find(|known| known.module_path == module_path)
            .or_else(|| candidates.first())
    }

    fn parse_struct_definition(
        &self,
        module_path: &[String],
        item_struct: &syn::ItemStruct,
    ) -> TypeDeclaration {
        let name = item_struct.ident.to_string();
        debug!("Parsing struct definition: {}", name);

        let mut declaration = TypeDeclaration::new(qualified(module_path, &name), name.clone());
        let self_type = declaration.handle();
        let scope = Scope {
            module_path,
            self_type: Some(&self_type),
        };

        if let syn::Fields::Named(named_fields) = &item_struct.fields {
            for field in &named_fields.named {
                let Some(ident) = &field.ident else {
                    continue;
                };
                let serde_attrs = parse_serde_attributes(&field.attrs);
                if serde_attrs.skip {
                    continue;
                }

                let raw_type = type_display(&field.ty);
                let resolved = self.resolve_in(&field.ty, scope);

                if serde_attrs.flatten {
                    if resolved.is_none() {
                        warn!("try to resolve fail: {} (flattened into {})", raw_type, name);
                    }
                    declaration.ancestors.push(Ancestor::flattened(
                        ident.to_string(),
                        raw_type,
                        resolved,
                    ));
                    continue;
                }

                let field_name = serde_attrs.rename.unwrap_or_else(|| ident.to_string());
                match resolved {
                    Some(ty) => declaration.fields.push(FieldDeclaration {
                        name: field_name,
                        raw_type,
                        ty: Some(ty),
                    }),
                    None => {
                        warn!("try to resolve fail: {} (field {}.{})", raw_type, name, field_name);
                        declaration
                            .fields
                            .push(FieldDeclaration::unresolved(field_name, raw_type));
                    }
                }
            }
        }

        debug!(
            "Parsed {} with {} ancestors and {} fields",
            declaration.identity,
            declaration.ancestors.len(),
            declaration.fields.len()
        );
        declaration
    }
}

impl TypeLookup for TypeResolver {
    fn declaration(&self, identity: &str) -> Option<&TypeDeclaration> {
        self.catalog.declaration(identity)
    }

    fn is_string_like(&self, identity: &str) -> bool {
        self.catalog.is_string_like(identity)
    }
}

/// Walk items, descending into inline modules
fn collect_items<'a>(
    items: &'a [syn::Item],
    module_path: &[String],
    index: &mut HashMap<String, Vec<KnownType>>,
    structs: &mut Vec<(Vec<String>, &'a syn::ItemStruct)>,
) {
    for item in items {
        match item {
            syn::Item::Struct(item_struct) => {
                let name = item_struct.ident.to_string();
                let kind = match item_struct.fields {
                    syn::Fields::Unnamed(_) => KnownKind::Unsupported,
                    _ => {
                        structs.push((module_path.to_vec(), item_struct));
                        KnownKind::Struct
                    }
                };
                register(index, module_path, name, kind);
            }
            syn::Item::Enum(item_enum) => {
                let unit_only = item_enum
                    .variants
                    .iter()
                    .all(|variant| matches!(variant.fields, syn::Fields::Unit));
                let kind = if unit_only {
                    KnownKind::StringEnum
                } else {
                    KnownKind::Unsupported
                };
                register(index, module_path, item_enum.ident.to_string(), kind);
            }
            syn::Item::Mod(item_mod) => {
                if let Some((_, items)) = &item_mod.content {
                    let mut nested = module_path.to_vec();
                    nested.push(item_mod.ident.to_string());
                    collect_items(items, &nested, index, structs);
                }
            }
            _ => {}
        }
    }
}

fn register(
    index: &mut HashMap<String, Vec<KnownType>>,
    module_path: &[String],
    name: String,
    kind: KnownKind,
) {
    let known = KnownType {
        identity: qualified(module_path, &name),
        module_path: module_path.to_vec(),
        kind,
    };
    index.entry(name).or_default().push(known);
}

fn qualified(module_path: &[String], name: &str) -> String {
    if module_path.is_empty() {
        name.to_string()
    } else {
        format!("{}::{}", module_path.join("::"), name)
    }
}

/// Parse the field-level serde attributes that change the documented shape
fn parse_serde_attributes(attrs: &[syn::Attribute]) -> SerdeAttributes {
    let mut serde_attrs = SerdeAttributes::default();

    for attr in attrs {
        if !attr.path().is_ident("serde") {
            continue;
        }

        let parsed = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") && meta.input.peek(syn::Token![=]) {
                let value: syn::LitStr = meta.value()?.parse()?;
                serde_attrs.rename = Some(value.value());
            } else if meta.path.is_ident("skip") {
                serde_attrs.skip = true;
            } else if meta.path.is_ident("flatten") {
                serde_attrs.flatten = true;
            } else if meta.input.peek(syn::Token![=]) {
                meta.value()?.parse::<syn::Expr>()?;
            } else if meta.input.peek(syn::token::Paren) {
                meta.parse_nested_meta(|nested| {
                    if nested.input.peek(syn::Token![=]) {
                        nested.value()?.parse::<syn::Expr>()?;
                    }
                    Ok(())
                })?;
            }
            Ok(())
        });

        if let Err(e) = parsed {
            debug!("Ignoring malformed serde attribute: {}", e);
        }
    }

    serde_attrs
}

/// Human-readable rendering of a type as written in source
fn type_display(ty: &syn::Type) -> String {
    match ty {
        syn::Type::Path(type_path) => type_path
            .path
            .segments
            .iter()
            .map(|segment| {
                let ident = segment.ident.to_string();
                match &segment.arguments {
                    syn::PathArguments::AngleBracketed(args) => {
                        let args: Vec<String> = args
                            .args
                            .iter()
                            .filter_map(|arg| match arg {
                                syn::GenericArgument::Type(ty) => Some(type_display(ty)),
                                _ => None,
                            })
                            .collect();
                        if args.is_empty() {
                            ident
                        } else {
                            format!("{}<{}>", ident, args.join(", "))
                        }
                    }
                    _ => ident,
                }
            })
            .collect::<Vec<_>>()
            .join("::"),
        syn::Type::Reference(reference) => format!("&{}", type_display(&reference.elem)),
        syn::Type::Paren(paren) => type_display(&paren.elem),
        syn::Type::Group(group) => type_display(&group.elem),
        syn::Type::Array(array) => format!("[{}; _]", type_display(&array.elem)),
        syn::Type::Slice(slice) => format!("[{}]", type_display(&slice.elem)),
        syn::Type::Tuple(tuple) => {
            let elems: Vec<String> = tuple.elems.iter().map(type_display).collect();
            format!("({})", elems.join(", "))
        }
        syn::Type::TraitObject(_) => "dyn _".to_string(),
        syn::Type::ImplTrait(_) => "impl _".to_string(),
        syn::Type::BareFn(_) => "fn(..)".to_string(),
        syn::Type::Ptr(ptr) => format!("*{}", type_display(&ptr.elem)),
        syn::Type::Never(_) => "!".to_string(),
        _ => "_".to_string(),
    }
}
