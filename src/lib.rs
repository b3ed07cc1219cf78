//! restdoc-from-source - AsciiDoc API documentation from captured HTTP traffic.
//!
//! Test runs record HTTP exchanges into a capture file. This library enriches every captured
//! request and response that names the Rust type of its body with an example JSON payload and a
//! field table, both synthesized from the type's static declaration, and renders the result.
//!
//! # Architecture
//!
//! 1. [`scanner`] - Recursively scans project directories for Rust files
//! 2. [`parser`] - Parses Rust source files into `syn` syntax trees
//! 3. [`type_model`] - Parser-independent type handles and declarations
//! 4. [`type_resolver`] - Binds type references in the sources to type handles
//! 5. [`synthesizer`] - Derives example values and field tables from type handles
//! 6. [`capture`] - The captured traffic tree
//! 7. [`documenter`] - Applies the synthesizer to every captured payload
//! 8. [`asciidoc`] - Renders the documented tree
//! 9. [`serializer`] - Dumps the documented tree as YAML or JSON
//!
//! # Example Usage
//!
//! ```no_run
//! use restdoc_from_source::{
//!     asciidoc,
//!     capture::load_tree,
//!     documenter::Documenter,
//!     parser::AstParser,
//!     scanner::FileScanner,
//!     type_resolver::TypeResolver,
//! };
//! use std::path::{Path, PathBuf};
//!
//! let scan_result = FileScanner::new(PathBuf::from("./my-service")).scan().unwrap();
//! let parsed_files: Vec<_> = AstParser::parse_files(&scan_result.source_files)
//!     .into_iter()
//!     .filter_map(Result::ok)
//!     .collect();
//!
//! let resolver = TypeResolver::new(&parsed_files, &[]);
//! let mut tree = load_tree(Path::new("captures.yaml")).unwrap();
//! Documenter::new(&resolver).document(&mut tree);
//!
//! println!("{}", asciidoc::render(&tree));
//! ```

pub mod cli;
pub mod scanner;
pub mod parser;
pub mod type_model;
pub mod type_resolver;
pub mod schema;
pub mod synthesizer;
pub mod capture;
pub mod documenter;
pub mod asciidoc;
pub mod serializer;
pub mod error;
