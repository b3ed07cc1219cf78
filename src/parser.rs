use crate::scanner::SourceFile;
use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Parser turning Rust source files into `syn` syntax trees.
///
/// # Example
///
/// ```no_run
/// use restdoc_from_source::parser::AstParser;
/// use std::path::Path;
///
/// let module_path = vec!["model".to_string()];
/// let parsed = AstParser::parse_file(Path::new("src/model.rs"), module_path).unwrap();
/// println!("Parsed {} items", parsed.syntax_tree.items.len());
/// ```
pub struct AstParser;

/// A parsed source file
#[derive(Debug)]
pub struct ParsedFile {
    pub path: PathBuf,
    /// Module path of the file, used to qualify type identities
    pub module_path: Vec<String>,
    pub syntax_tree: syn::File,
}

impl AstParser {
    /// Read and parse a single file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid Rust syntax.
    pub fn parse_file(path: &Path, module_path: Vec<String>) -> Result<ParsedFile> {
        debug!("Parsing file: {}", path.display());

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        Self::parse_source(path, module_path, &content)
    }

    /// Parse source text that has already been read.
    pub fn parse_source(
        path: &Path,
        module_path: Vec<String>,
        content: &str,
    ) -> Result<ParsedFile> {
        let syntax_tree = syn::parse_file(content)
            .with_context(|| format!("Failed to parse Rust syntax in file: {}", path.display()))?;

        Ok(ParsedFile {
            path: path.to_path_buf(),
            module_path,
            syntax_tree,
        })
    }

    /// Parse every scanned file, keeping going past failures.
    ///
    /// Failures are logged as warnings so documentation can still be produced for the types
    /// that did parse.
    pub fn parse_files(files: &[SourceFile]) -> Vec<Result<ParsedFile>> {
        debug!("Parsing {} files", files.len());

        let results: Vec<Result<ParsedFile>> = files
            .iter()
            .map(|file| {
                Self::parse_file(&file.path, file.module_path.clone()).map_err(|e| {
                    warn!("Failed to parse {}: {:#}", file.path.display(), e);
                    e
                })
            })
            .collect();

        let failures = results.iter().filter(|r| r.is_err()).count();
        debug!(
            "Parsing complete: {} succeeded, {} failed",
            results.len() - failures,
            failures
        );

        results
    }
}
