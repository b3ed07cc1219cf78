use anyhow::{Context, Result};
use log::{debug, warn};
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// File scanner that collects the Rust sources whose types can be documented.
///
/// Walks the project directory recursively, skipping `target` and hidden directories, and
/// derives the module path of every `.rs` file it finds so that types can be given
/// fully-qualified identities.
///
/// # Example
///
/// ```no_run
/// use restdoc_from_source::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./my-service"));
/// let result = scanner.scan().unwrap();
/// println!("Found {} Rust files", result.source_files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
}

/// A discovered source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Module path segments, e.g. `["model", "user"]` for `src/model/user.rs`
    pub module_path: Vec<String>,
}

/// Result of a directory scan
pub struct ScanResult {
    pub source_files: Vec<SourceFile>,
    /// Inaccessible entries, reported but not fatal
    pub warnings: Vec<String>,
}

impl FileScanner {
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Scan the project tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be read at all.
    pub fn scan(&self) -> Result<ScanResult> {
        std::fs::read_dir(&self.root_path)
            .with_context(|| format!("Failed to read directory: {}", self.root_path.display()))?;

        let mut source_files = Vec::new();
        let mut warnings = Vec::new();

        let walker = WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                if e.path() == self.root_path {
                    return true;
                }
                let file_name = e.file_name().to_string_lossy();
                !file_name.starts_with('.') && file_name != "target"
            });

        for entry in walker {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("rs") {
                        let relative = path.strip_prefix(&self.root_path).unwrap_or(path);
                        let module_path = module_path_for(relative);
                        debug!("Found {} (module {:?})", path.display(), module_path);
                        source_files.push(SourceFile {
                            path: path.to_path_buf(),
                            module_path,
                        });
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        Ok(ScanResult {
            source_files,
            warnings,
        })
    }
}

/// Derive the module path of a file from its path relative to the project root.
///
/// Segments after the last `src` directory are used when present. `lib.rs`, `main.rs` and
/// `mod.rs` do not add a segment of their own.
pub fn module_path_for(relative: &Path) -> Vec<String> {
    let mut segments: Vec<String> = relative
        .parent()
        .into_iter()
        .flat_map(Path::components)
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy().to_string()),
            _ => None,
        })
        .collect();

    if let Some(src) = segments.iter().rposition(|segment| segment == "src") {
        segments.drain(..=src);
    }

    if let Some(stem) = relative.file_stem().map(|s| s.to_string_lossy().to_string()) {
        if !matches!(stem.as_str(), "lib" | "main" | "mod") {
            segments.push(stem);
        }
    }

    segments
}
