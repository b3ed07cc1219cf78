use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::{debug, info};
use std::path::PathBuf;

/// Generate AsciiDoc API documentation from captured HTTP traffic and the Rust types behind it
#[derive(Parser, Debug)]
#[command(name = "restdoc-from-source")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the Rust project whose types describe the payloads
    #[arg(value_name = "PROJECT_PATH")]
    pub project_path: PathBuf,

    /// Captured traffic file (YAML, or JSON with a .json extension)
    #[arg(short = 'c', long = "captures", value_name = "FILE")]
    pub captures_path: PathBuf,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value = "asciidoc")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Extra type name to document as an opaque string (repeatable), e.g. Uuid
    #[arg(long = "string-type", value_name = "NAME")]
    pub string_types: Vec<String>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// AsciiDoc document
    Asciidoc,
    /// Documented tree as JSON
    Json,
    /// Documented tree as YAML
    Yaml,
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.project_path.is_dir() {
        anyhow::bail!(
            "Project path is not a directory: {}",
            args.project_path.display()
        );
    }

    if !args.captures_path.is_file() {
        anyhow::bail!(
            "Capture file does not exist: {}",
            args.captures_path.display()
        );
    }

    info!("Project path: {}", args.project_path.display());
    info!("Captures: {}", args.captures_path.display());
    info!("Output format: {:?}", args.output_format);
    match &args.output_path {
        Some(output) => info!("Output file: {}", output.display()),
        None => info!("Output: stdout"),
    }
    if !args.string_types.is_empty() {
        info!("Opaque string types: {}", args.string_types.join(", "));
    }

    Ok(args)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    use crate::asciidoc;
    use crate::capture::load_tree;
    use crate::documenter::Documenter;
    use crate::parser::{AstParser, ParsedFile};
    use crate::scanner::FileScanner;
    use crate::serializer::{serialize_json, serialize_yaml, write_to_file};
    use crate::type_resolver::TypeResolver;

    info!("Starting documentation generation...");

    // Step 1: Scan directory for Rust files
    info!("Scanning project directory...");
    let scan_result = FileScanner::new(args.project_path.clone()).scan()?;
    info!("Found {} Rust files", scan_result.source_files.len());
    for warning in &scan_result.warnings {
        log::warn!("{}", warning);
    }

    // Step 2: Parse files into AST
    info!("Parsing Rust files...");
    let parsed_files: Vec<ParsedFile> = AstParser::parse_files(&scan_result.source_files)
        .into_iter()
        .filter_map(|r| match r {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                debug!("Skipping file due to parse error: {}", e);
                None
            }
        })
        .collect();
    info!("Successfully parsed {} files", parsed_files.len());

    if parsed_files.is_empty() {
        log::warn!("No Rust types available, payloads will not be enriched");
    }

    // Step 3: Index the declared types
    info!("Initializing type resolver...");
    let resolver = TypeResolver::new(&parsed_files, &args.string_types);

    // Step 4: Load captured traffic
    info!("Loading captured traffic...");
    let mut tree = load_tree(&args.captures_path)?;

    // Step 5: Synthesize examples and field tables
    info!("Documenting payloads...");
    let report = Documenter::new(&resolver).document(&mut tree);

    // Step 6: Render
    info!("Rendering {:?} output...", args.output_format);
    let content = match args.output_format {
        OutputFormat::Asciidoc => asciidoc::render(&tree),
        OutputFormat::Json => serialize_json(&tree)?,
        OutputFormat::Yaml => serialize_yaml(&tree)?,
    };

    // Step 7: Output to file or stdout
    if let Some(output_path) = &args.output_path {
        write_to_file(&content, output_path)?;
        info!("Successfully wrote documentation to {}", output_path.display());
    } else {
        println!("{}", content);
    }

    info!("Generation complete!");
    info!("Summary:");
    info!("  - Files scanned: {}", scan_result.source_files.len());
    info!("  - Files parsed: {}", parsed_files.len());
    info!("  - Types indexed: {}", resolver.catalog().len());
    info!("  - Payloads documented: {}", report.documented);
    info!("  - Unresolved payload types: {}", report.unresolved);
    info!("  - Unsupported payload types: {}", report.unsupported);
    info!("  - Field issues: {}", report.field_issues);

    Ok(())
}
