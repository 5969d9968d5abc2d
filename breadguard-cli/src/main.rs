//! BreadGuard CLI - breadboard circuit validation from the command line.

use anyhow::Context;
use breadguard::breadboard::{DEFAULT_COLUMNS, MAX_COLUMNS};
use breadguard::report::render_text;
use breadguard::{
    discover_circuit_files, load_holes, standard_layout, CircuitValidator, ComponentRegistry,
    Diagnostic, RulesEngine, ValidationOptions, ValidationResult,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

const EXIT_VALID: i32 = 0;
const EXIT_INVALID: i32 = 1;
const EXIT_ERROR: i32 = 2;

fn columns_range() -> clap::builder::RangedI64ValueParser<u32> {
    clap::value_parser!(u32).range(1..=i64::from(MAX_COLUMNS))
}

#[derive(Parser)]
#[command(name = "breadguard")]
#[command(about = "Breadboard circuit validation tool", long_about = None)]
#[command(version)]
struct Cli {
    /// Log to stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a single circuit file
    Check {
        /// Path to a circuit .json file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,

        #[command(flatten)]
        setup: SetupArgs,
    },

    /// Validate every circuit file in a directory
    Project {
        /// Path to project directory
        #[arg(value_name = "DIR", default_value = ".")]
        dir: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,

        #[command(flatten)]
        setup: SetupArgs,
    },

    /// List the validation layers
    Rules {
        /// Show what each layer checks
        #[arg(short, long)]
        details: bool,
    },

    /// List the component types in the library
    Components {
        /// Show pins and rule capability of each type
        #[arg(short, long)]
        details: bool,

        #[command(flatten)]
        library: LibraryArgs,
    },

    /// Print the standard breadboard hole list as JSON
    Holes {
        /// Number of breadboard columns
        #[arg(long, default_value_t = DEFAULT_COLUMNS, value_parser = columns_range())]
        columns: u32,
    },
}

#[derive(Args)]
struct LibraryArgs {
    /// Component library directory (index.json plus one file per type)
    #[arg(long, value_name = "DIR", conflicts_with = "library_url")]
    library: Option<PathBuf>,

    /// Base URL of a component library served over HTTP
    #[arg(long, value_name = "URL")]
    library_url: Option<String>,
}

#[derive(Args)]
struct SetupArgs {
    #[command(flatten)]
    library: LibraryArgs,

    /// Breadboard hole list (.json); defaults to the standard layout
    #[arg(long, value_name = "FILE", conflicts_with = "columns")]
    breadboard: Option<PathBuf>,

    /// Columns of the standard layout
    #[arg(long, default_value_t = DEFAULT_COLUMNS, value_parser = columns_range())]
    columns: u32,

    /// Validation options file (.json)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Treat warnings as errors
    #[arg(long)]
    strict: bool,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output for CI/CD
    Json,
    /// GitHub Actions format
    Github,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let outcome = match cli.command {
        Commands::Check { file, format, setup } => handle_check(&file, format, &setup).await,
        Commands::Project { dir, format, setup } => handle_project(&dir, format, &setup).await,
        Commands::Rules { details } => {
            handle_rules(details);
            Ok(EXIT_VALID)
        }
        Commands::Components { details, library } => handle_components(details, &library).await,
        Commands::Holes { columns } => handle_holes(columns),
    };

    let exit_code = outcome.unwrap_or_else(|e| {
        eprintln!("Error: {:#}", e);
        EXIT_ERROR
    });
    process::exit(exit_code);
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn build_registry(library: &LibraryArgs) -> ComponentRegistry {
    match (&library.library, &library.library_url) {
        (Some(dir), _) => ComponentRegistry::from_directory(dir),
        (None, Some(url)) => ComponentRegistry::from_url(url),
        (None, None) => ComponentRegistry::builtin(),
    }
}

fn build_validator(setup: &SetupArgs) -> anyhow::Result<CircuitValidator> {
    let registry = Arc::new(build_registry(&setup.library));

    let holes = match &setup.breadboard {
        Some(path) => load_holes(path)
            .with_context(|| format!("failed to load breadboard from {}", path.display()))?,
        None => standard_layout(setup.columns),
    };

    let mut options = match &setup.config {
        Some(path) => ValidationOptions::from_file(path)
            .with_context(|| format!("failed to read options from {}", path.display()))?,
        None => ValidationOptions::default(),
    };
    if setup.strict {
        options.strict_mode = true;
    }

    let validator = CircuitValidator::new(registry, holes).with_options(options);
    tracing::debug!(
        "Using component library '{}', {} holes on {} buses, strict mode {}",
        validator.registry().source_name(),
        validator.bus_index().hole_count(),
        validator.bus_index().bus_count(),
        validator.options().strict_mode
    );
    Ok(validator)
}

async fn handle_check(file: &Path, format: OutputFormat, setup: &SetupArgs) -> anyhow::Result<i32> {
    let validator = build_validator(setup)?;
    let result = validator
        .validate_file(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;

    let results = vec![(file.to_path_buf(), result)];
    output_results(&results, &format)?;
    Ok(exit_code_for(&results))
}

async fn handle_project(dir: &Path, format: OutputFormat, setup: &SetupArgs) -> anyhow::Result<i32> {
    let validator = build_validator(setup)?;
    let files = discover_circuit_files(dir)
        .with_context(|| format!("failed to scan {}", dir.display()))?;

    if files.is_empty() {
        eprintln!("No circuit files found in {}", dir.display());
        return Ok(EXIT_VALID);
    }

    let mut results = Vec::with_capacity(files.len());
    for file in files {
        let result = validator
            .validate_file(&file)
            .await
            .with_context(|| format!("failed to read {}", file.display()))?;
        results.push((file, result));
    }

    output_results(&results, &format)?;
    Ok(exit_code_for(&results))
}

fn exit_code_for(results: &[(PathBuf, ValidationResult)]) -> i32 {
    if results.iter().all(|(_, r)| r.valid) {
        EXIT_VALID
    } else {
        EXIT_INVALID
    }
}

fn output_results(results: &[(PathBuf, ValidationResult)], format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Human => {
            output_human(results);
            Ok(())
        }
        OutputFormat::Json => output_json(results),
        OutputFormat::Github => {
            output_github(results);
            Ok(())
        }
    }
}

fn output_human(results: &[(PathBuf, ValidationResult)]) {
    for (file, result) in results {
        println!("\nFile: {}", file.display());
        println!("{}", "─".repeat(60));
        for line in render_text(result).lines() {
            println!("  {}", line);
        }
    }
}

fn output_json(results: &[(PathBuf, ValidationResult)]) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "results": results.iter().map(|(file, r)| {
            serde_json::json!({
                "file": file.display().to_string(),
                "valid": r.valid,
                "errors": r.errors,
                "warnings": r.warnings,
            })
        }).collect::<Vec<_>>(),
        "summary": {
            "total_files": results.len(),
            "valid_files": results.iter().filter(|(_, r)| r.valid).count(),
            "total_errors": results.iter().map(|(_, r)| r.errors.len()).sum::<usize>(),
            "total_warnings": results.iter().map(|(_, r)| r.warnings.len()).sum::<usize>(),
        }
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn github_line(level: &str, file: &Path, diagnostic: &Diagnostic) -> String {
    format!(
        "::{} file={},title={}::{} ({})",
        level,
        file.display(),
        diagnostic.code(),
        diagnostic.message.replace('\n', " "),
        diagnostic.location
    )
}

fn output_github(results: &[(PathBuf, ValidationResult)]) {
    for (file, result) in results {
        for diagnostic in &result.errors {
            println!("{}", github_line("error", file, diagnostic));
        }
        for diagnostic in &result.warnings {
            println!("{}", github_line("warning", file, diagnostic));
        }
    }
}

fn handle_rules(details: bool) {
    println!("Validation layers (run in this order):\n");

    println!("  structure");
    println!("    Document Structure");
    if details {
        println!("    Required keys and types; any failure stops validation");
    }
    println!();

    let engine = RulesEngine::with_default_rules();
    for rule in engine.rules() {
        println!("  {}", rule.id());
        println!("    {}", rule.name());
        if details {
            println!("    {}", rule.description());
        }
        println!();
    }
}

async fn handle_components(details: bool, library: &LibraryArgs) -> anyhow::Result<i32> {
    let registry = build_registry(library);
    registry
        .init()
        .await
        .with_context(|| format!("failed to load component library '{}'", registry.source_name()))?;

    println!("Component types in '{}':\n", registry.source_name());
    for component_type in registry.component_types().await? {
        println!("  {}", component_type);
        if !details {
            continue;
        }
        match registry.load(&component_type).await {
            Ok(definition) => {
                if let Some(name) = &definition.name {
                    println!("    {}", name);
                }
                println!(
                    "    rules: {}",
                    definition.electrical_type().unwrap_or("none")
                );
                println!("    pins:  {}", definition.pin_names().join(", "));
            }
            Err(e) => println!("    failed to load: {}", e),
        }
    }
    Ok(EXIT_VALID)
}

fn handle_holes(columns: u32) -> anyhow::Result<i32> {
    let holes = standard_layout(columns);
    println!("{}", serde_json::to_string_pretty(&holes)?);
    Ok(EXIT_VALID)
}
