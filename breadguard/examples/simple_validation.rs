//! Simple validation example: validate a circuit file and print the report.
//! Run with: cargo run --example simple_validation [path/to/circuit.json]

use breadguard::prelude::*;
use std::path::Path;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), BreadGuardError> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tests/fixtures/valid_blink.json".to_string());
    let path = Path::new(&path);

    if !path.exists() {
        eprintln!("File not found: {}", path.display());
        eprintln!("Usage: cargo run --example simple_validation [path/to/circuit.json]");
        std::process::exit(1);
    }

    let registry = Arc::new(ComponentRegistry::builtin());
    let validator = CircuitValidator::new(registry, standard_layout(30));
    let result = validator.validate_file(path).await?;

    println!("Validation results for: {}", path.display());
    print!("{}", breadguard::report::render_text(&result));

    if !result.valid {
        std::process::exit(1);
    }
    Ok(())
}
