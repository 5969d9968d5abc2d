//! Example: adding a rule of your own to the default pipeline.
//! Run with: cargo run --example custom_rules [path/to/circuit.json]

use breadguard::prelude::*;
use breadguard::{Rule, RuleContext, RulesEngine};
use std::path::Path;
use std::sync::Arc;

/// Restricts circuits to the parts handed out with a starter kit.
struct StarterKitRule {
    allowed: Vec<&'static str>,
}

impl Rule for StarterKitRule {
    fn id(&self) -> &str {
        "starter_kit"
    }

    fn name(&self) -> &str {
        "Starter Kit Parts"
    }

    fn description(&self) -> &str {
        "Only component types from the starter kit may be used"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        ctx.circuit
            .components
            .iter()
            .filter(|c| !self.allowed.contains(&c.component_type.as_str()))
            .map(|c| {
                Diagnostic::new(
                    &c.id,
                    DiagnosticKind::UnknownComponentType {
                        component_type: c.component_type.clone(),
                    },
                    format!("'{}' is not part of the starter kit", c.component_type),
                )
            })
            .collect()
    }
}

#[tokio::main]
async fn main() -> Result<(), BreadGuardError> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tests/fixtures/valid_blink.json".to_string());
    let path = Path::new(&path);

    let mut engine = RulesEngine::with_default_rules();
    engine.add_rule(Arc::new(StarterKitRule {
        allowed: vec!["led", "resistor", "raspberry-pi-pico"],
    }));

    let validator = CircuitValidator::new(Arc::new(ComponentRegistry::builtin()), standard_layout(30))
        .with_engine(engine);
    let result = validator.validate_file(path).await?;

    println!("Custom validation found {} issues for {}", result.total_issues(), path.display());
    for diagnostic in result.diagnostics() {
        println!("  [{}] {}: {}", diagnostic.severity, diagnostic.code(), diagnostic.message);
    }

    if !result.valid {
        std::process::exit(1);
    }
    Ok(())
}
