//! Core validation pipeline shared by the CLI and library users.
//!
//! circuit JSON -> structure (abort on failure) -> references -> electrical
//! -> topology -> component rules -> `{ valid, errors, warnings }`

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::analyzer::rules::{DefinitionTable, RuleContext, RulesEngine};
use crate::analyzer::structure::check_structure;
use crate::breadboard::{BusIndex, ConnectionPoint};
use crate::circuit::{Circuit, CircuitDocument};
use crate::diagnostics::{Diagnostic, DiagnosticKind, Severity};
use crate::registry::{ComponentRegistry, RegistryError, INDEX_FILE};

#[derive(Debug, thiserror::Error)]
pub enum BreadGuardError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Component registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("Breadboard layout error: {0}")]
    Layout(String),
    #[error("{0}")]
    Other(String),
}

/// Options for validation runs (CLI or library).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidationOptions {
    /// Report warnings as errors.
    pub strict_mode: bool,
    /// Look for power/ground shorts spanning several wires.
    pub detect_transitive_shorts: bool,
    /// Rule ids to run; empty runs every registered rule.
    pub rules: Vec<String>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            strict_mode: false,
            detect_transitive_shorts: true,
            rules: vec![],
        }
    }
}

impl ValidationOptions {
    /// Load options from a JSON file; missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, BreadGuardError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn rule_enabled(&self, rule_id: &str) -> bool {
        self.rules.is_empty() || self.rules.iter().any(|r| r == rule_id)
    }
}

/// Outcome of one validation run. `valid` is true iff `errors` is empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ValidationStats {
    pub errors: usize,
    pub warnings: usize,
}

impl ValidationResult {
    /// Split diagnostics by severity, keeping emission order.
    pub fn from_diagnostics(diagnostics: Vec<Diagnostic>, strict_mode: bool) -> Self {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        for mut diagnostic in diagnostics {
            if strict_mode {
                diagnostic.severity = Severity::Error;
            }
            match diagnostic.severity {
                Severity::Error => errors.push(diagnostic),
                Severity::Warning => warnings.push(diagnostic),
            }
        }

        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// Every diagnostic, errors first.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.errors.iter().chain(self.warnings.iter())
    }

    pub fn find(&self, code: &str) -> Option<&Diagnostic> {
        self.diagnostics().find(|d| d.code() == code)
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.find(code).is_some()
    }

    pub fn count_code(&self, code: &str) -> usize {
        self.diagnostics().filter(|d| d.code() == code).count()
    }

    pub fn total_issues(&self) -> usize {
        self.errors.len() + self.warnings.len()
    }

    pub fn stats(&self) -> ValidationStats {
        ValidationStats {
            errors: self.errors.len(),
            warnings: self.warnings.len(),
        }
    }
}

/// Recursively discover circuit JSON files in a directory.
pub fn discover_circuit_files(dir: &Path) -> Result<Vec<PathBuf>, BreadGuardError> {
    let mut files = Vec::new();
    walk_dir(dir, &mut files, 0)?;
    files.sort();
    Ok(files)
}

fn walk_dir(dir: &Path, files: &mut Vec<PathBuf>, depth: usize) -> Result<(), BreadGuardError> {
    if depth > 20 {
        return Ok(());
    }
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if name.starts_with('.') || name == "node_modules" || name == "target" {
                continue;
            }
            walk_dir(&path, files, depth + 1)?;
        } else if path.is_file() {
            let is_json = path.extension().and_then(|s| s.to_str()) == Some("json");
            let is_index = path.file_name().and_then(|n| n.to_str()) == Some(INDEX_FILE);
            if is_json && !is_index {
                files.push(path);
            }
        }
    }
    Ok(())
}

/// Runs the layered validation pipeline against one breadboard and one
/// shared component registry.
pub struct CircuitValidator {
    registry: Arc<ComponentRegistry>,
    bus_index: BusIndex,
    engine: RulesEngine,
    options: ValidationOptions,
}

impl CircuitValidator {
    pub fn new(registry: Arc<ComponentRegistry>, holes: Vec<ConnectionPoint>) -> Self {
        Self {
            registry,
            bus_index: BusIndex::new(holes),
            engine: RulesEngine::with_default_rules(),
            options: ValidationOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ValidationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_engine(mut self, engine: RulesEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    pub fn bus_index(&self) -> &BusIndex {
        &self.bus_index
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Validate a parsed circuit document.
    pub async fn validate(&self, document: &serde_json::Value) -> ValidationResult {
        if !self.registry.is_initialized().await {
            if let Err(e) = self.registry.init().await {
                tracing::warn!("Component library failed to load: {}", e);
                return self.finish(vec![Diagnostic::circuit(
                    DiagnosticKind::LibraryLoadFailed {
                        reason: e.to_string(),
                    },
                    format!("Component library could not be loaded: {}", e),
                )]);
            }
        }

        let structural = check_structure(document);
        if !structural.is_empty() {
            tracing::debug!("Structure check failed with {} issues", structural.len());
            return self.finish(structural);
        }

        let circuit = match CircuitDocument::from_value(document.clone()) {
            Ok(doc) => doc.circuit,
            Err(e) => {
                return self.finish(vec![Diagnostic::circuit(
                    DiagnosticKind::InvalidJson,
                    format!("Circuit document could not be read: {}", e),
                )]);
            }
        };

        self.run_rules(&circuit).await
    }

    /// Validate circuit JSON text. Unparseable text yields `INVALID_JSON`.
    pub async fn validate_str(&self, text: &str) -> ValidationResult {
        match serde_json::from_str::<serde_json::Value>(text) {
            Ok(document) => self.validate(&document).await,
            Err(e) => self.finish(vec![Diagnostic::circuit(
                DiagnosticKind::InvalidJson,
                format!("Circuit is not valid JSON: {}", e),
            )]),
        }
    }

    /// Validate a circuit JSON file.
    pub async fn validate_file(&self, path: &Path) -> Result<ValidationResult, BreadGuardError> {
        let text = tokio::fs::read_to_string(path).await?;
        tracing::info!("Validating {}", path.display());
        Ok(self.validate_str(&text).await)
    }

    /// Validate an in-memory circuit through the same JSON path an
    /// exported file would take.
    pub async fn validate_circuit(&self, circuit: &Circuit) -> ValidationResult {
        let document = CircuitDocument::new(circuit.clone()).to_value();
        self.validate(&document).await
    }

    async fn run_rules(&self, circuit: &Circuit) -> ValidationResult {
        let definitions = DefinitionTable::resolve(&self.registry, circuit).await;
        let context = RuleContext {
            circuit,
            bus_index: &self.bus_index,
            definitions: &definitions,
            options: &self.options,
        };
        let diagnostics = self.engine.analyze(&context);
        self.finish(diagnostics)
    }

    fn finish(&self, diagnostics: Vec<Diagnostic>) -> ValidationResult {
        let result = ValidationResult::from_diagnostics(diagnostics, self.options.strict_mode);
        tracing::info!(
            "Validation finished: valid={} errors={} warnings={}",
            result.valid,
            result.errors.len(),
            result.warnings.len()
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn warning() -> Diagnostic {
        Diagnostic::circuit(DiagnosticKind::NoConnections, "no wires")
    }

    fn error() -> Diagnostic {
        Diagnostic::new(
            "x1",
            DiagnosticKind::UnknownComponentType {
                component_type: "flux-capacitor".to_string(),
            },
            "unknown",
        )
    }

    #[test]
    fn test_warnings_do_not_affect_validity() {
        let result = ValidationResult::from_diagnostics(vec![warning()], false);
        assert!(result.valid);
        assert_eq!(result.stats(), ValidationStats { errors: 0, warnings: 1 });
    }

    #[test]
    fn test_strict_mode_promotes_warnings() {
        let result = ValidationResult::from_diagnostics(vec![warning(), error()], true);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 2);
        assert!(result.warnings.is_empty());
        assert_eq!(result.errors[0].code(), "NO_CONNECTIONS");
    }

    #[test]
    fn test_result_lookup() {
        let result = ValidationResult::from_diagnostics(vec![error(), warning(), error()], false);
        assert!(result.has_code("UNKNOWN_COMPONENT_TYPE"));
        assert_eq!(result.count_code("UNKNOWN_COMPONENT_TYPE"), 2);
        assert_eq!(result.find("NO_CONNECTIONS").map(|d| d.severity), Some(Severity::Warning));
        assert!(!result.has_code("SHORT_CIRCUIT"));
        assert_eq!(result.total_issues(), 3);
    }

    #[test]
    fn test_options_from_file_defaults_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.json");
        std::fs::write(&path, r#"{ "strictMode": true }"#).unwrap();

        let options = ValidationOptions::from_file(&path).unwrap();
        assert!(options.strict_mode);
        assert!(options.detect_transitive_shorts);
        assert!(options.rule_enabled("topology"));
    }

    #[test]
    fn test_rule_filter() {
        let options = ValidationOptions {
            rules: vec!["electrical".to_string()],
            ..Default::default()
        };
        assert!(options.rule_enabled("electrical"));
        assert!(!options.rule_enabled("topology"));
    }

    #[test]
    fn test_discover_circuit_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::create_dir(dir.path().join(".hidden")).unwrap();
        std::fs::write(dir.path().join("a.json"), "{}").unwrap();
        std::fs::write(dir.path().join("nested/b.json"), "{}").unwrap();
        std::fs::write(dir.path().join(".hidden/c.json"), "{}").unwrap();
        std::fs::write(dir.path().join("index.json"), "{}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();

        let files = discover_circuit_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a.json"));
        assert!(files[1].ends_with("nested/b.json"));
    }
}
