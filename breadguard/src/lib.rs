//! BreadGuard - breadboard circuit validation library
//!
//! This library checks a breadboard circuit (components placed in holes,
//! jumper wires between holes and component pins) for structural problems,
//! dangling references, shorts, open circuits and per-component mistakes
//! such as a reversed LED or a PWM signal on a pin that cannot produce one.
//!
//! # Quick Start
//!
//! ```no_run
//! use breadguard::{standard_layout, CircuitValidator, ComponentRegistry};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), breadguard::BreadGuardError> {
//! let registry = Arc::new(ComponentRegistry::builtin());
//! let validator = CircuitValidator::new(registry, standard_layout(30));
//!
//! let result = validator.validate_file("blink.json".as_ref()).await?;
//! for error in &result.errors {
//!     println!("{} [{}]: {}", error.code(), error.location, error.message);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Layers
//!
//! - **Structure**: document shape; any failure stops the run
//! - **References**: ids, component types, pin names, holes, wire endpoints
//! - **Electrical**: pins of one component on one bus, power wired to ground
//! - **Topology**: LED/resistor series, ground and source paths, isolation
//! - **Component rules**: LED polarity, resistor pins, PWM-capable pins

pub mod analyzer;
pub mod breadboard;
pub mod circuit;
pub mod core;
pub mod diagnostics;
pub mod registry;
pub mod report;

// Re-export main types
pub use analyzer::rules::{DefinitionTable, Rule, RuleContext, RulesEngine};
pub use breadboard::{load_holes, standard_layout, BusIndex, ConnectionPoint, HoleKind};
pub use circuit::{Circuit, CircuitDocument, ComponentInstance, WireInstance};
pub use core::{
    discover_circuit_files, BreadGuardError, CircuitValidator, ValidationOptions, ValidationResult,
    ValidationStats,
};
pub use diagnostics::{Diagnostic, DiagnosticKind, Severity};
pub use registry::{ComponentDefinition, ComponentRegistry, RegistryError};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        standard_layout, BreadGuardError, CircuitValidator, ComponentRegistry, Diagnostic,
        DiagnosticKind, Severity, ValidationOptions, ValidationResult,
    };
}
