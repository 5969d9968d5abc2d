//! Validation diagnostics.
//!
//! Every finding produced by the pipeline is a [`Diagnostic`]. The stable
//! `type` code and the structured detail for that code live together in
//! [`DiagnosticKind`], so consumers can `match` on the kind instead of
//! digging through an untyped bag of extra fields.
//!
//! Serialized form (one flat object per diagnostic):
//!
//! ```json
//! { "type": "SHORT_CIRCUIT", "severity": "error", "location": "r1",
//!   "message": "...", "bus": "bus3-bottom", "pins": ["pin0", "pin1"],
//!   "holes": ["3F", "3J"] }
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Which end of a wire a diagnostic refers to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum WireEnd {
    From,
    To,
}

impl std::fmt::Display for WireEnd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WireEnd::From => write!(f, "from"),
            WireEnd::To => write!(f, "to"),
        }
    }
}

/// The closed set of diagnostic codes, each carrying only its own detail.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum DiagnosticKind {
    // ============ Infrastructure ============
    LibraryLoadFailed { reason: String },

    // ============ Layer 1: structure ============
    InvalidJson,
    MissingCircuit,
    MissingMetadata,
    InvalidMetadata { field: String },
    MissingComponents,
    MissingComponentId { index: usize },
    MissingComponentType { index: usize },
    MissingPlacement { index: usize },
    EmptyPlacement { index: usize },
    InvalidHoleId { index: usize, pin: String },
    MissingWires,
    MissingWireId { index: usize },
    MissingWireFrom { index: usize },
    MissingWireTo { index: usize },

    // ============ Layer 2: references ============
    DuplicateComponentId { index: usize },
    UnknownComponentType { component_type: String },
    InvalidPinName { pin: String, valid_pins: Vec<String> },
    InvalidHoleReference { pin: String, hole: String },
    InvalidWireComponent { end: WireEnd, endpoint: String, component_id: String },
    InvalidWireHole { end: WireEnd, hole: String },
    DuplicateWireId { index: usize },

    // ============ Layer 3: electrical ============
    ShortCircuit { bus: String, pins: Vec<String>, holes: Vec<String> },
    PowerGroundShort { wires: Vec<String>, buses: Vec<String>, transitive: bool },

    // ============ Layer 4: topology ============
    EmptyCircuit,
    NoConnections,
    OpenCircuit {
        led: String,
        resistor: String,
        led_buses: Vec<String>,
        resistor_buses: Vec<String>,
    },
    NoGroundPath { bus: String },
    NoSourcePath { bus: String },
    DisconnectedGroups { group_count: usize, group_sizes: Vec<usize> },

    // ============ Layer 5: component rules ============
    InvalidLedPlacement { missing_pins: Vec<String> },
    LedReversed { pin: String, bus: String },
    InvalidResistorPlacement { pin_count: usize },
    InvalidPwmPin { pin: String, wire: String },
}

impl DiagnosticKind {
    /// Stable string code, identical to the serialized `type` field.
    pub fn code(&self) -> &'static str {
        match self {
            DiagnosticKind::LibraryLoadFailed { .. } => "LIBRARY_LOAD_FAILED",
            DiagnosticKind::InvalidJson => "INVALID_JSON",
            DiagnosticKind::MissingCircuit => "MISSING_CIRCUIT",
            DiagnosticKind::MissingMetadata => "MISSING_METADATA",
            DiagnosticKind::InvalidMetadata { .. } => "INVALID_METADATA",
            DiagnosticKind::MissingComponents => "MISSING_COMPONENTS",
            DiagnosticKind::MissingComponentId { .. } => "MISSING_COMPONENT_ID",
            DiagnosticKind::MissingComponentType { .. } => "MISSING_COMPONENT_TYPE",
            DiagnosticKind::MissingPlacement { .. } => "MISSING_PLACEMENT",
            DiagnosticKind::EmptyPlacement { .. } => "EMPTY_PLACEMENT",
            DiagnosticKind::InvalidHoleId { .. } => "INVALID_HOLE_ID",
            DiagnosticKind::MissingWires => "MISSING_WIRES",
            DiagnosticKind::MissingWireId { .. } => "MISSING_WIRE_ID",
            DiagnosticKind::MissingWireFrom { .. } => "MISSING_WIRE_FROM",
            DiagnosticKind::MissingWireTo { .. } => "MISSING_WIRE_TO",
            DiagnosticKind::DuplicateComponentId { .. } => "DUPLICATE_COMPONENT_ID",
            DiagnosticKind::UnknownComponentType { .. } => "UNKNOWN_COMPONENT_TYPE",
            DiagnosticKind::InvalidPinName { .. } => "INVALID_PIN_NAME",
            DiagnosticKind::InvalidHoleReference { .. } => "INVALID_HOLE_REFERENCE",
            DiagnosticKind::InvalidWireComponent { .. } => "INVALID_WIRE_COMPONENT",
            DiagnosticKind::InvalidWireHole { .. } => "INVALID_WIRE_HOLE",
            DiagnosticKind::DuplicateWireId { .. } => "DUPLICATE_WIRE_ID",
            DiagnosticKind::ShortCircuit { .. } => "SHORT_CIRCUIT",
            DiagnosticKind::PowerGroundShort { .. } => "POWER_GROUND_SHORT",
            DiagnosticKind::EmptyCircuit => "EMPTY_CIRCUIT",
            DiagnosticKind::NoConnections => "NO_CONNECTIONS",
            DiagnosticKind::OpenCircuit { .. } => "OPEN_CIRCUIT",
            DiagnosticKind::NoGroundPath { .. } => "NO_GROUND_PATH",
            DiagnosticKind::NoSourcePath { .. } => "NO_SOURCE_PATH",
            DiagnosticKind::DisconnectedGroups { .. } => "DISCONNECTED_GROUPS",
            DiagnosticKind::InvalidLedPlacement { .. } => "INVALID_LED_PLACEMENT",
            DiagnosticKind::LedReversed { .. } => "LED_REVERSED",
            DiagnosticKind::InvalidResistorPlacement { .. } => "INVALID_RESISTOR_PLACEMENT",
            DiagnosticKind::InvalidPwmPin { .. } => "INVALID_PWM_PIN",
        }
    }

    /// Severity a finding of this kind is reported with.
    pub fn default_severity(&self) -> Severity {
        match self {
            DiagnosticKind::EmptyCircuit
            | DiagnosticKind::NoConnections
            | DiagnosticKind::DisconnectedGroups { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// True for layer-1 codes, which abort the pipeline.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            DiagnosticKind::InvalidJson
                | DiagnosticKind::MissingCircuit
                | DiagnosticKind::MissingMetadata
                | DiagnosticKind::InvalidMetadata { .. }
                | DiagnosticKind::MissingComponents
                | DiagnosticKind::MissingComponentId { .. }
                | DiagnosticKind::MissingComponentType { .. }
                | DiagnosticKind::MissingPlacement { .. }
                | DiagnosticKind::EmptyPlacement { .. }
                | DiagnosticKind::InvalidHoleId { .. }
                | DiagnosticKind::MissingWires
                | DiagnosticKind::MissingWireId { .. }
                | DiagnosticKind::MissingWireFrom { .. }
                | DiagnosticKind::MissingWireTo { .. }
        )
    }
}

/// A single validation finding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnostic {
    #[serde(flatten)]
    pub kind: DiagnosticKind,
    pub severity: Severity,
    /// Component id, wire id, or `"circuit"`.
    pub location: String,
    pub message: String,
}

impl Diagnostic {
    /// Create a diagnostic with the kind's default severity.
    pub fn new(location: impl Into<String>, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        let severity = kind.default_severity();
        Self {
            kind,
            severity,
            location: location.into(),
            message: message.into(),
        }
    }

    /// Create a diagnostic located on the circuit as a whole.
    pub fn circuit(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self::new("circuit", kind, message)
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
