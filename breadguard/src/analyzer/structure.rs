//! Layer 1: document shape.
//!
//! Runs on the raw JSON value before anything is deserialized. Every
//! problem found is reported, but any finding at all stops the pipeline.

use serde_json::{Map, Value};

use crate::diagnostics::{Diagnostic, DiagnosticKind};

/// Check the circuit document shape. An empty result means the document can
/// be deserialized into a [`Circuit`](crate::circuit::Circuit).
pub fn check_structure(document: &Value) -> Vec<Diagnostic> {
    let Some(root) = document.as_object() else {
        return vec![Diagnostic::circuit(
            DiagnosticKind::InvalidJson,
            "Circuit document must be a JSON object",
        )];
    };

    let Some(circuit) = root.get("circuit").and_then(Value::as_object) else {
        return vec![Diagnostic::circuit(
            DiagnosticKind::MissingCircuit,
            "Document has no 'circuit' object",
        )];
    };

    let mut diagnostics = Vec::new();
    check_metadata(circuit, &mut diagnostics);
    check_components(circuit, &mut diagnostics);
    check_wires(circuit, &mut diagnostics);
    diagnostics
}

fn non_empty_str<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    object
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn check_metadata(circuit: &Map<String, Value>, diagnostics: &mut Vec<Diagnostic>) {
    let Some(metadata) = circuit.get("metadata").and_then(Value::as_object) else {
        diagnostics.push(Diagnostic::circuit(
            DiagnosticKind::MissingMetadata,
            "Circuit has no 'metadata' object",
        ));
        return;
    };

    for field in ["name", "description"] {
        if non_empty_str(metadata, field).is_none() {
            diagnostics.push(Diagnostic::circuit(
                DiagnosticKind::InvalidMetadata {
                    field: field.to_string(),
                },
                format!("Circuit metadata needs a non-empty '{}'", field),
            ));
        }
    }
}

fn check_components(circuit: &Map<String, Value>, diagnostics: &mut Vec<Diagnostic>) {
    let Some(components) = circuit.get("components").and_then(Value::as_array) else {
        diagnostics.push(Diagnostic::circuit(
            DiagnosticKind::MissingComponents,
            "Circuit 'components' must be an array",
        ));
        return;
    };

    for (index, component) in components.iter().enumerate() {
        let location = format!("components[{}]", index);
        let empty = Map::new();
        let component = component.as_object().unwrap_or(&empty);

        if non_empty_str(component, "id").is_none() {
            diagnostics.push(Diagnostic::new(
                &location,
                DiagnosticKind::MissingComponentId { index },
                format!("Component at index {} has no id", index),
            ));
        }
        if non_empty_str(component, "type").is_none() {
            diagnostics.push(Diagnostic::new(
                &location,
                DiagnosticKind::MissingComponentType { index },
                format!("Component at index {} has no type", index),
            ));
        }

        let Some(placement) = component.get("placement").and_then(Value::as_object) else {
            diagnostics.push(Diagnostic::new(
                &location,
                DiagnosticKind::MissingPlacement { index },
                format!("Component at index {} has no placement object", index),
            ));
            continue;
        };

        if placement.is_empty() {
            diagnostics.push(Diagnostic::new(
                &location,
                DiagnosticKind::EmptyPlacement { index },
                format!("Component at index {} places no pins", index),
            ));
        }

        for (pin, hole) in placement {
            if !hole.is_string() {
                diagnostics.push(Diagnostic::new(
                    &location,
                    DiagnosticKind::InvalidHoleId {
                        index,
                        pin: pin.clone(),
                    },
                    format!("Pin '{}' of component at index {} must map to a hole id string", pin, index),
                ));
            }
        }
    }
}

fn check_wires(circuit: &Map<String, Value>, diagnostics: &mut Vec<Diagnostic>) {
    let Some(wires) = circuit.get("wires").and_then(Value::as_array) else {
        diagnostics.push(Diagnostic::circuit(
            DiagnosticKind::MissingWires,
            "Circuit 'wires' must be an array",
        ));
        return;
    };

    for (index, wire) in wires.iter().enumerate() {
        let location = format!("wires[{}]", index);
        let empty = Map::new();
        let wire = wire.as_object().unwrap_or(&empty);

        if non_empty_str(wire, "id").is_none() {
            diagnostics.push(Diagnostic::new(
                &location,
                DiagnosticKind::MissingWireId { index },
                format!("Wire at index {} has no id", index),
            ));
        }
        if non_empty_str(wire, "from").is_none() {
            diagnostics.push(Diagnostic::new(
                &location,
                DiagnosticKind::MissingWireFrom { index },
                format!("Wire at index {} has no 'from' endpoint", index),
            ));
        }
        if non_empty_str(wire, "to").is_none() {
            diagnostics.push(Diagnostic::new(
                &location,
                DiagnosticKind::MissingWireTo { index },
                format!("Wire at index {} has no 'to' endpoint", index),
            ));
        }
    }
}
