use std::collections::HashSet;

use crate::analyzer::rules::{Rule, RuleContext};
use crate::circuit::{ComponentInstance, Endpoint, WireInstance};
use crate::diagnostics::{Diagnostic, DiagnosticKind, WireEnd};

/// Layer 2: every id, type, pin and hole a circuit mentions must exist.
pub struct ReferenceRule;

impl Rule for ReferenceRule {
    fn id(&self) -> &str {
        "references"
    }

    fn name(&self) -> &str {
        "Reference Resolution"
    }

    fn description(&self) -> &str {
        "Component ids and wire ids are unique; component types, pin names, holes and wire endpoints resolve"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        let mut seen_components = HashSet::new();
        for (index, component) in ctx.circuit.components.iter().enumerate() {
            if !seen_components.insert(component.id.as_str()) {
                diagnostics.push(Diagnostic::new(
                    &component.id,
                    DiagnosticKind::DuplicateComponentId { index },
                    format!("Component id '{}' is used more than once", component.id),
                ));
            }
            check_component(ctx, component, &mut diagnostics);
        }

        let mut seen_wires = HashSet::new();
        for (index, wire) in ctx.circuit.wires.iter().enumerate() {
            if !seen_wires.insert(wire.id.as_str()) {
                diagnostics.push(Diagnostic::new(
                    &wire.id,
                    DiagnosticKind::DuplicateWireId { index },
                    format!("Wire id '{}' is used more than once", wire.id),
                ));
            }
            check_wire(ctx, wire, &mut diagnostics);
        }

        diagnostics
    }
}

fn check_component(ctx: &RuleContext<'_>, component: &ComponentInstance, diagnostics: &mut Vec<Diagnostic>) {
    match ctx.definitions.get(&component.component_type) {
        Some(definition) => {
            for pin in component.placement.keys() {
                if !definition.has_pin(pin) {
                    let valid_pins = definition.pin_names();
                    diagnostics.push(Diagnostic::new(
                        &component.id,
                        DiagnosticKind::InvalidPinName {
                            pin: pin.clone(),
                            valid_pins: valid_pins.clone(),
                        },
                        format!(
                            "'{}' has no pin '{}' (valid pins: {})",
                            component.component_type,
                            pin,
                            valid_pins.join(", ")
                        ),
                    ));
                }
            }
        }
        None => {
            let reason = ctx
                .definitions
                .failure(&component.component_type)
                .unwrap_or("not loaded");
            diagnostics.push(Diagnostic::new(
                &component.id,
                DiagnosticKind::UnknownComponentType {
                    component_type: component.component_type.clone(),
                },
                format!(
                    "Component '{}' has unknown type '{}': {}",
                    component.id, component.component_type, reason
                ),
            ));
        }
    }

    for (pin, hole) in &component.placement {
        if !ctx.bus_index.contains(hole) {
            diagnostics.push(Diagnostic::new(
                &component.id,
                DiagnosticKind::InvalidHoleReference {
                    pin: pin.clone(),
                    hole: hole.clone(),
                },
                format!(
                    "Pin '{}' of '{}' is placed in '{}', which is not a breadboard hole",
                    pin, component.id, hole
                ),
            ));
        }
    }
}

fn check_wire(ctx: &RuleContext<'_>, wire: &WireInstance, diagnostics: &mut Vec<Diagnostic>) {
    for (end, endpoint) in wire.endpoints() {
        match endpoint {
            Endpoint::Pin { component, .. } => {
                if ctx.circuit.component(component).is_none() {
                    let raw = match end {
                        WireEnd::From => &wire.from,
                        WireEnd::To => &wire.to,
                    };
                    diagnostics.push(Diagnostic::new(
                        &wire.id,
                        DiagnosticKind::InvalidWireComponent {
                            end,
                            endpoint: raw.clone(),
                            component_id: component.to_string(),
                        },
                        format!(
                            "Wire '{}' {} end references unknown component '{}'",
                            wire.id, end, component
                        ),
                    ));
                }
            }
            Endpoint::Hole(hole) => {
                if !ctx.bus_index.contains(hole) {
                    diagnostics.push(Diagnostic::new(
                        &wire.id,
                        DiagnosticKind::InvalidWireHole {
                            end,
                            hole: hole.to_string(),
                        },
                        format!(
                            "Wire '{}' {} end '{}' is not a breadboard hole",
                            wire.id, end, hole
                        ),
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::rules::test_support::{codes, run};
    use crate::circuit::Circuit;
    use crate::core::ValidationOptions;

    fn check(circuit: &Circuit) -> Vec<Diagnostic> {
        run(&ReferenceRule, circuit, &ValidationOptions::default())
    }

    #[test]
    fn test_clean_circuit() {
        let mut circuit = Circuit::new("t", "d");
        circuit.add_component(ComponentInstance::new("r1", "resistor").with_pin("pin0", "1F").with_pin("pin1", "5F"));
        circuit.add_wire(WireInstance::new("w1", "r1.pin0", "TP1"));
        assert!(check(&circuit).is_empty());
    }

    #[test]
    fn test_every_duplicate_is_reported() {
        let mut circuit = Circuit::new("t", "d");
        for _ in 0..3 {
            circuit.add_component(ComponentInstance::new("d1", "led").with_pin("anode", "5F"));
        }
        circuit.add_wire(WireInstance::new("w1", "1A", "2A"));
        circuit.add_wire(WireInstance::new("w1", "3A", "4A"));

        let diagnostics = check(&circuit);
        assert_eq!(
            codes(&diagnostics),
            vec!["DUPLICATE_COMPONENT_ID", "DUPLICATE_COMPONENT_ID", "DUPLICATE_WIRE_ID"]
        );
        assert_eq!(diagnostics[1].kind, DiagnosticKind::DuplicateComponentId { index: 2 });
    }

    #[test]
    fn test_unknown_type_still_checks_holes() {
        let mut circuit = Circuit::new("t", "d");
        circuit.add_component(ComponentInstance::new("x1", "flux-capacitor").with_pin("a", "99Z"));

        let diagnostics = check(&circuit);
        assert_eq!(codes(&diagnostics), vec!["UNKNOWN_COMPONENT_TYPE", "INVALID_HOLE_REFERENCE"]);
        assert_eq!(diagnostics[0].location, "x1");
    }

    #[test]
    fn test_invalid_pin_lists_valid_pins() {
        let mut circuit = Circuit::new("t", "d");
        circuit.add_component(ComponentInstance::new("d1", "led").with_pin("anode", "5F").with_pin("gate", "6F"));

        let diagnostics = check(&circuit);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].kind,
            DiagnosticKind::InvalidPinName {
                pin: "gate".to_string(),
                valid_pins: vec!["anode".to_string(), "cathode".to_string()],
            }
        );
    }

    #[test]
    fn test_wire_endpoints() {
        let mut circuit = Circuit::new("t", "d");
        circuit.add_wire(WireInstance::new("w1", "ghost.GP0", "99Z"));

        let diagnostics = check(&circuit);
        assert_eq!(
            diagnostics.iter().map(|d| &d.kind).collect::<Vec<_>>(),
            vec![
                &DiagnosticKind::InvalidWireComponent {
                    end: WireEnd::From,
                    endpoint: "ghost.GP0".to_string(),
                    component_id: "ghost".to_string(),
                },
                &DiagnosticKind::InvalidWireHole {
                    end: WireEnd::To,
                    hole: "99Z".to_string(),
                },
            ]
        );
    }
}
