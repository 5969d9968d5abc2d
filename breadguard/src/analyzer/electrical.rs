use crate::analyzer::rules::{Rule, RuleContext};
use crate::breadboard::{BusIndex, HoleKind};
use crate::circuit::{Circuit, ComponentInstance, WireInstance};
use crate::diagnostics::{Diagnostic, DiagnosticKind};

/// Layer 3: shorts visible without any graph traversal.
pub struct ElectricalRule;

impl Rule for ElectricalRule {
    fn id(&self) -> &str {
        "electrical"
    }

    fn name(&self) -> &str {
        "Local Short Circuits"
    }

    fn description(&self) -> &str {
        "Two pins of one component on the same bus, or a single wire joining a power hole to a ground hole"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        for component in &ctx.circuit.components {
            diagnostics.extend(check_bus_conflicts(component, ctx.bus_index));
        }

        for wire in &ctx.circuit.wires {
            if let Some(buses) = direct_short(ctx.circuit, ctx.bus_index, wire) {
                diagnostics.push(Diagnostic::new(
                    &wire.id,
                    DiagnosticKind::PowerGroundShort {
                        wires: vec![wire.id.clone()],
                        buses: buses.clone(),
                        transitive: false,
                    },
                    format!(
                        "Wire '{}' connects power ({}) directly to ground ({})",
                        wire.id, buses[0], buses[1]
                    ),
                ));
            }
        }

        diagnostics
    }
}

/// One diagnostic per bus holding two or more pins of the component.
fn check_bus_conflicts(component: &ComponentInstance, index: &BusIndex) -> Vec<Diagnostic> {
    let mut by_bus: Vec<(&str, Vec<&str>, Vec<&str>)> = Vec::new();

    for (pin, hole) in &component.placement {
        let Some(bus) = index.bus_of(hole) else {
            continue;
        };
        match by_bus.iter_mut().find(|(b, _, _)| *b == bus) {
            Some((_, pins, holes)) => {
                pins.push(pin.as_str());
                holes.push(hole.as_str());
            }
            None => by_bus.push((bus, vec![pin.as_str()], vec![hole.as_str()])),
        }
    }

    by_bus
        .into_iter()
        .filter(|(_, pins, _)| pins.len() >= 2)
        .map(|(bus, pins, holes)| {
            Diagnostic::new(
                &component.id,
                DiagnosticKind::ShortCircuit {
                    bus: bus.to_string(),
                    pins: pins.iter().map(|p| p.to_string()).collect(),
                    holes: holes.iter().map(|h| h.to_string()).collect(),
                },
                format!(
                    "Pins {} of '{}' share bus '{}'; the component is shorted out",
                    pins.join(", "),
                    component.id,
                    bus
                ),
            )
        })
        .collect()
}

/// If the wire's two ends land on a power hole and a ground hole, the
/// `[power bus, ground bus]` pair.
pub fn direct_short(circuit: &Circuit, index: &BusIndex, wire: &WireInstance) -> Option<Vec<String>> {
    let [(_, from), (_, to)] = wire.endpoints();
    let from_point = circuit.endpoint_hole(&from).and_then(|h| index.point(h))?;
    let to_point = circuit.endpoint_hole(&to).and_then(|h| index.point(h))?;

    let (power, ground) = match (from_point.kind, to_point.kind) {
        (HoleKind::Power, HoleKind::Ground) => (from_point, to_point),
        (HoleKind::Ground, HoleKind::Power) => (to_point, from_point),
        _ => return None,
    };
    Some(vec![power.bus_id.clone(), ground.bus_id.clone()])
}
