//! Layer 4: whole-circuit connectivity.
//!
//! Checks run in a fixed order so output is stable:
//! 1. series check (every LED must reach a resistor)
//! 2. ground path from each LED cathode, source path from each anode
//! 3. isolation (more than one connected group)
//! 4. power/ground shorts that span several wires
//!
//! An empty circuit or a circuit with no wires stops the layer before the
//! graph is built.

use std::collections::{HashMap, HashSet};

use crate::analyzer::electrical::{direct_short, ElectricalRule};
use crate::analyzer::rules::{Rule, RuleContext};
use crate::breadboard::{BusIndex, HoleKind};
use crate::circuit::{resolve_bus, BusGraph, Circuit, ComponentInstance, WireInstance};
use crate::diagnostics::{Diagnostic, DiagnosticKind};

pub const LED_TYPE: &str = "led";
pub const RESISTOR_TYPE: &str = "resistor";

pub struct TopologyRule;

impl Rule for TopologyRule {
    fn id(&self) -> &str {
        "topology"
    }

    fn name(&self) -> &str {
        "Circuit Topology"
    }

    fn description(&self) -> &str {
        "LEDs in series with a resistor, complete source and ground paths, no isolated groups, no multi-wire power/ground shorts"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let circuit = ctx.circuit;

        if circuit.components.is_empty() {
            return vec![Diagnostic::circuit(
                DiagnosticKind::EmptyCircuit,
                "Circuit has no components",
            )];
        }
        if circuit.wires.is_empty() {
            return vec![Diagnostic::circuit(
                DiagnosticKind::NoConnections,
                "Circuit has components but no wires",
            )];
        }

        let graph = BusGraph::from_circuit(circuit, ctx.bus_index);
        let leds = components_with_capability(ctx, LED_TYPE);
        let resistors = components_with_capability(ctx, RESISTOR_TYPE);

        let mut diagnostics = Vec::new();
        diagnostics.extend(check_series(ctx, &graph, &leds, &resistors));
        diagnostics.extend(check_paths(ctx, &graph, &leds));
        diagnostics.extend(check_isolation(&graph));
        if ctx.options.detect_transitive_shorts {
            diagnostics.extend(check_transitive_shorts(ctx));
        }
        diagnostics
    }
}

fn components_with_capability<'a>(ctx: &RuleContext<'a>, capability: &str) -> Vec<&'a ComponentInstance> {
    ctx.circuit
        .components
        .iter()
        .filter(|c| ctx.definitions.electrical_type(&c.component_type) == Some(capability))
        .collect()
}

/// Distinct buses of a component's placed pins, in pin order.
fn component_buses<'a>(component: &ComponentInstance, index: &'a BusIndex) -> Vec<&'a str> {
    let mut buses: Vec<&str> = Vec::new();
    for hole in component.placement.values() {
        if let Some(bus) = index.bus_of(hole) {
            if !buses.contains(&bus) {
                buses.push(bus);
            }
        }
    }
    buses
}

fn to_strings(buses: &[&str]) -> Vec<String> {
    buses.iter().map(|b| b.to_string()).collect()
}

fn check_series(
    ctx: &RuleContext<'_>,
    graph: &BusGraph,
    leds: &[&ComponentInstance],
    resistors: &[&ComponentInstance],
) -> Vec<Diagnostic> {
    let resistors: Vec<(&ComponentInstance, Vec<&str>)> = resistors
        .iter()
        .map(|r| (*r, component_buses(r, ctx.bus_index)))
        .filter(|(_, buses)| !buses.is_empty())
        .collect();
    let Some((first_resistor, first_buses)) = resistors.first() else {
        return Vec::new();
    };

    let mut diagnostics = Vec::new();
    for led in leds {
        let led_buses = component_buses(led, ctx.bus_index);
        if led_buses.is_empty() {
            continue;
        }

        let in_series = resistors.iter().any(|(_, resistor_buses)| {
            led_buses
                .iter()
                .any(|a| resistor_buses.iter().any(|b| graph.path_exists(a, b)))
        });
        if in_series {
            continue;
        }

        diagnostics.push(Diagnostic::new(
            &led.id,
            DiagnosticKind::OpenCircuit {
                led: led.id.clone(),
                resistor: first_resistor.id.clone(),
                led_buses: to_strings(&led_buses),
                resistor_buses: to_strings(first_buses),
            },
            format!(
                "LED '{}' ({}) is not connected to resistor '{}' ({})",
                led.id,
                led_buses.join(", "),
                first_resistor.id,
                first_buses.join(", ")
            ),
        ));
    }
    diagnostics
}

/// Per bus: does a wire touching it have a pin endpoint named like a ground
/// pin, and one named like a GPIO pin.
#[derive(Debug, Default, Clone, Copy)]
struct PinMarks {
    ground: bool,
    gpio: bool,
}

fn wire_pin_marks<'a>(circuit: &'a Circuit, index: &'a BusIndex) -> HashMap<&'a str, PinMarks> {
    let mut marks: HashMap<&str, PinMarks> = HashMap::new();

    for wire in &circuit.wires {
        let endpoints = wire.endpoints();
        let pins: Vec<&str> = endpoints.iter().filter_map(|(_, e)| e.pin_name()).collect();
        if pins.is_empty() {
            continue;
        }
        let ground = pins.iter().any(|p| p.contains("GND"));
        let gpio = pins.iter().any(|p| p.starts_with("GP"));

        for (_, endpoint) in &endpoints {
            if let Some(bus) = resolve_bus(circuit, index, endpoint) {
                let entry = marks.entry(bus).or_default();
                entry.ground |= ground;
                entry.gpio |= gpio;
            }
        }
    }

    marks
}

fn check_paths(ctx: &RuleContext<'_>, graph: &BusGraph, leds: &[&ComponentInstance]) -> Vec<Diagnostic> {
    let index = ctx.bus_index;
    let marks = wire_pin_marks(ctx.circuit, index);
    let mark = |bus: &str| marks.get(bus).copied().unwrap_or_default();

    let mut diagnostics = Vec::new();
    for led in leds {
        if let Some(bus) = led.placement.get("cathode").and_then(|h| index.bus_of(h)) {
            let grounded = graph.find_reachable(bus, |b| index.bus_has_kind(b, HoleKind::Ground) || mark(b).ground);
            if grounded.is_none() {
                diagnostics.push(Diagnostic::new(
                    &led.id,
                    DiagnosticKind::NoGroundPath { bus: bus.to_string() },
                    format!("Cathode of LED '{}' (bus '{}') has no path to ground", led.id, bus),
                ));
            }
        }

        if let Some(bus) = led.placement.get("anode").and_then(|h| index.bus_of(h)) {
            let sourced = graph.find_reachable(bus, |b| index.bus_has_kind(b, HoleKind::Power) || mark(b).gpio);
            if sourced.is_none() {
                diagnostics.push(Diagnostic::new(
                    &led.id,
                    DiagnosticKind::NoSourcePath { bus: bus.to_string() },
                    format!(
                        "Anode of LED '{}' (bus '{}') has no path to power or a GPIO pin",
                        led.id, bus
                    ),
                ));
            }
        }
    }
    diagnostics
}

fn check_isolation(graph: &BusGraph) -> Option<Diagnostic> {
    let groups = graph.connected_groups();
    if groups.len() <= 1 {
        return None;
    }
    let group_sizes: Vec<usize> = groups.iter().map(Vec::len).collect();
    Some(Diagnostic::circuit(
        DiagnosticKind::DisconnectedGroups {
            group_count: groups.len(),
            group_sizes,
        },
        format!("Circuit is split into {} unconnected groups", groups.len()),
    ))
}

/// Wire-connected groups joining a power bus and a ground bus. Component
/// bodies are left out: a resistor across the rails is a load, not a short.
///
/// Single-wire shorts belong to the electrical layer. While that layer is
/// enabled those wires are dropped before grouping, so any further short in
/// the same group still shows up. With it disabled they stay in, and a group
/// made of nothing but single-wire shorts is reported as non-transitive.
fn check_transitive_shorts(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    let circuit = ctx.circuit;
    let index = ctx.bus_index;
    let skip_direct = ctx.options.rule_enabled(ElectricalRule.id());
    let counted = |w: &WireInstance| !(skip_direct && direct_short(circuit, index, w).is_some());

    let wire_graph = BusGraph::from_wires_where(circuit, index, counted);
    let mut diagnostics = Vec::new();

    for group in wire_graph.connected_groups() {
        let power: Vec<&str> = group
            .iter()
            .map(String::as_str)
            .filter(|b| index.bus_has_kind(b, HoleKind::Power))
            .collect();
        let ground: Vec<&str> = group
            .iter()
            .map(String::as_str)
            .filter(|b| index.bus_has_kind(b, HoleKind::Ground))
            .collect();
        if power.is_empty() || ground.is_empty() {
            continue;
        }

        let members: HashSet<&str> = group.iter().map(String::as_str).collect();
        let wires: Vec<&WireInstance> = circuit
            .wires
            .iter()
            .filter(|w| counted(w))
            .filter(|w| {
                let [(_, from), (_, to)] = w.endpoints();
                resolve_bus(circuit, index, &to).is_some()
                    && resolve_bus(circuit, index, &from).map_or(false, |b| members.contains(b))
            })
            .collect();

        let transitive = !wires.iter().all(|w| direct_short(circuit, index, w).is_some());
        let wire_ids: Vec<String> = wires.iter().map(|w| w.id.clone()).collect();
        let location = match wire_ids.first() {
            Some(id) if !transitive => id.clone(),
            _ => "circuit".to_string(),
        };
        let mut buses = to_strings(&power);
        buses.extend(to_strings(&ground));

        diagnostics.push(Diagnostic::new(
            location,
            DiagnosticKind::PowerGroundShort {
                wires: wire_ids.clone(),
                buses,
                transitive,
            },
            format!(
                "Wires {} connect power ({}) to ground ({})",
                wire_ids.join(", "),
                power.join(", "),
                ground.join(", ")
            ),
        ));
    }

    diagnostics
}
