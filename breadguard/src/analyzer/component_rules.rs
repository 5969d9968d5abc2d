use crate::analyzer::rules::{Rule, RuleContext};
use crate::analyzer::topology::{LED_TYPE, RESISTOR_TYPE};
use crate::breadboard::HoleKind;
use crate::circuit::{ComponentInstance, Endpoint};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::registry::ComponentDefinition;

pub const MICROCONTROLLER_TYPE: &str = "microcontroller";

/// Layer 5: per-type rules selected by the definition's `electricalType`.
/// Types without a known capability, or whose definition failed to load,
/// are skipped.
pub struct ComponentRule;

impl Rule for ComponentRule {
    fn id(&self) -> &str {
        "component_rules"
    }

    fn name(&self) -> &str {
        "Component Rules"
    }

    fn description(&self) -> &str {
        "LED polarity and placement, two-pin resistors, PWM signals only on PWM-capable pins"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        for component in &ctx.circuit.components {
            let Some(definition) = ctx.definitions.get(&component.component_type) else {
                continue;
            };
            match definition.electrical_type() {
                Some(LED_TYPE) => check_led(ctx, component, &mut diagnostics),
                Some(RESISTOR_TYPE) => check_resistor(component, &mut diagnostics),
                Some(MICROCONTROLLER_TYPE) => check_pwm(ctx, component, definition, &mut diagnostics),
                other => {
                    tracing::trace!("No component rules for '{}' ({:?})", component.id, other);
                }
            }
        }

        diagnostics
    }
}

fn check_led(ctx: &RuleContext<'_>, component: &ComponentInstance, diagnostics: &mut Vec<Diagnostic>) {
    let missing_pins: Vec<String> = ["anode", "cathode"]
        .iter()
        .filter(|pin| !component.placement.contains_key(**pin))
        .map(|pin| pin.to_string())
        .collect();
    if !missing_pins.is_empty() {
        diagnostics.push(Diagnostic::new(
            &component.id,
            DiagnosticKind::InvalidLedPlacement {
                missing_pins: missing_pins.clone(),
            },
            format!("LED '{}' is missing {}", component.id, missing_pins.join(" and ")),
        ));
    }

    // cathode on a power bus, anode on a ground bus: each reported on its own
    for (pin, wrong_kind) in [("cathode", HoleKind::Power), ("anode", HoleKind::Ground)] {
        let Some(bus) = component
            .placement
            .get(pin)
            .and_then(|hole| ctx.bus_index.bus_of(hole))
        else {
            continue;
        };
        if ctx.bus_index.bus_has_kind(bus, wrong_kind) {
            diagnostics.push(Diagnostic::new(
                &component.id,
                DiagnosticKind::LedReversed {
                    pin: pin.to_string(),
                    bus: bus.to_string(),
                },
                format!(
                    "LED '{}' looks reversed: {} is on {} bus '{}'",
                    component.id, pin, wrong_kind, bus
                ),
            ));
        }
    }
}

fn check_resistor(component: &ComponentInstance, diagnostics: &mut Vec<Diagnostic>) {
    let pin_count = component.placement.len();
    if pin_count != 2 {
        diagnostics.push(Diagnostic::new(
            &component.id,
            DiagnosticKind::InvalidResistorPlacement { pin_count },
            format!("Resistor '{}' must have exactly 2 placed pins, found {}", component.id, pin_count),
        ));
    }
}

fn check_pwm(
    ctx: &RuleContext<'_>,
    component: &ComponentInstance,
    definition: &ComponentDefinition,
    diagnostics: &mut Vec<Diagnostic>,
) {
    for wire in ctx.circuit.wires.iter().filter(|w| w.carries_signal()) {
        for (_, endpoint) in wire.endpoints() {
            let Endpoint::Pin { component: id, pin } = endpoint else {
                continue;
            };
            if id != component.id {
                continue;
            }
            let pwm_capable = definition.pin(pin).and_then(|p| p.pwm_capable);
            if pwm_capable == Some(false) {
                diagnostics.push(Diagnostic::new(
                    &component.id,
                    DiagnosticKind::InvalidPwmPin {
                        pin: pin.to_string(),
                        wire: wire.id.clone(),
                    },
                    format!(
                        "Wire '{}' carries a PWM signal but pin '{}' of '{}' is not PWM capable",
                        wire.id, pin, component.id
                    ),
                ));
            }
        }
    }
}
