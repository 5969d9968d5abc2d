//! Circuit document types.
//!
//! These mirror the JSON input format:
//!
//! ```json
//! { "circuit": {
//!     "metadata": { "name": "...", "description": "..." },
//!     "components": [ { "id": "r1", "type": "resistor", "placement": { "pin0": "1F", "pin1": "5F" } } ],
//!     "wires": [ { "id": "w1", "from": "pico1.GP0", "to": "1J" } ]
//! } }
//! ```
//!
//! The typed form is only built after the structural layer has accepted the
//! raw document, so every field here is known to be present.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::diagnostics::WireEnd;

/// Root wrapper of a circuit file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CircuitDocument {
    pub circuit: Circuit,
}

impl CircuitDocument {
    pub fn new(circuit: Circuit) -> Self {
        Self { circuit }
    }

    /// Export back to the JSON input shape.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CircuitMetadata {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Circuit {
    pub metadata: CircuitMetadata,
    #[serde(default)]
    pub components: Vec<ComponentInstance>,
    #[serde(default)]
    pub wires: Vec<WireInstance>,
}

impl Circuit {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            metadata: CircuitMetadata {
                name: name.into(),
                description: description.into(),
            },
            components: Vec::new(),
            wires: Vec::new(),
        }
    }

    pub fn add_component(&mut self, component: ComponentInstance) {
        self.components.push(component);
    }

    pub fn add_wire(&mut self, wire: WireInstance) {
        self.wires.push(wire);
    }

    /// First component with the given id.
    pub fn component(&self, id: &str) -> Option<&ComponentInstance> {
        self.components.iter().find(|c| c.id == id)
    }

    /// Hole an endpoint lands in: the raw hole id itself, or the hole the
    /// referenced component pin is placed in. The hole is not checked
    /// against the breadboard.
    pub fn endpoint_hole<'a>(&'a self, endpoint: &Endpoint<'a>) -> Option<&'a str> {
        match *endpoint {
            Endpoint::Hole(hole) => Some(hole),
            Endpoint::Pin { component, pin } => self
                .component(component)
                .and_then(|c| c.placement.get(pin))
                .map(String::as_str),
        }
    }
}

/// A placed component.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComponentInstance {
    pub id: String,
    #[serde(rename = "type")]
    pub component_type: String,
    /// Pin name to hole id.
    pub placement: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Value>,
}

impl ComponentInstance {
    pub fn new(id: impl Into<String>, component_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            component_type: component_type.into(),
            placement: BTreeMap::new(),
            properties: None,
        }
    }

    pub fn with_pin(mut self, pin: impl Into<String>, hole: impl Into<String>) -> Self {
        self.placement.insert(pin.into(), hole.into());
        self
    }

    pub fn with_properties(mut self, properties: serde_json::Value) -> Self {
        self.properties = Some(properties);
        self
    }
}

/// A jumper wire between two endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WireInstance {
    pub id: String,
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Value>,
}

impl WireInstance {
    pub fn new(id: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            from: from.into(),
            to: to.into(),
            properties: None,
        }
    }

    pub fn with_properties(mut self, properties: serde_json::Value) -> Self {
        self.properties = Some(properties);
        self
    }

    pub fn endpoints(&self) -> [(WireEnd, Endpoint<'_>); 2] {
        [
            (WireEnd::From, Endpoint::parse(&self.from)),
            (WireEnd::To, Endpoint::parse(&self.to)),
        ]
    }

    /// True if the wire is marked as carrying a PWM/signal line:
    /// `properties.function` of `"signal"` or `"pwm"`, or `properties.pwm == true`.
    pub fn carries_signal(&self) -> bool {
        let Some(properties) = self.properties.as_ref() else {
            return false;
        };

        let by_function = properties
            .get("function")
            .and_then(|f| f.as_str())
            .map(|f| f.eq_ignore_ascii_case("signal") || f.eq_ignore_ascii_case("pwm"))
            .unwrap_or(false);

        let by_flag = properties
            .get("pwm")
            .and_then(|p| p.as_bool())
            .unwrap_or(false);

        by_function || by_flag
    }
}

/// A parsed wire endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'a> {
    /// Raw breadboard hole id, e.g. `1J`.
    Hole(&'a str),
    /// `componentId.pinName`, split at the first `.`.
    Pin { component: &'a str, pin: &'a str },
}

impl<'a> Endpoint<'a> {
    pub fn parse(raw: &'a str) -> Self {
        match raw.split_once('.') {
            Some((component, pin)) => Endpoint::Pin { component, pin },
            None => Endpoint::Hole(raw),
        }
    }

    pub fn pin_name(&self) -> Option<&'a str> {
        match *self {
            Endpoint::Pin { pin, .. } => Some(pin),
            Endpoint::Hole(_) => None,
        }
    }

    pub fn component_id(&self) -> Option<&'a str> {
        match *self {
            Endpoint::Pin { component, .. } => Some(component),
            Endpoint::Hole(_) => None,
        }
    }
}
