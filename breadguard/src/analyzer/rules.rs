use std::collections::HashMap;
use std::sync::Arc;

use crate::analyzer::component_rules::ComponentRule;
use crate::analyzer::electrical::ElectricalRule;
use crate::analyzer::references::ReferenceRule;
use crate::analyzer::topology::TopologyRule;
use crate::breadboard::BusIndex;
use crate::circuit::Circuit;
use crate::core::ValidationOptions;
use crate::diagnostics::Diagnostic;
use crate::registry::{ComponentDefinition, ComponentRegistry};

/// Outcome of loading one component type from the registry.
#[derive(Debug, Clone)]
pub enum Resolution {
    Resolved(Arc<ComponentDefinition>),
    Failed(String),
}

/// Component definitions for every type used by a circuit, loaded once
/// before the rules run.
#[derive(Debug, Clone, Default)]
pub struct DefinitionTable {
    entries: HashMap<String, Resolution>,
}

impl DefinitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load each distinct type of the circuit, in component order. Fetch
    /// failures are recorded, never propagated.
    pub async fn resolve(registry: &ComponentRegistry, circuit: &Circuit) -> Self {
        let mut table = Self::new();
        for component in &circuit.components {
            if table.entries.contains_key(&component.component_type) {
                continue;
            }
            match registry.load(&component.component_type).await {
                Ok(definition) => table.insert_resolved(&component.component_type, definition),
                Err(e) => {
                    tracing::warn!("Could not load '{}': {}", component.component_type, e);
                    table.insert_failed(&component.component_type, e.to_string());
                }
            }
        }
        tracing::debug!("Resolved {} component types", table.entries.len());
        table
    }

    pub fn insert_resolved(&mut self, component_type: &str, definition: Arc<ComponentDefinition>) {
        self.entries
            .insert(component_type.to_string(), Resolution::Resolved(definition));
    }

    pub fn insert_failed(&mut self, component_type: &str, reason: impl Into<String>) {
        self.entries
            .insert(component_type.to_string(), Resolution::Failed(reason.into()));
    }

    pub fn get(&self, component_type: &str) -> Option<&ComponentDefinition> {
        match self.entries.get(component_type) {
            Some(Resolution::Resolved(definition)) => Some(definition.as_ref()),
            _ => None,
        }
    }

    /// Why a type could not be loaded, if it failed.
    pub fn failure(&self, component_type: &str) -> Option<&str> {
        match self.entries.get(component_type) {
            Some(Resolution::Failed(reason)) => Some(reason.as_str()),
            _ => None,
        }
    }

    /// The `validation.electricalType` capability of a resolved type.
    pub fn electrical_type(&self, component_type: &str) -> Option<&str> {
        self.get(component_type).and_then(|d| d.electrical_type())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything a rule may look at. Rules never mutate it.
pub struct RuleContext<'a> {
    pub circuit: &'a Circuit,
    pub bus_index: &'a BusIndex,
    pub definitions: &'a DefinitionTable,
    pub options: &'a ValidationOptions,
}

pub trait Rule: Send + Sync {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic>;
}

pub struct RulesEngine {
    rules: Vec<Arc<dyn Rule>>,
}

impl RulesEngine {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Layers 2 to 5 in pipeline order.
    pub fn with_default_rules() -> Self {
        let mut engine = Self::new();
        engine.add_rule(Arc::new(ReferenceRule));
        engine.add_rule(Arc::new(ElectricalRule));
        engine.add_rule(Arc::new(TopologyRule));
        engine.add_rule(Arc::new(ComponentRule));
        engine
    }

    pub fn add_rule(&mut self, rule: Arc<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[Arc<dyn Rule>] {
        &self.rules
    }

    pub fn analyze(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for rule in &self.rules {
            if !ctx.options.rule_enabled(rule.id()) {
                tracing::debug!("Skipping rule '{}'", rule.id());
                continue;
            }
            let found = rule.check(ctx);
            tracing::debug!("Rule '{}' reported {} issues", rule.id(), found.len());
            diagnostics.extend(found);
        }
        diagnostics
    }
}

impl Default for RulesEngine {
    fn default() -> Self {
        Self::with_default_rules()
    }
}
