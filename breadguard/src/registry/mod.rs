//! Component Registry
//!
//! Resolves a component type name (`"led"`, `"raspberry-pi-pico"`, ...) to
//! its [`ComponentDefinition`]: the declared pins and the validation ruleset.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  init()   ┌──────────────┐
//! │  Component   │──────────▶│    index     │  type -> relative path
//! │   Registry   │           └──────────────┘
//! │              │  load()   ┌──────────────┐   miss   ┌─────────────────┐
//! │              │──────────▶│    cache     │─────────▶│ ComponentSource │
//! └──────────────┘           └──────────────┘          └─────────────────┘
//!                                                       directory / http / static
//! ```
//!
//! The cache is append-only: once a type is loaded it is never fetched
//! again, so one registry can be shared by any number of validation runs.

pub mod builtin;
pub mod source;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

pub use source::{ComponentSource, DirectorySource, HttpSource, StaticSource, INDEX_FILE};

/// Type name to definition path, relative to the source root.
pub type ComponentIndex = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Component registry used before init()")]
    NotInitialized,

    #[error("Unknown component type '{0}'")]
    UnknownComponentType(String),

    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to fetch '{url}': {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to parse '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Electrical role of a single pin.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PinElectricalType {
    Gpio,
    Power,
    Ground,
    Input,
    Output,
    Io,
    #[serde(other)]
    Other,
}

/// PWM channel label, either numeric (`3`) or named (`"3A"`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum PwmChannel {
    Number(u32),
    Name(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PinDescriptor {
    pub electrical_type: PinElectricalType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pwm_capable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pwm_channel: Option<PwmChannel>,
}

/// Per-type validation block. `electrical_type` selects which component
/// rules apply (`led`, `resistor`, `microcontroller`); anything else has no
/// rules and passes through.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRuleset {
    #[serde(default)]
    pub electrical_type: Option<String>,
    #[serde(default)]
    pub rules: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComponentDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub pins: BTreeMap<String, PinDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationRuleset>,
}

impl ComponentDefinition {
    pub fn pin(&self, name: &str) -> Option<&PinDescriptor> {
        self.pins.get(name)
    }

    pub fn has_pin(&self, name: &str) -> bool {
        self.pins.contains_key(name)
    }

    pub fn pin_names(&self) -> Vec<String> {
        self.pins.keys().cloned().collect()
    }

    /// The ruleset's `electricalType`, if any.
    pub fn electrical_type(&self) -> Option<&str> {
        self.validation
            .as_ref()
            .and_then(|v| v.electrical_type.as_deref())
    }
}

/// On-disk/over-the-wire wrapper: `{ "component": { ... } }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentDocument {
    pub component: ComponentDefinition,
}

/// Caching front for a [`ComponentSource`].
pub struct ComponentRegistry {
    source: Box<dyn ComponentSource>,
    index: RwLock<Option<ComponentIndex>>,
    cache: RwLock<HashMap<String, Arc<ComponentDefinition>>>,
}

impl ComponentRegistry {
    pub fn new(source: impl ComponentSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            index: RwLock::new(None),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Registry over the component library compiled into the crate.
    pub fn builtin() -> Self {
        Self::new(builtin::embedded_source())
    }

    /// Registry over a directory holding `index.json` and per-type files.
    pub fn from_directory(root: impl Into<PathBuf>) -> Self {
        Self::new(DirectorySource::new(root))
    }

    /// Registry over the same layout served over HTTP.
    pub fn from_url(base_url: impl Into<String>) -> Self {
        Self::new(HttpSource::new(base_url))
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Fetch the type index. Must succeed before the first [`load`](Self::load).
    pub async fn init(&self) -> Result<(), RegistryError> {
        let index = self.source.fetch_index().await?;
        tracing::info!(
            "Component registry '{}' indexed {} types",
            self.source.name(),
            index.len()
        );
        *self.index.write().await = Some(index);
        Ok(())
    }

    pub async fn is_initialized(&self) -> bool {
        self.index.read().await.is_some()
    }

    /// Indexed type names, sorted.
    pub async fn component_types(&self) -> Result<Vec<String>, RegistryError> {
        let index = self.index.read().await;
        let index = index.as_ref().ok_or(RegistryError::NotInitialized)?;
        Ok(index.keys().cloned().collect())
    }

    /// Resolve a type to its definition, fetching it on first use.
    pub async fn load(&self, component_type: &str) -> Result<Arc<ComponentDefinition>, RegistryError> {
        if let Some(definition) = self.cache.read().await.get(component_type) {
            tracing::trace!("Registry cache hit for '{}'", component_type);
            return Ok(definition.clone());
        }

        let path = {
            let index = self.index.read().await;
            let index = index.as_ref().ok_or(RegistryError::NotInitialized)?;
            index
                .get(component_type)
                .cloned()
                .ok_or_else(|| RegistryError::UnknownComponentType(component_type.to_string()))?
        };

        tracing::debug!("Fetching definition for '{}' from {}", component_type, path);
        let document = self.source.fetch_definition(&path).await?;

        let mut cache = self.cache.write().await;
        let definition = cache
            .entry(component_type.to_string())
            .or_insert_with(|| Arc::new(document.component))
            .clone();
        Ok(definition)
    }

    /// Number of definitions currently cached.
    pub async fn cached_count(&self) -> usize {
        self.cache.read().await.len()
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("source", &self.source.name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const LED_JSON: &str = r#"{
        "component": {
            "name": "LED",
            "pins": {
                "anode": { "electricalType": "input" },
                "cathode": { "electricalType": "output" }
            },
            "validation": { "electricalType": "led", "rules": { "requiresResistor": true } }
        }
    }"#;

    /// Counts definition fetches so caching can be observed.
    struct CountingSource {
        inner: StaticSource,
        fetches: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ComponentSource for CountingSource {
        fn name(&self) -> &str {
            "counting"
        }

        async fn fetch_index(&self) -> Result<ComponentIndex, RegistryError> {
            self.inner.fetch_index().await
        }

        async fn fetch_definition(&self, path: &str) -> Result<ComponentDocument, RegistryError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch_definition(path).await
        }
    }

    fn counting_registry() -> (ComponentRegistry, Arc<AtomicUsize>) {
        let fetches = Arc::new(AtomicUsize::new(0));
        let source = CountingSource {
            inner: StaticSource::new("test").with_component("led", LED_JSON),
            fetches: fetches.clone(),
        };
        (ComponentRegistry::new(source), fetches)
    }

    #[tokio::test]
    async fn test_load_before_init_fails() {
        let (registry, _) = counting_registry();
        let result = registry.load("led").await;
        assert!(matches!(result, Err(RegistryError::NotInitialized)));
        assert!(!registry.is_initialized().await);
    }

    #[tokio::test]
    async fn test_load_caches_definitions() {
        let (registry, fetches) = counting_registry();
        registry.init().await.unwrap();

        let first = registry.load("led").await.unwrap();
        let second = registry.load("led").await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert_eq!(registry.cached_count().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_type() {
        let (registry, fetches) = counting_registry();
        registry.init().await.unwrap();

        let result = registry.load("flux-capacitor").await;
        assert!(matches!(result, Err(RegistryError::UnknownComponentType(ref t)) if t == "flux-capacitor"));
        assert_eq!(fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_component_types() {
        let (registry, _) = counting_registry();
        assert!(matches!(
            registry.component_types().await,
            Err(RegistryError::NotInitialized)
        ));
        registry.init().await.unwrap();
        assert_eq!(registry.component_types().await.unwrap(), vec!["led".to_string()]);
    }

    #[test]
    fn test_definition_accessors() {
        let document: ComponentDocument = serde_json::from_str(LED_JSON).unwrap();
        let led = document.component;

        assert_eq!(led.electrical_type(), Some("led"));
        assert_eq!(led.pin_names(), vec!["anode".to_string(), "cathode".to_string()]);
        assert!(led.has_pin("anode"));
        assert_eq!(led.pin("cathode").map(|p| p.electrical_type), Some(PinElectricalType::Output));
        assert!(led.validation.as_ref().unwrap().rules.contains_key("requiresResistor"));
    }

    #[test]
    fn test_pin_descriptor_variants() {
        let pin: PinDescriptor = serde_json::from_str(
            r#"{ "electricalType": "gpio", "pwmCapable": true, "pwmChannel": "0A" }"#,
        )
        .unwrap();
        assert_eq!(pin.pwm_capable, Some(true));
        assert_eq!(pin.pwm_channel, Some(PwmChannel::Name("0A".to_string())));

        let pin: PinDescriptor =
            serde_json::from_str(r#"{ "electricalType": "analog", "pwmChannel": 4 }"#).unwrap();
        assert_eq!(pin.electrical_type, PinElectricalType::Other);
        assert_eq!(pin.pwm_channel, Some(PwmChannel::Number(4)));
        assert_eq!(pin.pwm_capable, None);
    }
}
