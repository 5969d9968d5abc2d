//! Component Sources
//!
//! A source serves the registry's backing store: an index mapping type
//! names to relative paths, and one `{ "component": { ... } }` document per
//! path. The same layout works from a directory, over HTTP, or from memory.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::PathBuf;

use super::{ComponentDocument, ComponentIndex, RegistryError};

/// Name of the index document at the root of every source.
pub const INDEX_FILE: &str = "index.json";

/// Common trait for registry backing stores
#[async_trait]
pub trait ComponentSource: Send + Sync {
    /// Human-readable source name for logs
    fn name(&self) -> &str;

    /// Fetch the type-name to path index
    async fn fetch_index(&self) -> Result<ComponentIndex, RegistryError>;

    /// Fetch one definition document by its index path
    async fn fetch_definition(&self, path: &str) -> Result<ComponentDocument, RegistryError>;
}

fn parse_json<T: DeserializeOwned>(content: &str, path: &str) -> Result<T, RegistryError> {
    serde_json::from_str(content).map_err(|source| RegistryError::Parse {
        path: path.to_string(),
        source,
    })
}

/// Component library on the local filesystem.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    name: String,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let name = root.display().to_string();
        Self { root, name }
    }

    async fn read(&self, relative: &str) -> Result<String, RegistryError> {
        let path = self.root.join(relative);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| RegistryError::Io {
                path: path.display().to_string(),
                source,
            })
    }
}

#[async_trait]
impl ComponentSource for DirectorySource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_index(&self) -> Result<ComponentIndex, RegistryError> {
        let content = self.read(INDEX_FILE).await?;
        parse_json(&content, INDEX_FILE)
    }

    async fn fetch_definition(&self, path: &str) -> Result<ComponentDocument, RegistryError> {
        let content = self.read(path).await?;
        parse_json(&content, path)
    }
}

/// Component library served over HTTP, e.g. by the tool's dev server.
#[derive(Debug, Clone)]
pub struct HttpSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn url_for(&self, relative: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            relative.trim_start_matches('/')
        )
    }

    async fn get<T: DeserializeOwned>(&self, relative: &str) -> Result<T, RegistryError> {
        let url = self.url_for(relative);
        let http_error = |source| RegistryError::Http {
            url: url.clone(),
            source,
        };

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(http_error)?;
        let body = response.text().await.map_err(http_error)?;
        parse_json(&body, &url)
    }
}

#[async_trait]
impl ComponentSource for HttpSource {
    fn name(&self) -> &str {
        &self.base_url
    }

    async fn fetch_index(&self) -> Result<ComponentIndex, RegistryError> {
        self.get(INDEX_FILE).await
    }

    async fn fetch_definition(&self, path: &str) -> Result<ComponentDocument, RegistryError> {
        self.get(path).await
    }
}

/// In-memory library of raw JSON documents. Documents are parsed on fetch,
/// so a malformed entry fails only the type that uses it.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    name: String,
    index: ComponentIndex,
    documents: HashMap<String, String>,
}

impl StaticSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: ComponentIndex::new(),
            documents: HashMap::new(),
        }
    }

    /// Register a type whose document is stored at `{type}.json`.
    pub fn with_component(mut self, component_type: &str, document: impl Into<String>) -> Self {
        let path = format!("{}.json", component_type);
        self.index.insert(component_type.to_string(), path.clone());
        self.documents.insert(path, document.into());
        self
    }
}

#[async_trait]
impl ComponentSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_index(&self) -> Result<ComponentIndex, RegistryError> {
        Ok(self.index.clone())
    }

    async fn fetch_definition(&self, path: &str) -> Result<ComponentDocument, RegistryError> {
        let content = self.documents.get(path).ok_or_else(|| RegistryError::Io {
            path: path.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such document"),
        })?;
        parse_json(content, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESISTOR_JSON: &str = r#"{
        "component": {
            "pins": {
                "pin0": { "electricalType": "io" },
                "pin1": { "electricalType": "io" }
            },
            "validation": { "electricalType": "resistor" }
        }
    }"#;

    #[test]
    fn test_url_join() {
        let source = HttpSource::new("http://localhost:8080/components/");
        assert_eq!(
            source.url_for("led.json"),
            "http://localhost:8080/components/led.json"
        );
        assert_eq!(
            source.url_for("/parts/led.json"),
            "http://localhost:8080/components/parts/led.json"
        );
    }

    #[tokio::test]
    async fn test_directory_source() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("passive")).unwrap();
        std::fs::write(
            dir.path().join(INDEX_FILE),
            r#"{ "resistor": "passive/resistor.json", "broken": "broken.json", "gone": "gone.json" }"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("passive/resistor.json"), RESISTOR_JSON).unwrap();
        std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();

        let source = DirectorySource::new(dir.path());
        let index = source.fetch_index().await.unwrap();
        assert_eq!(index.len(), 3);

        let resistor = source.fetch_definition(&index["resistor"]).await.unwrap();
        assert_eq!(resistor.component.electrical_type(), Some("resistor"));

        assert!(matches!(
            source.fetch_definition("broken.json").await,
            Err(RegistryError::Parse { .. })
        ));
        assert!(matches!(
            source.fetch_definition("gone.json").await,
            Err(RegistryError::Io { .. })
        ));
    }

    #[tokio::test]
    async fn test_directory_source_missing_index() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirectorySource::new(dir.path());
        assert!(matches!(
            source.fetch_index().await,
            Err(RegistryError::Io { .. })
        ));
    }

    #[tokio::test]
    async fn test_static_source() {
        let source = StaticSource::new("mem").with_component("resistor", RESISTOR_JSON);
        let index = source.fetch_index().await.unwrap();
        assert_eq!(index.get("resistor").map(String::as_str), Some("resistor.json"));

        let doc = source.fetch_definition("resistor.json").await.unwrap();
        assert_eq!(doc.component.pins.len(), 2);
        assert!(source.fetch_definition("led.json").await.is_err());
    }
}
