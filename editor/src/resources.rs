//! Asset resolution: the loader contract, an in-memory store, and the
//! tokio-backed runtime for loaders that do real IO.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use lattice_core::{IoHandle, PropertyValue, SerializedNode};

/// Errors from asset resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceError {
    /// No asset exists at this url.
    NotFound(String),
    /// The asset exists but could not be loaded.
    Load { url: String, message: String },
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(url) => write!(f, "asset not found: {url}"),
            Self::Load { url, message } => write!(f, "failed to load {url}: {message}"),
        }
    }
}

impl std::error::Error for ResourceError {}

/// What an asset is, beyond its url and property bag.
#[derive(Clone, Debug, PartialEq)]
pub enum AssetData {
    Shader,
    Material,
    MeshSource,
    /// A prefab template: the serialized subtree instances are spawned
    /// from.
    Prefab(SerializedNode),
}

/// An external resource identified by a stable url.
///
/// Every asset carries an editable property bag so asset-level edits go
/// through the same command machinery as object edits.
#[derive(Clone, Debug, PartialEq)]
pub struct Asset {
    url: String,
    data: AssetData,
    properties: Vec<(String, PropertyValue)>,
}

impl Asset {
    pub fn new(url: impl Into<String>, data: AssetData) -> Self {
        Self {
            url: url.into(),
            data,
            properties: Vec::new(),
        }
    }

    pub fn shader(url: impl Into<String>) -> Self {
        Self::new(url, AssetData::Shader)
    }

    pub fn material(url: impl Into<String>) -> Self {
        Self::new(url, AssetData::Material)
    }

    pub fn mesh_source(url: impl Into<String>) -> Self {
        Self::new(url, AssetData::MeshSource)
    }

    pub fn prefab(url: impl Into<String>, definition: SerializedNode) -> Self {
        Self::new(url, AssetData::Prefab(definition))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn data(&self) -> &AssetData {
        &self.data
    }

    /// The prefab definition, for prefab assets.
    pub fn definition(&self) -> Option<&SerializedNode> {
        match &self.data {
            AssetData::Prefab(node) => Some(node),
            _ => None,
        }
    }

    pub fn set_definition(&mut self, definition: SerializedNode) {
        self.data = AssetData::Prefab(definition);
    }

    pub fn properties(&self) -> &[(String, PropertyValue)] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn set_property(&mut self, name: &str, value: PropertyValue) -> Option<PropertyValue> {
        if let Some(slot) = self.properties.iter_mut().find(|(n, _)| n == name) {
            Some(std::mem::replace(&mut slot.1, value))
        } else {
            self.properties.push((name.to_owned(), value));
            None
        }
    }
}

/// Asynchronous asset resolution.
///
/// Implementations deliver through an [`IoHandle`] so callers can block,
/// poll, or `.await` as they prefer.
pub trait ResourceLoader {
    fn resolve(&self, url: &str) -> IoHandle<Result<Asset, ResourceError>>;

    /// Absolute prefix stripped from urls when they are snapshotted.
    fn resource_root(&self) -> &str;
}

/// In-memory asset registry.
///
/// Doubles as the session's mutable asset state (prefab definitions,
/// asset property edits) and as an immediately-resolving loader for
/// tests.
#[derive(Debug, Default)]
pub struct AssetStore {
    assets: HashMap<String, Asset>,
    resource_root: String,
}

impl AssetStore {
    pub fn new(resource_root: impl Into<String>) -> Self {
        Self {
            assets: HashMap::new(),
            resource_root: resource_root.into(),
        }
    }

    pub fn register(&mut self, asset: Asset) {
        self.assets.insert(asset.url.clone(), asset);
    }

    pub fn remove(&mut self, url: &str) -> Option<Asset> {
        self.assets.remove(url)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.assets.contains_key(url)
    }

    pub fn get(&self, url: &str) -> Option<&Asset> {
        self.assets.get(url)
    }

    pub fn get_mut(&mut self, url: &str) -> Option<&mut Asset> {
        self.assets.get_mut(url)
    }

    pub fn resource_root(&self) -> &str {
        &self.resource_root
    }
}

impl ResourceLoader for AssetStore {
    fn resolve(&self, url: &str) -> IoHandle<Result<Asset, ResourceError>> {
        IoHandle::ready(
            self.assets
                .get(url)
                .cloned()
                .ok_or_else(|| ResourceError::NotFound(url.to_owned())),
        )
    }

    fn resource_root(&self) -> &str {
        &self.resource_root
    }
}

/// Runtime for loaders that do real async IO.
///
/// One tokio worker thread drives the futures; results come back over
/// the [`IoHandle`] channel, so the editing thread never blocks inside
/// the runtime.
#[derive(Clone)]
pub struct LoaderRuntime {
    inner: Arc<tokio::runtime::Runtime>,
}

impl LoaderRuntime {
    pub fn new() -> Self {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .expect("failed to create loader runtime");
        Self {
            inner: Arc::new(runtime),
        }
    }

    /// Spawns a loading future, returning a handle to its result.
    pub fn run<T, F>(&self, future: F) -> IoHandle<T>
    where
        T: Send + 'static,
        F: Future<Output = T> + Send + 'static,
    {
        let (sender, receiver) = std::sync::mpsc::channel();
        self.inner.spawn(async move {
            let result = future.await;
            let _ = sender.send(result);
        });
        IoHandle::new(receiver)
    }
}

impl Default for LoaderRuntime {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_resolves_registered_assets() {
        let mut store = AssetStore::new("res://");
        store.register(Asset::shader("res://shaders/pbr.shader"));

        let handle = store.resolve("res://shaders/pbr.shader");
        let asset = handle.recv().unwrap().unwrap();
        assert_eq!(asset.url(), "res://shaders/pbr.shader");
        assert_eq!(asset.data(), &AssetData::Shader);
    }

    #[test]
    fn store_reports_missing_assets() {
        let store = AssetStore::new("res://");
        let result = store.resolve("res://missing.mat").recv().unwrap();
        assert_eq!(
            result,
            Err(ResourceError::NotFound("res://missing.mat".into()))
        );
    }

    #[test]
    fn asset_property_bag() {
        let mut asset = Asset::material("res://m.mat");
        assert!(asset.set_property("roughness", PropertyValue::Number(0.5)).is_none());
        assert_eq!(
            asset.set_property("roughness", PropertyValue::Number(0.8)),
            Some(PropertyValue::Number(0.5))
        );
        assert_eq!(asset.property("roughness"), Some(&PropertyValue::Number(0.8)));
    }

    #[test]
    fn runtime_delivers_over_handle() {
        let runtime = LoaderRuntime::new();
        let handle = runtime.run(async { 7u32 });
        assert_eq!(handle.recv(), Some(7));
    }

    #[test]
    fn runtime_drives_real_async_loads() {
        let runtime = LoaderRuntime::new();
        let handle = runtime.run(async {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            Asset::mesh_source("res://meshes/rock.mesh")
        });
        assert_eq!(handle.recv().unwrap().url(), "res://meshes/rock.mesh");
    }
}
