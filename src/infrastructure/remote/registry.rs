//! Remote Store Registry
//!
//! Maps adapter names from the configuration (`adapter = "ssh"`) to factory
//! functions that build a store from a `RemoteConfig`. The registry is a
//! plain value: the CLI builds one with the default adapters, tests build
//! their own.

use std::collections::BTreeMap;

use crate::config::{ConfigError, RemoteConfig};
use crate::domain::ports::RemoteStore;
use crate::domain::value_objects::RepoPath;

use super::{LocalDirStore, MemoryStore, SshStore};

/// Builds a store for one configured remote
pub type StoreFactory =
    Box<dyn Fn(&RemoteConfig) -> Result<Box<dyn RemoteStore>, ConfigError> + Send + Sync>;

/// Adapter name to store factory
pub struct RemoteStoreRegistry {
    factories: BTreeMap<String, StoreFactory>,
}

impl RemoteStoreRegistry {
    /// Registry without any adapters
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Registry with the built-in `local`, `ssh` and `memory` adapters
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register("local", build_local);
        registry.register("ssh", build_ssh);
        registry.register("memory", build_memory);
        registry
    }

    /// Add or replace an adapter
    pub fn register<F>(&mut self, adapter: impl Into<String>, factory: F)
    where
        F: Fn(&RemoteConfig) -> Result<Box<dyn RemoteStore>, ConfigError> + Send + Sync + 'static,
    {
        self.factories.insert(adapter.into(), Box::new(factory));
    }

    /// Registered adapter names, sorted
    pub fn adapters(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Build the store a remote configuration asks for
    pub fn build(&self, remote: &RemoteConfig) -> Result<Box<dyn RemoteStore>, ConfigError> {
        let factory = self
            .factories
            .get(&remote.adapter)
            .ok_or_else(|| ConfigError::UnknownAdapter {
                remote: remote.name.clone(),
                adapter: remote.adapter.clone(),
            })?;
        factory(remote)
    }
}

impl Default for RemoteStoreRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn missing_settings(remote: &RemoteConfig) -> ConfigError {
    ConfigError::MissingAdapterSettings {
        remote: remote.name.clone(),
        adapter: remote.adapter.clone(),
    }
}

fn marker(remote: &RemoteConfig) -> Result<RepoPath, ConfigError> {
    remote
        .marker_path()
        .map_err(|source| ConfigError::InvalidMarker {
            remote: remote.name.clone(),
            source,
        })
}

fn build_local(remote: &RemoteConfig) -> Result<Box<dyn RemoteStore>, ConfigError> {
    let settings = remote.local.as_ref().ok_or_else(|| missing_settings(remote))?;
    Ok(Box::new(LocalDirStore::new(
        settings.root.clone(),
        marker(remote)?,
    )))
}

fn build_ssh(remote: &RemoteConfig) -> Result<Box<dyn RemoteStore>, ConfigError> {
    let settings = remote.ssh.as_ref().ok_or_else(|| missing_settings(remote))?;
    let store = SshStore::new(
        settings.destination.clone(),
        settings.root.clone(),
        marker(remote)?,
    )
    .with_port(settings.port)
    .with_connect_timeout(settings.connect_timeout);
    Ok(Box::new(store))
}

fn build_memory(remote: &RemoteConfig) -> Result<Box<dyn RemoteStore>, ConfigError> {
    Ok(Box::new(MemoryStore::new(remote.name.clone())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LocalSettings, DEFAULT_MARKER};

    fn remote(adapter: &str) -> RemoteConfig {
        RemoteConfig {
            name: "r".to_string(),
            adapter: adapter.to_string(),
            marker: DEFAULT_MARKER.to_string(),
            ssh: None,
            local: None,
        }
    }

    #[test]
    fn defaults_are_registered() {
        let registry = RemoteStoreRegistry::with_defaults();
        assert_eq!(
            registry.adapters().collect::<Vec<_>>(),
            vec!["local", "memory", "ssh"]
        );
    }

    #[test]
    fn unknown_adapter_is_rejected() {
        let registry = RemoteStoreRegistry::with_defaults();
        let err = registry.build(&remote("ftp")).err().unwrap();
        assert!(matches!(err, ConfigError::UnknownAdapter { ref adapter, .. } if adapter == "ftp"));
    }

    #[test]
    fn missing_settings_table_is_rejected() {
        let registry = RemoteStoreRegistry::with_defaults();
        let err = registry.build(&remote("ssh")).err().unwrap();
        assert!(matches!(err, ConfigError::MissingAdapterSettings { .. }));
    }

    #[test]
    fn builds_local_store() {
        let registry = RemoteStoreRegistry::with_defaults();
        let mut config = remote("local");
        config.local = Some(LocalSettings {
            root: "/tmp/site".into(),
        });
        let store = registry.build(&config).unwrap();
        assert_eq!(store.display_name(), "local:/tmp/site");
    }

    #[test]
    fn custom_factories_can_be_registered() {
        let shared = MemoryStore::new("shared");
        let handle = shared.clone();
        let mut registry = RemoteStoreRegistry::empty();
        registry.register("test", move |_| {
            let store: Box<dyn RemoteStore> = Box::new(shared.clone());
            Ok(store)
        });

        let store = registry.build(&remote("test")).unwrap();
        assert_eq!(store.display_name(), "memory:shared");
        assert!(handle.calls().is_empty());
    }
}
