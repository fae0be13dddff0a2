//! Shared engine handle
//!
//! Readers take an `Arc<Engine>` snapshot and query it without holding any
//! lock. A reload builds the replacement engine off to the side and then
//! swaps the pointer, so in-flight queries keep using the engine they
//! started with.

use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::engine::Engine;
use parking_lot::{Mutex, RwLock};
use reelmatch_core::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Atomically swappable reference to the current [`Engine`]
pub struct EngineHandle {
    current: RwLock<Arc<Engine>>,
    config: EngineConfig,
    source: Mutex<Option<PathBuf>>,
    /// Serializes rebuilds; never held by readers
    rebuild: Mutex<()>,
}

impl EngineHandle {
    pub fn new(engine: Engine, config: EngineConfig) -> Self {
        Self {
            current: RwLock::new(Arc::new(engine)),
            config,
            source: Mutex::new(None),
            rebuild: Mutex::new(()),
        }
    }

    /// Load a catalog file and build the first engine from it
    pub fn open(path: impl AsRef<Path>, config: EngineConfig) -> Result<Self> {
        let path = path.as_ref();
        let catalog = Catalog::load(path, &config.schema)?;
        let engine = Engine::build(catalog, &config);
        let handle = Self::new(engine, config);
        *handle.source.lock() = Some(path.to_path_buf());
        Ok(handle)
    }

    /// Snapshot of the current engine
    pub fn current(&self) -> Arc<Engine> {
        self.current.read().clone()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Catalog file the current engine was loaded from, if any
    pub fn source(&self) -> Option<PathBuf> {
        self.source.lock().clone()
    }

    /// Replace the current engine, returning the previous one
    pub fn publish(&self, engine: Engine) -> Arc<Engine> {
        let engine = Arc::new(engine);
        std::mem::replace(&mut *self.current.write(), engine)
    }

    /// Rebuild from `catalog` unless it matches the current engine's catalog.
    ///
    /// Returns `true` when a new engine was published.
    pub fn reload(&self, catalog: Catalog) -> bool {
        let _guard = self.rebuild.lock();
        self.reload_locked(catalog)
    }

    /// Reload from `path`, or from the last source when `path` is `None`.
    ///
    /// A failed load leaves the current engine in place.
    pub fn reload_from(&self, path: Option<&Path>) -> Result<bool> {
        let _guard = self.rebuild.lock();
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => self
                .source()
                .ok_or_else(|| Error::InvalidConfig("no catalog path to reload from".into()))?,
        };
        let catalog = Catalog::load(&path, &self.config.schema)?;
        let rebuilt = self.reload_locked(catalog);
        // source and engine change together under the rebuild guard
        *self.source.lock() = Some(path);
        Ok(rebuilt)
    }

    fn reload_locked(&self, catalog: Catalog) -> bool {
        if self.current().fingerprint() == catalog.fingerprint() {
            info!(fingerprint = %catalog.fingerprint(), "Catalog unchanged, keeping current engine");
            return false;
        }
        let engine = Engine::build(catalog, &self.config);
        self.publish(engine);
        info!("Published rebuilt engine");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogItem;
    use std::io::Write;

    fn catalog(titles: &[&str]) -> Catalog {
        Catalog::from_items(
            titles
                .iter()
                .map(|t| CatalogItem::new(*t).with_tags("Drama"))
                .collect(),
        )
    }

    #[test]
    fn test_reload_skips_identical_catalog() {
        let config = EngineConfig::default();
        let handle = EngineHandle::new(Engine::build(catalog(&["a", "b"]), &config), config);
        let before = handle.current();

        assert!(!handle.reload(catalog(&["a", "b"])));
        assert!(Arc::ptr_eq(&before, &handle.current()));

        assert!(handle.reload(catalog(&["a", "b", "c"])));
        assert_eq!(handle.current().len(), 3);
        // the old snapshot is still intact for whoever holds it
        assert_eq!(before.len(), 2);
    }

    #[test]
    fn test_reload_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "title,listed_in\nOne,Drama\nTwo,Drama").unwrap();

        let handle = EngineHandle::open(file.path(), EngineConfig::default()).unwrap();
        assert_eq!(handle.current().len(), 2);
        assert_eq!(handle.source().as_deref(), Some(file.path()));

        writeln!(file, "Three,Comedy").unwrap();
        assert!(handle.reload_from(None).unwrap());
        assert_eq!(handle.current().len(), 3);
        assert!(!handle.reload_from(None).unwrap());
    }

    #[test]
    fn test_source_tracks_published_engine() {
        let mut first = tempfile::NamedTempFile::new().unwrap();
        writeln!(first, "title,listed_in\nOne,Drama\nTwo,Drama").unwrap();
        let mut second = tempfile::NamedTempFile::new().unwrap();
        writeln!(second, "title,listed_in\nOne,Drama\nTwo,Drama\nThree,Comedy").unwrap();

        let handle = Arc::new(EngineHandle::open(first.path(), EngineConfig::default()).unwrap());
        let workers: Vec<_> = [first.path().to_path_buf(), second.path().to_path_buf()]
            .into_iter()
            .map(|path| {
                let handle = handle.clone();
                std::thread::spawn(move || {
                    for _ in 0..20 {
                        handle.reload_from(Some(&path)).unwrap();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        let source = handle.source().unwrap();
        let schema = &handle.config().schema;
        let catalog = Catalog::load(&source, schema).unwrap();
        assert_eq!(handle.current().fingerprint(), catalog.fingerprint());
        assert!(!handle.reload_from(None).unwrap());
    }

    #[test]
    fn test_failed_reload_keeps_engine() {
        let config = EngineConfig::default();
        let handle = EngineHandle::new(Engine::build(catalog(&["a"]), &config), config);
        assert!(handle.reload_from(None).is_err());
        assert!(handle
            .reload_from(Some(Path::new("/missing/catalog.csv")))
            .is_err());
        assert_eq!(handle.current().len(), 1);
    }

    #[test]
    fn test_concurrent_readers() {
        let config = EngineConfig::default();
        let handle = Arc::new(EngineHandle::new(
            Engine::build(catalog(&["a", "b", "c"]), &config),
            config,
        ));
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let handle = handle.clone();
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        let engine = handle.current();
                        assert!(engine.recommend_by_tag("drama", 2).is_ok());
                    }
                })
            })
            .collect();
        handle.reload(catalog(&["a", "b", "c", "d"]));
        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(handle.current().len(), 4);
    }
}
