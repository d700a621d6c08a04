//! Explicitly constructed registry of expiring stores, one per payload
//! type.
//!
//! A [`StoreRegistry`] hands out one shared [`ExpiringStore<T>`] per
//! payload type `T`, creating it (with its sweep thread) on first use.
//! There is no process-wide instance: callers construct a registry and
//! pass it to whatever needs typed stores.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::expiring::{ExpiringStore, ShutdownReport};

/// Type-erased view of a registered store.
trait RegisteredStore: Send + Sync {
    fn shutdown(&self) -> ShutdownReport;
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T> RegisteredStore for ExpiringStore<T>
where
    T: Clone + Serialize + Send + Sync + 'static,
{
    fn shutdown(&self) -> ShutdownReport {
        ExpiringStore::shutdown(self)
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Registry of shared [`ExpiringStore`]s keyed by payload type.
pub struct StoreRegistry {
    config: StoreConfig,
    stores: Mutex<HashMap<TypeId, Arc<dyn RegisteredStore>>>,
}

impl StoreRegistry {
    /// Create an empty registry. Stores it creates use `config`.
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        config.validate()?;
        Ok(Self {
            config,
            stores: Mutex::new(HashMap::new()),
        })
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<TypeId, Arc<dyn RegisteredStore>>> {
        self.stores.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn downcast<T>(entry: &Arc<dyn RegisteredStore>) -> Option<Arc<ExpiringStore<T>>>
    where
        T: Clone + Serialize + Send + Sync + 'static,
    {
        Arc::clone(entry).into_any().downcast::<ExpiringStore<T>>().ok()
    }

    /// The store for `T`, started on first request.
    pub fn get_or_create<T>(&self) -> Result<Arc<ExpiringStore<T>>, StoreError>
    where
        T: Clone + Serialize + Send + Sync + 'static,
    {
        let mut stores = self.lock();
        if let Some(store) = stores.get(&TypeId::of::<T>()).and_then(Self::downcast::<T>) {
            return Ok(store);
        }
        let store = Arc::new(ExpiringStore::<T>::start(self.config.clone())?);
        stores.insert(TypeId::of::<T>(), store.clone());
        Ok(store)
    }

    /// The store for `T`, if one has been created.
    pub fn get<T>(&self) -> Option<Arc<ExpiringStore<T>>>
    where
        T: Clone + Serialize + Send + Sync + 'static,
    {
        self.lock()
            .get(&TypeId::of::<T>())
            .and_then(Self::downcast::<T>)
    }

    /// Unregister the store for `T` and stop its sweep thread.
    ///
    /// Other handles to the store stay valid and can still sweep manually.
    pub fn remove<T>(&self) -> Option<Arc<ExpiringStore<T>>>
    where
        T: Clone + Serialize + Send + Sync + 'static,
    {
        let entry = self.lock().remove(&TypeId::of::<T>())?;
        entry.shutdown();
        Self::downcast::<T>(&entry)
    }

    /// Number of registered stores.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no store has been created.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stop every store's sweep thread and empty the registry.
    pub fn shutdown_all(&self) -> Vec<ShutdownReport> {
        let stores: Vec<_> = self.lock().drain().map(|(_, store)| store).collect();
        stores.iter().map(|store| store.shutdown()).collect()
    }
}

impl Drop for StoreRegistry {
    fn drop(&mut self) {
        self.shutdown_all();
    }
}
