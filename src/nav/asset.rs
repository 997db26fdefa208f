//! Asset handles and the storage backend seam
//!
//! Pages are built from prefab assets resolved by key through an external
//! backend. An [`AssetHandle`] wraps one loaded resource: `load` is
//! idempotent, `get` fails before the load completes, and `release` frees the
//! backing resource exactly once no matter how often it is called.

use std::any::Any;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use log::{debug, warn};

use crate::nav::error::{NavError, NavResult};

/// Opaque loaded resource. The engine never looks inside; the page factory
/// downcasts it to whatever the host's asset pipeline produces.
pub type Asset = Arc<dyn Any + Send + Sync>;

/// External asset storage, consumed at its interface only.
#[async_trait]
pub trait AssetBackend: Send + Sync {
    /// Resolve a key to a loadable asset. May complete synchronously
    /// (preloaded/cached backends) or hit storage; the engine awaits either
    /// way and treats failure as terminal for the single in-flight operation.
    async fn load(&self, key: &str) -> anyhow::Result<Asset>;

    /// Physically free a previously loaded asset.
    fn release(&self, key: &str, asset: Asset);
}

#[derive(Default)]
struct HandleState {
    asset: Option<Asset>,
    released: bool,
}

/// Reference to one loaded resource identified by a key.
///
/// Shared by at most one [`PageRecord`](crate::nav::record::PageRecord)
/// unless it lives in the preload cache, in which case it persists across
/// push/pop and is only freed by explicit unload or teardown.
pub struct AssetHandle {
    key: String,
    state: Mutex<HandleState>,
}

impl AssetHandle {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            state: Mutex::new(HandleState::default()),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_loaded(&self) -> bool {
        self.lock().asset.is_some()
    }

    fn lock(&self) -> MutexGuard<'_, HandleState> {
        // Lock is never held across an await; poisoning only happens if a
        // panic raced us, in which case the plain state is still usable.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Load the backing asset. A second call on an already-loaded handle is a
    /// no-op returning the cached resource.
    pub async fn load(&self, backend: &dyn AssetBackend) -> NavResult<Asset> {
        if let Some(asset) = self.lock().asset.clone() {
            return Ok(asset);
        }
        debug!("loading asset {:?}", self.key);
        let asset = backend
            .load(&self.key)
            .await
            .map_err(|source| NavError::ResourceLoad {
                key: self.key.clone(),
                source,
            })?;
        let mut state = self.lock();
        state.asset = Some(asset.clone());
        state.released = false;
        Ok(asset)
    }

    /// The loaded resource, or `NotLoaded` if `load` has not completed.
    pub fn get(&self) -> NavResult<Asset> {
        self.lock()
            .asset
            .clone()
            .ok_or_else(|| NavError::NotLoaded(self.key.clone()))
    }

    /// Free the backing resource. Idempotent; releasing an unloaded or
    /// already-released handle does nothing.
    pub fn release(&self, backend: &dyn AssetBackend) {
        let asset = {
            let mut state = self.lock();
            if state.released {
                warn!("asset {:?} released twice, ignoring", self.key);
                return;
            }
            state.released = true;
            state.asset.take()
        };
        if let Some(asset) = asset {
            debug!("releasing asset {:?}", self.key);
            backend.release(&self.key, asset);
        }
    }
}
