//! Stack entries
//!
//! A [`PageRecord`] ties together everything the stack owns for one resident
//! page: the instance, its asset handle, and the explicit ownership flags
//! that keep release timing deterministic.

use std::sync::Arc;

use log::debug;

use crate::nav::asset::{AssetBackend, AssetHandle};
use crate::nav::page::{Page, PageId};
use crate::nav::surface::Surface;

/// One entry of the page stack. Owned exclusively by the stack while
/// resident.
pub struct PageRecord {
    key: String,
    id: PageId,
    page: Box<dyn Page>,
    /// Whether this page stays resident when a later push covers it.
    /// Captured at push time; reset to true when a pop re-exposes the page.
    stacked: bool,
    handle: Arc<AssetHandle>,
    /// True when `handle` came from the preload cache. Preloaded handles are
    /// never released by record disposal, only by explicit unload.
    preloaded: bool,
}

impl PageRecord {
    pub(crate) fn new(
        key: String,
        id: PageId,
        page: Box<dyn Page>,
        stacked: bool,
        handle: Arc<AssetHandle>,
        preloaded: bool,
    ) -> Self {
        Self {
            key,
            id,
            page,
            stacked,
            handle,
            preloaded,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn id(&self) -> &PageId {
        &self.id
    }

    pub fn is_stacked(&self) -> bool {
        self.stacked
    }

    pub(crate) fn set_stacked(&mut self, stacked: bool) {
        self.stacked = stacked;
    }

    pub fn is_preloaded(&self) -> bool {
        self.preloaded
    }

    pub fn surface(&self) -> Arc<dyn Surface> {
        self.page.surface()
    }

    pub(crate) fn page_mut(&mut self) -> &mut dyn Page {
        self.page.as_mut()
    }

    /// Destroy the instance and release the asset. The caller must already
    /// have detached the record from the stack; physical disposal always
    /// happens after structural removal.
    pub(crate) fn dispose(self, backend: &dyn AssetBackend) {
        debug!("disposing page {} (key {:?})", self.id, self.key);
        drop(self.page);
        if !self.preloaded {
            self.handle.release(backend);
        }
    }
}
