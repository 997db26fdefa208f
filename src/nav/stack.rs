//! The page stack
//!
//! Owns the ordered sequence of resident pages, computes transition plans,
//! drives the paired lifecycle hooks and animators, and acquires/releases
//! page assets. One transition runs at a time; callers that need queueing
//! across tasks go through [`Navigator`](crate::nav::queue::Navigator).

use std::collections::HashMap;
use std::sync::Arc;

use futures::try_join;
use log::{debug, info, warn};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::nav::asset::{AssetBackend, AssetHandle};
use crate::nav::error::{NavError, NavResult};
use crate::nav::page::{PageFactory, PageId};
use crate::nav::plan;
use crate::nav::record::PageRecord;
use crate::nav::surface::Surface;

/// Parameters of one push operation.
#[derive(Clone)]
pub struct PushOptions {
    /// Resource key resolved by the asset backend. Must be non-empty.
    pub key: String,
    /// Play the enter/exit animators, or switch instantly.
    pub animate: bool,
    /// Whether the pushed page stays resident when a later push covers it.
    /// When false, the next push removes and disposes this page instead of
    /// covering it.
    pub keep_in_stack: bool,
    /// Explicit page id; generated when absent. Must be unique in the stack.
    pub page_id: Option<PageId>,
}

impl PushOptions {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            animate: true,
            keep_in_stack: true,
            page_id: None,
        }
    }

    pub fn animate(mut self, animate: bool) -> Self {
        self.animate = animate;
        self
    }

    pub fn keep_in_stack(mut self, keep: bool) -> Self {
        self.keep_in_stack = keep;
        self
    }

    pub fn with_id(mut self, id: impl Into<PageId>) -> Self {
        self.page_id = Some(id.into());
        self
    }
}

/// Parameters of one pop operation.
#[derive(Debug, Clone)]
pub struct PopOptions {
    pub animate: bool,
    /// How many tail records to remove. Must be ≥ 1 and ≤ depth.
    pub count: usize,
}

impl Default for PopOptions {
    fn default() -> Self {
        Self { animate: true, count: 1 }
    }
}

impl PopOptions {
    pub fn animate(mut self, animate: bool) -> Self {
        self.animate = animate;
        self
    }

    pub fn count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }
}

/// Result of a successful push.
///
/// Carries the new page's id and its surface rather than a reference to the
/// page instance: the stack owns every instance exclusively (it must be able
/// to drop one mid-transition when a later push supersedes it), so no alias
/// of the boxed page can be handed out. The id addresses the page in later
/// `pop_to` calls and the surface is the handle callers address it by
/// visually.
pub struct Pushed {
    pub id: PageId,
    pub surface: Arc<dyn Surface>,
}

impl std::fmt::Debug for Pushed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pushed").field("id", &self.id).finish_non_exhaustive()
    }
}

/// Committed stack state published to observers. Never reflects
/// mid-transition structure.
#[derive(Debug, Clone)]
pub struct StackSnapshot {
    /// False from request acceptance until mutation and cleanup finish; the
    /// visual layer uses it to reject input.
    pub interactive: bool,
    /// Resident page ids, oldest-first.
    pub ids: Vec<PageId>,
}

/// The page-stack transition engine.
pub struct PageStack {
    backend: Arc<dyn AssetBackend>,
    factory: Arc<dyn PageFactory>,
    /// Parent surface new page instances are constructed under.
    root: Arc<dyn Surface>,
    records: Vec<PageRecord>,
    /// Handles loaded ahead of any page, keyed by resource key. Released only
    /// by explicit unload or teardown, never by push/pop.
    preloaded: HashMap<String, Arc<AssetHandle>>,
    /// Instance-scoped mutual exclusion; one transition at a time.
    in_transition: bool,
    snapshot: watch::Sender<StackSnapshot>,
}

impl PageStack {
    pub fn new(
        backend: Arc<dyn AssetBackend>,
        factory: Arc<dyn PageFactory>,
        root: Arc<dyn Surface>,
    ) -> Self {
        let (snapshot, _) = watch::channel(StackSnapshot {
            interactive: true,
            ids: Vec::new(),
        });
        Self {
            backend,
            factory,
            root,
            records: Vec::new(),
            preloaded: HashMap::new(),
            in_transition: false,
            snapshot,
        }
    }

    // --- introspection (committed state only) ---

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The current page's record, when the stack is non-empty.
    pub fn top(&self) -> Option<&PageRecord> {
        self.records.last()
    }

    /// Resident page ids, oldest-first.
    pub fn ids(&self) -> Vec<PageId> {
        self.records.iter().map(|r| r.id().clone()).collect()
    }

    pub fn is_interactive(&self) -> bool {
        !self.in_transition
    }

    /// Watch committed snapshots; updated at request acceptance (interactive
    /// drops) and after every mutation.
    pub fn observe(&self) -> watch::Receiver<StackSnapshot> {
        self.snapshot.subscribe()
    }

    fn publish(&self) {
        let ids = self.ids();
        let interactive = !self.in_transition;
        self.snapshot.send_modify(|s| {
            s.interactive = interactive;
            s.ids = ids;
        });
    }

    // --- preloading ---

    /// Load and cache an asset handle outside the stack. The handle survives
    /// push/pop of pages using the same key and is released only by
    /// [`unload`](Self::unload) or [`teardown`](Self::teardown).
    pub async fn preload(&mut self, key: &str) -> NavResult<()> {
        if key.is_empty() {
            return Err(NavError::EmptyKey);
        }
        if self.preloaded.contains_key(key) {
            return Err(NavError::DuplicatePreload(key.to_string()));
        }
        let handle = Arc::new(AssetHandle::new(key));
        handle.load(self.backend.as_ref()).await?;
        self.preloaded.insert(key.to_string(), handle);
        info!("preloaded asset {key:?}");
        Ok(())
    }

    /// Release a preloaded handle. A resident record still sharing it keeps
    /// the handle alive structurally, but the backing resource is freed here;
    /// release is idempotent so the record's own disposal stays safe.
    pub fn unload(&mut self, key: &str) -> NavResult<()> {
        match self.preloaded.remove(key) {
            Some(handle) => {
                handle.release(self.backend.as_ref());
                info!("unloaded asset {key:?}");
                Ok(())
            }
            None => Err(NavError::NotPreloaded(key.to_string())),
        }
    }

    // --- push ---

    /// Push a new page above the current top.
    ///
    /// Loads the asset (reusing a preloaded handle when present), constructs
    /// the instance under the root surface, then runs the paired lifecycle:
    /// `before_exit`/`before_enter`, concurrent exit+enter animations (the
    /// operation waits for both), `after_exit`, and finally the stack
    /// mutation. A non-stacked previous top is detached first and disposed
    /// after. Cancellation before the mutation leaves the stack unchanged.
    pub async fn push(
        &mut self,
        options: PushOptions,
        cancel: &CancellationToken,
    ) -> NavResult<Pushed> {
        if options.key.is_empty() {
            return Err(NavError::EmptyKey);
        }
        if self.in_transition {
            return Err(NavError::TransitionInProgress);
        }
        let id = match options.page_id.clone() {
            Some(id) => {
                if self.records.iter().any(|r| r.id() == &id) {
                    return Err(NavError::DuplicatePageId(id));
                }
                id
            }
            None => PageId::generate(),
        };

        self.in_transition = true;
        self.publish();
        let result = self.push_locked(options, id, cancel).await;
        self.in_transition = false;
        self.publish();
        result
    }

    async fn push_locked(
        &mut self,
        options: PushOptions,
        id: PageId,
        cancel: &CancellationToken,
    ) -> NavResult<Pushed> {
        debug!(
            "push {:?} as {} (animate={}, keep_in_stack={})",
            options.key, id, options.animate, options.keep_in_stack
        );

        // Resolve the asset: reuse a preloaded handle, or load a fresh one
        // this record will own.
        let (handle, preloaded) = match self.preloaded.get(&options.key) {
            Some(handle) => (Arc::clone(handle), true),
            None => (Arc::new(AssetHandle::new(&options.key)), false),
        };
        let loaded = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(NavError::Cancelled),
            res = handle.load(self.backend.as_ref()) => res,
        };
        let abort = |e: NavError| {
            if !preloaded {
                handle.release(self.backend.as_ref());
            }
            e
        };
        let prefab = match loaded {
            Ok(prefab) => prefab,
            Err(e) => return Err(abort(e)),
        };

        let mut page = match self.factory.instantiate(&prefab, &self.root) {
            Ok(page) => page,
            Err(source) => {
                return Err(abort(NavError::Construction {
                    key: options.key.clone(),
                    source,
                }));
            }
        };

        let plan = plan::plan_push(&self.records);

        // Pre-animation hooks, both before either animation starts.
        if let Some(i) = plan.exiting {
            self.records[i].page_mut().before_exit();
        }
        page.before_enter();

        // Exit and enter run concurrently from the same logical instant; the
        // operation joins both, and one side failing or cancelling aborts the
        // other.
        let animated = match plan.exiting {
            Some(i) => {
                let enter = page.enter(true, options.animate, cancel);
                let exit = self.records[i].page_mut().exit(true, options.animate, cancel);
                try_join!(enter, exit).map(|_| ())
            }
            None => page.enter(true, options.animate, cancel).await,
        };
        if let Err(e) = animated {
            if e.is_cancelled() {
                info!("push {:?} cancelled before mutation, stack unchanged", options.key);
            }
            drop(page);
            return Err(abort(e));
        }

        if let Some(i) = plan.exiting {
            self.records[i].page_mut().after_exit();
        }

        // Mutation: detach the superseded record first, dispose after.
        if plan.exiting_removed {
            if let Some(superseded) = self.records.pop() {
                superseded.dispose(self.backend.as_ref());
            }
        }
        let surface = page.surface();
        self.records.push(PageRecord::new(
            options.key,
            id.clone(),
            page,
            options.keep_in_stack,
            handle,
            preloaded,
        ));
        info!("pushed page {} ({} resident)", id, self.records.len());
        Ok(Pushed { id, surface })
    }

    // --- pop ---

    /// Remove `options.count` pages from the top, revealing the page beneath.
    ///
    /// The whole group animates as one: every exiting record gets
    /// `before_exit` first, only the top page's exit animation is awaited for
    /// timing, the rest are hidden without individual animation, and the
    /// newly exposed page enters concurrently. `after_exit` fires on all
    /// removed records before the mutation. The re-exposed page is always
    /// treated as stacked afterwards.
    pub async fn pop(
        &mut self,
        options: PopOptions,
        cancel: &CancellationToken,
    ) -> NavResult<()> {
        if options.count == 0 {
            return Err(NavError::InvalidPopCount);
        }
        if options.count > self.records.len() {
            return Err(NavError::PopBeyondDepth {
                requested: options.count,
                depth: self.records.len(),
            });
        }
        if self.in_transition {
            return Err(NavError::TransitionInProgress);
        }

        self.in_transition = true;
        self.publish();
        let result = self.pop_locked(options, cancel).await;
        self.in_transition = false;
        self.publish();
        result
    }

    /// Pop until the named page becomes current. Popping to the current top
    /// succeeds without a transition.
    pub async fn pop_to(
        &mut self,
        page_id: &PageId,
        animate: bool,
        cancel: &CancellationToken,
    ) -> NavResult<()> {
        let index = self
            .records
            .iter()
            .position(|r| r.id() == page_id)
            .ok_or_else(|| NavError::PageNotFound(page_id.clone()))?;
        let count = self.records.len() - index - 1;
        if count == 0 {
            return Ok(());
        }
        self.pop(PopOptions { animate, count }, cancel).await
    }

    async fn pop_locked(
        &mut self,
        options: PopOptions,
        cancel: &CancellationToken,
    ) -> NavResult<()> {
        debug!("pop {} of {} (animate={})", options.count, self.records.len(), options.animate);
        let plan = plan::plan_pop(self.records.len(), options.count);
        let boundary = self.records.len() - options.count;

        // Every exiting record's before_exit fires before any animation.
        for &i in &plan.exiting {
            self.records[i].page_mut().before_exit();
        }
        if let Some(i) = plan.entering {
            self.records[i].page_mut().before_enter();
        }

        {
            let (below, exiting) = self.records.split_at_mut(boundary);
            let (hidden, top) = exiting.split_at_mut(exiting.len() - 1);

            // Only the immediate top animates its exit; the newly exposed
            // page enters concurrently with it.
            let exit = top[0].page_mut().exit(false, options.animate, cancel);
            let enter = async {
                match below.last_mut() {
                    Some(entering) => {
                        entering.page_mut().enter(false, options.animate, cancel).await
                    }
                    None => Ok(()),
                }
            };
            if let Err(e) = try_join!(exit, enter) {
                if e.is_cancelled() {
                    info!("pop cancelled before mutation, stack unchanged");
                }
                return Err(e);
            }

            // Deeper exiting pages are hidden without individual animation.
            for record in hidden.iter_mut() {
                record.page_mut().exit(false, false, cancel).await?;
            }
        }

        for &i in &plan.exiting {
            self.records[i].page_mut().after_exit();
        }

        // Mutation: detach the whole group, then dispose top-first.
        let mut removed: Vec<PageRecord> = self.records.drain(boundary..).collect();
        removed.reverse();
        // A popped-to page is always considered stacked again.
        if let Some(exposed) = self.records.last_mut() {
            exposed.set_stacked(true);
        }
        for record in removed {
            record.dispose(self.backend.as_ref());
        }
        info!("popped {} page(s) ({} resident)", options.count, self.records.len());
        Ok(())
    }

    // --- teardown ---

    /// Forcibly dispose every resident record (top-first) and release every
    /// preloaded handle, regardless of any transition in progress.
    pub fn teardown(&mut self) {
        if self.in_transition {
            warn!("tearing down with a transition in progress");
        }
        info!(
            "teardown: {} resident page(s), {} preloaded asset(s)",
            self.records.len(),
            self.preloaded.len()
        );
        while let Some(record) = self.records.pop() {
            record.dispose(self.backend.as_ref());
        }
        for (_, handle) in self.preloaded.drain() {
            handle.release(self.backend.as_ref());
        }
        self.in_transition = false;
        self.publish();
    }
}
