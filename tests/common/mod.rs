//! Shared mock collaborators for the navigation integration tests.
//!
//! A counting asset backend, a recording surface, and a test page whose
//! lifecycle hooks append to a shared event log so tests can assert ordering.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use navstack::{
    Asset, AssetBackend, NavResult, NullSurface, Page, PageFactory, PageStack, Surface,
    Transition,
};

/// Opt-in logging for debugging test failures (RUST_LOG=debug).
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Asset backend that records every load and release per key and can be told
/// to fail specific keys.
#[derive(Default)]
pub struct CountingBackend {
    pub loads: Mutex<Vec<String>>,
    pub releases: Mutex<Vec<String>>,
    failing: Mutex<HashSet<String>>,
}

impl CountingBackend {
    pub fn fail_key(&self, key: &str) {
        self.failing.lock().unwrap().insert(key.to_string());
    }

    pub fn load_count(&self, key: &str) -> usize {
        self.loads.lock().unwrap().iter().filter(|k| *k == key).count()
    }

    pub fn release_count(&self, key: &str) -> usize {
        self.releases.lock().unwrap().iter().filter(|k| *k == key).count()
    }
}

#[async_trait]
impl AssetBackend for CountingBackend {
    async fn load(&self, key: &str) -> anyhow::Result<Asset> {
        if self.failing.lock().unwrap().contains(key) {
            anyhow::bail!("asset not found: {key}");
        }
        self.loads.lock().unwrap().push(key.to_string());
        Ok(Arc::new(key.to_string()))
    }

    fn release(&self, key: &str, _asset: Asset) {
        self.releases.lock().unwrap().push(key.to_string());
    }
}

/// Surface that records the last values written to it.
#[derive(Default)]
pub struct TestSurface {
    pub opacity: Mutex<f32>,
    pub offset: Mutex<(f32, f32)>,
    pub visible: Mutex<bool>,
}

impl Surface for TestSurface {
    fn set_opacity(&self, opacity: f32) {
        *self.opacity.lock().unwrap() = opacity;
    }

    fn set_offset(&self, x: f32, y: f32) {
        *self.offset.lock().unwrap() = (x, y);
    }

    fn set_visible(&self, visible: bool) {
        *self.visible.lock().unwrap() = visible;
    }
}

pub type EventLog = Arc<Mutex<Vec<String>>>;

/// Page whose hooks append `key:hook` entries to a shared log.
pub struct TestPage {
    key: String,
    surface: Arc<TestSurface>,
    events: EventLog,
    transition: Transition,
}

impl TestPage {
    fn log(&self, hook: &str) {
        self.events.lock().unwrap().push(format!("{}:{hook}", self.key));
    }
}

#[async_trait]
impl Page for TestPage {
    fn surface(&self) -> Arc<dyn Surface> {
        self.surface.clone()
    }

    fn transition(&self) -> Transition {
        self.transition.clone()
    }

    fn before_enter(&mut self) {
        self.log("before_enter");
    }

    async fn enter(
        &mut self,
        _is_push: bool,
        animate: bool,
        cancel: &CancellationToken,
    ) -> NavResult<()> {
        self.log("enter");
        self.surface.set_visible(true);
        if animate {
            self.transition.enter.play(self.surface.as_ref(), cancel).await
        } else {
            Ok(())
        }
    }

    fn before_exit(&mut self) {
        self.log("before_exit");
    }

    async fn exit(
        &mut self,
        _is_push: bool,
        animate: bool,
        cancel: &CancellationToken,
    ) -> NavResult<()> {
        self.log("exit");
        if animate {
            self.transition.exit.play(self.surface.as_ref(), cancel).await?;
        }
        self.surface.set_visible(false);
        Ok(())
    }

    fn after_exit(&mut self) {
        self.log("after_exit");
    }
}

/// Factory building [`TestPage`]s; counts instantiations and can be told to
/// fail.
pub struct TestFactory {
    pub events: EventLog,
    pub instantiated: Mutex<usize>,
    pub transition: Mutex<Transition>,
    fail: Mutex<bool>,
}

impl TestFactory {
    pub fn new(events: EventLog) -> Self {
        Self {
            events,
            instantiated: Mutex::new(0),
            transition: Mutex::new(Transition::none()),
            fail: Mutex::new(false),
        }
    }

    pub fn fail_next(&self) {
        *self.fail.lock().unwrap() = true;
    }

    /// Transition every subsequently built page will declare.
    pub fn set_transition(&self, transition: Transition) {
        *self.transition.lock().unwrap() = transition;
    }
}

impl PageFactory for TestFactory {
    fn instantiate(
        &self,
        prefab: &Asset,
        _parent: &Arc<dyn Surface>,
    ) -> anyhow::Result<Box<dyn Page>> {
        if std::mem::take(&mut *self.fail.lock().unwrap()) {
            anyhow::bail!("construction refused");
        }
        let key = prefab
            .downcast_ref::<String>()
            .cloned()
            .unwrap_or_default();
        *self.instantiated.lock().unwrap() += 1;
        Ok(Box::new(TestPage {
            key,
            surface: Arc::new(TestSurface::default()),
            events: self.events.clone(),
            transition: self.transition.lock().unwrap().clone(),
        }))
    }
}

/// A stack wired to fresh mocks plus the handles tests assert against.
pub struct Fixture {
    pub backend: Arc<CountingBackend>,
    pub factory: Arc<TestFactory>,
    pub events: EventLog,
    pub stack: PageStack,
}

impl Fixture {
    pub fn new() -> Self {
        let events: EventLog = Arc::new(Mutex::new(Vec::new()));
        let backend = Arc::new(CountingBackend::default());
        let factory = Arc::new(TestFactory::new(events.clone()));
        let stack = PageStack::new(backend.clone(), factory.clone(), NullSurface::shared());
        Self { backend, factory, events, stack }
    }

    pub fn take_events(&self) -> Vec<String> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }
}
