//! Page capability trait, construction seam, and page ids
//!
//! A page is one navigable full-screen UI instance. The engine drives it
//! through a small capability interface rather than a base class: paired
//! `before_*` hooks fire synchronously with respect to the transition
//! sequence, and the async `enter`/`exit` halves play the page's declared
//! transition animators on its surface.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::nav::animation::Transition;
use crate::nav::asset::Asset;
use crate::nav::error::NavResult;
use crate::nav::surface::Surface;

/// Unique identifier of a resident page. Caller-supplied or generated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageId(String);

impl PageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random id for pushes that do not supply one.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PageId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Capability set of one navigable page.
///
/// The default `enter`/`exit` implementations show or hide the surface and
/// play the animators from [`transition`](Page::transition); override them
/// only for pages with bespoke transition behavior.
#[async_trait]
pub trait Page: Send {
    /// The visual surface this page controls.
    fn surface(&self) -> Arc<dyn Surface>;

    /// Animators used by the default `enter`/`exit`.
    fn transition(&self) -> Transition {
        Transition::default()
    }

    /// Fires before any animation of the transition that reveals this page.
    fn before_enter(&mut self) {}

    /// Bring the page on screen. Runs concurrently with the exiting page's
    /// `exit`; both start at the same logical instant and the transition
    /// waits for both.
    async fn enter(
        &mut self,
        _is_push: bool,
        animate: bool,
        cancel: &CancellationToken,
    ) -> NavResult<()> {
        let surface = self.surface();
        surface.set_visible(true);
        if animate {
            self.transition().enter.play(surface.as_ref(), cancel).await
        } else {
            Ok(())
        }
    }

    /// Fires before any animation of the transition that covers or removes
    /// this page.
    fn before_exit(&mut self) {}

    /// Take the page off screen. The surface is hidden only on successful
    /// completion; a cancelled exit leaves visual state unspecified.
    async fn exit(
        &mut self,
        _is_push: bool,
        animate: bool,
        cancel: &CancellationToken,
    ) -> NavResult<()> {
        let surface = self.surface();
        if animate {
            self.transition().exit.play(surface.as_ref(), cancel).await?;
        }
        surface.set_visible(false);
        Ok(())
    }

    /// Fires after the exit animation has finished, before the page is
    /// detached from the stack.
    fn after_exit(&mut self) {}
}

/// External page construction, consumed at its interface only.
///
/// `instantiate` either succeeds or fails fatally for the in-flight
/// operation; the engine never retries it.
pub trait PageFactory: Send + Sync {
    fn instantiate(
        &self,
        prefab: &Asset,
        parent: &Arc<dyn Surface>,
    ) -> anyhow::Result<Box<dyn Page>>;
}
