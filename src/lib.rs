//! Page-stack navigation engine.
//!
//! `navstack` manages a navigable stack of full-screen UI pages: loading
//! their assets on demand, animating paired enter/exit transitions, and
//! keeping the stack structurally sound under concurrent navigation
//! requests. Rendering, page construction and asset storage stay on the host
//! side behind the [`Surface`], [`PageFactory`] and [`AssetBackend`] seams.
//!
//! Direct use: own a [`PageStack`] and call `push`/`pop` from one task.
//! Concurrent use: hand the stack to [`Navigator::spawn`] and issue requests
//! through the cloneable [`NavigatorHandle`]; requests queue FIFO per
//! operation type and run strictly one transition at a time.

pub mod nav;

pub use nav::{
    Animator, Asset, AssetBackend, AssetHandle, Fade, NavError, NavResult, Navigator,
    NavigatorHandle, NoOp, NullSurface, Page, PageFactory, PageId, PageRecord, PageStack,
    PopOptions, PushOptions, Pushed, Slide, StackSnapshot, Surface, Transition, Wait,
};
