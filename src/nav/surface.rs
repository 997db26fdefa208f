//! Visual surface seam
//!
//! The engine never draws. Each page controls an opaque surface supplied by
//! the rendering layer, and transition animators drive it through this trait.

use std::sync::Arc;

/// Handle to the rectangle a page renders into.
///
/// Implementations belong to the host's rendering layer; the engine only
/// writes opacity, offset and visibility during transitions.
pub trait Surface: Send + Sync {
    /// Set the surface opacity, already clamped to `[0, 1]` by callers.
    fn set_opacity(&self, opacity: f32);

    /// Set the surface's 2D anchor offset.
    fn set_offset(&self, x: f32, y: f32);

    /// Show or hide the surface outright.
    fn set_visible(&self, visible: bool);
}

/// Surface that ignores every visual command.
///
/// Root surface for headless stacks and the default parent in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSurface;

impl Surface for NullSurface {
    fn set_opacity(&self, _opacity: f32) {}
    fn set_offset(&self, _x: f32, _y: f32) {}
    fn set_visible(&self, _visible: bool) {}
}

impl NullSurface {
    /// Convenience for the common `Arc<dyn Surface>` shape.
    pub fn shared() -> Arc<dyn Surface> {
        Arc::new(NullSurface)
    }
}
