//! Transition animators
//!
//! Stateless strategies that play a timed visual effect on a page's surface.
//! Every animator is cancellable mid-flight: cancellation may leave the
//! surface in an intermediate visual state but always resolves the future
//! with [`NavError::Cancelled`] instead of hanging the transition.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::nav::error::{NavError, NavResult};
use crate::nav::surface::Surface;

/// Frame period for interpolated animators (~60fps).
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Default length of the built-in fade transition.
pub const DEFAULT_DURATION: Duration = Duration::from_millis(250);

/// A timed visual effect over `(surface, cancellation) -> done`.
#[async_trait]
pub trait Animator: Send + Sync {
    async fn play(&self, surface: &dyn Surface, cancel: &CancellationToken) -> NavResult<()>;
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Wait for the next frame tick, or bail out if cancellation fires first.
async fn next_frame(frames: &mut time::Interval, cancel: &CancellationToken) -> NavResult<()> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(NavError::Cancelled),
        _ = frames.tick() => Ok(()),
    }
}

fn frame_clock() -> time::Interval {
    let mut frames = time::interval(FRAME_INTERVAL);
    // Skip missed frames rather than bursting to catch up after a stall.
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    frames
}

/// Completes immediately with no visual change.
pub struct NoOp;

#[async_trait]
impl Animator for NoOp {
    async fn play(&self, _surface: &dyn Surface, cancel: &CancellationToken) -> NavResult<()> {
        if cancel.is_cancelled() {
            return Err(NavError::Cancelled);
        }
        Ok(())
    }
}

/// Delays a fixed duration without touching the surface. Used to keep timing
/// in step with a partner animation on the other side of a transition.
pub struct Wait {
    pub duration: Duration,
}

impl Wait {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

#[async_trait]
impl Animator for Wait {
    async fn play(&self, _surface: &dyn Surface, cancel: &CancellationToken) -> NavResult<()> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(NavError::Cancelled),
            _ = time::sleep(self.duration) => Ok(()),
        }
    }
}

/// Linear opacity interpolation from `from` to `to` over `duration`.
///
/// Monotonic, clamped to `[0, 1]`, and the final frame writes `to` exactly
/// regardless of frame timing drift.
pub struct Fade {
    pub from: f32,
    pub to: f32,
    pub duration: Duration,
}

impl Fade {
    pub fn fade_in(duration: Duration) -> Self {
        Self { from: 0.0, to: 1.0, duration }
    }

    pub fn fade_out(duration: Duration) -> Self {
        Self { from: 1.0, to: 0.0, duration }
    }
}

#[async_trait]
impl Animator for Fade {
    async fn play(&self, surface: &dyn Surface, cancel: &CancellationToken) -> NavResult<()> {
        if self.duration > Duration::ZERO {
            let start = Instant::now();
            let mut frames = frame_clock();
            loop {
                next_frame(&mut frames, cancel).await?;
                let t = start.elapsed().as_secs_f32() / self.duration.as_secs_f32();
                if t >= 1.0 {
                    break;
                }
                surface.set_opacity(lerp(self.from, self.to, t).clamp(0.0, 1.0));
            }
        } else if cancel.is_cancelled() {
            return Err(NavError::Cancelled);
        }
        surface.set_opacity(self.to.clamp(0.0, 1.0));
        Ok(())
    }
}

/// Linear 2D anchor-offset interpolation. The final frame writes the target
/// position exactly.
pub struct Slide {
    pub from: (f32, f32),
    pub to: (f32, f32),
    pub duration: Duration,
}

impl Slide {
    /// Slide in horizontally from `distance` to rest.
    pub fn slide_in(distance: f32, duration: Duration) -> Self {
        Self { from: (distance, 0.0), to: (0.0, 0.0), duration }
    }

    /// Slide out horizontally from rest to `-distance`.
    pub fn slide_out(distance: f32, duration: Duration) -> Self {
        Self { from: (0.0, 0.0), to: (-distance, 0.0), duration }
    }
}

#[async_trait]
impl Animator for Slide {
    async fn play(&self, surface: &dyn Surface, cancel: &CancellationToken) -> NavResult<()> {
        if self.duration > Duration::ZERO {
            let start = Instant::now();
            let mut frames = frame_clock();
            loop {
                next_frame(&mut frames, cancel).await?;
                let t = start.elapsed().as_secs_f32() / self.duration.as_secs_f32();
                if t >= 1.0 {
                    break;
                }
                surface.set_offset(
                    lerp(self.from.0, self.to.0, t),
                    lerp(self.from.1, self.to.1, t),
                );
            }
        } else if cancel.is_cancelled() {
            return Err(NavError::Cancelled);
        }
        surface.set_offset(self.to.0, self.to.1);
        Ok(())
    }
}

/// Animator pair a page declares for its enter and exit sides.
#[derive(Clone)]
pub struct Transition {
    pub enter: Arc<dyn Animator>,
    pub exit: Arc<dyn Animator>,
}

impl Default for Transition {
    fn default() -> Self {
        Self::fade(DEFAULT_DURATION)
    }
}

impl Transition {
    /// No visual effect on either side.
    pub fn none() -> Self {
        Self {
            enter: Arc::new(NoOp),
            exit: Arc::new(NoOp),
        }
    }

    /// Fade in on enter, fade out on exit.
    pub fn fade(duration: Duration) -> Self {
        Self {
            enter: Arc::new(Fade::fade_in(duration)),
            exit: Arc::new(Fade::fade_out(duration)),
        }
    }

    /// Horizontal slide by `distance` on both sides.
    pub fn slide(distance: f32, duration: Duration) -> Self {
        Self {
            enter: Arc::new(Slide::slide_in(distance, duration)),
            exit: Arc::new(Slide::slide_out(distance, duration)),
        }
    }

    /// Enter plays `animator`; exit holds for `duration` so both sides of the
    /// transition finish at the same logical instant.
    pub fn enter_only(animator: Arc<dyn Animator>, duration: Duration) -> Self {
        Self {
            enter: animator,
            exit: Arc::new(Wait::new(duration)),
        }
    }
}
