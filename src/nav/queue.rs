//! Navigation request queue
//!
//! Serializes push/pop requests from arbitrary concurrent callers into a
//! single ordered stream consumed by one task that owns the [`PageStack`].
//! Each operation type has its own FIFO queue; the streams interleave by
//! completion time of the previous operation, never by priority. Every
//! request carries its own reply channel, so one failed request never blocks
//! the ones queued behind it.

use std::sync::{Arc, Mutex};

use log::{debug, info};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::nav::error::{NavError, NavResult};
use crate::nav::page::PageId;
use crate::nav::stack::{PageStack, PopOptions, PushOptions, Pushed, StackSnapshot};

struct PushRequest {
    options: PushOptions,
    cancel: CancellationToken,
    reply: oneshot::Sender<NavResult<Pushed>>,
}

enum PopTarget {
    Count(usize),
    Page(PageId),
}

struct PopRequest {
    animate: bool,
    target: PopTarget,
    cancel: CancellationToken,
    reply: oneshot::Sender<NavResult<()>>,
}

enum Control {
    Preload {
        key: String,
        reply: oneshot::Sender<NavResult<()>>,
    },
    Unload {
        key: String,
        reply: oneshot::Sender<NavResult<()>>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Spawns the consumer loop that owns a [`PageStack`].
pub struct Navigator;

impl Navigator {
    /// Take ownership of `stack` and start draining requests on a tokio
    /// task. The returned handle is cheap to clone and share.
    pub fn spawn(stack: PageStack) -> NavigatorHandle {
        let (push_tx, push_rx) = mpsc::unbounded_channel();
        let (pop_tx, pop_rx) = mpsc::unbounded_channel();
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        let snapshot = stack.observe();
        let task = tokio::spawn(run(stack, push_rx, pop_rx, control_rx));
        NavigatorHandle {
            push_tx,
            pop_tx,
            control_tx,
            snapshot,
            task: Arc::new(Mutex::new(Some(task))),
        }
    }
}

async fn run(
    mut stack: PageStack,
    mut push_rx: mpsc::UnboundedReceiver<PushRequest>,
    mut pop_rx: mpsc::UnboundedReceiver<PopRequest>,
    mut control_rx: mpsc::UnboundedReceiver<Control>,
) {
    info!("navigator loop started");
    loop {
        tokio::select! {
            Some(request) = push_rx.recv() => {
                debug!("servicing queued push {:?}", request.options.key);
                let result = stack.push(request.options, &request.cancel).await;
                let _ = request.reply.send(result);
            }
            Some(request) = pop_rx.recv() => {
                let result = match request.target {
                    PopTarget::Count(count) => {
                        stack
                            .pop(PopOptions { animate: request.animate, count }, &request.cancel)
                            .await
                    }
                    PopTarget::Page(id) => {
                        stack.pop_to(&id, request.animate, &request.cancel).await
                    }
                };
                let _ = request.reply.send(result);
            }
            Some(control) = control_rx.recv() => match control {
                Control::Preload { key, reply } => {
                    let _ = reply.send(stack.preload(&key).await);
                }
                Control::Unload { key, reply } => {
                    let _ = reply.send(stack.unload(&key));
                }
                Control::Shutdown { reply } => {
                    stack.teardown();
                    let _ = reply.send(());
                    break;
                }
            },
            // All handles dropped: tear the stack down and stop.
            else => {
                stack.teardown();
                break;
            }
        }
    }
    info!("navigator loop stopped");
}

/// Cloneable entry point for issuing navigation requests.
///
/// Requests enqueue in arrival order per stream and resolve when the
/// consumer loop has finished (or rejected) the operation.
#[derive(Clone)]
pub struct NavigatorHandle {
    push_tx: mpsc::UnboundedSender<PushRequest>,
    pop_tx: mpsc::UnboundedSender<PopRequest>,
    control_tx: mpsc::UnboundedSender<Control>,
    snapshot: watch::Receiver<StackSnapshot>,
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl NavigatorHandle {
    /// Enqueue a push and await its outcome.
    pub async fn push(&self, options: PushOptions) -> NavResult<Pushed> {
        self.push_with(options, CancellationToken::new()).await
    }

    /// Enqueue a push with a caller-owned cancellation token.
    pub async fn push_with(
        &self,
        options: PushOptions,
        cancel: CancellationToken,
    ) -> NavResult<Pushed> {
        let (reply, response) = oneshot::channel();
        self.push_tx
            .send(PushRequest { options, cancel, reply })
            .map_err(|_| NavError::Closed)?;
        response.await.map_err(|_| NavError::Closed)?
    }

    /// Enqueue a pop and await its outcome.
    pub async fn pop(&self, options: PopOptions) -> NavResult<()> {
        self.pop_with(options, CancellationToken::new()).await
    }

    /// Enqueue a pop with a caller-owned cancellation token.
    pub async fn pop_with(
        &self,
        options: PopOptions,
        cancel: CancellationToken,
    ) -> NavResult<()> {
        self.send_pop(PopTarget::Count(options.count), options.animate, cancel)
            .await
    }

    /// Enqueue a pop that removes pages until `id` becomes current.
    pub async fn pop_to(&self, id: impl Into<PageId>, animate: bool) -> NavResult<()> {
        self.send_pop(PopTarget::Page(id.into()), animate, CancellationToken::new())
            .await
    }

    async fn send_pop(
        &self,
        target: PopTarget,
        animate: bool,
        cancel: CancellationToken,
    ) -> NavResult<()> {
        let (reply, response) = oneshot::channel();
        self.pop_tx
            .send(PopRequest { animate, target, cancel, reply })
            .map_err(|_| NavError::Closed)?;
        response.await.map_err(|_| NavError::Closed)?
    }

    /// Preload an asset handle that outlives individual pages.
    pub async fn preload(&self, key: impl Into<String>) -> NavResult<()> {
        let (reply, response) = oneshot::channel();
        self.control_tx
            .send(Control::Preload { key: key.into(), reply })
            .map_err(|_| NavError::Closed)?;
        response.await.map_err(|_| NavError::Closed)?
    }

    /// Release a preloaded asset handle.
    pub async fn unload(&self, key: impl Into<String>) -> NavResult<()> {
        let (reply, response) = oneshot::channel();
        self.control_tx
            .send(Control::Unload { key: key.into(), reply })
            .map_err(|_| NavError::Closed)?;
        response.await.map_err(|_| NavError::Closed)?
    }

    /// Latest committed stack snapshot.
    pub fn snapshot(&self) -> StackSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Watch committed snapshots, including the "not interactive" signal that
    /// spans each transition.
    pub fn observe(&self) -> watch::Receiver<StackSnapshot> {
        self.snapshot.clone()
    }

    /// Tear the stack down and stop the consumer loop. Safe to call more than
    /// once; later calls and in-flight requests resolve with
    /// [`NavError::Closed`].
    pub async fn shutdown(&self) {
        let (reply, response) = oneshot::channel();
        if self.control_tx.send(Control::Shutdown { reply }).is_err() {
            return;
        }
        let _ = response.await;
        let task = self.task.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(task) = task {
            let _ = task.await;
        }
    }
}
