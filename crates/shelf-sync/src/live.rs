//! # Live Views
//!
//! Streams of query snapshots that stay current as the store changes.
//!
//! ## Building Blocks
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Live View Pipeline                               │
//! │                                                                         │
//! │  ChangeTracker ──► live_query(table, fetch)                             │
//! │                      │  fetch now, then again after every change        │
//! │                      │  to `table`; fetch error → empty snapshot        │
//! │                      ▼                                                  │
//! │                   SharedLive<T>                                         │
//! │                      │  one upstream, many observers                    │
//! │                      │  upstream kept for `grace` after the last        │
//! │                      │  observer leaves, restarted on demand            │
//! │                      ▼                                                  │
//! │              LiveSubscription<T>  (Stream, latest value first)          │
//! │                                                                         │
//! │  debounce(stream, period)      → latest item after `period` of quiet    │
//! │  combine_latest(left, right)   → (a, b) whenever either side emits      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Runtime
//! [`SharedLive::subscribe`] spawns the upstream task and therefore must be
//! called from within a Tokio runtime.

use futures_util::future;
use futures_util::stream::{self, BoxStream, Stream, StreamExt};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, trace, warn};

use shelf_db::{ChangeTracker, StoreResult, Table};

// =============================================================================
// Live Query
// =============================================================================

/// Turns a one-shot fetch into an endless stream of snapshots.
///
/// ## Behavior
/// - Subscribes to `changes` before the first fetch, so no write is missed
/// - Emits the first snapshot right away
/// - Re-fetches after each change to `table`; a burst of changes that queued
///   up meanwhile costs one re-fetch
/// - A subscriber that lagged re-fetches as well
/// - A failed fetch is logged and emitted as an empty snapshot; the stream
///   keeps listening
///
/// Restartable: every call builds an independent stream.
pub fn live_query<T, F, Fut>(
    changes: &ChangeTracker,
    table: Table,
    fetch: F,
) -> BoxStream<'static, Vec<T>>
where
    T: Send + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = StoreResult<Vec<T>>> + Send + 'static,
{
    let rx = changes.subscribe();

    stream::unfold((rx, fetch, true), move |(mut rx, fetch, first)| async move {
        if !first {
            loop {
                match rx.recv().await {
                    Ok(changed) if changed == table => break,
                    Ok(_) => continue,
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(table = %table, skipped, "Live query lagged, re-fetching");
                        break;
                    }
                    Err(RecvError::Closed) => return None,
                }
            }

            // Coalesce whatever else queued up; the fetch below covers it.
            loop {
                match rx.try_recv() {
                    Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
                    Err(_) => break,
                }
            }
        }

        let snapshot = match fetch().await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(table = %table, error = %e, "Live query failed, emitting empty snapshot");
                Vec::new()
            }
        };
        trace!(table = %table, rows = snapshot.len(), "Live query emitted");

        Some((snapshot, (rx, fetch, false)))
    })
    .boxed()
}

// =============================================================================
// Debounce
// =============================================================================

/// Emits an item only after `period` passes with no newer item.
///
/// When the source ends, a pending item is emitted immediately.
///
/// ```text
///  source:  a──ab──abc─────────────────x──|
///  output:  ─────────────(300ms)──abc──────x|
/// ```
pub fn debounce<S>(source: S, period: Duration) -> BoxStream<'static, S::Item>
where
    S: Stream + Send + 'static,
    S::Item: Send + 'static,
{
    stream::unfold(
        (source.boxed(), None, false),
        move |(mut source, mut pending, mut ended)| async move {
            loop {
                if ended {
                    return pending.take().map(|item| (item, (source, None, true)));
                }

                match pending.take() {
                    None => match source.next().await {
                        Some(item) => pending = Some(item),
                        None => return None,
                    },
                    Some(item) => {
                        tokio::select! {
                            newer = source.next() => match newer {
                                Some(newer) => pending = Some(newer),
                                None => {
                                    pending = Some(item);
                                    ended = true;
                                }
                            },
                            _ = tokio::time::sleep(period) => {
                                return Some((item, (source, None, false)));
                            }
                        }
                    }
                }
            }
        },
    )
    .boxed()
}

// =============================================================================
// Combine Latest
// =============================================================================

enum Either<A, B> {
    Left(A),
    Right(B),
}

/// Pairs the latest item of each side. Emits once both sides have produced
/// something, then on every item from either side. Ends when both end.
pub fn combine_latest<L, R>(left: L, right: R) -> BoxStream<'static, (L::Item, R::Item)>
where
    L: Stream + Send + 'static,
    R: Stream + Send + 'static,
    L::Item: Clone + Send + 'static,
    R::Item: Clone + Send + 'static,
{
    stream::select(left.map(Either::Left), right.map(Either::Right))
        .scan((None, None), |latest, item| {
            match item {
                Either::Left(a) => latest.0 = Some(a),
                Either::Right(b) => latest.1 = Some(b),
            }
            let pair = match (&latest.0, &latest.1) {
                (Some(a), Some(b)) => Some((a.clone(), b.clone())),
                _ => None,
            };
            future::ready(Some(pair))
        })
        .filter_map(future::ready)
        .boxed()
}

// =============================================================================
// Shared Live View
// =============================================================================

type StreamFactory<T> = Box<dyn Fn() -> BoxStream<'static, T> + Send + Sync>;

/// A multicast live view with a grace period.
///
/// ## Lifecycle
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                                                                         │
/// │  IDLE ──subscribe──► ACTIVE ──last observer drops──► GRACE              │
/// │   ▲                    ▲                               │   │            │
/// │   │                    └──────subscribe (reuse)────────┘   │            │
/// │   └─────────────── grace period elapsed (upstream aborted) ┘            │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
///
/// Every observer sees the latest value first, then each new one. The last
/// value survives an upstream restart, so a late observer never starts from
/// nothing once the view has produced a value.
///
/// Clones share the same upstream. When the last clone and the last
/// subscription are gone, any running task is aborted.
pub struct SharedLive<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for SharedLive<T> {
    fn clone(&self) -> Self {
        SharedLive {
            shared: Arc::clone(&self.shared),
        }
    }
}

struct Shared<T> {
    name: &'static str,
    factory: StreamFactory<T>,
    grace: Duration,
    latest: watch::Sender<Option<T>>,
    control: Mutex<Control>,
}

#[derive(Default)]
struct Control {
    subscribers: usize,
    starts: u64,
    upstream: Option<JoinHandle<()>>,
    teardown: Option<JoinHandle<()>>,
}

impl<T> SharedLive<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates an idle view. Nothing runs until the first subscription.
    ///
    /// ## Arguments
    /// * `name` - Label used in logs
    /// * `grace` - How long the upstream outlives its last observer
    /// * `factory` - Builds a fresh upstream stream on every (re)start
    pub fn new<F>(name: &'static str, grace: Duration, factory: F) -> Self
    where
        F: Fn() -> BoxStream<'static, T> + Send + Sync + 'static,
    {
        let (latest, _) = watch::channel(None);
        SharedLive {
            shared: Arc::new(Shared {
                name,
                factory: Box::new(factory),
                grace,
                latest,
                control: Mutex::new(Control::default()),
            }),
        }
    }

    /// Adds an observer, starting or reusing the upstream.
    pub fn subscribe(&self) -> LiveSubscription<T> {
        let shared = &self.shared;
        {
            let mut control = shared.lock();
            control.subscribers += 1;

            if let Some(teardown) = control.teardown.take() {
                teardown.abort();
                debug!(view = shared.name, "Observer returned within grace period");
            }

            let running = control
                .upstream
                .as_ref()
                .is_some_and(|handle| !handle.is_finished());
            if !running {
                control.upstream = Some(Shared::spawn_pump(shared));
                control.starts += 1;
                debug!(view = shared.name, starts = control.starts, "Upstream started");
            }
        }

        let inner = WatchStream::new(shared.latest.subscribe())
            .filter_map(future::ready)
            .boxed();

        LiveSubscription {
            inner,
            shared: Arc::clone(shared),
        }
    }

    /// The most recent value, if the view has produced one.
    pub fn latest(&self) -> Option<T> {
        self.shared.latest.borrow().clone()
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.shared.lock().subscribers
    }

    /// True while an upstream task is running (including the grace period).
    pub fn is_active(&self) -> bool {
        self.shared
            .lock()
            .upstream
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// How many times the upstream has been started.
    pub fn start_count(&self) -> u64 {
        self.shared.lock().starts
    }
}

impl<T> Shared<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn lock(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn spawn_pump(this: &Arc<Self>) -> JoinHandle<()> {
        let weak = Arc::downgrade(this);
        let mut upstream = (this.factory)();

        tokio::spawn(async move {
            while let Some(value) = upstream.next().await {
                let Some(shared) = weak.upgrade() else {
                    break;
                };
                shared.latest.send_replace(Some(value));
            }
        })
    }

    /// Called when a subscription drops.
    fn release(this: &Arc<Self>) {
        let mut control = this.lock();
        control.subscribers = control.subscribers.saturating_sub(1);
        if control.subscribers > 0 {
            return;
        }

        match Handle::try_current() {
            Ok(handle) => {
                let weak: Weak<Self> = Arc::downgrade(this);
                let grace = this.grace;
                debug!(view = this.name, ?grace, "Last observer left, grace period started");
                control.teardown = Some(handle.spawn(async move {
                    tokio::time::sleep(grace).await;
                    if let Some(shared) = weak.upgrade() {
                        shared.stop_if_idle();
                    }
                }));
            }
            Err(_) => {
                // No runtime to time the grace period on.
                if let Some(upstream) = control.upstream.take() {
                    upstream.abort();
                }
            }
        }
    }

    fn stop_if_idle(&self) {
        let mut control = self.lock();
        if control.subscribers > 0 {
            return;
        }
        control.teardown = None;
        if let Some(upstream) = control.upstream.take() {
            upstream.abort();
            debug!(view = self.name, "Grace period over, upstream stopped");
        }
    }
}

impl<T> Drop for Shared<T> {
    fn drop(&mut self) {
        let control = self
            .control
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(upstream) = control.upstream.take() {
            upstream.abort();
        }
        if let Some(teardown) = control.teardown.take() {
            teardown.abort();
        }
    }
}

// =============================================================================
// Live Subscription
// =============================================================================

/// One observer of a [`SharedLive`]. Dropping it releases the observer slot.
pub struct LiveSubscription<T>
where
    T: Clone + Send + Sync + 'static,
{
    inner: BoxStream<'static, T>,
    shared: Arc<Shared<T>>,
}

impl<T> Stream for LiveSubscription<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.inner.poll_next_unpin(cx)
    }
}

impl<T> Drop for LiveSubscription<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        Shared::release(&self.shared);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
