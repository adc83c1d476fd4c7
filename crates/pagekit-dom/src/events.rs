//! Event subscription model
//!
//! The browser original wired listeners with `addEventListener` and no
//! removal path. Here subscriptions are explicit values: registering a
//! handler returns a [`Subscription`] that detaches the handler when
//! dropped or disposed.

use crate::ElementHandle;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};

/// Event kinds the page helpers intercept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Pointer click
    Click,
    /// Form submission
    Submit,
}

/// Context passed to event handlers
///
/// Handlers flag the outcome on the context; dispatchers read the flags
/// after delivery.
pub struct EventContext {
    target: ElementHandle,
    default_prevented: AtomicBool,
    propagation_stopped: AtomicBool,
}

impl EventContext {
    /// Create a context for a dispatch to `target`
    pub fn new(target: ElementHandle) -> Self {
        Self {
            target,
            default_prevented: AtomicBool::new(false),
            propagation_stopped: AtomicBool::new(false),
        }
    }

    /// The element the event was dispatched to
    pub fn target(&self) -> &ElementHandle {
        &self.target
    }

    /// Cancel the default action
    pub fn prevent_default(&self) {
        self.default_prevented.store(true, Ordering::SeqCst);
    }

    /// Whether the default action was cancelled
    pub fn default_prevented(&self) -> bool {
        self.default_prevented.load(Ordering::SeqCst)
    }

    /// Stop delivery to handlers registered after this one
    pub fn stop_propagation(&self) {
        self.propagation_stopped.store(true, Ordering::SeqCst);
    }

    /// Whether delivery was stopped
    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.load(Ordering::SeqCst)
    }
}

/// Outcome of a dispatched event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventOutcome {
    /// Whether any handler cancelled the default action
    pub default_prevented: bool,
    /// Whether delivery was stopped early
    pub propagation_stopped: bool,
    /// Number of handlers that ran
    pub handlers_run: usize,
}

/// Handler function type
pub type EventHandler = Arc<dyn Fn(&EventContext) + Send + Sync>;

struct HandlerEntry {
    token: u64,
    handler: EventHandler,
}

type HandlerMap = HashMap<(u64, EventKind), Vec<HandlerEntry>>;

/// Shared handler table for a document
#[derive(Clone)]
pub struct HandlerRegistry {
    inner: Arc<RwLock<HandlerMap>>,
    next_token: Arc<AtomicU64>,
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            next_token: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Register a handler for an element/event pair
    pub fn subscribe(&self, element: u64, kind: EventKind, handler: EventHandler) -> Subscription {
        let token = self.next_token.fetch_add(1, Ordering::SeqCst);
        let mut map = self.inner.write().unwrap();
        map.entry((element, kind))
            .or_default()
            .push(HandlerEntry { token, handler });
        Subscription {
            registry: Arc::downgrade(&self.inner),
            element,
            kind,
            token,
            disposed: false,
        }
    }

    /// Snapshot the handlers registered for an element/event pair
    pub fn handlers_for(&self, element: u64, kind: EventKind) -> Vec<EventHandler> {
        let map = self.inner.read().unwrap();
        map.get(&(element, kind))
            .map(|entries| entries.iter().map(|e| e.handler.clone()).collect())
            .unwrap_or_default()
    }
}

/// Disposer handle for a registered event handler
///
/// Dropping the subscription detaches the handler.
pub struct Subscription {
    registry: Weak<RwLock<HandlerMap>>,
    element: u64,
    kind: EventKind,
    token: u64,
    disposed: bool,
}

impl Subscription {
    /// Detach the handler now
    pub fn dispose(mut self) {
        self.dispose_inner();
    }

    fn dispose_inner(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        if let Some(map) = self.registry.upgrade() {
            let mut map = map.write().unwrap();
            if let Some(entries) = map.get_mut(&(self.element, self.kind)) {
                entries.retain(|e| e.token != self.token);
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispose_inner();
    }
}

// ==================== Tests ====================
