//! Context values bound by providers and read by components.
//!
//! Declared defaults live in a process-wide registry. Everything a provider
//! binds lives in a [`ContextSnapshot`]: an immutable map handed down the tree
//! by value, so concurrent branches and concurrent renders never see each
//! other's bindings. While a component runs, its snapshot is also installed as
//! the thread's live snapshot so that [`read_context`] works without threading
//! props through helper code.

use crate::element::{Component, ComponentElement, ComponentKind};
use crate::error::RenderError;
use crate::node::Node;
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock, Mutex, PoisonError};
use std::task::{Context as TaskContext, Poll};

pub type ContextValue = Arc<dyn Any + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextKey(u64);

impl ContextKey {
    fn next() -> Self {
        static NEXT_KEY: AtomicU64 = AtomicU64::new(1);
        ContextKey(NEXT_KEY.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

static DECLARED: LazyLock<Mutex<HashMap<ContextKey, ContextValue>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

fn declared_default(key: ContextKey) -> Option<ContextValue> {
    DECLARED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&key)
        .cloned()
}

/// A typed context handle.
pub struct Context<T> {
    key: ContextKey,
    default: Arc<T>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Context<T> {
    fn clone(&self) -> Self {
        Context {
            key: self.key,
            default: Arc::clone(&self.default),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Context<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context").field("key", &self.key).finish()
    }
}

impl<T: Clone + Send + Sync + 'static> Context<T> {
    /// Registers a new context with its default value.
    pub fn declare(default: T) -> Self {
        let key = ContextKey::next();
        let default = Arc::new(default);
        DECLARED
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, default.clone());
        log::trace!(target: "jsx.context", "declared context {key}");
        Context {
            key,
            default,
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> ContextKey {
        self.key
    }

    pub fn default_value(&self) -> &T {
        &self.default
    }

    /// A provider element binding `value` for `children`.
    pub fn provider(&self, value: T, children: impl Into<Node>) -> ComponentElement {
        let kind = ComponentKind::Provider {
            key: self.key,
            value: Arc::new(value),
        };
        Component::with_kind("Provider", kind).element().children(children)
    }

    /// Reads the value visible to the component that is currently running,
    /// or the declared default outside of any render.
    pub fn read(&self) -> Result<T, RenderError> {
        ContextSnapshot::current().read(self)
    }
}

pub fn declare_context<T: Clone + Send + Sync + 'static>(default: T) -> Context<T> {
    Context::declare(default)
}

pub fn read_context<T: Clone + Send + Sync + 'static>(
    context: &Context<T>,
) -> Result<T, RenderError> {
    context.read()
}

/// Immutable context bindings, layered over the declared defaults.
#[derive(Clone, Default)]
pub struct ContextSnapshot {
    bound: Rc<HashMap<ContextKey, ContextValue>>,
}

thread_local! {
    static LIVE: RefCell<Option<ContextSnapshot>> = const { RefCell::new(None) };
}

impl ContextSnapshot {
    /// A snapshot that sees only declared defaults.
    pub fn seeded() -> Self {
        Self::default()
    }

    /// The snapshot of the component currently running on this thread, or a
    /// seeded one when no component is running.
    pub fn current() -> Self {
        LIVE.with(|live| live.borrow().clone()).unwrap_or_default()
    }

    /// A copy with `key` bound to `value`; `self` is unchanged.
    pub fn with_value(&self, key: ContextKey, value: ContextValue) -> Self {
        let mut bound = (*self.bound).clone();
        bound.insert(key, value);
        log::trace!(target: "jsx.context", "bind context {key}");
        ContextSnapshot {
            bound: Rc::new(bound),
        }
    }

    pub fn get(&self, key: ContextKey) -> Result<ContextValue, RenderError> {
        self.bound
            .get(&key)
            .cloned()
            .or_else(|| declared_default(key))
            .ok_or(RenderError::ContextNotFound(key))
    }

    pub fn read<T: Clone + 'static>(&self, context: &Context<T>) -> Result<T, RenderError> {
        let value = self.get(context.key)?;
        value
            .downcast_ref::<T>()
            .cloned()
            .ok_or(RenderError::ContextNotFound(context.key))
    }

    /// Runs `f` with this snapshot installed as the live one.
    pub(crate) fn enter<R>(&self, f: impl FnOnce() -> R) -> R {
        let previous = LIVE.with(|live| live.replace(Some(self.clone())));
        let _restore = RestoreLive(previous);
        f()
    }
}

impl fmt::Debug for ContextSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.bound.keys().copied().collect();
        keys.sort();
        f.debug_struct("ContextSnapshot").field("bound", &keys).finish()
    }
}

struct RestoreLive(Option<ContextSnapshot>);

impl Drop for RestoreLive {
    fn drop(&mut self) {
        let previous = self.0.take();
        LIVE.with(|live| *live.borrow_mut() = previous);
    }
}

/// Polls `inner` with a fixed snapshot live, so code resumed after a
/// suspension sees the same context it started with.
pub(crate) struct Scoped<F> {
    snapshot: Option<ContextSnapshot>,
    inner: F,
}

impl<F> Scoped<F> {
    pub(crate) fn new(snapshot: ContextSnapshot, inner: F) -> Self {
        Scoped {
            snapshot: Some(snapshot),
            inner,
        }
    }

    /// Pins whatever snapshot is live at the first poll. Shared pending
    /// computations use this: they evaluate once, under the context of the
    /// branch that first polls them, whichever branch polls them later.
    pub(crate) fn first_poll(inner: F) -> Self {
        Scoped {
            snapshot: None,
            inner,
        }
    }
}

impl<F: Future + Unpin> Future for Scoped<F> {
    type Output = F::Output;

    fn poll(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<F::Output> {
        let this = &mut *self;
        let snapshot = this.snapshot.get_or_insert_with(ContextSnapshot::current);
        snapshot.enter(|| Pin::new(&mut this.inner).poll(cx))
    }
}
