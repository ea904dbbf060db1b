// ── Listener registry ──
//
// Per-key ordered subscriber lists with cancellable registrations.
// Fan-out is synchronous; a failing or panicking callback is logged and
// skipped without affecting its siblings.

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use dashmap::DashMap;

/// Error type a fallible callback may return.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

type Callback = Arc<dyn Fn() -> Result<(), ListenerError> + Send + Sync>;

#[derive(Clone)]
struct Subscriber {
    id: u64,
    callback: Callback,
}

#[derive(Default)]
struct RegistryInner {
    subscribers: DashMap<String, Vec<Subscriber>>,
    next_id: AtomicU64,
}

impl RegistryInner {
    fn remove(&self, key: &str, id: u64) {
        if let Some(mut list) = self.subscribers.get_mut(key) {
            list.retain(|s| s.id != id);
        }
        self.subscribers.remove_if(key, |_, list| list.is_empty());
    }
}

/// Key → ordered callbacks.
///
/// Cheap to clone; clones share the same registrations. Used both for
/// device keys and for named controller events.
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    inner: Arc<RegistryInner>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for `key`. It runs after every write to that key.
    pub fn subscribe<F>(&self, key: impl Into<String>, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.register(
            key.into(),
            Arc::new(move || {
                callback();
                Ok(())
            }),
        )
    }

    /// Register a callback that can report failure. Errors are logged at the
    /// fan-out boundary and never reach the writer.
    pub fn try_subscribe<F, E>(&self, key: impl Into<String>, callback: F) -> Subscription
    where
        F: Fn() -> Result<(), E> + Send + Sync + 'static,
        E: Into<ListenerError>,
    {
        self.register(key.into(), Arc::new(move || callback().map_err(Into::into)))
    }

    fn register(&self, key: String, callback: Callback) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .subscribers
            .entry(key.clone())
            .or_default()
            .push(Subscriber { id, callback });

        tracing::trace!(%key, id, "listener registered");

        Subscription {
            registry: Arc::downgrade(&self.inner),
            key,
            id,
        }
    }

    /// Invoke every callback registered for `key`, in registration order.
    ///
    /// The list is copied before the first call, so callbacks may subscribe
    /// or cancel (on any key) without deadlocking. Registrations added during
    /// the fan-out are first invoked on the next one.
    pub fn notify(&self, key: &str) {
        let Some(subscribers) = self
            .inner
            .subscribers
            .get(key)
            .map(|list| list.value().clone())
        else {
            return;
        };

        for sub in subscribers {
            match catch_unwind(AssertUnwindSafe(|| (sub.callback)())) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::error!(key, id = sub.id, error = %e, "listener callback failed");
                }
                Err(payload) => {
                    tracing::error!(
                        key,
                        id = sub.id,
                        panic = panic_message(payload.as_ref()),
                        "listener callback panicked"
                    );
                }
            }
        }
    }

    /// Number of live registrations for `key`.
    pub fn subscriber_count(&self, key: &str) -> usize {
        self.inner.subscribers.get(key).map_or(0, |list| list.len())
    }

    /// Number of keys with at least one registration.
    pub fn key_count(&self) -> usize {
        self.inner.subscribers.len()
    }

    /// Drop every registration. Outstanding handles become no-ops.
    pub fn clear(&self) {
        self.inner.subscribers.clear();
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("keys", &self.key_count())
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic payload>"
    }
}

// ── Subscription handle ──────────────────────────────────────────────

/// Handle to one registration.
///
/// Dropping the handle does NOT cancel it; call [`cancel`](Self::cancel)
/// or convert it with [`drop_guard`](Self::drop_guard).
#[must_use = "a subscription stays registered until cancelled"]
pub struct Subscription {
    registry: Weak<RegistryInner>,
    key: String,
    id: u64,
}

impl Subscription {
    /// Remove exactly this registration. Calling it again is a no-op, as is
    /// calling it after the registry is gone.
    pub fn cancel(&self) {
        if let Some(inner) = self.registry.upgrade() {
            inner.remove(&self.key, self.id);
        }
    }

    /// Whether the registration is still live.
    pub fn is_active(&self) -> bool {
        self.registry.upgrade().is_some_and(|inner| {
            inner
                .subscribers
                .get(&self.key)
                .is_some_and(|list| list.iter().any(|s| s.id == self.id))
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Cancel automatically when the returned guard is dropped.
    pub fn drop_guard(self) -> SubscriptionGuard {
        SubscriptionGuard(self)
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("key", &self.key)
            .field("id", &self.id)
            .finish()
    }
}

/// Cancels its subscription on drop.
#[derive(Debug)]
pub struct SubscriptionGuard(Subscription);

impl SubscriptionGuard {
    pub fn key(&self) -> &str {
        self.0.key()
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.0.cancel();
    }
}
