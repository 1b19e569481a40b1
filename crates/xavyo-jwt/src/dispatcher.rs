//! Ordered, synchronous hook dispatch.
//!
//! Hooks subscribe to a channel with a priority. Dispatch runs them in the
//! calling thread, highest priority first; hooks with equal priority run in
//! registration order. Every hook runs: a decode hook that marks the event
//! invalid does not stop the ones after it.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use xavyo_jwt::HookDispatcher;
//!
//! let dispatcher = HookDispatcher::new();
//! dispatcher.subscribe_created("add-issuer", 0, |event| {
//!     event.data_mut().insert("iss".to_string(), json!("xavyo"));
//! });
//! dispatcher.subscribe_decoded("deny-guests", 0, |event| {
//!     if event.payload().get("username") == Some(&json!("guest")) {
//!         event.mark_as_invalid();
//!     }
//! });
//! ```

use crate::events::{Channel, JwtCreatedEvent, JwtDecodedEvent, JwtEncodedEvent};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Priority given to hooks without a specific ordering need.
pub const DEFAULT_PRIORITY: i32 = 0;

/// Hook run on [`Channel::Created`].
pub type CreatedHook = dyn Fn(&mut JwtCreatedEvent<'_>) + Send + Sync;

/// Hook run on [`Channel::Encoded`]. Observation only.
pub type EncodedHook = dyn Fn(&JwtEncodedEvent) + Send + Sync;

/// Hook run on [`Channel::Decoded`].
pub type DecodedHook = dyn Fn(&mut JwtDecodedEvent) + Send + Sync;

/// Broadcast facility used by [`JwtManager`](crate::JwtManager).
///
/// Implementations must run subscribers synchronously and must not skip any
/// of them.
pub trait EventDispatcher: Send + Sync {
    /// Run the hooks of [`Channel::Created`].
    fn dispatch_created(&self, event: &mut JwtCreatedEvent<'_>);

    /// Run the hooks of [`Channel::Encoded`].
    fn dispatch_encoded(&self, event: &JwtEncodedEvent);

    /// Run the hooks of [`Channel::Decoded`].
    fn dispatch_decoded(&self, event: &mut JwtDecodedEvent);
}

struct Subscriber<H: ?Sized> {
    name: Arc<str>,
    priority: i32,
    hook: Arc<H>,
}

/// Subscribers of one channel, kept sorted by descending priority.
struct Subscribers<H: ?Sized> {
    entries: RwLock<Vec<Subscriber<H>>>,
}

impl<H: ?Sized> Subscribers<H> {
    fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    fn insert(&self, name: String, priority: i32, hook: Arc<H>) {
        let mut entries = self.entries.write();
        // After every entry of the same or higher priority.
        let position = entries
            .iter()
            .position(|s| s.priority < priority)
            .unwrap_or(entries.len());
        entries.insert(
            position,
            Subscriber {
                name: name.into(),
                priority,
                hook,
            },
        );
    }

    fn remove(&self, name: &str) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|s| &*s.name != name);
        before - entries.len()
    }

    /// Copy of the ordered hook list. The lock is released before hooks
    /// run, so a hook may subscribe further hooks.
    fn snapshot(&self) -> Vec<(Arc<str>, Arc<H>)> {
        self.entries
            .read()
            .iter()
            .map(|s| (Arc::clone(&s.name), Arc::clone(&s.hook)))
            .collect()
    }

    fn names(&self) -> Vec<String> {
        self.entries
            .read()
            .iter()
            .map(|s| s.name.to_string())
            .collect()
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }
}

/// In-process [`EventDispatcher`] with per-channel priority lists.
pub struct HookDispatcher {
    created: Subscribers<CreatedHook>,
    encoded: Subscribers<EncodedHook>,
    decoded: Subscribers<DecodedHook>,
}

impl Default for HookDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HookDispatcher {
    /// Create a dispatcher with no hooks.
    #[must_use]
    pub fn new() -> Self {
        Self {
            created: Subscribers::new(),
            encoded: Subscribers::new(),
            decoded: Subscribers::new(),
        }
    }

    /// Subscribe a hook that can rewrite payload and header before encoding.
    pub fn subscribe_created<F>(&self, name: impl Into<String>, priority: i32, hook: F)
    where
        F: Fn(&mut JwtCreatedEvent<'_>) + Send + Sync + 'static,
    {
        let name = name.into();
        debug!(channel = %Channel::Created, hook = %name, priority, "Subscribing hook");
        self.created.insert(name, priority, Arc::new(hook));
    }

    /// Subscribe a hook that observes encoded tokens.
    pub fn subscribe_encoded<F>(&self, name: impl Into<String>, priority: i32, hook: F)
    where
        F: Fn(&JwtEncodedEvent) + Send + Sync + 'static,
    {
        let name = name.into();
        debug!(channel = %Channel::Encoded, hook = %name, priority, "Subscribing hook");
        self.encoded.insert(name, priority, Arc::new(hook));
    }

    /// Subscribe a hook that can rewrite or reject decoded payloads.
    pub fn subscribe_decoded<F>(&self, name: impl Into<String>, priority: i32, hook: F)
    where
        F: Fn(&mut JwtDecodedEvent) + Send + Sync + 'static,
    {
        let name = name.into();
        debug!(channel = %Channel::Decoded, hook = %name, priority, "Subscribing hook");
        self.decoded.insert(name, priority, Arc::new(hook));
    }

    /// Remove every hook with this name from a channel.
    ///
    /// Returns the number of hooks removed.
    pub fn unsubscribe(&self, channel: Channel, name: &str) -> usize {
        match channel {
            Channel::Created => self.created.remove(name),
            Channel::Encoded => self.encoded.remove(name),
            Channel::Decoded => self.decoded.remove(name),
        }
    }

    /// Number of hooks on a channel.
    #[must_use]
    pub fn listener_count(&self, channel: Channel) -> usize {
        match channel {
            Channel::Created => self.created.len(),
            Channel::Encoded => self.encoded.len(),
            Channel::Decoded => self.decoded.len(),
        }
    }

    /// Check if a channel has any hook.
    #[must_use]
    pub fn has_listeners(&self, channel: Channel) -> bool {
        self.listener_count(channel) > 0
    }

    /// Hook names of a channel, in dispatch order.
    #[must_use]
    pub fn listeners(&self, channel: Channel) -> Vec<String> {
        match channel {
            Channel::Created => self.created.names(),
            Channel::Encoded => self.encoded.names(),
            Channel::Decoded => self.decoded.names(),
        }
    }
}

impl EventDispatcher for HookDispatcher {
    fn dispatch_created(&self, event: &mut JwtCreatedEvent<'_>) {
        let hooks = self.created.snapshot();
        debug!(channel = %Channel::Created, listeners = hooks.len(), "Dispatching event");
        for (name, hook) in hooks {
            trace!(hook = %name, "Invoking hook");
            (*hook)(&mut *event);
        }
    }

    fn dispatch_encoded(&self, event: &JwtEncodedEvent) {
        let hooks = self.encoded.snapshot();
        debug!(channel = %Channel::Encoded, listeners = hooks.len(), "Dispatching event");
        for (name, hook) in hooks {
            trace!(hook = %name, "Invoking hook");
            (*hook)(event);
        }
    }

    fn dispatch_decoded(&self, event: &mut JwtDecodedEvent) {
        let hooks = self.decoded.snapshot();
        debug!(channel = %Channel::Decoded, listeners = hooks.len(), "Dispatching event");
        for (name, hook) in hooks {
            trace!(hook = %name, "Invoking hook");
            (*hook)(&mut *event);
        }
    }
}

impl fmt::Debug for HookDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookDispatcher")
            .field("created", &self.created.names())
            .field("encoded", &self.encoded.names())
            .field("decoded", &self.decoded.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::ClaimPayload;
    use crate::principal::SimplePrincipal;
    use parking_lot::Mutex;
    use serde_json::json;

    type Log = Arc<Mutex<Vec<&'static str>>>;

    /// Shared log plus a factory for decode hooks that append a label to it.
    fn recorder() -> (Log, impl Fn(&'static str) -> Box<DecodedHook>) {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let shared = Arc::clone(&log);
        let make = move |label: &'static str| -> Box<DecodedHook> {
            let log = Arc::clone(&shared);
            Box::new(move |_event: &mut JwtDecodedEvent| log.lock().push(label))
        };
        (log, make)
    }

    #[test]
    fn test_priority_then_registration_order() {
        let dispatcher = HookDispatcher::new();
        let (log, make) = recorder();

        dispatcher.subscribe_decoded("low", -5, make("low"));
        dispatcher.subscribe_decoded("first-default", 0, make("first-default"));
        dispatcher.subscribe_decoded("high", 10, make("high"));
        dispatcher.subscribe_decoded("second-default", 0, make("second-default"));

        dispatcher.dispatch_decoded(&mut JwtDecodedEvent::new(ClaimPayload::new()));

        assert_eq!(
            *log.lock(),
            vec!["high", "first-default", "second-default", "low"]
        );
        assert_eq!(
            dispatcher.listeners(Channel::Decoded),
            vec!["high", "first-default", "second-default", "low"]
        );
    }

    #[test]
    fn test_order_is_stable_across_dispatches() {
        let dispatcher = HookDispatcher::new();
        let (log, make) = recorder();
        dispatcher.subscribe_decoded("a", 1, make("a"));
        dispatcher.subscribe_decoded("b", 1, make("b"));

        for _ in 0..3 {
            dispatcher.dispatch_decoded(&mut JwtDecodedEvent::new(ClaimPayload::new()));
        }

        assert_eq!(*log.lock(), vec!["a", "b", "a", "b", "a", "b"]);
    }

    #[test]
    fn test_invalidation_does_not_stop_propagation() {
        let dispatcher = HookDispatcher::new();
        let (log, make) = recorder();

        dispatcher.subscribe_decoded("reject", 10, |event| event.mark_as_invalid());
        dispatcher.subscribe_decoded("audit", 0, make("audit"));

        let mut event = JwtDecodedEvent::new(ClaimPayload::new());
        dispatcher.dispatch_decoded(&mut event);

        assert!(!event.is_valid());
        assert_eq!(*log.lock(), vec!["audit"]);
    }

    #[test]
    fn test_created_hooks_see_earlier_mutations() {
        let dispatcher = HookDispatcher::new();
        dispatcher.subscribe_created("double", 5, |event| {
            let n = event.data().get("n").and_then(|v| v.as_i64()).unwrap_or(0);
            event.data_mut().insert("n".to_string(), json!(n * 2));
        });
        dispatcher.subscribe_created("increment", 10, |event| {
            let n = event.data().get("n").and_then(|v| v.as_i64()).unwrap_or(0);
            event.data_mut().insert("n".to_string(), json!(n + 1));
        });

        let principal = SimplePrincipal::new("alice");
        let mut data = ClaimPayload::new();
        data.insert("n".to_string(), json!(1));
        let mut event = JwtCreatedEvent::new(data, &principal);
        dispatcher.dispatch_created(&mut event);

        // (1 + 1) * 2
        assert_eq!(event.data().get("n"), Some(&json!(4)));
    }

    #[test]
    fn test_encoded_hooks_observe_token() {
        let dispatcher = HookDispatcher::new();
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        dispatcher.subscribe_encoded("audit", DEFAULT_PRIORITY, move |event| {
            *sink.lock() = Some(event.token().to_string());
        });

        dispatcher.dispatch_encoded(&JwtEncodedEvent::new("t.o.k".to_string()));

        assert_eq!(seen.lock().as_deref(), Some("t.o.k"));
    }

    #[test]
    fn test_hook_may_subscribe_during_dispatch() {
        let dispatcher = Arc::new(HookDispatcher::new());
        let inner = Arc::clone(&dispatcher);
        dispatcher.subscribe_decoded("registrar", 0, move |_event| {
            inner.subscribe_decoded("late", 0, |_event| {});
        });

        dispatcher.dispatch_decoded(&mut JwtDecodedEvent::new(ClaimPayload::new()));

        assert_eq!(dispatcher.listener_count(Channel::Decoded), 2);
    }

    #[test]
    fn test_unsubscribe_and_counts() {
        let dispatcher = HookDispatcher::new();
        assert!(!dispatcher.has_listeners(Channel::Created));

        dispatcher.subscribe_created("a", 0, |_event| {});
        dispatcher.subscribe_created("a", 3, |_event| {});
        dispatcher.subscribe_encoded("b", 0, |_event| {});

        assert_eq!(dispatcher.listener_count(Channel::Created), 2);
        assert!(dispatcher.has_listeners(Channel::Encoded));
        assert!(!dispatcher.has_listeners(Channel::Decoded));

        assert_eq!(dispatcher.unsubscribe(Channel::Created, "a"), 2);
        assert_eq!(dispatcher.unsubscribe(Channel::Created, "missing"), 0);
        assert!(!dispatcher.has_listeners(Channel::Created));
    }
}
