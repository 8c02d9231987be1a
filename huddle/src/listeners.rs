//! Listener registry backing [`CallSession::add_listener`](crate::session::CallSession::add_listener).
use std::collections::HashMap;

use crate::session::{SessionEvent, SessionEventKind};
use crate::sync::*;

/// Callback invoked with every event of the kind it was registered for
pub type Listener = Box<dyn Fn(&SessionEvent) + Sync + Send>;

/// Lists every listener registered against a session
#[derive(Default, Clone)]
pub struct Listeners {
    /// A map of event kinds with an array of executable functions
    subscribers: Arc<Mutex<HashMap<SessionEventKind, Vec<Listener>>>>,
}

impl Listeners {
    pub fn new() -> Self {
        Listeners::default()
    }

    /// Subscribe to events of a given kind
    ///
    /// # Examples
    ///
    /// ```
    /// use huddle::listeners::Listeners;
    /// use huddle::session::{PeerId, SessionEvent, SessionEventKind};
    ///
    /// let listeners = Listeners::new();
    /// listeners.subscribe(SessionEventKind::UserJoined, |event| {
    ///     assert!(matches!(event, SessionEvent::UserJoined { .. }));
    /// });
    /// let delivered = listeners.trigger(&SessionEvent::UserJoined { uid: PeerId::new(1), elapsed: 0 });
    /// assert_eq!(delivered, 1);
    /// ```
    pub fn subscribe<C>(&self, kind: SessionEventKind, f: C)
    where
        C: 'static + Fn(&SessionEvent) + Sync + Send,
    {
        self.subscribe_boxed(kind, Box::new(f));
    }

    pub fn subscribe_boxed(&self, kind: SessionEventKind, f: Listener) {
        self.subscribers.lock().entry(kind).or_default().push(f);
    }

    /// Trigger an event to all of its subscribers, returning how many were called.
    ///
    /// Listeners run while the registry is locked and must not subscribe from inside the callback.
    pub fn trigger(&self, event: &SessionEvent) -> usize {
        self.trigger_as(event.kind(), event)
    }

    /// Delivers `event` to the listeners of `kind`, whether or not the payload matches it.
    /// Mirrors collaborators that dispatch untyped payloads by event name.
    pub fn trigger_as(&self, kind: SessionEventKind, event: &SessionEvent) -> usize {
        let subscribers = self.subscribers.lock();
        match subscribers.get(&kind) {
            Some(list) => {
                for subscriber in list {
                    subscriber(event);
                }
                list.len()
            }
            None => 0,
        }
    }

    pub fn count(&self, kind: SessionEventKind) -> usize {
        self.subscribers
            .lock()
            .get(&kind)
            .map(Vec::len)
            .unwrap_or_default()
    }
}
