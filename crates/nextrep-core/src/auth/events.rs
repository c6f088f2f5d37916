use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

type Listener = Arc<dyn Fn() + Send + Sync>;

/// Handle returned by [`SessionEvents::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Registry of session-expired listeners.
///
/// Clones share the same registry. Listeners are invoked synchronously, in
/// registration order, with no lock held while they run.
#[derive(Clone, Default)]
pub struct SessionEvents {
    listeners: Arc<Mutex<Vec<(ListenerId, Listener)>>>,
    next_id: Arc<AtomicU64>,
}

impl SessionEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push((id, Arc::new(listener)));
        id
    }

    /// Returns false if the listener was not registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock().unwrap_or_else(|p| p.into_inner());
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub(crate) fn notify_expired(&self) {
        let snapshot: Vec<Listener> = self
            .listeners
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in snapshot {
            listener();
        }
    }
}

impl std::fmt::Debug for SessionEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionEvents")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_notify_calls_every_listener_once() {
        let events = SessionEvents::new();
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let calls = Arc::clone(&calls);
            events.subscribe(move || {
                calls.fetch_add(1, Ordering::SeqCst);
            });
        }

        events.notify_expired();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_unsubscribe() {
        let events = SessionEvents::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let id = events.subscribe(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(events.unsubscribe(id));
        assert!(!events.unsubscribe(id));
        events.notify_expired();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_listener_may_subscribe_during_notify() {
        let events = SessionEvents::new();
        let inner = events.clone();
        events.subscribe(move || {
            inner.subscribe(|| {});
        });

        events.notify_expired();
        assert_eq!(events.listener_count(), 2);
    }

    #[test]
    fn test_separate_registries_are_isolated() {
        let a = SessionEvents::new();
        let b = SessionEvents::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        a.subscribe(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        b.notify_expired();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
