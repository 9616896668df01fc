//! Subscribers - registry of non-owning sink handles

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use contracts::BulkSink;
use tracing::{debug, trace};

type Entry = Weak<dyn BulkSink>;

/// Identity of a sink: the address of its allocation, metadata stripped
fn address<T: ?Sized>(ptr: *const T) -> *const () {
    ptr as *const ()
}

/// Live sinks taken at the start of one fan-out pass
pub struct Snapshot {
    /// Strong references, in subscription order
    pub live: Vec<Arc<dyn BulkSink>>,
    /// Entries pruned because their sink was released
    pub released: usize,
}

/// Shared registry of subscribed sinks.
///
/// Holds `Weak` handles only: a sink stays alive as long as its owner keeps
/// the `Arc`. Cloning the registry yields another handle to the same set, so
/// a sink can keep one and (un)subscribe from inside its own `write`.
#[derive(Clone, Default)]
pub struct Subscribers {
    entries: Arc<Mutex<Vec<Entry>>>,
}

impl Subscribers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a sink. Returns `false` if it is already subscribed.
    pub fn subscribe<S: BulkSink + 'static>(&self, sink: &Arc<S>) -> bool {
        let weak: Weak<S> = Arc::downgrade(sink);
        self.insert(weak)
    }

    /// Subscribe a type-erased sink. Returns `false` if it is already subscribed.
    pub fn subscribe_shared(&self, sink: &Arc<dyn BulkSink>) -> bool {
        self.insert(Arc::downgrade(sink))
    }

    /// Remove a sink. Returns `false` if it was not subscribed.
    pub fn unsubscribe<S: BulkSink + ?Sized>(&self, sink: &Arc<S>) -> bool {
        let target = address(Arc::as_ptr(sink));
        let mut entries = self.lock();
        match entries
            .iter()
            .position(|entry| address(entry.as_ptr()) == target)
        {
            Some(index) => {
                entries.remove(index);
                debug!(sink = %sink.name(), "Unsubscribed");
                true
            }
            None => false,
        }
    }

    /// Whether `sink` is currently subscribed
    pub fn contains<S: BulkSink + ?Sized>(&self, sink: &Arc<S>) -> bool {
        let target = address(Arc::as_ptr(sink));
        self.lock()
            .iter()
            .any(|entry| address(entry.as_ptr()) == target)
    }

    /// Number of subscribers whose sink is still alive
    pub fn len(&self) -> usize {
        self.lock()
            .iter()
            .filter(|entry| entry.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Upgrade every live entry and drop the dead ones.
    ///
    /// The lock is released before this returns, so sinks invoked from the
    /// snapshot may freely modify the registry; those changes apply from the
    /// next pass on.
    pub fn snapshot(&self) -> Snapshot {
        let mut entries = self.lock();
        let before = entries.len();
        let mut live = Vec::with_capacity(before);
        entries.retain(|entry| match entry.upgrade() {
            Some(sink) => {
                live.push(sink);
                true
            }
            None => false,
        });
        let released = before - entries.len();
        if released > 0 {
            trace!(released, "Pruned released subscribers");
        }
        Snapshot { live, released }
    }

    fn insert(&self, weak: Entry) -> bool {
        let target = address(weak.as_ptr());
        let mut entries = self.lock();
        entries.retain(|entry| entry.strong_count() > 0);
        if entries
            .iter()
            .any(|entry| address(entry.as_ptr()) == target)
        {
            return false;
        }
        entries.push(weak);
        true
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
