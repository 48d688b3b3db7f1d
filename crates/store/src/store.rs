use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use tracing::trace;

use crate::reducer::Reducer;
use crate::state::RootState;

type Listener<S> = Arc<dyn Fn(&S) + Send + Sync>;

#[derive(Debug)]
struct Snapshot<S> {
    version: u64,
    state: Arc<S>,
}

struct Listeners<S> {
    next_id: u64,
    entries: BTreeMap<u64, Listener<S>>,
}

/// Observable single-writer state container.
///
/// All mutation goes through [`Store::dispatch`]; listeners are notified only
/// when a dispatch actually changed the state, after the write lock has been
/// released (so a listener may read or dispatch again).
pub struct Store<S: Reducer = RootState> {
    snapshot: RwLock<Snapshot<S>>,
    listeners: Mutex<Listeners<S>>,
}

impl<S: Reducer> std::fmt::Debug for Store<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("version", &self.version())
            .field("listeners", &self.listeners.lock().entries.len())
            .finish()
    }
}

impl<S: Reducer + Default> Default for Store<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S: Reducer> Store<S> {
    pub fn new(initial: S) -> Self {
        Self {
            snapshot: RwLock::new(Snapshot {
                version: 0,
                state: Arc::new(initial),
            }),
            listeners: Mutex::new(Listeners {
                next_id: 1,
                entries: BTreeMap::new(),
            }),
        }
    }

    pub fn get_state(&self) -> Arc<S> {
        self.snapshot.read().state.clone()
    }

    /// Number of state changes applied so far.
    pub fn version(&self) -> u64 {
        self.snapshot.read().version
    }

    /// Current version and state, read atomically together.
    pub fn snapshot(&self) -> (u64, Arc<S>) {
        let snap = self.snapshot.read();
        (snap.version, snap.state.clone())
    }

    pub fn dispatch(&self, action: S::Action) {
        let changed = {
            let mut snap = self.snapshot.write();
            let next = snap.state.reduce(&action);
            if next == *snap.state {
                None
            } else {
                snap.version += 1;
                snap.state = Arc::new(next);
                Some(snap.state.clone())
            }
        };

        let Some(state) = changed else {
            return;
        };

        let listeners: Vec<Listener<S>> = self.listeners.lock().entries.values().cloned().collect();
        trace!(listeners = listeners.len(), "store state changed");
        for listener in listeners {
            listener(&state);
        }
    }

    /// Registers a change listener. Dropping the returned handle unsubscribes.
    pub fn subscribe(
        self: &Arc<Self>,
        listener: impl Fn(&S) + Send + Sync + 'static,
    ) -> Subscription<S> {
        let mut listeners = self.listeners.lock();
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.insert(id, Arc::new(listener));
        Subscription {
            store: Arc::downgrade(self),
            id,
        }
    }

    fn unsubscribe(&self, id: u64) -> bool {
        self.listeners.lock().entries.remove(&id).is_some()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().entries.len()
    }
}

#[must_use = "dropping a subscription unsubscribes the listener"]
pub struct Subscription<S: Reducer = RootState> {
    store: Weak<Store<S>>,
    id: u64,
}

impl<S: Reducer> Subscription<S> {
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl<S: Reducer> Drop for Subscription<S> {
    fn drop(&mut self) {
        if let Some(store) = self.store.upgrade() {
            store.unsubscribe(self.id);
        }
    }
}
