use std::sync::Arc;

use tracing::{info, warn};

use crate::persist::{PersistConfig, Persistor, StorageBackend};
use crate::state::RootState;
use crate::store::Store;

/// The root store plus its persistor, when persistence is active.
#[derive(Debug)]
pub struct ConfiguredStore {
    pub store: Arc<Store<RootState>>,
    pub persistor: Option<Persistor>,
}

impl ConfiguredStore {
    pub fn is_persisted(&self) -> bool {
        self.persistor.is_some()
    }
}

/// Builds the root store. The storage backend is chosen by the host at
/// startup; without one the store runs unpersisted.
#[derive(Default)]
pub struct StoreBuilder {
    storage: Option<Arc<dyn StorageBackend>>,
    config: PersistConfig,
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn storage(mut self, storage: Arc<dyn StorageBackend>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn persist_config(mut self, config: PersistConfig) -> Self {
        self.config = config;
        self
    }

    /// Rehydrates from storage before returning. A rehydration failure is
    /// logged and yields a fresh, unpersisted store.
    pub fn build(self) -> ConfiguredStore {
        let Some(storage) = self.storage else {
            return ConfiguredStore {
                store: Arc::new(Store::default()),
                persistor: None,
            };
        };

        let initial = match Persistor::load(storage.as_ref(), &self.config) {
            Ok(Some(state)) => {
                info!(key = %self.config.storage_key(), "store rehydration completed");
                state
            }
            Ok(None) => RootState::default(),
            Err(err) => {
                warn!(error = %err, "failed to set up store persistence, using unpersisted store");
                return ConfiguredStore {
                    store: Arc::new(Store::default()),
                    persistor: None,
                };
            }
        };

        let store = Arc::new(Store::new(initial));
        let persistor = Persistor::attach(&store, storage, self.config);
        ConfiguredStore {
            store,
            persistor: Some(persistor),
        }
    }
}
