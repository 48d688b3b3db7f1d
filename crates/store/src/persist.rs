use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::state::RootState;
use crate::store::{Store, Subscription};

pub const PERSIST_KEY: &str = "root";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistError {
    StorageUnavailable,
    Corrupt(String),
    Io(String),
}

impl std::fmt::Display for PersistError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistError::StorageUnavailable => write!(f, "durable storage unavailable"),
            PersistError::Corrupt(msg) => write!(f, "persisted state corrupt: {msg}"),
            PersistError::Io(msg) => write!(f, "persisted state storage error: {msg}"),
        }
    }
}

impl std::error::Error for PersistError {}

/// String key/value storage, shaped after browser `localStorage`.
pub trait StorageBackend: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, PersistError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), PersistError>;
    fn remove_item(&self, key: &str) -> Result<(), PersistError>;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.items.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), PersistError> {
        self.items.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), PersistError> {
        self.items.lock().remove(key);
        Ok(())
    }
}

/// Durable storage backed by a single JSON object on disk.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, PersistError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(BTreeMap::new());
            }
            Err(err) => return Err(PersistError::Io(format!("read {:?}: {err}", self.path))),
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|e| PersistError::Corrupt(e.to_string()))
    }

    fn write_all(&self, items: &BTreeMap<String, String>) -> Result<(), PersistError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| PersistError::Io(format!("create {parent:?}: {e}")))?;
            }
        }
        let raw = serde_json::to_string_pretty(items).map_err(|e| PersistError::Io(e.to_string()))?;
        // Written to a sibling file first, then renamed over the target.
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, raw).map_err(|e| PersistError::Io(format!("write {tmp:?}: {e}")))?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| PersistError::Io(format!("rename {tmp:?}: {e}")))
    }
}

impl StorageBackend for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, PersistError> {
        let _guard = self.lock.lock();
        Ok(self.read_all()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), PersistError> {
        let _guard = self.lock.lock();
        let mut items = self.read_all()?;
        items.insert(key.to_string(), value.to_string());
        self.write_all(&items)
    }

    fn remove_item(&self, key: &str) -> Result<(), PersistError> {
        let _guard = self.lock.lock();
        let mut items = self.read_all()?;
        if items.remove(key).is_some() {
            self.write_all(&items)?;
        }
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
mod wasm_storage {
    use super::{PersistError, StorageBackend};

    /// Browser `localStorage`.
    #[derive(Debug, Default)]
    pub struct LocalStorage;

    impl LocalStorage {
        pub fn new() -> Result<Self, PersistError> {
            window_local_storage()?;
            Ok(Self)
        }
    }

    impl StorageBackend for LocalStorage {
        fn get_item(&self, key: &str) -> Result<Option<String>, PersistError> {
            window_local_storage()?
                .get_item(key)
                .map_err(|e| PersistError::Io(format!("get_item failed: {:?}", e)))
        }

        fn set_item(&self, key: &str, value: &str) -> Result<(), PersistError> {
            window_local_storage()?
                .set_item(key, value)
                .map_err(|e| PersistError::Io(format!("set_item failed: {:?}", e)))
        }

        fn remove_item(&self, key: &str) -> Result<(), PersistError> {
            window_local_storage()?
                .remove_item(key)
                .map_err(|e| PersistError::Io(format!("remove_item failed: {:?}", e)))
        }
    }

    fn window_local_storage() -> Result<web_sys::Storage, PersistError> {
        let win = web_sys::window().ok_or(PersistError::StorageUnavailable)?;
        win.local_storage()
            .map_err(|e| PersistError::Io(format!("localStorage error: {:?}", e)))?
            .ok_or(PersistError::StorageUnavailable)
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm_storage::LocalStorage;

#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug)]
pub struct LocalStorage;

#[cfg(not(target_arch = "wasm32"))]
impl LocalStorage {
    pub fn new() -> Result<Self, PersistError> {
        Err(PersistError::StorageUnavailable)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl StorageBackend for LocalStorage {
    fn get_item(&self, _key: &str) -> Result<Option<String>, PersistError> {
        Err(PersistError::StorageUnavailable)
    }

    fn set_item(&self, _key: &str, _value: &str) -> Result<(), PersistError> {
        Err(PersistError::StorageUnavailable)
    }

    fn remove_item(&self, _key: &str) -> Result<(), PersistError> {
        Err(PersistError::StorageUnavailable)
    }
}

/// A persistable partition of [`RootState`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Slice {
    User,
    Theme,
}

impl Slice {
    pub const ALL: [Slice; 2] = [Slice::User, Slice::Theme];

    pub fn key(self) -> &'static str {
        match self {
            Slice::User => "user",
            Slice::Theme => "theme",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistConfig {
    pub key: String,
    pub whitelist: Vec<Slice>,
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self {
            key: PERSIST_KEY.to_string(),
            whitelist: Slice::ALL.to_vec(),
        }
    }
}

impl PersistConfig {
    pub fn storage_key(&self) -> String {
        format!("persist:{}", self.key)
    }
}

/// Serializes the whitelisted slices as one JSON object, slice name -> value.
pub fn dehydrate(state: &RootState, whitelist: &[Slice]) -> Result<String, PersistError> {
    let mut out = Map::new();
    for slice in whitelist {
        let value = match slice {
            Slice::User => serde_json::to_value(&state.user),
            Slice::Theme => serde_json::to_value(state.theme),
        }
        .map_err(|e| PersistError::Io(e.to_string()))?;
        out.insert(slice.key().to_string(), value);
    }
    serde_json::to_string(&Value::Object(out)).map_err(|e| PersistError::Io(e.to_string()))
}

/// Replaces each whitelisted slice present in `raw` wholesale. Slices not in
/// the payload keep their value from `base`.
pub fn rehydrate(base: &RootState, raw: &str, whitelist: &[Slice]) -> Result<RootState, PersistError> {
    let stored: Map<String, Value> =
        serde_json::from_str(raw).map_err(|e| PersistError::Corrupt(e.to_string()))?;
    let mut state = base.clone();
    for slice in whitelist {
        let Some(value) = stored.get(slice.key()) else {
            continue;
        };
        match slice {
            Slice::User => {
                state.user = serde_json::from_value(value.clone())
                    .map_err(|e| PersistError::Corrupt(format!("user: {e}")))?;
            }
            Slice::Theme => {
                state.theme = serde_json::from_value(value.clone())
                    .map_err(|e| PersistError::Corrupt(format!("theme: {e}")))?;
            }
        }
    }
    Ok(state)
}

/// Loads persisted slices at startup and writes them back on every change.
pub struct Persistor {
    storage: Arc<dyn StorageBackend>,
    config: PersistConfig,
    _subscription: Subscription<RootState>,
}

impl std::fmt::Debug for Persistor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persistor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Persistor {
    /// Reads the stored state, if any. `Ok(None)` means nothing was stored.
    pub fn load(
        storage: &dyn StorageBackend,
        config: &PersistConfig,
    ) -> Result<Option<RootState>, PersistError> {
        let Some(raw) = storage.get_item(&config.storage_key())? else {
            return Ok(None);
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }
        rehydrate(&RootState::default(), &raw, &config.whitelist).map(Some)
    }

    /// Starts writing the whitelisted slices to `storage` on each state change.
    ///
    /// Writes are serialized and always take the store's latest snapshot, so
    /// a slow write can never land after a newer one.
    pub fn attach(
        store: &Arc<Store<RootState>>,
        storage: Arc<dyn StorageBackend>,
        config: PersistConfig,
    ) -> Self {
        let sink = storage.clone();
        let key = config.storage_key();
        let whitelist = config.whitelist.clone();
        let source = Arc::downgrade(store);
        let written = Mutex::new(store.version());
        let subscription = store.subscribe(move |_| {
            let Some(store) = source.upgrade() else {
                return;
            };
            let mut last = written.lock();
            let (version, state) = store.snapshot();
            if version <= *last {
                debug!(key = %key, version, "persisted state already current");
                return;
            }
            let result = dehydrate(&state, &whitelist).and_then(|raw| sink.set_item(&key, &raw));
            match result {
                Ok(()) => {
                    *last = version;
                    debug!(key = %key, version, "persisted store state");
                }
                Err(err) => warn!(key = %key, error = %err, "failed to persist store state"),
            }
        });
        Self {
            storage,
            config,
            _subscription: subscription,
        }
    }

    /// Drops the persisted payload. The in-memory store is left untouched.
    pub fn purge(&self) -> Result<(), PersistError> {
        self.storage.remove_item(&self.config.storage_key())
    }

    pub fn config(&self) -> &PersistConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action;
    use crate::reducer::Reducer;
    use crate::state::{Direction, ThemeMode, User};
    use pretty_assertions::assert_eq;

    fn sample_state() -> RootState {
        let mut user = User::new("12", "ana");
        user.email = Some("ana@example.org".to_string());
        RootState::default()
            .reduce(&action::login("tok".into(), user))
            .reduce(&action::set_theme_mode(ThemeMode::Dark))
            .reduce(&action::set_theme_direction(Direction::Rtl))
    }

    #[test]
    fn round_trip_is_identity() {
        let state = sample_state();
        let raw = dehydrate(&state, &Slice::ALL).unwrap();
        let back = rehydrate(&RootState::default(), &raw, &Slice::ALL).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn whitelist_limits_what_is_written_and_read() {
        let state = sample_state();
        let raw = dehydrate(&state, &[Slice::Theme]).unwrap();
        let json: Value = serde_json::from_str(&raw).unwrap();
        assert!(json.get("user").is_none());

        let back = rehydrate(&RootState::default(), &raw, &Slice::ALL).unwrap();
        assert_eq!(back.theme, state.theme);
        assert_eq!(back.user, RootState::default().user);
    }

    #[test]
    fn corrupt_payload_is_reported() {
        let err = rehydrate(&RootState::default(), "{\"theme\": 3}", &Slice::ALL).unwrap_err();
        assert!(matches!(err, PersistError::Corrupt(_)));
        let err = rehydrate(&RootState::default(), "not json", &Slice::ALL).unwrap_err();
        assert!(matches!(err, PersistError::Corrupt(_)));
    }

    #[test]
    fn attached_persistor_writes_on_change() {
        let storage: Arc<dyn StorageBackend> = Arc::new(MemoryStorage::new());
        let store = Arc::new(Store::<RootState>::default());
        let persistor = Persistor::attach(&store, storage.clone(), PersistConfig::default());

        assert!(Persistor::load(storage.as_ref(), persistor.config()).unwrap().is_none());

        store.dispatch(action::set_theme_mode(ThemeMode::Dark));
        let loaded = Persistor::load(storage.as_ref(), persistor.config()).unwrap().unwrap();
        assert_eq!(loaded.theme.mode, ThemeMode::Dark);

        persistor.purge().unwrap();
        assert!(Persistor::load(storage.as_ref(), persistor.config()).unwrap().is_none());
    }

    #[test]
    fn file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("store.json");

        let storage = FileStorage::new(&path);
        storage.set_item("persist:root", "{\"theme\":{\"mode\":\"dark\",\"direction\":\"ltr\"}}").unwrap();
        storage.set_item("other", "x").unwrap();
        storage.remove_item("other").unwrap();

        let reopened = FileStorage::new(&path);
        assert!(reopened.get_item("other").unwrap().is_none());
        let state = Persistor::load(&reopened, &PersistConfig::default()).unwrap().unwrap();
        assert_eq!(state.theme.mode, ThemeMode::Dark);
    }

    /// Holds the first write long enough for a later dispatch to overtake it.
    struct SlowFirstWrite {
        inner: MemoryStorage,
        writes: std::sync::atomic::AtomicUsize,
    }

    impl StorageBackend for SlowFirstWrite {
        fn get_item(&self, key: &str) -> Result<Option<String>, PersistError> {
            self.inner.get_item(key)
        }

        fn set_item(&self, key: &str, value: &str) -> Result<(), PersistError> {
            let n = self.writes.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if n == 0 {
                std::thread::sleep(std::time::Duration::from_millis(200));
            }
            self.inner.set_item(key, value)
        }

        fn remove_item(&self, key: &str) -> Result<(), PersistError> {
            self.inner.remove_item(key)
        }
    }

    #[test]
    fn concurrent_dispatches_persist_the_latest_state() {
        let storage = Arc::new(SlowFirstWrite {
            inner: MemoryStorage::new(),
            writes: Default::default(),
        });
        let store = Arc::new(Store::<RootState>::default());
        let config = PersistConfig::default();
        let _persistor = Persistor::attach(&store, storage.clone(), config.clone());

        let background = store.clone();
        let dark = std::thread::spawn(move || {
            background.dispatch(action::set_theme_mode(ThemeMode::Dark));
        });
        std::thread::sleep(std::time::Duration::from_millis(50));
        store.dispatch(action::set_theme_mode(ThemeMode::Light));
        dark.join().unwrap();

        let persisted = Persistor::load(storage.as_ref(), &config).unwrap().unwrap();
        assert_eq!(persisted.theme, store.get_state().theme);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn local_storage_is_unavailable_off_browser() {
        assert_eq!(LocalStorage::new().unwrap_err(), PersistError::StorageUnavailable);
    }
}
