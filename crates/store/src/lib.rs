pub mod action;
pub mod binding;
pub mod builder;
pub mod persist;
pub mod reducer;
pub mod selectors;
pub mod state;
pub mod store;

// Store crate: state slices, pure reducers, and explicit persistence.
pub use action::{Action, ThemeAction, UserAction};
pub use binding::{BindActions, Binding, Bound, Dispatch, Select};
pub use builder::{ConfiguredStore, StoreBuilder};
pub use persist::{
    FileStorage, LocalStorage, MemoryStorage, PersistConfig, PersistError, Persistor, Slice,
    StorageBackend,
};
pub use reducer::Reducer;
pub use state::*;
pub use store::{Store, Subscription};
