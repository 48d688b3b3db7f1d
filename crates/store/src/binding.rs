//! Binds a view to the store without the view knowing the store's shape.
//!
//! A view declares two typed mappings:
//! - a *selection* (field name -> selector), via [`select_state!`], and
//! - a set of *bound actions* (method name -> action creator), via
//!   [`bind_actions!`].
//!
//! [`Binding::render`] then yields a [`Bound`] pair whose `state` and
//! `actions` keep the same `Arc` across renders for as long as the selected
//! values compare equal. Consumers can therefore use `Arc::ptr_eq` as a cheap
//! "did anything I care about change" test.
//!
//! Selectors are called as-is. A selector that panics (for example because it
//! expects data that has not been loaded yet) panics the caller.

use std::sync::Arc;

use crate::reducer::Reducer;
use crate::state::RootState;
use crate::store::Store;

/// A value projected out of store state.
pub trait Select<S>: PartialEq + Sized {
    fn select(state: &S) -> Self;
}

impl<S> Select<S> for () {
    fn select(_state: &S) -> Self {}
}

/// A set of action creators bound to a store's dispatch.
pub trait BindActions<S: Reducer>: Sized {
    fn bind(dispatch: Dispatch<S>) -> Self;
}

impl<S: Reducer> BindActions<S> for () {
    fn bind(_dispatch: Dispatch<S>) -> Self {}
}

/// Cloneable handle to a store's dispatch function.
pub struct Dispatch<S: Reducer = RootState> {
    store: Arc<Store<S>>,
}

impl<S: Reducer> Clone for Dispatch<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: Reducer> std::fmt::Debug for Dispatch<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatch").finish_non_exhaustive()
    }
}

impl<S: Reducer> Dispatch<S> {
    pub fn new(store: Arc<Store<S>>) -> Self {
        Self { store }
    }

    pub fn dispatch(&self, action: impl Into<S::Action>) {
        self.store.dispatch(action.into());
    }
}

/// Output of one [`Binding::render`] call.
#[derive(Debug)]
pub struct Bound<V, A> {
    pub state: Arc<V>,
    pub actions: Arc<A>,
}

impl<V, A> Clone for Bound<V, A> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            actions: self.actions.clone(),
        }
    }
}

impl<V, A> Bound<V, A> {
    /// True when both halves are the very same allocations as `other`'s.
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state) && Arc::ptr_eq(&self.actions, &other.actions)
    }
}

/// Per-view binding instance; keep it for the view's lifetime and call
/// [`Binding::render`] on every render.
pub struct Binding<V, A, S: Reducer = RootState> {
    store: Arc<Store<S>>,
    seen_version: u64,
    state: Arc<V>,
    actions: Arc<A>,
}

impl<V, A, S> Binding<V, A, S>
where
    S: Reducer,
    V: Select<S>,
    A: BindActions<S>,
{
    pub fn new(store: Arc<Store<S>>) -> Self {
        let (version, snapshot) = store.snapshot();
        let state = Arc::new(V::select(&snapshot));
        let actions = Arc::new(A::bind(Dispatch::new(store.clone())));
        Self {
            store,
            seen_version: version,
            state,
            actions,
        }
    }

    /// Re-selects if the store changed since the last render and returns the
    /// (possibly unchanged) bound pair.
    pub fn render(&mut self) -> Bound<V, A> {
        let (version, snapshot) = self.store.snapshot();
        if version != self.seen_version {
            let next = V::select(&snapshot);
            if next != *self.state {
                self.state = Arc::new(next);
            }
            self.seen_version = version;
        }
        Bound {
            state: self.state.clone(),
            actions: self.actions.clone(),
        }
    }

    /// True if the store has moved on since the last render.
    pub fn is_stale(&self) -> bool {
        self.store.version() != self.seen_version
    }
}

/// Declares a selection struct: one field per key, filled by its selector.
///
/// ```
/// use store::{select_state, selectors, ThemeMode, RootState};
///
/// select_state! {
///     pub struct ThemeView for RootState {
///         pub mode: ThemeMode = selectors::select_theme_mode,
///         pub is_rtl: bool = selectors::select_is_rtl,
///     }
/// }
/// ```
#[macro_export]
macro_rules! select_state {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident for $state:ty {
            $( $(#[$fmeta:meta])* $fvis:vis $field:ident : $ty:ty = $selector:expr ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        $vis struct $name {
            $( $(#[$fmeta])* $fvis $field: $ty, )*
        }

        impl $crate::binding::Select<$state> for $name {
            #[allow(unused_variables)]
            fn select(state: &$state) -> Self {
                Self {
                    $( $field: ($selector)(state), )*
                }
            }
        }
    };
}

/// Declares a bound-actions struct: one method per key, each invoking its
/// action creator and dispatching the result.
///
/// ```
/// use store::{bind_actions, action, ThemeMode, RootState};
///
/// bind_actions! {
///     pub struct ThemeActions for RootState {
///         pub fn set_mode(mode: ThemeMode) = action::set_theme_mode;
///     }
/// }
/// ```
#[macro_export]
macro_rules! bind_actions {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident for $state:ty {
            $( $(#[$fmeta:meta])* $fvis:vis fn $method:ident ( $( $arg:ident : $argty:ty ),* $(,)? ) = $creator:expr ; )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        $vis struct $name {
            dispatch: $crate::binding::Dispatch<$state>,
        }

        impl $crate::binding::BindActions<$state> for $name {
            fn bind(dispatch: $crate::binding::Dispatch<$state>) -> Self {
                Self { dispatch }
            }
        }

        impl $name {
            $(
                $(#[$fmeta])*
                $fvis fn $method(&self, $( $arg: $argty ),*) {
                    self.dispatch.dispatch(($creator)($( $arg ),*));
                }
            )*
        }
    };
}
