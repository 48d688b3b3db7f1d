use std::sync::Arc;

use store::selectors::{self, UserProfile};
use store::{Binding, Bound, RootState, Store, User, action, bind_actions, select_state};

select_state! {
    /// What the header shows about the signed-in user.
    pub struct SessionSelection for RootState {
        pub is_authenticated: bool = selectors::select_is_authenticated,
        pub loading: bool = selectors::select_user_loading,
        pub profile: Option<UserProfile> = selectors::select_user_profile,
    }
}

bind_actions! {
    pub struct SessionActions for RootState {
        pub fn set_user(user: Option<User>) = action::set_user;
        pub fn update_profile(user: User) = action::update_user_profile;
        pub fn clear_user() = action::clear_user;
        pub fn logout() = action::logout;
    }
}

/// Session panel bound to the user slice.
pub struct SessionView {
    binding: Binding<SessionSelection, SessionActions>,
}

impl SessionView {
    pub fn new(store: Arc<Store<RootState>>) -> Self {
        Self {
            binding: Binding::new(store),
        }
    }

    pub fn render(&mut self) -> Bound<SessionSelection, SessionActions> {
        self.binding.render()
    }

    pub fn display_name(&mut self) -> Option<String> {
        let profile = self.render().state.profile.clone()?;
        Some(match (profile.first_name, profile.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first,
            _ => profile.username,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn login_and_logout_flow_through_the_binding() {
        let store = Arc::new(Store::<RootState>::default());
        let mut session = SessionView::new(store.clone());
        assert!(!session.render().state.is_authenticated);
        assert!(session.render().state.loading);

        let mut user = User::new("3", "ana");
        user.first_name = Some("Ana".to_string());
        store.dispatch(action::login("jwt".to_string(), user));

        let bound = session.render();
        assert!(bound.state.is_authenticated);
        assert_eq!(session.display_name().as_deref(), Some("Ana"));

        bound.actions.logout();
        assert!(!session.render().state.is_authenticated);
        assert_eq!(session.display_name(), None);
    }

    #[test]
    fn unchanged_state_keeps_allocations() {
        let store = Arc::new(Store::<RootState>::default());
        let mut session = SessionView::new(store.clone());
        let a = session.render();
        store.dispatch(action::set_theme_mode(store::ThemeMode::Dark));
        let b = session.render();
        assert!(a.same_as(&b));
    }
}
