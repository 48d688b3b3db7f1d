use crate::action::{Action, ThemeAction, UserAction};
use crate::state::{RootState, ThemeState, UserState};

/// State that can be driven by a store.
///
/// `reduce` must be pure: same state and action, same result.
pub trait Reducer: Clone + PartialEq + Send + Sync + 'static {
    type Action: Send + 'static;

    fn reduce(&self, action: &Self::Action) -> Self;
}

pub fn user_reducer(state: &UserState, action: &UserAction) -> UserState {
    match action {
        UserAction::SetUser(user) => UserState {
            user: user.clone(),
            ..state.clone()
        },
        UserAction::SetToken(token) => UserState {
            token: token.clone(),
            ..state.clone()
        },
        UserAction::Login { token, user } => UserState {
            user: Some(user.clone()),
            token: Some(token.clone()),
            loading: false,
            is_authenticated: true,
        },
        UserAction::Logout => UserState {
            user: None,
            token: None,
            loading: false,
            is_authenticated: false,
        },
    }
}

pub fn theme_reducer(state: &ThemeState, action: &ThemeAction) -> ThemeState {
    match *action {
        ThemeAction::SetMode(mode) => ThemeState { mode, ..*state },
        ThemeAction::SetDirection(direction) => ThemeState { direction, ..*state },
    }
}

impl Reducer for RootState {
    type Action = Action;

    fn reduce(&self, action: &Action) -> Self {
        match action {
            Action::User(a) => RootState {
                user: user_reducer(&self.user, a),
                theme: self.theme,
            },
            Action::Theme(a) => RootState {
                user: self.user.clone(),
                theme: theme_reducer(&self.theme, a),
            },
        }
    }
}
