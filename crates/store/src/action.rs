use crate::state::{Direction, ThemeMode, User};

#[derive(Debug, Clone, PartialEq)]
pub enum UserAction {
    SetUser(Option<User>),
    SetToken(Option<String>),
    Login { token: String, user: User },
    Logout,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ThemeAction {
    SetMode(ThemeMode),
    SetDirection(Direction),
}

/// Every action the root store understands.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    User(UserAction),
    Theme(ThemeAction),
}

impl Action {
    /// Stable type tag, used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::User(UserAction::SetUser(_)) => "app/setUser",
            Action::User(UserAction::SetToken(_)) => "app/setToken",
            Action::User(UserAction::Login { .. }) => "app/login",
            Action::User(UserAction::Logout) => "app/logout",
            Action::Theme(ThemeAction::SetMode(_)) => "app/setThemeMode",
            Action::Theme(ThemeAction::SetDirection(_)) => "app/setThemeDirection",
        }
    }
}

impl From<UserAction> for Action {
    fn from(action: UserAction) -> Self {
        Action::User(action)
    }
}

impl From<ThemeAction> for Action {
    fn from(action: ThemeAction) -> Self {
        Action::Theme(action)
    }
}

pub fn set_user(user: Option<User>) -> Action {
    UserAction::SetUser(user).into()
}

pub fn set_token(token: Option<String>) -> Action {
    UserAction::SetToken(token).into()
}

pub fn login(token: String, user: User) -> Action {
    UserAction::Login { token, user }.into()
}

pub fn logout() -> Action {
    UserAction::Logout.into()
}

pub fn clear_user() -> Action {
    set_user(None)
}

/// Replaces the stored user wholesale with the updated profile.
pub fn update_user_profile(user: User) -> Action {
    set_user(Some(user))
}

pub fn set_theme_mode(mode: ThemeMode) -> Action {
    ThemeAction::SetMode(mode).into()
}

pub fn set_theme_direction(direction: Direction) -> Action {
    ThemeAction::SetDirection(direction).into()
}

pub fn toggle_theme_mode(current: ThemeMode) -> Action {
    set_theme_mode(current.toggled())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creators_build_tagged_actions() {
        assert_eq!(clear_user().kind(), "app/setUser");
        assert_eq!(
            toggle_theme_mode(ThemeMode::Light),
            Action::Theme(ThemeAction::SetMode(ThemeMode::Dark))
        );
    }
}
