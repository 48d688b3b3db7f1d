use crate::state::{Direction, RootState, ThemeMode, ThemeState, User, UserState};

pub fn select_user(state: &RootState) -> &UserState {
    &state.user
}

pub fn select_user_data(state: &RootState) -> Option<User> {
    select_user(state).user.clone()
}

pub fn select_user_token(state: &RootState) -> Option<String> {
    select_user(state).token.clone()
}

pub fn select_user_loading(state: &RootState) -> bool {
    select_user(state).loading
}

pub fn select_is_authenticated(state: &RootState) -> bool {
    select_user(state).is_authenticated
}

/// Display subset of the stored user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

pub fn select_user_profile(state: &RootState) -> Option<UserProfile> {
    select_user(state).user.as_ref().map(|u| UserProfile {
        id: u.id.clone(),
        username: u.username.clone(),
        email: u.email.clone(),
        first_name: u.first_name.clone(),
        last_name: u.last_name.clone(),
    })
}

pub fn select_theme(state: &RootState) -> ThemeState {
    state.theme
}

pub fn select_theme_mode(state: &RootState) -> ThemeMode {
    select_theme(state).mode
}

pub fn select_theme_direction(state: &RootState) -> Direction {
    select_theme(state).direction
}

pub fn select_is_dark_theme(state: &RootState) -> bool {
    select_theme_mode(state) == ThemeMode::Dark
}

pub fn select_is_light_theme(state: &RootState) -> bool {
    select_theme_mode(state) == ThemeMode::Light
}

pub fn select_is_rtl(state: &RootState) -> bool {
    select_theme_direction(state) == Direction::Rtl
}

pub fn select_is_ltr(state: &RootState) -> bool {
    select_theme_direction(state) == Direction::Ltr
}

pub fn select_theme_mode_string(state: &RootState) -> &'static str {
    select_theme_mode(state).as_str()
}

pub fn select_theme_direction_string(state: &RootState) -> &'static str {
    select_theme_direction(state).as_str()
}
