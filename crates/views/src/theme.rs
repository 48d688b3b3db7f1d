//! Palette and layout direction derived from the persisted theme slice.

use std::sync::Arc;

use serde::Serialize;
use store::{Binding, Direction, RootState, Store, ThemeMode, action, bind_actions, select_state, selectors};

select_state! {
    pub struct ThemeSelection for RootState {
        pub mode: ThemeMode = selectors::select_theme_mode,
        pub direction: Direction = selectors::select_theme_direction,
        pub is_rtl: bool = selectors::select_is_rtl,
    }
}

bind_actions! {
    pub struct ThemeActions for RootState {
        pub fn set_mode(mode: ThemeMode) = action::set_theme_mode;
        pub fn set_direction(direction: Direction) = action::set_theme_direction;
        pub fn toggle_mode(current: ThemeMode) = action::toggle_theme_mode;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColorSet {
    pub main: &'static str,
    pub light: &'static str,
    pub dark: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contrast_text: Option<&'static str>,
}

const fn colors(main: &'static str, light: &'static str, dark: &'static str) -> ColorSet {
    ColorSet {
        main,
        light,
        dark,
        contrast_text: None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub mode: ThemeMode,
    pub primary: ColorSet,
    pub secondary: ColorSet,
    pub error: ColorSet,
    pub success: ColorSet,
    pub warning: ColorSet,
    pub info: ColorSet,
    pub background_default: &'static str,
    pub background_paper: &'static str,
    pub text_primary: &'static str,
    pub text_secondary: &'static str,
}

impl Palette {
    pub fn for_mode(mode: ThemeMode) -> Self {
        let light = mode == ThemeMode::Light;
        Self {
            mode,
            primary: ColorSet {
                contrast_text: Some("#000000"),
                ..colors("#dab23b", "#e3ce5c", "#a78e26")
            },
            secondary: ColorSet {
                contrast_text: Some("#FFFFFF"),
                ..colors("#000000", "#333333", "#111111")
            },
            error: colors("#FF6B6B", "#FF8E8E", "#E55555"),
            success: colors("#51CF66", "#69DB7C", "#40C057"),
            warning: colors("#FFD43B", "#FFE066", "#FCC419"),
            info: colors("#74C0FC", "#91D5FF", "#4DABF7"),
            background_default: if light { "#FFFFFF" } else { "#1A1A1A" },
            background_paper: if light { "#FAFAF5" } else { "#2A2A2A" },
            text_primary: if light { "#000000" } else { "#FFFFFF" },
            text_secondary: if light { "#555555" } else { "#DDDDDD" },
        }
    }
}

/// Style cache key; RTL layouts use a separately keyed cache.
pub fn cache_key(direction: Direction) -> &'static str {
    match direction {
        Direction::Ltr => "muiltr",
        Direction::Rtl => "muirtl",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppTheme {
    pub palette: Palette,
    pub direction: Direction,
    pub cache_key: &'static str,
}

impl AppTheme {
    pub fn new(mode: ThemeMode, direction: Direction) -> Self {
        Self {
            palette: Palette::for_mode(mode),
            direction,
            cache_key: cache_key(direction),
        }
    }
}

/// Rebuilds the theme only when the selected theme slice changes.
pub struct ThemeController {
    binding: Binding<ThemeSelection, ThemeActions>,
    built: Option<(Arc<ThemeSelection>, Arc<AppTheme>)>,
}

impl ThemeController {
    pub fn new(store: Arc<Store<RootState>>) -> Self {
        Self {
            binding: Binding::new(store),
            built: None,
        }
    }

    pub fn theme(&mut self) -> Arc<AppTheme> {
        let bound = self.binding.render();
        if let Some((selection, theme)) = &self.built {
            if Arc::ptr_eq(selection, &bound.state) {
                return theme.clone();
            }
        }
        let theme = Arc::new(AppTheme::new(bound.state.mode, bound.state.direction));
        self.built = Some((bound.state, theme.clone()));
        theme
    }

    pub fn actions(&mut self) -> Arc<ThemeActions> {
        self.binding.render().actions
    }

    pub fn toggle_mode(&mut self) {
        let bound = self.binding.render();
        bound.actions.toggle_mode(bound.state.mode);
    }
}
