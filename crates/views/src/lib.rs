pub mod error;
pub mod geoserver_user;
pub mod layers_list;
pub mod map;
pub mod notice;
pub mod routes;
pub mod scope;
pub mod session;
pub mod theme;
pub mod upload;

#[cfg(test)]
pub(crate) mod fake;

pub use error::ViewError;
pub use geoserver_user::GeoServerUserView;
pub use layers_list::{LayerListView, Row};
pub use map::MapView;
pub use notice::{Notice, NoticeSlot, Severity};
pub use routes::{Route, RouteError};
pub use scope::{Cancelled, ViewScope};
pub use session::{SessionActions, SessionSelection, SessionView};
pub use theme::{AppTheme, Palette, ThemeActions, ThemeController, ThemeSelection};
pub use upload::{FileState, UploadView, UploadedFile};
