use std::fmt;
use std::str::FromStr;

use client::ImportId;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "route", rename_all = "snake_case")]
pub enum Route {
    Home,
    Upload,
    Layers,
    Map { layer_id: Option<ImportId> },
    GeoServerUsers,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    UnknownPath(String),
    BadLayerId(String),
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::UnknownPath(p) => write!(f, "no route for {p}"),
            RouteError::BadLayerId(v) => write!(f, "layerId must be an integer, got {v:?}"),
        }
    }
}

impl std::error::Error for RouteError {}

impl FromStr for Route {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (path, query) = s.split_once('?').unwrap_or((s, ""));
        let path = match path.trim_end_matches('/') {
            "" => "/",
            p => p,
        };
        match path {
            "/" => Ok(Route::Home),
            "/upload" => Ok(Route::Upload),
            "/layers" => Ok(Route::Layers),
            "/geoserver/users" => Ok(Route::GeoServerUsers),
            "/map" => {
                let raw = query
                    .split('&')
                    .filter_map(|pair| pair.split_once('='))
                    .find(|(k, _)| *k == "layerId")
                    .map(|(_, v)| v);
                let layer_id = match raw {
                    None | Some("") => None,
                    Some(v) => Some(
                        v.parse::<ImportId>()
                            .map_err(|_| RouteError::BadLayerId(v.to_string()))?,
                    ),
                };
                Ok(Route::Map { layer_id })
            }
            other => Err(RouteError::UnknownPath(other.to_string())),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Home => f.write_str("/"),
            Route::Upload => f.write_str("/upload"),
            Route::Layers => f.write_str("/layers"),
            Route::Map { layer_id: None } => f.write_str("/map"),
            Route::Map { layer_id: Some(id) } => write!(f, "/map?layerId={id}"),
            Route::GeoServerUsers => f.write_str("/geoserver/users"),
        }
    }
}
