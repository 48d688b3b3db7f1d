use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use client::{
    ApiConfig, AuthClient, GeoImporterApi, HttpClient, ImportId, LoginPayload, RegisterPayload,
    ShapefileArchive, UploadMode,
};
use layers::{BaseMapConfig, RecordingWidget};
use serde::Serialize;
use serde_json::json;
use store::{ConfiguredStore, Direction, FileStorage, StoreBuilder, ThemeMode};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use views::{
    FileState, GeoServerUserView, LayerListView, MapView, NoticeSlot, Route, SessionView,
    ThemeController, UploadView,
};

mod config;

use config::AppConfig;

type CliResult = Result<(), Box<dyn Error>>;

/// `(lon_min, lat_min, lon_max, lat_max)` of the whole globe.
const WORLD_BBOX: (f64, f64, f64, f64) = (-180.0, -90.0, 180.0, 90.0);

#[derive(Parser, Debug)]
#[command(author, version, about = "Client for the shapefile geoimporter backend")]
struct Args {
    /// API base URL (default: $GEOIMPORTER_API_BASE_URL or http://localhost:8000/api/)
    #[arg(long)]
    api_url: Option<String>,

    /// Keep session and theme in memory only
    #[arg(long)]
    no_persist: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload zipped shapefiles, one after another
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// database, database-publish or geoserver-importer
        #[arg(long, default_value = "database")]
        mode: UploadMode,
    },

    /// List and manage imported layers
    Layers {
        #[command(subcommand)]
        action: LayersCommand,
    },

    /// Set up the map for an optional layer and print the resulting layer stack
    Map {
        #[arg(long)]
        layer_id: Option<ImportId>,
    },

    /// Create a GeoServer user
    GeoserverUser {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        disabled: bool,
    },

    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },

    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        email: Option<String>,
    },

    Logout,

    /// Exchange the stored token for a fresh one
    Refresh,

    /// Fetch and store the signed-in user's profile
    Profile,

    /// Print the stored session
    Session,

    /// Show or change the theme
    Theme {
        #[arg(long)]
        mode: Option<ThemeMode>,
        #[arg(long)]
        direction: Option<Direction>,
        #[arg(long, conflicts_with = "mode")]
        toggle: bool,
    },

    /// Parse a UI route such as /map?layerId=3
    Route { path: String },

    /// Remove the persisted session and theme
    Purge,
}

#[derive(Subcommand, Debug)]
enum LayersCommand {
    List,
    Delete { id: ImportId },
    Publish { id: ImportId },
    Details { id: ImportId },
    /// Print the map route for a layer
    MapRoute { id: ImportId },
    /// Talk to the GeoServer importer directly
    Geoserver {
        #[command(subcommand)]
        action: GeoServerCommand,
    },
}

#[derive(Subcommand, Debug)]
enum GeoServerCommand {
    /// Layers published in the GeoServer workspace
    Layers,
    Imports,
    Status { id: ImportId },
    Delete { id: ImportId },
    Info { name: String },
}

#[tokio::main]
async fn main() -> CliResult {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = AppConfig::from_env();
    if let Some(url) = args.api_url {
        config.api = ApiConfig::new(url);
    }
    if args.no_persist {
        config.persist = false;
    }

    let configured = build_store(&config);
    run(args.command, &config, &configured).await
}

fn build_store(config: &AppConfig) -> ConfiguredStore {
    let builder = StoreBuilder::new();
    if !config.persist {
        info!("persistence disabled");
        return builder.build();
    }
    let configured = builder
        .storage(Arc::new(FileStorage::new(&config.state_path)))
        .build();
    if !configured.is_persisted() {
        warn!(path = %config.state_path.display(), "state file unusable, running unpersisted");
    }
    configured
}

async fn run(command: Command, config: &AppConfig, configured: &ConfiguredStore) -> CliResult {
    let api: Arc<dyn GeoImporterApi> = Arc::new(HttpClient::new(&config.api));
    let store = configured.store.clone();

    match command {
        Command::Upload { files, mode } => upload(api, files, mode).await,
        Command::Layers { action } => layers_command(api, &config.api, action).await,
        Command::Map { layer_id } => {
            let mut map = MapView::new(
                api,
                RecordingWidget::with_builtin_imagery(),
                BaseMapConfig::from_env(),
            );
            map.open(layer_id).await?;
            let preview = map
                .overlay()
                .map(|o| o.get_map_url(WORLD_BBOX, 1024, 512))
                .transpose()?;
            print_json(&json!({
                "layer": map.layer(),
                "widget": map.widget(),
                "get_map_preview": preview,
            }))?;
            check(&map.notice)
        }
        Command::GeoserverUser {
            username,
            password,
            disabled,
        } => {
            let mut form = GeoServerUserView::new(api);
            form.set_username(username);
            form.set_password(password);
            form.set_enabled(!disabled);
            form.submit().await?;
            if let Some(notice) = form.notice.current() {
                print_json(notice)?;
            }
            check(&form.notice)
        }
        Command::Login { username, password } => {
            let auth = AuthClient::new(&config.api, store);
            let resp = auth.login(&LoginPayload { username, password }).await?;
            print_json(&json!({
                "success": resp.success,
                "message": resp.message,
                "user": resp.user,
            }))
        }
        Command::Register {
            username,
            password,
            email,
        } => {
            let auth = AuthClient::new(&config.api, store);
            let resp = auth
                .register(&RegisterPayload {
                    username,
                    password,
                    email,
                })
                .await?;
            print_json(&json!({ "success": resp.success, "message": resp.message }))
        }
        Command::Logout => {
            let auth = AuthClient::new(&config.api, store);
            if let Err(err) = auth.logout().await {
                warn!(error = %err, "server logout failed; local session cleared");
            }
            Ok(())
        }
        Command::Refresh => {
            let auth = AuthClient::new(&config.api, store);
            auth.refresh().await?;
            println!("token refreshed");
            Ok(())
        }
        Command::Profile => {
            let auth = AuthClient::new(&config.api, store);
            let user = auth.profile().await?;
            print_json(&user)
        }
        Command::Session => {
            let mut session = SessionView::new(store);
            let display_name = session.display_name();
            let bound = session.render();
            print_json(&json!({
                "authenticated": bound.state.is_authenticated,
                "display_name": display_name,
                "username": bound.state.profile.as_ref().map(|p| p.username.clone()),
            }))
        }
        Command::Theme {
            mode,
            direction,
            toggle,
        } => {
            let mut themes = ThemeController::new(store);
            let actions = themes.actions();
            if let Some(mode) = mode {
                actions.set_mode(mode);
            }
            if let Some(direction) = direction {
                actions.set_direction(direction);
            }
            if toggle {
                themes.toggle_mode();
            }
            print_json(themes.theme().as_ref())
        }
        Command::Route { path } => {
            let route: Route = path.parse()?;
            print_json(&json!({ "route": route, "path": route.to_string() }))
        }
        Command::Purge => {
            match &configured.persistor {
                Some(persistor) => persistor.purge()?,
                None => warn!("persistence is not active, nothing to purge"),
            }
            Ok(())
        }
    }
}

async fn upload(api: Arc<dyn GeoImporterApi>, files: Vec<PathBuf>, mode: UploadMode) -> CliResult {
    let mut archives = Vec::with_capacity(files.len());
    for path in &files {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        archives.push(ShapefileArchive::new(name, bytes));
    }

    let mut view = UploadView::new(api);
    view.set_mode(mode);
    for name in view.add_files(archives) {
        warn!(file = %name, "skipped: not a .zip archive");
    }
    let succeeded = view.upload_all().await?;
    info!(succeeded, total = view.files().len(), "uploads finished");
    print_json(&json!({ "files": view.files(), "imports": view.imports() }))?;

    if view.files().iter().any(|f| f.state == FileState::Error) {
        return Err("one or more uploads failed".into());
    }
    Ok(())
}

async fn layers_command(
    api: Arc<dyn GeoImporterApi>,
    api_config: &ApiConfig,
    action: LayersCommand,
) -> CliResult {
    let mut view = LayerListView::new(api);
    match action {
        LayersCommand::List => view.load().await?,
        LayersCommand::Delete { id } => view.delete(id).await?,
        LayersCommand::Publish { id } => view.publish(id).await?,
        LayersCommand::Details { id } => {
            view.load().await?;
            check(&view.notice)?;
            let row = view
                .open_details(id)
                .ok_or_else(|| format!("no import with id {id}"))?;
            return print_json(row);
        }
        LayersCommand::MapRoute { id } => {
            println!("{}", view.map_route_for(id));
            return Ok(());
        }
        LayersCommand::Geoserver { action } => {
            return geoserver_command(&HttpClient::new(api_config), action).await;
        }
    }
    check(&view.notice)?;
    print_json(&view.rows())
}

async fn geoserver_command(client: &HttpClient, action: GeoServerCommand) -> CliResult {
    match action {
        GeoServerCommand::Layers => print_json(&client.list_geoserver_layers().await?),
        GeoServerCommand::Imports => print_json(&client.list_geoserver_imports().await?),
        GeoServerCommand::Status { id } => {
            print_json(&client.get_geoserver_import_status(id).await?)
        }
        GeoServerCommand::Delete { id } => {
            print_json(&client.delete_geoserver_import(id).await?)
        }
        GeoServerCommand::Info { name } => {
            print_json(&client.get_geoserver_layer_info(&name).await?)
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn check(notice: &NoticeSlot) -> CliResult {
    match notice.error_message() {
        Some(message) => Err(message.into()),
        None => Ok(()),
    }
}
