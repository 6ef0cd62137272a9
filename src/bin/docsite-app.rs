use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Json, Redirect, Response};
use axum::routing::{get, post};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use docsite::client::{ContentSource, HttpContentClient};
use docsite::config::ApiConfig;
use docsite::controller::{NavigateOutcome, PageController, PageState};
use docsite::formats::{Language, Theme};
use docsite::prefs::{FilePreferenceStore, PreferenceStore};
use docsite::tracker::{ActivePolicy, HeadingBox, Viewport};
use docsite::view::{SiteChrome, render_page};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    Topmost,
    LastWrite,
}

impl From<PolicyArg> for ActivePolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::Topmost => ActivePolicy::TopmostWins,
            PolicyArg::LastWrite => ActivePolicy::LastWriteWins,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct AppArgs {
    #[arg(long, default_value = "127.0.0.1:8080")]
    addr: SocketAddr,

    /// Directory holding `preferences.json`.
    #[arg(long, default_value = "workspace-docsite")]
    data_dir: PathBuf,

    /// Content API base URL (default: $DOCSITE_API_URL).
    #[arg(long)]
    api_url: Option<String>,

    #[arg(long, default_value = "Docs")]
    brand: String,

    /// Link target of the brand name.
    #[arg(long)]
    home_url: Option<String>,

    /// CMS admin panel linked from the empty state.
    #[arg(long, default_value = "http://localhost:1337/admin")]
    admin_url: String,

    /// Which heading wins when several scroll into view at once.
    #[arg(long, value_enum, default_value_t = PolicyArg::Topmost)]
    active_policy: PolicyArg,
}

#[derive(Clone)]
struct AppState {
    controller: Arc<PageController>,
    chrome: Arc<SiteChrome>,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return std::process::ExitCode::FAILURE;
    }
    std::process::ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    docsite::logging::init(docsite::logging::LogProfile::App)?;

    let args = AppArgs::parse();
    tracing::info!(?args, "starting docsite-app");

    let config = ApiConfig::resolve(args.api_url.as_deref())?;
    tracing::info!(endpoint = %config.documentations_endpoint(), "using content api");
    let source: Arc<dyn ContentSource> = Arc::new(HttpContentClient::new(&config)?);
    let store = FilePreferenceStore::in_dir(&args.data_dir);
    tracing::info!(path = %store.path().display(), "using preferences file");
    let store: Arc<dyn PreferenceStore> = Arc::new(store);

    let controller = PageController::start(source, store, args.active_policy.into()).await?;
    let state = AppState {
        controller: Arc::new(controller),
        chrome: Arc::new(SiteChrome {
            brand: args.brand,
            home_url: args.home_url,
            admin_url: args.admin_url,
        }),
    };

    let app = Router::new()
        .route("/", get(|| async { Redirect::to("/docs") }))
        .route("/healthz", get(|| async { "ok\n" }))
        .route("/docs", get(docs_index))
        .route("/docs/:slug", get(docs_page))
        .route("/preferences", get(update_preferences))
        .route("/menu", get(toggle_menu))
        .route("/api/nav", get(api_nav))
        .route("/api/page", get(api_page))
        .route("/api/active-section", post(api_active_section))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(args.addr)
        .await
        .map_err(|err| anyhow::anyhow!("bind {}: {err}", args.addr))?;
    tracing::info!(addr = %args.addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(?err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

async fn docs_index(State(state): State<AppState>, OriginalUri(uri): OriginalUri) -> Response {
    render_route(&state, None, uri.path()).await
}

async fn docs_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    OriginalUri(uri): OriginalUri,
) -> Response {
    render_route(&state, Some(&slug), uri.path()).await
}

/// Renders the page once its navigation has committed. A request overtaken by
/// a newer navigation is sent back to its own path instead of rendering the
/// other request's in-flight state.
async fn render_route(state: &AppState, slug: Option<&str>, path: &str) -> Response {
    match state.controller.navigate(slug).await {
        NavigateOutcome::Committed => {
            let snapshot = state.controller.snapshot();
            Html(render_page(&snapshot, &state.chrome, path)).into_response()
        }
        NavigateOutcome::Superseded => {
            tracing::debug!(path, "navigation superseded; redirecting to retry");
            Redirect::to(&safe_back(Some(path))).into_response()
        }
    }
}

/// Only local documentation paths that form a valid `Location` header are
/// redirect targets.
fn safe_back(back: Option<&str>) -> String {
    match back {
        Some(path)
            if (path == "/docs" || path.starts_with("/docs/"))
                && HeaderValue::from_str(path).is_ok() =>
        {
            path.to_owned()
        }
        _ => "/docs".to_owned(),
    }
}

#[derive(Debug, Deserialize)]
struct PreferencesQuery {
    theme: Option<String>,
    lang: Option<String>,
    back: Option<String>,
}

async fn update_preferences(
    State(state): State<AppState>,
    Query(q): Query<PreferencesQuery>,
) -> Result<Redirect, (StatusCode, String)> {
    let theme = q
        .theme
        .as_deref()
        .map(Theme::parse)
        .transpose()
        .map_err(|err| (StatusCode::BAD_REQUEST, format!("{err:#}")))?;
    let language = q
        .lang
        .as_deref()
        .map(Language::parse)
        .transpose()
        .map_err(|err| (StatusCode::BAD_REQUEST, format!("{err:#}")))?;

    if let Some(theme) = theme {
        state.controller.set_theme(theme).await.map_err(internal)?;
    }
    // The redirect below is the navigation that reloads content in the new
    // language.
    if let Some(language) = language {
        state
            .controller
            .remember_language(language)
            .await
            .map_err(internal)?;
    }
    Ok(Redirect::to(&safe_back(q.back.as_deref())))
}

#[derive(Debug, Deserialize)]
struct MenuQuery {
    open: bool,
    back: Option<String>,
}

async fn toggle_menu(State(state): State<AppState>, Query(q): Query<MenuQuery>) -> Redirect {
    state.controller.set_mobile_nav(q.open);
    Redirect::to(&safe_back(q.back.as_deref()))
}

async fn api_nav(State(state): State<AppState>) -> Response {
    let snapshot = state.controller.snapshot();
    Json(snapshot.navigation()).into_response()
}

#[derive(Debug, Serialize)]
struct PageSummary<'a> {
    state: &'a PageState,
    language: Language,
    theme: Theme,
    headings: &'a [docsite::toc::HeadingDescriptor],
    active_heading: Option<&'a str>,
    scroll_locked: bool,
}

async fn api_page(State(state): State<AppState>) -> Response {
    let snapshot = state.controller.snapshot();
    Json(PageSummary {
        state: &snapshot.state,
        language: snapshot.preferences.language,
        theme: snapshot.preferences.theme,
        headings: &snapshot.headings,
        active_heading: snapshot.active_heading.as_deref(),
        scroll_locked: snapshot.mobile_nav_open,
    })
    .into_response()
}

#[derive(Debug, Deserialize)]
struct ActiveSectionRequest {
    viewport: Viewport,
    headings: Vec<HeadingBox>,
}

#[derive(Debug, Serialize)]
struct ActiveSectionResponse {
    active: Option<String>,
}

async fn api_active_section(
    State(state): State<AppState>,
    Json(req): Json<ActiveSectionRequest>,
) -> Json<ActiveSectionResponse> {
    let active = state
        .controller
        .observe_viewport(req.viewport, &req.headings);
    Json(ActiveSectionResponse { active })
}

fn internal(err: anyhow::Error) -> (StatusCode, String) {
    tracing::error!(?err, "request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, format!("{err:#}"))
}
