use crate::watch::process::{WatchCommand, WatchError, WatchedProcess};
use axum::{
    extract::State,
    http::StatusCode,
    response::{sse, Html, IntoResponse, Sse},
    routing::{get, post},
    Json, Router,
};
use futures::Stream;
use shared::types::{announcement::Announcement, log_message::LogMessage};
use std::convert::Infallible;
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tokio::sync::{broadcast, Mutex};
use tokio_stream::{wrappers::BroadcastStream, StreamExt};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{error, info, warn};
use uuid::Uuid;

mod watch;

#[derive(Clone)]
struct AppState {
    client_dist: PathBuf,
    watcher: Arc<Watcher>,
}

/// Owns the log fan-out channel and the optional watched process. `process`
/// is `None` when no command was configured; the stream and announcement
/// endpoints still work, viewers just see an idle log.
struct Watcher {
    log_tx: Arc<broadcast::Sender<LogMessage>>,
    process: Option<Mutex<WatchedProcess>>,
}

impl Watcher {
    fn new(command: Option<WatchCommand>) -> Self {
        let (log_tx, _log_rx) = broadcast::channel(1024);
        let log_tx = Arc::new(log_tx);
        let process = command.map(|cmd| Mutex::new(WatchedProcess::new(cmd, log_tx.clone())));
        Self { log_tx, process }
    }

    fn subscribe(&self) -> broadcast::Receiver<LogMessage> {
        self.log_tx.subscribe()
    }

    async fn start(&self) -> Result<(), WatchError> {
        match &self.process {
            Some(process) => process.lock().await.start().await,
            None => Err(WatchError::NotConfigured),
        }
    }

    async fn stop(&self) -> Result<(), WatchError> {
        match &self.process {
            Some(process) => process.lock().await.stop().await,
            None => Err(WatchError::NotConfigured),
        }
    }

    async fn restart(&self) -> Result<(), WatchError> {
        match &self.process {
            Some(process) => process.lock().await.restart().await,
            None => Err(WatchError::NotConfigured),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("server=info,tower_http=info")
        .init();

    let client_dist = std::env::var("CLIENT_DIST")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            // default to ../client/dist for trunk builds
            let mut p = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
            p.pop();
            p.push("client");
            p.push("dist");
            p
        });

    let watch_command = std::env::var("LOG_COMMAND")
        .ok()
        .and_then(|raw| WatchCommand::parse(&raw));
    if watch_command.is_none() {
        warn!("LOG_COMMAND not set, serving an idle log stream");
    }

    let state = AppState {
        client_dist,
        watcher: Arc::new(Watcher::new(watch_command)),
    };

    if state.watcher.process.is_some() {
        if let Err(e) = state.watcher.start().await {
            error!(%e, "could not start watched process");
        }
    }

    let app = app(state);
    let addr: SocketAddr = ([127, 0, 0, 1], 3000).into();
    info!("listening on http://{}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
    Ok(())
}

fn app(state: AppState) -> Router {
    // Serve static assets from /assets route only
    let assets_dir = state.client_dist.join("assets");
    let assets_service = ServeDir::new(&assets_dir);

    Router::new()
        .route("/api/health", get(health))
        .route("/api/logstream", get(log_stream))
        .route("/api/announce", post(announce))
        .route("/api/process/start", post(start_process))
        .route("/api/process/stop", post(stop_process))
        .route("/api/process/restart", post(restart_process))
        .nest_service("/assets", assets_service)
        .fallback(serve_static_or_index)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

async fn serve_static_or_index(
    State(state): State<AppState>,
    req: axum::http::Request<axum::body::Body>,
) -> impl IntoResponse {
    use tower::ServiceExt;

    let path = req.uri().path();
    if path.ends_with(".js") || path.ends_with(".wasm") || path.ends_with(".css") {
        let static_service = tower_http::services::ServeDir::new(&state.client_dist);
        match static_service.oneshot(req).await {
            Ok(response) => {
                if response.status() != StatusCode::NOT_FOUND {
                    return response.into_response();
                }
            }
            Err(_) => {
                return (StatusCode::NOT_FOUND, "Not found").into_response();
            }
        }
    }

    // Otherwise, serve index.html for SPA routing
    let index_html = state.client_dist.join("index.html");
    match std::fs::read_to_string(index_html) {
        Ok(contents) => Html(contents).into_response(),
        Err(_) => (
            StatusCode::OK,
            Html("<html><body><h1>Stdout Log</h1><p>Client not built yet. Run trunk build.</p></body></html>".to_string()),
        )
            .into_response(),
    }
}

async fn announce(Json(announcement): Json<Announcement>) -> impl IntoResponse {
    let viewer = Uuid::new_v4();
    info!(%viewer, data = %announcement.data, "viewer announced");
    StatusCode::OK
}

async fn start_process(State(state): State<AppState>) -> impl IntoResponse {
    match state.watcher.start().await {
        Ok(()) => (StatusCode::OK).into_response(),
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    }
}

async fn stop_process(State(state): State<AppState>) -> impl IntoResponse {
    match state.watcher.stop().await {
        Ok(()) => (StatusCode::OK).into_response(),
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    }
}

async fn restart_process(State(state): State<AppState>) -> impl IntoResponse {
    match state.watcher.restart().await {
        Ok(()) => (StatusCode::OK).into_response(),
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    }
}

async fn log_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<sse::Event, Infallible>>> {
    let viewer = Uuid::new_v4();
    info!(%viewer, "log stream opened");

    let rx = state.watcher.subscribe();
    let stream = BroadcastStream::new(rx).map(|msg| match msg {
        Ok(msg) => Ok(sse::Event::default()
            .event("process_stdout")
            .data(msg.to_json())),
        Err(_) => Ok(sse::Event::default().event("ping").data("")),
    });
    Sse::new(stream).keep_alive(sse::KeepAlive::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::ServiceExt;

    fn test_app() -> Router {
        let state = AppState {
            client_dist: PathBuf::from("."),
            watcher: Arc::new(Watcher::new(None)),
        };
        app(state)
    }

    #[tokio::test]
    async fn health_responds_ok() {
        let res = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn announce_accepts_connection_notice() {
        let body = serde_json::to_string(&Announcement::connected()).unwrap();
        let res = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/announce")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn log_stream_is_server_sent_events() {
        let res = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/logstream")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let content_type = res.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("text/event-stream"));
    }

    #[tokio::test]
    async fn process_control_without_command_is_rejected() {
        let res = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/process/start")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
