use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, header},
    routing::{get, post},
};
use serde_json::{Map, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::record::Record;
use crate::store::RecordStore;

/// State shared by every handler: the process-lifetime record store
pub struct AppState {
    store: Mutex<RecordStore>,
}

impl AppState {
    pub fn new(store: RecordStore) -> Self {
        AppState {
            store: Mutex::new(store),
        }
    }

    /// Lock the store. `append` never leaves a partial record, so a
    /// poisoned lock is still usable.
    fn store(&self) -> MutexGuard<'_, RecordStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Build the router for the record server
///
/// # Arguments
/// * `state` - Shared state owning the record store
///
/// # Returns
/// * `Router` - Routes for `/`, `/getData` and `/postData` with CORS and
///   request tracing applied
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(hello))
        .route("/getData", get(get_data))
        .route("/postData", post(post_data))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Run the record server until the process is stopped
///
/// The store starts with the demo seed rows.
pub async fn run(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let app_state = Arc::new(AppState::new(RecordStore::seeded()));
    let app = router(app_state);

    let listener = TcpListener::bind(config.address()).await?;
    log::info!("Record server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Handle to a server started in the background with [`start`]
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// Address actually bound (useful when port 0 was requested)
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop accepting connections and wait for in-flight requests to finish
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        if let Err(e) = self.task.await {
            log::error!("record server task failed: {}", e);
        }
    }
}

/// Bind and serve in a background task, returning a handle for shutdown
///
/// # Errors
/// * Returns an error immediately if the address cannot be bound
pub async fn start(config: ServerConfig, store: RecordStore) -> std::io::Result<ServerHandle> {
    let listener = TcpListener::bind(config.address()).await.map_err(|e| {
        log::error!("failed to bind {}: {}", config.address(), e);
        e
    })?;
    let addr = listener.local_addr()?;
    let app = router(Arc::new(AppState::new(store)));

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let task = tokio::spawn(async move {
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await;

        if let Err(e) = result {
            log::error!("record server error: {}", e);
        }
    });

    log::info!("Record server listening on http://{}", addr);
    Ok(ServerHandle {
        addr,
        shutdown_tx,
        task,
    })
}

async fn hello() -> &'static str {
    "Hello World!"
}

async fn get_data(State(state): State<Arc<AppState>>) -> Json<Vec<Record>> {
    Json(state.store().list().to_vec())
}

async fn post_data(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Record>, ApiError> {
    let submission = read_submission(&headers, &body)?;
    log::info!("postData received {}", submission);

    let record = state.store().append(submission);
    Ok(Json(record))
}

/// Decode a `/postData` body.
///
/// Bodies not sent as `application/json` are ignored and read as `{}`, as is
/// an empty body. Otherwise the body must be a JSON object or array.
fn read_submission(headers: &HeaderMap, body: &[u8]) -> Result<Value, ApiError> {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"));

    let text_start = body.iter().position(|b| !b.is_ascii_whitespace());
    let Some(start) = text_start.filter(|_| is_json) else {
        return Ok(Value::Object(Map::new()));
    };
    if !matches!(body[start], b'{' | b'[') {
        return Err(ApiError::ScalarBody);
    }

    Ok(serde_json::from_slice(body)?)
}
