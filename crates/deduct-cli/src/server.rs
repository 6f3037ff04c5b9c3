//! HTTP front end. Every method and path goes through one fallback handler.

use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::header::{CONTENT_TYPE, HOST};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use deduct_core::{Pipeline, Reasoner, Request};
use deduct_store::ServerConfig;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

pub struct AppState<R> {
    pipeline: Pipeline<R>,
    base_url: Option<String>,
    max_body_bytes: usize,
}

impl<R: Reasoner> AppState<R> {
    pub fn new(pipeline: Pipeline<R>, config: &ServerConfig) -> Self {
        Self {
            pipeline,
            base_url: config
                .base_url
                .as_deref()
                .map(|u| u.trim_end_matches('/').to_string()),
            max_body_bytes: config.max_body_bytes,
        }
    }
}

pub fn router<R: Reasoner + 'static>(state: AppState<R>) -> Router {
    let limit = state.max_body_bytes;
    Router::new()
        .fallback(handle::<R>)
        .layer(DefaultBodyLimit::max(limit))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Serve until `shutdown` is cancelled, then drain in-flight requests.
pub async fn serve<R: Reasoner + 'static>(
    listener: TcpListener,
    state: AppState<R>,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
}

async fn handle<R: Reasoner + 'static>(
    State(state): State<Arc<AppState<R>>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let href = request_url(state.base_url.as_deref(), &uri, &headers);
    let mut request = Request::new(method.as_str(), &href);
    request.content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    request.body = body.to_vec();

    into_http(state.pipeline.respond(&request).await)
}

/// Absolute URL of the request: configured origin, else `Host`, else localhost.
fn request_url(base_url: Option<&str>, uri: &Uri, headers: &HeaderMap) -> String {
    let path = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");
    if let Some(base) = base_url {
        return format!("{base}{path}");
    }
    if uri.scheme().is_some() && uri.authority().is_some() {
        return uri.to_string();
    }
    match headers.get(HOST).and_then(|h| h.to_str().ok()) {
        Some(host) => format!("http://{host}{path}"),
        None => format!("http://localhost{path}"),
    }
}

fn into_http(response: deduct_core::Response) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut res = (status, response.body).into_response();
    match HeaderValue::from_str(&response.content_type) {
        Ok(value) => {
            res.headers_mut().insert(CONTENT_TYPE, value);
        }
        Err(_) => tracing::warn!(content_type = %response.content_type, "unusable content type"),
    }
    res
}
