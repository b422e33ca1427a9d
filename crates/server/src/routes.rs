//! HTTP routes
//!
//! Six fixed operations; bodies and responses use the binary wire codec.
//!
//! - `POST /list`
//! - `POST /resolve`
//! - `GET /requirements/expr/{expression}`
//! - `GET /requirements/entries`
//! - `GET /close/all`
//! - `GET /close/{scope_id}`

use axum::Router;
use axum::extract::{FromRequest, Path, Request, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use bytes::Bytes;
use testbed_codec::{
    ACCESS_TOKEN_HEADER, Envelope, ListRequest, MEDIA_TYPE, ResolveRequest, Wire, decode, encode,
};
use testbed_resource::ScopeId;
use subtle::ConstantTimeEq;
use tokio_util::task::TaskTracker;
use tower_http::trace::TraceLayer;

use crate::state::ServerState;

/// Build the router over `state`.
pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/list", post(list))
        .route("/resolve", post(resolve))
        .route("/requirements/expr/{expression}", get(required_properties))
        .route("/requirements/entries", get(required_property_entries))
        .route("/close/all", get(close_all))
        .route("/close/{scope_id}", get(close_scope))
        .layer(middleware::from_fn_with_state(state.clone(), require_token))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Wire body and response
// ---------------------------------------------------------------------------

/// Request body decoded with the wire codec. Malformed bodies are rejected
/// with 400.
#[derive(Debug)]
pub struct WireBody<T>(pub T);

impl<T, S> FromRequest<S> for WireBody<T>
where
    T: Wire,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;
        decode(&bytes).map(WireBody).map_err(|error| {
            tracing::debug!(%error, "Rejected malformed request body");
            (StatusCode::BAD_REQUEST, error.to_string()).into_response()
        })
    }
}

/// Envelope encoded as a 200 response.
#[derive(Debug)]
pub struct WireResponse<T>(pub Envelope<T>);

impl<T: Wire> IntoResponse for WireResponse<T> {
    fn into_response(self) -> Response {
        (
            [(header::CONTENT_TYPE, HeaderValue::from_static(MEDIA_TYPE))],
            encode(&self.0),
        )
            .into_response()
    }
}

// ---------------------------------------------------------------------------
// Access token
// ---------------------------------------------------------------------------

async fn require_token(State(state): State<ServerState>, req: Request, next: Next) -> Response {
    if let Some(expected) = state.access_token() {
        let accepted = req
            .headers()
            .get(ACCESS_TOKEN_HEADER)
            .is_some_and(|value| bool::from(value.as_bytes().ct_eq(expected.as_bytes())));
        if !accepted {
            tracing::warn!(path = %req.uri().path(), "Rejected request with missing or wrong access token");
            return StatusCode::UNAUTHORIZED.into_response();
        }
    }
    next.run(req).await
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn list(
    State(state): State<ServerState>,
    WireBody(request): WireBody<ListRequest>,
) -> WireResponse<Vec<String>> {
    let config = state.merged_config(request.test_resources_config);
    let names = state
        .chain()
        .list_resolvable_names(&request.property_entries, &config);
    WireResponse(Envelope::Value(names))
}

async fn resolve(
    State(state): State<ServerState>,
    WireBody(request): WireBody<ResolveRequest>,
) -> WireResponse<String> {
    let config = state.merged_config(request.test_resources_config);
    let ResolveRequest {
        name, properties, ..
    } = request;
    let tasks = state.tasks().clone();
    let answer = detached(&tasks, "resolve", async move {
        state
            .chain()
            .resolve(&name, &properties, &config, state.cache())
            .await
    })
    .await;
    WireResponse(answer.unwrap_or_else(Envelope::Error))
}

async fn required_properties(
    State(state): State<ServerState>,
    Path(expression): Path<String>,
) -> WireResponse<Vec<String>> {
    WireResponse(Envelope::Value(state.chain().required_properties(&expression)))
}

async fn required_property_entries(State(state): State<ServerState>) -> WireResponse<Vec<String>> {
    WireResponse(Envelope::Value(state.chain().required_property_entries()))
}

async fn close_all(State(state): State<ServerState>) -> WireResponse<bool> {
    let tasks = state.tasks().clone();
    let answer = detached(&tasks, "close all", async move {
        state.cache().close_all().await
    })
    .await;
    if let Ok(closed) = &answer {
        tracing::info!(closed = *closed, "Closed all scopes");
    }
    WireResponse(answer.map_or_else(Envelope::Error, Envelope::Value))
}

async fn close_scope(
    State(state): State<ServerState>,
    Path(scope_id): Path<String>,
) -> WireResponse<bool> {
    let Ok(scope) = ScopeId::new(scope_id) else {
        return WireResponse(Envelope::Value(false));
    };
    let tasks = state.tasks().clone();
    let answer = detached(&tasks, "close scope", async move {
        state.cache().close_scope(&scope).await
    })
    .await;
    WireResponse(answer.map_or_else(Envelope::Error, Envelope::Value))
}

/// Run `work` on its own tracked task so a client disconnecting mid-call
/// does not cancel it. A resource creation still under way when the client
/// times out completes and lands in the cache; shutdown waits for it.
async fn detached<T, F>(tasks: &TaskTracker, operation: &'static str, work: F) -> Result<T, String>
where
    T: Send + 'static,
    F: Future<Output = T> + Send + 'static,
{
    tasks.spawn(work).await.map_err(|error| {
        tracing::error!(operation, %error, "Request task failed");
        format!("{operation} failed: {error}")
    })
}
