//! HTTP surface consumed by the spreadsheet add-in.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::auth::{AuthStatus, OnBehalfOfExchanger};
use crate::client::GraphClient;
use crate::error::GraphError;
use crate::models::{ItemDescriptor, ItemLink};
use crate::pipeline;

/// Shared server state: the exchanger plus an optional Graph base override
/// for tests. Nothing here is mutated across requests.
pub struct AppState {
    exchanger: OnBehalfOfExchanger,
    graph_base_url: Option<String>,
}

impl AppState {
    pub fn new(exchanger: OnBehalfOfExchanger) -> Self {
        Self {
            exchanger,
            graph_base_url: None,
        }
    }

    /// Point Graph calls at a different base URL. Used by tests.
    pub fn with_graph_base_url(mut self, base_url: String) -> Self {
        self.graph_base_url = Some(base_url);
        self
    }

    /// Exchange the inbound assertion and build a one-request Graph client.
    async fn client_for(&self, headers: &HeaderMap) -> Result<GraphClient, GraphError> {
        let auth_header = bearer_header(headers).ok_or(GraphError::Unauthenticated)?;
        let token = self.exchanger.exchange(Some(auth_header)).await?;

        let mut client = GraphClient::new(token);
        if let Some(base) = &self.graph_base_url {
            client = client.with_base_url(base.clone());
        }
        Ok(client)
    }
}

fn bearer_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok())
}

/// Build the router with all add-in routes mounted.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/graph/folderchildren", get(folder_children))
        .route("/graph/folderitemsurls", get(folder_items_urls))
        .route("/graph/itemurl", get(item_url))
        .route("/auth/status", get(auth_status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct FolderChildrenQuery {
    #[serde(rename = "baseFolder")]
    base_folder: String,
}

#[derive(Debug, Deserialize)]
struct FolderItemsUrlsQuery {
    #[serde(rename = "baseFolder")]
    base_folder: String,
    #[serde(rename = "songName", default)]
    song_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ItemUrlQuery {
    #[serde(rename = "itemPath")]
    item_path: String,
}

/// `GET /graph/folderchildren?baseFolder=<path>`
async fn folder_children(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<FolderChildrenQuery>,
) -> Result<Json<Vec<ItemDescriptor>>, GraphError> {
    tracing::debug!(base_folder = %query.base_folder, "handling /graph/folderchildren");

    let client = state.client_for(&headers).await?;
    let rows = pipeline::folder_listing(&client, &query.base_folder).await?;
    Ok(Json(rows))
}

/// `GET /graph/folderitemsurls?baseFolder=<path>&songName=<segment>`
async fn folder_items_urls(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<FolderItemsUrlsQuery>,
) -> Result<Json<Vec<ItemLink>>, GraphError> {
    let folder_path = match query.song_name.as_deref() {
        Some(segment) if !segment.is_empty() => {
            format!("{}/{}", query.base_folder, segment)
        }
        _ => query.base_folder.clone(),
    };

    tracing::debug!(folder_path = %folder_path, "handling /graph/folderitemsurls");

    let client = state.client_for(&headers).await?;
    let rows = pipeline::folder_links(&client, &folder_path).await?;
    Ok(Json(rows))
}

/// `GET /graph/itemurl?itemPath=<path>`
async fn item_url(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ItemUrlQuery>,
) -> Result<Json<Vec<ItemLink>>, GraphError> {
    tracing::debug!(item_path = %query.item_path, "handling /graph/itemurl");

    let client = state.client_for(&headers).await?;
    let rows = pipeline::item_link(&client, &query.item_path).await?;
    Ok(Json(rows))
}

/// `GET /auth/status` — probes the on-behalf-of exchange so the add-in can
/// branch to the interactive consent flow before making any Graph call.
async fn auth_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<AuthStatus>, GraphError> {
    let auth_header = bearer_header(&headers).ok_or(GraphError::Unauthenticated)?;

    let status = match state.exchanger.exchange(Some(auth_header)).await {
        Ok(_) => AuthStatus::ok(),
        Err(GraphError::ConsentRequired) => AuthStatus::consent_required(),
        Err(e) => AuthStatus::error(e.to_string()),
    };

    Ok(Json(status))
}

/// Serialized error payload for fatal conditions.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl GraphError {
    fn code(&self) -> &'static str {
        match self {
            GraphError::AuthUnavailable => "AUTH_UNAVAILABLE",
            GraphError::Unauthenticated => "UNAUTHENTICATED",
            GraphError::ConsentRequired => "CONSENT_REQUIRED",
            GraphError::ExchangeFailed(_) => "EXCHANGE_FAILED",
            GraphError::DriveNotFound => "DRIVE_NOT_FOUND",
            GraphError::FolderNotFound(_) => "FOLDER_NOT_FOUND",
            GraphError::ItemNotFound(_) => "ITEM_NOT_FOUND",
            GraphError::EnumerationFailed(_) => "ENUMERATION_FAILED",
            GraphError::LinkMintFailed { .. } => "LINK_MINT_FAILED",
            GraphError::Api { .. } => "GRAPH_API_ERROR",
            GraphError::MalformedToken(_) => "MALFORMED_TOKEN",
            GraphError::Http(_) => "HTTP_ERROR",
        }
    }
}

impl IntoResponse for GraphError {
    fn into_response(self) -> Response {
        // Missing credential: bare 401, empty body, matching the add-in's
        // expectations. Everything else is fatal and carries a JSON payload.
        if matches!(self, GraphError::Unauthenticated) {
            return StatusCode::UNAUTHORIZED.into_response();
        }

        tracing::error!(error = %self, "request failed");

        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code(),
                message: self.to_string(),
            },
        };

        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
