//! Microsoft Graph API client for drive-item operations.

use reqwest::{Client, StatusCode};
use serde_json::json;

use crate::error::{GraphError, Result};
use crate::models::{
    ApiErrorResponse, ChildrenPage, CreateLinkResponse, DownloadInfo, Drive, DriveItem,
};

/// Base URL for Microsoft Graph v1.0.
const GRAPH_API_BASE: &str = "https://graph.microsoft.com/v1.0";

/// Authenticated client scoped to one request.
///
/// Pure construction: the exchanged token is attached as a bearer credential
/// on every call, and the caller owns the client for the lifetime of a single
/// inbound request. Nothing is cached at this layer.
pub struct GraphClient {
    http: Client,
    access_token: String,
    base_url: String,
}

impl GraphClient {
    /// Build a client around an exchanged, Graph-scoped access token.
    pub fn new(access_token: String) -> Self {
        Self {
            http: Client::new(),
            access_token,
            base_url: GRAPH_API_BASE.to_string(),
        }
    }

    /// Override the API base URL. Used by tests.
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Resolve the caller's default drive.
    pub async fn default_drive(&self) -> Result<Drive> {
        let response = self
            .http
            .get(format!("{}/me/drive", self.base_url))
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(GraphError::DriveNotFound);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status, body));
        }

        let drive: Drive = response.json().await?;
        Ok(drive)
    }

    /// Resolve a slash-delimited path (relative to the drive root) to a
    /// folder item. Segments are taken as-is; callers supply clean paths.
    pub async fn resolve_folder(&self, drive_id: &str, path: &str) -> Result<DriveItem> {
        self.item_by_path(drive_id, path)
            .await?
            .ok_or_else(|| GraphError::FolderNotFound(path.to_string()))
    }

    /// Resolve a path to a single item of any kind.
    pub async fn resolve_item(&self, drive_id: &str, path: &str) -> Result<DriveItem> {
        self.item_by_path(drive_id, path)
            .await?
            .ok_or_else(|| GraphError::ItemNotFound(path.to_string()))
    }

    async fn item_by_path(&self, drive_id: &str, path: &str) -> Result<Option<DriveItem>> {
        let response = self
            .http
            .get(format!(
                "{}/drives/{}/root:/{}",
                self.base_url, drive_id, path
            ))
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status, body));
        }

        let item: DriveItem = response.json().await?;
        Ok(Some(item))
    }

    /// Enumerate all direct children of a folder, draining every continuation
    /// page. The result is a single finite sequence in the store's order;
    /// callers never see page boundaries.
    ///
    /// A failed continuation fetch aborts the whole enumeration with
    /// `EnumerationFailed` rather than returning a partial listing.
    pub async fn list_children(&self, drive_id: &str, folder_id: &str) -> Result<Vec<DriveItem>> {
        let mut all_items = Vec::new();
        let mut next_url = format!(
            "{}/drives/{}/items/{}/children",
            self.base_url, drive_id, folder_id
        );

        loop {
            let response = self
                .http
                .get(&next_url)
                .bearer_auth(&self.access_token)
                .send()
                .await
                .map_err(|e| GraphError::EnumerationFailed(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(GraphError::EnumerationFailed(format!(
                    "Status {}: {}",
                    status, body
                )));
            }

            let page: ChildrenPage = response
                .json()
                .await
                .map_err(|e| GraphError::EnumerationFailed(e.to_string()))?;
            all_items.extend(page.value);

            match page.next_link {
                Some(link) => next_url = link,
                None => break,
            }
        }

        Ok(all_items)
    }

    /// Fetch the pre-authenticated direct download URL for an item, if the
    /// store exposes one.
    pub async fn download_url(&self, drive_id: &str, item_id: &str) -> Result<Option<String>> {
        let response = self
            .http
            .get(format!(
                "{}/drives/{}/items/{}",
                self.base_url, drive_id, item_id
            ))
            .bearer_auth(&self.access_token)
            .query(&[("select", "id,@microsoft.graph.downloadUrl")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status, body));
        }

        let info: DownloadInfo = response.json().await?;
        Ok(info.download_url)
    }

    /// Fetch the raw content behind a pre-authenticated download URL. The URL
    /// carries its own credential, so no bearer header is attached.
    pub async fn fetch_content(&self, url: &str) -> Result<String> {
        let response = self.http.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status, body));
        }

        Ok(response.text().await?)
    }

    /// Mint an anonymous, view-only sharing link for an item.
    ///
    /// Not idempotent: every call POSTs `createLink` and may create a fresh
    /// sharing-link resource server-side even when one already exists.
    pub async fn create_view_link(&self, drive_id: &str, item_id: &str) -> Result<String> {
        let body = json!({
            "type": "view",
            "scope": "anonymous"
        });

        let response = self
            .http
            .post(format!(
                "{}/drives/{}/items/{}/createLink",
                self.base_url, drive_id, item_id
            ))
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| GraphError::LinkMintFailed {
                item_id: item_id.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GraphError::LinkMintFailed {
                item_id: item_id.to_string(),
                message: format!("Status {}: {}", status, message),
            });
        }

        let link_response: CreateLinkResponse =
            response.json().await.map_err(|e| GraphError::LinkMintFailed {
                item_id: item_id.to_string(),
                message: e.to_string(),
            })?;

        Ok(link_response.link.web_url)
    }
}

/// Decode a Graph error body into a structured error, falling back to the
/// raw text when the body is not the documented shape.
fn api_error(status: StatusCode, body: String) -> GraphError {
    if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&body) {
        return GraphError::Api {
            status: status.as_u16(),
            message: format!("{}: {}", api_error.error.code, api_error.error.message),
        };
    }
    GraphError::Api {
        status: status.as_u16(),
        message: body,
    }
}
