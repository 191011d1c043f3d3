//! On-behalf-of token exchange against the Microsoft identity platform.

use reqwest::Client;
use serde::Serialize;

use crate::error::{GraphError, Result};
use crate::models::{IdentityErrorResponse, TokenResponse};

/// Scope requested for the downstream Graph token.
const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

/// OAuth2 grant type for the on-behalf-of flow.
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Identity platform error code for missing admin/user consent.
const CONSENT_ERROR_CODE: &str = "AADSTS65001";

/// Exchanges an inbound bearer assertion for a Graph-scoped access token.
///
/// Stateless: every request performs its own exchange, nothing is shared
/// across requests.
#[derive(Clone)]
pub struct OnBehalfOfExchanger {
    client: Client,
    token_uri: String,
    client_id: String,
    client_secret: String,
}

impl OnBehalfOfExchanger {
    /// Create an exchanger for the given app registration.
    pub fn new(tenant_id: &str, client_id: String, client_secret: String) -> Self {
        Self {
            client: Client::new(),
            token_uri: format!(
                "https://login.microsoftonline.com/{}/oauth2/v2.0/token",
                tenant_id
            ),
            client_id,
            client_secret,
        }
    }

    /// Override the token endpoint. Used by tests.
    pub fn with_token_uri(mut self, token_uri: String) -> Self {
        self.token_uri = token_uri;
        self
    }

    /// Exchange the `Authorization` header's assertion for a Graph token.
    ///
    /// Fails with `Unauthenticated` when no assertion is present,
    /// `ConsentRequired` when the identity platform reports missing consent,
    /// and `ExchangeFailed` for any other rejection.
    pub async fn exchange(&self, auth_header: Option<&str>) -> Result<String> {
        let assertion = auth_header
            .map(|h| h.strip_prefix("Bearer ").unwrap_or(h).trim())
            .filter(|a| !a.is_empty())
            .ok_or(GraphError::Unauthenticated)?;

        let params = [
            ("grant_type", JWT_BEARER_GRANT),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("assertion", assertion),
            ("scope", GRAPH_SCOPE),
            ("requested_token_use", "on_behalf_of"),
        ];

        let response = self
            .client
            .post(&self.token_uri)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if let Ok(identity_error) = serde_json::from_str::<IdentityErrorResponse>(&body) {
                if is_consent_required(&identity_error) {
                    return Err(GraphError::ConsentRequired);
                }
                if let Some(description) = identity_error.error_description {
                    return Err(GraphError::ExchangeFailed(description));
                }
            }

            return Err(GraphError::ExchangeFailed(format!(
                "Status {}: {}",
                status, body
            )));
        }

        let token_response: TokenResponse = response.json().await?;
        Ok(token_response.access_token)
    }
}

fn is_consent_required(error: &IdentityErrorResponse) -> bool {
    if error.suberror.as_deref() == Some("consent_required") {
        return true;
    }
    error
        .error_description
        .as_deref()
        .is_some_and(|d| d.contains(CONSENT_ERROR_CODE))
}

/// Body of the `/auth/status` probe. The add-in branches its UI on `status`:
/// `consent_required` opens the interactive consent dialog instead of an
/// error display.
#[derive(Debug, Serialize)]
pub struct AuthStatus {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuthStatus {
    pub fn ok() -> Self {
        Self {
            status: "ok",
            error: None,
        }
    }

    pub fn consent_required() -> Self {
        Self {
            status: "consent_required",
            error: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            status: "error",
            error: Some(message),
        }
    }
}
