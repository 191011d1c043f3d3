//! Error types for the drive_links crate.

use thiserror::Error;

/// Errors that can occur while resolving drive items and minting links.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("No token provider available in this runtime")]
    AuthUnavailable,

    #[error("Request carried no bearer assertion")]
    Unauthenticated,

    #[error("User consent required for Graph access")]
    ConsentRequired,

    #[error("On-behalf-of token exchange failed: {0}")]
    ExchangeFailed(String),

    #[error("No default drive found for this identity")]
    DriveNotFound,

    #[error("Could not resolve folder: {0}")]
    FolderNotFound(String),

    #[error("Could not resolve item: {0}")]
    ItemNotFound(String),

    #[error("Child enumeration failed mid-pagination: {0}")]
    EnumerationFailed(String),

    #[error("Creating a sharing link for item {item_id} failed: {message}")]
    LinkMintFailed { item_id: String, message: String },

    #[error("Graph API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed access token: {0}")]
    MalformedToken(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for GraphError.
pub type Result<T> = std::result::Result<T, GraphError>;
