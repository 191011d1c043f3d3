//! drive_links - backend for a spreadsheet add-in that browses OneDrive and
//! inserts durable links at the active cell.
//!
//! This library provides:
//! - On-behalf-of token exchange for inbound bearer assertions
//! - Folder path resolution and fully-drained child pagination
//! - Classification of children as File / Folder / Shortcut
//! - Resolution of `.url` shortcut files to their real target URL
//! - Minting of anonymous, view-only sharing links
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use drive_links::{server, Exchanger};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let exchanger = Exchanger::new("tenant-id", "client-id".into(), "secret".into());
//!     let state = Arc::new(server::AppState::new(exchanger));
//!     let app = server::create_router(state);
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod broker;
pub mod client;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod server;
pub mod shortcut;

// Re-exports for convenience
pub use auth::OnBehalfOfExchanger as Exchanger;
pub use broker::{AccessToken, TokenBroker, TokenProvider};
pub use client::GraphClient;
pub use error::{GraphError, Result};
pub use models::{ItemDescriptor, ItemKind, ItemLink};
