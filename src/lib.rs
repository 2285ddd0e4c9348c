//! Client-side data-access layer for the portal API.
//!
//! The crate is organized around four seams:
//! - [`validation`] checks plain JSON values against declared field types
//!   and collects every problem instead of stopping at the first;
//! - [`resource`] defines the typed resources and their plain-object codec;
//! - [`cache`] is the tiered local cache with offline fallback;
//! - [`client`] orchestrates requests between the network and the cache and
//!   narrows responses into typed payloads.
//!
//! ```no_run
//! use portal_client::client::ApiClient;
//! use portal_client::config::ApiClientConfig;
//! use url::Url;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ApiClientConfig::new(Url::parse("https://portal.example.com/api")?);
//! let client = ApiClient::new(config);
//! let event = client.events().get_event("evt-42").await?;
//! println!("{}", event.resource.title);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod resource;
pub mod response;
pub mod transport;
pub mod validation;

pub use client::ApiClient;
pub use config::ApiClientConfig;
pub use error::ApiClientError;
