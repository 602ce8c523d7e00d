//! fieldsync-api - Survey-data server REST client
//!
//! Provides an async client for the survey server's paginated data point
//! feed, plus the adapter implementing the `IRemoteDataSource` port from
//! `fieldsync-core`.
//!
//! ## Modules
//!
//! - [`client`] - Typed HTTP client for the server's REST endpoint
//! - [`datasource`] - Port adapter mapping wire DTOs into engine-facing pages
//!
//! ## Error classification
//!
//! The engine branches on how a fetch fails, so the client maps responses
//! into `fieldsync_core::ports::RemoteError` directly: HTTP 403 becomes
//! `Forbidden` (the device is not assigned to the survey group), transport
//! failures become `Network`, and anything else unexpected becomes
//! `UnexpectedStatus`.

pub mod client;
pub mod datasource;

pub use client::RestClient;
pub use datasource::RestRemoteDataSource;
