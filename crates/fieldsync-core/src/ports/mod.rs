//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. Ports are interfaces that the domain core
//! depends on, but whose implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IRemoteDataSource`] - Paged data point feed from the survey server
//! - [`IDataPointStore`] - Reactive, transactional local record store
//! - [`ISyncListener`] - Sync run lifecycle notifications

pub mod data_point_store;
pub mod listener;
pub mod remote_data_source;

pub use data_point_store::{DataPointFilter, IDataPointStore, OrderBy};
pub use listener::{ISyncListener, SyncEvent};
pub use remote_data_source::{
    DataPointPage, IRemoteDataSource, RemoteDataPoint, RemoteError, RemoteSubmission,
};
