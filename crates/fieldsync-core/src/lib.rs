//! # fieldsync-core
//!
//! Domain model and port definitions for fieldsync, an offline-capable
//! field-data-collection client that keeps a local record store consistent
//! with a remote survey-data server.
//!
//! ## Architecture
//!
//! This crate is the hexagon's core: pure domain types plus the port traits
//! that adapter crates implement. It performs no IO of its own.
//!
//! ## Key Components
//!
//! - [`domain`] - Entities ([`domain::DataPoint`], [`domain::Submission`]),
//!   validated newtypes and domain errors
//! - [`ports`] - Port traits: [`ports::IRemoteDataSource`] (server paging),
//!   [`ports::IDataPointStore`] (reactive local persistence),
//!   [`ports::ISyncListener`] (progress/result notifications)
//! - [`config`] - YAML configuration with validation

pub mod config;
pub mod domain;
pub mod ports;
