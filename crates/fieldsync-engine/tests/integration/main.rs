//! Integration tests for the synchronization engine
//!
//! Exercises the full path: wiremock survey server → REST adapter →
//! engine/orchestrator → in-memory SQLite store → recorded listener.

mod common;
mod test_orchestrator;
mod test_scenarios;
