//! HeatShield advisory client.
//!
//! Collects work-context inputs, fetches weather and a risk prediction from the
//! advisory backend, and keeps the resulting state and history for the MCP views.

pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod formatters;
pub mod history;
pub mod models;
pub mod orchestrator;
pub mod service;
pub mod store;

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
