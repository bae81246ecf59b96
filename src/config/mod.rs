//! Configuration for an assembly run.
//!
//! The target-table list is configuration, not discovery: downstream
//! synchronization tooling decides which tables participate.

mod settings;

pub use settings::{expand_env_vars, ConnectionSettings, Settings, SettingsError};
