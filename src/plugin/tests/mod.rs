//! Plugin System Tests
//!
//! Tests for discovery, ordering and the manager, with recording mock plugins.

pub mod mock_plugins;
