//! Configuration system for the Pwyll MCP client.
//!
//! Provides TOML-based configuration with:
//! - Named MCP server entries (stdio command or HTTP URL)
//! - Platform config-dir discovery with explicit-path override
//! - Missing file treated as an empty configuration

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{config_dir, config_path, load_config, save_config};
pub use error::{ConfigError, Result};
pub use types::{Config, ServerEntry, TransportKind};
