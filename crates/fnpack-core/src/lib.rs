//! Core types and configuration for fnpack.
//!
//! This crate defines the `fnpack.toml` schema ([`FnpackConfig`]), project
//! layout resolution ([`ProjectLayout`]), dependency manifest
//! classification ([`Manifest`]), and shared error types.

pub mod config;
pub mod error;
pub mod layout;
pub mod manifest;

pub use config::{ArchiveConfig, CONFIG_FILE, FnpackConfig, InstallConfig, PathsConfig};
pub use error::{Error, Result};
pub use layout::{ProjectLayout, discover_root, discover_root_from_cwd};
pub use manifest::{Manifest, ManifestStatus};
