//! Frontline Core Library
//!
//! Shared utilities for the frontline daemon:
//! - Configuration loading (XDG-compliant)
//! - File system utilities
//! - Common defaults

mod config;
pub mod fs;

pub use config::{find_config_file, load_config, ConfigSource};
pub use fs::{ensure_dir_exists, list_files_matching};

/// Application name used for XDG paths
pub const APP_NAME: &str = "frontline";

/// Default upper bound (km) between an aerodrome and its ground station
pub const DEFAULT_MAX_DISTANCE_KM: f64 = 50.0;

/// Default number of aerodromes processed concurrently within one hour
pub const DEFAULT_MAX_WORKERS: usize = 8;

/// Default timeout for a single provider request (seconds)
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 20;
