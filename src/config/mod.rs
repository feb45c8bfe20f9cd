//! Configuration: `.docprobe.toml` discovery plus the merged settings the
//! CLI hands to the prober.

mod core;
mod loader;

pub use self::core::{ProbeConfig, CONFIG_FILE_NAME};
pub use loader::{find_config_file, load_config, load_config_file, parse_config};
