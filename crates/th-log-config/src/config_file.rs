use std::{env, path::PathBuf};

const CONFIG_FILE: &str = ".th-log-parser.toml";
const APP_NAME: &str = "th-log-parser";

/// Locations searched for a config file, in priority order
///
/// 1. `.th-log-parser.toml` in the current working directory
/// 2. `.th-log-parser.toml` in the home directory
/// 3. `th-log-parser/config.toml` in the user config directory
pub fn config_file_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(CONFIG_FILE)];

    if let Some(home) = env::var_os("HOME") {
        candidates.push(PathBuf::from(home).join(CONFIG_FILE));
    }

    if let Some(config_dir) = dirs::config_dir() {
        candidates.push(config_dir.join(APP_NAME).join("config.toml"));
    }

    candidates
}

/// Load the first config file found
///
/// Returns the path and content of the file, None if no candidate exists.
pub fn load_config_file() -> Option<(PathBuf, String)> {
    config_file_candidates().into_iter().find_map(|path| {
        let content = std::fs::read_to_string(&path).ok()?;
        log::debug!("Loaded config from {}", path.display());
        Some((path, content))
    })
}
