use std::path::{Path, PathBuf};

use crate::error::ConfigError;

const CONFIG_FILE: &str = ".heirloom.toml";
const APP_NAME: &str = "heirloom";

/// Load config file content
///
/// An explicitly given path must exist. Otherwise searches for:
/// 1. `.heirloom.toml` in the current working directory
/// 2. `heirloom/config.toml` in the user config directory
///    (`~/.config/heirloom/config.toml` on Linux)
///
/// Returns the path and content if found, None otherwise.
pub fn load_config_file(explicit: Option<&Path>) -> Result<Option<(PathBuf, String)>, ConfigError> {
    if let Some(path) = explicit {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        return Ok(Some((path.to_path_buf(), content)));
    }

    for candidate in search_paths() {
        if let Ok(content) = std::fs::read_to_string(&candidate) {
            log::debug!("Loaded config from {}", candidate.display());
            return Ok(Some((candidate, content)));
        }
    }

    Ok(None)
}

/// Config file locations in search order
fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join(APP_NAME).join("config.toml"));
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_paths_start_with_cwd() {
        let paths = search_paths();
        assert_eq!(paths[0], PathBuf::from(CONFIG_FILE));
        if paths.len() > 1 {
            assert!(paths[1].ends_with("heirloom/config.toml"));
        }
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = load_config_file(Some(Path::new("/nonexistent/heirloom.toml")));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_explicit_file_is_read() {
        let path = std::env::temp_dir().join(format!("heirloom-test-{}.toml", std::process::id()));
        std::fs::write(&path, "days_threshold = 5\n").unwrap();

        let (found, content) = load_config_file(Some(&path)).unwrap().unwrap();
        assert_eq!(found, path);
        assert!(content.contains("days_threshold"));

        std::fs::remove_file(&path).unwrap();
    }
}
