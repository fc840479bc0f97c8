//! JSON configuration helpers.
//!
//! Each crate owns its own `serde` config structs; this module only moves
//! them to and from disk.

use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::Result;

/// Load a configuration value from a JSON file.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let json = std::fs::read_to_string(path)?;
    let value = serde_json::from_str(&json)?;
    debug!("Loaded config from {}", path.display());
    Ok(value)
}

/// Save a configuration value as pretty-printed JSON.
pub fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    debug!("Saved config to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        frames: usize,
        label: String,
    }

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("waveframe-core-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_path("sample.json");
        let sample = Sample {
            frames: 3,
            label: "triple".into(),
        };
        save_json(&sample, &path).unwrap();
        let loaded: Sample = load_json(&path).unwrap();
        assert_eq!(loaded, sample);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result: Result<Sample> = load_json(&temp_path("does-not-exist.json"));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_malformed_file_is_json_error() {
        let path = temp_path("bad.json");
        std::fs::write(&path, "{ frames: ").unwrap();
        let result: Result<Sample> = load_json(&path);
        assert!(matches!(result, Err(Error::Json(_))));
        std::fs::remove_file(&path).ok();
    }
}
