use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Front-end configuration. Every key is optional in the TOML file.
///
/// ```toml
/// player_name = "ada"
/// scores_file = "data/scores.json"
/// settings_file = "data/settings.json"
/// seed = 1234
/// ```
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct Config {
    #[serde(default = "defaults::player_name")]
    pub player_name: String,
    #[serde(default = "defaults::scores_file")]
    pub scores_file: PathBuf,
    #[serde(default = "defaults::settings_file")]
    pub settings_file: PathBuf,
    /// Fixed seed for reproducible sessions; entropy when absent.
    #[serde(default)]
    pub seed: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            player_name: defaults::player_name(),
            scores_file: defaults::scores_file(),
            settings_file: defaults::settings_file(),
            seed: None,
        }
    }
}

impl Config {
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }
}

mod defaults {
    use std::path::PathBuf;

    pub fn player_name() -> String {
        crate::scores::DEFAULT_PLAYER_NAME.to_string()
    }

    pub fn scores_file() -> PathBuf {
        PathBuf::from("scores.json")
    }

    pub fn settings_file() -> PathBuf {
        PathBuf::from("settings.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn parses_all_keys() {
        let cfg = Config::from_toml_str(
            r#"
            player_name = "ada"
            scores_file = "data/scores.json"
            settings_file = "data/settings.json"
            seed = 1234
            "#,
        )
        .unwrap();
        assert_eq!(cfg.player_name, "ada");
        assert_eq!(cfg.scores_file, PathBuf::from("data/scores.json"));
        assert_eq!(cfg.settings_file, PathBuf::from("data/settings.json"));
        assert_eq!(cfg.seed, Some(1234));
    }

    #[test]
    fn rejects_out_of_range_seed() {
        assert!(matches!(Config::from_toml_str("seed = -1"), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn reads_from_disk() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "player_name = \"grace\"\n").unwrap();
        let cfg = Config::from_toml(tmp.path()).unwrap();
        assert_eq!(cfg.player_name, "grace");
        assert_eq!(cfg.seed, None);
    }
}
