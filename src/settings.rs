// Agent settings, kept as JSON next to the binary.
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::SettingsError;
use crate::estimate_map::EstimatePolicy;
use crate::player::PlayerConfig;

const SETTINGS_PATH: &str = "./data/settings.json";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub player_name: String,
    pub vote_threshold: f64, // Share of alive others that must declare before votes move.
    pub estimate_policy: EstimatePolicy,
    pub probability_jitter: f64,
    pub log_level: String,
    pub log_dir: Option<PathBuf>, // Defaults to ~/aiwolf/data.
    pub meta_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        let config = PlayerConfig::default();
        Settings {
            player_name: "otk_wolf".to_string(),
            vote_threshold: config.vote_threshold,
            estimate_policy: config.estimate_policy,
            probability_jitter: config.probability_jitter,
            log_level: "info".to_string(),
            log_dir: None,
            meta_path: PathBuf::from("./data/meta.json"),
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    // Load settings from the default path, falling back to defaults when there is no file yet.
    pub fn load() -> Result<Self, SettingsError> {
        if Path::new(SETTINGS_PATH).exists() {
            Self::load_settings_from_file(SETTINGS_PATH)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<(), SettingsError> {
        self.save_to_file(SETTINGS_PATH)
    }

    pub fn load_settings_from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let data = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&data)?;
        Ok(settings)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let path = path.as_ref();
        let data = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = fs::File::create(path)?;
        file.write_all(data.as_bytes())?;
        Ok(())
    }

    pub fn player_config(&self) -> PlayerConfig {
        PlayerConfig {
            vote_threshold: self.vote_threshold,
            estimate_policy: self.estimate_policy,
            probability_jitter: self.probability_jitter,
        }
    }

    // Unknown names fall back to info.
    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }
}
