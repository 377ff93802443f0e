use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use directories::ProjectDirs;
use once_cell::sync::Lazy; // Use Lazy for thread-safe static initialization
use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::suggestion_engine::MatchConfig;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AppSettings {
    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: usize,
    #[serde(default = "default_partitions")]
    pub partitions: Vec<PathBuf>,
    #[serde(default = "default_text_columns")]
    pub text_columns: Vec<String>,
    #[serde(default = "default_numeric_column")]
    pub numeric_column: String,
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    #[serde(default = "default_include_phonetic")]
    pub include_phonetic: bool,
    #[serde(default)]
    pub matching: MatchingSettings,
}

/// Tuning knobs for the matching tiers
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MatchingSettings {
    #[serde(default = "default_prefix_score")]
    pub prefix_score: f64,
    #[serde(default = "default_substring_score")]
    pub substring_score: f64,
    #[serde(default = "default_fuzzy_weight")]
    pub fuzzy_weight: f64,
    #[serde(default = "default_strict_min_score")]
    pub strict_min_score: f64,
    #[serde(default = "default_relaxed_min_similarity")]
    pub relaxed_min_similarity: f64,
    #[serde(default = "default_relaxed_weight")]
    pub relaxed_weight: f64,
    #[serde(default = "default_exact_key_floor")]
    pub exact_key_floor: f64,
    #[serde(default = "default_literal_score")]
    pub literal_score: f64,
}

fn default_suggestion_limit() -> usize {
    25
}

fn default_partitions() -> Vec<PathBuf> {
    // One file per polling booth
    vec![PathBuf::from("voters_1.json"), PathBuf::from("voters.json")]
}

fn default_text_columns() -> Vec<String> {
    vec!["house_name".to_string(), "name".to_string()]
}

fn default_numeric_column() -> String {
    "house_no".to_string()
}

fn default_refresh_interval_secs() -> u64 {
    0 // Rebuild only on explicit trigger
}

fn default_include_phonetic() -> bool {
    false
}

fn default_prefix_score() -> f64 {
    MatchConfig::default().prefix_score
}

fn default_substring_score() -> f64 {
    MatchConfig::default().substring_score
}

fn default_fuzzy_weight() -> f64 {
    MatchConfig::default().fuzzy_weight
}

fn default_strict_min_score() -> f64 {
    MatchConfig::default().strict_min_score
}

fn default_relaxed_min_similarity() -> f64 {
    MatchConfig::default().relaxed_min_similarity
}

fn default_relaxed_weight() -> f64 {
    MatchConfig::default().relaxed_weight
}

fn default_exact_key_floor() -> f64 {
    MatchConfig::default().exact_key_floor
}

fn default_literal_score() -> f64 {
    MatchConfig::default().literal_score
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            prefix_score: default_prefix_score(),
            substring_score: default_substring_score(),
            fuzzy_weight: default_fuzzy_weight(),
            strict_min_score: default_strict_min_score(),
            relaxed_min_similarity: default_relaxed_min_similarity(),
            relaxed_weight: default_relaxed_weight(),
            exact_key_floor: default_exact_key_floor(),
            literal_score: default_literal_score(),
        }
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            suggestion_limit: default_suggestion_limit(),
            partitions: default_partitions(),
            text_columns: default_text_columns(),
            numeric_column: default_numeric_column(),
            refresh_interval_secs: default_refresh_interval_secs(),
            include_phonetic: default_include_phonetic(),
            matching: MatchingSettings::default(),
        }
    }
}

// Use Lazy<Mutex<AppSettings>> for thread-safe static config
pub static SETTINGS: Lazy<Mutex<AppSettings>> = Lazy::new(|| {
    Mutex::new(load_settings())
});

// Helper function to get project directories
fn get_project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "voter-suggest", "VoterSuggest")
}

// Helper function to get the config file path
fn get_config_path() -> Option<PathBuf> {
    get_project_dirs().map(|proj_dirs| {
        let config_dir = proj_dirs.config_dir();
        config_dir.join("config.toml")
    })
}

// Load settings from the TOML file, creating it with defaults when missing
fn load_settings() -> AppSettings {
    let Some(config_path) = get_config_path() else {
        log::error!("[Config] Could not determine project directories. Using default settings.");
        return AppSettings::default();
    };

    log::info!("[Config] Trying to load settings from: {}", config_path.display());
    match fs::read_to_string(&config_path) {
        Ok(contents) => match toml::from_str::<AppSettings>(&contents) {
            Ok(settings) => {
                log::info!(
                    "[Config] Settings loaded: {} partitions, columns {:?}, limit {}",
                    settings.partitions.len(),
                    settings.text_columns,
                    settings.suggestion_limit
                );
                return settings;
            }
            Err(e) => {
                log::error!("[Config] Failed to parse config file '{}': {}", config_path.display(), e);
                // Parse errors keep the user's file untouched
                return AppSettings::default();
            }
        },
        Err(ref e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::info!("[Config] Config file not found. Creating default.");
        }
        Err(e) => {
            log::error!("[Config] Failed to read config file '{}': {}", config_path.display(), e);
            return AppSettings::default();
        }
    }

    let default_settings = AppSettings::default();
    if let Err(e) = default_settings.save_to(&config_path) {
        log::error!("[Config] Failed to write default config file: {}", e);
    }
    default_settings
}

impl AppSettings {
    pub fn config_path() -> Result<PathBuf> {
        get_config_path().ok_or_else(|| Error::Config("Could not determine config path".to_string()))
    }

    /// Read settings from an explicit TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let config_content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize: {}", e)))?;
        fs::write(path, config_content)?;
        log::info!("[Config] Settings saved to {}", path.display());
        Ok(())
    }

    /// Periodic rebuild interval; `None` when disabled.
    pub fn refresh_interval(&self) -> Option<Duration> {
        (self.refresh_interval_secs > 0).then(|| Duration::from_secs(self.refresh_interval_secs))
    }

    pub fn match_config(&self) -> MatchConfig {
        MatchConfig {
            prefix_score: self.matching.prefix_score,
            substring_score: self.matching.substring_score,
            fuzzy_weight: self.matching.fuzzy_weight,
            strict_min_score: self.matching.strict_min_score,
            relaxed_min_similarity: self.matching.relaxed_min_similarity,
            relaxed_weight: self.matching.relaxed_weight,
            exact_key_floor: self.matching.exact_key_floor,
            literal_score: self.matching.literal_score,
            include_phonetic: self.include_phonetic,
        }
    }
}
