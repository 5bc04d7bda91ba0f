//! Configuration structures for loading profile YAML/JSON files

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown stat '{0}'")]
    UnknownStat(String),

    #[error("Stat '{0}' cannot be scored (only main stats carry a score)")]
    UnscorableStat(String),

    #[error("Unknown artifact set '{0}'")]
    UnknownSet(String),

    #[error("Unknown domain '{0}'")]
    UnknownDomain(String),

    #[error("Invalid damage type '{0}' (expected dmg_none, dmg_na, dmg_ca, dmg_skill or dmg_burst)")]
    InvalidDamageType(String),

    #[error("At least one domain must be farmed")]
    NoDomains,

    #[error("min_stat_score needs {expected} values (one per slot), found {found}")]
    MinStatScoreCount { expected: usize, found: usize },

    #[error("reaction_percentage must be within 0..=100, got {0}")]
    ReactionPercentage(i32),

    #[error("stat_score_max must be positive, got {0}")]
    StatScoreMax(i32),

    #[error("Score for '{stat}' must not be negative, got {score}")]
    NegativeScore { stat: String, score: i32 },

    #[error("stat_score must give at least one stat a positive score")]
    NoScoredStats,

    #[error("good_rolls_margin must not be negative, got {0}")]
    NegativeMargin(i32),
}

fn default_damage_type() -> String {
    "dmg_none".to_string()
}

/// Character section: base attack, flat stat bonuses and reaction behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterConfig {
    pub base_atk: i32,
    #[serde(default)]
    pub reaction_percentage: i32,
    #[serde(default)]
    pub reaction_multiplier_x10: i32,
    #[serde(default = "default_damage_type")]
    pub damage_type: String,
    #[serde(default)]
    pub stats: HashMap<String, i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponConfig {
    pub base_atk: i32,
    #[serde(default)]
    pub stats: HashMap<String, i32>,
}

/// How the simulated player farms and which artifacts they value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FarmingSection {
    pub domains: Vec<String>,
    #[serde(default)]
    pub target_sets_2pc: Vec<String>,
    #[serde(default)]
    pub target_sets_4pc: Vec<String>,
    /// Score per roll of each stat
    pub stat_score: HashMap<String, i32>,
    pub stat_score_max: i32,
    pub mainstat_multiplier: i32,
    #[serde(default)]
    pub set_bonus_value: i32,
    /// Minimum +0 score for leveling, one value per slot
    pub min_stat_score: Vec<i32>,
    #[serde(default)]
    pub required_er: i32,
    #[serde(default)]
    pub good_rolls_margin: Option<i32>,
}

/// Full profile configuration loaded from YAML/JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    pub character: CharacterConfig,
    pub weapon: WeaponConfig,
    pub farming: FarmingSection,
}

impl ProfileConfig {
    /// Load a profile from a YAML or JSON file, chosen by extension
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(&path)?;
        let path_str = path.as_ref().to_string_lossy().to_lowercase();

        if path_str.ends_with(".json") {
            Self::from_json(&content)
        } else {
            Self::from_yaml(&content)
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}
