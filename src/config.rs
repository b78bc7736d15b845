use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::ai::AiTier;
use crate::error::ConfigError;
use crate::game::{GameConfig, GravityMode, Opponent};

/// Upper bound for the pause before the computer answers.
const MAX_AI_DELAY_MS: u64 = 60_000;

/// Named board size, mapped to dimensions through [`PresetTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Normal,
    Hard,
}

impl FromStr for Difficulty {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ConfigError::UnknownValue {
                kind: "difficulty",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        })
    }
}

/// Board dimensions and number of random starting tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BoardPreset {
    pub rows: usize,
    pub cols: usize,
    pub prefill: usize,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PresetTable {
    pub easy: BoardPreset,
    pub normal: BoardPreset,
    pub hard: BoardPreset,
}

impl Default for PresetTable {
    fn default() -> Self {
        PresetTable {
            easy: BoardPreset {
                rows: 6,
                cols: 7,
                prefill: 0,
            },
            normal: BoardPreset {
                rows: 7,
                cols: 8,
                prefill: 0,
            },
            hard: BoardPreset {
                rows: 8,
                cols: 10,
                prefill: 7,
            },
        }
    }
}

impl PresetTable {
    pub fn get(&self, difficulty: Difficulty) -> BoardPreset {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Normal => self.normal,
            Difficulty::Hard => self.hard,
        }
    }
}

/// Defaults for the next game.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub difficulty: Difficulty,
    pub gravity_mode: GravityMode,
    pub vs_computer: bool,
    pub ai_tier: AiTier,
    /// Pause before the computer plays, in milliseconds.
    pub ai_delay_ms: u64,
    pub player_one: String,
    pub player_two: String,
}

impl Default for GameSettings {
    fn default() -> Self {
        GameSettings {
            difficulty: Difficulty::Easy,
            gravity_mode: GravityMode::Fixed,
            vs_computer: false,
            ai_tier: AiTier::Easy,
            ai_delay_ms: 1000,
            player_one: "Player 1".to_string(),
            player_two: "Player 2".to_string(),
        }
    }
}

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub game: GameSettings,
    pub presets: PresetTable,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for difficulty in [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard] {
            let preset = self.presets.get(difficulty);
            if preset.rows == 0 {
                return Err(ConfigError::Validation(format!(
                    "presets.{difficulty}.rows must be > 0"
                )));
            }
            if preset.cols == 0 {
                return Err(ConfigError::Validation(format!(
                    "presets.{difficulty}.cols must be > 0"
                )));
            }
            let Some(cells) = preset.rows.checked_mul(preset.cols) else {
                return Err(ConfigError::Validation(format!(
                    "presets.{difficulty} has too many cells"
                )));
            };
            if preset.prefill > cells {
                return Err(ConfigError::Validation(format!(
                    "presets.{difficulty}.prefill must be <= rows * cols"
                )));
            }
        }

        if self.game.ai_delay_ms > MAX_AI_DELAY_MS {
            return Err(ConfigError::Validation(format!(
                "game.ai_delay_ms must be <= {MAX_AI_DELAY_MS}"
            )));
        }

        Ok(())
    }

    /// Build the engine configuration for the selected difficulty.
    pub fn game_config(&self) -> GameConfig {
        let preset = self.presets.get(self.game.difficulty);
        let opponent = if self.game.vs_computer {
            Opponent::Computer(self.game.ai_tier)
        } else {
            Opponent::Human
        };
        let player_two = match (&opponent, self.game.player_two.trim()) {
            (Opponent::Computer(_), "") => "Computer".to_string(),
            (_, name) => name.to_string(),
        };

        GameConfig {
            rows: preset.rows,
            cols: preset.cols,
            prefill: preset.prefill,
            gravity_mode: self.game.gravity_mode,
            opponent,
            names: [self.game.player_one.clone(), player_two],
        }
    }

    pub fn ai_delay(&self) -> Duration {
        Duration::from_millis(self.game.ai_delay_ms)
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&AppConfig::default()).expect("default config serializes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        config.validate().expect("default config should be valid");
    }

    #[test]
    fn test_default_presets() {
        let presets = PresetTable::default();
        assert_eq!((presets.easy.rows, presets.easy.cols, presets.easy.prefill), (6, 7, 0));
        assert_eq!((presets.normal.rows, presets.normal.cols, presets.normal.prefill), (7, 8, 0));
        assert_eq!((presets.hard.rows, presets.hard.cols, presets.hard.prefill), (8, 10, 7));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml_str = r#"
[game]
difficulty = "hard"
gravity_mode = "inverse"
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.game.difficulty, Difficulty::Hard);
        assert_eq!(config.game.gravity_mode, GravityMode::Reversing);
        // Other fields should be defaults
        assert_eq!(config.game.ai_delay_ms, 1000);
        assert_eq!(config.presets.normal.cols, 8);
    }

    #[test]
    fn test_empty_toml_uses_all_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.game.difficulty, Difficulty::Easy);
        assert!(!config.game.vs_computer);
        assert_eq!(config.presets.hard.prefill, 7);
    }

    #[test]
    fn test_game_config_for_computer_opponent() {
        let mut config = AppConfig::default();
        config.game.difficulty = Difficulty::Hard;
        config.game.vs_computer = true;
        config.game.ai_tier = AiTier::Medium;
        config.game.player_two = String::new();

        let game = config.game_config();
        assert_eq!((game.rows, game.cols, game.prefill), (8, 10, 7));
        assert_eq!(game.opponent, Opponent::Computer(AiTier::Medium));
        assert_eq!(game.names[1], "Computer");
    }

    #[test]
    fn test_game_config_for_human_opponent() {
        let config = AppConfig::default();
        let game = config.game_config();
        assert_eq!(game.opponent, Opponent::Human);
        assert_eq!(game.names, ["Player 1".to_string(), "Player 2".to_string()]);
    }

    #[test]
    fn test_validation_rejects_zero_rows() {
        let mut config = AppConfig::default();
        config.presets.normal.rows = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_oversized_prefill() {
        let mut config = AppConfig::default();
        config.presets.easy.prefill = 43;
        assert!(config.validate().is_err());
        config.presets.easy.prefill = 42;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_overflowing_preset() {
        let mut config = AppConfig::default();
        config.presets.hard.rows = usize::MAX;
        config.presets.hard.cols = 2;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validation_rejects_long_ai_delay() {
        let mut config = AppConfig::default();
        config.game.ai_delay_ms = MAX_AI_DELAY_MS + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = AppConfig::load_or_default(Path::new("nonexistent_config.toml")).unwrap();
        assert_eq!(config.game.difficulty, Difficulty::Easy);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            r#"
[game]
vs_computer = true
ai_tier = "hard"

[presets.easy]
rows = 5
cols = 5
prefill = 2
"#
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert!(config.game.vs_computer);
        assert_eq!(config.game.ai_tier, AiTier::Hard);
        assert_eq!(config.presets.easy.rows, 5);
        // Others are defaults
        assert_eq!(config.presets.hard.cols, 10);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[game]\nai_delay_ms = 999999\n").unwrap();
        assert!(matches!(
            AppConfig::load(&path),
            Err(ConfigError::Validation(_))
        ));

        std::fs::write(&path, "[game]\nai_tier = \"expert\"\n").unwrap();
        assert!(matches!(AppConfig::load(&path), Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn test_default_toml_roundtrips() {
        let toml_str = AppConfig::default_toml();
        let config: AppConfig = toml::from_str(&toml_str).unwrap();
        config.validate().expect("roundtripped config should be valid");
    }

    #[test]
    fn test_difficulty_parsing() {
        assert_eq!("Normal".parse::<Difficulty>().unwrap(), Difficulty::Normal);
        assert!("brutal".parse::<Difficulty>().is_err());
    }
}
