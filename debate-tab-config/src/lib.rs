use core::fmt::{Debug, Display};
use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "debate-tab.toml";
pub const ENV_PREFIX: &str = "DEBATE_TAB_";

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct TournamentConfig {
    pub name: String,
    pub admin_name: String,
    pub admin_email: String,
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawConfig {
    pub speakers_per_room: usize,
    pub judges_per_room: usize,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub tournament: TournamentConfig,
    pub draw: DrawConfig,
    /// Seed for every random choice. Unset means a fresh seed per run.
    pub seed: Option<u64>,
    pub roster_path: PathBuf,
    pub rounds: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tournament: TournamentConfig {
                name: "Debate Tournament".to_owned(),
                admin_name: "Tab Director".to_owned(),
                admin_email: "admin@tabbie.com".to_owned(),
            },
            draw: DrawConfig {
                speakers_per_room: 7,
                judges_per_room: 1,
            },
            seed: None,
            roster_path: PathBuf::from("roster.json"),
            rounds: 3,
        }
    }
}

#[derive(thiserror::Error)]
pub enum ConfigError {
    #[error("config error: {0}")]
    Figment(#[from] figment::Error),
}

impl Debug for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

fn providers(path: &Path) -> Figment {
    Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Defaults, overridden by `debate-tab.toml`, overridden by `DEBATE_TAB_*`
/// environment variables (`DEBATE_TAB_DRAW__JUDGES_PER_ROOM=3`).
pub fn get_config() -> Result<Config, ConfigError> {
    get_config_from(Path::new(CONFIG_FILE))
}

pub fn get_config_from(path: &Path) -> Result<Config, ConfigError> {
    Ok(providers(path).extract()?)
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let directory = tempfile::tempdir().unwrap();
        let config = get_config_from(&directory.path().join("absent.toml")).unwrap();
        assert_eq!(config.draw, Config::default().draw);
        assert_eq!(config.rounds, 3);
    }

    #[test]
    fn file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
seed = 7
rounds = 5

[draw]
speakers_per_room = 4
judges_per_room = 3

[tournament]
name = "Winter Open"
"#
        )
        .unwrap();

        let config = get_config_from(file.path()).unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.rounds, 5);
        assert_eq!(
            config.draw,
            DrawConfig {
                speakers_per_room: 4,
                judges_per_room: 3,
            }
        );
        assert_eq!(config.tournament.name, "Winter Open");
        assert_eq!(config.tournament.admin_name, "Tab Director");
    }

    #[test]
    fn malformed_values_are_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "rounds = \"many\"").unwrap();
        let error = get_config_from(file.path()).unwrap_err();
        assert!(error.to_string().starts_with("config error"));
    }
}
