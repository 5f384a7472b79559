//! Configuration loading and validation.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use jl_core::{SwitchingCost, SwitchingCostError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default daily target, in minutes (8 hours).
pub const DEFAULT_TARGET_DURATION_MINUTES: i64 = 8 * 60;

/// Invalid configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config: no graph path configured")]
    MissingGraphPath,

    #[error("invalid config: graph path {} does not exist", .0.display())]
    GraphPathNotFound(PathBuf),

    #[error("invalid config: target duration must be a positive number of minutes, got {0}")]
    NegativeTargetDuration(i64),

    #[error("invalid config: {0}")]
    SwitchingCost(#[from] SwitchingCostError),
}

/// Application configuration.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Root of the outliner graph; journals live in its `journals` directory.
    pub graph_path: Option<PathBuf>,

    /// Daily target in minutes.
    pub target_duration: Option<i64>,

    /// Switching cost range in minutes, `"min-max"`.
    pub switching_cost: Option<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("graph_path", &self.graph_path)
            .field("target_duration", &self.target_duration)
            .field("switching_cost", &self.switching_cost)
            .finish()
    }
}

/// Validated settings derived from [`Config`].
#[derive(Debug, Clone)]
pub struct Settings {
    pub graph_path: PathBuf,
    /// Daily target in seconds.
    pub target_duration: u64,
    pub switching_cost: SwitchingCost,
}

impl Config {
    /// Loads configuration from the default location, then optionally from a
    /// specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (JL_*)
        figment = figment.merge(Env::prefixed("JL_"));

        figment.extract()
    }

    /// Validate the raw values.
    pub fn settings(&self) -> Result<Settings, ConfigError> {
        let graph_path = self
            .graph_path
            .clone()
            .ok_or(ConfigError::MissingGraphPath)?;
        if !graph_path.exists() {
            return Err(ConfigError::GraphPathNotFound(graph_path));
        }

        let minutes = self
            .target_duration
            .unwrap_or(DEFAULT_TARGET_DURATION_MINUTES);
        let target_duration = u64::try_from(minutes)
            .map_err(|_| ConfigError::NegativeTargetDuration(minutes))?
            .saturating_mul(60);

        let switching_cost = match self.switching_cost.as_deref() {
            Some(range) => SwitchingCost::parse(range)?,
            None => SwitchingCost::none(),
        };

        Ok(Settings {
            graph_path,
            target_duration,
            switching_cost,
        })
    }
}

/// Returns the platform-specific config directory for jl.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("jl"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(graph_path: &Path) -> Config {
        Config {
            graph_path: Some(graph_path.to_path_buf()),
            ..Config::default()
        }
    }

    #[test]
    fn defaults_apply_when_unset() {
        let temp = tempfile::tempdir().unwrap();
        let settings = config(temp.path()).settings().unwrap();

        assert_eq!(settings.target_duration, 8 * 3600);
        assert_eq!(settings.switching_cost, SwitchingCost::none());
    }

    #[test]
    fn missing_graph_path_is_an_error() {
        let err = Config::default().settings().unwrap_err();
        assert!(matches!(err, ConfigError::MissingGraphPath));
    }

    #[test]
    fn nonexistent_graph_path_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        let err = config(&temp.path().join("missing")).settings().unwrap_err();
        assert!(matches!(err, ConfigError::GraphPathNotFound(_)));
    }

    #[test]
    fn negative_target_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        let err = Config {
            target_duration: Some(-5),
            ..config(temp.path())
        }
        .settings()
        .unwrap_err();
        assert!(matches!(err, ConfigError::NegativeTargetDuration(-5)));
    }

    #[test]
    fn switching_cost_range_is_validated() {
        let temp = tempfile::tempdir().unwrap();

        let settings = Config {
            switching_cost: Some("1-10".to_string()),
            ..config(temp.path())
        }
        .settings()
        .unwrap();
        assert_eq!(settings.switching_cost.max_cost(), 10);

        let err = Config {
            switching_cost: Some("10-1".to_string()),
            ..config(temp.path())
        }
        .settings()
        .unwrap_err();
        assert!(matches!(err, ConfigError::SwitchingCost(_)));
    }

    #[test]
    fn load_reads_specified_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            "graph_path = \"/notes\"\ntarget_duration = 450\nswitching_cost = \"2-8\"\n",
        )
        .unwrap();

        let config = Config::load_from(Some(&path)).unwrap();
        assert_eq!(config.graph_path, Some(PathBuf::from("/notes")));
        assert_eq!(config.target_duration, Some(450));
        assert_eq!(config.switching_cost.as_deref(), Some("2-8"));
    }
}
