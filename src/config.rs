use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "PRICECAST_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Yaml {
        path: String,
        source: serde_yaml::Error,
    },
}

#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub model: ModelConfig,
    pub split: SplitConfig,
    pub evaluation: EvaluationConfig,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            host: "0.0.0.0".to_string(),
        }
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct DataConfig {
    pub demographics_path: PathBuf,
    /// Historical sales, only read by the evaluation report.
    pub sales_path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            demographics_path: PathBuf::from("data/zipcode_demographics.csv"),
            sales_path: PathBuf::from("data/kc_house_data.csv"),
        }
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    pub path: PathBuf,
    pub load_policy: LoadPolicy,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("model/model.onnx"),
            load_policy: LoadPolicy::Fresh,
        }
    }
}

#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LoadPolicy {
    /// Re-read the artifact on every prediction.
    #[default]
    Fresh,
    /// Load once on first use and keep it for the process lifetime.
    Cached,
}

/// Train/test split parameters. Must match the job that trained the model,
/// otherwise the evaluation metrics are computed on leaked rows.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct SplitConfig {
    pub seed: u32,
    pub test_fraction: f64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            test_fraction: 0.25,
        }
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct EvaluationConfig {
    pub outliers: usize,
    pub output_path: PathBuf,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            outliers: 5,
            output_path: PathBuf::from("results_scatter.svg"),
        }
    }
}

impl AppConfig {
    pub fn from_yaml(path: &str, content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|source| ConfigError::Yaml {
            path: path.to_string(),
            source,
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&path.display().to_string(), &content)
    }

    /// Loads the config named by `PRICECAST_CONFIG` (or `config.yaml`).
    /// A missing file is not an error: every field has a default.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        if !Path::new(&path).exists() {
            tracing::warn!(path = %path, "config file not found, using defaults");
            return Ok(Self::default());
        }
        tracing::info!(path = %path, "loading config");
        Self::from_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.split.seed, 42);
        assert_eq!(config.split.test_fraction, 0.25);
        assert_eq!(config.evaluation.outliers, 5);
        assert_eq!(config.model.load_policy, LoadPolicy::Fresh);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
server:
  port: 8080
model:
  path: model/linear.json
  load_policy: cached
split:
  seed: 7
"#;
        let config = AppConfig::from_yaml("inline", yaml).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.model.path, PathBuf::from("model/linear.json"));
        assert_eq!(config.model.load_policy, LoadPolicy::Cached);
        assert_eq!(config.split.seed, 7);
        assert_eq!(config.split.test_fraction, 0.25);
        assert_eq!(
            config.data.demographics_path,
            PathBuf::from("data/zipcode_demographics.csv")
        );
    }

    #[test]
    fn test_invalid_yaml() {
        let result = AppConfig::from_yaml("inline", "server: [1, 2");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn test_unknown_load_policy_rejected() {
        let result = AppConfig::from_yaml("inline", "model:\n  load_policy: sometimes\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "evaluation:\n  outliers: 3\n  output_path: out.svg").unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.evaluation.outliers, 3);
        assert_eq!(config.evaluation.output_path, PathBuf::from("out.svg"));
    }

    #[test]
    fn test_from_missing_file() {
        let result = AppConfig::from_file("does/not/exist.yaml");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
