//! Configuration loading with environment overrides.

use super::CohortWarmingConfig;
use crate::constants::{CONFIG_ENV_PREFIX, CONFIG_FILE_STEM};
use crate::error::Result;
use config::{Config, Environment, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Loaded, validated configuration plus where it came from
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: CohortWarmingConfig,
    environment: String,
    config_directory: PathBuf,
}

impl ConfigManager {
    /// Load configuration from the default directory for the detected environment
    pub fn load() -> Result<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    /// Load configuration from `config_dir` (or the default) for the detected environment
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> Result<Arc<ConfigManager>> {
        let directory = config_dir.unwrap_or_else(Self::default_config_directory);
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(directory, &environment)
    }

    /// Load configuration from a directory for an explicit environment.
    ///
    /// Sources, lowest precedence first: `cohort-warming.toml`,
    /// `environments/{environment}.toml`, `COHORT_WARMING__*` variables.
    /// Missing files are skipped.
    pub fn load_from_directory_with_env(
        config_dir: impl AsRef<Path>,
        environment: &str,
    ) -> Result<Arc<ConfigManager>> {
        let config_directory = config_dir.as_ref().to_path_buf();
        let base_file = config_directory.join(format!("{CONFIG_FILE_STEM}.toml"));
        let environment_file = config_directory
            .join("environments")
            .join(format!("{environment}.toml"));

        debug!(
            base_file = %base_file.display(),
            environment_file = %environment_file.display(),
            environment = %environment,
            "Loading cohort warming configuration"
        );

        let config: CohortWarmingConfig = Config::builder()
            .add_source(File::from(base_file).required(false))
            .add_source(File::from(environment_file).required(false))
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;

        info!(
            environment = %environment,
            page_size = config.warming.page_size,
            batch_size = config.warming.batch_size,
            min_cohort_count = config.warming.min_cohort_count,
            run_max_retries = config.retry.max_retries,
            "Configuration loaded"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory,
        }))
    }

    /// Wrap an already-built configuration, validating it
    pub fn from_config(config: CohortWarmingConfig, environment: &str) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            environment: environment.to_string(),
            config_directory: Self::default_config_directory(),
        })
    }

    pub fn config(&self) -> &CohortWarmingConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    /// Configuration as JSON with the database URL masked
    pub fn debug_config(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(&self.config).unwrap_or(serde_json::Value::Null);
        if let Some(url) = value.pointer_mut("/database/url") {
            if !url.is_null() {
                *url = serde_json::Value::String("***REDACTED***".to_string());
            }
        }
        value
    }

    fn detect_environment() -> String {
        crate::logging::get_environment()
    }

    fn default_config_directory() -> PathBuf {
        std::env::var("COHORT_WARMING_CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup_config_dir(base: &str, environment: Option<(&str, &str)>) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("cohort-warming.toml"), base).unwrap();
        if let Some((name, contents)) = environment {
            let env_dir = dir.path().join("environments");
            fs::create_dir_all(&env_dir).unwrap();
            fs::write(env_dir.join(format!("{name}.toml")), contents).unwrap();
        }
        dir
    }

    #[test]
    fn test_basic_config_loading() {
        let dir = setup_config_dir(
            r#"
[warming]
page_size = 200
batch_size = 20
min_cohort_count = 10

[retry]
max_retries = 2
backoff_seconds = 60
"#,
            None,
        );

        let manager = ConfigManager::load_from_directory_with_env(dir.path(), "test").unwrap();
        let config = manager.config();
        assert_eq!(config.warming.page_size, 200);
        assert_eq!(config.warming.batch_size, 20);
        assert_eq!(config.warming.min_cohort_count, 10);
        assert_eq!(config.warming.team_warm_max_retries, 3);
        assert_eq!(config.retry.max_retries, 2);
        assert_eq!(config.retry.backoff_seconds, 60);
        assert_eq!(manager.environment(), "test");
    }

    #[test]
    fn test_environment_specific_overrides() {
        let dir = setup_config_dir(
            "[warming]\npage_size = 500\nbatch_size = 25\n",
            Some(("production", "[warming]\nbatch_size = 100\n")),
        );

        let manager =
            ConfigManager::load_from_directory_with_env(dir.path(), "production").unwrap();
        assert_eq!(manager.config().warming.page_size, 500);
        assert_eq!(manager.config().warming.batch_size, 100);

        let manager =
            ConfigManager::load_from_directory_with_env(dir.path(), "development").unwrap();
        assert_eq!(manager.config().warming.batch_size, 25);
    }

    #[test]
    fn test_missing_directory_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let manager =
            ConfigManager::load_from_directory_with_env(dir.path().join("absent"), "test")
                .unwrap();
        assert_eq!(manager.config().warming.page_size, 1000);
        assert_eq!(manager.config().warming.min_cohort_count, 50);
    }

    #[test]
    fn test_environment_variable_override() {
        let dir = setup_config_dir("[queue]\nmax_pending_chains = 10\n", None);
        std::env::set_var("COHORT_WARMING__QUEUE__MAX_PENDING_CHAINS", "77");
        let manager = ConfigManager::load_from_directory_with_env(dir.path(), "test");
        std::env::remove_var("COHORT_WARMING__QUEUE__MAX_PENDING_CHAINS");

        assert_eq!(manager.unwrap().config().queue.max_pending_chains, 77);
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let dir = setup_config_dir("[warming]\nbatch_size = 0\n", None);
        let err = ConfigManager::load_from_directory_with_env(dir.path(), "test").unwrap_err();
        assert!(err.to_string().contains("warming.batch_size"));
    }

    #[test]
    fn test_debug_config_redacts_database_url() {
        let mut config = CohortWarmingConfig::default();
        config.database.url = Some("postgresql://user:secret@db/analytics".to_string());
        let manager = ConfigManager::from_config(config, "test").unwrap();

        let rendered = manager.debug_config().to_string();
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("REDACTED"));
    }
}
