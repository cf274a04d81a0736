use crate::adapters::quizlet::{
    QuizletSettings, DEFAULT_BASE_URL, DEFAULT_FETCH_ATTEMPTS, DEFAULT_RETRY_DELAY,
    DEFAULT_TIMEOUT, DEFAULT_USER_AGENT,
};
use crate::core::import_work::DEFAULT_CSV_MAX_BYTES;
use crate::core::worker_pool::DEFAULT_QUEUE_CAPACITY;
use crate::utils::error::{CardsError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_WORKERS: usize = 4;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub quizlet: QuizletConfig,
    pub workers: WorkersConfig,
    pub import: ImportConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizletConfig {
    pub base_url: String,
    pub user_agent: String,
    pub fetch_attempts: u32,
    pub retry_delay_ms: u64,
    pub timeout_seconds: u64,
}

impl Default for QuizletConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fetch_attempts: DEFAULT_FETCH_ATTEMPTS,
            retry_delay_ms: DEFAULT_RETRY_DELAY.as_millis() as u64,
            timeout_seconds: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

/// One pool per import kind, sized independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkersConfig {
    pub quizlet_workers: usize,
    pub quizlet_queue_capacity: usize,
    pub csv_workers: usize,
    pub csv_queue_capacity: usize,
}

impl Default for WorkersConfig {
    fn default() -> Self {
        Self {
            quizlet_workers: DEFAULT_WORKERS,
            quizlet_queue_capacity: DEFAULT_QUEUE_CAPACITY,
            csv_workers: DEFAULT_WORKERS,
            csv_queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub csv_max_bytes: u64,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            csv_max_bytes: DEFAULT_CSV_MAX_BYTES,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub filter: Option<String>,
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CardsError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${QUIZLET_BASE_URL})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| CardsError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("quizlet.base_url", &self.quizlet.base_url)?;
        validation::validate_non_empty_string("quizlet.user_agent", &self.quizlet.user_agent)?;
        validation::validate_range("quizlet.fetch_attempts", self.quizlet.fetch_attempts, 1, 100)?;
        validation::validate_range("quizlet.timeout_seconds", self.quizlet.timeout_seconds, 1, 600)?;

        validation::validate_at_least("workers.quizlet_workers", self.workers.quizlet_workers, 1)?;
        validation::validate_at_least(
            "workers.quizlet_queue_capacity",
            self.workers.quizlet_queue_capacity,
            1,
        )?;
        validation::validate_at_least("workers.csv_workers", self.workers.csv_workers, 1)?;
        validation::validate_at_least("workers.csv_queue_capacity", self.workers.csv_queue_capacity, 1)?;
        validation::validate_at_least("import.csv_max_bytes", self.import.csv_max_bytes, 1)?;

        validation::validate_non_empty_string("storage.data_dir", &self.storage.data_dir)?;

        Ok(())
    }

    pub fn quizlet_settings(&self) -> QuizletSettings {
        QuizletSettings {
            base_url: self.quizlet.base_url.clone(),
            user_agent: self.quizlet.user_agent.clone(),
            fetch_attempts: self.quizlet.fetch_attempts,
            retry_delay: Duration::from_millis(self.quizlet.retry_delay_ms),
            timeout: Duration::from_secs(self.quizlet.timeout_seconds),
        }
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
