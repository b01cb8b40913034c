use crate::adapters::{ApiSource, FileSource, LocalStorage};
use crate::core::grouping::{StatusFilter, DEFAULT_QUALIFYING_STATUSES};
use crate::core::{ConfigProvider, SubscriptionSource};
use crate::utils::error::{Result, RollupError};
use crate::utils::validation::{
    validate_allowed_values, validate_file_extension, validate_non_empty_string, validate_path,
    validate_range, validate_required_field, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

pub const OUTPUT_FORMATS: [&str; 2] = ["json", "csv"];
pub const DEFAULT_BUNDLE_NAME: &str = "rollup.zip";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollupConfig {
    pub rollup: RollupSection,
    pub source: SourceConfig,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollupSection {
    pub name: String,
    #[serde(default = "default_statuses")]
    pub qualifying_statuses: Vec<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub r#type: String,
    pub path: Option<String>,
    pub endpoint: Option<String>,
    pub headers: Option<HashMap<String, String>>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    #[serde(default = "default_formats")]
    pub output_formats: Vec<String>,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub log_level: Option<String>,
    pub json_logs: Option<bool>,
}

fn default_statuses() -> Vec<String> {
    DEFAULT_QUALIFYING_STATUSES.iter().map(|s| s.to_string()).collect()
}

fn default_formats() -> Vec<String> {
    OUTPUT_FORMATS.iter().map(|s| s.to_string()).collect()
}

impl Default for RollupConfig {
    fn default() -> Self {
        Self {
            rollup: RollupSection {
                name: "subscription-rollup".to_string(),
                qualifying_statuses: default_statuses(),
                base_url: None,
            },
            source: SourceConfig {
                r#type: "file".to_string(),
                path: Some("subscriptions.json".to_string()),
                endpoint: None,
                headers: None,
                timeout_seconds: None,
            },
            load: LoadConfig {
                output_path: "./output".to_string(),
                output_formats: default_formats(),
                compression: None,
            },
            monitoring: None,
        }
    }
}

impl RollupConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(RollupError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| RollupError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${API_TOKEN})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| RollupError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("rollup.name", &self.rollup.name)?;

        if self.rollup.qualifying_statuses.is_empty() {
            return Err(RollupError::InvalidConfigValueError {
                field: "rollup.qualifying_statuses".to_string(),
                value: "[]".to_string(),
                reason: "At least one qualifying status is required".to_string(),
            });
        }
        for status in &self.rollup.qualifying_statuses {
            validate_non_empty_string("rollup.qualifying_statuses", status)?;
        }

        if let Some(base_url) = &self.rollup.base_url {
            validate_url("rollup.base_url", base_url)?;
        }

        match self.source.r#type.as_str() {
            "file" => {
                let path = validate_required_field("source.path", &self.source.path)?;
                validate_path("source.path", path)?;
                validate_file_extension("source.path", path, &["json"])?;
            }
            "api" => {
                let endpoint = validate_required_field("source.endpoint", &self.source.endpoint)?;
                validate_url("source.endpoint", endpoint)?;
            }
            other => {
                return Err(RollupError::InvalidConfigValueError {
                    field: "source.type".to_string(),
                    value: other.to_string(),
                    reason: "Unsupported source type. Valid types: file, api".to_string(),
                })
            }
        }

        if let Some(timeout) = self.source.timeout_seconds {
            validate_range("source.timeout_seconds", timeout, 1, 600)?;
        }

        validate_path("load.output_path", &self.load.output_path)?;
        if self.load.output_formats.is_empty() {
            return Err(RollupError::MissingConfigError {
                field: "load.output_formats".to_string(),
            });
        }
        validate_allowed_values("load.output_formats", &self.load.output_formats, &OUTPUT_FORMATS)?;

        if let Some(filename) = self
            .load
            .compression
            .as_ref()
            .and_then(|c| c.filename.as_deref())
        {
            validate_file_extension("load.compression.filename", filename, &["zip"])?;
        }

        Ok(())
    }

    pub fn status_filter(&self) -> StatusFilter {
        StatusFilter::new(self.rollup.qualifying_statuses.iter().cloned())
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.json_logs)
            .unwrap_or(false)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.monitoring.as_ref().and_then(|m| m.log_level.as_deref())
    }

    /// 依 `[source]` 建立資料來源
    pub fn subscription_source(&self) -> Result<Box<dyn SubscriptionSource>> {
        match self.source.r#type.as_str() {
            "file" => {
                let path = validate_required_field("source.path", &self.source.path)?;
                let storage = LocalStorage::new(".".to_string());
                Ok(Box::new(FileSource::new(storage, path.clone())))
            }
            "api" => {
                let endpoint = validate_required_field("source.endpoint", &self.source.endpoint)?;
                let mut source = ApiSource::new(endpoint.clone());
                if let Some(headers) = &self.source.headers {
                    source = source.with_headers(headers.clone());
                }
                if let Some(timeout) = self.source.timeout_seconds {
                    source = source.with_timeout(Duration::from_secs(timeout));
                }
                Ok(Box::new(source))
            }
            other => Err(RollupError::InvalidConfigValueError {
                field: "source.type".to_string(),
                value: other.to_string(),
                reason: "Unsupported source type. Valid types: file, api".to_string(),
            }),
        }
    }
}

impl ConfigProvider for RollupConfig {
    fn report_name(&self) -> &str {
        &self.rollup.name
    }

    fn qualifying_statuses(&self) -> &[String] {
        &self.rollup.qualifying_statuses
    }

    fn base_url(&self) -> Option<&str> {
        self.rollup.base_url.as_deref()
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.load.output_formats
    }

    fn compress_output(&self) -> bool {
        self.load.compression.as_ref().is_some_and(|c| c.enabled)
    }

    fn bundle_name(&self) -> &str {
        self.load
            .compression
            .as_ref()
            .and_then(|c| c.filename.as_deref())
            .unwrap_or(DEFAULT_BUNDLE_NAME)
    }
}

impl Validate for RollupConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
