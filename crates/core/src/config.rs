//! Configuration management for the campus assistant.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Environment variables
//! - Command-line flags
//! - Config files (.campus/config.yaml)
//!
//! The configuration is workspace-centric, with all state stored in `.campus/`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Generation providers the assistant knows how to talk to.
pub const KNOWN_PROVIDERS: [&str; 2] = ["groq", "ollama"];

/// Default Groq endpoint (OpenAI-compatible API root).
pub const DEFAULT_GROQ_ENDPOINT: &str = "https://api.groq.com/openai/v1";

/// Default Ollama endpoint.
pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434";

/// Main application configuration.
///
/// This struct holds all global configuration options that affect
/// CLI behavior across commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .campus/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Generation provider ("groq" or "ollama")
    pub provider: String,

    /// Generation model identifier
    pub model: String,

    /// Explicit API key for the generation provider
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Provider configurations from config.yaml
    pub llm: Option<LlmConfig>,
}

/// LLM configuration from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    Groq {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        endpoint: Option<String>,
    },
    Ollama {
        endpoint: String,
        model: String,
    },
}

impl ProviderConfig {
    pub fn model(&self) -> &str {
        match self {
            ProviderConfig::Groq { model, .. } | ProviderConfig::Ollama { model, .. } => model,
        }
    }

    pub fn endpoint(&self) -> Option<&str> {
        match self {
            ProviderConfig::Groq { endpoint, .. } => endpoint.as_deref(),
            ProviderConfig::Ollama { endpoint, .. } => Some(endpoint),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    workspace: Option<WorkspaceConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "groq".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
            llm: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// Environment variables:
    /// - `CAMPUS_WORKSPACE`: Override workspace path
    /// - `CAMPUS_CONFIG`: Path to config file
    /// - `CAMPUS_PROVIDER`: Generation provider
    /// - `CAMPUS_MODEL`: Model identifier
    /// - `CAMPUS_API_KEY`: API key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use campus_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Workspace: {:?}", config.workspace);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_with(None, None)
    }

    /// Load configuration for an explicit workspace and config file.
    ///
    /// Either path, when given, wins over its environment variable; the YAML
    /// file is then read from the resolved location.
    pub fn load_with(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        match workspace {
            Some(workspace) => config.workspace = workspace,
            None => {
                if let Ok(workspace) = std::env::var("CAMPUS_WORKSPACE") {
                    config.workspace = PathBuf::from(workspace);
                }
            }
        }

        config.config_file =
            config_file.or_else(|| std::env::var("CAMPUS_CONFIG").ok().map(PathBuf::from));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => cf.clone(),
            None => config.campus_dir().join("config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("CAMPUS_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("CAMPUS_MODEL") {
            config.model = model;
        }

        config.api_key = std::env::var("CAMPUS_API_KEY").ok();
        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(ws) = config_file.workspace {
            if let Some(path) = ws.path {
                result.workspace = PathBuf::from(path);
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();

            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                result.model = provider_config.model().to_string();
            }

            result.llm = Some(llm);
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the YAML file.
    /// The workspace and config file are resolved earlier by [`AppConfig::load_with`].
    pub fn with_overrides(
        mut self,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Path to the .campus directory.
    pub fn campus_dir(&self) -> PathBuf {
        self.workspace.join(".campus")
    }

    /// Ensure the .campus directory exists.
    pub fn ensure_campus_dir(&self) -> AppResult<()> {
        let campus_dir = self.campus_dir();
        if !campus_dir.exists() {
            std::fs::create_dir_all(&campus_dir).map_err(|e| {
                AppError::Config(format!("Failed to create .campus directory: {}", e))
            })?;
        }
        Ok(())
    }

    /// Provider configuration from config.yaml, if any.
    pub fn get_provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.llm.as_ref().and_then(|llm| llm.providers.get(provider))
    }

    /// Endpoint for a provider, falling back to the provider's public default.
    pub fn endpoint_for(&self, provider: &str) -> Option<String> {
        if let Some(endpoint) = self.get_provider_config(provider).and_then(|p| p.endpoint()) {
            return Some(endpoint.to_string());
        }
        match provider {
            "groq" => Some(DEFAULT_GROQ_ENDPOINT.to_string()),
            "ollama" => Some(DEFAULT_OLLAMA_ENDPOINT.to_string()),
            _ => None,
        }
    }

    /// Name of the environment variable holding the provider's API key.
    fn api_key_env(&self, provider: &str) -> Option<String> {
        match self.get_provider_config(provider) {
            Some(ProviderConfig::Groq { api_key_env, .. }) => Some(api_key_env.clone()),
            Some(ProviderConfig::Ollama { .. }) => None,
            None if provider == "groq" => Some("GROQ_API_KEY".to_string()),
            None => None,
        }
    }

    /// Resolve the API key: explicit `CAMPUS_API_KEY` first, then the provider's env var.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        self.api_key_env(provider)
            .and_then(|env_var| std::env::var(env_var).ok())
            .filter(|key| !key.trim().is_empty())
    }

    /// Validate configuration for the active provider.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.provider.as_str();

        if !KNOWN_PROVIDERS.contains(&provider) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if let Some(env_var) = self.api_key_env(provider) {
            if self.resolve_api_key(provider).is_none() {
                return Err(AppError::Config(format!(
                    "API key not found in environment variable: {}",
                    env_var
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "groq");
        assert_eq!(config.model, "llama-3.3-70b-versatile");
        assert!(!config.verbose);
        assert!(!config.no_color);
    }

    #[test]
    fn test_campus_dir() {
        let config = AppConfig::default();
        assert!(config.campus_dir().ends_with(".campus"));
    }

    #[test]
    fn test_with_overrides() {
        let overridden = AppConfig::default().with_overrides(
            Some("ollama".to_string()),
            Some("llama3.2".to_string()),
            None,
            true,
            false,
        );

        assert_eq!(overridden.provider, "ollama");
        assert_eq!(overridden.model, "llama3.2");
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_validate_unknown_provider() {
        let mut config = AppConfig::default();
        config.provider = "unknown".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_ollama_needs_no_key() {
        let mut config = AppConfig::default();
        config.provider = "ollama".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_groq_with_explicit_key() {
        let mut config = AppConfig::default();
        config.api_key = Some("gsk-test".to_string());
        assert!(config.validate().is_ok());
        assert_eq!(config.resolve_api_key("groq"), Some("gsk-test".to_string()));
    }

    #[test]
    fn test_validate_groq_missing_key_env() {
        let mut config = AppConfig::default();
        config.llm = Some(LlmConfig {
            active_provider: "groq".to_string(),
            providers: HashMap::from([(
                "groq".to_string(),
                ProviderConfig::Groq {
                    api_key_env: "CAMPUS_TEST_UNSET_KEY_VAR".to_string(),
                    model: "llama-3.3-70b-versatile".to_string(),
                    endpoint: None,
                },
            )]),
        });

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("CAMPUS_TEST_UNSET_KEY_VAR"));
    }

    #[test]
    fn test_merge_yaml_sets_provider_and_model() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            r#"
llm:
  activeProvider: ollama
  providers:
    ollama:
      endpoint: http://localhost:11434
      model: llama3.2
logging:
  level: warn
  color: false
"#,
        )
        .unwrap();

        let merged = AppConfig::default().merge_yaml(&path).unwrap();
        assert_eq!(merged.provider, "ollama");
        assert_eq!(merged.model, "llama3.2");
        assert_eq!(merged.log_level, Some("warn".to_string()));
        assert!(merged.no_color);
        assert_eq!(
            merged.endpoint_for("ollama"),
            Some("http://localhost:11434".to_string())
        );
    }

    #[test]
    fn test_load_with_explicit_config_file() {
        let workspace = TempDir::new().unwrap();
        let elsewhere = TempDir::new().unwrap();
        let path = elsewhere.path().join("other.yaml");
        std::fs::write(
            &path,
            r#"
llm:
  activeProvider: ollama
  providers:
    ollama:
      endpoint: http://gpu-box:11434
      model: mistral
"#,
        )
        .unwrap();

        let config = AppConfig::load_with(Some(workspace.path().to_path_buf()), Some(path.clone()))
            .unwrap()
            .with_overrides(None, Some("llama3.2".to_string()), None, false, false);

        assert_eq!(config.workspace, workspace.path());
        assert_eq!(config.config_file, Some(path));
        assert_eq!(config.provider, "ollama");
        assert_eq!(config.model, "llama3.2");
        assert_eq!(
            config.endpoint_for("ollama"),
            Some("http://gpu-box:11434".to_string())
        );
    }

    #[test]
    fn test_load_with_workspace_reads_its_config() {
        let workspace = TempDir::new().unwrap();
        let campus_dir = workspace.path().join(".campus");
        std::fs::create_dir_all(&campus_dir).unwrap();
        std::fs::write(
            campus_dir.join("config.yaml"),
            r#"
llm:
  activeProvider: ollama
  providers:
    ollama:
      endpoint: http://localhost:11434
      model: phi3
"#,
        )
        .unwrap();

        let config = AppConfig::load_with(Some(workspace.path().to_path_buf()), None).unwrap();
        assert_eq!(config.provider, "ollama");
        assert_eq!(config.model, "phi3");
    }

    #[test]
    fn test_load_with_missing_workspace() {
        let dir = TempDir::new().unwrap();
        let result = AppConfig::load_with(Some(dir.path().join("missing")), None);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_endpoint_defaults() {
        let config = AppConfig::default();
        assert_eq!(
            config.endpoint_for("groq"),
            Some(DEFAULT_GROQ_ENDPOINT.to_string())
        );
        assert_eq!(config.endpoint_for("nope"), None);
    }
}
