use std::{fs, path::Path, sync::Arc};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use taghive_provider::{LlmProvider, OpenAiProvider};
use taghive_schema::{CategoryEntry, ValidationMode};

use crate::classifier::{ClassifierConfig, LlmClassifier};
use crate::session::SessionRunner;
use crate::taxonomy::{InputMode, Taxonomy, TaxonomyPreset};

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_api_key() -> String {
    "${OPENAI_API_KEY}".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_max_tokens() -> u32 {
    256
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_in_flight() -> usize {
    1
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_api_key")]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key: default_api_key(),
            model: default_model(),
            temperature: 0.0,
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifierSettings {
    #[serde(default)]
    pub preset: TaxonomyPreset,
    #[serde(default)]
    pub validation: ValidationMode,
    /// Overrides the preset's input mode when set.
    #[serde(default)]
    pub input_mode: Option<InputMode>,
    /// Replaces the preset's categories when set.
    #[serde(default)]
    pub taxonomy: Option<Vec<CategoryEntry>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            max_in_flight: default_max_in_flight(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaghiveConfig {
    #[serde(default)]
    pub provider: ProviderSettings,
    #[serde(default)]
    pub classifier: ClassifierSettings,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

impl TaghiveConfig {
    pub fn taxonomy(&self) -> Result<Taxonomy> {
        match &self.classifier.taxonomy {
            Some(entries) => Taxonomy::new(entries.clone()).context("invalid custom taxonomy"),
            None => Ok(self.classifier.preset.taxonomy()),
        }
    }

    pub fn input_mode(&self) -> InputMode {
        self.classifier
            .input_mode
            .unwrap_or_else(|| self.classifier.preset.input_mode())
    }

    pub fn classifier_config(&self) -> ClassifierConfig {
        ClassifierConfig {
            model: self.provider.model.clone(),
            temperature: self.provider.temperature,
            max_tokens: self.provider.max_tokens,
            validation: self.classifier.validation,
        }
    }

    /// Fails when no credential is configured.
    pub fn require_credentials(&self) -> Result<()> {
        if self.provider.api_key.trim().is_empty() {
            return Err(anyhow!(
                "provider.api_key is empty; set OPENAI_API_KEY or provider.api_key in main.yaml"
            ));
        }
        Ok(())
    }

    pub fn build_provider(&self) -> Result<Arc<dyn LlmProvider>> {
        self.require_credentials()?;
        Ok(Arc::new(OpenAiProvider::with_timeout(
            self.provider.api_key.clone(),
            self.provider.api_base.clone(),
            self.provider.timeout_secs,
        )))
    }

    /// Wire a session runner around `provider` using this configuration.
    pub fn build_session(&self, provider: Arc<dyn LlmProvider>) -> Result<SessionRunner> {
        let taxonomy = Arc::new(self.taxonomy()?);
        let classifier = LlmClassifier::new(provider, taxonomy, self.classifier_config());
        Ok(SessionRunner::new(Arc::new(classifier))
            .with_input_mode(self.input_mode())
            .with_max_in_flight(self.session.max_in_flight))
    }
}

pub fn resolve_env_var(raw: &str) -> String {
    let mut output = String::new();
    let mut rest = raw;

    while let Some(start) = rest.find("${") {
        output.push_str(&rest[..start]);

        let candidate = &rest[start + 2..];
        let Some(end) = candidate.find('}') else {
            output.push_str(&rest[start..]);
            return output;
        };

        let key = &candidate[..end];
        output.push_str(&std::env::var(key).unwrap_or_default());
        rest = &candidate[end + 1..];
    }

    output.push_str(rest);
    output
}

/// Load `main.yaml` from `root`, falling back to defaults when it is absent.
pub fn load_config(root: &Path) -> Result<TaghiveConfig> {
    let path = root.join("main.yaml");
    let mut config: TaghiveConfig = if path.exists() {
        read_yaml_file(&path)?
    } else {
        tracing::info!("no config at {}, using defaults", path.display());
        TaghiveConfig::default()
    };

    resolve_provider_env(&mut config.provider);
    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &TaghiveConfig) -> Result<()> {
    if config.provider.api_base.trim().is_empty() {
        return Err(anyhow!("provider.api_base must not be empty"));
    }
    if config.provider.model.trim().is_empty() {
        return Err(anyhow!("provider.model must not be empty"));
    }
    if !(0.0..=2.0).contains(&config.provider.temperature) {
        return Err(anyhow!(
            "provider.temperature must be between 0 and 2, got {}",
            config.provider.temperature
        ));
    }
    if config.provider.max_tokens == 0 {
        return Err(anyhow!("provider.max_tokens must be positive"));
    }
    if config.session.max_in_flight == 0 {
        return Err(anyhow!("session.max_in_flight must be at least 1"));
    }
    config.taxonomy()?;
    Ok(())
}

fn resolve_provider_env(provider: &mut ProviderSettings) {
    provider.api_base = resolve_env_var(&provider.api_base);
    provider.api_key = resolve_env_var(&provider.api_key);
    provider.model = resolve_env_var(&provider.model);
}

fn read_yaml_file<T>(path: &Path) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse yaml file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_main(dir: &Path, yaml: &str) {
        fs::write(dir.join("main.yaml"), yaml).unwrap();
    }

    #[test]
    fn resolve_env_var_expands_known_and_blanks_unknown() {
        std::env::set_var("TAGHIVE_CFG_TEST_A", "alpha");
        std::env::remove_var("TAGHIVE_CFG_TEST_MISSING");
        assert_eq!(
            resolve_env_var("x-${TAGHIVE_CFG_TEST_A}-${TAGHIVE_CFG_TEST_MISSING}-y"),
            "x-alpha--y"
        );
        assert_eq!(resolve_env_var("no vars"), "no vars");
        assert_eq!(resolve_env_var("open ${UNTERMINATED"), "open ${UNTERMINATED");
    }

    #[test]
    fn missing_file_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.provider.model, "gpt-4o");
        assert_eq!(config.provider.temperature, 0.0);
        assert_eq!(config.classifier.preset, TaxonomyPreset::Detailed);
        assert_eq!(config.classifier.validation, ValidationMode::Lenient);
        assert_eq!(config.input_mode(), InputMode::Batch);
        assert_eq!(config.session.max_in_flight, 1);
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn yaml_overrides_and_env_expansion() {
        std::env::set_var("TAGHIVE_CFG_TEST_KEY", "sk-from-env");
        let tmp = tempfile::tempdir().unwrap();
        write_main(
            tmp.path(),
            "provider:\n  api_key: ${TAGHIVE_CFG_TEST_KEY}\n  model: gpt-4o-mini\nclassifier:\n  preset: compact\n  validation: strict\nsession:\n  max_in_flight: 4\n",
        );
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.provider.api_key, "sk-from-env");
        assert_eq!(config.provider.model, "gpt-4o-mini");
        assert_eq!(config.provider.api_base, "https://api.openai.com/v1");
        assert_eq!(config.classifier.validation, ValidationMode::Strict);
        assert_eq!(config.input_mode(), InputMode::Single);
        assert_eq!(config.taxonomy().unwrap().len(), 6);
        assert_eq!(config.session.max_in_flight, 4);
        assert!(config.require_credentials().is_ok());
    }

    #[test]
    fn input_mode_override_wins_over_preset() {
        let tmp = tempfile::tempdir().unwrap();
        write_main(tmp.path(), "classifier:\n  preset: compact\n  input_mode: batch\n");
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.input_mode(), InputMode::Batch);
    }

    #[test]
    fn custom_taxonomy_replaces_preset() {
        let tmp = tempfile::tempdir().unwrap();
        write_main(
            tmp.path(),
            "classifier:\n  taxonomy:\n    - label: Billing\n      description: fares and top-ups\n    - label: Other\n      description: anything else\n",
        );
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.taxonomy().unwrap().labels(), vec!["Billing", "Other"]);
    }

    #[test]
    fn duplicate_custom_labels_fail_validation() {
        let tmp = tempfile::tempdir().unwrap();
        write_main(
            tmp.path(),
            "classifier:\n  taxonomy:\n    - label: Other\n      description: a\n    - label: Other\n      description: b\n",
        );
        let err = load_config(tmp.path()).unwrap_err();
        assert!(format!("{err:#}").contains("duplicate category label"));
    }

    #[test]
    fn out_of_range_temperature_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        write_main(tmp.path(), "provider:\n  temperature: 3.5\n");
        let err = load_config(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("temperature"));
    }

    #[test]
    fn zero_max_in_flight_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        write_main(tmp.path(), "session:\n  max_in_flight: 0\n");
        assert!(load_config(tmp.path()).is_err());
    }

    #[test]
    fn invalid_yaml_reports_path() {
        let tmp = tempfile::tempdir().unwrap();
        write_main(tmp.path(), "provider: [unclosed\n");
        let err = load_config(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("failed to parse yaml file"));
    }

    #[test]
    fn empty_credential_is_reported() {
        let mut config = TaghiveConfig::default();
        config.provider.api_key = String::new();
        let err = config.build_provider().err().unwrap();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }
}
