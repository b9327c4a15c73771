use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const APP_DIR: &str = "smart_mail";
pub const DEFAULT_MAX_RESULTS: u32 = 10;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub client_id: String,
    /// Loopback redirect; when unset an ephemeral port is bound for each consent flow.
    pub redirect_uri: Option<String>,
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    pub credential_path: Option<String>,
    #[serde(default)]
    pub summarizer: SummarizerConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SummarizerConfig {
    pub endpoint: String,
    pub model: String,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://router.huggingface.co/hf-inference/models".to_string(),
            model: "sshleifer/distilbart-cnn-6-6".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GeneratorConfig {
    pub base_url: String,
    pub model: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama3-70b-8192".to_string(),
        }
    }
}

fn default_max_results() -> u32 {
    DEFAULT_MAX_RESULTS
}

pub fn config_dir() -> Result<PathBuf> {
    let p = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("no config dir available"))?
        .join(APP_DIR);
    fs::create_dir_all(&p)?;
    Ok(p)
}

pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

pub fn default_credential_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("credential.json"))
}

pub fn log_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("smart_mail.log"))
}

pub fn load_config() -> Result<Config> {
    let path = config_path()?;
    if !path.exists() {
        // create a template config for users to edit
        let sample = Config {
            client_id: "YOUR_CLIENT_ID.apps.googleusercontent.com".to_string(),
            redirect_uri: None,
            max_results: DEFAULT_MAX_RESULTS,
            credential_path: None,
            summarizer: SummarizerConfig::default(),
            generator: GeneratorConfig::default(),
        };
        let tom = toml::to_string_pretty(&sample)?;
        fs::write(&path, tom)?;
        return Err(anyhow::anyhow!(
            "Created template config at {}, edit it and run again",
            path.display()
        ));
    }
    let s = fs::read_to_string(path)?;
    parse_config(&s)
}

pub fn parse_config(s: &str) -> Result<Config> {
    let cfg: Config = toml::from_str(s)?;
    if cfg.max_results == 0 {
        return Err(anyhow::anyhow!("max_results must be at least 1"));
    }
    Ok(cfg)
}

pub fn resolve_credential_path(cfg: &Config) -> Result<PathBuf> {
    if let Some(p) = &cfg.credential_path {
        Ok(PathBuf::from(p))
    } else {
        default_credential_path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_fills_defaults() {
        let cfg = parse_config(r#"client_id = "abc.apps.googleusercontent.com""#).unwrap();
        assert_eq!(cfg.max_results, 10);
        assert!(cfg.redirect_uri.is_none());
        assert_eq!(cfg.summarizer.model, "sshleifer/distilbart-cnn-6-6");
        assert_eq!(
            cfg.summarizer.endpoint,
            "https://router.huggingface.co/hf-inference/models"
        );
        assert_eq!(cfg.generator.model, "llama3-70b-8192");
    }

    #[test]
    fn explicit_sections_override_defaults() {
        let cfg = parse_config(
            r#"
            client_id = "abc"
            max_results = 25
            credential_path = "/tmp/cred.json"

            [generator]
            base_url = "http://localhost:9000/v1"
            model = "tiny"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.max_results, 25);
        assert_eq!(cfg.generator.base_url, "http://localhost:9000/v1");
        assert_eq!(
            resolve_credential_path(&cfg).unwrap(),
            PathBuf::from("/tmp/cred.json")
        );
    }

    #[test]
    fn zero_max_results_is_rejected() {
        assert!(parse_config("client_id = \"abc\"\nmax_results = 0").is_err());
    }
}
