use std::{env, process, str::FromStr, time::Duration};
use chrono::Utc;

const ENV_FILE: &str = "ddcgen.env";

// Keys shorter than this are rejected before any request is made.
const MIN_API_KEY_LEN: usize = 32;

/// Upstream chat-completion providers. Both speak the OpenAI wire shape;
/// only the base URL and model identifier differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    DeepSeek,
    OpenRouter
}

impl Provider {
    pub fn api_base(&self) -> &'static str {
        match self {
            Provider::DeepSeek => "https://api.deepseek.com/v1",
            Provider::OpenRouter => "https://openrouter.ai/api/v1"
        }
    }

    pub fn model(&self) -> &'static str {
        match self {
            Provider::DeepSeek => "deepseek-chat",
            Provider::OpenRouter => "deepseek/deepseek-chat:free"
        }
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "deepseek" => Ok(Provider::DeepSeek),
            "openrouter" => Ok(Provider::OpenRouter),
            other => Err(format!("unknown provider: {}", other))
        }
    }
}

pub fn validate_api_key(key: &str) -> bool {
    key.trim().len() >= MIN_API_KEY_LEN
}

/// Configuration for the classification client. Always passed in
/// explicitly; the client never reads ambient state.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub provider: Provider,
    pub api_key: String,
    pub temperature: f32,
    pub max_tokens: u32
}

impl ClassifierConfig {
    pub fn new(provider: Provider, api_key: String) -> Self {
        ClassifierConfig {
            provider,
            api_key,
            temperature: 0.3,
            max_tokens: 400
        }
    }

    pub fn from_env() -> Self {
        dotenvy::from_filename(ENV_FILE).ok();
        let api_key = env::var("DDC_API_KEY").expect("DDC_API_KEY not found in env");
        let provider = match env::var("DDC_PROVIDER") {
            Ok(raw) => raw.parse().unwrap_or_else(|e| {
                eprintln!("Failed to parse DDC_PROVIDER: {}", e);
                process::exit(1);
            }),
            Err(_) => Provider::DeepSeek
        };
        let mut config = Self::new(provider, api_key);
        config.temperature = env_parse_or("DDC_TEMPERATURE", config.temperature);
        config.max_tokens = env_parse_or("DDC_MAX_TOKENS", config.max_tokens);
        config
    }
}

/// Tunables for the bulk dispatcher. The chunk/delay values are
/// conservative guesses against an undocumented upstream request-rate
/// ceiling, so every one of them is overridable.
#[derive(Debug, Clone)]
pub struct BulkConfig {
    pub chunk_size: usize,
    pub chunk_delay: Duration,
    pub item_delay: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration
}

#[allow(clippy::should_implement_trait)]
impl BulkConfig {
    pub fn default() -> Self {
        BulkConfig {
            chunk_size: 3,
            chunk_delay: Duration::from_millis(3000),
            item_delay: Duration::from_millis(500),
            max_retries: 3,
            retry_delay: Duration::from_millis(2000)
        }
    }

    pub fn from_env() -> Self {
        dotenvy::from_filename(ENV_FILE).ok();
        let defaults = Self::default();
        BulkConfig {
            chunk_size: env_parse_or("DDC_CHUNK_SIZE", defaults.chunk_size),
            chunk_delay: Duration::from_millis(env_parse_or(
                "DDC_CHUNK_DELAY_MS",
                defaults.chunk_delay.as_millis() as u64
            )),
            item_delay: Duration::from_millis(env_parse_or(
                "DDC_ITEM_DELAY_MS",
                defaults.item_delay.as_millis() as u64
            )),
            max_retries: env_parse_or("DDC_MAX_RETRIES", defaults.max_retries),
            retry_delay: Duration::from_millis(env_parse_or(
                "DDC_RETRY_DELAY_MS",
                defaults.retry_delay.as_millis() as u64
            ))
        }
    }
}

fn env_parse_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            eprintln!("Failed to parse {} from env", key);
            process::exit(1);
        }),
        Err(_) => default
    }
}

/// Timestamped default file names for one run's outputs.
#[derive(Debug)]
pub struct OutputConfig {
    key: String
}

#[allow(dead_code)]
impl OutputConfig {
    pub fn new(key: &str) -> Self {
        OutputConfig {
            key: key.to_string()
        }
    }

    pub fn default() -> Self {
        let key = Utc::now().format("%y%m%d%H%M%S").to_string();
        Self::new(&key)
    }

    pub fn results_csv_path(&self) -> String {
        format!("ddc_classifications_{}.csv", self.key)
    }

    pub fn results_jsonl_path(&self) -> String {
        format!("ddc_classifications_{}.jsonl", self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_str() {
        assert_eq!("deepseek".parse::<Provider>().unwrap(), Provider::DeepSeek);
        assert_eq!("OpenRouter".parse::<Provider>().unwrap(), Provider::OpenRouter);
        assert!("claude".parse::<Provider>().is_err());
    }

    #[test]
    fn test_provider_endpoints() {
        assert_eq!(Provider::DeepSeek.api_base(), "https://api.deepseek.com/v1");
        assert_eq!(Provider::OpenRouter.model(), "deepseek/deepseek-chat:free");
    }

    #[test]
    fn test_api_key_validation() {
        assert!(!validate_api_key(""));
        assert!(!validate_api_key("short"));
        assert!(validate_api_key("sk-0123456789abcdef0123456789abcdef"));
        assert!(validate_api_key("  sk-0123456789abcdef0123456789abcdef  "));
    }

    #[test]
    fn test_bulk_defaults() {
        let config = BulkConfig::default();
        assert_eq!(config.chunk_size, 3);
        assert_eq!(config.chunk_delay, Duration::from_millis(3000));
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_output_paths() {
        let output = OutputConfig::new("250101120000");
        assert_eq!(output.results_csv_path(), "ddc_classifications_250101120000.csv");
        assert_eq!(output.results_jsonl_path(), "ddc_classifications_250101120000.jsonl");
    }
}
