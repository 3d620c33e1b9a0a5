// src/config/mod.rs
// All tunables come from the environment (with a .env file if present).

use once_cell::sync::Lazy;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct SahayakConfig {
    // ── Chat API Configuration
    pub openai_base_url: String,
    pub openai_api_key: Option<String>,
    pub chat_model: String,
    pub chat_max_tokens: u32,
    pub chat_temperature: f32,
    pub chat_timeout: u64,

    // ── Speech Recognition Configuration
    pub stt_model: String,
    pub stt_primary_language: String,
    pub stt_secondary_language: String,
    pub stt_timeout: u64,

    // ── OCR Configuration
    pub tesseract_cmd: String,
    pub ocr_language: String,
    pub ocr_page_seg_mode: u8,
    pub ocr_timeout: u64,
    pub ocr_preprocess: bool,

    // ── Prompt Configuration
    pub system_prompt_path: String,

    // ── Server Configuration
    pub host: String,
    pub port: u16,
    pub request_timeout: u64,
    pub cors_origin: String,

    // ── Logging Configuration
    pub log_level: String,
}

fn env_var_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(val) => {
            let clean_val = val.split('#').next().unwrap_or("").trim();
            match clean_val.parse::<T>() {
                Ok(parsed) => parsed,
                Err(_) => {
                    eprintln!("Config: {} = '{}' (parse failed, using default)", key, val);
                    default
                }
            }
        }
        Err(_) => default,
    }
}

/// Reads an env var that is allowed to be absent. Empty values count as absent
/// so a blank line in .env does not look like a credential.
fn env_var_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl SahayakConfig {
    pub fn from_env() -> Self {
        if dotenvy::dotenv().is_err() {
            eprintln!("Warning: .env file not found. Using environment variables and defaults.");
        }

        Self {
            openai_base_url: env_var_or("OPENAI_BASE_URL", "https://api.openai.com".to_string()),
            openai_api_key: env_var_opt("OPENAI_API_KEY"),
            chat_model: env_var_or("SAHAYAK_CHAT_MODEL", "gpt-4o".to_string()),
            chat_max_tokens: env_var_or("SAHAYAK_CHAT_MAX_TOKENS", 600),
            chat_temperature: env_var_or("SAHAYAK_CHAT_TEMPERATURE", 0.7),
            chat_timeout: env_var_or("SAHAYAK_CHAT_TIMEOUT", 45),
            stt_model: env_var_or("SAHAYAK_STT_MODEL", "whisper-1".to_string()),
            stt_primary_language: env_var_or("SAHAYAK_STT_PRIMARY_LANGUAGE", "en".to_string()),
            stt_secondary_language: env_var_or("SAHAYAK_STT_SECONDARY_LANGUAGE", "hi".to_string()),
            stt_timeout: env_var_or("SAHAYAK_STT_TIMEOUT", 45),
            tesseract_cmd: env_var_or("SAHAYAK_TESSERACT_CMD", "tesseract".to_string()),
            ocr_language: env_var_or("SAHAYAK_OCR_LANGUAGE", "eng".to_string()),
            ocr_page_seg_mode: env_var_or("SAHAYAK_OCR_PSM", 6),
            ocr_timeout: env_var_or("SAHAYAK_OCR_TIMEOUT", 20),
            ocr_preprocess: env_var_or("SAHAYAK_OCR_PREPROCESS", true),
            system_prompt_path: env_var_or(
                "SAHAYAK_SYSTEM_PROMPT_PATH",
                "config/prompt.txt".to_string(),
            ),
            host: env_var_or("SAHAYAK_HOST", "0.0.0.0".to_string()),
            port: env_var_or("SAHAYAK_PORT", 8000),
            request_timeout: env_var_or("SAHAYAK_REQUEST_TIMEOUT", 120),
            cors_origin: env_var_or("SAHAYAK_CORS_ORIGIN", "*".to_string()),
            log_level: env_var_or("SAHAYAK_LOG_LEVEL", "info".to_string()),
        }
    }

    /// Get server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get full chat API URL for a given endpoint
    pub fn openai_api_url(&self, endpoint: &str) -> String {
        format!("{}/v1/{}", self.openai_base_url, endpoint)
    }

    /// True when no chat credential is available and every answer must come
    /// from the local demo responder.
    pub fn demo_mode(&self) -> bool {
        self.openai_api_key.is_none()
    }
}

// Global config instance - loaded once at startup
pub static CONFIG: Lazy<SahayakConfig> = Lazy::new(SahayakConfig::from_env);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = SahayakConfig::from_env();

        assert_eq!(config.chat_model, "gpt-4o");
        assert_eq!(config.stt_primary_language, "en");
        assert!(config.ocr_page_seg_mode > 0);
    }

    #[test]
    fn test_convenience_methods() {
        let config = SahayakConfig::from_env();

        assert!(
            config
                .openai_api_url("chat/completions")
                .contains("/v1/chat/completions")
        );
        assert!(config.bind_address().contains(':'));
    }

    #[test]
    fn test_env_var_or_strips_comments() {
        // SAFETY: test-only env mutation, key is unique to this test.
        unsafe { std::env::set_var("SAHAYAK_TEST_COMMENTED", "42 # answer") };
        let parsed: u32 = env_var_or("SAHAYAK_TEST_COMMENTED", 0);
        assert_eq!(parsed, 42);
        unsafe { std::env::remove_var("SAHAYAK_TEST_COMMENTED") };
    }

    #[test]
    fn test_empty_credential_is_absent() {
        unsafe { std::env::set_var("SAHAYAK_TEST_EMPTY_KEY", "   ") };
        assert_eq!(env_var_opt("SAHAYAK_TEST_EMPTY_KEY"), None);
        unsafe { std::env::remove_var("SAHAYAK_TEST_EMPTY_KEY") };
    }
}
