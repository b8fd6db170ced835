use axum::http::HeaderValue;
use interpreter_core::{
    BrokerSettings, Language,
    session::{self, TranscriptionLanguage, TurnDetection},
    upstream,
};
use secrecy::SecretString;
use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub frontend_origin: HeaderValue,
    pub openai_api_key: SecretString,
    pub openai_api_base: String,
    pub realtime_model: String,
    pub realtime_voice: String,
    pub temperature: f64,
    pub transcribe_model: String,
    pub transcribe_language: TranscriptionLanguage,
    pub turn_detection: TurnDetection,
    pub session_timeout: Duration,
    pub sdp_timeout: Duration,
    pub default_receptionist_lang: Language,
    pub default_patient_lang: Language,
    pub log_level: Level,
}

fn var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T>(name: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = var_or(name, default);
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue(name.to_string(), format!("'{}': {}", raw, e)))
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let openai_api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingVar("OPENAI_API_KEY".to_string()))?;

        let port: u16 = parse_var("PORT", "8813")?;
        let bind_address = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));

        let frontend_origin_str = var_or("FRONTEND_ORIGIN", "http://localhost:3000");
        let frontend_origin = HeaderValue::from_str(&frontend_origin_str).map_err(|e| {
            ConfigError::InvalidValue("FRONTEND_ORIGIN".to_string(), e.to_string())
        })?;

        let openai_api_base = var_or("OPENAI_API_BASE", upstream::DEFAULT_API_BASE);
        let realtime_model = var_or(
            "OPENAI_REALTIME_MODEL",
            "gpt-4o-realtime-preview-2024-12-17",
        );
        let realtime_voice = var_or("OPENAI_REALTIME_VOICE", "alloy");
        let temperature = session::parse_temperature(&var_or("OPENAI_TEMPERATURE", "0.7"));
        let transcribe_model = var_or("OPENAI_TRANSCRIBE_MODEL", "gpt-4o-mini-transcribe");

        let transcribe_language_str = var_or("OPENAI_TRANSCRIBE_LANGUAGE", "receptionist");
        let transcribe_language = TranscriptionLanguage::parse(&transcribe_language_str)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "OPENAI_TRANSCRIBE_LANGUAGE".to_string(),
                    format!(
                        "'{}' must be one of receptionist, patient, auto",
                        transcribe_language_str
                    ),
                )
            })?;

        let threshold: f64 = parse_var("OPENAI_VAD_THRESHOLD", "0.7")?;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::InvalidValue(
                "OPENAI_VAD_THRESHOLD".to_string(),
                format!("{} is outside [0, 1]", threshold),
            ));
        }
        let turn_detection = TurnDetection {
            threshold,
            prefix_padding_ms: parse_var("OPENAI_VAD_PREFIX_PADDING_MS", "250")?,
            silence_duration_ms: parse_var("OPENAI_VAD_SILENCE_DURATION_MS", "700")?,
            ..TurnDetection::default()
        };

        let session_timeout =
            Duration::from_secs(parse_var("OPENAI_SESSION_TIMEOUT_SECS", "30")?);
        let sdp_timeout = Duration::from_secs(parse_var("OPENAI_SDP_TIMEOUT_SECS", "60")?);

        let default_receptionist_lang: Language = parse_var("DEFAULT_RECEPTIONIST_LANG", "en")?;
        let default_patient_lang: Language = parse_var("DEFAULT_PATIENT_LANG", "zh")?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            bind_address,
            frontend_origin,
            openai_api_key,
            openai_api_base,
            realtime_model,
            realtime_voice,
            temperature,
            transcribe_model,
            transcribe_language,
            turn_detection,
            session_timeout,
            sdp_timeout,
            default_receptionist_lang,
            default_patient_lang,
            log_level,
        })
    }

    /// The subset of configuration the session broker works from.
    pub fn broker_settings(&self) -> BrokerSettings {
        BrokerSettings {
            model: self.realtime_model.clone(),
            voice: self.realtime_voice.clone(),
            temperature: self.temperature,
            transcription_model: self.transcribe_model.clone(),
            transcription_language: self.transcribe_language,
            turn_detection: self.turn_detection.clone(),
            default_receptionist: self.default_receptionist_lang,
            default_patient: self.default_patient_lang,
        }
    }
}
