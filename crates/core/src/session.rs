//! Realtime Session Wire Types
//!
//! Request and response bodies for the upstream session endpoint, plus the
//! tuning knobs (temperature, VAD, transcription) used to build them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest temperature the upstream platform accepts.
pub const MIN_TEMPERATURE: f64 = 0.6;
/// Highest temperature this service will request.
pub const MAX_TEMPERATURE: f64 = 1.5;
/// Used when the configured value cannot be parsed.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Clamps a temperature into `[MIN_TEMPERATURE, MAX_TEMPERATURE]`.
pub fn clamp_temperature(value: f64) -> f64 {
    if !value.is_finite() {
        return DEFAULT_TEMPERATURE;
    }
    value.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE)
}

/// Parses a raw temperature setting. Never fails.
pub fn parse_temperature(raw: &str) -> f64 {
    let value = raw.trim().parse::<f64>().unwrap_or(DEFAULT_TEMPERATURE);
    clamp_temperature(value)
}

/// Voice-activity-detection parameters for server-side turn detection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnDetection {
    #[serde(rename = "type")]
    pub kind: String,
    pub threshold: f64,
    pub prefix_padding_ms: u32,
    pub silence_duration_ms: u32,
}

impl Default for TurnDetection {
    fn default() -> Self {
        Self {
            kind: "server_vad".to_string(),
            threshold: 0.70,
            prefix_padding_ms: 250,
            silence_duration_ms: 700,
        }
    }
}

/// Which language, if any, is passed to the transcription model as a hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TranscriptionLanguage {
    /// Hint with the receptionist's language.
    #[default]
    Receptionist,
    /// Hint with the patient's language.
    Patient,
    /// No hint; the transcription model detects the language itself.
    Auto,
}

impl TranscriptionLanguage {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "receptionist" => Some(Self::Receptionist),
            "patient" => Some(Self::Patient),
            "auto" => Some(Self::Auto),
            _ => None,
        }
    }
}

impl fmt::Display for TranscriptionLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Receptionist => write!(f, "receptionist"),
            Self::Patient => write!(f, "patient"),
            Self::Auto => write!(f, "auto"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputAudioTranscription {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Body of the upstream session-creation call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionRequest {
    pub model: String,
    pub voice: String,
    pub modalities: Vec<String>,
    pub temperature: f64,
    pub instructions: String,
    pub turn_detection: TurnDetection,
    pub input_audio_transcription: InputAudioTranscription,
}

/// The subset of the upstream session response this service reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionResponse {
    #[serde(default)]
    pub client_secret: Option<ClientSecret>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientSecret {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub expires_at: Option<i64>,
}

impl SessionResponse {
    /// Extracts the ephemeral key, treating an empty value as missing.
    pub fn into_ephemeral_key(self) -> Option<EphemeralKey> {
        let secret = self.client_secret?;
        let value = secret.value.filter(|v| !v.is_empty())?;
        Some(EphemeralKey {
            value,
            expires_at: secret.expires_at,
        })
    }
}

/// A short-lived credential scoped to a single realtime session.
#[derive(Clone, PartialEq, Eq)]
pub struct EphemeralKey {
    value: String,
    expires_at: Option<i64>,
}

impl EphemeralKey {
    pub fn new(value: impl Into<String>, expires_at: Option<i64>) -> Self {
        Self {
            value: value.into(),
            expires_at,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Unix timestamp after which upstream rejects the key, if reported.
    pub fn expires_at(&self) -> Option<i64> {
        self.expires_at
    }
}

// Keep the token out of logs.
impl fmt::Debug for EphemeralKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EphemeralKey")
            .field("value", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_temperature_clamps() {
        assert_eq!(parse_temperature("2.0"), 1.5);
        assert_eq!(parse_temperature("0.1"), 0.6);
        assert_eq!(parse_temperature("0.9"), 0.9);
        assert_eq!(parse_temperature(" 1.2 "), 1.2);
    }

    #[test]
    fn test_parse_temperature_defaults_on_garbage() {
        assert_eq!(parse_temperature("warm"), 0.7);
        assert_eq!(parse_temperature(""), 0.7);
        assert_eq!(parse_temperature("NaN"), 0.7);
        assert_eq!(parse_temperature("inf"), 0.7);
    }

    #[test]
    fn test_transcription_language_parse() {
        assert_eq!(
            TranscriptionLanguage::parse("AUTO"),
            Some(TranscriptionLanguage::Auto)
        );
        assert_eq!(
            TranscriptionLanguage::parse("patient"),
            Some(TranscriptionLanguage::Patient)
        );
        assert_eq!(TranscriptionLanguage::parse("both"), None);
        assert_eq!(TranscriptionLanguage::default().to_string(), "receptionist");
    }

    #[test]
    fn test_session_request_serialization() {
        let request = SessionRequest {
            model: "gpt-4o-realtime-preview-2024-12-17".to_string(),
            voice: "alloy".to_string(),
            modalities: vec!["audio".to_string(), "text".to_string()],
            temperature: 0.7,
            instructions: "be an interpreter".to_string(),
            turn_detection: TurnDetection::default(),
            input_audio_transcription: InputAudioTranscription {
                model: "gpt-4o-mini-transcribe".to_string(),
                language: Some("en".to_string()),
            },
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "model": "gpt-4o-realtime-preview-2024-12-17",
                "voice": "alloy",
                "modalities": ["audio", "text"],
                "temperature": 0.7,
                "instructions": "be an interpreter",
                "turn_detection": {
                    "type": "server_vad",
                    "threshold": 0.7,
                    "prefix_padding_ms": 250,
                    "silence_duration_ms": 700
                },
                "input_audio_transcription": {
                    "model": "gpt-4o-mini-transcribe",
                    "language": "en"
                }
            })
        );
    }

    #[test]
    fn test_auto_transcription_omits_language() {
        let transcription = InputAudioTranscription {
            model: "whisper-1".to_string(),
            language: None,
        };
        let value = serde_json::to_value(&transcription).unwrap();
        assert_eq!(value, json!({ "model": "whisper-1" }));
    }

    #[test]
    fn test_session_response_extracts_key() {
        let response: SessionResponse = serde_json::from_value(json!({
            "id": "sess_123",
            "client_secret": { "value": "ek_abc", "expires_at": 1735689600 }
        }))
        .unwrap();
        let key = response.into_ephemeral_key().expect("key present");
        assert_eq!(key.value(), "ek_abc");
        assert_eq!(key.expires_at(), Some(1735689600));
    }

    #[test]
    fn test_session_response_missing_key() {
        let cases = [
            json!({}),
            json!({ "client_secret": null }),
            json!({ "client_secret": {} }),
            json!({ "client_secret": { "value": "" } }),
        ];
        for case in cases {
            let response: SessionResponse = serde_json::from_value(case.clone()).unwrap();
            assert!(response.into_ephemeral_key().is_none(), "case {}", case);
        }
    }

    #[test]
    fn test_ephemeral_key_debug_is_redacted() {
        let key = EphemeralKey::new("ek_super_secret", None);
        let debug = format!("{:?}", key);
        assert!(!debug.contains("ek_super_secret"));
        assert!(debug.contains("REDACTED"));
    }
}
