//! Session Broker
//!
//! Turns a browser's SDP offer and language selection into an SDP answer from
//! the realtime API. The flow is strictly linear with no retries:
//! validate, build instructions, acquire an ephemeral key, exchange SDP.

use crate::{
    instructions,
    languages::Language,
    session::{self, InputAudioTranscription, SessionRequest, TranscriptionLanguage, TurnDetection},
    upstream::{RealtimeUpstream, UpstreamError},
};
use bytes::Bytes;
use std::sync::Arc;
use tracing::{info, instrument};

/// Everything the broker needs to know about the upstream session, fixed at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct BrokerSettings {
    pub model: String,
    pub voice: String,
    pub temperature: f64,
    pub transcription_model: String,
    pub transcription_language: TranscriptionLanguage,
    pub turn_detection: TurnDetection,
    pub default_receptionist: Language,
    pub default_patient: Language,
}

impl Default for BrokerSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-realtime-preview-2024-12-17".to_string(),
            voice: "alloy".to_string(),
            temperature: session::DEFAULT_TEMPERATURE,
            transcription_model: "gpt-4o-mini-transcribe".to_string(),
            transcription_language: TranscriptionLanguage::Receptionist,
            turn_detection: TurnDetection::default(),
            default_receptionist: Language::ENGLISH,
            default_patient: Language::CHINESE,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NegotiationError {
    #[error("No SDP provided")]
    EmptyOffer,
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// The upstream answer, relayed to the browser byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdpAnswer(pub Bytes);

impl SdpAnswer {
    pub const CONTENT_TYPE: &'static str = "application/sdp";

    pub fn into_inner(self) -> Bytes {
        self.0
    }
}

pub struct SessionBroker {
    upstream: Arc<dyn RealtimeUpstream>,
    settings: BrokerSettings,
}

impl SessionBroker {
    pub fn new(upstream: Arc<dyn RealtimeUpstream>, settings: BrokerSettings) -> Self {
        Self { upstream, settings }
    }

    pub fn settings(&self) -> &BrokerSettings {
        &self.settings
    }

    /// Builds the session-creation body for a resolved language pair.
    pub fn session_request(&self, receptionist: Language, patient: Language) -> SessionRequest {
        let language = match self.settings.transcription_language {
            TranscriptionLanguage::Receptionist => Some(receptionist.code().to_string()),
            TranscriptionLanguage::Patient => Some(patient.code().to_string()),
            TranscriptionLanguage::Auto => None,
        };

        SessionRequest {
            model: self.settings.model.clone(),
            voice: self.settings.voice.clone(),
            modalities: vec!["audio".to_string(), "text".to_string()],
            // Upstream rejects values below the minimum, whatever was configured.
            temperature: session::clamp_temperature(self.settings.temperature),
            instructions: instructions::build_for(receptionist, patient),
            turn_detection: self.settings.turn_detection.clone(),
            input_audio_transcription: InputAudioTranscription {
                model: self.settings.transcription_model.clone(),
                language,
            },
        }
    }

    /// Negotiates a realtime session for one browser offer.
    ///
    /// The service key is only used to create the session; the SDP exchange is
    /// authenticated with the ephemeral key it returns.
    #[instrument(
        name = "negotiate",
        skip_all,
        fields(rec_lang = tracing::field::Empty, pat_lang = tracing::field::Empty)
    )]
    pub async fn negotiate(
        &self,
        client_sdp: Bytes,
        rec_lang_raw: Option<&str>,
        pat_lang_raw: Option<&str>,
    ) -> Result<SdpAnswer, NegotiationError> {
        if client_sdp.is_empty() {
            return Err(NegotiationError::EmptyOffer);
        }

        let receptionist = Language::resolve(rec_lang_raw, self.settings.default_receptionist);
        let patient = Language::resolve(pat_lang_raw, self.settings.default_patient);
        let span = tracing::Span::current();
        span.record("rec_lang", receptionist.code());
        span.record("pat_lang", patient.code());

        let request = self.session_request(receptionist, patient);
        let key = self.upstream.create_session(&request).await?;
        info!(expires_at = ?key.expires_at(), "Ephemeral session key issued");

        let answer = self
            .upstream
            .exchange_sdp(&key, client_sdp, &self.settings.model, &self.settings.voice)
            .await?;
        info!(answer_len = answer.len(), "SDP exchange complete");

        Ok(SdpAnswer(answer))
    }
}
