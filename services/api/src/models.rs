//! API Models
//!
//! Request and response shapes for the HTTP surface, annotated for the
//! generated OpenAPI document.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Language selection for an RTC connection. Unknown or missing codes fall
/// back to the configured defaults.
#[derive(Deserialize, IntoParams, Debug, Default)]
#[into_params(parameter_in = Query)]
pub struct RtcConnectParams {
    /// ISO-639-1 code spoken by the receptionist.
    #[serde(rename = "recLang")]
    #[param(example = "en")]
    pub rec_lang: Option<String>,
    /// ISO-639-1 code spoken by the patient.
    #[serde(rename = "patLang")]
    #[param(example = "zh")]
    pub pat_lang: Option<String>,
}

impl RtcConnectParams {
    /// Picks the language selectors out of raw query pairs.
    ///
    /// The first occurrence of a repeated key wins and unknown keys are ignored,
    /// so malformed selectors fall through to the language defaults.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "recLang" if params.rec_lang.is_none() => params.rec_lang = Some(value),
                "patLang" if params.pat_lang.is_none() => params.pat_lang = Some(value),
                _ => {}
            }
        }
        params
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
    #[schema(example = "gpt-4o-realtime-preview-2024-12-17")]
    pub model: String,
    #[schema(example = 0.7)]
    pub temperature: f64,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct ErrorResponse {
    pub message: String,
}
