//! Google Cloud Text-to-Speech backend.
//!
//! Talks to the `v1beta1` REST surface, which is the one that returns SSML
//! mark timepoints alongside the audio.

use std::collections::BTreeMap;

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use pvgen_models::VoiceConfig;

use crate::error::{TtsError, TtsResult};

const DEFAULT_ENDPOINT: &str = "https://texttospeech.googleapis.com/v1beta1/text:synthesize";

/// One synthesized segment: decoded audio bytes plus SSML mark timings.
#[derive(Debug, Clone)]
pub struct SynthesisOutput {
    pub audio: Vec<u8>,
    /// Mark name to offset in seconds
    pub time_marks: BTreeMap<String, f64>,
}

/// A speech synthesis backend.
///
/// The pipeline depends on this trait so tests can substitute a local fake
/// for the hosted service.
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    async fn synthesize(&self, ssml: &str, voice: &VoiceConfig) -> TtsResult<SynthesisOutput>;
}

/// REST client for Google Cloud TTS.
#[derive(Debug, Clone)]
pub struct GoogleTtsClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GoogleTtsClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.into(),
        }
    }

    /// Override the service endpoint (testing against a local mock).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl SpeechBackend for GoogleTtsClient {
    async fn synthesize(&self, ssml: &str, voice: &VoiceConfig) -> TtsResult<SynthesisOutput> {
        let request = SynthesizeRequest {
            input: SynthesisInput { ssml },
            voice: VoiceSelection {
                name: &voice.voice_name,
                language_code: &voice.language_code,
                ssml_gender: "MALE",
            },
            audio_config: AudioConfig {
                audio_encoding: &voice.audio_encoding,
                pitch: voice.pitch,
                volume_gain_db: voice.volume_gain_db,
                speaking_rate: voice.speaking_rate,
                sample_rate_hertz: voice.sample_rate_hertz,
                effects_profile_id: voice
                    .effects_profile_id
                    .as_deref()
                    .map(|p| vec![p])
                    .unwrap_or_default(),
            },
            enable_time_pointing: vec!["SSML_MARK"],
        };

        debug!(voice = %voice.voice_name, "requesting speech synthesis");
        let response = self
            .http
            .post(&self.endpoint)
            .header("X-Goog-Api-Key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TtsError::api(status.as_u16(), body));
        }

        let body: SynthesizeResponse = response.json().await?;
        let audio_content = body.audio_content.ok_or(TtsError::MissingAudioContent)?;
        let audio = base64::engine::general_purpose::STANDARD.decode(audio_content)?;

        let mut time_marks = BTreeMap::new();
        for tp in body.timepoints {
            match tp.time_seconds {
                Some(seconds) => {
                    time_marks.insert(tp.mark_name, seconds);
                }
                None => {
                    warn!(mark = %tp.mark_name, "timepoint without time_seconds, skipping");
                }
            }
        }

        Ok(SynthesisOutput { audio, time_marks })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceSelection<'a>,
    audio_config: AudioConfig<'a>,
    enable_time_pointing: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
struct SynthesisInput<'a> {
    ssml: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection<'a> {
    name: &'a str,
    language_code: &'a str,
    ssml_gender: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig<'a> {
    audio_encoding: &'a str,
    pitch: f64,
    volume_gain_db: f64,
    speaking_rate: f64,
    sample_rate_hertz: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    effects_profile_id: Vec<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: Option<String>,
    #[serde(default)]
    timepoints: Vec<Timepoint>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Timepoint {
    mark_name: String,
    time_seconds: Option<f64>,
}
