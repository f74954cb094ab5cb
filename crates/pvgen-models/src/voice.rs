//! Voice synthesis configuration document.

use serde::{Deserialize, Serialize};

/// Parameters forwarded to the speech-synthesis backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceConfig {
    pub voice_name: String,
    pub language_code: String,
    /// Backend audio encoding name, e.g. "MP3"
    pub audio_encoding: String,
    #[serde(default)]
    pub pitch: f64,
    #[serde(default)]
    pub volume_gain_db: f64,
    #[serde(default = "default_speaking_rate")]
    pub speaking_rate: f64,
    #[serde(default = "default_sample_rate")]
    pub sample_rate_hertz: u32,
    #[serde(default)]
    pub effects_profile_id: Option<String>,
}

fn default_speaking_rate() -> f64 {
    1.0
}

fn default_sample_rate() -> u32 {
    24_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_config_defaults() {
        let config: VoiceConfig = serde_json::from_str(
            r#"{
                "voice_name": "en-IN-Wavenet-B",
                "language_code": "en-IN",
                "audio_encoding": "MP3"
            }"#,
        )
        .unwrap();
        assert!((config.speaking_rate - 1.0).abs() < f64::EPSILON);
        assert_eq!(config.sample_rate_hertz, 24_000);
        assert!(config.effects_profile_id.is_none());
    }
}
