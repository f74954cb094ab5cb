//! Per-user voiceover synthesis.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::info;

use pvgen_models::{AudioSegment, SynthesizedAudio, VoiceConfig};

use crate::error::TtsResult;
use crate::google::SpeechBackend;

/// Synthesize every segment of a user's script into
/// `{voiceovers_dir}/{key}/audio_part_{n}.mp3` (1-based).
///
/// Returns the synthesized segments plus the total time spent in the
/// synthesis calls. Any failing segment fails the whole user; a video with a
/// hole in its voiceover is worse than no video.
pub async fn synthesize_segments(
    backend: &dyn SpeechBackend,
    key: &str,
    segments: &[AudioSegment],
    voice: &VoiceConfig,
    voiceovers_dir: &Path,
) -> TtsResult<(Vec<SynthesizedAudio>, f64)> {
    let user_dir = voiceovers_dir.join(key);
    tokio::fs::create_dir_all(&user_dir).await?;

    let mut synthesized = Vec::with_capacity(segments.len());
    let mut total_synthesis_time = 0.0;

    for (idx, segment) in segments.iter().enumerate() {
        let started = Instant::now();
        let output = backend.synthesize(&segment.speech_text, voice).await?;
        let synthesis_time = started.elapsed().as_secs_f64();

        let file: PathBuf = user_dir.join(format!("audio_part_{}.mp3", idx + 1));
        tokio::fs::write(&file, &output.audio).await?;

        total_synthesis_time += synthesis_time;
        synthesized.push(SynthesizedAudio {
            segment_name: segment.segment_name.clone(),
            file,
            time_marks: output.time_marks,
            synthesis_time,
        });
    }

    info!(
        user_key = %key,
        segments = synthesized.len(),
        synthesis_secs = format!("{:.2}", total_synthesis_time),
        "all audio segments synthesized"
    );
    Ok((synthesized, total_synthesis_time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TtsError;
    use crate::google::SynthesisOutput;
    use async_trait::async_trait;
    use std::collections::BTreeMap;

    struct FakeBackend {
        fail_on: Option<&'static str>,
    }

    #[async_trait]
    impl SpeechBackend for FakeBackend {
        async fn synthesize(
            &self,
            ssml: &str,
            _voice: &VoiceConfig,
        ) -> TtsResult<SynthesisOutput> {
            if let Some(needle) = self.fail_on {
                if ssml.contains(needle) {
                    return Err(TtsError::MissingAudioContent);
                }
            }
            let mut time_marks = BTreeMap::new();
            time_marks.insert("m1".to_string(), 0.5);
            Ok(SynthesisOutput {
                audio: ssml.as_bytes().to_vec(),
                time_marks,
            })
        }
    }

    fn voice() -> VoiceConfig {
        serde_json::from_str(
            r#"{
                "voice_name": "v", "language_code": "en-IN",
                "audio_encoding": "MP3", "pitch": 0.0, "volume_gain_db": 0.0
            }"#,
        )
        .unwrap()
    }

    fn segments() -> Vec<AudioSegment> {
        vec![
            AudioSegment {
                segment_name: "intro".to_string(),
                speech_text: "<speak>one</speak>".to_string(),
            },
            AudioSegment {
                segment_name: "outro".to_string(),
                speech_text: "<speak>two</speak>".to_string(),
            },
        ]
    }

    #[tokio::test]
    async fn test_files_are_numbered_from_one() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FakeBackend { fail_on: None };
        let (audio, total) =
            synthesize_segments(&backend, "user_1", &segments(), &voice(), dir.path())
                .await
                .unwrap();

        assert_eq!(audio.len(), 2);
        assert_eq!(
            audio[0].file,
            dir.path().join("user_1").join("audio_part_1.mp3")
        );
        assert_eq!(
            audio[1].file,
            dir.path().join("user_1").join("audio_part_2.mp3")
        );
        assert!(audio[0].file.exists());
        assert_eq!(audio[0].time_marks.get("m1"), Some(&0.5));
        assert!(total >= 0.0);
    }

    #[tokio::test]
    async fn test_one_bad_segment_fails_the_user() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FakeBackend {
            fail_on: Some("two"),
        };
        let result =
            synthesize_segments(&backend, "user_1", &segments(), &voice(), dir.path()).await;
        assert!(result.is_err());
    }
}
