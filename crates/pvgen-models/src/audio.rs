//! Voiceover script segments and synthesized audio metadata.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One named unit of spoken script.
///
/// `speech_text` starts as a template with `{field}` placeholders and is
/// resolved in place before synthesis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioSegment {
    /// Segment name, matched against the template's audio cues
    pub segment_name: String,
    /// SSML speech text, possibly containing `{field}` placeholders
    pub speech_text: String,
}

/// Where a synthesized segment starts on the video timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentCue {
    pub segment_name: String,
    /// Start offset in seconds from the beginning of the video
    pub start_time: f64,
}

/// A template's declaration of one audio segment: the scripted speech text
/// plus its position on the timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptedSegment {
    pub segment_name: String,
    /// SSML speech text with `{field}` placeholders
    pub speech_text: String,
    /// Start offset in seconds from the beginning of the video
    #[serde(default)]
    pub start_time: f64,
}

impl ScriptedSegment {
    /// The script half, fed to synthesis.
    pub fn segment(&self) -> AudioSegment {
        AudioSegment {
            segment_name: self.segment_name.clone(),
            speech_text: self.speech_text.clone(),
        }
    }

    /// The timing half, fed to composition.
    pub fn cue(&self) -> SegmentCue {
        SegmentCue {
            segment_name: self.segment_name.clone(),
            start_time: self.start_time,
        }
    }
}

/// Synthesis output for one segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesizedAudio {
    /// Segment name this audio belongs to
    pub segment_name: String,
    /// Path of the persisted audio file
    pub file: PathBuf,
    /// SSML mark name -> offset in seconds into this segment's audio
    pub time_marks: BTreeMap<String, f64>,
    /// Wall-clock time the backend spent synthesizing, in seconds
    pub synthesis_time: f64,
}
