//! Voiceover pipeline for PVGen.
//!
//! Fills the templated SSML script with a customer's audio-normalized fields
//! and synthesizes each segment through a speech backend, collecting SSML
//! mark timepoints for downstream captioning.

pub mod error;
pub mod google;
pub mod script;
pub mod synth;

pub use error::{TtsError, TtsResult};
pub use google::{GoogleTtsClient, SpeechBackend, SynthesisOutput};
pub use script::{fill_script, unresolved_placeholders};
pub use synth::synthesize_segments;
