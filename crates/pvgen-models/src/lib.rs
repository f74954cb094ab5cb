//! Shared data models for the PVGen rendering pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Field mapping sets and processing rules
//! - Customer records and normalized field values
//! - Voiceover script segments and synthesized audio metadata
//! - Video templates and overlay definitions
//! - Per-user pipeline outcomes
//!
//! It also hosts the pure data-processing core: the field normalizer,
//! text sanitization, and English number-word rendering.

pub mod audio;
pub mod customer;
pub mod encoding;
pub mod field_mapping;
pub mod normalize;
pub mod outcome;
pub mod overlay;
pub mod sanitize;
pub mod template;
pub mod voice;
pub mod words;

// Re-export common types
pub use audio::{AudioSegment, ScriptedSegment, SegmentCue, SynthesizedAudio};
pub use customer::CustomerRecord;
pub use field_mapping::{FieldMapping, MappingError, MappingSet};
pub use normalize::{normalize, NormalizedFields, ProcessingRule, RenderContext, RuleKind};
pub use outcome::{PipelineOutcome, Stage};
pub use overlay::{AnimatedBorderSpec, Dimensions, OverlayDefinition, Position};
pub use template::VideoTemplate;
pub use voice::VoiceConfig;
