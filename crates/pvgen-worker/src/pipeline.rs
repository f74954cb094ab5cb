//! Per-user pipeline.
//!
//! Runs one customer end to end: template load, script fill, voiceover
//! synthesis, output directories, render, uploads, result logging. A stage
//! failure becomes a failure outcome for that row; the batch never stops
//! for one user.

use std::path::Path;
use std::time::Duration;

use tracing::{info, Instrument};

use pvgen_media::{compose_scene, ComposeOptions};
use pvgen_models::field_mapping::MappingSet;
use pvgen_models::normalize::{normalize, RenderContext};
use pvgen_models::{AudioSegment, CustomerRecord, PipelineOutcome, Stage, VideoTemplate, VoiceConfig};
use pvgen_storage::{outcome_row, ResultSink, FAILURES_SHEET};
use pvgen_tts::{fill_script, synthesize_segments, SpeechBackend};

use crate::config::WorkerConfig;
use crate::error::StageError;
use crate::executor::ProcessedSet;
use crate::logging::UserLogger;
use crate::upload::ArtifactUploader;

/// Batch-wide context shared by every user's pipeline run.
pub struct PipelineContext<'a> {
    pub config: &'a WorkerConfig,
    pub mapping: &'a MappingSet,
    pub voice: &'a VoiceConfig,
    pub backend: &'a dyn SpeechBackend,
    pub uploader: &'a dyn ArtifactUploader,
    pub sink: &'a dyn ResultSink,
    /// Result sheet for this batch window
    pub sheet_name: &'a str,
}

/// Process one customer.
///
/// Returns `None` when the user was already processed, otherwise the
/// success or failure outcome. Failures are also appended to the failures
/// sheet, best effort.
pub async fn process_customer(
    customer: &CustomerRecord,
    ctx: &PipelineContext<'_>,
    processed: &ProcessedSet,
) -> Option<PipelineOutcome> {
    let key = customer.key.as_str();
    let logger = UserLogger::new(key, &ctx.config.client_name);

    if processed.contains(key).await {
        logger.log_progress("already processed, skipping");
        return None;
    }
    logger.log_start("generating personalized video");

    let run = run_stages(customer, ctx, &logger).instrument(logger.create_span());
    match run.await {
        Ok(outcome) => {
            processed.mark(key).await;
            logger.log_completion("video generated and uploaded");
            Some(outcome)
        }
        Err(stage_error) => {
            logger.log_error(&stage_error.to_string());
            let outcome = stage_error.into_outcome(key);
            if let Err(e) = ctx
                .sink
                .append_row(FAILURES_SHEET, &outcome_row(&outcome))
                .await
            {
                logger.log_warning(&format!("could not record failure: {}", e));
            }
            Some(outcome)
        }
    }
}

async fn run_stages(
    customer: &CustomerRecord,
    ctx: &PipelineContext<'_>,
    logger: &UserLogger,
) -> Result<PipelineOutcome, StageError> {
    let key = customer.key.as_str();
    let config = ctx.config;

    // Re-read per user so a mid-batch template edit takes effect on the
    // next user instead of requiring a restart.
    let template = load_template(&config.template_path)
        .map_err(|e| StageError::new(Stage::ConfigLoad, e))?;

    let audio_fields = normalize(&customer.fields, ctx.mapping, RenderContext::Audio);
    let video_fields = normalize(&customer.fields, ctx.mapping, RenderContext::Video);

    if template.audio_segments.is_empty() {
        return Err(StageError::new(
            Stage::ScriptGeneration,
            "template declares no audio segments",
        ));
    }
    let segments: Vec<AudioSegment> = template
        .audio_segments
        .iter()
        .map(|s| s.segment())
        .collect();
    let script = fill_script(key, &segments, &audio_fields);
    logger.log_progress("voiceover script generated");

    let synthesis_budget =
        Duration::from_secs(config.synthesis_timeout_secs * script.len().max(1) as u64);
    let (audio_files, synthesis_secs) = tokio::time::timeout(
        synthesis_budget,
        synthesize_segments(
            ctx.backend,
            key,
            &script,
            ctx.voice,
            &config.voiceovers_dir(),
        ),
    )
    .await
    .map_err(|_| {
        StageError::new(
            Stage::AudioSynthesis,
            format!("synthesis exceeded {:?}", synthesis_budget),
        )
    })?
    .map_err(|e| StageError::new(Stage::AudioSynthesis, e.to_string()))?;
    logger.log_progress(&format!("voiceover synthesized in {:.2}s", synthesis_secs));

    let videos_dir = config.videos_dir();
    let covers_dir = config.cover_images_dir();
    for dir in [&videos_dir, &covers_dir] {
        std::fs::create_dir_all(dir)
            .map_err(|e| StageError::new(Stage::Directories, e.to_string()))?;
    }

    let output_path = videos_dir.join(format!("{}.mp4", key));
    let image_path = covers_dir.join(format!("{}.jpg", key));
    let opts = ComposeOptions {
        templates_dir: config.templates_dir.clone(),
        fonts_dir: config.fonts_dir.clone(),
        music_path: config.music_path.clone(),
        work_dir: config.scratch_dir(key),
        render_timeout_secs: Some(config.render_timeout_secs),
        debug_boxes: config.debug_boxes,
    };
    let video_duration = compose_scene(
        key,
        &template,
        &customer.fields,
        &video_fields,
        &audio_files,
        &output_path,
        &image_path,
        &opts,
    )
    .await
    .map_err(|e| StageError::new(Stage::VideoRender, e.to_string()))?;
    logger.log_progress(&format!("video rendered, {:.1}s", video_duration));

    let cover_image_url = ctx
        .uploader
        .upload_cover(&image_path, key)
        .await
        .map_err(|e| StageError::new(Stage::Upload, e.to_string()))?;
    let video_url = ctx
        .uploader
        .upload_video(&output_path, key)
        .await
        .map_err(|e| StageError::new(Stage::Upload, e.to_string()))?;

    // Both artifacts are in the store now; drop the per-user intermediates
    // so a long batch does not fill the disk with overlay PNGs and MP3s.
    cleanup_artifacts(config, key, logger);

    let outcome = PipelineOutcome::Success {
        key: key.to_string(),
        video_url,
        cover_image_url,
        video_duration,
    };
    ctx.sink
        .append_row(ctx.sheet_name, &outcome_row(&outcome))
        .await
        .map_err(|e| StageError::new(Stage::Logging, e.to_string()))?;

    Ok(outcome)
}

/// Remove a user's scratch images and synthesized audio.
///
/// Called after a successful upload. Best effort: on failure the pipeline
/// keeps the artifacts for the rerun, and a leftover directory only costs
/// disk space.
fn cleanup_artifacts(config: &WorkerConfig, key: &str, logger: &UserLogger) {
    for dir in [config.scratch_dir(key), config.voiceovers_dir().join(key)] {
        if !dir.exists() {
            continue;
        }
        if let Err(e) = std::fs::remove_dir_all(&dir) {
            logger.log_warning(&format!("could not remove {}: {}", dir.display(), e));
        }
    }
}

fn load_template(path: &Path) -> Result<VideoTemplate, String> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read template {}: {}", path.display(), e))?;
    let template: VideoTemplate =
        serde_json::from_str(&raw).map_err(|e| format!("invalid template JSON: {}", e))?;
    info!(template = %path.display(), "video template loaded");
    Ok(template)
}
