//! Scene composition.
//!
//! Builds one user's video: picks the background clip by the template
//! selection attribute, rasterizes timed text overlays and animated borders,
//! positions the dialogue segments against background music, and renders
//! everything in a single ffmpeg pass. The background clip's native duration
//! is the video duration; overlays are clamped against it, never extend it.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use fontdue::Font;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use pvgen_models::encoding::{
    DEFAULT_FONT_SIZE, DEFAULT_MAX_LINES, DEFAULT_TEXT_COLOR, FALLBACK_BACKGROUND_FILE,
    MUSIC_FADEOUT_SECS, MUSIC_VOLUME, RENDER_MAX_ATTEMPTS, THUMBNAIL_BACK_OFFSET_SECS,
    VIDEO_CODEC, VIDEO_FPS,
};
use pvgen_models::normalize::NormalizedFields;
use pvgen_models::{OverlayDefinition, SegmentCue, SynthesizedAudio, VideoTemplate};

use crate::border::{render_border_sequence, BorderSequence};
use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::fs_utils::{ensure_dir, is_non_empty_file};
use crate::layout::{layout_text, load_font};
use crate::probe::probe_video;
use crate::raster::{parse_hex_color, render_debug_box, render_text_image};
use crate::thumbnail::capture_thumbnail;

/// Default font name when an overlay declares none.
pub const DEFAULT_FONT: &str = "Arial-Bold";

/// Which composition phase broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComposePhase {
    BackgroundSelection,
    OverlayGeneration,
    AudioAssembly,
    Render,
    Thumbnail,
}

impl std::fmt::Display for ComposePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ComposePhase::BackgroundSelection => "background selection",
            ComposePhase::OverlayGeneration => "overlay generation",
            ComposePhase::AudioAssembly => "audio assembly",
            ComposePhase::Render => "render",
            ComposePhase::Thumbnail => "thumbnail",
        };
        f.write_str(name)
    }
}

/// Composer inputs that do not vary per user.
#[derive(Debug, Clone)]
pub struct ComposeOptions {
    /// Directory holding background template clips
    pub templates_dir: PathBuf,
    /// Directory holding `{font}.ttf` files
    pub fonts_dir: PathBuf,
    /// Background music track
    pub music_path: PathBuf,
    /// Per-user scratch directory for rasterized overlays
    pub work_dir: PathBuf,
    /// Render step timeout; None keeps the encode unbounded
    pub render_timeout_secs: Option<u64>,
    /// Render translucent boxes over every overlay region (layout tuning)
    pub debug_boxes: bool,
}

/// A positioned, time-bounded visual element ready for compositing.
#[derive(Debug, Clone)]
pub struct RenderedOverlay {
    pub png: PathBuf,
    pub x: i32,
    pub y: i32,
    pub start: f64,
    pub end: f64,
}

/// A border sequence with its on-screen window.
#[derive(Debug, Clone)]
pub struct RenderedBorder {
    pub sequence: BorderSequence,
    pub start: f64,
    pub end: f64,
}

/// A dialogue segment positioned on the timeline.
#[derive(Debug, Clone)]
pub struct PositionedAudio {
    pub file: PathBuf,
    pub start: f64,
}

/// Compose and render one user's video plus thumbnail.
///
/// Returns the video duration (the background clip's native duration).
pub async fn compose_scene(
    key: &str,
    template: &VideoTemplate,
    raw_fields: &BTreeMap<String, String>,
    video_fields: &NormalizedFields,
    audio_files: &[SynthesizedAudio],
    output_path: &Path,
    image_path: &Path,
    opts: &ComposeOptions,
) -> MediaResult<f64> {
    // Phase 1: background selection and duration
    let background = select_background(template, raw_fields, &opts.templates_dir);
    let info = probe_video(&background).await.map_err(|e| {
        MediaError::compose_failed(ComposePhase::BackgroundSelection, e.to_string())
    })?;
    let video_duration = info.duration;
    if video_duration <= 0.0 {
        return Err(MediaError::compose_failed(
            ComposePhase::BackgroundSelection,
            format!("background {} has no duration", background.display()),
        ));
    }

    // Phase 2: overlay generation
    let (overlays, borders) = build_overlay_tracks(template, video_fields, video_duration, opts)
        .map_err(|e| MediaError::compose_failed(ComposePhase::OverlayGeneration, e.to_string()))?;
    info!(user_key = %key, overlays = overlays.len(), borders = borders.len(), "overlay tracks ready");

    // Phase 3: audio assembly
    let cues: Vec<SegmentCue> = template.audio_segments.iter().map(|s| s.cue()).collect();
    let dialogue = assemble_audio(audio_files, &cues)
        .map_err(|e| MediaError::compose_failed(ComposePhase::AudioAssembly, e.to_string()))?;
    info!(user_key = %key, segments = dialogue.len(), "audio tracks ready");

    // Phase 4: render, retried on transient encode failure
    let cmd = build_render_command(
        &background,
        &overlays,
        &borders,
        &dialogue,
        &opts.music_path,
        video_duration,
        output_path,
    );
    render_with_retry(&cmd, opts.render_timeout_secs).await?;

    // Encoder success is not proof of a usable file
    if !is_non_empty_file(output_path) {
        return Err(MediaError::CorruptOutput(output_path.to_path_buf()));
    }

    // Phase 5: thumbnail from the rendered output
    let frame_at = (video_duration - THUMBNAIL_BACK_OFFSET_SECS).max(0.0);
    capture_thumbnail(output_path, image_path, frame_at)
        .await
        .map_err(|e| MediaError::compose_failed(ComposePhase::Thumbnail, e.to_string()))?;

    Ok(video_duration)
}

/// Pick the background clip for a customer.
///
/// Lookup order: the customer's value under the template selection key, the
/// table's declared default, then the literal fallback file. Missing files
/// degrade down the chain with warnings; this never errors, the caller's
/// probe surfaces a fully missing background.
pub fn select_background(
    template: &VideoTemplate,
    raw_fields: &BTreeMap<String, String>,
    templates_dir: &Path,
) -> PathBuf {
    let value = raw_fields
        .get(&template.template_selection_key)
        .map(String::as_str)
        .unwrap_or("default");

    if let Some(name) = template.background_for(value) {
        let path = templates_dir.join(name);
        if path.exists() {
            return path;
        }
        warn!(value = %value, background = %name, "background clip missing, trying declared default");
    }

    if let Some(name) = template.default_background() {
        let path = templates_dir.join(name);
        if path.exists() {
            return path;
        }
    }

    warn!(
        "no declared background found for '{}', using {}",
        value, FALLBACK_BACKGROUND_FILE
    );
    templates_dir.join(FALLBACK_BACKGROUND_FILE)
}

/// Start time and duration for an overlay against the video duration.
///
/// Precedence: `show_till - start`, else explicit `duration`, else the rest
/// of the video.
pub fn resolve_overlay_window(overlay: &OverlayDefinition, video_duration: f64) -> (f64, f64) {
    let start = overlay.default_time.unwrap_or(0.0);
    let duration = if let Some(till) = overlay.show_till {
        till - start
    } else if let Some(duration) = overlay.duration {
        duration
    } else {
        video_duration - start
    };
    (start, duration)
}

/// The text an overlay shows: literal text wins over a field reference.
pub fn overlay_text<'a>(
    overlay: &'a OverlayDefinition,
    video_fields: &'a NormalizedFields,
) -> Option<&'a str> {
    if let Some(text) = overlay.text.as_deref() {
        return Some(text);
    }
    overlay
        .field_name
        .as_deref()
        .and_then(|field| video_fields.get(field).map(String::as_str))
}

fn build_overlay_tracks(
    template: &VideoTemplate,
    video_fields: &NormalizedFields,
    video_duration: f64,
    opts: &ComposeOptions,
) -> MediaResult<(Vec<RenderedOverlay>, Vec<RenderedBorder>)> {
    let overlay_dir = opts.work_dir.join("overlays");
    ensure_dir(&overlay_dir)?;

    let mut fonts: HashMap<String, Font> = HashMap::new();
    let mut overlays = Vec::new();
    let mut borders = Vec::new();

    for overlay in &template.overlays {
        let (start, duration) = resolve_overlay_window(overlay, video_duration);
        if duration <= 0.0 {
            warn!(overlay = %overlay.name, "overlay window is empty, skipping");
            continue;
        }
        let end = start + duration;

        let Some(text) = overlay_text(overlay, video_fields) else {
            warn!(overlay = %overlay.name, "no text or field value for overlay, skipping");
            continue;
        };

        let font_name = overlay.font.as_deref().unwrap_or(DEFAULT_FONT);
        let font = match fonts.entry(font_name.to_string()) {
            std::collections::hash_map::Entry::Occupied(e) => e.into_mut(),
            std::collections::hash_map::Entry::Vacant(e) => {
                let path = opts.fonts_dir.join(format!("{}.ttf", font_name));
                match load_font(&path) {
                    Ok(font) => e.insert(font),
                    Err(err) => {
                        warn!(overlay = %overlay.name, font = %font_name, error = %err, "font unavailable, skipping overlay");
                        continue;
                    }
                }
            }
        };

        let initial_size = overlay.font_size.unwrap_or(DEFAULT_FONT_SIZE);
        let layout = layout_text(
            text,
            overlay.position,
            overlay.dimensions,
            font,
            initial_size,
            DEFAULT_MAX_LINES,
        );
        if layout.is_empty() {
            warn!(overlay = %overlay.name, "layout produced no lines, skipping overlay");
            continue;
        }

        let color = parse_hex_color(overlay.color.as_deref().unwrap_or(DEFAULT_TEXT_COLOR));
        let image = render_text_image(&layout, font, color, overlay.dimensions);
        let png = overlay_dir.join(format!("{}.png", overlay.name));
        image.save(&png)?;

        if let Some(spec) = overlay.animated_border.as_ref().filter(|s| s.enabled) {
            let dir = opts.work_dir.join("borders").join(&overlay.name);
            let sequence =
                render_border_sequence(&dir, overlay.position, overlay.dimensions, spec, VIDEO_FPS)?;
            borders.push(RenderedBorder {
                sequence,
                start,
                end,
            });
        }

        if opts.debug_boxes {
            let debug_png = overlay_dir.join(format!("{}_debug.png", overlay.name));
            render_debug_box(overlay.dimensions).save(&debug_png)?;
            overlays.push(RenderedOverlay {
                png: debug_png,
                x: overlay.position.x,
                y: overlay.position.y,
                start,
                end,
            });
        }

        overlays.push(RenderedOverlay {
            png,
            x: overlay.position.x,
            y: overlay.position.y,
            start,
            end,
        });
    }

    if overlays.is_empty() {
        return Err(MediaError::compose_failed(
            ComposePhase::OverlayGeneration,
            "no valid overlays were produced",
        ));
    }
    Ok((overlays, borders))
}

/// Match synthesized files to configured cues by segment name.
///
/// A cue without a matching file is skipped with a warning, as is a file no
/// cue references. Zero positioned segments is an error: the voiceover is a
/// hard prerequisite.
pub fn assemble_audio(
    audio_files: &[SynthesizedAudio],
    cues: &[SegmentCue],
) -> MediaResult<Vec<PositionedAudio>> {
    let by_name: HashMap<&str, &SynthesizedAudio> = audio_files
        .iter()
        .map(|a| (a.segment_name.as_str(), a))
        .collect();

    let mut tracks = Vec::new();
    for cue in cues {
        match by_name.get(cue.segment_name.trim()) {
            Some(audio) => tracks.push(PositionedAudio {
                file: audio.file.clone(),
                start: cue.start_time,
            }),
            None => {
                warn!(segment = %cue.segment_name, "no synthesized audio for configured segment");
            }
        }
    }

    if tracks.is_empty() {
        return Err(MediaError::compose_failed(
            ComposePhase::AudioAssembly,
            "no audio segments matched the template cues",
        ));
    }
    Ok(tracks)
}

/// Assemble the single-pass render command.
///
/// Input order: background, overlay PNGs, border sequences, dialogue files,
/// music last. The output is clamped to the background duration.
pub fn build_render_command(
    background: &Path,
    overlays: &[RenderedOverlay],
    borders: &[RenderedBorder],
    dialogue: &[PositionedAudio],
    music: &Path,
    video_duration: f64,
    output: &Path,
) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new(output).input(background);
    for overlay in overlays {
        cmd = cmd.input_with_args(["-loop", "1"], &overlay.png);
    }
    for border in borders {
        cmd = cmd.input_with_args(
            ["-framerate".to_string(), VIDEO_FPS.to_string()],
            &border.sequence.pattern,
        );
    }
    for track in dialogue {
        cmd = cmd.input(&track.file);
    }
    cmd = cmd.input(music);

    let music_index = 1 + overlays.len() + borders.len() + dialogue.len();
    let filter = build_filter_graph(overlays, borders, dialogue, music_index, video_duration);

    cmd.filter_complex(filter)
        .map("[vout]")
        .map("[aout]")
        .video_codec(VIDEO_CODEC)
        .audio_codec("aac")
        .fps(VIDEO_FPS)
        .limit_duration(video_duration)
}

/// Build the `-filter_complex` graph; pure string assembly, unit tested.
pub fn build_filter_graph(
    overlays: &[RenderedOverlay],
    borders: &[RenderedBorder],
    dialogue: &[PositionedAudio],
    music_index: usize,
    video_duration: f64,
) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut current = "0:v".to_string();
    let mut step = 0usize;

    // Overlay PNGs occupy inputs 1..=overlays.len()
    for (i, overlay) in overlays.iter().enumerate() {
        let input = 1 + i;
        parts.push(format!("[{}:v]format=rgba[ov{}]", input, i));
        step += 1;
        let label = format!("v{}", step);
        parts.push(format!(
            "[{}][ov{}]overlay={}:{}:enable='between(t,{:.3},{:.3})'[{}]",
            current, i, overlay.x, overlay.y, overlay.start, overlay.end, label
        ));
        current = label;
    }

    // Border sequences follow the overlays; each pads its last frame for the
    // hold period and is shifted onto the timeline at its start time.
    for (i, border) in borders.iter().enumerate() {
        let input = 1 + overlays.len() + i;
        let draw_secs = border.sequence.frame_count as f64 / VIDEO_FPS as f64;
        let hold = (border.end - border.start - draw_secs).max(0.0);
        parts.push(format!(
            "[{}:v]tpad=stop_mode=clone:stop_duration={:.3},format=rgba,setpts=PTS-STARTPTS+{:.3}/TB[bd{}]",
            input, hold, border.start, i
        ));
        step += 1;
        let label = format!("v{}", step);
        parts.push(format!(
            "[{}][bd{}]overlay={}:{}:enable='between(t,{:.3},{:.3})'[{}]",
            current, i, border.sequence.x, border.sequence.y, border.start, border.end, label
        ));
        current = label;
    }

    if current == "0:v" {
        parts.push("[0:v]null[vout]".to_string());
    } else {
        parts.push(format!("[{}]null[vout]", current));
    }

    // Music trimmed to the video, attenuated, fading out over the tail
    let fade_start = (video_duration - MUSIC_FADEOUT_SECS).max(0.0);
    parts.push(format!(
        "[{}:a]atrim=0:{:.3},volume={},afade=t=out:st={:.3}:d={}[bgm]",
        music_index, video_duration, MUSIC_VOLUME, fade_start, MUSIC_FADEOUT_SECS
    ));

    // Dialogue segments delayed to their cue start times
    let dialogue_base = 1 + overlays.len() + borders.len();
    let mut mix_inputs = vec!["[bgm]".to_string()];
    for (i, track) in dialogue.iter().enumerate() {
        let input = dialogue_base + i;
        let delay_ms = (track.start * 1000.0).round() as i64;
        parts.push(format!("[{}:a]adelay={}:all=1[dg{}]", input, delay_ms, i));
        mix_inputs.push(format!("[dg{}]", i));
    }
    parts.push(format!(
        "{}amix=inputs={}:duration=longest:normalize=0[aout]",
        mix_inputs.join(""),
        mix_inputs.len()
    ));

    parts.join(";")
}

async fn render_with_retry(cmd: &FfmpegCommand, timeout_secs: Option<u64>) -> MediaResult<()> {
    let mut runner = FfmpegRunner::new();
    if let Some(secs) = timeout_secs {
        runner = runner.with_timeout(secs);
    }

    let mut last_err = None;
    for attempt in 1..=RENDER_MAX_ATTEMPTS {
        match runner.run(cmd).await {
            Ok(()) => return Ok(()),
            Err(e) => {
                warn!(attempt, error = %e, "render attempt failed");
                last_err = Some(e);
                if attempt < RENDER_MAX_ATTEMPTS {
                    let delay = backoff_secs(attempt);
                    tokio::time::sleep(std::time::Duration::from_secs(delay)).await;
                }
            }
        }
    }
    Err(last_err.unwrap_or_else(|| {
        MediaError::compose_failed(ComposePhase::Render, "render failed with no error detail")
    }))
}

/// Exponential backoff between render attempts, bounded to 1..10 seconds.
pub fn backoff_secs(attempt: u32) -> u64 {
    (1u64 << (attempt - 1)).clamp(1, 10)
}
