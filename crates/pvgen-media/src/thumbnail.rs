//! Cover image extraction.

use std::path::Path;

use tracing::debug;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::fs_utils::is_non_empty_file;

/// Capture a single frame from `video` at `at_seconds` into `image`.
///
/// The seek happens before the input for speed; `at_seconds` is expected to
/// already be clamped into the video's duration by the caller.
pub async fn capture_thumbnail(
    video: &Path,
    image: &Path,
    at_seconds: f64,
) -> MediaResult<()> {
    if !video.exists() {
        return Err(MediaError::FileNotFound(video.to_path_buf()));
    }

    debug!(at = at_seconds, image = %image.display(), "capturing thumbnail");
    let cmd = FfmpegCommand::new(image)
        .input_with_args(["-ss".to_string(), format!("{:.3}", at_seconds)], video)
        .single_frame()
        .output_args(["-q:v", "2"]);
    FfmpegRunner::new().run(&cmd).await?;

    if !is_non_empty_file(image) {
        return Err(MediaError::CorruptOutput(image.to_path_buf()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_video_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = capture_thumbnail(
            &dir.path().join("missing.mp4"),
            &dir.path().join("cover.jpg"),
            0.0,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, MediaError::FileNotFound(_)));
    }
}
