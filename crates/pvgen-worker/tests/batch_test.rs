//! End-to-end batch tests against a mocked synthesis backend.
//!
//! Rendering needs real template clips and ffmpeg, so these tests drive the
//! pipeline up to the render stage and assert the failure outcome carries
//! the right stage, plus the idempotency and ingestion behavior around it.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::Engine;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use pvgen_models::field_mapping::MappingSet;
use pvgen_models::{PipelineOutcome, Stage, VoiceConfig};
use pvgen_storage::{MemorySink, ResultSink, StorageResult, FAILURES_SHEET};
use pvgen_tts::GoogleTtsClient;
use pvgen_worker::{
    process_customer, read_customers, run_batch, ArtifactUploader, PipelineContext, ProcessedSet,
    WorkerConfig,
};

struct FakeUploader;

#[async_trait]
impl ArtifactUploader for FakeUploader {
    async fn upload_video(&self, _path: &Path, key: &str) -> StorageResult<String> {
        Ok(format!("https://cdn.test/videos/{}.mp4", key))
    }

    async fn upload_cover(&self, _path: &Path, key: &str) -> StorageResult<String> {
        Ok(format!("https://cdn.test/covers/{}.jpg", key))
    }
}

fn mapping() -> MappingSet {
    serde_json::from_str(
        r#"{
            "phone": {"column_name": "Phone Number", "IsPrimary": "True"},
            "name": {"column_name": "Full Name", "audio_processing": "name", "video_processing": "name"},
            "city": {"column_name": "City"}
        }"#,
    )
    .unwrap()
}

fn voice() -> VoiceConfig {
    serde_json::from_str(
        r#"{
            "voice_name": "en-IN-Wavenet-B",
            "language_code": "en-IN",
            "audio_encoding": "MP3",
            "pitch": 0.0,
            "volume_gain_db": 0.0
        }"#,
    )
    .unwrap()
}

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

fn test_config(dir: &Path, sheet: PathBuf, template: PathBuf) -> WorkerConfig {
    WorkerConfig {
        client_name: "acme".to_string(),
        customer_sheet: sheet,
        mapping_path: dir.join("mapping.json"),
        template_path: template,
        voice_config_path: dir.join("voice.json"),
        templates_dir: dir.join("templates"),
        fonts_dir: dir.join("fonts"),
        music_path: dir.join("music.mp3"),
        work_dir: dir.join("work"),
        start_row: 1,
        end_row: 100,
        max_concurrent_users: 2,
        render_timeout_secs: 10,
        synthesis_timeout_secs: 10,
        debug_boxes: false,
    }
}

async fn mock_tts() -> MockServer {
    let server = MockServer::start().await;
    let audio = base64::engine::general_purpose::STANDARD.encode(b"fake-mp3");
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "audioContent": audio,
            "timepoints": [{"markName": "m1", "timeSeconds": 0.8}]
        })))
        .mount(&server)
        .await;
    server
}

const TEMPLATE_JSON: &str = r#"{
    "template_selection_key": "city",
    "backgrounds": {"city": {"default": "generic.mp4"}},
    "overlays": [
        {
            "name": "greeting",
            "field_name": "name",
            "position": {"x": 100, "y": 200},
            "dimensions": {"width": 400, "height": 150}
        }
    ],
    "audio_segments": [
        {"segment_name": "intro", "speech_text": "<speak>Hello {name}</speak>", "start_time": 1.0}
    ]
}"#;

#[tokio::test]
async fn test_pipeline_fails_at_render_without_assets() {
    let dir = tempfile::tempdir().unwrap();
    let sheet = write_file(
        dir.path(),
        "customers.csv",
        "Phone Number,Full Name,City\n911234,asha|vikram,mumbai\n",
    );
    let template = write_file(dir.path(), "template.json", TEMPLATE_JSON);
    let server = mock_tts().await;

    let config = test_config(dir.path(), sheet, template);
    let mapping = mapping();
    let voice = voice();
    let backend = GoogleTtsClient::new("k").with_endpoint(server.uri());
    let uploader = FakeUploader;
    let sink = MemorySink::new();

    let customers = read_customers(&config.customer_sheet, &mapping, 1, 100).unwrap();
    assert_eq!(customers.len(), 1);

    let ctx = PipelineContext {
        config: &config,
        mapping: &mapping,
        voice: &voice,
        backend: &backend,
        uploader: &uploader,
        sink: &sink,
        sheet_name: "acme_rows_1_100",
    };
    let processed = ProcessedSet::new();

    let outcome = process_customer(&customers[0], &ctx, &processed)
        .await
        .expect("first run must produce an outcome");

    // Synthesis succeeded and wrote the numbered file
    let audio_file = config
        .voiceovers_dir()
        .join("911234")
        .join("audio_part_1.mp3");
    assert!(audio_file.exists());
    assert_eq!(std::fs::read(&audio_file).unwrap(), b"fake-mp3");

    // No background clip exists, so the render stage is where it stops
    match &outcome {
        PipelineOutcome::Failure { key, stage, .. } => {
            assert_eq!(key, "911234");
            assert_eq!(*stage, Stage::VideoRender);
        }
        PipelineOutcome::Success { .. } => panic!("render cannot succeed without assets"),
    }

    // Failure was appended to the failures sheet
    let failures = sink.rows(FAILURES_SHEET).await;
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0][0], "911234");
    assert_eq!(failures[0][1], "video_render");

    // Failed users are not marked processed; a rerun retries them
    assert!(!processed.contains("911234").await);
}

#[tokio::test]
async fn test_processed_users_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let sheet = write_file(
        dir.path(),
        "customers.csv",
        "Phone Number,Full Name,City\n911234,Asha,mumbai\n",
    );
    let template = write_file(dir.path(), "template.json", TEMPLATE_JSON);
    let server = mock_tts().await;

    let config = test_config(dir.path(), sheet, template);
    let mapping = mapping();
    let voice = voice();
    let backend = GoogleTtsClient::new("k").with_endpoint(server.uri());
    let uploader = FakeUploader;
    let sink = MemorySink::new();
    let ctx = PipelineContext {
        config: &config,
        mapping: &mapping,
        voice: &voice,
        backend: &backend,
        uploader: &uploader,
        sink: &sink,
        sheet_name: "acme_rows_1_100",
    };

    let customers = read_customers(&config.customer_sheet, &mapping, 1, 100).unwrap();
    let processed = ProcessedSet::new();
    processed.mark("911234").await;

    let outcome = process_customer(&customers[0], &ctx, &processed).await;
    assert!(outcome.is_none());
    // Nothing ran: no synthesis output for the skipped user
    assert!(!config.voiceovers_dir().join("911234").exists());
}

#[tokio::test]
async fn test_batch_produces_one_outcome_per_unprocessed_user() {
    let dir = tempfile::tempdir().unwrap();
    let sheet = write_file(
        dir.path(),
        "customers.csv",
        "Phone Number,Full Name,City\n\
         911,Asha,mumbai\n\
         912,Vikram,delhi\n\
         ,Orphan,pune\n",
    );
    let template = write_file(dir.path(), "template.json", TEMPLATE_JSON);
    let server = mock_tts().await;

    let config = test_config(dir.path(), sheet, template);
    let mapping = mapping();
    let voice = voice();
    let backend = GoogleTtsClient::new("k").with_endpoint(server.uri());
    let uploader = FakeUploader;
    let sink = MemorySink::new();
    let ctx = PipelineContext {
        config: &config,
        mapping: &mapping,
        voice: &voice,
        backend: &backend,
        uploader: &uploader,
        sink: &sink,
        sheet_name: "acme_rows_1_100",
    };

    // The row without a primary key never becomes a customer
    let customers = read_customers(&config.customer_sheet, &mapping, 1, 100).unwrap();
    assert_eq!(customers.len(), 2);

    let processed = ProcessedSet::new();
    processed.mark("912").await;

    let outcomes = run_batch(&customers, &ctx, &processed).await;
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].key(), "911");
}
