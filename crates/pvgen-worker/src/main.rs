//! Personalized video batch worker binary.

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pvgen_models::field_mapping::MappingSet;
use pvgen_models::VoiceConfig;
use pvgen_storage::{batch_sheet_name, CsvResultSink, ObjectStore, ResultSink};
use pvgen_tts::GoogleTtsClient;
use pvgen_worker::{
    read_customers, run_batch, BatchError, PipelineContext, ProcessedSet, StoreUploader,
    WorkerConfig, WorkerResult,
};

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    dotenvy::dotenv().ok();

    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("pvgen=info".parse().unwrap())
        .add_directive("aws_config=warn".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting pvgen-worker");

    if let Err(e) = run().await {
        error!("Batch failed: {}", e);
        std::process::exit(1);
    }

    info!("Batch complete. The end.");
}

async fn run() -> WorkerResult<()> {
    let config = WorkerConfig::from_env()?;
    info!("Worker config: {:?}", config);

    let mapping: MappingSet = read_json(&config.mapping_path)?;
    info!(
        mapping = %config.mapping_path.display(),
        fields = mapping.len(),
        "customer field mapping loaded"
    );

    let voice: VoiceConfig = read_json(&config.voice_config_path)?;

    let customers = read_customers(
        &config.customer_sheet,
        &mapping,
        config.start_row,
        config.end_row,
    )?;
    info!(customers = customers.len(), "customer rows ingested");

    let api_key = std::env::var("GOOGLE_TTS_API_KEY")
        .map_err(|_| BatchError::config("GOOGLE_TTS_API_KEY not set"))?;
    let backend = GoogleTtsClient::new(api_key);

    let store = ObjectStore::from_env().await?;
    store.check_connectivity().await?;
    let uploader = StoreUploader::new(store, &config.client_name);

    let sink = CsvResultSink::new(config.results_dir());
    let sheet_name = batch_sheet_name(&config.client_name, config.start_row, config.end_row);
    sink.ensure_sheet(&sheet_name).await?;

    let ctx = PipelineContext {
        config: &config,
        mapping: &mapping,
        voice: &voice,
        backend: &backend,
        uploader: &uploader,
        sink: &sink,
        sheet_name: &sheet_name,
    };

    let processed = ProcessedSet::new();
    let outcomes = run_batch(&customers, &ctx, &processed).await;

    let failures = outcomes.iter().filter(|o| !o.is_success()).count();
    if failures > 0 {
        info!(failures, "some users failed; see the failures sheet");
    }
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &std::path::Path) -> WorkerResult<T> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        BatchError::config(format!("cannot read {}: {}", path.display(), e))
    })?;
    Ok(serde_json::from_str(&raw)?)
}
