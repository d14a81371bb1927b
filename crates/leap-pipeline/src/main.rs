//! Leap fine-tune pipeline binary.
//!
//! Prints the generated image URI on stdout; progress goes to stderr.

use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use leap_client::LeapClient;
use leap_pipeline::{Pipeline, PipelineConfig, PipelineRequest};

fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,leap_client=info,leap_pipeline=info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

#[tokio::main]
async fn main() {
    // Already installed is fine; reqwest only needs one provider.
    let _ = rustls::crypto::ring::default_provider().install_default();

    dotenvy::dotenv().ok();
    init_tracing();

    info!("Starting leap-pipeline");

    let client = match LeapClient::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to create Leap client: {}", e);
            std::process::exit(1);
        }
    };

    let config = PipelineConfig::from_env();
    info!("Pipeline config: {:?}", config);

    let request = match PipelineRequest::from_env() {
        Ok(r) => r,
        Err(e) => {
            error!("Invalid pipeline request: {}", e);
            std::process::exit(1);
        }
    };

    let (shutdown, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received shutdown signal");
            shutdown.send(true).ok();
        }
    });

    let pipeline = Pipeline::new(client, config).with_cancellation(shutdown_rx);

    match pipeline.run(&request).await {
        Ok(output) => {
            info!(
                model_id = %output.model_id,
                version_id = %output.version_id,
                inference_id = %output.inference_id,
                finished_at = %output.finished_at,
                "Pipeline completed"
            );
            match output.image {
                Some(uri) => println!("{}", uri),
                None => println!("no image produced"),
            }
        }
        Err(e) => {
            error!(stage = ?e.stage(), "Pipeline failed: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}
