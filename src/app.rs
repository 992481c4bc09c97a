use std::{io::Write, sync::Arc};

use anyhow::{Context, Result};
use futures_util::StreamExt;

use crate::{
    classifier::Classifier,
    cli::{CliArgs, Command},
    config::Config,
    inference::{InferencePort, ollama::OllamaClient},
    pipeline::{self, RunReport},
    sanitizer::FieldSanitizer,
};

pub async fn run(mut config: Config, args: CliArgs) -> Result<()> {
    apply_overrides(&mut config, &args);

    let client = OllamaClient::new(config.inference.clone())
        .context("failed to construct ollama client")?;
    let sanitizer = FieldSanitizer::new(config.sanitizer.clone());

    let report = match args.command {
        Command::Sanitize => pipeline::run_sanitize(&config.pipelines.sanitize, &sanitizer),
        Command::Categorize => {
            let classifier = classifier_for(&config, &config.pipelines.categorize.taxonomy, &client)?;
            pipeline::run_categorize(&config.pipelines.categorize, &sanitizer, &classifier).await
        }
        Command::Route => {
            let classifier = classifier_for(&config, &config.pipelines.route.taxonomy, &client)?;
            pipeline::run_route(&config.pipelines.route, &sanitizer, &classifier)
                .await
                .context("route pipeline failed")?
        }
        Command::Chat { prompt } => return stream_chat(&client, &prompt).await,
    };

    log_report(&report);
    Ok(())
}

fn apply_overrides(config: &mut Config, args: &CliArgs) {
    let pipelines = &mut config.pipelines;
    let (input, output) = match args.command {
        Command::Sanitize => (&mut pipelines.sanitize.input, &mut pipelines.sanitize.output),
        Command::Categorize => (
            &mut pipelines.categorize.input,
            &mut pipelines.categorize.output,
        ),
        Command::Route => (&mut pipelines.route.input_dir, &mut pipelines.route.output_dir),
        Command::Chat { .. } => return,
    };
    if let Some(path) = &args.input {
        *input = path.clone();
    }
    if let Some(path) = &args.output {
        *output = path.clone();
    }
}

fn classifier_for(config: &Config, taxonomy: &str, client: &OllamaClient) -> Result<Classifier> {
    let taxonomy = config.taxonomy(taxonomy)?.clone();
    let port: Arc<dyn InferencePort> = Arc::new(client.clone());
    Ok(Classifier::new(port, taxonomy))
}

async fn stream_chat(client: &OllamaClient, prompt: &str) -> Result<()> {
    let mut stream = client
        .chat_stream(prompt)
        .await
        .context("failed to start chat stream")?;
    let mut stdout = std::io::stdout();

    while let Some(delta) = stream.next().await {
        let delta = delta.context("chat stream failed")?;
        stdout.write_all(delta.as_bytes())?;
        stdout.flush()?;
    }
    writeln!(stdout)?;
    Ok(())
}

fn log_report(report: &RunReport) {
    tracing::info!(
        target: "pipeline",
        files_seen = report.files_seen,
        files_skipped = report.files_skipped,
        records_processed = report.records_processed,
        keys_removed = report.keys_removed,
        sentinel_fallbacks = report.sentinel_fallbacks,
        written = report.written.len(),
        write_failures = report.write_failures,
        categories = ?report.categories,
        "run_completed"
    );
}
