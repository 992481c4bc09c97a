use anyhow::Context;
use categorizer::{app, cli::args_from_env, config::Config, logging::init_tracing};
use tracing::Instrument;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = args_from_env()?;
    let config = Config::load(&args.config_path)
        .with_context(|| format!("failed to load config from {}", args.config_path.display()))?;
    let logging_guard =
        init_tracing(&config.logging).context("failed to initialize logging")?;

    let run_span = tracing::info_span!("run", run_id = %logging_guard.run_id());
    app::run(config, args).instrument(run_span).await
}
