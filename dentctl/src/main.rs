use clap::Parser;
use dentctl::{Config, Portal, cli, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI args
    let args = dentctl::config::Args::parse();

    // Load configuration
    let config = Config::load(&args)?;

    // If --validate flag is set, exit successfully after config validation
    if args.validate {
        println!("Configuration is valid.");
        return Ok(());
    }

    let Some(command) = args.command else {
        anyhow::bail!("No command given. Run `dentctl --help` for usage.");
    };

    // Initialize telemetry (tracing + optional OpenTelemetry)
    telemetry::init_telemetry(config.enable_otel_export)?;

    tracing::debug!(config_file = %args.config, "Starting");

    let portal = Portal::new(config)?;
    let result = cli::run(&portal, command).await;

    telemetry::shutdown_telemetry();

    let output = result?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
