//! SWR Meter - Raspberry Pi standing wave ratio monitor binary
//!
//! Samples the forward and reflected power sensors and serves the readings
//! over a local web API.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::time::Duration;
use swr_meter::{
    snapshot_store, start_web_server, web::SwrReading, AdcReader, MeterConfig, MeterQuery,
    MockAdc, Sampler, SwrSnapshot, WebConfig, DEFAULT_BACKOFF_MS, DEFAULT_INTERVAL_MS,
    DEFAULT_WEB_PORT,
};
use tokio::sync::watch;
use tracing::{error, info, warn, Level};
use tracing_subscriber::{filter::LevelFilter, EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "swr_meter")]
#[command(about = "📡 SWR Meter - Raspberry Pi RF standing wave ratio monitor")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = "Samples forward and reflected RF power and serves SWR readings over HTTP")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Web server bind address
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Web server port
    #[arg(short, long, default_value_t = DEFAULT_WEB_PORT)]
    port: u16,

    /// Sampling interval in milliseconds
    #[arg(short, long, default_value_t = DEFAULT_INTERVAL_MS)]
    interval: u64,

    /// Delay before retrying after a failed sample, in milliseconds
    #[arg(long, default_value_t = DEFAULT_BACKOFF_MS)]
    backoff: u64,

    /// ADC channel wired to the forward power sensor
    #[arg(long, default_value_t = 0)]
    forward_pin: u8,

    /// ADC channel wired to the reflected power sensor
    #[arg(long, default_value_t = 1)]
    reverse_pin: u8,

    /// Forward power calibration factor
    #[arg(long, default_value_t = 1.0)]
    cal_forward: f64,

    /// Reflected power calibration factor
    #[arg(long, default_value_t = 1.0)]
    cal_reverse: f64,

    /// Use the simulated ADC even when SPI support is compiled in
    #[arg(long)]
    mock: bool,

    /// Raw sample the simulated ADC returns on the forward channel
    #[arg(long, default_value_t = 0)]
    mock_forward: u16,

    /// Raw sample the simulated ADC returns on the reverse channel
    #[arg(long, default_value_t = 0)]
    mock_reverse: u16,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start sampling and the web server (default)
    Serve(ServeArgs),

    /// Take a single reading and exit
    Snapshot(SnapshotArgs),

    /// Print the active meter configuration as JSON
    Config,
}

#[derive(Args, Default)]
struct ServeArgs {
    /// Static files root (default: current directory)
    #[arg(long)]
    static_dir: Option<String>,

    /// Disable CORS headers
    #[arg(long)]
    no_cors: bool,
}

#[derive(Args)]
struct SnapshotArgs {
    /// Output format: json or pretty
    #[arg(short, long, default_value = "pretty")]
    format: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(&cli)?;

    match &cli.command {
        Some(Commands::Serve(args)) => serve_command(&cli, args).await,
        Some(Commands::Snapshot(args)) => snapshot_command(&cli, args),
        Some(Commands::Config) => config_command(&cli),
        None => serve_command(&cli, &ServeArgs::default()).await,
    }
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(log_filter(log_level(cli), directives.as_deref()))
        .with_target(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

fn log_level(cli: &Cli) -> Level {
    if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    }
}

/// `RUST_LOG` directives win when set; otherwise the flag level applies.
fn log_filter(level: Level, directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::default().add_directive(LevelFilter::from_level(level).into()))
}

fn meter_config(cli: &Cli) -> anyhow::Result<MeterConfig> {
    let config = MeterConfig::default()
        .with_pins(cli.forward_pin, cli.reverse_pin)
        .with_calibration(cli.cal_forward, cli.cal_reverse);
    config.validate()?;
    Ok(config)
}

fn open_adc(cli: &Cli) -> anyhow::Result<Box<dyn AdcReader + Send>> {
    #[cfg(feature = "gpio")]
    if !cli.mock {
        let adc = swr_meter::Mcp3008Adc::new().context("Failed to open MCP3008")?;
        return Ok(Box::new(adc));
    }

    #[cfg(not(feature = "gpio"))]
    if !cli.mock {
        warn!("SPI support not compiled in, using simulated ADC");
    }

    Ok(Box::new(
        MockAdc::new()
            .with_constant(cli.forward_pin, cli.mock_forward)
            .with_constant(cli.reverse_pin, cli.mock_reverse),
    ))
}

async fn serve_command(cli: &Cli, args: &ServeArgs) -> anyhow::Result<()> {
    info!("Starting SWR meter...");

    let config = meter_config(cli)?;
    let adc = open_adc(cli)?;

    let (writer, reader) = snapshot_store();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let sampler = Sampler::new(adc, config, writer)
        .with_interval(Duration::from_millis(cli.interval))
        .with_backoff(Duration::from_millis(cli.backoff))
        .spawn(shutdown_rx);

    let mut web_config = WebConfig::new(&cli.host, cli.port).with_cors(!args.no_cors);
    if let Some(static_dir) = &args.static_dir {
        web_config = web_config.with_static_path(Some(static_dir.clone()));
    }

    info!("Meter configuration:");
    info!(
        "  - Calibration: forward {}, reverse {}",
        config.calibration.forward, config.calibration.reverse
    );
    info!(
        "  - Channels: forward {}, reverse {}",
        config.pins.forward, config.pins.reverse
    );
    info!("  - Sampling interval: {}ms", cli.interval);
    info!("  - Bind address: {}", web_config.bind_address());
    info!("  - CORS enabled: {}", web_config.enable_cors);

    let served = start_web_server(web_config, MeterQuery::new(reader, config), shutdown_signal()).await;

    // The sampler may already have exited if the server never started
    let _ = shutdown_tx.send(true);
    let stats = sampler.await.context("Sampler task failed")?;
    info!(
        "Shutdown complete: {} readings, {} failed samples",
        stats.ticks, stats.failures
    );

    served?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Interrupt received, shutting down"),
        Err(e) => {
            error!("Failed to listen for interrupt signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

fn snapshot_command(cli: &Cli, args: &SnapshotArgs) -> anyhow::Result<()> {
    let config = meter_config(cli)?;
    let adc = open_adc(cli)?;

    let (writer, _reader) = snapshot_store();
    let snapshot = Sampler::new(adc, config, writer)
        .tick()
        .context("Failed to read power sensors")?;

    match args.format.as_str() {
        "json" => {
            let json = serde_json::to_string_pretty(&SwrReading::from(snapshot))?;
            println!("{}", json);
        }
        "pretty" => print_pretty_snapshot(&snapshot),
        other => anyhow::bail!("Unsupported format: {}. Use 'json' or 'pretty'", other),
    }

    Ok(())
}

fn config_command(cli: &Cli) -> anyhow::Result<()> {
    let config = meter_config(cli)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn print_pretty_snapshot(snapshot: &SwrSnapshot) {
    println!("📡 SWR Reading ({})", snapshot.local_timestamp());
    println!("==========================================");
    println!("  SWR:                    {:.2}", snapshot.swr);
    println!("  Forward power:          {:.2} W", snapshot.forward_power);
    println!("  Reflected power:        {:.2} W", snapshot.reverse_power);
    println!(
        "  Reflection coefficient: {:.4}",
        snapshot.reflection_coefficient
    );
    println!("  Power loss:             {:.2}%", snapshot.power_loss_percent);
}
