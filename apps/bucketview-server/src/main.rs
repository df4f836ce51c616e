//! BucketView server: a read-only HTTP view over an S3 bucket.
//!
//! Lists "directories" as HTML or JSON and serves objects with conditional
//! GET/HEAD support.
//!
//! # Usage
//!
//! ```text
//! bucketview-server [OPTIONS] [BUCKET]
//!
//!   -l, --listen <LISTEN>  [address:]port to listen on
//!   -r, --region <REGION>  AWS region the bucket is in
//!   -d, --dev              Human-readable development logging
//!       --health-check     Probe a running server and exit 0/1
//! ```
//!
//! Flags override the environment.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `BUCKETVIEW_BUCKET` | *(required)* | Bucket to serve (the positional argument wins) |
//! | `BUCKETVIEW_LISTEN` | `0.0.0.0:8080` | `[address:]port` to bind |
//! | `BUCKETVIEW_REGION` / `AWS_DEFAULT_REGION` | *(SDK default)* | Bucket region |
//! | `BUCKETVIEW_ENDPOINT_URL` | *(unset)* | Endpoint for S3-compatible stores |
//! | `BUCKETVIEW_FORCE_PATH_STYLE` | `false` | Path-style addressing |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `LOG_FORMAT` | `json` | `json` or `pretty` |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use bucketview_core::config::BucketViewConfig;
use bucketview_core::gateway::StoreGateway;
use bucketview_http::service::{BucketViewService, HEALTH_PATH};
use bucketview_s3::S3Store;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Server version reported at startup.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Command line arguments.
#[derive(Debug, Parser)]
#[command(name = "bucketview-server")]
#[command(about = "Read-only HTTP view over an S3 bucket")]
#[command(version)]
struct Cli {
    /// Bucket to serve.
    bucket: Option<String>,

    /// `[address:]port` to listen on.
    #[arg(short, long)]
    listen: Option<String>,

    /// AWS region the bucket is in.
    #[arg(short, long)]
    region: Option<String>,

    /// Use development (pretty) logging.
    #[arg(short, long)]
    dev: bool,

    /// Probe the configured listen address and exit 0 when healthy.
    #[arg(long)]
    health_check: bool,
}

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(config: &BucketViewConfig) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(&config.log_level)
            .with_context(|| format!("invalid log level filter: {}", config.log_level))?
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.pretty_logs() {
        builder.pretty().init();
    } else {
        builder.json().init();
    }

    Ok(())
}

/// Apply command line overrides on top of `config`.
fn apply_cli(mut config: BucketViewConfig, cli: &Cli) -> BucketViewConfig {
    if let Some(ref bucket) = cli.bucket {
        config.bucket.clone_from(bucket);
    }
    if let Some(ref listen) = cli.listen {
        config.listen.clone_from(listen);
    }
    if cli.region.is_some() {
        config.region.clone_from(&cli.region);
    }
    if cli.dev {
        "pretty".clone_into(&mut config.log_format);
    }
    config
}

/// Wait for Ctrl-C.
async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.ok();
    info!("received shutdown signal, draining connections");
}

/// Perform a health check by connecting to the server and requesting the health endpoint.
///
/// Exits with code 0 if healthy, 1 otherwise.
async fn run_health_check(addr: &str) -> Result<()> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("cannot connect to {addr}"))?;

    let (mut reader, mut writer) = stream.into_split();

    let request = format!("GET {HEALTH_PATH} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    // `Connection: close` ends the exchange; a half-close here would make
    // the server drop the connection unanswered.
    writer.write_all(request.as_bytes()).await?;

    let mut response = String::new();
    reader.read_to_string(&mut response).await?;

    if is_healthy_response(&response) {
        Ok(())
    } else {
        anyhow::bail!("unhealthy response from {addr}")
    }
}

fn is_healthy_response(response: &str) -> bool {
    response.starts_with("HTTP/1.1 200") && response.contains("\"status\":\"running\"")
}

/// The address a local probe should connect to.
fn probe_addr(config: &BucketViewConfig) -> String {
    config.listen_addr().replace("0.0.0.0", "127.0.0.1")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = apply_cli(BucketViewConfig::from_env(), &cli);

    // Handle --health-check flag for container HEALTHCHECK.
    if cli.health_check {
        let healthy = run_health_check(&probe_addr(&config)).await.is_ok();
        std::process::exit(i32::from(!healthy));
    }

    init_tracing(&config)?;
    config.validate().context("invalid configuration")?;

    info!(
        bucket = %config.bucket,
        listen = %config.listen_addr(),
        region = ?config.effective_region(),
        endpoint_url = ?config.endpoint_url,
        force_path_style = config.force_path_style,
        version = VERSION,
        "starting BucketView server",
    );

    let store = S3Store::from_config(&config).await;
    let service = BucketViewService::new(StoreGateway::new(store));

    let addr: SocketAddr = config
        .listen_addr()
        .parse()
        .with_context(|| format!("invalid bind address: {}", config.listen))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(%addr, "listening for connections");

    bucketview_http::serve(listener, service, shutdown_signal()).await;
    info!("exiting");

    Ok(())
}
