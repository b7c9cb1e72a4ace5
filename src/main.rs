//! riemann - command-line client for Riemann
//!
//! Sends events and runs queries over TCP, TLS or UDP.

mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use riemann_client::{Client, ConnectionConfig, TlsClientConfig, TransportKind};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "riemann")]
#[command(about = "Send events to and query a Riemann server")]
#[command(version)]
struct Cli {
    /// Server host
    #[arg(short = 'H', long, env = "RIEMANN_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Server port (defaults to 5555, or 5554 for TLS)
    #[arg(short, long, env = "RIEMANN_PORT")]
    port: Option<u16>,

    /// Transport: tcp, tls or udp
    #[arg(short, long, env = "RIEMANN_TRANSPORT", default_value = "tcp")]
    transport: TransportKind,

    /// Connect timeout in seconds
    #[arg(long, default_value = "2")]
    timeout: f64,

    // ===== TLS Options =====
    /// Use TLS (same as --transport tls)
    #[arg(long, env = "RIEMANN_TLS")]
    tls: bool,

    /// Path to CA certificate for server verification
    #[arg(long, env = "RIEMANN_CA_CERT")]
    ca_cert: Option<PathBuf>,

    /// Path to client certificate (for mTLS)
    #[arg(long, env = "RIEMANN_CLIENT_CERT")]
    client_cert: Option<PathBuf>,

    /// Path to client private key (for mTLS)
    #[arg(long, env = "RIEMANN_CLIENT_KEY")]
    client_key: Option<PathBuf>,

    /// Server name for TLS SNI (defaults to host)
    #[arg(long)]
    server_name: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send one event
    Send {
        /// Service name
        #[arg(short, long)]
        service: String,

        /// Metric value
        #[arg(short, long)]
        metric: Option<f32>,

        /// Event state, e.g. ok, warning, critical
        #[arg(long)]
        state: Option<String>,

        /// Host the event is about (not the server)
        #[arg(long)]
        event_host: Option<String>,

        /// Free-form description
        #[arg(short, long)]
        description: Option<String>,

        /// Seconds the event stays valid
        #[arg(long)]
        ttl: Option<f32>,

        /// Tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Attribute as key=value (repeatable)
        #[arg(short, long = "attribute")]
        attributes: Vec<String>,

        /// Attributes as a JSON object
        #[arg(long = "attributes")]
        attributes_json: Option<String>,
    },

    /// Query the server index
    Query {
        /// Query expression, e.g. 'service = "cpu" and state = "critical"'
        query: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let transport = if cli.tls {
        TransportKind::Tls
    } else {
        cli.transport
    };

    if cli.client_cert.is_some() != cli.client_key.is_some() {
        eprintln!(
            "{}: --client-cert and --client-key must be used together",
            "Error".red()
        );
        std::process::exit(1);
    }

    if !cli.timeout.is_finite() || cli.timeout <= 0.0 {
        eprintln!("{}: --timeout must be a positive number", "Error".red());
        std::process::exit(1);
    }

    let port = cli.port.unwrap_or_else(|| transport.default_port());
    let mut config = ConnectionConfig::new(cli.host.clone(), port)
        .with_transport(transport)
        .with_connect_timeout(Duration::from_secs_f64(cli.timeout));

    if transport == TransportKind::Tls {
        let mut tls = TlsClientConfig::new();
        tls.ca_cert_path = cli.ca_cert.clone();
        tls.client_cert_path = cli.client_cert.clone();
        tls.client_key_path = cli.client_key.clone();
        tls.server_name = cli.server_name.clone();
        config = config.with_tls(tls);
    }

    tracing::debug!("Using {} transport to {}:{}", transport, cli.host, port);

    let mut client = Client::new(config);
    match commands::execute(&mut client, cli.command).await {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(commands::CommandError::NotAcknowledged(msg)) => {
            eprintln!("{}", msg);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            std::process::exit(1);
        }
    }
}
