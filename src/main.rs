//! Privacy Shield - PII redaction, compliance checking and field encryption
//!
//! Runs the privacy handlers as an HTTP service, or applies them once to a
//! JSON document read from stdin.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use privacy_shield::{
    api::build_app,
    config::ShieldConfig,
    crypto::{generate_secret, EncryptedEnvelope, FieldCipher},
    privacy::{ComplianceEngine, PrivacyState, Redactor},
};
use serde_json::Value;
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "privacy-shield")]
#[command(version)]
#[command(about = "PII redaction, compliance checking and field encryption")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "PRIVACY_SHIELD_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Redact PII from a JSON value read from stdin
    Redact {
        /// Skip redaction and echo the input
        #[arg(long)]
        sys: bool,
    },

    /// Check a JSON data object read from stdin against a rule set
    Check {
        /// Rule-set id (e.g. gdpr, ccpa)
        #[arg(short = 't', long = "type")]
        kind: String,
    },

    /// Encrypt a JSON value read from stdin
    Encrypt,

    /// Decrypt an envelope produced by `encrypt`
    Decrypt {
        /// Encoded envelope (`<ciphertext>.<nonce>`)
        envelope: String,
    },

    /// Generate a new encryption secret
    Keygen,

    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json_logs);

    // Load configuration
    let config = if let Some(config_path) = &cli.config {
        ShieldConfig::from_file(config_path)?
    } else {
        ShieldConfig::default()
    };

    match cli.command {
        Commands::Serve { host, port } => {
            run_server(config, host, port).await?;
        }
        Commands::Redact { sys } => {
            let data = read_stdin_json()?;
            let output = if sys {
                data
            } else {
                Redactor::standard()?.redact_value(data)
            };
            print_json(&output)?;
        }
        Commands::Check { kind } => {
            let data = read_stdin_json()?;
            let engine = ComplianceEngine::from_config(&config.compliance)?;
            let report = engine.check(&kind, &data)?;
            print_json(&serde_json::to_value(&report)?)?;
        }
        Commands::Encrypt => {
            let data = read_stdin_json()?;
            let envelope = load_cipher(&config)?.encrypt_json(&data)?;
            println!("{}", envelope);
        }
        Commands::Decrypt { envelope } => {
            let envelope: EncryptedEnvelope = envelope.trim().parse()?;
            let data = load_cipher(&config)?.decrypt_json(&envelope)?;
            print_json(&data)?;
        }
        Commands::Keygen => {
            println!("{}", generate_secret());
        }
        Commands::Config { default } => {
            let config = if default {
                ShieldConfig::default()
            } else {
                config
            };
            println!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

fn init_logging(verbose: bool, json: bool) {
    let log_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("privacy_shield={},tower_http={}", log_level, log_level).into()
    });

    // Logs go to stderr so stdout stays clean for command output
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run_server(
    mut config: ShieldConfig,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let state = PrivacyState::from_config(&config)?;
    let app = build_app(state, &config.server);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Privacy Shield listening on {}. Press Ctrl+C to stop.", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down...");
}

fn load_cipher(config: &ShieldConfig) -> Result<FieldCipher> {
    FieldCipher::from_env(&config.encryption.key_env)
        .with_context(|| format!("Set {} to a 32-byte secret", config.encryption.key_env))
}

fn read_stdin_json() -> Result<Value> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    serde_json::from_str(&input).context("stdin is not valid JSON")
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
