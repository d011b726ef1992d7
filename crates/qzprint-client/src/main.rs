//! qzprint: diagnostic command line for the print agent connection.
//!
//! Exercises the same `PrintService` a host application uses, so it is the
//! quickest way to check a till: is the agent running, does the signing
//! backend accept us, which printers does the agent see, does a page come out.
//!
//! # Usage
//!
//! ```text
//! qzprint [OPTIONS] <COMMAND>
//!
//! Commands:
//!   status           Probe the agent ports once
//!   printers         List the printers the agent can see
//!   default-printer  Show the agent's default printer
//!   print            Print a file
//!   test-page        Print a small HTML test page
//!
//! Options:
//!   --config <FILE>              TOML config file
//!   --agent-host <HOST>          Host the agent listens on
//!   --backend-url <URL>          Base URL of the signing backend
//!   --locate-timeout-ms <MS>     How long to wait for the agent
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable                    | Flag                  |
//! |-----------------------------|-----------------------|
//! | `QZPRINT_CONFIG`            | `--config`            |
//! | `QZPRINT_AGENT_HOST`        | `--agent-host`        |
//! | `QZPRINT_BACKEND_URL`       | `--backend-url`       |
//! | `QZPRINT_LOCATE_TIMEOUT_MS` | `--locate-timeout-ms` |
//!
//! Flags win over the config file, which wins over built-in defaults.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use qzprint_client::domain::ClientConfig;
use qzprint_client::infrastructure::build_service;
use qzprint_client::infrastructure::config_file::load_config;
use qzprint_core::protocol::envelope::current_timestamp_ms;
use qzprint_core::{PrintKind, PrintOptions};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Talks to the local print agent through the signed WebSocket channel.
#[derive(Debug, Parser)]
#[command(name = "qzprint", about = "Diagnostics for the local print agent", version)]
struct Cli {
    /// TOML config file.  A missing file means built-in defaults.
    #[arg(long, global = true, env = "QZPRINT_CONFIG")]
    config: Option<PathBuf>,

    /// Host the print agent listens on.
    #[arg(long, global = true, env = "QZPRINT_AGENT_HOST")]
    agent_host: Option<String>,

    /// Base URL of the backend serving `/qz/certificate` and `/qz/sign`.
    #[arg(long, global = true, env = "QZPRINT_BACKEND_URL")]
    backend_url: Option<String>,

    /// How long to wait for the agent before giving up, in milliseconds.
    #[arg(long, global = true, env = "QZPRINT_LOCATE_TIMEOUT_MS")]
    locate_timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Probe the agent ports once and report what answered.
    Status,
    /// List the printers the agent can see.
    Printers,
    /// Show the agent's default printer.
    DefaultPrinter,
    /// Print a file.
    Print {
        /// Target printer.  The agent's default printer when omitted.
        #[arg(long)]
        printer: Option<String>,
        /// `pixel` for HTML, `raw` for printer command streams.
        #[arg(long, default_value = "pixel")]
        kind: PrintKind,
        /// File whose contents are sent as the job data.
        file: PathBuf,
    },
    /// Print a small HTML test page.
    TestPage {
        /// Target printer.  The agent's default printer when omitted.
        #[arg(long)]
        printer: Option<String>,
    },
}

impl Cli {
    /// Loads the config file (if any) and applies the flag overrides.
    fn resolve_config(&self) -> anyhow::Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => ClientConfig::default(),
        };
        if let Some(host) = &self.agent_host {
            config.agent_host = host.clone();
        }
        if let Some(url) = &self.backend_url {
            config.backend_url = url.clone();
        }
        if let Some(ms) = self.locate_timeout_ms {
            config.locate_timeout_ms = ms;
        }
        Ok(config)
    }
}

fn test_page_html(timestamp_ms: u64) -> String {
    format!(
        "<html><body style=\"font-family: sans-serif\">\
         <h2>qzprint test page</h2>\
         <p>If you can read this, the print agent connection works.</p>\
         <p>Sent at {timestamp_ms} ms since the Unix epoch.</p>\
         </body></html>"
    )
}

fn sent_message(target: Option<&str>) -> String {
    format!("job sent to {}", target.unwrap_or("default printer"))
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // `RUST_LOG` controls verbosity; fall back to `info` when unset or invalid.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    info!(
        "qzprint starting: agent={} ports={:?} backend={}",
        config.agent_host,
        config.agent_ports,
        config.backend_base()
    );

    let service = build_service(&config)?;
    let options = PrintOptions::new();

    match cli.command {
        Command::Status => match service.get_agent_handle().await {
            Some(handle) => println!("print agent listening at {handle}"),
            None => println!(
                "print agent not reachable on {} ports {:?}",
                config.agent_host, config.agent_ports
            ),
        },
        Command::Printers => {
            let printers = service
                .get_printers()
                .await
                .context("failed to list printers")?;
            if printers.is_empty() {
                println!("no printers found");
            }
            for name in printers {
                println!("{name}");
            }
        }
        Command::DefaultPrinter => {
            let name = service
                .default_printer()
                .await
                .context("failed to resolve the default printer")?;
            println!("{name}");
        }
        Command::Print {
            printer,
            kind,
            file,
        } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let sent = match printer.as_deref() {
                Some(name) => service.print(name, &content, kind, &options).await,
                None => service.print_to_default(&content, kind, &options).await,
            };
            sent.with_context(|| format!("failed to print {}", file.display()))?;
            println!("{}", sent_message(printer.as_deref()));
        }
        Command::TestPage { printer } => {
            let html = test_page_html(current_timestamp_ms());
            let sent = match printer.as_deref() {
                Some(name) => service.print(name, &html, PrintKind::Pixel, &options).await,
                None => {
                    service
                        .print_to_default(&html, PrintKind::Pixel, &options)
                        .await
                }
            };
            sent.context("failed to print the test page")?;
            println!("{}", sent_message(printer.as_deref()));
        }
    }

    service.reset().await;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
