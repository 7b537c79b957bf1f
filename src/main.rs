//! Domain Router CLI
//!
//! Resolves hostnames against operator-defined domain rules.
//!
//! # Architecture Overview
//!
//! ```text
//!   config file ──▶ config::loader ──▶ RouterConfig
//!        │                                  │
//!        │ notify / SIGHUP                  ▼
//!        └──────▶ config::watcher ──▶ DomainResolver ──▶ ArcSwap<Snapshot>
//!                                                             │
//!   hostname ─────────────────────────────▶ resolve() ───────┤
//!                                                             ▼
//!                                           RuleTable + ResolutionCache
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc;

use domain_router::config::{ConfigWatcher, DomainConfig, RouterConfig};
use domain_router::lifecycle::{startup, Shutdown, SignalEvent, Signals};
use domain_router::observability::metrics;
use domain_router::resolver::DomainResolver;

#[derive(Parser)]
#[command(name = "domain-router", version)]
#[command(about = "Resolve hostnames against wildcard domain rules", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "domain-router.toml")]
    config: PathBuf,

    /// Log level; overrides `observability.log_level`.
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration and compile the rules
    Check,
    /// List patterns in match-priority order
    Patterns,
    /// Resolve one or more hostnames
    Resolve {
        #[arg(required = true)]
        hosts: Vec<String>,
    },
    /// List the validated fallback DNS endpoints
    FallbackDns,
    /// Answer hostnames from stdin, reloading on config changes
    Watch,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let (config, resolver) = startup::start(&cli.config, cli.log_level.as_deref())?;

    match cli.command {
        Commands::Check => {
            println!(
                "configuration OK: {} patterns, {} fallback DNS endpoints",
                resolver.list_patterns().len(),
                resolver.fallback_dns().len()
            );
        }
        Commands::Patterns => {
            for pattern in resolver.list_patterns() {
                println!("{}", pattern);
            }
        }
        Commands::Resolve { hosts } => {
            for host in &hosts {
                println!("{}", describe(&resolver, host));
            }
        }
        Commands::FallbackDns => {
            for addr in resolver.fallback_dns() {
                println!("{}", addr);
            }
        }
        Commands::Watch => watch(&cli.config, &config, resolver).await?,
    }

    Ok(())
}

/// One output line for a lookup.
fn describe(resolver: &DomainResolver<DomainConfig>, host: &str) -> String {
    match resolver.resolve_rule(host) {
        Some(rule) => {
            let payload = serde_json::to_string(rule.payload.as_ref()).unwrap_or_default();
            format!("{} -> {} {}", host, rule.pattern, payload)
        }
        None => format!("{} -> no match", host),
    }
}

/// Serve stdin lookups until Ctrl-C, applying config changes as they happen.
async fn watch(
    path: &Path,
    config: &RouterConfig,
    resolver: Arc<DomainResolver<DomainConfig>>,
) -> Result<(), Box<dyn std::error::Error>> {
    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let shutdown = Shutdown::new();
    let mut signals = Signals::install()?;

    let (watcher, mut config_updates) = ConfigWatcher::new(path);
    let _watcher = watcher.run()?;

    // Blocking stdin reads live on their own thread so shutdown never waits on them.
    let (line_tx, mut line_rx) = mpsc::unbounded_channel::<String>();
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            match line {
                Ok(line) => {
                    if line_tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to read stdin");
                    break;
                }
            }
        }
    });

    let lookup_resolver = resolver.clone();
    let mut lookup_shutdown = shutdown.subscribe();
    let lookups = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = lookup_shutdown.recv() => break,
                line = line_rx.recv() => match line {
                    Some(line) => {
                        let host = line.trim();
                        if !host.is_empty() {
                            println!("{}", describe(&lookup_resolver, host));
                        }
                    }
                    None => {
                        tracing::debug!("stdin closed, still watching for config changes");
                        break;
                    }
                },
            }
        }
    });

    tracing::info!(version = resolver.version(), "Watching for configuration changes");

    loop {
        tokio::select! {
            Some(new_config) = config_updates.recv() => {
                if let Err(e) = resolver.on_configuration_changed(&new_config) {
                    tracing::error!(error = %e, "Configuration change rejected");
                }
            }
            event = signals.recv() => match event {
                SignalEvent::Reload => {
                    startup::reload_from_file(path, &resolver);
                }
                SignalEvent::Shutdown => break,
            },
        }
    }

    shutdown.trigger();
    let _ = lookups.await;

    tracing::info!("Shutdown complete");
    Ok(())
}
