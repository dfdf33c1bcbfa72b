//! Route reconciler CLI.
//!
//! # Architecture Overview
//!
//! ```text
//!   CLI flags + config file
//!            │
//!            ▼
//!   ┌─────────────────┐     ┌──────────────────────────────────────────┐
//!   │ config (TOML)   │     │            routing engine                │
//!   │ + validation    │────▶│  calculate → create missing → map/unmap  │
//!   └─────────────────┘     └────────────────────┬─────────────────────┘
//!                                                │ CloudController
//!                                                ▼
//!                                     ┌─────────────────────┐
//!                                     │ remote::client      │──▶ v2 API
//!                                     │ (reqwest, warnings) │
//!                                     └─────────────────────┘
//! ```
//!
//! Warnings are written to stderr verbatim; the outcome goes to stdout as
//! JSON. The pass is bounded by `timeouts.pass_secs` and abandoned on
//! Ctrl-C without rollback.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use route_reconciler::config::load_config;
use route_reconciler::observability::init_logging;
use route_reconciler::routing::{AppDescriptor, Application, PassRequest};
use route_reconciler::{HttpCloudController, RouteReconciler, Warnings};

#[derive(Parser)]
#[command(name = "route-reconciler")]
#[command(about = "Reconcile application routes against the platform control plane", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "reconciler.toml")]
    config: PathBuf,

    /// Organization GUID (overrides target.org_guid).
    #[arg(long)]
    org: Option<String>,

    /// Space GUID (overrides target.space_guid).
    #[arg(long)]
    space: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one reconciliation pass for an application
    Reconcile {
        #[arg(long)]
        app_guid: String,
        #[arg(long)]
        app_name: String,
        /// Route to bind, e.g. www.example.com/api or tcp.example.com:1024
        #[arg(long = "route")]
        routes: Vec<String>,
        /// Domain for the default route
        #[arg(short, long)]
        domain: Option<String>,
        /// Host for the default route
        #[arg(short = 'n', long)]
        hostname: Option<String>,
        /// Use the bare domain for the default route
        #[arg(long)]
        no_hostname: bool,
        /// Unbind every route from the application
        #[arg(long, conflicts_with = "routes")]
        no_route: bool,
    },
    /// Create and bind the default route of an application
    DefaultRoute {
        #[arg(long)]
        app_guid: String,
        #[arg(long)]
        app_name: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    init_logging(&config.logging);

    let org_guid = cli
        .org
        .or(config.target.org_guid.clone())
        .ok_or("no organization targeted: pass --org or set target.org_guid")?;
    let space_guid = cli
        .space
        .or(config.target.space_guid.clone())
        .ok_or("no space targeted: pass --space or set target.space_guid")?;

    tracing::info!(
        endpoint = %config.api.endpoint,
        org_guid = %org_guid,
        space_guid = %space_guid,
        "Configuration loaded"
    );

    let controller = HttpCloudController::from_config(&config.api, &config.timeouts)?;
    let reconciler = RouteReconciler::new(Arc::new(controller));
    let deadline = Duration::from_secs(config.timeouts.pass_secs);

    let mut warnings = Warnings::new();
    let result = {
        let work = run(cli.command, &reconciler, org_guid, space_guid, &mut warnings);
        tokio::select! {
            result = tokio::time::timeout(deadline, work) => result.unwrap_or_else(|_| {
                Err(format!("exceeded the {}s pass deadline", deadline.as_secs()).into())
            }),
            _ = tokio::signal::ctrl_c() => {
                tracing::warn!("Interrupted; remote state may be partially reconciled");
                Err("interrupted".into())
            }
        }
    };

    for warning in &warnings {
        eprintln!("{}", warning);
    }

    match result {
        Ok(summary) => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "Reconciliation failed");
            Err(e)
        }
    }
}

async fn run(
    command: Commands,
    reconciler: &RouteReconciler,
    org_guid: String,
    space_guid: String,
    warnings: &mut Warnings,
) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    match command {
        Commands::Reconcile {
            app_guid,
            app_name,
            routes,
            domain,
            hostname,
            no_hostname,
            no_route,
        } => {
            let request = PassRequest {
                org_guid,
                space_guid,
                app_guid,
                app: AppDescriptor {
                    name: app_name,
                    domain,
                    host: hostname,
                    no_hostname,
                },
                routes,
                no_route,
            };
            let outcome = reconciler.reconcile(&request, warnings).await?;
            Ok(serde_json::to_value(&outcome)?)
        }
        Commands::DefaultRoute { app_guid, app_name } => {
            let app = Application {
                guid: app_guid,
                name: app_name,
            };
            reconciler
                .create_and_map_default_application_route(&org_guid, &space_guid, &app, warnings)
                .await?;
            Ok(serde_json::json!({ "app_guid": app.guid, "default_route": "bound" }))
        }
    }
}
