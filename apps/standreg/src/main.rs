//! # Standreg - Curriculum Standards Registry Server
//!
//! The main binary for the standreg metadata registry.
//!
//! This application provides:
//! - HTTP REST API server (axum-based) resolving canonical URIs
//! - CLI interface for imports and registry inspection
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │               apps/standreg (THE BINARY)              │
//! │                                                       │
//! │   ┌─────────────┐          ┌─────────────┐            │
//! │   │   CLI       │          │   HTTP API  │            │
//! │   │  (clap)     │          │   (axum)    │            │
//! │   └──────┬──────┘          └──────┬──────┘            │
//! │          │                        │                   │
//! │          └───────────┬────────────┘                   │
//! │                      ▼                                │
//! │             ┌─────────────────┐                       │
//! │             │  standreg-core  │                       │
//! │             │   (THE LOGIC)   │                       │
//! │             └─────────────────┘                       │
//! └───────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! standreg server --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! standreg status
//! standreg create-jurisdiction --name Ghana --display-name "Ghana NaCCA"
//! standreg load-terms --jurisdiction Ghana -f grade_levels.json
//! standreg resolve /Ghana/terms/GradeLevels/B2
//! ```

use clap::Parser;
use standreg::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // Initialize tracing — STANDREG_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("STANDREG_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "standreg=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Display startup banner
    if !cli.quiet {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the standreg startup banner.
fn print_banner() {
    println!(
        r#"
  ███████╗████████╗██████╗ ██████╗ ███████╗ ██████╗
  ██╔════╝╚══██╔══╝██╔══██╗██╔══██╗██╔════╝██╔════╝
  ███████╗   ██║   ██║  ██║██████╔╝█████╗  ██║  ███╗
  ╚════██║   ██║   ██║  ██║██╔══██╗██╔══╝  ██║   ██║
  ███████║   ██║   ██████╔╝██║  ██║███████╗╚██████╔╝
  ╚══════╝   ╚═╝   ╚═════╝ ╚═╝  ╚═╝╚══════╝ ╚═════╝

  Curriculum Standards Registry v{}

  One URI per entity • One root per tree • One registry per region
"#,
        env!("CARGO_PKG_VERSION")
    );
}
