//! # Standreg CLI Module
//!
//! This module implements the CLI interface for standreg.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `status` - Show registry row counts
//! - `init` - Initialize a new database
//! - `create-jurisdiction` - Create a tenant
//! - `load-terms` - Import a vocabulary file
//! - `import-document` - Import a standards document file
//! - `import-collection` - Import a content collection file
//! - `resolve` - Resolve a canonical URI
//! - `delete` - Delete the entity at a canonical URI

mod commands;

use clap::{Parser, Subcommand};
use standreg_core::RegistryError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Standreg - Curriculum Standards Registry
///
/// A multi-tenant registry of curriculum standards and learning-content
/// metadata. Every entity is addressable by one canonical hierarchical URI.
#[derive(Parser, Debug)]
#[command(name = "standreg")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the registry database
    #[arg(short = 'D', long, global = true, default_value = "standreg.redb")]
    pub database: PathBuf,

    /// Storage backend: "redb" (ACID database) or "memory" (volatile)
    #[arg(short = 'B', long, global = true, default_value = "redb")]
    pub backend: String,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Show registry row counts
    Status,

    /// Initialize a new empty database
    Init {
        /// Force initialization even if database exists
        #[arg(short, long)]
        force: bool,
    },

    /// Create a jurisdiction (tenant)
    CreateJurisdiction {
        /// URI-safe tenant name (becomes the URI prefix, e.g. "Ghana")
        #[arg(short, long)]
        name: String,

        /// Human-readable name
        #[arg(short, long)]
        display_name: String,

        /// ISO country code
        #[arg(long)]
        country: Option<String>,

        /// Default language tag
        #[arg(long)]
        language: Option<String>,

        /// Official website URL
        #[arg(long)]
        website_url: Option<String>,
    },

    /// Import a vocabulary with its terms from a JSON file
    LoadTerms {
        /// Jurisdiction name the vocabulary belongs to
        #[arg(short, long)]
        jurisdiction: String,

        /// Path to the vocabulary JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Fail on term paths whose parent has no row
        #[arg(long)]
        require_parent_rows: bool,
    },

    /// Import a standards document tree from a JSON file
    ImportDocument {
        /// Jurisdiction name the document belongs to
        #[arg(short, long)]
        jurisdiction: String,

        /// Path to the document JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Import a content collection tree from a JSON file
    ImportCollection {
        /// Jurisdiction name the collection belongs to
        #[arg(short, long)]
        jurisdiction: String,

        /// Path to the collection JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Resolve a canonical URI and print the entity
    Resolve {
        /// Canonical URI, e.g. /Ghana/terms/GradeLevels/B2
        uri: String,
    },

    /// Delete the entity at a canonical URI (cascades)
    Delete {
        /// Canonical URI of the entity to delete
        uri: String,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), RegistryError> {
    let backend = cli.backend.as_str();
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Server { host, port }) => {
            cmd_server(&cli.database, backend, &host, port).await
        }
        Some(Commands::Status) => cmd_status(&cli.database, backend, json_mode),
        Some(Commands::Init { force }) => cmd_init(&cli.database, backend, force),
        Some(Commands::CreateJurisdiction {
            name,
            display_name,
            country,
            language,
            website_url,
        }) => cmd_create_jurisdiction(
            &cli.database,
            backend,
            json_mode,
            name,
            display_name,
            country,
            language,
            website_url,
        ),
        Some(Commands::LoadTerms {
            jurisdiction,
            file,
            require_parent_rows,
        }) => cmd_load_terms(
            &cli.database,
            backend,
            json_mode,
            &jurisdiction,
            &file,
            require_parent_rows,
        ),
        Some(Commands::ImportDocument { jurisdiction, file }) => {
            cmd_import_document(&cli.database, backend, json_mode, &jurisdiction, &file)
        }
        Some(Commands::ImportCollection { jurisdiction, file }) => {
            cmd_import_collection(&cli.database, backend, json_mode, &jurisdiction, &file)
        }
        Some(Commands::Resolve { uri }) => cmd_resolve(&cli.database, backend, json_mode, &uri),
        Some(Commands::Delete { uri }) => cmd_delete(&cli.database, backend, &uri),
        None => {
            // No subcommand - show status by default
            cmd_status(&cli.database, backend, json_mode)
        }
    }
}
