//! doctree - Document explorer client.
//!
//! Usage:
//!   doctree tree [--search TERM] [--type T]...   Show the document tree
//!   doctree types                                List document types
//!   doctree info <TYPE> <UUID>                   Show document info
//!   doctree rename <UUID> <NAME>                 Rename a document
//!   doctree move <UUID>... --to <FOLDER>         Move documents
//!   doctree copy <UUID>... --to <FOLDER>         Copy documents
//!   doctree delete <UUID>...                     Delete documents
//!   doctree export [-o FILE]                     Export the tree as JSON

mod render;
mod session;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};
use tracing_subscriber::EnvFilter;

use doctree_core::{ClientConfig, PermissionInheritance};

use crate::session::Session;

#[derive(Parser)]
#[command(
    name = "doctree",
    version,
    about = "Browse and organise documents held by an explorer service",
    long_about = "doctree loads the document tree from an explorer service and \
                  applies renames, moves, copies and deletes through it.\n\n\
                  The service URL comes from --url or from the config file."
)]
struct Cli {
    /// Explorer service base URL (overrides the config file)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Path to a TOML config file
    #[arg(short, long, global = true, env = "DOCTREE_CONFIG")]
    config: Option<PathBuf>,

    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the document tree
    Tree {
        /// Only show documents whose name contains this text
        #[arg(short, long, default_value = "")]
        search: String,

        /// Only show documents of this type (repeatable)
        #[arg(short = 't', long = "type")]
        types: Vec<String>,

        /// Maximum depth to display
        #[arg(short, long)]
        depth: Option<usize>,
    },

    /// List the known document types
    Types,

    /// Show audit information for a document
    Info {
        /// Document type
        doc_type: String,

        /// Document uuid
        uuid: String,
    },

    /// Rename a document or folder
    Rename {
        /// Document uuid
        uuid: String,

        /// New name
        name: String,
    },

    /// Move documents into a folder
    Move {
        /// Documents to move
        #[arg(required = true)]
        uuids: Vec<String>,

        /// Destination folder uuid
        #[arg(long)]
        to: String,

        /// Permission handling (NONE, SOURCE, DESTINATION, COMBINED)
        #[arg(short, long)]
        permissions: Option<PermissionInheritance>,
    },

    /// Copy documents into a folder
    Copy {
        /// Documents to copy
        #[arg(required = true)]
        uuids: Vec<String>,

        /// Destination folder uuid
        #[arg(long)]
        to: String,

        /// Permission handling (NONE, SOURCE, DESTINATION, COMBINED)
        #[arg(short, long)]
        permissions: Option<PermissionInheritance>,
    },

    /// Delete documents and their contents
    Delete {
        /// Documents to delete
        #[arg(required = true)]
        uuids: Vec<String>,
    },

    /// Export the document tree to JSON
    Export {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config, cli.url)?;
    let mut session = Session::new(&config)?;

    match cli.command {
        Command::Tree {
            search,
            types,
            depth,
        } => {
            session.load().await?;
            print!("{}", session.tree(&search, types, depth)?);
        }
        Command::Types => {
            session.load().await?;
            print!("{}", render::render_types(session.doc_ref_types()));
        }
        Command::Info { doc_type, uuid } => {
            let info = session.info(&doc_type, &uuid).await?;
            print!("{}", render::render_info(&info));
        }
        Command::Rename { uuid, name } => {
            session.load().await?;
            let renamed = session.rename(&uuid, &name).await?;
            eprintln!("Renamed {} to {}", renamed.uuid, renamed.name);
        }
        Command::Move {
            uuids,
            to,
            permissions,
        } => {
            session.load().await?;
            let permissions = permissions.unwrap_or(config.permission_inheritance);
            let summary = session.move_to(&uuids, &to, permissions).await?;
            eprintln!("{summary}");
        }
        Command::Copy {
            uuids,
            to,
            permissions,
        } => {
            session.load().await?;
            let permissions = permissions.unwrap_or(config.permission_inheritance);
            let summary = session.copy(&uuids, &to, permissions).await?;
            eprintln!("{summary}");
        }
        Command::Delete { uuids } => {
            session.load().await?;
            let summary = session.delete(&uuids).await?;
            eprintln!("{summary}");
        }
        Command::Export { output } => {
            session.load().await?;
            run_export(&session, output)?;
        }
    }

    session.report_notices();
    Ok(())
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Resolve the client config from the config file and the `--url` flag.
fn load_config(path: Option<PathBuf>, url: Option<String>) -> Result<ClientConfig> {
    let mut config = match (path, &url) {
        (Some(path), _) => ClientConfig::load(&path)
            .wrap_err_with(|| format!("Failed to load config {}", path.display()))?,
        (None, Some(url)) => ClientConfig::new(url.clone()),
        (None, None) => {
            return Err(eyre!(
                "No explorer service configured; pass --url or --config"
            ));
        }
    };

    if let Some(url) = url {
        config.explorer_service_url = url;
    }
    config.validate().wrap_err("Invalid configuration")?;
    Ok(config)
}

/// Export the document tree to JSON.
fn run_export(session: &Session, output: Option<PathBuf>) -> Result<()> {
    let tree = session.document_tree()?;
    let json = serde_json::to_string_pretty(tree)?;

    match output {
        Some(output_path) => {
            std::fs::write(&output_path, json)
                .wrap_err_with(|| format!("Failed to write {}", output_path.display()))?;
            eprintln!("Exported to {}", output_path.display());
        }
        None => {
            println!("{json}");
        }
    }

    Ok(())
}
