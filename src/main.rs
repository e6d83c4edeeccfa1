use anyhow::{Context, Result};
use backoffice::telemetry::{self, LogOptions};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;

#[derive(Parser)]
#[command(name = "backoffice")]
#[command(version, about = "Server-rendered admin dashboard")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Directory holding backoffice.toml (defaults to the current directory)
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    /// SQLite database path. Overrides backoffice.toml and BACKOFFICE_DB.
    #[arg(long, global = true)]
    pub db_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the web server
    Serve {
        /// Port to serve on. Overrides backoffice.toml and BACKOFFICE_PORT.
        #[arg(short, long)]
        port: Option<u16>,

        /// Open the dashboard in the default browser
        #[arg(long)]
        open: bool,

        /// Enable dev mode (permissive CORS, bind on all interfaces)
        #[arg(long)]
        dev: bool,
    },
    /// Create the database and optionally a superuser and demo data
    Init {
        /// Username of a superuser to create
        #[arg(long)]
        admin: Option<String>,

        /// Password for the superuser
        #[arg(long, requires = "admin")]
        password: Option<String>,

        /// Email for the superuser
        #[arg(long, requires = "admin")]
        email: Option<String>,

        /// Seed a few demo items
        #[arg(long)]
        demo: bool,
    },
    /// Export a listing to CSV, XLSX or PDF
    Export {
        /// Listing slug: users, items or dashboard
        listing: String,

        /// csv, xlsx or pdf
        format: String,

        /// Listing parameters as a query string, e.g. "q=ana&sort=email&dir=desc"
        #[arg(short, long)]
        query: Option<String>,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Initialize a default backoffice.toml file
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config_dir = match cli.config_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    // Config commands must work even when backoffice.toml does not parse.
    if let Commands::Config { command } = &cli.command {
        let _guard = telemetry::init(&LogOptions {
            json: cli.log_json,
            dir: None,
            verbose: cli.verbose,
        })?;
        return cmd::cmd_config(&config_dir, cli.db_path.as_ref(), command.clone());
    }

    let settings = cmd::load_settings(&config_dir, cli.db_path.as_ref())?;
    let _guard = telemetry::init(&LogOptions {
        json: cli.log_json || settings.logging.json,
        dir: settings.logging.dir.clone(),
        verbose: cli.verbose,
    })?;

    match cli.command {
        Commands::Serve { port, open, dev } => {
            cmd::cmd_serve(settings, port, open, dev).await?;
        }
        Commands::Init {
            admin,
            password,
            email,
            demo,
        } => cmd::cmd_init(
            &settings,
            cmd::init::InitOptions {
                admin,
                password,
                email,
                demo,
            },
        )?,
        Commands::Export {
            listing,
            format,
            query,
            output,
        } => cmd::cmd_export(
            &settings,
            cmd::export::ExportOptions {
                listing,
                format,
                query,
                output,
            },
        )?,
        Commands::Config { command } => {
            cmd::cmd_config(&config_dir, cli.db_path.as_ref(), command)?
        }
    }

    Ok(())
}
