//! Floating ad CLI for settings management and overlay rendering.
//!
//! This tool provides commands for:
//! - Sanitizing ad settings and writing them to the settings store
//! - Showing, seeding, deleting and hashing the stored settings
//! - Classifying user agents into display devices
//! - Rendering the overlay for a simulated page request

use clap::{Parser, Subcommand, ValueEnum};
use floatad_common::ad_settings::sanitize;
use floatad_common::config_store::load_ad_settings;
use floatad_common::logging::init_logging;
use http::Method;
use std::path::PathBuf;

mod ad_settings;
mod config;
mod error;
mod hash;
mod render;

use error::CliError;

#[derive(Parser)]
#[command(name = "floatad")]
#[command(about = "Floating ad overlay settings and rendering")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Service configuration file (defaults to the bundled floatad.toml)
    #[arg(long, short, global = true, env = "FLOATAD_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Ad settings management
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Print the display device for a user agent
    Classify {
        /// User-Agent header value
        #[arg(long, short)]
        user_agent: String,
    },

    /// Render the overlay for a simulated request
    Render {
        /// User-Agent header value
        #[arg(long, short)]
        user_agent: String,

        /// Cookie header value
        #[arg(long)]
        cookie: Option<String>,

        /// Request path
        #[arg(long, default_value = "/")]
        path: String,

        /// Request method
        #[arg(long, default_value = "GET")]
        method: Method,

        /// HTML page to inject the overlay into
        #[arg(long)]
        page: Option<PathBuf>,

        /// Use this settings file instead of the store
        #[arg(long, short)]
        file: Option<PathBuf>,

        /// Settings store file (defaults to store.path)
        #[arg(long)]
        store: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the sanitized form of a settings file
    Sanitize {
        /// Path to the JSON settings file
        #[arg(long, short)]
        file: PathBuf,
    },

    /// Sanitize a settings file and write it to the store
    Push {
        /// Path to the JSON settings file
        #[arg(long, short)]
        file: PathBuf,

        /// Settings store file (defaults to store.path)
        #[arg(long)]
        store: Option<PathBuf>,

        /// Dry run - show what would be written without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the effective settings
    Show {
        /// Settings store file (defaults to store.path)
        #[arg(long)]
        store: Option<PathBuf>,
    },

    /// Seed default settings unless some are already stored
    Init {
        /// Settings store file (defaults to store.path)
        #[arg(long)]
        store: Option<PathBuf>,
    },

    /// Remove the stored settings
    Delete {
        /// Settings store file (defaults to store.path)
        #[arg(long)]
        store: Option<PathBuf>,
    },

    /// Compute and display the settings hash (SHA-256)
    Hash {
        /// Settings store file (defaults to store.path)
        #[arg(long)]
        store: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: HashFormat,

        /// Hash the raw store file instead of the sanitized settings
        #[arg(long)]
        raw: bool,
    },
}

#[derive(Clone, ValueEnum, Debug)]
pub enum HashFormat {
    Text,
    Json,
}

fn main() {
    let cli = Cli::parse();

    match run(cli) {
        Ok(Some(output)) => println!("{}", output),
        Ok(None) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<Option<String>, CliError> {
    let mut settings = config::load_settings(cli.config.as_deref())?;
    if cli.verbose {
        settings.logging.debug = true;
    }
    init_logging(&settings.logging);

    match cli.command {
        Commands::Settings { action } => match action {
            SettingsAction::Sanitize { file } => ad_settings::sanitize_file(&file).map(Some),
            SettingsAction::Push {
                file,
                store,
                dry_run,
            } => {
                let store = config::open_store(&settings, store);
                ad_settings::push(&store, &file, dry_run, cli.verbose).map(Some)
            }
            SettingsAction::Show { store } => {
                ad_settings::show(&config::open_store(&settings, store)).map(Some)
            }
            SettingsAction::Init { store } => {
                ad_settings::init(&config::open_store(&settings, store)).map(Some)
            }
            SettingsAction::Delete { store } => {
                ad_settings::delete(&config::open_store(&settings, store)).map(Some)
            }
            SettingsAction::Hash { store, format, raw } => {
                let store = config::open_store(&settings, store);
                hash::compute_and_format(&store, format, raw).map(Some)
            }
        },
        Commands::Classify { user_agent } => Ok(Some(render::classify(&user_agent))),
        Commands::Render {
            user_agent,
            cookie,
            path,
            method,
            page,
            file,
            store,
        } => {
            let ad = match file {
                Some(file) => sanitize(&config::read_raw_settings(&file)?),
                None => load_ad_settings(&config::open_store(&settings, store))
                    .map_err(|e| CliError::Store(format!("{e:?}")))?,
            };
            let request = render::SimulatedRequest {
                user_agent: &user_agent,
                cookie: cookie.as_deref(),
                path: &path,
                method,
            };
            render::render(&settings, &ad, &request, page.as_deref())
        }
    }
}
