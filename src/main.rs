//! OmegaTerm - scripted terminal session with a login gate and live status feed

use std::env;
use std::path::PathBuf;
use std::process;

use anyhow::{anyhow, Context, Result};
use tracing::{debug, error, info};

use omegaterm::app::App;
use omegaterm::config::loader::{ConfigLoader, LoadOptions};
use omegaterm::config::Config;
use omegaterm::credentials::SecretDigest;

/// Command-line arguments
#[derive(Debug, Default)]
struct AppArgs {
    /// Configuration file path
    config_path: Option<PathBuf>,
    /// Enable debug logging
    debug: bool,
    /// Print a digest for this secret and exit
    hash_secret: Option<String>,
}

impl AppArgs {
    /// Parse command line arguments
    fn parse() -> Result<Self> {
        Self::parse_from(env::args().skip(1))
    }

    fn parse_from<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut app_args = AppArgs::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    let path = args.next().ok_or_else(|| anyhow!("Missing config file path"))?;
                    app_args.config_path = Some(PathBuf::from(path));
                }
                "--debug" | "-d" => {
                    app_args.debug = true;
                }
                "--hash-secret" => {
                    let secret = args.next().ok_or_else(|| anyhow!("Missing secret to hash"))?;
                    app_args.hash_secret = Some(secret);
                }
                "--help" | "-?" => {
                    print_help();
                    process::exit(0);
                }
                "--version" | "-v" => {
                    println!("{} v{}", omegaterm::NAME, omegaterm::VERSION);
                    process::exit(0);
                }
                other if other.starts_with('-') => {
                    return Err(anyhow!("Unknown option: {}", other));
                }
                other => {
                    return Err(anyhow!("Unexpected argument: {}", other));
                }
            }
        }

        Ok(app_args)
    }
}

/// Print help information
fn print_help() {
    println!("OmegaTerm - scripted terminal session with a login gate and live status feed");
    println!();
    println!("USAGE:");
    println!("    omegaterm [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -c, --config <PATH>       Path to configuration file");
    println!("    -d, --debug               Enable debug logging");
    println!("        --hash-secret <SECRET> Print a credential digest for the config file");
    println!("    -?, --help                Print this help message");
    println!("    -v, --version             Print version information");
    println!();
    println!("CONFIGURATION:");
    println!("    OmegaTerm looks for configuration files in the following order:");
    println!("    1. Path specified with --config");
    println!("    2. $OMEGATERM_CONFIG");
    println!("    3. <config dir>/omegaterm/config.toml");
    println!("    4. ~/.omegaterm/config.toml");
    println!("    5. ./omegaterm.toml");
    println!("    6. Built-in defaults");
    println!();
    println!("ENVIRONMENT:");
    println!("    OMEGATERM_CONFIG      Path to configuration file");
    println!("    OMEGATERM_DEBUG       Enable debug logging (1 or true)");
    println!("    RUST_LOG              Set logging level (error, warn, info, debug, trace)");
}

fn init_logging(debug: bool) {
    let debug_env = env::var("OMEGATERM_DEBUG")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    let log_level = if debug || debug_env { "debug" } else { "info" };

    let env_filter = env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(env_filter))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

/// Load configuration from the explicit path or the search paths
fn load_configuration(args: &AppArgs) -> omegaterm::Result<Config> {
    let mut loader = ConfigLoader::new();

    let config = match &args.config_path {
        Some(path) => {
            debug!("Loading config from: {}", path.display());
            loader.load_from_path(path)?
        }
        None => loader.load_with_options(LoadOptions::default())?,
    };

    match loader.current_path() {
        Some(path) => info!("Configuration loaded from: {}", path.display()),
        None => debug!("No configuration file found, using defaults"),
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = AppArgs::parse().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        print_help();
        process::exit(1);
    });

    if let Some(secret) = &args.hash_secret {
        println!("{}", SecretDigest::generate(secret).encode());
        return Ok(());
    }

    init_logging(args.debug);
    info!("Starting {} v{}", omegaterm::NAME, omegaterm::VERSION);

    let config = match load_configuration(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            eprintln!("{}", omegaterm::handle_startup_error(&e));
            process::exit(1);
        }
    };

    let app = App::from_config(config).context("failed to create application")?;
    app.run_stdio().await.context("session loop failed")?;

    info!("{} shutdown complete", omegaterm::NAME);
    Ok(())
}
