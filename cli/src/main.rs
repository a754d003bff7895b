use std::path::PathBuf;
use std::process::exit;

use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use anyhow::Result;

use plantfinder_backend::{generate_site, Catalog, SiteConfig};
use plantfinder_backend::html_patch::{fix_language_selectors, promote_images};
use plantfinder_backend::image_fetch::{api_token_from_env, generate_images, ReplicateClient};
use plantfinder_backend::logger::{error, info, set_log_level_str, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "PlantFinder static site generator", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Optional path to a JSON site config.
    /// If not provided, the PLANTFINDER_CONFIG environment variable will be used,
    /// then the built-in defaults.
    #[arg(long, global = true, value_name = "FILE_PATH", env = "PLANTFINDER_CONFIG")]
    config: Option<PathBuf>,

    /// Root directory of the generated site.
    #[arg(long, global = true, value_name = "DIRECTORY_PATH", env = "PLANTFINDER_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Log verbosity: silent, error, warn, info or debug. Overrides LOG_LEVEL.
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render every page in every configured language, then write sitemap.xml
    Generate,

    /// Replace legacy fixed-position language pickers with the nav dropdown
    FixLanguageSelector,

    /// Swap image placeholders for photos on plant pages with a verified image
    PromoteImages,

    /// Request a generated photo for every plant that does not have one yet.
    /// Reads REPLICATE_API_TOKEN from the environment.
    GenerateImages,
}

fn load_config(config_path: Option<PathBuf>, output_dir: Option<PathBuf>) -> Result<SiteConfig> {
    let mut config = match config_path {
        Some(path) => SiteConfig::from_file(&path)?,
        None => SiteConfig::default(),
    };

    if let Some(dir) = output_dir {
        // Images follow the output dir unless the config placed them elsewhere.
        if config.images_dir == SiteConfig::default().images_dir {
            config.images_dir = dir.join("images").join("plants");
        }
        config.output_dir = dir;
    }

    config.validate()?;
    Ok(config)
}

fn run_generate(config: &SiteConfig) -> Result<()> {
    let report = generate_site(config)?;
    for (path, reason) in report.failed.iter() {
        warn(&format!("Not written: {} ({})", path, reason));
    }
    if !report.skipped_records.is_empty() {
        warn(&format!("Skipped {} malformed records", report.skipped_records.len()));
    }
    println!("Wrote {} pages to {}", report.written.len(), config.output_dir.display());
    Ok(())
}

fn run_fix_language_selector(config: &SiteConfig) -> Result<()> {
    let report = fix_language_selectors(&config.output_dir)?;
    println!("{}", report.summary());
    Ok(())
}

fn run_promote_images(config: &SiteConfig) -> Result<()> {
    let report = promote_images(&config.output_dir, config)?;
    println!("{}", report.summary());
    Ok(())
}

/// Returns false if any image failed.
fn run_generate_images(config: &SiteConfig) -> Result<bool> {
    let token = api_token_from_env()?;
    let catalog = Catalog::load(config)?;
    let client = ReplicateClient::new(&token, &config.image_api, &config.image_extension)?;

    let report = generate_images(catalog.plants(), &client, config);
    println!("Generated: {}, skipped: {}, failed: {}",
             report.generated.len(), report.skipped.len(), report.failed.len());
    for (id, reason) in report.failed.iter() {
        error(&format!("{}: {}", id, reason));
    }
    Ok(!report.has_failures())
}

fn main() {
    // A .env file may define PLANTFINDER_CONFIG, PLANTFINDER_OUTPUT_DIR or the API token.
    if dotenv().is_err() {
        info("No .env file found or failed to load.");
    }

    let cli = Cli::parse();

    if let Some(level) = cli.log_level.as_deref() {
        if !set_log_level_str(level) {
            eprintln!("Configuration error: unknown log level '{}'", level);
            exit(1);
        }
    }

    let config = match load_config(cli.config, cli.output_dir) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            exit(1);
        }
    };

    // === Execute the requested command ===

    let command_result = match cli.command {
        Commands::Generate => run_generate(&config),
        Commands::FixLanguageSelector => run_fix_language_selector(&config),
        Commands::PromoteImages => run_promote_images(&config),
        Commands::GenerateImages => match run_generate_images(&config) {
            Ok(true) => Ok(()),
            Ok(false) => exit(1),
            Err(e) => Err(e),
        },
    };

    if let Err(e) = command_result {
        eprintln!("Error executing command: {:#}", e);
        exit(1);
    }
}
