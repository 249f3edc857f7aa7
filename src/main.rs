//! Job-Scout main entry point
//!
//! This is the command-line interface for the Job-Scout scraper runtime.

use clap::Parser;
use job_scout::config::{load_config_with_hash, Settings};
use job_scout::logging::init_logging;
use job_scout::{Registry, Runner};
use std::path::PathBuf;

/// Job-Scout: a pluggable job-posting scraper runtime
///
/// Job-Scout loads every registered scraper unit, runs each one in turn
/// (fetch, parse, save), and reports how many succeeded, were skipped or
/// failed. A failing unit never stops the others.
#[derive(Parser, Debug)]
#[command(name = "job-scout")]
#[command(version = "1.0.0")]
#[command(about = "A pluggable job-posting scraper runtime", long_about = None)]
struct Cli {
    /// Path to TOML settings file
    #[arg(short, long, value_name = "PATH", default_value = "config/settings.toml")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Run only the named scraper (repeatable)
    #[arg(long, value_name = "NAME")]
    only: Vec<String>,

    /// List registered scrapers and exit
    #[arg(long, conflicts_with = "dry_run")]
    list: bool,

    /// Validate settings and show what would run without running anything
    #[arg(long, conflicts_with = "list")]
    dry_run: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let registry = Registry::builtin();

    if cli.list {
        handle_list(&registry);
        return Ok(());
    }

    // Logging destinations come from settings, so failures here go to stderr
    let (settings, config_hash) = match load_config_with_hash(&cli.config) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Failed to load settings from {}: {}", cli.config.display(), e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&settings, &registry, &cli.only);
        return Ok(());
    }

    let log_path = init_logging(&settings.output, cli.verbose, cli.quiet)?;
    tracing::info!(
        "Settings loaded from {} (hash: {})",
        cli.config.display(),
        config_hash
    );
    tracing::debug!("Logging to {}", log_path.display());

    handle_run(&settings, &registry, &cli.only).await;
    Ok(())
}

/// Handles --list: prints every registered unit name
fn handle_list(registry: &Registry) {
    println!("Registered scrapers ({}):", registry.len());
    for name in registry.names() {
        println!("  - {}", name);
    }
}

/// Handles --dry-run: shows resolved settings and the units that would be loaded
fn handle_dry_run(settings: &Settings, registry: &Registry, only: &[String]) {
    println!("=== Job-Scout Dry Run ===\n");

    println!("HTTP:");
    println!("  Timeout: {}s", settings.http.timeout_secs);
    println!("  User agents: {}", settings.http.user_agents.len());

    println!("\nDriver:");
    println!("  Settle wait: {}s", settings.driver.wait_seconds);
    if let Some(path) = &settings.driver.search_path {
        println!("  Search path: {}", path);
    }

    println!("\nOutput:");
    println!("  Raw data: {}", settings.output.raw_dir);
    println!(
        "  Log file: {}",
        job_scout::logging::log_file_path(&settings.output).display()
    );

    println!("\nScrapers:");
    let mut selected = 0;
    for name in registry.names() {
        if !only.is_empty() && !only.iter().any(|o| o == name) {
            continue;
        }
        let unit = settings.unit(name);
        if unit.enabled {
            selected += 1;
        }
        println!(
            "  - {} [{}] url: {}, fetch mode: {}, wait: {}",
            name,
            if unit.enabled { "enabled" } else { "disabled" },
            unit.url.as_deref().unwrap_or("(built-in)"),
            unit.fetch_mode.as_deref().unwrap_or("(built-in)"),
            unit.wait_seconds
                .map(|w| format!("{}s", w))
                .unwrap_or_else(|| "(built-in)".to_string())
        );
    }

    println!("\n✓ Settings are valid");
    println!("✓ Would load {} scraper(s)", selected);
}

/// Handles the default mode: discover, run, report
async fn handle_run(settings: &Settings, registry: &Registry, only: &[String]) {
    let discovery = registry.discover(settings, only).await;
    let summary = Runner::new().run_discovery(discovery).await;
    println!("{}", summary);
}
