//! rera-scraper CLI
//!
//! Opens the project listing, visits the first N detail pages and writes one CSV row per project.

use anyhow::{Context, bail};
use clap::Parser;
use rera_scraper::{CsvSink, LaunchOptions, ListingNavigator, RunOptions, SiteProfile};
use std::{path::PathBuf, time::Duration};

#[derive(Parser)]
#[command(name = "rera-scraper")]
#[command(version)]
#[command(about = "Scrape RERA project registrations into a CSV file", long_about = None)]
struct Cli {
    /// Number of projects to scrape from the first listing page
    #[arg(long, short = 'n', default_value_t = 6)]
    count: usize,

    /// Output CSV path (overwritten after every scraped project)
    #[arg(long, short = 'o', default_value = "rera_projects.csv")]
    output: PathBuf,

    /// Listing URL, overriding the profile's
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Site profile JSON file (default: built-in Odisha RERA profile)
    #[arg(long, value_name = "FILE")]
    profile: Option<PathBuf>,

    /// Launch browser in headed mode (default: headless)
    #[arg(long, short = 'H')]
    headed: bool,

    /// Path to custom browser executable
    #[arg(long, value_name = "PATH")]
    chrome_path: Option<PathBuf>,

    /// Disable the Chrome sandbox (needed in some containers)
    #[arg(long)]
    no_sandbox: bool,

    /// Per-locator timeout for field lookups
    #[arg(long, value_name = "MS", default_value_t = 5000)]
    field_timeout_ms: u64,

    /// Fixed delay after every page settles
    #[arg(long, value_name = "MS")]
    grace_ms: Option<u64>,

    /// Delay before each click and navigation
    #[arg(long, value_name = "MS", default_value_t = 0)]
    slow_mo_ms: u64,

    /// Print the effective site profile as JSON and exit
    #[arg(long)]
    print_profile: bool,

    /// Print the JSON schema for profile files and exit
    #[arg(long)]
    print_profile_schema: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if cli.print_profile_schema {
        let schema = schemars::schema_for!(SiteProfile);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    let mut profile = match &cli.profile {
        Some(path) => {
            SiteProfile::from_path(path).with_context(|| format!("Failed to load profile {}", path.display()))?
        }
        None => SiteProfile::odisha_rera(),
    };
    if let Some(url) = cli.url.clone() {
        profile.listing_url = url;
    }

    if cli.print_profile {
        println!("{}", serde_json::to_string_pretty(&profile)?);
        return Ok(());
    }

    let mut options = RunOptions::new()
        .target_count(cli.count)
        .output(&cli.output)
        .field_timeout(Duration::from_millis(cli.field_timeout_ms));
    if let Some(grace) = cli.grace_ms {
        options = options.grace(Duration::from_millis(grace));
    }

    let mut launch = LaunchOptions::new()
        .headless(!cli.headed)
        .sandbox(!cli.no_sandbox)
        .slow_motion(Duration::from_millis(cli.slow_mo_ms));
    if let Some(path) = cli.chrome_path.clone() {
        launch = launch.chrome_path(path);
    }

    let mut sink = CsvSink::new(&options.output);
    let summary = ListingNavigator::new(&profile, &options).run(&launch, &mut sink);

    println!("Total projects attempted: {}", summary.attempted);
    println!("Total projects scraped:   {}", summary.succeeded);

    if summary.is_aborted() {
        bail!("Scraping aborted: {:?}", summary.outcome);
    }

    if summary.succeeded > 0 {
        println!("All data has been saved to {}", sink.path().display());
    }

    Ok(())
}
