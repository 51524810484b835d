use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use truck_guide_scraper::market::{crawl, ArticleRow, MarketConfig, MARKET_URL};
use truck_guide_scraper::{init_logging, BrowserArgs, ResultTable};

/// Crawl the commercial truck market listing and record each article's month and year
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Listing page; later pages are fetched with ?page=N
    #[arg(long, default_value = MARKET_URL)]
    base_url: String,

    /// Stop after this many listing pages even if new links keep appearing
    #[arg(long, default_value_t = 10)]
    max_pages: usize,

    /// Seconds to let a listing page render
    #[arg(long, default_value_t = 5)]
    page_wait: u64,

    /// Seconds to let an article page render
    #[arg(long, default_value_t = 3)]
    article_wait: u64,

    /// Saved after every listing page and reloaded on the next run
    #[arg(long, default_value = "truck_market_dates_progress.csv")]
    progress: PathBuf,

    #[arg(long, default_value = "truck_market_dates.csv")]
    output: PathBuf,

    #[command(flatten)]
    browser: BrowserArgs,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = MarketConfig {
        base_url: cli.base_url,
        max_pages: cli.max_pages,
        page_settle: Duration::from_secs(cli.page_wait),
        article_settle: Duration::from_secs(cli.article_wait),
        progress_path: cli.progress,
        output_path: cli.output,
    };

    let mut table: ResultTable<ArticleRow> = ResultTable::load_or_new(&config.progress_path)?;
    let mut browser = cli.browser.launch()?;

    let outcome = crawl(
        browser.as_mut(),
        &mut table,
        &config,
        Local::now().date_naive(),
    );

    if let Err(err) = browser.close() {
        log::warn!("Failed to close browser: {}", err);
    }
    println!("Browser closed");

    let summary = outcome.map_err(|err| {
        log::error!("An error occurred: {:?}", err);
        err
    })?;

    println!("\nFinal Results:");
    for row in table.rows() {
        println!("{:<70} {:<10} {}", row.link, row.month, row.year);
    }
    println!(
        "\n{} pages, {} new rows ({} without a date), {} already saved, {} failed",
        summary.pages, summary.added, summary.undated, summary.skipped, summary.failed
    );
    println!("Results saved to {}", config.output_path.display());

    Ok(())
}
