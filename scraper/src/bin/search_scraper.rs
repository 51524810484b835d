use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use truck_guide_scraper::io::open_with_default_app;
use truck_guide_scraper::search::{self, SearchConfig, SearchRow};
use truck_guide_scraper::{init_logging, BrowserArgs, ConsoleOperator, Operator, ResultTable};

/// Collect links (and any month/year they carry) from web search results
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Search query; asked for interactively when omitted
    query: Option<String>,

    /// Number of result pages to read
    #[arg(long, default_value_t = 4)]
    pages: usize,

    /// Seconds to let each results page render
    #[arg(long, default_value_t = 3)]
    wait: u64,

    #[arg(long, default_value = "search_results.csv")]
    output: PathBuf,

    /// Where screenshots and markup of empty result pages go
    #[arg(long, default_value = ".")]
    artifact_dir: PathBuf,

    /// Open the results file when done
    #[arg(long)]
    open: bool,

    #[command(flatten)]
    browser: BrowserArgs,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let mut operator = ConsoleOperator;

    let query = match cli.query {
        Some(query) => query,
        None => operator.read_line("Enter your search query: ")?,
    };
    if query.is_empty() {
        return Err(anyhow::anyhow!("No search query given"));
    }

    let config = SearchConfig {
        pages: cli.pages,
        settle: Duration::from_secs(cli.wait),
        output_path: cli.output,
        artifact_dir: cli.artifact_dir,
    };
    let mut table: ResultTable<SearchRow> = ResultTable::new(&config.output_path);
    let mut browser = cli.browser.launch()?;

    let outcome = search::run(
        browser.as_mut(),
        &mut operator,
        &query,
        &mut table,
        &config,
        Local::now().date_naive(),
    );

    println!("Closing browser...");
    if let Err(err) = browser.close() {
        log::warn!("Failed to close browser: {}", err);
    }

    outcome.map_err(|err| {
        log::error!("An error occurred: {:?}", err);
        err
    })?;

    println!("\nTotal results found: {}", table.len());
    for line in search::preview(table.rows(), 5) {
        println!("{}", line);
    }

    if !table.is_empty() {
        println!("Results saved to {}", config.output_path.display());
        if cli.open {
            println!("Opening {}...", config.output_path.display());
            if let Err(err) = open_with_default_app(&config.output_path) {
                log::warn!("{:#}", err);
            }
        }
    }

    Ok(())
}
