use std::path::PathBuf;

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use truck_guide_scraper::browser::http_client;
use truck_guide_scraper::guidelines::{self, GuidelineRow, GuidelinesConfig};
use truck_guide_scraper::{init_logging, ResultTable};

/// List the Commercial Truck Guidelines downloads on the industry guidelines page
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(long, default_value = guidelines::GUIDELINES_BASE_URL)]
    base_url: String,

    #[arg(long, default_value = guidelines::GUIDELINES_PATH)]
    page: String,

    #[arg(long, default_value = "commercial_truck_guidelines.csv")]
    output: PathBuf,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = GuidelinesConfig {
        base_url: cli.base_url,
        page_path: cli.page,
        output_path: cli.output,
    };

    println!("Scraping Commercial Truck Guidelines from {}...", config.page_url());
    let client = http_client()?;
    let rows = guidelines::scrape(&client, &config, Local::now().date_naive());

    if rows.is_empty() {
        println!("No Commercial Truck Guidelines links found");
        return Ok(());
    }

    println!("Found {} Commercial Truck Guidelines links", rows.len());
    let mut table: ResultTable<GuidelineRow> = ResultTable::new(&config.output_path);
    for row in rows {
        table.push(row);
    }
    table.flush()?;
    println!("Data saved to {}", config.output_path.display());

    println!("\nSummary of Guidelines found:");
    for row in table.rows() {
        println!("{}: {}", row.date_str, row.link);
    }

    Ok(())
}
