use std::env;

use anyhow::{Context, Result};
use chrono::Local;
use truck_guide_scraper::browser::http_client;
use truck_guide_scraper::guidelines::guideline_rows;
use truck_guide_scraper::io::write_artifact;
use truck_guide_scraper::{fetch_html, init_logging, page};

fn main() -> Result<()> {
    init_logging();

    // Get URL from command line arguments
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("Please provide a URL and a fixture name");
        eprintln!("Usage: cargo run --bin save_page_fixture <URL> <fixture_name>");
        std::process::exit(1);
    }

    let url = &args[1];
    let fixture_name = &args[2];

    println!("Fetching HTML from {}...", url);
    let client = http_client()?;
    let html = fetch_html(&client, url).with_context(|| format!("Failed to fetch {}", url))?;

    let path = write_artifact(
        "src/tests/fixtures/captured",
        &format!("{}.html", fixture_name),
        html.as_bytes(),
    )?;
    println!("Saved HTML to {} for regression testing", path.display());

    let anchors = page::anchors(&html, url::Url::parse(url).ok().as_ref());
    let rows = guideline_rows(&html, url, Local::now().date_naive());

    println!("HTML analysis results:");
    println!("  - Title: {}", page::title(&html).unwrap_or_default());
    println!("  - Links: {}", anchors.len());
    println!("  - Guideline links: {}", rows.len());
    for row in &rows {
        println!("      {}: {}", row.date_str, row.link);
    }

    if rows.is_empty() {
        println!("\nNo guideline links recognised; this page will fail the captured-page test.");
    }

    Ok(())
}
