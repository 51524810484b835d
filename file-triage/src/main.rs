mod io;
use crate::io::{find_associated_images, SystemOpener};
mod ledger;
use crate::ledger::Ledger;
mod prompt;
use crate::prompt::ConsoleOperator;
mod review;
use crate::review::review_pdf;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Review the images extracted from each PDF in a ledger, oldest first, and
/// delete the ones that aren't wanted
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Ledger CSV with pdf_filename and date columns
    #[arg(default_value = "df_6.csv")]
    ledger: PathBuf,

    /// Where the updated ledger is written
    #[arg(long, default_value = "df_7.csv")]
    output: PathBuf,

    #[arg(long, default_value = "pdfs")]
    pdf_dir: PathBuf,

    #[arg(long, default_value = "pdfs/Images")]
    image_dir: PathBuf,

    /// Seconds to wait after opening a file
    #[arg(long, default_value_t = 1.5)]
    open_wait: f64,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    if let Err(err) = run(Cli::parse()) {
        log::error!("{:?}", err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut ledger = Ledger::load(&cli.ledger)?;
    ledger.sort_by_date();
    log::info!("Loaded {} ledger rows from {}", ledger.len(), cli.ledger.display());

    let wait = Duration::try_from_secs_f64(cli.open_wait)
        .with_context(|| format!("Invalid --open-wait value: {}", cli.open_wait))?;
    let mut opener = SystemOpener { delay: wait };
    let mut operator = ConsoleOperator;

    for idx in 0..ledger.len() {
        let entry = ledger.entry(idx);
        let pdf_path = cli.pdf_dir.join(entry.pdf_filename);
        let basename = entry.basename().to_string();
        println!("\nProcessing: {} - Date: {}", basename, entry.display_date());

        let images = find_associated_images(&cli.image_dir, &basename).unwrap_or_else(|err| {
            log::error!("Error finding images for {}: {:#}", basename, err);
            Vec::new()
        });

        let outcome = review_pdf(&pdf_path, &images, &mut opener, &mut operator)?;
        if outcome.pdf_opened {
            println!(
                "{}: kept {}, deleted {}{}",
                basename,
                outcome.kept,
                outcome.deleted,
                if outcome.skipped { ", skipped the rest" } else { "" }
            );
        } else {
            log::warn!("{} was not reviewed: PDF missing or could not be opened", basename);
        }

        if let Some(message) = outcome.note() {
            let note = ledger.append_note(idx, &message).to_string();
            ledger.save(&cli.output)?;
            println!("Updated note for {}: {}", basename, note);
        }
    }

    ledger.save(&cli.output)?;
    println!("\nProcess complete. All changes have been saved.");
    Ok(())
}
