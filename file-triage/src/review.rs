//! Reviewing one PDF and its images, one operator decision at a time.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::io::Opener;
use crate::prompt::Operator;

/// What the operator can say about an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Keep,
    Delete,
    /// Leave the rest of this PDF's images alone
    Skip,
}

impl Decision {
    pub fn parse(answer: &str) -> Option<Decision> {
        match answer.trim().to_lowercase().as_str() {
            "k" | "keep" => Some(Decision::Keep),
            "d" | "delete" => Some(Decision::Delete),
            "s" | "skip" => Some(Decision::Skip),
            _ => None,
        }
    }
}

/// Where a review is. `AwaitPdf` and `AwaitDecision` are the points where
/// control passes to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    OpenPdf,
    AwaitPdf,
    OpenImage(usize),
    AwaitDecision(usize),
    Finish,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub pdf_opened: bool,
    pub kept: usize,
    pub deleted: usize,
    pub skipped: bool,
}

impl Outcome {
    /// Note to add to the ledger, if anything was removed.
    pub fn note(&self) -> Option<String> {
        if self.deleted == 0 {
            return None;
        }
        let mut message = format!("Manually deleted {} images", self.deleted);
        if self.skipped {
            message.push_str(" before skipping");
        }
        Some(message)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn show(opener: &mut dyn Opener, path: &Path) -> bool {
    if !path.exists() {
        println!("File not found: {}", path.display());
        return false;
    }
    match opener.open(path) {
        Ok(()) => true,
        Err(err) => {
            log::warn!("{:#}", err);
            false
        }
    }
}

fn ask(operator: &mut dyn Operator, image: &str) -> Result<Decision> {
    loop {
        let answer = operator.read_line(&format!(
            "Image: {} - Keep, Delete, or Skip to next PDF? (k/d/s): ",
            image
        ))?;
        match Decision::parse(&answer) {
            Some(decision) => return Ok(decision),
            None => println!(
                "Invalid input. Please enter 'k' for keep, 'd' for delete, or 's' to skip to next PDF."
            ),
        }
    }
}

/// Walk the operator through `pdf` and then each of `images`.
///
/// A missing PDF or image is reported and passed over. A failed delete is
/// reported and the operator is asked again about the same image.
pub fn review_pdf(
    pdf: &Path,
    images: &[PathBuf],
    opener: &mut dyn Opener,
    operator: &mut dyn Operator,
) -> Result<Outcome> {
    let pdf_name = display_name(pdf);
    let mut outcome = Outcome::default();
    let mut stage = Stage::OpenPdf;

    loop {
        stage = match stage {
            Stage::OpenPdf => {
                if show(opener, pdf) {
                    outcome.pdf_opened = true;
                    Stage::AwaitPdf
                } else {
                    Stage::Finish
                }
            }
            Stage::AwaitPdf => {
                operator.read_line(&format!(
                    "Opened {}. Press Enter to continue to associated images...",
                    pdf_name
                ))?;
                if images.is_empty() {
                    println!("No images found for {}", pdf_name);
                } else {
                    println!("Found {} images associated with {}", images.len(), pdf_name);
                }
                Stage::OpenImage(0)
            }
            Stage::OpenImage(idx) if idx >= images.len() => Stage::Finish,
            Stage::OpenImage(idx) => {
                if show(opener, &images[idx]) {
                    Stage::AwaitDecision(idx)
                } else {
                    Stage::OpenImage(idx + 1)
                }
            }
            Stage::AwaitDecision(idx) => {
                let image = &images[idx];
                let image_name = display_name(image);
                match ask(operator, &image_name)? {
                    Decision::Keep => {
                        println!("Keeping: {}", image_name);
                        outcome.kept += 1;
                        Stage::OpenImage(idx + 1)
                    }
                    Decision::Delete => match fs::remove_file(image) {
                        Ok(()) => {
                            println!("Deleted: {}", image_name);
                            outcome.deleted += 1;
                            Stage::OpenImage(idx + 1)
                        }
                        Err(err) => {
                            log::error!("Error deleting image {}: {}", image.display(), err);
                            Stage::AwaitDecision(idx)
                        }
                    },
                    Decision::Skip => {
                        println!("Skipping to next PDF...");
                        outcome.skipped = true;
                        Stage::Finish
                    }
                }
            }
            Stage::Finish => {
                if !outcome.skipped {
                    operator.read_line(&format!(
                        "Finished processing {}. Press Enter to continue to next PDF...",
                        pdf_name
                    ))?;
                }
                return Ok(outcome);
            }
        };
    }
}
