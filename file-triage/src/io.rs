use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn is_png(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("png"))
}

/// Images extracted from the PDF named `basename`, sorted by name.
///
/// Naming has not been consistent, so three patterns are tried and the first
/// that finds anything wins: `<basename>_*.png`, the same with dashes in place
/// of underscores, and finally any png whose name contains the basename.
pub fn find_associated_images<P: AsRef<Path>>(image_dir: P, basename: &str) -> Result<Vec<PathBuf>> {
    let image_dir = image_dir.as_ref();
    let mut pngs: Vec<PathBuf> = fs::read_dir(image_dir)
        .with_context(|| format!("Failed to list images in {}", image_dir.display()))?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| is_png(path))
        .collect();
    pngs.sort();

    let prefix = format!("{}_", basename);
    let exact: Vec<PathBuf> = pngs
        .iter()
        .filter(|path| file_name(path).starts_with(&prefix))
        .cloned()
        .collect();
    if !exact.is_empty() {
        log::debug!("Using pattern: {}*.png", prefix);
        return Ok(exact);
    }

    let dashed = basename.replace('_', "-");
    let with_dashes: Vec<PathBuf> = pngs
        .iter()
        .filter(|path| file_name(path).starts_with(&dashed))
        .cloned()
        .collect();
    if !with_dashes.is_empty() {
        log::debug!("Using pattern: {}*.png", dashed);
        return Ok(with_dashes);
    }

    log::debug!("Using pattern: *{}*.png", basename);
    let lower = basename.to_lowercase();
    Ok(pngs
        .into_iter()
        .filter(|path| file_name(path).to_lowercase().contains(&lower))
        .collect())
}

/// Shows a file to the operator.
pub trait Opener {
    fn open(&mut self, path: &Path) -> Result<()>;
}

/// Opens files with the desktop's default application, then waits a moment
/// for the window to appear.
#[derive(Debug, Clone)]
pub struct SystemOpener {
    pub delay: Duration,
}

impl Default for SystemOpener {
    fn default() -> Self {
        SystemOpener {
            delay: Duration::from_millis(1500),
        }
    }
}

impl Opener for SystemOpener {
    fn open(&mut self, path: &Path) -> Result<()> {
        let mut cmd = if cfg!(target_os = "windows") {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", ""]);
            cmd
        } else if cfg!(target_os = "macos") {
            Command::new("open")
        } else {
            Command::new("xdg-open")
        };
        cmd.arg(path)
            .spawn()
            .with_context(|| format!("Failed to open {}", path.display()))?;
        println!("Opening: {}", path.display());
        thread::sleep(self.delay);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"png").unwrap();
    }

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths.iter().map(|path| file_name(path)).collect()
    }

    #[test]
    fn test_exact_prefix_wins() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "01_2018_p2.png");
        touch(dir.path(), "01_2018_p1.png");
        touch(dir.path(), "01-2018-p3.png");
        touch(dir.path(), "01_2018_notes.txt");
        let found = find_associated_images(dir.path(), "01_2018").unwrap();
        assert_eq!(names(&found), vec!["01_2018_p1.png", "01_2018_p2.png"]);
    }

    #[test]
    fn test_dashed_fallback() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "01-2018-p1.png");
        touch(dir.path(), "02-2018-p1.png");
        let found = find_associated_images(dir.path(), "01_2018").unwrap();
        assert_eq!(names(&found), vec!["01-2018-p1.png"]);
    }

    #[test]
    fn test_contains_fallback_ignores_case() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "page_Guide_March.PNG");
        touch(dir.path(), "other.png");
        let found = find_associated_images(dir.path(), "guide_march").unwrap();
        assert_eq!(names(&found), vec!["page_Guide_March.PNG"]);
    }

    #[test]
    fn test_nothing_found() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "other.png");
        assert!(find_associated_images(dir.path(), "01_2018").unwrap().is_empty());
    }

    #[test]
    fn test_missing_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_associated_images(dir.path().join("missing"), "x").is_err());
    }
}
