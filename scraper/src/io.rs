use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};

/// Write a diagnostic file (raw markup, screenshots) under `dir`, creating the
/// directory if needed.
pub fn write_artifact<P: AsRef<Path>>(dir: P, name: &str, contents: &[u8]) -> Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    let path = dir.join(sanitize_filename(name));
    fs::write(&path, contents)
        .with_context(|| format!("Failed to write file: {}", path.display()))?;
    Ok(path)
}

pub fn sanitize_filename(input: &str) -> String {
    // Replace characters that are problematic in filenames
    let mut sanitized = input
        .replace(
            &['/', '\\', ':', '*', '?', '"', '<', '>', '|', '\0'][..],
            "_",
        )
        .replace("__", "_");

    sanitized = sanitized.trim().trim_matches('.').to_string();

    if sanitized.is_empty() {
        sanitized = "untitled".to_string();
    }

    sanitized
}

/// Hand a file to whatever the desktop opens it with. Does not wait for the
/// application to exit.
pub fn open_with_default_app<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
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
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("page 1/2: results?"), "page 1_2_ results_");
        assert_eq!(sanitize_filename("..."), "untitled");
        assert_eq!(sanitize_filename("debug_web_page_1.html"), "debug_web_page_1.html");
    }

    #[test]
    fn test_write_artifact_creates_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("debug");
        let path = write_artifact(&nested, "page.html", b"<html></html>").unwrap();
        assert_eq!(path, nested.join("page.html"));
        assert_eq!(fs::read_to_string(path).unwrap(), "<html></html>");
    }
}
