use std::fs;
use std::path::{Path, PathBuf};

const FIXTURE_DIR: &str = "src/tests/fixtures";

fn html_path(subdir: Option<&str>, name: &str) -> PathBuf {
    let dir = Path::new(FIXTURE_DIR);
    let dir = match subdir {
        Some(subdir) => dir.join(subdir),
        None => dir.to_path_buf(),
    };
    dir.join(format!("{}.html", name))
}

/// Hand-written page markup checked in next to the tests.
pub fn load_html_fixture(name: &str) -> String {
    let path = html_path(None, name);
    fs::read_to_string(&path)
        .unwrap_or_else(|err| panic!("Failed to load fixture {}: {}", path.display(), err))
}

/// A live page saved by `save_page_fixture`, if one has been captured.
pub fn load_captured_html(name: &str) -> Option<String> {
    fs::read_to_string(html_path(Some("captured"), name)).ok()
}
