use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::browser::{Browser, BrowserError, BrowserResult};
use crate::operator::Operator;

pub mod fixtures;
pub mod search_tests;

/// Serves canned pages by URL and records what it was asked to do.
#[derive(Default)]
pub struct FakeBrowser {
    pages: HashMap<String, String>,
    current: Option<String>,
    pub visited: Vec<String>,
    pub screenshots: Vec<PathBuf>,
    pub supports_screenshots: bool,
}

impl FakeBrowser {
    pub fn with_page(mut self, url: &str, html: String) -> Self {
        self.pages.insert(url.to_string(), html);
        self
    }
}

impl Browser for FakeBrowser {
    fn navigate(&mut self, url: &str) -> BrowserResult<()> {
        self.visited.push(url.to_string());
        if self.pages.contains_key(url) {
            self.current = Some(url.to_string());
            Ok(())
        } else {
            Err(BrowserError::Driver(format!("no such page: {}", url)))
        }
    }

    fn page_source(&mut self) -> BrowserResult<String> {
        let url = self.current.as_ref().ok_or(BrowserError::NoPage)?;
        Ok(self.pages[url].clone())
    }

    fn current_url(&mut self) -> BrowserResult<String> {
        self.current.clone().ok_or(BrowserError::NoPage)
    }

    fn screenshot(&mut self, path: &Path) -> BrowserResult<()> {
        if !self.supports_screenshots {
            return Err(BrowserError::Unsupported("screenshot"));
        }
        self.screenshots.push(path.to_path_buf());
        Ok(())
    }
}

/// Answers prompts from a fixed script.
pub struct ScriptedOperator {
    answers: VecDeque<String>,
    pub prompts: Vec<String>,
}

impl ScriptedOperator {
    pub fn new(answers: &[&str]) -> Self {
        ScriptedOperator {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            prompts: Vec::new(),
        }
    }
}

impl Operator for ScriptedOperator {
    fn read_line(&mut self, prompt: &str) -> Result<String> {
        self.prompts.push(prompt.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("operator script ran out at: {}", prompt))
    }
}
