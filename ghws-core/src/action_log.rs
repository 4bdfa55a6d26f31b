//! Append-only audit trail of the operations ghws performed

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::git::url::redact;
use crate::workspace::RepoOutcome;
use crate::{Error, Result};

/// Appends one timestamped line per event to a text file
#[derive(Debug, Clone)]
pub struct ActionLog {
    path: PathBuf,
}

impl ActionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `message` as `[YYYY-MM-DD HH:MM:SS] message`
    ///
    /// URLs inside the message are redacted.
    pub fn record(&self, message: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(Error::Io)?;
        }

        let line = format!(
            "[{}] {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            redact_words(message)
        );

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(Error::Io)?;
        file.write_all(line.as_bytes()).map_err(Error::Io)
    }

    /// Record a reconciliation outcome
    pub fn record_outcome(&self, outcome: &RepoOutcome) -> Result<()> {
        let status = if outcome.is_success() { "ok" } else { "error" };
        self.record(&format!(
            "{} {} [{}]: {}",
            outcome.policy,
            outcome.name,
            status,
            outcome.summary()
        ))
    }
}

fn redact_words(message: &str) -> String {
    message
        .split(' ')
        .map(|word| if word.contains("://") { redact_word(word) } else { word.to_string() })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Redact the URL inside `word`, keeping quotes and punctuation git wraps it in
fn redact_word(word: &str) -> String {
    let start = word.find(|c: char| c.is_ascii_alphabetic()).unwrap_or(0);
    let end = word
        .trim_end_matches(|c: char| matches!(c, '\'' | '"' | ')' | ']' | '>' | ',' | ';' | ':' | '.'))
        .len();
    if start >= end {
        return word.to_string();
    }
    format!("{}{}{}", &word[..start], redact(&word[start..end]), &word[end..])
}
