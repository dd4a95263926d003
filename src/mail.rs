//! Message loading and header parsing.
//!
//! A message is a plain text file: a handful of `Header: value` lines, a
//! blank line, then the body. Files live one directory below the corpus
//! root, and that directory name is kept as the message's folder.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// A blank line only ends the header block after this many lines.
const MIN_HEADER_LINES: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("emails directory not found: {0}")]
    RootNotFound(PathBuf),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Email {
    pub path: PathBuf,
    pub folder: String,
    pub filename: String,
    pub content: String,
    pub from: String,
    pub to: String,
    pub subject: String,
    pub date: String,
    pub date_parsed: Option<DateTime<FixedOffset>>,
    pub body: String,
}

impl Email {
    /// `folder/filename`, used to cite where a fact came from.
    pub fn source(&self) -> String {
        format!("{}/{}", self.folder, self.filename)
    }
}

/// Parse a raw message into header fields and body.
pub fn parse_email(content: &str, path: &Path) -> Email {
    let lines: Vec<&str> = content.split('\n').collect();

    let mut from = String::new();
    let mut to = String::new();
    let mut subject = String::new();
    let mut date = String::new();
    let mut body_start = 0;

    for (i, line) in lines.iter().enumerate() {
        if let Some(rest) = line.strip_prefix("From:") {
            from = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix("To:") {
            to = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix("Subject:") {
            subject = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix("Date:") {
            date = rest.trim().to_string();
        } else if line.trim().is_empty() && i > MIN_HEADER_LINES {
            body_start = i + 1;
            break;
        }
    }

    let body = lines.get(body_start..).unwrap_or_default().join("\n");

    Email {
        folder: path
            .parent()
            .and_then(|p| p.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
        filename: path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
        path: path.to_path_buf(),
        content: content.to_string(),
        date_parsed: parse_date(&date),
        from,
        to,
        subject,
        date,
        body,
    }
}

fn parse_date(value: &str) -> Option<DateTime<FixedOffset>> {
    if value.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc2822(value)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .ok()
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FolderCount {
    pub folder: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CorpusStats {
    pub total: usize,
    pub folders: Vec<FolderCount>,
    pub earliest: Option<DateTime<FixedOffset>>,
    pub latest: Option<DateTime<FixedOffset>>,
}

/// Every message found under a root directory, ordered by path.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    root: PathBuf,
    emails: Vec<Email>,
}

impl Corpus {
    pub fn from_emails(root: PathBuf, mut emails: Vec<Email>) -> Self {
        emails.sort_by(|a, b| a.path.cmp(&b.path));
        Self { root, emails }
    }

    /// Load and parse every `*.{extension}` file below `root`.
    ///
    /// Unreadable or non-UTF-8 files are logged and skipped.
    pub fn load(root: &Path, extension: &str) -> Result<Self, MailError> {
        if !root.is_dir() {
            return Err(MailError::RootNotFound(root.to_path_buf()));
        }

        let files = discover(root, extension);
        log::debug!("found {} message files under {}", files.len(), root.display());

        let progress = if console_attached() && !files.is_empty() {
            let bar = ProgressBar::new(files.len() as u64);
            if let Ok(style) = ProgressStyle::with_template("{msg} [{bar:30}] {pos}/{len}") {
                bar.set_style(style.progress_chars("=> "));
            }
            bar.set_message("loading emails");
            Some(bar)
        } else {
            None
        };

        let emails: Vec<Email> = files
            .par_iter()
            .filter_map(|path| {
                let parsed = match std::fs::read_to_string(path) {
                    Ok(content) => Some(parse_email(&content, path)),
                    Err(e) => {
                        log::warn!("skipping {}: {}", path.display(), e);
                        None
                    }
                };
                if let Some(bar) = &progress {
                    bar.inc(1);
                }
                parsed
            })
            .collect();

        if let Some(bar) = progress {
            bar.finish_and_clear();
        }

        log::info!("loaded {} emails from {}", emails.len(), root.display());
        Ok(Self::from_emails(root.to_path_buf(), emails))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn emails(&self) -> &[Email] {
        &self.emails
    }

    pub fn len(&self) -> usize {
        self.emails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Email> {
        self.emails.get(index)
    }

    /// Look up a message by its `folder/filename` source string.
    pub fn find(&self, folder: &str, filename: &str) -> Option<&Email> {
        self.emails
            .iter()
            .find(|email| email.folder == folder && email.filename == filename)
    }

    /// Distinct folder names, sorted.
    pub fn folders(&self) -> Vec<String> {
        self.folder_counts().into_keys().collect()
    }

    pub fn stats(&self) -> CorpusStats {
        let folders = self
            .folder_counts()
            .into_iter()
            .map(|(folder, count)| FolderCount { folder, count })
            .collect();

        let dates = self.emails.iter().filter_map(|email| email.date_parsed);

        CorpusStats {
            total: self.emails.len(),
            folders,
            earliest: dates.clone().min(),
            latest: dates.max(),
        }
    }

    fn folder_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for email in &self.emails {
            *counts.entry(email.folder.clone()).or_insert(0) += 1;
        }
        counts
    }
}

fn discover(root: &Path, extension: &str) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let walker = ignore::WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .ignore(false)
        .parents(false)
        .build();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("skipping part of {}: {e}", root.display());
                continue;
            }
        };

        let path = entry.path();
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        let matches = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case(extension))
            .unwrap_or(false);

        if is_file && matches {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    files
}

fn console_attached() -> bool {
    use std::io::IsTerminal;
    std::io::stderr().is_terminal()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "From: scout@arsenal.example\n\
To: director@arsenal.example\n\
Subject: Contract Renewal - Bukayo Saka Jr.\n\
Date: Mon, 12 Mar 2040 09:30:00 +0000\n\
\n\
Player: Bukayo Saka Jr.\n\
Weekly Wage: £250,000\n\
Duration: 5 years";

    #[test]
    fn test_parse_headers_and_body() {
        let email = parse_email(SAMPLE, Path::new("/data/Arsenal/email_01.msg"));

        assert_eq!(email.from, "scout@arsenal.example");
        assert_eq!(email.to, "director@arsenal.example");
        assert_eq!(email.subject, "Contract Renewal - Bukayo Saka Jr.");
        assert_eq!(email.date, "Mon, 12 Mar 2040 09:30:00 +0000");
        assert_eq!(
            email.body,
            "Player: Bukayo Saka Jr.\nWeekly Wage: £250,000\nDuration: 5 years"
        );
        assert_eq!(email.folder, "Arsenal");
        assert_eq!(email.filename, "email_01.msg");
        assert_eq!(email.source(), "Arsenal/email_01.msg");
        assert!(email.date_parsed.is_some());
    }

    #[test]
    fn test_blank_line_within_first_lines_does_not_end_headers() {
        let content = "From: a\n\nTo: b\nSubject: c\nDate: d\n\nbody line";
        let email = parse_email(content, Path::new("x/y.msg"));

        assert_eq!(email.to, "b");
        assert_eq!(email.date, "d");
        assert_eq!(email.body, "body line");
    }

    #[test]
    fn test_missing_separator_keeps_whole_content_as_body() {
        let content = "From: a\nTo: b\nno blank line here";
        let email = parse_email(content, Path::new("x/y.msg"));

        assert_eq!(email.from, "a");
        assert_eq!(email.body, content);
    }

    #[test]
    fn test_repeated_header_keeps_last_value() {
        let content = "Subject: first\nSubject: second\nFrom: a\nTo: b\n\nbody";
        let email = parse_email(content, Path::new("x/y.msg"));
        assert_eq!(email.subject, "second");
    }

    #[test]
    fn test_prefix_is_case_sensitive() {
        let content = "from: lower\nFrom: upper\nTo: b\nDate: d\n\nbody";
        let email = parse_email(content, Path::new("x/y.msg"));
        assert_eq!(email.from, "upper");
    }

    #[test]
    fn test_unparsable_date_is_none() {
        let content = "From: a\nTo: b\nSubject: c\nDate: sometime in spring\n\nbody";
        let email = parse_email(content, Path::new("x/y.msg"));
        assert_eq!(email.date, "sometime in spring");
        assert!(email.date_parsed.is_none());
    }

    #[test]
    fn test_load_missing_root() {
        let result = Corpus::load(Path::new("/definitely/not/here"), "msg");
        assert!(matches!(result, Err(MailError::RootNotFound(_))));
    }
}
