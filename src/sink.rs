use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Result, ScrapeError};

static UNSAFE_FILENAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[/\\:*?"<>|\x00-\x1f]"#).unwrap());

/// One harvested card, in the shape written to the knowledge base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardRecord {
    pub title: String,
    pub interpretation: String,
    pub source_url: String,
}

/// Destination for harvested cards.
pub trait Sink {
    fn accept(&mut self, record: CardRecord) -> Result<()>;

    /// Flush anything pending and return how many cards were saved.
    fn finish(&mut self) -> Result<usize>;

    fn location(&self) -> &Path;
}

/// Writes each card to its own text file as soon as it arrives.
#[derive(Debug)]
pub struct FileSink {
    dir: PathBuf,
    prefix: String,
    written: usize,
}

impl FileSink {
    /// Create `dir` if needed. Files are named `<prefix><sanitized title>.txt`.
    pub fn create(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Result<Self> {
        let dir = dir.into();
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|source| ScrapeError::Io {
                path: dir.clone(),
                source,
            })?;
            info!("Created output folder: {}", dir.display());
        }
        Ok(Self {
            dir,
            prefix: prefix.into(),
            written: 0,
        })
    }

    pub fn path_for(&self, title: &str) -> PathBuf {
        self.dir
            .join(format!("{}{}.txt", self.prefix, sanitize_filename(title)))
    }
}

impl Sink for FileSink {
    fn accept(&mut self, record: CardRecord) -> Result<()> {
        let path = self.path_for(&record.title);
        fs::write(&path, record.interpretation.as_bytes())
            .map_err(|source| ScrapeError::Io { path: path.clone(), source })?;
        debug!("Wrote {}", path.display());
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<usize> {
        Ok(self.written)
    }

    fn location(&self) -> &Path {
        &self.dir
    }
}

/// Collects every card and writes one pretty-printed JSON array on `finish`.
#[derive(Debug)]
pub struct JsonSink {
    path: PathBuf,
    records: Vec<CardRecord>,
}

impl JsonSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn records(&self) -> &[CardRecord] {
        &self.records
    }
}

impl Sink for JsonSink {
    fn accept(&mut self, record: CardRecord) -> Result<()> {
        self.records.push(record);
        Ok(())
    }

    fn finish(&mut self) -> Result<usize> {
        // serde_json leaves non-ASCII unescaped and indents by two spaces
        let json = serde_json::to_string_pretty(&self.records)?;
        fs::write(&self.path, json).map_err(|source| ScrapeError::Io {
            path: self.path.clone(),
            source,
        })?;
        info!("Wrote {} records to {}", self.records.len(), self.path.display());
        Ok(self.records.len())
    }

    fn location(&self) -> &Path {
        &self.path
    }
}

/// Turn a card title into a portable file stem.
pub fn sanitize_filename(title: &str) -> String {
    let ascii_parens = title.replace('（', "(").replace('）', ")");
    UNSAFE_FILENAME_RE
        .replace_all(ascii_parens.trim(), "_")
        .into_owned()
}
