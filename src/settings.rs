use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::ValueEnum;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::extract::TrimStrategy;

const ENV_PREFIX: &str = "TAROT";

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Where harvested cards end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One `<title>.txt` per card
    Files,
    /// A single JSON array of records
    Json,
}

/// Which boilerplate trim to apply to extracted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TrimKind {
    None,
    /// Drop everything up to and including the card title
    Title,
    /// Start a fixed lookback before a marker string
    Marker,
}

/// How the content container is turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ContentMode {
    /// Visible text of the first matching element
    Container,
    /// Visible text of every matching element, one per line
    Blocks,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub base_url: String,
    pub index_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub delay_ms: u64,

    pub link_selector: String,
    pub require_title: bool,
    pub title_suffixes: Vec<String>,

    pub content_selector: String,
    pub content_mode: ContentMode,
    pub heading_selector: Option<String>,
    pub trim: TrimKind,
    pub trim_marker: String,
    pub trim_lookback: usize,
    pub footer_marker: Option<String>,

    pub output: OutputFormat,
    pub output_dir: PathBuf,
    pub output_file: PathBuf,
    pub file_prefix: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "https://www.shenpowang.com".into(),
            index_url: "https://www.shenpowang.com/taluopai/jieshi/".into(),
            user_agent: DEFAULT_USER_AGENT.into(),
            timeout_secs: 15,
            delay_ms: 500,
            link_selector: ".taluo_jieshi a".into(),
            require_title: true,
            title_suffixes: vec!["解释".into(), "解读".into()],
            content_selector: ".show_cnt".into(),
            content_mode: ContentMode::Container,
            heading_selector: None,
            trim: TrimKind::Title,
            trim_marker: "也是起点".into(),
            trim_lookback: 10,
            footer_marker: None,
            output: OutputFormat::Files,
            output_dir: PathBuf::from("tarot_knowledge_base"),
            output_file: PathBuf::from("tarot_knowledge_base.json"),
            file_prefix: String::new(),
        }
    }
}

impl Settings {
    /// Defaults, then the optional settings file, then `TAROT_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Settings::default())?);
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("title_suffixes"),
            )
            .build()?
            .try_deserialize()
    }

    pub fn trim_strategy(&self) -> TrimStrategy {
        match self.trim {
            TrimKind::None => TrimStrategy::None,
            TrimKind::Title => TrimStrategy::Title,
            TrimKind::Marker => TrimStrategy::Marker {
                marker: self.trim_marker.clone(),
                lookback: self.trim_lookback,
            },
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_target_the_card_index() {
        let s = Settings::default();
        assert_eq!(s.link_selector, ".taluo_jieshi a");
        assert_eq!(s.content_selector, ".show_cnt");
        assert_eq!(s.delay(), Duration::from_millis(500));
        assert_eq!(s.timeout(), Duration::from_secs(15));
        assert!(s.index_url.starts_with(&s.base_url));
        assert_eq!(s.trim_strategy(), TrimStrategy::Title);
    }

    #[test]
    fn marker_strategy_carries_lookback() {
        let s = Settings {
            trim: TrimKind::Marker,
            trim_lookback: 4,
            ..Settings::default()
        };
        assert_eq!(
            s.trim_strategy(),
            TrimStrategy::Marker {
                marker: "也是起点".into(),
                lookback: 4
            }
        );
    }

    #[test]
    fn settings_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "delay_ms = 0\ntrim = \"marker\"\noutput = \"json\"\ntitle_suffixes = [\"解释\"]\nheading_selector = \".arc_title h1\""
        )
        .unwrap();

        let s = Settings::load(Some(file.path())).unwrap();
        assert_eq!(s.delay_ms, 0);
        assert_eq!(s.trim, TrimKind::Marker);
        assert_eq!(s.output, OutputFormat::Json);
        assert_eq!(s.title_suffixes, vec!["解释".to_string()]);
        assert_eq!(s.heading_selector.as_deref(), Some(".arc_title h1"));
        // untouched keys keep their defaults
        assert_eq!(s.content_selector, ".show_cnt");
    }
}
