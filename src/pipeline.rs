use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::discover::{self, CardLink, LinkRules};
use crate::error::Result;
use crate::extract::{self, ContentRules, Extraction};
use crate::fetch::Fetcher;
use crate::settings::Settings;
use crate::sink::{CardRecord, Sink};

/// Counts reported after a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub discovered: usize,
    pub saved: usize,
    pub skipped: usize,
    pub failed: usize,
    /// `"<title>: <reason>"` for every card that did not make it to the sink.
    pub failures: Vec<String>,
}

/// Discovery, extraction and politeness delay wired together from [`Settings`].
pub struct Pipeline {
    fetcher: Fetcher,
    index_url: String,
    links: LinkRules,
    content: ContentRules,
    delay: Duration,
    progress: bool,
}

impl Pipeline {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            fetcher: Fetcher::new(settings)?,
            index_url: settings.index_url.clone(),
            links: LinkRules::from_settings(settings)?,
            content: ContentRules::from_settings(settings)?,
            delay: settings.delay(),
            progress: true,
        })
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub async fn discover(&self) -> Vec<CardLink> {
        discover::discover(&self.fetcher, &self.index_url, &self.links).await
    }

    /// Discover every card and harvest up to `limit` of them into `sink`.
    /// An empty index aborts before the sink is finished, so nothing is written.
    /// `discovered` in the result counts every link on the index, not just the harvested ones.
    pub async fn run(&self, sink: &mut dyn Sink, limit: Option<usize>) -> Result<RunStats> {
        let mut links = self.discover().await;
        if links.is_empty() {
            warn!("No card links discovered, nothing to harvest");
            return Ok(RunStats::default());
        }
        let discovered = links.len();
        if let Some(n) = limit {
            if n < discovered {
                info!("Limiting harvest to {} of {} cards", n, discovered);
                links.truncate(n);
            }
        }
        let mut stats = self.harvest(links, sink).await?;
        stats.discovered = discovered;
        Ok(stats)
    }

    /// Fetch and extract each card in order, one at a time, sleeping `delay` between fetches.
    pub async fn harvest(&self, links: Vec<CardLink>, sink: &mut dyn Sink) -> Result<RunStats> {
        let total = links.len();
        let mut stats = RunStats {
            discovered: total,
            ..RunStats::default()
        };

        let pb = self.progress_bar(total);
        info!("Harvesting {} cards into {}", total, sink.location().display());

        for (i, link) in links.into_iter().enumerate() {
            pb.set_message(link.title.clone());

            match extract::fetch_card(&self.fetcher, &link, &self.content).await {
                Ok(Extraction::Found { title, text }) => {
                    let record = CardRecord {
                        title,
                        interpretation: text,
                        source_url: link.url.clone(),
                    };
                    if let Err(e) = sink.accept(record) {
                        warn!("Failed to save {}: {}", link.title, e);
                        stats.failed += 1;
                        stats.failures.push(format!("{}: {}", link.title, e));
                    }
                }
                Ok(Extraction::Skipped(reason)) => {
                    warn!("Skipping {} ({}): {}", link.title, link.url, reason);
                    stats.skipped += 1;
                    stats.failures.push(format!("{}: {}", link.title, reason));
                }
                Err(e) => {
                    warn!("Detail fetch failed for {}: {}", link.title, e);
                    stats.failed += 1;
                    stats.failures.push(format!("{}: {}", link.title, e));
                }
            }
            pb.inc(1);

            if i + 1 < total && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }

        pb.finish_and_clear();
        stats.saved = sink.finish()?;
        info!(
            "Harvested {} cards ({} saved, {} skipped, {} failed)",
            total, stats.saved, stats.skipped, stats.failed
        );
        Ok(stats)
    }

    fn progress_bar(&self, total: usize) -> ProgressBar {
        if !self.progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(total as u64);
        match ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
        {
            Ok(style) => pb.set_style(style.progress_chars("=> ")),
            Err(e) => warn!("Progress template rejected: {}", e),
        }
        pb
    }
}

// ── Tests ──
