pub mod text;
pub mod trim;

use std::fmt;

use scraper::{ElementRef, Html, Selector};

use crate::discover::CardLink;
use crate::error::{parse_selector, Result};
use crate::fetch::Fetcher;
use crate::settings::{ContentMode, Settings};

pub use text::visible_text;
pub use trim::{cut_footer, TrimStrategy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The content container is not on the page.
    NoContainer,
    /// Nothing was left after trimming.
    Empty,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoContainer => f.write_str("content container not found"),
            SkipReason::Empty => f.write_str("no text left after trimming"),
        }
    }
}

/// Outcome of reading one detail page. Transport failures are `Err` on [`fetch_card`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Found { title: String, text: String },
    Skipped(SkipReason),
}

/// Selectors and cleanup applied to every detail page.
#[derive(Debug)]
pub struct ContentRules {
    content: Selector,
    mode: ContentMode,
    heading: Option<Selector>,
    trim: TrimStrategy,
    footer_marker: Option<String>,
}

impl ContentRules {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let heading = settings
            .heading_selector
            .as_deref()
            .map(parse_selector)
            .transpose()?;

        Ok(Self {
            content: parse_selector(&settings.content_selector)?,
            mode: settings.content_mode,
            heading,
            trim: settings.trim_strategy(),
            footer_marker: settings.footer_marker.clone().filter(|m| !m.is_empty()),
        })
    }

    pub fn extract(&self, html: &str, link: &CardLink) -> Extraction {
        let document = Html::parse_document(html);

        let raw = match self.mode {
            ContentMode::Container => match document.select(&self.content).next() {
                Some(container) => visible_text(container),
                None => return Extraction::Skipped(SkipReason::NoContainer),
            },
            ContentMode::Blocks => {
                let blocks: Vec<String> = document.select(&self.content).map(inline_text).collect();
                if blocks.is_empty() {
                    return Extraction::Skipped(SkipReason::NoContainer);
                }
                blocks
                    .into_iter()
                    .filter(|b| !b.is_empty())
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        };

        let mut text = self.trim.apply(&raw, &link.title);
        if let Some(marker) = &self.footer_marker {
            text = cut_footer(text, marker);
        }
        if text.is_empty() {
            return Extraction::Skipped(SkipReason::Empty);
        }

        Extraction::Found {
            title: self.heading_text(&document).unwrap_or_else(|| link.title.clone()),
            text: text.to_string(),
        }
    }

    fn heading_text(&self, document: &Html) -> Option<String> {
        let el = document.select(self.heading.as_ref()?).next()?;
        let text = inline_text(el);
        (!text.is_empty()).then_some(text)
    }
}

/// Text of one element run together as written, outer whitespace trimmed.
fn inline_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Fetch one detail page and extract its interpretation.
pub async fn fetch_card(fetcher: &Fetcher, link: &CardLink, rules: &ContentRules) -> Result<Extraction> {
    let html = fetcher.get_html(&link.url).await?;
    Ok(rules.extract(&html, link))
}

// ── Tests ──
