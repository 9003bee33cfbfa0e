use scraper::{Html, Selector};
use tracing::{info, warn};

use crate::error::{parse_selector, Result};
use crate::fetch::Fetcher;
use crate::settings::Settings;

/// A card's detail page as listed on the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardLink {
    pub url: String,
    pub title: String,
}

/// How card anchors are found on the index page and turned into links.
#[derive(Debug)]
pub struct LinkRules {
    selector: Selector,
    base_url: String,
    require_title: bool,
    suffixes: Vec<String>,
}

impl LinkRules {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            selector: parse_selector(&settings.link_selector)?,
            base_url: settings.base_url.clone(),
            require_title: settings.require_title,
            suffixes: settings.title_suffixes.clone(),
        })
    }

    /// Collect card links from index HTML, in document order.
    pub fn parse_index(&self, html: &str) -> Vec<CardLink> {
        let document = Html::parse_document(html);

        document
            .select(&self.selector)
            .filter_map(|a| {
                let href = a.value().attr("href")?;
                let raw_title = match a.value().attr("title") {
                    Some(t) => t.to_string(),
                    None if self.require_title => return None,
                    None => a.text().collect::<String>(),
                };
                Some(CardLink {
                    url: absolute_url(&self.base_url, href),
                    title: clean_title(&raw_title, &self.suffixes),
                })
            })
            .collect()
    }
}

/// Fetch the index page and list its cards. Failures are logged and yield no links.
pub async fn discover(fetcher: &Fetcher, index_url: &str, rules: &LinkRules) -> Vec<CardLink> {
    info!("Fetching card index: {}", index_url);
    let html = match fetcher.get_html(index_url).await {
        Ok(html) => html,
        Err(e) => {
            warn!("Index fetch failed: {}", e);
            return Vec::new();
        }
    };

    let links = rules.parse_index(&html);
    info!("Found {} card links", links.len());
    links
}

/// Remove descriptor words ("explanation", "reading") from an anchor title.
pub fn clean_title(raw: &str, suffixes: &[String]) -> String {
    suffixes
        .iter()
        .filter(|s| !s.is_empty())
        .fold(raw.to_string(), |title, s| title.replace(s.as_str(), ""))
        .trim()
        .to_string()
}

fn absolute_url(base: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else {
        format!("{}{}", base, href)
    }
}
