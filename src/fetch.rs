use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::debug;

use crate::error::{Result, ScrapeError};
use crate::settings::Settings;

/// Plain GET client shared by discovery and extraction.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    pub fn new(settings: &Settings) -> Result<Self> {
        let ua = HeaderValue::from_str(&settings.user_agent).map_err(|source| ScrapeError::Header {
            name: "user-agent",
            value: settings.user_agent.clone(),
            source,
        })?;
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, ua);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(settings.timeout())
            .build()
            .map_err(|source| ScrapeError::Request {
                url: settings.base_url.clone(),
                source,
            })?;

        Ok(Self { client })
    }

    /// GET `url` and return the decoded body. Non-2xx statuses are errors.
    pub async fn get_html(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);
        let request_err = |source| ScrapeError::Request {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(request_err)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status,
            });
        }
        response.text().await.map_err(request_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sends_browser_user_agent() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/page")
            .match_header("user-agent", mockito::Matcher::Regex("Chrome/91".into()))
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body("<p>塔罗</p>")
            .create_async()
            .await;

        let fetcher = Fetcher::new(&Settings::default()).unwrap();
        let body = fetcher
            .get_html(&format!("{}/page", server.url()))
            .await
            .unwrap();

        assert_eq!(body, "<p>塔罗</p>");
        mock.assert_async().await;
    }

    #[test]
    fn unusable_user_agent_is_rejected() {
        let settings = Settings {
            user_agent: "Mozilla/5.0\nbroken".into(),
            ..Settings::default()
        };
        match Fetcher::new(&settings) {
            Err(ScrapeError::Header { name, .. }) => assert_eq!(name, "user-agent"),
            other => panic!("expected header error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/gone")
            .with_status(404)
            .create_async()
            .await;

        let fetcher = Fetcher::new(&Settings::default()).unwrap();
        let err = fetcher
            .get_html(&format!("{}/gone", server.url()))
            .await
            .unwrap_err();

        match err {
            ScrapeError::Status { status, .. } => assert_eq!(status.as_u16(), 404),
            other => panic!("expected status error, got {other}"),
        }
    }
}
