use crate::model::ScraperError;
use crate::scraper::Scraper;

use reqwest::Client;
use reqwest::header::{ACCEPT_LANGUAGE, CONNECTION, HeaderMap, HeaderValue, REFERER};
use std::time::Duration;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";
const REFERER_URL: &str = "https://www.macys.com/";

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds the client. Without `timeout` requests wait as long as the server does.
    /// Accept-Encoding (gzip, deflate, br) is added by reqwest itself.
    pub fn new(timeout: Option<Duration>) -> Result<Self, ScraperError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(REFERER, HeaderValue::from_static(REFERER_URL));

        let mut builder = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| ScraperError::HttpError(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Scraper for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, ScraperError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ScraperError::HttpError(e.to_string()))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(ScraperError::InvalidResponse(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| ScraperError::HttpError(e.to_string()))
    }
}
