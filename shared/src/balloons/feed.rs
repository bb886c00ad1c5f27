use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("upstream published no data for this hour")]
    NotFound,
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Hour resources are zero-padded: `{base}/00.json` through `{base}/23.json`.
pub fn hour_url(base_url: &str, hours_ago: u8) -> String {
    format!("{}/{:02}.json", base_url.trim_end_matches('/'), hours_ago)
}

/// Source of one hour's raw payload. Production talks to the upstream feed
/// over HTTP; tests substitute an in-memory implementation.
#[allow(async_fn_in_trait)]
pub trait HourFeed {
    async fn fetch_hour(&self, hours_ago: u8) -> Result<String, FetchError>;
}

pub struct TreasureFeed {
    client: reqwest::Client,
    base_url: String,
}

impl TreasureFeed {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

impl HourFeed for TreasureFeed {
    async fn fetch_hour(&self, hours_ago: u8) -> Result<String, FetchError> {
        let resp = self
            .client
            .get(hour_url(&self.base_url, hours_ago))
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound);
        }
        Ok(resp.error_for_status()?.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hour_urls_are_zero_padded() {
        assert_eq!(
            hour_url("https://example.com/treasure", 0),
            "https://example.com/treasure/00.json"
        );
        assert_eq!(
            hour_url("https://example.com/treasure/", 7),
            "https://example.com/treasure/07.json"
        );
        assert_eq!(
            hour_url("https://example.com/treasure", 23),
            "https://example.com/treasure/23.json"
        );
    }
}
