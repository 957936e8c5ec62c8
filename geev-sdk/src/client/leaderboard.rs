//! Leaderboard API client (frontend/backend → Geev leaderboard server).

use reqwest::Client;
use url::Url;

use super::{parse_response, ClientError};
use crate::objects::leaderboard::{Category, LeaderboardOptions, LeaderboardPage, Window};

/// Typed HTTP client for the Geev **Leaderboard API**.
///
/// All endpoints are public reads; no authentication is attached here.
#[derive(Debug, Clone)]
pub struct LeaderboardClient {
    http: Client,
    base_url: Url,
}

impl LeaderboardClient {
    /// Create a new `LeaderboardClient`.
    ///
    /// * `base_url` – root URL of the leaderboard server
    ///   (e.g. `https://geev.example.com`).
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one (e.g. to
    /// configure timeouts or a proxy).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `GET /api/v1/leaderboard` – fetch one ranked page.
    pub async fn get_leaderboard(
        &self,
        category: Category,
        window: Window,
        page: u32,
        page_size: u32,
    ) -> Result<LeaderboardPage, ClientError> {
        let url = self.base_url.join("/api/v1/leaderboard")?;

        let resp = self
            .http
            .get(url)
            .query(&[
                ("category", category.as_str()),
                ("window", window.as_str()),
            ])
            .query(&[("page", page), ("page_size", page_size)])
            .send()
            .await?;

        parse_response(resp).await
    }

    /// `GET /api/v1/leaderboard/categories` – list available categories and
    /// windows with their display labels.
    pub async fn get_options(&self) -> Result<LeaderboardOptions, ClientError> {
        let url = self.base_url.join("/api/v1/leaderboard/categories")?;
        let resp = self.http.get(url).send().await?;
        parse_response(resp).await
    }
}
