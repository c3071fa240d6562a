use std::time::Duration;

use chrono::NaiveDate;
use reqwest::Client;
use serde_json::Value;

use crate::error::Result;
use crate::fetch::{FetchOutcome, HistorySource};

/// Render a day in the `dd-mm-yyyy` form the history endpoint requires.
/// The endpoint silently misreads other orderings, so this conversion must
/// be exact.
pub fn api_date(day: NaiveDate) -> String {
    day.format("%d-%m-%Y").to_string()
}

/// Read the quoted USD price at its fixed path inside the history document.
pub fn extract_price_usd(document: &Value) -> Option<f64> {
    document
        .get("market_data")?
        .get("current_price")?
        .get("usd")?
        .as_f64()
}

/// Issues one request per (coin, day) against the CoinGecko history endpoint
/// and classifies the outcome. Retry policy, if any, belongs to the caller.
pub struct HistoryFetcher {
    client: Client,
    api_base: String,
    api_key: String,
}

impl HistoryFetcher {
    pub fn new(api_base: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

impl HistorySource for HistoryFetcher {
    async fn fetch_day(&self, coin_id: &str, day: NaiveDate) -> FetchOutcome {
        let url = format!("{}/coins/{}/history", self.api_base, coin_id);
        let date = api_date(day);

        let response = match self
            .client
            .get(&url)
            .query(&[
                ("date", date.as_str()),
                ("x_cg_demo_api_key", self.api_key.as_str()),
            ])
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => return FetchOutcome::TransientNetwork(err.to_string()),
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => return FetchOutcome::TransientNetwork(err.to_string()),
        };

        if !status.is_success() {
            return FetchOutcome::Upstream { status, body };
        }

        let document: Value = match serde_json::from_str(&body) {
            Ok(document) => document,
            Err(err) => {
                return FetchOutcome::DataShape(format!("response body is not valid JSON: {err}"))
            }
        };

        if extract_price_usd(&document).is_none() {
            return FetchOutcome::DataShape(format!(
                "market_data.current_price.usd missing for {coin_id} on {day}"
            ));
        }

        FetchOutcome::Fetched(document)
    }
}
