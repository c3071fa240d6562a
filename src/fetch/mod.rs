use std::fmt;

use chrono::NaiveDate;
use reqwest::StatusCode;
use serde_json::Value;

pub mod history;

pub use history::{api_date, extract_price_usd, HistoryFetcher};

/// Classified result of one history request. The fetcher never returns an
/// `Err` across this boundary; every failure mode is a tagged variant the
/// caller inspects.
#[derive(Debug)]
pub enum FetchOutcome {
    /// 2xx response with a parseable document.
    Fetched(Value),
    /// Non-2xx response from the API.
    Upstream { status: StatusCode, body: String },
    /// Connection or timeout failure before a usable response was obtained.
    TransientNetwork(String),
    /// A response arrived but is not the expected shape: not valid JSON, or
    /// the nested price field is absent.
    DataShape(String),
}

impl fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchOutcome::Fetched(_) => write!(f, "fetched"),
            FetchOutcome::Upstream { status, body } => {
                let snippet: String = body.chars().take(200).collect();
                write!(f, "upstream error {status}: {snippet}")
            }
            FetchOutcome::TransientNetwork(detail) => write!(f, "network error: {detail}"),
            FetchOutcome::DataShape(detail) => write!(f, "unexpected response shape: {detail}"),
        }
    }
}

/// Seam between the orchestrator and the remote history endpoint, so runs can
/// be driven by a scripted source in tests.
#[allow(async_fn_in_trait)]
pub trait HistorySource {
    async fn fetch_day(&self, coin_id: &str, day: NaiveDate) -> FetchOutcome;
}
