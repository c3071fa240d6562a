use std::time::Instant;

use chrono::NaiveDate;
use log::{debug, info, warn};

use crate::artifacts::DocumentSink;
use crate::error::Result;
use crate::fetch::{extract_price_usd, FetchOutcome, HistorySource};
use crate::plan::DayRange;
use crate::store::DayStore;

pub mod cooldown;

pub use cooldown::CooldownPolicy;

/// Run-level counters reported back to the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunReport {
    pub attempted: usize,
    pub succeeded: usize,
}

impl RunReport {
    fn record(&mut self, outcome: &DayOutcome) {
        self.attempted += 1;
        if matches!(outcome, DayOutcome::Done) {
            self.succeeded += 1;
        }
    }
}

/// Terminal state of one day's processing. Every variant lets the run
/// continue with the next day.
#[derive(Debug)]
pub enum DayOutcome {
    Done,
    FetchFailed(FetchOutcome),
    PersistFailed(String),
}

/// Drives one ingestion run: planner, per-day fetch, artifact write, the
/// coupled store writes, cooldown, and failure isolation.
///
/// The store is optional; when absent, a successful fetch plus artifact
/// write completes the day.
pub struct Ingestor<F, S, D> {
    source: F,
    sink: D,
    store: Option<S>,
    cooldown: CooldownPolicy,
}

impl<F, S, D> Ingestor<F, S, D>
where
    F: HistorySource,
    S: DayStore,
    D: DocumentSink,
{
    pub fn new(source: F, sink: D, store: Option<S>, cooldown: CooldownPolicy) -> Self {
        Self {
            source,
            sink,
            store,
            cooldown,
        }
    }

    /// Single-day mode: one fetch-and-persist pass, no cooldown.
    pub async fn run_single(&self, coin_id: &str, day: NaiveDate) -> Result<RunReport> {
        info!("processing single day {day} for {coin_id}");
        let mut report = RunReport::default();
        let outcome = self.process_day(coin_id, day).await;
        log_failure(day, &outcome);
        report.record(&outcome);
        Ok(report)
    }

    /// Range mode: walk every day from `start` to `end` inclusive, pausing
    /// between days. Range validation happens before the first request.
    pub async fn run_range(
        &self,
        coin_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RunReport> {
        let range = DayRange::new(start, end)?;
        let total = range.len();
        info!("processing {total} day(s) for {coin_id}: {start} to {end}");

        let mut report = RunReport::default();
        let mut days = range.peekable();
        let mut index = 0usize;

        while let Some(day) = days.next() {
            index += 1;
            info!("({index}/{total}) processing {day}");

            let started = Instant::now();
            let outcome = self.process_day(coin_id, day).await;
            log_failure(day, &outcome);
            report.record(&outcome);

            // Fair-use pause, skipped after the final day.
            if days.peek().is_some() {
                let wait = self.cooldown.wait_for(started.elapsed());
                if !wait.is_zero() {
                    tokio::time::sleep(wait).await;
                }
            }
        }

        info!(
            "run finished: {}/{} day(s) fully succeeded",
            report.succeeded, report.attempted
        );
        Ok(report)
    }

    async fn process_day(&self, coin_id: &str, day: NaiveDate) -> DayOutcome {
        let document = match self.source.fetch_day(coin_id, day).await {
            FetchOutcome::Fetched(document) => document,
            failed => return DayOutcome::FetchFailed(failed),
        };

        // The artifact is written on every successful fetch. A sink failure
        // alone does not fail the day; store persistence may still succeed.
        match self.sink.save_document(coin_id, day, &document) {
            Ok(path) => debug!("wrote artifact {}", path.display()),
            Err(err) => warn!("{day}: failed to write artifact: {err}"),
        }

        // The field is read again here even though the fetcher already
        // checked it; persistence keys off this value.
        let Some(price) = extract_price_usd(&document) else {
            return DayOutcome::PersistFailed(format!(
                "market_data.current_price.usd missing for {coin_id} on {day}"
            ));
        };

        if let Some(store) = &self.store {
            if let Err(err) = store.persist_day(coin_id, day, price, &document).await {
                return DayOutcome::PersistFailed(err.to_string());
            }
        }

        DayOutcome::Done
    }
}

fn log_failure(day: NaiveDate, outcome: &DayOutcome) {
    match outcome {
        DayOutcome::Done => {}
        DayOutcome::FetchFailed(reason) => warn!("{day}: fetch failed: {reason}"),
        DayOutcome::PersistFailed(reason) => warn!("{day}: persist failed: {reason}"),
    }
}
