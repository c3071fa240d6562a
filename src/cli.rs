use chrono::NaiveDate;
use clap::{ArgGroup, Parser};

use crate::error::{AppError, Result};
use crate::plan::parse_day;

#[derive(Parser)]
#[command(name = "coin-history-cli")]
#[command(about = "Downloads daily historical coin prices from the CoinGecko API")]
#[command(version)]
#[command(group(ArgGroup::new("mode").required(true).args(["date", "start_date"])))]
pub struct Cli {
    /// Coin identifier (e.g. bitcoin, ethereum)
    #[arg(long)]
    pub coin: String,

    /// Single day to download (YYYY-MM-DD)
    #[arg(long, conflicts_with_all = ["start_date", "end_date"])]
    pub date: Option<String>,

    /// First day of a range (YYYY-MM-DD); requires --end-date
    #[arg(long, requires = "end_date")]
    pub start_date: Option<String>,

    /// Last day of a range (YYYY-MM-DD); requires --start-date
    #[arg(long, requires = "start_date")]
    pub end_date: Option<String>,

    /// Also persist fetched days into PostgreSQL
    #[arg(long)]
    pub store_db: bool,
}

/// Which of the two mutually exclusive run modes was requested.
pub enum Mode {
    Single(NaiveDate),
    Range(NaiveDate, NaiveDate),
}

impl Cli {
    pub fn mode(&self) -> Result<Mode> {
        match (&self.date, &self.start_date, &self.end_date) {
            (Some(date), None, None) => Ok(Mode::Single(parse_day(date)?)),
            (None, Some(start), Some(end)) => Ok(Mode::Range(parse_day(start)?, parse_day(end)?)),
            // Unreachable when parsed through clap; kept for direct construction.
            _ => Err(AppError::Validation(
                "either --date or --start-date/--end-date is required".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_single_day_mode() {
        let cli = Cli::try_parse_from(["coin-history-cli", "--coin", "bitcoin", "--date", "2024-01-05"])
            .expect("single day args");
        assert!(matches!(cli.mode().unwrap(), Mode::Single(_)));
        assert!(!cli.store_db);
    }

    #[test]
    fn accepts_range_mode_with_store_flag() {
        let cli = Cli::try_parse_from([
            "coin-history-cli",
            "--coin",
            "bitcoin",
            "--start-date",
            "2024-01-01",
            "--end-date",
            "2024-01-05",
            "--store-db",
        ])
        .expect("range args");
        assert!(matches!(cli.mode().unwrap(), Mode::Range(_, _)));
        assert!(cli.store_db);
    }

    #[test]
    fn rejects_mixed_modes() {
        let result = Cli::try_parse_from([
            "coin-history-cli",
            "--coin",
            "bitcoin",
            "--date",
            "2024-01-05",
            "--start-date",
            "2024-01-01",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_start_without_end() {
        let result = Cli::try_parse_from([
            "coin-history-cli",
            "--coin",
            "bitcoin",
            "--start-date",
            "2024-01-01",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_missing_mode() {
        let result = Cli::try_parse_from(["coin-history-cli", "--coin", "bitcoin"]);
        assert!(result.is_err());
    }
}
