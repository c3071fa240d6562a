use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde_json::Value;

use crate::error::{Context, Result};

/// Durable side-channel for fetched documents. Kept behind a trait so the
/// orchestrator can be exercised without touching the filesystem.
pub trait DocumentSink {
    fn save_document(&self, coin_id: &str, day: NaiveDate, document: &Value) -> Result<PathBuf>;
}

/// Writes one pretty-printed JSON file per (coin, day) into a flat directory.
pub struct JsonArtifactDir {
    dir: PathBuf,
}

impl JsonArtifactDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Ensure the target directory exists before any persistence happens.
    pub fn prepare(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).with_context(|| {
            format!("Failed to create artifacts directory {}", self.dir.display())
        })?;
        Ok(())
    }
}

impl DocumentSink for JsonArtifactDir {
    fn save_document(&self, coin_id: &str, day: NaiveDate, document: &Value) -> Result<PathBuf> {
        let path = self.dir.join(format!("{coin_id}-{day}.json"));
        let payload = serde_json::to_vec_pretty(document)?;
        fs::write(&path, payload)
            .with_context(|| format!("Failed to write artifact {}", path.display()))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scratch_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("coin-history-artifacts-{tag}-{}", std::process::id()))
    }

    #[test]
    fn writes_one_file_per_coin_day() {
        let dir = scratch_dir("write");
        let sink = JsonArtifactDir::new(&dir);
        sink.prepare().expect("prepare scratch dir");

        let day = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let document = json!({ "market_data": { "current_price": { "usd": 100.0 } } });

        let path = sink
            .save_document("bitcoin", day, &document)
            .expect("save document");
        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some("bitcoin-2024-01-05.json")
        );

        let written: Value =
            serde_json::from_str(&fs::read_to_string(&path).expect("read back")).unwrap();
        assert_eq!(written, document);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn overwrites_existing_artifact() {
        let dir = scratch_dir("overwrite");
        let sink = JsonArtifactDir::new(&dir);
        sink.prepare().expect("prepare scratch dir");

        let day = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        sink.save_document("bitcoin", day, &json!({ "v": 1 }))
            .expect("first save");
        let path = sink
            .save_document("bitcoin", day, &json!({ "v": 2 }))
            .expect("second save");

        let written: Value =
            serde_json::from_str(&fs::read_to_string(&path).expect("read back")).unwrap();
        assert_eq!(written, json!({ "v": 2 }));

        fs::remove_dir_all(&dir).ok();
    }
}
