use crate::error::Result;
use crate::models::FeatureStatistics;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// Loads feature statistics published by the statistics provider as a JSON
/// object of `{"feature": {"mean": .., "std": ..}}`.
pub struct StatisticsReader {
    require_complete: bool,
}

impl StatisticsReader {
    pub fn new() -> Self {
        Self {
            require_complete: true,
        }
    }

    /// When set (the default), every rule's statistics are checked on load.
    pub fn with_require_complete(mut self, require_complete: bool) -> Self {
        self.require_complete = require_complete;
        self
    }

    pub fn read(&self, path: &Path) -> Result<FeatureStatistics> {
        let file = File::open(path)?;
        let statistics: FeatureStatistics = serde_json::from_reader(BufReader::new(file))?;

        if self.require_complete {
            statistics.resolve_all()?;
        }

        debug!(path = %path.display(), features = statistics.len(), "Loaded feature statistics");
        Ok(statistics)
    }
}

impl Default for StatisticsReader {
    fn default() -> Self {
        Self::new()
    }
}
