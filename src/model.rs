use serde::{Deserialize, Serialize};

// used for both single classification responses and accumulated bulk rows.

/// A validated Dewey Decimal classification. `number` is canonical
/// `DDD.DD` form; all three fields are non-empty.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DdcRecord {
    pub number: String,
    pub category: String,
    pub description: String
}

impl DdcRecord {
    pub fn new(number: String, category: String, description: String) -> Self {
        DdcRecord {
            number,
            category,
            description
        }
    }
}

/// Terminal outcome for one bulk input item: either a classification or
/// an error message, never both.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BulkRow {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ddc: Option<DdcRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>
}

impl BulkRow {
    pub fn ok(title: String, ddc: DdcRecord) -> Self {
        BulkRow {
            title,
            ddc: Some(ddc),
            error: None
        }
    }

    pub fn failed(title: String, error: String) -> Self {
        BulkRow {
            title,
            ddc: None,
            error: Some(error)
        }
    }

    pub fn is_ok(&self) -> bool {
        self.ddc.is_some()
    }
}

/// Chunk-level progress counters for one bulk run. Only ever advances;
/// a new run starts from a fresh value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    pub completed_batches: usize,
    pub total_batches: usize
}

impl BatchProgress {
    pub fn new(total_batches: usize) -> Self {
        BatchProgress {
            completed_batches: 0,
            total_batches
        }
    }

    pub fn advance(&mut self) {
        self.completed_batches += 1;
    }

    // an empty run is trivially complete.
    pub fn percent(&self) -> f64 {
        if self.total_batches == 0 {
            return 100.0;
        }
        self.completed_batches as f64 / self.total_batches as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_outcomes_are_exclusive() {
        let ok = BulkRow::ok(
            "title".to_string(),
            DdcRecord::new("005.00".to_string(), "Computer science".to_string(), "x".to_string())
        );
        assert!(ok.is_ok());
        assert!(ok.error.is_none());

        let failed = BulkRow::failed("title".to_string(), "boom".to_string());
        assert!(!failed.is_ok());
        assert!(failed.ddc.is_none());
    }

    #[test]
    fn test_progress_percent() {
        let mut progress = BatchProgress::new(4);
        assert_eq!(progress.percent(), 0.0);
        progress.advance();
        assert_eq!(progress.percent(), 25.0);
        progress.advance();
        progress.advance();
        progress.advance();
        assert_eq!(progress.percent(), 100.0);
    }

    #[test]
    fn test_progress_empty_run_is_complete() {
        let progress = BatchProgress::new(0);
        assert_eq!(progress.percent(), 100.0);
    }
}
