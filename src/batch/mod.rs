//! Batch processing over URL list files
//!
//! A batch starts life as a text file of URLs, optionally labeled. The
//! sequential runner paces requests against the JSON endpoint, while the
//! concurrent runner drives a pool of headless-browser workers. Both report
//! every input as exactly one success or one failure.

mod concurrent;
mod input;
mod pool;
mod sequential;

pub use concurrent::run_concurrent;
pub use input::{parse_batch_lines, read_batch_file};
pub use pool::run_pool;
pub use sequential::run_sequential;

use crate::extract::{ExtractOutcome, FailureRecord, PostRecord};

/// One input awaiting extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    pub label: String,
    pub url: String,
}

/// Everything a finished batch produced
#[derive(Debug, Default)]
pub struct BatchRun {
    pub successes: Vec<PostRecord>,
    pub failures: Vec<FailureRecord>,
}

impl BatchRun {
    pub fn from_outcomes(outcomes: Vec<ExtractOutcome>) -> Self {
        let mut run = Self::default();
        for outcome in outcomes {
            run.push(outcome);
        }
        run
    }

    pub fn push(&mut self, outcome: ExtractOutcome) {
        match outcome {
            ExtractOutcome::Success(record) => self.successes.push(record),
            ExtractOutcome::Failure(failure) => self.failures.push(failure),
        }
    }

    /// Number of inputs this run settled, success or not
    pub fn total(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Fraction of inputs that succeeded; an empty run counts as fully successful
    pub fn success_ratio(&self) -> f64 {
        if self.total() == 0 {
            return 1.0;
        }
        self.success_count() as f64 / self.total() as f64
    }
}
