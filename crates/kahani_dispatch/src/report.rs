//! Success/failure summary of one fan-out.

use crate::dispatcher::DispatchOutcome;
use derive_getters::Getters;
use tracing::{info, warn};

/// Counts and failure messages of a batch of outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct DispatchReport {
    /// Number of items dispatched.
    total: usize,
    /// Number of items that succeeded.
    succeeded: usize,
    /// Index and message of each failed item.
    failures: Vec<(usize, String)>,
}

impl DispatchReport {
    /// Summarise `outcomes`.
    pub fn from_outcomes<R>(outcomes: &[DispatchOutcome<R>]) -> Self {
        let failures: Vec<(usize, String)> = outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.index, e.kind.to_string())))
            .collect();
        Self {
            total: outcomes.len(),
            succeeded: outcomes.len() - failures.len(),
            failures,
        }
    }

    /// True when every item failed and there was at least one item.
    pub fn all_failed(&self) -> bool {
        self.total > 0 && self.succeeded == 0
    }

    /// Log the summary under `label`.
    pub fn log(&self, label: &str) {
        if self.failures.is_empty() {
            info!(label, total = self.total, "All work items succeeded");
        } else {
            warn!(
                label,
                total = self.total,
                succeeded = self.succeeded,
                failed = self.failures.len(),
                "Some work items failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kahani_error::{DispatchError, DispatchErrorKind};

    #[test]
    fn test_report_counts() {
        let outcomes = vec![
            DispatchOutcome {
                index: 0,
                result: Ok(1),
            },
            DispatchOutcome {
                index: 1,
                result: Err(DispatchError::new(1, DispatchErrorKind::Timeout(50))),
            },
        ];
        let report = DispatchReport::from_outcomes(&outcomes);
        assert_eq!(*report.total(), 2);
        assert_eq!(*report.succeeded(), 1);
        assert_eq!(report.failures()[0].0, 1);
        assert!(!report.all_failed());
    }
}
