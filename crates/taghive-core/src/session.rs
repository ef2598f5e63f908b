use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use taghive_schema::HistoryEntry;

use crate::classifier::{Classifier, FailureKind};
use crate::history::SessionHistory;
use crate::taxonomy::InputMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("input is empty; enter at least one message before analyzing")]
pub struct InputEmptyError;

/// A line that could not be classified.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LineFailure {
    /// 1-based line number in the submitted block.
    pub line: usize,
    pub text: String,
    pub kind: FailureKind,
    pub error: String,
}

/// Outcome of one submission.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub rows: Vec<HistoryEntry>,
    pub failures: Vec<LineFailure>,
    pub calls: usize,
}

/// Split a submitted block into `(line_number, text)` pairs to classify.
pub fn split_input(input: &str, mode: InputMode) -> Vec<(usize, String)> {
    match mode {
        InputMode::Single => {
            let text = input.trim();
            if text.is_empty() {
                Vec::new()
            } else {
                vec![(1, text.to_string())]
            }
        }
        InputMode::Batch => input
            .split('\n')
            .enumerate()
            .filter_map(|(idx, line)| {
                let text = line.trim();
                (!text.is_empty()).then(|| (idx + 1, text.to_string()))
            })
            .collect(),
    }
}

/// Runs submissions through a classifier and keeps the session history.
pub struct SessionRunner {
    classifier: Arc<dyn Classifier>,
    history: SessionHistory,
    input_mode: InputMode,
    max_in_flight: usize,
}

impl SessionRunner {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self {
            classifier,
            history: SessionHistory::new(),
            input_mode: InputMode::Batch,
            max_in_flight: 1,
        }
    }

    pub fn with_input_mode(mut self, mode: InputMode) -> Self {
        self.input_mode = mode;
        self
    }

    /// Upper bound on concurrent classification calls. `1` keeps dispatch
    /// strictly sequential.
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight.max(1);
        self
    }

    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    pub fn history(&self) -> &SessionHistory {
        &self.history
    }

    /// Classify every message in `input` once, in order.
    ///
    /// Per-line failures are collected in the report and never stop the
    /// remaining lines. Only successes reach the history, in input order.
    pub async fn analyze(&mut self, input: &str) -> Result<BatchReport, InputEmptyError> {
        let lines = split_input(input, self.input_mode);
        if lines.is_empty() {
            tracing::warn!("analyze called with empty input");
            return Err(InputEmptyError);
        }

        let calls = lines.len();
        let classifier = Arc::clone(&self.classifier);
        let outcomes: Vec<_> = stream::iter(lines)
            .map(|(line, text)| {
                let classifier = Arc::clone(&classifier);
                async move {
                    let result = classifier.classify(&text).await;
                    (line, text, result)
                }
            })
            .buffered(self.max_in_flight)
            .collect()
            .await;

        let mut report = BatchReport {
            calls,
            ..BatchReport::default()
        };
        for (line, text, result) in outcomes {
            match result {
                Ok(result) => {
                    let row = HistoryEntry::new(text, result);
                    self.history.push(row.clone());
                    report.rows.push(row);
                }
                Err(err) => {
                    tracing::warn!(line, error = %err, "classification failed");
                    report.failures.push(LineFailure {
                        line,
                        text,
                        kind: err.kind(),
                        error: err.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            calls,
            rows = report.rows.len(),
            failures = report.failures.len(),
            history = self.history.len(),
            "analysis finished"
        );
        Ok(report)
    }
}
