//! The analysis side panel: bounded table samples forwarded to a
//! text-completion endpoint
//!
//! The request runs on a worker thread and reports through a channel;
//! a failure becomes an inline panel message and never touches the
//! workspace. Requests are not retried.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

use crate::document::{Row, Table};

/// Upper bound on rows included in a payload
pub const SAMPLE_ROWS: usize = 10;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const SYSTEM_INSTRUCTION: &str = "You are a world-class data analyst specializing in \
relational databases and Access MDB files. You are given metadata and sample rows from a \
database table. Provide professional insights, identify potential data quality issues, or \
answer user questions about this data. Keep your tone professional and output in clear \
Markdown format.";

/// Metadata plus the first rows of a table, the only thing the panel
/// ever sends off-process
#[derive(Debug, Clone, Serialize)]
pub struct TableSample {
    pub table: String,
    pub columns: Vec<String>,
    pub total_rows: usize,
    pub rows: Vec<Row>,
}

impl TableSample {
    pub fn from_table(table: &Table) -> Self {
        Self {
            table: table.name.clone(),
            columns: table.columns.clone(),
            total_rows: table.row_count(),
            rows: table.rows.iter().take(SAMPLE_ROWS).cloned().collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Prompt {
    QuickInsights,
    Question(String),
}

pub fn render_prompt(sample: &TableSample, prompt: &Prompt) -> String {
    let summary = format!(
        "Table Name: {}\nColumns: {}\nTotal Records: {}\nSample Data (first {} rows):\n{}",
        sample.table,
        sample.columns.join(", "),
        sample.total_rows,
        sample.rows.len(),
        serde_json::to_string_pretty(&sample.rows).unwrap_or_else(|_| "[]".to_string()),
    );

    match prompt {
        Prompt::QuickInsights => format!(
            "Please analyze this database table and provide 3 key business insights and a \
             summary of the data structure. Data: {summary}"
        ),
        Prompt::Question(question) => {
            format!("Given this data: {summary}\n\nUser Question: {question}")
        }
    }
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("analysis endpoint is not configured; set MDVIEW_ANALYSIS_URL and MDVIEW_API_KEY")]
    MissingCredentials,
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("analysis endpoint returned HTTP {0}")]
    Http(u16),
    #[error("malformed completion response")]
    Malformed,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    system: &'a str,
    prompt: &'a str,
    temperature: f32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    text: Option<String>,
}

pub struct AnalysisClient {
    endpoint: String,
    api_key: String,
    http: reqwest::blocking::Client,
}

impl AnalysisClient {
    pub fn from_env() -> Result<Self, AnalysisError> {
        let endpoint = std::env::var("MDVIEW_ANALYSIS_URL")
            .map_err(|_| AnalysisError::MissingCredentials)?;
        let api_key =
            std::env::var("MDVIEW_API_KEY").map_err(|_| AnalysisError::MissingCredentials)?;
        Ok(Self::new(endpoint, api_key))
    }

    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            http: reqwest::blocking::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn complete(
        &self,
        sample: &TableSample,
        prompt: &Prompt,
    ) -> Result<String, AnalysisError> {
        let prompt_text = render_prompt(sample, prompt);
        let body = CompletionRequest {
            system: SYSTEM_INSTRUCTION,
            prompt: &prompt_text,
            temperature: 0.7,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalysisError::Http(status.as_u16()));
        }

        let completion: CompletionResponse =
            response.json().map_err(|_| AnalysisError::Malformed)?;
        completion
            .text
            .filter(|t| !t.is_empty())
            .ok_or(AnalysisError::Malformed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisState {
    Idle,
    Running,
    Done(String),
    Failed(String),
}

/// Panel-side driver: at most one request in flight, result polled
/// from the event loop like any other background worker
pub struct Analyzer {
    state: AnalysisState,
    rx: Option<Receiver<Result<String, AnalysisError>>>,
}

impl Analyzer {
    pub fn new() -> Self {
        Self {
            state: AnalysisState::Idle,
            rx: None,
        }
    }

    pub fn state(&self) -> &AnalysisState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == AnalysisState::Running
    }

    pub fn reset(&mut self) {
        self.state = AnalysisState::Idle;
        self.rx = None;
    }

    pub fn request(&mut self, sample: TableSample, prompt: Prompt) {
        if self.is_running() {
            return;
        }

        let client = match AnalysisClient::from_env() {
            Ok(client) => client,
            Err(e) => {
                self.state = AnalysisState::Failed(e.to_string());
                return;
            }
        };

        debug!(table = %sample.table, rows = sample.rows.len(), "starting analysis request");
        let (tx, rx) = mpsc::channel();
        self.rx = Some(rx);
        self.state = AnalysisState::Running;

        thread::spawn(move || {
            let result = client.complete(&sample, &prompt);
            if let Err(e) = &result {
                error!(%e, "analysis request failed");
            }
            let _ = tx.send(result);
        });
    }

    /// Move Running -> Done/Failed when the worker reports back
    pub fn poll(&mut self) {
        let Some(rx) = &self.rx else {
            return;
        };
        match rx.try_recv() {
            Ok(Ok(text)) => {
                self.state = AnalysisState::Done(text);
                self.rx = None;
            }
            Ok(Err(e)) => {
                self.state = AnalysisState::Failed(e.to_string());
                self.rx = None;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                self.state = AnalysisState::Failed("analysis worker died".to_string());
                self.rx = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Table, Value};

    fn make_table(rows: usize) -> Table {
        let columns = vec!["Name".to_string(), "Qty".to_string()];
        let rows = (0..rows)
            .map(|i| {
                let mut row = Row::new();
                row.insert("Name".into(), Value::Text(format!("item-{i}")));
                row.insert("Qty".into(), Value::Number(i as f64));
                row
            })
            .collect();
        Table::new("tbl_items", "Items", columns, rows)
    }

    #[test]
    fn sample_is_bounded_to_ten_rows() {
        let sample = TableSample::from_table(&make_table(40));
        assert_eq!(sample.rows.len(), SAMPLE_ROWS);
        assert_eq!(sample.total_rows, 40);
    }

    #[test]
    fn sample_of_a_small_table_takes_every_row() {
        let sample = TableSample::from_table(&make_table(3));
        assert_eq!(sample.rows.len(), 3);
        assert_eq!(sample.total_rows, 3);
        assert_eq!(sample.columns, vec!["Name", "Qty"]);
    }

    #[test]
    fn quick_insights_prompt_carries_the_metadata() {
        let sample = TableSample::from_table(&make_table(2));
        let text = render_prompt(&sample, &Prompt::QuickInsights);
        assert!(text.contains("Table Name: Items"));
        assert!(text.contains("Columns: Name, Qty"));
        assert!(text.contains("Total Records: 2"));
        assert!(text.contains("3 key business insights"));
    }

    #[test]
    fn question_prompt_appends_the_user_question() {
        let sample = TableSample::from_table(&make_table(1));
        let text = render_prompt(&sample, &Prompt::Question("Any duplicates?".into()));
        assert!(text.contains("User Question: Any duplicates?"));
        assert!(text.contains("item-0"));
    }

    #[test]
    fn missing_credentials_fail_inline_without_a_worker() {
        // keep other env vars out of the picture
        std::env::remove_var("MDVIEW_ANALYSIS_URL");
        std::env::remove_var("MDVIEW_API_KEY");

        let mut analyzer = Analyzer::new();
        analyzer.request(TableSample::from_table(&make_table(1)), Prompt::QuickInsights);
        match analyzer.state() {
            AnalysisState::Failed(msg) => assert!(msg.contains("MDVIEW_ANALYSIS_URL")),
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
